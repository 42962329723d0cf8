/// Canonical form used for every label comparison: whitespace runs collapse
/// to single spaces, single characters split off by the PDF text layer are
/// re-attached ("K a s" becomes "Kas"), and the result is lower-cased.
/// Applied identically to catalog keys and lookup labels.
pub fn normalize_label(raw: &str) -> String {
    merge_separated_singles(&collapse_whitespace(raw)).to_lowercase()
}

fn collapse_whitespace(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Glues any token of exactly one alphanumeric character onto the token
/// after it. Each decision looks at the input's own token boundaries, so a
/// run of split characters fuses into one word ("a b cd" -> "abcd").
fn merge_separated_singles(collapsed: &str) -> String {
    let tokens: Vec<&str> = collapsed.split(' ').collect();
    let mut merged = String::with_capacity(collapsed.len());

    for (index, token) in tokens.iter().enumerate() {
        merged.push_str(token);

        if index + 1 == tokens.len() {
            break;
        }
        if !(is_single_alphanumeric(token) && starts_alphanumeric(tokens[index + 1])) {
            merged.push(' ');
        }
    }

    merged
}

fn is_single_alphanumeric(token: &str) -> bool {
    let mut chars = token.chars();
    match (chars.next(), chars.next()) {
        (Some(ch), None) => ch.is_alphanumeric(),
        _ => false,
    }
}

fn starts_alphanumeric(token: &str) -> bool {
    token.chars().next().is_some_and(char::is_alphanumeric)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_label_collapses_whitespace_and_lowercases() {
        assert_eq!(
            normalize_label("  Kas   dan  Setara \t Kas "),
            "kas dan setara kas"
        );
        assert_eq!(normalize_label("Total Aset"), "total aset");
    }

    #[test]
    fn normalize_label_repairs_split_single_characters() {
        assert_eq!(normalize_label("K a s"), "kas");
        assert_eq!(normalize_label("K a s "), "kas");
        assert_eq!(normalize_label("PT B ank"), "pt bank");
    }

    #[test]
    fn normalize_label_merges_runs_of_split_characters() {
        assert_eq!(normalize_label("a b cd"), "abcd");
    }

    #[test]
    fn normalize_label_keeps_trailing_single_character() {
        assert_eq!(normalize_label("Kas a"), "kas a");
    }

    #[test]
    fn normalize_label_leaves_non_alphanumeric_singles_alone() {
        assert_eq!(normalize_label("- 2a"), "- 2a");
    }

    #[test]
    fn normalize_label_is_idempotent() {
        for raw in ["K a s ", "  Total   Aset", "a b cd", "Kas a", "", "x"] {
            let once = normalize_label(raw);
            assert_eq!(normalize_label(&once), once, "raw input: {raw:?}");
        }
    }
}
