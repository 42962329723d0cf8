use crate::normalize::normalize_label;
use crate::notes::{NoteCatalog, NoteEntry};
use crate::similarity::sequence_ratio;

/// How a line-item label resolved against the note catalog.
#[derive(Debug, Clone, Copy)]
pub enum MatchOutcome<'a> {
    Exact(&'a NoteEntry),
    Fuzzy { entry: &'a NoteEntry, ratio: f64 },
    Unmatched,
}

impl<'a> MatchOutcome<'a> {
    pub fn entry(&self) -> Option<&'a NoteEntry> {
        match *self {
            MatchOutcome::Exact(entry) => Some(entry),
            MatchOutcome::Fuzzy { entry, .. } => Some(entry),
            MatchOutcome::Unmatched => None,
        }
    }
}

/// Resolves statement labels to note entries: exact lookup on the
/// normalized form first, then the best similarity candidate across the
/// whole catalog. Candidates at or below the threshold are ignored.
pub struct NoteMatcher<'c> {
    catalog: &'c NoteCatalog,
    threshold: f64,
}

impl<'c> NoteMatcher<'c> {
    pub fn new(catalog: &'c NoteCatalog, threshold: f64) -> Self {
        Self { catalog, threshold }
    }

    pub fn lookup(&self, raw_label: &str) -> MatchOutcome<'c> {
        let needle = normalize_label(raw_label);
        if needle.is_empty() {
            return MatchOutcome::Unmatched;
        }

        if let Some(entry) = self.catalog.get(&needle) {
            return MatchOutcome::Exact(entry);
        }

        // Ties keep the earliest key in catalog order.
        let mut best: Option<(&'c NoteEntry, f64)> = None;
        for (key, entry) in self.catalog.iter() {
            let ratio = sequence_ratio(&needle, key);
            if ratio <= self.threshold {
                continue;
            }
            if best.is_none_or(|(_, best_ratio)| ratio > best_ratio) {
                best = Some((entry, ratio));
            }
        }

        match best {
            Some((entry, ratio)) => MatchOutcome::Fuzzy { entry, ratio },
            None => MatchOutcome::Unmatched,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog_of(entries: &[(&str, &str)]) -> NoteCatalog {
        let mut catalog = NoteCatalog::default();
        for (label, code) in entries {
            catalog.insert(label, [code.to_string()]);
        }
        catalog
    }

    #[test]
    fn exact_match_wins_over_fuzzy_candidates() {
        let catalog = catalog_of(&[("Kas", "2a"), ("Kas bersih", "2b")]);
        let matcher = NoteMatcher::new(&catalog, 0.5);

        match matcher.lookup("Kas") {
            MatchOutcome::Exact(entry) => assert_eq!(entry.label, "Kas"),
            other => panic!("expected exact match, got {other:?}"),
        }
    }

    #[test]
    fn split_characters_still_match_exactly() {
        let catalog = catalog_of(&[("Kas", "2a")]);
        let matcher = NoteMatcher::new(&catalog, 0.5);

        assert!(matches!(matcher.lookup("K a s "), MatchOutcome::Exact(_)));
    }

    #[test]
    fn fuzzy_match_above_threshold() {
        let catalog = catalog_of(&[("Piutang usaha", "2c")]);
        let matcher = NoteMatcher::new(&catalog, 0.5);

        match matcher.lookup("Piutang usah") {
            MatchOutcome::Fuzzy { entry, ratio } => {
                assert_eq!(entry.label, "Piutang usaha");
                assert!(ratio > 0.9);
            }
            other => panic!("expected fuzzy match, got {other:?}"),
        }
    }

    #[test]
    fn best_candidate_wins_over_first_found() {
        let catalog = catalog_of(&[("Piutang", "2b"), ("Piutang usaha", "2c")]);
        let matcher = NoteMatcher::new(&catalog, 0.5);

        let entry = matcher.lookup("Piutang usah").entry().unwrap();
        assert_eq!(entry.label, "Piutang usaha");
    }

    #[test]
    fn equal_ratios_resolve_to_first_key_in_order() {
        let catalog = catalog_of(&[("aby", "2"), ("abx", "1")]);
        let matcher = NoteMatcher::new(&catalog, 0.5);

        let entry = matcher.lookup("abc").entry().unwrap();
        assert_eq!(entry.label, "abx");
    }

    #[test]
    fn ratio_at_threshold_is_rejected() {
        let catalog = catalog_of(&[("ax", "1")]);
        let matcher = NoteMatcher::new(&catalog, 0.5);

        assert!(matches!(matcher.lookup("ab"), MatchOutcome::Unmatched));
    }

    #[test]
    fn distant_labels_stay_unmatched() {
        let catalog = catalog_of(&[("Kas", "2a"), ("Total aset", "3")]);
        let matcher = NoteMatcher::new(&catalog, 0.5);

        assert!(matches!(
            matcher.lookup("Goodwill"),
            MatchOutcome::Unmatched
        ));
    }

    #[test]
    fn empty_catalog_never_matches() {
        let catalog = NoteCatalog::default();
        let matcher = NoteMatcher::new(&catalog, 0.5);

        assert!(matches!(matcher.lookup("Kas"), MatchOutcome::Unmatched));
    }
}
