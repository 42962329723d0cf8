use std::collections::HashMap;

/// Character-level similarity of two strings: twice the total length of
/// their longest contiguous matching blocks over the combined length
/// (2*M/T). 1.0 for identical strings, 0.0 when nothing matches.
pub fn sequence_ratio(left: &str, right: &str) -> f64 {
    let a: Vec<char> = left.chars().collect();
    let b: Vec<char> = right.chars().collect();
    let combined = a.len() + b.len();
    if combined == 0 {
        return 1.0;
    }

    let mut matched = 0usize;
    let mut pending = vec![(0, a.len(), 0, b.len())];

    // Longest common run first, then recurse into the pieces on either side.
    while let Some((a_lo, a_hi, b_lo, b_hi)) = pending.pop() {
        let (start_a, start_b, length) = longest_match(&a[a_lo..a_hi], &b[b_lo..b_hi]);
        if length == 0 {
            continue;
        }

        matched += length;
        pending.push((a_lo, a_lo + start_a, b_lo, b_lo + start_b));
        pending.push((
            a_lo + start_a + length,
            a_hi,
            b_lo + start_b + length,
            b_hi,
        ));
    }

    2.0 * matched as f64 / combined as f64
}

/// Longest common contiguous run between the two slices, as (start in a,
/// start in b, length). Ties resolve to the earliest positions.
fn longest_match(a: &[char], b: &[char]) -> (usize, usize, usize) {
    let mut best = (0, 0, 0);
    // Length of the common run ending at the previous row, keyed by
    // position in b.
    let mut run_lengths: HashMap<usize, usize> = HashMap::new();

    for (i, &ch) in a.iter().enumerate() {
        let mut next_runs = HashMap::new();
        for (j, &other) in b.iter().enumerate() {
            if ch != other {
                continue;
            }

            let length = j
                .checked_sub(1)
                .and_then(|prev| run_lengths.get(&prev))
                .copied()
                .unwrap_or(0)
                + 1;
            next_runs.insert(j, length);

            if length > best.2 {
                best = (i + 1 - length, j + 1 - length, length);
            }
        }
        run_lengths = next_runs;
    }

    best
}
