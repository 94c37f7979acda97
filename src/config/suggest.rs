//! "Did you mean" suggestions for near-miss configuration values.

/// Edit distance between two strings (insertions, deletions, substitutions).
pub fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();

    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut previous: Vec<usize> = (0..=b.len()).collect();
    let mut current = vec![0; b.len() + 1];

    for (i, ca) in a.iter().enumerate() {
        current[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let cost = usize::from(ca != cb);
            current[j + 1] = (previous[j + 1] + 1)
                .min(current[j] + 1)
                .min(previous[j] + cost);
        }
        std::mem::swap(&mut previous, &mut current);
    }

    previous[b.len()]
}

/// Pick the closest candidate to `input`, if it is close enough.
///
/// Comparison is case-insensitive. A candidate qualifies when its distance
/// is at most a third of the longer string's length (minimum 2).
pub fn did_you_mean<'a, I>(input: &str, candidates: I) -> Option<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let needle = input.to_lowercase();

    candidates
        .into_iter()
        .map(|c| (levenshtein(&needle, &c.to_lowercase()), c))
        .filter(|(distance, candidate)| {
            let limit = (needle.chars().count().max(candidate.chars().count()) / 3).max(2);
            *distance <= limit
        })
        .min_by_key(|(distance, _)| *distance)
        .map(|(_, c)| c.to_string())
}
