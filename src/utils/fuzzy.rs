// Fuzzy matching utilities for config key suggestions

/// Calculate Levenshtein distance between two strings
/// Returns the minimum number of single-character edits (insertions, deletions, substitutions)
/// needed to transform one string into another
pub fn levenshtein_distance(s1: &str, s2: &str) -> usize {
    let s1_chars: Vec<char> = s1.chars().collect();
    let s2_chars: Vec<char> = s2.chars().collect();
    let s1_len = s1_chars.len();
    let s2_len = s2_chars.len();
    
    if s1_len == 0 {
        return s2_len;
    }
    if s2_len == 0 {
        return s1_len;
    }
    
    // Single rolling row instead of the full matrix
    let mut prev: Vec<usize> = (0..=s2_len).collect();
    let mut curr = vec![0; s2_len + 1];
    
    for i in 1..=s1_len {
        curr[0] = i;
        for j in 1..=s2_len {
            let cost = if s1_chars[i - 1] == s2_chars[j - 1] { 0 } else { 1 };
            curr[j] = (prev[j] + 1)                 // deletion
                .min(curr[j - 1] + 1)               // insertion
                .min(prev[j - 1] + cost);           // substitution
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    
    prev[s2_len]
}

/// Closest candidate within `max_distance` (case-insensitive), ties broken by order.
/// An exact match is not a suggestion and returns None.
pub fn suggest<'a>(input: &str, candidates: &[&'a str], max_distance: usize) -> Option<&'a str> {
    let input_lower = input.to_lowercase();
    candidates
        .iter()
        .map(|c| (*c, levenshtein_distance(&input_lower, &c.to_lowercase())))
        .filter(|(_, d)| *d > 0 && *d <= max_distance)
        .min_by_key(|(_, d)| *d)
        .map(|(c, _)| c)
}
