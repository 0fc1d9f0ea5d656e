//! Fuzzy header matching for friendlier "missing column" errors

use strsim::jaro_winkler;

/// Minimum Jaro-Winkler similarity for a header to be offered as a suggestion
pub const SUGGESTION_THRESHOLD: f64 = 0.8;

/// Similarity of two header names after trimming and lower-casing.
pub fn header_similarity(a: &str, b: &str) -> f64 {
    let a = a.trim().to_lowercase();
    let b = b.trim().to_lowercase();

    // Shared prefixes weigh more, which is what typos in headers look like
    jaro_winkler(&a, &b)
}

/// Closest header to `expected`, if any is similar enough to be a likely typo.
pub fn closest_header<'a>(expected: &str, headers: &'a [String]) -> Option<&'a str> {
    headers
        .iter()
        .map(|h| (h, header_similarity(expected, h)))
        .filter(|(_, score)| *score >= SUGGESTION_THRESHOLD)
        .max_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(h, _)| h.as_str())
}
