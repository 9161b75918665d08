//! Name canonicalization shared by column, metric and category lookups.

/// Trim and collapse internal whitespace runs to a single space.
pub fn collapse_whitespace(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Lookup key: whitespace-collapsed and lowercased.
pub fn lookup_key(raw: &str) -> String {
    collapse_whitespace(raw).to_lowercase()
}
