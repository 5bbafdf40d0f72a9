//! Stable deduplication

use std::collections::HashSet;
use std::hash::Hash;

/// Keep the first item seen for each distinct key, preserving input order
pub fn dedupe_by_key<T, K, F>(items: impl IntoIterator<Item = T>, key: F) -> Vec<T>
where
    K: Eq + Hash,
    F: Fn(&T) -> K,
{
    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter(|item| seen.insert(key(item)))
        .collect()
}
