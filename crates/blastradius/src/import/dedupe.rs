//! Order-preserving removal of duplicate links.

use std::collections::HashSet;
use std::hash::Hash;

/// Drop exact duplicates, keeping the first occurrence of each value.
///
/// The output preserves the order in which values first appear.
pub fn dedupe<T, I>(items: I) -> Vec<T>
where
    T: Eq + Hash + Clone,
    I: IntoIterator<Item = T>,
{
    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter(|item| seen.insert(item.clone()))
        .collect()
}
