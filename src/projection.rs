//! Collection projection engine
//! ----------------------------
//! Turns an input collection into a derived `Vec`, `HashSet` or `HashMap`, with an
//! optional predicate applied before extraction. Every operation is pure: an absent
//! (`None`) or empty input yields an empty container of the requested kind, never a
//! panic.
//!
//! Inputs are any `IntoIterator`, so callers can pass `Some(&rows)` to project by
//! reference (elements are `&Row`) or `Some(rows)` to consume the collection.
//!
//! ```
//! use recordkit::projection::{to_list, group_by};
//!
//! let words = vec!["apple", "avocado", "banana"];
//! let long = |w: &&str| w.len() > 5;
//! assert_eq!(to_list(Some(words.clone()), |w| w.len(), Some(&long)), vec![7, 6]);
//!
//! let groups = group_by(Some(words), |w| w[..1].to_string(), None);
//! assert_eq!(groups["a"], vec!["apple", "avocado"]);
//! ```

use std::collections::{HashMap, HashSet};
use std::hash::Hash;

use crate::collections::{empty_map, empty_set, empty_vec};

/// Optional element predicate. `None` keeps every element.
pub type Filter<'a, D> = Option<&'a dyn Fn(&D) -> bool>;

#[inline]
fn passes<D>(filter: Filter<'_, D>, d: &D) -> bool {
    filter.map_or(true, |f| f(d))
}

/// Extract a field from every (filtered) element, preserving input order.
pub fn to_list<I, D, F>(input: Option<I>, mut field: impl FnMut(&D) -> F, filter: Filter<'_, D>) -> Vec<F>
where
    I: IntoIterator<Item = D>,
{
    let Some(input) = input else { return empty_vec() };
    input.into_iter().filter(|d| passes(filter, d)).map(|d| field(&d)).collect()
}

/// Like [`to_list`], but drops repeated field values. The first occurrence keeps its
/// position.
pub fn to_distinct_list<I, D, F>(input: Option<I>, mut field: impl FnMut(&D) -> F, filter: Filter<'_, D>) -> Vec<F>
where
    I: IntoIterator<Item = D>,
    F: Eq + Hash + Clone,
{
    let Some(input) = input else { return empty_vec() };
    let mut seen: HashSet<F> = HashSet::new();
    let mut out = empty_vec();
    for d in input.into_iter().filter(|d| passes(filter, d)) {
        let f = field(&d);
        if seen.insert(f.clone()) { out.push(f); }
    }
    out
}

/// Extract a field from every (filtered) element into a set.
pub fn to_set<I, D, F>(input: Option<I>, mut field: impl FnMut(&D) -> F, filter: Filter<'_, D>) -> HashSet<F>
where
    I: IntoIterator<Item = D>,
    F: Eq + Hash,
{
    let Some(input) = input else { return empty_set() };
    input.into_iter().filter(|d| passes(filter, d)).map(|d| field(&d)).collect()
}

/// Index elements by a derived key. When two elements produce the same key the later
/// one (in filtered iteration order) replaces the earlier.
pub fn to_map<I, D, K>(input: Option<I>, key: impl FnMut(&D) -> K, filter: Filter<'_, D>) -> HashMap<K, D>
where
    I: IntoIterator<Item = D>,
    K: Eq + Hash,
{
    to_map_with(input, key, |d| d, filter)
}

/// Map elements to `key -> value` pairs, both derived from the element. Colliding
/// keys resolve last-write-wins, as in [`to_map`].
pub fn to_map_with<I, D, K, V>(
    input: Option<I>,
    mut key: impl FnMut(&D) -> K,
    mut value: impl FnMut(D) -> V,
    filter: Filter<'_, D>,
) -> HashMap<K, V>
where
    I: IntoIterator<Item = D>,
    K: Eq + Hash,
{
    let Some(input) = input else { return empty_map() };
    let mut out = empty_map();
    for d in input.into_iter().filter(|d| passes(filter, d)) {
        let k = key(&d);
        out.insert(k, value(d));
    }
    out
}

/// Partition (filtered) elements by a derived key. Each group keeps input order.
pub fn group_by<I, D, K>(input: Option<I>, mut key: impl FnMut(&D) -> K, filter: Filter<'_, D>) -> HashMap<K, Vec<D>>
where
    I: IntoIterator<Item = D>,
    K: Eq + Hash,
{
    let Some(input) = input else { return empty_map() };
    let mut out: HashMap<K, Vec<D>> = empty_map();
    for d in input.into_iter().filter(|d| passes(filter, d)) {
        out.entry(key(&d)).or_default().push(d);
    }
    out
}

#[cfg(test)]
#[path = "projection_tests.rs"]
mod projection_tests;
