//! Null/empty helpers shared by the projection and verification paths.
//! An absent collection (`None`) and an empty one are treated the same everywhere.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};
use std::hash::Hash;

/// Anything that can report how many elements it holds.
pub trait Len {
    fn len(&self) -> usize;
}

impl<T> Len for [T] { fn len(&self) -> usize { <[T]>::len(self) } }
impl<T> Len for Vec<T> { fn len(&self) -> usize { Vec::len(self) } }
impl<T> Len for VecDeque<T> { fn len(&self) -> usize { VecDeque::len(self) } }
impl<K, V, S> Len for HashMap<K, V, S> { fn len(&self) -> usize { HashMap::len(self) } }
impl<T, S> Len for HashSet<T, S> { fn len(&self) -> usize { HashSet::len(self) } }
impl<K, V> Len for BTreeMap<K, V> { fn len(&self) -> usize { BTreeMap::len(self) } }
impl<T> Len for BTreeSet<T> { fn len(&self) -> usize { BTreeSet::len(self) } }
impl Len for str { fn len(&self) -> usize { str::len(self) } }
impl Len for String { fn len(&self) -> usize { String::len(self) } }

/// True when the collection is absent or holds no elements.
#[inline]
pub fn is_empty<C: Len + ?Sized>(collection: Option<&C>) -> bool {
    collection.map_or(true, |c| c.len() == 0)
}

#[inline]
pub fn is_not_empty<C: Len + ?Sized>(collection: Option<&C>) -> bool { !is_empty(collection) }

// Zero-capacity containers: no allocation until the first insert.
#[inline]
pub fn empty_vec<T>() -> Vec<T> { Vec::with_capacity(0) }

#[inline]
pub fn empty_map<K: Eq + Hash, V>() -> HashMap<K, V> { HashMap::with_capacity(0) }

#[inline]
pub fn empty_set<T: Eq + Hash>() -> HashSet<T> { HashSet::with_capacity(0) }
