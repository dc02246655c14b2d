// SPDX-License-Identifier: MPL-2.0

//! Publicly exported type aliases.

use std::hash::BuildHasherDefault;

use rustc_hash::FxHasher;

/// Map implementation used by the library when iteration order does not matter.
pub type Map<K, V> = rustc_hash::FxHashMap<K, V>;

/// Set implementation used by the library when iteration order does not matter.
pub type Set<V> = rustc_hash::FxHashSet<V>;

/// Insertion-ordered map.
///
/// Used wherever iteration order leaks into an output sequence or into the order
/// of reported issues.
pub type FnvIndexMap<K, V> = indexmap::IndexMap<K, V, BuildHasherDefault<FxHasher>>;

/// Insertion-ordered set, the backbone of flattening.
pub type FnvIndexSet<V> = indexmap::IndexSet<V, BuildHasherDefault<FxHasher>>;
