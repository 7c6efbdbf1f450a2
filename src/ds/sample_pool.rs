//! Dense keyed pool with O(1) removal and O(1) uniform random indexing.
//!
//! Entries live in a dense `Vec<(K, V)>`; a hash map takes each key to its
//! slot. Removal swaps the victim with the last entry and pops, fixing the
//! moved key's slot. Positions are therefore unstable across removals, but
//! every resident entry is reachable by index at all times, which is what a
//! sampling-based eviction policy needs.

use rustc_hash::FxHashMap;
use std::hash::Hash;

use crate::error::InvariantError;

#[derive(Debug, Default, Clone)]
pub struct SamplePool<K, V>
where
    K: Clone + Eq + Hash,
{
    entries: Vec<(K, V)>,
    index: FxHashMap<K, usize>,
}

impl<K, V> SamplePool<K, V>
where
    K: Clone + Eq + Hash,
{
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            index: FxHashMap::default(),
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
            index: FxHashMap::with_capacity_and_hasher(capacity, Default::default()),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, key: &K) -> bool {
        self.index.contains_key(key)
    }

    pub fn slot_of(&self, key: &K) -> Option<usize> {
        self.index.get(key).copied()
    }

    pub fn get(&self, key: &K) -> Option<&V> {
        self.slot_of(key).map(|i| &self.entries[i].1)
    }

    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        let i = self.slot_of(key)?;
        Some(&mut self.entries[i].1)
    }

    pub fn key_at(&self, slot: usize) -> &K {
        &self.entries[slot].0
    }

    pub fn value_at(&self, slot: usize) -> &V {
        &self.entries[slot].1
    }

    pub fn value_at_mut(&mut self, slot: usize) -> &mut V {
        &mut self.entries[slot].1
    }

    /// Appends a fresh entry. Returns `false` (leaving the pool unchanged)
    /// if the key is already present.
    pub fn insert(&mut self, key: K, value: V) -> bool {
        if self.index.contains_key(&key) {
            return false;
        }
        self.index.insert(key.clone(), self.entries.len());
        self.entries.push((key, value));
        true
    }

    /// Removes by swap-with-last and pop. The moved entry's slot is updated
    /// only when the removed slot was not the last.
    pub fn remove(&mut self, key: &K) -> Option<V> {
        let slot = self.index.remove(key)?;
        let (_, value) = self.entries.swap_remove(slot);
        if slot < self.entries.len() {
            let moved = self.entries[slot].0.clone();
            self.index.insert(moved, slot);
        }
        Some(value)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> {
        self.entries.iter().map(|(k, v)| (k, v))
    }

    pub fn values_mut(&mut self) -> impl Iterator<Item = &mut V> {
        self.entries.iter_mut().map(|(_, v)| v)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.index.clear();
    }

    /// Checks the key/slot bijection. O(n); intended for tests and debug
    /// tooling, never for the access path.
    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        if self.entries.len() != self.index.len() {
            return Err(InvariantError::new(format!(
                "entry count {} != index count {}",
                self.entries.len(),
                self.index.len()
            )));
        }
        for (slot, (key, _)) in self.entries.iter().enumerate() {
            match self.index.get(key) {
                Some(&i) if i == slot => {}
                Some(&i) => {
                    return Err(InvariantError::new(format!(
                        "key at slot {} indexed at {}",
                        slot, i
                    )));
                }
                None => {
                    return Err(InvariantError::new(format!(
                        "key at slot {} missing from index",
                        slot
                    )));
                }
            }
        }
        Ok(())
    }

    /// Panicking variant of [`check_invariants`](Self::check_invariants) for
    /// tests.
    pub fn debug_validate_invariants(&self) {
        if let Err(err) = self.check_invariants() {
            panic!("SamplePool invariant violated: {}", err);
        }
    }
}
