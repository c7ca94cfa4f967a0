//! A generic chained hash table, keyed by `String`, with a prime-sized
//! bucket array that grows by rehashing when the load factor is exceeded.
//!
//! This mirrors a classic open-chaining design rather than reaching for
//! `std::collections::HashMap`: the symbol table built on top of it needs a
//! specific, swappable hash function (the cyclic-shift hash in `symtab.rs`)
//! and a prime-indexed growth schedule, neither of which `HashMap` exposes.

use thiserror::Error;

/// `delta[i]` is the difference between `2^i` and the largest prime less
/// than `2^i`, so `(1 << i) - delta[i]` is always prime. `idx` starts at 4
/// (size 13) and climbs one notch per rehash.
const DELTA: [u32; 32] = [
    0, 0, 1, 1, 3, 1, 3, 1, 5, 3, 3, 9, 3, 1, 3, 19, 15, 1, 5, 1, 3, 9, 3, 15, 3, 39, 5, 39, 57, 3,
    35, 1,
];

const INITIAL_IDX: u32 = 4;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum HashTableError {
    #[error("key already present")]
    KeyExists,
    #[error("hash table exhausted its prime-size schedule")]
    TableFull,
}

fn prime_size(idx: u32) -> usize {
    ((1u64 << idx) - DELTA[idx as usize] as u64) as usize
}

pub struct HashTable<V> {
    buckets: Vec<Vec<(String, V)>>,
    size: usize,
    idx: u32,
    num_entries: usize,
    max_load: f32,
    hash_fn: fn(&str, usize) -> usize,
}

impl<V> HashTable<V> {
    pub fn new(max_load: f32, hash_fn: fn(&str, usize) -> usize) -> Self {
        let size = prime_size(INITIAL_IDX);
        HashTable {
            buckets: (0..size).map(|_| Vec::new()).collect(),
            size,
            idx: INITIAL_IDX,
            num_entries: 0,
            max_load,
            hash_fn,
        }
    }

    pub fn len(&self) -> usize {
        self.num_entries
    }

    pub fn is_empty(&self) -> bool {
        self.num_entries == 0
    }

    pub fn load_factor(&self) -> f32 {
        self.num_entries as f32 / self.size as f32
    }

    pub fn search(&self, key: &str) -> Option<&V> {
        let bucket = (self.hash_fn)(key, self.size);
        self.buckets[bucket]
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    pub fn insert(&mut self, key: String, value: V) -> Result<(), HashTableError> {
        let bucket = (self.hash_fn)(&key, self.size);
        if self.buckets[bucket].iter().any(|(k, _)| *k == key) {
            return Err(HashTableError::KeyExists);
        }
        self.buckets[bucket].push((key, value));
        self.num_entries += 1;

        if self.load_factor() > self.max_load {
            self.rehash()?;
        }
        Ok(())
    }

    pub fn for_each(&self, mut f: impl FnMut(&str, &V)) {
        for bucket in &self.buckets {
            for (k, v) in bucket {
                f(k, v);
            }
        }
    }

    /// Grows the table to the next prime size and relinks every existing
    /// entry directly into the new bucket array. This must not call back
    /// into `insert`: doing so would double-count entries and could
    /// re-trigger a rehash mid-rehash.
    fn rehash(&mut self) -> Result<(), HashTableError> {
        let next_idx = self.idx + 1;
        if next_idx as usize >= DELTA.len() {
            return Err(HashTableError::TableFull);
        }
        let new_size = prime_size(next_idx);
        let mut new_buckets: Vec<Vec<(String, V)>> = (0..new_size).map(|_| Vec::new()).collect();

        for old_bucket in self.buckets.drain(..) {
            for (k, v) in old_bucket {
                let new_index = (self.hash_fn)(&k, new_size);
                new_buckets[new_index].push((k, v));
            }
        }

        self.buckets = new_buckets;
        self.size = new_size;
        self.idx = next_idx;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn additive_hash(key: &str, size: usize) -> usize {
        key.bytes().fold(0usize, |acc, b| acc + b as usize) % size
    }

    #[test]
    fn insert_then_search_round_trips() {
        let mut t: HashTable<i32> = HashTable::new(0.75, additive_hash);
        t.insert("a".into(), 1).unwrap();
        t.insert("b".into(), 2).unwrap();
        assert_eq!(t.search("a"), Some(&1));
        assert_eq!(t.search("b"), Some(&2));
        assert_eq!(t.search("c"), None);
        assert_eq!(t.len(), 2);
    }

    #[test]
    fn duplicate_key_is_rejected_and_not_inserted() {
        let mut t: HashTable<i32> = HashTable::new(0.75, additive_hash);
        t.insert("a".into(), 1).unwrap();
        assert_eq!(t.insert("a".into(), 2), Err(HashTableError::KeyExists));
        assert_eq!(t.search("a"), Some(&1));
        assert_eq!(t.len(), 1);
    }

    #[test]
    fn rehash_preserves_every_entry_and_respects_load_factor() {
        let mut t: HashTable<usize> = HashTable::new(0.75, additive_hash);
        for i in 0..500 {
            t.insert(format!("key{i}"), i).unwrap();
        }
        assert_eq!(t.len(), 500);
        assert!(t.load_factor() <= 0.75);
        for i in 0..500 {
            assert_eq!(t.search(&format!("key{i}")), Some(&i));
        }
    }

    #[test]
    fn table_full_once_prime_schedule_is_exhausted() {
        // Jump straight to the last notch of the prime schedule instead of
        // rehashing there one insert at a time (that table size is ~2^31
        // buckets and is never actually allocated): the next rehash must
        // report exhaustion instead of panicking.
        let last_idx = (DELTA.len() - 1) as u32;
        let mut t: HashTable<()> = HashTable {
            buckets: vec![Vec::new()],
            size: 1,
            idx: last_idx,
            num_entries: 0,
            max_load: 0.0,
            hash_fn: additive_hash,
        };
        // The insert itself still lands (the entry is searchable afterwards);
        // only the subsequent rehash attempt fails.
        assert_eq!(t.insert("a".into(), ()), Err(HashTableError::TableFull));
        assert_eq!(t.search("a"), Some(&()));
    }
}
