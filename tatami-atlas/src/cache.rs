//! Fixed-capacity, slot-indexed LRU table keyed by strong content hashes.
//!
//! Every live entry occupies one slot index in `0..capacity`; the index is
//! stable for the entry's lifetime and recycled when the entry is evicted
//! or removed. The atlas maps slot indices to tile coordinates, so slot
//! recycling is what makes evicted tiles reusable.

use std::collections::HashMap;

use crate::hash::StrongHash;

#[derive(Debug)]
struct Entry<V> {
    hash: StrongHash,
    value: V,
    prev: Option<usize>,
    next: Option<usize>,
}

#[derive(Debug)]
pub(crate) struct SlotLru<V> {
    map: HashMap<StrongHash, usize>,
    entries: Vec<Option<Entry<V>>>,
    free: Vec<usize>,
    // Most-recently-used end of the intrusive list.
    head: Option<usize>,
    // Least-recently-used end; the next eviction victim.
    tail: Option<usize>,
}

impl<V> SlotLru<V> {
    pub(crate) fn new(capacity: usize) -> Self {
        Self {
            map: HashMap::with_capacity(capacity),
            entries: (0..capacity).map(|_| None).collect(),
            // Reversed so that pop() hands out slot 0 first.
            free: (0..capacity).rev().collect(),
            head: None,
            tail: None,
        }
    }

    pub(crate) fn capacity(&self) -> usize {
        self.entries.len()
    }

    pub(crate) fn len(&self) -> usize {
        self.map.len()
    }

    /// Membership test; does not promote.
    pub(crate) fn contains(&self, hash: &StrongHash) -> bool {
        self.map.contains_key(hash)
    }

    pub(crate) fn slot_of(&self, hash: &StrongHash) -> Option<usize> {
        self.map.get(hash).copied()
    }

    /// The slot the next insertion of a new hash would occupy, without
    /// mutating anything. `None` only when capacity is zero.
    pub(crate) fn peek_insert_slot(&self) -> Option<usize> {
        self.free.last().copied().or(self.tail)
    }

    /// Looks up and promotes to most-recently-used.
    pub(crate) fn get(&mut self, hash: &StrongHash) -> Option<&V> {
        let idx = *self.map.get(hash)?;
        self.touch(idx);
        self.entries[idx].as_ref().map(|entry| &entry.value)
    }

    /// Inserts or overwrites, evicting the least-recently-used entry when
    /// at capacity. Returns the slot index the value landed in.
    ///
    /// Panics when capacity is zero.
    pub(crate) fn insert(&mut self, hash: StrongHash, value: V) -> usize {
        if let Some(&idx) = self.map.get(&hash) {
            if let Some(entry) = self.entries[idx].as_mut() {
                entry.value = value;
            }
            self.touch(idx);
            return idx;
        }

        let idx = match self.free.pop() {
            Some(idx) => idx,
            None => self.evict_lru(),
        };
        self.entries[idx] = Some(Entry {
            hash,
            value,
            prev: None,
            next: None,
        });
        self.map.insert(hash, idx);
        self.push_front(idx);
        idx
    }

    /// Removes an entry, freeing its slot for reuse.
    pub(crate) fn remove(&mut self, hash: &StrongHash) -> Option<V> {
        let idx = self.map.remove(hash)?;
        self.unlink(idx);
        let entry = self.entries[idx].take()?;
        self.free.push(idx);
        Some(entry.value)
    }

    pub(crate) fn clear(&mut self) {
        self.map.clear();
        for slot in self.entries.iter_mut() {
            *slot = None;
        }
        self.free = (0..self.entries.len()).rev().collect();
        self.head = None;
        self.tail = None;
    }

    /// Hashes in most-recently-used order, for inspection and tests.
    pub(crate) fn hashes(&self) -> Vec<StrongHash> {
        let mut out = Vec::with_capacity(self.len());
        let mut cursor = self.head;
        while let Some(idx) = cursor {
            let entry = self.entries[idx].as_ref();
            debug_assert!(entry.is_some(), "linked entry missing");
            match entry {
                Some(entry) => {
                    out.push(entry.hash);
                    cursor = entry.next;
                }
                None => break,
            }
        }
        out
    }

    /// Drops the least-recently-used entry and returns its now-free slot.
    fn evict_lru(&mut self) -> usize {
        let idx = self.tail.expect("evicting from an empty LRU");
        self.unlink(idx);
        if let Some(entry) = self.entries[idx].take() {
            log::trace!("evicting LRU entry {} from slot {}", entry.hash, idx);
            self.map.remove(&entry.hash);
        }
        idx
    }

    fn touch(&mut self, idx: usize) {
        if self.head == Some(idx) {
            return;
        }
        self.unlink(idx);
        self.push_front(idx);
    }

    fn push_front(&mut self, idx: usize) {
        let old_head = self.head;
        self.head = Some(idx);
        if self.tail.is_none() {
            self.tail = Some(idx);
        }

        if let Some(entry) = self.entries[idx].as_mut() {
            entry.prev = None;
            entry.next = old_head;
        }
        if let Some(old) = old_head {
            if let Some(entry) = self.entries[old].as_mut() {
                entry.prev = Some(idx);
            }
        }
    }

    fn unlink(&mut self, idx: usize) {
        let (prev, next) = match self.entries[idx].as_ref() {
            Some(entry) => (entry.prev, entry.next),
            None => return,
        };

        match prev {
            Some(p) => {
                if let Some(entry) = self.entries[p].as_mut() {
                    entry.next = next;
                }
            }
            None => self.head = next,
        }
        match next {
            Some(n) => {
                if let Some(entry) = self.entries[n].as_mut() {
                    entry.prev = prev;
                }
            }
            None => self.tail = prev,
        }

        if let Some(entry) = self.entries[idx].as_mut() {
            entry.prev = None;
            entry.next = None;
        }
    }
}
