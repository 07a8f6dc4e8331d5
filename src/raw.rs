//! RawTable: the chaining engine shared by both public tables.
//!
//! Entries live in a `SlotMap` arena and are linked into per-bucket chains
//! through their generational keys. A bucket is just the head link of its
//! chain; `None` marks an empty bucket. Growth doubles the head array and
//! relinks every entry in place, so no key or value is moved, cloned or
//! dropped while rehashing.
//!
//! The engine never hashes keys itself. Callers compute the hash inside
//! [`RawTable::hash_with`] and the entry stores it, so rehashing does not
//! call back into user code.

use crate::reentrancy::DebugReentrancy;
use slotmap::{DefaultKey, SlotMap};

/// Bucket count of a freshly created table.
pub(crate) const INITIAL_BUCKETS: usize = 16;

type Link = Option<DefaultKey>;

#[derive(Debug)]
pub(crate) struct Entry<K, V> {
    pub(crate) key: K,
    pub(crate) value: V,
    hash: u64,
    next: Link,
}

pub(crate) struct RawTable<K, V> {
    seed: u64,
    heads: Vec<Link>,
    slots: SlotMap<DefaultKey, Entry<K, V>>,
    reentrancy: DebugReentrancy,
}

/// Largest entry count a table with `bucket_count` buckets holds before the
/// next insert grows it (load factor 0.7).
#[inline]
pub(crate) fn threshold(bucket_count: usize) -> usize {
    (7 * bucket_count) / 10
}

#[inline]
fn bucket_for(hash: u64, bucket_count: usize) -> usize {
    (hash % bucket_count as u64) as usize
}

impl<K, V> RawTable<K, V> {
    /// `bucket_count` must be a nonzero power of two; `Builder` validates it.
    pub(crate) fn with_buckets(seed: u64, bucket_count: usize) -> Self {
        debug_assert!(bucket_count.is_power_of_two());
        #[cfg(feature = "logging")]
        log::trace!("creating table with {bucket_count} buckets");
        Self {
            seed,
            heads: vec![None; bucket_count],
            slots: SlotMap::with_key(),
            reentrancy: DebugReentrancy::new(),
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.slots.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub(crate) fn bucket_count(&self) -> usize {
        self.heads.len()
    }

    pub(crate) fn seed(&self) -> u64 {
        self.seed
    }

    /// Runs the caller's hash function with this table's seed while the
    /// table is guarded against reentrant use.
    #[inline]
    pub(crate) fn hash_with<F>(&self, f: F) -> u64
    where
        F: FnOnce(u64) -> u64,
    {
        let _g = self.reentrancy.enter();
        f(self.seed)
    }

    /// Grows the bucket array if the table is above its threshold. Called
    /// before every insertion, whether or not the key turns out to exist.
    pub(crate) fn reserve_one(&mut self) {
        let _g = self.reentrancy.enter();
        if self.slots.len() > threshold(self.heads.len()) {
            Self::rehash(&mut self.heads, &mut self.slots);
        }
    }

    fn rehash(heads: &mut Vec<Link>, slots: &mut SlotMap<DefaultKey, Entry<K, V>>) {
        let new_count = heads.len() * 2;
        #[cfg(feature = "logging")]
        log::debug!(
            "rehashing {} entries from {} to {} buckets",
            slots.len(),
            heads.len(),
            new_count
        );
        let mut grown: Vec<Link> = vec![None; new_count];
        for (slot, entry) in slots.iter_mut() {
            let target = bucket_for(entry.hash, new_count);
            entry.next = grown[target].replace(slot);
        }
        *heads = grown;
    }

    fn chain(&self, hash: u64) -> Chain<'_, K, V> {
        Chain {
            slots: &self.slots,
            link: self.heads[bucket_for(hash, self.heads.len())],
        }
    }

    /// Locates the entry with the given hash whose key satisfies `eq`.
    pub(crate) fn find<F>(&self, hash: u64, mut eq: F) -> Option<DefaultKey>
    where
        F: FnMut(&K) -> bool,
    {
        let _g = self.reentrancy.enter();
        self.chain(hash)
            .find(|(_, e)| e.hash == hash && eq(&e.key))
            .map(|(slot, _)| slot)
    }

    pub(crate) fn entry(&self, slot: DefaultKey) -> Option<&Entry<K, V>> {
        self.slots.get(slot)
    }

    pub(crate) fn entry_mut(&mut self, slot: DefaultKey) -> Option<&mut Entry<K, V>> {
        self.slots.get_mut(slot)
    }

    /// Prepends a new entry to its bucket. The caller has already called
    /// [`reserve_one`](Self::reserve_one) and checked the key is absent.
    pub(crate) fn insert_new(&mut self, hash: u64, key: K, value: V) -> DefaultKey {
        let _g = self.reentrancy.enter();
        let bucket = bucket_for(hash, self.heads.len());
        let next = self.heads[bucket];
        let slot = self.slots.insert(Entry {
            key,
            value,
            hash,
            next,
        });
        self.heads[bucket] = Some(slot);
        slot
    }

    /// Unlinks the matching entry and hands its key and value back. The
    /// table is consistent again before the caller drops them.
    pub(crate) fn remove<F>(&mut self, hash: u64, mut eq: F) -> Option<(K, V)>
    where
        F: FnMut(&K) -> bool,
    {
        let _g = self.reentrancy.enter();
        let bucket = bucket_for(hash, self.heads.len());
        let mut prev: Link = None;
        let mut link = self.heads[bucket];
        while let Some(slot) = link {
            let entry = &self.slots[slot];
            let next = entry.next;
            if entry.hash == hash && eq(&entry.key) {
                match prev {
                    None => self.heads[bucket] = next,
                    Some(p) => self.slots[p].next = next,
                }
                let entry = self.slots.remove(slot)?;
                return Some((entry.key, entry.value));
            }
            prev = link;
            link = next;
        }
        None
    }

    /// Detaches every entry, leaving the bucket count unchanged. The
    /// returned arena drops its contents wherever the caller lets it go.
    pub(crate) fn take_all(&mut self) -> SlotMap<DefaultKey, Entry<K, V>> {
        let _g = self.reentrancy.enter();
        #[cfg(feature = "logging")]
        log::trace!("clearing {} entries", self.slots.len());
        self.heads.iter_mut().for_each(|h| *h = None);
        core::mem::take(&mut self.slots)
    }

    pub(crate) fn cursor(&self) -> Cursor<'_, K, V> {
        Cursor {
            table: self,
            pos: Position::Before,
        }
    }

    pub(crate) fn iter_mut(&mut self) -> slotmap::basic::IterMut<'_, DefaultKey, Entry<K, V>> {
        self.slots.iter_mut()
    }

    /// Structural self-check used by the property tests.
    #[cfg(test)]
    pub(crate) fn check_invariants(&self) {
        let mut linked = 0;
        for (bucket, head) in self.heads.iter().enumerate() {
            let chain = Chain {
                slots: &self.slots,
                link: *head,
            };
            for (_, e) in chain {
                assert_eq!(bucket_for(e.hash, self.heads.len()), bucket);
                linked += 1;
            }
        }
        assert_eq!(linked, self.slots.len(), "every live entry is linked once");
        assert!(self.heads.len().is_power_of_two());
    }
}

struct Chain<'a, K, V> {
    slots: &'a SlotMap<DefaultKey, Entry<K, V>>,
    link: Link,
}

impl<'a, K, V> Iterator for Chain<'a, K, V> {
    type Item = (DefaultKey, &'a Entry<K, V>);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        let slot = self.link?;
        let entry = self.slots.get(slot)?;
        self.link = entry.next;
        Some((slot, entry))
    }
}

#[derive(Clone, Copy, Debug)]
enum Position {
    Before,
    At { bucket: usize, slot: DefaultKey },
    Done,
}

/// A cursor over the entries of a table, positioned before the first entry
/// until [`next`](Cursor::next) is called.
///
/// The cursor borrows the table, so the table cannot be changed while the
/// cursor is alive. Visiting order follows the bucket array and changes
/// when the table grows.
pub struct Cursor<'a, K, V> {
    table: &'a RawTable<K, V>,
    pos: Position,
}

impl<'a, K, V> Cursor<'a, K, V> {
    /// Advances to the next entry, skipping empty buckets. Returns `false`
    /// once every entry has been visited; the cursor stays exhausted.
    pub fn next(&mut self) -> bool {
        let table = self.table;
        let heads = &table.heads;
        let (mut bucket, mut link) = match self.pos {
            Position::Before => (0, heads[0]),
            Position::At { bucket, slot } => {
                (bucket, table.slots.get(slot).and_then(|e| e.next))
            }
            Position::Done => return false,
        };
        loop {
            if let Some(slot) = link {
                self.pos = Position::At { bucket, slot };
                return true;
            }
            bucket += 1;
            if bucket == heads.len() {
                self.pos = Position::Done;
                return false;
            }
            link = heads[bucket];
        }
    }

    fn current(&self) -> Option<&'a Entry<K, V>> {
        match self.pos {
            Position::At { slot, .. } => self.table.slots.get(slot),
            Position::Before | Position::Done => None,
        }
    }

    /// Key of the current entry; `None` before the first `next` and after
    /// exhaustion.
    pub fn key(&self) -> Option<&'a K> {
        self.current().map(|e| &e.key)
    }

    /// Value of the current entry; `None` before the first `next` and after
    /// exhaustion.
    pub fn value(&self) -> Option<&'a V> {
        self.current().map(|e| &e.value)
    }
}

/// Iterator over `(&K, &V)` pairs, walking the buckets like [`Cursor`].
pub struct Iter<'a, K, V> {
    cursor: Cursor<'a, K, V>,
    remaining: usize,
}

impl<'a, K, V> Iter<'a, K, V> {
    pub(crate) fn new(table: &'a RawTable<K, V>) -> Self {
        Iter {
            cursor: table.cursor(),
            remaining: table.len(),
        }
    }
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        if !self.cursor.next() {
            return None;
        }
        self.remaining -= 1;
        self.cursor.current().map(|e| (&e.key, &e.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}
