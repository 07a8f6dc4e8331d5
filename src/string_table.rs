//! StringTable: string keys copied into the table, hashed with seeded djb2.

use crate::builder::Builder;
use crate::djb2::djb2;
use crate::hasher::random_seed;
use crate::raw::{Cursor, Entry, Iter, RawTable, INITIAL_BUCKETS};
use core::fmt;
use slotmap::DefaultKey;

/// A chained hash table keyed by strings.
///
/// Keys are borrowed on the way in and copied into the table, so callers
/// keep their buffers. Values are owned by the table like in
/// [`GenericTable`](crate::GenericTable): replacing, removing or dropping
/// an entry drops its value exactly once.
///
/// ```
/// use hmap::StringTable;
///
/// let mut t = StringTable::new(42);
/// let key = String::from("key");
/// t.add(&key, vec![1, 2]);
/// t.add("key", vec![3]);
/// assert_eq!(t.len(), 1);
/// assert_eq!(t.get(&key), Some(&vec![3]));
/// ```
pub struct StringTable<V> {
    raw: RawTable<Box<str>, V>,
}

impl<V> StringTable<V> {
    /// Creates an empty table that hashes with `seed`.
    pub fn new(seed: u64) -> Self {
        Self::from_parts(seed, INITIAL_BUCKETS)
    }

    pub(crate) fn from_parts(seed: u64, bucket_count: usize) -> Self {
        Self {
            raw: RawTable::with_buckets(seed, bucket_count),
        }
    }

    /// Starts configuring a table; see [`Builder`].
    pub fn builder() -> Builder<Self> {
        Builder::new()
    }

    fn hash_of(&self, key: &str) -> u64 {
        self.raw.hash_with(|seed| djb2(key, seed))
    }

    fn find(&self, key: &str) -> Option<DefaultKey> {
        let hash = self.hash_of(key);
        self.raw.find(hash, |k| **k == *key)
    }

    /// Inserts `value` under a copy of `key`.
    ///
    /// An existing entry keeps its stored key and gets the new value; the
    /// previous value is dropped. Growth is checked before the lookup, as in
    /// [`GenericTable::add`](crate::GenericTable::add).
    pub fn add(&mut self, key: &str, value: V) {
        self.raw.reserve_one();
        let hash = self.hash_of(key);
        match self
            .raw
            .find(hash, |k| **k == *key)
            .and_then(|slot| self.raw.entry_mut(slot))
        {
            Some(entry) => {
                let old = core::mem::replace(&mut entry.value, value);
                drop(old);
            }
            None => {
                self.raw.insert_new(hash, Box::from(key), value);
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&V> {
        let slot = self.find(key)?;
        self.raw.entry(slot).map(|e| &e.value)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut V> {
        let slot = self.find(key)?;
        self.raw.entry_mut(slot).map(|e| &mut e.value)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Removes the entry for `key`, dropping its value. Returns whether an
    /// entry was removed.
    pub fn remove(&mut self, key: &str) -> bool {
        self.take(key).is_some()
    }

    /// Removes the entry for `key` and returns its value.
    pub fn take(&mut self, key: &str) -> Option<V> {
        let hash = self.hash_of(key);
        self.raw.remove(hash, |k| **k == *key).map(|(_, v)| v)
    }

    pub fn len(&self) -> usize {
        self.raw.len()
    }

    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    pub fn bucket_count(&self) -> usize {
        self.raw.bucket_count()
    }

    pub fn seed(&self) -> u64 {
        self.raw.seed()
    }

    #[cfg(test)]
    pub(crate) fn raw(&self) -> &RawTable<Box<str>, V> {
        &self.raw
    }

    /// Drops every value. The bucket array keeps its size.
    pub fn clear(&mut self) {
        let entries = self.raw.take_all();
        drop(entries);
    }

    /// Consumes the table, dropping every remaining value once.
    pub fn release(self) {
        drop(self)
    }

    /// Returns a cursor positioned before the first entry.
    pub fn cursor(&self) -> StrCursor<'_, V> {
        StrCursor {
            inner: self.raw.cursor(),
        }
    }

    pub fn iter(&self) -> StrIter<'_, V> {
        StrIter {
            inner: Iter::new(&self.raw),
        }
    }

    pub fn iter_mut(&mut self) -> StrIterMut<'_, V> {
        StrIterMut {
            it: self.raw.iter_mut(),
        }
    }
}

impl<V> Default for StringTable<V> {
    /// An empty table with a random seed.
    fn default() -> Self {
        Self::new(random_seed())
    }
}

/// Cursor over a [`StringTable`], yielding keys as `&str`.
pub struct StrCursor<'a, V> {
    inner: Cursor<'a, Box<str>, V>,
}

impl<'a, V> StrCursor<'a, V> {
    /// Advances to the next entry; `false` once the table is exhausted.
    pub fn next(&mut self) -> bool {
        self.inner.next()
    }

    pub fn key(&self) -> Option<&'a str> {
        self.inner.key().map(|k| &**k)
    }

    pub fn value(&self) -> Option<&'a V> {
        self.inner.value()
    }
}

/// Iterator over `(&str, &V)` pairs of a [`StringTable`].
pub struct StrIter<'a, V> {
    inner: Iter<'a, Box<str>, V>,
}

impl<'a, V> Iterator for StrIter<'a, V> {
    type Item = (&'a str, &'a V);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(k, v)| (&**k, v))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<V> ExactSizeIterator for StrIter<'_, V> {}

/// Iterator over `(&str, &mut V)` pairs of a [`StringTable`].
pub struct StrIterMut<'a, V> {
    it: slotmap::basic::IterMut<'a, DefaultKey, Entry<Box<str>, V>>,
}

impl<'a, V> Iterator for StrIterMut<'a, V> {
    type Item = (&'a str, &'a mut V);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.it.next().map(|(_, e)| (&*e.key, &mut e.value))
    }
}

impl<'a, V> IntoIterator for &'a StringTable<V> {
    type Item = (&'a str, &'a V);
    type IntoIter = StrIter<'a, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'k, V> Extend<(&'k str, V)> for StringTable<V> {
    fn extend<T: IntoIterator<Item = (&'k str, V)>>(&mut self, iter: T) {
        for (k, v) in iter {
            self.add(k, v);
        }
    }
}

impl<V: fmt::Debug> fmt::Debug for StringTable<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::{BTreeSet, HashSet};
    use std::rc::Rc;

    #[test]
    fn add_copies_the_key() {
        let mut t = StringTable::new(0);
        let mut key = String::from("key");
        t.add(&key, 1);
        key.push_str("-changed");
        assert_eq!(t.get("key"), Some(&1));
        assert!(!t.contains(&key));
    }

    #[test]
    fn overwrite_drops_previous_value_once() {
        let v1 = Rc::new(());
        let v2 = Rc::new(());
        let mut t = StringTable::new(7);
        t.add("key", v1.clone());
        t.add("key", v2.clone());
        assert_eq!(Rc::strong_count(&v1), 1);
        assert_eq!(Rc::strong_count(&v2), 2);
        assert_eq!(t.len(), 1);
        t.release();
        assert_eq!(Rc::strong_count(&v2), 1);
    }

    #[test]
    fn remove_then_readd() {
        let mut t = StringTable::new(1);
        t.add("k", "first");
        assert!(t.remove("k"));
        assert!(!t.remove("k"));
        assert!(t.is_empty());
        t.add("k", "second");
        assert_eq!(t.get("k"), Some(&"second"));
    }

    #[test]
    fn empty_string_is_a_valid_key() {
        let mut t = StringTable::new(0);
        t.add("", 0);
        assert!(t.contains(""));
        assert_eq!(t.take(""), Some(0));
        assert!(!t.contains(""));
    }

    #[test]
    fn growth_follows_threshold() {
        let mut t = StringTable::new(99);
        for i in 0..12 {
            t.add(&i.to_string(), i);
        }
        assert_eq!(t.bucket_count(), 16);
        t.add("12", 12);
        assert_eq!(t.bucket_count(), 32);
        t.raw.check_invariants();
    }

    #[test]
    fn entries_land_in_the_djb2_bucket() {
        let mut t = StringTable::new(5);
        t.add("abc", ());
        let hash = djb2("abc", 5);
        let slot = t.raw.find(hash, |k| &**k == "abc");
        assert!(slot.is_some());
        t.raw.check_invariants();
    }

    #[test]
    fn iterators_agree() {
        let mut t = StringTable::new(3);
        t.extend([("a", 1), ("b", 2), ("c", 3)]);
        for (_, v) in t.iter_mut() {
            *v *= 10;
        }
        let from_iter: BTreeSet<(String, i32)> =
            t.iter().map(|(k, v)| (k.to_string(), *v)).collect();

        let mut from_cursor = BTreeSet::new();
        let mut c = t.cursor();
        while c.next() {
            from_cursor.insert((c.key().unwrap().to_string(), *c.value().unwrap()));
        }
        assert_eq!(from_iter, from_cursor);
        assert_eq!(from_iter.len(), 3);
        assert!(from_iter.contains(&("b".to_string(), 20)));
    }

    #[test]
    fn default_tables_get_distinct_seeds() {
        let seeds: HashSet<u64> = (0..8).map(|_| StringTable::<()>::default().seed()).collect();
        assert!(seeds.len() > 1);
    }
}
