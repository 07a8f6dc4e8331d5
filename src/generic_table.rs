//! GenericTable: owned keys and values, hashed by a caller-supplied seeded
//! hash function.

use crate::builder::Builder;
use crate::hasher::{random_seed, SeededHash, StdSeeded};
use crate::raw::{Cursor, Entry, Iter, RawTable, INITIAL_BUCKETS};
use core::borrow::Borrow;
use core::fmt;
use slotmap::DefaultKey;

/// A chained hash table that owns its keys and values.
///
/// Keys are hashed with `H` and the table's seed, and compared with `Eq`.
/// Inserting takes ownership of both key and value; replacing an existing
/// key drops the previous key and value, and removing or dropping the table
/// drops whatever it still holds. Each key and value is dropped exactly
/// once.
///
/// ```
/// use hmap::GenericTable;
///
/// let mut t = GenericTable::with_hasher(|k: &String, seed: u64| k.len() as u64 ^ seed);
/// t.add("key".to_string(), "value".to_string());
/// assert_eq!(t.get(&"key".to_string()).map(String::as_str), Some("value"));
/// ```
pub struct GenericTable<K, V, H = StdSeeded> {
    raw: RawTable<K, V>,
    hasher: H,
}

impl<K, V> GenericTable<K, V>
where
    K: Eq + core::hash::Hash,
{
    /// Creates an empty table hashing keys through their `Hash` impl, with
    /// a random seed.
    pub fn new() -> Self {
        Self::with_seed_and_hasher(random_seed(), StdSeeded::default())
    }

    /// Starts configuring a table; see [`Builder`].
    pub fn builder() -> Builder<Self> {
        Builder::new()
    }
}

impl<K, V> Default for GenericTable<K, V>
where
    K: Eq + core::hash::Hash,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, H> GenericTable<K, V, H>
where
    K: Eq,
    H: SeededHash<K>,
{
    /// Creates an empty table using `hasher` and a random seed.
    pub fn with_hasher(hasher: H) -> Self {
        Self::with_seed_and_hasher(random_seed(), hasher)
    }

    /// Creates an empty table using `hasher` and an explicit `seed`.
    pub fn with_seed_and_hasher(seed: u64, hasher: H) -> Self {
        Self::from_parts(seed, INITIAL_BUCKETS, hasher)
    }

    pub(crate) fn from_parts(seed: u64, bucket_count: usize, hasher: H) -> Self {
        Self {
            raw: RawTable::with_buckets(seed, bucket_count),
            hasher,
        }
    }

    /// Inserts `value` under `key`, taking ownership of both.
    ///
    /// If the key is already present, the stored key and value are dropped
    /// and replaced by the new ones; the entry count is unchanged. The table
    /// grows before the lookup whenever it is above its load threshold, even
    /// if this call ends up replacing an entry.
    pub fn add(&mut self, key: K, value: V) {
        self.raw.reserve_one();
        let hash = self.hash_of(&key);
        match self.raw.find(hash, |k| *k == key).and_then(|slot| self.raw.entry_mut(slot)) {
            Some(entry) => {
                let old_key = core::mem::replace(&mut entry.key, key);
                let old_value = core::mem::replace(&mut entry.value, value);
                drop((old_key, old_value));
            }
            None => {
                self.raw.insert_new(hash, key, value);
            }
        }
    }

    fn hash_of<Q>(&self, key: &Q) -> u64
    where
        Q: ?Sized,
        H: SeededHash<Q>,
    {
        self.raw
            .hash_with(|seed| SeededHash::<Q>::hash(&self.hasher, key, seed))
    }

    fn find<Q>(&self, key: &Q) -> Option<DefaultKey>
    where
        K: Borrow<Q>,
        Q: ?Sized + Eq,
        H: SeededHash<Q>,
    {
        let hash = self.hash_of(key);
        self.raw.find(hash, |k| k.borrow() == key)
    }

    /// Returns a reference to the value stored under `key`.
    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Eq,
        H: SeededHash<Q>,
    {
        let slot = self.find(key)?;
        self.raw.entry(slot).map(|e| &e.value)
    }

    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Eq,
        H: SeededHash<Q>,
    {
        let slot = self.find(key)?;
        self.raw.entry_mut(slot).map(|e| &mut e.value)
    }

    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Eq,
        H: SeededHash<Q>,
    {
        self.get(key).is_some()
    }

    /// Removes the entry for `key`, dropping its key and value. Returns
    /// whether an entry was removed; an absent key is not an error.
    pub fn remove<Q>(&mut self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Eq,
        H: SeededHash<Q>,
    {
        self.take(key).is_some()
    }

    /// Removes the entry for `key` and returns its key and value to the
    /// caller instead of dropping them.
    pub fn take<Q>(&mut self, key: &Q) -> Option<(K, V)>
    where
        K: Borrow<Q>,
        Q: ?Sized + Eq,
        H: SeededHash<Q>,
    {
        let hash = self.hash_of(key);
        self.raw.remove(hash, |k| k.borrow() == key)
    }
}

impl<K, V, H> GenericTable<K, V, H> {
    pub fn len(&self) -> usize {
        self.raw.len()
    }

    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    /// Current size of the bucket array. Starts at 16 unless configured
    /// otherwise and only ever doubles.
    pub fn bucket_count(&self) -> usize {
        self.raw.bucket_count()
    }

    pub fn seed(&self) -> u64 {
        self.raw.seed()
    }

    #[cfg(test)]
    pub(crate) fn raw(&self) -> &RawTable<K, V> {
        &self.raw
    }

    /// Drops every entry. The bucket array keeps its size.
    pub fn clear(&mut self) {
        let entries = self.raw.take_all();
        drop(entries);
    }

    /// Consumes the table, dropping every remaining key and value once.
    pub fn release(self) {
        drop(self)
    }

    /// Returns a cursor positioned before the first entry.
    ///
    /// ```
    /// use hmap::GenericTable;
    ///
    /// let mut t = GenericTable::new();
    /// t.add(1, "one");
    /// let mut c = t.cursor();
    /// assert_eq!(c.key(), None);
    /// while c.next() {
    ///     assert_eq!(c.key(), Some(&1));
    ///     assert_eq!(c.value(), Some(&"one"));
    /// }
    /// assert_eq!(c.value(), None);
    /// ```
    pub fn cursor(&self) -> Cursor<'_, K, V> {
        self.raw.cursor()
    }

    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter::new(&self.raw)
    }

    pub fn iter_mut(&mut self) -> IterMut<'_, K, V> {
        IterMut {
            it: self.raw.iter_mut(),
        }
    }
}

/// Iterator over `(&K, &mut V)` pairs of a [`GenericTable`].
pub struct IterMut<'a, K, V> {
    it: slotmap::basic::IterMut<'a, DefaultKey, Entry<K, V>>,
}

impl<'a, K, V> Iterator for IterMut<'a, K, V> {
    type Item = (&'a K, &'a mut V);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.it.next().map(|(_, e)| (&e.key, &mut e.value))
    }
}

impl<'a, K, V, H> IntoIterator for &'a GenericTable<K, V, H> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<K, V, H> Extend<(K, V)> for GenericTable<K, V, H>
where
    K: Eq,
    H: SeededHash<K>,
{
    fn extend<T: IntoIterator<Item = (K, V)>>(&mut self, iter: T) {
        for (k, v) in iter {
            self.add(k, v);
        }
    }
}

impl<K, V> FromIterator<(K, V)> for GenericTable<K, V>
where
    K: Eq + core::hash::Hash,
{
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut t = Self::new();
        t.extend(iter);
        t
    }
}

impl<K, V, H> fmt::Debug for GenericTable<K, V, H>
where
    K: fmt::Debug,
    V: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::collections::BTreeSet;
    use std::rc::Rc;

    fn sum_hash(key: &String, seed: u64) -> u64 {
        key.bytes().map(u64::from).sum::<u64>().wrapping_add(seed)
    }

    /// Counts drops of the values it is attached to.
    struct Tracked(Rc<Cell<usize>>);
    impl Drop for Tracked {
        fn drop(&mut self) {
            self.0.set(self.0.get() + 1);
        }
    }

    #[test]
    fn add_then_get() {
        let mut t = GenericTable::with_seed_and_hasher(0, sum_hash);
        t.add("key".to_string(), "value".to_string());
        assert_eq!(t.get(&"key".to_string()).map(String::as_str), Some("value"));
        assert_eq!(t.len(), 1);
    }

    #[test]
    fn get_on_empty_is_none() {
        let t: GenericTable<String, String, _> = GenericTable::with_hasher(sum_hash);
        assert!(t.get(&"key".to_string()).is_none());
        assert!(!t.contains(&"key".to_string()));
    }

    #[test]
    fn overwrite_replaces_value_and_drops_old_one() {
        let drops = Rc::new(Cell::new(0));
        let mut t = GenericTable::with_hasher(sum_hash);
        t.add("key".to_string(), Tracked(drops.clone()));
        t.add("key".to_string(), Tracked(drops.clone()));
        assert_eq!(drops.get(), 1, "replaced value dropped exactly once");
        assert_eq!(t.len(), 1);
        t.release();
        assert_eq!(drops.get(), 2);
    }

    #[test]
    fn overwrite_replaces_stored_key() {
        // Keys equal by `Eq` but distinguishable through a payload.
        #[derive(Debug)]
        struct K(&'static str, u32);
        impl PartialEq for K {
            fn eq(&self, other: &Self) -> bool {
                self.0 == other.0
            }
        }
        impl Eq for K {}

        let mut t = GenericTable::with_hasher(|k: &K, _seed: u64| k.0.len() as u64);
        t.add(K("a", 1), 1);
        t.add(K("a", 2), 2);
        let mut c = t.cursor();
        assert!(c.next());
        assert_eq!(c.key().map(|k| k.1), Some(2));
        assert_eq!(c.value(), Some(&2));
        assert!(!c.next());
    }

    #[test]
    fn remove_present_and_absent() {
        let mut t = GenericTable::with_hasher(sum_hash);
        t.add("a".to_string(), 1);
        t.add("b".to_string(), 2);
        assert!(t.remove(&"a".to_string()));
        assert!(!t.contains(&"a".to_string()));
        assert_eq!(t.len(), 1);

        assert!(!t.remove(&"zzz".to_string()));
        assert_eq!(t.len(), 1);
        assert_eq!(t.get(&"b".to_string()), Some(&2));
    }

    #[test]
    fn take_hands_back_ownership() {
        let mut t = GenericTable::new();
        t.add("k".to_string(), vec![1, 2, 3]);
        assert_eq!(t.take("k"), Some(("k".to_string(), vec![1, 2, 3])));
        assert_eq!(t.take("k"), None);
    }

    #[test]
    fn borrowed_lookup_with_default_hasher() {
        let mut t: GenericTable<String, i32> = GenericTable::new();
        t.add("hello".to_string(), 1);
        assert!(t.contains("hello"));
        assert!(!t.contains("world"));
        *t.get_mut("hello").unwrap() += 1;
        assert_eq!(t.get("hello"), Some(&2));
    }

    #[test]
    fn growth_happens_one_add_past_threshold() {
        let mut t = GenericTable::with_seed_and_hasher(3, |k: &u32, seed: u64| u64::from(*k) ^ seed);
        for k in 0..12 {
            t.add(k, k);
        }
        assert_eq!(t.bucket_count(), 16);
        t.add(12, 12);
        assert_eq!(t.bucket_count(), 32);
        t.raw.check_invariants();
    }

    #[test]
    fn overwrite_can_trigger_growth() {
        let mut t = GenericTable::with_seed_and_hasher(0, |k: &u32, _: u64| u64::from(*k));
        for k in 0..12 {
            t.add(k, 0);
        }
        assert_eq!(t.bucket_count(), 16);
        // Count is 12 > 11, so even an overwrite grows first.
        t.add(0, 1);
        assert_eq!(t.len(), 12);
        assert_eq!(t.bucket_count(), 32);
        assert_eq!(t.get(&0), Some(&1));
    }

    #[test]
    fn constant_hash_resolves_by_equality() {
        let mut t = GenericTable::with_hasher(|_: &String, _: u64| 0u64);
        for k in ["a", "b", "c", "d"] {
            t.add(k.to_string(), k.to_uppercase());
        }
        for k in ["a", "b", "c", "d"] {
            assert_eq!(t.get(&k.to_string()), Some(&k.to_uppercase()));
        }
        assert!(t.remove(&"b".to_string()));
        assert!(t.contains(&"a".to_string()));
        assert!(t.contains(&"c".to_string()));
        assert!(!t.contains(&"b".to_string()));
        t.raw.check_invariants();
    }

    #[test]
    fn clear_drops_everything_and_keeps_buckets() {
        let drops = Rc::new(Cell::new(0));
        let mut t = GenericTable::new();
        for k in 0..50 {
            t.add(k, Tracked(drops.clone()));
        }
        let buckets = t.bucket_count();
        t.clear();
        assert_eq!(drops.get(), 50);
        assert!(t.is_empty());
        assert_eq!(t.bucket_count(), buckets);
        t.add(1, Tracked(drops.clone()));
        assert_eq!(t.len(), 1);
    }

    #[test]
    fn iter_and_iter_mut_visit_every_entry() {
        let mut t: GenericTable<u32, u32> = (0..100).map(|k| (k, k)).collect();
        assert_eq!(t.iter().len(), 100);
        for (_, v) in t.iter_mut() {
            *v += 1;
        }
        let seen: BTreeSet<(u32, u32)> = t.iter().map(|(k, v)| (*k, *v)).collect();
        let expected: BTreeSet<(u32, u32)> = (0..100).map(|k| (k, k + 1)).collect();
        assert_eq!(seen, expected);
        assert_eq!((&t).into_iter().count(), 100);
    }

    #[test]
    fn debug_lists_entries() {
        let mut t = GenericTable::new();
        t.add("only", 1);
        assert_eq!(format!("{t:?}"), r#"{"only": 1}"#);
    }
}
