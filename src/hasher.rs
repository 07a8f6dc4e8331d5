//! Seeded hash functions for [`GenericTable`](crate::GenericTable).

use core::hash::{BuildHasher, Hash, Hasher};
use std::collections::hash_map::RandomState;

/// A hash function that mixes a per-table seed into the hash of a key.
///
/// Implemented for every `Fn(&Q, u64) -> u64`, so plain functions and
/// closures can be passed straight to
/// [`GenericTable::with_hasher`](crate::GenericTable::with_hasher).
///
/// Keys that compare equal must hash equal for the same seed.
pub trait SeededHash<Q: ?Sized> {
    fn hash(&self, key: &Q, seed: u64) -> u64;
}

impl<Q, F> SeededHash<Q> for F
where
    Q: ?Sized,
    F: Fn(&Q, u64) -> u64,
{
    #[inline]
    fn hash(&self, key: &Q, seed: u64) -> u64 {
        self(key, seed)
    }
}

/// Adapts a [`BuildHasher`] to [`SeededHash`] by feeding the seed ahead of
/// the key.
///
/// Works for any `Q: Hash`, so tables using it support borrowed lookups
/// (store `String`, query with `&str`).
#[derive(Clone, Debug, Default)]
pub struct StdSeeded<S = hashbrown::hash_map::DefaultHashBuilder>(pub S);

impl<S> StdSeeded<S> {
    pub fn new(build_hasher: S) -> Self {
        StdSeeded(build_hasher)
    }
}

impl<Q, S> SeededHash<Q> for StdSeeded<S>
where
    Q: ?Sized + Hash,
    S: BuildHasher,
{
    #[inline]
    fn hash(&self, key: &Q, seed: u64) -> u64 {
        let mut h = self.0.build_hasher();
        h.write_u64(seed);
        key.hash(&mut h);
        h.finish()
    }
}

/// Draws a fresh seed from the standard library's randomly keyed hasher.
///
/// Used by the constructors that do not take an explicit seed.
pub fn random_seed() -> u64 {
    RandomState::new().hash_one(0x5eed_u64)
}
