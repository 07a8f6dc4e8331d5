use crate::error::ConfigError;
use crate::hasher::{random_seed, SeededHash, StdSeeded};
use crate::raw::INITIAL_BUCKETS;
use crate::{GenericTable, StringTable};

use core::marker::PhantomData;

/// Builds a [`GenericTable`] or [`StringTable`] with a chosen seed and
/// initial bucket count.
///
/// # Examples
///
/// ```rust
/// use hmap::{GenericTable, StringTable};
///
/// let t: StringTable<u32> = StringTable::builder()
///     .seed(7)
///     .initial_buckets(64)
///     .build()
///     .unwrap();
/// assert_eq!(t.bucket_count(), 64);
/// assert_eq!(t.seed(), 7);
///
/// let g = GenericTable::<u32, &str>::builder()
///     .initial_buckets(4)
///     .build_with_hasher(|k: &u32, seed: u64| u64::from(*k) ^ seed)
///     .unwrap();
/// assert_eq!(g.bucket_count(), 4);
/// ```
///
/// Bucket counts must be nonzero powers of two:
///
/// ```rust
/// use hmap::{ConfigError, StringTable};
///
/// let err = StringTable::<()>::builder().initial_buckets(12).build().unwrap_err();
/// assert_eq!(err, ConfigError::NotPowerOfTwo(12));
/// ```
#[derive(Debug, Clone)]
pub struct Builder<T> {
    seed: Option<u64>,
    initial_buckets: usize,
    table_type: PhantomData<T>,
}

impl<T> Builder<T> {
    pub(crate) fn new() -> Self {
        Self {
            seed: None,
            initial_buckets: INITIAL_BUCKETS,
            table_type: PhantomData,
        }
    }

    /// Sets the hash seed. Without it, a random seed is drawn at build time.
    pub fn seed(self, seed: u64) -> Self {
        Self {
            seed: Some(seed),
            ..self
        }
    }

    /// Sets the number of buckets the table starts with (default 16).
    pub fn initial_buckets(self, count: usize) -> Self {
        Self {
            initial_buckets: count,
            ..self
        }
    }

    fn validate(&self) -> Result<(u64, usize), ConfigError> {
        match self.initial_buckets {
            0 => Err(ConfigError::ZeroBuckets),
            n if !n.is_power_of_two() => Err(ConfigError::NotPowerOfTwo(n)),
            n => Ok((self.seed.unwrap_or_else(random_seed), n)),
        }
    }
}

impl<K, V> Builder<GenericTable<K, V>>
where
    K: Eq + core::hash::Hash,
{
    /// Builds a table that hashes keys through their `Hash` impl.
    pub fn build(self) -> Result<GenericTable<K, V>, ConfigError> {
        self.build_with_hasher(StdSeeded::default())
    }

    /// Builds a table that hashes keys with `hasher`.
    pub fn build_with_hasher<H>(self, hasher: H) -> Result<GenericTable<K, V, H>, ConfigError>
    where
        H: SeededHash<K>,
    {
        let (seed, buckets) = self.validate()?;
        Ok(GenericTable::from_parts(seed, buckets, hasher))
    }
}

impl<V> Builder<StringTable<V>> {
    pub fn build(self) -> Result<StringTable<V>, ConfigError> {
        let (seed, buckets) = self.validate()?;
        Ok(StringTable::from_parts(seed, buckets))
    }
}
