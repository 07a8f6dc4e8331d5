//! Seeded djb2 string hash used by [`StringTable`](crate::StringTable).

const DJB2_INIT: u64 = 5381;

/// Hashes `key` with djb2, offsetting the initial accumulator by `seed`.
///
/// Deterministic for a fixed seed; different seeds spread the same keys
/// over different buckets.
///
/// ```
/// use hmap::djb2;
///
/// assert_eq!(djb2("", 0), 5381);
/// assert_eq!(djb2("a", 0), (5381 * 33) ^ u64::from(b'a'));
/// ```
#[inline]
pub fn djb2(key: &str, seed: u64) -> u64 {
    djb2_bytes(key.as_bytes(), seed)
}

/// Byte-slice form of [`djb2`].
#[inline]
pub fn djb2_bytes(key: &[u8], seed: u64) -> u64 {
    key.iter().fold(DJB2_INIT.wrapping_add(seed), |acc, &b| {
        acc.wrapping_mul(33) ^ u64::from(b)
    })
}
