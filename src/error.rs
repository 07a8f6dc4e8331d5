/// The error type returned by [`Builder`](crate::Builder) when a table
/// configuration is rejected.
///
/// Table operations themselves never fail: a missing key is reported as
/// `None` or `false`, and allocation failure aborts like any other Rust
/// collection.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// A table needs at least one bucket to place entries in.
    #[error("initial bucket count must be greater than zero")]
    ZeroBuckets,

    /// Growth doubles the bucket array, so the initial count must be a
    /// power of two.
    #[error("initial bucket count must be a power of two, got {0}")]
    NotPowerOfTwo(usize),
}
