//! hmap: chained hash tables that own their entries, with seeded hashing
//! and a string-keyed variant.
//!
//! Internal Design:
//!
//! Summary
//! - Goal: a small, embeddable associative container whose ownership and
//!   growth rules are exact: every inserted key and value is dropped exactly
//!   once, growth is a pure relink, and iteration cannot observe a table
//!   being changed.
//! - Layers:
//!   - RawTable<K, V>: the chaining engine. Bucket heads point into a
//!     `SlotMap` arena of entries linked by generational keys; each entry
//!     stores its hash. Includes a debug-only reentrancy guard.
//!   - GenericTable<K, V, H>: owned keys compared with `Eq` and hashed by a
//!     caller-supplied `SeededHash` (any `Fn(&K, u64) -> u64` works).
//!   - StringTable<V>: keys borrowed as `&str`, copied in, hashed with the
//!     seeded `djb2` function.
//!
//! Growth
//! - Tables start with 16 buckets (configurable through `Builder`).
//! - Before every insertion, if the entry count is above
//!   `floor(0.7 * bucket_count)`, the bucket array doubles and every entry
//!   is relinked by its stored hash. Because the check runs before the
//!   lookup, an insert that only overwrites can still grow the table.
//! - Tables never shrink, not on removal and not on `clear`.
//!
//! Ownership
//! - `add` takes ownership of key and value. Overwriting drops the previous
//!   key and value in `GenericTable`; `StringTable` keeps its stored key copy
//!   and drops only the previous value.
//! - `remove` drops the entry, `take` returns it; `release` or dropping the
//!   table drops everything left.
//!
//! Iteration
//! - `cursor()` offers an explicit cursor (`next`/`key`/`value`) positioned
//!   before the first entry; `iter()` is the same walk as an `Iterator`.
//! - Both borrow the table, so changing the table while iterating does not
//!   compile. Visiting order is unspecified and changes across growth.
//!
//! Seeds
//! - Each table carries its own seed, passed at creation or drawn from the
//!   standard library's random keys. There is no process-wide seed.
//!
//! Concurrency
//! - Single-threaded, no internal locking. Tables are `Send` when their
//!   contents are, and never `Sync`; wrap them in a mutex to share.
//!
//! Reentrancy
//! - Hash functions and `Eq` impls run while the table is guarded. Calling
//!   back into the same table from them panics in debug builds.
//!
//! Logging
//! - With the `logging` feature, growth is reported at debug level and
//!   creation/clearing at trace level through the `log` facade.

mod builder;
mod djb2;
mod error;
mod generic_table;
mod hasher;
mod raw;
mod reentrancy;
mod string_table;
mod table_proptest;

pub use builder::Builder;
pub use djb2::{djb2, djb2_bytes};
pub use error::ConfigError;
pub use generic_table::{GenericTable, IterMut};
pub use hasher::{random_seed, SeededHash, StdSeeded};
pub use raw::{Cursor, Iter};
pub use string_table::{StrCursor, StrIter, StrIterMut, StringTable};
