//! Deep duplication of runtime values.
//!
//! [`duplicate`] classifies a value, picks the strategy for its category and
//! recurses through the same dispatcher for nested members, so the copy can be
//! mutated without touching the original. Some kinds deliberately keep sharing
//! with the original: map and set entries, weak collections, the settled value
//! of a promise, and the buffer behind a data view.
//!
//! Known limitations:
//! - a duplicated function has the original's body but none of its captured
//!   bindings;
//! - cycles are not tracked; a cyclic value runs into the depth limit
//!   ([`DuplicateOptions::max_depth`]) and fails with
//!   [`ReplicaError::DepthExceeded`].

mod binary;
mod builtin;
mod callable;
mod collections;
mod container;
mod deferred;
pub mod dispatch;
pub mod options;
pub mod tag;

pub use dispatch::{duplicate, duplicate_with, Duplicator};
pub use options::{BufferSizing, DuplicateOptions, DEFAULT_MAX_DEPTH};
pub use replica_core::{ReplicaError, Value};
pub use tag::{classify, Classify, RuntimeClassifier, TypeTag};
