//! # Seqmap: Sorted-Sequence Associative Containers
//!
//! This crate provides ordered maps and sets backed by sorted contiguous
//! sequences instead of node-based trees, trading shifting insertions for
//! dense storage, cache-friendly binary search, and zero per-element
//! overhead.
//!
//! ## Key Features
//!
//! - **Four Containers**: `FlatMap`, `FlatMultimap`, `FlatSet`, and
//!   `FlatMultiset` sharing one sorted-sequence engine
//! - **Columnar Maps**: Keys and values live in two independently chosen
//!   storages tied into lockstep, so key scans never touch value memory
//! - **Pluggable Storage**: Any backing that implements [`Storage`]
//!   (`Vec` and `VecDeque` out of the box) per column
//! - **Transparent Lookups**: Query a `FlatMap<String, _>` with `&str`
//!   without allocating, the same convention as `BTreeMap`
//! - **Hinted Insertion**: A correct position hint turns an insert's search
//!   cost constant; a wrong hint only costs the regular binary search
//! - **Node Handles**: Detach an element, hold it outside any container,
//!   and reinsert it without losing ownership on rejection
//! - **Fallible Allocation**: Growing operations report
//!   [`SeqMapError::AllocationFailed`] instead of aborting
//!
//! ## Quick Start
//!
//! ```rust
//! use seqmap::{FlatMap, FlatSet};
//!
//! let mut map = FlatMap::new();
//! map.insert(2, "two")?;
//! map.insert(0, "zero")?;
//! map.insert(4, "four")?;
//!
//! // always iterates in key order
//! let keys: Vec<i32> = map.keys().copied().collect();
//! assert_eq!(keys, vec![0, 2, 4]);
//!
//! // transparent lookup on string keys
//! let mut names: FlatMap<String, u32> = FlatMap::new();
//! names.insert("alice".to_string(), 1)?;
//! assert_eq!(names.get("alice"), Some(&1));
//!
//! // sets are the same engine over a single column
//! let set: FlatSet<i32> = [3, 1, 2, 1].into_iter().collect();
//! assert_eq!(set.iter().copied().collect::<Vec<_>>(), vec![1, 2, 3]);
//! # Ok::<(), seqmap::SeqMapError>(())
//! ```
//!
//! ## Iterator and Position Invalidation
//!
//! Positions are plain `usize` indices into the sorted sequence. Any
//! insertion or removal shifts the positions of every element after the
//! affected point, and a reallocation moves the whole sequence; positions
//! and references obtained before a mutation must not be reused after it.
//! This is the flat-container trade-off and it is intentional.

#![warn(missing_docs)]

pub mod containers;
pub mod engine;
pub mod error;
pub mod storage;
pub mod tied;
pub mod zip;

pub use containers::{FlatMap, FlatMultimap, FlatMultiset, FlatSet};
pub use engine::{
    Comparator, FnComparator, Multi, NaturalOrder, NodeHandle, QueryComparator, SortedSeq, Unique,
};
pub use error::{Result, SeqMapError};
pub use storage::Storage;
pub use tied::{Column, Sequence, TiedSequence};
pub use zip::Zip;

/// Version of the crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_public_api_surface() {
        let mut map: FlatMap<i32, &str> = FlatMap::new();
        map.insert(1, "one").unwrap();
        assert_eq!(map.get(&1), Some(&"one"));

        let mut set: FlatSet<i32> = FlatSet::new();
        set.insert(1).unwrap();
        assert!(set.contains(&1));

        let mut mm: FlatMultimap<i32, &str> = FlatMultimap::new();
        mm.insert(1, "a").unwrap();
        mm.insert(1, "b").unwrap();
        assert_eq!(mm.count(&1), 2);

        let mut ms: FlatMultiset<i32> = FlatMultiset::new();
        ms.insert(1).unwrap();
        ms.insert(1).unwrap();
        assert_eq!(ms.count(&1), 2);
    }
}
