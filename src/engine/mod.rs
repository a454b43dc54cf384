//! Sorted-sequence engine
//!
//! The shared tree-emulation core behind the public container facades:
//! comparators (including transparent queries), detached node handles, and
//! the [`SortedSeq`] engine with its duplicate-key policy tags.

mod comparator;
mod node;
mod sorted;

pub use comparator::{Comparator, FnComparator, NaturalOrder, QueryComparator};
pub use node::NodeHandle;
pub use sorted::{DupPolicy, Multi, SortedSeq, Unique};
