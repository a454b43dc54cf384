//! Public container facades
//!
//! Four ordered containers sharing one sorted-sequence engine: maps pair a
//! key column with a value column through a tied sequence, sets sort a
//! single column. The `Flat`/`FlatMulti` split is the duplicate-key policy;
//! everything else is shared.

pub mod flat_map;
pub mod flat_multimap;
pub mod flat_multiset;
pub mod flat_set;

pub use flat_map::FlatMap;
pub use flat_multimap::FlatMultimap;
pub use flat_multiset::FlatMultiset;
pub use flat_set::FlatSet;

use crate::engine::{Comparator, DupPolicy, SortedSeq};
use crate::error::Result;
use crate::tied::Sequence;

/// Shared merge loop: drain `source`, absorb each element into `dest`, and
/// push rejects back to `source` in their original (sorted) order, so both
/// sides stay sorted throughout.
pub(crate) fn merge_into<S, C, P, S2, C2, P2>(
    dest: &mut SortedSeq<S, C, P>,
    source: &mut SortedSeq<S2, C2, P2>,
) -> Result<()>
where
    S: Sequence,
    S2: Sequence<Element = S::Element, Key = S::Key>,
    C: Comparator<S::Key>,
    C2: Comparator<S::Key>,
    P: DupPolicy,
    P2: DupPolicy,
{
    let drained = source.extract_sequence();
    // reserving both sides up front keeps the per-element steps from
    // failing halfway through the move
    dest.reserve(drained.len())?;
    source.reserve(drained.len())?;
    for element in drained.into_elements() {
        if let Some(rejected) = dest.absorb(element)? {
            source.sequence_mut().push(rejected)?;
        }
    }
    Ok(())
}
