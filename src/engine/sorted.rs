//! Sorted-sequence engine: the tree-emulation core
//!
//! [`SortedSeq`] keeps a [`Sequence`] in comparator order and implements the
//! full associative-container operation set over it with binary search:
//! the lookup family, hint-qualified insertion, bulk sorted insertion, node
//! extraction/insertion, and the merge primitive. One generic engine serves
//! all four public facades; the [`Unique`]/[`Multi`] policy tag selects the
//! duplicate-key behavior at compile time and the sequence's `key_of` is the
//! key-extraction strategy.
//!
//! Invariant between public calls: keys ascend under the comparator —
//! strictly for [`Unique`] (no two keys compare equal), non-strictly for
//! [`Multi`], where runs of equal keys keep insertion order.

use std::cmp::Ordering;
use std::marker::PhantomData;
use std::ops::Range;

use crate::engine::comparator::{Comparator, QueryComparator};
use crate::engine::node::NodeHandle;
use crate::error::Result;
use crate::tied::Sequence;

/// Duplicate-key policy selected at compile time.
pub trait DupPolicy {
    /// Whether equal keys may coexist
    const ALLOWS_DUPLICATES: bool;
}

/// Unique-key policy: an insert colliding with an existing key is rejected.
#[derive(Debug, Default, Clone, Copy)]
pub struct Unique;

/// Multi-key policy: equal keys coexist, runs keep insertion order.
#[derive(Debug, Default, Clone, Copy)]
pub struct Multi;

impl DupPolicy for Unique {
    const ALLOWS_DUPLICATES: bool = false;
}

impl DupPolicy for Multi {
    const ALLOWS_DUPLICATES: bool = true;
}

enum InsertPosition {
    /// Key already present at this index (unique policy only)
    Existing(usize),
    /// Insert before this index
    At(usize),
}

/// A sequence maintained in comparator order, emulating a balanced tree.
///
/// Positions are `usize` indices into the sequence. Any growing operation
/// may relocate the whole sequence, so previously obtained positions are
/// invalidated by mutation — the documented cost of the cache-friendly
/// representation.
pub struct SortedSeq<S, C, P> {
    seq: S,
    cmp: C,
    _policy: PhantomData<P>,
}

impl<S, C, P> SortedSeq<S, C, P>
where
    S: Sequence,
    C: Comparator<S::Key>,
    P: DupPolicy,
{
    /// Creates an empty engine with `cmp` as the ordering
    pub fn new(cmp: C) -> Self {
        SortedSeq {
            seq: S::default(),
            cmp,
            _policy: PhantomData,
        }
    }

    /// Adopts `seq` trusting the caller that it is already sorted (and
    /// deduplicated, under [`Unique`]).
    ///
    /// Sortedness is a documented precondition, checked only by a debug
    /// assertion; violating it makes every subsequent lookup meaningless.
    pub fn from_sorted_unchecked(seq: S, cmp: C) -> Self {
        let engine = SortedSeq {
            seq,
            cmp,
            _policy: PhantomData,
        };
        debug_assert!(engine.is_sorted());
        engine
    }

    /// Adopts `seq`, sorting it (stably) and, under [`Unique`], keeping the
    /// first occurrence of each equal-key run.
    pub fn from_unsorted(seq: S, cmp: C) -> Result<Self> {
        let mut elements: Vec<S::Element> = seq.into_elements().collect();
        elements.sort_by(|a, b| cmp.cmp_keys(S::key_of(a), S::key_of(b)));

        let mut seq = S::default();
        seq.reserve(elements.len())?;
        for element in elements {
            let duplicate = !P::ALLOWS_DUPLICATES
                && match seq.len().checked_sub(1).and_then(|last| seq.key_at(last)) {
                    Some(last_key) => {
                        cmp.cmp_keys(last_key, S::key_of(&element)) == Ordering::Equal
                    }
                    None => false,
                };
            if !duplicate {
                seq.push(element)?;
            }
        }
        Ok(SortedSeq {
            seq,
            cmp,
            _policy: PhantomData,
        })
    }

    /// Number of elements
    #[inline]
    pub fn len(&self) -> usize {
        self.seq.len()
    }

    /// True when no elements are stored
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.seq.is_empty()
    }

    /// Removes all elements
    pub fn clear(&mut self) {
        self.seq.clear()
    }

    /// Reserves room for `additional` more elements
    pub fn reserve(&mut self, additional: usize) -> Result<()> {
        self.seq.reserve(additional)
    }

    /// The comparator this engine orders by
    pub fn comparator(&self) -> &C {
        &self.cmp
    }

    /// Read-only access to the backing sequence
    pub fn sequence(&self) -> &S {
        &self.seq
    }

    /// Mutable access for facades; value-only mutation must not reorder keys
    pub(crate) fn sequence_mut(&mut self) -> &mut S {
        &mut self.seq
    }

    /// Consumes the engine, yielding the backing sequence
    pub fn into_sequence(self) -> S {
        self.seq
    }

    /// Moves the backing sequence out, leaving the engine empty
    pub fn extract_sequence(&mut self) -> S {
        std::mem::take(&mut self.seq)
    }

    /// Adopts `seq` as the new backing sequence.
    ///
    /// Sortedness (and uniqueness, under [`Unique`]) is a documented
    /// precondition, checked only by a debug assertion.
    pub fn replace_sequence(&mut self, seq: S) {
        self.seq = seq;
        debug_assert!(self.is_sorted());
    }

    /// Borrowed view of the element at `index`
    #[inline]
    pub fn get(&self, index: usize) -> Option<S::Ref<'_>> {
        self.seq.get(index)
    }

    /// Key of the element at `index`
    #[inline]
    pub fn key_at(&self, index: usize) -> Option<&S::Key> {
        self.seq.key_at(index)
    }

    /// Whether the invariant currently holds; used by debug assertions
    pub fn is_sorted(&self) -> bool {
        for i in 1..self.seq.len() {
            let ordered = match (self.seq.key_at(i - 1), self.seq.key_at(i)) {
                (Some(a), Some(b)) => match self.cmp.cmp_keys(a, b) {
                    Ordering::Less => true,
                    Ordering::Equal => P::ALLOWS_DUPLICATES,
                    Ordering::Greater => false,
                },
                _ => false,
            };
            if !ordered {
                return false;
            }
        }
        true
    }

    /// First index for which `pred(key)` is false; `pred` must be monotone
    /// (true prefix, false suffix) over the sorted keys.
    fn partition_point<F>(&self, mut pred: F) -> usize
    where
        F: FnMut(&S::Key) -> bool,
    {
        let mut lo = 0;
        let mut hi = self.seq.len();
        while lo < hi {
            let mid = lo + (hi - lo) / 2;
            let go_right = match self.seq.key_at(mid) {
                Some(key) => pred(key),
                None => false,
            };
            if go_right {
                lo = mid + 1;
            } else {
                hi = mid;
            }
        }
        lo
    }

    /// First position whose key is not less than `query`
    pub fn lower_bound<Q>(&self, query: &Q) -> usize
    where
        Q: ?Sized,
        C: QueryComparator<S::Key, Q>,
    {
        self.partition_point(|key| self.cmp.cmp_key_query(key, query) == Ordering::Less)
    }

    /// First position whose key is greater than `query`
    pub fn upper_bound<Q>(&self, query: &Q) -> usize
    where
        Q: ?Sized,
        C: QueryComparator<S::Key, Q>,
    {
        self.partition_point(|key| self.cmp.cmp_key_query(key, query) != Ordering::Greater)
    }

    /// The `[lower_bound, upper_bound)` range of positions matching `query`
    pub fn equal_range<Q>(&self, query: &Q) -> Range<usize>
    where
        Q: ?Sized,
        C: QueryComparator<S::Key, Q>,
    {
        self.lower_bound(query)..self.upper_bound(query)
    }

    /// Position of the first element matching `query`, if any
    pub fn find<Q>(&self, query: &Q) -> Option<usize>
    where
        Q: ?Sized,
        C: QueryComparator<S::Key, Q>,
    {
        let pos = self.lower_bound(query);
        match self.seq.key_at(pos) {
            Some(key) if self.cmp.cmp_key_query(key, query) == Ordering::Equal => Some(pos),
            _ => None,
        }
    }

    /// Number of elements matching `query` (0 or 1 under [`Unique`])
    pub fn count<Q>(&self, query: &Q) -> usize
    where
        Q: ?Sized,
        C: QueryComparator<S::Key, Q>,
    {
        let range = self.equal_range(query);
        range.end - range.start
    }

    /// Whether any element matches `query`
    pub fn contains<Q>(&self, query: &Q) -> bool
    where
        Q: ?Sized,
        C: QueryComparator<S::Key, Q>,
    {
        self.find(query).is_some()
    }

    fn lower_bound_key(&self, key: &S::Key) -> usize {
        self.partition_point(|k| self.cmp.cmp_keys(k, key) == Ordering::Less)
    }

    fn upper_bound_key(&self, key: &S::Key) -> usize {
        self.partition_point(|k| self.cmp.cmp_keys(k, key) != Ordering::Greater)
    }

    /// Position of the first element whose key equals `key`, compared with
    /// the plain key comparator (no transparent-query support required).
    pub fn find_key(&self, key: &S::Key) -> Option<usize> {
        let pos = self.lower_bound_key(key);
        match self.seq.key_at(pos) {
            Some(existing) if self.cmp.cmp_keys(existing, key) == Ordering::Equal => Some(pos),
            _ => None,
        }
    }

    fn insert_position(&self, key: &S::Key) -> InsertPosition {
        if P::ALLOWS_DUPLICATES {
            // upper_bound keeps equal-key runs in insertion order
            InsertPosition::At(self.upper_bound_key(key))
        } else {
            let pos = self.lower_bound_key(key);
            match self.seq.key_at(pos) {
                Some(existing) if self.cmp.cmp_keys(existing, key) == Ordering::Equal => {
                    InsertPosition::Existing(pos)
                }
                _ => InsertPosition::At(pos),
            }
        }
    }

    /// Inserts `element` at its sorted position.
    ///
    /// Returns `(position, true)` on insertion. Under [`Unique`] a colliding
    /// key yields `(existing_position, false)` without mutation, and the new
    /// element is dropped (the container keeps the original).
    pub fn insert(&mut self, element: S::Element) -> Result<(usize, bool)> {
        match self.insert_position(S::key_of(&element)) {
            InsertPosition::Existing(pos) => Ok((pos, false)),
            InsertPosition::At(pos) => {
                self.seq.insert_at(pos, element)?;
                Ok((pos, true))
            }
        }
    }

    /// Inserts `element`, using `hint` to skip the binary search when it
    /// already denotes a valid sorted insertion point.
    ///
    /// A helpful hint (neighbors bracket the new key) makes positioning O(1);
    /// an unhelpful one falls back to [`SortedSeq::insert`] — never an error.
    /// The outcome is identical either way, only the cost differs.
    pub fn insert_hint(&mut self, hint: usize, element: S::Element) -> Result<(usize, bool)> {
        let len = self.seq.len();
        let hint = hint.min(len);
        let key = S::key_of(&element);

        let prev_ok = match hint.checked_sub(1).and_then(|prev| self.seq.key_at(prev)) {
            Some(prev_key) => match self.cmp.cmp_keys(prev_key, key) {
                Ordering::Less => true,
                Ordering::Equal => P::ALLOWS_DUPLICATES,
                Ordering::Greater => false,
            },
            None => true,
        };
        let at_hint = if hint < len { self.seq.key_at(hint) } else { None };
        let next_cmp = at_hint.map(|hint_key| self.cmp.cmp_keys(hint_key, key));
        let next_ok = !matches!(next_cmp, Some(Ordering::Less));

        if prev_ok && next_ok {
            if !P::ALLOWS_DUPLICATES && next_cmp == Some(Ordering::Equal) {
                return Ok((hint, false));
            }
            self.seq.insert_at(hint, element)?;
            return Ok((hint, true));
        }
        self.insert(element)
    }

    /// Bulk-inserts a range the caller asserts is already sorted by this
    /// engine's comparator, merging in a single forward pass.
    ///
    /// Returns the number of elements inserted (duplicates are dropped under
    /// [`Unique`], matching single-element insert). Unsorted input is a
    /// documented precondition violation.
    pub fn insert_sorted<I>(&mut self, iter: I) -> Result<usize>
    where
        I: IntoIterator<Item = S::Element>,
    {
        let mut pos = 0;
        let mut inserted = 0;
        for element in iter {
            let key = S::key_of(&element);
            while let Some(existing) = self.seq.key_at(pos) {
                let advance = match self.cmp.cmp_keys(existing, key) {
                    Ordering::Less => true,
                    Ordering::Equal => P::ALLOWS_DUPLICATES,
                    Ordering::Greater => false,
                };
                if !advance {
                    break;
                }
                pos += 1;
            }
            if !P::ALLOWS_DUPLICATES {
                if let Some(existing) = self.seq.key_at(pos) {
                    if self.cmp.cmp_keys(existing, key) == Ordering::Equal {
                        continue;
                    }
                }
            }
            self.seq.insert_at(pos, element)?;
            pos += 1;
            inserted += 1;
        }
        Ok(inserted)
    }

    /// Merge primitive: inserts `element`, or hands it back when the key is
    /// already present under [`Unique`] so the source container keeps it.
    pub fn absorb(&mut self, element: S::Element) -> Result<Option<S::Element>> {
        match self.insert_position(S::key_of(&element)) {
            InsertPosition::Existing(_) => Ok(Some(element)),
            InsertPosition::At(pos) => {
                self.seq.insert_at(pos, element)?;
                Ok(None)
            }
        }
    }

    /// Reinserts a detached node.
    ///
    /// On success the returned handle is empty; on a [`Unique`] collision the
    /// element stays in the handle, so the caller retains ownership.
    /// Returns `(position, inserted, handle)`.
    pub fn insert_node(
        &mut self,
        mut node: NodeHandle<S::Element>,
    ) -> Result<(usize, bool, NodeHandle<S::Element>)> {
        let element = match node.take() {
            Some(element) => element,
            None => return Ok((self.seq.len(), false, node)),
        };
        match self.insert_position(S::key_of(&element)) {
            InsertPosition::Existing(pos) => Ok((pos, false, NodeHandle::new(element))),
            InsertPosition::At(pos) => {
                self.seq.insert_at(pos, element)?;
                Ok((pos, true, NodeHandle::empty()))
            }
        }
    }

    /// Removes every element matching `query`, returning the count removed
    pub fn erase_key<Q>(&mut self, query: &Q) -> usize
    where
        Q: ?Sized,
        C: QueryComparator<S::Key, Q>,
    {
        let range = self.equal_range(query);
        let removed = range.end - range.start;
        self.seq.remove_range(range);
        removed
    }

    /// Removes and returns the element at `index`
    ///
    /// # Panics
    ///
    /// Panics if `index >= len()`.
    pub fn erase_at(&mut self, index: usize) -> S::Element {
        self.seq.remove_at(index)
    }

    /// Removes every element in `range` of positions
    pub fn erase_range(&mut self, range: Range<usize>) {
        self.seq.remove_range(range)
    }

    /// Detaches the first element matching `query` into a node handle; the
    /// handle is empty when no element matches.
    pub fn extract_key<Q>(&mut self, query: &Q) -> NodeHandle<S::Element>
    where
        Q: ?Sized,
        C: QueryComparator<S::Key, Q>,
    {
        match self.find(query) {
            Some(pos) => NodeHandle::new(self.seq.remove_at(pos)),
            None => NodeHandle::empty(),
        }
    }

    /// Detaches the element at `index` into a node handle; empty when out of
    /// range.
    pub fn extract_at(&mut self, index: usize) -> NodeHandle<S::Element> {
        if index < self.seq.len() {
            NodeHandle::new(self.seq.remove_at(index))
        } else {
            NodeHandle::empty()
        }
    }
}

impl<S, C, P> Clone for SortedSeq<S, C, P>
where
    S: Clone,
    C: Clone,
{
    fn clone(&self) -> Self {
        SortedSeq {
            seq: self.seq.clone(),
            cmp: self.cmp.clone(),
            _policy: PhantomData,
        }
    }
}

impl<S, C, P> Default for SortedSeq<S, C, P>
where
    S: Sequence,
    C: Comparator<S::Key> + Default,
    P: DupPolicy,
{
    fn default() -> Self {
        Self::new(C::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::comparator::NaturalOrder;
    use crate::tied::{Column, TiedSequence};

    type UniqueMap = SortedSeq<TiedSequence<i32, i32>, NaturalOrder, Unique>;
    type MultiSet = SortedSeq<Column<i32>, NaturalOrder, Multi>;

    fn sample_map() -> UniqueMap {
        let mut m = UniqueMap::new(NaturalOrder);
        for (k, v) in [(0, 1), (2, 3), (4, 5), (6, 7)] {
            m.insert((k, v)).unwrap();
        }
        m
    }

    #[test]
    fn test_lookup_family() {
        let m = sample_map();
        assert_eq!(m.lower_bound(&2), 1);
        assert_eq!(m.lower_bound(&3), 2);
        assert_eq!(m.upper_bound(&2), 2);
        assert_eq!(m.equal_range(&2), 1..2);
        assert_eq!(m.equal_range(&3), 2..2);
        assert_eq!(m.find(&4), Some(2));
        assert_eq!(m.find(&5), None);
        assert_eq!(m.count(&6), 1);
        assert!(m.contains(&0));
        assert!(!m.contains(&1));
    }

    #[test]
    fn test_unique_insert_rejects_duplicate() {
        let mut m = sample_map();
        let (pos, inserted) = m.insert((2, 5)).unwrap();
        assert_eq!((pos, inserted), (1, false));
        assert_eq!(m.len(), 4);
        assert_eq!(m.get(1), Some((&2, &3)));
    }

    #[test]
    fn test_hint_helpful_and_annoying() {
        // helpful hint: sequential keys inserted at the end
        let mut m = UniqueMap::new(NaturalOrder);
        for k in 0..100 {
            let (pos, inserted) = m.insert_hint(m.len(), (k, k)).unwrap();
            assert!(inserted);
            assert_eq!(pos, k as usize);
        }
        assert!(m.is_sorted());

        // annoying hints: every position, same outcome as plain insert
        for hint in 0..=4 {
            let mut m = sample_map();
            let (pos, inserted) = m.insert_hint(hint, (3, 30)).unwrap();
            assert!(inserted);
            assert_eq!(m.key_at(pos), Some(&3));
            assert!(m.is_sorted());
            assert_eq!(m.len(), 5);
        }
        for hint in 0..=4 {
            let mut m = sample_map();
            let (_, inserted) = m.insert_hint(hint, (2, 99)).unwrap();
            assert!(!inserted);
            assert_eq!(m.len(), 4);
            assert_eq!(m.get(1), Some((&2, &3)));
        }
    }

    #[test]
    fn test_multi_insert_is_stable() {
        let mut m: SortedSeq<TiedSequence<i32, i32>, NaturalOrder, Multi> =
            SortedSeq::new(NaturalOrder);
        m.insert((1, 10)).unwrap();
        m.insert((1, 20)).unwrap();
        m.insert((0, 0)).unwrap();
        m.insert((1, 30)).unwrap();
        let values: Vec<i32> = m.sequence().values().copied().collect();
        assert_eq!(values, vec![0, 10, 20, 30]);
    }

    #[test]
    fn test_insert_sorted_merges() {
        let mut m = sample_map();
        let n = m.insert_sorted(vec![(1, 1), (2, 9), (5, 5)]).unwrap();
        assert_eq!(n, 2); // (2, 9) dropped as duplicate
        let keys: Vec<i32> = m.sequence().keys().copied().collect();
        assert_eq!(keys, vec![0, 1, 2, 4, 5, 6]);
        assert_eq!(m.get(2), Some((&2, &3)));
    }

    #[test]
    fn test_erase_key_and_range() {
        let mut m = sample_map();
        assert_eq!(m.erase_key(&2), 1);
        assert_eq!(m.erase_key(&2), 0);
        assert_eq!(m.len(), 3);
        m.erase_range(0..2);
        let keys: Vec<i32> = m.sequence().keys().copied().collect();
        assert_eq!(keys, vec![6]);
    }

    #[test]
    fn test_extract_and_reinsert_node() {
        let mut m = sample_map();
        let node = m.extract_key(&2);
        assert_eq!(node.as_ref(), Some(&(2, 3)));
        assert_eq!(m.len(), 3);

        let missing = m.extract_key(&5);
        assert!(missing.is_empty());
        assert_eq!(m.len(), 3);

        let (pos, inserted, rest) = m.insert_node(node).unwrap();
        assert!(inserted);
        assert!(rest.is_empty());
        assert_eq!(m.key_at(pos), Some(&2));

        // rejected reinsertion keeps the element in the handle
        let (_, inserted, rest) = m.insert_node(NodeHandle::new((2, 99))).unwrap();
        assert!(!inserted);
        assert_eq!(rest.as_ref(), Some(&(2, 99)));
    }

    #[test]
    fn test_extract_at_bounds() {
        let mut m = sample_map();
        let node = m.extract_at(1);
        assert_eq!(node.as_ref(), Some(&(2, 3)));
        assert_eq!(m.len(), 3);

        let out_of_range = m.extract_at(10);
        assert!(out_of_range.is_empty());
        assert_eq!(m.len(), 3);
    }

    #[test]
    fn test_absorb() {
        let mut m = sample_map();
        assert!(m.absorb((1, 1)).unwrap().is_none());
        assert_eq!(m.absorb((2, 9)).unwrap(), Some((2, 9)));
        assert_eq!(m.len(), 5);
    }

    #[test]
    fn test_from_unsorted_dedups_keeping_first() {
        let mut ts: TiedSequence<i32, i32> = TiedSequence::new();
        for (k, v) in [(3, 30), (1, 10), (3, 99), (2, 20)] {
            ts.push((k, v)).unwrap();
        }
        let m: UniqueMap = SortedSeq::from_unsorted(ts, NaturalOrder).unwrap();
        let pairs: Vec<(i32, i32)> = m.sequence().iter().map(|(k, v)| (*k, *v)).collect();
        assert_eq!(pairs, vec![(1, 10), (2, 20), (3, 30)]);
    }

    #[test]
    fn test_multiset_on_column() {
        let mut s = MultiSet::new(NaturalOrder);
        for k in [5, 1, 5, 3] {
            s.insert(k).unwrap();
        }
        assert_eq!(s.count(&5), 2);
        assert_eq!(s.erase_key(&5), 2);
        assert_eq!(s.len(), 2);
        assert!(s.is_sorted());
    }

    #[test]
    fn test_transparent_lookup() {
        let mut m: SortedSeq<TiedSequence<String, i32>, NaturalOrder, Unique> =
            SortedSeq::new(NaturalOrder);
        m.insert(("apple".to_string(), 1)).unwrap();
        m.insert(("pear".to_string(), 2)).unwrap();
        // query by &str against String keys
        assert!(m.contains("apple"));
        assert_eq!(m.find("pear"), Some(1));
        assert_eq!(m.find("plum"), None);
    }
}
