//! FlatSet: unique-element ordered set over a single sorted column
//!
//! The element is its own key. One storage, binary-search lookups, shifting
//! insertions; the same engine as the maps with the value column gone.

use std::collections::BTreeSet;
use std::fmt;
use std::ops::Range;

use crate::engine::{Comparator, NaturalOrder, NodeHandle, QueryComparator, SortedSeq, Unique};
use crate::error::Result;
use crate::storage::Storage;
use crate::tied::Column;

use super::flat_multiset::FlatMultiset;
use super::merge_into;

/// Ordered set with unique elements, stored as one sorted column.
///
/// # Examples
///
/// ```rust
/// use seqmap::FlatSet;
///
/// let mut fs = FlatSet::new();
/// fs.insert(3)?;
/// fs.insert(1)?;
/// fs.insert(3)?; // duplicate, ignored
///
/// assert_eq!(fs.len(), 2);
/// assert_eq!(fs.iter().copied().collect::<Vec<_>>(), vec![1, 3]);
/// # Ok::<(), seqmap::SeqMapError>(())
/// ```
pub struct FlatSet<T, C = NaturalOrder, S = Vec<T>> {
    engine: SortedSeq<Column<T, S>, C, Unique>,
}

// Constructors that would leave the comparator parameter unconstrained live
// on the defaulted type, like HashMap::new pinning RandomState.
impl<T: Ord> FlatSet<T> {
    /// Creates an empty set ordered by `Ord`
    pub fn new() -> Self {
        FlatSet {
            engine: SortedSeq::new(NaturalOrder),
        }
    }

    /// Creates an empty set with room for `capacity` elements
    pub fn with_capacity(capacity: usize) -> Result<Self> {
        let mut set = Self::new();
        set.reserve(capacity)?;
        Ok(set)
    }
}

impl<T: Ord, S: Storage<T>> FlatSet<T, NaturalOrder, S> {
    /// Adopts an unordered storage: it is sorted on construction and
    /// deduplicated keeping the first occurrence of each element
    pub fn from_unsorted_storage(storage: S) -> Result<Self> {
        Self::from_unsorted_storage_with(storage, NaturalOrder)
    }

    /// Adopts a storage the caller asserts is already sorted with no
    /// duplicates (debug-asserted only)
    pub fn from_sorted_storage_unchecked(storage: S) -> Self {
        Self::from_sorted_storage_unchecked_with(storage, NaturalOrder)
    }
}

impl<T, C, S> FlatSet<T, C, S>
where
    C: Comparator<T>,
    S: Storage<T>,
{
    /// Creates an empty set ordered by `cmp`
    pub fn with_comparator(cmp: C) -> Self {
        FlatSet {
            engine: SortedSeq::new(cmp),
        }
    }

    /// [`FlatSet::from_unsorted_storage`] with an explicit comparator
    pub fn from_unsorted_storage_with(storage: S, cmp: C) -> Result<Self> {
        Ok(FlatSet {
            engine: SortedSeq::from_unsorted(Column::from_storage(storage), cmp)?,
        })
    }

    /// [`FlatSet::from_sorted_storage_unchecked`] with an explicit comparator
    pub fn from_sorted_storage_unchecked_with(storage: S, cmp: C) -> Self {
        FlatSet {
            engine: SortedSeq::from_sorted_unchecked(Column::from_storage(storage), cmp),
        }
    }

    /// Number of elements in the set
    #[inline]
    pub fn len(&self) -> usize {
        self.engine.len()
    }

    /// True when the set holds no elements
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.engine.is_empty()
    }

    /// Elements the set can hold before the storage reallocates
    pub fn capacity(&self) -> usize {
        self.engine.sequence().storage().capacity()
    }

    /// Reserves room for `additional` more elements
    pub fn reserve(&mut self, additional: usize) -> Result<()> {
        self.engine.reserve(additional)
    }

    /// Removes all elements
    pub fn clear(&mut self) {
        self.engine.clear()
    }

    /// The comparator ordering this set
    pub fn comparator(&self) -> &C {
        self.engine.comparator()
    }

    /// First position whose element is not less than `query`
    pub fn lower_bound<Q>(&self, query: &Q) -> usize
    where
        Q: ?Sized,
        C: QueryComparator<T, Q>,
    {
        self.engine.lower_bound(query)
    }

    /// First position whose element is greater than `query`
    pub fn upper_bound<Q>(&self, query: &Q) -> usize
    where
        Q: ?Sized,
        C: QueryComparator<T, Q>,
    {
        self.engine.upper_bound(query)
    }

    /// The `[lower_bound, upper_bound)` position range matching `query`;
    /// length 0 or 1 in a unique set
    pub fn equal_range<Q>(&self, query: &Q) -> Range<usize>
    where
        Q: ?Sized,
        C: QueryComparator<T, Q>,
    {
        self.engine.equal_range(query)
    }

    /// Position of the element matching `query`, if present
    pub fn find<Q>(&self, query: &Q) -> Option<usize>
    where
        Q: ?Sized,
        C: QueryComparator<T, Q>,
    {
        self.engine.find(query)
    }

    /// Number of elements matching `query` (0 or 1)
    pub fn count<Q>(&self, query: &Q) -> usize
    where
        Q: ?Sized,
        C: QueryComparator<T, Q>,
    {
        self.engine.count(query)
    }

    /// Whether an element matching `query` is present
    pub fn contains<Q>(&self, query: &Q) -> bool
    where
        Q: ?Sized,
        C: QueryComparator<T, Q>,
    {
        self.engine.contains(query)
    }

    /// The stored element matching `query`, if present
    pub fn get<Q>(&self, query: &Q) -> Option<&T>
    where
        Q: ?Sized,
        C: QueryComparator<T, Q>,
    {
        let pos = self.engine.find(query)?;
        self.engine.get(pos)
    }

    /// Element at position `index`
    pub fn get_index(&self, index: usize) -> Option<&T> {
        self.engine.get(index)
    }

    /// Element at position `index`, or
    /// [`SeqMapError::OutOfBounds`](crate::SeqMapError::OutOfBounds) when
    /// `index >= len()`
    pub fn at_index(&self, index: usize) -> Result<&T> {
        self.engine.sequence().at(index)
    }

    /// Inserts `element` at its sorted position.
    ///
    /// Returns `(position, true)` on insertion, `(existing_position, false)`
    /// without mutation when an equal element is already present.
    pub fn insert(&mut self, element: T) -> Result<(usize, bool)> {
        self.engine.insert(element)
    }

    /// Inserts with a position hint; a helpful hint skips the binary search
    /// and the outcome is identical either way
    pub fn insert_hint(&mut self, hint: usize, element: T) -> Result<(usize, bool)> {
        self.engine.insert_hint(hint, element)
    }

    /// Inserts `element`, or when an equal element is already present swaps
    /// it out and returns the old one. The set's length never changes on
    /// the replacement path.
    pub fn replace(&mut self, element: T) -> Result<Option<T>> {
        match self.engine.find_key(&element) {
            Some(pos) => {
                let old = self.engine.erase_at(pos);
                // same sort position, reinsertion cannot be rejected
                self.engine.insert(element)?;
                Ok(Some(old))
            }
            None => {
                self.engine.insert(element)?;
                Ok(None)
            }
        }
    }

    /// Bulk-inserts elements the caller asserts are already sorted;
    /// duplicates are dropped. Returns the number inserted.
    pub fn insert_sorted<I>(&mut self, iter: I) -> Result<usize>
    where
        I: IntoIterator<Item = T>,
    {
        self.engine.insert_sorted(iter)
    }

    /// Removes the element matching `query`, returning whether one was there
    pub fn remove<Q>(&mut self, query: &Q) -> bool
    where
        Q: ?Sized,
        C: QueryComparator<T, Q>,
    {
        self.take(query).is_some()
    }

    /// Removes and returns the element matching `query`
    pub fn take<Q>(&mut self, query: &Q) -> Option<T>
    where
        Q: ?Sized,
        C: QueryComparator<T, Q>,
    {
        let pos = self.engine.find(query)?;
        Some(self.engine.erase_at(pos))
    }

    /// Removes and returns the element at position `index`
    ///
    /// # Panics
    ///
    /// Panics if `index >= len()`.
    pub fn remove_index(&mut self, index: usize) -> T {
        self.engine.erase_at(index)
    }

    /// Removes every element in the position `range`
    pub fn remove_range(&mut self, range: Range<usize>) {
        self.engine.erase_range(range)
    }

    /// Keeps only the elements satisfying `pred`, returning the count removed
    pub fn retain<F>(&mut self, pred: F) -> usize
    where
        F: FnMut(&T) -> bool,
    {
        self.engine.sequence_mut().retain(pred)
    }

    /// Detaches the element matching `query` into a node handle
    pub fn extract<Q>(&mut self, query: &Q) -> NodeHandle<T>
    where
        Q: ?Sized,
        C: QueryComparator<T, Q>,
    {
        self.engine.extract_key(query)
    }

    /// Reinserts a detached node; on a duplicate the node keeps its element
    /// and is handed back. Returns `(position, inserted, handle)`.
    pub fn insert_node(&mut self, node: NodeHandle<T>) -> Result<(usize, bool, NodeHandle<T>)> {
        self.engine.insert_node(node)
    }

    /// Moves every element from `source` not already present here; equal
    /// elements stay behind in `source`.
    pub fn merge<C2, S2>(&mut self, source: &mut FlatSet<T, C2, S2>) -> Result<()>
    where
        C2: Comparator<T>,
        S2: Storage<T>,
    {
        merge_into(&mut self.engine, source.engine_mut())
    }

    /// Moves elements in from a multiset source: of each equal run the first
    /// element moves (when absent here) and the rest stay in `source`.
    pub fn merge_multiset<C2, S2>(&mut self, source: &mut FlatMultiset<T, C2, S2>) -> Result<()>
    where
        C2: Comparator<T>,
        S2: Storage<T>,
    {
        merge_into(&mut self.engine, source.engine_mut())
    }

    /// Moves every element from a standard tree set not already present
    /// here; the rest stay in `source`.
    pub fn merge_btree(&mut self, source: &mut BTreeSet<T>) -> Result<()>
    where
        T: Ord,
    {
        let drained = std::mem::take(source);
        self.engine.reserve(drained.len())?;
        for element in drained {
            if let Some(rejected) = self.engine.absorb(element)? {
                source.insert(rejected);
            }
        }
        Ok(())
    }

    /// Iterator over the elements in order
    pub fn iter(&self) -> S::Iter<'_> {
        self.engine.sequence().iter()
    }

    /// Read-only escape hatch: the backing column
    pub fn as_column(&self) -> &Column<T, S> {
        self.engine.sequence()
    }

    /// Read-only escape hatch: the backing storage
    pub fn storage(&self) -> &S {
        self.engine.sequence().storage()
    }

    /// Moves the backing storage out, leaving the set empty
    pub fn extract_storage(&mut self) -> S {
        self.engine.extract_sequence().into_storage()
    }

    /// Consumes the set, yielding the backing storage
    pub fn into_storage(self) -> S {
        self.engine.into_sequence().into_storage()
    }

    /// Adopts `storage` as the new backing column; it must already be
    /// sorted and deduplicated (debug-asserted)
    pub fn replace_storage(&mut self, storage: S) {
        self.engine.replace_sequence(Column::from_storage(storage));
    }

    pub(crate) fn engine_mut(&mut self) -> &mut SortedSeq<Column<T, S>, C, Unique> {
        &mut self.engine
    }
}

/// Removes every element satisfying `pred`, returning the count removed.
pub fn erase_if<T, C, S, F>(set: &mut FlatSet<T, C, S>, pred: F) -> usize
where
    C: Comparator<T>,
    S: Storage<T>,
    F: FnMut(&T) -> bool,
{
    let mut pred = pred;
    set.retain(|t| !pred(t))
}

impl<T, C, S> Default for FlatSet<T, C, S>
where
    C: Comparator<T> + Default,
    S: Storage<T>,
{
    fn default() -> Self {
        Self::with_comparator(C::default())
    }
}

impl<T, C, S> Clone for FlatSet<T, C, S>
where
    C: Clone,
    S: Clone,
{
    fn clone(&self) -> Self {
        FlatSet {
            engine: self.engine.clone(),
        }
    }
}

impl<T, C, S> fmt::Debug for FlatSet<T, C, S>
where
    T: fmt::Debug,
    C: Comparator<T>,
    S: Storage<T>,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl<T, C, S> PartialEq for FlatSet<T, C, S>
where
    T: PartialEq,
    C: Comparator<T>,
    S: Storage<T>,
{
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl<T, C, S> Eq for FlatSet<T, C, S>
where
    T: Eq,
    C: Comparator<T>,
    S: Storage<T>,
{
}

impl<T, C, S> PartialOrd for FlatSet<T, C, S>
where
    T: PartialOrd,
    C: Comparator<T>,
    S: Storage<T>,
{
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        self.iter().partial_cmp(other.iter())
    }
}

impl<T, C, S> Ord for FlatSet<T, C, S>
where
    T: Ord,
    C: Comparator<T>,
    S: Storage<T>,
{
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.iter().cmp(other.iter())
    }
}

impl<T, C, S> FromIterator<T> for FlatSet<T, C, S>
where
    C: Comparator<T> + Default,
    S: Storage<T>,
{
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut column: Column<T, S> = Column::new();
        for element in iter {
            use crate::tied::Sequence;
            column
                .push(element)
                .expect("allocation failed building FlatSet");
        }
        FlatSet {
            engine: SortedSeq::from_unsorted(column, C::default())
                .expect("allocation failed building FlatSet"),
        }
    }
}

impl<T, C, S> Extend<T> for FlatSet<T, C, S>
where
    C: Comparator<T>,
    S: Storage<T>,
{
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for element in iter {
            self.insert(element).expect("allocation failed in extend");
        }
    }
}

impl<'a, T, C, S> IntoIterator for &'a FlatSet<T, C, S>
where
    C: Comparator<T>,
    S: Storage<T>,
{
    type Item = &'a T;
    type IntoIter = S::Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<T, C, S> IntoIterator for FlatSet<T, C, S>
where
    C: Comparator<T>,
    S: Storage<T>,
{
    type Item = T;
    type IntoIter = S::IntoElements;

    fn into_iter(self) -> Self::IntoIter {
        self.engine.into_sequence().into_storage().into_elements()
    }
}

#[cfg(feature = "serde")]
impl<T, C, S> serde::Serialize for FlatSet<T, C, S>
where
    T: serde::Serialize,
    C: Comparator<T>,
    S: Storage<T>,
{
    fn serialize<Ser>(&self, serializer: Ser) -> std::result::Result<Ser::Ok, Ser::Error>
    where
        Ser: serde::Serializer,
    {
        serializer.collect_seq(self.iter())
    }
}

#[cfg(feature = "serde")]
impl<'de, T, C, S> serde::Deserialize<'de> for FlatSet<T, C, S>
where
    T: serde::Deserialize<'de>,
    C: Comparator<T> + Default,
    S: Storage<T>,
{
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        use std::marker::PhantomData;

        struct SetVisitor<T, C, S>(PhantomData<(T, C, S)>);

        impl<'de, T, C, S> serde::de::Visitor<'de> for SetVisitor<T, C, S>
        where
            T: serde::Deserialize<'de>,
            C: Comparator<T> + Default,
            S: Storage<T>,
        {
            type Value = FlatSet<T, C, S>;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a sequence of elements")
            }

            fn visit_seq<A>(self, mut access: A) -> std::result::Result<Self::Value, A::Error>
            where
                A: serde::de::SeqAccess<'de>,
            {
                use crate::tied::Sequence;
                let mut column: Column<T, S> = Column::new();
                while let Some(element) = access.next_element()? {
                    column.push(element).map_err(serde::de::Error::custom)?;
                }
                let engine = SortedSeq::from_unsorted(column, C::default())
                    .map_err(serde::de::Error::custom)?;
                Ok(FlatSet { engine })
            }
        }

        deserializer.deserialize_seq(SetVisitor(PhantomData))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> FlatSet<i32> {
        FlatSet::from_iter([0, 2, 4, 6])
    }

    #[test]
    fn test_duplicate_insert_ignored() {
        let mut fs = sample();
        let (pos, inserted) = fs.insert(2).unwrap();
        assert!(!inserted);
        assert_eq!(pos, 1);
        assert_eq!(fs.len(), 4);
    }

    #[test]
    fn test_lookup_family() {
        let fs = sample();
        assert!(fs.contains(&4));
        assert_eq!(fs.find(&4), Some(2));
        assert_eq!(fs.lower_bound(&3), 2);
        assert_eq!(fs.upper_bound(&4), 3);
        assert_eq!(fs.equal_range(&4), 2..3);
        assert_eq!(fs.get(&4), Some(&4));
        assert_eq!(fs.get(&5), None);
    }

    #[test]
    fn test_take_and_remove() {
        let mut fs = sample();
        assert_eq!(fs.take(&2), Some(2));
        assert_eq!(fs.take(&2), None);
        assert!(fs.remove(&0));
        assert!(!fs.remove(&0));
        assert_eq!(fs.len(), 2);
    }

    #[test]
    fn test_replace_swaps_equal_element() {
        // comparator that only inspects the first tuple field, so "equal"
        // elements can still differ in payload
        use crate::engine::FnComparator;
        let cmp = FnComparator(|a: &(i32, &str), b: &(i32, &str)| a.0.cmp(&b.0));
        let mut fs: FlatSet<(i32, &str), _> = FlatSet::with_comparator(cmp);
        fs.insert((1, "old")).unwrap();

        let old = fs.replace((1, "new")).unwrap();
        assert_eq!(old, Some((1, "old")));
        assert_eq!(fs.len(), 1);
        assert_eq!(fs.get_index(0), Some(&(1, "new")));
    }

    #[test]
    fn test_merge_keeps_rejects_in_source() {
        let mut a = sample();
        let mut b: FlatSet<i32> = FlatSet::from_iter([1, 2, 3]);
        a.merge(&mut b).unwrap();
        assert_eq!(a.iter().copied().collect::<Vec<_>>(), vec![0, 1, 2, 3, 4, 6]);
        assert_eq!(b.iter().copied().collect::<Vec<_>>(), vec![2]);
    }

    #[test]
    fn test_merge_btree() {
        let mut fs = sample();
        let mut src = BTreeSet::from([2, 5]);
        fs.merge_btree(&mut src).unwrap();
        assert!(fs.contains(&5));
        assert_eq!(fs.len(), 5);
        assert_eq!(src.iter().copied().collect::<Vec<_>>(), vec![2]);
    }

    #[test]
    fn test_erase_if_and_retain() {
        let mut fs = sample();
        let removed = erase_if(&mut fs, |t| *t < 4);
        assert_eq!(removed, 2);
        assert_eq!(fs.iter().copied().collect::<Vec<_>>(), vec![4, 6]);
    }

    #[test]
    fn test_storage_adoption_round_trip() {
        let fs: FlatSet<i32> = FlatSet::from_unsorted_storage(vec![3, 1, 2, 1]).unwrap();
        assert_eq!(fs.iter().copied().collect::<Vec<_>>(), vec![1, 2, 3]);

        let storage = fs.into_storage();
        let back: FlatSet<i32> = FlatSet::from_sorted_storage_unchecked(storage);
        assert_eq!(back.len(), 3);
    }

    #[test]
    fn test_transparent_str_lookup() {
        let mut fs: FlatSet<String> = FlatSet::new();
        fs.insert("apple".to_string()).unwrap();
        fs.insert("pear".to_string()).unwrap();
        assert!(fs.contains("apple"));
        assert_eq!(fs.take("pear"), Some("pear".to_string()));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_serde_round_trip() {
        let fs = sample();
        let json = serde_json::to_string(&fs).unwrap();
        let back: FlatSet<i32> = serde_json::from_str(&json).unwrap();
        assert_eq!(fs, back);
    }
}
