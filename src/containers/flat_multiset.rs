//! FlatMultiset: duplicate-element ordered set over a single sorted column
//!
//! Equal elements form a contiguous run and keep their insertion order.

use std::collections::BTreeSet;
use std::fmt;
use std::ops::Range;

use crate::engine::{Comparator, Multi, NaturalOrder, NodeHandle, QueryComparator, SortedSeq};
use crate::error::Result;
use crate::storage::Storage;
use crate::tied::Column;

use super::flat_set::FlatSet;
use super::merge_into;

/// Ordered set allowing duplicate elements, stored as one sorted column.
///
/// # Examples
///
/// ```rust
/// use seqmap::FlatMultiset;
///
/// let mut fs = FlatMultiset::new();
/// fs.insert(2)?;
/// fs.insert(2)?;
/// fs.insert(1)?;
///
/// assert_eq!(fs.count(&2), 2);
/// assert_eq!(fs.iter().copied().collect::<Vec<_>>(), vec![1, 2, 2]);
/// # Ok::<(), seqmap::SeqMapError>(())
/// ```
pub struct FlatMultiset<T, C = NaturalOrder, S = Vec<T>> {
    engine: SortedSeq<Column<T, S>, C, Multi>,
}

// Constructors that would leave the comparator parameter unconstrained live
// on the defaulted type, like HashMap::new pinning RandomState.
impl<T: Ord> FlatMultiset<T> {
    /// Creates an empty multiset ordered by `Ord`
    pub fn new() -> Self {
        FlatMultiset {
            engine: SortedSeq::new(NaturalOrder),
        }
    }

    /// Creates an empty multiset with room for `capacity` elements
    pub fn with_capacity(capacity: usize) -> Result<Self> {
        let mut set = Self::new();
        set.reserve(capacity)?;
        Ok(set)
    }
}

impl<T: Ord, S: Storage<T>> FlatMultiset<T, NaturalOrder, S> {
    /// Adopts an unordered storage, stably sorting it on construction;
    /// every element survives
    pub fn from_unsorted_storage(storage: S) -> Result<Self> {
        Self::from_unsorted_storage_with(storage, NaturalOrder)
    }

    /// Adopts a storage the caller asserts is already sorted, duplicates
    /// allowed (debug-asserted only)
    pub fn from_sorted_storage_unchecked(storage: S) -> Self {
        Self::from_sorted_storage_unchecked_with(storage, NaturalOrder)
    }
}

impl<T, C, S> FlatMultiset<T, C, S>
where
    C: Comparator<T>,
    S: Storage<T>,
{
    /// Creates an empty multiset ordered by `cmp`
    pub fn with_comparator(cmp: C) -> Self {
        FlatMultiset {
            engine: SortedSeq::new(cmp),
        }
    }

    /// [`FlatMultiset::from_unsorted_storage`] with an explicit comparator
    pub fn from_unsorted_storage_with(storage: S, cmp: C) -> Result<Self> {
        Ok(FlatMultiset {
            engine: SortedSeq::from_unsorted(Column::from_storage(storage), cmp)?,
        })
    }

    /// [`FlatMultiset::from_sorted_storage_unchecked`] with an explicit comparator
    pub fn from_sorted_storage_unchecked_with(storage: S, cmp: C) -> Self {
        FlatMultiset {
            engine: SortedSeq::from_sorted_unchecked(Column::from_storage(storage), cmp),
        }
    }

    /// Number of elements in the multiset
    #[inline]
    pub fn len(&self) -> usize {
        self.engine.len()
    }

    /// True when the multiset holds no elements
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.engine.is_empty()
    }

    /// Elements the multiset can hold before the storage reallocates
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

    /// The comparator ordering this multiset
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

    /// The contiguous position range of elements matching `query`
    pub fn equal_range<Q>(&self, query: &Q) -> Range<usize>
    where
        Q: ?Sized,
        C: QueryComparator<T, Q>,
    {
        self.engine.equal_range(query)
    }

    /// Position of the first element matching `query`, if any
    pub fn find<Q>(&self, query: &Q) -> Option<usize>
    where
        Q: ?Sized,
        C: QueryComparator<T, Q>,
    {
        self.engine.find(query)
    }

    /// Number of elements matching `query`
    pub fn count<Q>(&self, query: &Q) -> usize
    where
        Q: ?Sized,
        C: QueryComparator<T, Q>,
    {
        self.engine.count(query)
    }

    /// Whether any element matches `query`
    pub fn contains<Q>(&self, query: &Q) -> bool
    where
        Q: ?Sized,
        C: QueryComparator<T, Q>,
    {
        self.engine.contains(query)
    }

    /// The first stored element matching `query`, if any
    pub fn get<Q>(&self, query: &Q) -> Option<&T>
    where
        Q: ?Sized,
        C: QueryComparator<T, Q>,
    {
        let pos = self.engine.find(query)?;
        self.engine.get(pos)
    }

    /// Iterator over every element matching `query`
    pub fn get_all<'a, Q>(&'a self, query: &Q) -> impl Iterator<Item = &'a T> + 'a
    where
        Q: ?Sized,
        C: QueryComparator<T, Q>,
    {
        let range = self.engine.equal_range(query);
        self.iter().skip(range.start).take(range.len())
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

    /// Inserts `element` at the end of its equal run, returning the position
    pub fn insert(&mut self, element: T) -> Result<usize> {
        let (pos, _) = self.engine.insert(element)?;
        Ok(pos)
    }

    /// Inserts with a position hint; a helpful hint may place the element
    /// anywhere inside its equal run
    pub fn insert_hint(&mut self, hint: usize, element: T) -> Result<usize> {
        let (pos, _) = self.engine.insert_hint(hint, element)?;
        Ok(pos)
    }

    /// Bulk-inserts elements the caller asserts are already sorted; every
    /// element survives. Returns the number inserted.
    pub fn insert_sorted<I>(&mut self, iter: I) -> Result<usize>
    where
        I: IntoIterator<Item = T>,
    {
        self.engine.insert_sorted(iter)
    }

    /// Removes every element matching `query`, returning how many
    pub fn remove_all<Q>(&mut self, query: &Q) -> usize
    where
        Q: ?Sized,
        C: QueryComparator<T, Q>,
    {
        self.engine.erase_key(query)
    }

    /// Removes and returns the first element matching `query`
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

    /// Detaches the first element matching `query` into a node handle
    pub fn extract<Q>(&mut self, query: &Q) -> NodeHandle<T>
    where
        Q: ?Sized,
        C: QueryComparator<T, Q>,
    {
        self.engine.extract_key(query)
    }

    /// Reinserts a detached node; in a multiset this always succeeds.
    /// Returns the position and the spent handle.
    pub fn insert_node(&mut self, node: NodeHandle<T>) -> Result<(usize, bool, NodeHandle<T>)> {
        self.engine.insert_node(node)
    }

    /// Moves every element out of `source`; nothing is ever rejected
    pub fn merge<C2, S2>(&mut self, source: &mut FlatMultiset<T, C2, S2>) -> Result<()>
    where
        C2: Comparator<T>,
        S2: Storage<T>,
    {
        merge_into(&mut self.engine, source.engine_mut())
    }

    /// Moves every element out of a unique set into this multiset
    pub fn merge_set<C2, S2>(&mut self, source: &mut FlatSet<T, C2, S2>) -> Result<()>
    where
        C2: Comparator<T>,
        S2: Storage<T>,
    {
        merge_into(&mut self.engine, source.engine_mut())
    }

    /// Moves every element out of a standard tree set into this multiset
    pub fn merge_btree(&mut self, source: &mut BTreeSet<T>) -> Result<()>
    where
        T: Ord,
    {
        let drained = std::mem::take(source);
        self.engine.reserve(drained.len())?;
        for element in drained {
            self.engine.absorb(element)?;
        }
        Ok(())
    }

    /// Iterator over the elements in order (duplicates included)
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

    /// Moves the backing storage out, leaving the multiset empty
    pub fn extract_storage(&mut self) -> S {
        self.engine.extract_sequence().into_storage()
    }

    /// Consumes the multiset, yielding the backing storage
    pub fn into_storage(self) -> S {
        self.engine.into_sequence().into_storage()
    }

    /// Adopts `storage` as the new backing column; it must already be
    /// sorted (debug-asserted), duplicates allowed
    pub fn replace_storage(&mut self, storage: S) {
        self.engine.replace_sequence(Column::from_storage(storage));
    }

    pub(crate) fn engine_mut(&mut self) -> &mut SortedSeq<Column<T, S>, C, Multi> {
        &mut self.engine
    }
}

/// Removes every element satisfying `pred`, returning the count removed.
pub fn erase_if<T, C, S, F>(set: &mut FlatMultiset<T, C, S>, pred: F) -> usize
where
    C: Comparator<T>,
    S: Storage<T>,
    F: FnMut(&T) -> bool,
{
    let mut pred = pred;
    set.retain(|t| !pred(t))
}

impl<T, C, S> Default for FlatMultiset<T, C, S>
where
    C: Comparator<T> + Default,
    S: Storage<T>,
{
    fn default() -> Self {
        Self::with_comparator(C::default())
    }
}

impl<T, C, S> Clone for FlatMultiset<T, C, S>
where
    C: Clone,
    S: Clone,
{
    fn clone(&self) -> Self {
        FlatMultiset {
            engine: self.engine.clone(),
        }
    }
}

impl<T, C, S> fmt::Debug for FlatMultiset<T, C, S>
where
    T: fmt::Debug,
    C: Comparator<T>,
    S: Storage<T>,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl<T, C, S> PartialEq for FlatMultiset<T, C, S>
where
    T: PartialEq,
    C: Comparator<T>,
    S: Storage<T>,
{
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl<T, C, S> Eq for FlatMultiset<T, C, S>
where
    T: Eq,
    C: Comparator<T>,
    S: Storage<T>,
{
}

impl<T, C, S> PartialOrd for FlatMultiset<T, C, S>
where
    T: PartialOrd,
    C: Comparator<T>,
    S: Storage<T>,
{
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        self.iter().partial_cmp(other.iter())
    }
}

impl<T, C, S> Ord for FlatMultiset<T, C, S>
where
    T: Ord,
    C: Comparator<T>,
    S: Storage<T>,
{
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.iter().cmp(other.iter())
    }
}

impl<T, C, S> FromIterator<T> for FlatMultiset<T, C, S>
where
    C: Comparator<T> + Default,
    S: Storage<T>,
{
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        use crate::tied::Sequence;
        let mut column: Column<T, S> = Column::new();
        for element in iter {
            column
                .push(element)
                .expect("allocation failed building FlatMultiset");
        }
        FlatMultiset {
            engine: SortedSeq::from_unsorted(column, C::default())
                .expect("allocation failed building FlatMultiset"),
        }
    }
}

impl<T, C, S> Extend<T> for FlatMultiset<T, C, S>
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

impl<'a, T, C, S> IntoIterator for &'a FlatMultiset<T, C, S>
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

impl<T, C, S> IntoIterator for FlatMultiset<T, C, S>
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
impl<T, C, S> serde::Serialize for FlatMultiset<T, C, S>
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
impl<'de, T, C, S> serde::Deserialize<'de> for FlatMultiset<T, C, S>
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
            type Value = FlatMultiset<T, C, S>;

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
                Ok(FlatMultiset { engine })
            }
        }

        deserializer.deserialize_seq(SetVisitor(PhantomData))
    }
}
