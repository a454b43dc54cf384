//! FlatMultimap: duplicate-key ordered map over a sorted tied sequence
//!
//! Same representation as [`FlatMap`](crate::FlatMap) — two sorted columns —
//! but keys may repeat. Equal keys form a contiguous run, and within a run
//! pairs keep their insertion order: a plain insert lands at the end of its
//! run, and a helpful hint can place a pair anywhere inside it.

use std::collections::BTreeMap;
use std::fmt;
use std::ops::Range;

use crate::engine::{Comparator, Multi, NaturalOrder, NodeHandle, QueryComparator, SortedSeq};
use crate::error::Result;
use crate::storage::Storage;
use crate::tied::TiedSequence;
use crate::zip::Zip;

use super::flat_map::FlatMap;
use super::merge_into;

/// Ordered map allowing duplicate keys, stored as a sorted pair of columns.
///
/// # Examples
///
/// ```rust
/// use seqmap::FlatMultimap;
///
/// let mut fm = FlatMultimap::new();
/// fm.insert(1, "first")?;
/// fm.insert(1, "second")?;
/// fm.insert(0, "zero")?;
///
/// assert_eq!(fm.count(&1), 2);
/// let ones: Vec<_> = fm.get_all(&1).map(|(_, v)| *v).collect();
/// assert_eq!(ones, vec!["first", "second"]);
/// # Ok::<(), seqmap::SeqMapError>(())
/// ```
pub struct FlatMultimap<K, V, C = NaturalOrder, SK = Vec<K>, SV = Vec<V>> {
    engine: SortedSeq<TiedSequence<K, V, SK, SV>, C, Multi>,
}

// Constructors that would leave the comparator parameter unconstrained live
// on the defaulted type, like HashMap::new pinning RandomState.
impl<K: Ord, V> FlatMultimap<K, V> {
    /// Creates an empty multimap ordered by `Ord`
    pub fn new() -> Self {
        FlatMultimap {
            engine: SortedSeq::new(NaturalOrder),
        }
    }

    /// Creates an empty multimap with room for `capacity` pairs
    pub fn with_capacity(capacity: usize) -> Result<Self> {
        let mut map = Self::new();
        map.reserve(capacity)?;
        Ok(map)
    }
}

impl<K: Ord, V, SK, SV> FlatMultimap<K, V, NaturalOrder, SK, SV>
where
    SK: Storage<K>,
    SV: Storage<V>,
{
    /// Adopts two unordered columns, sorting them on construction. Unlike
    /// the unique-key map every pair survives; equal keys keep their
    /// original relative order (the sort is stable).
    pub fn from_unsorted_columns(keys: SK, values: SV) -> Result<Self> {
        Self::from_unsorted_columns_with(keys, values, NaturalOrder)
    }

    /// Adopts two columns the caller asserts are already sorted (duplicates
    /// allowed). Sortedness is only debug-asserted; the length check still
    /// applies.
    pub fn from_sorted_columns_unchecked(keys: SK, values: SV) -> Result<Self> {
        Self::from_sorted_columns_unchecked_with(keys, values, NaturalOrder)
    }
}

impl<K, V, C, SK, SV> FlatMultimap<K, V, C, SK, SV>
where
    C: Comparator<K>,
    SK: Storage<K>,
    SV: Storage<V>,
{
    /// Creates an empty multimap ordered by `cmp`
    pub fn with_comparator(cmp: C) -> Self {
        FlatMultimap {
            engine: SortedSeq::new(cmp),
        }
    }

    /// [`FlatMultimap::from_unsorted_columns`] with an explicit comparator
    pub fn from_unsorted_columns_with(keys: SK, values: SV, cmp: C) -> Result<Self> {
        let tied = TiedSequence::from_columns(keys, values)?;
        Ok(FlatMultimap {
            engine: SortedSeq::from_unsorted(tied, cmp)?,
        })
    }

    /// [`FlatMultimap::from_sorted_columns_unchecked`] with an explicit comparator
    pub fn from_sorted_columns_unchecked_with(keys: SK, values: SV, cmp: C) -> Result<Self> {
        let tied = TiedSequence::from_columns(keys, values)?;
        Ok(FlatMultimap {
            engine: SortedSeq::from_sorted_unchecked(tied, cmp),
        })
    }

    /// Number of pairs in the multimap
    #[inline]
    pub fn len(&self) -> usize {
        self.engine.len()
    }

    /// True when the multimap holds no pairs
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.engine.is_empty()
    }

    /// Pairs the multimap can hold before either column reallocates
    pub fn capacity(&self) -> usize {
        self.engine.sequence().capacity()
    }

    /// Reserves room for `additional` more pairs
    pub fn reserve(&mut self, additional: usize) -> Result<()> {
        self.engine.reserve(additional)
    }

    /// Removes all pairs
    pub fn clear(&mut self) {
        self.engine.clear()
    }

    /// The comparator ordering this multimap
    pub fn comparator(&self) -> &C {
        self.engine.comparator()
    }

    /// First position whose key is not less than `query`
    pub fn lower_bound<Q>(&self, query: &Q) -> usize
    where
        Q: ?Sized,
        C: QueryComparator<K, Q>,
    {
        self.engine.lower_bound(query)
    }

    /// First position whose key is greater than `query`
    pub fn upper_bound<Q>(&self, query: &Q) -> usize
    where
        Q: ?Sized,
        C: QueryComparator<K, Q>,
    {
        self.engine.upper_bound(query)
    }

    /// The contiguous position range of pairs matching `query`
    pub fn equal_range<Q>(&self, query: &Q) -> Range<usize>
    where
        Q: ?Sized,
        C: QueryComparator<K, Q>,
    {
        self.engine.equal_range(query)
    }

    /// Position of the first pair matching `query`, if any
    pub fn find<Q>(&self, query: &Q) -> Option<usize>
    where
        Q: ?Sized,
        C: QueryComparator<K, Q>,
    {
        self.engine.find(query)
    }

    /// Number of pairs matching `query`
    pub fn count<Q>(&self, query: &Q) -> usize
    where
        Q: ?Sized,
        C: QueryComparator<K, Q>,
    {
        self.engine.count(query)
    }

    /// Whether any pair matches `query`
    pub fn contains_key<Q>(&self, query: &Q) -> bool
    where
        Q: ?Sized,
        C: QueryComparator<K, Q>,
    {
        self.engine.contains(query)
    }

    /// Value of the first pair matching `query`, if any
    pub fn get<Q>(&self, query: &Q) -> Option<&V>
    where
        Q: ?Sized,
        C: QueryComparator<K, Q>,
    {
        let pos = self.engine.find(query)?;
        self.engine.sequence().value_at(pos)
    }

    /// Iterator over every pair matching `query`, in insertion order within
    /// the equal-key run
    pub fn get_all<'a, Q>(&'a self, query: &Q) -> impl Iterator<Item = (&'a K, &'a V)> + 'a
    where
        Q: ?Sized,
        C: QueryComparator<K, Q>,
    {
        let range = self.engine.equal_range(query);
        self.iter().skip(range.start).take(range.len())
    }

    /// Pair at position `index`
    pub fn get_index(&self, index: usize) -> Option<(&K, &V)> {
        self.engine.get(index)
    }

    /// Pair at position `index`, or
    /// [`SeqMapError::OutOfBounds`](crate::SeqMapError::OutOfBounds) when
    /// `index >= len()`
    pub fn at_index(&self, index: usize) -> Result<(&K, &V)> {
        self.engine.sequence().at(index)
    }

    /// Inserts `(key, value)` at the end of its equal-key run, returning the
    /// position. Insertion never fails for key reasons in a multimap.
    pub fn insert(&mut self, key: K, value: V) -> Result<usize> {
        let (pos, _) = self.engine.insert((key, value))?;
        Ok(pos)
    }

    /// Inserts with a position hint. A helpful hint may place the pair
    /// anywhere inside its equal-key run (that is the hint's privilege);
    /// an unhelpful hint degrades to [`FlatMultimap::insert`].
    pub fn insert_hint(&mut self, hint: usize, key: K, value: V) -> Result<usize> {
        let (pos, _) = self.engine.insert_hint(hint, (key, value))?;
        Ok(pos)
    }

    /// Bulk-inserts pairs the caller asserts are already sorted; every pair
    /// survives. Returns the number inserted.
    pub fn insert_sorted<I>(&mut self, iter: I) -> Result<usize>
    where
        I: IntoIterator<Item = (K, V)>,
    {
        self.engine.insert_sorted(iter)
    }

    /// Removes every pair matching `query`, returning how many were removed
    pub fn remove_all<Q>(&mut self, query: &Q) -> usize
    where
        Q: ?Sized,
        C: QueryComparator<K, Q>,
    {
        self.engine.erase_key(query)
    }

    /// Removes the first pair matching `query`, returning it
    pub fn remove_entry<Q>(&mut self, query: &Q) -> Option<(K, V)>
    where
        Q: ?Sized,
        C: QueryComparator<K, Q>,
    {
        let pos = self.engine.find(query)?;
        Some(self.engine.erase_at(pos))
    }

    /// Removes and returns the pair at position `index`
    ///
    /// # Panics
    ///
    /// Panics if `index >= len()`.
    pub fn remove_index(&mut self, index: usize) -> (K, V) {
        self.engine.erase_at(index)
    }

    /// Removes every pair in the position `range`
    pub fn remove_range(&mut self, range: Range<usize>) {
        self.engine.erase_range(range)
    }

    /// Keeps only the pairs satisfying `pred`, returning the count removed
    pub fn retain<F>(&mut self, pred: F) -> usize
    where
        F: FnMut(&K, &mut V) -> bool,
    {
        self.engine.sequence_mut().retain(pred)
    }

    /// Detaches the first pair matching `query` into a node handle
    pub fn extract<Q>(&mut self, query: &Q) -> NodeHandle<(K, V)>
    where
        Q: ?Sized,
        C: QueryComparator<K, Q>,
    {
        self.engine.extract_key(query)
    }

    /// Reinserts a detached node; in a multimap this always succeeds and the
    /// returned handle is empty (unless the incoming node was). Returns the
    /// position and the spent handle.
    pub fn insert_node(
        &mut self,
        node: NodeHandle<(K, V)>,
    ) -> Result<(usize, bool, NodeHandle<(K, V)>)> {
        self.engine.insert_node(node)
    }

    /// Moves every pair out of `source` into this multimap; `source` is left
    /// empty. Nothing is ever rejected.
    pub fn merge<C2, SK2, SV2>(
        &mut self,
        source: &mut FlatMultimap<K, V, C2, SK2, SV2>,
    ) -> Result<()>
    where
        C2: Comparator<K>,
        SK2: Storage<K>,
        SV2: Storage<V>,
    {
        merge_into(&mut self.engine, source.engine_mut())
    }

    /// Moves every pair out of a unique-key map into this multimap
    pub fn merge_map<C2, SK2, SV2>(
        &mut self,
        source: &mut FlatMap<K, V, C2, SK2, SV2>,
    ) -> Result<()>
    where
        C2: Comparator<K>,
        SK2: Storage<K>,
        SV2: Storage<V>,
    {
        merge_into(&mut self.engine, source.engine_mut())
    }

    /// Moves every pair out of a standard tree map into this multimap
    pub fn merge_btree(&mut self, source: &mut BTreeMap<K, V>) -> Result<()>
    where
        K: Ord,
    {
        let drained = std::mem::take(source);
        self.engine.reserve(drained.len())?;
        for pair in drained {
            self.engine.absorb(pair)?;
        }
        Ok(())
    }

    /// Lockstep iterator over `(&K, &V)` pairs in key order
    pub fn iter(&self) -> Zip<SK::Iter<'_>, SV::Iter<'_>> {
        self.engine.sequence().iter()
    }

    /// Iterator over the keys in order (duplicates included)
    pub fn keys(&self) -> SK::Iter<'_> {
        self.engine.sequence().keys()
    }

    /// Iterator over the values in key order
    pub fn values(&self) -> SV::Iter<'_> {
        self.engine.sequence().values()
    }

    /// Mutable iterator over the values in key order
    pub fn values_mut(&mut self) -> SV::IterMut<'_> {
        self.engine.sequence_mut().values_mut()
    }

    /// Read-only escape hatch: the backing tied sequence
    pub fn as_tied(&self) -> &TiedSequence<K, V, SK, SV> {
        self.engine.sequence()
    }

    /// Read-only escape hatch: both backing columns
    pub fn columns(&self) -> (&SK, &SV) {
        self.engine.sequence().columns()
    }

    /// Moves the backing columns out, leaving the multimap empty
    pub fn extract_columns(&mut self) -> (SK, SV) {
        self.engine.extract_sequence().into_columns()
    }

    /// Consumes the multimap, yielding the backing columns
    pub fn into_columns(self) -> (SK, SV) {
        self.engine.into_sequence().into_columns()
    }

    /// Adopts `keys`/`values` as the new backing columns; they must already
    /// be sorted (debug-asserted), duplicates allowed.
    pub fn replace_columns(&mut self, keys: SK, values: SV) -> Result<()> {
        let tied = TiedSequence::from_columns(keys, values)?;
        self.engine.replace_sequence(tied);
        Ok(())
    }

    pub(crate) fn engine_mut(
        &mut self,
    ) -> &mut SortedSeq<TiedSequence<K, V, SK, SV>, C, Multi> {
        &mut self.engine
    }
}

/// Removes every pair satisfying `pred`, returning the count removed.
pub fn erase_if<K, V, C, SK, SV, F>(map: &mut FlatMultimap<K, V, C, SK, SV>, mut pred: F) -> usize
where
    C: Comparator<K>,
    SK: Storage<K>,
    SV: Storage<V>,
    F: FnMut((&K, &V)) -> bool,
{
    map.retain(|k, v| !pred((k, &*v)))
}

impl<K, V, C, SK, SV> Default for FlatMultimap<K, V, C, SK, SV>
where
    C: Comparator<K> + Default,
    SK: Storage<K>,
    SV: Storage<V>,
{
    fn default() -> Self {
        Self::with_comparator(C::default())
    }
}

impl<K, V, C, SK, SV> Clone for FlatMultimap<K, V, C, SK, SV>
where
    C: Clone,
    SK: Clone,
    SV: Clone,
{
    fn clone(&self) -> Self {
        FlatMultimap {
            engine: self.engine.clone(),
        }
    }
}

impl<K, V, C, SK, SV> fmt::Debug for FlatMultimap<K, V, C, SK, SV>
where
    K: fmt::Debug,
    V: fmt::Debug,
    C: Comparator<K>,
    SK: Storage<K>,
    SV: Storage<V>,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K, V, C, SK, SV> PartialEq for FlatMultimap<K, V, C, SK, SV>
where
    K: PartialEq,
    V: PartialEq,
    C: Comparator<K>,
    SK: Storage<K>,
    SV: Storage<V>,
{
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl<K, V, C, SK, SV> Eq for FlatMultimap<K, V, C, SK, SV>
where
    K: Eq,
    V: Eq,
    C: Comparator<K>,
    SK: Storage<K>,
    SV: Storage<V>,
{
}

impl<K, V, C, SK, SV> PartialOrd for FlatMultimap<K, V, C, SK, SV>
where
    K: PartialOrd,
    V: PartialOrd,
    C: Comparator<K>,
    SK: Storage<K>,
    SV: Storage<V>,
{
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        self.iter().partial_cmp(other.iter())
    }
}

impl<K, V, C, SK, SV> Ord for FlatMultimap<K, V, C, SK, SV>
where
    K: Ord,
    V: Ord,
    C: Comparator<K>,
    SK: Storage<K>,
    SV: Storage<V>,
{
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.iter().cmp(other.iter())
    }
}

impl<K, V, C, SK, SV> FromIterator<(K, V)> for FlatMultimap<K, V, C, SK, SV>
where
    C: Comparator<K> + Default,
    SK: Storage<K>,
    SV: Storage<V>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut tied: TiedSequence<K, V, SK, SV> = TiedSequence::new();
        for pair in iter {
            tied.push(pair)
                .expect("allocation failed building FlatMultimap");
        }
        FlatMultimap {
            engine: SortedSeq::from_unsorted(tied, C::default())
                .expect("allocation failed building FlatMultimap"),
        }
    }
}

impl<K, V, C, SK, SV> Extend<(K, V)> for FlatMultimap<K, V, C, SK, SV>
where
    C: Comparator<K>,
    SK: Storage<K>,
    SV: Storage<V>,
{
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.insert(key, value).expect("allocation failed in extend");
        }
    }
}

impl<'a, K, V, C, SK, SV> IntoIterator for &'a FlatMultimap<K, V, C, SK, SV>
where
    C: Comparator<K>,
    SK: Storage<K>,
    SV: Storage<V>,
{
    type Item = (&'a K, &'a V);
    type IntoIter = Zip<SK::Iter<'a>, SV::Iter<'a>>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<K, V, C, SK, SV> IntoIterator for FlatMultimap<K, V, C, SK, SV>
where
    C: Comparator<K>,
    SK: Storage<K>,
    SV: Storage<V>,
{
    type Item = (K, V);
    type IntoIter = Zip<SK::IntoElements, SV::IntoElements>;

    fn into_iter(self) -> Self::IntoIter {
        let (keys, values) = self.engine.into_sequence().into_columns();
        Zip::new(keys.into_elements(), values.into_elements())
    }
}

#[cfg(feature = "serde")]
impl<K, V, C, SK, SV> serde::Serialize for FlatMultimap<K, V, C, SK, SV>
where
    K: serde::Serialize,
    V: serde::Serialize,
    C: Comparator<K>,
    SK: Storage<K>,
    SV: Storage<V>,
{
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        // duplicate keys rule out the map data model; a multimap is a
        // sequence of pairs on the wire
        serializer.collect_seq(self.iter())
    }
}

#[cfg(feature = "serde")]
impl<'de, K, V, C, SK, SV> serde::Deserialize<'de> for FlatMultimap<K, V, C, SK, SV>
where
    K: serde::Deserialize<'de>,
    V: serde::Deserialize<'de>,
    C: Comparator<K> + Default,
    SK: Storage<K>,
    SV: Storage<V>,
{
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        use std::marker::PhantomData;

        struct SeqVisitor<K, V, C, SK, SV>(PhantomData<(K, V, C, SK, SV)>);

        impl<'de, K, V, C, SK, SV> serde::de::Visitor<'de> for SeqVisitor<K, V, C, SK, SV>
        where
            K: serde::Deserialize<'de>,
            V: serde::Deserialize<'de>,
            C: Comparator<K> + Default,
            SK: Storage<K>,
            SV: Storage<V>,
        {
            type Value = FlatMultimap<K, V, C, SK, SV>;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a sequence of key-value pairs")
            }

            fn visit_seq<A>(self, mut access: A) -> std::result::Result<Self::Value, A::Error>
            where
                A: serde::de::SeqAccess<'de>,
            {
                let mut tied: TiedSequence<K, V, SK, SV> = TiedSequence::new();
                while let Some(pair) = access.next_element::<(K, V)>()? {
                    tied.push(pair).map_err(serde::de::Error::custom)?;
                }
                let engine = SortedSeq::from_unsorted(tied, C::default())
                    .map_err(serde::de::Error::custom)?;
                Ok(FlatMultimap { engine })
            }
        }

        deserializer.deserialize_seq(SeqVisitor(PhantomData))
    }
}
