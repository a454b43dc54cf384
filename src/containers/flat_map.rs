//! FlatMap: unique-key ordered map over a sorted tied sequence
//!
//! External contract of a tree map, internal representation of two sorted
//! columns (keys and values) in independently chosen storages. Lookups are
//! binary search over the key column; insertion shifts the tail of both
//! columns. References and positions are invalidated by any growing
//! operation — the documented trade for cache-friendly lookups and scans.

use std::collections::BTreeMap;
use std::fmt;
use std::ops::{Index, Range};

use crate::engine::{Comparator, NaturalOrder, NodeHandle, QueryComparator, SortedSeq, Unique};
use crate::error::{Result, SeqMapError};
use crate::storage::Storage;
use crate::tied::TiedSequence;
use crate::zip::Zip;

use super::flat_multimap::FlatMultimap;
use super::merge_into;

/// Ordered map with unique keys, stored as a sorted pair of columns.
///
/// `C` is the key comparator ([`NaturalOrder`] by default), `SK`/`SV` the
/// per-column storages (`Vec` by default; any [`Storage`] substitutes).
///
/// # Examples
///
/// ```rust
/// use seqmap::FlatMap;
///
/// let mut fm = FlatMap::new();
/// fm.insert(2, "two")?;
/// fm.insert(0, "zero")?;
/// fm.insert(4, "four")?;
///
/// assert_eq!(fm.get(&2), Some(&"two"));
/// assert!(fm.contains_key(&0));
/// assert_eq!(fm.keys().copied().collect::<Vec<_>>(), vec![0, 2, 4]);
/// # Ok::<(), seqmap::SeqMapError>(())
/// ```
pub struct FlatMap<K, V, C = NaturalOrder, SK = Vec<K>, SV = Vec<V>> {
    engine: SortedSeq<TiedSequence<K, V, SK, SV>, C, Unique>,
}

// Constructors that would leave the comparator parameter unconstrained live
// on the defaulted type, like HashMap::new pinning RandomState.
impl<K: Ord, V> FlatMap<K, V> {
    /// Creates an empty map ordered by `Ord`
    pub fn new() -> Self {
        FlatMap {
            engine: SortedSeq::new(NaturalOrder),
        }
    }

    /// Creates an empty map with room for `capacity` pairs
    pub fn with_capacity(capacity: usize) -> Result<Self> {
        let mut map = Self::new();
        map.reserve(capacity)?;
        Ok(map)
    }
}

impl<K: Ord, V, SK, SV> FlatMap<K, V, NaturalOrder, SK, SV>
where
    SK: Storage<K>,
    SV: Storage<V>,
{
    /// Adopts two columns that are in no particular order: they are sorted on
    /// construction and deduplicated keeping the first occurrence of each key.
    ///
    /// Fails with [`SeqMapError::LengthMismatch`] when the columns differ in
    /// length.
    pub fn from_unsorted_columns(keys: SK, values: SV) -> Result<Self> {
        Self::from_unsorted_columns_with(keys, values, NaturalOrder)
    }

    /// Adopts two columns the caller asserts are already sorted by `Ord` with
    /// no duplicate keys — the "sorted, trust me" order tag.
    ///
    /// Sortedness is a documented precondition checked only by a debug
    /// assertion; column length equality is still checked.
    pub fn from_sorted_columns_unchecked(keys: SK, values: SV) -> Result<Self> {
        Self::from_sorted_columns_unchecked_with(keys, values, NaturalOrder)
    }
}

impl<K, V, C, SK, SV> FlatMap<K, V, C, SK, SV>
where
    C: Comparator<K>,
    SK: Storage<K>,
    SV: Storage<V>,
{
    /// Creates an empty map ordered by `cmp`
    pub fn with_comparator(cmp: C) -> Self {
        FlatMap {
            engine: SortedSeq::new(cmp),
        }
    }

    /// [`FlatMap::from_unsorted_columns`] with an explicit comparator
    pub fn from_unsorted_columns_with(keys: SK, values: SV, cmp: C) -> Result<Self> {
        let tied = TiedSequence::from_columns(keys, values)?;
        Ok(FlatMap {
            engine: SortedSeq::from_unsorted(tied, cmp)?,
        })
    }

    /// [`FlatMap::from_sorted_columns_unchecked`] with an explicit comparator
    pub fn from_sorted_columns_unchecked_with(keys: SK, values: SV, cmp: C) -> Result<Self> {
        let tied = TiedSequence::from_columns(keys, values)?;
        Ok(FlatMap {
            engine: SortedSeq::from_sorted_unchecked(tied, cmp),
        })
    }

    /// Number of pairs in the map
    #[inline]
    pub fn len(&self) -> usize {
        self.engine.len()
    }

    /// True when the map holds no pairs
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.engine.is_empty()
    }

    /// Pairs the map can hold before either column reallocates
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

    /// The comparator ordering this map
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

    /// The `[lower_bound, upper_bound)` position range matching `query`;
    /// length 0 or 1 in a unique-key map
    pub fn equal_range<Q>(&self, query: &Q) -> Range<usize>
    where
        Q: ?Sized,
        C: QueryComparator<K, Q>,
    {
        self.engine.equal_range(query)
    }

    /// Position of the pair matching `query`, if present
    pub fn find<Q>(&self, query: &Q) -> Option<usize>
    where
        Q: ?Sized,
        C: QueryComparator<K, Q>,
    {
        self.engine.find(query)
    }

    /// Number of pairs matching `query` (0 or 1)
    pub fn count<Q>(&self, query: &Q) -> usize
    where
        Q: ?Sized,
        C: QueryComparator<K, Q>,
    {
        self.engine.count(query)
    }

    /// Whether a pair matching `query` is present
    pub fn contains_key<Q>(&self, query: &Q) -> bool
    where
        Q: ?Sized,
        C: QueryComparator<K, Q>,
    {
        self.engine.contains(query)
    }

    /// Value for `query`, if present
    pub fn get<Q>(&self, query: &Q) -> Option<&V>
    where
        Q: ?Sized,
        C: QueryComparator<K, Q>,
    {
        let pos = self.engine.find(query)?;
        self.engine.sequence().value_at(pos)
    }

    /// Key-value pair for `query`, if present
    pub fn get_key_value<Q>(&self, query: &Q) -> Option<(&K, &V)>
    where
        Q: ?Sized,
        C: QueryComparator<K, Q>,
    {
        let pos = self.engine.find(query)?;
        self.engine.sequence().get(pos)
    }

    /// Mutable value for `query`, if present
    pub fn get_mut<Q>(&mut self, query: &Q) -> Option<&mut V>
    where
        Q: ?Sized,
        C: QueryComparator<K, Q>,
    {
        let pos = self.engine.find(query)?;
        self.engine.sequence_mut().value_at_mut(pos)
    }

    /// Value for `query`, or [`SeqMapError::KeyNotFound`] when absent.
    ///
    /// Required-presence access: the failure is reported, never silently
    /// defaulted.
    pub fn at<Q>(&self, query: &Q) -> Result<&V>
    where
        Q: ?Sized,
        C: QueryComparator<K, Q>,
    {
        self.get(query).ok_or(SeqMapError::KeyNotFound)
    }

    /// Pair at position `index`
    pub fn get_index(&self, index: usize) -> Option<(&K, &V)> {
        self.engine.get(index)
    }

    /// Pair at position `index`, or [`SeqMapError::OutOfBounds`] when
    /// `index >= len()` — the required-presence counterpart of
    /// [`FlatMap::get_index`].
    pub fn at_index(&self, index: usize) -> Result<(&K, &V)> {
        self.engine.sequence().at(index)
    }

    /// Mutable value for `key`, inserting `V::default()` first when absent.
    ///
    /// The `operator[]`-style accessor: a read that may mutate the map.
    pub fn get_or_default(&mut self, key: K) -> Result<&mut V>
    where
        V: Default,
    {
        let pos = match self.engine.find_key(&key) {
            Some(pos) => pos,
            None => {
                let (pos, _) = self.engine.insert((key, V::default()))?;
                pos
            }
        };
        self.engine
            .sequence_mut()
            .value_at_mut(pos)
            .ok_or(SeqMapError::KeyNotFound)
    }

    /// Inserts `(key, value)` at its sorted position.
    ///
    /// Returns `(position, true)` on insertion, `(existing_position, false)`
    /// without mutation when the key is already present.
    pub fn insert(&mut self, key: K, value: V) -> Result<(usize, bool)> {
        self.engine.insert((key, value))
    }

    /// Inserts with a position hint; a helpful hint (already the correct
    /// sorted slot for `key`) skips the binary search. The outcome is
    /// identical to [`FlatMap::insert`] regardless of the hint.
    pub fn insert_hint(&mut self, hint: usize, key: K, value: V) -> Result<(usize, bool)> {
        self.engine.insert_hint(hint, (key, value))
    }

    /// Inserts or overwrites, returning the previous value when the key was
    /// already present (assignment) or `None` when it was inserted.
    pub fn insert_or_assign(&mut self, key: K, value: V) -> Result<Option<V>> {
        match self.engine.find_key(&key) {
            Some(pos) => {
                let slot = self
                    .engine
                    .sequence_mut()
                    .value_at_mut(pos)
                    .ok_or(SeqMapError::KeyNotFound)?;
                Ok(Some(std::mem::replace(slot, value)))
            }
            None => {
                self.engine.insert((key, value))?;
                Ok(None)
            }
        }
    }

    /// Inserts a value built by `make` only when `key` is absent; `make` is
    /// never called (and no value is ever constructed) for a present key.
    pub fn try_insert_with<F>(&mut self, key: K, make: F) -> Result<(usize, bool)>
    where
        F: FnOnce() -> V,
    {
        if let Some(pos) = self.engine.find_key(&key) {
            return Ok((pos, false));
        }
        self.engine.insert((key, make()))
    }

    /// Bulk-inserts pairs the caller asserts are already sorted by this
    /// map's comparator; duplicates of existing or earlier keys are dropped.
    /// Returns the number of pairs inserted.
    pub fn insert_sorted<I>(&mut self, iter: I) -> Result<usize>
    where
        I: IntoIterator<Item = (K, V)>,
    {
        self.engine.insert_sorted(iter)
    }

    /// Removes the pair matching `query`, returning its value
    pub fn remove<Q>(&mut self, query: &Q) -> Option<V>
    where
        Q: ?Sized,
        C: QueryComparator<K, Q>,
    {
        self.remove_entry(query).map(|(_, v)| v)
    }

    /// Removes the pair matching `query`, returning both parts
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

    /// Detaches the pair matching `query` into a node handle; the handle is
    /// empty when no pair matches and the map is unchanged.
    pub fn extract<Q>(&mut self, query: &Q) -> NodeHandle<(K, V)>
    where
        Q: ?Sized,
        C: QueryComparator<K, Q>,
    {
        self.engine.extract_key(query)
    }

    /// Reinserts a detached node. On success the returned handle is empty;
    /// when the key already exists the node keeps its pair and is handed
    /// back, so the caller retains ownership of the rejected element.
    /// Returns `(position, inserted, handle)`.
    pub fn insert_node(
        &mut self,
        node: NodeHandle<(K, V)>,
    ) -> Result<(usize, bool, NodeHandle<(K, V)>)> {
        self.engine.insert_node(node)
    }

    /// Moves every pair from `source` whose key is absent here; pairs with
    /// keys already present stay behind in `source`.
    pub fn merge<C2, SK2, SV2>(&mut self, source: &mut FlatMap<K, V, C2, SK2, SV2>) -> Result<()>
    where
        C2: Comparator<K>,
        SK2: Storage<K>,
        SV2: Storage<V>,
    {
        merge_into(&mut self.engine, source.engine_mut())
    }

    /// Moves pairs in from a multimap source: of each equal-key run the
    /// first pair moves (when the key is absent here) and the rest stay in
    /// `source`.
    pub fn merge_multimap<C2, SK2, SV2>(
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

    /// Moves every pair from a standard tree map whose key is absent here;
    /// the rest stay in `source`. Merge is defined on sorted elements, not
    /// on the source's representation.
    pub fn merge_btree(&mut self, source: &mut BTreeMap<K, V>) -> Result<()>
    where
        K: Ord,
    {
        let drained = std::mem::take(source);
        self.engine.reserve(drained.len())?;
        for (key, value) in drained {
            if let Some((key, value)) = self.engine.absorb((key, value))? {
                source.insert(key, value);
            }
        }
        Ok(())
    }

    /// Lockstep iterator over `(&K, &V)` pairs in key order
    pub fn iter(&self) -> Zip<SK::Iter<'_>, SV::Iter<'_>> {
        self.engine.sequence().iter()
    }

    /// Iterator over the keys in order
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

    /// Moves the backing columns out, leaving the map empty
    pub fn extract_columns(&mut self) -> (SK, SV) {
        self.engine.extract_sequence().into_columns()
    }

    /// Consumes the map, yielding the backing columns
    pub fn into_columns(self) -> (SK, SV) {
        self.engine.into_sequence().into_columns()
    }

    /// Adopts `keys`/`values` as the new backing columns; they must already
    /// be sorted and deduplicated (debug-asserted). Fails with
    /// [`SeqMapError::LengthMismatch`] leaving the map unchanged.
    pub fn replace_columns(&mut self, keys: SK, values: SV) -> Result<()> {
        let tied = TiedSequence::from_columns(keys, values)?;
        self.engine.replace_sequence(tied);
        Ok(())
    }

    pub(crate) fn engine_mut(
        &mut self,
    ) -> &mut SortedSeq<TiedSequence<K, V, SK, SV>, C, Unique> {
        &mut self.engine
    }
}

/// Removes every pair satisfying `pred`, returning the count removed.
pub fn erase_if<K, V, C, SK, SV, F>(map: &mut FlatMap<K, V, C, SK, SV>, mut pred: F) -> usize
where
    C: Comparator<K>,
    SK: Storage<K>,
    SV: Storage<V>,
    F: FnMut((&K, &V)) -> bool,
{
    map.retain(|k, v| !pred((k, &*v)))
}

impl<K, V, C, SK, SV> Default for FlatMap<K, V, C, SK, SV>
where
    C: Comparator<K> + Default,
    SK: Storage<K>,
    SV: Storage<V>,
{
    fn default() -> Self {
        Self::with_comparator(C::default())
    }
}

impl<K, V, C, SK, SV> Clone for FlatMap<K, V, C, SK, SV>
where
    C: Clone,
    SK: Clone,
    SV: Clone,
{
    fn clone(&self) -> Self {
        FlatMap {
            engine: self.engine.clone(),
        }
    }
}

impl<K, V, C, SK, SV> fmt::Debug for FlatMap<K, V, C, SK, SV>
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

impl<K, V, C, SK, SV> PartialEq for FlatMap<K, V, C, SK, SV>
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

impl<K, V, C, SK, SV> Eq for FlatMap<K, V, C, SK, SV>
where
    K: Eq,
    V: Eq,
    C: Comparator<K>,
    SK: Storage<K>,
    SV: Storage<V>,
{
}

impl<K, V, C, SK, SV> PartialOrd for FlatMap<K, V, C, SK, SV>
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

impl<K, V, C, SK, SV> Ord for FlatMap<K, V, C, SK, SV>
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

impl<K, V, C, SK, SV, Q> Index<&Q> for FlatMap<K, V, C, SK, SV>
where
    Q: ?Sized,
    C: QueryComparator<K, Q>,
    SK: Storage<K>,
    SV: Storage<V>,
{
    type Output = V;

    /// # Panics
    ///
    /// Panics if the key is absent. Use [`FlatMap::at`] for a fallible
    /// lookup or [`FlatMap::get_or_default`] for the inserting accessor.
    fn index(&self, query: &Q) -> &V {
        self.get(query).expect("no entry found for key")
    }
}

impl<K, V, C, SK, SV> FromIterator<(K, V)> for FlatMap<K, V, C, SK, SV>
where
    C: Comparator<K> + Default,
    SK: Storage<K>,
    SV: Storage<V>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut tied: TiedSequence<K, V, SK, SV> = TiedSequence::new();
        for pair in iter {
            tied.push(pair).expect("allocation failed building FlatMap");
        }
        FlatMap {
            engine: SortedSeq::from_unsorted(tied, C::default())
                .expect("allocation failed building FlatMap"),
        }
    }
}

impl<K, V, C, SK, SV> Extend<(K, V)> for FlatMap<K, V, C, SK, SV>
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

impl<'a, K, V, C, SK, SV> IntoIterator for &'a FlatMap<K, V, C, SK, SV>
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

impl<K, V, C, SK, SV> IntoIterator for FlatMap<K, V, C, SK, SV>
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
impl<K, V, C, SK, SV> serde::Serialize for FlatMap<K, V, C, SK, SV>
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
        serializer.collect_map(self.iter())
    }
}

#[cfg(feature = "serde")]
impl<'de, K, V, C, SK, SV> serde::Deserialize<'de> for FlatMap<K, V, C, SK, SV>
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

        struct MapVisitor<K, V, C, SK, SV>(PhantomData<(K, V, C, SK, SV)>);

        impl<'de, K, V, C, SK, SV> serde::de::Visitor<'de> for MapVisitor<K, V, C, SK, SV>
        where
            K: serde::Deserialize<'de>,
            V: serde::Deserialize<'de>,
            C: Comparator<K> + Default,
            SK: Storage<K>,
            SV: Storage<V>,
        {
            type Value = FlatMap<K, V, C, SK, SV>;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map")
            }

            fn visit_map<A>(self, mut access: A) -> std::result::Result<Self::Value, A::Error>
            where
                A: serde::de::MapAccess<'de>,
            {
                let mut tied: TiedSequence<K, V, SK, SV> = TiedSequence::new();
                while let Some(pair) = access.next_entry()? {
                    tied.push(pair).map_err(serde::de::Error::custom)?;
                }
                // the unsorted path re-establishes the invariant, so hostile
                // input cannot smuggle an unsorted sequence in
                let engine = SortedSeq::from_unsorted(tied, C::default())
                    .map_err(serde::de::Error::custom)?;
                Ok(FlatMap { engine })
            }
        }

        deserializer.deserialize_map(MapVisitor(PhantomData))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> FlatMap<i32, i32> {
        FlatMap::from_iter([(0, 1), (2, 3), (4, 5), (6, 7)])
    }

    #[test]
    fn test_duplicate_insert_scenario() {
        let mut fm = sample();
        let (pos, inserted) = fm.insert(2, 5).unwrap();
        assert!(!inserted);
        assert_eq!(fm.get_index(pos), Some((&2, &3)));
        assert_eq!(fm.len(), 4);
    }

    #[test]
    fn test_get_or_default_scenario() {
        let mut fm = sample();
        let v = fm.get_or_default(3).unwrap();
        assert_eq!(*v, 0);
        assert_eq!(fm.len(), 5);
        assert_eq!(fm.find(&3), Some(2));
    }

    #[test]
    fn test_at_reports_missing_key() {
        let fm = sample();
        assert_eq!(*fm.at(&2).unwrap(), 3);
        let err = fm.at(&3).unwrap_err();
        assert_eq!(err.category(), "lookup");
    }

    #[test]
    fn test_at_index_reports_out_of_range() {
        let fm = sample();
        assert_eq!(fm.at_index(1).unwrap(), (&2, &3));
        let err = fm.at_index(4).unwrap_err();
        assert_eq!(err.category(), "bounds");
        assert!(matches!(err, SeqMapError::OutOfBounds { index: 4, size: 4 }));
    }

    #[test]
    fn test_index_operator() {
        let fm = sample();
        assert_eq!(fm[&4], 5);
    }

    #[test]
    fn test_insert_or_assign() {
        let mut fm = sample();
        assert_eq!(fm.insert_or_assign(2, 9).unwrap(), Some(3));
        assert_eq!(fm.insert_or_assign(3, 1).unwrap(), None);
        assert_eq!(fm.get(&2), Some(&9));
        assert_eq!(fm.len(), 5);
    }

    #[test]
    fn test_try_insert_with_defers_construction() {
        let mut fm = sample();
        let mut built = 0;
        let (_, inserted) = fm
            .try_insert_with(2, || {
                built += 1;
                99
            })
            .unwrap();
        assert!(!inserted);
        assert_eq!(built, 0);

        let (_, inserted) = fm
            .try_insert_with(3, || {
                built += 1;
                33
            })
            .unwrap();
        assert!(inserted);
        assert_eq!(built, 1);
        assert_eq!(fm.get(&3), Some(&33));
    }

    #[test]
    fn test_retain_and_erase_if_scenario() {
        let mut fm = sample();
        let removed = erase_if(&mut fm, |(k, _)| *k < 4);
        assert_eq!(removed, 2);
        let pairs: Vec<(i32, i32)> = fm.iter().map(|(k, v)| (*k, *v)).collect();
        assert_eq!(pairs, vec![(4, 5), (6, 7)]);
    }

    #[test]
    fn test_extract_and_reinsert_scenario() {
        let mut fm = sample();
        let node = fm.extract(&2);
        assert_eq!(node.as_ref(), Some(&(2, 3)));
        assert_eq!(fm.len(), 3);

        let empty = fm.extract(&5);
        assert!(empty.is_empty());
        assert_eq!(fm.len(), 3);

        let (_, inserted, rest) = fm.insert_node(node).unwrap();
        assert!(inserted);
        assert!(rest.is_empty());
        assert_eq!(fm.len(), 4);
    }

    #[test]
    fn test_extract_replace_round_trip() {
        let mut fm = sample();
        let expected = sample();
        let (keys, values) = fm.extract_columns();
        assert!(fm.is_empty());
        fm.replace_columns(keys, values).unwrap();
        assert_eq!(fm, expected);
    }

    #[test]
    fn test_replace_columns_length_mismatch() {
        let mut fm = sample();
        let err = fm.replace_columns(vec![1, 2], vec![1]).unwrap_err();
        assert_eq!(err.category(), "structure");
        assert_eq!(fm, sample());
    }

    #[test]
    fn test_merge_btree() {
        let mut fm = sample();
        let mut src = BTreeMap::from([(1, 10), (2, 20)]);
        fm.merge_btree(&mut src).unwrap();
        assert_eq!(fm.len(), 5);
        assert_eq!(fm.get(&1), Some(&10));
        assert_eq!(fm.get(&2), Some(&3)); // existing wins
        assert_eq!(src.len(), 1);
        assert_eq!(src.get(&2), Some(&20)); // reject stays in source
    }

    #[test]
    fn test_unsorted_column_adoption() {
        let fm: FlatMap<i32, &str> =
            FlatMap::from_unsorted_columns(vec![3, 1, 2, 1], vec!["c", "a", "b", "dup"]).unwrap();
        let pairs: Vec<(i32, &str)> = fm.iter().map(|(k, v)| (*k, *v)).collect();
        assert_eq!(pairs, vec![(1, "a"), (2, "b"), (3, "c")]);
    }

    #[test]
    fn test_transparent_str_lookup() {
        let mut fm: FlatMap<String, i32> = FlatMap::new();
        fm.insert("apple".to_string(), 1).unwrap();
        fm.insert("pear".to_string(), 2).unwrap();
        assert_eq!(fm.get("apple"), Some(&1));
        assert!(fm.contains_key("pear"));
        assert_eq!(fm.remove("apple"), Some(1));
        assert_eq!(fm.len(), 1);
    }

    #[test]
    fn test_comparisons() {
        let a = sample();
        let b = sample();
        assert_eq!(a, b);
        let mut c = sample();
        c.insert(8, 9).unwrap();
        assert_ne!(a, c);
        assert!(a < c);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_serde_round_trip() {
        let fm = sample();
        let json = serde_json::to_string(&fm).unwrap();
        let back: FlatMap<i32, i32> = serde_json::from_str(&json).unwrap();
        assert_eq!(fm, back);
    }
}
