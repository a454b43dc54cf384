//! Tied sequence: N equal-length columns addressed as one sequence of tuples
//!
//! [`TiedSequence`] owns a key column and a value column in independently
//! chosen storages and exposes vector-like mutation over them as a single
//! sequence of pairs. Keeping the columns separate is a cache-locality play:
//! key scans touch only key memory (the same reasoning behind separated
//! key/value arrays in small-map designs).
//!
//! Invariant: both columns have identical length at every externally
//! observable point. Operations that mutate both columns roll back the
//! already-mutated column when the second one fails, so an allocation error
//! never leaves the lengths out of step.
//!
//! [`Sequence`] is the engine-facing abstraction over "something positional
//! holding keyed elements"; [`Column`] adapts a single storage (the set
//! case) to the same contract.

use std::fmt;
use std::marker::PhantomData;
use std::ops::Range;

use crate::error::{check_bounds, Result, SeqMapError};
use crate::storage::Storage;
use crate::zip::Zip;

/// Positional sequence of keyed elements, as seen by the sorted engine.
///
/// Implemented by [`TiedSequence`] (elements are `(K, V)` pairs split over
/// two columns) and [`Column`] (elements are bare keys). The engine performs
/// binary search through `key_at` and positional mutation through the rest.
pub trait Sequence: Default {
    /// Owned element type
    type Element;
    /// Key part of an element, the sort criterion
    type Key;
    /// Borrowed view of an element
    type Ref<'a>
    where
        Self: 'a;
    /// Consuming iterator over owned elements in positional order
    type IntoElements: Iterator<Item = Self::Element>;

    /// Number of elements
    fn len(&self) -> usize;

    /// True when no elements are stored
    #[inline]
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Borrowed view of the element at `index`
    fn get(&self, index: usize) -> Option<Self::Ref<'_>>;

    /// Key of the element at `index`
    fn key_at(&self, index: usize) -> Option<&Self::Key>;

    /// Key part of an owned element
    fn key_of(element: &Self::Element) -> &Self::Key;

    /// Insert `element` before `index`
    fn insert_at(&mut self, index: usize, element: Self::Element) -> Result<()>;

    /// Remove and return the element at `index`
    fn remove_at(&mut self, index: usize) -> Self::Element;

    /// Remove every element in `range`
    fn remove_range(&mut self, range: Range<usize>);

    /// Append an element
    fn push(&mut self, element: Self::Element) -> Result<()>;

    /// Remove and return the last element
    fn pop(&mut self) -> Option<Self::Element>;

    /// Keep only the first `len` elements
    fn truncate(&mut self, len: usize);

    /// Remove all elements
    fn clear(&mut self);

    /// Reserve room for `additional` more elements
    fn reserve(&mut self, additional: usize) -> Result<()>;

    /// Swap the elements at positions `a` and `b`
    fn swap_positions(&mut self, a: usize, b: usize);

    /// Consume the sequence, yielding owned elements in positional order
    fn into_elements(self) -> Self::IntoElements;
}

/// Order-preserving compaction of one storage column, driven by per-index
/// keep flags. O(n) moves regardless of how many elements are dropped.
/// Returns the number of elements removed.
fn compact_storage<T, S: Storage<T>>(storage: &mut S, keep: &[bool]) -> usize {
    let len = storage.len();
    debug_assert_eq!(keep.len(), len);
    let mut write = 0;
    for read in 0..len {
        if keep[read] {
            if read != write {
                storage.swap_elements(write, read);
            }
            write += 1;
        }
    }
    storage.truncate(write);
    len - write
}

/// Two equal-length columns addressed as one sequence of `(K, V)` pairs.
///
/// `SK` and `SV` pick the backing storage per column independently; the
/// defaults are `Vec`. Substituting `VecDeque` (or any other [`Storage`])
/// for either column trades positional-insert cost for that storage's
/// strengths, without touching anything above this layer.
///
/// # Examples
///
/// ```rust
/// use seqmap::TiedSequence;
///
/// let mut ts: TiedSequence<i32, &str> = TiedSequence::new();
/// ts.push((1, "one"))?;
/// ts.push((2, "two"))?;
/// assert_eq!(ts.len(), 2);
/// assert_eq!(ts.get(1), Some((&2, &"two")));
/// # Ok::<(), seqmap::SeqMapError>(())
/// ```
pub struct TiedSequence<K, V, SK = Vec<K>, SV = Vec<V>> {
    keys: SK,
    values: SV,
    _marker: PhantomData<(K, V)>,
}

impl<K, V, SK, SV> TiedSequence<K, V, SK, SV>
where
    SK: Storage<K>,
    SV: Storage<V>,
{
    /// Creates an empty tied sequence
    pub fn new() -> Self {
        TiedSequence {
            keys: SK::default(),
            values: SV::default(),
            _marker: PhantomData,
        }
    }

    /// Adopts two columns as the backing storage.
    ///
    /// Fails with [`SeqMapError::LengthMismatch`] when the columns differ in
    /// length; neither column is consumed incorrectly — the error simply
    /// rejects the pair.
    pub fn from_columns(keys: SK, values: SV) -> Result<Self> {
        if keys.len() != values.len() {
            return Err(SeqMapError::length_mismatch(keys.len(), values.len()));
        }
        Ok(TiedSequence {
            keys,
            values,
            _marker: PhantomData,
        })
    }

    /// Moves the two columns out, leaving this sequence empty.
    pub fn extract_columns(&mut self) -> (SK, SV) {
        (
            std::mem::take(&mut self.keys),
            std::mem::take(&mut self.values),
        )
    }

    /// Consumes the sequence, yielding its columns.
    pub fn into_columns(self) -> (SK, SV) {
        (self.keys, self.values)
    }

    /// Replaces the backing columns with `keys` and `values`.
    ///
    /// Fails with [`SeqMapError::LengthMismatch`] when the lengths differ, in
    /// which case the sequence is left unchanged (strong guarantee).
    pub fn replace(&mut self, keys: SK, values: SV) -> Result<()> {
        if keys.len() != values.len() {
            return Err(SeqMapError::length_mismatch(keys.len(), values.len()));
        }
        self.keys = keys;
        self.values = values;
        Ok(())
    }

    /// Read-only access to both columns without copying
    pub fn columns(&self) -> (&SK, &SV) {
        (&self.keys, &self.values)
    }

    /// Number of pairs
    #[inline]
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// True when no pairs are stored
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Pairs the sequence can hold before either column reallocates
    pub fn capacity(&self) -> usize {
        self.keys.capacity().min(self.values.capacity())
    }

    /// Reserves room for `additional` more pairs in both columns
    pub fn reserve(&mut self, additional: usize) -> Result<()> {
        self.keys.reserve(additional)?;
        self.values.reserve(additional)
    }

    /// Pair at `index`
    #[inline]
    pub fn get(&self, index: usize) -> Option<(&K, &V)> {
        match (self.keys.get(index), self.values.get(index)) {
            (Some(k), Some(v)) => Some((k, v)),
            _ => None,
        }
    }

    /// Pair at `index`, failing with [`SeqMapError::OutOfBounds`] when
    /// `index >= len()`.
    ///
    /// The required-presence counterpart of [`TiedSequence::get`].
    pub fn at(&self, index: usize) -> Result<(&K, &V)> {
        check_bounds(index, self.len())?;
        self.get(index)
            .ok_or_else(|| SeqMapError::out_of_bounds(index, self.len()))
    }

    /// Key at `index`
    #[inline]
    pub fn key_at(&self, index: usize) -> Option<&K> {
        self.keys.get(index)
    }

    /// Value at `index`
    #[inline]
    pub fn value_at(&self, index: usize) -> Option<&V> {
        self.values.get(index)
    }

    /// Mutable value at `index`; keys stay immutable to protect ordering
    #[inline]
    pub fn value_at_mut(&mut self, index: usize) -> Option<&mut V> {
        self.values.get_mut(index)
    }

    /// Inserts a pair before `index`, keeping both columns in lockstep.
    ///
    /// On a value-column failure the key column's insert is rolled back, so
    /// the equal-length invariant holds on every return path.
    pub fn insert(&mut self, index: usize, (key, value): (K, V)) -> Result<()> {
        self.keys.insert_at(index, key)?;
        if let Err(e) = self.values.insert_at(index, value) {
            self.keys.remove_at(index);
            return Err(e);
        }
        Ok(())
    }

    /// Inserts every pair from `iter` starting at `index`, in order.
    ///
    /// On failure, pairs already inserted by this call are removed again
    /// before the error propagates (rollback to the pre-call state).
    pub fn insert_many<I>(&mut self, index: usize, iter: I) -> Result<()>
    where
        I: IntoIterator<Item = (K, V)>,
    {
        let mut inserted = 0;
        for pair in iter {
            if let Err(e) = self.insert(index + inserted, pair) {
                self.remove_range(index..index + inserted);
                return Err(e);
            }
            inserted += 1;
        }
        Ok(())
    }

    /// Appends a pair at the end
    pub fn push(&mut self, (key, value): (K, V)) -> Result<()> {
        self.keys.push(key)?;
        if let Err(e) = self.values.push(value) {
            self.keys.pop();
            return Err(e);
        }
        Ok(())
    }

    /// Removes and returns the last pair, if any
    pub fn pop(&mut self) -> Option<(K, V)> {
        match (self.keys.pop(), self.values.pop()) {
            (Some(k), Some(v)) => Some((k, v)),
            _ => None,
        }
    }

    /// Removes and returns the pair at `index`
    ///
    /// # Panics
    ///
    /// Panics if `index >= len()`.
    pub fn remove(&mut self, index: usize) -> (K, V) {
        let key = self.keys.remove_at(index);
        let value = self.values.remove_at(index);
        (key, value)
    }

    /// Removes every pair in `range`
    pub fn remove_range(&mut self, range: Range<usize>) {
        self.keys.remove_range(range.clone());
        self.values.remove_range(range);
    }

    /// Replaces the contents with the pairs from `iter`
    pub fn assign<I>(&mut self, iter: I) -> Result<()>
    where
        I: IntoIterator<Item = (K, V)>,
    {
        self.clear();
        self.try_extend(iter)
    }

    /// Appends every pair from `iter`
    pub fn try_extend<I>(&mut self, iter: I) -> Result<()>
    where
        I: IntoIterator<Item = (K, V)>,
    {
        for pair in iter {
            self.push(pair)?;
        }
        Ok(())
    }

    /// Keeps only the first `len` pairs
    pub fn truncate(&mut self, len: usize) {
        self.keys.truncate(len);
        self.values.truncate(len);
    }

    /// Removes all pairs
    pub fn clear(&mut self) {
        self.keys.clear();
        self.values.clear();
    }

    /// Swaps the pairs at positions `a` and `b`, column by column
    pub fn swap_positions(&mut self, a: usize, b: usize) {
        self.keys.swap_elements(a, b);
        self.values.swap_elements(a, b);
    }

    /// Lockstep iterator over `(&K, &V)` pairs
    pub fn iter(&self) -> Zip<SK::Iter<'_>, SV::Iter<'_>> {
        Zip::new(self.keys.iter(), self.values.iter())
    }

    /// Iterator over the key column only
    pub fn keys(&self) -> SK::Iter<'_> {
        self.keys.iter()
    }

    /// Iterator over the value column only
    pub fn values(&self) -> SV::Iter<'_> {
        self.values.iter()
    }

    /// Mutable iterator over the value column only
    pub fn values_mut(&mut self) -> SV::IterMut<'_> {
        self.values.iter_mut()
    }

    /// Keeps only the pairs satisfying `pred`, preserving order.
    ///
    /// The value is borrowed mutably so callers can update survivors while
    /// deciding. Returns the number of pairs removed.
    pub fn retain<F>(&mut self, mut pred: F) -> usize
    where
        F: FnMut(&K, &mut V) -> bool,
    {
        let mut keep = Vec::with_capacity(self.keys.len());
        {
            let mut keys = self.keys.iter();
            let mut values = self.values.iter_mut();
            while let (Some(k), Some(v)) = (keys.next(), values.next()) {
                keep.push(pred(k, v));
            }
        }
        // both columns compact over the same flags, keeping them in lockstep
        let removed_keys = compact_storage(&mut self.keys, &keep);
        let removed_values = compact_storage(&mut self.values, &keep);
        debug_assert_eq!(removed_keys, removed_values);
        removed_keys
    }
}

impl<K, V, SK, SV> Default for TiedSequence<K, V, SK, SV>
where
    SK: Storage<K>,
    SV: Storage<V>,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, SK, SV> Clone for TiedSequence<K, V, SK, SV>
where
    SK: Clone,
    SV: Clone,
{
    fn clone(&self) -> Self {
        TiedSequence {
            keys: self.keys.clone(),
            values: self.values.clone(),
            _marker: PhantomData,
        }
    }
}

impl<K, V, SK, SV> fmt::Debug for TiedSequence<K, V, SK, SV>
where
    K: fmt::Debug,
    V: fmt::Debug,
    SK: Storage<K>,
    SV: Storage<V>,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<K, V, SK, SV> PartialEq for TiedSequence<K, V, SK, SV>
where
    K: PartialEq,
    V: PartialEq,
    SK: Storage<K>,
    SV: Storage<V>,
{
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl<K, V, SK, SV> Sequence for TiedSequence<K, V, SK, SV>
where
    SK: Storage<K>,
    SV: Storage<V>,
{
    type Element = (K, V);
    type Key = K;
    type Ref<'a>
        = (&'a K, &'a V)
    where
        Self: 'a;
    type IntoElements = Zip<SK::IntoElements, SV::IntoElements>;

    #[inline]
    fn len(&self) -> usize {
        TiedSequence::len(self)
    }

    #[inline]
    fn get(&self, index: usize) -> Option<Self::Ref<'_>> {
        TiedSequence::get(self, index)
    }

    #[inline]
    fn key_at(&self, index: usize) -> Option<&K> {
        TiedSequence::key_at(self, index)
    }

    #[inline]
    fn key_of(element: &(K, V)) -> &K {
        &element.0
    }

    fn insert_at(&mut self, index: usize, element: (K, V)) -> Result<()> {
        TiedSequence::insert(self, index, element)
    }

    fn remove_at(&mut self, index: usize) -> (K, V) {
        TiedSequence::remove(self, index)
    }

    fn remove_range(&mut self, range: Range<usize>) {
        TiedSequence::remove_range(self, range)
    }

    fn push(&mut self, element: (K, V)) -> Result<()> {
        TiedSequence::push(self, element)
    }

    fn pop(&mut self) -> Option<(K, V)> {
        TiedSequence::pop(self)
    }

    fn truncate(&mut self, len: usize) {
        TiedSequence::truncate(self, len)
    }

    fn clear(&mut self) {
        TiedSequence::clear(self)
    }

    fn reserve(&mut self, additional: usize) -> Result<()> {
        TiedSequence::reserve(self, additional)
    }

    fn swap_positions(&mut self, a: usize, b: usize) {
        TiedSequence::swap_positions(self, a, b)
    }

    fn into_elements(self) -> Self::IntoElements {
        Zip::new(self.keys.into_elements(), self.values.into_elements())
    }
}

impl<'a, K, V, SK, SV> IntoIterator for &'a TiedSequence<K, V, SK, SV>
where
    SK: Storage<K>,
    SV: Storage<V>,
{
    type Item = (&'a K, &'a V);
    type IntoIter = Zip<SK::Iter<'a>, SV::Iter<'a>>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<K, V, SK, SV> IntoIterator for TiedSequence<K, V, SK, SV>
where
    SK: Storage<K>,
    SV: Storage<V>,
{
    type Item = (K, V);
    type IntoIter = Zip<SK::IntoElements, SV::IntoElements>;

    fn into_iter(self) -> Self::IntoIter {
        Zip::new(self.keys.into_elements(), self.values.into_elements())
    }
}

/// Removes every pair equal to `target`, returning the count removed.
pub fn erase<K, V, SK, SV>(ts: &mut TiedSequence<K, V, SK, SV>, target: &(K, V)) -> usize
where
    K: PartialEq,
    V: PartialEq,
    SK: Storage<K>,
    SV: Storage<V>,
{
    erase_if(ts, |(k, v)| *k == target.0 && *v == target.1)
}

/// Removes every pair satisfying `pred`, returning the count removed.
///
/// The predicate sees the dereferenced pair, exactly what [`TiedSequence::iter`]
/// yields.
pub fn erase_if<K, V, SK, SV, F>(ts: &mut TiedSequence<K, V, SK, SV>, mut pred: F) -> usize
where
    SK: Storage<K>,
    SV: Storage<V>,
    F: FnMut((&K, &V)) -> bool,
{
    ts.retain(|k, v| !pred((k, &*v)))
}

/// Single-column [`Sequence`] adapter over one storage.
///
/// Used by the set facades, where the element *is* the key and no value
/// column exists.
pub struct Column<T, S = Vec<T>> {
    storage: S,
    _marker: PhantomData<T>,
}

impl<T, S: Storage<T>> Column<T, S> {
    /// Creates an empty column
    pub fn new() -> Self {
        Column {
            storage: S::default(),
            _marker: PhantomData,
        }
    }

    /// Adopts an existing storage
    pub fn from_storage(storage: S) -> Self {
        Column {
            storage,
            _marker: PhantomData,
        }
    }

    /// Element at `index`, failing with [`SeqMapError::OutOfBounds`] when
    /// `index >= len()`.
    pub fn at(&self, index: usize) -> Result<&T> {
        check_bounds(index, self.storage.len())?;
        self.storage
            .get(index)
            .ok_or_else(|| SeqMapError::out_of_bounds(index, self.storage.len()))
    }

    /// Moves the storage out, leaving the column empty
    pub fn extract_storage(&mut self) -> S {
        std::mem::take(&mut self.storage)
    }

    /// Consumes the column, yielding its storage
    pub fn into_storage(self) -> S {
        self.storage
    }

    /// Read-only access to the backing storage
    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Iterator over the elements
    pub fn iter(&self) -> S::Iter<'_> {
        self.storage.iter()
    }

    /// Keeps only the elements satisfying `pred`, preserving order.
    ///
    /// Returns the number of elements removed.
    pub fn retain<F>(&mut self, mut pred: F) -> usize
    where
        F: FnMut(&T) -> bool,
    {
        let keep: Vec<bool> = self.storage.iter().map(|t| pred(t)).collect();
        compact_storage(&mut self.storage, &keep)
    }
}

impl<T, S: Storage<T>> Default for Column<T, S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, S: Clone> Clone for Column<T, S> {
    fn clone(&self) -> Self {
        Column {
            storage: self.storage.clone(),
            _marker: PhantomData,
        }
    }
}

impl<T: fmt::Debug, S: Storage<T>> fmt::Debug for Column<T, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<T, S: Storage<T>> Sequence for Column<T, S> {
    type Element = T;
    type Key = T;
    type Ref<'a>
        = &'a T
    where
        Self: 'a;
    type IntoElements = S::IntoElements;

    #[inline]
    fn len(&self) -> usize {
        self.storage.len()
    }

    #[inline]
    fn get(&self, index: usize) -> Option<&T> {
        self.storage.get(index)
    }

    #[inline]
    fn key_at(&self, index: usize) -> Option<&T> {
        self.storage.get(index)
    }

    #[inline]
    fn key_of(element: &T) -> &T {
        element
    }

    fn insert_at(&mut self, index: usize, element: T) -> Result<()> {
        self.storage.insert_at(index, element)
    }

    fn remove_at(&mut self, index: usize) -> T {
        self.storage.remove_at(index)
    }

    fn remove_range(&mut self, range: Range<usize>) {
        self.storage.remove_range(range)
    }

    fn push(&mut self, element: T) -> Result<()> {
        self.storage.push(element)
    }

    fn pop(&mut self) -> Option<T> {
        self.storage.pop()
    }

    fn truncate(&mut self, len: usize) {
        self.storage.truncate(len)
    }

    fn clear(&mut self) {
        self.storage.clear()
    }

    fn reserve(&mut self, additional: usize) -> Result<()> {
        self.storage.reserve(additional)
    }

    fn swap_positions(&mut self, a: usize, b: usize) {
        self.storage.swap_elements(a, b)
    }

    fn into_elements(self) -> Self::IntoElements {
        self.storage.into_elements()
    }
}

impl<T, S: Storage<T>> IntoIterator for Column<T, S> {
    type Item = T;
    type IntoIter = S::IntoElements;

    fn into_iter(self) -> Self::IntoIter {
        self.storage.into_elements()
    }
}
