//! Positional storage adapter
//!
//! The [`Storage`] trait is the contract the sorted-sequence layers are built
//! on: position-addressed insert-before / erase-at, random-access indexing,
//! and fallible growth. No ordering is imposed here; this layer is pure
//! positional storage.
//!
//! Any `insert_at`/`remove_at` may relocate every element, so no address
//! stability is promised and nothing above this layer assumes it. That trade
//! (references invalidated on growth, cache-friendly scans in exchange) is
//! the design, not an accident.
//!
//! Two implementations ship: `Vec<T>` (contiguous, the default) and
//! `VecDeque<T>` (non-contiguous, substitutable at a positional-insert cost).

use std::collections::VecDeque;
use std::ops::Range;

use crate::error::Result;

/// Position-addressed growable storage.
///
/// Growth is fallible: `reserve`, `insert_at`, and `push` report allocation
/// failure through [`Result`] instead of aborting, so callers layering
/// multi-column invariants on top can roll back cleanly.
pub trait Storage<T>: Default {
    /// Borrowing iterator over the elements in positional order.
    type Iter<'a>: Iterator<Item = &'a T> + DoubleEndedIterator + ExactSizeIterator
    where
        Self: 'a,
        T: 'a;

    /// Mutably borrowing iterator over the elements in positional order.
    type IterMut<'a>: Iterator<Item = &'a mut T> + DoubleEndedIterator + ExactSizeIterator
    where
        Self: 'a,
        T: 'a;

    /// Consuming iterator over the elements in positional order.
    type IntoElements: Iterator<Item = T> + DoubleEndedIterator + ExactSizeIterator;

    /// Number of elements currently stored
    fn len(&self) -> usize;

    /// True when no elements are stored
    #[inline]
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of elements the storage can hold without reallocating
    fn capacity(&self) -> usize;

    /// Reserve room for at least `additional` more elements
    fn reserve(&mut self, additional: usize) -> Result<()>;

    /// Element at `index`, or `None` when out of range
    fn get(&self, index: usize) -> Option<&T>;

    /// Mutable element at `index`, or `None` when out of range
    fn get_mut(&mut self, index: usize) -> Option<&mut T>;

    /// Insert `value` before `index`, shifting the tail
    ///
    /// # Panics
    ///
    /// Panics if `index > len()`.
    fn insert_at(&mut self, index: usize, value: T) -> Result<()>;

    /// Remove and return the element at `index`, shifting the tail
    ///
    /// # Panics
    ///
    /// Panics if `index >= len()`.
    fn remove_at(&mut self, index: usize) -> T;

    /// Remove every element in `range`, shifting the tail
    ///
    /// # Panics
    ///
    /// Panics if the range is out of bounds or decreasing.
    fn remove_range(&mut self, range: Range<usize>);

    /// Append `value` at the end
    fn push(&mut self, value: T) -> Result<()>;

    /// Remove and return the last element, if any
    fn pop(&mut self) -> Option<T>;

    /// Drop all elements past `len`, keeping the first `len`
    fn truncate(&mut self, len: usize);

    /// Remove all elements
    fn clear(&mut self);

    /// Swap the elements at positions `a` and `b`
    ///
    /// # Panics
    ///
    /// Panics if either index is out of bounds.
    fn swap_elements(&mut self, a: usize, b: usize);

    /// Iterate the elements in positional order
    fn iter(&self) -> Self::Iter<'_>;

    /// Iterate the elements mutably in positional order
    fn iter_mut(&mut self) -> Self::IterMut<'_>;

    /// Consume the storage, yielding the elements in positional order
    fn into_elements(self) -> Self::IntoElements;
}

impl<T> Storage<T> for Vec<T> {
    type Iter<'a>
        = std::slice::Iter<'a, T>
    where
        T: 'a;
    type IterMut<'a>
        = std::slice::IterMut<'a, T>
    where
        T: 'a;
    type IntoElements = std::vec::IntoIter<T>;

    #[inline]
    fn len(&self) -> usize {
        Vec::len(self)
    }

    #[inline]
    fn capacity(&self) -> usize {
        Vec::capacity(self)
    }

    fn reserve(&mut self, additional: usize) -> Result<()> {
        self.try_reserve(additional)?;
        Ok(())
    }

    #[inline]
    fn get(&self, index: usize) -> Option<&T> {
        self.as_slice().get(index)
    }

    #[inline]
    fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        self.as_mut_slice().get_mut(index)
    }

    fn insert_at(&mut self, index: usize, value: T) -> Result<()> {
        self.try_reserve(1)?;
        self.insert(index, value);
        Ok(())
    }

    #[inline]
    fn remove_at(&mut self, index: usize) -> T {
        self.remove(index)
    }

    fn remove_range(&mut self, range: Range<usize>) {
        self.drain(range);
    }

    fn push(&mut self, value: T) -> Result<()> {
        self.try_reserve(1)?;
        Vec::push(self, value);
        Ok(())
    }

    #[inline]
    fn pop(&mut self) -> Option<T> {
        Vec::pop(self)
    }

    #[inline]
    fn truncate(&mut self, len: usize) {
        Vec::truncate(self, len)
    }

    #[inline]
    fn clear(&mut self) {
        Vec::clear(self)
    }

    #[inline]
    fn swap_elements(&mut self, a: usize, b: usize) {
        self.as_mut_slice().swap(a, b)
    }

    #[inline]
    fn iter(&self) -> Self::Iter<'_> {
        self.as_slice().iter()
    }

    #[inline]
    fn iter_mut(&mut self) -> Self::IterMut<'_> {
        self.as_mut_slice().iter_mut()
    }

    #[inline]
    fn into_elements(self) -> Self::IntoElements {
        self.into_iter()
    }
}

impl<T> Storage<T> for VecDeque<T> {
    type Iter<'a>
        = std::collections::vec_deque::Iter<'a, T>
    where
        T: 'a;
    type IterMut<'a>
        = std::collections::vec_deque::IterMut<'a, T>
    where
        T: 'a;
    type IntoElements = std::collections::vec_deque::IntoIter<T>;

    #[inline]
    fn len(&self) -> usize {
        VecDeque::len(self)
    }

    #[inline]
    fn capacity(&self) -> usize {
        VecDeque::capacity(self)
    }

    fn reserve(&mut self, additional: usize) -> Result<()> {
        self.try_reserve(additional)?;
        Ok(())
    }

    #[inline]
    fn get(&self, index: usize) -> Option<&T> {
        VecDeque::get(self, index)
    }

    #[inline]
    fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        VecDeque::get_mut(self, index)
    }

    fn insert_at(&mut self, index: usize, value: T) -> Result<()> {
        self.try_reserve(1)?;
        VecDeque::insert(self, index, value);
        Ok(())
    }

    fn remove_at(&mut self, index: usize) -> T {
        match VecDeque::remove(self, index) {
            Some(value) => value,
            None => panic!("remove_at: index {} out of bounds", index),
        }
    }

    fn remove_range(&mut self, range: Range<usize>) {
        self.drain(range);
    }

    fn push(&mut self, value: T) -> Result<()> {
        self.try_reserve(1)?;
        self.push_back(value);
        Ok(())
    }

    #[inline]
    fn pop(&mut self) -> Option<T> {
        self.pop_back()
    }

    #[inline]
    fn truncate(&mut self, len: usize) {
        VecDeque::truncate(self, len)
    }

    #[inline]
    fn clear(&mut self) {
        VecDeque::clear(self)
    }

    #[inline]
    fn swap_elements(&mut self, a: usize, b: usize) {
        VecDeque::swap(self, a, b)
    }

    #[inline]
    fn iter(&self) -> Self::Iter<'_> {
        VecDeque::iter(self)
    }

    #[inline]
    fn iter_mut(&mut self) -> Self::IterMut<'_> {
        VecDeque::iter_mut(self)
    }

    #[inline]
    fn into_elements(self) -> Self::IntoElements {
        self.into_iter()
    }
}
