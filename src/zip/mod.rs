//! Zip/unzip iteration layer
//!
//! [`Zip`] fuses two per-column iterators into one pair-valued iterator
//! advanced in lockstep; `unzip_first`/`unzip_second` project a single column
//! back out. Built from `iter_mut` columns, the zipped items are
//! `(&mut K, &mut V)` and assignment through them writes to the underlying
//! storage.
//!
//! Precondition (documented, not checked): both columns have the same
//! remaining length. The tied-sequence layer guarantees this by construction;
//! external callers pairing arbitrary iterators carry the same contract as
//! any paired-iterator API.

use std::iter::FusedIterator;

/// Lockstep iterator over two equal-length columns.
///
/// Compared to `std::iter::zip`, this combinator assumes the equal-length
/// precondition, which makes it double-ended without per-step length
/// re-synchronization, and it can surrender its column iterators again via
/// [`Zip::unzip_first`]/[`Zip::unzip_second`].
#[derive(Debug, Clone)]
pub struct Zip<A, B> {
    a: A,
    b: B,
}

impl<A, B> Zip<A, B> {
    /// Fuse two column iterators positioned at the same index.
    #[inline]
    pub fn new(a: A, b: B) -> Self {
        Zip { a, b }
    }

    /// Project out the first column, discarding the second.
    #[inline]
    pub fn unzip_first(self) -> A {
        self.a
    }

    /// Project out the second column, discarding the first.
    #[inline]
    pub fn unzip_second(self) -> B {
        self.b
    }

    /// Borrow both column iterators at their current position.
    #[inline]
    pub fn columns(&self) -> (&A, &B) {
        (&self.a, &self.b)
    }
}

impl<A: Iterator, B: Iterator> Iterator for Zip<A, B> {
    type Item = (A::Item, B::Item);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        match (self.a.next(), self.b.next()) {
            (Some(a), Some(b)) => Some((a, b)),
            _ => None,
        }
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.a.size_hint()
    }

    #[inline]
    fn nth(&mut self, n: usize) -> Option<Self::Item> {
        // Random-access advance: both columns skip together.
        match (self.a.nth(n), self.b.nth(n)) {
            (Some(a), Some(b)) => Some((a, b)),
            _ => None,
        }
    }

    #[inline]
    fn count(self) -> usize {
        self.a.count()
    }
}

impl<A, B> DoubleEndedIterator for Zip<A, B>
where
    A: DoubleEndedIterator,
    B: DoubleEndedIterator,
{
    #[inline]
    fn next_back(&mut self) -> Option<Self::Item> {
        // Equal remaining lengths make the two backs line up.
        match (self.a.next_back(), self.b.next_back()) {
            (Some(a), Some(b)) => Some((a, b)),
            _ => None,
        }
    }
}

impl<A, B> ExactSizeIterator for Zip<A, B>
where
    A: ExactSizeIterator,
    B: ExactSizeIterator,
{
    #[inline]
    fn len(&self) -> usize {
        self.a.len()
    }
}

impl<A: FusedIterator, B: FusedIterator> FusedIterator for Zip<A, B> {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lockstep_iteration() {
        let keys = [1, 2, 3];
        let vals = [1.5f64, 2.5, 3.5];
        let zipped: Vec<(&i32, &f64)> = Zip::new(keys.iter(), vals.iter()).collect();
        assert_eq!(zipped, vec![(&1, &1.5), (&2, &2.5), (&3, &3.5)]);
    }

    #[test]
    fn test_double_ended() {
        let keys = [1, 2, 3];
        let vals = ["a", "b", "c"];
        let mut it = Zip::new(keys.iter(), vals.iter());
        assert_eq!(it.next_back(), Some((&3, &"c")));
        assert_eq!(it.next(), Some((&1, &"a")));
        assert_eq!(it.next_back(), Some((&2, &"b")));
        assert_eq!(it.next(), None);
    }

    #[test]
    fn test_exact_size_and_nth() {
        let keys = [10, 20, 30, 40];
        let vals = [1, 2, 3, 4];
        let mut it = Zip::new(keys.iter(), vals.iter());
        assert_eq!(it.len(), 4);
        assert_eq!(it.nth(2), Some((&30, &3)));
        assert_eq!(it.len(), 1);
    }

    #[test]
    fn test_unzip_projection() {
        let keys = [1, 2, 3];
        let vals = ["x", "y", "z"];
        let mut it = Zip::new(keys.iter(), vals.iter());
        it.next();
        let rest: Vec<&i32> = it.unzip_first().collect();
        assert_eq!(rest, vec![&2, &3]);
    }

    #[test]
    fn test_write_through() {
        let mut keys = vec![1, 2, 3];
        let mut vals = vec![10, 20, 30];
        for (_, v) in Zip::new(keys.iter_mut(), vals.iter_mut()) {
            *v += 1;
        }
        assert_eq!(vals, vec![11, 21, 31]);
    }
}
