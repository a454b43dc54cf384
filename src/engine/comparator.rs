//! Key comparators, including transparent (heterogeneous) queries
//!
//! [`Comparator`] orders two stored keys; [`QueryComparator`] additionally
//! orders a stored key against a *query* type without materializing a key —
//! the transparent-comparator contract. [`NaturalOrder`] wires both up to
//! `Ord`, with heterogeneous queries following the `Borrow` convention of
//! `BTreeMap::get`, so a `String`-keyed container is queried with `&str`
//! allocation-free. [`FnComparator`] lifts a plain closure into a comparator
//! for custom or stateful orderings.

use std::borrow::Borrow;
use std::cmp::Ordering;

/// Orders two stored keys.
pub trait Comparator<K: ?Sized> {
    /// Three-way comparison of two stored keys
    fn cmp_keys(&self, a: &K, b: &K) -> Ordering;
}

/// Transparent comparison of a stored key against a query type.
///
/// `Q` need not be the key type; it only has to share the comparator's
/// ordering. Lookups parameterized over `QueryComparator` never construct a
/// temporary key.
pub trait QueryComparator<K: ?Sized, Q: ?Sized>: Comparator<K> {
    /// Three-way comparison of a stored key against a query
    fn cmp_key_query(&self, key: &K, query: &Q) -> Ordering;
}

/// The `Ord`-derived ordering, transparent over `Borrow`.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct NaturalOrder;

impl<K: Ord + ?Sized> Comparator<K> for NaturalOrder {
    #[inline]
    fn cmp_keys(&self, a: &K, b: &K) -> Ordering {
        a.cmp(b)
    }
}

impl<K, Q> QueryComparator<K, Q> for NaturalOrder
where
    K: Borrow<Q> + Ord,
    Q: Ord + ?Sized,
{
    #[inline]
    fn cmp_key_query(&self, key: &K, query: &Q) -> Ordering {
        key.borrow().cmp(query)
    }
}

/// Adapts a `Fn(&K, &K) -> Ordering` closure into a [`Comparator`].
///
/// ```rust
/// use seqmap::{FlatSet, FnComparator};
///
/// let mut set: FlatSet<i32, _> = FlatSet::with_comparator(FnComparator(|a: &i32, b: &i32| b.cmp(a)));
/// set.insert(1)?;
/// set.insert(3)?;
/// set.insert(2)?;
/// assert_eq!(set.iter().copied().collect::<Vec<_>>(), vec![3, 2, 1]);
/// # Ok::<(), seqmap::SeqMapError>(())
/// ```
#[derive(Debug, Default, Clone, Copy)]
pub struct FnComparator<F>(
    /// The comparison closure
    pub F,
);

impl<K, F> Comparator<K> for FnComparator<F>
where
    K: ?Sized,
    F: Fn(&K, &K) -> Ordering,
{
    #[inline]
    fn cmp_keys(&self, a: &K, b: &K) -> Ordering {
        (self.0)(a, b)
    }
}

impl<K, F> QueryComparator<K, K> for FnComparator<F>
where
    K: ?Sized,
    F: Fn(&K, &K) -> Ordering,
{
    #[inline]
    fn cmp_key_query(&self, key: &K, query: &K) -> Ordering {
        (self.0)(key, query)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_natural_order() {
        assert_eq!(NaturalOrder.cmp_keys(&1, &2), Ordering::Less);
        assert_eq!(NaturalOrder.cmp_keys(&2, &2), Ordering::Equal);
        assert_eq!(NaturalOrder.cmp_keys(&3, &2), Ordering::Greater);
    }

    #[test]
    fn test_transparent_query() {
        // String key queried by &str, no allocation
        let key = String::from("middle");
        assert_eq!(
            QueryComparator::<String, str>::cmp_key_query(&NaturalOrder, &key, "zz"),
            Ordering::Less
        );
        assert_eq!(
            QueryComparator::<String, str>::cmp_key_query(&NaturalOrder, &key, "middle"),
            Ordering::Equal
        );
    }

    #[test]
    fn test_closure_comparator() {
        let reverse = FnComparator(|a: &i32, b: &i32| b.cmp(a));
        assert_eq!(reverse.cmp_keys(&1, &2), Ordering::Greater);
        assert_eq!(reverse.cmp_key_query(&1, &1), Ordering::Equal);
    }
}
