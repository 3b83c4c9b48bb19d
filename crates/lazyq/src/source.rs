//! Sources: turning existing collections into queries.

use std::ops::ControlFlow;

use crate::query::Query;

impl<'a, T: 'a> Query<'a, T> {
    /// Creates a query over a re-iterable source.
    ///
    /// Every traversal iterates a fresh clone of `source`, so sources should
    /// be cheap to clone (borrowing iterators, ranges, shared handles).
    ///
    /// ```
    /// use lazyq::Query;
    ///
    /// let squares = Query::from_source((1..=4).map(|n| n * n));
    /// assert_eq!(squares.to_vec().unwrap(), vec![1, 4, 9, 16]);
    /// ```
    pub fn from_source<S>(source: S) -> Self
    where
        S: IntoIterator<Item = T> + Clone + 'a,
    {
        Query::from_fn(move |sink| {
            for item in source.clone() {
                if sink(item)?.is_break() {
                    return Ok(ControlFlow::Break(()));
                }
            }
            Ok(ControlFlow::Continue(()))
        })
    }

    /// Creates a query over a slice, yielding clones in slice order.
    pub fn from_slice(items: &'a [T]) -> Self
    where
        T: Clone,
    {
        Query::from_source(items.iter().cloned())
    }
}

impl<'a, T: Clone + 'a> From<&'a [T]> for Query<'a, T> {
    fn from(items: &'a [T]) -> Self {
        Query::from_slice(items)
    }
}

impl<'a, T: Clone + 'a> From<&'a Vec<T>> for Query<'a, T> {
    fn from(items: &'a Vec<T>) -> Self {
        Query::from_slice(items)
    }
}
