//! The lazy query pipeline.
//!
//! A [`Query`] is a chain of stages over a source. Building a stage never
//! runs anything: each call returns a new query that wraps the previous one.
//! Work happens only when a terminal operation pushes elements through the
//! chain, and every terminal call is an independent traversal of the source.
//!
//! ```
//! use lazyq::Query;
//!
//! let numbers = [1, 2, 1, 3, 2, 4, 6];
//! let evens = Query::from_slice(&numbers)
//!     .distinct()
//!     .filter(|n| n % 2 == 0)
//!     .to_vec()
//!     .unwrap();
//! assert_eq!(evens, vec![2, 4, 6]);
//! ```

use std::collections::HashSet;
use std::hash::Hash;
use std::ops::ControlFlow;
use std::rc::Rc;

use regex::Regex;
use tracing::debug;

use crate::error::{QueryError, Result};
use crate::field;
use crate::reflect::Reflect;
use crate::value::Value;

/// Whether a traversal should keep going.
pub type Flow = ControlFlow<()>;

/// What a sink returns for each element it receives.
pub type Step = Result<Flow>;

type Traverse<'a, T> = dyn Fn(&mut dyn FnMut(T) -> Step) -> Step + 'a;

/// A lazy, restartable sequence of `T`.
///
/// Cloning a query is cheap and shares its stages. Stage methods consume
/// the receiver and return the extended query; terminal methods borrow it,
/// so the same query can be drained any number of times.
pub struct Query<'a, T> {
    traverse: Rc<Traverse<'a, T>>,
}

impl<T> Clone for Query<'_, T> {
    fn clone(&self) -> Self {
        Query {
            traverse: Rc::clone(&self.traverse),
        }
    }
}

impl<'a, T: 'a> Query<'a, T> {
    /// Creates a query from a push-style producer.
    ///
    /// The producer is called once per traversal. It must hand elements to
    /// the sink in a stable order, stop as soon as the sink returns
    /// `ControlFlow::Break` and pass sink errors straight back.
    ///
    /// ```
    /// use std::ops::ControlFlow;
    /// use lazyq::Query;
    ///
    /// let countdown = Query::from_fn(|sink| {
    ///     for n in (1..=3).rev() {
    ///         if sink(n)?.is_break() {
    ///             return Ok(ControlFlow::Break(()));
    ///         }
    ///     }
    ///     Ok(ControlFlow::Continue(()))
    /// });
    /// assert_eq!(countdown.to_vec().unwrap(), vec![3, 2, 1]);
    /// ```
    pub fn from_fn<F>(traverse: F) -> Self
    where
        F: Fn(&mut dyn FnMut(T) -> Step) -> Step + 'a,
    {
        Query {
            traverse: Rc::new(traverse),
        }
    }

    // ========================================================================
    // Stages
    // ========================================================================

    /// Keeps the elements for which `predicate` returns `true`.
    pub fn filter<P>(self, predicate: P) -> Query<'a, T>
    where
        P: Fn(&T) -> bool + 'a,
    {
        self.try_filter(move |item| Ok(predicate(item)))
    }

    /// Keeps the elements whose boolean field `name` is `true`.
    ///
    /// The field is resolved per element when the query runs. An element
    /// without the field, one that is not a record, or a field that is not a
    /// `bool` aborts the traversal with the matching [`QueryError`].
    pub fn filter_field(self, name: impl Into<String>) -> Query<'a, T>
    where
        T: Reflect,
    {
        self.try_filter(field::resolver_of::<T, bool>(name))
    }

    /// Keeps the elements whose string field `name` matches `pattern`.
    ///
    /// The pattern is compiled here, so an invalid pattern fails now with
    /// [`QueryError::InvalidPattern`]. The field must hold a `String` or a
    /// `&'static str`; anything else is a [`QueryError::TypeMismatch`].
    pub fn filter_matches(self, name: impl Into<String>, pattern: &str) -> Result<Query<'a, T>>
    where
        T: Reflect,
    {
        let regex = Regex::new(pattern)?;
        let resolve = field::resolver::<T>(name);
        Ok(self.try_filter(move |item| {
            let value = resolve(item)?;
            Ok(regex.is_match(text_of(&value)?))
        }))
    }

    /// Yields each element the first time an equal element is seen.
    ///
    /// The set of seen elements belongs to a single traversal.
    pub fn distinct(self) -> Query<'a, T>
    where
        T: Clone + Eq + Hash,
    {
        let upstream = self.traverse;
        Query::from_fn(move |sink| {
            let mut seen = HashSet::new();
            upstream(&mut |item: T| {
                if seen.insert(item.clone()) {
                    sink(item)
                } else {
                    Ok(ControlFlow::Continue(()))
                }
            })
        })
    }

    /// Maps every element to a dynamic value.
    pub fn select<F, R>(self, selector: F) -> Query<'a, Value>
    where
        F: Fn(&T) -> R + 'a,
        R: Reflect,
    {
        self.map_into(move |item| Ok(Value::new(selector(&item))))
    }

    /// Maps every element to the value of its field `name`.
    ///
    /// Fails like [`filter_field`](Query::filter_field), except that any
    /// field type is accepted.
    pub fn select_field(self, name: impl Into<String>) -> Query<'a, Value>
    where
        T: Reflect,
    {
        let resolve = field::resolver::<T>(name);
        self.map_into(move |item| resolve(&item))
    }

    /// Yields every element unchanged, as a dynamic value.
    pub fn widen(self) -> Query<'a, Value>
    where
        T: Reflect,
    {
        self.map_into(|item| Ok(Value::new(item)))
    }

    pub(crate) fn try_filter<P>(self, predicate: P) -> Query<'a, T>
    where
        P: Fn(&T) -> Result<bool> + 'a,
    {
        let upstream = self.traverse;
        Query::from_fn(move |sink| {
            upstream(&mut |item: T| {
                if predicate(&item)? {
                    sink(item)
                } else {
                    Ok(ControlFlow::Continue(()))
                }
            })
        })
    }

    fn map_into<R, F>(self, map: F) -> Query<'a, R>
    where
        R: 'a,
        F: Fn(T) -> Result<R> + 'a,
    {
        let upstream = self.traverse;
        Query::from_fn(move |sink| upstream(&mut |item: T| sink(map(item)?)))
    }

    // ========================================================================
    // Terminals
    // ========================================================================

    /// Pushes every element to `f` until it breaks or fails.
    ///
    /// Every other terminal is built on this one.
    pub fn try_for_each<F>(&self, mut f: F) -> Result<()>
    where
        F: FnMut(T) -> Step,
    {
        let mut pushed = 0usize;
        let outcome = (self.traverse)(&mut |item: T| {
            pushed += 1;
            f(item)
        });
        match &outcome {
            Ok(flow) => debug!(
                elements = pushed,
                stopped_early = flow.is_break(),
                "traversal finished"
            ),
            Err(err) => debug!(elements = pushed, error = %err, "traversal failed"),
        }
        outcome.map(|_| ())
    }

    /// Calls `f` for every element.
    pub fn for_each<F>(&self, mut f: F) -> Result<()>
    where
        F: FnMut(T),
    {
        self.try_for_each(|item| {
            f(item);
            Ok(ControlFlow::Continue(()))
        })
    }

    /// Returns the first element, pulling nothing after it.
    pub fn first(&self) -> Result<Option<T>> {
        let mut found = None;
        self.try_for_each(|item| {
            found = Some(item);
            Ok(ControlFlow::Break(()))
        })?;
        Ok(found)
    }

    /// Returns `true` as soon as an element matches `predicate`.
    pub fn any<P>(&self, predicate: P) -> Result<bool>
    where
        P: Fn(&T) -> bool,
    {
        let mut matched = false;
        self.try_for_each(|item| {
            if predicate(&item) {
                matched = true;
                return Ok(ControlFlow::Break(()));
            }
            Ok(ControlFlow::Continue(()))
        })?;
        Ok(matched)
    }

    /// Counts the elements.
    pub fn count(&self) -> Result<usize> {
        let mut count = 0;
        self.for_each(|_| count += 1)?;
        Ok(count)
    }

    /// Collects the elements into a new vector.
    pub fn to_vec(&self) -> Result<Vec<T>> {
        let mut items = Vec::new();
        self.for_each(|item| items.push(item))?;
        Ok(items)
    }
}

fn text_of(value: &Value) -> Result<&str> {
    if let Some(text) = value.downcast_ref::<String>() {
        return Ok(text);
    }
    if let Some(text) = value.downcast_ref::<&'static str>() {
        return Ok(text);
    }
    Err(QueryError::type_mismatch::<String>(value.type_name()))
}
