//! Grouping builders.
//!
//! A grouping pairs a key selector with an item selector over a query. The
//! two selectors can be given in either order:
//!
//! - item first: [`Query::group`] / [`Query::group_lists`] return a
//!   [`DeferredGrouping`], completed by [`DeferredGrouping::by`].
//! - key first: [`Query::group_by`] / [`Query::group_lists_by`] return a
//!   complete [`Grouping`] whose items are the elements themselves.
//!
//! The "lists" variants collect every item under a key; the others keep
//! only the last item seen for each key. Both selector kinds come in a
//! closure form and a field-name form.
//!
//! ```
//! use std::collections::HashMap;
//! use lazyq::Query;
//!
//! let words = ["apple", "avocado", "banana"];
//! let mut by_initial: HashMap<char, Vec<&str>> = HashMap::new();
//! Query::from_slice(&words)
//!     .group_lists(|w| *w)
//!     .by(|w| w.chars().next().unwrap_or(' '))
//!     .assign_to_map(&mut by_initial)
//!     .unwrap();
//! assert_eq!(by_initial[&'a'], vec!["apple", "avocado"]);
//! ```

use std::ops::ControlFlow;
use std::rc::Rc;

use crate::error::Result;
use crate::field::{self, Selector};
use crate::query::Query;
use crate::reflect::Reflect;
use crate::value::Value;

/// A complete grouping, ready to be materialized.
///
/// Built by [`Query::group_by`], [`Query::group_lists_by`] or
/// [`DeferredGrouping::by`]. Nothing runs until
/// [`assign_to_map`](Grouping::assign_to_map) is called.
pub struct Grouping<'a, T> {
    items: Query<'a, T>,
    key: Selector<'a, T>,
    item: Selector<'a, T>,
    overwrite: bool,
}

/// A grouping whose key selector is still missing.
///
/// The only thing to do with it is to supply the key with
/// [`by`](DeferredGrouping::by) or [`by_field`](DeferredGrouping::by_field).
pub struct DeferredGrouping<'a, T> {
    items: Query<'a, T>,
    item: Selector<'a, T>,
    overwrite: bool,
}

impl<T> Clone for Grouping<'_, T> {
    fn clone(&self) -> Self {
        Grouping {
            items: self.items.clone(),
            key: Rc::clone(&self.key),
            item: Rc::clone(&self.item),
            overwrite: self.overwrite,
        }
    }
}

impl<'a, T: 'a> Grouping<'a, T> {
    /// `true` if a repeated key replaces the earlier item, `false` if items
    /// are collected into lists.
    pub fn overwrite(&self) -> bool {
        self.overwrite
    }

    /// Runs one traversal, handing each element's key and item to `f`.
    /// The key is selected before the item.
    pub(crate) fn try_for_each_entry<F>(&self, mut f: F) -> Result<()>
    where
        F: FnMut(Value, Value) -> Result<()>,
    {
        self.items.try_for_each(|element| {
            let key = (self.key)(&element)?;
            let item = (self.item)(&element)?;
            f(key, item)?;
            Ok(ControlFlow::Continue(()))
        })
    }
}

impl<'a, T: 'a> DeferredGrouping<'a, T> {
    /// Supplies the key selector.
    pub fn by<F, K>(self, key: F) -> Grouping<'a, T>
    where
        F: Fn(&T) -> K + 'a,
        K: Reflect,
    {
        self.complete(selector(key))
    }

    /// Uses the field `name` as the key.
    pub fn by_field(self, name: impl Into<String>) -> Grouping<'a, T>
    where
        T: Reflect,
    {
        self.complete(Rc::new(field::resolver::<T>(name)))
    }

    fn complete(self, key: Selector<'a, T>) -> Grouping<'a, T> {
        Grouping {
            items: self.items,
            key,
            item: self.item,
            overwrite: self.overwrite,
        }
    }
}

impl<'a, T: 'a> Query<'a, T> {
    /// Groups the selected items, keeping the last one per key.
    /// The key comes from a following [`by`](DeferredGrouping::by).
    pub fn group<F, R>(self, item: F) -> DeferredGrouping<'a, T>
    where
        F: Fn(&T) -> R + 'a,
        R: Reflect,
    {
        self.deferred(selector(item), true)
    }

    /// Like [`group`](Query::group), selecting the field `name` as the item.
    pub fn group_field(self, name: impl Into<String>) -> DeferredGrouping<'a, T>
    where
        T: Reflect,
    {
        self.deferred(Rc::new(field::resolver::<T>(name)), true)
    }

    /// Groups the selected items into a list per key.
    /// The key comes from a following [`by`](DeferredGrouping::by).
    pub fn group_lists<F, R>(self, item: F) -> DeferredGrouping<'a, T>
    where
        F: Fn(&T) -> R + 'a,
        R: Reflect,
    {
        self.deferred(selector(item), false)
    }

    /// Like [`group_lists`](Query::group_lists), selecting the field `name`
    /// as the item.
    pub fn group_lists_field(self, name: impl Into<String>) -> DeferredGrouping<'a, T>
    where
        T: Reflect,
    {
        self.deferred(Rc::new(field::resolver::<T>(name)), false)
    }

    /// Groups whole elements by `key`, keeping the last element per key.
    pub fn group_by<F, K>(self, key: F) -> Grouping<'a, T>
    where
        T: Reflect + Clone,
        F: Fn(&T) -> K + 'a,
        K: Reflect,
    {
        self.keyed(selector(key), true)
    }

    /// Groups whole elements by their field `name`, keeping the last element
    /// per key.
    pub fn group_by_field(self, name: impl Into<String>) -> Grouping<'a, T>
    where
        T: Reflect + Clone,
    {
        self.keyed(Rc::new(field::resolver::<T>(name)), true)
    }

    /// Groups whole elements by `key` into a list per key.
    pub fn group_lists_by<F, K>(self, key: F) -> Grouping<'a, T>
    where
        T: Reflect + Clone,
        F: Fn(&T) -> K + 'a,
        K: Reflect,
    {
        self.keyed(selector(key), false)
    }

    /// Groups whole elements by their field `name` into a list per key.
    pub fn group_lists_by_field(self, name: impl Into<String>) -> Grouping<'a, T>
    where
        T: Reflect + Clone,
    {
        self.keyed(Rc::new(field::resolver::<T>(name)), false)
    }

    fn deferred(self, item: Selector<'a, T>, overwrite: bool) -> DeferredGrouping<'a, T> {
        DeferredGrouping {
            items: self,
            item,
            overwrite,
        }
    }

    fn keyed(self, key: Selector<'a, T>, overwrite: bool) -> Grouping<'a, T>
    where
        T: Reflect + Clone,
    {
        Grouping {
            items: self,
            key,
            item: Rc::new(identity::<T>),
            overwrite,
        }
    }
}

fn selector<'a, T, F, R>(select: F) -> Selector<'a, T>
where
    T: 'a,
    F: Fn(&T) -> R + 'a,
    R: Reflect,
{
    Rc::new(move |element: &T| -> Result<Value> { Ok(Value::new(select(element))) })
}

fn identity<T: Reflect + Clone>(element: &T) -> Result<Value> {
    Ok(Value::new(element.clone()))
}
