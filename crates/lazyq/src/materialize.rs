//! Materialization: draining queries and groupings into caller-owned
//! containers.
//!
//! The target declares the concrete types it holds. Elements and selected
//! keys or items are checked against those types as they arrive. Results
//! are staged and only written once the whole traversal has succeeded, so a
//! failed call leaves the target exactly as it was.

use std::any::{type_name, Any, TypeId};
use std::collections::{BTreeMap, HashMap, VecDeque};
use std::hash::{BuildHasher, Hash};
use std::ops::ControlFlow;

use tracing::debug;

use crate::error::{QueryError, Result};
use crate::grouping::Grouping;
use crate::query::Query;
use crate::reflect::Reflect;
use crate::value::Value;

/// An ordered container that query results can be appended to.
pub trait SequenceTarget {
    /// The element type the container holds.
    type Element: 'static;

    /// Appends one element at the end.
    fn append(&mut self, element: Self::Element);
}

impl<E: 'static> SequenceTarget for Vec<E> {
    type Element = E;

    fn append(&mut self, element: E) {
        self.push(element);
    }
}

impl<E: 'static> SequenceTarget for VecDeque<E> {
    type Element = E;

    fn append(&mut self, element: E) {
        self.push_back(element);
    }
}

/// A key-value container that groupings can be written into.
pub trait MapTarget {
    /// The key type the container holds.
    type Key: 'static;
    /// The value type the container holds.
    type Value: 'static;

    /// Borrows the value stored under `key`, if any.
    fn entry_mut(&mut self, key: &Self::Key) -> Option<&mut Self::Value>;

    /// Stores `value` under `key`, replacing any previous value.
    fn put(&mut self, key: Self::Key, value: Self::Value);
}

impl<K, V, S> MapTarget for HashMap<K, V, S>
where
    K: Eq + Hash + 'static,
    V: 'static,
    S: BuildHasher,
{
    type Key = K;
    type Value = V;

    fn entry_mut(&mut self, key: &K) -> Option<&mut V> {
        self.get_mut(key)
    }

    fn put(&mut self, key: K, value: V) {
        self.insert(key, value);
    }
}

impl<K, V> MapTarget for BTreeMap<K, V>
where
    K: Ord + 'static,
    V: 'static,
{
    type Key = K;
    type Value = V;

    fn entry_mut(&mut self, key: &K) -> Option<&mut V> {
        self.get_mut(key)
    }

    fn put(&mut self, key: K, value: V) {
        self.insert(key, value);
    }
}

impl<'a, T: Reflect> Query<'a, T> {
    /// Appends every element to `target`, in traversal order.
    ///
    /// Each element must be a `C::Element` or a [`Value`] wrapping one.
    /// A target of [`Value`]s accepts every element. Anything else fails with
    /// [`QueryError::InvalidTarget`]; when the element type alone rules the
    /// target out, the call fails before the source is touched. On failure
    /// the target is left unchanged.
    ///
    /// ```
    /// use lazyq::Query;
    ///
    /// let items = [3, 1, 2];
    /// let mut kept: Vec<i32> = Vec::new();
    /// Query::from_slice(&items).filter(|n| *n > 1).assign_to(&mut kept).unwrap();
    /// assert_eq!(kept, vec![3, 2]);
    ///
    /// let mut values: Vec<lazyq::Value> = Vec::new();
    /// Query::from_slice(&items).assign_to(&mut values).unwrap();
    /// assert_eq!(values[0], lazyq::Value::from(3));
    /// ```
    pub fn assign_to<C>(&self, target: &mut C) -> Result<()>
    where
        C: SequenceTarget,
        C::Element: Clone,
    {
        let target_name = type_name::<C>();
        if !may_hold::<T, C::Element>() {
            return Err(QueryError::InvalidTarget {
                target: target_name,
                element: type_name::<T>(),
            });
        }

        let mut staged = Vec::new();
        self.try_for_each(|item| {
            let element = Reflect::type_name(&item);
            let converted = cast::<T, C::Element>(item).ok_or(QueryError::InvalidTarget {
                target: target_name,
                element,
            })?;
            staged.push(converted);
            Ok(ControlFlow::Continue(()))
        })?;

        debug!(target = target_name, count = staged.len(), "assigning query results");
        for element in staged {
            target.append(element);
        }
        Ok(())
    }
}

impl<'a, T: 'a> Grouping<'a, T> {
    /// Writes every key and item into `target`.
    ///
    /// With the overwrite policy the map's value type must be the item type
    /// and the last item per key wins. With the list policy the map's value
    /// type must be `Vec` of the item type; items are appended in traversal
    /// order, creating the list the first time a key is seen. Keys must be
    /// `M::Key`. Either map type may be [`Value`] to accept anything.
    ///
    /// A disagreeing key or item fails with [`QueryError::TypeMismatch`];
    /// selector failures propagate as they are. On failure the target is
    /// left unchanged.
    pub fn assign_to_map<M>(&self, target: &mut M) -> Result<()>
    where
        M: MapTarget,
        M::Key: Clone,
        M::Value: Clone,
    {
        debug!(
            target = type_name::<M>(),
            overwrite = self.overwrite(),
            "assigning grouping"
        );
        if self.overwrite() {
            self.assign_overwriting(target)
        } else {
            self.assign_lists(target)
        }
    }

    fn assign_overwriting<M>(&self, target: &mut M) -> Result<()>
    where
        M: MapTarget,
        M::Key: Clone,
        M::Value: Clone,
    {
        let mut staged = Vec::new();
        self.try_for_each_entry(|key, item| {
            let key = key_of::<M::Key>(key)?;
            let actual = item.type_name();
            let item = cast::<Value, M::Value>(item)
                .ok_or_else(|| QueryError::type_mismatch::<M::Value>(actual))?;
            staged.push((key, item));
            Ok(())
        })?;

        debug!(count = staged.len(), "writing grouped values");
        for (key, item) in staged {
            target.put(key, item);
        }
        Ok(())
    }

    fn assign_lists<M>(&self, target: &mut M) -> Result<()>
    where
        M: MapTarget,
        M::Key: Clone,
    {
        let mut staged = Vec::new();
        self.try_for_each_entry(|key, item| {
            let key = key_of::<M::Key>(key)?;
            if !holds_list_of::<M::Value>(&item) {
                return Err(QueryError::type_mismatch::<M::Value>(item.type_name()));
            }
            staged.push((key, item));
            Ok(())
        })?;

        debug!(count = staged.len(), "writing grouped lists");
        for (key, item) in staged {
            // The list type was checked while staging, so writes cannot fail.
            match target.entry_mut(&key) {
                Some(list) => {
                    let appended = append_to_list(list, &item);
                    debug_assert!(appended, "staged item does not fit its list");
                }
                None => {
                    let list = new_list::<M::Value>(&item);
                    debug_assert!(list.is_some(), "staged item does not fit its list");
                    if let Some(list) = list {
                        target.put(key, list);
                    }
                }
            }
        }
        Ok(())
    }
}

/// Whether elements of type `T` can possibly be stored as `E`.
fn may_hold<T: 'static, E: 'static>() -> bool {
    let element = TypeId::of::<T>();
    let target = TypeId::of::<E>();
    element == target || element == TypeId::of::<Value>() || target == TypeId::of::<Value>()
}

/// Moves `item` into an `E`: directly when the types match, by wrapping it
/// when `E` is [`Value`], or by cloning out of a [`Value`].
fn cast<T: Reflect, E: Clone + 'static>(item: T) -> Option<E> {
    let mut slot = Some(item);
    if let Some(same) = (&mut slot as &mut dyn Any).downcast_mut::<Option<E>>() {
        return same.take();
    }
    let mut value = Some(Value::new(slot.take()?));
    if let Some(wrapped) = (&mut value as &mut dyn Any).downcast_mut::<Option<E>>() {
        return wrapped.take();
    }
    value?.downcast::<E>()
}

fn key_of<K: Clone + 'static>(key: Value) -> Result<K> {
    let actual = key.type_name();
    cast::<Value, K>(key).ok_or_else(|| QueryError::type_mismatch::<K>(actual))
}

fn holds_list_of<V: 'static>(item: &Value) -> bool {
    let list = TypeId::of::<V>();
    list == TypeId::of::<Vec<Value>>() || list == item.list_type_id()
}

fn new_list<V: 'static>(item: &Value) -> Option<V> {
    let list: Box<dyn Any> = if TypeId::of::<V>() == TypeId::of::<Vec<Value>>() {
        Box::new(vec![item.clone()])
    } else {
        item.to_list()
    };
    list.downcast::<V>().ok().map(|list| *list)
}

fn append_to_list<V: 'static>(list: &mut V, item: &Value) -> bool {
    let list: &mut dyn Any = list;
    if let Some(values) = list.downcast_mut::<Vec<Value>>() {
        values.push(item.clone());
        return true;
    }
    item.push_onto(list)
}
