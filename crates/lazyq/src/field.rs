//! Field lookup by name.
//!
//! A field name is resolved every time an element is inspected, never when
//! the query is built. An element that is not a record fails with
//! [`QueryError::UnsupportedShape`]; a record without the field fails with
//! [`QueryError::FieldNotFound`]. Nothing is cached between elements, so a
//! sequence of [`Value`]s holding different record types can succeed on some
//! elements and fail on others.

use std::rc::Rc;

use tracing::trace;

use crate::error::{QueryError, Result};
use crate::reflect::{Reflect, Shape};
use crate::value::Value;

/// A shared selector from an element to a dynamic value.
pub type Selector<'a, T> = Rc<dyn Fn(&T) -> Result<Value> + 'a>;

/// Reads the field called exactly `name` from `item`.
///
/// # Example
///
/// ```
/// use lazyq::{field, QueryError};
///
/// let err = field::resolve(&5i32, "len").unwrap_err();
/// assert!(matches!(err, QueryError::UnsupportedShape { .. }));
/// ```
pub fn resolve(item: &dyn Reflect, name: &str) -> Result<Value> {
    match item.shape() {
        Shape::Record(record) => record.field(name).ok_or_else(|| {
            trace!(
                field = name,
                type_name = item.type_name(),
                available = ?record.field_names(),
                "field not found"
            );
            QueryError::FieldNotFound {
                field: name.to_string(),
                type_name: item.type_name(),
            }
        }),
        Shape::Opaque => {
            trace!(field = name, type_name = item.type_name(), "element is not a record");
            Err(QueryError::UnsupportedShape {
                field: name.to_string(),
                type_name: item.type_name(),
            })
        }
    }
}

/// Builds a selector that resolves `name` on each element it is given.
///
/// Building the selector never fails; see [`resolve`] for what happens when
/// it runs.
pub fn resolver<T: Reflect>(
    name: impl Into<String>,
) -> impl Fn(&T) -> Result<Value> + Clone + 'static {
    let name: Rc<str> = name.into().into();
    move |item: &T| resolve(item, &name)
}

/// Resolves `name` and requires the value to be a `R`.
pub(crate) fn resolver_of<T, R>(
    name: impl Into<String>,
) -> impl Fn(&T) -> Result<R> + Clone + 'static
where
    T: Reflect,
    R: Reflect + Clone,
{
    let resolve = resolver::<T>(name);
    move |item: &T| {
        let value = resolve(item)?;
        value
            .downcast::<R>()
            .ok_or_else(|| QueryError::type_mismatch::<R>(value.type_name()))
    }
}
