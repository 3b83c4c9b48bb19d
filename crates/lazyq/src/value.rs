//! The type-erased [`Value`] that dynamic stages produce.
//!
//! Field lookups, projections and grouping selectors all return a [`Value`].
//! Concrete types come back only at the materialization boundary, where the
//! target container declares what it holds.

use std::any::{Any, TypeId};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::Rc;

use crate::error::Result;
use crate::field;
use crate::reflect::{Reflect, Shape};

/// A cheaply cloneable dynamic value.
///
/// Equality and hashing go through [`Reflect`], so values of different
/// concrete types are never equal and a `Value` can be used as a map key or
/// deduplicated.
///
/// # Example
///
/// ```
/// use lazyq::Value;
///
/// let value = Value::new(42i64);
/// assert!(value.is::<i64>());
/// assert_eq!(value.downcast_ref::<i64>(), Some(&42));
/// assert_eq!(value.downcast_ref::<i32>(), None);
/// assert_eq!(value, Value::from(42i64));
/// assert_ne!(value, Value::from(42i32));
/// ```
#[derive(Clone)]
pub struct Value(Rc<dyn Reflect>);

impl Value {
    /// Wraps a value. Wrapping a `Value` returns it unchanged.
    pub fn new<T: Reflect>(value: T) -> Self {
        if let Some(inner) = (&value as &dyn Any).downcast_ref::<Value>() {
            return inner.clone();
        }
        Value(Rc::new(value))
    }

    /// The name of the wrapped concrete type.
    pub fn type_name(&self) -> &'static str {
        self.0.type_name()
    }

    /// Returns `true` if the wrapped value is a `T`.
    pub fn is<T: Any>(&self) -> bool {
        self.0.as_any().is::<T>()
    }

    /// Borrows the wrapped value as a `T`, if it is one.
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.0.as_any().downcast_ref::<T>()
    }

    /// Clones the wrapped value out as a `T`, if it is one.
    pub fn downcast<T: Any + Clone>(&self) -> Option<T> {
        self.downcast_ref::<T>().cloned()
    }

    /// The runtime shape of the wrapped value.
    pub fn shape(&self) -> Shape<'_> {
        self.0.shape()
    }

    /// Reads a field of the wrapped value by name.
    ///
    /// Fails with [`QueryError::UnsupportedShape`](crate::QueryError) if the
    /// value is not a record and [`QueryError::FieldNotFound`](crate::QueryError)
    /// if the record has no such field.
    pub fn get(&self, name: &str) -> Result<Value> {
        field::resolve(self, name)
    }

    /// Borrows the wrapped value as a trait object.
    pub fn as_reflect(&self) -> &dyn Reflect {
        &*self.0
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&*self.0, f)
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.0.reflect_eq(other.as_reflect())
    }
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.reflect_hash(state);
    }
}

// A `Value` is transparent: it answers for the value it wraps.
impl Reflect for Value {
    fn as_any(&self) -> &dyn Any {
        self.0.as_any()
    }

    fn type_name(&self) -> &'static str {
        self.0.type_name()
    }

    fn shape(&self) -> Shape<'_> {
        self.0.shape()
    }

    fn reflect_eq(&self, other: &dyn Reflect) -> bool {
        self.0.reflect_eq(other)
    }

    fn reflect_hash(&self, state: &mut dyn Hasher) {
        self.0.reflect_hash(state);
    }

    fn list_type_id(&self) -> TypeId {
        self.0.list_type_id()
    }

    fn to_list(&self) -> Box<dyn Any> {
        self.0.to_list()
    }

    fn push_onto(&self, list: &mut dyn Any) -> bool {
        self.0.push_onto(list)
    }
}

macro_rules! value_from {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl From<$ty> for Value {
                fn from(value: $ty) -> Self {
                    Value::new(value)
                }
            }
        )+
    };
}

value_from!(
    i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64, bool, char,
    String, &'static str,
);
