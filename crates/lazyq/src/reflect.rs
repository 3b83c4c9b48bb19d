//! Runtime capabilities for dynamic values.
//!
//! [`Reflect`] is implemented by every type that can travel through a query
//! as a [`Value`]: it gives type-erased equality, hashing, downcasting and
//! list building. [`Record`] is the optional capability of exposing fields by
//! name, which is what field-name based stages look for.
//!
//! Both are usually derived with `#[derive(Record)]` from `lazyq-macros`.
//! Scalar types that have no fields get their [`Reflect`] impl from
//! [`reflect_value!`](crate::reflect_value).

use std::any::{Any, TypeId};
use std::fmt;
use std::hash::Hasher;
use std::rc::Rc;
use std::sync::Arc;

use crate::value::Value;

/// The runtime shape of a value.
pub enum Shape<'a> {
    /// A record whose fields can be read by name.
    Record(&'a dyn Record),
    /// Anything else: scalars, collections, enums.
    Opaque,
}

impl Shape<'_> {
    /// Returns `true` if this is a record.
    pub fn is_record(&self) -> bool {
        matches!(self, Shape::Record(_))
    }
}

impl fmt::Debug for Shape<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Shape::Record(record) => f
                .debug_tuple("Record")
                .field(&record.field_names())
                .finish(),
            Shape::Opaque => f.write_str("Opaque"),
        }
    }
}

/// Field access by name.
///
/// # Manual Implementation
///
/// ```
/// use lazyq::{Record, Value};
///
/// struct Task {
///     title: String,
///     done: bool,
/// }
///
/// impl Record for Task {
///     fn field(&self, name: &str) -> Option<Value> {
///         match name {
///             "title" => Some(Value::new(self.title.clone())),
///             "done" => Some(Value::new(self.done)),
///             _ => None,
///         }
///     }
///
///     fn field_names(&self) -> &'static [&'static str] {
///         &["title", "done"]
///     }
/// }
/// ```
pub trait Record {
    /// Returns the current value of the field called exactly `name`, or
    /// `None` if there is no such field.
    fn field(&self, name: &str) -> Option<Value>;

    /// Names of all readable fields, in declaration order.
    fn field_names(&self) -> &'static [&'static str];
}

/// Type-erased behavior shared by every dynamic value.
///
/// Implementations are generated by `#[derive(Record)]` for structs and by
/// [`reflect_value!`](crate::reflect_value) for opaque types. Equality and
/// hashing must agree: values that compare equal must hash identically.
pub trait Reflect: Any + fmt::Debug {
    /// Upcasts to [`Any`] for downcasting.
    fn as_any(&self) -> &dyn Any;

    /// The name of the concrete type, used in error messages.
    fn type_name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// The runtime shape. Pointer types report the shape of their pointee.
    fn shape(&self) -> Shape<'_> {
        Shape::Opaque
    }

    /// Compares with another dynamic value. Values of different concrete
    /// types are never equal.
    fn reflect_eq(&self, other: &dyn Reflect) -> bool;

    /// Feeds this value into a hasher.
    fn reflect_hash(&self, state: &mut dyn Hasher);

    /// The [`TypeId`] of `Vec<Self>`.
    fn list_type_id(&self) -> TypeId;

    /// Builds a `Vec<Self>` holding a clone of this value.
    fn to_list(&self) -> Box<dyn Any>;

    /// Pushes a clone of this value onto `list` if it is a `Vec<Self>`.
    /// Returns `false`, leaving `list` untouched, otherwise.
    fn push_onto(&self, list: &mut dyn Any) -> bool;
}

/// Implements [`Reflect`] for opaque types.
///
/// The types must be `Clone + PartialEq + Hash + Debug + 'static`.
///
/// ```
/// #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// enum Status {
///     Open,
///     Closed,
/// }
///
/// lazyq::reflect_value!(Status);
///
/// let value = lazyq::Value::new(Status::Open);
/// assert_eq!(value.downcast_ref::<Status>(), Some(&Status::Open));
/// ```
#[macro_export]
macro_rules! reflect_value {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl $crate::Reflect for $ty {
                fn as_any(&self) -> &dyn ::std::any::Any {
                    self
                }

                fn reflect_eq(&self, other: &dyn $crate::Reflect) -> bool {
                    $crate::reflect::__private::eq_by(self, other)
                }

                fn reflect_hash(&self, state: &mut dyn ::std::hash::Hasher) {
                    $crate::reflect::__private::hash_by(self, state)
                }

                fn list_type_id(&self) -> ::std::any::TypeId {
                    ::std::any::TypeId::of::<::std::vec::Vec<Self>>()
                }

                fn to_list(&self) -> ::std::boxed::Box<dyn ::std::any::Any> {
                    $crate::reflect::__private::list_of(self)
                }

                fn push_onto(&self, list: &mut dyn ::std::any::Any) -> bool {
                    $crate::reflect::__private::push_onto(self, list)
                }
            }
        )+
    };
}

/// Helpers used by generated code. Not part of the public API.
#[doc(hidden)]
pub mod __private {
    use std::any::Any;
    use std::hash::{Hash, Hasher};

    use super::Reflect;

    pub fn eq_by<T: PartialEq + 'static>(this: &T, other: &dyn Reflect) -> bool {
        other
            .as_any()
            .downcast_ref::<T>()
            .is_some_and(|other| this == other)
    }

    pub fn hash_by<T: Hash>(this: &T, mut state: &mut dyn Hasher) {
        this.hash(&mut state);
    }

    pub fn list_of<T: Clone + 'static>(this: &T) -> Box<dyn Any> {
        Box::new(vec![this.clone()])
    }

    pub fn push_onto<T: Clone + 'static>(this: &T, list: &mut dyn Any) -> bool {
        match list.downcast_mut::<Vec<T>>() {
            Some(list) => {
                list.push(this.clone());
                true
            }
            None => false,
        }
    }
}

reflect_value!(
    i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, bool, char, String,
    &'static str, (),
);

// Floats compare with `==`; zero is hashed as one value so that
// `0.0 == -0.0` keeps hashing consistent.
macro_rules! reflect_float {
    ($($ty:ty),+) => {
        $(
            impl Reflect for $ty {
                fn as_any(&self) -> &dyn Any {
                    self
                }

                fn reflect_eq(&self, other: &dyn Reflect) -> bool {
                    __private::eq_by(self, other)
                }

                fn reflect_hash(&self, state: &mut dyn Hasher) {
                    let bits = if *self == 0.0 { 0 } else { self.to_bits() as u64 };
                    state.write_u64(bits);
                }

                fn list_type_id(&self) -> TypeId {
                    TypeId::of::<Vec<Self>>()
                }

                fn to_list(&self) -> Box<dyn Any> {
                    __private::list_of(self)
                }

                fn push_onto(&self, list: &mut dyn Any) -> bool {
                    __private::push_onto(self, list)
                }
            }
        )+
    };
}

reflect_float!(f32, f64);

impl<T: Reflect + Clone> Reflect for Option<T> {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn reflect_eq(&self, other: &dyn Reflect) -> bool {
        match other.as_any().downcast_ref::<Self>() {
            Some(other) => match (self, other) {
                (Some(a), Some(b)) => a.reflect_eq(b),
                (None, None) => true,
                _ => false,
            },
            None => false,
        }
    }

    fn reflect_hash(&self, state: &mut dyn Hasher) {
        match self {
            Some(inner) => {
                state.write_u8(1);
                inner.reflect_hash(state);
            }
            None => state.write_u8(0),
        }
    }

    fn list_type_id(&self) -> TypeId {
        TypeId::of::<Vec<Self>>()
    }

    fn to_list(&self) -> Box<dyn Any> {
        __private::list_of(self)
    }

    fn push_onto(&self, list: &mut dyn Any) -> bool {
        __private::push_onto(self, list)
    }
}

impl<T: Reflect + Clone> Reflect for Vec<T> {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn reflect_eq(&self, other: &dyn Reflect) -> bool {
        match other.as_any().downcast_ref::<Self>() {
            Some(other) => {
                self.len() == other.len()
                    && self.iter().zip(other).all(|(a, b)| a.reflect_eq(b))
            }
            None => false,
        }
    }

    fn reflect_hash(&self, state: &mut dyn Hasher) {
        state.write_usize(self.len());
        for item in self {
            item.reflect_hash(state);
        }
    }

    fn list_type_id(&self) -> TypeId {
        TypeId::of::<Vec<Self>>()
    }

    fn to_list(&self) -> Box<dyn Any> {
        __private::list_of(self)
    }

    fn push_onto(&self, list: &mut dyn Any) -> bool {
        __private::push_onto(self, list)
    }
}

// Smart pointers keep their own type for downcasting but look through to
// the pointee for shape and equality.
macro_rules! reflect_pointer {
    ($ptr:ident, $bound:path) => {
        impl<T: Reflect + $bound> Reflect for $ptr<T> {
            fn as_any(&self) -> &dyn Any {
                self
            }

            fn shape(&self) -> Shape<'_> {
                (**self).shape()
            }

            fn reflect_eq(&self, other: &dyn Reflect) -> bool {
                other
                    .as_any()
                    .downcast_ref::<Self>()
                    .is_some_and(|other| (**self).reflect_eq(&**other))
            }

            fn reflect_hash(&self, state: &mut dyn Hasher) {
                (**self).reflect_hash(state);
            }

            fn list_type_id(&self) -> TypeId {
                TypeId::of::<Vec<Self>>()
            }

            fn to_list(&self) -> Box<dyn Any> {
                __private::list_of(self)
            }

            fn push_onto(&self, list: &mut dyn Any) -> bool {
                __private::push_onto(self, list)
            }
        }
    };
}

reflect_pointer!(Box, Clone);
reflect_pointer!(Rc, Sized);
reflect_pointer!(Arc, Sized);

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::hash_map::DefaultHasher;

    #[derive(Debug, Clone, PartialEq)]
    struct Point {
        x: i64,
        y: i64,
    }

    impl Record for Point {
        fn field(&self, name: &str) -> Option<Value> {
            match name {
                "x" => Some(Value::new(self.x)),
                "y" => Some(Value::new(self.y)),
                _ => None,
            }
        }

        fn field_names(&self) -> &'static [&'static str] {
            &["x", "y"]
        }
    }

    impl Reflect for Point {
        fn as_any(&self) -> &dyn Any {
            self
        }

        fn shape(&self) -> Shape<'_> {
            Shape::Record(self)
        }

        fn reflect_eq(&self, other: &dyn Reflect) -> bool {
            __private::eq_by(self, other)
        }

        fn reflect_hash(&self, state: &mut dyn Hasher) {
            self.x.reflect_hash(state);
            self.y.reflect_hash(state);
        }

        fn list_type_id(&self) -> TypeId {
            TypeId::of::<Vec<Self>>()
        }

        fn to_list(&self) -> Box<dyn Any> {
            __private::list_of(self)
        }

        fn push_onto(&self, list: &mut dyn Any) -> bool {
            __private::push_onto(self, list)
        }
    }

    fn hash_of(value: &dyn Reflect) -> u64 {
        let mut hasher = DefaultHasher::new();
        value.reflect_hash(&mut hasher);
        hasher.finish()
    }

    #[test]
    fn scalars_are_opaque() {
        assert!(!42i64.shape().is_record());
        assert!(!"text".to_string().shape().is_record());
        assert!(!true.shape().is_record());
    }

    #[test]
    fn manual_record_impl() {
        let point = Point { x: 1, y: 2 };
        assert!(point.shape().is_record());
        assert_eq!(point.field("x"), Some(Value::new(1i64)));
        assert_eq!(point.field("z"), None);
        assert_eq!(point.field_names(), &["x", "y"]);
    }

    #[test]
    fn pointers_report_pointee_shape() {
        let point = Point { x: 1, y: 2 };
        assert!(Box::new(point.clone()).shape().is_record());
        assert!(Rc::new(point.clone()).shape().is_record());
        assert!(Arc::new(point).shape().is_record());
        assert!(!Box::new(5u8).shape().is_record());
    }

    #[test]
    fn eq_requires_same_concrete_type() {
        assert!(1i64.reflect_eq(&1i64));
        assert!(!1i64.reflect_eq(&2i64));
        assert!(!1i64.reflect_eq(&1i32));
        assert!(Some(3u8).reflect_eq(&Some(3u8)));
        assert!(!Some(3u8).reflect_eq(&None::<u8>));
        assert!(vec![1, 2].reflect_eq(&vec![1, 2]));
        assert!(!vec![1, 2].reflect_eq(&vec![1]));
    }

    #[test]
    fn equal_values_hash_alike() {
        assert_eq!(hash_of(&"a".to_string()), hash_of(&"a".to_string()));
        assert_eq!(hash_of(&0.0f64), hash_of(&-0.0f64));
        assert!(0.0f64.reflect_eq(&-0.0f64));
        assert_eq!(hash_of(&Box::new(7u32)), hash_of(&7u32));
    }

    #[test]
    fn nan_is_not_equal_to_itself() {
        assert!(!f64::NAN.reflect_eq(&f64::NAN));
    }

    #[test]
    fn list_building() {
        let list = 5i32.to_list();
        assert_eq!(list.downcast_ref::<Vec<i32>>(), Some(&vec![5]));

        let mut existing: Vec<i32> = vec![1];
        assert!(2i32.push_onto(&mut existing));
        assert_eq!(existing, vec![1, 2]);

        let mut wrong: Vec<String> = Vec::new();
        assert!(!2i32.push_onto(&mut wrong));
        assert!(wrong.is_empty());

        assert_eq!(5i32.list_type_id(), TypeId::of::<Vec<i32>>());
    }

    #[test]
    fn type_names() {
        assert_eq!(5i32.type_name(), "i32");
        assert_eq!(true.type_name(), "bool");
    }
}
