//! Error types for the lazyq crate.

use thiserror::Error;

/// Errors raised while building or draining a query.
///
/// Apart from [`QueryError::InvalidPattern`], every variant is raised during
/// a traversal, at the moment the offending element or target is examined.
/// The traversal stops immediately and the error is returned from the
/// terminal call that started it.
#[derive(Debug, Error)]
pub enum QueryError {
    /// A field was looked up on an element that is not a record.
    #[error("cannot read field '{field}': {type_name} is not a record")]
    UnsupportedShape {
        field: String,
        type_name: &'static str,
    },

    /// A field was looked up on a record that does not have it.
    #[error("field '{field}' not found on {type_name}")]
    FieldNotFound {
        field: String,
        type_name: &'static str,
    },

    /// A resolved value does not have the type the consumer requires.
    #[error("type mismatch: expected {expected}, got {actual}")]
    TypeMismatch {
        expected: &'static str,
        actual: &'static str,
    },

    /// A materialization target cannot hold the elements of the query.
    #[error("invalid target: {target} cannot hold elements of type {element}")]
    InvalidTarget {
        target: &'static str,
        element: &'static str,
    },

    /// Invalid regular expression pattern.
    #[error("invalid regex pattern: {0}")]
    InvalidPattern(#[from] regex::Error),
}

impl QueryError {
    pub(crate) fn type_mismatch<E: ?Sized>(actual: &'static str) -> Self {
        QueryError::TypeMismatch {
            expected: std::any::type_name::<E>(),
            actual,
        }
    }
}

/// Result type for lazyq operations.
pub type Result<T> = std::result::Result<T, QueryError>;
