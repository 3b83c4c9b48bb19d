//! lazyq - Lazy, composable queries over in-memory sequences.
//!
//! lazyq builds pipelines of stages over a source and runs them only when a
//! terminal operation drains them. It supports:
//!
//! - Closure stages: filter, distinct, projection
//! - Field stages that look fields up by name on each element as it passes
//! - Grouping into maps, keeping the last item or a list of items per key
//! - Materialization into caller-owned containers, type-checked per element
//!
//! # Quick Start
//!
//! ```rust
//! use std::collections::HashMap;
//! use lazyq::{Query, Value};
//!
//! #[derive(Debug, Clone, lazyq_macros::Record)]
//! struct Task {
//!     name: String,
//!     priority: i32,
//!     done: bool,
//! }
//!
//! let tasks = vec![
//!     Task { name: "Write docs".into(), priority: 3, done: false },
//!     Task { name: "Fix bug".into(), priority: 5, done: true },
//!     Task { name: "Ship".into(), priority: 5, done: false },
//! ];
//!
//! let mut names: Vec<Value> = Vec::new();
//! Query::from_slice(&tasks)
//!     .filter(|t| !t.done)
//!     .select_field("name")
//!     .assign_to(&mut names)
//!     .unwrap();
//! assert_eq!(names, vec![Value::from("Write docs".to_string()), Value::from("Ship".to_string())]);
//!
//! let mut by_priority: HashMap<i32, Vec<String>> = HashMap::new();
//! Query::from_slice(&tasks)
//!     .group_lists_field("name")
//!     .by_field("priority")
//!     .assign_to_map(&mut by_priority)
//!     .unwrap();
//! assert_eq!(by_priority[&5], vec!["Fix bug".to_string(), "Ship".to_string()]);
//! ```
//!
//! # Evaluation
//!
//! Building a query does no work and cannot fail, with the single exception
//! of [`Query::filter_matches`], which compiles its pattern up front. Every
//! terminal call is a fresh traversal of the source: per-traversal state such
//! as the set of elements seen by [`Query::distinct`] starts empty each time.
//! Terminals that need only a prefix ([`Query::first`], [`Query::any`]) stop
//! pulling from the source as soon as they have their answer.
//!
//! # Dynamic values
//!
//! Field lookups and projections produce [`Value`]s, which carry any type
//! implementing [`Reflect`]. Records expose their fields through [`Record`],
//! which the `derive` feature can generate. Concrete types come back when a
//! query is materialized: the target container names its element type and
//! every element is checked against it.
//!
//! | Failure | Error |
//! |---------|-------|
//! | Field lookup on a non-record | [`QueryError::UnsupportedShape`] |
//! | Field missing on a record | [`QueryError::FieldNotFound`] |
//! | Value of the wrong type | [`QueryError::TypeMismatch`] |
//! | Container cannot hold the elements | [`QueryError::InvalidTarget`] |
//! | Bad regular expression | [`QueryError::InvalidPattern`] |
//!
//! # Features
//!
//! - `derive`: re-exports `#[derive(Record)]` from `lazyq-macros`, so it can
//!   be used as `lazyq::Record`.

mod error;
pub mod field;
mod grouping;
mod materialize;
mod query;
pub mod reflect;
mod source;
mod value;

// Re-export public API
pub use error::{QueryError, Result};
pub use grouping::{DeferredGrouping, Grouping};
pub use materialize::{MapTarget, SequenceTarget};
pub use query::{Flow, Query, Step};
pub use reflect::{Record, Reflect, Shape};
pub use value::Value;

#[cfg(feature = "derive")]
pub use lazyq_macros::Record;
