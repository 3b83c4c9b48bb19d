//! Proc macros for lazyq.
//!
//! # Available Macros
//!
//! - [`Record`] - Expose a struct's fields to lazyq's field-name stages
//!
//! The generated code refers to `::lazyq`, so the `lazyq` crate must be a
//! dependency of the crate using the derive. Enabling lazyq's `derive`
//! feature re-exports the macro as `lazyq::Record`.

mod record;

use proc_macro::TokenStream;
use syn::{parse_macro_input, DeriveInput};

/// Derives `lazyq::Record` and `lazyq::Reflect` for a struct.
///
/// Every named field becomes readable by name in queries: `filter_field`,
/// `select_field`, `group_field`, `by_field` and friends. Field values are
/// cloned out, so every exposed field type must implement `lazyq::Reflect`
/// and `Clone`. The struct itself must be `Clone + Debug + 'static`.
///
/// # Field Attributes
///
/// | Attribute | Description |
/// |-----------|-------------|
/// | `skip` | Hide this field from lookup, equality and hashing |
/// | `rename = "..."` | Use a custom name for lookups |
///
/// # Generated Code
///
/// 1. Field name constants (e.g., `Task::TITLE`, `Task::DONE`)
/// 2. `Record::field()` and `Record::field_names()`
/// 3. `Reflect`, with equality and hashing over the exposed fields
///
/// # Example
///
/// ```ignore
/// use lazyq::Query;
/// use lazyq_macros::Record;
///
/// #[derive(Debug, Clone, Record)]
/// struct Task {
///     title: String,
///
///     #[record(rename = "Done")]
///     done: bool,
///
///     #[record(skip)]
///     cache: Vec<u8>,
/// }
///
/// let tasks = vec![
///     Task { title: "Write docs".into(), done: false, cache: vec![] },
///     Task { title: "Fix bug".into(), done: true, cache: vec![] },
/// ];
///
/// let finished = Query::from_slice(&tasks)
///     .filter_field(Task::DONE)
///     .select_field(Task::TITLE)
///     .to_vec()
///     .unwrap();
/// assert_eq!(finished.len(), 1);
/// ```
#[proc_macro_derive(Record, attributes(record))]
pub fn record_derive(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    record::record_derive_impl(input)
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}
