//! Implementation of the `#[derive(Record)]` macro.
//!
//! Generates by-name field access and the type-erased value behavior that
//! lazyq needs to move a struct through dynamic stages.

mod attrs;
mod derive;

pub use derive::record_derive_impl;
