//! Data module: per-element attribute storage.
#![warn(missing_docs)]

pub mod attributes;

pub use attributes::{AttrValue, AttributeStore};
