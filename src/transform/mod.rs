//! Record transformation
//!
//! Shapes raw records to their stream schema before emission: deselected
//! fields are dropped and primitive values coerced to the declared type.

mod transformer;
mod types;

pub use transformer::{SchemaTransformer, Transformer};
pub use types::{JsonType, SchemaTypes};
