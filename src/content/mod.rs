//! Word content: the catalog asset and text lookup over it.
//!
//! The catalog is produced offline by the dictionary pipeline and is
//! read-only at runtime. The lookup index is derived from it once, when the
//! catalog is built.

pub mod catalog;
pub mod lookup;

pub use catalog::{Catalog, CatalogError, LinkedSegment};
pub use lookup::{highlight, split_words, Segment, Token, WordIndex};
