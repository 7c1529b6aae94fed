//! Model layer
//!
//! Rust types for the search service object schema.
//!
//! Structure:
//! - `resource_kind.rs` - the seven managed object kinds
//! - `knowledge_source.rs` - source kind discriminator and dependent-resource
//!   resolution
//! - `mod.rs` - public API re-exports

pub mod knowledge_source;
pub mod resource_kind;

pub use knowledge_source::{CreatedResources, SourceKind, created_resources};
pub use resource_kind::ResourceKind;
