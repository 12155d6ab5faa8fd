//! Schema metamodel, type hierarchy, and merge/topological-sort engine for
//! TOSCA Simple YAML Profile documents.
//!
//! This crate has no notion of a *template*; it only knows about *types*.
//! Binding templates to these types, resolving property values, and
//! validating a loaded topology live in the `tosca` crate.

pub mod constraint;
pub mod deferred;
pub mod error;
pub mod kind;
pub mod merge;
pub mod reserved;
pub mod schema;
pub mod topo;

pub use error::SchemaError;
pub use kind::EntityKind;
