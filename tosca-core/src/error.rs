//! Structural errors raised while loading a schema document.
//!
//! These surface immediately during [`TypeHierarchy::load_schema`](crate::schema::TypeHierarchy::load_schema);
//! per-template errors raised while binding a topology to these types live in
//! the `tosca` crate's `error` module instead.

use crate::kind::EntityKind;

/// An error occurred while parsing or assembling a schema document into a
/// [`TypeHierarchy`](crate::schema::TypeHierarchy).
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    /// The document could not be parsed as YAML at all.
    #[error("failed to parse schema document: {0}")]
    Parse(#[from] serde_yaml::Error),

    /// The top-level document was not a mapping.
    #[error("schema document must be a mapping of type names to definitions")]
    NotAMapping,

    /// An entry under a recognized type name was not itself a mapping.
    #[error("entry `{name}` is not a mapping")]
    EntryNotAMapping {
        /// The fully qualified type name whose fragment was malformed.
        name: String,
    },

    /// A `derived_from` chain within one [`EntityKind`] contains a cycle.
    #[error("cyclic derived_from chain in {kind}: {}", .types.join(", "))]
    CyclicDerivation {
        /// The kind whose derivation graph is cyclic.
        kind: EntityKind,
        /// At least one type name participating in the cycle; in practice
        /// every type left over after the last successful topological pass.
        types: Vec<String>,
    },

    /// A type's `derived_from` names a parent that does not exist in the
    /// same [`EntityKind`] (Invariant I1).
    #[error("type `{name}` derives from unknown parent `{parent}` in {kind}")]
    UnknownParent {
        /// The kind being loaded.
        kind: EntityKind,
        /// The child type name.
        name: String,
        /// The parent name it named via `derived_from`.
        parent: String,
    },

    /// A constraint entry used an operator outside the closed set in §4.5.
    #[error("unknown constraint operator `{op}`")]
    UnknownConstraint {
        /// The operator name found in the document.
        op: String,
    },

    /// A node type declared a capability with no `type` attribute.
    ///
    /// The original Python implementation silently produced a capability
    /// with no properties in this case; we surface a structural error
    /// instead since a capability with no resolvable type can never be
    /// materialized.
    #[error("node type `{node}` declares capability `{capability}` with no `type`")]
    MissingCapabilityType {
        /// The node type doing the declaring.
        node: String,
        /// The capability's name within the node type.
        capability: String,
    },

    /// A requirement entry had zero or more than one non-framework key, so
    /// its slot name is ambiguous at the type-declaration level.
    #[error("requirement entry in `{type_name}` has an ambiguous slot name; candidates: {}", .candidates.join(", "))]
    AmbiguousSlot {
        /// The type declaring the requirement.
        type_name: String,
        /// The keys left over after removing framework-reserved ones.
        candidates: Vec<String>,
    },
}
