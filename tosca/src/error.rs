//! Per-template errors: value resolution and topology binding (§7).
//!
//! Structural errors raised while loading the schema itself live in
//! `tosca_core::error::SchemaError`; these surface lazily, on access to the
//! affected entity, rather than at load time.

use thiserror::Error;

/// A deferred-function value (`get_input`/`get_property`/`get_ref_property`)
/// could not be resolved (§4.6, §7).
#[derive(Debug, Error)]
pub enum ResolveError {
    /// `get_input` named an input the topology does not declare.
    #[error("unknown input `{name}` referenced by property `{property}` on `{template}`")]
    UnknownInput {
        name: String,
        template: String,
        property: String,
    },

    /// `get_property` named a template the topology does not declare.
    #[error("unknown entity `{entity}` referenced by property `{property}` on `{template}`")]
    UnknownEntity {
        entity: String,
        template: String,
        property: String,
    },

    /// A named property was not declared on the entity being queried.
    #[error("unknown property `{property}` on `{entity}`")]
    UnknownProperty { entity: String, property: String },

    /// `get_ref_property` named a requirement slot absent from the
    /// originating template, or one whose target is unbound.
    #[error(
        "unknown or unbound requirement slot `{slot}` referenced by property `{property}` on `{template}`"
    )]
    UnknownSlot {
        slot: String,
        template: String,
        property: String,
    },

    /// `get_ref_property`'s three-argument form named a capability, or a
    /// property within it, that does not exist on the resolved target.
    #[error(
        "unknown capability property `{capability}.{property}` referenced via slot `{slot}` on target `{target}` from `{template}`"
    )]
    UnknownCapabilityProperty {
        capability: String,
        property: String,
        slot: String,
        target: String,
        template: String,
    },

    /// Deferred-function evaluation exceeded the configured recursion
    /// depth limit (§5, default 64).
    #[error("resolution cycle detected: exceeded maximum depth of {limit}")]
    ResolutionCycle { limit: u32 },
}

/// A structural error while binding a topology document to the type
/// hierarchy (§7).
#[derive(Debug, Error)]
pub enum TopologyError {
    /// The topology document could not be parsed as YAML at all.
    #[error("failed to parse topology document: {0}")]
    Parse(#[from] serde_yaml::Error),

    /// The top-level document, or one of its recognized sub-mappings, was
    /// not a mapping.
    #[error("topology document must be a mapping")]
    NotAMapping,

    /// A node template referenced a type absent from the type hierarchy.
    #[error("node template `{template}` references unknown type `{type_name}`")]
    UnknownType { template: String, type_name: String },

    /// An entry under `node_templates` was not itself a mapping.
    #[error("node template `{template}` is not a mapping")]
    TemplateNotAMapping { template: String },

    /// A requirement entry on a template had zero or more than one
    /// non-framework key.
    #[error("requirement on template `{template}` has an ambiguous slot name; candidates: {}", .candidates.join(", "))]
    AmbiguousRequirement {
        template: String,
        candidates: Vec<String>,
    },

    /// `bind_inputs` was called with a name the topology does not declare.
    #[error("unknown input `{name}`")]
    UnknownInput { name: String },

    /// `bind_inputs` was called twice for the same input.
    #[error("input `{name}` is already bound")]
    InputAlreadyBound { name: String },

    /// Loading the schema document itself, or a document-level type
    /// extension (`node_types`/`capability_types`/`relation_types`),
    /// failed structurally.
    #[error(transparent)]
    Schema(#[from] tosca_core::error::SchemaError),
}
