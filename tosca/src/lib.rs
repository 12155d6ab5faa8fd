//! The topology façade: loads a TOSCA Simple YAML Profile document against
//! a type schema, binds templates to types, and resolves property and
//! output values, including the deferred functions `get_input`,
//! `get_property`, and `get_ref_property`.
//!
//! The type system itself — merging derived types, topological load order,
//! constraint evaluation — lives one layer down in `tosca_core`, which has
//! no notion of a template. This crate adds the template layer on top.

pub mod entity;
pub mod error;
pub mod property;
pub mod resolver;
pub mod topology;

pub use entity::{CapabilityInstance, InterfaceOperationInstance, NodeInstance, RelationInstance};
pub use error::{ResolveError, TopologyError};
pub use property::Property;
pub use resolver::ResolverLimits;
pub use topology::{InputSlot, OutputSlot, Topology};

pub use tosca_core::constraint::{Constraint, ConstraintOp, LengthSemantics};
pub use tosca_core::kind::EntityKind;
pub use tosca_core::schema::{
    CapabilityDecl, CapabilityType, InterfaceType, InterfaceUsage, NodeType, OperationSchema, PropertySchema,
    RelationType, RequirementSpec, TypeData, TypeDescriptor, TypeHierarchy,
};
pub use tosca_core::SchemaError;
