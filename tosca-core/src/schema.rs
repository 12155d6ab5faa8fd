//! The schema metamodel: merged type descriptors and the hierarchy that
//! holds them (§3, §4.1, §4.4).

mod descriptor;
mod hierarchy;
mod loader;
mod property;

pub use descriptor::{
    CapabilityDecl, CapabilityType, InterfaceType, InterfaceUsage, NodeType, OperationSchema, RelationType,
    RequirementSpec, TypeData, TypeDescriptor,
};
pub use hierarchy::TypeHierarchy;
pub use property::PropertySchema;
