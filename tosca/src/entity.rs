//! Runtime entity views (§3): materialized on demand from a
//! [`TypeDescriptor`](tosca_core::schema::TypeDescriptor) plus a template
//! fragment. None of these own the [`Topology`](crate::topology::Topology)
//! they borrow from.

mod capability;
mod interface;
mod node;
mod relation;

pub use capability::CapabilityInstance;
pub use interface::InterfaceOperationInstance;
pub use node::NodeInstance;
pub use relation::RelationInstance;
