//! The closed tag set of TOSCA entity kinds.

use strum::{Display, EnumIter};

/// The closed tag set `{nodes, capabilities, relations, interfaces}` that a
/// [`TypeDescriptor`](crate::schema::TypeDescriptor) is classified by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
pub enum EntityKind {
    #[strum(serialize = "nodes")]
    Nodes,
    #[strum(serialize = "capabilities")]
    Capabilities,
    #[strum(serialize = "relations")]
    Relations,
    #[strum(serialize = "interfaces")]
    Interfaces,
}

impl EntityKind {
    /// The fixed probe order used by [`TypeHierarchy::get`](crate::schema::TypeHierarchy::get)
    /// when no kind is specified, and by schema loading.
    pub const ALL: [EntityKind; 4] = [
        EntityKind::Nodes,
        EntityKind::Capabilities,
        EntityKind::Relations,
        EntityKind::Interfaces,
    ];

    /// The dotted prefix a fully qualified type name of this kind must start
    /// with, e.g. `"tosca.nodes."`.
    pub fn type_prefix(self) -> &'static str {
        match self {
            EntityKind::Nodes => "tosca.nodes.",
            EntityKind::Capabilities => "tosca.capabilities.",
            EntityKind::Relations => "tosca.relations.",
            EntityKind::Interfaces => "tosca.interfaces.",
        }
    }
}

/// Splits a fully qualified type name into its short (last dotted segment)
/// form, e.g. `"tosca.nodes.WebApplication.WordPress"` -> `"WordPress"`.
pub fn short_name(qualified: &str) -> &str {
    qualified.rsplit('.').next().unwrap_or(qualified)
}
