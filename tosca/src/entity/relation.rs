//! `RelationInstance` (§3, §4.7 `NodeInstance.requirements`).

use std::sync::Arc;

use serde_yaml::Value;
use tosca_core::schema::TypeDescriptor;

use crate::entity::node::NodeInstance;
use crate::error::TopologyError;
use crate::topology::Topology;

/// A requirement, bound to the relation type chosen per §4.7's priority
/// rules and carrying whatever raw target encoding the template (or the
/// type's own default) supplied.
pub struct RelationInstance<'t> {
    pub(crate) slot: String,
    pub(crate) target_raw: Value,
    pub(crate) type_descriptor: Arc<TypeDescriptor>,
    pub(crate) topology: &'t Topology,
}

impl<'t> RelationInstance<'t> {
    /// The requirement's slot name, e.g. `"host"` or `"database_endpoint"`.
    pub fn name(&self) -> &str {
        &self.slot
    }

    pub fn type_descriptor(&self) -> &Arc<TypeDescriptor> {
        &self.type_descriptor
    }

    /// Resolves the requirement's target per §4.7:
    ///
    /// - a string not starting with `tosca.` names another template, and is
    ///   resolved via [`Topology::get_template`];
    /// - a string starting with `tosca.` is an unbound requirement (the
    ///   orchestrator fills it later) — returns `Ok(None)`;
    /// - anything else (an inline mapping, or nothing at all) is an
    ///   anonymous or absent requirement — also `Ok(None)`.
    pub fn target(&self) -> Result<Option<NodeInstance<'t>>, TopologyError> {
        match &self.target_raw {
            Value::String(s) if !s.starts_with("tosca.") => self.topology.get_template(s),
            _ => Ok(None),
        }
    }

    /// Relations never fail validation on their own account (§4.9); an
    /// unresolvable relation type surfaces as `UnknownTypeError` at
    /// materialization, before a `RelationInstance` can exist.
    pub fn validate(&self) -> Vec<String> {
        Vec::new()
    }
}
