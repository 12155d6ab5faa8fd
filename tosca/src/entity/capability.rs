//! `CapabilityInstance` (§3, §4.7 `NodeInstance.capabilities`).

use std::sync::Arc;

use serde_yaml::{Mapping, Value};
use tosca_core::schema::TypeDescriptor;

use crate::property::Property;
use crate::topology::Topology;

/// A facet a node offers, materialized from the capability type's
/// properties plus whatever the template overrides under
/// `capabilities[name]`.
pub struct CapabilityInstance<'t> {
    pub(crate) name: String,
    pub(crate) raw: Mapping,
    pub(crate) type_descriptor: Arc<TypeDescriptor>,
    pub(crate) parent_template: String,
    pub(crate) topology: &'t Topology,
}

impl<'t> CapabilityInstance<'t> {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn type_descriptor(&self) -> &Arc<TypeDescriptor> {
        &self.type_descriptor
    }

    /// Every property declared on the capability's type, each paired with
    /// whatever raw value the template supplied (or `None`).
    pub fn properties(&self) -> Vec<Property<'t>> {
        let Some(capability) = self.type_descriptor.as_capability() else {
            return Vec::new();
        };
        let template_properties = self.raw.get("properties").and_then(Value::as_mapping);
        capability
            .properties
            .iter()
            .map(|(name, schema)| Property {
                name: name.clone(),
                schema: schema.clone(),
                raw_value: template_properties.and_then(|m| m.get(name.as_str())).cloned(),
                parent_template: self.parent_template.clone(),
                topology: self.topology,
            })
            .collect()
    }

    pub fn property(&self, name: &str) -> Option<Property<'t>> {
        self.properties().into_iter().find(|p| p.name == name)
    }

    /// Capabilities never fail validation on their own account (§4.9); a
    /// node's malformed capability type surfaces as `UnknownTypeError` at
    /// materialization, before a `CapabilityInstance` can exist.
    pub fn validate(&self) -> Vec<String> {
        Vec::new()
    }
}
