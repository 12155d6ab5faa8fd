//! `InterfaceOperationInstance` (§3, §4.7 `NodeInstance.interfaces`).

use indexmap::IndexMap;
use serde_yaml::Value;
use tosca_core::schema::PropertySchema;

use crate::property::Property;
use crate::topology::Topology;

/// A single operation (`create`, `configure`, `start`, ...) of the one
/// interface type a node or relation exposes, carrying the operation's
/// typed `inputs` and whatever the template supplied under
/// `interfaces[op_name]`.
pub struct InterfaceOperationInstance<'t> {
    pub(crate) name: String,
    pub(crate) description: Option<String>,
    pub(crate) schema_implementation: Option<String>,
    pub(crate) inputs_schema: IndexMap<String, PropertySchema>,
    pub(crate) raw: Option<Value>,
    pub(crate) parent_template: String,
    pub(crate) topology: &'t Topology,
}

impl<'t> InterfaceOperationInstance<'t> {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// The `implementation` field: a bare string shorthand or the
    /// `implementation` key of a mapping on the template, falling back to
    /// the interface type's own declared implementation when the template
    /// doesn't override it.
    pub fn implementation(&self) -> Option<String> {
        match &self.raw {
            Some(Value::String(s)) => Some(s.clone()),
            Some(Value::Mapping(m)) => m
                .get("implementation")
                .and_then(Value::as_str)
                .map(str::to_string)
                .or_else(|| self.schema_implementation.clone()),
            _ => self.schema_implementation.clone(),
        }
    }

    fn raw_inputs(&self) -> Option<&serde_yaml::Mapping> {
        self.raw.as_ref().and_then(Value::as_mapping).and_then(|m| m.get("inputs")).and_then(Value::as_mapping)
    }

    pub fn properties(&self) -> Vec<Property<'t>> {
        let raw_inputs = self.raw_inputs();
        self.inputs_schema
            .iter()
            .map(|(name, schema)| Property {
                name: name.clone(),
                schema: schema.clone(),
                raw_value: raw_inputs.and_then(|m| m.get(name.as_str())).cloned(),
                parent_template: self.parent_template.clone(),
                topology: self.topology,
            })
            .collect()
    }

    pub fn property(&self, name: &str) -> Option<Property<'t>> {
        self.properties().into_iter().find(|p| p.name == name)
    }

    /// §4.9: "each interface operation has a non-empty `implementation`
    /// field."
    pub fn validate(&self) -> Vec<String> {
        match self.implementation() {
            Some(impl_name) if !impl_name.is_empty() => Vec::new(),
            _ => vec![format!("interface operation `{}` has no implementation", self.name)],
        }
    }
}
