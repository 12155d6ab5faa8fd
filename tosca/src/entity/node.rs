//! `NodeInstance` (§3, §4.7).

use std::sync::Arc;

use indexmap::IndexMap;
use serde_yaml::{Mapping, Value};
use tosca_core::constraint::LengthSemantics;
use tosca_core::kind::EntityKind;
use tosca_core::reserved::single_slot_key;
use tosca_core::schema::TypeDescriptor;

use crate::entity::capability::CapabilityInstance;
use crate::entity::interface::InterfaceOperationInstance;
use crate::entity::relation::RelationInstance;
use crate::error::{ResolveError, TopologyError};
use crate::property::Property;
use crate::topology::Topology;

/// A node template bound to its type: a view materialized on demand from
/// the type descriptor plus the template fragment. Borrows its owning
/// [`Topology`] for the duration of a query; it does not outlive it (§3
/// Ownership).
pub struct NodeInstance<'t> {
    pub(crate) name: String,
    pub(crate) raw: Mapping,
    pub(crate) type_descriptor: Arc<TypeDescriptor>,
    pub(crate) topology: &'t Topology,
}

impl<'t> NodeInstance<'t> {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn type_descriptor(&self) -> &Arc<TypeDescriptor> {
        &self.type_descriptor
    }

    /// Every property declared on the node's type (§4.7
    /// `NodeInstance.properties`). Unknown template properties are not
    /// rejected here — only `validate()` reports them, per §4.7's note that
    /// "unknown properties in the template fail with `UnknownPropertyError`
    /// during validation (not materialization)".
    pub fn properties(&self) -> Vec<Property<'t>> {
        let Some(node) = self.type_descriptor.as_node() else {
            return Vec::new();
        };
        let template_properties = self.raw.get("properties").and_then(Value::as_mapping);
        node.properties
            .iter()
            .map(|(name, schema)| Property {
                name: name.clone(),
                schema: schema.clone(),
                raw_value: template_properties.and_then(|m| m.get(name.as_str())).cloned(),
                parent_template: self.name.clone(),
                topology: self.topology,
            })
            .collect()
    }

    pub fn property(&self, name: &str) -> Option<Property<'t>> {
        self.properties().into_iter().find(|p| p.name == name)
    }

    /// Every capability declared on the node's type, its type resolved
    /// against the capability table (§4.7 `NodeInstance.capabilities`).
    pub fn capabilities(&self) -> Result<Vec<CapabilityInstance<'t>>, TopologyError> {
        let Some(node) = self.type_descriptor.as_node() else {
            return Ok(Vec::new());
        };
        let template_capabilities = self.raw.get("capabilities").and_then(Value::as_mapping);
        node.capabilities
            .iter()
            .map(|(name, decl)| {
                let type_descriptor = self
                    .topology
                    .hierarchy()
                    .get(&decl.type_name, Some(EntityKind::Capabilities), false)
                    .ok_or_else(|| TopologyError::UnknownType {
                        template: self.name.clone(),
                        type_name: decl.type_name.clone(),
                    })?;
                let raw = template_capabilities
                    .and_then(|m| m.get(name.as_str()))
                    .and_then(Value::as_mapping)
                    .cloned()
                    .unwrap_or_default();
                Ok(CapabilityInstance {
                    name: name.clone(),
                    raw,
                    type_descriptor,
                    parent_template: self.name.clone(),
                    topology: self.topology,
                })
            })
            .collect()
    }

    pub fn capability(&self, name: &str) -> Result<Option<CapabilityInstance<'t>>, TopologyError> {
        Ok(self.capabilities()?.into_iter().find(|c| c.name == name))
    }

    /// Pairs each type-level requirement declaration with the matching
    /// template requirement entry (by slot name) and selects its relation
    /// class, per §4.7's priority rules.
    pub fn requirements(&self) -> Result<Vec<RelationInstance<'t>>, TopologyError> {
        let Some(node) = self.type_descriptor.as_node() else {
            return Ok(Vec::new());
        };
        let template_requirements = self.parse_template_requirements()?;

        let mut out = Vec::with_capacity(node.requirements.len());
        for spec in &node.requirements {
            let template_entry = template_requirements.get(&spec.slot);
            let explicit_relation_type = template_entry
                .and_then(|m| m.get("relation_type"))
                .and_then(Value::as_str);
            let class_name = match explicit_relation_type {
                Some(rt) => rt.to_string(),
                None => match spec.slot.as_str() {
                    "host" => "HostedOn".to_string(),
                    "dependency" => "DependsOn".to_string(),
                    _ => "ConnectsTo".to_string(),
                },
            };
            let type_descriptor = self
                .topology
                .hierarchy()
                .get(&class_name, Some(EntityKind::Relations), false)
                .ok_or_else(|| TopologyError::UnknownType {
                    template: self.name.clone(),
                    type_name: class_name.clone(),
                })?;
            let target_raw = template_entry
                .and_then(|m| m.get(spec.slot.as_str()))
                .cloned()
                .or_else(|| spec.target_type.clone().map(Value::from))
                .unwrap_or(Value::Null);
            out.push(RelationInstance {
                slot: spec.slot.clone(),
                target_raw,
                type_descriptor,
                topology: self.topology,
            });
        }
        Ok(out)
    }

    fn parse_template_requirements(&self) -> Result<IndexMap<String, Mapping>, TopologyError> {
        let Some(seq) = self.raw.get("requirements").and_then(Value::as_sequence) else {
            return Ok(IndexMap::new());
        };
        let mut out = IndexMap::new();
        for entry in seq {
            let Some(mapping) = entry.as_mapping() else { continue };
            let slot = single_slot_key(mapping).map_err(|candidates| TopologyError::AmbiguousRequirement {
                template: self.name.clone(),
                candidates,
            })?;
            out.insert(slot, mapping.clone());
        }
        Ok(out)
    }

    /// Selects the node's single interface type (§4.7
    /// `NodeInstance.interfaces`) and materializes one
    /// [`InterfaceOperationInstance`] per declared operation.
    pub fn interfaces(&self) -> Result<Vec<InterfaceOperationInstance<'t>>, TopologyError> {
        use tosca_core::schema::InterfaceUsage;

        let Some(node) = self.type_descriptor.as_node() else {
            return Ok(Vec::new());
        };
        let interface_type_name = match &node.interfaces {
            InterfaceUsage::None => return Ok(Vec::new()),
            InterfaceUsage::Mapping { interface_type, .. } => interface_type,
            InterfaceUsage::Sequence { interface_type } => interface_type,
        };
        let interface_type = self
            .topology
            .hierarchy()
            .get(interface_type_name, Some(EntityKind::Interfaces), false)
            .ok_or_else(|| TopologyError::UnknownType {
                template: self.name.clone(),
                type_name: interface_type_name.clone(),
            })?;
        let Some(interface) = interface_type.as_interface() else {
            return Ok(Vec::new());
        };
        let template_operations = self.raw.get("interfaces").and_then(Value::as_mapping);
        Ok(interface
            .operations
            .iter()
            .map(|(op_name, op_schema)| InterfaceOperationInstance {
                name: op_name.clone(),
                description: op_schema.description.clone(),
                schema_implementation: op_schema.implementation.clone(),
                inputs_schema: op_schema.inputs.clone(),
                raw: template_operations.and_then(|m| m.get(op_name.as_str())).cloned(),
                parent_template: self.name.clone(),
                topology: self.topology,
            })
            .collect())
    }

    /// Structural checks over this node (§4.9). Never throws for an
    /// individual failure — malformed structure (e.g. an unresolvable type)
    /// is folded into a message string instead.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        self.validate_unknown_properties(&mut errors);
        self.validate_properties(&mut errors);
        self.validate_requirements(&mut errors);
        self.validate_capabilities(&mut errors);
        self.validate_interfaces(&mut errors);
        errors
    }

    fn validate_unknown_properties(&self, errors: &mut Vec<String>) {
        let Some(node) = self.type_descriptor.as_node() else { return };
        let Some(template_properties) = self.raw.get("properties").and_then(Value::as_mapping) else {
            return;
        };
        for key in template_properties.keys().filter_map(Value::as_str) {
            if !node.properties.contains_key(key) {
                errors.push(
                    ResolveError::UnknownProperty {
                        entity: self.name.clone(),
                        property: key.to_string(),
                    }
                    .to_string(),
                );
            }
        }
    }

    fn validate_properties(&self, errors: &mut Vec<String>) {
        for property in self.properties() {
            match property.value() {
                Ok(Some(value)) => {
                    for constraint in &property.schema().constraints {
                        if !constraint.evaluate(&value, LengthSemantics::Strict) {
                            errors.push(format!(
                                "property `{}` on `{}` does not satisfy its constraints",
                                property.name(),
                                self.name
                            ));
                        }
                    }
                }
                Ok(None) => {
                    if property.schema().required {
                        errors.push(format!(
                            "required property `{}` on `{}` has no value and no default",
                            property.name(),
                            self.name
                        ));
                    }
                }
                Err(err) => errors.push(err.to_string()),
            }
        }
    }

    fn validate_requirements(&self, errors: &mut Vec<String>) {
        match self.requirements() {
            Ok(requirements) => {
                for requirement in &requirements {
                    match requirement.target() {
                        Ok(_) => errors.extend(requirement.validate()),
                        Err(err) => errors.push(err.to_string()),
                    }
                }
            }
            Err(err) => errors.push(err.to_string()),
        }
    }

    fn validate_capabilities(&self, errors: &mut Vec<String>) {
        match self.capabilities() {
            Ok(capabilities) => {
                for capability in &capabilities {
                    errors.extend(capability.validate());
                }
            }
            Err(err) => errors.push(err.to_string()),
        }
    }

    fn validate_interfaces(&self, errors: &mut Vec<String>) {
        match self.interfaces() {
            Ok(operations) => {
                for operation in &operations {
                    errors.extend(operation.validate());
                }
            }
            Err(err) => errors.push(err.to_string()),
        }
    }
}
