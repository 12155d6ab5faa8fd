//! Merged entity type descriptors (§3 `TypeDescriptor`).

use indexmap::IndexMap;
use serde_yaml::Value;

use crate::error::SchemaError;
use crate::kind::{short_name, EntityKind};
use crate::reserved::single_slot_key;

use super::property::PropertySchema;

/// A capability declared on a node type: just the capability's own type
/// name, per §4.7 (`NodeInstance.capabilities` resolves the declared `type`
/// against the capability type table).
#[derive(Debug, Clone)]
pub struct CapabilityDecl {
    pub type_name: String,
}

/// A single requirement declaration, either at the type level (schema) or,
/// once paired with a template entry, carried through to instantiation.
///
/// `lower_bound`/`upper_bound` are parsed and carried as inert metadata
/// (see SPEC_FULL §5.1) — nothing in this crate enforces cardinality.
#[derive(Debug, Clone)]
pub struct RequirementSpec {
    pub slot: String,
    pub target_type: Option<String>,
    pub relationship_type: Option<String>,
    pub lower_bound: Option<i64>,
    pub upper_bound: Option<i64>,
}

/// How a node or relation type names the single interface type it exposes
/// (§4.7 `NodeInstance.interfaces`).
#[derive(Debug, Clone, Default)]
pub enum InterfaceUsage {
    #[default]
    None,
    /// `interfaces: {name: {inputs: {...}}}` — only the first key is ever
    /// used, matching the original's single-lifecycle-per-node assumption.
    Mapping {
        interface_type: String,
        inputs: Option<Value>,
    },
    /// `interfaces: [name]` — a bare sequence, used with no inputs.
    Sequence { interface_type: String },
}

/// A single interface operation's schema: description, its default
/// `implementation` (overridable per template), and its typed `inputs`.
#[derive(Debug, Clone)]
pub struct OperationSchema {
    pub description: Option<String>,
    pub implementation: Option<String>,
    pub inputs: IndexMap<String, PropertySchema>,
}

/// Per-kind fields of a [`TypeDescriptor`], after merging with the parent
/// chain.
#[derive(Debug, Clone)]
pub enum TypeData {
    Node(NodeType),
    Capability(CapabilityType),
    Relation(RelationType),
    Interface(InterfaceType),
}

#[derive(Debug, Clone, Default)]
pub struct NodeType {
    pub properties: IndexMap<String, PropertySchema>,
    pub capabilities: IndexMap<String, CapabilityDecl>,
    pub requirements: Vec<RequirementSpec>,
    pub interfaces: InterfaceUsage,

    pub(super) raw_properties: Option<Value>,
    pub(super) raw_capabilities: Option<Value>,
    pub(super) raw_requirements: Option<Value>,
    pub(super) raw_interfaces: Option<Value>,
}

#[derive(Debug, Clone, Default)]
pub struct CapabilityType {
    pub properties: IndexMap<String, PropertySchema>,

    pub(super) raw_properties: Option<Value>,
}

#[derive(Debug, Clone, Default)]
pub struct RelationType {
    pub valid_targets: Vec<String>,
    pub interfaces: InterfaceUsage,

    pub(super) raw_valid_targets: Option<Value>,
    pub(super) raw_interfaces: Option<Value>,
}

#[derive(Debug, Clone, Default)]
pub struct InterfaceType {
    pub operations: IndexMap<String, OperationSchema>,

    pub(super) raw_operations: Option<Value>,
}

/// An entity type after merging with its parent chain (§3).
#[derive(Debug, Clone)]
pub struct TypeDescriptor {
    pub tosca_name: String,
    pub kind: EntityKind,
    pub derived_from: Option<String>,
    pub data: TypeData,
}

impl TypeDescriptor {
    /// The last dotted segment of `tosca_name`, e.g. `"WordPress"` for
    /// `"tosca.nodes.WebApplication.WordPress"`.
    pub fn short_name(&self) -> &str {
        short_name(&self.tosca_name)
    }

    pub fn as_node(&self) -> Option<&NodeType> {
        match &self.data {
            TypeData::Node(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_capability(&self) -> Option<&CapabilityType> {
        match &self.data {
            TypeData::Capability(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_relation(&self) -> Option<&RelationType> {
        match &self.data {
            TypeData::Relation(r) => Some(r),
            _ => None,
        }
    }

    pub fn as_interface(&self) -> Option<&InterfaceType> {
        match &self.data {
            TypeData::Interface(i) => Some(i),
            _ => None,
        }
    }
}

pub(super) fn parse_properties(
    value: Option<&Value>,
    type_name: &str,
) -> Result<IndexMap<String, PropertySchema>, SchemaError> {
    let Some(value) = value else {
        return Ok(IndexMap::new());
    };
    let mapping = value.as_mapping().ok_or_else(|| SchemaError::EntryNotAMapping {
        name: type_name.to_string(),
    })?;
    let mut out = IndexMap::with_capacity(mapping.len());
    for (key, schema_value) in mapping {
        let name = key.as_str().unwrap_or_default().to_string();
        out.insert(name, PropertySchema::parse(schema_value)?);
    }
    Ok(out)
}

pub(super) fn parse_capabilities(
    value: Option<&Value>,
    type_name: &str,
) -> Result<IndexMap<String, CapabilityDecl>, SchemaError> {
    let Some(value) = value else {
        return Ok(IndexMap::new());
    };
    let mapping = value.as_mapping().ok_or_else(|| SchemaError::EntryNotAMapping {
        name: type_name.to_string(),
    })?;
    let mut out = IndexMap::with_capacity(mapping.len());
    for (key, decl) in mapping {
        let name = key.as_str().unwrap_or_default().to_string();
        let type_name_attr = decl
            .as_mapping()
            .and_then(|m| m.get("type"))
            .and_then(Value::as_str)
            .or_else(|| decl.as_str());
        let Some(capability_type) = type_name_attr else {
            return Err(SchemaError::MissingCapabilityType {
                node: type_name.to_string(),
                capability: name,
            });
        };
        out.insert(
            name,
            CapabilityDecl {
                type_name: capability_type.to_string(),
            },
        );
    }
    Ok(out)
}

pub(super) fn parse_requirements(
    value: Option<&Value>,
    type_name: &str,
) -> Result<Vec<RequirementSpec>, SchemaError> {
    let Some(value) = value else {
        return Ok(Vec::new());
    };
    let Some(seq) = value.as_sequence() else {
        return Ok(Vec::new());
    };
    let mut out = Vec::with_capacity(seq.len());
    for entry in seq {
        let Some(mapping) = entry.as_mapping() else {
            continue;
        };
        let slot = single_slot_key(mapping).map_err(|candidates| SchemaError::AmbiguousSlot {
            type_name: type_name.to_string(),
            candidates,
        })?;
        let target_type = mapping.get(slot.as_str()).and_then(Value::as_str).map(str::to_string);
        let relationship_type = mapping
            .get("relationship_type")
            .and_then(Value::as_str)
            .map(str::to_string);
        let lower_bound = mapping.get("lower_bound").and_then(Value::as_i64);
        let upper_bound = mapping.get("upper_bound").and_then(Value::as_i64);
        out.push(RequirementSpec {
            slot,
            target_type,
            relationship_type,
            lower_bound,
            upper_bound,
        });
    }
    Ok(out)
}

pub(super) fn parse_interface_usage(value: Option<&Value>) -> InterfaceUsage {
    match value {
        None => InterfaceUsage::None,
        Some(Value::Mapping(m)) => match m.iter().next() {
            Some((key, val)) => InterfaceUsage::Mapping {
                interface_type: key.as_str().unwrap_or_default().to_string(),
                inputs: val.as_mapping().and_then(|m| m.get("inputs")).cloned(),
            },
            None => InterfaceUsage::None,
        },
        Some(Value::Sequence(seq)) => match seq.first().and_then(Value::as_str) {
            Some(name) => InterfaceUsage::Sequence {
                interface_type: name.to_string(),
            },
            None => InterfaceUsage::None,
        },
        Some(_) => InterfaceUsage::None,
    }
}

pub(super) fn parse_valid_targets(value: Option<&Value>) -> Vec<String> {
    match value.and_then(Value::as_sequence) {
        Some(seq) => seq.iter().filter_map(Value::as_str).map(str::to_string).collect(),
        None => Vec::new(),
    }
}

pub(super) fn parse_operations(
    value: &Value,
    type_name: &str,
) -> Result<IndexMap<String, OperationSchema>, SchemaError> {
    let mapping = value.as_mapping().ok_or_else(|| SchemaError::EntryNotAMapping {
        name: type_name.to_string(),
    })?;
    let mut out = IndexMap::with_capacity(mapping.len());
    for (key, op) in mapping {
        let name = key.as_str().unwrap_or_default().to_string();
        // An operation may be a bare string (the `implementation` shorthand),
        // matching `PropertySchema`'s own bare-string shorthand.
        if let Some(implementation) = op.as_str() {
            out.insert(
                name,
                OperationSchema {
                    description: None,
                    implementation: Some(implementation.to_string()),
                    inputs: IndexMap::new(),
                },
            );
            continue;
        }
        let description = op
            .as_mapping()
            .and_then(|m| m.get("description"))
            .and_then(Value::as_str)
            .map(str::to_string);
        let implementation = op
            .as_mapping()
            .and_then(|m| m.get("implementation"))
            .and_then(Value::as_str)
            .map(str::to_string);
        let inputs = op
            .as_mapping()
            .and_then(|m| m.get("inputs"))
            .map(|v| parse_properties(Some(v), type_name))
            .transpose()?
            .unwrap_or_default();
        out.insert(
            name,
            OperationSchema {
                description,
                implementation,
                inputs,
            },
        );
    }
    Ok(out)
}
