//! The topology façade (§4.8): the parsed template document plus its type
//! hierarchy, with binding and lookup operations.

use std::cell::{Ref, RefCell};
use std::sync::Arc;

use indexmap::IndexMap;
use serde_yaml::{Mapping, Value};
use tosca_core::constraint::Constraint;
use tosca_core::kind::EntityKind;
use tosca_core::schema::TypeHierarchy;
use tracing::{instrument, warn};

use crate::entity::NodeInstance;
use crate::error::TopologyError;
use crate::resolver::{self, Origin, ResolverLimits};

/// A declared topology input (§3 `Value`, specialized: inputs never
/// resolve deferred functions — only their *bound* or *default* literal is
/// ever returned, matching the source's `Input.value`).
#[derive(Debug, Clone)]
pub struct InputSlot {
    pub name: String,
    pub type_name: String,
    pub description: Option<String>,
    pub default: Option<Value>,
    pub constraints: Vec<Constraint>,
    pub bound_value: Option<Value>,
}

impl InputSlot {
    /// The bound value if `bind_inputs` has set one, else the schema
    /// default, else `None` ("undefined").
    pub fn value(&self) -> Option<Value> {
        self.bound_value.clone().or_else(|| self.default.clone())
    }
}

/// A declared topology output (§3 `Value`): its raw `value` position may be
/// a literal or a deferred function, resolved lazily on each `.value()`
/// call.
pub struct OutputSlot<'t> {
    pub name: String,
    pub description: Option<String>,
    raw_value: Option<Value>,
    topology: &'t Topology,
}

impl<'t> OutputSlot<'t> {
    pub fn value(&self) -> Result<Option<Value>, crate::error::ResolveError> {
        match &self.raw_value {
            Some(raw) => resolver::resolve(self.topology, raw, Origin::Output, &self.name, 0),
            None => Ok(None),
        }
    }
}

/// The parsed template document: `{tosca_version, description, inputs,
/// outputs, node_templates, imports, ...}` plus its [`TypeHierarchy`] (§3
/// `Topology`).
///
/// A `Topology` is created once per document load and is logically
/// immutable after [`Topology::bind_inputs`] seals input values; entity
/// instance views borrow it for the duration of a query and never outlive
/// it.
pub struct Topology {
    hierarchy: Arc<TypeHierarchy>,
    document: RefCell<Mapping>,
    limits: ResolverLimits,
}

impl Topology {
    /// Parses `raw` as a topology document, loads a fresh [`TypeHierarchy`]
    /// from `schema`, then layers on the document's own `node_types` /
    /// `capability_types` / `relation_types` extensions (§4.8).
    #[instrument(skip_all)]
    pub fn load(schema: &Value, raw: &Value) -> Result<Self, TopologyError> {
        Self::load_with_hierarchy(schema_hierarchy(schema)?, raw)
    }

    /// Like [`Topology::load`], but shares an already-loaded
    /// [`TypeHierarchy`] (the "shared library schema... referenced
    /// read-only by multiple topologies" pattern from §9's design notes).
    #[instrument(skip_all)]
    pub fn load_with_hierarchy(hierarchy: Arc<TypeHierarchy>, raw: &Value) -> Result<Self, TopologyError> {
        let document = raw.as_mapping().ok_or(TopologyError::NotAMapping)?.clone();
        let mut hierarchy = Arc::try_unwrap(hierarchy).unwrap_or_else(|shared| (*shared).clone());

        for (doc_key, kind) in [
            ("node_types", EntityKind::Nodes),
            ("capability_types", EntityKind::Capabilities),
            ("relation_types", EntityKind::Relations),
        ] {
            if let Some(extension) = document.get(doc_key) {
                hierarchy.load_extension(kind, extension)?;
            }
        }

        Ok(Topology {
            hierarchy: Arc::new(hierarchy),
            document: RefCell::new(document),
            limits: ResolverLimits::default(),
        })
    }

    /// Overrides the default recursion-depth cap (§5).
    pub fn with_limits(mut self, limits: ResolverLimits) -> Self {
        self.limits = limits;
        self
    }

    pub(crate) fn limits(&self) -> ResolverLimits {
        self.limits
    }

    pub fn hierarchy(&self) -> &Arc<TypeHierarchy> {
        &self.hierarchy
    }

    fn document(&self) -> Ref<'_, Mapping> {
        self.document.borrow()
    }

    pub fn tosca_version(&self) -> Option<String> {
        self.document().get("tosca_definitions_version").and_then(Value::as_str).map(str::to_string)
    }

    pub fn description(&self) -> Option<String> {
        self.document().get("description").and_then(Value::as_str).map(str::to_string)
    }

    /// Every declared input, in document order.
    pub fn inputs(&self) -> Vec<InputSlot> {
        let document = self.document();
        let Some(inputs) = document.get("inputs").and_then(Value::as_mapping) else {
            return Vec::new();
        };
        inputs
            .iter()
            .filter_map(|(key, attrs)| {
                let name = key.as_str()?.to_string();
                Some(parse_input(&name, attrs))
            })
            .collect()
    }

    /// O(1) lookup, `None` on absence (not an error) per §4.8.
    pub fn get_input(&self, name: &str) -> Option<InputSlot> {
        let document = self.document();
        let attrs = document.get("inputs").and_then(Value::as_mapping).and_then(|m| m.get(name))?;
        Some(parse_input(name, attrs))
    }

    /// Binds each `(name, value)` pair, failing with `UnknownInput` if the
    /// name is not declared or `InputAlreadyBound` if it has already been
    /// bound once (§4.8).
    pub fn bind_inputs(&self, values: &IndexMap<String, Value>) -> Result<(), TopologyError> {
        for (name, value) in values {
            self.bind_input(name, value.clone())?;
        }
        Ok(())
    }

    fn bind_input(&self, name: &str, value: Value) -> Result<(), TopologyError> {
        let mut document = self.document.borrow_mut();
        if document.get("inputs").is_none() {
            document.insert(Value::from("inputs"), Value::Mapping(Mapping::new()));
        }
        let Some(inputs) = document.get_mut("inputs").and_then(Value::as_mapping_mut) else {
            return Err(TopologyError::NotAMapping);
        };
        let Some(attrs) = inputs.get_mut(name) else {
            return Err(TopologyError::UnknownInput { name: name.to_string() });
        };
        let Some(attrs) = attrs.as_mapping_mut() else {
            return Err(TopologyError::NotAMapping);
        };
        if attrs.get("value").is_some() {
            return Err(TopologyError::InputAlreadyBound { name: name.to_string() });
        }
        attrs.insert(Value::from("value"), value);
        Ok(())
    }

    /// Every declared output, in document order.
    pub fn outputs(&self) -> Vec<OutputSlot<'_>> {
        let document = self.document();
        let Some(outputs) = document.get("outputs").and_then(Value::as_mapping) else {
            return Vec::new();
        };
        outputs
            .iter()
            .filter_map(|(key, attrs)| {
                let name = key.as_str()?.to_string();
                Some(self.parse_output(name, attrs))
            })
            .collect()
    }

    /// O(1) lookup, `None` on absence per §4.8.
    pub fn get_output(&self, name: &str) -> Option<OutputSlot<'_>> {
        let document = self.document();
        let attrs = document.get("outputs").and_then(Value::as_mapping).and_then(|m| m.get(name))?;
        Some(self.parse_output(name.to_string(), attrs))
    }

    fn parse_output(&self, name: String, attrs: &Value) -> OutputSlot<'_> {
        let description = attrs.as_mapping().and_then(|m| m.get("description")).and_then(Value::as_str).map(str::to_string);
        let raw_value = attrs.as_mapping().and_then(|m| m.get("value")).cloned();
        OutputSlot {
            name,
            description,
            raw_value,
            topology: self,
        }
    }

    /// Every node template, bound to its type. `Err` surfaces lazily if any
    /// template names a type absent from the hierarchy (§4.9).
    pub fn nodetemplates(&self) -> Result<Vec<NodeInstance<'_>>, TopologyError> {
        let names: Vec<String> = {
            let document = self.document();
            match document.get("node_templates").and_then(Value::as_mapping) {
                Some(templates) => templates.keys().filter_map(Value::as_str).map(str::to_string).collect(),
                None => Vec::new(),
            }
        };
        names
            .into_iter()
            .map(|name| {
                self.get_template(&name)?.ok_or_else(|| TopologyError::TemplateNotAMapping { template: name })
            })
            .collect()
    }

    /// O(1) lookup: `Ok(None)` if the template is absent, `Err` if present
    /// but its declared type is absent from the hierarchy (§4.9), `Ok(Some)`
    /// otherwise.
    pub fn get_template(&self, name: &str) -> Result<Option<NodeInstance<'_>>, TopologyError> {
        let raw = {
            let document = self.document();
            let Some(templates) = document.get("node_templates").and_then(Value::as_mapping) else {
                return Ok(None);
            };
            let Some(raw) = templates.get(name).and_then(Value::as_mapping) else {
                return Ok(None);
            };
            raw.clone()
        };
        let type_name = raw.get("type").and_then(Value::as_str).unwrap_or_default();
        let type_descriptor = self
            .hierarchy
            .get(type_name, Some(EntityKind::Nodes), false)
            .ok_or_else(|| TopologyError::UnknownType {
                template: name.to_string(),
                type_name: type_name.to_string(),
            })?;
        Ok(Some(NodeInstance {
            name: name.to_string(),
            raw,
            type_descriptor,
            topology: self,
        }))
    }

    /// Sets a raw property value directly on a node template, bypassing the
    /// document's usual authoring path. Intended for an orchestrator that
    /// has allocated a resource and needs to record e.g. an assigned IP
    /// address (§3 Lifecycle; exercised by the compute-only output-binding
    /// scenario in §8). A no-op if `template` does not name an existing
    /// node template.
    pub fn set_node_property(&self, template: &str, property: &str, value: Value) {
        let mut document = self.document.borrow_mut();
        let Some(templates) = document.get_mut("node_templates").and_then(Value::as_mapping_mut) else {
            return;
        };
        let Some(entry) = templates.get_mut(template).and_then(Value::as_mapping_mut) else {
            return;
        };
        if entry.get("properties").is_none() {
            entry.insert(Value::from("properties"), Value::Mapping(Mapping::new()));
        }
        let Some(properties) = entry.get_mut("properties").and_then(Value::as_mapping_mut) else {
            warn!(template, property, "properties is not a mapping; ignoring set_node_property");
            return;
        };
        properties.insert(Value::from(property), value);
    }

    pub fn imports(&self) -> Vec<Value> {
        self.document().get("imports").and_then(Value::as_sequence).cloned().unwrap_or_default()
    }

    pub fn groups(&self) -> Vec<Value> {
        self.document().get("groups").and_then(Value::as_sequence).cloned().unwrap_or_default()
    }
}

fn parse_input(name: &str, attrs: &Value) -> InputSlot {
    let mapping = attrs.as_mapping();
    let type_name = mapping
        .and_then(|m| m.get("type"))
        .and_then(Value::as_str)
        .unwrap_or("string")
        .to_string();
    let description = mapping.and_then(|m| m.get("description")).and_then(Value::as_str).map(str::to_string);
    let default = mapping.and_then(|m| m.get("default")).cloned();
    let bound_value = mapping.and_then(|m| m.get("value")).cloned();
    let constraints = mapping
        .and_then(|m| m.get("constraints"))
        .and_then(Value::as_sequence)
        .map(|seq| seq.iter().filter_map(|c| Constraint::parse(c).ok()).collect())
        .unwrap_or_default();
    InputSlot {
        name: name.to_string(),
        type_name,
        description,
        default,
        constraints,
        bound_value,
    }
}

fn schema_hierarchy(schema: &Value) -> Result<Arc<TypeHierarchy>, TopologyError> {
    let mut hierarchy = TypeHierarchy::new();
    hierarchy.load_schema(schema)?;
    Ok(Arc::new(hierarchy))
}
