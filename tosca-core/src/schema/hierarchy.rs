//! The type hierarchy (§4.4): four kind-keyed tables of merged
//! [`TypeDescriptor`]s, reachable by qualified or short name.

use std::collections::HashMap;
use std::sync::Arc;

use indexmap::IndexMap;
use serde_yaml::{Mapping, Value};
use tracing::{debug, instrument};

use crate::error::SchemaError;
use crate::kind::EntityKind;
use crate::merge::merge_field;
use crate::topo::topological_order;

use super::descriptor::{
    parse_capabilities, parse_interface_usage, parse_operations, parse_properties, parse_requirements,
    parse_valid_targets, CapabilityType, InterfaceType, NodeType, RelationType, TypeData, TypeDescriptor,
};
use super::loader::entries_for_kind;

/// The four type tables (§3 `TypeHierarchy`), each reachable by qualified
/// name and, redundantly, by short name.
#[derive(Debug, Clone, Default)]
pub struct TypeHierarchy {
    nodes: IndexMap<String, Arc<TypeDescriptor>>,
    nodes_short: IndexMap<String, Arc<TypeDescriptor>>,
    capabilities: IndexMap<String, Arc<TypeDescriptor>>,
    capabilities_short: IndexMap<String, Arc<TypeDescriptor>>,
    relations: IndexMap<String, Arc<TypeDescriptor>>,
    relations_short: IndexMap<String, Arc<TypeDescriptor>>,
    interfaces: IndexMap<String, Arc<TypeDescriptor>>,
    interfaces_short: IndexMap<String, Arc<TypeDescriptor>>,
}

impl TypeHierarchy {
    pub fn new() -> Self {
        Self::default()
    }

    fn qualified_table(&self, kind: EntityKind) -> &IndexMap<String, Arc<TypeDescriptor>> {
        match kind {
            EntityKind::Nodes => &self.nodes,
            EntityKind::Capabilities => &self.capabilities,
            EntityKind::Relations => &self.relations,
            EntityKind::Interfaces => &self.interfaces,
        }
    }

    fn short_table(&self, kind: EntityKind) -> &IndexMap<String, Arc<TypeDescriptor>> {
        match kind {
            EntityKind::Nodes => &self.nodes_short,
            EntityKind::Capabilities => &self.capabilities_short,
            EntityKind::Relations => &self.relations_short,
            EntityKind::Interfaces => &self.interfaces_short,
        }
    }

    fn tables_mut(
        &mut self,
        kind: EntityKind,
    ) -> (&mut IndexMap<String, Arc<TypeDescriptor>>, &mut IndexMap<String, Arc<TypeDescriptor>>) {
        match kind {
            EntityKind::Nodes => (&mut self.nodes, &mut self.nodes_short),
            EntityKind::Capabilities => (&mut self.capabilities, &mut self.capabilities_short),
            EntityKind::Relations => (&mut self.relations, &mut self.relations_short),
            EntityKind::Interfaces => (&mut self.interfaces, &mut self.interfaces_short),
        }
    }

    /// Looks up a type per §4.4: when `kind` is `None`, probes
    /// `EntityKind::ALL` in order; `qualified = true` restricts the lookup
    /// to exact qualified names, `qualified = false` also accepts a short
    /// name.
    pub fn get(&self, name: &str, kind: Option<EntityKind>, qualified: bool) -> Option<Arc<TypeDescriptor>> {
        match kind {
            Some(k) => self.get_in_kind(name, k, qualified),
            None => EntityKind::ALL.into_iter().find_map(|k| self.get_in_kind(name, k, qualified)),
        }
    }

    fn get_in_kind(&self, name: &str, kind: EntityKind, qualified: bool) -> Option<Arc<TypeDescriptor>> {
        if let Some(found) = self.qualified_table(kind).get(name) {
            return Some(found.clone());
        }
        if !qualified {
            if let Some(found) = self.short_table(kind).get(name) {
                return Some(found.clone());
            }
        }
        None
    }

    /// Parses `raw` as a schema document and merges every type, per
    /// §4.1/§4.4. Loads kinds in the fixed order `nodes, capabilities,
    /// relations, interfaces` — irrelevant to correctness since each kind's
    /// derivation graph is independent, but kept fixed for reproducibility.
    #[instrument(skip_all)]
    pub fn load_schema(&mut self, raw: &Value) -> Result<(), SchemaError> {
        for kind in EntityKind::ALL {
            self.load_kind(kind, raw)?;
        }
        Ok(())
    }

    /// Loads per-document type extensions (the topology document's
    /// `node_types`/`capability_types`/`relation_types` keys, §4.8). Unlike
    /// [`TypeHierarchy::load_schema`], every key of `raw` is treated as an
    /// entry of `kind`, with no `tosca.<kind>.` prefix filtering — matching
    /// the source, whose document-level loader passes the extension
    /// mapping's keys through unconditionally.
    pub fn load_extension(&mut self, kind: EntityKind, raw: &Value) -> Result<(), SchemaError> {
        let mapping = raw.as_mapping().ok_or(SchemaError::NotAMapping)?;
        let mut entries = IndexMap::new();
        for (key, fragment) in mapping {
            let name = key.as_str().ok_or(SchemaError::NotAMapping)?;
            let fragment = fragment.as_mapping().ok_or_else(|| SchemaError::EntryNotAMapping {
                name: name.to_string(),
            })?;
            entries.insert(name.to_string(), fragment.clone());
        }
        self.build_entries(kind, entries)
    }

    fn load_kind(&mut self, kind: EntityKind, raw: &Value) -> Result<(), SchemaError> {
        let entries = entries_for_kind(raw, kind)?;
        self.build_entries(kind, entries)
    }

    fn build_entries(&mut self, kind: EntityKind, entries: IndexMap<String, Mapping>) -> Result<(), SchemaError> {
        if entries.is_empty() {
            return Ok(());
        }
        let parent_of: HashMap<String, Option<String>> = entries
            .iter()
            .map(|(name, fragment)| {
                let parent = fragment
                    .get("derived_from")
                    .and_then(Value::as_str)
                    .map(str::to_string);
                (name.clone(), parent)
            })
            .collect();
        let order = topological_order(kind, &parent_of)?;
        debug!(?kind, count = order.len(), "loading entity kind");

        for name in order {
            let fragment = &entries[&name];
            let parent_name = parent_of.get(&name).and_then(|p| p.as_deref());
            let parent = match parent_name {
                Some(p) => {
                    let found = self.qualified_table(kind).get(p).cloned();
                    if found.is_none() {
                        return Err(SchemaError::UnknownParent {
                            kind,
                            name: name.clone(),
                            parent: p.to_string(),
                        });
                    }
                    found
                }
                None => None,
            };
            let descriptor = build_descriptor(kind, &name, parent_name, parent.as_deref(), fragment)?;
            let descriptor = Arc::new(descriptor);
            let (qualified, short) = self.tables_mut(kind);
            qualified.insert(name.clone(), descriptor.clone());
            short.insert(descriptor.short_name().to_string(), descriptor);
        }
        Ok(())
    }
}

fn build_descriptor(
    kind: EntityKind,
    name: &str,
    parent_name: Option<&str>,
    parent: Option<&TypeDescriptor>,
    fragment: &Mapping,
) -> Result<TypeDescriptor, SchemaError> {
    let data = match kind {
        EntityKind::Nodes => TypeData::Node(build_node(name, parent, fragment)?),
        EntityKind::Capabilities => TypeData::Capability(build_capability(name, parent, fragment)?),
        EntityKind::Relations => TypeData::Relation(build_relation(name, parent, fragment)?),
        EntityKind::Interfaces => TypeData::Interface(build_interface(name, parent, fragment)?),
    };
    Ok(TypeDescriptor {
        tosca_name: name.to_string(),
        kind,
        derived_from: parent_name.map(str::to_string),
        data,
    })
}

fn field<'a>(fragment: &'a Mapping, key: &str) -> Option<&'a Value> {
    fragment.get(key)
}

fn build_node(name: &str, parent: Option<&TypeDescriptor>, fragment: &Mapping) -> Result<NodeType, SchemaError> {
    let parent_node = parent.and_then(TypeDescriptor::as_node);
    let raw_properties = merge_field(parent_node.and_then(|p| p.raw_properties.as_ref()), field(fragment, "properties"));
    let raw_capabilities = merge_field(
        parent_node.and_then(|p| p.raw_capabilities.as_ref()),
        field(fragment, "capabilities"),
    );
    let raw_requirements = merge_field(
        parent_node.and_then(|p| p.raw_requirements.as_ref()),
        field(fragment, "requirements"),
    );
    let raw_interfaces = merge_field(parent_node.and_then(|p| p.raw_interfaces.as_ref()), field(fragment, "interfaces"));

    Ok(NodeType {
        properties: parse_properties(raw_properties.as_ref(), name)?,
        capabilities: parse_capabilities(raw_capabilities.as_ref(), name)?,
        requirements: parse_requirements(raw_requirements.as_ref(), name)?,
        interfaces: parse_interface_usage(raw_interfaces.as_ref()),
        raw_properties,
        raw_capabilities,
        raw_requirements,
        raw_interfaces,
    })
}

fn build_capability(
    name: &str,
    parent: Option<&TypeDescriptor>,
    fragment: &Mapping,
) -> Result<CapabilityType, SchemaError> {
    let parent_cap = parent.and_then(TypeDescriptor::as_capability);
    let raw_properties = merge_field(parent_cap.and_then(|p| p.raw_properties.as_ref()), field(fragment, "properties"));
    Ok(CapabilityType {
        properties: parse_properties(raw_properties.as_ref(), name)?,
        raw_properties,
    })
}

fn build_relation(
    _name: &str,
    parent: Option<&TypeDescriptor>,
    fragment: &Mapping,
) -> Result<RelationType, SchemaError> {
    let parent_rel = parent.and_then(TypeDescriptor::as_relation);
    let raw_valid_targets = merge_field(
        parent_rel.and_then(|p| p.raw_valid_targets.as_ref()),
        field(fragment, "valid_targets"),
    );
    let raw_interfaces = merge_field(parent_rel.and_then(|p| p.raw_interfaces.as_ref()), field(fragment, "interfaces"));
    Ok(RelationType {
        valid_targets: parse_valid_targets(raw_valid_targets.as_ref()),
        interfaces: parse_interface_usage(raw_interfaces.as_ref()),
        raw_valid_targets,
        raw_interfaces,
    })
}

fn build_interface(
    name: &str,
    parent: Option<&TypeDescriptor>,
    fragment: &Mapping,
) -> Result<InterfaceType, SchemaError> {
    let parent_iface = parent.and_then(TypeDescriptor::as_interface);
    let mut own = fragment.clone();
    own.remove("derived_from");
    let fragment_value = Value::Mapping(own);
    let raw_operations = merge_field(parent_iface.and_then(|p| p.raw_operations.as_ref()), Some(&fragment_value));
    let merged = raw_operations.clone().unwrap_or(fragment_value);
    Ok(InterfaceType {
        operations: parse_operations(&merged, name)?,
        raw_operations,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema(yaml: &str) -> TypeHierarchy {
        let raw: Value = serde_yaml::from_str(yaml).unwrap();
        let mut hierarchy = TypeHierarchy::new();
        hierarchy.load_schema(&raw).unwrap();
        hierarchy
    }

    #[test]
    fn child_inherits_and_extends_parent_properties() {
        let hierarchy = schema(
            r#"
tosca.nodes.Root: {}
tosca.nodes.Compute:
  derived_from: tosca.nodes.Root
  properties:
    num_cpus: integer
tosca.nodes.Compute.Small:
  derived_from: tosca.nodes.Compute
  properties:
    disk_size: integer
"#,
        );
        let descriptor = hierarchy.get("tosca.nodes.Compute.Small", None, true).unwrap();
        let node = descriptor.as_node().unwrap();
        assert!(node.properties.contains_key("num_cpus"));
        assert!(node.properties.contains_key("disk_size"));
    }

    #[test]
    fn get_by_short_name_matches_qualified() {
        let hierarchy = schema("tosca.nodes.Compute: {}\n");
        let by_qualified = hierarchy.get("tosca.nodes.Compute", None, true).unwrap();
        let by_short = hierarchy.get("Compute", None, false).unwrap();
        assert_eq!(by_qualified.tosca_name, by_short.tosca_name);
    }

    #[test]
    fn qualified_only_lookup_rejects_short_name() {
        let hierarchy = schema("tosca.nodes.Compute: {}\n");
        assert!(hierarchy.get("Compute", None, true).is_none());
    }

    #[test]
    fn unknown_parent_is_rejected() {
        let raw: Value = serde_yaml::from_str("tosca.nodes.Compute:\n  derived_from: tosca.nodes.Ghost\n").unwrap();
        let mut hierarchy = TypeHierarchy::new();
        let err = hierarchy.load_schema(&raw).unwrap_err();
        assert!(matches!(err, SchemaError::UnknownParent { .. }));
    }

    #[test]
    fn interface_operations_accumulate_across_derivation() {
        let hierarchy = schema(
            r#"
tosca.interfaces.Root:
  create:
    description: create the resource
tosca.interfaces.Lifecycle:
  derived_from: tosca.interfaces.Root
  configure:
    description: configure the resource
"#,
        );
        let descriptor = hierarchy.get("tosca.interfaces.Lifecycle", Some(EntityKind::Interfaces), true).unwrap();
        let iface = descriptor.as_interface().unwrap();
        assert!(iface.operations.contains_key("create"));
        assert!(iface.operations.contains_key("configure"));
    }
}
