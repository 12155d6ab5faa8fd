//! Topological ordering of types by `derived_from` (§4.3).

use std::collections::{HashMap, HashSet};

use crate::error::SchemaError;
use crate::kind::EntityKind;

/// Orders `names` so that every type appears after its `derived_from`
/// parent, given `parent_of` mapping a type name to its (optional) parent
/// within the same kind.
///
/// Implements the algorithm from §4.3: repeatedly remove any node whose
/// out-edge (its parent) is either absent from the graph or already
/// removed. A pass that removes nothing indicates a cycle.
pub fn topological_order(
    kind: EntityKind,
    parent_of: &HashMap<String, Option<String>>,
) -> Result<Vec<String>, SchemaError> {
    let mut remaining: Vec<String> = parent_of.keys().cloned().collect();
    remaining.sort();
    let mut removed: HashSet<String> = HashSet::new();
    let mut order = Vec::with_capacity(remaining.len());

    while !remaining.is_empty() {
        let mut next_remaining = Vec::with_capacity(remaining.len());
        let mut progressed = false;
        for name in remaining {
            let parent = parent_of.get(&name).and_then(|p| p.as_deref());
            let ready = match parent {
                None => true,
                Some(p) => removed.contains(p) || !parent_of.contains_key(p),
            };
            if ready {
                removed.insert(name.clone());
                order.push(name);
                progressed = true;
            } else {
                next_remaining.push(name);
            }
        }
        if !progressed {
            next_remaining.sort();
            return Err(SchemaError::CyclicDerivation {
                kind,
                types: next_remaining,
            });
        }
        remaining = next_remaining;
    }
    Ok(order)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn graph(pairs: &[(&str, Option<&str>)]) -> HashMap<String, Option<String>> {
        pairs
            .iter()
            .map(|(n, p)| (n.to_string(), p.map(str::to_string)))
            .collect()
    }

    #[test]
    fn parents_come_before_children() {
        let g = graph(&[
            ("tosca.nodes.Root", None),
            ("tosca.nodes.Compute", Some("tosca.nodes.Root")),
            ("tosca.nodes.SoftwareComponent", Some("tosca.nodes.Root")),
        ]);
        let order = topological_order(EntityKind::Nodes, &g).unwrap();
        let pos = |n: &str| order.iter().position(|x| x == n).unwrap();
        assert!(pos("tosca.nodes.Root") < pos("tosca.nodes.Compute"));
        assert!(pos("tosca.nodes.Root") < pos("tosca.nodes.SoftwareComponent"));
    }

    #[test]
    fn parent_outside_graph_is_immediately_ready() {
        let g = graph(&[("tosca.nodes.Compute", Some("tosca.nodes.Root"))]);
        let order = topological_order(EntityKind::Nodes, &g).unwrap();
        assert_eq!(order, vec!["tosca.nodes.Compute".to_string()]);
    }

    #[test]
    fn cycle_is_rejected() {
        let g = graph(&[
            ("tosca.nodes.A", Some("tosca.nodes.B")),
            ("tosca.nodes.B", Some("tosca.nodes.A")),
        ]);
        let err = topological_order(EntityKind::Nodes, &g).unwrap_err();
        match err {
            SchemaError::CyclicDerivation { types, .. } => {
                assert_eq!(types, vec!["tosca.nodes.A".to_string(), "tosca.nodes.B".to_string()]);
            }
            other => panic!("expected CyclicDerivation, got {other:?}"),
        }
    }
}
