//! Schema document parsing (§4.1): group top-level entries by [`EntityKind`].

use indexmap::IndexMap;
use serde_yaml::{Mapping, Value};

use crate::error::SchemaError;
use crate::kind::EntityKind;

/// Parses `raw` into a mapping of type name -> fragment, then selects the
/// entries belonging to `kind` (those whose name starts with
/// `kind.type_prefix()`), preserving document order.
pub fn entries_for_kind(raw: &Value, kind: EntityKind) -> Result<IndexMap<String, Mapping>, SchemaError> {
    let top = raw.as_mapping().ok_or(SchemaError::NotAMapping)?;
    let prefix = kind.type_prefix();
    let mut out = IndexMap::new();
    for (key, fragment) in top {
        let Some(name) = key.as_str() else { continue };
        if !name.starts_with(prefix) {
            continue;
        }
        let fragment = fragment.as_mapping().ok_or_else(|| SchemaError::EntryNotAMapping {
            name: name.to_string(),
        })?;
        out.insert(name.to_string(), fragment.clone());
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selects_only_entries_with_the_kind_prefix() {
        let raw: Value = serde_yaml::from_str(
            "tosca.nodes.Compute: {}\ntosca.capabilities.Container: {}\nsome_other_key: {}\n",
        )
        .unwrap();
        let nodes = entries_for_kind(&raw, EntityKind::Nodes).unwrap();
        assert_eq!(nodes.len(), 1);
        assert!(nodes.contains_key("tosca.nodes.Compute"));
    }

    #[test]
    fn non_mapping_document_is_rejected() {
        let raw: Value = serde_yaml::from_str("- a\n- b\n").unwrap();
        let err = entries_for_kind(&raw, EntityKind::Nodes).unwrap_err();
        assert!(matches!(err, SchemaError::NotAMapping));
    }

    #[test]
    fn non_mapping_entry_is_rejected() {
        let raw: Value = serde_yaml::from_str("tosca.nodes.Compute: a_string\n").unwrap();
        let err = entries_for_kind(&raw, EntityKind::Nodes).unwrap_err();
        assert!(matches!(err, SchemaError::EntryNotAMapping { name } if name == "tosca.nodes.Compute"));
    }
}
