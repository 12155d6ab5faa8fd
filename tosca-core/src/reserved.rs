//! The framework-reserved requirement keys (§4.7).

use serde_yaml::Mapping;

/// Keys on a requirement entry that are never a slot name.
pub const FRAMEWORK_RESERVED_KEYS: &[&str] = &[
    "interfaces",
    "relationship_type",
    "derived_from",
    "constraints",
    "lower_bound",
    "upper_bound",
    "type",
];

/// Finds the single key of `mapping` that is not framework-reserved: the
/// requirement's slot name. Returns every non-reserved key found when there
/// isn't exactly one, so the caller can report an `AmbiguousRequirement`-style
/// error with the full candidate list.
pub fn single_slot_key(mapping: &Mapping) -> Result<String, Vec<String>> {
    let candidates: Vec<String> = mapping
        .keys()
        .filter_map(|k| k.as_str())
        .filter(|k| !FRAMEWORK_RESERVED_KEYS.contains(k))
        .map(str::to_string)
        .collect();
    match candidates.as_slice() {
        [single] => Ok(single.clone()),
        _ => Err(candidates),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_yaml::Value;

    fn mapping(pairs: &[(&str, &str)]) -> Mapping {
        let mut m = Mapping::new();
        for (k, v) in pairs {
            m.insert(Value::String((*k).into()), Value::String((*v).into()));
        }
        m
    }

    #[test]
    fn finds_the_sole_non_framework_key() {
        let m = mapping(&[("host", "tosca.nodes.Compute"), ("lower_bound", "1")]);
        assert_eq!(single_slot_key(&m), Ok("host".to_string()));
    }

    #[test]
    fn ambiguous_when_more_than_one_candidate() {
        let m = mapping(&[("host", "a"), ("dependency", "b")]);
        let err = single_slot_key(&m).unwrap_err();
        assert_eq!(err.len(), 2);
    }
}
