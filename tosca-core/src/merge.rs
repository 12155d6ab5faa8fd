//! Deep-merge of inherited type fragments (§4.2 merge rules).
//!
//! Each inherited field of a [`TypeDescriptor`](crate::schema::TypeDescriptor)
//! is merged independently: properties merge with properties, capabilities
//! with capabilities, and so on. The merge never mutates its inputs — every
//! branch below returns an owned, freshly cloned [`Value`].

use serde_yaml::Value;
use tracing::warn;

/// Merges a parent field and a child field, per §4.2:
///
/// - both absent -> absent
/// - one absent -> a copy of the present one
/// - both present, same container shape -> mapping keys from the child
///   override the parent's; sequences concatenate parent-then-child
/// - both present, mismatched shapes -> a warning is logged and the child
///   wins
/// - both scalars -> the child wins
pub fn merge_field(parent: Option<&Value>, child: Option<&Value>) -> Option<Value> {
    match (parent, child) {
        (None, None) => None,
        (Some(p), None) => Some(p.clone()),
        (None, Some(c)) => Some(c.clone()),
        (Some(p), Some(c)) => Some(merge_values(p, c)),
    }
}

fn merge_values(parent: &Value, child: &Value) -> Value {
    match (parent, child) {
        (Value::Mapping(p), Value::Mapping(c)) => {
            let mut merged = p.clone();
            for (key, value) in c {
                merged.insert(key.clone(), value.clone());
            }
            Value::Mapping(merged)
        }
        (Value::Sequence(p), Value::Sequence(c)) => {
            let mut merged = p.clone();
            merged.extend(c.iter().cloned());
            Value::Sequence(merged)
        }
        (p, c) if std::mem::discriminant(p) == std::mem::discriminant(c) => c.clone(),
        (p, c) => {
            warn!(?p, ?c, "mismatched container shapes while merging; child wins");
            c.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_yaml::Mapping;

    fn mapping(pairs: &[(&str, &str)]) -> Value {
        let mut m = Mapping::new();
        for (k, v) in pairs {
            m.insert(Value::String((*k).into()), Value::String((*v).into()));
        }
        Value::Mapping(m)
    }

    #[test]
    fn both_absent_is_absent() {
        assert_eq!(merge_field(None, None), None);
    }

    #[test]
    fn one_absent_copies_the_other() {
        let p = mapping(&[("a", "1")]);
        assert_eq!(merge_field(Some(&p), None), Some(p.clone()));
        assert_eq!(merge_field(None, Some(&p)), Some(p));
    }

    #[test]
    fn mapping_merge_child_overrides_same_key() {
        let p = mapping(&[("a", "parent"), ("b", "parent")]);
        let c = mapping(&[("b", "child"), ("c", "child")]);
        let merged = merge_field(Some(&p), Some(&c)).unwrap();
        let m = merged.as_mapping().unwrap();
        assert_eq!(m.get("a").unwrap().as_str(), Some("parent"));
        assert_eq!(m.get("b").unwrap().as_str(), Some("child"));
        assert_eq!(m.get("c").unwrap().as_str(), Some("child"));
    }

    #[test]
    fn sequence_merge_concatenates_parent_then_child() {
        let p = Value::Sequence(vec![Value::from(1), Value::from(2)]);
        let c = Value::Sequence(vec![Value::from(3)]);
        let merged = merge_field(Some(&p), Some(&c)).unwrap();
        let seq = merged.as_sequence().unwrap();
        assert_eq!(seq, &[Value::from(1), Value::from(2), Value::from(3)]);
    }

    #[test]
    fn mismatched_shapes_child_wins() {
        let p = Value::Sequence(vec![Value::from(1)]);
        let c = Value::String("override".into());
        assert_eq!(merge_field(Some(&p), Some(&c)), Some(c));
    }

    #[test]
    fn merge_does_not_mutate_parent() {
        let p = mapping(&[("a", "parent")]);
        let original = p.clone();
        let c = mapping(&[("a", "child")]);
        let _ = merge_field(Some(&p), Some(&c));
        assert_eq!(p, original);
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        // A small alphabet keeps collisions between parent and child keys
        // frequent enough to exercise the override branch.
        fn key() -> impl Strategy<Value = String> {
            prop::sample::select(vec!["a", "b", "c", "d"]).prop_map(String::from)
        }

        fn mapping_strategy() -> impl Strategy<Value = Vec<(String, i32)>> {
            prop::collection::vec((key(), any::<i32>()), 0..6)
        }

        fn to_mapping(pairs: &[(String, i32)]) -> Value {
            let mut m = Mapping::new();
            for (k, v) in pairs {
                m.insert(Value::String(k.clone()), Value::from(*v));
            }
            Value::Mapping(m)
        }

        proptest! {
            /// §8.1: for any parent/child mapping pair, the merged mapping's
            /// keys are a superset of the parent's, and every child key's
            /// value shadows the parent's value under that key.
            #[test]
            fn merged_mapping_is_a_superset_with_child_override(
                parent in mapping_strategy(),
                child in mapping_strategy(),
            ) {
                let p = to_mapping(&parent);
                let c = to_mapping(&child);
                let merged = merge_field(Some(&p), Some(&c)).unwrap();
                let merged = merged.as_mapping().unwrap();

                for (k, v) in &parent {
                    if !child.iter().any(|(ck, _)| ck == k) {
                        prop_assert_eq!(merged.get(k.as_str()), Some(&Value::from(*v)));
                    }
                }
                for (k, v) in &child {
                    prop_assert_eq!(merged.get(k.as_str()), Some(&Value::from(*v)));
                }
            }

            /// Merging never mutates either input, for arbitrary mappings.
            #[test]
            fn merge_never_mutates_inputs(
                parent in mapping_strategy(),
                child in mapping_strategy(),
            ) {
                let p = to_mapping(&parent);
                let c = to_mapping(&child);
                let p_before = p.clone();
                let c_before = c.clone();
                let _ = merge_field(Some(&p), Some(&c));
                prop_assert_eq!(&p, &p_before);
                prop_assert_eq!(&c, &c_before);
            }
        }
    }
}
