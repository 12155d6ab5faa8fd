//! Recognizing the deferred-function value encoding (§6).
//!
//! Parsing the *shape* of a deferred function is pure and topology-agnostic;
//! actually resolving one against a loaded document is the `tosca` crate's
//! value resolver's job.

use serde_yaml::Value;

/// A deferred-function value, as found embedded in a property, input, or
/// output position.
#[derive(Debug, Clone, PartialEq)]
pub enum DeferredCall {
    /// `{get_input: name}`
    GetInput { name: String },
    /// `{get_property: [entity, property]}`
    GetProperty { entity: String, property: String },
    /// `{get_ref_property: [slot, property]}` or
    /// `{get_ref_property: [slot, capability, property]}`
    GetRefProperty {
        slot: String,
        capability: Option<String>,
        property: String,
    },
}

impl DeferredCall {
    /// Returns `Some` if `value` has the shape of one of the three deferred
    /// functions; `None` for any literal value, including mappings that
    /// merely happen to not match.
    pub fn parse(value: &Value) -> Option<DeferredCall> {
        let mapping = value.as_mapping()?;
        if mapping.len() != 1 {
            return None;
        }
        let (key, arg) = mapping.iter().next()?;
        match key.as_str()? {
            "get_input" => Some(DeferredCall::GetInput {
                name: arg.as_str()?.to_string(),
            }),
            "get_property" => {
                let seq = arg.as_sequence()?;
                let [entity, property] = seq.as_slice() else { return None };
                Some(DeferredCall::GetProperty {
                    entity: entity.as_str()?.to_string(),
                    property: property.as_str()?.to_string(),
                })
            }
            "get_ref_property" => {
                let seq = arg.as_sequence()?;
                match seq.as_slice() {
                    [slot, property] => Some(DeferredCall::GetRefProperty {
                        slot: slot.as_str()?.to_string(),
                        capability: None,
                        property: property.as_str()?.to_string(),
                    }),
                    [slot, capability, property] => Some(DeferredCall::GetRefProperty {
                        slot: slot.as_str()?.to_string(),
                        capability: Some(capability.as_str()?.to_string()),
                        property: property.as_str()?.to_string(),
                    }),
                    _ => None,
                }
            }
            _ => None,
        }
    }
}
