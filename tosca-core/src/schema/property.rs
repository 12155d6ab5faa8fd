//! Property schema declarations (§3 `PropertySchema`).

use serde_yaml::Value;

use crate::constraint::Constraint;
use crate::error::SchemaError;

/// The declared shape of a single property: `{type, description, required,
/// constraints, default}`.
#[derive(Debug, Clone)]
pub struct PropertySchema {
    pub type_name: String,
    pub description: Option<String>,
    pub required: bool,
    pub constraints: Vec<Constraint>,
    pub default: Option<Value>,
}

impl PropertySchema {
    /// Parses a single property schema entry. The TOSCA shorthand of naming
    /// only a type as a bare string (no `required`/`constraints`/`default`)
    /// is accepted, matching `pytosca`'s `PropertyContainer.get_property`
    /// coercion of a bare string schema into `{'type': schema}`.
    pub fn parse(raw: &Value) -> Result<Self, SchemaError> {
        if let Some(type_name) = raw.as_str() {
            return Ok(PropertySchema {
                type_name: type_name.to_string(),
                description: None,
                required: false,
                constraints: Vec::new(),
                default: None,
            });
        }
        let mapping = raw.as_mapping().ok_or(SchemaError::NotAMapping)?;
        let type_name = mapping
            .get("type")
            .and_then(Value::as_str)
            .unwrap_or("string")
            .to_string();
        let description = mapping.get("description").and_then(Value::as_str).map(str::to_string);
        let required = mapping.get("required").and_then(Value::as_bool).unwrap_or(false);
        let constraints = match mapping.get("constraints").and_then(Value::as_sequence) {
            Some(seq) => seq.iter().map(Constraint::parse).collect::<Result<Vec<_>, _>>()?,
            None => Vec::new(),
        };
        let default = mapping.get("default").cloned();
        Ok(PropertySchema {
            type_name,
            description,
            required,
            constraints,
            default,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_mapping_form() {
        let raw: Value = serde_yaml::from_str(
            "type: integer\ndescription: cpu count\nrequired: true\ndefault: 1\nconstraints:\n  - greater_than: 0\n",
        )
        .unwrap();
        let schema = PropertySchema::parse(&raw).unwrap();
        assert_eq!(schema.type_name, "integer");
        assert_eq!(schema.description.as_deref(), Some("cpu count"));
        assert!(schema.required);
        assert_eq!(schema.constraints.len(), 1);
        assert_eq!(schema.default, Some(Value::from(1)));
    }

    #[test]
    fn bare_string_is_a_type_shorthand() {
        let raw: Value = serde_yaml::from_str("string").unwrap();
        let schema = PropertySchema::parse(&raw).unwrap();
        assert_eq!(schema.type_name, "string");
        assert!(!schema.required);
    }

    #[test]
    fn missing_type_defaults_to_string() {
        let raw: Value = serde_yaml::from_str("description: anonymous\n").unwrap();
        let schema = PropertySchema::parse(&raw).unwrap();
        assert_eq!(schema.type_name, "string");
    }
}
