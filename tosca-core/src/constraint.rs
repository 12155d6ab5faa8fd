//! Constraint operators over property values (§4.5).

use regex::Regex;
use serde_yaml::Value;

use crate::error::SchemaError;

/// The closed set of constraint operators a [`Constraint`] may use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstraintOp {
    Equal,
    GreaterThan,
    GreaterOrEqual,
    LessThan,
    LessOrEqual,
    InRange,
    ValidValues,
    Length,
    MinLength,
    MaxLength,
    Pattern,
}

impl ConstraintOp {
    fn from_str(op: &str) -> Result<Self, SchemaError> {
        Ok(match op {
            "equal" => Self::Equal,
            "greater_than" => Self::GreaterThan,
            "greater_or_equal" => Self::GreaterOrEqual,
            "less_than" => Self::LessThan,
            "less_or_equal" => Self::LessOrEqual,
            "in_range" => Self::InRange,
            "valid_values" => Self::ValidValues,
            "length" => Self::Length,
            "min_length" => Self::MinLength,
            "max_length" => Self::MaxLength,
            "pattern" => Self::Pattern,
            other => {
                return Err(SchemaError::UnknownConstraint {
                    op: other.to_string(),
                })
            }
        })
    }
}

/// Whether `min_length`/`max_length` use the source's strict `>`/`<`
/// semantics, or the TOSCA-specification's inclusive `>=`/`<=` reading.
///
/// See the Open Questions in §9 of the specification: the source this
/// system is modeled on uses strict comparisons, which this crate preserves
/// as the default, while exposing [`LengthSemantics::Inclusive`] for callers
/// that want specification-literal behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LengthSemantics {
    #[default]
    Strict,
    Inclusive,
}

/// A single constraint: an operator plus its argument, as declared in a
/// schema document.
#[derive(Debug, Clone)]
pub struct Constraint {
    pub op: ConstraintOp,
    pub arg: Value,
}

impl Constraint {
    /// Parses a single-entry mapping such as `{greater_than: 0}` into a
    /// [`Constraint`].
    pub fn parse(raw: &Value) -> Result<Self, SchemaError> {
        let mapping = raw.as_mapping().ok_or(SchemaError::NotAMapping)?;
        let (key, arg) = mapping.iter().next().ok_or(SchemaError::NotAMapping)?;
        let op = ConstraintOp::from_str(key.as_str().unwrap_or_default())?;
        Ok(Constraint {
            op,
            arg: arg.clone(),
        })
    }

    /// Evaluates this constraint against `value`, per the semantics table in
    /// §4.5. Values that cannot be compared under the requested operator
    /// (e.g. comparing a mapping with `greater_than`) evaluate to `false`
    /// rather than erroring — the closed operator set is enforced at parse
    /// time by [`Constraint::parse`]; this method never fails once parsed.
    pub fn evaluate(&self, value: &Value, length_semantics: LengthSemantics) -> bool {
        match self.op {
            ConstraintOp::Equal => value_eq(value, &self.arg),
            ConstraintOp::GreaterThan => compare(value, &self.arg).map_or(false, |o| o.is_gt()),
            ConstraintOp::GreaterOrEqual => compare(value, &self.arg).map_or(false, |o| o.is_ge()),
            ConstraintOp::LessThan => compare(value, &self.arg).map_or(false, |o| o.is_lt()),
            ConstraintOp::LessOrEqual => compare(value, &self.arg).map_or(false, |o| o.is_le()),
            ConstraintOp::InRange => self.in_range(value),
            ConstraintOp::ValidValues => self
                .arg
                .as_sequence()
                .map_or(false, |seq| seq.iter().any(|v| value_eq(v, value))),
            ConstraintOp::Length => length_of(value).map_or(false, |len| Some(len) == as_length(&self.arg)),
            ConstraintOp::MinLength => length_of(value).zip(as_length(&self.arg)).map_or(false, |(len, bound)| {
                match length_semantics {
                    LengthSemantics::Strict => len > bound,
                    LengthSemantics::Inclusive => len >= bound,
                }
            }),
            ConstraintOp::MaxLength => length_of(value).zip(as_length(&self.arg)).map_or(false, |(len, bound)| {
                match length_semantics {
                    LengthSemantics::Strict => len < bound,
                    LengthSemantics::Inclusive => len <= bound,
                }
            }),
            ConstraintOp::Pattern => self.pattern_matches(value),
        }
    }

    fn in_range(&self, value: &Value) -> bool {
        let Some(bounds) = self.arg.as_sequence() else {
            return false;
        };
        let [lo, hi] = bounds.as_slice() else { return false };
        let (Some(lo), Some(hi), Some(v)) = (as_f64(lo), as_f64(hi), as_f64(value)) else {
            return false;
        };
        v >= lo && v < hi
    }

    fn pattern_matches(&self, value: &Value) -> bool {
        let (Some(pattern), Some(haystack)) = (self.arg.as_str(), value.as_str()) else {
            return false;
        };
        let Ok(regex) = Regex::new(pattern) else {
            return false;
        };
        regex.find(haystack).map_or(false, |m| m.start() == 0)
    }
}

fn value_eq(a: &Value, b: &Value) -> bool {
    if let (Some(a), Some(b)) = (as_f64(a), as_f64(b)) {
        return a == b;
    }
    a == b
}

fn compare(a: &Value, b: &Value) -> Option<std::cmp::Ordering> {
    if let (Some(a), Some(b)) = (as_f64(a), as_f64(b)) {
        return a.partial_cmp(&b);
    }
    if let (Some(a), Some(b)) = (a.as_str(), b.as_str()) {
        return Some(a.cmp(b));
    }
    None
}

fn as_f64(value: &Value) -> Option<f64> {
    value.as_f64().or_else(|| value.as_i64().map(|n| n as f64))
}

fn as_length(value: &Value) -> Option<usize> {
    value.as_u64().map(|n| n as usize)
}

fn length_of(value: &Value) -> Option<usize> {
    match value {
        Value::String(s) => Some(s.chars().count()),
        Value::Sequence(seq) => Some(seq.len()),
        Value::Mapping(map) => Some(map.len()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_yaml::Value;

    fn parse(yaml: &str) -> Constraint {
        let value: Value = serde_yaml::from_str(yaml).unwrap();
        Constraint::parse(&value).unwrap()
    }

    #[test]
    fn greater_than() {
        let c = parse("greater_than: 1");
        assert!(c.evaluate(&Value::from(2), LengthSemantics::Strict));
        assert!(!c.evaluate(&Value::from(1), LengthSemantics::Strict));
    }

    #[test]
    fn in_range_is_half_open() {
        let c = parse("in_range: [1, 4]");
        assert!(c.evaluate(&Value::from(1), LengthSemantics::Strict));
        assert!(c.evaluate(&Value::from(3), LengthSemantics::Strict));
        assert!(!c.evaluate(&Value::from(4), LengthSemantics::Strict));
    }

    #[test]
    fn valid_values() {
        let c = parse("valid_values: [a, b, c]");
        assert!(c.evaluate(&Value::from("b"), LengthSemantics::Strict));
        assert!(!c.evaluate(&Value::from("z"), LengthSemantics::Strict));
    }

    #[test]
    fn min_length_is_strict_by_default() {
        let c = parse("min_length: 3");
        assert!(!c.evaluate(&Value::from("abc"), LengthSemantics::Strict));
        assert!(c.evaluate(&Value::from("abcd"), LengthSemantics::Strict));
        assert!(c.evaluate(&Value::from("abc"), LengthSemantics::Inclusive));
    }

    #[test]
    fn max_length_is_strict_by_default() {
        let c = parse("max_length: 3");
        assert!(!c.evaluate(&Value::from("abc"), LengthSemantics::Strict));
        assert!(c.evaluate(&Value::from("ab"), LengthSemantics::Strict));
        assert!(c.evaluate(&Value::from("abc"), LengthSemantics::Inclusive));
    }

    #[test]
    fn pattern_matches_at_start_only() {
        let c = parse(r#"pattern: "^db-\\d+$""#);
        assert!(c.evaluate(&Value::from("db-1"), LengthSemantics::Strict));
        assert!(!c.evaluate(&Value::from("prefix-db-1"), LengthSemantics::Strict));
    }

    #[test]
    fn unknown_operator_is_rejected_at_parse_time() {
        let value: Value = serde_yaml::from_str("frobnicate: 1").unwrap();
        let err = Constraint::parse(&value).unwrap_err();
        assert!(matches!(err, SchemaError::UnknownConstraint { op } if op == "frobnicate"));
    }
}
