use serde::{Deserialize, Serialize, Serializer};

use crate::defaults::number_value;

/// Lengths count Unicode scalar values (`char`s), not UTF-16 code units or
/// bytes: `"😀"` has length 1.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct StringConstraint {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_length: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,
    /// Unanchored regular expression the value must contain a match for.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NumberConstraint {
    #[serde(default, skip_serializing_if = "Option::is_none", serialize_with = "serialize_number")]
    pub min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none", serialize_with = "serialize_number")]
    pub max: Option<f64>,
    /// Input increment for form widgets; not a validation rule.
    #[serde(default, skip_serializing_if = "Option::is_none", serialize_with = "serialize_number")]
    pub step: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none", serialize_with = "serialize_number")]
    pub default_value: Option<f64>,
}

/// Integral bounds are written back as integers (`150`, not `150.0`).
fn serialize_number<S: Serializer>(n: &Option<f64>, serializer: S) -> Result<S::Ok, S::Error> {
    n.map(number_value).serialize(serializer)
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct BooleanConstraint {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct EnumConstraint {
    /// Accepted values, in display order.
    #[serde(default)]
    pub values: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<String>,
}

impl StringConstraint {
    pub(crate) fn overlay(&self, newer: &Self) -> Self {
        Self {
            min_length: newer.min_length.or(self.min_length),
            max_length: newer.max_length.or(self.max_length),
            pattern: newer.pattern.clone().or_else(|| self.pattern.clone()),
            default_value: newer.default_value.clone().or_else(|| self.default_value.clone()),
        }
    }
}

impl NumberConstraint {
    pub(crate) fn overlay(&self, newer: &Self) -> Self {
        Self {
            min: newer.min.or(self.min),
            max: newer.max.or(self.max),
            step: newer.step.or(self.step),
            default_value: newer.default_value.or(self.default_value),
        }
    }
}

impl BooleanConstraint {
    pub(crate) fn overlay(&self, newer: &Self) -> Self {
        Self { default_value: newer.default_value.or(self.default_value) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn integral_bounds_serialize_as_integers() {
        let c: NumberConstraint = serde_json::from_value(json!({"min": 0, "max": 150, "step": 0.5})).unwrap();
        assert_eq!(serde_json::to_value(&c).unwrap(), json!({"min": 0, "max": 150, "step": 0.5}));
        assert_eq!(serde_json::to_string(&c).unwrap(), r#"{"min":0,"max":150,"step":0.5}"#);
    }
}
