//! Default values derived from constraint trees.
//!
//! Resolution never fails: a missing or partial constraint degrades to the
//! most permissive value for its kind.
use serde_json::{Map, Value};

use crate::schema::{ArrayConstraint, ConstraintLeaf, ObjectConstraint, Param};

/// Input accepted by [`resolve_default`].
#[derive(Debug, Clone, Copy)]
pub enum DefaultSource<'a> {
    Leaf(&'a ConstraintLeaf),
    Array(&'a ArrayConstraint),
}

impl<'a> From<&'a ConstraintLeaf> for DefaultSource<'a> {
    fn from(leaf: &'a ConstraintLeaf) -> Self {
        DefaultSource::Leaf(leaf)
    }
}

impl<'a> From<&'a ArrayConstraint> for DefaultSource<'a> {
    fn from(arr: &'a ArrayConstraint) -> Self {
        DefaultSource::Array(arr)
    }
}

pub fn resolve_default(source: Option<DefaultSource<'_>>) -> Value {
    match source {
        None => Value::from(""),
        Some(DefaultSource::Leaf(leaf)) => default_for_leaf(leaf),
        Some(DefaultSource::Array(arr)) => default_for_array(Some(arr)),
    }
}

pub fn default_for_leaf(leaf: &ConstraintLeaf) -> Value {
    match leaf {
        ConstraintLeaf::String { constraints } => constraints
            .as_ref()
            .and_then(|c| c.default_value.clone())
            .map(Value::from)
            .unwrap_or_else(|| Value::from("")),
        ConstraintLeaf::Number { constraints } => {
            let c = constraints.as_ref();
            let n = c.and_then(|c| c.default_value.or(c.min)).unwrap_or(0.0);
            number_value(n)
        }
        ConstraintLeaf::Boolean { constraints } => {
            Value::Bool(constraints.as_ref().and_then(|c| c.default_value).unwrap_or(false))
        }
        ConstraintLeaf::Enum { constraints } => constraints
            .as_ref()
            .and_then(|c| c.default_value.clone().or_else(|| c.values.first().cloned()))
            .map(Value::from)
            .unwrap_or_else(|| Value::from("")),
        ConstraintLeaf::Array { constraints } => default_for_array(constraints.as_ref()),
        ConstraintLeaf::Object { constraints } => default_for_object(constraints.as_ref()),
    }
}

pub fn default_for_array(constraints: Option<&ArrayConstraint>) -> Value {
    let Some(c) = constraints else {
        return Value::Array(Vec::new());
    };
    if let Some(declared) = &c.default_value {
        return Value::Array(declared.clone());
    }
    let len = c.min.unwrap_or(0);
    let items = match c.template.as_deref() {
        None => vec![Value::from(""); len],
        // one resolution per slot so nested containers are never shared
        Some(template) => (0..len).map(|_| default_for_leaf(template)).collect(),
    };
    Value::Array(items)
}

pub fn default_for_object(constraints: Option<&ObjectConstraint>) -> Value {
    match constraints {
        None | Some(ObjectConstraint::Homogeneous(_)) => Value::Object(Map::new()),
        Some(ObjectConstraint::Keyed(keyed)) => Value::Object(
            keyed
                .by
                .iter()
                .map(|(key, leaf)| (key.clone(), default_for_leaf(leaf)))
                .collect(),
        ),
    }
}

/// Default for one param: the declared value, else `null` when untyped, else
/// the fallback for its kind.
pub fn default_for_param(param: &Param) -> Value {
    if let Some(declared) = &param.default_value {
        return declared.clone();
    }
    match &param.shape {
        None => Value::Null,
        Some(ConstraintLeaf::String { .. }) => Value::from(""),
        Some(ConstraintLeaf::Number { .. }) => Value::from(0),
        Some(ConstraintLeaf::Boolean { .. }) => Value::Bool(false),
        Some(leaf @ (ConstraintLeaf::Enum { .. } | ConstraintLeaf::Array { .. } | ConstraintLeaf::Object { .. })) => {
            default_for_leaf(leaf)
        }
    }
}

/// Initial form values keyed by param name, in param order.
pub fn resolve_defaults(params: &[Param]) -> Map<String, Value> {
    params
        .iter()
        .map(|p| (p.name.clone(), default_for_param(p)))
        .collect()
}

/// Value for a freshly appended element at `index`.
pub fn default_for_new_item(constraints: Option<&ArrayConstraint>, index: usize) -> Value {
    if let Some(leaf) = constraints.and_then(|c| c.by_index.get(&index)) {
        return default_for_leaf(leaf);
    }
    match default_for_array(constraints) {
        Value::Array(mut items) if index < items.len() => items.swap_remove(index),
        Value::Array(items) => items.into_iter().next().unwrap_or_else(|| {
            constraints
                .and_then(|c| c.template.as_deref())
                .map(default_for_leaf)
                .unwrap_or_else(|| Value::from(""))
        }),
        other => other,
    }
}

/// Value for a freshly added property `key`.
pub fn default_for_new_key(constraints: Option<&ObjectConstraint>, key: &str) -> Value {
    constraints
        .and_then(|c| c.leaf_for(key))
        .map(default_for_leaf)
        .unwrap_or_else(|| Value::from(""))
}

/// Integral values stay integers so `0` does not render as `0.0`.
pub(crate) fn number_value(n: f64) -> Value {
    if n.is_finite() && n.fract() == 0.0 && n >= i64::MIN as f64 && n <= i64::MAX as f64 {
        Value::from(n as i64)
    } else {
        Value::from(n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn leaf(v: Value) -> ConstraintLeaf {
        serde_json::from_value(v).unwrap()
    }

    fn params(v: Value) -> Vec<Param> {
        serde_json::from_value(v).unwrap()
    }

    #[test]
    fn scalar_leaves() {
        assert_eq!(default_for_leaf(&leaf(json!({"type": "string", "constraints": {"minLength": 5}}))), json!(""));
        assert_eq!(
            default_for_leaf(&leaf(json!({"type": "string", "constraints": {"defaultValue": "hi"}}))),
            json!("hi")
        );
        assert_eq!(default_for_leaf(&leaf(json!({"type": "number", "constraints": {"min": 3}}))), json!(3));
        assert_eq!(
            default_for_leaf(&leaf(json!({"type": "number", "constraints": {"min": 3, "defaultValue": 7.5}}))),
            json!(7.5)
        );
        assert_eq!(default_for_leaf(&leaf(json!({"type": "number"}))), json!(0));
        assert_eq!(default_for_leaf(&leaf(json!({"type": "boolean"}))), json!(false));
        assert_eq!(
            default_for_leaf(&leaf(json!({"type": "enum", "constraints": {"values": ["asc", "desc"]}}))),
            json!("asc")
        );
    }

    #[test]
    fn array_defaults() {
        let declared = leaf(json!({"type": "array", "constraints": {"min": 3, "defaultValue": [1, "x"]}}));
        assert_eq!(default_for_leaf(&declared), json!([1, "x"]));

        let untemplated = leaf(json!({"type": "array", "constraints": {"min": 2}}));
        assert_eq!(default_for_leaf(&untemplated), json!(["", ""]));

        let templated = leaf(json!({
            "type": "array",
            "constraints": {
                "min": 2,
                "template": {"type": "object", "constraints": {"by": {"x": {"type": "number"}}}}
            }
        }));
        assert_eq!(default_for_leaf(&templated), json!([{"x": 0}, {"x": 0}]));

        assert_eq!(default_for_leaf(&leaf(json!({"type": "array"}))), json!([]));
    }

    #[test]
    fn object_defaults() {
        let keyed = leaf(json!({
            "type": "object",
            "constraints": {"by": {
                "name": {"type": "string"},
                "tags": {"type": "array", "constraints": {"min": 1, "template": {"type": "boolean"}}}
            }}
        }));
        assert_eq!(default_for_leaf(&keyed), json!({"name": "", "tags": [false]}));

        let homogeneous = leaf(json!({"type": "object", "constraints": {"type": "number"}}));
        assert_eq!(default_for_leaf(&homogeneous), json!({}));
    }

    #[test]
    fn absent_constraint_is_empty_string() {
        assert_eq!(resolve_default(None), json!(""));
        let arr = ArrayConstraint { min: Some(1), ..Default::default() };
        assert_eq!(resolve_default(Some((&arr).into())), json!([""]));
    }

    #[test]
    fn param_level_defaults() {
        let ps = params(json!([
            {"name": "n", "type": "number", "defaultValue": 2, "constraints": {"min": 1}},
            {"name": "m", "type": "number", "constraints": {"min": 1}},
            {"name": "label", "type": "string"},
            {"name": "flag", "type": "boolean"},
            {"name": "value"},
            {"name": "items", "type": "array", "constraints": {"min": 1, "template": {"type": "number"}}},
            {"name": "user", "type": "object", "constraints": {"by": {"id": {"type": "number"}}}}
        ]));
        let defaults = resolve_defaults(&ps);
        assert_eq!(defaults.keys().collect::<Vec<_>>(), ["n", "m", "label", "flag", "value", "items", "user"]);
        assert_eq!(
            Value::Object(defaults),
            json!({
                "n": 2, "m": 0, "label": "", "flag": false, "value": null,
                "items": [0], "user": {"id": 0}
            })
        );
    }

    #[test]
    fn new_item_and_key_defaults() {
        let arr: ArrayConstraint = serde_json::from_value(json!({
            "template": {"type": "number"},
            "by": {"1": {"type": "string", "constraints": {"defaultValue": "second"}}}
        }))
        .unwrap();
        assert_eq!(default_for_new_item(Some(&arr), 0), json!(0));
        assert_eq!(default_for_new_item(Some(&arr), 1), json!("second"));
        assert_eq!(default_for_new_item(Some(&arr), 4), json!(0));
        assert_eq!(default_for_new_item(None, 0), json!(""));

        let obj = ObjectConstraint::keyed([("zip", leaf(json!({"type": "number"})))]);
        assert_eq!(default_for_new_key(Some(&obj), "zip"), json!(0));
        assert_eq!(default_for_new_key(Some(&obj), "other"), json!(""));
    }
}
