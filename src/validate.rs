//! Validator generation.
//!
//! A constraint tree is compiled once into a [`Validator`] (regexes built up
//! front), then checked against any number of candidate values. Checking never
//! stops at the first failure: every violation is collected in depth-first
//! order, array indices ascending and object keys in declaration order.
use std::collections::BTreeMap;
use std::fmt;

use indexmap::IndexMap;
use regex::Regex;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::schema::{ArrayConstraint, ConstraintLeaf, ObjectConstraint, Param};

// ------------------------------- Issues ----------------------------------- //

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(untagged)]
pub enum PathSegment {
    Key(String),
    Index(usize),
}

impl From<&str> for PathSegment {
    fn from(key: &str) -> Self {
        PathSegment::Key(key.to_string())
    }
}

impl From<usize> for PathSegment {
    fn from(index: usize) -> Self {
        PathSegment::Index(index)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Issue {
    pub path: Vec<PathSegment>,
    pub message: String,
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", format_path(&self.path), self.message)
    }
}

/// `user.addresses[0].city`; the empty path renders as `(root)`.
pub fn format_path(path: &[PathSegment]) -> String {
    if path.is_empty() {
        return "(root)".into();
    }
    let mut out = String::new();
    for seg in path {
        match seg {
            PathSegment::Key(k) => {
                if !out.is_empty() {
                    out.push('.');
                }
                out.push_str(k);
            }
            PathSegment::Index(i) => out.push_str(&format!("[{i}]")),
        }
    }
    out
}

pub type ValidationResult = Result<(), Vec<Issue>>;

// ------------------------------ Compiled tree ----------------------------- //

#[derive(Debug, Clone)]
enum Node {
    Any,
    String {
        min_length: Option<usize>,
        max_length: Option<usize>,
        pattern: Option<Regex>,
    },
    Number {
        min: Option<f64>,
        max: Option<f64>,
    },
    Boolean,
    Enum {
        values: Vec<String>,
    },
    Array(ArrayNode),
    Object(ObjectNode),
}

#[derive(Debug, Clone)]
struct ArrayNode {
    template: Option<Box<Node>>,
    by_index: BTreeMap<usize, Node>,
    min: Option<usize>,
    max: Option<usize>,
    reject_falsy: bool,
}

#[derive(Debug, Clone)]
enum ObjectNode {
    /// Any record is accepted.
    Open,
    /// Every property checked against one shape.
    Uniform(Box<Node>),
    /// Declared keys checked individually; `rest` covers undeclared keys.
    Keyed {
        by: IndexMap<String, Node>,
        rest: Option<Box<Node>>,
    },
}

/// A compiled checker for one constraint leaf.
#[derive(Debug, Clone)]
pub struct Validator {
    node: Node,
}

impl Validator {
    pub fn compile(leaf: &ConstraintLeaf) -> Self {
        Self { node: compile_leaf(leaf) }
    }

    /// Accepts every value; used for untyped params.
    pub fn any() -> Self {
        Self { node: Node::Any }
    }

    pub fn validate(&self, value: &Value) -> ValidationResult {
        let mut issues = Vec::new();
        check(&self.node, value, &mut Vec::new(), &mut issues);
        if issues.is_empty() { Ok(()) } else { Err(issues) }
    }

    fn accepts_anything(&self) -> bool {
        matches!(self.node, Node::Any)
    }
}

/// Shorthand for [`Validator::compile`].
pub fn compile(leaf: &ConstraintLeaf) -> Validator {
    Validator::compile(leaf)
}

fn compile_leaf(leaf: &ConstraintLeaf) -> Node {
    match leaf {
        ConstraintLeaf::String { constraints } => {
            let c = constraints.as_ref();
            Node::String {
                min_length: c.and_then(|c| c.min_length),
                max_length: c.and_then(|c| c.max_length),
                pattern: c.and_then(|c| c.pattern.as_deref()).and_then(compile_pattern),
            }
        }
        ConstraintLeaf::Number { constraints } => {
            let c = constraints.as_ref();
            Node::Number { min: c.and_then(|c| c.min), max: c.and_then(|c| c.max) }
        }
        ConstraintLeaf::Boolean { .. } => Node::Boolean,
        ConstraintLeaf::Enum { constraints } => Node::Enum {
            values: constraints.as_ref().map(|c| c.values.clone()).unwrap_or_default(),
        },
        ConstraintLeaf::Array { constraints } => Node::Array(compile_array(constraints.as_ref())),
        ConstraintLeaf::Object { constraints } => Node::Object(compile_object(constraints.as_ref())),
    }
}

fn compile_pattern(src: &str) -> Option<Regex> {
    match Regex::new(src) {
        Ok(rx) => Some(rx),
        Err(error) => {
            tracing::warn!(pattern = src, %error, "dropping unparsable string pattern");
            None
        }
    }
}

fn compile_array(constraints: Option<&ArrayConstraint>) -> ArrayNode {
    let Some(c) = constraints else {
        return ArrayNode { template: None, by_index: BTreeMap::new(), min: None, max: None, reject_falsy: false };
    };
    ArrayNode {
        template: c.template.as_deref().map(|t| Box::new(compile_leaf(t))),
        by_index: c.by_index.iter().map(|(i, leaf)| (*i, compile_leaf(leaf))).collect(),
        min: c.effective_min(),
        max: c.max,
        reject_falsy: c.can_include_falsy == Some(false),
    }
}

fn compile_object(constraints: Option<&ObjectConstraint>) -> ObjectNode {
    match constraints {
        None => ObjectNode::Open,
        Some(ObjectConstraint::Homogeneous(leaf)) => ObjectNode::Uniform(Box::new(compile_leaf(leaf))),
        Some(ObjectConstraint::Keyed(keyed)) if keyed.by.is_empty() => match keyed.template.as_deref() {
            Some(template) => ObjectNode::Uniform(Box::new(compile_leaf(template))),
            None => ObjectNode::Open,
        },
        Some(ObjectConstraint::Keyed(keyed)) => ObjectNode::Keyed {
            by: keyed.by.iter().map(|(k, leaf)| (k.clone(), compile_leaf(leaf))).collect(),
            rest: keyed.template.as_deref().map(|t| Box::new(compile_leaf(t))),
        },
    }
}

// -------------------------------- Checking -------------------------------- //

fn kind_of(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn is_falsy(v: &Value) -> bool {
    match v {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64().is_none_or(|f| f == 0.0 || f.is_nan()),
        Value::String(s) => s.is_empty(),
        Value::Array(_) | Value::Object(_) => false,
    }
}

fn push(out: &mut Vec<Issue>, path: &[PathSegment], message: String) {
    out.push(Issue { path: path.to_vec(), message });
}

fn mismatch(out: &mut Vec<Issue>, path: &[PathSegment], expected: &str, got: &Value) {
    push(out, path, format!("Expected {expected}, received {}", kind_of(got)));
}

fn check(node: &Node, value: &Value, path: &mut Vec<PathSegment>, out: &mut Vec<Issue>) {
    match node {
        Node::Any => {}
        Node::String { min_length, max_length, pattern } => {
            let Value::String(s) = value else {
                return mismatch(out, path, "string", value);
            };
            let len = s.chars().count();
            if let Some(min) = *min_length {
                if len < min {
                    push(out, path, format!("Minimum length is {min}"));
                }
            }
            if let Some(max) = *max_length {
                if len > max {
                    push(out, path, format!("Maximum length is {max}"));
                }
            }
            if let Some(rx) = pattern {
                if !rx.is_match(s) {
                    push(out, path, format!("Must match pattern {}", rx.as_str()));
                }
            }
        }
        Node::Number { min, max } => {
            let Some(n) = value.as_f64() else {
                return mismatch(out, path, "number", value);
            };
            if let Some(min) = *min {
                if n < min {
                    push(out, path, format!("Minimum value is {min}"));
                }
            }
            if let Some(max) = *max {
                if n > max {
                    push(out, path, format!("Maximum value is {max}"));
                }
            }
        }
        Node::Boolean => {
            if !value.is_boolean() {
                mismatch(out, path, "boolean", value);
            }
        }
        Node::Enum { values } => {
            let member = value.as_str().is_some_and(|s| values.iter().any(|v| v == s));
            if !member {
                push(out, path, format!("Expected one of: {}", values.join(", ")));
            }
        }
        Node::Array(arr) => check_array(arr, value, path, out),
        Node::Object(obj) => check_object(obj, value, path, out),
    }
}

fn check_array(arr: &ArrayNode, value: &Value, path: &mut Vec<PathSegment>, out: &mut Vec<Issue>) {
    let Value::Array(items) = value else {
        return mismatch(out, path, "array", value);
    };
    for (i, item) in items.iter().enumerate() {
        path.push(PathSegment::Index(i));
        if arr.reject_falsy && is_falsy(item) {
            push(out, path, "Falsy values are not allowed".into());
        }
        let node = arr.by_index.get(&i).or(arr.template.as_deref());
        if let Some(node) = node {
            check(node, item, path, out);
        }
        path.pop();
    }
    if let Some(min) = arr.min {
        if items.len() < min {
            push(out, path, format!("Array must contain at least {min} item(s)"));
        }
    }
    if let Some(max) = arr.max {
        if items.len() > max {
            push(out, path, format!("Array must contain at most {max} item(s)"));
        }
    }
}

fn check_object(obj: &ObjectNode, value: &Value, path: &mut Vec<PathSegment>, out: &mut Vec<Issue>) {
    let Value::Object(fields) = value else {
        return mismatch(out, path, "object", value);
    };
    match obj {
        ObjectNode::Open => {}
        ObjectNode::Uniform(node) => {
            for (key, v) in fields {
                path.push(PathSegment::Key(key.clone()));
                check(node, v, path, out);
                path.pop();
            }
        }
        ObjectNode::Keyed { by, rest } => {
            for (key, node) in by {
                if let Some(v) = fields.get(key) {
                    path.push(PathSegment::Key(key.clone()));
                    check(node, v, path, out);
                    path.pop();
                }
            }
            if let Some(rest) = rest {
                for (key, v) in fields.iter().filter(|(k, _)| !by.contains_key(*k)) {
                    path.push(PathSegment::Key(key.clone()));
                    check(rest, v, path, out);
                    path.pop();
                }
            }
        }
    }
}

// ------------------------------ Param lists -------------------------------- //

#[derive(Debug, Clone)]
struct FieldRule {
    name: String,
    required: bool,
    validator: Validator,
}

/// Form-level checker for a whole argument record.
#[derive(Debug, Clone)]
pub struct ParamsValidator {
    fields: Vec<FieldRule>,
}

impl ParamsValidator {
    pub fn compile(params: &[Param]) -> Self {
        let fields = params
            .iter()
            .map(|p| FieldRule {
                name: p.name.clone(),
                required: p.is_required(),
                validator: p.shape.as_ref().map(Validator::compile).unwrap_or_else(Validator::any),
            })
            .collect();
        Self { fields }
    }

    /// Absent or `null` arguments are `Required` when the param is required
    /// and skipped otherwise.
    pub fn validate(&self, args: &Map<String, Value>) -> ValidationResult {
        let mut issues = Vec::new();
        for field in &self.fields {
            match args.get(&field.name) {
                None | Some(Value::Null) if field.required && !field.validator.accepts_anything() => {
                    issues.push(Issue { path: vec![PathSegment::Key(field.name.clone())], message: "Required".into() });
                }
                None | Some(Value::Null) => {}
                Some(v) => {
                    let mut path = vec![PathSegment::Key(field.name.clone())];
                    check(&field.validator.node, v, &mut path, &mut issues);
                }
            }
        }
        if issues.is_empty() { Ok(()) } else { Err(issues) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn validator(v: Value) -> Validator {
        Validator::compile(&serde_json::from_value(v).unwrap())
    }

    fn rendered(result: ValidationResult) -> Vec<String> {
        result.unwrap_err().iter().map(ToString::to_string).collect()
    }

    #[test]
    fn number_bounds_are_inclusive() {
        let v = validator(json!({"type": "number", "constraints": {"min": 1, "max": 10}}));
        assert!(v.validate(&json!(5)).is_ok());
        assert!(v.validate(&json!(1)).is_ok());
        assert!(v.validate(&json!(10)).is_ok());

        let issues = v.validate(&json!(11)).unwrap_err();
        assert_eq!(issues.len(), 1);
        assert!(issues[0].path.is_empty());
        assert_eq!(issues[0].message, "Maximum value is 10");
    }

    #[test]
    fn string_rules_each_report() {
        let v = validator(json!({
            "type": "string",
            "constraints": {"minLength": 3, "maxLength": 5, "pattern": "^[a-z]+$"}
        }));
        assert!(v.validate(&json!("abcd")).is_ok());
        assert_eq!(
            rendered(v.validate(&json!("A"))),
            vec!["(root): Minimum length is 3", "(root): Must match pattern ^[a-z]+$"]
        );
        assert_eq!(rendered(v.validate(&json!(4))), vec!["(root): Expected string, received number"]);
        assert_eq!(rendered(v.validate(&json!("abcdef"))), vec!["(root): Maximum length is 5"]);
    }

    #[test]
    fn string_length_counts_chars() {
        let v = validator(json!({"type": "string", "constraints": {"maxLength": 1}}));
        assert!(v.validate(&json!("😀")).is_ok());
        assert!(v.validate(&json!("é")).is_ok());
        assert_eq!(rendered(v.validate(&json!("ab"))), vec!["(root): Maximum length is 1"]);
    }

    #[test]
    fn number_below_minimum_at_root() {
        let v = validator(json!({"type": "number", "constraints": {"min": 1, "max": 10}}));
        assert_eq!(rendered(v.validate(&json!(0))), vec!["(root): Minimum value is 1"]);
        assert_eq!(rendered(v.validate(&json!(-2.5))), vec!["(root): Minimum value is 1"]);
    }

    #[test]
    fn invalid_pattern_is_dropped() {
        let v = validator(json!({"type": "string", "constraints": {"pattern": "(", "minLength": 1}}));
        assert!(v.validate(&json!("x")).is_ok());
        assert!(v.validate(&json!("")).is_err());
    }

    #[test]
    fn enum_membership() {
        let v = validator(json!({"type": "enum", "constraints": {"values": ["red", "green"]}}));
        assert!(v.validate(&json!("green")).is_ok());
        assert_eq!(rendered(v.validate(&json!("blue"))), vec!["(root): Expected one of: red, green"]);
    }

    #[test]
    fn array_template_reports_element_index() {
        let v = validator(json!({
            "type": "array",
            "constraints": {"template": {"type": "string", "constraints": {"minLength": 2}}}
        }));
        assert_eq!(
            rendered(v.validate(&json!(["ok", "a"]))),
            vec!["[1]: Minimum length is 2"]
        );
    }

    #[test]
    fn by_index_overrides_template_and_sets_min() {
        let v = validator(json!({
            "type": "array",
            "constraints": {
                "template": {"type": "number"},
                "by": {"0": {"type": "string"}, "1": {"type": "boolean"}}
            }
        }));
        assert!(v.validate(&json!(["a", true, 3, 4])).is_ok());
        assert_eq!(
            rendered(v.validate(&json!([1]))),
            vec![
                "[0]: Expected string, received number",
                "(root): Array must contain at least 2 item(s)",
            ]
        );
    }

    #[test]
    fn array_length_bounds_and_falsy() {
        let v = validator(json!({"type": "array", "constraints": {"max": 2, "canIncludeFalsy": false}}));
        assert_eq!(
            rendered(v.validate(&json!([1, 0, ""]))),
            vec![
                "[1]: Falsy values are not allowed",
                "[2]: Falsy values are not allowed",
                "(root): Array must contain at most 2 item(s)",
            ]
        );
    }

    #[test]
    fn keyed_object_checks_declared_keys_only() {
        let v = validator(json!({
            "type": "object",
            "constraints": {"by": {
                "id": {"type": "number", "constraints": {"min": 1}},
                "email": {"type": "string", "constraints": {"pattern": "^[^@]+@[^@]+\\.[^@]+$"}}
            }}
        }));
        assert!(v.validate(&json!({"id": 3, "extra": [1, 2]})).is_ok());
        assert_eq!(
            rendered(v.validate(&json!({"email": "nope", "id": 0}))),
            vec![
                "id: Minimum value is 1",
                "email: Must match pattern ^[^@]+@[^@]+\\.[^@]+$",
            ]
        );
    }

    #[test]
    fn homogeneous_and_template_objects_check_every_key() {
        for constraints in [json!({"type": "number"}), json!({"template": {"type": "number"}})] {
            let v = validator(json!({"type": "object", "constraints": constraints}));
            assert_eq!(
                rendered(v.validate(&json!({"a": 1, "b": "x"}))),
                vec!["b: Expected number, received string"]
            );
        }
        let open = validator(json!({"type": "object"}));
        assert!(open.validate(&json!({"anything": [null]})).is_ok());
        assert!(open.validate(&json!([])).is_err());
    }

    #[test]
    fn nested_issues_keep_depth_first_order() {
        let v = validator(json!({
            "type": "array",
            "constraints": {"template": {
                "type": "object",
                "constraints": {"by": {
                    "city": {"type": "string", "constraints": {"minLength": 1}},
                    "zip": {"type": "number", "constraints": {"min": 0}}
                }}
            }}
        }));
        let issues = v.validate(&json!([{"city": "", "zip": -1}, {"city": "Oslo", "zip": -2}])).unwrap_err();
        let rendered: Vec<String> = issues.iter().map(ToString::to_string).collect();
        assert_eq!(
            rendered,
            [
                "[0].city: Minimum length is 1",
                "[0].zip: Minimum value is 0",
                "[1].zip: Minimum value is 0",
            ]
        );
    }

    #[test]
    fn params_validator_handles_required_and_untyped() {
        let params: Vec<Param> = serde_json::from_value(json!([
            {"name": "userId", "type": "number", "constraints": {"min": 1}},
            {"name": "note", "type": "string", "required": false},
            {"name": "value"}
        ]))
        .unwrap();
        let v = ParamsValidator::compile(&params);

        let ok = json!({"userId": 4, "value": {"k": 1}});
        assert!(v.validate(ok.as_object().unwrap()).is_ok());

        let bad = json!({"userId": null, "note": 3});
        assert_eq!(
            rendered(v.validate(bad.as_object().unwrap())),
            vec![
                "userId: Required",
                "note: Expected string, received number",
            ]
        );
    }

    #[test]
    fn path_rendering() {
        let path = vec!["user".into(), "addresses".into(), PathSegment::Index(0), "city".into()];
        assert_eq!(format_path(&path), "user.addresses[0].city");
        assert_eq!(format_path(&[]), "(root)");
    }
}
