//! Shape summaries for tooltips and diagnostics.
//!
//! A [`Structure`] mirrors the constraint tree, not the set of values it
//! accepts: leaves are tag names, containers expose `template` and their
//! per-key / per-index overrides. A keyed object that also has a template
//! nests its overrides under `by`, so a property named `template` stays
//! distinct from the template itself.
use std::fmt;

use indexmap::IndexMap;
use serde::Serialize;

use crate::schema::{ArrayConstraint, ConstraintLeaf, ObjectConstraint};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Structure {
    Leaf(&'static str),
    Node(IndexMap<String, Structure>),
}

pub fn describe(leaf: &ConstraintLeaf) -> Structure {
    match leaf {
        ConstraintLeaf::Array { constraints: Some(c) } => describe_array(c),
        ConstraintLeaf::Object { constraints: Some(c) } => describe_object(c),
        other => Structure::Leaf(other.kind().as_str()),
    }
}

fn describe_array(c: &ArrayConstraint) -> Structure {
    let mut node = IndexMap::new();
    if let Some(template) = &c.template {
        node.insert("template".to_string(), describe(template));
    }
    for (i, leaf) in &c.by_index {
        node.insert(i.to_string(), describe(leaf));
    }
    if node.is_empty() { Structure::Leaf("array") } else { Structure::Node(node) }
}

fn describe_object(c: &ObjectConstraint) -> Structure {
    let node = match c {
        ObjectConstraint::Homogeneous(leaf) => IndexMap::from([("template".to_string(), describe(leaf))]),
        ObjectConstraint::Keyed(keyed) => {
            let by: IndexMap<String, Structure> =
                keyed.by.iter().map(|(key, leaf)| (key.clone(), describe(leaf))).collect();
            match &keyed.template {
                Some(template) => {
                    let mut node = IndexMap::from([("template".to_string(), describe(template))]);
                    if !by.is_empty() {
                        node.insert("by".to_string(), Structure::Node(by));
                    }
                    node
                }
                None => by,
            }
        }
    };
    if node.is_empty() { Structure::Leaf("object") } else { Structure::Node(node) }
}

/// Pretty JSON with the quotes stripped, as shown in field tooltips.
impl fmt::Display for Structure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let pretty = serde_json::to_string_pretty(self).map_err(|_| fmt::Error)?;
        f.write_str(&pretty.replace('"', ""))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn describe_json(v: serde_json::Value) -> serde_json::Value {
        let leaf: ConstraintLeaf = serde_json::from_value(v).unwrap();
        serde_json::to_value(describe(&leaf)).unwrap()
    }

    #[test]
    fn scalars_describe_as_tag() {
        assert_eq!(describe_json(json!({"type": "string", "constraints": {"minLength": 3}})), json!("string"));
        assert_eq!(describe_json(json!({"type": "enum", "constraints": {"values": ["a"]}})), json!("enum"));
        assert_eq!(describe_json(json!({"type": "array"})), json!("array"));
        assert_eq!(describe_json(json!({"type": "object", "constraints": {}})), json!("object"));
    }

    #[test]
    fn containers_mirror_their_shape() {
        let got = describe_json(json!({
            "type": "array",
            "constraints": {
                "min": 2,
                "template": {"type": "number"},
                "by": {"1": {"type": "object", "constraints": {"by": {
                    "id": {"type": "number"},
                    "tags": {"type": "object", "constraints": {"type": "boolean"}}
                }}}}
            }
        }));
        assert_eq!(
            got,
            json!({
                "template": "number",
                "1": {"id": "number", "tags": {"template": "boolean"}}
            })
        );
    }

    #[test]
    fn keyed_object_with_template_nests_overrides() {
        let got = describe_json(json!({
            "type": "object",
            "constraints": {"template": {"type": "number"}, "by": {"template": {"type": "string"}}}
        }));
        assert_eq!(got, json!({"template": "number", "by": {"template": "string"}}));

        let got = describe_json(json!({"type": "object", "constraints": {"template": {"type": "boolean"}}}));
        assert_eq!(got, json!({"template": "boolean"}));
    }

    #[test]
    fn display_strips_quotes() {
        let leaf: ConstraintLeaf =
            serde_json::from_value(json!({"type": "array", "constraints": {"template": {"type": "string"}}})).unwrap();
        assert_eq!(describe(&leaf).to_string(), "{\n  template: string\n}");
    }
}
