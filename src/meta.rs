//! Function and class metadata documents.
//!
//! A metadata file pairs hand-authored entity descriptions with optional test
//! cases:
//! ```json
//! { "testCases": [{ "input": 2, "output": "1 2\n1" }],
//!   "meta": { "p6": { "type": "function", "name": "p6", "params": [...] } } }
//! ```
use indexmap::IndexMap;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};

use crate::schema::Param;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionMetadata {
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub params: Vec<Param>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_async: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassMetadata {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub construct: Option<Vec<Param>>,
    /// Written back with their `"type": "function"` tag.
    #[serde(default, skip_serializing_if = "Vec::is_empty", serialize_with = "serialize_methods")]
    pub methods: Vec<FunctionMetadata>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum MethodRef<'a> {
    Function(&'a FunctionMetadata),
}

fn serialize_methods<S: Serializer>(methods: &[FunctionMetadata], serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_seq(methods.iter().map(MethodRef::Function))
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Entity {
    Function(FunctionMetadata),
    Class(ClassMetadata),
}

impl Entity {
    pub fn name(&self) -> &str {
        match self {
            Entity::Function(f) => &f.name,
            Entity::Class(c) => &c.name,
        }
    }

    /// Every callable surface with its params: the function itself, or a
    /// class's constructor followed by its methods.
    pub fn signatures(&self) -> Vec<(String, &[Param])> {
        match self {
            Entity::Function(f) => vec![(f.name.clone(), f.params.as_slice())],
            Entity::Class(c) => {
                let mut out = Vec::with_capacity(c.methods.len() + 1);
                if let Some(construct) = &c.construct {
                    out.push((format!("{}::new", c.name), construct.as_slice()));
                }
                for m in &c.methods {
                    out.push((format!("{}::{}", c.name, m.name), m.params.as_slice()));
                }
                out
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestCase {
    pub input: Value,
    pub output: Value,
}

impl TestCase {
    /// Bind `input` to named arguments: a single param takes the whole input,
    /// an array binds positionally, an object binds by name.
    pub fn arguments(&self, params: &[Param]) -> Map<String, Value> {
        let mut args = Map::new();
        match (params, &self.input) {
            ([only], input) => {
                args.insert(only.name.clone(), input.clone());
            }
            (_, Value::Array(items)) => {
                for (param, item) in params.iter().zip(items) {
                    args.insert(param.name.clone(), item.clone());
                }
            }
            (_, Value::Object(fields)) => {
                for param in params {
                    if let Some(v) = fields.get(&param.name) {
                        args.insert(param.name.clone(), v.clone());
                    }
                }
            }
            _ => {}
        }
        args
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetadataFile {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub test_cases: Vec<TestCase>,
    #[serde(default)]
    pub meta: IndexMap<String, Entity>,
}
