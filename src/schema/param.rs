use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};

use super::{ConstraintLeaf, LeafKind};
use crate::error::Error;

/// One function or constructor argument.
///
/// `type` and `constraints` travel together as a [`ConstraintLeaf`]; a param
/// without a `type` is untyped and its kind is chosen at runtime.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "RawParam")]
pub struct Param {
    pub name: String,
    pub shape: Option<ConstraintLeaf>,
    pub required: Option<bool>,
    pub description: Option<String>,
    pub default_value: Option<Value>,
}

impl Param {
    pub fn untyped(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            shape: None,
            required: None,
            description: None,
            default_value: None,
        }
    }

    pub fn typed(name: impl Into<String>, shape: ConstraintLeaf) -> Self {
        Self { shape: Some(shape), ..Self::untyped(name) }
    }

    pub fn with_default(mut self, value: Value) -> Self {
        self.default_value = Some(value);
        self
    }

    pub fn kind(&self) -> Option<LeafKind> {
        self.shape.as_ref().map(ConstraintLeaf::kind)
    }

    pub fn is_required(&self) -> bool {
        self.required.unwrap_or(true)
    }
}

/// Flat wire form, checked on the way in.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawParam {
    name: String,
    #[serde(rename = "type", default)]
    kind: Option<LeafKind>,
    #[serde(default)]
    constraints: Option<Value>,
    #[serde(default)]
    required: Option<bool>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    default_value: Option<Value>,
}

impl TryFrom<RawParam> for Param {
    type Error = Error;

    fn try_from(raw: RawParam) -> Result<Self, Self::Error> {
        let shape = match (raw.kind, raw.constraints) {
            (None, None) => None,
            (None, Some(_)) => {
                return Err(Error::InvalidParam {
                    name: raw.name,
                    reason: "constraints given without a type".into(),
                });
            }
            (Some(kind), constraints) => {
                let mut leaf = Map::new();
                leaf.insert("type".into(), Value::from(kind.as_str()));
                if let Some(constraints) = constraints {
                    leaf.insert("constraints".into(), constraints);
                }
                let leaf = serde_json::from_value::<ConstraintLeaf>(Value::Object(leaf)).map_err(|e| {
                    Error::InvalidParam { name: raw.name.clone(), reason: e.to_string() }
                })?;
                Some(leaf)
            }
        };
        Ok(Param {
            name: raw.name,
            shape,
            required: raw.required,
            description: raw.description,
            default_value: raw.default_value,
        })
    }
}

impl Serialize for Param {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("name", &self.name)?;
        if let Some(shape) = &self.shape {
            map.serialize_entry("type", &shape.kind())?;
            shape.serialize_constraints(&mut map)?;
        }
        if let Some(required) = self.required {
            map.serialize_entry("required", &required)?;
        }
        if let Some(description) = &self.description {
            map.serialize_entry("description", description)?;
        }
        if let Some(default_value) = &self.default_value {
            map.serialize_entry("defaultValue", default_value)?;
        }
        map.end()
    }
}
