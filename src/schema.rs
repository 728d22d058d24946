//! Constraint model: the closed grammar describing a parameter's shape.
//!
//! A [`ConstraintLeaf`] is tagged on `"type"` and carries only the constraint
//! payload legal for that tag; the payload structs reject foreign fields, so a
//! `string` leaf can never carry `min` or `template`.
//!
//! Wire form (JSON):
//! ```json
//! { "type": "array", "constraints": { "min": 1, "template": { "type": "number" } } }
//! { "type": "object", "constraints": { "by": { "id": { "type": "number" } } } }
//! { "type": "object", "constraints": { "type": "string" } }
//! ```
pub mod array;
pub mod object;
pub mod param;
pub mod scalar;

use std::fmt;

use serde::{Deserialize, Serialize};

pub use array::ArrayConstraint;
pub use object::{KeyedConstraint, ObjectConstraint};
pub use param::Param;
pub use scalar::{BooleanConstraint, EnumConstraint, NumberConstraint, StringConstraint};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ConstraintLeaf {
    String {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        constraints: Option<StringConstraint>,
    },
    Number {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        constraints: Option<NumberConstraint>,
    },
    Boolean {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        constraints: Option<BooleanConstraint>,
    },
    Enum {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        constraints: Option<EnumConstraint>,
    },
    Array {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        constraints: Option<ArrayConstraint>,
    },
    Object {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        constraints: Option<ObjectConstraint>,
    },
}

/// The bare `type` tag of a leaf.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LeafKind {
    String,
    Number,
    Boolean,
    Enum,
    Array,
    Object,
}

impl LeafKind {
    pub fn as_str(self) -> &'static str {
        match self {
            LeafKind::String => "string",
            LeafKind::Number => "number",
            LeafKind::Boolean => "boolean",
            LeafKind::Enum => "enum",
            LeafKind::Array => "array",
            LeafKind::Object => "object",
        }
    }
}

impl fmt::Display for LeafKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ConstraintLeaf {
    pub fn kind(&self) -> LeafKind {
        match self {
            ConstraintLeaf::String { .. } => LeafKind::String,
            ConstraintLeaf::Number { .. } => LeafKind::Number,
            ConstraintLeaf::Boolean { .. } => LeafKind::Boolean,
            ConstraintLeaf::Enum { .. } => LeafKind::Enum,
            ConstraintLeaf::Array { .. } => LeafKind::Array,
            ConstraintLeaf::Object { .. } => LeafKind::Object,
        }
    }

    /// A leaf of the given kind with no constraints.
    pub fn bare(kind: LeafKind) -> Self {
        match kind {
            LeafKind::String => ConstraintLeaf::String { constraints: None },
            LeafKind::Number => ConstraintLeaf::Number { constraints: None },
            LeafKind::Boolean => ConstraintLeaf::Boolean { constraints: None },
            LeafKind::Enum => ConstraintLeaf::Enum { constraints: None },
            LeafKind::Array => ConstraintLeaf::Array { constraints: None },
            LeafKind::Object => ConstraintLeaf::Object { constraints: None },
        }
    }

    pub fn has_constraints(&self) -> bool {
        match self {
            ConstraintLeaf::String { constraints } => constraints.is_some(),
            ConstraintLeaf::Number { constraints } => constraints.is_some(),
            ConstraintLeaf::Boolean { constraints } => constraints.is_some(),
            ConstraintLeaf::Enum { constraints } => constraints.is_some(),
            ConstraintLeaf::Array { constraints } => constraints.is_some(),
            ConstraintLeaf::Object { constraints } => constraints.is_some(),
        }
    }

    /// Write the `constraints` entry (if any) into a map being serialized.
    pub(crate) fn serialize_constraints<M>(&self, map: &mut M) -> Result<(), M::Error>
    where
        M: serde::ser::SerializeMap,
    {
        match self {
            ConstraintLeaf::String { constraints: Some(c) } => map.serialize_entry("constraints", c),
            ConstraintLeaf::Number { constraints: Some(c) } => map.serialize_entry("constraints", c),
            ConstraintLeaf::Boolean { constraints: Some(c) } => map.serialize_entry("constraints", c),
            ConstraintLeaf::Enum { constraints: Some(c) } => map.serialize_entry("constraints", c),
            ConstraintLeaf::Array { constraints: Some(c) } => map.serialize_entry("constraints", c),
            ConstraintLeaf::Object { constraints: Some(c) } => map.serialize_entry("constraints", c),
            _ => Ok(()),
        }
    }
}
