use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};

use super::ConstraintLeaf;

/// Constraint payload of an `object` leaf.
///
/// The two forms are told apart structurally: a payload that carries its own
/// `type` tag is [`ObjectConstraint::Homogeneous`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ObjectConstraint {
    /// Every property has this shape (an open-ended map).
    Homogeneous(Box<ConstraintLeaf>),
    /// Named properties, optionally with a fallback shape for the rest.
    Keyed(KeyedConstraint),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct KeyedConstraint {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template: Option<Box<ConstraintLeaf>>,
    /// Declaration order is preserved; validation and defaults follow it.
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub by: IndexMap<String, ConstraintLeaf>,
}

impl ObjectConstraint {
    pub fn keyed<I, K>(fields: I) -> Self
    where
        I: IntoIterator<Item = (K, ConstraintLeaf)>,
        K: Into<String>,
    {
        ObjectConstraint::Keyed(KeyedConstraint {
            template: None,
            by: fields.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        })
    }

    pub fn homogeneous(leaf: ConstraintLeaf) -> Self {
        ObjectConstraint::Homogeneous(Box::new(leaf))
    }

    /// The leaf governing property `key`, if any.
    pub fn leaf_for(&self, key: &str) -> Option<&ConstraintLeaf> {
        match self {
            ObjectConstraint::Homogeneous(leaf) => Some(leaf),
            ObjectConstraint::Keyed(keyed) => keyed.by.get(key).or(keyed.template.as_deref()),
        }
    }
}

impl KeyedConstraint {
    pub(crate) fn overlay(&self, newer: &Self) -> Self {
        let mut by = self.by.clone();
        for (key, leaf) in &newer.by {
            by.insert(key.clone(), leaf.clone());
        }
        Self {
            template: newer.template.clone().or_else(|| self.template.clone()),
            by,
        }
    }
}

// -------------------------------- Decoding -------------------------------- //

/// Accepted input forms, tried in order.
#[derive(Deserialize)]
#[serde(untagged)]
enum ObjectConstraintRepr {
    Homogeneous(Box<ConstraintLeaf>),
    Keyed(KeyedRepr),
    /// Legacy form: a bare `{ name: leaf }` map without `by`.
    ///
    /// Ambiguous with [`KeyedRepr`]: a bare map whose only properties are
    /// named `template` and/or `by` decodes as the keyed form. Declare such
    /// properties under `by` instead.
    Fields(IndexMap<String, ConstraintLeaf>),
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct KeyedRepr {
    #[serde(default)]
    template: Option<Box<ConstraintLeaf>>,
    #[serde(default)]
    by: IndexMap<String, ConstraintLeaf>,
}

impl<'de> Deserialize<'de> for ObjectConstraint {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match ObjectConstraintRepr::deserialize(deserializer)? {
            ObjectConstraintRepr::Homogeneous(leaf) => ObjectConstraint::Homogeneous(leaf),
            ObjectConstraintRepr::Keyed(KeyedRepr { template, by }) => {
                ObjectConstraint::Keyed(KeyedConstraint { template, by })
            }
            ObjectConstraintRepr::Fields(by) => ObjectConstraint::Keyed(KeyedConstraint { template: None, by }),
        })
    }
}
