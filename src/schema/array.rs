use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::ConstraintLeaf;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ArrayConstraint {
    /// Inclusive length bounds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub can_include_falsy: Option<bool>,
    /// Returned verbatim by the default resolver, never checked against `template`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<Vec<Value>>,
    /// Shape shared by every element.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template: Option<Box<ConstraintLeaf>>,
    /// Per-position overrides; an entry here wins over `template`.
    #[serde(
        default,
        rename = "by",
        alias = "byIndex",
        skip_serializing_if = "BTreeMap::is_empty",
        with = "index_keys"
    )]
    pub by_index: BTreeMap<usize, ConstraintLeaf>,
}

impl ArrayConstraint {
    /// Effective minimum length: the explicit `min`, else one past the highest
    /// overridden index so every constrained position is present.
    pub fn effective_min(&self) -> Option<usize> {
        self.min
            .or_else(|| self.by_index.keys().next_back().map(|last| last + 1))
    }

    /// The leaf governing position `index`, if any.
    pub fn leaf_at(&self, index: usize) -> Option<&ConstraintLeaf> {
        self.by_index.get(&index).or(self.template.as_deref())
    }

    pub(crate) fn overlay(&self, newer: &Self) -> Self {
        let mut by_index = self.by_index.clone();
        by_index.extend(newer.by_index.iter().map(|(i, leaf)| (*i, leaf.clone())));
        Self {
            min: newer.min.or(self.min),
            max: newer.max.or(self.max),
            can_include_falsy: newer.can_include_falsy.or(self.can_include_falsy),
            default_value: newer.default_value.clone().or_else(|| self.default_value.clone()),
            template: newer.template.clone().or_else(|| self.template.clone()),
            by_index,
        }
    }
}

/// JSON object keys are strings; positions are decoded from their decimal form.
///
/// Going through `String` keeps this working when the payload has been
/// buffered by the internally tagged [`ConstraintLeaf`].
mod index_keys {
    use std::collections::BTreeMap;

    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};

    use crate::schema::ConstraintLeaf;

    pub fn serialize<S>(map: &BTreeMap<usize, ConstraintLeaf>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_map(map.iter().map(|(i, leaf)| (i.to_string(), leaf)))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<BTreeMap<usize, ConstraintLeaf>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = BTreeMap::<String, ConstraintLeaf>::deserialize(deserializer)?;
        raw.into_iter()
            .map(|(k, leaf)| {
                k.parse::<usize>()
                    .map(|i| (i, leaf))
                    .map_err(|_| D::Error::custom(format!("array override key `{k}` is not an index")))
            })
            .collect()
    }
}
