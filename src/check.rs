//! Self-check of metadata documents.
//!
//! Every signature's resolved defaults must pass its own validator, and each
//! test case input, bound through [`TestCase::arguments`], must pass every
//! function signature in the same document.
//!
//! [`TestCase::arguments`]: crate::meta::TestCase::arguments
use crate::defaults::resolve_defaults;
use crate::meta::{Entity, MetadataFile};
use crate::validate::{Issue, ParamsValidator};

/// Outcome for one signature (`fn`, `Class::new`, `Class::method`).
#[derive(Debug, Clone, PartialEq)]
pub struct SignatureReport {
    pub signature: String,
    pub issues: Vec<Issue>,
}

impl SignatureReport {
    pub fn passed(&self) -> bool {
        self.issues.is_empty()
    }
}

pub fn check_metadata(file: &MetadataFile) -> Vec<SignatureReport> {
    let mut reports = Vec::new();
    for entity in file.meta.values() {
        for (signature, params) in entity.signatures() {
            let validator = ParamsValidator::compile(params);
            let mut issues = validator.validate(&resolve_defaults(params)).err().unwrap_or_default();
            if matches!(entity, Entity::Function(_)) {
                for (i, case) in file.test_cases.iter().enumerate() {
                    if let Err(found) = validator.validate(&case.arguments(params)) {
                        issues.extend(found.into_iter().map(|issue| Issue {
                            message: format!("test case {i}: {}", issue.message),
                            ..issue
                        }));
                    }
                }
            }
            tracing::debug!(%signature, issues = issues.len(), "checked signature");
            reports.push(SignatureReport { signature, issues });
        }
    }
    reports
}
