//! Reconcile discovered metadata (names and rough types inferred from source)
//! with declared metadata (hand-authored constraints, defaults, docs).
//!
//! Merging is a refinement, not a union: the discovered side fixes the set and
//! order of params, the declared side overrides what it mentions. Every rule is
//! an explicit case over [`ConstraintLeaf`]; no merge crosses two kinds.
use indexmap::IndexMap;

use crate::meta::{ClassMetadata, Entity, FunctionMetadata};
use crate::schema::{ConstraintLeaf, ObjectConstraint, Param};

// --------------------------------- Params --------------------------------- //

/// Merge `new` into `old`, keyed by name.
///
/// Output keeps `old`'s order and names; entries of `new` without a match in
/// `old` are dropped.
pub fn merge_params(old: &[Param], new: &[Param]) -> Vec<Param> {
    let updates: IndexMap<&str, &Param> = new.iter().map(|p| (p.name.as_str(), p)).collect();
    old.iter()
        .map(|old_param| match updates.get(old_param.name.as_str()) {
            None => old_param.clone(),
            Some(new_param) => merge_param(old_param, new_param),
        })
        .collect()
}

pub fn merge_param(old: &Param, new: &Param) -> Param {
    if old.kind() != new.kind() {
        tracing::debug!(
            param = %old.name,
            old = ?old.kind(),
            new = ?new.kind(),
            "type mismatch, taking the newer param wholesale"
        );
        return new.clone();
    }
    let shape = match (&old.shape, &new.shape) {
        (Some(a), Some(b)) => Some(merge_leaf(a, b)),
        _ => None,
    };
    Param {
        name: old.name.clone(),
        shape,
        required: new.required.or(old.required),
        description: new.description.clone().or_else(|| old.description.clone()),
        default_value: new.default_value.clone().or_else(|| old.default_value.clone()),
    }
}

/// Merge two leaves; a kind mismatch yields `new` unchanged.
pub fn merge_leaf(old: &ConstraintLeaf, new: &ConstraintLeaf) -> ConstraintLeaf {
    use ConstraintLeaf as L;
    match (old, new) {
        (L::String { constraints: a }, L::String { constraints: b }) => L::String {
            constraints: overlay(a.as_ref(), b.as_ref(), |a, b| a.overlay(b)),
        },
        (L::Number { constraints: a }, L::Number { constraints: b }) => L::Number {
            constraints: overlay(a.as_ref(), b.as_ref(), |a, b| a.overlay(b)),
        },
        (L::Boolean { constraints: a }, L::Boolean { constraints: b }) => L::Boolean {
            constraints: overlay(a.as_ref(), b.as_ref(), |a, b| a.overlay(b)),
        },
        // the value list is one unit; a redeclared enum replaces it
        (L::Enum { constraints: a }, L::Enum { constraints: b }) => L::Enum {
            constraints: b.clone().or_else(|| a.clone()),
        },
        (L::Array { constraints: a }, L::Array { constraints: b }) => L::Array {
            constraints: overlay(a.as_ref(), b.as_ref(), |a, b| a.overlay(b)),
        },
        (L::Object { constraints: a }, L::Object { constraints: b }) => L::Object {
            constraints: overlay(a.as_ref(), b.as_ref(), merge_object),
        },
        _ => new.clone(),
    }
}

fn merge_object(old: &ObjectConstraint, new: &ObjectConstraint) -> ObjectConstraint {
    match (old, new) {
        (ObjectConstraint::Keyed(a), ObjectConstraint::Keyed(b)) => ObjectConstraint::Keyed(a.overlay(b)),
        // homogeneous on either side: the newer shape wins outright
        _ => new.clone(),
    }
}

fn overlay<T: Clone>(old: Option<&T>, new: Option<&T>, f: impl FnOnce(&T, &T) -> T) -> Option<T> {
    match (old, new) {
        (None, None) => None,
        (Some(x), None) | (None, Some(x)) => Some(x.clone()),
        (Some(a), Some(b)) => Some(f(a, b)),
    }
}

// -------------------------------- Entities -------------------------------- //

/// Discovered function refined by its declared counterpart.
pub fn merge_function(discovered: &FunctionMetadata, declared: Option<&FunctionMetadata>) -> FunctionMetadata {
    let Some(declared) = declared else {
        return discovered.clone();
    };
    FunctionMetadata {
        name: discovered.name.clone(),
        params: merge_params(&discovered.params, &declared.params),
        is_async: declared.is_async.or(discovered.is_async),
        description: declared.description.clone().or_else(|| discovered.description.clone()),
    }
}

/// Discovered class refined by its declared counterpart. Declared methods
/// that were not discovered are dropped.
pub fn merge_class(discovered: &ClassMetadata, declared: Option<&ClassMetadata>) -> ClassMetadata {
    let Some(declared) = declared else {
        return discovered.clone();
    };
    let construct = match (&discovered.construct, &declared.construct) {
        (Some(a), Some(b)) => Some(merge_params(a, b)),
        (a, b) => a.clone().or_else(|| b.clone()),
    };
    let methods = discovered
        .methods
        .iter()
        .map(|m| merge_function(m, declared.methods.iter().find(|d| d.name == m.name)))
        .collect();
    ClassMetadata {
        name: discovered.name.clone(),
        construct,
        methods,
        description: declared.description.clone().or_else(|| discovered.description.clone()),
    }
}

pub fn merge_entity(discovered: &Entity, declared: Option<&Entity>) -> Entity {
    match (discovered, declared) {
        (Entity::Function(f), Some(Entity::Function(d))) => Entity::Function(merge_function(f, Some(d))),
        (Entity::Class(c), Some(Entity::Class(d))) => Entity::Class(merge_class(c, Some(d))),
        (_, None) => discovered.clone(),
        (_, Some(other)) => {
            tracing::debug!(entity = discovered.name(), declared = other.name(), "declared entity is of another kind, ignoring it");
            discovered.clone()
        }
    }
}

/// Host capability that maps an exported name to something runnable.
pub trait Resolve {
    type Target;

    fn resolve(&self, name: &str) -> Option<Self::Target>;
}

impl<F, T> Resolve for F
where
    F: Fn(&str) -> Option<T>,
{
    type Target = T;

    fn resolve(&self, name: &str) -> Option<T> {
        self(name)
    }
}

/// Merged entity plus whatever the host resolved its name to.
#[derive(Debug, Clone)]
pub struct Loaded<T> {
    pub entity: Entity,
    pub target: T,
}

/// Merge every discovered entity with its declared entry. Entities the
/// resolver cannot find are skipped.
pub fn reconcile<R: Resolve>(discovered: &[Entity], declared: &IndexMap<String, Entity>, resolver: &R) -> Vec<Loaded<R::Target>> {
    let mut out = Vec::with_capacity(discovered.len());
    for item in discovered {
        let Some(target) = resolver.resolve(item.name()) else {
            tracing::debug!(entity = item.name(), "no export found, skipping");
            continue;
        };
        out.push(Loaded { entity: merge_entity(item, declared.get(item.name())), target });
    }
    out
}
