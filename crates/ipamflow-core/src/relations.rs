//! Relation reconciler
//!
//! Computes the membership changes that bring a subject's groups and roles to
//! the desired sets. Members present on both sides are never touched.

use crate::error::{ReconcileError, Result};
use crate::model::{CatalogEntry, Membership, RelationKind};
use crate::operation::{Endpoint, Operation, Subject, Verb};
use serde_json::Map;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Desired target names per relation kind
pub type DesiredSets = BTreeMap<RelationKind, BTreeSet<String>>;

/// Current memberships per relation kind
pub type CurrentSets = BTreeMap<RelationKind, BTreeSet<Membership>>;

/// Every known target per relation kind
pub type Catalog = BTreeMap<RelationKind, Vec<CatalogEntry>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelationVerb {
    Add,
    Remove,
}

impl fmt::Display for RelationVerb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RelationVerb::Add => write!(f, "add"),
            RelationVerb::Remove => write!(f, "remove"),
        }
    }
}

/// A single membership change
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationOp {
    pub verb: RelationVerb,
    pub membership: Membership,
}

impl RelationOp {
    /// Remote operation for this change on `subject`
    pub fn operation(&self, subject: Subject) -> Operation {
        let verb = match self.verb {
            RelationVerb::Add => Verb::Put,
            RelationVerb::Remove => Verb::Delete,
        };
        let endpoint = Endpoint::Relation {
            direction: self.membership.kind.direction(),
            subject,
            target: self.membership.target.clone(),
        };
        Operation::mutation(verb, endpoint, Map::new())
    }
}

impl fmt::Display for RelationOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {}",
            self.verb, self.membership.kind, self.membership.name
        )
    }
}

/// Map desired names onto catalog references
///
/// Fails on the first name the catalog does not know.
pub fn resolve_desired(
    kind: RelationKind,
    names: &BTreeSet<String>,
    catalog: &[CatalogEntry],
) -> Result<BTreeSet<Membership>> {
    names
        .iter()
        .map(|name| {
            catalog
                .iter()
                .find(|entry| &entry.name == name)
                .map(|entry| Membership::new(kind, entry.reference.clone(), &entry.name))
                .ok_or_else(|| ReconcileError::UnknownReference {
                    kind: kind.to_string(),
                    name: name.clone(),
                })
        })
        .collect()
}

/// Membership changes for every relation kind present in `desired`
///
/// All desired names are validated before any change is emitted. Kinds
/// missing from `desired` are left alone.
pub fn reconcile_relations(
    desired: &DesiredSets,
    current: &CurrentSets,
    catalog: &Catalog,
) -> Result<Vec<RelationOp>> {
    let resolved = desired
        .iter()
        .map(|(kind, names)| {
            let entries = catalog.get(kind).map(Vec::as_slice).unwrap_or(&[]);
            resolve_desired(*kind, names, entries).map(|wanted| (*kind, wanted))
        })
        .collect::<Result<Vec<_>>>()?;

    let none = BTreeSet::new();
    let mut ops = Vec::new();
    for (kind, wanted) in resolved {
        let present = current.get(&kind).unwrap_or(&none);

        ops.extend(wanted.difference(present).map(|m| RelationOp {
            verb: RelationVerb::Add,
            membership: m.clone(),
        }));
        ops.extend(present.difference(&wanted).map(|m| RelationOp {
            verb: RelationVerb::Remove,
            membership: m.clone(),
        }));
    }

    Ok(ops)
}
