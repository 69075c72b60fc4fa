//! Group and role membership

use super::{ObjectRef, Resource};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::fmt;
use std::hash::{Hash, Hasher};

/// Kind of many-to-many relation between a user and a target resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RelationKind {
    Groups,
    Roles,
}

impl RelationKind {
    /// Endpoint direction; fixed per kind
    pub fn direction(self) -> Direction {
        match self {
            RelationKind::Groups => Direction::Forward,
            RelationKind::Roles => Direction::Reverse,
        }
    }

    /// Collection listing every known target of this kind
    pub fn collection(self) -> &'static str {
        match self {
            RelationKind::Groups => "Groups",
            RelationKind::Roles => "Roles",
        }
    }

    /// Key of the membership list on a user record and of the catalog list
    pub fn list_key(self) -> &'static str {
        match self {
            RelationKind::Groups => "groups",
            RelationKind::Roles => "roles",
        }
    }
}

impl fmt::Display for RelationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RelationKind::Groups => write!(f, "group"),
            RelationKind::Roles => write!(f, "role"),
        }
    }
}

/// Order in which subject and target are joined into a membership endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// `{target}/{subject}`, e.g. `Groups/6/Users/31`
    Forward,
    /// `{subject}/{target}`, e.g. `Users/31/Roles/2`
    Reverse,
}

impl Direction {
    pub fn join(self, subject: &str, target: &str) -> String {
        match self {
            Direction::Forward => format!("{}/{}", target, subject),
            Direction::Reverse => format!("{}/{}", subject, target),
        }
    }
}

/// Named entry of the group or role catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub name: String,
    pub reference: ObjectRef,
}

impl CatalogEntry {
    pub fn new(name: impl Into<String>, reference: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            reference: ObjectRef::new(reference),
        }
    }

    /// Parse a `{ref, name}` record; records missing either are skipped
    pub fn from_record(record: &Value) -> Option<Self> {
        let reference = record.get("ref")?.as_str()?;
        let name = record.get("name")?.as_str()?;
        Some(Self::new(name, reference))
    }
}

/// Membership of a subject in a group or role
///
/// Two memberships are the same when they point at the same target reference;
/// the display name is carried for reporting only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Membership {
    pub kind: RelationKind,
    pub target: ObjectRef,
    pub name: String,
}

impl Membership {
    pub fn new(kind: RelationKind, target: ObjectRef, name: impl Into<String>) -> Self {
        Self {
            kind,
            target,
            name: name.into(),
        }
    }

    /// Parse a `{ref, objType, name}` membership record
    pub fn from_record(kind: RelationKind, record: &Value) -> Option<Self> {
        let target = record.get("ref")?.as_str()?;
        let name = record.get("name").and_then(Value::as_str).unwrap_or(target);
        Some(Self::new(kind, ObjectRef::new(target), name))
    }

    /// Memberships of `kind` listed on a fetched subject
    pub fn from_resource(kind: RelationKind, resource: &Resource) -> BTreeSet<Membership> {
        resource
            .properties
            .get(kind.list_key())
            .and_then(Value::as_array)
            .map(|records| {
                records
                    .iter()
                    .filter_map(|record| Membership::from_record(kind, record))
                    .collect()
            })
            .unwrap_or_default()
    }
}

impl PartialEq for Membership {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind && self.target == other.target
    }
}

impl Eq for Membership {}

impl Hash for Membership {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.kind.hash(state);
        self.target.hash(state);
    }
}

impl PartialOrd for Membership {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Membership {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.kind, &self.target).cmp(&(other.kind, &other.target))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ResourceKind;
    use serde_json::json;

    #[test]
    fn test_direction_join() {
        assert_eq!(
            RelationKind::Groups.direction().join("Users/31", "Groups/6"),
            "Groups/6/Users/31"
        );
        assert_eq!(
            RelationKind::Roles.direction().join("Users/31", "Roles/2"),
            "Users/31/Roles/2"
        );
    }

    #[test]
    fn test_membership_identity_ignores_name() {
        let a = Membership::new(RelationKind::Groups, ObjectRef::new("Groups/6"), "dns-admins");
        let b = Membership::new(RelationKind::Groups, ObjectRef::new("Groups/6"), "DNS Admins");
        let c = Membership::new(RelationKind::Roles, ObjectRef::new("Groups/6"), "dns-admins");
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_memberships_from_resource() {
        let user = Resource::from_api_object(
            ResourceKind::User,
            &json!({
                "ref": "Users/31",
                "name": "johnd",
                "groups": [
                    { "ref": "Groups/6", "objType": "Groups", "name": "A" },
                    { "objType": "Groups", "name": "no-ref" }
                ],
                "roles": []
            }),
        );

        let groups = Membership::from_resource(RelationKind::Groups, &user);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups.iter().next().unwrap().name, "A");
        assert!(Membership::from_resource(RelationKind::Roles, &user).is_empty());
    }
}
