//! User accounts

use super::{RelationKind, State};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// When the password is written to an existing user
///
/// The platform never returns a password, so it cannot take part in the
/// comparison.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum UpdatePassword {
    /// Sent on creation and along with any other update
    #[default]
    OnCreate,
    /// Written on every run
    Always,
}

impl UpdatePassword {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "on-create" | "on_create" => Some(UpdatePassword::OnCreate),
            "always" => Some(UpdatePassword::Always),
            _ => None,
        }
    }
}

/// Desired user account
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserSpec {
    pub name: String,
    pub state: State,
    pub password: Option<String>,
    pub full_name: Option<String>,
    pub description: Option<String>,
    pub email: Option<String>,
    pub authentication_type: Option<String>,

    /// `None` leaves group membership untouched; an empty set removes all
    pub groups: Option<BTreeSet<String>>,

    /// `None` leaves role membership untouched; an empty set removes all
    pub roles: Option<BTreeSet<String>>,

    pub update_password: UpdatePassword,
}

impl UserSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Desired membership sets for the relation kinds the caller declared
    pub fn desired_relations(&self) -> BTreeMap<RelationKind, BTreeSet<String>> {
        let mut desired = BTreeMap::new();
        if let Some(groups) = &self.groups {
            desired.insert(RelationKind::Groups, groups.clone());
        }
        if let Some(roles) = &self.roles {
            desired.insert(RelationKind::Roles, roles.clone());
        }
        desired
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_desired_relations_only_declared_kinds() {
        let mut spec = UserSpec::new("johnd");
        spec.roles = Some(BTreeSet::new());

        let desired = spec.desired_relations();
        assert!(!desired.contains_key(&RelationKind::Groups));
        assert_eq!(desired.get(&RelationKind::Roles), Some(&BTreeSet::new()));
    }
}
