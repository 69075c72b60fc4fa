//! Planned changes for managed resources

use crate::model::ResourceKind;
use crate::operation::{Operation, Verb};
use serde::{Deserialize, Serialize};

/// What a plan does to its resource
///
/// A user whose fields already match but whose group or role memberships
/// differ is still an `Update`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionType {
    /// POST to the collection, plus memberships of the new subject
    Create,
    /// PUT of changed fields and/or membership adds and removes
    Update,
    /// DELETE of the resource reference
    Delete,
    /// Platform already matches; nothing is issued
    NoOp,
}

impl ActionType {
    pub fn as_str(self) -> &'static str {
        match self {
            ActionType::Create => "create",
            ActionType::Update => "update",
            ActionType::Delete => "delete",
            ActionType::NoOp => "no-op",
        }
    }
}

impl std::fmt::Display for ActionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordered operations that bring one resource to its desired state
#[derive(Debug, Clone)]
pub struct Plan {
    /// Resource kind
    pub kind: ResourceKind,

    /// Resource name as given by the caller
    pub resource: String,

    /// Type of change
    pub action_type: ActionType,

    /// Calls to issue, in order
    pub operations: Vec<Operation>,

    /// Human readable description of the change
    pub description: String,
}

impl Plan {
    pub fn new(
        kind: ResourceKind,
        resource: impl Into<String>,
        action_type: ActionType,
        operations: Vec<Operation>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            resource: resource.into(),
            action_type,
            operations,
            description: description.into(),
        }
    }

    /// Plan without any call
    pub fn unchanged(
        kind: ResourceKind,
        resource: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self::new(kind, resource, ActionType::NoOp, Vec::new(), description)
    }

    pub fn has_changes(&self) -> bool {
        self.operations.iter().any(|op| op.verb.is_mutation())
    }

    /// `kind 'name'` label used in output
    pub fn label(&self) -> String {
        format!("{} '{}'", self.kind, self.resource)
    }
}

/// Summary of planned changes
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanSummary {
    pub create: usize,
    pub update: usize,
    pub delete: usize,
    pub no_change: usize,
    pub relation_add: usize,
    pub relation_remove: usize,
}

impl PlanSummary {
    pub fn of(plans: &[Plan]) -> Self {
        let mut summary = Self::default();
        for plan in plans {
            match plan.action_type {
                ActionType::Create => summary.create += 1,
                ActionType::Update => summary.update += 1,
                ActionType::Delete => summary.delete += 1,
                ActionType::NoOp => summary.no_change += 1,
            }
            for op in plan.operations.iter().filter(|op| op.endpoint.is_relation()) {
                match op.verb {
                    Verb::Put => summary.relation_add += 1,
                    Verb::Delete => summary.relation_remove += 1,
                    _ => {}
                }
            }
        }
        summary
    }

    pub fn has_changes(&self) -> bool {
        self.create + self.update + self.delete > 0
    }
}

impl std::fmt::Display for PlanSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} to create, {} to update, {} to delete, {} unchanged",
            self.create, self.update, self.delete, self.no_change
        )?;
        if self.relation_add + self.relation_remove > 0 {
            write!(
                f,
                " ({} memberships to add, {} to remove)",
                self.relation_add, self.relation_remove
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Direction, ObjectRef};
    use crate::operation::{Endpoint, Subject};
    use serde_json::Map;

    fn membership(verb: Verb) -> Operation {
        Operation::mutation(
            verb,
            Endpoint::Relation {
                direction: Direction::Reverse,
                subject: Subject::Existing(ObjectRef::new("Users/31")),
                target: ObjectRef::new("Roles/2"),
            },
            Map::new(),
        )
    }

    #[test]
    fn test_summary_counts_actions_and_memberships() {
        let plans = vec![
            Plan::new(
                ResourceKind::User,
                "johnd",
                ActionType::Update,
                vec![membership(Verb::Put), membership(Verb::Delete)],
                "update memberships",
            ),
            Plan::new(
                ResourceKind::Zone,
                "example.com",
                ActionType::Create,
                vec![Operation::create("DNSZones", Map::new())],
                "create zone",
            ),
            Plan::unchanged(ResourceKind::PropertyDefinition, "location", "up to date"),
        ];

        let summary = PlanSummary::of(&plans);
        assert_eq!(summary.create, 1);
        assert_eq!(summary.update, 1);
        assert_eq!(summary.no_change, 1);
        assert_eq!(summary.relation_add, 1);
        assert_eq!(summary.relation_remove, 1);
        assert!(summary.has_changes());
        assert_eq!(
            summary.to_string(),
            "1 to create, 1 to update, 0 to delete, 1 unchanged (1 memberships to add, 1 to remove)"
        );
    }

    #[test]
    fn test_unchanged_plan_has_no_changes() {
        let plan = Plan::unchanged(ResourceKind::User, "johnd", "user 'johnd' doesn't exist");
        assert!(!plan.has_changes());
        assert_eq!(plan.label(), "user 'johnd'");
    }

    #[test]
    fn test_action_type_names() {
        assert_eq!(ActionType::NoOp.to_string(), "no-op");
        assert_eq!(
            serde_json::to_value(ActionType::NoOp).unwrap(),
            serde_json::json!("no_op")
        );
    }
}
