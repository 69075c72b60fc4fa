//! Per-resource reconciliation
//!
//! Wires the stages together for each resource kind:
//! locate, normalize, diff, reconcile memberships, then execute.

use crate::diff::{Decision, diff, update_payload};
use crate::error::{ReconcileError, Result};
use crate::executor::execute;
use crate::locate::{Locator, Selector};
use crate::model::{
    Membership, ObjectRef, PropertySpec, Resource, ResourceKind, State, UpdatePassword, UserSpec,
    ZoneSpec, name_value_list,
};
use crate::normalize::{normalize_property, normalize_user, normalize_zone};
use crate::operation::{Operation, Subject};
use crate::plan::{ActionType, Plan};
use crate::relations::{Catalog, CurrentSets, reconcile_relations};
use crate::transport::Transport;
use crate::vocabulary::Vocabulary;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use tracing::{debug, info};

/// A resource the caller wants reconciled
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DesiredResource {
    Property(PropertySpec),
    User(UserSpec),
    Zone(ZoneSpec),
}

impl DesiredResource {
    pub fn name(&self) -> &str {
        match self {
            DesiredResource::Property(spec) => &spec.name,
            DesiredResource::User(spec) => &spec.name,
            DesiredResource::Zone(spec) => &spec.name,
        }
    }

    pub fn kind(&self) -> ResourceKind {
        match self {
            DesiredResource::Property(_) => ResourceKind::PropertyDefinition,
            DesiredResource::User(_) => ResourceKind::User,
            DesiredResource::Zone(_) => ResourceKind::Zone,
        }
    }

    pub fn state(&self) -> State {
        match self {
            DesiredResource::Property(spec) => spec.state,
            DesiredResource::User(spec) => spec.state,
            DesiredResource::Zone(spec) => spec.state,
        }
    }

    pub fn label(&self) -> String {
        format!("{} '{}'", self.kind(), self.name())
    }

    /// Check the desired state without contacting the platform
    pub fn validate(&self, vocabulary: &Vocabulary) -> Result<()> {
        match self {
            DesiredResource::Property(spec) if spec.state == State::Present => {
                normalize_property(spec, vocabulary).map(drop)
            }
            DesiredResource::Property(spec) => vocabulary
                .collection(spec.destination)
                .map(drop)
                .ok_or_else(|| {
                    ReconcileError::InvalidSpec(format!(
                        "no collection for destination '{}'",
                        spec.destination
                    ))
                }),
            DesiredResource::User(spec) if spec.state == State::Present => {
                normalize_user(spec).map(drop)
            }
            DesiredResource::User(_) => Ok(()),
            DesiredResource::Zone(spec) => required_nameserver(spec).map(drop),
        }
    }
}

/// Outcome of reconciling one resource
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReconcileResult {
    pub changed: bool,
    pub message: Value,
}

pub struct Reconciler<'a> {
    transport: &'a dyn Transport,
    vocabulary: Vocabulary,
}

impl<'a> Reconciler<'a> {
    pub fn new(transport: &'a dyn Transport) -> Self {
        Self {
            transport,
            vocabulary: Vocabulary::default(),
        }
    }

    fn locator(&self) -> Locator<'_> {
        Locator::new(self.transport, &self.vocabulary)
    }

    /// Plan and apply in one step
    pub async fn reconcile(&self, desired: &DesiredResource) -> Result<ReconcileResult> {
        let plan = self.plan(desired).await?;
        self.apply(&plan).await
    }

    /// Compute the operations for `desired` without mutating anything
    ///
    /// All validation of the desired state happens here, before any
    /// mutating call can be issued.
    pub async fn plan(&self, desired: &DesiredResource) -> Result<Plan> {
        let plan = match desired {
            DesiredResource::Property(spec) => self.plan_property(spec).await?,
            DesiredResource::User(spec) => self.plan_user(spec).await?,
            DesiredResource::Zone(spec) => self.plan_zone(spec).await?,
        };
        info!(
            resource = %plan.label(),
            action = %plan.action_type,
            operations = plan.operations.len(),
            "Planned"
        );
        Ok(plan)
    }

    /// Issue the operations of `plan`
    pub async fn apply(&self, plan: &Plan) -> Result<ReconcileResult> {
        if !plan.has_changes() {
            return Ok(ReconcileResult {
                changed: false,
                message: Value::String(plan.description.clone()),
            });
        }

        let result = execute(self.transport, &plan.operations).await?;
        Ok(ReconcileResult {
            changed: result.changed,
            message: result.message,
        })
    }

    async fn plan_property(&self, spec: &PropertySpec) -> Result<Plan> {
        let kind = ResourceKind::PropertyDefinition;
        let locator = self.locator();
        let collection = locator.property_collection(spec.destination)?;
        let path = locator.property_path(spec.destination, &spec.name)?;

        if spec.state == State::Absent {
            let current = locator.locate(&property_selector(spec)).await?;
            return Ok(match current {
                Some(_) => Plan::new(
                    kind,
                    &spec.name,
                    ActionType::Delete,
                    vec![Operation::delete(path)],
                    format!("delete property '{}'", spec.name),
                ),
                None => Plan::unchanged(
                    kind,
                    &spec.name,
                    format!("property '{}' doesn't exist", spec.name),
                ),
            });
        }

        let desired = normalize_property(spec, &self.vocabulary)?;
        let current = locator.locate(&property_selector(spec)).await?;

        Ok(match diff(&desired, current.as_ref()) {
            Decision::Create(resource) => {
                let body = wrap("propertyDefinition", object(resource.properties));
                Plan::new(
                    kind,
                    &spec.name,
                    ActionType::Create,
                    vec![Operation::create(collection, body)],
                    format!("create property '{}'", spec.name),
                )
            }
            Decision::NoOp => Plan::unchanged(
                kind,
                &spec.name,
                format!("property '{}' is up to date", spec.name),
            ),
            Decision::Update(fields) => {
                let mut body = wrap("propertyDefinition", object(fields));
                if spec.update_existing {
                    body.insert("updateExisting".to_string(), Value::Bool(true));
                }
                Plan::new(
                    kind,
                    &spec.name,
                    ActionType::Update,
                    vec![Operation::update(path, body)],
                    format!("update property '{}'", spec.name),
                )
            }
        })
    }

    async fn plan_user(&self, spec: &UserSpec) -> Result<Plan> {
        let kind = ResourceKind::User;
        let locator = self.locator();
        let selector = Selector::User {
            name: spec.name.clone(),
        };

        if spec.state == State::Absent {
            let current = locator.locate(&selector).await?;
            return Ok(match current {
                Some(user) => Plan::new(
                    kind,
                    &spec.name,
                    ActionType::Delete,
                    vec![Operation::delete(reference(&user, spec.name.as_str())?.as_str())],
                    format!("delete user '{}'", spec.name),
                ),
                None => Plan::unchanged(
                    kind,
                    &spec.name,
                    format!("user '{}' doesn't exist", spec.name),
                ),
            });
        }

        let desired = normalize_user(spec)?;
        let current = locator.locate(&selector).await?;

        let wanted = spec.desired_relations();
        let mut catalog = Catalog::new();
        for (relation, names) in &wanted {
            if !names.is_empty() {
                catalog.insert(*relation, locator.catalog(*relation).await?);
            }
        }

        let Some(current) = current else {
            let relation_ops = reconcile_relations(&wanted, &CurrentSets::new(), &catalog)?;
            let mut operations = vec![Operation::create(
                "Users",
                wrap("user", object(desired.properties)),
            )];
            operations.extend(relation_ops.iter().map(|op| op.operation(Subject::Created)));
            return Ok(Plan::new(
                kind,
                &spec.name,
                ActionType::Create,
                operations,
                format!("create user '{}'", spec.name),
            ));
        };

        let user_ref = reference(&current, &spec.name)?.clone();
        let present: CurrentSets = wanted
            .keys()
            .map(|relation| (*relation, Membership::from_resource(*relation, &current)))
            .collect();
        let relation_ops = reconcile_relations(&wanted, &present, &catalog)?;

        let decision = match diff(&desired, Some(&current)) {
            Decision::NoOp if spec.update_password == UpdatePassword::Always => {
                debug!(user = %spec.name, "Password is always written");
                Decision::Update(update_payload(&desired))
            }
            Decision::Update(mut fields) if spec.update_password == UpdatePassword::OnCreate => {
                fields.remove("password");
                Decision::Update(fields)
            }
            decision => decision,
        };

        let mut operations = Vec::new();
        if let Decision::Update(fields) = &decision {
            operations.push(update_by_reference(&user_ref, name_value_list(fields)));
        }
        operations.extend(
            relation_ops
                .iter()
                .map(|op| op.operation(Subject::Existing(user_ref.clone()))),
        );

        if operations.is_empty() {
            return Ok(Plan::unchanged(
                kind,
                &spec.name,
                format!("user '{}' is up to date", spec.name),
            ));
        }

        let mut changes: Vec<String> = Vec::new();
        if !decision.is_noop() {
            changes.push("properties".to_string());
        }
        changes.extend(relation_ops.iter().map(ToString::to_string));
        Ok(Plan::new(
            kind,
            &spec.name,
            ActionType::Update,
            operations,
            format!("update user '{}': {}", spec.name, changes.join(", ")),
        ))
    }

    async fn plan_zone(&self, spec: &ZoneSpec) -> Result<Plan> {
        let kind = ResourceKind::Zone;
        let nameserver = required_nameserver(spec)?;

        let locator = self.locator();
        let view = locator.dns_view(nameserver).await?;
        let current = locator
            .locate(&Selector::Zone {
                name: spec.name.clone(),
                view: view.clone(),
            })
            .await?;

        if spec.state == State::Absent {
            return Ok(match current {
                Some(zone) => Plan::new(
                    kind,
                    &spec.name,
                    ActionType::Delete,
                    vec![Operation::delete(reference(&zone, &spec.name)?.as_str())],
                    format!("delete zone '{}'", spec.name),
                ),
                None => Plan::unchanged(
                    kind,
                    &spec.name,
                    format!("zone '{}' doesn't exist", spec.name),
                ),
            });
        }

        let desired = normalize_zone(spec, &view);
        Ok(match diff(&desired, current.as_ref()) {
            Decision::Create(resource) => {
                let mut zone = resource.properties;
                if !resource.custom_properties.is_empty() {
                    zone.insert(
                        "customProperties".to_string(),
                        name_value_list(&resource.custom_properties),
                    );
                }
                Plan::new(
                    kind,
                    &spec.name,
                    ActionType::Create,
                    vec![Operation::create("DNSZones", wrap("dnsZone", object(zone)))],
                    format!("create zone '{}'", spec.name),
                )
            }
            Decision::NoOp => Plan::unchanged(
                kind,
                &spec.name,
                format!("zone '{}' is up to date", spec.name),
            ),
            Decision::Update(fields) => {
                // `current` is Some whenever the decision is an update
                let zone_ref = match &current {
                    Some(zone) => reference(zone, &spec.name)?.clone(),
                    None => return Err(ReconcileError::LookupFailed(spec.name.clone())),
                };
                Plan::new(
                    kind,
                    &spec.name,
                    ActionType::Update,
                    vec![update_by_reference(&zone_ref, name_value_list(&fields))],
                    format!("update zone '{}'", spec.name),
                )
            }
        })
    }
}

fn required_nameserver(spec: &ZoneSpec) -> Result<&str> {
    spec.nameserver
        .as_deref()
        .filter(|ns| !ns.is_empty())
        .ok_or_else(|| ReconcileError::MissingRequiredField {
            resource: format!("zone {}", spec.name),
            field: "nameserver",
        })
}

fn property_selector(spec: &PropertySpec) -> Selector {
    Selector::Property {
        name: spec.name.clone(),
        destination: spec.destination,
    }
}

fn reference<'r>(resource: &'r Resource, name: &str) -> Result<&'r ObjectRef> {
    resource.reference.as_ref().ok_or_else(|| {
        ReconcileError::LookupFailed(format!("{} '{}' has no reference", resource.kind, name))
    })
}

fn object(fields: impl IntoIterator<Item = (String, Value)>) -> Value {
    Value::Object(fields.into_iter().collect())
}

fn wrap(key: &str, value: Value) -> Map<String, Value> {
    let mut body = Map::new();
    body.insert(key.to_string(), value);
    body
}

/// PUT on the resource's own reference with a `[{name, value}]` property list
fn update_by_reference(reference: &ObjectRef, properties: Value) -> Operation {
    let mut body = Map::new();
    body.insert("ref".to_string(), json!(reference));
    body.insert("properties".to_string(), properties);
    Operation::update(reference.as_str(), body)
}
