//! KDL manifest parser
//!
//! Reads the desired state of managed resources from a KDL document. Each
//! resource node type is parsed in its own module.

mod property;
mod user;
mod zone;


use property::parse_property;
use user::parse_user;
use zone::parse_zone;

use crate::error::ManifestError;
use crate::model::State;
use crate::reconcile::DesiredResource;
use kdl::{KdlDocument, KdlNode, KdlValue};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs;
use std::path::Path;

pub type Result<T> = std::result::Result<T, ManifestError>;

/// Connection settings declared in the manifest
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderSettings {
    pub url: Option<String>,
    pub user: Option<String>,
    pub password: Option<String>,
}

/// Parsed manifest
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    pub provider: Option<ProviderSettings>,

    /// Resources in declaration order
    pub resources: Vec<DesiredResource>,
}

impl Manifest {
    /// Resources whose name equals `name`
    pub fn only(&self, name: &str) -> Vec<&DesiredResource> {
        self.resources.iter().filter(|r| r.name() == name).collect()
    }
}

/// Parse a manifest file
pub fn parse_manifest_file<P: AsRef<Path>>(path: P) -> Result<Manifest> {
    let content = fs::read_to_string(path.as_ref())?;
    parse_manifest(&content)
}

/// Parse a manifest from a string
pub fn parse_manifest(content: &str) -> Result<Manifest> {
    let doc: KdlDocument = content.parse()?;
    let mut manifest = Manifest::default();

    for node in doc.nodes() {
        match node.name().value() {
            "provider" => {
                manifest.provider = Some(parse_provider(node));
            }
            "property" => {
                manifest
                    .resources
                    .push(DesiredResource::Property(parse_property(node)?));
            }
            "user" => {
                manifest.resources.push(DesiredResource::User(parse_user(node)?));
            }
            "zone" => {
                manifest.resources.push(DesiredResource::Zone(parse_zone(node)?));
            }
            other => {
                tracing::debug!(node = %other, "Skipping unknown node");
            }
        }
    }

    Ok(manifest)
}

fn parse_provider(node: &KdlNode) -> ProviderSettings {
    let mut provider = ProviderSettings::default();
    if let Some(children) = node.children() {
        for child in children.nodes() {
            match child.name().value() {
                "url" => provider.url = first_string(child),
                "user" | "username" => provider.user = first_string(child),
                "password" => provider.password = first_string(child),
                _ => {}
            }
        }
    }
    provider
}

/// Name argument of a resource node
fn node_name(node: &KdlNode) -> Result<String> {
    arguments(node)
        .next()
        .and_then(KdlValue::as_string)
        .map(str::to_string)
        .ok_or_else(|| {
            ManifestError::InvalidConfig(format!("{} requires a name", node.name().value()))
        })
}

/// `state="present|absent"` property of a resource node
fn node_state(node: &KdlNode) -> Result<State> {
    match property_value(node, "state").and_then(KdlValue::as_string) {
        None => Ok(State::Present),
        Some(value) => State::parse(value).ok_or_else(|| {
            ManifestError::InvalidConfig(format!(
                "{}: unknown state '{}'",
                node.name().value(),
                value
            ))
        }),
    }
}

/// Positional entries
fn arguments(node: &KdlNode) -> impl Iterator<Item = &KdlValue> {
    node.entries()
        .iter()
        .filter(|e| e.name().is_none())
        .map(|e| e.value())
}

fn property_value<'n>(node: &'n KdlNode, key: &str) -> Option<&'n KdlValue> {
    node.entries()
        .iter()
        .find(|e| e.name().map(|n| n.value()) == Some(key))
        .map(|e| e.value())
}

fn first_string(node: &KdlNode) -> Option<String> {
    arguments(node)
        .next()
        .and_then(KdlValue::as_string)
        .map(str::to_string)
}

fn required_string(node: &KdlNode) -> Result<String> {
    first_string(node).ok_or_else(|| {
        ManifestError::InvalidConfig(format!("{} requires a string value", node.name().value()))
    })
}

/// Flag child; a bare `flag` without arguments means true
fn flag(node: &KdlNode) -> Result<bool> {
    match arguments(node).next() {
        None => Ok(true),
        Some(value) => value.as_bool().ok_or_else(|| {
            ManifestError::InvalidConfig(format!("{} expects #true or #false", node.name().value()))
        }),
    }
}

/// Every string argument
fn string_list(node: &KdlNode) -> Vec<String> {
    arguments(node)
        .filter_map(|v| v.as_string().map(str::to_string))
        .collect()
}

fn kdl_to_json(value: &KdlValue) -> Value {
    match value {
        KdlValue::String(s) => Value::String(s.clone()),
        KdlValue::Integer(i) => i64::try_from(*i)
            .map(Value::from)
            .unwrap_or_else(|_| Value::String(i.to_string())),
        KdlValue::Float(f) => serde_json::Number::from_f64(*f)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        KdlValue::Bool(b) => Value::Bool(*b),
        KdlValue::Null => Value::Null,
    }
}
