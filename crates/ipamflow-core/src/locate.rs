//! Resource locator
//!
//! Read-only lookups of the current platform state. Nothing here mutates.

use crate::error::{ReconcileError, Result};
use crate::model::{CatalogEntry, Destination, Resource, ResourceKind, RelationKind};
use crate::operation::Operation;
use crate::transport::{ApiResponse, Transport};
use crate::vocabulary::Vocabulary;
use serde_json::Value;
use tracing::debug;
use urlencoding::encode;

/// What to look up
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selector {
    /// Property definition by exact name on a destination collection
    Property { name: String, destination: Destination },
    /// User by exact name
    User { name: String },
    /// Zone by name inside a DNS view
    Zone { name: String, view: String },
}

pub struct Locator<'a> {
    transport: &'a dyn Transport,
    vocabulary: &'a Vocabulary,
}

impl<'a> Locator<'a> {
    pub fn new(transport: &'a dyn Transport, vocabulary: &'a Vocabulary) -> Self {
        Self {
            transport,
            vocabulary,
        }
    }

    /// Current state of the selected resource, `None` when it does not exist
    pub async fn locate(&self, selector: &Selector) -> Result<Option<Resource>> {
        match selector {
            Selector::Property { name, destination } => self.property(name, *destination).await,
            Selector::User { name } => self.user(name).await,
            Selector::Zone { name, view } => self.zone(name, view).await,
        }
    }

    async fn get(&self, path: &str) -> Result<ApiResponse> {
        let op = Operation::read(path);
        debug!(call = %op, "Lookup");
        Ok(self.transport.call(op.verb, path, &op.body).await?)
    }

    /// Collection path holding property definitions for `destination`
    pub fn property_collection(&self, destination: Destination) -> Result<String> {
        let collection = self.vocabulary.collection(destination).ok_or_else(|| {
            ReconcileError::InvalidSpec(format!("no collection for destination '{}'", destination))
        })?;
        Ok(format!("{}/1/PropertyDefinitions", collection))
    }

    /// Path of a single property definition; the name is percent-encoded
    pub fn property_path(&self, destination: Destination, name: &str) -> Result<String> {
        Ok(format!(
            "{}/{}",
            self.property_collection(destination)?,
            encode(name)
        ))
    }

    async fn property(&self, name: &str, destination: Destination) -> Result<Option<Resource>> {
        let path = self.property_path(destination, name)?;
        let response = self.get(&path).await?;
        if response.warning_message().is_some() {
            return Ok(None);
        }

        let object = property_object(&response.result);
        Ok(object.map(|o| Resource::from_api_object(ResourceKind::PropertyDefinition, o)))
    }

    async fn user(&self, name: &str) -> Result<Option<Resource>> {
        let response = self.get("Users").await?;
        if let Some(message) = response.warning_message() {
            return Err(ReconcileError::LookupFailed(format!(
                "Collecting users: {}",
                message
            )));
        }

        Ok(list(&response.result, "users")
            .iter()
            .find(|user| user.get("name").and_then(Value::as_str) == Some(name))
            .map(|user| Resource::from_api_object(ResourceKind::User, user)))
    }

    async fn zone(&self, name: &str, view: &str) -> Result<Option<Resource>> {
        let path = format!(
            "DNSZones?filter={}&dnsViewRef={}",
            encode(name),
            encode(view)
        );
        let response = self.get(&path).await?;
        if response.warning_message().is_some() {
            return Ok(None);
        }
        if response.result.get("totalResults").and_then(Value::as_u64) == Some(0) {
            return Ok(None);
        }

        // The filter is a substring match, so pick the exact zone
        let wanted = zone_name(name);
        Ok(list(&response.result, "dnsZones")
            .iter()
            .find(|zone| {
                zone.get("name")
                    .and_then(Value::as_str)
                    .is_some_and(|n| zone_name(n) == wanted)
            })
            .map(|zone| Resource::from_api_object(ResourceKind::Zone, zone)))
    }

    /// Every known group or role
    pub async fn catalog(&self, kind: RelationKind) -> Result<Vec<CatalogEntry>> {
        let response = self.get(kind.collection()).await?;
        if let Some(message) = response.warning_message() {
            return Err(ReconcileError::LookupFailed(format!(
                "Collecting {}s: {}",
                kind, message
            )));
        }

        Ok(list(&response.result, kind.list_key())
            .iter()
            .filter_map(CatalogEntry::from_record)
            .collect())
    }

    /// Identifier of the DNS view served by `nameserver`
    pub async fn dns_view(&self, nameserver: &str) -> Result<String> {
        let path = format!("DNSViews?dnsServerRef={}", encode(nameserver));
        let response = self.get(&path).await?;
        let unknown = || ReconcileError::UnknownReference {
            kind: "nameserver".to_string(),
            name: nameserver.to_string(),
        };
        if response.warning_message().is_some() {
            return Err(unknown());
        }

        let reference = list(&response.result, "dnsViews")
            .first()
            .and_then(|view| view.get("ref"))
            .and_then(Value::as_str)
            .ok_or_else(unknown)?;
        Ok(reference
            .strip_prefix("DNSViews/")
            .unwrap_or(reference)
            .to_string())
    }
}

fn list<'v>(result: &'v Value, key: &str) -> &'v [Value] {
    result
        .get(key)
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

/// The definition is returned wrapped in `propertyDefinition`, as the single
/// item of `propertyDefinitions`, or bare
fn property_object(result: &Value) -> Option<&Value> {
    if let Some(object) = result.get("propertyDefinition") {
        return Some(object);
    }
    if let Some(first) = list(result, "propertyDefinitions").first() {
        return Some(first);
    }
    result.get("name").map(|_| result)
}

fn zone_name(name: &str) -> String {
    name.trim_end_matches('.').to_ascii_lowercase()
}
