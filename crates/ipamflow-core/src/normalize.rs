//! State normalizer
//!
//! Turns a caller's desired spec into a `Resource` in the platform's
//! field/value vocabulary. Pure: no remote calls.

use crate::error::{ReconcileError, Result};
use crate::model::{PropertySpec, Resource, ResourceKind, ServerType, UserSpec, ZoneSpec};
use crate::vocabulary::Vocabulary;
use serde_json::{Value, json};

/// Normalize a property definition
///
/// `listItems` and `cloudTags` are only part of the result for text
/// properties. Non-empty lists on any other type are rejected.
pub fn normalize_property(spec: &PropertySpec, vocabulary: &Vocabulary) -> Result<Resource> {
    let platform_type = vocabulary.platform_type(spec.property_type).ok_or_else(|| {
        ReconcileError::InvalidSpec(format!(
            "no platform type for property type '{}'",
            spec.property_type
        ))
    })?;

    let supports_lists = spec.property_type.supports_lists();
    if !supports_lists && (!spec.list_items.is_empty() || !spec.cloud_tags.is_empty()) {
        return Err(ReconcileError::InvalidSpec(format!(
            "property '{}': list items and cloud tags require type 'text', not '{}'",
            spec.name, spec.property_type
        )));
    }

    let mut resource = Resource::new(ResourceKind::PropertyDefinition)
        .with_property("name", json!(spec.name))
        .with_property("type", json!(platform_type))
        .with_property("system", json!(spec.system))
        .with_property("mandatory", json!(spec.mandatory))
        .with_property("readOnly", json!(spec.read_only))
        .with_property("multiLine", json!(spec.multi_line))
        .with_property("defaultValue", json!(spec.default_value));

    if supports_lists {
        resource.set_property("listItems", json!(spec.list_items));
        resource.set_property("cloudTags", json!(spec.cloud_tags));
    }

    Ok(resource)
}

/// Normalize a user that must be present
///
/// Password and authentication type are required.
pub fn normalize_user(spec: &UserSpec) -> Result<Resource> {
    let password = spec
        .password
        .as_deref()
        .filter(|p| !p.is_empty())
        .ok_or_else(|| missing(spec, "password"))?;
    let authentication_type = spec
        .authentication_type
        .as_deref()
        .filter(|a| !a.is_empty())
        .ok_or_else(|| missing(spec, "authentication_type"))?;

    let mut resource = Resource::new(ResourceKind::User)
        .with_property("name", json!(spec.name))
        .with_property("password", json!(password))
        .with_property(
            "authenticationType",
            json!(canonical_authentication_type(authentication_type)),
        );

    let optional = [
        ("fullName", &spec.full_name),
        ("description", &spec.description),
        ("email", &spec.email),
    ];
    for (field, value) in optional {
        if let Some(value) = value {
            resource.set_property(field, json!(value));
        }
    }

    Ok(resource)
}

fn missing(spec: &UserSpec, field: &'static str) -> ReconcileError {
    ReconcileError::MissingRequiredField {
        resource: format!("user {}", spec.name),
        field,
    }
}

/// `Internal` in any capitalisation becomes `Internal`; other
/// authentication types are upper-cased (`ad` becomes `AD`)
pub fn canonical_authentication_type(value: &str) -> String {
    if value.eq_ignore_ascii_case("internal") {
        "Internal".to_string()
    } else {
        value.to_uppercase()
    }
}

/// Normalize a zone living in the DNS view `view_ref`
///
/// `masters` is only carried for non-master zones and the AD fields only when
/// supplied. Custom property values are sent as strings.
pub fn normalize_zone(spec: &ZoneSpec, view_ref: &str) -> Resource {
    let mut resource = Resource::new(ResourceKind::Zone)
        .with_property("name", json!(spec.name))
        .with_property("dnsViewRef", json!(view_ref))
        .with_property("dynamic", json!(spec.dynamic))
        .with_property("type", json!(spec.server_type.as_str()));

    if let Some(authority) = &spec.authority {
        resource.set_property("authority", json!(authority));
    }
    if spec.server_type != ServerType::Master
        && let Some(masters) = &spec.masters
    {
        resource.set_property("masters", json!(masters));
    }
    if let Some(ad_integrated) = spec.ad_integrated {
        resource.set_property("adIntegrated", json!(ad_integrated));
    }
    if let Some(replication) = &spec.ad_replication_type {
        resource.set_property("adReplicationType", json!(replication));
    }
    if let Some(partition) = &spec.ad_partition {
        resource.set_property("adPartition", json!(partition));
    }

    for (name, value) in &spec.custom_properties {
        resource
            .custom_properties
            .insert(name.clone(), custom_property_value(value));
    }

    resource
}

/// The platform stores custom properties as strings; an unset one is `""`
fn custom_property_value(value: &Value) -> Value {
    match value {
        Value::String(_) => value.clone(),
        Value::Null => Value::String(String::new()),
        other => Value::String(other.to_string()),
    }
}
