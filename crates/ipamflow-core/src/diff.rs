//! Diff engine
//!
//! Decides between create, update and no-op for a normalized desired resource
//! and the resource currently on the platform.

use crate::model::{Fields, Resource};
use serde_json::Value;

/// Outcome of comparing desired and current state
#[derive(Debug, Clone, PartialEq)]
pub enum Decision {
    /// Resource is absent; payload is the full desired resource
    Create(Resource),
    /// Every compared field already matches
    NoOp,
    /// At least one field differs; payload is every writable desired field
    Update(Fields),
}

impl Decision {
    pub fn is_noop(&self) -> bool {
        matches!(self, Decision::NoOp)
    }
}

/// Compare `desired` against `current`
pub fn diff(desired: &Resource, current: Option<&Resource>) -> Decision {
    let Some(current) = current else {
        return Decision::Create(desired.clone());
    };

    if fields_match(desired, current) {
        Decision::NoOp
    } else {
        Decision::Update(update_payload(desired))
    }
}

/// True when every comparable desired field equals its current value
///
/// Current values are looked up at the top level first and in the custom
/// properties after that. Read-only fields cannot be changed by an update and
/// write-only fields are never returned, so neither takes part. An empty
/// custom property matches one the platform leaves out. Stops at the first
/// mismatch.
pub fn fields_match(desired: &Resource, current: &Resource) -> bool {
    comparable_fields(desired).all(|(field, value)| {
        let found = current.lookup(field);
        let matches = match found {
            Some(found) => found == value,
            None => desired.custom_properties.contains_key(field) && value.as_str() == Some(""),
        };
        if !matches {
            let found = found.cloned().unwrap_or_default();
            tracing::debug!(
                field = %field,
                desired = %value,
                current = %found,
                "Field differs"
            );
        }
        matches
    })
}

fn comparable_fields(desired: &Resource) -> impl Iterator<Item = (&String, &Value)> {
    let kind = desired.kind;
    desired
        .properties
        .iter()
        .filter(move |(field, _)| !kind.is_read_only(field) && !kind.is_write_only(field))
        .chain(desired.custom_properties.iter())
}

/// Writable desired fields: top-level fields minus read-only ones, then custom
/// properties
pub fn update_payload(desired: &Resource) -> Fields {
    let kind = desired.kind;
    desired
        .properties
        .iter()
        .filter(|(field, _)| !kind.is_read_only(field))
        .chain(desired.custom_properties.iter())
        .map(|(field, value)| (field.clone(), value.clone()))
        .collect()
}
