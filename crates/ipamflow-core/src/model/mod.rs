//! Resource model
//!
//! `Resource` is the common shape both sides of a comparison are brought into:
//! the normalized desired state and the state fetched from the platform.

mod property;
mod relation;
mod user;
mod zone;

pub use property::{Destination, PropertySpec, PropertyType};
pub use relation::{CatalogEntry, Direction, Membership, RelationKind};
pub use user::{UpdatePassword, UserSpec};
pub use zone::{ServerType, ZoneSpec};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// Field name to value map
pub type Fields = BTreeMap<String, Value>;

/// Platform-assigned reference such as `Users/31`
///
/// Assigned by the platform on creation and usable as a path for singular
/// GET/PUT/DELETE calls.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObjectRef(String);

impl ObjectRef {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Requested presence of a resource
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum State {
    #[default]
    Present,
    Absent,
}

impl State {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "present" => Some(State::Present),
            "absent" => Some(State::Absent),
            _ => None,
        }
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            State::Present => write!(f, "present"),
            State::Absent => write!(f, "absent"),
        }
    }
}

/// Kind of managed resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    PropertyDefinition,
    User,
    Zone,
}

impl ResourceKind {
    /// Fields the platform refuses to write once the resource exists
    pub fn read_only_fields(self) -> &'static [&'static str] {
        match self {
            ResourceKind::PropertyDefinition => &["name"],
            ResourceKind::User => &["name"],
            ResourceKind::Zone => &["name", "authority", "dynamic", "dnsViewRef"],
        }
    }

    /// Fields the platform accepts but never returns
    pub fn write_only_fields(self) -> &'static [&'static str] {
        match self {
            ResourceKind::User => &["password"],
            _ => &[],
        }
    }

    pub fn is_read_only(self, field: &str) -> bool {
        self.read_only_fields().contains(&field)
    }

    pub fn is_write_only(self, field: &str) -> bool {
        self.write_only_fields().contains(&field)
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceKind::PropertyDefinition => write!(f, "property"),
            ResourceKind::User => write!(f, "user"),
            ResourceKind::Zone => write!(f, "zone"),
        }
    }
}

/// A resource as seen by the reconciliation stages
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    pub kind: ResourceKind,

    /// Platform reference, absent until the resource has been created
    pub reference: Option<ObjectRef>,

    /// Top-level fields
    pub properties: Fields,

    /// User-defined custom property values
    pub custom_properties: Fields,
}

impl Resource {
    pub fn new(kind: ResourceKind) -> Self {
        Self {
            kind,
            reference: None,
            properties: Fields::new(),
            custom_properties: Fields::new(),
        }
    }

    pub fn with_reference(mut self, reference: ObjectRef) -> Self {
        self.reference = Some(reference);
        self
    }

    pub fn with_property(mut self, key: impl Into<String>, value: Value) -> Self {
        self.properties.insert(key.into(), value);
        self
    }

    pub fn with_custom_property(mut self, key: impl Into<String>, value: Value) -> Self {
        self.custom_properties.insert(key.into(), value);
        self
    }

    pub fn set_property(&mut self, key: impl Into<String>, value: Value) {
        self.properties.insert(key.into(), value);
    }

    pub fn name(&self) -> Option<&str> {
        self.properties.get("name").and_then(Value::as_str)
    }

    /// Current value of a field, looked up at the top level first and in the
    /// custom properties when the top level has no (or a null) value
    pub fn lookup(&self, field: &str) -> Option<&Value> {
        match self.properties.get(field) {
            Some(value) if !value.is_null() => Some(value),
            _ => self.custom_properties.get(field),
        }
    }

    /// Build a resource from an object returned by the API
    ///
    /// `ref` becomes the reference and `customProperties` is split out. The
    /// platform reports custom properties either as a map or as a list of
    /// `{name, value}` pairs; both are accepted.
    pub fn from_api_object(kind: ResourceKind, object: &Value) -> Self {
        let mut resource = Resource::new(kind);
        let Some(map) = object.as_object() else {
            return resource;
        };

        for (key, value) in map {
            match key.as_str() {
                "ref" => {
                    resource.reference = value.as_str().map(ObjectRef::new);
                }
                "customProperties" => {
                    resource.custom_properties = custom_properties_from_api(value);
                }
                _ => {
                    resource.properties.insert(key.clone(), value.clone());
                }
            }
        }

        resource
    }
}

fn custom_properties_from_api(value: &Value) -> Fields {
    match value {
        Value::Object(map) => map.iter().map(|(k, v)| (k.clone(), v.clone())).collect(),
        Value::Array(items) => items
            .iter()
            .filter_map(|item| {
                let name = item.get("name")?.as_str()?;
                let value = item.get("value").cloned().unwrap_or(Value::Null);
                Some((name.to_string(), value))
            })
            .collect(),
        _ => Fields::new(),
    }
}

/// Render a field map as the `[{name, value}]` list the platform expects in
/// update bodies and custom property lists
pub fn name_value_list(fields: &Fields) -> Value {
    Value::Array(
        fields
            .iter()
            .map(|(name, value)| serde_json::json!({ "name": name, "value": value }))
            .collect(),
    )
}
