use async_trait::async_trait;
use ipamflow_core::{ApiResponse, Transport, TransportError, Verb};
use serde_json::{Map, Value, json};
use std::collections::BTreeMap;
use std::sync::Mutex;

/// In-memory stand-in for the Micetro REST API
///
/// Supports the property definition, user, group, role, DNS view and DNS zone
/// calls the reconciler issues, and records every call in order.
pub struct FakePlatform {
    state: Mutex<PlatformState>,
}

#[derive(Default)]
struct PlatformState {
    next_id: u64,
    /// collection -> name -> definition
    properties: BTreeMap<String, BTreeMap<String, Value>>,
    users: Vec<Value>,
    passwords: BTreeMap<String, String>,
    groups: Vec<(String, String)>,
    roles: Vec<(String, String)>,
    /// nameserver -> view reference
    views: BTreeMap<String, String>,
    zones: Vec<Value>,
    /// (verb, path prefix) pairs answered with a warning
    rejections: Vec<(Verb, String)>,
    calls: Vec<Call>,
}

#[derive(Debug, Clone)]
pub struct Call {
    pub verb: Verb,
    pub path: String,
    pub body: Value,
}

#[allow(dead_code)]
impl FakePlatform {
    pub fn new() -> Self {
        let state = PlatformState {
            next_id: 100,
            ..Default::default()
        };
        Self {
            state: Mutex::new(state),
        }
    }

    pub fn with_property(self, collection: &str, definition: Value) -> Self {
        {
            let mut state = self.state.lock().unwrap();
            let name = definition["name"].as_str().unwrap().to_string();
            state
                .properties
                .entry(collection.to_string())
                .or_default()
                .insert(name, definition);
        }
        self
    }

    pub fn with_group(self, reference: &str, name: &str) -> Self {
        self.state
            .lock()
            .unwrap()
            .groups
            .push((reference.to_string(), name.to_string()));
        self
    }

    pub fn with_role(self, reference: &str, name: &str) -> Self {
        self.state
            .lock()
            .unwrap()
            .roles
            .push((reference.to_string(), name.to_string()));
        self
    }

    /// Add a user that is a member of the given groups and roles
    pub fn with_user(self, reference: &str, user: Value, groups: &[&str], roles: &[&str]) -> Self {
        {
            let mut state = self.state.lock().unwrap();
            let mut user = user.as_object().cloned().unwrap_or_default();
            user.insert("ref".to_string(), json!(reference));
            let groups = records(&state.groups, "Groups", groups);
            let roles = records(&state.roles, "Roles", roles);
            user.insert("groups".to_string(), groups);
            user.insert("roles".to_string(), roles);
            state.users.push(Value::Object(user));
        }
        self
    }

    pub fn with_view(self, nameserver: &str, reference: &str) -> Self {
        self.state
            .lock()
            .unwrap()
            .views
            .insert(nameserver.to_string(), reference.to_string());
        self
    }

    pub fn with_zone(self, zone: Value) -> Self {
        self.state.lock().unwrap().zones.push(zone);
        self
    }

    /// Answer every `verb` call whose path starts with `prefix` with a warning
    pub fn rejecting(self, verb: Verb, prefix: &str) -> Self {
        self.state
            .lock()
            .unwrap()
            .rejections
            .push((verb, prefix.to_string()));
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn mutations(&self) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|c| c.verb != Verb::Get)
            .collect()
    }

    pub fn clear_calls(&self) {
        self.state.lock().unwrap().calls.clear();
    }

    pub fn user(&self, name: &str) -> Option<Value> {
        self.state
            .lock()
            .unwrap()
            .users
            .iter()
            .find(|u| u["name"] == name)
            .cloned()
    }

    pub fn password(&self, reference: &str) -> Option<String> {
        self.state.lock().unwrap().passwords.get(reference).cloned()
    }

    pub fn zone(&self, name: &str) -> Option<Value> {
        self.state
            .lock()
            .unwrap()
            .zones
            .iter()
            .find(|z| z["name"].as_str().map(|n| n.trim_end_matches('.')) == Some(name))
            .cloned()
    }

    pub fn property(&self, collection: &str, name: &str) -> Option<Value> {
        self.state
            .lock()
            .unwrap()
            .properties
            .get(collection)
            .and_then(|p| p.get(name))
            .cloned()
    }
}

fn records(catalog: &[(String, String)], obj_type: &str, names: &[&str]) -> Value {
    Value::Array(
        catalog
            .iter()
            .filter(|(_, name)| names.contains(&name.as_str()))
            .map(|(reference, name)| json!({ "ref": reference, "objType": obj_type, "name": name }))
            .collect(),
    )
}

fn not_found() -> ApiResponse {
    ApiResponse::warning("Object not found")
}

fn query(raw: &str) -> BTreeMap<&str, &str> {
    raw.split('&').filter_map(|pair| pair.split_once('=')).collect()
}

impl PlatformState {
    fn allocate(&mut self, collection: &str) -> String {
        self.next_id += 1;
        format!("{}/{}", collection, self.next_id)
    }

    fn user_mut(&mut self, reference: &str) -> Option<&mut Map<String, Value>> {
        self.users
            .iter_mut()
            .find(|u| u["ref"] == reference)
            .and_then(Value::as_object_mut)
    }

    fn catalog(&self, collection: &str) -> &[(String, String)] {
        match collection {
            "Groups" => &self.groups,
            _ => &self.roles,
        }
    }

    fn handle(&mut self, verb: Verb, path: &str, body: &Value) -> ApiResponse {
        let (path, raw_query) = path.split_once('?').unwrap_or((path, ""));
        let segments: Vec<&str> = path.split('/').collect();

        match (verb, segments.as_slice()) {
            (Verb::Get, [collection, "1", "PropertyDefinitions", name]) => self
                .properties
                .get(*collection)
                .and_then(|p| p.get(*name))
                .map(|d| ApiResponse::ok(json!({ "propertyDefinition": d })))
                .unwrap_or_else(not_found),
            (Verb::Post, [collection, "1", "PropertyDefinitions"]) => {
                let mut definition = body["propertyDefinition"].clone();
                for list in ["listItems", "cloudTags"] {
                    if definition.get(list).is_none() {
                        definition[list] = json!([]);
                    }
                }
                let name = definition["name"].as_str().unwrap_or_default().to_string();
                self.properties
                    .entry(collection.to_string())
                    .or_default()
                    .insert(name, definition);
                ApiResponse::ok(Value::Null)
            }
            (Verb::Put, [collection, "1", "PropertyDefinitions", name]) => {
                let Some(definition) = self
                    .properties
                    .get_mut(*collection)
                    .and_then(|p| p.get_mut(*name))
                else {
                    return not_found();
                };
                if let Some(fields) = body["propertyDefinition"].as_object() {
                    for (key, value) in fields {
                        definition[key] = value.clone();
                    }
                }
                ApiResponse::ok(Value::Null)
            }
            (Verb::Delete, [collection, "1", "PropertyDefinitions", name]) => {
                match self.properties.get_mut(*collection).and_then(|p| p.remove(*name)) {
                    Some(_) => ApiResponse::ok(Value::Null),
                    None => not_found(),
                }
            }

            (Verb::Get, ["Users"]) => ApiResponse::ok(json!({
                "users": self.users,
                "totalResults": self.users.len(),
            })),
            (Verb::Post, ["Users"]) => {
                let reference = self.allocate("Users");
                let mut user = body["user"].as_object().cloned().unwrap_or_default();
                if let Some(password) = user.remove("password") {
                    self.passwords
                        .insert(reference.clone(), password.as_str().unwrap_or_default().to_string());
                }
                user.insert("ref".to_string(), json!(reference));
                user.insert("groups".to_string(), json!([]));
                user.insert("roles".to_string(), json!([]));
                self.users.push(Value::Object(user));
                ApiResponse::ok(json!({ "ref": reference }))
            }
            (Verb::Put, ["Users", id]) => {
                let reference = format!("Users/{}", id);
                let mut password = None;
                let Some(user) = self.user_mut(&reference) else {
                    return not_found();
                };
                for property in body["properties"].as_array().into_iter().flatten() {
                    let name = property["name"].as_str().unwrap_or_default();
                    if name == "password" {
                        password = property["value"].as_str().map(str::to_string);
                    } else {
                        user.insert(name.to_string(), property["value"].clone());
                    }
                }
                if let Some(password) = password {
                    self.passwords.insert(reference, password);
                }
                ApiResponse::ok(Value::Null)
            }
            (Verb::Delete, ["Users", id]) => {
                let reference = format!("Users/{}", id);
                let before = self.users.len();
                self.users.retain(|u| u["ref"] != reference.as_str());
                if self.users.len() == before {
                    not_found()
                } else {
                    ApiResponse::ok(Value::Null)
                }
            }

            (Verb::Get, [collection @ ("Groups" | "Roles")]) => {
                let key = collection.to_lowercase();
                let entries: Vec<Value> = self
                    .catalog(collection)
                    .iter()
                    .map(|(reference, name)| json!({ "ref": reference, "name": name }))
                    .collect();
                let mut result = Map::new();
                result.insert("totalResults".to_string(), json!(entries.len()));
                result.insert(key, Value::Array(entries));
                ApiResponse::ok(Value::Object(result))
            }
            (Verb::Put | Verb::Delete, ["Groups", group, "Users", user]) => {
                let target = format!("Groups/{}", group);
                self.membership(verb, &format!("Users/{}", user), "Groups", &target)
            }
            (Verb::Put | Verb::Delete, ["Users", user, "Roles", role]) => {
                let target = format!("Roles/{}", role);
                self.membership(verb, &format!("Users/{}", user), "Roles", &target)
            }

            (Verb::Get, ["DNSViews"]) => {
                let params = query(raw_query);
                match params.get("dnsServerRef").and_then(|ns| self.views.get(*ns)) {
                    Some(view) => ApiResponse::ok(json!({
                        "dnsViews": [{ "ref": view, "name": "" }],
                        "totalResults": 1,
                    })),
                    None => not_found(),
                }
            }
            (Verb::Get, ["DNSZones"]) => {
                let params = query(raw_query);
                let filter = params.get("filter").copied().unwrap_or_default();
                let view = params.get("dnsViewRef").copied().unwrap_or_default();
                let zones: Vec<&Value> = self
                    .zones
                    .iter()
                    .filter(|z| z["dnsViewRef"] == view)
                    .filter(|z| z["name"].as_str().is_some_and(|n| n.contains(filter)))
                    .collect();
                ApiResponse::ok(json!({ "dnsZones": zones, "totalResults": zones.len() }))
            }
            (Verb::Post, ["DNSZones"]) => {
                let reference = self.allocate("DNSZones");
                let mut zone = body["dnsZone"].as_object().cloned().unwrap_or_default();
                let custom: Map<String, Value> = zone
                    .remove("customProperties")
                    .and_then(|c| c.as_array().cloned())
                    .unwrap_or_default()
                    .iter()
                    .filter_map(|p| Some((p["name"].as_str()?.to_string(), p["value"].clone())))
                    .collect();
                if let Some(name) = zone.get("name").and_then(Value::as_str) {
                    // The platform stores zone names fully qualified
                    let fqdn = format!("{}.", name.trim_end_matches('.'));
                    zone.insert("name".to_string(), json!(fqdn));
                }
                zone.insert("ref".to_string(), json!(reference));
                zone.insert("customProperties".to_string(), Value::Object(custom));
                self.zones.push(Value::Object(zone));
                ApiResponse::ok(json!({ "ref": reference }))
            }
            (Verb::Put, ["DNSZones", id]) => {
                let reference = format!("DNSZones/{}", id);
                let Some(zone) = self
                    .zones
                    .iter_mut()
                    .find(|z| z["ref"] == reference.as_str())
                    .and_then(Value::as_object_mut)
                else {
                    return not_found();
                };
                for property in body["properties"].as_array().into_iter().flatten() {
                    let name = property["name"].as_str().unwrap_or_default().to_string();
                    let value = property["value"].clone();
                    let is_custom = zone
                        .get("customProperties")
                        .and_then(|c| c.get(&name))
                        .is_some();
                    if is_custom {
                        zone.entry("customProperties").or_insert_with(|| json!({}))[&name] = value;
                    } else {
                        zone.insert(name, value);
                    }
                }
                ApiResponse::ok(Value::Null)
            }
            (Verb::Delete, ["DNSZones", id]) => {
                let reference = format!("DNSZones/{}", id);
                let before = self.zones.len();
                self.zones.retain(|z| z["ref"] != reference.as_str());
                if self.zones.len() == before {
                    not_found()
                } else {
                    ApiResponse::ok(Value::Null)
                }
            }

            _ => ApiResponse::warning(format!("Unsupported call: {} {}", verb, path)),
        }
    }

    fn membership(&mut self, verb: Verb, user: &str, collection: &str, target: &str) -> ApiResponse {
        let Some(name) = self
            .catalog(collection)
            .iter()
            .find(|(reference, _)| reference == target)
            .map(|(_, name)| name.clone())
        else {
            return not_found();
        };
        let key = collection.to_lowercase();
        let Some(user) = self.user_mut(user) else {
            return not_found();
        };
        let Some(members) = user.get_mut(&key).and_then(Value::as_array_mut) else {
            return not_found();
        };

        members.retain(|m| m["ref"] != target);
        if verb == Verb::Put {
            members.push(json!({ "ref": target, "objType": collection, "name": name }));
        }
        ApiResponse::ok(Value::Null)
    }
}

#[async_trait]
impl Transport for FakePlatform {
    async fn call(&self, verb: Verb, path: &str, body: &Value) -> Result<ApiResponse, TransportError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call {
            verb,
            path: path.to_string(),
            body: body.clone(),
        });

        let rejected = state
            .rejections
            .iter()
            .any(|(v, prefix)| *v == verb && path.starts_with(prefix.as_str()));
        if rejected {
            return Ok(ApiResponse::warning("Access denied"));
        }

        Ok(state.handle(verb, path, body))
    }
}
