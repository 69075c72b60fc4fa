//! DNS zones

use super::State;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// Zone server type
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ServerType {
    #[default]
    Master,
    Slave,
    Stub,
    Forward,
}

impl ServerType {
    /// Accepts any capitalisation
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "master" => Some(ServerType::Master),
            "slave" => Some(ServerType::Slave),
            "stub" => Some(ServerType::Stub),
            "forward" => Some(ServerType::Forward),
            _ => None,
        }
    }

    /// Spelling required by the API
    pub fn as_str(self) -> &'static str {
        match self {
            ServerType::Master => "Master",
            ServerType::Slave => "Slave",
            ServerType::Stub => "Stub",
            ServerType::Forward => "Forward",
        }
    }
}

impl fmt::Display for ServerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Desired DNS zone
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ZoneSpec {
    pub name: String,
    pub state: State,

    /// DNS server whose view holds the zone
    pub nameserver: Option<String>,

    /// Authoritative server, or `[Active Directory]`; creation only
    pub authority: Option<String>,

    pub server_type: ServerType,

    /// Creation only
    pub dynamic: bool,

    /// Master servers; ignored for master zones
    pub masters: Option<Vec<String>>,

    pub ad_integrated: Option<bool>,
    pub ad_replication_type: Option<String>,
    pub ad_partition: Option<String>,

    /// Values for custom properties that already exist on the platform
    pub custom_properties: BTreeMap<String, Value>,
}

impl ZoneSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_type_parse_any_case() {
        assert_eq!(ServerType::parse("slave"), Some(ServerType::Slave));
        assert_eq!(ServerType::parse("FORWARD"), Some(ServerType::Forward));
        assert_eq!(ServerType::parse("Master").map(ServerType::as_str), Some("Master"));
        assert_eq!(ServerType::parse("secondary"), None);
    }
}
