//! Custom property definitions

use super::State;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Property type as named in the management console
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PropertyType {
    #[default]
    Text,
    YesNo,
    IpAddress,
    Number,
}

impl PropertyType {
    pub const ALL: [PropertyType; 4] = [
        PropertyType::Text,
        PropertyType::YesNo,
        PropertyType::IpAddress,
        PropertyType::Number,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            PropertyType::Text => "text",
            PropertyType::YesNo => "yesno",
            PropertyType::IpAddress => "ipaddress",
            PropertyType::Number => "number",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == value)
    }

    /// Only text properties carry list items and cloud tags
    pub fn supports_lists(self) -> bool {
        self == PropertyType::Text
    }
}

impl fmt::Display for PropertyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Object class a property definition is attached to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Destination {
    DnsServer,
    DhcpServer,
    Zone,
    IpRange,
    IpAddress,
    Device,
    Interface,
    CloudNet,
    CloudAccount,
}

impl Destination {
    pub const ALL: [Destination; 9] = [
        Destination::DnsServer,
        Destination::DhcpServer,
        Destination::Zone,
        Destination::IpRange,
        Destination::IpAddress,
        Destination::Device,
        Destination::Interface,
        Destination::CloudNet,
        Destination::CloudAccount,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Destination::DnsServer => "dnsserver",
            Destination::DhcpServer => "dhcpserver",
            Destination::Zone => "zone",
            Destination::IpRange => "iprange",
            Destination::IpAddress => "ipaddress",
            Destination::Device => "device",
            Destination::Interface => "interface",
            Destination::CloudNet => "cloudnet",
            Destination::CloudAccount => "cloudaccount",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|d| d.as_str() == value)
    }
}

impl fmt::Display for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Desired custom property definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertySpec {
    pub name: String,
    pub state: State,
    pub destination: Destination,
    pub property_type: PropertyType,
    pub mandatory: bool,
    pub system: bool,
    pub read_only: bool,
    pub multi_line: bool,
    pub default_value: String,
    pub list_items: Vec<String>,
    pub cloud_tags: Vec<String>,

    /// Push a changed default value to objects that already carry the property
    pub update_existing: bool,
}

impl PropertySpec {
    pub fn new(name: impl Into<String>, destination: Destination) -> Self {
        Self {
            name: name.into(),
            state: State::Present,
            destination,
            property_type: PropertyType::default(),
            mandatory: false,
            system: false,
            read_only: false,
            multi_line: false,
            default_value: String::new(),
            list_items: Vec::new(),
            cloud_tags: Vec::new(),
            update_existing: false,
        }
    }

    pub fn with_type(mut self, property_type: PropertyType) -> Self {
        self.property_type = property_type;
        self
    }

    pub fn with_state(mut self, state: State) -> Self {
        self.state = state;
        self
    }
}
