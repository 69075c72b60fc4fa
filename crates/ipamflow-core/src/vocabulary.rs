//! Fixed vocabulary tables
//!
//! Maps the caller-facing property type and destination names onto the
//! platform's type names and collection paths. Built once and handed to the
//! normalizer and locator.

use crate::model::{Destination, PropertyType};
use std::collections::HashMap;

const TYPE_NAMES: [(PropertyType, &str); 4] = [
    (PropertyType::Text, "String"),
    (PropertyType::YesNo, "Boolean"),
    (PropertyType::IpAddress, "IPAddress"),
    (PropertyType::Number, "Integer"),
];

const DESTINATION_COLLECTIONS: [(Destination, &str); 9] = [
    (Destination::DnsServer, "DNSServers"),
    (Destination::DhcpServer, "DHCPServers"),
    (Destination::Zone, "DNSZones"),
    (Destination::IpRange, "Ranges"),
    (Destination::IpAddress, "IPAMRecords"),
    (Destination::Device, "Devices"),
    (Destination::Interface, "Interfaces"),
    (Destination::CloudNet, "CloudNetworks"),
    (Destination::CloudAccount, "CloudServiceAccounts"),
];

/// Immutable lookup tables between caller and platform vocabulary
#[derive(Debug, Clone)]
pub struct Vocabulary {
    type_names: HashMap<PropertyType, &'static str>,
    collections: HashMap<Destination, &'static str>,
}

impl Default for Vocabulary {
    fn default() -> Self {
        Self {
            type_names: TYPE_NAMES.into_iter().collect(),
            collections: DESTINATION_COLLECTIONS.into_iter().collect(),
        }
    }
}

impl Vocabulary {
    /// Platform type name, `String` for `text`
    pub fn platform_type(&self, property_type: PropertyType) -> Option<&'static str> {
        self.type_names.get(&property_type).copied()
    }

    /// Collection holding the property definitions of a destination
    pub fn collection(&self, destination: Destination) -> Option<&'static str> {
        self.collections.get(&destination).copied()
    }
}
