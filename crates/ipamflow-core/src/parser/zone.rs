//! zone node

use super::{Result, arguments, flag, kdl_to_json, node_name, node_state, required_string, string_list};
use crate::error::ManifestError;
use crate::model::{ServerType, ZoneSpec};
use kdl::KdlNode;

/// Parse a `zone "<name>" { ... }` node
pub(super) fn parse_zone(node: &KdlNode) -> Result<ZoneSpec> {
    let name = node_name(node)?;
    let mut spec = ZoneSpec::new(&name);
    spec.state = node_state(node)?;

    if let Some(children) = node.children() {
        for child in children.nodes() {
            match child.name().value() {
                "nameserver" => spec.nameserver = Some(required_string(child)?),
                "authority" => spec.authority = Some(required_string(child)?),
                "type" | "servtype" => {
                    let value = required_string(child)?;
                    spec.server_type = ServerType::parse(&value).ok_or_else(|| {
                        ManifestError::InvalidConfig(format!(
                            "zone '{}': unknown server type '{}'",
                            name, value
                        ))
                    })?;
                }
                "dynamic" => spec.dynamic = flag(child)?,
                "masters" => spec.masters = Some(string_list(child)),
                "ad-integrated" | "ad_integrated" | "adintegrated" => {
                    spec.ad_integrated = Some(flag(child)?);
                }
                "ad-replication-type" | "ad_replication_type" | "adreplicationtype" => {
                    spec.ad_replication_type = Some(required_string(child)?);
                }
                "ad-partition" | "ad_partition" | "adpartition" => {
                    spec.ad_partition = Some(required_string(child)?);
                }
                "custom-properties" | "custom_properties" | "customproperties" => {
                    // custom-properties { location "Reykjavik" }
                    if let Some(properties) = child.children() {
                        for property in properties.nodes() {
                            let key = property.name().value();
                            let value = arguments(property).next().map(kdl_to_json).ok_or_else(
                                || {
                                    ManifestError::InvalidConfig(format!(
                                        "zone '{}': custom property '{}' needs a value",
                                        name, key
                                    ))
                                },
                            )?;
                            spec.custom_properties.insert(key.to_string(), value);
                        }
                    }
                }
                other => {
                    return Err(ManifestError::InvalidConfig(format!(
                        "zone '{}': unknown setting '{}'",
                        name, other
                    )));
                }
            }
        }
    }

    Ok(spec)
}
