//! property node

use super::{Result, flag, node_name, node_state, property_value, required_string, string_list};
use crate::error::ManifestError;
use crate::model::{Destination, PropertySpec, PropertyType};
use kdl::{KdlNode, KdlValue};

/// Parse a `property "<name>" dest="<destination>" { ... }` node
pub(super) fn parse_property(node: &KdlNode) -> Result<PropertySpec> {
    let name = node_name(node)?;
    let mut destination = property_value(node, "dest")
        .and_then(KdlValue::as_string)
        .map(|d| parse_destination(&name, d))
        .transpose()?;

    let mut spec = PropertySpec::new(&name, Destination::Zone).with_state(node_state(node)?);

    if let Some(children) = node.children() {
        for child in children.nodes() {
            match child.name().value() {
                "dest" | "destination" => {
                    destination = Some(parse_destination(&name, &required_string(child)?)?);
                }
                "type" | "proptype" => {
                    let value = required_string(child)?;
                    spec.property_type = PropertyType::parse(&value).ok_or_else(|| {
                        ManifestError::InvalidConfig(format!(
                            "property '{}': unknown type '{}'",
                            name, value
                        ))
                    })?;
                }
                "mandatory" => spec.mandatory = flag(child)?,
                "system" => spec.system = flag(child)?,
                "read-only" | "read_only" | "readonly" => spec.read_only = flag(child)?,
                "multi-line" | "multi_line" | "multiline" => spec.multi_line = flag(child)?,
                "default-value" | "default_value" | "defaultvalue" => {
                    spec.default_value = required_string(child)?;
                }
                "list-items" | "list_items" | "listitems" => {
                    spec.list_items = string_list(child);
                }
                "cloud-tags" | "cloud_tags" | "cloudtags" => {
                    spec.cloud_tags = string_list(child);
                }
                "update-existing" | "update_existing" | "updateexisting" => {
                    spec.update_existing = flag(child)?;
                }
                other => {
                    return Err(ManifestError::InvalidConfig(format!(
                        "property '{}': unknown setting '{}'",
                        name, other
                    )));
                }
            }
        }
    }

    spec.destination = destination.ok_or_else(|| {
        ManifestError::InvalidConfig(format!("property '{}' requires a destination", name))
    })?;
    Ok(spec)
}

fn parse_destination(name: &str, value: &str) -> Result<Destination> {
    Destination::parse(value).ok_or_else(|| {
        ManifestError::InvalidConfig(format!(
            "property '{}': unknown destination '{}'",
            name, value
        ))
    })
}
