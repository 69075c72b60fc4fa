//! user node

use super::{Result, node_name, node_state, required_string, string_list};
use crate::error::ManifestError;
use crate::model::{UpdatePassword, UserSpec};
use kdl::KdlNode;

/// Parse a `user "<name>" { ... }` node
///
/// A `groups` or `roles` child without arguments declares an empty set;
/// leaving the child out leaves that kind of membership alone.
pub(super) fn parse_user(node: &KdlNode) -> Result<UserSpec> {
    let name = node_name(node)?;
    let mut spec = UserSpec::new(&name);
    spec.state = node_state(node)?;

    if let Some(children) = node.children() {
        for child in children.nodes() {
            match child.name().value() {
                "password" => spec.password = Some(required_string(child)?),
                "full-name" | "full_name" => spec.full_name = Some(required_string(child)?),
                "description" | "desc" => spec.description = Some(required_string(child)?),
                "email" => spec.email = Some(required_string(child)?),
                "authentication-type" | "authentication_type" => {
                    spec.authentication_type = Some(required_string(child)?);
                }
                "groups" => spec.groups = Some(string_list(child).into_iter().collect()),
                "roles" => spec.roles = Some(string_list(child).into_iter().collect()),
                "update-password" | "update_password" => {
                    let value = required_string(child)?;
                    spec.update_password = UpdatePassword::parse(&value).ok_or_else(|| {
                        ManifestError::InvalidConfig(format!(
                            "user '{}': update-password must be 'on-create' or 'always', not '{}'",
                            name, value
                        ))
                    })?;
                }
                other => {
                    return Err(ManifestError::InvalidConfig(format!(
                        "user '{}': unknown setting '{}'",
                        name, other
                    )));
                }
            }
        }
    }

    Ok(spec)
}
