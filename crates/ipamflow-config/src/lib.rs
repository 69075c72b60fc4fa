pub mod credentials;
pub mod error;

pub use credentials::{Credentials, PartialCredentials};
pub use error::*;

use std::path::PathBuf;

/// Environment variable pointing directly at a manifest
pub const MANIFEST_ENV: &str = "IPAMFLOW_MANIFEST";

const MANIFEST_CANDIDATES: [&str; 4] = ["ipam.local.kdl", ".ipam.local.kdl", "ipam.kdl", ".ipam.kdl"];

/// `~/.config/ipamflow`, without creating it
pub fn config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("ipamflow"))
}

/// Find the manifest describing the desired state
///
/// Search order:
/// 1. `IPAMFLOW_MANIFEST` environment variable
/// 2. current directory: ipam.local.kdl, .ipam.local.kdl, ipam.kdl, .ipam.kdl
/// 3. the same names inside `./.ipamflow/`
/// 4. `~/.config/ipamflow/ipam.kdl`
pub fn find_manifest_file() -> Result<PathBuf> {
    if let Ok(manifest_path) = std::env::var(MANIFEST_ENV) {
        let path = PathBuf::from(manifest_path);
        if path.exists() {
            return Ok(path);
        }
        tracing::warn!(path = %path.display(), "{} points at a missing file", MANIFEST_ENV);
    }

    let current_dir = std::env::current_dir()?;

    for filename in &MANIFEST_CANDIDATES {
        let path = current_dir.join(filename);
        if path.exists() {
            return Ok(path);
        }
    }

    let project_dir = current_dir.join(".ipamflow");
    if project_dir.is_dir() {
        for filename in &MANIFEST_CANDIDATES {
            let path = project_dir.join(filename);
            if path.exists() {
                return Ok(path);
            }
        }
    }

    if let Some(config_dir) = config_dir() {
        let global_manifest = config_dir.join("ipam.kdl");
        if global_manifest.exists() {
            return Ok(global_manifest);
        }
    }

    Err(ConfigError::ManifestNotFound)
}
