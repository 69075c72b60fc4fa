use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error(
        "Manifest not found. Looked in:\n\
        - current directory: ipam.local.kdl, .ipam.local.kdl, ipam.kdl, .ipam.kdl\n\
        - ./.ipamflow/\n\
        - ~/.config/ipamflow/ipam.kdl\n\
        Set IPAMFLOW_MANIFEST to point at a manifest directly"
    )]
    ManifestNotFound,

    #[error(
        "Missing credential '{0}'. Set IPAMFLOW_{upper}, add it to the manifest provider block, \
        or to ~/.config/ipamflow/credentials.yaml",
        upper = .0.to_uppercase()
    )]
    MissingCredential(&'static str),

    #[error("Invalid credentials file {path}: {source}")]
    InvalidCredentialsFile {
        path: PathBuf,
        source: serde_yaml::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ConfigError>;
