//! Reconciliation error types

use thiserror::Error;

/// Errors raised while reconciling a resource
#[derive(Error, Debug)]
pub enum ReconcileError {
    #[error("Requested a non existing {kind}: {name}")]
    UnknownReference { kind: String, name: String },

    #[error("Lookup failed: {0}")]
    LookupFailed(String),

    #[error("{verb} {path} rejected: {message}")]
    RemoteRejection {
        verb: String,
        path: String,
        message: String,
        /// Operations issued successfully before the rejected one
        applied: usize,
    },

    #[error("missing required argument: {field} ({resource})")]
    MissingRequiredField {
        resource: String,
        field: &'static str,
    },

    #[error("Invalid desired state: {0}")]
    InvalidSpec(String),

    #[error("Unresolved endpoint: {0}")]
    UnresolvedEndpoint(String),

    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),
}

/// Failures of the transport collaborator itself, as opposed to warnings
/// reported by the platform
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("connection failed: {0}")]
    Connection(String),

    #[error("request timed out: {0}")]
    Timeout(String),

    #[error("unexpected response: {0}")]
    Decode(String),
}

/// Errors raised while reading a manifest
#[derive(Error, Debug)]
pub enum ManifestError {
    #[error("KDL parse error: {0}")]
    KdlParse(#[from] kdl::KdlError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, ReconcileError>;
