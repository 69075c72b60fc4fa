//! Micetro REST API transport
//!
//! Implements the `Transport` collaborator of `ipamflow-core` over HTTP.
//! Every call goes to `{url}/mmws/api/{path}` with basic authentication.

pub mod client;
pub mod error;

pub use client::{ClientOptions, MicetroClient, RetryConfig};
pub use error::{ApiError, Result};
