//! Transport collaborator abstraction

use crate::error::TransportError;
use crate::operation::Verb;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Issues one call against the platform API
///
/// Implementations own credentials, the base URL, and any retry policy. The
/// reconciliation core awaits each call before issuing the next.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn call(
        &self,
        verb: Verb,
        path: &str,
        body: &Value,
    ) -> std::result::Result<ApiResponse, TransportError>;
}

/// Response of a single call
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse {
    /// `result` object of the response
    pub result: Value,

    /// Message reported by the platform instead of a result
    pub warnings: Option<String>,
}

impl ApiResponse {
    pub fn ok(result: Value) -> Self {
        Self {
            result,
            warnings: None,
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            result: Value::Null,
            warnings: Some(message.into()),
        }
    }

    /// Non-empty warnings; on a GET this means "not found"
    pub fn warning_message(&self) -> Option<&str> {
        self.warnings.as_deref().filter(|w| !w.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_warning_is_not_a_warning() {
        let response = ApiResponse {
            result: Value::Null,
            warnings: Some(String::new()),
        };
        assert_eq!(response.warning_message(), None);
        assert_eq!(
            ApiResponse::warning("Object not found").warning_message(),
            Some("Object not found")
        );
    }
}
