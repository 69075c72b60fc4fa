//! Operation executor
//!
//! Issues a planned operation sequence strictly in order, one call at a time.

use crate::error::{ReconcileError, Result};
use crate::model::ObjectRef;
use crate::operation::{Operation, Verb};
use crate::transport::Transport;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Outcome of executing a sequence of operations
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AggregatedResult {
    /// True when at least one mutating call was issued
    pub changed: bool,

    /// Result of the last call issued
    pub message: Value,

    /// Number of calls issued
    pub issued: usize,

    /// Total execution time in milliseconds
    pub duration_ms: u64,
}

/// Execute `operations` in order
///
/// The reference returned by a POST is remembered so that later membership
/// endpoints built for a not-yet-created subject can be resolved. A warning
/// on a mutating call aborts the sequence; calls issued before it stay
/// applied and are reported in the error. A warning on a GET is not a
/// failure.
pub async fn execute(transport: &dyn Transport, operations: &[Operation]) -> Result<AggregatedResult> {
    let start = Instant::now();
    let mut result = AggregatedResult::default();
    let mut created: Option<ObjectRef> = None;

    for (index, op) in operations.iter().enumerate() {
        let path = op
            .endpoint
            .resolve(created.as_ref())
            .ok_or_else(|| ReconcileError::UnresolvedEndpoint(op.endpoint.to_string()))?;

        debug!(verb = %op.verb, path = %path, "Issuing call");
        let response = transport.call(op.verb, &path, &op.body).await?;
        result.issued += 1;

        if op.verb.is_mutation() {
            if let Some(message) = response.warning_message() {
                if index > 0 {
                    warn!(
                        applied = index,
                        total = operations.len(),
                        "Aborting after partial application"
                    );
                }
                return Err(ReconcileError::RemoteRejection {
                    verb: op.verb.to_string(),
                    path,
                    message: message.to_string(),
                    applied: index,
                });
            }
            result.changed = true;
        }

        if op.verb == Verb::Post
            && let Some(reference) = response.result.get("ref").and_then(Value::as_str)
        {
            created = Some(ObjectRef::new(reference));
        }

        result.message = response.result;
    }

    result.duration_ms = start.elapsed().as_millis() as u64;
    if result.changed {
        info!(
            issued = result.issued,
            duration_ms = result.duration_ms,
            "Applied operations"
        );
    }
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TransportError;
    use crate::model::{Direction, ObjectRef};
    use crate::operation::{Endpoint, Subject};
    use crate::transport::ApiResponse;
    use async_trait::async_trait;
    use serde_json::{Map, json};
    use std::sync::Mutex;

    /// Replays canned responses and records the issued paths
    struct Scripted {
        responses: Mutex<Vec<ApiResponse>>,
        calls: Mutex<Vec<(Verb, String)>>,
    }

    impl Scripted {
        fn new(mut responses: Vec<ApiResponse>) -> Self {
            responses.reverse();
            Self {
                responses: Mutex::new(responses),
                calls: Mutex::new(Vec::new()),
            }
        }

        fn calls(&self) -> Vec<(Verb, String)> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Transport for Scripted {
        async fn call(
            &self,
            verb: Verb,
            path: &str,
            _body: &Value,
        ) -> std::result::Result<ApiResponse, TransportError> {
            self.calls.lock().unwrap().push((verb, path.to_string()));
            self.responses
                .lock()
                .unwrap()
                .pop()
                .ok_or_else(|| TransportError::Connection("no scripted response".to_string()))
        }
    }

    fn add_to_group(target: &str) -> Operation {
        Operation::mutation(
            Verb::Put,
            Endpoint::Relation {
                direction: Direction::Forward,
                subject: Subject::Created,
                target: ObjectRef::new(target),
            },
            Map::new(),
        )
    }

    #[tokio::test]
    async fn test_created_reference_feeds_membership_endpoints() {
        let transport = Scripted::new(vec![
            ApiResponse::ok(json!({ "ref": "Users/40" })),
            ApiResponse::ok(Value::Null),
        ]);
        let ops = vec![Operation::create("Users", Map::new()), add_to_group("Groups/6")];

        let result = execute(&transport, &ops).await.unwrap();
        assert!(result.changed);
        assert_eq!(result.issued, 2);
        assert_eq!(
            transport.calls(),
            vec![
                (Verb::Post, "Users".to_string()),
                (Verb::Put, "Groups/6/Users/40".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_rejection_reports_applied_prefix() {
        let transport = Scripted::new(vec![
            ApiResponse::ok(Value::Null),
            ApiResponse::warning("Access denied"),
        ]);
        let ops = vec![
            Operation::delete("Groups/6/Users/31"),
            Operation::delete("Users/31/Roles/2"),
            Operation::delete("Users/31"),
        ];

        let err = execute(&transport, &ops).await.unwrap_err();
        match err {
            ReconcileError::RemoteRejection {
                verb,
                path,
                message,
                applied,
            } => {
                assert_eq!(verb, "DELETE");
                assert_eq!(path, "Users/31/Roles/2");
                assert_eq!(message, "Access denied");
                assert_eq!(applied, 1);
            }
            other => panic!("unexpected error: {:?}", other),
        }
        assert_eq!(transport.calls().len(), 2);
    }

    #[tokio::test]
    async fn test_read_warning_is_not_a_failure() {
        let transport = Scripted::new(vec![ApiResponse::warning("Object not found")]);
        let result = execute(&transport, &[Operation::read("Users/99")]).await.unwrap();
        assert!(!result.changed);
        assert_eq!(result.issued, 1);
    }

    #[tokio::test]
    async fn test_unresolved_created_subject() {
        let transport = Scripted::new(vec![]);
        let err = execute(&transport, &[add_to_group("Groups/6")]).await.unwrap_err();
        assert!(matches!(err, ReconcileError::UnresolvedEndpoint(_)));
        assert!(transport.calls().is_empty());
    }

    #[tokio::test]
    async fn test_empty_sequence_changes_nothing() {
        let transport = Scripted::new(vec![]);
        let result = execute(&transport, &[]).await.unwrap();
        assert!(!result.changed);
        assert_eq!(result.message, Value::Null);
    }
}
