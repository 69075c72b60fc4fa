//! Remote operations

use crate::model::{Direction, ObjectRef};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Audit comment attached to every mutating call
pub const SAVE_COMMENT: &str = "Managed by ipamflow";

/// HTTP verb of an operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Verb {
    Get,
    Post,
    Put,
    Delete,
}

impl Verb {
    pub fn is_mutation(self) -> bool {
        self != Verb::Get
    }
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verb::Get => write!(f, "GET"),
            Verb::Post => write!(f, "POST"),
            Verb::Put => write!(f, "PUT"),
            Verb::Delete => write!(f, "DELETE"),
        }
    }
}

/// Subject side of a membership endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Subject {
    /// Subject that already exists
    Existing(ObjectRef),
    /// Subject created by an earlier operation of the same run; resolved
    /// from that operation's response
    Created,
}

/// Target path of an operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Endpoint {
    Path(String),
    Relation {
        direction: Direction,
        subject: Subject,
        target: ObjectRef,
    },
}

impl Endpoint {
    /// Concrete path, given the reference returned by the most recent create
    pub fn resolve(&self, created: Option<&ObjectRef>) -> Option<String> {
        match self {
            Endpoint::Path(path) => Some(path.clone()),
            Endpoint::Relation {
                direction,
                subject,
                target,
            } => {
                let subject = match subject {
                    Subject::Existing(reference) => reference,
                    Subject::Created => created?,
                };
                Some(direction.join(subject.as_str(), target.as_str()))
            }
        }
    }

    pub fn is_relation(&self) -> bool {
        matches!(self, Endpoint::Relation { .. })
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Endpoint::Path(path) => f.write_str(path),
            Endpoint::Relation {
                direction,
                subject,
                target,
            } => {
                let subject = match subject {
                    Subject::Existing(reference) => reference.as_str(),
                    Subject::Created => "<new>",
                };
                f.write_str(&direction.join(subject, target.as_str()))
            }
        }
    }
}

/// One remote call
#[derive(Debug, Clone, PartialEq)]
pub struct Operation {
    pub verb: Verb,
    pub endpoint: Endpoint,
    pub body: Value,
}

impl Operation {
    pub fn read(path: impl Into<String>) -> Self {
        Self {
            verb: Verb::Get,
            endpoint: Endpoint::Path(path.into()),
            body: Value::Object(Map::new()),
        }
    }

    /// Mutating call; the audit comment is added to `body`
    pub fn mutation(verb: Verb, endpoint: Endpoint, mut body: Map<String, Value>) -> Self {
        body.insert(
            "saveComment".to_string(),
            Value::String(SAVE_COMMENT.to_string()),
        );
        Self {
            verb,
            endpoint,
            body: Value::Object(body),
        }
    }

    pub fn create(path: impl Into<String>, body: Map<String, Value>) -> Self {
        Self::mutation(Verb::Post, Endpoint::Path(path.into()), body)
    }

    pub fn update(path: impl Into<String>, body: Map<String, Value>) -> Self {
        Self::mutation(Verb::Put, Endpoint::Path(path.into()), body)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::mutation(Verb::Delete, Endpoint::Path(path.into()), Map::new())
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.verb, self.endpoint)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mutation_carries_audit_comment() {
        let op = Operation::delete("Users/31");
        assert_eq!(op.body["saveComment"], SAVE_COMMENT);
        assert!(op.verb.is_mutation());
        assert!(!Operation::read("Users").verb.is_mutation());
    }

    #[test]
    fn test_created_subject_resolves_from_response() {
        let endpoint = Endpoint::Relation {
            direction: Direction::Forward,
            subject: Subject::Created,
            target: ObjectRef::new("Groups/6"),
        };

        assert_eq!(endpoint.resolve(None), None);
        assert_eq!(
            endpoint.resolve(Some(&ObjectRef::new("Users/40"))),
            Some("Groups/6/Users/40".to_string())
        );
        assert_eq!(endpoint.to_string(), "Groups/6/<new>");
    }
}
