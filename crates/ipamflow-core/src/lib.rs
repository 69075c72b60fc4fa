//! ipamflow core
//!
//! Declarative reconciliation of Micetro IPAM resources: custom property
//! definitions, users with their group and role memberships, and DNS zones.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────┐
//! │                   ipam CLI                       │
//! │             (ipam apply / plan)                  │
//! └─────────────────┬───────────────────────────────┘
//!                   │ DesiredResource
//! ┌─────────────────▼───────────────────────────────┐
//! │                ipamflow-core                     │
//! │  Locator → Normalizer → Diff Engine              │
//! │          → Relation Reconciler → Executor        │
//! │  ┌──────────────────────────────────────────┐   │
//! │  │        trait Transport { call(...) }      │   │
//! │  └──────────────────────────────────────────┘   │
//! └─────────────────┬───────────────────────────────┘
//!                   │
//! ┌─────────────────▼───────────────────────────────┐
//! │          ipamflow-api (MicetroClient)            │
//! │             {url}/mmws/api/{path}                │
//! └─────────────────────────────────────────────────┘
//! ```

pub mod diff;
pub mod error;
pub mod executor;
pub mod locate;
pub mod model;
pub mod normalize;
pub mod operation;
pub mod parser;
pub mod plan;
pub mod reconcile;
pub mod relations;
pub mod transport;
pub mod vocabulary;

// Re-exports
pub use diff::{Decision, diff};
pub use error::{ManifestError, ReconcileError, Result, TransportError};
pub use executor::{AggregatedResult, execute};
pub use locate::{Locator, Selector};
pub use model::{
    Destination, ObjectRef, PropertySpec, PropertyType, Resource, ResourceKind, ServerType, State,
    UpdatePassword, UserSpec, ZoneSpec,
};
pub use operation::{Endpoint, Operation, SAVE_COMMENT, Subject, Verb};
pub use parser::{Manifest, ProviderSettings, parse_manifest, parse_manifest_file};
pub use plan::{ActionType, Plan, PlanSummary};
pub use reconcile::{DesiredResource, ReconcileResult, Reconciler};
pub use relations::{RelationOp, RelationVerb, reconcile_relations};
pub use transport::{ApiResponse, Transport};
pub use vocabulary::Vocabulary;
