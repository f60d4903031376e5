//! # ops-workflow
//!
//! State progression for package requests and project-report stages.
//!
//! Package requests move through a fixed sequence of business states,
//! driven by named actions with an explicit transition table
//! ([`PackageAction`]). Project reports have a less regular machine: each
//! confirmable stage carries its own mutation over the typed details
//! payload. Both paths attach uploaded evidence through `ops-media` and
//! append to the per-entity audit log.
//!
//! ## Quick Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use ops_media::MemoryMediaStore;
//! use ops_store::Store;
//! use ops_workflow::{PackageAction, WorkflowEngine};
//!
//! # async fn demo() {
//! let store = Store::open("/var/lib/opsd/ops.db").unwrap();
//! let engine = WorkflowEngine::new(store, Arc::new(MemoryMediaStore::new()));
//! engine
//!     .apply_action("PKG-1", PackageAction::Start, "amal", None, vec![])
//!     .await
//!     .unwrap();
//! # }
//! ```

pub mod engine;
pub mod error;
pub mod stages;

pub use engine::{CreatePackage, PackageAction, WorkflowEngine};
pub use error::WorkflowError;
