//! Session and configuration core for the `uipo` Orchestrator client.
//!
//! One invocation of the CLI runs the same lifecycle:
//!
//! 1. [`ConfigStore::load`] reads the cached [`SessionRecord`]
//! 2. command flags are merged into the record (explicit values win)
//! 3. either [`AuthResolver`] exchanges credentials for a bearer token, or
//!    [`SessionClient`] issues authenticated requests against a URL built by
//!    [`endpoint::resolve`]
//! 4. on success, [`ConfigStore::persist`] writes the record back atomically
//!
//! # Main Types
//!
//! - [`SessionRecord`] - the single persisted entity
//! - [`RuntimeOverrides`] - process-scoped environment and global flags
//! - [`ConfigStore`] - on-disk location, load and crash-safe persist
//! - [`AuthResolver`] / [`Credentials`] - protocol selection and token exchange
//! - [`SessionClient`] - authenticated request execution and error classification

pub mod auth;
pub mod client;
pub mod endpoint;
pub mod error;
pub mod overrides;
pub mod record;
pub mod store;

pub use auth::{AuthOutcome, AuthRequest, AuthResolver, Credentials};
pub use client::{ApiResponse, RequestBody, SessionClient, build_http_client};
pub use endpoint::resolve;
pub use error::{Error, Result};
pub use overrides::RuntimeOverrides;
pub use record::{DEFAULT_CLIENT_ID, SCHEMA_VERSION, SessionRecord, TargetFolder, Topology};
pub use store::ConfigStore;
