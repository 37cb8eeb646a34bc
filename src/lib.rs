//! jira-task-sync - JIRA Cloud to project/task sync staging
//!
//! Pulls issues from a JIRA Cloud instance over its REST API and reshapes them
//! into flat records for a downstream host (such as a NetSuite batch job) to turn into
//! project and task records.
//!
//! # Architecture
//!
//! - **config**: YAML credential store and per-run integration settings
//! - **host**: Traits for the host collaborators (credentials, company info, record sink)
//! - **integrations**: Basic-auth headers and the JIRA REST client
//! - **sync**: Aggregator, field mapper and the driver that runs one batch
//! - **logging**: tracing subscriber setup

pub mod config;
pub mod error;
pub mod host;
pub mod integrations;
pub mod logging;
pub mod sync;

// Re-exports
pub use error::{Result, SyncError};
