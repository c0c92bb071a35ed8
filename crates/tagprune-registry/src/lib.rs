//! # Tagprune Registry
//!
//! Container image tag pruning for GitLab container registries.
//!
//! This crate deletes either one named tag or every tag matching a pattern
//! except the N most recently created ones.
//!
//! ## Features
//!
//! - **Client-side retention**: tags are fetched, ordered by creation time and
//!   deleted one by one, so the kept set is decided locally
//! - **Server-side retention**: optionally delegated to the registry's bulk
//!   delete endpoint instead
//! - **Injectable transport**: all requests go through [`RegistryApi`]
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use tagprune_registry::{GitlabClient, Pruner, PruneSettings, RegistryConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = RegistryConfig::from_settings(PruneSettings {
//!         domain: Some("https://gitlab.example.com/api/v4".into()),
//!         auth_token: Some("glpat-secret".into()),
//!         namespace: Some("group".into()),
//!         project_name: Some("app".into()),
//!         regex: Some("^review-".into()),
//!         hold: 3,
//!         ..PruneSettings::default()
//!     })?;
//!
//!     let client = GitlabClient::new(&config)?;
//!     let report = Pruner::new(&client).run(&config).await?;
//!     println!("{report:?}");
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                         Pruner                           │
//! │  ┌──────────────────────┐  ┌──────────────────────────┐  │
//! │  │ RepositoryReference  │  │    RetentionSelector     │  │
//! │  │  (id lookup, URLs)   │  │ (filter, sort, delete)   │  │
//! │  └──────────────────────┘  └──────────────────────────┘  │
//! └──────────────────────────────────────────────────────────┘
//!                           │ RegistryApi
//!                           ▼
//! ┌──────────────────────────────────────────────────────────┐
//! │            GitlabClient  ──►  GitLab REST API v4          │
//! └──────────────────────────────────────────────────────────┘
//! ```

#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

mod client;
mod config;
mod error;
mod model;
mod reference;
mod retention;
mod runner;

#[cfg(test)]
mod testing;

pub use client::{GitlabClient, RegistryApi, PRIVATE_TOKEN};
pub use config::{
    DeletionMode, PruneSettings, RegistryConfig, RetentionStrategy, AUTH_TOKEN_ENV, DEFAULT_HOLD,
    DOMAIN_ENV, NAMESPACE_ENV, PROJECT_NAME_ENV,
};
pub use error::RegistryError;
pub use model::{DeleteOutcome, RepositorySummary, TagDetail, TagSummary};
pub use reference::{project_path, repositories_url, tag_url, RepositoryReference};
pub use retention::{FailedDeletion, PruneReport, RetentionPlan, RetentionSelector};
pub use runner::{Pruner, RunReport};
