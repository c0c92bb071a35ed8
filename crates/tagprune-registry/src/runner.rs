//! Run orchestration: resolve the repository, then act on the deletion mode.

use tracing::{info, warn};

use crate::client::RegistryApi;
use crate::config::{DeletionMode, PruneSettings, RegistryConfig, RetentionStrategy};
use crate::error::RegistryError;
use crate::model::DeleteOutcome;
use crate::reference::RepositoryReference;
use crate::retention::{PruneReport, RetentionSelector};

/// What a run did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunReport {
    /// No deletion mode was given; the repository's tags.
    Listing(Vec<String>),

    /// One named tag was deleted (or would have been, for a dry run).
    SingleTag {
        /// Tag name.
        tag: String,
        /// Registry response; `None` for a dry run.
        outcome: Option<DeleteOutcome>,
    },

    /// Client-side retention result.
    Retention(PruneReport),

    /// Server-side bulk delete request.
    BulkRequest {
        /// Pattern sent as `name_regex`.
        pattern: String,
        /// Count sent as `keep_n`.
        keep: usize,
        /// Registry response; `None` for a dry run.
        outcome: Option<DeleteOutcome>,
    },
}

impl RunReport {
    /// Whether every requested deletion was accepted.
    #[must_use]
    pub fn is_success(&self) -> bool {
        match self {
            Self::Listing(_) => true,
            Self::SingleTag { outcome, .. } | Self::BulkRequest { outcome, .. } => {
                outcome.as_ref().is_none_or(DeleteOutcome::succeeded)
            }
            Self::Retention(report) => report.is_complete(),
        }
    }
}

/// Drives one pruning run against a registry.
#[derive(Debug)]
pub struct Pruner<'a, A: ?Sized> {
    api: &'a A,
}

impl<'a, A> Pruner<'a, A>
where
    A: RegistryApi + ?Sized,
{
    /// Creates a pruner using `api` for all requests.
    #[must_use]
    pub const fn new(api: &'a A) -> Self {
        Self { api }
    }

    /// Validates `settings` and runs. Invalid settings fail before any request.
    ///
    /// # Errors
    ///
    /// Returns a configuration error, or any error from [`Pruner::run`].
    pub async fn run_settings(&self, settings: PruneSettings) -> Result<RunReport, RegistryError> {
        let config = RegistryConfig::from_settings(settings)?;
        self.run(&config).await
    }

    /// Runs with a validated configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the repository cannot be resolved or a request
    /// fails. Rejected deletions are not errors; they show up in the report.
    pub async fn run(&self, config: &RegistryConfig) -> Result<RunReport, RegistryError> {
        let reference = RepositoryReference::resolve(self.api, config).await?;
        let tags_url = reference.tags_url();

        info!(
            project = %reference.project_path(),
            repository_id = reference.repository_id(),
            "Using repository"
        );

        match &config.mode {
            DeletionMode::None => {
                let tags = self.api.list_tags(tags_url).await?;
                info!(count = tags.len(), "No deletion requested, listing tags");
                Ok(RunReport::Listing(tags.into_iter().map(|t| t.name).collect()))
            }
            DeletionMode::SpecificTag(tag) => self.delete_one(tags_url, tag, config.dry_run).await,
            DeletionMode::Pattern { pattern, keep } => match config.strategy {
                RetentionStrategy::ClientSide => {
                    let report = RetentionSelector::new(self.api)
                        .run(tags_url, pattern, *keep, config.dry_run)
                        .await?;
                    Ok(RunReport::Retention(report))
                }
                RetentionStrategy::ServerSide => {
                    self.delete_on_server(tags_url, pattern.as_str(), *keep, config.dry_run)
                        .await
                }
            },
        }
    }

    async fn delete_one(
        &self,
        tags_url: &str,
        tag: &str,
        dry_run: bool,
    ) -> Result<RunReport, RegistryError> {
        if dry_run {
            info!(tag, "Would delete tag");
            return Ok(RunReport::SingleTag {
                tag: tag.to_string(),
                outcome: None,
            });
        }

        let outcome = self.api.delete_tag(tags_url, tag).await?;
        if outcome.succeeded() {
            info!(tag, "Tag has been deleted");
        } else {
            warn!(tag, status = outcome.status, "Tag was not deleted");
        }

        Ok(RunReport::SingleTag {
            tag: tag.to_string(),
            outcome: Some(outcome),
        })
    }

    async fn delete_on_server(
        &self,
        tags_url: &str,
        pattern: &str,
        keep: usize,
        dry_run: bool,
    ) -> Result<RunReport, RegistryError> {
        let outcome = if dry_run {
            info!(pattern, keep, "Would request bulk deletion");
            None
        } else {
            let outcome = self.api.delete_by_pattern(tags_url, pattern, keep).await?;
            if outcome.succeeded() {
                info!(pattern, keep, "Bulk deletion accepted by registry");
            } else {
                warn!(
                    pattern,
                    status = outcome.status,
                    body = %outcome.body,
                    "Bulk deletion was not accepted"
                );
            }
            Some(outcome)
        };

        Ok(RunReport::BulkRequest {
            pattern: pattern.to_string(),
            keep,
            outcome,
        })
    }
}
