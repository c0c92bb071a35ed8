//! URL derivation and repository lookup.

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

use crate::client::RegistryApi;
use crate::config::RegistryConfig;
use crate::error::RegistryError;

/// Characters escaped in a single path segment (RFC 3986 unreserved kept).
const PATH_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Encodes `namespace/project` as a single project id segment.
///
/// # Examples
///
/// ```
/// use tagprune_registry::project_path;
///
/// assert_eq!(project_path("group", "app"), "group%2Fapp");
/// assert_eq!(project_path("group/sub", "app"), "group%2Fsub%2Fapp");
/// ```
#[must_use]
pub fn project_path(namespace: &str, project: &str) -> String {
    utf8_percent_encode(&format!("{namespace}/{project}"), PATH_SEGMENT).to_string()
}

/// Returns the repositories endpoint of a project.
#[must_use]
pub fn repositories_url(domain: &str, project_path: &str) -> String {
    format!("{domain}/projects/{project_path}/registry/repositories")
}

/// Returns the URL of one tag inside a tag collection.
#[must_use]
pub fn tag_url(tags_url: &str, name: &str) -> String {
    format!("{tags_url}/{}", utf8_percent_encode(name, PATH_SEGMENT))
}

/// The repository a run operates on. Computed once, read-only afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryReference {
    project_path: String,
    base_url: String,
    repository_id: u64,
    tags_url: String,
}

impl RepositoryReference {
    /// Builds a reference from an already known repository id.
    #[must_use]
    pub fn new(domain: &str, namespace: &str, project: &str, repository_id: u64) -> Self {
        let project_path = project_path(namespace, project);
        let base_url = repositories_url(domain, &project_path);
        let tags_url = format!("{base_url}/{repository_id}/tags");
        Self {
            project_path,
            base_url,
            repository_id,
            tags_url,
        }
    }

    /// Looks up the repository id of the configured project.
    ///
    /// # Errors
    ///
    /// Returns an error if the lookup fails or yields no repository.
    pub async fn resolve<A>(api: &A, config: &RegistryConfig) -> Result<Self, RegistryError>
    where
        A: RegistryApi + ?Sized,
    {
        let path = project_path(&config.namespace, &config.project_name);
        let base_url = repositories_url(&config.domain, &path);
        let repository_id = api.resolve_repository_id(&base_url).await?;

        tracing::debug!(project = %path, repository_id, "Resolved repository");

        Ok(Self::new(
            &config.domain,
            &config.namespace,
            &config.project_name,
            repository_id,
        ))
    }

    /// Percent-encoded `namespace/project`.
    #[must_use]
    pub fn project_path(&self) -> &str {
        &self.project_path
    }

    /// Repositories endpoint of the project.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Registry-internal repository id.
    #[must_use]
    pub const fn repository_id(&self) -> u64 {
        self.repository_id
    }

    /// Tag collection of the repository.
    #[must_use]
    pub fn tags_url(&self) -> &str {
        &self.tags_url
    }
}
