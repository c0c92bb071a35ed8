//! GitLab container registry client.
//!
//! [`RegistryApi`] is the capability the pruning logic depends on;
//! [`GitlabClient`] implements it over HTTP. Tests substitute their own
//! implementation.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue};
use serde::de::DeserializeOwned;

use crate::config::RegistryConfig;
use crate::error::RegistryError;
use crate::model::{BulkDeleteRequest, DeleteOutcome, RepositorySummary, TagDetail, TagSummary};
use crate::reference::tag_url;

/// Header carrying the GitLab private token (`PRIVATE-TOKEN`).
pub const PRIVATE_TOKEN: &str = "private-token";

/// Operations against the registry API.
///
/// All calls are made one at a time; implementations need not support
/// concurrent use beyond `Send + Sync`.
#[async_trait]
pub trait RegistryApi: Send + Sync {
    /// Returns the id of the first repository listed at `repositories_url`.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::RepositoryNotFound`] if the list is empty,
    /// or a transport/decode error.
    async fn resolve_repository_id(&self, repositories_url: &str) -> Result<u64, RegistryError>;

    /// Lists the tags of a tag collection.
    ///
    /// # Errors
    ///
    /// Returns a transport or decode error.
    async fn list_tags(&self, tags_url: &str) -> Result<Vec<TagSummary>, RegistryError>;

    /// Fetches name and creation time of one tag.
    ///
    /// # Errors
    ///
    /// Returns a transport or decode error.
    async fn fetch_tag_detail(&self, tags_url: &str, name: &str)
        -> Result<TagDetail, RegistryError>;

    /// Deletes one tag.
    ///
    /// # Errors
    ///
    /// Returns an error only if the request could not be sent; a rejected
    /// deletion is reported through the outcome.
    async fn delete_tag(&self, tags_url: &str, name: &str) -> Result<DeleteOutcome, RegistryError>;

    /// Asks the registry to delete every tag matching `pattern` except the
    /// `keep` newest.
    ///
    /// # Errors
    ///
    /// Returns an error only if the request could not be sent.
    async fn delete_by_pattern(
        &self,
        tags_url: &str,
        pattern: &str,
        keep: usize,
    ) -> Result<DeleteOutcome, RegistryError>;
}

/// HTTP client for the GitLab registry API.
#[derive(Debug, Clone)]
pub struct GitlabClient {
    http: reqwest::Client,
    token: HeaderValue,
}

impl GitlabClient {
    /// Creates a client from a validated configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the token is not a valid header value or the
    /// HTTP client cannot be created.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use tagprune_registry::{GitlabClient, PruneSettings, RegistryConfig};
    ///
    /// let config = RegistryConfig::from_settings(PruneSettings {
    ///     domain: Some("https://gitlab.example.com/api/v4".into()),
    ///     auth_token: Some("secret".into()),
    ///     namespace: Some("group".into()),
    ///     project_name: Some("app".into()),
    ///     ..PruneSettings::default()
    /// })?;
    /// let client = GitlabClient::new(&config)?;
    /// # Ok::<(), tagprune_registry::RegistryError>(())
    /// ```
    pub fn new(config: &RegistryConfig) -> Result<Self, RegistryError> {
        let mut token = HeaderValue::from_str(&config.auth_token).map_err(|_| {
            RegistryError::AuthenticationFailed {
                message: "Token contains characters not allowed in a header".to_string(),
            }
        })?;
        token.set_sensitive(true);

        let mut builder = reqwest::Client::builder().user_agent(&config.user_agent);
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }

        let http = builder
            .build()
            .map_err(|e| RegistryError::ConnectionFailed {
                url: config.domain.clone(),
                source: e,
            })?;

        Ok(Self { http, token })
    }

    fn auth_headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(PRIVATE_TOKEN, self.token.clone());
        headers
    }

    /// Sends a request and reads the whole body.
    async fn send(
        &self,
        request: reqwest::RequestBuilder,
        url: &str,
    ) -> Result<(u16, String), RegistryError> {
        let response = request
            .headers(self.auth_headers())
            .send()
            .await
            .map_err(|e| RegistryError::ConnectionFailed {
                url: url.to_string(),
                source: e,
            })?;

        let status = response.status().as_u16();
        let body = response.text().await?;
        Ok((status, body))
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, RegistryError> {
        let (status, body) = self.send(self.http.get(url), url).await?;

        if !(200..300).contains(&status) {
            return Err(RegistryError::HttpError {
                status,
                message: body,
            });
        }

        serde_json::from_str(&body).map_err(Into::into)
    }
}

#[async_trait]
impl RegistryApi for GitlabClient {
    async fn resolve_repository_id(&self, repositories_url: &str) -> Result<u64, RegistryError> {
        let repositories: Vec<RepositorySummary> = self.get_json(repositories_url).await?;

        tracing::debug!(count = repositories.len(), "Listed project repositories");

        repositories
            .first()
            .map(|repo| repo.id)
            .ok_or_else(|| RegistryError::RepositoryNotFound {
                url: repositories_url.to_string(),
            })
    }

    async fn list_tags(&self, tags_url: &str) -> Result<Vec<TagSummary>, RegistryError> {
        self.get_json(tags_url).await
    }

    async fn fetch_tag_detail(
        &self,
        tags_url: &str,
        name: &str,
    ) -> Result<TagDetail, RegistryError> {
        self.get_json(&tag_url(tags_url, name)).await
    }

    async fn delete_tag(&self, tags_url: &str, name: &str) -> Result<DeleteOutcome, RegistryError> {
        let url = tag_url(tags_url, name);
        let (status, body) = self.send(self.http.delete(&url), &url).await?;
        Ok(DeleteOutcome::single(status, body))
    }

    async fn delete_by_pattern(
        &self,
        tags_url: &str,
        pattern: &str,
        keep: usize,
    ) -> Result<DeleteOutcome, RegistryError> {
        let request = self.http.delete(tags_url).json(&BulkDeleteRequest {
            name_regex: pattern,
            keep_n: keep,
        });
        let (status, body) = self.send(request, tags_url).await?;
        Ok(DeleteOutcome::bulk(status, body))
    }
}
