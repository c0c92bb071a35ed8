//! Configuration types for a pruning run.
//!
//! [`PruneSettings`] holds raw, unvalidated input as it arrives from flags
//! and environment variables. [`RegistryConfig::from_settings`] turns it into
//! a validated [`RegistryConfig`] before any request is made.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use regex::Regex;

use crate::error::RegistryError;

/// Environment variable holding the GitLab API base URL.
pub const DOMAIN_ENV: &str = "CI_API_V4_URL";

/// Environment variable holding the private token.
pub const AUTH_TOKEN_ENV: &str = "AUTH_TOKEN";

/// Environment variable holding the project namespace.
pub const NAMESPACE_ENV: &str = "CI_PROJECT_NAMESPACE";

/// Environment variable holding the project name.
pub const PROJECT_NAME_ENV: &str = "CI_PROJECT_NAME";

/// Number of newest matching tags kept when no count is given.
pub const DEFAULT_HOLD: i64 = 3;

/// Raw settings for a run, before validation.
///
/// Empty strings are treated the same as absent values.
#[derive(Debug, Clone)]
pub struct PruneSettings {
    /// API base URL, e.g. `https://gitlab.example.com/api/v4`.
    pub domain: Option<String>,
    /// Private token sent as `PRIVATE-TOKEN`.
    pub auth_token: Option<String>,
    /// Project namespace (group path).
    pub namespace: Option<String>,
    /// Project name.
    pub project_name: Option<String>,
    /// A single tag to delete.
    pub specific_tag: Option<String>,
    /// Pattern selecting tags subject to retention.
    pub regex: Option<String>,
    /// Number of newest matching tags to keep. Values `<= 0` keep nothing.
    pub hold: i64,
    /// How retention is carried out.
    pub strategy: RetentionStrategy,
    /// Report what would be deleted without deleting.
    pub dry_run: bool,
    /// Per-request timeout; `None` keeps the transport default.
    pub timeout: Option<Duration>,
}

impl Default for PruneSettings {
    fn default() -> Self {
        Self {
            domain: None,
            auth_token: None,
            namespace: None,
            project_name: None,
            specific_tag: None,
            regex: None,
            hold: DEFAULT_HOLD,
            strategy: RetentionStrategy::default(),
            dry_run: false,
            timeout: None,
        }
    }
}

/// What a run deletes. Exactly one mode is active per run.
#[derive(Debug, Clone)]
pub enum DeletionMode {
    /// Nothing is deleted; the tags of the repository are listed.
    None,

    /// Delete one named tag.
    SpecificTag(String),

    /// Delete every tag matching `pattern` except the `keep` newest.
    Pattern {
        /// Compiled tag pattern (unanchored match).
        pattern: Regex,
        /// Number of newest matching tags to keep.
        keep: usize,
    },
}

/// Where the retention decision is made.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RetentionStrategy {
    /// Fetch, sort and delete tag by tag from this process.
    #[default]
    ClientSide,

    /// Hand pattern and keep-count to the registry's bulk delete endpoint.
    ///
    /// The registry accepts the request and deletes asynchronously.
    ServerSide,
}

impl FromStr for RetentionStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "client" | "client-side" => Ok(Self::ClientSide),
            "server" | "server-side" => Ok(Self::ServerSide),
            other => Err(format!(
                "unknown strategy '{other}', expected 'client' or 'server'"
            )),
        }
    }
}

impl fmt::Display for RetentionStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ClientSide => f.write_str("client"),
            Self::ServerSide => f.write_str("server"),
        }
    }
}

/// Validated configuration for a run.
#[derive(Clone)]
pub struct RegistryConfig {
    /// API base URL without a trailing slash.
    pub domain: String,

    /// Private token.
    pub auth_token: String,

    /// Project namespace.
    pub namespace: String,

    /// Project name.
    pub project_name: String,

    /// Active deletion mode.
    pub mode: DeletionMode,

    /// Retention strategy used by [`DeletionMode::Pattern`].
    pub strategy: RetentionStrategy,

    /// Plan only, never delete.
    pub dry_run: bool,

    /// Request timeout.
    pub timeout: Option<Duration>,

    /// User agent string.
    pub user_agent: String,
}

impl fmt::Debug for RegistryConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegistryConfig")
            .field("domain", &self.domain)
            .field("auth_token", &"<redacted>")
            .field("namespace", &self.namespace)
            .field("project_name", &self.project_name)
            .field("mode", &self.mode)
            .field("strategy", &self.strategy)
            .field("dry_run", &self.dry_run)
            .field("timeout", &self.timeout)
            .field("user_agent", &self.user_agent)
            .finish()
    }
}

impl RegistryConfig {
    /// Validates raw settings.
    ///
    /// Required values are checked in the order domain, token, namespace,
    /// project name. The tag pattern is compiled here so that a bad pattern
    /// fails before any request is made.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - a required value is missing or empty
    /// - the domain is not an absolute URL
    /// - both a specific tag and a pattern are given
    /// - the pattern does not compile
    ///
    /// # Examples
    ///
    /// ```
    /// use tagprune_registry::{DeletionMode, PruneSettings, RegistryConfig};
    ///
    /// let settings = PruneSettings {
    ///     domain: Some("https://gitlab.example.com/api/v4".into()),
    ///     auth_token: Some("secret".into()),
    ///     namespace: Some("group".into()),
    ///     project_name: Some("app".into()),
    ///     regex: Some("^v".into()),
    ///     hold: 2,
    ///     ..PruneSettings::default()
    /// };
    /// let config = RegistryConfig::from_settings(settings).unwrap();
    /// assert!(matches!(config.mode, DeletionMode::Pattern { keep: 2, .. }));
    /// ```
    pub fn from_settings(settings: PruneSettings) -> Result<Self, RegistryError> {
        let domain = required(settings.domain, "domain", DOMAIN_ENV)?;
        let auth_token = required(settings.auth_token, "auth-token", AUTH_TOKEN_ENV)?;
        let namespace = required(settings.namespace, "namespace", NAMESPACE_ENV)?;
        let project_name = required(settings.project_name, "project-name", PROJECT_NAME_ENV)?;

        let domain = normalize_domain(&domain)?;

        let specific_tag = settings.specific_tag.filter(|t| !t.is_empty());
        let regex = settings.regex.filter(|r| !r.is_empty());

        let mode = match (specific_tag, regex) {
            (Some(_), Some(_)) => return Err(RegistryError::ConflictingModes),
            (Some(tag), None) => DeletionMode::SpecificTag(tag),
            (None, Some(raw)) => {
                let pattern = Regex::new(&raw).map_err(|source| RegistryError::InvalidPattern {
                    pattern: raw.clone(),
                    source,
                })?;
                DeletionMode::Pattern {
                    pattern,
                    keep: usize::try_from(settings.hold).unwrap_or(0),
                }
            }
            (None, None) => DeletionMode::None,
        };

        Ok(Self {
            domain,
            auth_token,
            namespace,
            project_name,
            mode,
            strategy: settings.strategy,
            dry_run: settings.dry_run,
            timeout: settings.timeout,
            user_agent: format!("tagprune/{}", env!("CARGO_PKG_VERSION")),
        })
    }
}

fn required(
    value: Option<String>,
    flag: &'static str,
    env: &'static str,
) -> Result<String, RegistryError> {
    value
        .filter(|v| !v.is_empty())
        .ok_or(RegistryError::MissingSetting { flag, env })
}

fn normalize_domain(domain: &str) -> Result<String, RegistryError> {
    let parsed = url::Url::parse(domain).map_err(|_| RegistryError::InvalidUrl {
        url: domain.to_string(),
    })?;
    if parsed.cannot_be_a_base() {
        return Err(RegistryError::InvalidUrl {
            url: domain.to_string(),
        });
    }
    Ok(domain.trim_end_matches('/').to_string())
}
