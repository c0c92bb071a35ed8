//! Error types for registry operations.

use thiserror::Error;

/// Errors that can occur while configuring or talking to the registry.
///
/// Every variant aborts the current run. Failed deletions are not errors;
/// they are reported through [`DeleteOutcome`](crate::DeleteOutcome).
#[derive(Debug, Error)]
pub enum RegistryError {
    /// A required setting was neither passed as a flag nor set in the environment.
    #[error("Missing required setting: pass --{flag} or set {env}")]
    MissingSetting {
        /// Command-line flag name.
        flag: &'static str,
        /// Environment variable consulted as fallback.
        env: &'static str,
    },

    /// A specific tag and a pattern were both supplied.
    #[error("Options --regex and --specific-tag can not be used together")]
    ConflictingModes,

    /// The tag pattern failed to compile.
    #[error("Invalid tag pattern '{pattern}': {source}")]
    InvalidPattern {
        /// Pattern as supplied.
        pattern: String,
        /// Underlying error.
        #[source]
        source: regex::Error,
    },

    /// Invalid URL.
    #[error("Invalid URL: {url}")]
    InvalidUrl {
        /// URL string.
        url: String,
    },

    /// The token could not be used as a request header.
    #[error("Authentication failed: {message}")]
    AuthenticationFailed {
        /// Error message.
        message: String,
    },

    /// Failed to connect to the registry or to send a request.
    #[error("Failed to connect to registry at {url}: {source}")]
    ConnectionFailed {
        /// Request URL.
        url: String,
        /// Underlying error.
        #[source]
        source: reqwest::Error,
    },

    /// HTTP error from registry.
    #[error("HTTP error from registry: {status} - {message}")]
    HttpError {
        /// HTTP status code.
        status: u16,
        /// Error message.
        message: String,
    },

    /// JSON serialization/deserialization error.
    #[error("JSON error: {source}")]
    JsonError {
        /// Underlying error.
        #[source]
        source: serde_json::Error,
    },

    /// The repository lookup returned no repositories for the project.
    #[error("No container repository found at {url}; check the namespace and project name")]
    RepositoryNotFound {
        /// Repositories URL that was queried.
        url: String,
    },
}

impl From<reqwest::Error> for RegistryError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_status() {
            let status = err.status().map_or(0, |s| s.as_u16());
            Self::HttpError {
                status,
                message: err.to_string(),
            }
        } else {
            Self::ConnectionFailed {
                url: err
                    .url()
                    .map_or_else(|| "unknown".to_string(), ToString::to_string),
                source: err,
            }
        }
    }
}

impl From<serde_json::Error> for RegistryError {
    fn from(err: serde_json::Error) -> Self {
        Self::JsonError { source: err }
    }
}

impl RegistryError {
    /// Returns `true` for errors raised while validating settings, before
    /// any request is made.
    #[must_use]
    pub const fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::MissingSetting { .. }
                | Self::ConflictingModes
                | Self::InvalidPattern { .. }
                | Self::InvalidUrl { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_missing_setting() {
        let err = RegistryError::MissingSetting {
            flag: "domain",
            env: "CI_API_V4_URL",
        };
        assert_eq!(
            err.to_string(),
            "Missing required setting: pass --domain or set CI_API_V4_URL"
        );
    }

    #[test]
    fn test_error_display_repository_not_found() {
        let err = RegistryError::RepositoryNotFound {
            url: "https://gitlab.example.com/api/v4/projects/group%2Fapp/registry/repositories"
                .to_string(),
        };
        assert!(err.to_string().contains("group%2Fapp"));
    }

    #[test]
    fn test_is_configuration() {
        assert!(RegistryError::ConflictingModes.is_configuration());
        assert!(!RegistryError::HttpError {
            status: 500,
            message: String::new(),
        }
        .is_configuration());
    }

    #[test]
    fn test_json_error_conversion() {
        let source = serde_json::from_str::<Vec<u8>>("{").unwrap_err();
        let err: RegistryError = source.into();
        assert!(matches!(err, RegistryError::JsonError { .. }));
    }
}
