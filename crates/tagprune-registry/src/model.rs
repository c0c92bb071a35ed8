//! Wire types for the GitLab container registry API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Entry of `GET /projects/:id/registry/repositories`.
///
/// Only the id is used; the remaining fields are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RepositorySummary {
    /// Registry-internal repository id.
    pub id: u64,
}

/// Entry of `GET .../repositories/:id/tags`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TagSummary {
    /// Tag name.
    pub name: String,
}

/// Response of `GET .../repositories/:id/tags/:name`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagDetail {
    /// Tag name.
    pub name: String,

    /// Creation time (RFC 3339). A missing or `null` timestamp ranks as the
    /// oldest possible tag.
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl TagDetail {
    /// Creates a tag detail with a known creation time.
    #[must_use]
    pub fn new(name: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        Self {
            name: name.into(),
            created_at: Some(created_at),
        }
    }
}

/// Body of the bulk `DELETE .../repositories/:id/tags` request.
#[derive(Debug, Clone, Serialize)]
pub(crate) struct BulkDeleteRequest<'a> {
    pub name_regex: &'a str,
    pub keep_n: usize,
}

/// Result of a delete call that reached the registry.
///
/// A non-success status is not an error: it is logged and the run goes on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteOutcome {
    /// HTTP status returned by the registry.
    pub status: u16,

    /// Response body, read in full.
    pub body: String,

    succeeded: bool,
}

impl DeleteOutcome {
    /// Outcome of deleting one tag; succeeds only on `200 OK`.
    #[must_use]
    pub const fn single(status: u16, body: String) -> Self {
        Self {
            status,
            body,
            succeeded: status == 200,
        }
    }

    /// Outcome of a bulk pattern delete; succeeds only on `202 Accepted`.
    #[must_use]
    pub const fn bulk(status: u16, body: String) -> Self {
        Self {
            status,
            body,
            succeeded: status == 202,
        }
    }

    /// Whether the registry reported success.
    #[must_use]
    pub const fn succeeded(&self) -> bool {
        self.succeeded
    }
}
