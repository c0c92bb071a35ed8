//! In-memory registry used by unit tests.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};

use crate::client::RegistryApi;
use crate::error::RegistryError;
use crate::model::{DeleteOutcome, TagDetail, TagSummary};

/// Timestamp `secs` seconds after the epoch.
pub(crate) fn at(secs: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(secs, 0).unwrap()
}

/// A request received by [`FakeRegistry`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Call {
    ResolveRepository(String),
    ListTags(String),
    FetchDetail(String),
    DeleteTag(String),
    DeleteByPattern { pattern: String, keep: usize },
}

pub(crate) struct FakeRegistry {
    repositories: Vec<u64>,
    tags: Vec<TagDetail>,
    delete_status: HashMap<String, u16>,
    bulk_status: u16,
    broken_details: HashSet<String>,
    calls: Mutex<Vec<Call>>,
}

impl FakeRegistry {
    pub(crate) fn new(repositories: Vec<u64>) -> Self {
        Self {
            repositories,
            tags: Vec::new(),
            delete_status: HashMap::new(),
            bulk_status: 202,
            broken_details: HashSet::new(),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn with_tag(mut self, name: &str, created_at: Option<DateTime<Utc>>) -> Self {
        self.tags.push(TagDetail {
            name: name.to_string(),
            created_at,
        });
        self
    }

    pub(crate) fn with_delete_status(mut self, name: &str, status: u16) -> Self {
        self.delete_status.insert(name.to_string(), status);
        self
    }

    pub(crate) const fn with_bulk_status(mut self, status: u16) -> Self {
        self.bulk_status = status;
        self
    }

    pub(crate) fn with_broken_detail(mut self, name: &str) -> Self {
        self.broken_details.insert(name.to_string());
        self
    }

    pub(crate) fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    /// Names passed to `delete_tag`, in order.
    pub(crate) fn deletes(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::DeleteTag(name) => Some(name),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl RegistryApi for FakeRegistry {
    async fn resolve_repository_id(&self, repositories_url: &str) -> Result<u64, RegistryError> {
        self.record(Call::ResolveRepository(repositories_url.to_string()));
        self.repositories
            .first()
            .copied()
            .ok_or_else(|| RegistryError::RepositoryNotFound {
                url: repositories_url.to_string(),
            })
    }

    async fn list_tags(&self, tags_url: &str) -> Result<Vec<TagSummary>, RegistryError> {
        self.record(Call::ListTags(tags_url.to_string()));
        Ok(self
            .tags
            .iter()
            .map(|t| TagSummary {
                name: t.name.clone(),
            })
            .collect())
    }

    async fn fetch_tag_detail(
        &self,
        _tags_url: &str,
        name: &str,
    ) -> Result<TagDetail, RegistryError> {
        self.record(Call::FetchDetail(name.to_string()));
        if self.broken_details.contains(name) {
            return Err(RegistryError::HttpError {
                status: 500,
                message: "internal error".to_string(),
            });
        }
        self.tags
            .iter()
            .find(|t| t.name == name)
            .cloned()
            .ok_or_else(|| RegistryError::HttpError {
                status: 404,
                message: "404 Tag Not Found".to_string(),
            })
    }

    async fn delete_tag(&self, _tags_url: &str, name: &str) -> Result<DeleteOutcome, RegistryError> {
        self.record(Call::DeleteTag(name.to_string()));
        let status = self.delete_status.get(name).copied().unwrap_or(200);
        Ok(DeleteOutcome::single(status, String::new()))
    }

    async fn delete_by_pattern(
        &self,
        _tags_url: &str,
        pattern: &str,
        keep: usize,
    ) -> Result<DeleteOutcome, RegistryError> {
        self.record(Call::DeleteByPattern {
            pattern: pattern.to_string(),
            keep,
        });
        let body = if self.bulk_status == 202 {
            String::new()
        } else {
            r#"{"message":"rejected"}"#.to_string()
        };
        Ok(DeleteOutcome::bulk(self.bulk_status, body))
    }
}
