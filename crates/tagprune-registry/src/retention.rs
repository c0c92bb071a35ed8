//! Client-side tag retention.
//!
//! The newest `keep` tags matching a pattern survive; every other matching
//! tag is deleted one request at a time:
//!
//! ```text
//! list tags ─► filter by pattern ─► fetch detail (one per match)
//!           ─► sort by created_at, newest first ─► split at keep
//!           ─► delete [keep, end), continue on failure
//! ```

use regex::Regex;
use tracing::{debug, info, warn};

use crate::client::RegistryApi;
use crate::error::RegistryError;
use crate::model::TagDetail;

/// Tags split into the ones kept and the ones to delete.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RetentionPlan {
    /// Newest tags, newest first.
    pub retained: Vec<TagDetail>,

    /// Deletion candidates, newest first.
    pub candidates: Vec<TagDetail>,
}

impl RetentionPlan {
    /// Orders `details` newest first and keeps the first `keep`.
    ///
    /// The sort is stable: tags with equal creation times stay in the order
    /// they were received. Tags without a creation time rank oldest.
    ///
    /// # Examples
    ///
    /// ```
    /// use chrono::{TimeZone, Utc};
    /// use tagprune_registry::{RetentionPlan, TagDetail};
    ///
    /// let at = |s| Utc.timestamp_opt(s, 0).unwrap();
    /// let plan = RetentionPlan::compute(
    ///     vec![
    ///         TagDetail::new("v1", at(1)),
    ///         TagDetail::new("v3", at(3)),
    ///         TagDetail::new("v2", at(2)),
    ///     ],
    ///     2,
    /// );
    /// assert_eq!(plan.retained_names(), vec!["v3", "v2"]);
    /// assert_eq!(plan.candidate_names(), vec!["v1"]);
    /// ```
    #[must_use]
    pub fn compute(mut details: Vec<TagDetail>, keep: usize) -> Self {
        details.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        let candidates = details.split_off(keep.min(details.len()));
        Self {
            retained: details,
            candidates,
        }
    }

    /// Names of the retained tags.
    #[must_use]
    pub fn retained_names(&self) -> Vec<&str> {
        self.retained.iter().map(|t| t.name.as_str()).collect()
    }

    /// Names of the deletion candidates.
    #[must_use]
    pub fn candidate_names(&self) -> Vec<&str> {
        self.candidates.iter().map(|t| t.name.as_str()).collect()
    }
}

/// A tag the registry refused to delete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedDeletion {
    /// Tag name.
    pub name: String,

    /// HTTP status returned.
    pub status: u16,

    /// Response body.
    pub body: String,
}

/// Result of a retention pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PruneReport {
    /// Tags kept, newest first.
    pub retained: Vec<String>,

    /// Tags selected for deletion, newest first.
    pub candidates: Vec<String>,

    /// Tags actually deleted.
    pub deleted: Vec<String>,

    /// Tags whose deletion was rejected.
    pub failed: Vec<FailedDeletion>,

    /// No delete request was issued.
    pub dry_run: bool,
}

impl PruneReport {
    /// Whether every candidate was deleted (always `true` for a dry run).
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Runs client-side retention against a registry.
#[derive(Debug)]
pub struct RetentionSelector<'a, A: ?Sized> {
    api: &'a A,
}

impl<'a, A> RetentionSelector<'a, A>
where
    A: RegistryApi + ?Sized,
{
    /// Creates a selector using `api` for all requests.
    #[must_use]
    pub const fn new(api: &'a A) -> Self {
        Self { api }
    }

    /// Builds the retention plan for the tags of `tags_url` matching `pattern`.
    ///
    /// Details are fetched only for matching tags. The plan is built from the
    /// complete set of details; any failed request aborts planning.
    ///
    /// # Errors
    ///
    /// Returns an error if listing or any detail request fails.
    pub async fn plan(
        &self,
        tags_url: &str,
        pattern: &Regex,
        keep: usize,
    ) -> Result<RetentionPlan, RegistryError> {
        let tags = self.api.list_tags(tags_url).await?;
        let total = tags.len();

        let mut details = Vec::new();
        for tag in tags.iter().filter(|t| pattern.is_match(&t.name)) {
            details.push(self.api.fetch_tag_detail(tags_url, &tag.name).await?);
        }

        debug!(
            total,
            matched = details.len(),
            pattern = %pattern,
            "Filtered tags"
        );

        Ok(RetentionPlan::compute(details, keep))
    }

    /// Deletes every candidate of `plan`.
    ///
    /// A rejected deletion is recorded and the remaining candidates are
    /// still attempted.
    ///
    /// # Errors
    ///
    /// Returns an error if a delete request cannot be sent.
    pub async fn apply(
        &self,
        tags_url: &str,
        plan: RetentionPlan,
        dry_run: bool,
    ) -> Result<PruneReport, RegistryError> {
        let mut report = PruneReport {
            retained: plan.retained.into_iter().map(|t| t.name).collect(),
            candidates: plan.candidates.into_iter().map(|t| t.name).collect(),
            dry_run,
            ..PruneReport::default()
        };

        if dry_run {
            for name in &report.candidates {
                info!(tag = %name, "Would delete tag");
            }
            return Ok(report);
        }

        for name in &report.candidates {
            let outcome = self.api.delete_tag(tags_url, name).await?;
            if outcome.succeeded() {
                info!(tag = %name, "Deleted tag");
                report.deleted.push(name.clone());
            } else {
                warn!(tag = %name, status = outcome.status, "Tag was not deleted");
                report.failed.push(FailedDeletion {
                    name: name.clone(),
                    status: outcome.status,
                    body: outcome.body,
                });
            }
        }

        Ok(report)
    }

    /// Plans and applies retention in one go.
    ///
    /// # Errors
    ///
    /// Returns an error if any request cannot be completed.
    pub async fn run(
        &self,
        tags_url: &str,
        pattern: &Regex,
        keep: usize,
        dry_run: bool,
    ) -> Result<PruneReport, RegistryError> {
        let plan = self.plan(tags_url, pattern, keep).await?;

        info!(
            retained = plan.retained.len(),
            candidates = plan.candidates.len(),
            keep,
            "Computed retention plan"
        );

        self.apply(tags_url, plan, dry_run).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{at, Call, FakeRegistry};

    const TAGS: &str = "https://gitlab.test/api/v4/projects/g%2Fa/registry/repositories/1/tags";

    fn three_versions() -> FakeRegistry {
        FakeRegistry::new(vec![1])
            .with_tag("v1", Some(at(1)))
            .with_tag("v2", Some(at(2)))
            .with_tag("v3", Some(at(3)))
    }

    fn pattern(p: &str) -> Regex {
        Regex::new(p).unwrap()
    }

    #[test]
    fn test_compute_keeps_newest() {
        let plan = RetentionPlan::compute(
            vec![
                TagDetail::new("b", at(20)),
                TagDetail::new("a", at(10)),
                TagDetail::new("c", at(30)),
                TagDetail::new("d", at(5)),
            ],
            2,
        );
        assert_eq!(plan.retained_names(), vec!["c", "b"]);
        assert_eq!(plan.candidate_names(), vec!["a", "d"]);
    }

    #[test]
    fn test_compute_keep_exceeds_len() {
        let plan = RetentionPlan::compute(vec![TagDetail::new("a", at(1))], 5);
        assert_eq!(plan.retained_names(), vec!["a"]);
        assert!(plan.candidates.is_empty());
    }

    #[test]
    fn test_compute_keep_zero() {
        let plan = RetentionPlan::compute(
            vec![TagDetail::new("a", at(1)), TagDetail::new("b", at(2))],
            0,
        );
        assert!(plan.retained.is_empty());
        assert_eq!(plan.candidate_names(), vec!["b", "a"]);
    }

    #[test]
    fn test_compute_ties_keep_arrival_order() {
        let plan = RetentionPlan::compute(
            vec![
                TagDetail::new("first", at(7)),
                TagDetail::new("second", at(7)),
                TagDetail::new("third", at(7)),
            ],
            1,
        );
        assert_eq!(plan.retained_names(), vec!["first"]);
        assert_eq!(plan.candidate_names(), vec!["second", "third"]);
    }

    #[test]
    fn test_compute_missing_timestamp_ranks_oldest() {
        let plan = RetentionPlan::compute(
            vec![
                TagDetail {
                    name: "unknown".to_string(),
                    created_at: None,
                },
                TagDetail::new("old", at(1)),
            ],
            1,
        );
        assert_eq!(plan.retained_names(), vec!["old"]);
        assert_eq!(plan.candidate_names(), vec!["unknown"]);
    }

    #[tokio::test]
    async fn test_hold_two_deletes_oldest() {
        let api = three_versions();
        let report = RetentionSelector::new(&api)
            .run(TAGS, &pattern("v.*"), 2, false)
            .await
            .unwrap();

        assert_eq!(report.retained, vec!["v3", "v2"]);
        assert_eq!(report.deleted, vec!["v1"]);
        assert!(report.is_complete());
        assert_eq!(api.deletes(), vec!["v1"]);
    }

    #[tokio::test]
    async fn test_hold_zero_deletes_everything() {
        let api = three_versions();
        let report = RetentionSelector::new(&api)
            .run(TAGS, &pattern("v.*"), 0, false)
            .await
            .unwrap();

        assert!(report.retained.is_empty());
        assert_eq!(report.deleted, vec!["v3", "v2", "v1"]);
    }

    #[tokio::test]
    async fn test_hold_above_matches_deletes_nothing() {
        let api = three_versions();
        let report = RetentionSelector::new(&api)
            .run(TAGS, &pattern("v.*"), 3, false)
            .await
            .unwrap();

        assert_eq!(report.retained.len(), 3);
        assert!(report.candidates.is_empty());
        assert!(api.deletes().is_empty());
    }

    #[tokio::test]
    async fn test_no_match_fetches_no_details() {
        let api = three_versions();
        let report = RetentionSelector::new(&api)
            .run(TAGS, &pattern("^release-"), 0, false)
            .await
            .unwrap();

        assert!(report.candidates.is_empty());
        assert_eq!(api.calls(), vec![Call::ListTags(TAGS.to_string())]);
    }

    #[tokio::test]
    async fn test_details_only_for_matches() {
        let api = three_versions().with_tag("latest", Some(at(9)));
        RetentionSelector::new(&api)
            .plan(TAGS, &pattern("^v"), 1)
            .await
            .unwrap();

        let details: Vec<_> = api
            .calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::FetchDetail(name) => Some(name),
                _ => None,
            })
            .collect();
        assert_eq!(details, vec!["v1", "v2", "v3"]);
    }

    #[tokio::test]
    async fn test_failed_deletion_does_not_stop_others() {
        let api = three_versions().with_delete_status("v2", 403);
        let report = RetentionSelector::new(&api)
            .run(TAGS, &pattern("v"), 0, false)
            .await
            .unwrap();

        assert_eq!(report.deleted, vec!["v3", "v1"]);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].name, "v2");
        assert_eq!(report.failed[0].status, 403);
        assert!(!report.is_complete());
        assert_eq!(api.deletes(), vec!["v3", "v2", "v1"]);
    }

    #[tokio::test]
    async fn test_detail_failure_aborts_before_deleting() {
        let api = three_versions().with_broken_detail("v2");
        let result = RetentionSelector::new(&api)
            .run(TAGS, &pattern("v"), 0, false)
            .await;

        assert!(result.is_err());
        assert!(api.deletes().is_empty());
    }

    #[tokio::test]
    async fn test_dry_run_issues_no_deletes() {
        let api = three_versions();
        let report = RetentionSelector::new(&api)
            .run(TAGS, &pattern("v"), 1, true)
            .await
            .unwrap();

        assert!(report.dry_run);
        assert_eq!(report.candidates, vec!["v2", "v1"]);
        assert!(report.deleted.is_empty());
        assert!(api.deletes().is_empty());
    }
}
