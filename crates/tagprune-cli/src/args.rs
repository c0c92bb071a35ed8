//! Command-line arguments.

use std::time::Duration;

use clap::Parser;
use tagprune_registry::{PruneSettings, RetentionStrategy, DEFAULT_HOLD};

/// Tagprune - delete container image tags from a GitLab registry
///
/// Deletes one tag (`--specific-tag`) or every tag matching `--regex` except
/// the `--hold` most recently created. Without either option the tags of the
/// repository are listed.
///
/// Flags take two dashes. Scripts written for the older single-dash form
/// (`-domain`, `-authToken`, `-nameSpace`, `-projectName`, `-specificTag`,
/// `-regex`, `-hold`) keep working once each flag gains a second dash, e.g.
/// `-authToken` becomes `--authToken`.
#[derive(Parser, Debug)]
#[command(name = "tagprune")]
#[command(author, version, about)]
pub struct Cli {
    /// GitLab API base URL, e.g. `https://gitlab.example.com/api/v4`
    #[arg(long, env = "CI_API_V4_URL")]
    pub domain: Option<String>,

    /// Token used to authenticate with GitLab
    #[arg(long, alias = "authToken", env = "AUTH_TOKEN", hide_env_values = true)]
    pub auth_token: Option<String>,

    /// Namespace (group path) of the project
    #[arg(long, alias = "nameSpace", env = "CI_PROJECT_NAMESPACE")]
    pub namespace: Option<String>,

    /// Name of the project
    #[arg(long, alias = "projectName", env = "CI_PROJECT_NAME")]
    pub project_name: Option<String>,

    /// Image tag to delete
    #[arg(long, alias = "specificTag")]
    pub specific_tag: Option<String>,

    /// Pattern selecting the tags subject to retention
    #[arg(long)]
    pub regex: Option<String>,

    /// Number of newest matching tags to keep
    #[arg(long, default_value_t = DEFAULT_HOLD, allow_negative_numbers = true)]
    pub hold: i64,

    /// Where retention is decided: client or server
    #[arg(long, default_value = "client")]
    pub strategy: RetentionStrategy,

    /// Print what would be deleted without deleting
    #[arg(long)]
    pub dry_run: bool,

    /// Request timeout in seconds (transport default when omitted)
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    pub timeout: Option<u64>,
}

impl Cli {
    /// Converts the parsed flags into unvalidated run settings.
    pub fn into_settings(self) -> PruneSettings {
        PruneSettings {
            domain: self.domain,
            auth_token: self.auth_token,
            namespace: self.namespace,
            project_name: self.project_name,
            specific_tag: self.specific_tag,
            regex: self.regex,
            hold: self.hold,
            strategy: self.strategy,
            dry_run: self.dry_run,
            timeout: self.timeout.map(Duration::from_secs),
        }
    }
}
