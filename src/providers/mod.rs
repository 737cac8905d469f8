mod github;
#[cfg(test)]
pub mod stub;

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::error::Result;
use crate::models::WorkflowRun;

pub use github::GitHubProvider;

/// Repository metadata used to enrich registry records.
#[derive(Debug, Clone, PartialEq)]
pub struct RepositoryInfo {
    pub full_name: String,
    pub html_url: Option<String>,
    pub avatar_url: Option<String>,
}

/// Source of workflow run data for a repository.
#[async_trait]
pub trait RunFetcher: Send + Sync {
    /// Workflow runs created in `repo_path` (`owner/repo`) on the given UTC day.
    async fn fetch_runs(&self, repo_path: &str, date: NaiveDate) -> Result<Vec<WorkflowRun>>;

    /// Number of workflow definitions in the repository; 0 when it is unknown upstream.
    async fn workflow_count(&self, repo_path: &str) -> Result<usize>;

    async fn repository_info(&self, repo_path: &str) -> Result<Option<RepositoryInfo>>;
}
