use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::models::{Conclusion, RunStatus, WorkflowRun};

/// GitHub Actions workflow run, as returned by the REST API.
///
/// Only the fields the dashboard needs are decoded; anything GitHub omits or
/// sends as `null` becomes `None`.
#[derive(Debug, Clone, Deserialize)]
pub struct GitHubWorkflowRun {
    /// Unique identifier for the workflow run
    pub id: u64,
    /// Name of the workflow
    pub name: Option<String>,
    /// Identifier of the workflow definition
    pub workflow_id: Option<u64>,
    /// Path to the workflow file
    pub path: Option<String>,
    /// Lifecycle status (queued, in_progress, completed, ...)
    pub status: Option<RunStatus>,
    /// Conclusion of the run (success, failure, ...)
    pub conclusion: Option<Conclusion>,
    /// Web URL of the run
    pub html_url: Option<String>,
    /// When the run was created
    pub created_at: Option<DateTime<Utc>>,
    /// When the current attempt started
    pub run_started_at: Option<DateTime<Utc>>,
    /// When the run was last updated
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<GitHubWorkflowRun> for WorkflowRun {
    fn from(run: GitHubWorkflowRun) -> Self {
        Self {
            id: run.id,
            name: run.name,
            workflow_id: run.workflow_id,
            path: run.path,
            conclusion: run.conclusion,
            status: run.status,
            html_url: run.html_url,
            started_at: run.run_started_at,
            updated_at: run.updated_at,
        }
    }
}

/// Response from GitHub API for workflow runs.
#[derive(Debug, Deserialize)]
pub struct WorkflowRunsResponse {
    #[serde(default)]
    pub workflow_runs: Vec<GitHubWorkflowRun>,
}

/// Response from GitHub API for workflow definitions.
#[derive(Debug, Deserialize)]
pub struct WorkflowsResponse {
    #[serde(default)]
    pub total_count: usize,
}

#[derive(Debug, Deserialize)]
pub struct GitHubOwner {
    pub avatar_url: Option<String>,
}

/// Repository metadata from `GET /repos/{owner}/{repo}`.
#[derive(Debug, Deserialize)]
pub struct GitHubRepository {
    pub full_name: String,
    pub html_url: Option<String>,
    pub owner: Option<GitHubOwner>,
}
