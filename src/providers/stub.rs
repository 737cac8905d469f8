//! In-memory [`RunFetcher`] for exercising the composition and HTTP layers.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::error::{Result, RunboardError};
use crate::models::{Conclusion, RepoPath, RunStatus, WorkflowRun};

use super::{RepositoryInfo, RunFetcher};

enum StubResponse {
    Runs(Vec<WorkflowRun>),
    Denied,
    Upstream(u16),
}

#[derive(Default)]
pub struct StubFetcher {
    responses: HashMap<String, StubResponse>,
    workflow_counts: HashMap<String, usize>,
    requested: Mutex<Vec<(String, NaiveDate)>>,
}

impl StubFetcher {
    pub fn with_runs(mut self, repo: &str, runs: Vec<WorkflowRun>) -> Self {
        self.responses.insert(repo.to_string(), StubResponse::Runs(runs));
        self
    }

    pub fn with_denied(mut self, repo: &str) -> Self {
        self.responses.insert(repo.to_string(), StubResponse::Denied);
        self
    }

    pub fn with_upstream_error(mut self, repo: &str, status: u16) -> Self {
        self.responses
            .insert(repo.to_string(), StubResponse::Upstream(status));
        self
    }

    pub fn with_workflows(mut self, repo: &str, count: usize) -> Self {
        self.workflow_counts.insert(repo.to_string(), count);
        self
    }

    /// `(repo, date)` pairs passed to `fetch_runs`, in call order.
    pub fn requested(&self) -> Vec<(String, NaiveDate)> {
        self.requested.lock().unwrap().clone()
    }
}

pub fn sample_run(id: u64, conclusion: Option<Conclusion>, status: RunStatus) -> WorkflowRun {
    WorkflowRun {
        id,
        name: Some("CI".to_string()),
        workflow_id: Some(1),
        path: Some(".github/workflows/ci.yml".to_string()),
        conclusion,
        status: Some(status),
        html_url: Some(format!("https://github.com/octo/app/actions/runs/{id}")),
        started_at: None,
        updated_at: None,
    }
}

#[async_trait]
impl RunFetcher for StubFetcher {
    async fn fetch_runs(&self, repo_path: &str, date: NaiveDate) -> Result<Vec<WorkflowRun>> {
        let repo = RepoPath::parse(repo_path)?;
        self.requested
            .lock()
            .unwrap()
            .push((repo.to_string(), date));

        match self.responses.get(repo_path) {
            Some(StubResponse::Runs(runs)) => Ok(runs.clone()),
            Some(StubResponse::Denied) => Err(RunboardError::AccessDenied(repo.to_string())),
            Some(StubResponse::Upstream(status)) => Err(RunboardError::Upstream { status: *status }),
            None => Ok(Vec::new()),
        }
    }

    async fn workflow_count(&self, repo_path: &str) -> Result<usize> {
        RepoPath::parse(repo_path)?;
        match self.responses.get(repo_path) {
            Some(StubResponse::Denied) => Err(RunboardError::AccessDenied(repo_path.to_string())),
            Some(StubResponse::Upstream(status)) => Err(RunboardError::Upstream { status: *status }),
            _ => Ok(self.workflow_counts.get(repo_path).copied().unwrap_or(0)),
        }
    }

    async fn repository_info(&self, repo_path: &str) -> Result<Option<RepositoryInfo>> {
        let repo = RepoPath::parse(repo_path)?;
        match self.responses.get(repo_path) {
            Some(StubResponse::Denied) => Err(RunboardError::AccessDenied(repo.to_string())),
            Some(StubResponse::Upstream(status)) => Err(RunboardError::Upstream { status: *status }),
            _ => Ok(Some(RepositoryInfo {
                full_name: repo.to_string(),
                html_url: Some(format!("https://github.com/{repo}")),
                avatar_url: Some(format!("https://avatars.example.com/{}", repo.owner)),
            })),
        }
    }
}
