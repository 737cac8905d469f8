use async_trait::async_trait;
use chrono::NaiveDate;
use log::{debug, info, warn};

use crate::auth::Token;
use crate::error::{Result, RunboardError};
use crate::models::{DailyWindow, RepoPath, WorkflowRun};
use crate::providers::{RepositoryInfo, RunFetcher};

use super::client::{GitHubClient, PER_PAGE};

/// Hard cap on pages fetched for a single repository and day.
pub(super) const MAX_PAGES: usize = 10;

/// Provider for workflow run data from GitHub Actions.
pub struct GitHubProvider {
    client: GitHubClient,
}

impl GitHubProvider {
    /// Create a new GitHub Actions provider.
    ///
    /// A missing token is accepted here; calls that reach GitHub fail with a
    /// configuration error instead.
    ///
    /// # Arguments
    ///
    /// * `base_url` - GitHub API base URL
    /// * `token` - Optional GitHub personal access token
    pub fn new(base_url: &str, token: Option<Token>) -> Result<Self> {
        Ok(Self {
            client: GitHubClient::new(base_url, token)?,
        })
    }

    fn require_token(&self) -> Result<()> {
        if self.client.has_token() {
            Ok(())
        } else {
            Err(RunboardError::Config(
                "GitHub token is not configured (set GITHUB_TOKEN)".into(),
            ))
        }
    }
}

#[async_trait]
impl RunFetcher for GitHubProvider {
    /// Fetches every workflow run created in `repo_path` on `date` (UTC).
    ///
    /// Pages through the runs endpoint 100 at a time until a short page comes
    /// back or [`MAX_PAGES`] pages have been read. Days with more runs than
    /// that are truncated.
    ///
    /// # Errors
    ///
    /// - `Validation` if `repo_path` is not `owner/repo`
    /// - `Config` if no token is configured (checked before any request)
    /// - `AccessDenied` on 403, `Upstream` on other non-success statuses
    async fn fetch_runs(&self, repo_path: &str, date: NaiveDate) -> Result<Vec<WorkflowRun>> {
        let repo = RepoPath::parse(repo_path)?;
        self.require_token()?;

        let window = DailyWindow::for_date(date);
        let mut runs = Vec::new();
        let mut page = 1;

        loop {
            let batch = self.client.fetch_runs_page(&repo, &window, page).await?;
            let batch_len = batch.len();
            debug!("{repo}: page {page} returned {batch_len} runs");

            runs.extend(
                batch
                    .into_iter()
                    .filter(|run| run.created_at.map_or(true, |created| window.contains(created)))
                    .map(WorkflowRun::from),
            );

            if batch_len < PER_PAGE {
                break;
            }

            if page >= MAX_PAGES {
                warn!(
                    "{repo}: stopped after {MAX_PAGES} pages on {date}, results are truncated"
                );
                break;
            }

            page += 1;
        }

        info!("Fetched {} workflow runs for {repo} on {date}", runs.len());

        Ok(runs)
    }

    async fn workflow_count(&self, repo_path: &str) -> Result<usize> {
        let repo = RepoPath::parse(repo_path)?;
        self.require_token()?;

        self.client.fetch_workflow_count(&repo).await
    }

    async fn repository_info(&self, repo_path: &str) -> Result<Option<RepositoryInfo>> {
        let repo = RepoPath::parse(repo_path)?;
        self.require_token()?;

        let repository = self.client.fetch_repository(&repo).await?;

        Ok(repository.map(|r| RepositoryInfo {
            full_name: r.full_name,
            html_url: r.html_url,
            avatar_url: r.owner.and_then(|o| o.avatar_url),
        }))
    }
}
