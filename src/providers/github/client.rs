use log::debug;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use url::Url;

use crate::auth::Token;
use crate::error::{Result, RunboardError};
use crate::models::{DailyWindow, RepoPath};

use super::types::{GitHubRepository, GitHubWorkflowRun, WorkflowRunsResponse, WorkflowsResponse};

pub(super) const PER_PAGE: usize = 100;
const API_VERSION: &str = "2022-11-28";

/// GitHub REST API client for Actions data.
pub struct GitHubClient {
    client: Client,
    api_url: Url,
    token: Option<Token>,
}

impl GitHubClient {
    /// Create a new GitHub API client.
    ///
    /// # Arguments
    ///
    /// * `base_url` - GitHub API base URL (e.g., "https://api.github.com")
    /// * `token` - Optional GitHub personal access token
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the HTTP client cannot be built or the
    /// base URL is not a valid API root.
    pub fn new(base_url: &str, token: Option<Token>) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/vnd.github+json"),
        );
        headers.insert(
            HeaderName::from_static("x-github-api-version"),
            HeaderValue::from_static(API_VERSION),
        );

        let client = Client::builder()
            .user_agent(concat!("runboard/", env!("CARGO_PKG_VERSION")))
            .default_headers(headers)
            .build()
            .map_err(|e| RunboardError::Config(format!("Failed to create HTTP client: {e}")))?;

        let api_url = Url::parse(base_url)
            .map_err(|e| RunboardError::Config(format!("Invalid base URL: {e}")))?;

        if api_url.cannot_be_a_base() {
            return Err(RunboardError::Config(format!(
                "Invalid base URL: {base_url}"
            )));
        }

        Ok(Self {
            client,
            api_url,
            token,
        })
    }

    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }

    fn auth_request(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        if let Some(token) = &self.token {
            request.bearer_auth(token.as_str())
        } else {
            request
        }
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.api_url.clone();
        {
            let mut path = url
                .path_segments_mut()
                .map_err(|()| RunboardError::Config("Base URL cannot carry a path".into()))?;
            path.pop_if_empty().extend(segments);
        }
        Ok(url)
    }

    /// Issues an authenticated GET and decodes the JSON body.
    ///
    /// A 404 yields `Ok(None)`; 403 and every other non-success status are
    /// mapped to errors without retrying.
    async fn get_json<T: DeserializeOwned>(&self, url: Url, resource: &str) -> Result<Option<T>> {
        debug!("GET {url}");

        let response = self.auth_request(self.client.get(url)).send().await?;
        let status = response.status();

        if status == StatusCode::NOT_FOUND {
            debug!("GitHub returned 404 for {resource}");
            return Ok(None);
        }

        if status == StatusCode::FORBIDDEN {
            return Err(RunboardError::AccessDenied(resource.to_string()));
        }

        if !status.is_success() {
            return Err(RunboardError::Upstream {
                status: status.as_u16(),
            });
        }

        Ok(Some(response.json().await?))
    }

    /// Fetch one page of workflow runs created inside `window`.
    pub async fn fetch_runs_page(
        &self,
        repo: &RepoPath,
        window: &DailyWindow,
        page: usize,
    ) -> Result<Vec<GitHubWorkflowRun>> {
        let mut url = self.endpoint(&["repos", &repo.owner, &repo.name, "actions", "runs"])?;
        url.query_pairs_mut()
            .append_pair("created", &window.to_created_filter())
            .append_pair("per_page", &PER_PAGE.to_string())
            .append_pair("page", &page.to_string());

        let response: Option<WorkflowRunsResponse> =
            self.get_json(url, &repo.to_string()).await?;

        Ok(response.map(|r| r.workflow_runs).unwrap_or_default())
    }

    /// Number of workflow definitions in the repository.
    pub async fn fetch_workflow_count(&self, repo: &RepoPath) -> Result<usize> {
        let mut url = self.endpoint(&["repos", &repo.owner, &repo.name, "actions", "workflows"])?;
        url.query_pairs_mut().append_pair("per_page", "1");

        let response: Option<WorkflowsResponse> = self.get_json(url, &repo.to_string()).await?;

        Ok(response.map_or(0, |r| r.total_count))
    }

    pub async fn fetch_repository(&self, repo: &RepoPath) -> Result<Option<GitHubRepository>> {
        let url = self.endpoint(&["repos", &repo.owner, &repo.name])?;
        self.get_json(url, &repo.to_string()).await
    }
}
