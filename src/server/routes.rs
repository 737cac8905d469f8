use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    response::Response,
    Json,
};
use log::{debug, info, warn};
use serde::Deserialize;
use serde_json::json;

use crate::error::{Result, RunboardError};
use crate::metrics::build_overview;
use crate::models::{date_or_today, RepoPath, RepositoryRecord};

use super::responses::live;
use super::state::AppState;

/// Runs a registry call on the blocking pool; file-backed stores write to disk.
async fn blocking<T, F>(call: F) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(call)
        .await
        .map_err(|e| RunboardError::Io(std::io::Error::other(e)))?
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewRepository {
    pub slug: String,
    pub display_name: Option<String>,
    pub has_config: Option<bool>,
    pub avatar_url: Option<String>,
    pub html_url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct MetricsQuery {
    pub date: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowRunsQuery {
    pub repo_path: Option<String>,
    pub date: Option<String>,
}

/// `GET /repo`
pub async fn list_repositories(State(state): State<AppState>) -> Result<Response> {
    let repositories = state.registry.list()?;
    Ok(live(StatusCode::OK, json!({ "repositories": repositories })))
}

/// `POST /repo`
///
/// Missing avatar or web URLs are filled from GitHub when possible; a failed
/// lookup does not block registration.
pub async fn add_repository(
    State(state): State<AppState>,
    payload: std::result::Result<Json<NewRepository>, JsonRejection>,
) -> Result<Response> {
    let Json(payload) =
        payload.map_err(|rejection| RunboardError::Validation(rejection.body_text()))?;
    let repo = RepoPath::parse(&payload.slug)?;
    let display_name = payload
        .display_name
        .filter(|name| !name.trim().is_empty())
        .unwrap_or_else(|| repo.name.clone());

    let mut record = RepositoryRecord {
        slug: repo.to_string(),
        display_name,
        has_config: payload.has_config.unwrap_or(false),
        avatar_url: payload.avatar_url,
        html_url: payload.html_url,
    };

    if record.avatar_url.is_none() || record.html_url.is_none() {
        match state.fetcher.repository_info(&record.slug).await {
            Ok(Some(info)) => {
                debug!("Resolved {} as {}", record.slug, info.full_name);
                record.avatar_url = record.avatar_url.or(info.avatar_url);
                record.html_url = record.html_url.or(info.html_url);
            }
            Ok(None) => debug!("GitHub has no repository {}", record.slug),
            Err(e) => warn!("Could not look up metadata for {}: {e}", record.slug),
        }
    }

    let registry = state.registry.clone();
    let stored = record.clone();
    blocking(move || registry.add(stored)).await?;
    info!("Registered repository {}", record.slug);

    Ok(live(StatusCode::CREATED, json!({ "repository": record })))
}

/// `DELETE /repo/{owner}/{name}`
pub async fn remove_repository(
    State(state): State<AppState>,
    Path((owner, name)): Path<(String, String)>,
) -> Result<Response> {
    let slug = format!("{owner}/{name}");
    let registry = state.registry.clone();
    let target = slug.clone();
    blocking(move || registry.remove(&target)).await?;
    info!("Removed repository {slug}");

    Ok(live(
        StatusCode::OK,
        json!({ "message": format!("Repository {slug} removed") }),
    ))
}

/// `GET /repo/metrics?date=YYYY-MM-DD`
pub async fn repository_metrics(
    State(state): State<AppState>,
    Query(query): Query<MetricsQuery>,
) -> Result<Response> {
    let date = date_or_today(query.date.as_deref())?;
    let repositories =
        build_overview(state.registry.as_ref(), state.fetcher.as_ref(), date).await?;

    Ok(live(StatusCode::OK, json!({ "repositories": repositories })))
}

/// `GET /repo/workflow-runs?repoPath=owner/name&date=YYYY-MM-DD`
pub async fn workflow_runs(
    State(state): State<AppState>,
    Query(query): Query<WorkflowRunsQuery>,
) -> Result<Response> {
    let repo_path = query
        .repo_path
        .filter(|p| !p.trim().is_empty())
        .ok_or_else(|| RunboardError::Validation("repoPath is required".into()))?;
    let date = date_or_today(query.date.as_deref())?;

    let runs = state.fetcher.fetch_runs(&repo_path, date).await?;

    Ok(live(StatusCode::OK, json!({ "workflow_runs": runs })))
}

/// `GET /workflow/{owner}/{name}/exists`
pub async fn workflow_exists(
    State(state): State<AppState>,
    Path((owner, name)): Path<(String, String)>,
) -> Result<Response> {
    let slug = format!("{owner}/{name}");
    let count = state.fetcher.workflow_count(&slug).await?;

    let message = if count == 0 {
        format!("No workflows found in {slug}")
    } else {
        format!("Found {count} workflow(s) in {slug}")
    };

    Ok(live(
        StatusCode::OK,
        json!({
            "hasWorkflows": count > 0,
            "workflowCount": count,
            "message": message,
        }),
    ))
}
