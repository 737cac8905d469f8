use chrono::NaiveDate;
use futures::future::join_all;
use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::error::{Result, RunboardError};
use crate::insights::{has_activity, summarize, OverviewSummary};
use crate::models::RepositoryRecord;
use crate::providers::RunFetcher;
use crate::registry::RepositoryStore;

/// Per-repository result of a fetch-and-summarize pass.
#[derive(Debug)]
pub enum RepoOutcome {
    Summarized(OverviewSummary),
    Failed(RunboardError),
}

/// One row of the metrics overview.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepositoryOverview {
    pub slug: String,
    pub display_name: String,
    pub has_config: bool,
    pub has_workflows: bool,
    pub metrics: OverviewSummary,
}

impl RepositoryOverview {
    fn from_outcome(record: RepositoryRecord, outcome: RepoOutcome) -> Self {
        let (has_workflows, metrics) = match outcome {
            RepoOutcome::Summarized(summary) => (has_activity(&summary), summary),
            RepoOutcome::Failed(e) => {
                warn!("Showing zeroed metrics for {}: {e}", record.slug);
                (false, OverviewSummary::default())
            }
        };

        Self {
            slug: record.slug,
            display_name: record.display_name,
            has_config: record.has_config,
            has_workflows,
            metrics,
        }
    }
}

async fn summarize_repository(fetcher: &dyn RunFetcher, slug: &str, date: NaiveDate) -> RepoOutcome {
    match fetcher.fetch_runs(slug, date).await {
        Ok(runs) => RepoOutcome::Summarized(summarize(&runs)),
        Err(e) => RepoOutcome::Failed(e),
    }
}

/// Builds the metrics overview for every registered repository on `date`.
///
/// Repositories are fetched concurrently and reported in registry order. A
/// repository whose fetch fails still appears, with zeroed metrics and
/// `has_workflows = false`. A `Config` error (no token, bad base URL) is not
/// specific to one repository and fails the whole overview, as does a failure
/// to read the registry.
pub async fn build_overview(
    store: &dyn RepositoryStore,
    fetcher: &dyn RunFetcher,
    date: NaiveDate,
) -> Result<Vec<RepositoryOverview>> {
    let records = store.list()?;
    info!("Building overview for {} repositories on {date}", records.len());

    let outcomes = join_all(
        records
            .iter()
            .map(|record| summarize_repository(fetcher, &record.slug, date)),
    )
    .await;

    let failed = outcomes
        .iter()
        .filter(|o| matches!(o, RepoOutcome::Failed(_)))
        .count();
    if failed > 0 {
        warn!("{failed} of {} repositories failed to load", records.len());
    }

    let mut overview = Vec::with_capacity(records.len());
    for (record, outcome) in records.into_iter().zip(outcomes) {
        if let RepoOutcome::Failed(RunboardError::Config(message)) = outcome {
            return Err(RunboardError::Config(message));
        }
        overview.push(RepositoryOverview::from_outcome(record, outcome));
    }

    Ok(overview)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Conclusion, RunStatus};
    use crate::providers::stub::{sample_run, StubFetcher};
    use crate::providers::GitHubProvider;
    use crate::registry::MemoryRegistry;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 15).unwrap()
    }

    fn registry(slugs: &[&str]) -> MemoryRegistry {
        let registry = MemoryRegistry::new();
        for slug in slugs {
            let mut record = RepositoryRecord::new(slug, &slug.to_uppercase());
            record.has_config = slug.ends_with('a');
            registry.add(record).unwrap();
        }
        registry
    }

    #[tokio::test]
    async fn test_partial_failure_keeps_every_repository() {
        let registry = registry(&["octo/a", "octo/b", "octo/c"]);
        let fetcher = StubFetcher::default()
            .with_runs(
                "octo/a",
                vec![
                    sample_run(1, Some(Conclusion::Success), RunStatus::Completed),
                    sample_run(2, Some(Conclusion::Failure), RunStatus::Completed),
                ],
            )
            .with_upstream_error("octo/b", 500)
            .with_runs(
                "octo/c",
                vec![sample_run(3, None, RunStatus::InProgress)],
            );

        let overview = build_overview(&registry, &fetcher, date()).await.unwrap();

        assert_eq!(overview.len(), 3);
        let slugs: Vec<&str> = overview.iter().map(|o| o.slug.as_str()).collect();
        assert_eq!(slugs, vec!["octo/a", "octo/b", "octo/c"]);

        assert!(overview[0].has_workflows);
        assert_eq!(overview[0].metrics.passed_runs, 1);
        assert_eq!(overview[0].metrics.success_rate, 50);

        assert!(!overview[1].has_workflows);
        assert_eq!(overview[1].metrics, OverviewSummary::default());

        assert!(overview[2].has_workflows);
        assert_eq!(overview[2].metrics.in_progress_runs, 1);
    }

    #[tokio::test]
    async fn test_access_denied_is_isolated() {
        let registry = registry(&["octo/a", "octo/private"]);
        let fetcher = StubFetcher::default()
            .with_runs(
                "octo/a",
                vec![sample_run(1, Some(Conclusion::Success), RunStatus::Completed)],
            )
            .with_denied("octo/private");

        let overview = build_overview(&registry, &fetcher, date()).await.unwrap();

        assert_eq!(overview[0].metrics.success_rate, 100);
        assert!(!overview[1].has_workflows);
        assert_eq!(overview[1].metrics.total_workflows, 0);
    }

    #[tokio::test]
    async fn test_no_runs_today_is_not_activity() {
        let registry = registry(&["octo/quiet"]);
        let fetcher = StubFetcher::default();

        let overview = build_overview(&registry, &fetcher, date()).await.unwrap();

        assert_eq!(overview.len(), 1);
        assert!(!overview[0].has_workflows);
        assert_eq!(overview[0].metrics, OverviewSummary::default());
    }

    #[tokio::test]
    async fn test_record_fields_are_carried_through() {
        let registry = registry(&["octo/a", "octo/b"]);
        let fetcher = StubFetcher::default();

        let overview = build_overview(&registry, &fetcher, date()).await.unwrap();

        assert_eq!(overview[0].display_name, "OCTO/A");
        assert!(overview[0].has_config);
        assert!(!overview[1].has_config);
    }

    #[tokio::test]
    async fn test_fetches_requested_date_for_every_repository() {
        let registry = registry(&["octo/a", "octo/b"]);
        let fetcher = StubFetcher::default();

        build_overview(&registry, &fetcher, date()).await.unwrap();

        let mut requested = fetcher.requested();
        requested.sort();
        assert_eq!(
            requested,
            vec![
                ("octo/a".to_string(), date()),
                ("octo/b".to_string(), date()),
            ]
        );
    }

    #[tokio::test]
    async fn test_missing_token_fails_whole_overview() {
        let registry = registry(&["octo/a", "octo/b"]);
        let fetcher = GitHubProvider::new("http://127.0.0.1:9", None).unwrap();

        let err = build_overview(&registry, &fetcher, date()).await.unwrap_err();
        assert!(matches!(err, RunboardError::Config(_)));
    }

    #[tokio::test]
    async fn test_empty_registry() {
        let registry = MemoryRegistry::new();
        let fetcher = StubFetcher::default();

        let overview = build_overview(&registry, &fetcher, date()).await.unwrap();
        assert!(overview.is_empty());
    }

    #[test]
    fn test_overview_serializes_camel_case() {
        let overview = RepositoryOverview::from_outcome(
            RepositoryRecord::new("octo/app", "App"),
            RepoOutcome::Failed(RunboardError::Upstream { status: 500 }),
        );

        let value = serde_json::to_value(&overview).unwrap();
        assert_eq!(value["displayName"], "App");
        assert_eq!(value["hasWorkflows"], false);
        assert_eq!(value["metrics"]["successRate"], 0);
    }
}
