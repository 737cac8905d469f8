use std::fmt;

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Result, RunboardError};

const WINDOW_TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3fZ";

/// Terminal outcome GitHub reports for a completed workflow run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Conclusion {
    Success,
    Failure,
    Cancelled,
    Skipped,
    TimedOut,
    ActionRequired,
    Neutral,
    Stale,
    StartupFailure,
    #[serde(other)]
    Unknown,
}

impl Conclusion {
    /// Conclusions counted as failed runs. Cancelled runs are included.
    pub fn is_failure(self) -> bool {
        matches!(
            self,
            Self::Failure | Self::TimedOut | Self::ActionRequired | Self::Cancelled
        )
    }
}

/// Lifecycle phase of a workflow run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Queued,
    InProgress,
    Completed,
    Waiting,
    Requested,
    Pending,
    #[serde(other)]
    Unknown,
}

/// A workflow run normalized from the GitHub Actions API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowRun {
    pub id: u64,
    pub name: Option<String>,
    pub workflow_id: Option<u64>,
    pub path: Option<String>,
    pub conclusion: Option<Conclusion>,
    pub status: Option<RunStatus>,
    pub html_url: Option<String>,
    pub started_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Inclusive UTC interval covering one calendar day, millisecond precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DailyWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl DailyWindow {
    pub fn for_date(date: NaiveDate) -> Self {
        let start = date.and_time(NaiveTime::MIN).and_utc();
        let end = start + Duration::days(1) - Duration::milliseconds(1);
        Self { start, end }
    }

    pub fn contains(&self, timestamp: DateTime<Utc>) -> bool {
        self.start <= timestamp && timestamp <= self.end
    }

    /// Renders the window as a GitHub `created` search qualifier.
    pub fn to_created_filter(&self) -> String {
        format!(
            "{}..{}",
            self.start.format(WINDOW_TIMESTAMP_FORMAT),
            self.end.format(WINDOW_TIMESTAMP_FORMAT)
        )
    }
}

/// A repository identifier in `owner/name` form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoPath {
    pub owner: String,
    pub name: String,
}

impl RepoPath {
    pub fn parse(value: &str) -> Result<Self> {
        let parts: Vec<&str> = value.trim().split('/').collect();
        match parts.as_slice() {
            [owner, name] if !owner.is_empty() && !name.is_empty() => Ok(Self {
                owner: (*owner).to_string(),
                name: (*name).to_string(),
            }),
            _ => Err(RunboardError::Validation(format!(
                "Repository path must be in format 'owner/repo', got '{value}'"
            ))),
        }
    }
}

impl fmt::Display for RepoPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// A tracked repository as stored in the registry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepositoryRecord {
    pub slug: String,
    pub display_name: String,
    #[serde(default)]
    pub has_config: bool,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub html_url: Option<String>,
}

impl RepositoryRecord {
    pub fn new(slug: &str, display_name: &str) -> Self {
        Self {
            slug: slug.to_string(),
            display_name: display_name.to_string(),
            has_config: false,
            avatar_url: None,
            html_url: None,
        }
    }
}

/// Parses a `YYYY-MM-DD` calendar date.
pub fn parse_date(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|e| {
        RunboardError::Validation(format!("Invalid date '{value}' (expected YYYY-MM-DD): {e}"))
    })
}

/// Parses an optional date, falling back to the current UTC day.
pub fn date_or_today(value: Option<&str>) -> Result<NaiveDate> {
    match value.filter(|v| !v.trim().is_empty()) {
        Some(value) => parse_date(value),
        None => Ok(Utc::now().date_naive()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts(value: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(value).unwrap().with_timezone(&Utc)
    }

    #[test]
    fn test_daily_window_bounds() {
        let window = DailyWindow::for_date(NaiveDate::from_ymd_opt(2024, 1, 15).unwrap());

        assert_eq!(window.start, ts("2024-01-15T00:00:00.000Z"));
        assert_eq!(window.end, ts("2024-01-15T23:59:59.999Z"));
        assert!(window.start <= window.end);
        assert_eq!(window.start.date_naive(), window.end.date_naive());
    }

    #[test]
    fn test_daily_window_contains_edges() {
        let window = DailyWindow::for_date(NaiveDate::from_ymd_opt(2024, 1, 15).unwrap());

        assert!(window.contains(ts("2024-01-15T00:00:00.000Z")));
        assert!(window.contains(ts("2024-01-15T23:59:59.999Z")));
        assert!(!window.contains(ts("2024-01-16T00:00:00.000Z")));
        assert!(!window.contains(ts("2024-01-14T23:59:59.999Z")));
    }

    #[test]
    fn test_created_filter_format() {
        let window = DailyWindow::for_date(NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());
        assert_eq!(
            window.to_created_filter(),
            "2024-02-29T00:00:00.000Z..2024-02-29T23:59:59.999Z"
        );
    }

    #[test]
    fn test_repo_path_parse() {
        let path = RepoPath::parse("octo/app").unwrap();
        assert_eq!(path.owner, "octo");
        assert_eq!(path.name, "app");
        assert_eq!(path.to_string(), "octo/app");
    }

    #[test]
    fn test_repo_path_rejects_malformed_values() {
        for value in ["", "octo", "octo/", "/app", "octo/app/extra", "/"] {
            let err = RepoPath::parse(value).unwrap_err();
            assert!(matches!(err, RunboardError::Validation(_)), "{value}");
        }
    }

    #[test]
    fn test_parse_date() {
        assert_eq!(
            parse_date("2024-01-15").unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 15).unwrap()
        );
        assert!(matches!(
            parse_date("2024-13-01"),
            Err(RunboardError::Validation(_))
        ));
        assert!(matches!(
            parse_date("yesterday"),
            Err(RunboardError::Validation(_))
        ));
    }

    #[test]
    fn test_date_or_today_defaults_blank_to_today() {
        let today = Utc::now().date_naive();
        assert_eq!(date_or_today(None).unwrap(), today);
        assert_eq!(date_or_today(Some("")).unwrap(), today);
    }

    #[test]
    fn test_conclusion_deserializes_unknown_values() {
        let conclusion: Conclusion = serde_json::from_str("\"brand_new_outcome\"").unwrap();
        assert_eq!(conclusion, Conclusion::Unknown);

        let conclusion: Conclusion = serde_json::from_str("\"timed_out\"").unwrap();
        assert_eq!(conclusion, Conclusion::TimedOut);
    }

    #[test]
    fn test_failure_set_includes_cancelled() {
        assert!(Conclusion::Cancelled.is_failure());
        assert!(Conclusion::ActionRequired.is_failure());
        assert!(!Conclusion::Success.is_failure());
        assert!(!Conclusion::Skipped.is_failure());
    }

    #[test]
    fn test_workflow_run_serializes_camel_case_with_nulls() {
        let run = WorkflowRun {
            id: 7,
            name: None,
            workflow_id: Some(3),
            path: None,
            conclusion: None,
            status: Some(RunStatus::InProgress),
            html_url: None,
            started_at: None,
            updated_at: None,
        };

        let value = serde_json::to_value(&run).unwrap();
        assert_eq!(value["workflowId"], 3);
        assert_eq!(value["status"], "in_progress");
        assert!(value["conclusion"].is_null());
        assert!(value["htmlUrl"].is_null());
    }
}
