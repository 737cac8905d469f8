use serde::{Deserialize, Serialize};

use crate::models::{Conclusion, RunStatus, WorkflowRun};

/// Summary counters for a set of workflow runs.
///
/// Every run lands in exactly one of `passed_runs`, `failed_runs`,
/// `in_progress_runs` or `other_runs`, so those four always add up to
/// `total_workflows`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverviewSummary {
    pub total_workflows: usize,
    pub passed_runs: usize,
    pub failed_runs: usize,
    pub in_progress_runs: usize,
    pub other_runs: usize,
    pub completed_runs: usize,
    pub success_rate: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RunClass {
    Passed,
    Failed,
    InProgress,
    Other,
}

fn classify(run: &WorkflowRun) -> RunClass {
    match (run.conclusion, run.status) {
        (Some(Conclusion::Success), _) => RunClass::Passed,
        (Some(conclusion), _) if conclusion.is_failure() => RunClass::Failed,
        (_, Some(RunStatus::Completed)) => RunClass::Other,
        _ => RunClass::InProgress,
    }
}

/// Percentage of `passed` over `completed`, rounded half away from zero.
/// Zero when nothing has completed.
fn calculate_success_rate(passed: usize, completed: usize) -> u8 {
    if completed == 0 {
        return 0;
    }
    let rate = (passed * 200 + completed) / (completed * 2);
    u8::try_from(rate.min(100)).unwrap_or(100)
}

/// Aggregates workflow runs into an [`OverviewSummary`].
pub fn summarize(runs: &[WorkflowRun]) -> OverviewSummary {
    let mut summary = OverviewSummary {
        total_workflows: runs.len(),
        ..OverviewSummary::default()
    };

    for run in runs {
        match classify(run) {
            RunClass::Passed => summary.passed_runs += 1,
            RunClass::Failed => summary.failed_runs += 1,
            RunClass::InProgress => summary.in_progress_runs += 1,
            RunClass::Other => summary.other_runs += 1,
        }
    }

    summary.completed_runs = summary.passed_runs + summary.failed_runs;
    summary.success_rate = calculate_success_rate(summary.passed_runs, summary.completed_runs);
    summary
}

/// Whether the summary saw any runs at all.
pub fn has_activity(summary: &OverviewSummary) -> bool {
    summary.total_workflows > 0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(conclusion: Option<Conclusion>, status: Option<RunStatus>) -> WorkflowRun {
        WorkflowRun {
            id: 1,
            name: Some("CI".to_string()),
            workflow_id: Some(10),
            path: Some(".github/workflows/ci.yml".to_string()),
            conclusion,
            status,
            html_url: None,
            started_at: None,
            updated_at: None,
        }
    }

    fn assert_partition(summary: &OverviewSummary) {
        assert_eq!(
            summary.passed_runs + summary.failed_runs + summary.in_progress_runs + summary.other_runs,
            summary.total_workflows
        );
        assert_eq!(summary.completed_runs, summary.passed_runs + summary.failed_runs);
        assert!(summary.success_rate <= 100);
    }

    #[test]
    fn test_summarize_empty() {
        let summary = summarize(&[]);
        assert_eq!(summary, OverviewSummary::default());
        assert_eq!(summary.success_rate, 0);
        assert!(!has_activity(&summary));
    }

    #[test]
    fn test_summarize_mixed_example() {
        let runs = vec![
            run(Some(Conclusion::Success), Some(RunStatus::Completed)),
            run(Some(Conclusion::Failure), Some(RunStatus::Completed)),
            run(None, Some(RunStatus::InProgress)),
        ];

        let summary = summarize(&runs);
        assert_eq!(
            summary,
            OverviewSummary {
                total_workflows: 3,
                passed_runs: 1,
                failed_runs: 1,
                in_progress_runs: 1,
                other_runs: 0,
                completed_runs: 2,
                success_rate: 50,
            }
        );
        assert!(has_activity(&summary));
    }

    #[test]
    fn test_cancelled_counts_as_failed() {
        let runs = vec![
            run(Some(Conclusion::Success), Some(RunStatus::Completed)),
            run(Some(Conclusion::Cancelled), Some(RunStatus::Completed)),
            run(Some(Conclusion::TimedOut), Some(RunStatus::Completed)),
            run(Some(Conclusion::ActionRequired), Some(RunStatus::Completed)),
        ];

        let summary = summarize(&runs);
        assert_eq!(summary.failed_runs, 3);
        assert_eq!(summary.completed_runs, 4);
        assert_eq!(summary.success_rate, 25);
    }

    #[test]
    fn test_other_terminal_conclusions_excluded_from_rate() {
        let runs = vec![
            run(Some(Conclusion::Success), Some(RunStatus::Completed)),
            run(Some(Conclusion::Skipped), Some(RunStatus::Completed)),
            run(Some(Conclusion::Neutral), Some(RunStatus::Completed)),
            run(None, Some(RunStatus::Completed)),
        ];

        let summary = summarize(&runs);
        assert_eq!(summary.other_runs, 3);
        assert_eq!(summary.completed_runs, 1);
        assert_eq!(summary.success_rate, 100);
        assert_partition(&summary);
    }

    #[test]
    fn test_non_completed_statuses_are_in_progress() {
        let runs = vec![
            run(None, Some(RunStatus::Queued)),
            run(None, Some(RunStatus::Waiting)),
            run(None, Some(RunStatus::Pending)),
            run(None, None),
        ];

        let summary = summarize(&runs);
        assert_eq!(summary.in_progress_runs, 4);
        assert_eq!(summary.success_rate, 0);
        assert_partition(&summary);
    }

    #[test]
    fn test_success_rate_rounds_half_away_from_zero() {
        assert_eq!(calculate_success_rate(1, 8), 13); // 12.5
        assert_eq!(calculate_success_rate(1, 3), 33); // 33.33
        assert_eq!(calculate_success_rate(2, 3), 67); // 66.67
        assert_eq!(calculate_success_rate(7, 8), 88); // 87.5
        assert_eq!(calculate_success_rate(0, 5), 0);
        assert_eq!(calculate_success_rate(5, 5), 100);
        assert_eq!(calculate_success_rate(0, 0), 0);
    }

    #[test]
    fn test_partition_holds_for_every_combination() {
        let conclusions = [
            None,
            Some(Conclusion::Success),
            Some(Conclusion::Failure),
            Some(Conclusion::Cancelled),
            Some(Conclusion::Skipped),
            Some(Conclusion::Stale),
            Some(Conclusion::Unknown),
        ];
        let statuses = [
            None,
            Some(RunStatus::Queued),
            Some(RunStatus::InProgress),
            Some(RunStatus::Completed),
            Some(RunStatus::Unknown),
        ];

        let runs: Vec<WorkflowRun> = conclusions
            .iter()
            .flat_map(|c| statuses.iter().map(move |s| run(*c, *s)))
            .collect();

        let summary = summarize(&runs);
        assert_eq!(summary.total_workflows, conclusions.len() * statuses.len());
        assert_partition(&summary);
    }

    #[test]
    fn test_summary_serializes_camel_case() {
        let value = serde_json::to_value(summarize(&[])).unwrap();
        assert_eq!(value["totalWorkflows"], 0);
        assert_eq!(value["successRate"], 0);
        assert_eq!(value["inProgressRuns"], 0);
    }
}
