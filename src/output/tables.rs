use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, Color as TableColor, ContentArrangement, Table};

use crate::metrics::RepositoryOverview;
use crate::models::{Conclusion, RepositoryRecord, RunStatus, WorkflowRun};

/// Table and cell creation helpers
fn create_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

fn color_coded_success_cell(rate: u8, completed: usize) -> Cell {
    if completed == 0 {
        return Cell::new("-").fg(TableColor::DarkGrey);
    }

    let text = format!("{rate}%");
    if rate > 80 {
        Cell::new(text).fg(TableColor::Green)
    } else if rate >= 50 {
        Cell::new(text).fg(TableColor::Yellow)
    } else {
        Cell::new(text).fg(TableColor::Red)
    }
}

fn count_cell(count: usize, color: TableColor) -> Cell {
    if count == 0 {
        Cell::new(count)
    } else {
        Cell::new(count).fg(color)
    }
}

fn outcome_cell(run: &WorkflowRun) -> Cell {
    match (run.conclusion, run.status) {
        (Some(Conclusion::Success), _) => Cell::new("success").fg(TableColor::Green),
        (Some(conclusion), _) if conclusion.is_failure() => {
            Cell::new(enum_label(&conclusion)).fg(TableColor::Red)
        }
        (Some(conclusion), _) => Cell::new(enum_label(&conclusion)),
        (None, Some(RunStatus::Completed)) => Cell::new("completed"),
        (None, Some(status)) => Cell::new(enum_label(&status)).fg(TableColor::Yellow),
        (None, None) => Cell::new("-"),
    }
}

/// Wire name of a serde enum (e.g. `timed_out`).
fn enum_label<T: serde::Serialize>(value: &T) -> String {
    serde_json::to_value(value)
        .ok()
        .and_then(|v| v.as_str().map(ToString::to_string))
        .unwrap_or_default()
}

pub fn overview_table(overview: &[RepositoryOverview]) -> Table {
    let mut table = create_table();
    table.set_header(vec![
        "Repository",
        "Runs",
        "Passed",
        "Failed",
        "In progress",
        "Success rate",
    ]);

    for entry in overview {
        let metrics = &entry.metrics;
        let name = if entry.has_workflows {
            Cell::new(&entry.display_name)
        } else {
            Cell::new(&entry.display_name).fg(TableColor::DarkGrey)
        };

        table.add_row(vec![
            name,
            Cell::new(metrics.total_workflows),
            count_cell(metrics.passed_runs, TableColor::Green),
            count_cell(metrics.failed_runs, TableColor::Red),
            count_cell(metrics.in_progress_runs, TableColor::Yellow),
            color_coded_success_cell(metrics.success_rate, metrics.completed_runs),
        ]);
    }

    table
}

pub fn repositories_table(records: &[RepositoryRecord]) -> Table {
    let mut table = create_table();
    table.set_header(vec!["Slug", "Name", "Config", "URL"]);

    for record in records {
        table.add_row(vec![
            Cell::new(&record.slug),
            Cell::new(&record.display_name),
            Cell::new(if record.has_config { "yes" } else { "no" }),
            Cell::new(record.html_url.as_deref().unwrap_or("-")),
        ]);
    }

    table
}

pub fn runs_table(runs: &[WorkflowRun]) -> Table {
    let mut table = create_table();
    table.set_header(vec!["Run", "Workflow", "Outcome", "Started", "URL"]);

    for run in runs {
        table.add_row(vec![
            Cell::new(run.id),
            Cell::new(run.name.as_deref().unwrap_or("-")),
            outcome_cell(run),
            Cell::new(
                run.started_at
                    .map(|t| t.format("%H:%M:%S").to_string())
                    .unwrap_or_else(|| "-".to_string()),
            ),
            Cell::new(run.html_url.as_deref().unwrap_or("-")),
        ]);
    }

    table
}
