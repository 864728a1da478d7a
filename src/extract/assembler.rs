//! Combine header metadata and the task table into one `Project`

use super::metadata::SheetMetadata;
use super::tasks::TaskTable;
use crate::normalize::classify_status;
use crate::types::{Project, Task};
use chrono::NaiveDate;
use uuid::Uuid;

/// Where a sheet came from: the file (or other source) name plus a token that
/// separates different sources sharing a name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceIdentity {
    pub name: String,
    pub token: String,
}

impl SourceIdentity {
    pub fn new(name: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            token: token.into(),
        }
    }

    /// Token derived from the content, so the same bytes always give the same ids
    pub fn from_bytes(name: impl Into<String>, bytes: &[u8]) -> Self {
        let digest = Uuid::new_v5(&Uuid::NAMESPACE_OID, bytes).simple().to_string();
        Self::new(name, &digest[..12])
    }
}

/// Everything the assembler needs besides the extracted sheet data
#[derive(Debug, Clone, Copy)]
pub struct AssemblyContext<'a> {
    pub source: &'a SourceIdentity,
    pub sheet_name: &'a str,
    /// Reference day for deadline checks
    pub today: NaiveDate,
}

/// Composite project id: `{source}-{sheet}-{token}` with whitespace as `_`
pub fn project_id(source: &SourceIdentity, sheet_name: &str) -> String {
    let underscore = |s: &str| {
        s.split_whitespace().collect::<Vec<_>>().join("_")
    };
    format!(
        "{}-{}-{}",
        underscore(&source.name),
        underscore(sheet_name),
        source.token
    )
}

/// Mean progress over tasks with a planned end (others do not count as 0)
pub fn aggregate_progress(tasks: &[Task]) -> f64 {
    let scheduled: Vec<f64> = tasks
        .iter()
        .filter(|task| task.planned_end.is_some())
        .map(|task| task.progress_percent)
        .collect();
    if scheduled.is_empty() {
        0.0
    } else {
        scheduled.iter().sum::<f64>() / scheduled.len() as f64
    }
}

/// Build the project, or `None` when the sheet has neither a schedule nor a saving
pub fn assemble(
    meta: SheetMetadata,
    table: TaskTable,
    ctx: AssemblyContext<'_>,
) -> Option<Project> {
    let tasks = table.tasks;
    let progress = aggregate_progress(&tasks);
    let done = progress >= 99.0;

    let baseline_date = tasks.iter().filter_map(|task| task.planned_end).max();
    let start_date = tasks.iter().filter_map(|task| task.start_date).min();
    let actual_completion_date = if done {
        tasks
            .iter()
            .filter(|task| task.is_done())
            .filter_map(|task| task.actual_end)
            .max()
    } else {
        None
    };

    let saving_amount = meta.saving_amount.unwrap_or(0.0).max(0.0);
    if baseline_date.is_none() && saving_amount == 0.0 {
        return None;
    }

    let today = ctx.today.and_hms_opt(0, 0, 0);
    let is_past_deadline = !done
        && match (today, baseline_date) {
            (Some(today), Some(baseline)) => today > baseline,
            _ => false,
        };
    let status = classify_status("", progress, is_past_deadline);

    Some(Project {
        id: project_id(ctx.source, ctx.sheet_name),
        name: meta.name.unwrap_or_else(|| ctx.sheet_name.to_string()),
        description: meta.description,
        team: meta.team,
        saving_amount,
        tasks,
        stage_durations: table.stage_durations,
        start_date,
        baseline_date,
        actual_completion_date,
        status,
        progress_percent: progress,
    })
}
