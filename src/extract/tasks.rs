//! Task table extraction
//!
//! Two phases over the grid: find the header row and resolve the column roles
//! once (`SearchHeader`), then read one task per data row with those roles
//! (`ParseRows`). Header detection never looks at data rows again.

use crate::grid::{Cell, Grid};
use crate::normalize::{parse_date, parse_duration, parse_progress};
use crate::types::{Stage, Task, Timestamp};
use chrono::TimeDelta;
use std::collections::BTreeMap;

/// Rows searched for the task table header
pub const HEADER_SEARCH_ROWS: usize = 20;

/// Stage keywords in priority order; the first hit decides a task's stage
pub const STAGE_KEYWORDS: [(&str, Stage); 9] = [
    ("DISCOVERY", Stage::Discovery),
    ("MAPEAMENTO", Stage::Discovery),
    ("DEV", Stage::Desenvolvimento),
    ("DESENVOLVIMENTO", Stage::Desenvolvimento),
    ("HOMOLOGAÇÃO", Stage::Homologacao),
    ("QA", Stage::Homologacao),
    ("ROLLOUT", Stage::Implantacao),
    ("IMPLANTAÇÃO", Stage::Implantacao),
    ("DELIVERY", Stage::Delivery),
];

/// Stage of a task, by name
pub fn stage_for(task_name: &str) -> Option<Stage> {
    let upper = task_name.to_uppercase();
    STAGE_KEYWORDS
        .iter()
        .find(|(keyword, _)| upper.contains(keyword))
        .map(|(_, stage)| *stage)
}

/// Column index of each role in the task table; only the name is mandatory
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnRoles {
    pub name: usize,
    pub start: Option<usize>,
    pub planned_end: Option<usize>,
    /// Second `FIM` column, when there is one
    pub actual_end: Option<usize>,
    pub duration: Option<usize>,
    pub progress: Option<usize>,
}

impl ColumnRoles {
    /// Resolve roles from the header row cells
    pub fn resolve(header: &[Cell]) -> Option<Self> {
        let labels: Vec<String> = header
            .iter()
            .map(|cell| cell.text().trim().to_uppercase())
            .collect();
        let find = |pred: &dyn Fn(&str) -> bool| labels.iter().position(|h| pred(h.as_str()));

        let name = find(&|h| h.contains("TAREFA") || h.contains("ETAPA"))?;
        let planned_end = labels.iter().position(|h| h == "FIM");
        let actual_end = labels
            .iter()
            .rposition(|h| h == "FIM")
            .filter(|last| planned_end.is_some_and(|first| *last > first));

        Some(Self {
            name,
            start: find(&|h| h.contains("INICIO") || h.contains("INÍCIO")),
            planned_end,
            actual_end,
            duration: find(&|h| h.contains("DIAS") || h.contains("DURAÇÃO")),
            progress: find(&|h| h.contains("PROGRE") || h.contains('%')),
        })
    }
}

/// Tasks and stage totals read from one sheet
#[derive(Debug, Clone, PartialEq)]
pub struct TaskTable {
    pub header_row: usize,
    pub roles: ColumnRoles,
    /// Row order
    pub tasks: Vec<Task>,
    /// Stage label → cumulative days
    pub stage_durations: BTreeMap<String, u32>,
}

/// Result of scanning a sheet for its task table
#[derive(Debug, Clone, PartialEq)]
pub enum TableScan {
    Found(TaskTable),
    /// No header row within the search bound; the sheet is not a project
    NoHeader,
}

enum ScanState {
    SearchHeader,
    ParseRows(TaskTable),
    Done(TaskTable),
}

/// Locate the task table and extract its rows
pub fn extract_tasks(grid: &Grid) -> TableScan {
    let mut state = ScanState::SearchHeader;
    loop {
        state = match state {
            ScanState::SearchHeader => match find_header(grid) {
                Some((header_row, roles)) => ScanState::ParseRows(TaskTable {
                    header_row,
                    roles,
                    tasks: Vec::new(),
                    stage_durations: BTreeMap::new(),
                }),
                None => return TableScan::NoHeader,
            },
            ScanState::ParseRows(mut table) => {
                for row in table.header_row + 1..grid.height() {
                    table.read_row(grid, row);
                }
                ScanState::Done(table)
            }
            ScanState::Done(table) => return TableScan::Found(table),
        };
    }
}

fn find_header(grid: &Grid) -> Option<(usize, ColumnRoles)> {
    let header_row = (0..HEADER_SEARCH_ROWS.min(grid.height())).find(|&row| {
        let text = grid.row_text_upper(row);
        text.contains("TAREFA") || text.contains("ETAPA")
    })?;
    let roles = ColumnRoles::resolve(grid.row(header_row))?;
    Some((header_row, roles))
}

impl TaskTable {
    fn read_row(&mut self, grid: &Grid, row: usize) {
        if grid.get(row, 0).is_empty() && grid.get(row, 1).is_empty() {
            return;
        }
        let name = grid.get(row, self.roles.name).text().trim().to_string();
        if name.is_empty() {
            return;
        }

        let date_at = |col: Option<usize>| col.and_then(|c| parse_date(grid.get(row, c)));
        let planned_end = date_at(self.roles.planned_end);
        let actual_end = date_at(self.roles.actual_end);
        let duration_days = self
            .roles
            .duration
            .map_or(0, |c| parse_duration(grid.get(row, c)));
        let progress_percent = self
            .roles
            .progress
            .map_or(0.0, |c| parse_progress(grid.get(row, c)));
        let start_date = date_at(self.roles.start)
            .or_else(|| back_computed_start(planned_end, duration_days));

        if let Some(stage) = stage_for(&name) {
            let mut days = duration_days;
            // Work with both dates but no measured duration still counts
            if days == 0 && planned_end.is_some() && start_date.is_some() {
                days = 1;
            }
            let total = self
                .stage_durations
                .entry(stage.label().to_string())
                .or_insert(0);
            *total = total.saturating_add(days);
        }

        if planned_end.is_some() {
            self.tasks.push(Task {
                name,
                start_date,
                planned_end,
                actual_end,
                duration_days,
                progress_percent,
            });
        }
    }
}

fn back_computed_start(planned_end: Option<Timestamp>, duration_days: u32) -> Option<Timestamp> {
    if duration_days == 0 {
        return None;
    }
    planned_end?.checked_sub_signed(TimeDelta::try_days(i64::from(duration_days))?)
}
