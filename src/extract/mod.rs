//! Sheet pipeline: grid → task table → header metadata → project
//!
//! Each sheet is handled on its own and either yields a `Project` or a
//! `SkipReason`. Skips are part of normal operation and are never errors.

pub mod assembler;
pub mod metadata;
pub mod tasks;

pub use assembler::{assemble, project_id, AssemblyContext, SourceIdentity};
pub use metadata::{MetadataExtractor, SheetMetadata, METADATA_ROWS};
pub use tasks::{extract_tasks, stage_for, ColumnRoles, TableScan, TaskTable};

use crate::error::PortfolioResult;
use crate::grid::Grid;
use crate::types::Project;
use std::fmt;

/// Why a sheet produced no project
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Sheet name matches the deny-list
    DenyListed,
    EmptySheet,
    NoTaskHeader,
    /// Neither a planned end date nor a saving amount
    NoScheduleOrSaving,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            SkipReason::DenyListed => "deny-listed sheet name",
            SkipReason::EmptySheet => "empty sheet",
            SkipReason::NoTaskHeader => "no task table header",
            SkipReason::NoScheduleOrSaving => "no planned dates and no saving",
        };
        write!(f, "{}", reason)
    }
}

/// Result of running the pipeline over one sheet
#[derive(Debug, Clone, PartialEq)]
pub enum SheetOutcome {
    Project(Project),
    Skipped(SkipReason),
}

/// Runs the whole pipeline for a sheet grid
pub struct SheetExtractor {
    metadata: MetadataExtractor,
}

impl SheetExtractor {
    pub fn new() -> PortfolioResult<Self> {
        Ok(Self {
            metadata: MetadataExtractor::new()?,
        })
    }

    pub fn extract_sheet(&self, grid: &Grid, ctx: AssemblyContext<'_>) -> SheetOutcome {
        if grid.is_empty() {
            return SheetOutcome::Skipped(SkipReason::EmptySheet);
        }

        let table = match extract_tasks(grid) {
            TableScan::Found(table) => table,
            TableScan::NoHeader => return SheetOutcome::Skipped(SkipReason::NoTaskHeader),
        };

        // Labels beside or below the task header still count within the first rows
        let meta = self.metadata.extract(grid, 0..METADATA_ROWS);

        match assemble(meta, table, ctx) {
            Some(project) => SheetOutcome::Project(project),
            None => SheetOutcome::Skipped(SkipReason::NoScheduleOrSaving),
        }
    }
}
