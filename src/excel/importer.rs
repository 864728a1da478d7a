//! Workbook importer: spreadsheet file → projects, one per valid sheet

use crate::error::{PortfolioError, PortfolioResult};
use crate::extract::{
    AssemblyContext, SheetExtractor, SheetOutcome, SkipReason, SourceIdentity,
};
use crate::grid::{Cell, Grid};
use crate::normalize::serial_to_timestamp;
use crate::types::Project;
use calamine::{open_workbook_auto_from_rs, Data, Range, Reader};
use chrono::NaiveDate;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Sheet names containing any of these (case-insensitive) are never projects
pub const DEFAULT_SKIP_SHEETS: [&str; 9] = [
    "feriados",
    "config",
    "instrucoes",
    "instruções",
    "menu",
    "legendas",
    "historico",
    "histórico",
    "capa",
];

/// Settings shared by every sheet of an import
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportOptions {
    /// Lower-cased deny-list fragments
    pub skip_sheets: Vec<String>,
    /// Reference day for deadline checks
    pub today: NaiveDate,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            skip_sheets: DEFAULT_SKIP_SHEETS.iter().map(|s| s.to_string()).collect(),
            today: chrono::Local::now().date_naive(),
        }
    }
}

impl ImportOptions {
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = today;
        self
    }

    /// Add deny-list fragments on top of the current ones; blanks are ignored
    pub fn with_extra_skips<I, S>(mut self, extra: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for fragment in extra {
            let fragment = fragment.as_ref().trim().to_lowercase();
            if !fragment.is_empty() && !self.skip_sheets.contains(&fragment) {
                self.skip_sheets.push(fragment);
            }
        }
        self
    }

    pub fn is_denied(&self, sheet_name: &str) -> bool {
        let lower = sheet_name.to_lowercase();
        self.skip_sheets
            .iter()
            .any(|fragment| lower.contains(fragment.as_str()))
    }
}

/// Importer for one workbook file on disk
pub struct WorkbookImporter {
    path: PathBuf,
    options: ImportOptions,
}

impl WorkbookImporter {
    pub fn new<P: AsRef<Path>>(path: P, options: ImportOptions) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            options,
        }
    }

    /// Read the file and extract its projects
    pub fn import(&self) -> PortfolioResult<Vec<Project>> {
        let bytes = std::fs::read(&self.path)?;
        import_bytes(&source_name(&self.path), bytes, &self.options)
    }
}

/// Name used in project ids: the file name, or the whole path when it has none
pub fn source_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Extract projects from workbook bytes of any format calamine detects.
///
/// Only an unreadable workbook is an error; sheets that are not projects are
/// skipped and logged.
pub fn import_bytes(
    name: &str,
    bytes: Vec<u8>,
    options: &ImportOptions,
) -> PortfolioResult<Vec<Project>> {
    let source = SourceIdentity::from_bytes(name, &bytes);
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes))
        .map_err(|e| PortfolioError::Workbook(format!("Failed to open '{}': {}", name, e)))?;
    let extractor = SheetExtractor::new()?;

    let mut projects = Vec::new();
    for sheet_name in workbook.sheet_names() {
        if options.is_denied(&sheet_name) {
            debug!(
                file = name,
                sheet = %sheet_name,
                reason = %SkipReason::DenyListed,
                "sheet skipped"
            );
            continue;
        }

        let range = match workbook.worksheet_range(&sheet_name) {
            Ok(range) => range,
            Err(e) => {
                warn!(file = name, sheet = %sheet_name, error = %e, "sheet unreadable");
                continue;
            }
        };

        let grid = grid_from_range(&range);
        let ctx = AssemblyContext {
            source: &source,
            sheet_name: &sheet_name,
            today: options.today,
        };
        match extractor.extract_sheet(&grid, ctx) {
            SheetOutcome::Project(project) => {
                debug!(file = name, sheet = %sheet_name, id = %project.id, "project extracted");
                projects.push(project);
            }
            SheetOutcome::Skipped(reason) => {
                debug!(file = name, sheet = %sheet_name, reason = %reason, "sheet skipped");
            }
        }
    }

    Ok(projects)
}

/// Grid with absolute positions: calamine ranges start at the first used
/// cell, so the offset is padded back in
pub fn grid_from_range(range: &Range<Data>) -> Grid {
    let Some((first_row, first_col)) = range.start() else {
        return Grid::default();
    };

    let mut rows: Vec<Vec<Cell>> = vec![Vec::new(); first_row as usize];
    for data_row in range.rows() {
        let mut row = vec![Cell::Empty; first_col as usize];
        row.extend(data_row.iter().map(cell_from_data));
        rows.push(row);
    }
    Grid::new(rows)
}

fn cell_from_data(data: &Data) -> Cell {
    match data {
        Data::Empty | Data::Error(_) => Cell::Empty,
        Data::String(s) | Data::DateTimeIso(s) | Data::DurationIso(s) => Cell::Text(s.clone()),
        Data::Float(f) => Cell::Number(*f),
        Data::Int(i) => Cell::Number(*i as f64),
        Data::Bool(b) => Cell::Text(b.to_string().to_uppercase()),
        Data::DateTime(dt) => {
            let serial = dt.as_f64();
            serial_to_timestamp(serial).map_or(Cell::Number(serial), Cell::Date)
        }
    }
}
