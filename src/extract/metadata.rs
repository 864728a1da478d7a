//! Header metadata: project name, description, saving and team roles
//!
//! The header is free-form. Labels are found by keyword and their values are
//! read either from the same cell (`Label: value`) or from the cell to the right.
//! The first value found for a field wins, so scan order (row-major,
//! left-to-right) is the tie-break.

use crate::error::{PortfolioError, PortfolioResult};
use crate::grid::{Cell, Grid};
use crate::normalize::parse_currency;
use crate::types::Team;
use regex::Regex;
use std::collections::HashMap;
use std::ops::Range;

/// Rows scanned for header labels
pub const METADATA_ROWS: usize = 15;

/// Fixed cell holding the description in the common templates (C3)
pub const DESCRIPTION_CELL: (usize, usize) = (2, 2);

/// Values found in a sheet header; anything not found stays `None`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SheetMetadata {
    pub name: Option<String>,
    pub description: Option<String>,
    pub saving_amount: Option<f64>,
    pub team: Team,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Name,
    Description,
    Factory,
    Squad,
    Architect,
    Analyst,
    Developer,
}

/// Label keywords that may open a `Label: value` cell
const LABEL_KEYWORDS: [&str; 13] = [
    "nome do projeto",
    "projeto",
    "descrição",
    "descricao",
    "fábrica",
    "fabrica",
    "squad",
    "arquiteto",
    "arq",
    "analista",
    "af",
    "desenvol",
    "dev",
];

const NAME_KEYWORDS: &[&str] = &["nome do projeto", "projeto"];
const DESCRIPTION_KEYWORDS: &[&str] = &["descrição", "descricao"];
const FACTORY_KEYWORDS: &[&str] = &["fábrica", "fabrica"];
const SQUAD_KEYWORDS: &[&str] = &["squad"];
const ARCHITECT_KEYWORDS: &[&str] = &["arquiteto"];
const ARCHITECT_SHORT_KEYWORDS: &[&str] = &["arq"];
const ANALYST_KEYWORDS: &[&str] = &["analista"];
const ANALYST_SHORT_KEYWORDS: &[&str] = &["af", "analista"];
const DEVELOPER_KEYWORDS: &[&str] = &["desenvol"];
const DEVELOPER_SHORT_KEYWORDS: &[&str] = &["dev"];

/// Which label keywords to try for a cell, given its lower-cased text
fn keywords_for(field: Field, lower: &str) -> Option<&'static [&'static str]> {
    match field {
        Field::Name if lower.contains("projeto") => Some(NAME_KEYWORDS),
        Field::Description if lower.contains("descri") => Some(DESCRIPTION_KEYWORDS),
        Field::Factory if lower.contains("fábrica") || lower.contains("fabrica") => {
            Some(FACTORY_KEYWORDS)
        }
        Field::Squad if lower.contains("squad") => Some(SQUAD_KEYWORDS),
        Field::Architect if lower.contains("arquiteto") => Some(ARCHITECT_KEYWORDS),
        Field::Architect if lower == "arq" || lower.starts_with("arq:") => {
            Some(ARCHITECT_SHORT_KEYWORDS)
        }
        Field::Analyst if lower.contains("analista") => Some(ANALYST_KEYWORDS),
        Field::Analyst if lower == "af" || lower.starts_with("af:") => {
            Some(ANALYST_SHORT_KEYWORDS)
        }
        Field::Developer if lower.contains("desenvol") => Some(DEVELOPER_KEYWORDS),
        Field::Developer if lower.contains("dev") && !lower.contains("delivery") => {
            Some(DEVELOPER_SHORT_KEYWORDS)
        }
        _ => None,
    }
}

/// Field slot inside the metadata being filled
fn slot(meta: &mut SheetMetadata, field: Field) -> &mut Option<String> {
    match field {
        Field::Name => &mut meta.name,
        Field::Description => &mut meta.description,
        Field::Factory => &mut meta.team.factory,
        Field::Squad => &mut meta.team.squad,
        Field::Architect => &mut meta.team.architect,
        Field::Analyst => &mut meta.team.analyst,
        Field::Developer => &mut meta.team.developer,
    }
}

const FIELDS: [Field; 7] = [
    Field::Name,
    Field::Description,
    Field::Factory,
    Field::Squad,
    Field::Architect,
    Field::Analyst,
    Field::Developer,
];

/// Label-matching extractor for sheet headers
pub struct MetadataExtractor {
    same_cell: HashMap<&'static str, Regex>,
    saving_amount: Regex,
}

impl MetadataExtractor {
    pub fn new() -> PortfolioResult<Self> {
        let mut same_cell = HashMap::new();
        for keyword in LABEL_KEYWORDS {
            let pattern = format!(r"(?i)^{}[^:]*:\s*(.*)$", regex::escape(keyword));
            let regex = Regex::new(&pattern)
                .map_err(|e| PortfolioError::Pattern(format!("label '{}': {}", keyword, e)))?;
            same_cell.insert(keyword, regex);
        }
        let saving_amount = Regex::new(r"[:\s]\s*(?:R\$)?\s*(\d[\d.,]*)")
            .map_err(|e| PortfolioError::Pattern(format!("saving amount: {}", e)))?;

        Ok(Self {
            same_cell,
            saving_amount,
        })
    }

    /// Scan the header region (`rows`, clamped to the grid) for metadata
    pub fn extract(&self, grid: &Grid, rows: Range<usize>) -> SheetMetadata {
        let mut meta = SheetMetadata::default();

        for (row, col, cell) in grid.cells_in(rows) {
            let text = cell.text();
            let text = text.trim();
            if text.is_empty() {
                continue;
            }
            let lower = text.to_lowercase();

            if meta.saving_amount.is_none()
                && (lower.contains("benefício") || lower.contains("saving"))
            {
                meta.saving_amount = self.saving_value(grid, row, col, text);
            }

            for field in FIELDS {
                if slot(&mut meta, field).is_some() {
                    continue;
                }
                let Some(keywords) = keywords_for(field, &lower) else {
                    continue;
                };
                let value = keywords
                    .iter()
                    .find_map(|keyword| self.label_value(grid, row, col, text, keyword));
                *slot(&mut meta, field) = value;
            }
        }

        let (desc_row, desc_col) = DESCRIPTION_CELL;
        let description = grid.get(desc_row, desc_col);
        if !description.is_empty() {
            meta.description = Some(description.text().trim().to_string());
        }

        meta
    }

    /// `Keyword: value` in the same cell, else the right-hand neighbour when the
    /// cell is (or starts with) the keyword
    fn label_value(
        &self,
        grid: &Grid,
        row: usize,
        col: usize,
        text: &str,
        keyword: &str,
    ) -> Option<String> {
        if let Some(captures) = self.same_cell.get(keyword).and_then(|re| re.captures(text)) {
            let value = captures.get(1).map_or("", |m| m.as_str()).trim();
            if !value.is_empty() {
                return Some(value.to_string());
            }
        }

        let cleaned = text.to_lowercase().replacen(':', "", 1);
        let cleaned = cleaned.trim();
        if cleaned == keyword || cleaned.starts_with(keyword) {
            let next = grid.get(row, col + 1);
            if !next.is_empty() {
                return Some(next.text().trim().to_string());
            }
        }
        None
    }

    fn saving_value(&self, grid: &Grid, row: usize, col: usize, text: &str) -> Option<f64> {
        if let Some(amount) = self
            .saving_amount
            .captures(text)
            .and_then(|captures| captures.get(1))
        {
            return Some(parse_currency(&Cell::Text(amount.as_str().to_string())));
        }

        match grid.get(row, col + 1) {
            next @ Cell::Number(_) => Some(parse_currency(next)),
            next @ Cell::Text(s) if s.chars().any(|c| c.is_ascii_digit()) => {
                Some(parse_currency(next))
            }
            _ => None,
        }
    }
}
