//! Raw cell grid of one sheet
//!
//! Rows may have different lengths; anything outside a row reads as `Cell::Empty`.

use crate::types::Timestamp;
use chrono::Timelike;
use std::ops::Range;

/// Raw value of a sheet cell
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Number(f64),
    Text(String),
    Date(Timestamp),
}

static EMPTY: Cell = Cell::Empty;

impl Cell {
    /// Empty cells and blank strings both count as empty
    pub fn is_empty(&self) -> bool {
        match self {
            Cell::Empty => true,
            Cell::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    /// Display text of the cell, untrimmed
    pub fn text(&self) -> String {
        match self {
            Cell::Empty => String::new(),
            Cell::Number(n) => n.to_string(),
            Cell::Text(s) => s.clone(),
            Cell::Date(d) if d.time().num_seconds_from_midnight() == 0 => {
                d.format("%Y-%m-%d").to_string()
            }
            Cell::Date(d) => d.format("%Y-%m-%d %H:%M:%S").to_string(),
        }
    }
}

impl From<&str> for Cell {
    fn from(s: &str) -> Self {
        Cell::Text(s.to_string())
    }
}

impl From<f64> for Cell {
    fn from(n: f64) -> Self {
        Cell::Number(n)
    }
}

/// Row-major grid of cells with bounded lookups
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Grid {
    rows: Vec<Vec<Cell>>,
}

impl Grid {
    pub fn new(rows: Vec<Vec<Cell>>) -> Self {
        Self { rows }
    }

    pub fn height(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.iter().all(|row| row.iter().all(Cell::is_empty))
    }

    pub fn row(&self, row: usize) -> &[Cell] {
        self.rows.get(row).map_or(&[], Vec::as_slice)
    }

    pub fn get(&self, row: usize, col: usize) -> &Cell {
        self.row(row).get(col).unwrap_or(&EMPTY)
    }

    /// Cells of the given rows in row-major, left-to-right order
    pub fn cells_in(&self, rows: Range<usize>) -> impl Iterator<Item = (usize, usize, &Cell)> {
        let end = rows.end.min(self.height());
        let start = rows.start.min(end);
        self.rows[start..end]
            .iter()
            .enumerate()
            .flat_map(move |(offset, row)| {
                row.iter()
                    .enumerate()
                    .map(move |(col, cell)| (start + offset, col, cell))
            })
    }

    /// All cell texts of a row joined by a space, upper-cased
    pub fn row_text_upper(&self, row: usize) -> String {
        self.row(row)
            .iter()
            .map(Cell::text)
            .collect::<Vec<_>>()
            .join(" ")
            .to_uppercase()
    }
}
