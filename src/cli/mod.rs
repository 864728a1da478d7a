//! CLI command handlers

pub mod commands;

pub use commands::{import, list, report};

use crate::types::Status;

/// Output rendering for `report` and `list`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Colored human-readable summary
    #[default]
    Text,
    Yaml,
    Json,
}

/// Parse a `--status` value by its Portuguese label
pub fn parse_status(label: &str) -> Result<Status, String> {
    Status::from_label(label).ok_or_else(|| {
        let known: Vec<&str> = Status::ALL.iter().map(|s| s.label()).collect();
        format!("unknown status '{}' (expected one of: {})", label, known.join(", "))
    })
}
