use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Point in time used across the model (midnight for day-granular sheet dates)
pub type Timestamp = NaiveDateTime;

//==============================================================================
// Status & Stage Vocabulary
//==============================================================================

/// Project (or task) status, serialized with the Portuguese labels used in the sheets
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Status {
    #[serde(rename = "Concluído")]
    Concluido,
    #[serde(rename = "Em Andamento")]
    EmAndamento,
    #[serde(rename = "Atrasado")]
    Atrasado,
    #[serde(rename = "Cancelado")]
    Cancelado,
    #[serde(rename = "Não Iniciado")]
    NaoIniciado,
}

impl Status {
    pub const ALL: [Status; 5] = [
        Status::Concluido,
        Status::EmAndamento,
        Status::Atrasado,
        Status::Cancelado,
        Status::NaoIniciado,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Status::Concluido => "Concluído",
            Status::EmAndamento => "Em Andamento",
            Status::Atrasado => "Atrasado",
            Status::Cancelado => "Cancelado",
            Status::NaoIniciado => "Não Iniciado",
        }
    }

    /// Parse a status label, ignoring case and surrounding whitespace
    pub fn from_label(label: &str) -> Option<Status> {
        let wanted = label.trim().to_lowercase();
        Status::ALL
            .into_iter()
            .find(|status| status.label().to_lowercase() == wanted)
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Canonical lifecycle stage inferred from task names
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Discovery,
    Desenvolvimento,
    Homologacao,
    Implantacao,
    Delivery,
}

impl Stage {
    /// Workflow order used when reporting stages
    pub const CANONICAL: [Stage; 5] = [
        Stage::Discovery,
        Stage::Desenvolvimento,
        Stage::Homologacao,
        Stage::Implantacao,
        Stage::Delivery,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Stage::Discovery => "Discovery",
            Stage::Desenvolvimento => "Desenvolvimento",
            Stage::Homologacao => "Homologação",
            Stage::Implantacao => "Implantação",
            Stage::Delivery => "Delivery",
        }
    }

    /// Position of a stage label in the canonical order; unknown labels sort last
    pub fn rank(label: &str) -> usize {
        Stage::CANONICAL
            .iter()
            .position(|stage| stage.label() == label)
            .unwrap_or(Stage::CANONICAL.len())
    }
}

//==============================================================================
// Normalized Model
//==============================================================================

/// One row of a project's task table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub name: String,
    pub start_date: Option<Timestamp>,
    pub planned_end: Option<Timestamp>,
    pub actual_end: Option<Timestamp>,
    pub duration_days: u32,
    /// 0..=100
    pub progress_percent: f64,
}

impl Task {
    pub fn is_done(&self) -> bool {
        self.progress_percent >= 99.0
    }
}

/// Team attributes discovered in the sheet header; each one is optional
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub factory: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub squad: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub architect: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analyst: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub developer: Option<String>,
}

/// A project assembled from one sheet.
///
/// Dates, status and progress are derived from the task list at assembly time
/// and never change afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub team: Team,
    pub saving_amount: f64,
    pub tasks: Vec<Task>,
    /// Stage label → cumulative days
    #[serde(default)]
    pub stage_durations: BTreeMap<String, u32>,
    pub start_date: Option<Timestamp>,
    pub baseline_date: Option<Timestamp>,
    pub actual_completion_date: Option<Timestamp>,
    pub status: Status,
    /// Mean task progress over tasks with a planned end
    #[serde(default)]
    pub progress_percent: f64,
}
