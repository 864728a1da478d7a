use crate::types::{Project, Status};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Portfolio headline numbers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Kpis {
    pub total_saving: f64,
    pub total_projects: usize,
    /// Only statuses that occur are present
    pub status_distribution: BTreeMap<Status, usize>,
    /// Concluded / total × 100; 0 for an empty portfolio
    pub completion_rate: f64,
}

pub fn kpis(projects: &[Project]) -> Kpis {
    let mut status_distribution = BTreeMap::new();
    for project in projects {
        *status_distribution.entry(project.status).or_insert(0) += 1;
    }

    let total_projects = projects.len();
    let concluded = status_distribution
        .get(&Status::Concluido)
        .copied()
        .unwrap_or(0);
    let completion_rate = if total_projects == 0 {
        0.0
    } else {
        concluded as f64 / total_projects as f64 * 100.0
    };

    Kpis {
        total_saving: projects.iter().map(|p| p.saving_amount).sum(),
        total_projects,
        status_distribution,
        completion_rate,
    }
}
