//! Portfolio analytics: KPIs, stage averages and the burnup forecast
//!
//! All functions are pure over a project slice. Filter first (see
//! `crate::filter`), then call these on the result.

mod burnup;
mod kpi;
mod stages;

pub use burnup::{burnup, Burnup, BurnupPoint, LeastSquares, Trend, TRAILING_MONTHS};
pub use kpi::{kpis, Kpis};
pub use stages::{stage_durations, StageAverage};

use crate::types::Project;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Everything the analytics layer computes for one project set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioReport {
    pub as_of: NaiveDate,
    pub kpis: Kpis,
    pub stages: Vec<StageAverage>,
    pub burnup: Burnup,
}

pub fn report(projects: &[Project], today: NaiveDate) -> PortfolioReport {
    PortfolioReport {
        as_of: today,
        kpis: kpis(projects),
        stages: stage_durations(projects),
        burnup: burnup(projects, today),
    }
}
