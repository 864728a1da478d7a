use crate::types::{Project, Stage};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Mean days spent in one stage across the projects that went through it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageAverage {
    pub stage: String,
    pub average_days: u32,
}

/// Average stage durations in workflow order.
///
/// A project only counts toward a stage when it spent a non-zero number of
/// days there. Unknown stage labels come after the canonical ones.
pub fn stage_durations(projects: &[Project]) -> Vec<StageAverage> {
    let mut totals: BTreeMap<&str, (u64, u32)> = BTreeMap::new();
    for project in projects {
        for (stage, &days) in &project.stage_durations {
            if days == 0 {
                continue;
            }
            let (sum, count) = totals.entry(stage.as_str()).or_insert((0, 0));
            *sum += u64::from(days);
            *count += 1;
        }
    }

    let mut averages: Vec<StageAverage> = totals
        .into_iter()
        .map(|(stage, (sum, count))| StageAverage {
            stage: stage.to_string(),
            average_days: (sum as f64 / f64::from(count)).round() as u32,
        })
        .collect();
    averages.sort_by(|a, b| {
        Stage::rank(&a.stage)
            .cmp(&Stage::rank(&b.stage))
            .then_with(|| a.stage.cmp(&b.stage))
    });
    averages
}
