//! Monthly burnup with a least-squares completion forecast

use crate::normalize::month_start;
use crate::types::{Project, Task, Timestamp};
use chrono::{Months, NaiveDate};
use serde::{Deserialize, Serialize};

/// Months shown after the month of the latest end date
pub const TRAILING_MONTHS: u32 = 3;

/// Fitted line `realized = slope × index + intercept`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Trend {
    pub slope: f64,
    pub intercept: f64,
}

impl Trend {
    pub fn at(&self, index: usize) -> f64 {
        self.slope * index as f64 + self.intercept
    }

    /// A flat or falling trend means completions have stalled
    pub fn is_stalled(&self) -> bool {
        self.slope <= 0.0
    }
}

/// Running ordinary least squares over `(x, y)` points
#[derive(Debug, Clone, Copy, Default)]
pub struct LeastSquares {
    n: f64,
    sum_x: f64,
    sum_y: f64,
    sum_xy: f64,
    sum_xx: f64,
}

impl LeastSquares {
    pub fn push(&mut self, x: f64, y: f64) {
        self.n += 1.0;
        self.sum_x += x;
        self.sum_y += y;
        self.sum_xy += x * y;
        self.sum_xx += x * x;
    }

    pub fn len(&self) -> usize {
        self.n as usize
    }

    pub fn is_empty(&self) -> bool {
        self.n == 0.0
    }

    /// Needs two points with distinct x
    pub fn fit(&self) -> Option<Trend> {
        if self.n < 2.0 {
            return None;
        }
        let denominator = self.n * self.sum_xx - self.sum_x * self.sum_x;
        if denominator == 0.0 {
            return None;
        }
        let slope = (self.n * self.sum_xy - self.sum_x * self.sum_y) / denominator;
        let intercept = (self.sum_y - slope * self.sum_x) / self.n;
        Some(Trend { slope, intercept })
    }
}

/// One month of the burnup series
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BurnupPoint {
    pub index: usize,
    /// First day of the month
    pub month: NaiveDate,
    /// Tasks planned to end by the end of the month
    pub baseline: usize,
    /// Tasks done by the end of the month; `None` for future months
    pub realized: Option<usize>,
    /// Trend projection for future months, within `0..=total_scope`
    pub forecast: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Burnup {
    /// Task count of all projects
    pub total_scope: usize,
    pub points: Vec<BurnupPoint>,
    /// Fit over the realized months, kept even when the forecast is suppressed
    pub trend: Option<Trend>,
}

impl Burnup {
    /// Forecast suppressed because realized completions are not growing
    pub fn is_stalled(&self) -> bool {
        self.trend.is_some_and(|trend| trend.is_stalled())
    }
}

fn midnight(date: NaiveDate) -> Option<Timestamp> {
    date.and_hms_opt(0, 0, 0)
}

/// Burnup over every task of `projects`, with `today` deciding which months
/// are realized and which are forecast
pub fn burnup(projects: &[Project], today: NaiveDate) -> Burnup {
    let tasks: Vec<&Task> = projects.iter().flat_map(|p| p.tasks.iter()).collect();
    let total_scope = tasks.len();

    let ends = tasks
        .iter()
        .flat_map(|task| [task.planned_end, task.actual_end])
        .flatten();
    let (Some(earliest), Some(latest)) = (ends.clone().min(), ends.max()) else {
        return Burnup {
            total_scope,
            points: Vec::new(),
            trend: None,
        };
    };

    let current_month = month_start(today);
    let Some(last_month) =
        month_start(latest.date()).checked_add_months(Months::new(TRAILING_MONTHS))
    else {
        return Burnup {
            total_scope,
            points: Vec::new(),
            trend: None,
        };
    };

    let mut points = Vec::new();
    let mut regression = LeastSquares::default();
    let mut month = month_start(earliest.date());
    while month <= last_month {
        let Some(next_month) = month.checked_add_months(Months::new(1)) else {
            break;
        };
        let Some(cutoff) = midnight(next_month) else {
            break;
        };
        let index = points.len();

        let baseline = tasks
            .iter()
            .filter(|task| task.planned_end.is_some_and(|end| end < cutoff))
            .count();
        let realized = if month <= current_month {
            let done = tasks
                .iter()
                .filter(|task| task.is_done() && task.actual_end.is_some_and(|end| end < cutoff))
                .count();
            regression.push(index as f64, done as f64);
            Some(done)
        } else {
            None
        };

        points.push(BurnupPoint {
            index,
            month,
            baseline,
            realized,
            forecast: None,
        });
        month = next_month;
    }

    let trend = regression.fit();
    if let Some(trend) = trend.filter(|trend| !trend.is_stalled()) {
        for point in points.iter_mut().filter(|p| p.realized.is_none()) {
            let projected = trend.at(point.index).round().clamp(0.0, total_scope as f64);
            point.forecast = Some(projected as usize);
        }
    }

    Burnup {
        total_scope,
        points,
        trend,
    }
}
