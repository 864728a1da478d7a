//! Portfolio - project tracking workbooks to a normalized project portfolio
//!
//! This library reads spreadsheet workbooks where each sheet tracks one
//! project, extracts a normalized `Project` per sheet, and computes portfolio
//! analytics over the result.
//!
//! # Features
//!
//! - Tolerant header metadata extraction (squad, factory, team, saving)
//! - Two-phase task table extraction with named column roles
//! - Lenient date, currency and progress normalization
//! - Concurrent multi-file import with first-seen-wins de-duplication
//! - KPIs, stage duration averages and a least-squares burnup forecast
//!
//! # Example
//!
//! ```no_run
//! use royalbit_portfolio::analytics;
//! use royalbit_portfolio::excel::{ImportOptions, WorkbookImporter};
//!
//! let options = ImportOptions::default();
//! let today = options.today;
//! let projects = WorkbookImporter::new("carteira.xlsx", options).import()?;
//!
//! let kpis = analytics::kpis(&projects);
//! println!("Projects: {}", kpis.total_projects);
//! println!("Saving: {}", kpis.total_saving);
//!
//! let burnup = analytics::burnup(&projects, today);
//! println!("Months: {}", burnup.points.len());
//! # Ok::<(), royalbit_portfolio::error::PortfolioError>(())
//! ```

pub mod analytics;
pub mod batch;
pub mod cli;
pub mod error;
pub mod excel;
pub mod extract;
pub mod filter;
pub mod grid;
pub mod normalize;
pub mod types;

// Re-export commonly used types
pub use batch::{import_files, FileOutcome, Portfolio};
pub use error::{PortfolioError, PortfolioResult};
pub use extract::{SheetOutcome, SkipReason};
pub use filter::ProjectFilter;
pub use types::{Project, Stage, Status, Task, Team};
