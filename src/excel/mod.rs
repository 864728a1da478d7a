//! Workbook import
//!
//! Reads xlsx, xlsm, xlsb, xls and ods workbooks through calamine and turns
//! every sheet into a `Grid` for the extraction pipeline.

mod importer;

pub use importer::{
    grid_from_range, import_bytes, source_name, ImportOptions, WorkbookImporter,
    DEFAULT_SKIP_SHEETS,
};
