//! Output module for exporting audit results
//!
//! This module handles:
//! - CSV export of the per-URL records
//! - Loading and printing per-site statistics

mod csv_export;
pub mod stats;

pub use csv_export::{export_csv, field_union, write_csv, MISSING};
pub use stats::{load_statistics, print_statistics, AuditStatistics};
