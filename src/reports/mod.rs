//! Report aggregation and export
//!
//! Turns one month of medicine requests plus the profile list into a
//! [`ReportModel`], and renders that model as CSV or as a printable PDF.

mod age;
mod aggregate;
mod csv;
mod engine;
mod error;
mod fetch;
mod intake;
mod model;
mod period;
mod print;
mod surface;

pub use age::{age_on, classify_profiles, AgeBracket, AgeBracketCount, AgeDistribution, ProfileExclusions};
pub use aggregate::{aggregate_requests, ComplaintCount, MedicineCount, RequestAggregates, RequestExclusions};
pub use csv::{csv_filename, render_csv, CsvExport};
pub use engine::{ReportEngine, ReportRequest, ReportState};
pub use error::{ReportError, ReportResult, LOAD_FAILED_MESSAGE};
pub use fetch::{FetchError, RecordFetcher, SqliteRecordStore};
pub use intake::{Gender, SkipReason};
pub use model::{ExclusionSummary, ReportModel, ReportSummary, ReportTotals};
pub use period::{year_options, DateRange, ReportPeriod, MONTH_NAMES};
pub use print::{compose_document, load_logo, pdf_filename, print_report, render_pdf, Logo, PrintDocument, PrintOutcome};
pub use surface::{export_csv, schedule_print, ExportSurface, FileExportSurface};
