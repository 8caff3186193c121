//! Indian GST rules and the GSTR-1 engine.

pub mod export;
pub mod gstin;
pub mod report;
pub mod state;
pub mod tax;
pub mod uqc;

pub use export::{export_filename, render_workbook, XLSX_CONTENT_TYPE};
pub use report::{build_gstr1_report, ReportContext, DEFAULT_B2C_LARGE_THRESHOLD};
pub use tax::TaxSplit;
