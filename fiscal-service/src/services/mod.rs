//! Services module for fiscal-service.

pub mod database;
pub mod formatter;
pub mod gst;
pub mod memory;
pub mod metrics;
pub mod numbering;
pub mod reporting;
pub mod sequence;
pub mod store;

pub use database::Database;
pub use memory::InMemoryStore;
pub use metrics::{get_metrics, init_metrics, record_error};
pub use numbering::{IssuedNumber, NumberingRequest, NumberingService, SequenceState};
pub use reporting::{ReportSection, ReportingService, ReportingSettings};
pub use sequence::SequenceAllocator;
pub use store::{FiscalStore, FormatStore, GstDataSource, PeriodSnapshot, SequenceStore};
