//! Domain models for fiscal-service.

pub mod gst;
pub mod numbering;

pub use gst::{
    B2bInvoice, B2cLargeInvoice, B2cSmallRow, CompanyGstProfileRow, DocumentSummaryRow,
    GstInvoiceLineRow, GstInvoiceRow, Gstr1Report, HsnSummaryRow, InvoiceRecord, RateItem,
    ReportHeader, ReportTotals, ReturnPeriod, SkippedRecord, SupplyType,
};
pub use numbering::{
    BranchFormat, DocumentNumberFormat, DocumentNumberFormatRow, DocumentType, ResetFrequency,
    ResolvedFormat, SequenceCounter, SequenceScope, YearFormat,
};
