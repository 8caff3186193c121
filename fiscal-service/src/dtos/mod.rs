//! Request and response bodies for the HTTP API.

pub mod numbering;
pub mod reports;

pub use numbering::{
    FormatListResponse, FormatRequest, FormatResponse, NextNumberRequest, NextNumberResponse,
    PreviewRequest, PreviewResponse, SequenceQuery, SequenceResponse,
};
pub use reports::{
    B2bResponse, B2cLargeResponse, B2cSmallResponse, DocumentSummaryResponse,
    HsnSummaryResponse, ReportQuery, SectionResponse,
};
