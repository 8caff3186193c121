//! Domain errors for fiscal-service and their HTTP mapping.

use axum::http::StatusCode;
use service_core::error::AppError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FiscalError {
    /// Rejected document number format, at update, preview or issue time.
    #[error("Invalid document number format: {0}")]
    InvalidFormatConfig(String),

    /// Allocation kept hitting contention and gave up.
    #[error("Sequence allocation for {scope} conflicted {attempts} times; retry the request")]
    ConcurrencyConflict { scope: String, attempts: u32 },

    /// Transient write contention on a counter row. Retried by the allocator.
    #[error("Sequence counter {0} is being updated concurrently")]
    WriteContention(String),

    #[error("Unknown UQC code: {0}")]
    UnknownUqcCode(String),

    /// Stored tax columns contradict the CGST+SGST / IGST exclusivity rule.
    #[error("Inconsistent tax data on {document_number} line {line_no}: {reason}")]
    PeriodDataInconsistency {
        document_number: String,
        line_no: i32,
        reason: String,
    },

    #[error("Invalid GSTIN '{gstin}': {reason}")]
    InvalidGstin { gstin: String, reason: String },

    #[error("Invalid place of supply: {0}")]
    InvalidPlaceOfSupply(String),

    #[error("Invalid return period: {0}")]
    InvalidPeriod(String),

    #[error("Unknown document type: {0}")]
    UnknownDocumentType(String),

    /// Branch-scoped format used without a branch in the request.
    #[error("Document type {0} is numbered per branch; X-Branch-ID and a branch code are required")]
    MissingBranch(String),

    #[error("No seller GSTIN or state code configured for company {0}")]
    MissingSellerProfile(String),

    #[error("Export failed: {0}")]
    Export(String),

    #[error("Storage error: {0}")]
    Storage(#[source] anyhow::Error),
}

impl FiscalError {
    pub fn code(&self) -> &'static str {
        match self {
            FiscalError::InvalidFormatConfig(_) => "INVALID_FORMAT_CONFIG",
            FiscalError::ConcurrencyConflict { .. } => "CONCURRENCY_CONFLICT",
            FiscalError::WriteContention(_) => "WRITE_CONTENTION",
            FiscalError::UnknownUqcCode(_) => "UNKNOWN_UQC_CODE",
            FiscalError::PeriodDataInconsistency { .. } => "PERIOD_DATA_INCONSISTENCY",
            FiscalError::InvalidGstin { .. } => "INVALID_GSTIN",
            FiscalError::InvalidPlaceOfSupply(_) => "INVALID_PLACE_OF_SUPPLY",
            FiscalError::InvalidPeriod(_) => "INVALID_PERIOD",
            FiscalError::UnknownDocumentType(_) => "UNKNOWN_DOCUMENT_TYPE",
            FiscalError::MissingBranch(_) => "MISSING_BRANCH",
            FiscalError::MissingSellerProfile(_) => "MISSING_SELLER_PROFILE",
            FiscalError::Export(_) => "EXPORT_FAILED",
            FiscalError::Storage(_) => "DATABASE_ERROR",
        }
    }

    /// Errors that only affect a single invoice; the report skips the record.
    pub fn is_record_scoped(&self) -> bool {
        matches!(
            self,
            FiscalError::InvalidGstin { .. }
                | FiscalError::InvalidPlaceOfSupply(_)
                | FiscalError::UnknownUqcCode(_)
        )
    }

    pub fn is_transient(&self) -> bool {
        matches!(self, FiscalError::WriteContention(_))
    }
}

impl From<sqlx::Error> for FiscalError {
    fn from(err: sqlx::Error) -> Self {
        FiscalError::Storage(anyhow::Error::new(err))
    }
}

impl From<rust_xlsxwriter::XlsxError> for FiscalError {
    fn from(err: rust_xlsxwriter::XlsxError) -> Self {
        FiscalError::Export(err.to_string())
    }
}

impl From<FiscalError> for AppError {
    fn from(err: FiscalError) -> Self {
        let code = err.code();
        match err {
            FiscalError::Storage(e) => AppError::DatabaseError(e),
            FiscalError::Export(msg) => {
                AppError::InternalError(anyhow::anyhow!("GSTR-1 export failed: {}", msg))
            }
            FiscalError::ConcurrencyConflict { .. } | FiscalError::WriteContention(_) => {
                AppError::domain(StatusCode::CONFLICT, code, err.to_string())
            }
            FiscalError::InvalidPeriod(_)
            | FiscalError::UnknownDocumentType(_)
            | FiscalError::MissingBranch(_)
            | FiscalError::InvalidGstin { .. }
            | FiscalError::InvalidPlaceOfSupply(_)
            | FiscalError::UnknownUqcCode(_) => {
                AppError::domain(StatusCode::BAD_REQUEST, code, err.to_string())
            }
            FiscalError::InvalidFormatConfig(_)
            | FiscalError::PeriodDataInconsistency { .. }
            | FiscalError::MissingSellerProfile(_) => {
                AppError::domain(StatusCode::UNPROCESSABLE_ENTITY, code, err.to_string())
            }
        }
    }
}
