pub mod document_numbers;
pub mod reports;

use crate::error::FiscalError;
use crate::services::record_error;
use service_core::error::AppError;

/// Count the failure and convert it for the response.
pub(crate) fn fail(err: FiscalError) -> AppError {
    record_error(err.code());
    err.into()
}
