//! Storage seams used by the numbering and reporting services.
//!
//! [`Database`](super::database::Database) implements every trait against
//! Postgres; [`InMemoryStore`](super::memory::InMemoryStore) implements them
//! for tests and local runs.

use crate::error::FiscalError;
use crate::models::{
    CompanyGstProfileRow, DocumentNumberFormat, DocumentNumberFormatRow, DocumentType,
    InvoiceRecord, ReturnPeriod, SequenceCounter, SequenceScope,
};
use async_trait::async_trait;
use uuid::Uuid;

#[async_trait]
pub trait FormatStore: Send + Sync {
    async fn get_format(
        &self,
        company_id: Uuid,
        document_type: DocumentType,
    ) -> Result<Option<DocumentNumberFormatRow>, FiscalError>;

    async fn list_formats(&self, company_id: Uuid)
        -> Result<Vec<DocumentNumberFormatRow>, FiscalError>;

    /// Replace the active format for (company, document type).
    async fn upsert_format(
        &self,
        company_id: Uuid,
        document_type: DocumentType,
        format: &DocumentNumberFormat,
    ) -> Result<DocumentNumberFormatRow, FiscalError>;
}

#[async_trait]
pub trait SequenceStore: Send + Sync {
    /// Atomically add one to the counter for `scope`, creating it at 0 first,
    /// and return the new value. Contention surfaces as
    /// [`FiscalError::WriteContention`].
    async fn increment(&self, scope: &SequenceScope) -> Result<i64, FiscalError>;

    async fn current(&self, scope: &SequenceScope) -> Result<Option<SequenceCounter>, FiscalError>;
}

/// Everything the GSTR-1 engine needs for one period, read consistently.
#[derive(Debug, Clone, Default)]
pub struct PeriodSnapshot {
    pub profile: Option<CompanyGstProfileRow>,
    pub records: Vec<InvoiceRecord>,
}

#[async_trait]
pub trait GstDataSource: Send + Sync {
    async fn load_period(
        &self,
        company_id: Uuid,
        period: ReturnPeriod,
        branch_id: Option<Uuid>,
    ) -> Result<PeriodSnapshot, FiscalError>;
}

/// A backend that serves every seam.
#[async_trait]
pub trait FiscalStore: FormatStore + SequenceStore + GstDataSource {
    async fn health_check(&self) -> Result<(), FiscalError>;
}
