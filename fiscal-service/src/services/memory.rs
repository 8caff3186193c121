//! In-process backend for tests and local runs.
//!
//! Counter updates are optimistic: read the value, yield, then swap only if
//! nobody else moved it. A lost race is reported as
//! [`FiscalError::WriteContention`], the same way Postgres reports a
//! serialization failure, so the allocator's retry path gets exercised.

use crate::error::FiscalError;
use crate::models::{
    CompanyGstProfileRow, DocumentNumberFormat, DocumentNumberFormatRow, DocumentType,
    InvoiceRecord, ReturnPeriod, SequenceCounter, SequenceScope,
};
use crate::services::store::{FiscalStore, FormatStore, GstDataSource, PeriodSnapshot, SequenceStore};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Mutex, MutexGuard};
use uuid::Uuid;

type CounterKey = (Uuid, Uuid, DocumentType, String);

#[derive(Default)]
struct State {
    formats: HashMap<(Uuid, DocumentType), DocumentNumberFormatRow>,
    counters: HashMap<CounterKey, SequenceCounter>,
    profiles: HashMap<Uuid, CompanyGstProfileRow>,
    invoices: Vec<InvoiceRecord>,
}

#[derive(Default)]
pub struct InMemoryStore {
    state: Mutex<State>,
    forced_contention: AtomicU32,
}

fn counter_key(scope: &SequenceScope) -> CounterKey {
    (
        scope.company_id,
        scope.branch_key(),
        scope.document_type,
        scope.period_key.clone(),
    )
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail the next `n` increments with contention.
    pub fn force_contention(&self, n: u32) {
        self.forced_contention.store(n, Ordering::SeqCst);
    }

    pub fn set_profile(&self, profile: CompanyGstProfileRow) -> Result<(), FiscalError> {
        self.lock()?.profiles.insert(profile.company_id, profile);
        Ok(())
    }

    pub fn add_invoice(&self, record: InvoiceRecord) -> Result<(), FiscalError> {
        self.lock()?.invoices.push(record);
        Ok(())
    }

    pub fn counters(&self) -> Result<Vec<SequenceCounter>, FiscalError> {
        Ok(self.lock()?.counters.values().cloned().collect())
    }

    fn lock(&self) -> Result<MutexGuard<'_, State>, FiscalError> {
        self.state
            .lock()
            .map_err(|_| FiscalError::Storage(anyhow::anyhow!("in-memory store poisoned")))
    }

    fn take_forced_contention(&self) -> bool {
        self.forced_contention
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }
}

#[async_trait]
impl FormatStore for InMemoryStore {
    async fn get_format(
        &self,
        company_id: Uuid,
        document_type: DocumentType,
    ) -> Result<Option<DocumentNumberFormatRow>, FiscalError> {
        Ok(self.lock()?.formats.get(&(company_id, document_type)).cloned())
    }

    async fn list_formats(
        &self,
        company_id: Uuid,
    ) -> Result<Vec<DocumentNumberFormatRow>, FiscalError> {
        let mut rows: Vec<_> = self
            .lock()?
            .formats
            .values()
            .filter(|r| r.company_id == company_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| a.document_type.cmp(&b.document_type));
        Ok(rows)
    }

    async fn upsert_format(
        &self,
        company_id: Uuid,
        document_type: DocumentType,
        format: &DocumentNumberFormat,
    ) -> Result<DocumentNumberFormatRow, FiscalError> {
        let now = Utc::now();
        let mut state = self.lock()?;
        let created_utc = state
            .formats
            .get(&(company_id, document_type))
            .map(|r| r.created_utc)
            .unwrap_or(now);
        let row = DocumentNumberFormatRow {
            company_id,
            document_type: document_type.as_str().to_string(),
            prefix: format.prefix.clone(),
            separator: format.separator.clone(),
            sequence_length: format.sequence_length,
            reset_frequency: format.sequence_reset_frequency.as_str().to_string(),
            include_branch: format.include_branch,
            branch_format: format.branch_format.as_str().to_string(),
            include_year: format.include_year,
            year_format: format.year_format.as_str().to_string(),
            include_month: format.include_month,
            include_day: format.include_day,
            created_utc,
            updated_utc: now,
        };
        state.formats.insert((company_id, document_type), row.clone());
        Ok(row)
    }
}

#[async_trait]
impl SequenceStore for InMemoryStore {
    async fn increment(&self, scope: &SequenceScope) -> Result<i64, FiscalError> {
        if self.take_forced_contention() {
            return Err(FiscalError::WriteContention(scope.to_string()));
        }

        let key = counter_key(scope);
        let observed = self.lock()?.counters.get(&key).map(|c| c.current_value);

        tokio::task::yield_now().await;

        let mut state = self.lock()?;
        let actual = state.counters.get(&key).map(|c| c.current_value);
        if actual != observed {
            return Err(FiscalError::WriteContention(scope.to_string()));
        }

        let now = Utc::now();
        let counter = state.counters.entry(key).or_insert_with(|| SequenceCounter {
            company_id: scope.company_id,
            branch_key: scope.branch_key(),
            document_type: scope.document_type.as_str().to_string(),
            period_key: scope.period_key.clone(),
            reset_frequency: scope.reset_frequency.as_str().to_string(),
            current_value: 0,
            created_utc: now,
            updated_utc: now,
        });
        counter.current_value += 1;
        counter.updated_utc = now;
        Ok(counter.current_value)
    }

    async fn current(&self, scope: &SequenceScope) -> Result<Option<SequenceCounter>, FiscalError> {
        Ok(self.lock()?.counters.get(&counter_key(scope)).cloned())
    }
}

#[async_trait]
impl GstDataSource for InMemoryStore {
    async fn load_period(
        &self,
        company_id: Uuid,
        period: ReturnPeriod,
        branch_id: Option<Uuid>,
    ) -> Result<PeriodSnapshot, FiscalError> {
        let state = self.lock()?;
        let records = state
            .invoices
            .iter()
            .filter(|r| r.invoice.company_id == company_id)
            .filter(|r| period.contains(r.invoice.invoice_date))
            .filter(|r| branch_id.is_none() || r.invoice.branch_id == branch_id)
            .cloned()
            .collect();
        Ok(PeriodSnapshot {
            profile: state.profiles.get(&company_id).cloned(),
            records,
        })
    }
}

#[async_trait]
impl FiscalStore for InMemoryStore {
    async fn health_check(&self) -> Result<(), FiscalError> {
        self.lock().map(|_| ())
    }
}
