//! Sequence allocation with bounded retry on write contention.

use crate::error::FiscalError;
use crate::models::{SequenceCounter, SequenceScope};
use crate::services::metrics::{record_allocation, record_conflict};
use crate::services::store::SequenceStore;
use service_core::retry::{retry_transient, RetryConfig, RetryError};
use std::sync::Arc;
use tracing::{info, instrument, warn};

#[derive(Clone)]
pub struct SequenceAllocator {
    store: Arc<dyn SequenceStore>,
    retry: RetryConfig,
}

impl SequenceAllocator {
    pub fn new(store: Arc<dyn SequenceStore>, retry: RetryConfig) -> Self {
        Self { store, retry }
    }

    /// Next value for `scope`, starting at 1.
    ///
    /// Values are strictly increasing per scope and never handed out twice.
    /// Gives up with [`FiscalError::ConcurrencyConflict`] once the retry
    /// budget is spent.
    #[instrument(skip(self), fields(scope = %scope))]
    pub async fn allocate_next(&self, scope: &SequenceScope) -> Result<i64, FiscalError> {
        let document_type = scope.document_type.as_str();
        let result = retry_transient(
            &self.retry,
            "allocate_sequence",
            |e: &FiscalError| {
                if e.is_transient() {
                    record_conflict(document_type);
                    true
                } else {
                    false
                }
            },
            || self.store.increment(scope),
        )
        .await;

        match result {
            Ok(value) => {
                record_allocation(document_type, "success");
                info!(value = value, "Sequence allocated");
                Ok(value)
            }
            Err(RetryError::Exhausted { attempts, last }) => {
                record_allocation(document_type, "conflict");
                warn!(attempts = attempts, error = %last, "Sequence allocation gave up");
                Err(FiscalError::ConcurrencyConflict {
                    scope: scope.to_string(),
                    attempts,
                })
            }
            Err(RetryError::Permanent(e)) => {
                record_allocation(document_type, "error");
                Err(e)
            }
        }
    }

    pub async fn current(&self, scope: &SequenceScope) -> Result<Option<SequenceCounter>, FiscalError> {
        self.store.current(scope).await
    }
}
