//! Postgres backend for fiscal-service.

use crate::error::FiscalError;
use crate::models::{
    CompanyGstProfileRow, DocumentNumberFormat, DocumentNumberFormatRow, DocumentType,
    GstInvoiceLineRow, GstInvoiceRow, InvoiceRecord, ReturnPeriod, SequenceCounter,
    SequenceScope,
};
use crate::services::metrics::DB_QUERY_DURATION;
use crate::services::store::{FiscalStore, FormatStore, GstDataSource, PeriodSnapshot, SequenceStore};
use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, info, instrument};
use uuid::Uuid;

const SERIALIZATION_FAILURE: &str = "40001";
const DEADLOCK_DETECTED: &str = "40P01";

const FORMAT_COLUMNS: &str = "company_id, document_type, prefix, separator, sequence_length, \
    reset_frequency, include_branch, branch_format, include_year, year_format, include_month, \
    include_day, created_utc, updated_utc";

/// Map a sqlx error, treating serialization failures and deadlocks as contention.
fn db_error(context: &str, err: sqlx::Error) -> FiscalError {
    if let sqlx::Error::Database(ref db_err) = err {
        if matches!(
            db_err.code().as_deref(),
            Some(SERIALIZATION_FAILURE) | Some(DEADLOCK_DETECTED)
        ) {
            return FiscalError::WriteContention(format!("{}: {}", context, db_err.message()));
        }
    }
    FiscalError::Storage(anyhow::anyhow!("{}: {}", context, err))
}

/// Database connection pool wrapper.
#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// Create a new database connection pool.
    #[instrument(skip(database_url), fields(service = "fiscal-service"))]
    pub async fn new(
        database_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self, FiscalError> {
        info!(
            max_connections = max_connections,
            min_connections = min_connections,
            "Connecting to PostgreSQL"
        );

        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .min_connections(min_connections)
            .acquire_timeout(Duration::from_secs(30))
            .idle_timeout(Duration::from_secs(600))
            .connect(database_url)
            .await
            .map_err(|e| db_error("Failed to connect", e))?;

        info!("PostgreSQL connection pool established");

        Ok(Self { pool })
    }

    /// Run database migrations.
    #[instrument(skip(self))]
    pub async fn run_migrations(&self) -> Result<(), FiscalError> {
        info!("Running database migrations");
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| FiscalError::Storage(anyhow::anyhow!("Migration failed: {}", e)))?;
        info!("Database migrations completed");
        Ok(())
    }
}

#[async_trait]
impl FiscalStore for Database {
    #[instrument(skip(self))]
    async fn health_check(&self) -> Result<(), FiscalError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["health_check"])
            .start_timer();

        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| db_error("Health check failed", e))?;

        timer.observe_duration();
        Ok(())
    }
}

// =========================================================================
// Document number formats
// =========================================================================

#[async_trait]
impl FormatStore for Database {
    #[instrument(skip(self), fields(company_id = %company_id, document_type = %document_type))]
    async fn get_format(
        &self,
        company_id: Uuid,
        document_type: DocumentType,
    ) -> Result<Option<DocumentNumberFormatRow>, FiscalError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["get_format"])
            .start_timer();

        let row = sqlx::query_as::<_, DocumentNumberFormatRow>(&format!(
            "SELECT {} FROM document_number_formats WHERE company_id = $1 AND document_type = $2",
            FORMAT_COLUMNS
        ))
        .bind(company_id)
        .bind(document_type.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("Failed to get document number format", e))?;

        timer.observe_duration();
        Ok(row)
    }

    #[instrument(skip(self), fields(company_id = %company_id))]
    async fn list_formats(
        &self,
        company_id: Uuid,
    ) -> Result<Vec<DocumentNumberFormatRow>, FiscalError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["list_formats"])
            .start_timer();

        let rows = sqlx::query_as::<_, DocumentNumberFormatRow>(&format!(
            "SELECT {} FROM document_number_formats WHERE company_id = $1 ORDER BY document_type",
            FORMAT_COLUMNS
        ))
        .bind(company_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("Failed to list document number formats", e))?;

        timer.observe_duration();
        Ok(rows)
    }

    #[instrument(skip(self, format), fields(company_id = %company_id, document_type = %document_type))]
    async fn upsert_format(
        &self,
        company_id: Uuid,
        document_type: DocumentType,
        format: &DocumentNumberFormat,
    ) -> Result<DocumentNumberFormatRow, FiscalError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["upsert_format"])
            .start_timer();

        let row = sqlx::query_as::<_, DocumentNumberFormatRow>(&format!(
            r#"
            INSERT INTO document_number_formats (company_id, document_type, prefix, separator, sequence_length, reset_frequency, include_branch, branch_format, include_year, year_format, include_month, include_day)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            ON CONFLICT (company_id, document_type) DO UPDATE SET
                prefix = EXCLUDED.prefix,
                separator = EXCLUDED.separator,
                sequence_length = EXCLUDED.sequence_length,
                reset_frequency = EXCLUDED.reset_frequency,
                include_branch = EXCLUDED.include_branch,
                branch_format = EXCLUDED.branch_format,
                include_year = EXCLUDED.include_year,
                year_format = EXCLUDED.year_format,
                include_month = EXCLUDED.include_month,
                include_day = EXCLUDED.include_day,
                updated_utc = NOW()
            RETURNING {}
            "#,
            FORMAT_COLUMNS
        ))
        .bind(company_id)
        .bind(document_type.as_str())
        .bind(&format.prefix)
        .bind(&format.separator)
        .bind(format.sequence_length)
        .bind(format.sequence_reset_frequency.as_str())
        .bind(format.include_branch)
        .bind(format.branch_format.as_str())
        .bind(format.include_year)
        .bind(format.year_format.as_str())
        .bind(format.include_month)
        .bind(format.include_day)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| db_error("Failed to save document number format", e))?;

        timer.observe_duration();
        info!("Document number format saved");

        Ok(row)
    }
}

// =========================================================================
// Sequence counters
// =========================================================================

#[async_trait]
impl SequenceStore for Database {
    #[instrument(skip(self), fields(scope = %scope))]
    async fn increment(&self, scope: &SequenceScope) -> Result<i64, FiscalError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["increment_sequence"])
            .start_timer();

        // Row-level lock on conflict serializes concurrent callers.
        let value = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO sequence_counters (company_id, branch_key, document_type, period_key, reset_frequency, current_value)
            VALUES ($1, $2, $3, $4, $5, 1)
            ON CONFLICT (company_id, branch_key, document_type, period_key) DO UPDATE SET
                current_value = sequence_counters.current_value + 1,
                updated_utc = NOW()
            RETURNING current_value
            "#,
        )
        .bind(scope.company_id)
        .bind(scope.branch_key())
        .bind(scope.document_type.as_str())
        .bind(&scope.period_key)
        .bind(scope.reset_frequency.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| db_error("Failed to increment sequence", e))?;

        timer.observe_duration();
        debug!(value = value, "Sequence incremented");

        Ok(value)
    }

    #[instrument(skip(self), fields(scope = %scope))]
    async fn current(&self, scope: &SequenceScope) -> Result<Option<SequenceCounter>, FiscalError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["get_sequence"])
            .start_timer();

        let row = sqlx::query_as::<_, SequenceCounter>(
            r#"
            SELECT company_id, branch_key, document_type, period_key, reset_frequency, current_value, created_utc, updated_utc
            FROM sequence_counters
            WHERE company_id = $1 AND branch_key = $2 AND document_type = $3 AND period_key = $4
            "#,
        )
        .bind(scope.company_id)
        .bind(scope.branch_key())
        .bind(scope.document_type.as_str())
        .bind(&scope.period_key)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("Failed to get sequence counter", e))?;

        timer.observe_duration();
        Ok(row)
    }
}

// =========================================================================
// GST read model
// =========================================================================

#[async_trait]
impl GstDataSource for Database {
    #[instrument(skip(self), fields(company_id = %company_id, fp = %period.fp()))]
    async fn load_period(
        &self,
        company_id: Uuid,
        period: ReturnPeriod,
        branch_id: Option<Uuid>,
    ) -> Result<PeriodSnapshot, FiscalError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["load_gst_period"])
            .start_timer();

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| db_error("Failed to begin transaction", e))?;

        // One snapshot for profile, invoices and lines.
        sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ, READ ONLY")
            .execute(&mut *tx)
            .await
            .map_err(|e| db_error("Failed to set snapshot isolation", e))?;

        let profile = sqlx::query_as::<_, CompanyGstProfileRow>(
            "SELECT company_id, gstin, legal_name, state_code FROM company_gst_profiles WHERE company_id = $1",
        )
        .bind(company_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| db_error("Failed to get company GST profile", e))?;

        let invoices = sqlx::query_as::<_, GstInvoiceRow>(
            r#"
            SELECT invoice_id, company_id, branch_id, document_type, document_number, sequence_value, branch_key, period_key, invoice_date, customer_name, customer_gstin, place_of_supply, invoice_value, reverse_charge, cancelled
            FROM gst_invoices
            WHERE company_id = $1
              AND invoice_date BETWEEN $2 AND $3
              AND ($4::uuid IS NULL OR branch_id = $4)
            ORDER BY invoice_date, sequence_value, document_number, invoice_id
            "#,
        )
        .bind(company_id)
        .bind(period.first_day())
        .bind(period.last_day())
        .bind(branch_id)
        .fetch_all(&mut *tx)
        .await
        .map_err(|e| db_error("Failed to load GST invoices", e))?;

        let invoice_ids: Vec<Uuid> = invoices.iter().map(|i| i.invoice_id).collect();

        let lines = sqlx::query_as::<_, GstInvoiceLineRow>(
            r#"
            SELECT line_id, invoice_id, line_no, description, hsn_code, uqc, quantity, taxable_value, tax_rate, igst_amount, cgst_amount, sgst_amount, cess_amount
            FROM gst_invoice_lines
            WHERE invoice_id = ANY($1)
            ORDER BY invoice_id, line_no, line_id
            "#,
        )
        .bind(&invoice_ids)
        .fetch_all(&mut *tx)
        .await
        .map_err(|e| db_error("Failed to load GST invoice lines", e))?;

        tx.commit()
            .await
            .map_err(|e| db_error("Failed to commit snapshot", e))?;

        let mut by_invoice: HashMap<Uuid, Vec<GstInvoiceLineRow>> = HashMap::new();
        for line in lines {
            by_invoice.entry(line.invoice_id).or_default().push(line);
        }

        let records: Vec<InvoiceRecord> = invoices
            .into_iter()
            .map(|invoice| InvoiceRecord {
                lines: by_invoice.remove(&invoice.invoice_id).unwrap_or_default(),
                invoice,
            })
            .collect();

        timer.observe_duration();
        info!(invoice_count = records.len(), "GST period loaded");

        Ok(PeriodSnapshot { profile, records })
    }
}
