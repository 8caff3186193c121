//! Document numbering: format lookup, scope derivation, allocation.

use crate::error::FiscalError;
use crate::models::{
    DocumentNumberFormat, DocumentType, ResolvedFormat, SequenceCounter, SequenceScope,
};
use crate::services::formatter::{self, FormatContext};
use crate::services::sequence::SequenceAllocator;
use crate::services::store::FormatStore;
use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;

/// Who is asking and for which branch.
#[derive(Debug, Clone, Copy)]
pub struct NumberingRequest<'a> {
    pub company_id: Uuid,
    pub branch_id: Option<Uuid>,
    pub branch_code: Option<&'a str>,
    pub document_type: DocumentType,
    pub date: Option<NaiveDate>,
}

/// A freshly issued document number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedNumber {
    pub document_number: String,
    pub sequence_value: i64,
    pub scope: SequenceScope,
    pub business_date: NaiveDate,
}

/// Counter state for one derived scope.
#[derive(Debug, Clone)]
pub struct SequenceState {
    pub scope: SequenceScope,
    pub business_date: NaiveDate,
    pub counter: Option<SequenceCounter>,
}

impl SequenceState {
    pub fn current_value(&self) -> i64 {
        self.counter.as_ref().map(|c| c.current_value).unwrap_or(0)
    }
}

#[derive(Clone)]
pub struct NumberingService {
    formats: Arc<dyn FormatStore>,
    allocator: SequenceAllocator,
    business_offset: FixedOffset,
}

impl NumberingService {
    pub fn new(
        formats: Arc<dyn FormatStore>,
        allocator: SequenceAllocator,
        business_offset: FixedOffset,
    ) -> Self {
        Self {
            formats,
            allocator,
            business_offset,
        }
    }

    /// Calendar date in the company's business time zone.
    pub fn business_date(&self, now: DateTime<Utc>) -> NaiveDate {
        now.with_timezone(&self.business_offset).date_naive()
    }

    #[instrument(skip(self), fields(company_id = %company_id, document_type = %document_type))]
    pub async fn get_format(
        &self,
        company_id: Uuid,
        document_type: DocumentType,
    ) -> Result<ResolvedFormat, FiscalError> {
        match self.formats.get_format(company_id, document_type).await? {
            Some(row) => Ok(ResolvedFormat {
                document_type,
                format: DocumentNumberFormat::try_from(&row)?,
                configured: true,
                updated_utc: Some(row.updated_utc),
            }),
            None => Ok(ResolvedFormat {
                document_type,
                format: DocumentNumberFormat::default_for(document_type),
                configured: false,
                updated_utc: None,
            }),
        }
    }

    /// One entry per document type, configured or default.
    #[instrument(skip(self), fields(company_id = %company_id))]
    pub async fn list_formats(&self, company_id: Uuid) -> Result<Vec<ResolvedFormat>, FiscalError> {
        let rows = self.formats.list_formats(company_id).await?;
        let mut resolved = Vec::with_capacity(DocumentType::ALL.len());
        for document_type in DocumentType::ALL {
            let entry = match rows
                .iter()
                .find(|r| r.document_type == document_type.as_str())
            {
                Some(row) => ResolvedFormat {
                    document_type,
                    format: DocumentNumberFormat::try_from(row)?,
                    configured: true,
                    updated_utc: Some(row.updated_utc),
                },
                None => ResolvedFormat {
                    document_type,
                    format: DocumentNumberFormat::default_for(document_type),
                    configured: false,
                    updated_utc: None,
                },
            };
            resolved.push(entry);
        }
        Ok(resolved)
    }

    /// Replace the format. Issued documents keep their numbers.
    #[instrument(skip(self, format), fields(company_id = %company_id, document_type = %document_type))]
    pub async fn update_format(
        &self,
        company_id: Uuid,
        document_type: DocumentType,
        format: DocumentNumberFormat,
    ) -> Result<ResolvedFormat, FiscalError> {
        formatter::validate(&format)?;
        let row = self
            .formats
            .upsert_format(company_id, document_type, &format)
            .await?;

        info!(
            reset_frequency = format.sequence_reset_frequency.as_str(),
            include_branch = format.include_branch,
            "Document number format updated"
        );

        Ok(ResolvedFormat {
            document_type,
            format,
            configured: true,
            updated_utc: Some(row.updated_utc),
        })
    }

    /// Render a sample number. Never allocates.
    #[instrument(skip(self, inline), fields(company_id = %req.company_id, document_type = %req.document_type))]
    pub async fn preview(
        &self,
        req: NumberingRequest<'_>,
        inline: Option<DocumentNumberFormat>,
        sample_sequence: Option<i64>,
    ) -> Result<String, FiscalError> {
        let format = match inline {
            Some(format) => format,
            None => self.get_format(req.company_id, req.document_type).await?.format,
        };
        let date = req.date.unwrap_or_else(|| self.business_date(Utc::now()));
        let branch_code = if format.include_branch {
            Some(req.branch_code.unwrap_or("BR"))
        } else {
            None
        };
        formatter::preview(&format, branch_code, date, sample_sequence)
    }

    /// Counter state for the scope derived from today's (or the given) date.
    #[instrument(skip(self), fields(company_id = %req.company_id, document_type = %req.document_type))]
    pub async fn current_sequence(
        &self,
        req: NumberingRequest<'_>,
    ) -> Result<SequenceState, FiscalError> {
        let format = self.get_format(req.company_id, req.document_type).await?.format;
        let business_date = req.date.unwrap_or_else(|| self.business_date(Utc::now()));
        let scope = self.scope_for(&req, &format, business_date)?;
        let counter = self.allocator.current(&scope).await?;
        Ok(SequenceState {
            scope,
            business_date,
            counter,
        })
    }

    /// Allocate the next value and render it.
    #[instrument(skip(self), fields(company_id = %req.company_id, document_type = %req.document_type))]
    pub async fn next_number(&self, req: NumberingRequest<'_>) -> Result<IssuedNumber, FiscalError> {
        let format = self.get_format(req.company_id, req.document_type).await?.format;
        formatter::validate(&format)?;

        let business_date = req.date.unwrap_or_else(|| self.business_date(Utc::now()));
        let scope = self.scope_for(&req, &format, business_date)?;
        if format.include_branch && req.branch_code.map(str::trim).unwrap_or("").is_empty() {
            return Err(FiscalError::MissingBranch(req.document_type.to_string()));
        }

        let sequence_value = self.allocator.allocate_next(&scope).await?;
        let document_number = formatter::format(
            &format,
            &FormatContext {
                branch_code: req.branch_code,
                date: business_date,
                sequence: sequence_value,
            },
        )?;

        info!(
            document_number = %document_number,
            sequence_value = sequence_value,
            "Document number issued"
        );

        Ok(IssuedNumber {
            document_number,
            sequence_value,
            scope,
            business_date,
        })
    }

    /// Branch-scoped exactly when the format renders the branch token.
    fn scope_for(
        &self,
        req: &NumberingRequest<'_>,
        format: &DocumentNumberFormat,
        date: NaiveDate,
    ) -> Result<SequenceScope, FiscalError> {
        let branch_id = if format.include_branch {
            Some(
                req.branch_id
                    .ok_or_else(|| FiscalError::MissingBranch(req.document_type.to_string()))?,
            )
        } else {
            None
        };
        Ok(SequenceScope::new(
            req.company_id,
            branch_id,
            req.document_type,
            format.sequence_reset_frequency,
            date,
        ))
    }
}
