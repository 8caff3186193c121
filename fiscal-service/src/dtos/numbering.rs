use crate::error::FiscalError;
use crate::models::{
    BranchFormat, DocumentNumberFormat, DocumentType, ResetFrequency, ResolvedFormat, YearFormat,
};
use crate::services::formatter;
use crate::services::{IssuedNumber, SequenceState};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Format fields as posted by clients. Token names are checked when the
/// request is converted, so unsupported values surface as
/// `INVALID_FORMAT_CONFIG` rather than a deserialization failure.
#[derive(Debug, Clone, Deserialize)]
pub struct FormatRequest {
    #[serde(default)]
    pub prefix: String,
    #[serde(default = "default_separator")]
    pub separator: String,
    pub sequence_length: i32,
    #[serde(default = "default_reset")]
    pub sequence_reset_frequency: String,
    #[serde(default)]
    pub include_branch: bool,
    #[serde(default)]
    pub branch_format: Option<String>,
    #[serde(default)]
    pub include_year: bool,
    #[serde(default)]
    pub year_format: Option<String>,
    #[serde(default)]
    pub include_month: bool,
    #[serde(default)]
    pub include_day: bool,
}

fn default_separator() -> String {
    "-".to_string()
}

fn default_reset() -> String {
    ResetFrequency::Never.as_str().to_string()
}

impl TryFrom<FormatRequest> for DocumentNumberFormat {
    type Error = FiscalError;

    fn try_from(req: FormatRequest) -> Result<Self, Self::Error> {
        let format = DocumentNumberFormat {
            prefix: req.prefix,
            separator: req.separator,
            sequence_length: req.sequence_length,
            sequence_reset_frequency: ResetFrequency::parse(&req.sequence_reset_frequency)?,
            include_branch: req.include_branch,
            branch_format: req
                .branch_format
                .as_deref()
                .map(BranchFormat::parse)
                .transpose()?
                .unwrap_or(BranchFormat::Code),
            include_year: req.include_year,
            year_format: req
                .year_format
                .as_deref()
                .map(YearFormat::parse)
                .transpose()?
                .unwrap_or(YearFormat::FourDigit),
            include_month: req.include_month,
            include_day: req.include_day,
        };
        formatter::validate(&format)?;
        Ok(format)
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct PreviewRequest {
    pub document_type: String,
    /// Inline format; the stored one is used when absent.
    pub format: Option<FormatRequest>,
    #[validate(length(min = 1, max = 32, message = "Branch code must be 1-32 characters"))]
    pub branch_code: Option<String>,
    pub date: Option<NaiveDate>,
    #[validate(range(min = 1, message = "Sample sequence must be at least 1"))]
    pub sample_sequence: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct NextNumberRequest {
    /// Overrides the `X-Branch-Code` header.
    #[validate(length(min = 1, max = 32, message = "Branch code must be 1-32 characters"))]
    pub branch_code: Option<String>,
    /// Business date of the document; today when absent.
    pub date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SequenceQuery {
    pub date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormatResponse {
    pub document_type: DocumentType,
    pub configured: bool,
    #[serde(flatten)]
    pub format: DocumentNumberFormat,
    /// The first number this format would render today.
    pub example: Option<String>,
    pub updated_utc: Option<DateTime<Utc>>,
}

impl FormatResponse {
    pub fn new(resolved: ResolvedFormat, today: NaiveDate) -> Self {
        let branch = resolved.format.include_branch.then_some("BR");
        let example = formatter::preview(&resolved.format, branch, today, None).ok();
        Self {
            document_type: resolved.document_type,
            configured: resolved.configured,
            format: resolved.format,
            example,
            updated_utc: resolved.updated_utc,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormatListResponse {
    pub formats: Vec<FormatResponse>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreviewResponse {
    pub document_type: DocumentType,
    pub preview: String,
    pub sample_sequence: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SequenceResponse {
    pub document_type: DocumentType,
    pub company_id: Uuid,
    pub branch_id: Option<Uuid>,
    pub reset_frequency: ResetFrequency,
    pub period_key: String,
    pub business_date: NaiveDate,
    pub current_value: i64,
    pub next_value: i64,
    pub updated_utc: Option<DateTime<Utc>>,
}

impl From<SequenceState> for SequenceResponse {
    fn from(state: SequenceState) -> Self {
        let current_value = state.current_value();
        Self {
            document_type: state.scope.document_type,
            company_id: state.scope.company_id,
            branch_id: state.scope.branch_id,
            reset_frequency: state.scope.reset_frequency,
            period_key: state.scope.period_key,
            business_date: state.business_date,
            current_value,
            next_value: current_value + 1,
            updated_utc: state.counter.map(|c| c.updated_utc),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NextNumberResponse {
    pub document_type: DocumentType,
    pub document_number: String,
    pub sequence_value: i64,
    pub branch_id: Option<Uuid>,
    pub period_key: String,
    pub business_date: NaiveDate,
}

impl From<IssuedNumber> for NextNumberResponse {
    fn from(issued: IssuedNumber) -> Self {
        Self {
            document_type: issued.scope.document_type,
            document_number: issued.document_number,
            sequence_value: issued.sequence_value,
            branch_id: issued.scope.branch_id,
            period_key: issued.scope.period_key,
            business_date: issued.business_date,
        }
    }
}
