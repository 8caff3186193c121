//! Document numbering models.

use crate::error::FiscalError;
use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use uuid::Uuid;

/// Kinds of numbered documents issued by a company.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentType {
    JobSheet,
    Invoice,
    Estimate,
    CreditNote,
    DebitNote,
    PurchaseOrder,
    PurchaseReturn,
    PaymentReceipt,
    DeliveryChallan,
    PettyCashTransfer,
}

impl DocumentType {
    pub const ALL: [DocumentType; 10] = [
        DocumentType::JobSheet,
        DocumentType::Invoice,
        DocumentType::Estimate,
        DocumentType::CreditNote,
        DocumentType::DebitNote,
        DocumentType::PurchaseOrder,
        DocumentType::PurchaseReturn,
        DocumentType::PaymentReceipt,
        DocumentType::DeliveryChallan,
        DocumentType::PettyCashTransfer,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentType::JobSheet => "job_sheet",
            DocumentType::Invoice => "invoice",
            DocumentType::Estimate => "estimate",
            DocumentType::CreditNote => "credit_note",
            DocumentType::DebitNote => "debit_note",
            DocumentType::PurchaseOrder => "purchase_order",
            DocumentType::PurchaseReturn => "purchase_return",
            DocumentType::PaymentReceipt => "payment_receipt",
            DocumentType::DeliveryChallan => "delivery_challan",
            DocumentType::PettyCashTransfer => "petty_cash_transfer",
        }
    }

    /// Parse the path/storage form. Dashes are accepted in place of underscores.
    pub fn parse(s: &str) -> Result<Self, FiscalError> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        Self::ALL
            .iter()
            .copied()
            .find(|t| t.as_str() == normalized)
            .ok_or_else(|| FiscalError::UnknownDocumentType(s.to_string()))
    }

    /// Prefix used when a company has not configured a format.
    pub fn default_prefix(&self) -> &'static str {
        match self {
            DocumentType::JobSheet => "JS",
            DocumentType::Invoice => "INV",
            DocumentType::Estimate => "EST",
            DocumentType::CreditNote => "CN",
            DocumentType::DebitNote => "DN",
            DocumentType::PurchaseOrder => "PO",
            DocumentType::PurchaseReturn => "PR",
            DocumentType::PaymentReceipt => "RCPT",
            DocumentType::DeliveryChallan => "DC",
            DocumentType::PettyCashTransfer => "PCT",
        }
    }

    /// GSTR-1 document-summary label ("nature of document").
    pub fn gst_nature(&self) -> &'static str {
        match self {
            DocumentType::Invoice => "Invoices for outward supply",
            DocumentType::CreditNote => "Credit Note",
            DocumentType::DebitNote => "Debit Note",
            DocumentType::DeliveryChallan => "Delivery Challan for job work",
            DocumentType::PaymentReceipt => "Receipt Voucher",
            DocumentType::PurchaseReturn => "Refund Voucher",
            DocumentType::JobSheet => "Job Sheet",
            DocumentType::Estimate => "Estimate",
            DocumentType::PurchaseOrder => "Purchase Order",
            DocumentType::PettyCashTransfer => "Petty Cash Transfer",
        }
    }
}

impl fmt::Display for DocumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How often a document series restarts at 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResetFrequency {
    Never,
    Daily,
    Monthly,
    Yearly,
}

impl ResetFrequency {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResetFrequency::Never => "NEVER",
            ResetFrequency::Daily => "DAILY",
            ResetFrequency::Monthly => "MONTHLY",
            ResetFrequency::Yearly => "YEARLY",
        }
    }

    pub fn parse(s: &str) -> Result<Self, FiscalError> {
        match s.trim().to_ascii_uppercase().as_str() {
            "NEVER" => Ok(ResetFrequency::Never),
            "DAILY" => Ok(ResetFrequency::Daily),
            "MONTHLY" => Ok(ResetFrequency::Monthly),
            "YEARLY" => Ok(ResetFrequency::Yearly),
            other => Err(FiscalError::InvalidFormatConfig(format!(
                "unsupported sequence_reset_frequency '{}'",
                other
            ))),
        }
    }

    /// Counter partition for `date`: `ALL`, `YYYY`, `YYYY-MM` or `YYYY-MM-DD`.
    pub fn period_key(&self, date: NaiveDate) -> String {
        match self {
            ResetFrequency::Never => "ALL".to_string(),
            ResetFrequency::Yearly => format!("{:04}", date.year()),
            ResetFrequency::Monthly => format!("{:04}-{:02}", date.year(), date.month()),
            ResetFrequency::Daily => date.format("%Y-%m-%d").to_string(),
        }
    }
}

/// Rendering of the year token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum YearFormat {
    #[serde(rename = "YYYY")]
    FourDigit,
    #[serde(rename = "YY")]
    TwoDigit,
    /// Indian financial year (April to March), e.g. `2425`.
    #[serde(rename = "FY")]
    FinancialYear,
}

impl YearFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            YearFormat::FourDigit => "YYYY",
            YearFormat::TwoDigit => "YY",
            YearFormat::FinancialYear => "FY",
        }
    }

    pub fn parse(s: &str) -> Result<Self, FiscalError> {
        match s.trim().to_ascii_uppercase().as_str() {
            "YYYY" => Ok(YearFormat::FourDigit),
            "YY" => Ok(YearFormat::TwoDigit),
            "FY" => Ok(YearFormat::FinancialYear),
            other => Err(FiscalError::InvalidFormatConfig(format!(
                "unsupported year_format '{}'",
                other
            ))),
        }
    }
}

/// Rendering of the branch token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BranchFormat {
    /// Branch code as stored.
    Code,
    /// Branch code uppercased.
    Upper,
    /// First three alphanumeric characters, uppercased.
    Short,
}

impl BranchFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            BranchFormat::Code => "CODE",
            BranchFormat::Upper => "UPPER",
            BranchFormat::Short => "SHORT",
        }
    }

    pub fn parse(s: &str) -> Result<Self, FiscalError> {
        match s.trim().to_ascii_uppercase().as_str() {
            "CODE" => Ok(BranchFormat::Code),
            "UPPER" => Ok(BranchFormat::Upper),
            "SHORT" => Ok(BranchFormat::Short),
            other => Err(FiscalError::InvalidFormatConfig(format!(
                "unsupported branch_format '{}'",
                other
            ))),
        }
    }
}

/// Numbering configuration for one (company, document type).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentNumberFormat {
    pub prefix: String,
    pub separator: String,
    pub sequence_length: i32,
    pub sequence_reset_frequency: ResetFrequency,
    pub include_branch: bool,
    pub branch_format: BranchFormat,
    pub include_year: bool,
    pub year_format: YearFormat,
    pub include_month: bool,
    pub include_day: bool,
}

impl DocumentNumberFormat {
    /// Built-in format used until a company configures its own.
    pub fn default_for(document_type: DocumentType) -> Self {
        Self {
            prefix: document_type.default_prefix().to_string(),
            separator: "-".to_string(),
            sequence_length: 5,
            sequence_reset_frequency: ResetFrequency::Never,
            include_branch: false,
            branch_format: BranchFormat::Code,
            include_year: false,
            year_format: YearFormat::FourDigit,
            include_month: false,
            include_day: false,
        }
    }
}

/// Stored format row.
#[derive(Debug, Clone, FromRow)]
pub struct DocumentNumberFormatRow {
    pub company_id: Uuid,
    pub document_type: String,
    pub prefix: String,
    pub separator: String,
    pub sequence_length: i32,
    pub reset_frequency: String,
    pub include_branch: bool,
    pub branch_format: String,
    pub include_year: bool,
    pub year_format: String,
    pub include_month: bool,
    pub include_day: bool,
    pub created_utc: DateTime<Utc>,
    pub updated_utc: DateTime<Utc>,
}

impl TryFrom<&DocumentNumberFormatRow> for DocumentNumberFormat {
    type Error = FiscalError;

    fn try_from(row: &DocumentNumberFormatRow) -> Result<Self, Self::Error> {
        Ok(Self {
            prefix: row.prefix.clone(),
            separator: row.separator.clone(),
            sequence_length: row.sequence_length,
            sequence_reset_frequency: ResetFrequency::parse(&row.reset_frequency)?,
            include_branch: row.include_branch,
            branch_format: BranchFormat::parse(&row.branch_format)?,
            include_year: row.include_year,
            year_format: YearFormat::parse(&row.year_format)?,
            include_month: row.include_month,
            include_day: row.include_day,
        })
    }
}

/// A format as seen by callers: stored or the built-in default.
#[derive(Debug, Clone)]
pub struct ResolvedFormat {
    pub document_type: DocumentType,
    pub format: DocumentNumberFormat,
    pub configured: bool,
    pub updated_utc: Option<DateTime<Utc>>,
}

/// Identity of one counter row.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SequenceScope {
    pub company_id: Uuid,
    pub branch_id: Option<Uuid>,
    pub document_type: DocumentType,
    pub reset_frequency: ResetFrequency,
    pub period_key: String,
}

impl SequenceScope {
    pub fn new(
        company_id: Uuid,
        branch_id: Option<Uuid>,
        document_type: DocumentType,
        reset_frequency: ResetFrequency,
        date: NaiveDate,
    ) -> Self {
        Self {
            company_id,
            branch_id,
            document_type,
            reset_frequency,
            period_key: reset_frequency.period_key(date),
        }
    }

    /// Storage form of the branch: nil UUID for company-wide counters.
    pub fn branch_key(&self) -> Uuid {
        self.branch_id.unwrap_or_else(Uuid::nil)
    }
}

impl fmt::Display for SequenceScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}/{}/{}",
            self.company_id,
            self.branch_id
                .map(|b| b.to_string())
                .unwrap_or_else(|| "*".to_string()),
            self.document_type,
            self.period_key
        )
    }
}

/// Stored counter row.
#[derive(Debug, Clone, FromRow)]
pub struct SequenceCounter {
    pub company_id: Uuid,
    pub branch_key: Uuid,
    pub document_type: String,
    pub period_key: String,
    pub reset_frequency: String,
    pub current_value: i64,
    pub created_utc: DateTime<Utc>,
    pub updated_utc: DateTime<Utc>,
}
