//! GST read-model rows and GSTR-1 report records.

use crate::error::FiscalError;
use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

// ============================================================================
// Read model
// ============================================================================

/// One issued document as recorded by the invoice flows.
#[derive(Debug, Clone, FromRow)]
pub struct GstInvoiceRow {
    pub invoice_id: Uuid,
    pub company_id: Uuid,
    pub branch_id: Option<Uuid>,
    pub document_type: String,
    pub document_number: String,
    pub sequence_value: i64,
    /// Counter series the number was drawn from. Nil for company-wide
    /// series; `ALL` unless the format resets daily or monthly.
    pub branch_key: Uuid,
    pub period_key: String,
    pub invoice_date: NaiveDate,
    pub customer_name: String,
    pub customer_gstin: Option<String>,
    pub place_of_supply: String,
    pub invoice_value: Decimal,
    pub reverse_charge: bool,
    pub cancelled: bool,
}

/// One invoice line. Tax columns are NULL when the flow left them to be
/// derived from rate and place of supply.
#[derive(Debug, Clone, FromRow)]
pub struct GstInvoiceLineRow {
    pub line_id: Uuid,
    pub invoice_id: Uuid,
    pub line_no: i32,
    pub description: Option<String>,
    pub hsn_code: String,
    pub uqc: String,
    pub quantity: Decimal,
    pub taxable_value: Decimal,
    pub tax_rate: Decimal,
    pub igst_amount: Option<Decimal>,
    pub cgst_amount: Option<Decimal>,
    pub sgst_amount: Option<Decimal>,
    pub cess_amount: Decimal,
}

/// An invoice with its lines, as fed to the aggregation engine.
#[derive(Debug, Clone)]
pub struct InvoiceRecord {
    pub invoice: GstInvoiceRow,
    pub lines: Vec<GstInvoiceLineRow>,
}

#[derive(Debug, Clone, FromRow)]
pub struct CompanyGstProfileRow {
    pub company_id: Uuid,
    pub gstin: Option<String>,
    pub legal_name: Option<String>,
    pub state_code: Option<String>,
}

// ============================================================================
// Return period
// ============================================================================

/// A monthly GSTR-1 filing period.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReturnPeriod {
    pub month: u32,
    pub year: i32,
}

impl ReturnPeriod {
    /// GST came into force in July 2017; nothing earlier can be filed.
    pub fn new(month: u32, year: i32) -> Result<Self, FiscalError> {
        if !(1..=12).contains(&month) {
            return Err(FiscalError::InvalidPeriod(format!(
                "month must be between 1 and 12, got {}",
                month
            )));
        }
        if year < 2017 || (year == 2017 && month < 7) || year > 9999 {
            return Err(FiscalError::InvalidPeriod(format!(
                "{:02}/{} is outside the GST regime",
                month, year
            )));
        }
        Ok(Self { month, year })
    }

    pub fn first_day(&self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap_or(NaiveDate::MIN)
    }

    pub fn last_day(&self) -> NaiveDate {
        let (y, m) = if self.month == 12 {
            (self.year + 1, 1)
        } else {
            (self.year, self.month + 1)
        };
        NaiveDate::from_ymd_opt(y, m, 1)
            .and_then(|d| d.pred_opt())
            .unwrap_or(NaiveDate::MAX)
    }

    /// Filing period as `MMYYYY`.
    pub fn fp(&self) -> String {
        format!("{:02}{:04}", self.month, self.year)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date.year() == self.year && date.month() == self.month
    }
}

// ============================================================================
// GSTR-1 report
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportHeader {
    pub gstin: Option<String>,
    pub legal_name: Option<String>,
    pub fp: String,
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
    pub branch_id: Option<Uuid>,
    pub seller_state_code: String,
}

/// Rate-wise tax detail inside an invoice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateItem {
    pub rate: Decimal,
    pub taxable_value: Decimal,
    pub igst: Decimal,
    pub cgst: Decimal,
    pub sgst: Decimal,
    pub cess: Decimal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SupplyType {
    Intra,
    Inter,
}

impl SupplyType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SupplyType::Intra => "INTRA",
            SupplyType::Inter => "INTER",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct B2bInvoice {
    pub customer_gstin: String,
    pub customer_name: String,
    pub invoice_number: String,
    pub invoice_date: NaiveDate,
    pub invoice_value: Decimal,
    pub place_of_supply: String,
    pub reverse_charge: bool,
    pub invoice_type: String,
    pub supply_type: SupplyType,
    pub items: Vec<RateItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct B2cLargeInvoice {
    pub invoice_number: String,
    pub invoice_date: NaiveDate,
    pub invoice_value: Decimal,
    pub place_of_supply: String,
    pub items: Vec<RateItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct B2cSmallRow {
    pub supply_type: SupplyType,
    pub place_of_supply: String,
    pub rate: Decimal,
    pub quantity: Decimal,
    pub taxable_value: Decimal,
    pub igst: Decimal,
    pub cgst: Decimal,
    pub sgst: Decimal,
    pub cess: Decimal,
    pub invoice_count: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HsnSummaryRow {
    pub hsn_code: String,
    pub description: Option<String>,
    pub uqc: String,
    pub uqc_description: String,
    pub quantity: Decimal,
    pub total_value: Decimal,
    pub taxable_value: Decimal,
    pub igst: Decimal,
    pub cgst: Decimal,
    pub sgst: Decimal,
    pub cess: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentSummaryRow {
    pub document_type: String,
    pub nature: String,
    pub branch_id: Option<Uuid>,
    pub period_key: String,
    pub from_sequence: i64,
    pub to_sequence: i64,
    pub from_number: String,
    pub to_number: String,
    pub total_count: u32,
    pub cancelled_count: u32,
    pub net_issued: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReportTotals {
    pub invoice_count: u32,
    pub invoice_value: Decimal,
    pub taxable_value: Decimal,
    pub igst: Decimal,
    pub cgst: Decimal,
    pub sgst: Decimal,
    pub cess: Decimal,
    pub total_tax: Decimal,
}

/// An invoice left out of the tax sections and why.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkippedRecord {
    pub document_number: String,
    pub invoice_date: NaiveDate,
    pub code: String,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Gstr1Report {
    pub header: ReportHeader,
    pub b2b: Vec<B2bInvoice>,
    pub b2c_large: Vec<B2cLargeInvoice>,
    pub b2c_small: Vec<B2cSmallRow>,
    pub hsn_summary: Vec<HsnSummaryRow>,
    pub document_summary: Vec<DocumentSummaryRow>,
    pub totals: ReportTotals,
    pub skipped: Vec<SkippedRecord>,
}
