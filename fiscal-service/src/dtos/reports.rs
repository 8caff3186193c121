use crate::error::FiscalError;
use crate::models::{
    B2bInvoice, B2cLargeInvoice, B2cSmallRow, DocumentSummaryRow, HsnSummaryRow, ReportHeader,
    ReturnPeriod,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// `?month=5&year=2024&branchId=...`
///
/// Month and year stay raw so a missing or malformed value is reported as
/// `INVALID_PERIOD` instead of a query rejection.
#[derive(Debug, Clone, Deserialize)]
pub struct ReportQuery {
    #[serde(default)]
    pub month: Option<String>,
    #[serde(default)]
    pub year: Option<String>,
    #[serde(default, rename = "branchId", alias = "branch_id")]
    pub branch_id: Option<Uuid>,
}

impl ReportQuery {
    pub fn period(&self) -> Result<ReturnPeriod, FiscalError> {
        let month = parse_param::<u32>("month", self.month.as_deref())?;
        let year = parse_param::<i32>("year", self.year.as_deref())?;
        ReturnPeriod::new(month, year)
    }
}

fn parse_param<T: std::str::FromStr>(name: &str, raw: Option<&str>) -> Result<T, FiscalError> {
    let raw = raw
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| FiscalError::InvalidPeriod(format!("{} is required", name)))?;
    raw.parse()
        .map_err(|_| FiscalError::InvalidPeriod(format!("{} must be a number, got '{}'", name, raw)))
}

/// One section of the report with its header.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SectionResponse<T> {
    pub header: ReportHeader,
    pub records: Vec<T>,
    pub count: usize,
}

impl<T> SectionResponse<T> {
    pub fn new(header: ReportHeader, records: Vec<T>) -> Self {
        Self {
            count: records.len(),
            header,
            records,
        }
    }
}

pub type B2bResponse = SectionResponse<B2bInvoice>;
pub type B2cLargeResponse = SectionResponse<B2cLargeInvoice>;
pub type B2cSmallResponse = SectionResponse<B2cSmallRow>;
pub type HsnSummaryResponse = SectionResponse<HsnSummaryRow>;
pub type DocumentSummaryResponse = SectionResponse<DocumentSummaryRow>;

#[cfg(test)]
mod tests {
    use super::*;

    fn query(month: Option<&str>, year: Option<&str>) -> ReportQuery {
        ReportQuery {
            month: month.map(str::to_string),
            year: year.map(str::to_string),
            branch_id: None,
        }
    }

    #[test]
    fn test_period_from_query() {
        let period = query(Some("5"), Some("2024")).period().unwrap();
        assert_eq!(period.fp(), "052024");
    }

    #[test]
    fn test_missing_or_malformed_period() {
        for q in [
            query(None, Some("2024")),
            query(Some("5"), None),
            query(Some(""), Some("2024")),
            query(Some("abc"), Some("2024")),
            query(Some("5"), Some("twenty")),
            query(Some("-1"), Some("2024")),
        ] {
            assert!(matches!(q.period(), Err(FiscalError::InvalidPeriod(_))));
        }
    }
}
