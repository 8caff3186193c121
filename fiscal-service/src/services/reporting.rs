//! GSTR-1 report orchestration: snapshot load, seller resolution, engine run.

use crate::error::FiscalError;
use crate::models::{Gstr1Report, ReturnPeriod};
use crate::services::gst::{self, gstin, state, ReportContext};
use crate::services::metrics::record_report;
use crate::services::store::GstDataSource;
use rust_decimal::Decimal;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, instrument, warn};
use uuid::Uuid;

/// Settings that apply when a company's profile is silent.
#[derive(Debug, Clone)]
pub struct ReportingSettings {
    pub fallback_seller_state: Option<String>,
    pub b2c_large_threshold: Decimal,
}

/// Report sections served individually.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportSection {
    Full,
    B2b,
    B2cLarge,
    B2cSmall,
    HsnSummary,
    DocumentSummary,
    Export,
}

impl ReportSection {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportSection::Full => "full",
            ReportSection::B2b => "b2b",
            ReportSection::B2cLarge => "b2c_large",
            ReportSection::B2cSmall => "b2c_small",
            ReportSection::HsnSummary => "hsn_summary",
            ReportSection::DocumentSummary => "document_summary",
            ReportSection::Export => "export",
        }
    }
}

#[derive(Clone)]
pub struct ReportingService {
    source: Arc<dyn GstDataSource>,
    settings: ReportingSettings,
}

impl ReportingService {
    pub fn new(source: Arc<dyn GstDataSource>, settings: ReportingSettings) -> Self {
        Self { source, settings }
    }

    #[instrument(skip(self), fields(company_id = %company_id, fp = %period.fp(), section = section.as_str()))]
    pub async fn gstr1(
        &self,
        company_id: Uuid,
        period: ReturnPeriod,
        branch_id: Option<Uuid>,
        section: ReportSection,
    ) -> Result<Gstr1Report, FiscalError> {
        let started = Instant::now();
        let result = self.build(company_id, period, branch_id).await;
        let status = match &result {
            Ok(_) => "success",
            Err(e) => e.code(),
        };
        record_report(section.as_str(), status, started.elapsed().as_secs_f64());
        result
    }

    async fn build(
        &self,
        company_id: Uuid,
        period: ReturnPeriod,
        branch_id: Option<Uuid>,
    ) -> Result<Gstr1Report, FiscalError> {
        let snapshot = self.source.load_period(company_id, period, branch_id).await?;

        let profile = snapshot.profile.as_ref();
        let seller_gstin = match profile.and_then(|p| p.gstin.as_deref()) {
            Some(raw) => match gstin::validate(raw) {
                Ok(g) => Some(g),
                Err(e) => {
                    warn!(error = %e, "Seller GSTIN is invalid; ignoring it");
                    None
                }
            },
            None => None,
        };

        let seller_state_code = seller_gstin
            .as_deref()
            .and_then(gstin::state_code)
            .map(str::to_string)
            .or_else(|| profile.and_then(|p| p.state_code.clone()))
            .or_else(|| self.settings.fallback_seller_state.clone())
            .ok_or_else(|| FiscalError::MissingSellerProfile(company_id.to_string()))?;
        let seller_state = state::resolve_place_of_supply(&seller_state_code)
            .map_err(|_| FiscalError::MissingSellerProfile(company_id.to_string()))?;

        let ctx = ReportContext {
            period,
            branch_id,
            seller_gstin,
            legal_name: profile.and_then(|p| p.legal_name.clone()),
            seller_state_code: seller_state.code.to_string(),
            b2c_large_threshold: self.settings.b2c_large_threshold,
        };

        let report = gst::build_gstr1_report(&ctx, &snapshot.records)?;

        info!(
            invoices = report.totals.invoice_count,
            b2b = report.b2b.len(),
            b2c_large = report.b2c_large.len(),
            b2c_small = report.b2c_small.len(),
            skipped = report.skipped.len(),
            "GSTR-1 report built"
        );

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CompanyGstProfileRow;
    use crate::services::memory::InMemoryStore;

    fn settings(fallback: Option<&str>) -> ReportingSettings {
        ReportingSettings {
            fallback_seller_state: fallback.map(str::to_string),
            b2c_large_threshold: Decimal::from(250_000),
        }
    }

    #[tokio::test]
    async fn test_missing_seller_profile() {
        let svc = ReportingService::new(Arc::new(InMemoryStore::new()), settings(None));
        let period = ReturnPeriod::new(5, 2024).unwrap();
        assert!(matches!(
            svc.gstr1(Uuid::new_v4(), period, None, ReportSection::Full).await,
            Err(FiscalError::MissingSellerProfile(_))
        ));
    }

    #[tokio::test]
    async fn test_seller_state_from_gstin() {
        let store = Arc::new(InMemoryStore::new());
        let company = Uuid::new_v4();
        store
            .set_profile(CompanyGstProfileRow {
                company_id: company,
                gstin: Some("33AAACH7409R1Z8".to_string()),
                legal_name: Some("Chennai Repairs".to_string()),
                state_code: Some("29".to_string()),
            })
            .unwrap();
        let svc = ReportingService::new(store, settings(Some("27")));
        let report = svc
            .gstr1(company, ReturnPeriod::new(5, 2024).unwrap(), None, ReportSection::Full)
            .await
            .unwrap();
        assert_eq!(report.header.seller_state_code, "33");
        assert_eq!(report.header.gstin.as_deref(), Some("33AAACH7409R1Z8"));
    }

    #[tokio::test]
    async fn test_fallback_state() {
        let svc = ReportingService::new(Arc::new(InMemoryStore::new()), settings(Some("29")));
        let report = svc
            .gstr1(Uuid::new_v4(), ReturnPeriod::new(5, 2024).unwrap(), None, ReportSection::B2b)
            .await
            .unwrap();
        assert_eq!(report.header.seller_state_code, "29");
        assert!(report.header.gstin.is_none());
    }
}
