//! Common test utilities for fiscal-service integration tests.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use fiscal_service::config::FiscalConfig;
use fiscal_service::models::{GstInvoiceLineRow, GstInvoiceRow, InvoiceRecord};
use fiscal_service::services::InMemoryStore;
use fiscal_service::{build_router, AppState};
use http_body_util::BodyExt;
use rust_decimal::Decimal;
use serde_json::Value;
use service_core::observability::init_test_tracing;
use std::str::FromStr;
use std::sync::Arc;
use tower::ServiceExt;
use uuid::Uuid;

/// Initialize tracing for tests (only once).
pub fn init_tracing() {
    init_test_tracing("info,fiscal_service=debug");
}

/// In-process application over the in-memory backend.
#[allow(dead_code)]
pub struct TestApp {
    pub router: Router,
    pub store: Arc<InMemoryStore>,
    pub company_id: Uuid,
}

#[allow(dead_code)]
pub fn spawn_app() -> TestApp {
    spawn_app_with(FiscalConfig::for_tests())
}

pub fn spawn_app_with(config: FiscalConfig) -> TestApp {
    init_tracing();

    let store = Arc::new(InMemoryStore::new());
    let state = AppState::new(config, store.clone()).expect("Failed to build app state");

    TestApp {
        router: build_router(state),
        store,
        company_id: Uuid::new_v4(),
    }
}

#[allow(dead_code)]
impl TestApp {
    pub fn get(&self, uri: &str) -> Request<Body> {
        self.request("GET", uri, None, &[])
    }

    pub fn post(&self, uri: &str, body: Value) -> Request<Body> {
        self.request("POST", uri, Some(body), &[])
    }

    /// Request carrying the tenant headers plus `extra`.
    pub fn request(
        &self,
        method: &str,
        uri: &str,
        body: Option<Value>,
        extra: &[(&str, &str)],
    ) -> Request<Body> {
        let company_id = self.company_id.to_string();
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header("X-Company-ID", company_id.as_str())
            .header("X-User-ID", "test-user");
        for (name, value) in extra {
            builder = builder.header(*name, *value);
        }
        match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        }
    }

    pub async fn send(&self, req: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(req).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, body)
    }
}

#[allow(dead_code)]
pub fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

/// Single-line invoice with taxes left for the engine to derive.
#[allow(dead_code)]
pub fn invoice(
    company_id: Uuid,
    seq: i64,
    date: chrono::NaiveDate,
    place_of_supply: &str,
    customer_gstin: Option<&str>,
    value: &str,
    taxable: &str,
) -> InvoiceRecord {
    let invoice_id = Uuid::new_v4();
    InvoiceRecord {
        invoice: GstInvoiceRow {
            invoice_id,
            company_id,
            branch_id: None,
            document_type: "invoice".to_string(),
            document_number: format!("INV-{:05}", seq),
            sequence_value: seq,
            branch_key: Uuid::nil(),
            period_key: "ALL".to_string(),
            invoice_date: date,
            customer_name: format!("Customer {}", seq),
            customer_gstin: customer_gstin.map(str::to_string),
            place_of_supply: place_of_supply.to_string(),
            invoice_value: dec(value),
            reverse_charge: false,
            cancelled: false,
        },
        lines: vec![GstInvoiceLineRow {
            line_id: Uuid::new_v4(),
            invoice_id,
            line_no: 1,
            description: Some("Display assembly".to_string()),
            hsn_code: "8517".to_string(),
            uqc: "NOS".to_string(),
            quantity: Decimal::ONE,
            taxable_value: dec(taxable),
            tax_rate: dec("18"),
            igst_amount: None,
            cgst_amount: None,
            sgst_amount: None,
            cess_amount: Decimal::ZERO,
        }],
    }
}
