//! Document numbering integration tests over the HTTP surface.

mod common;

use axum::http::StatusCode;
use common::spawn_app;
use serde_json::json;
use uuid::Uuid;

#[tokio::test]
async fn test_list_formats_returns_defaults_for_every_type() {
    let app = spawn_app();

    let (status, body) = app.send(app.get("/document-numbers")).await;

    assert_eq!(status, StatusCode::OK);
    let formats = body["formats"].as_array().unwrap();
    assert_eq!(formats.len(), 10);
    let invoice = formats
        .iter()
        .find(|f| f["document_type"] == "invoice")
        .unwrap();
    assert_eq!(invoice["configured"], false);
    assert_eq!(invoice["prefix"], "INV");
    assert_eq!(invoice["example"], "INV-00001");
}

#[tokio::test]
async fn test_missing_company_header_is_unauthorized() {
    let app = spawn_app();
    let req = axum::http::Request::builder()
        .uri("/document-numbers")
        .body(axum::body::Body::empty())
        .unwrap();

    let (status, body) = app.send(req).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn test_unknown_document_type_is_rejected() {
    let app = spawn_app();

    let (status, body) = app.send(app.get("/document-numbers/quotation")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "UNKNOWN_DOCUMENT_TYPE");
}

#[tokio::test]
async fn test_update_format_and_issue_numbers() {
    let app = spawn_app();

    let (status, body) = app
        .send(app.post(
            "/document-numbers/job-sheet",
            json!({
                "prefix": "JS",
                "separator": "/",
                "sequence_length": 4,
                "sequence_reset_frequency": "YEARLY",
                "include_year": true,
                "year_format": "FY"
            }),
        ))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["configured"], true);
    assert_eq!(body["sequence_reset_frequency"], "YEARLY");

    let mut issued = Vec::new();
    for _ in 0..3 {
        let (status, body) = app
            .send(app.post(
                "/document-numbers/job_sheet/next",
                json!({ "date": "2024-05-07" }),
            ))
            .await;
        assert_eq!(status, StatusCode::CREATED);
        issued.push(body["document_number"].as_str().unwrap().to_string());
    }

    assert_eq!(issued, vec!["JS/2425/0001", "JS/2425/0002", "JS/2425/0003"]);
}

#[tokio::test]
async fn test_next_without_body_uses_defaults() {
    let app = spawn_app();

    let (status, body) = app
        .send(app.request("POST", "/document-numbers/invoice/next", None, &[]))
        .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["document_number"], "INV-00001");
    assert_eq!(body["sequence_value"], 1);
    assert_eq!(body["period_key"], "ALL");
}

#[tokio::test]
async fn test_invalid_format_is_rejected_and_not_stored() {
    let app = spawn_app();

    let (status, body) = app
        .send(app.post(
            "/document-numbers/invoice",
            json!({ "prefix": "INV", "sequence_length": 0 }),
        ))
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["code"], "INVALID_FORMAT_CONFIG");

    let (status, body) = app
        .send(app.post(
            "/document-numbers/invoice",
            json!({ "prefix": "IN V", "sequence_length": 4 }),
        ))
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["code"], "INVALID_FORMAT_CONFIG");

    let (_, body) = app.send(app.get("/document-numbers/invoice")).await;
    assert_eq!(body["configured"], false);
}

#[tokio::test]
async fn test_preview_does_not_allocate() {
    let app = spawn_app();

    let (status, body) = app
        .send(app.post(
            "/document-numbers/preview",
            json!({
                "document_type": "invoice",
                "format": {
                    "prefix": "INV",
                    "separator": "/",
                    "sequence_length": 4,
                    "include_branch": true,
                    "include_year": true,
                    "include_month": true,
                    "include_day": true
                },
                "branch_code": "BLR",
                "date": "2024-05-07",
                "sample_sequence": 12
            }),
        ))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["preview"], "INV/2024/05/07/BLR/0012");

    let (status, body) = app.send(app.get("/document-numbers/invoice/sequence")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["current_value"], 0);
    assert_eq!(body["next_value"], 1);
    assert!(app.store.counters().unwrap().is_empty());
}

#[tokio::test]
async fn test_sequence_reflects_allocations() {
    let app = spawn_app();

    for _ in 0..2 {
        app.send(app.request("POST", "/document-numbers/estimate/next", None, &[]))
            .await;
    }

    let (status, body) = app.send(app.get("/document-numbers/estimate/sequence")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["current_value"], 2);
    assert_eq!(body["next_value"], 3);
    assert_eq!(body["reset_frequency"], "NEVER");
}

#[tokio::test]
async fn test_daily_reset_starts_each_day_at_one() {
    let app = spawn_app();
    app.send(app.post(
        "/document-numbers/payment-receipt",
        json!({
            "prefix": "RCPT",
            "sequence_length": 3,
            "sequence_reset_frequency": "DAILY",
            "include_day": true
        }),
    ))
    .await;

    let next = |date: &'static str| {
        app.post(
            "/document-numbers/payment_receipt/next",
            json!({ "date": date }),
        )
    };

    let (_, first) = app.send(next("2024-05-07")).await;
    let (_, second) = app.send(next("2024-05-07")).await;
    let (_, next_day) = app.send(next("2024-05-08")).await;

    assert_eq!(first["document_number"], "RCPT-07-001");
    assert_eq!(second["document_number"], "RCPT-07-002");
    assert_eq!(next_day["document_number"], "RCPT-08-001");
    assert_eq!(next_day["period_key"], "2024-05-08");
}

#[tokio::test]
async fn test_branch_scoped_numbering() {
    let app = spawn_app();
    app.send(app.post(
        "/document-numbers/invoice",
        json!({
            "prefix": "INV",
            "sequence_length": 3,
            "include_branch": true,
            "branch_format": "UPPER"
        }),
    ))
    .await;

    let (status, body) = app
        .send(app.request("POST", "/document-numbers/invoice/next", None, &[]))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "MISSING_BRANCH");

    let blr = Uuid::new_v4().to_string();
    let mys = Uuid::new_v4().to_string();
    let issue = |branch: &str, code: &str| {
        app.request(
            "POST",
            "/document-numbers/invoice/next",
            None,
            &[("X-Branch-ID", branch), ("X-Branch-Code", code)],
        )
    };

    let (_, a1) = app.send(issue(&blr, "blr")).await;
    let (_, a2) = app.send(issue(&blr, "blr")).await;
    let (_, b1) = app.send(issue(&mys, "mys")).await;

    assert_eq!(a1["document_number"], "INV-BLR-001");
    assert_eq!(a2["document_number"], "INV-BLR-002");
    assert_eq!(b1["document_number"], "INV-MYS-001");
    assert_eq!(b1["branch_id"], mys.as_str());
}

#[tokio::test]
async fn test_changing_format_keeps_issued_sequence() {
    let app = spawn_app();

    let (_, first) = app
        .send(app.request("POST", "/document-numbers/credit-note/next", None, &[]))
        .await;
    assert_eq!(first["document_number"], "CN-00001");

    app.send(app.post(
        "/document-numbers/credit_note",
        json!({ "prefix": "CRN", "separator": "", "sequence_length": 6 }),
    ))
    .await;

    let (_, second) = app
        .send(app.request("POST", "/document-numbers/credit-note/next", None, &[]))
        .await;
    assert_eq!(second["document_number"], "CRN000002");
}
