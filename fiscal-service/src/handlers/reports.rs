//! GSTR-1 report handlers.

use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use service_core::error::AppError;

use super::fail;
use crate::{
    dtos::{
        B2bResponse, B2cLargeResponse, B2cSmallResponse, DocumentSummaryResponse,
        HsnSummaryResponse, ReportQuery, SectionResponse,
    },
    middleware::TenantContext,
    models::Gstr1Report,
    services::gst::{export_filename, render_workbook, XLSX_CONTENT_TYPE},
    services::ReportSection,
    AppState,
};

async fn load(
    state: &AppState,
    tenant: &TenantContext,
    query: &ReportQuery,
    section: ReportSection,
) -> Result<Gstr1Report, AppError> {
    let period = query.period().map_err(fail)?;

    tracing::info!(
        company_id = %tenant.company_id,
        fp = %period.fp(),
        branch_id = ?query.branch_id,
        section = section.as_str(),
        "Building GSTR-1"
    );

    state
        .reporting
        .gstr1(tenant.company_id, period, query.branch_id, section)
        .await
        .map_err(fail)
}

/// The whole report.
pub async fn gstr1(
    State(state): State<AppState>,
    tenant: TenantContext,
    Query(query): Query<ReportQuery>,
) -> Result<Json<Gstr1Report>, AppError> {
    let report = load(&state, &tenant, &query, ReportSection::Full).await?;
    Ok(Json(report))
}

pub async fn b2b(
    State(state): State<AppState>,
    tenant: TenantContext,
    Query(query): Query<ReportQuery>,
) -> Result<Json<B2bResponse>, AppError> {
    let report = load(&state, &tenant, &query, ReportSection::B2b).await?;
    Ok(Json(SectionResponse::new(report.header, report.b2b)))
}

pub async fn b2c_large(
    State(state): State<AppState>,
    tenant: TenantContext,
    Query(query): Query<ReportQuery>,
) -> Result<Json<B2cLargeResponse>, AppError> {
    let report = load(&state, &tenant, &query, ReportSection::B2cLarge).await?;
    Ok(Json(SectionResponse::new(report.header, report.b2c_large)))
}

pub async fn b2c_small(
    State(state): State<AppState>,
    tenant: TenantContext,
    Query(query): Query<ReportQuery>,
) -> Result<Json<B2cSmallResponse>, AppError> {
    let report = load(&state, &tenant, &query, ReportSection::B2cSmall).await?;
    Ok(Json(SectionResponse::new(report.header, report.b2c_small)))
}

pub async fn hsn_summary(
    State(state): State<AppState>,
    tenant: TenantContext,
    Query(query): Query<ReportQuery>,
) -> Result<Json<HsnSummaryResponse>, AppError> {
    let report = load(&state, &tenant, &query, ReportSection::HsnSummary).await?;
    Ok(Json(SectionResponse::new(report.header, report.hsn_summary)))
}

pub async fn document_summary(
    State(state): State<AppState>,
    tenant: TenantContext,
    Query(query): Query<ReportQuery>,
) -> Result<Json<DocumentSummaryResponse>, AppError> {
    let report = load(&state, &tenant, &query, ReportSection::DocumentSummary).await?;
    Ok(Json(SectionResponse::new(
        report.header,
        report.document_summary,
    )))
}

/// The report as an xlsx attachment.
pub async fn export(
    State(state): State<AppState>,
    tenant: TenantContext,
    Query(query): Query<ReportQuery>,
) -> Result<impl IntoResponse, AppError> {
    let report = load(&state, &tenant, &query, ReportSection::Export).await?;
    let filename = export_filename(&report, &tenant.company_id.to_string());

    let bytes = tokio::task::spawn_blocking(move || render_workbook(&report))
        .await
        .map_err(|e| AppError::InternalError(anyhow::anyhow!("Export task failed: {}", e)))?
        .map_err(fail)?;

    tracing::info!(
        company_id = %tenant.company_id,
        filename = %filename,
        size_bytes = bytes.len(),
        "GSTR-1 exported"
    );

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, XLSX_CONTENT_TYPE.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", filename),
            ),
        ],
        bytes,
    ))
}
