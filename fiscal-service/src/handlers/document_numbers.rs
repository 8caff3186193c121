//! Document numbering handlers, scoped to the tenant's company.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use service_core::error::AppError;
use validator::Validate;

use super::fail;
use crate::{
    dtos::{
        FormatListResponse, FormatRequest, FormatResponse, NextNumberRequest, NextNumberResponse,
        PreviewRequest, PreviewResponse, SequenceQuery, SequenceResponse,
    },
    middleware::TenantContext,
    models::{DocumentNumberFormat, DocumentType},
    services::NumberingRequest,
    AppState,
};

/// All formats for the company, one per document type.
pub async fn list_formats(
    State(state): State<AppState>,
    tenant: TenantContext,
) -> Result<Json<FormatListResponse>, AppError> {
    tracing::info!(company_id = %tenant.company_id, "Listing document number formats");

    let today = state.numbering.business_date(Utc::now());
    let formats = state
        .numbering
        .list_formats(tenant.company_id)
        .await
        .map_err(fail)?
        .into_iter()
        .map(|resolved| FormatResponse::new(resolved, today))
        .collect();

    Ok(Json(FormatListResponse { formats }))
}

pub async fn get_format(
    State(state): State<AppState>,
    tenant: TenantContext,
    Path(document_type): Path<String>,
) -> Result<Json<FormatResponse>, AppError> {
    let document_type = DocumentType::parse(&document_type).map_err(fail)?;
    let resolved = state
        .numbering
        .get_format(tenant.company_id, document_type)
        .await
        .map_err(fail)?;

    let today = state.numbering.business_date(Utc::now());
    Ok(Json(FormatResponse::new(resolved, today)))
}

/// Replace the company's format for a document type.
pub async fn update_format(
    State(state): State<AppState>,
    tenant: TenantContext,
    Path(document_type): Path<String>,
    Json(payload): Json<FormatRequest>,
) -> Result<Json<FormatResponse>, AppError> {
    let document_type = DocumentType::parse(&document_type).map_err(fail)?;
    let format = DocumentNumberFormat::try_from(payload).map_err(fail)?;

    tracing::info!(
        company_id = %tenant.company_id,
        document_type = %document_type,
        user_id = ?tenant.user_id,
        "Updating document number format"
    );

    let resolved = state
        .numbering
        .update_format(tenant.company_id, document_type, format)
        .await
        .map_err(fail)?;

    let today = state.numbering.business_date(Utc::now());
    Ok(Json(FormatResponse::new(resolved, today)))
}

/// Render a sample number without touching any counter.
pub async fn preview(
    State(state): State<AppState>,
    tenant: TenantContext,
    Json(payload): Json<PreviewRequest>,
) -> Result<Json<PreviewResponse>, AppError> {
    payload.validate()?;
    let document_type = DocumentType::parse(&payload.document_type).map_err(fail)?;
    let inline = payload
        .format
        .map(DocumentNumberFormat::try_from)
        .transpose()
        .map_err(fail)?;
    let sample_sequence = payload.sample_sequence.unwrap_or(1);
    let branch_code = payload.branch_code.or(tenant.branch_code);

    let preview = state
        .numbering
        .preview(
            NumberingRequest {
                company_id: tenant.company_id,
                branch_id: tenant.branch_id,
                branch_code: branch_code.as_deref(),
                document_type,
                date: payload.date,
            },
            inline,
            Some(sample_sequence),
        )
        .await
        .map_err(fail)?;

    Ok(Json(PreviewResponse {
        document_type,
        preview,
        sample_sequence,
    }))
}

/// Current counter state for the scope derived from the date.
pub async fn get_sequence(
    State(state): State<AppState>,
    tenant: TenantContext,
    Path(document_type): Path<String>,
    Query(query): Query<SequenceQuery>,
) -> Result<Json<SequenceResponse>, AppError> {
    let document_type = DocumentType::parse(&document_type).map_err(fail)?;
    let sequence = state
        .numbering
        .current_sequence(NumberingRequest {
            company_id: tenant.company_id,
            branch_id: tenant.branch_id,
            branch_code: tenant.branch_code.as_deref(),
            document_type,
            date: query.date,
        })
        .await
        .map_err(fail)?;

    Ok(Json(SequenceResponse::from(sequence)))
}

/// Allocate and render the next number for a new document.
pub async fn next_number(
    State(state): State<AppState>,
    tenant: TenantContext,
    Path(document_type): Path<String>,
    payload: Option<Json<NextNumberRequest>>,
) -> Result<(StatusCode, Json<NextNumberResponse>), AppError> {
    let document_type = DocumentType::parse(&document_type).map_err(fail)?;
    let payload = payload.map(|Json(p)| p).unwrap_or_default();
    payload.validate()?;
    let branch_code = payload.branch_code.or(tenant.branch_code);

    let issued = state
        .numbering
        .next_number(NumberingRequest {
            company_id: tenant.company_id,
            branch_id: tenant.branch_id,
            branch_code: branch_code.as_deref(),
            document_type,
            date: payload.date,
        })
        .await
        .map_err(fail)?;

    tracing::info!(
        company_id = %tenant.company_id,
        document_type = %document_type,
        document_number = %issued.document_number,
        user_id = ?tenant.user_id,
        "Document number allocated"
    );

    Ok((StatusCode::CREATED, Json(NextNumberResponse::from(issued))))
}
