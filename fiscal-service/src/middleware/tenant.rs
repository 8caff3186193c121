//! Tenant context extracted from BFF headers.
//!
//! `X-Company-ID` is required. `X-Branch-ID`, `X-Branch-Code` and
//! `X-User-ID` are optional; branch-scoped numbering needs the first two.

use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::HeaderMap;
use service_core::error::AppError;
use uuid::Uuid;

pub const COMPANY_ID_HEADER: &str = "X-Company-ID";
pub const BRANCH_ID_HEADER: &str = "X-Branch-ID";
pub const BRANCH_CODE_HEADER: &str = "X-Branch-Code";
pub const USER_ID_HEADER: &str = "X-User-ID";

#[derive(Debug, Clone)]
pub struct TenantContext {
    pub company_id: Uuid,
    pub branch_id: Option<Uuid>,
    pub branch_code: Option<String>,
    pub user_id: Option<String>,
}

fn header<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

fn parse_uuid(name: &str, value: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(value)
        .map_err(|_| AppError::BadRequest(anyhow::anyhow!("{} must be a UUID", name)))
}

#[async_trait]
impl<S> FromRequestParts<S> for TenantContext
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let company_id = header(&parts.headers, COMPANY_ID_HEADER).ok_or_else(|| {
            AppError::Unauthorized(anyhow::anyhow!(
                "Missing {} header (required from BFF)",
                COMPANY_ID_HEADER
            ))
        })?;
        let company_id = parse_uuid(COMPANY_ID_HEADER, company_id)?;

        let branch_id = header(&parts.headers, BRANCH_ID_HEADER)
            .map(|v| parse_uuid(BRANCH_ID_HEADER, v))
            .transpose()?;
        let branch_code = header(&parts.headers, BRANCH_CODE_HEADER).map(str::to_string);
        let user_id = header(&parts.headers, USER_ID_HEADER).map(str::to_string);

        let span = tracing::Span::current();
        span.record("company_id", tracing::field::display(company_id));
        if let Some(branch_id) = branch_id {
            span.record("branch_id", tracing::field::display(branch_id));
        }

        Ok(TenantContext {
            company_id,
            branch_id,
            branch_code,
            user_id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{Request, StatusCode};

    async fn extract(req: Request<()>) -> Result<TenantContext, AppError> {
        let (mut parts, _) = req.into_parts();
        TenantContext::from_request_parts(&mut parts, &()).await
    }

    #[tokio::test]
    async fn test_extracts_company_and_branch() {
        let company = Uuid::new_v4();
        let branch = Uuid::new_v4();
        let req = Request::builder()
            .header(COMPANY_ID_HEADER, company.to_string())
            .header(BRANCH_ID_HEADER, branch.to_string())
            .header(BRANCH_CODE_HEADER, "BLR")
            .body(())
            .unwrap();

        let ctx = extract(req).await.unwrap();
        assert_eq!(ctx.company_id, company);
        assert_eq!(ctx.branch_id, Some(branch));
        assert_eq!(ctx.branch_code.as_deref(), Some("BLR"));
        assert!(ctx.user_id.is_none());
    }

    #[tokio::test]
    async fn test_missing_company_is_unauthorized() {
        let err = extract(Request::builder().body(()).unwrap()).await.unwrap_err();
        assert_eq!(err.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_malformed_branch_is_bad_request() {
        let req = Request::builder()
            .header(COMPANY_ID_HEADER, Uuid::new_v4().to_string())
            .header(BRANCH_ID_HEADER, "main")
            .body(())
            .unwrap();
        assert_eq!(extract(req).await.unwrap_err().status(), StatusCode::BAD_REQUEST);
    }
}
