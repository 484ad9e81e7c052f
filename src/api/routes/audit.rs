use crate::api::{AppState, auth::AuthUser, extract::QueryParams, response::ApiResponse};
use crate::core::audit;
use crate::entities::{Role, audit_log};
use crate::errors::Result;
use axum::{Json, extract::State};
use serde::Deserialize;

const DEFAULT_LIMIT: u64 = 100;
const MAX_LIMIT: u64 = 1000;

#[derive(Debug, Deserialize)]
pub struct AuditQuery {
    pub limit: Option<u64>,
}

/// GET /api/audit?limit=
///
/// Newest entries first. Admins only.
pub async fn recent(
    State(state): State<AppState>,
    caller: AuthUser,
    QueryParams(query): QueryParams<AuditQuery>,
) -> Result<Json<ApiResponse<Vec<audit_log::Model>>>> {
    caller.require_any(&[Role::Admin])?;
    let limit = query.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);
    let entries = audit::list_recent(&state.db, limit).await?;
    Ok(Json(ApiResponse::success(entries, "Audit log retrieved")))
}
