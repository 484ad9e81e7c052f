use crate::api::{AppState, response::ApiResponse};
use crate::errors::Result;
use axum::{Json, extract::State};

/// GET /api/health
///
/// Pings the database. `200` with `"OK"` when reachable.
pub async fn health(State(state): State<AppState>) -> Result<Json<ApiResponse<&'static str>>> {
    state.db.ping().await?;
    Ok(Json(ApiResponse::success("OK", "Health check passed")))
}
