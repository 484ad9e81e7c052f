use crate::api::{
    AppState, auth::AuthUser, extract::JsonBody, response::ApiResponse, validate::required,
};
use crate::core::class::{self, NewClass};
use crate::entities::class as class_entity;
use crate::errors::Result;
use axum::{Json, extract::State, http::StatusCode};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateClassRequest {
    pub name: Option<String>,
    pub code: Option<String>,
    pub teacher_id: Option<i64>,
    pub schedule: Option<serde_json::Value>,
}

/// GET /api/classes
pub async fn list(
    State(state): State<AppState>,
    _caller: AuthUser,
) -> Result<Json<ApiResponse<Vec<class_entity::Model>>>> {
    let classes = class::list_classes(&state.db).await?;
    Ok(Json(ApiResponse::success(classes, "Classes retrieved")))
}

/// POST /api/classes
///
/// A teacher who leaves `teacherId` out becomes the class's teacher.
pub async fn create(
    State(state): State<AppState>,
    caller: AuthUser,
    JsonBody(req): JsonBody<CreateClassRequest>,
) -> Result<(StatusCode, Json<ApiResponse<class_entity::Model>>)> {
    caller.require_staff()?;
    let name = required(req.name.as_deref(), "Name")?;

    let teacher_id = req
        .teacher_id
        .or_else(|| (caller.role() == crate::entities::Role::Teacher).then_some(caller.id()));

    let class = class::create_class(
        &state.db,
        NewClass {
            name: name.to_string(),
            code: req.code,
            teacher_id,
            schedule: req.schedule,
        },
        caller.id(),
    )
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(class, "Class created")),
    ))
}
