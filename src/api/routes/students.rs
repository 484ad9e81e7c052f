use crate::api::{
    AppState,
    auth::AuthUser,
    extract::{JsonBody, PathParam},
    response::ApiResponse,
    validate::required,
};
use crate::core::{class, student};
use crate::entities::student as student_entity;
use crate::errors::{Error, Result};
use axum::{Json, extract::State, http::StatusCode};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddStudentRequest {
    pub student_id: Option<String>,
    pub name: Option<String>,
    pub email: Option<String>,
}

/// GET /api/classes/{id}/students
pub async fn list(
    State(state): State<AppState>,
    _caller: AuthUser,
    PathParam(class_id): PathParam<i64>,
) -> Result<Json<ApiResponse<Vec<student_entity::Model>>>> {
    class::get_class_by_id(&state.db, class_id)
        .await?
        .ok_or_else(|| Error::not_found("Class", class_id))?;
    let students = student::list_students_for_class(&state.db, class_id).await?;
    Ok(Json(ApiResponse::success(students, "Students retrieved")))
}

/// POST /api/classes/{id}/students
pub async fn create(
    State(state): State<AppState>,
    caller: AuthUser,
    PathParam(class_id): PathParam<i64>,
    JsonBody(req): JsonBody<AddStudentRequest>,
) -> Result<(StatusCode, Json<ApiResponse<student_entity::Model>>)> {
    caller.require_staff()?;
    let ext_id = required(req.student_id.as_deref(), "Student ID")?;
    let name = required(req.name.as_deref(), "Name")?;
    let email = req
        .email
        .map(|e| e.trim().to_string())
        .filter(|e| !e.is_empty());

    let student =
        student::add_student(&state.db, class_id, ext_id, name, email, caller.id()).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(student, "Student added")),
    ))
}

/// DELETE /api/students/{id}
pub async fn remove(
    State(state): State<AppState>,
    caller: AuthUser,
    PathParam(student_id): PathParam<i64>,
) -> Result<Json<ApiResponse<bool>>> {
    caller.require_staff()?;
    let deleted = student::delete_student(&state.db, student_id, caller.id()).await?;
    let message = if deleted { "Student removed" } else { "No such student" };
    Ok(Json(ApiResponse::success(deleted, message)))
}
