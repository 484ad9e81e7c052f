//! Session lifecycle: ensure, list, finalize, and the marks of one session.

use crate::api::{
    AppState,
    auth::AuthUser,
    extract::{JsonBody, PathParam, QueryParams},
    response::ApiResponse,
    validate::{parse_date, parse_time, required},
};
use crate::core::{attendance, session};
use crate::entities::{attendance as attendance_entity, session as session_entity};
use crate::errors::{Error, Result};
use axum::{Json, extract::State};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionQuery {
    pub class_id: Option<i64>,
    pub date: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnsureSessionRequest {
    pub class_id: Option<i64>,
    pub date: Option<String>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
}

/// GET /api/sessions?classId=&date=
pub async fn list(
    State(state): State<AppState>,
    _caller: AuthUser,
    QueryParams(query): QueryParams<SessionQuery>,
) -> Result<Json<ApiResponse<Vec<session_entity::Model>>>> {
    let date = query
        .date
        .as_deref()
        .filter(|d| !d.trim().is_empty())
        .map(parse_date)
        .transpose()?;
    let sessions = session::list_sessions(&state.db, query.class_id, date).await?;
    Ok(Json(ApiResponse::success(sessions, "Sessions retrieved")))
}

/// POST /api/sessions
///
/// Returns the existing session for the class and date, or opens a new one.
pub async fn ensure(
    State(state): State<AppState>,
    caller: AuthUser,
    JsonBody(req): JsonBody<EnsureSessionRequest>,
) -> Result<Json<ApiResponse<session_entity::Model>>> {
    caller.require_staff()?;
    let class_id = req
        .class_id
        .ok_or_else(|| Error::validation("Class ID required"))?;
    let date = parse_date(required(req.date.as_deref(), "Date")?)?;
    let start_time = parse_time(req.start_time.as_deref())?;
    let end_time = parse_time(req.end_time.as_deref())?;

    let session = session::ensure_session(
        &state.db,
        class_id,
        date,
        start_time,
        end_time,
        caller.id(),
    )
    .await?;
    Ok(Json(ApiResponse::success(session, "Session ready")))
}

/// POST /api/sessions/{id}/finalize
pub async fn finalize(
    State(state): State<AppState>,
    caller: AuthUser,
    PathParam(session_id): PathParam<i64>,
) -> Result<Json<ApiResponse<session_entity::Model>>> {
    caller.require_staff()?;
    let session = attendance::finalize_session(&state.db, session_id, caller.id()).await?;
    Ok(Json(ApiResponse::success(session, "Session finalized")))
}

/// GET /api/sessions/{id}/attendance
pub async fn marks(
    State(state): State<AppState>,
    caller: AuthUser,
    PathParam(session_id): PathParam<i64>,
) -> Result<Json<ApiResponse<Vec<attendance_entity::Model>>>> {
    caller.require_staff()?;
    session::get_session_by_id(&state.db, session_id)
        .await?
        .ok_or_else(|| Error::not_found("Session", session_id))?;
    let marks = attendance::list_session_marks(&state.db, session_id).await?;
    Ok(Json(ApiResponse::success(marks, "Attendance retrieved")))
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{app, send, token_for};
    use crate::test_utils::*;
    use axum::http::{Method, StatusCode};
    use serde_json::json;

    #[tokio::test]
    async fn test_ensure_session_is_idempotent() -> crate::errors::Result<()> {
        let fixture = setup_fixture().await?;
        let app = app(fixture.db.clone());
        let teacher = token_for(&fixture.teacher);
        let body = json!({
            "classId": fixture.class.id,
            "date": "2024-03-01",
            "startTime": "09:00",
            "endTime": "10:00",
        });

        let (status, first) =
            send(&app, Method::POST, "/api/sessions", Some(&teacher), Some(body.clone())).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(first["data"]["status"], "open");

        let (_, second) =
            send(&app, Method::POST, "/api/sessions", Some(&teacher), Some(body)).await;
        assert_eq!(first["data"]["id"], second["data"]["id"]);

        let uri = format!("/api/sessions?classId={}&date=2024-03-01", fixture.class.id);
        let (status, json) = send(&app, Method::GET, &uri, Some(&teacher), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["data"].as_array().map(Vec::len), Some(1));
        Ok(())
    }

    #[tokio::test]
    async fn test_ensure_session_validation() -> crate::errors::Result<()> {
        let fixture = setup_fixture().await?;
        let app = app(fixture.db.clone());
        let teacher = token_for(&fixture.teacher);

        let cases = [
            json!({ "date": "2024-03-01" }),
            json!({ "classId": fixture.class.id }),
            json!({ "classId": fixture.class.id, "date": "March 1st" }),
            json!({ "classId": fixture.class.id, "date": "2024-03-01", "startTime": "9am" }),
            json!({
                "classId": fixture.class.id,
                "date": "2024-03-01",
                "startTime": "10:00",
                "endTime": "09:00",
            }),
        ];
        for body in cases {
            let (status, json) =
                send(&app, Method::POST, "/api/sessions", Some(&teacher), Some(body)).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(json["success"], false);
        }

        let (status, _) = send(
            &app,
            Method::POST,
            "/api/sessions",
            Some(&teacher),
            Some(json!({ "classId": 999, "date": "2024-03-01" })),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let student = token_for(&fixture.student_user);
        let (status, _) = send(
            &app,
            Method::POST,
            "/api/sessions",
            Some(&student),
            Some(json!({ "classId": fixture.class.id, "date": "2024-03-01" })),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        Ok(())
    }

    #[tokio::test]
    async fn test_finalize_unknown_session() -> crate::errors::Result<()> {
        let fixture = setup_fixture().await?;
        let app = app(fixture.db.clone());
        let teacher = token_for(&fixture.teacher);

        let (status, _) =
            send(&app, Method::POST, "/api/sessions/999/finalize", Some(&teacher), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let (status, _) =
            send(&app, Method::GET, "/api/sessions/999/attendance", Some(&teacher), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        Ok(())
    }
}
