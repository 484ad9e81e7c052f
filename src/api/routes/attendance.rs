//! Marking endpoints for staff and for students.

use crate::api::{
    AppState, auth::AuthUser, extract::JsonBody, response::ApiResponse, validate::required,
};
use crate::core::{attendance, self_mark};
use crate::entities::{AttendanceStatus, Role, attendance as attendance_entity};
use crate::errors::{Error, Result};
use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkRequest {
    pub session_id: Option<i64>,
    pub student_id: Option<i64>,
    pub status: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelfMarkRequest {
    pub student_id: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SelfMarkResponse {
    pub session_id: i64,
    pub mark: attendance_entity::Model,
    pub recorded: bool,
}

/// POST /api/attendance/mark
///
/// Creates or overwrites the mark for a student in a session.
pub async fn mark(
    State(state): State<AppState>,
    caller: AuthUser,
    JsonBody(req): JsonBody<MarkRequest>,
) -> Result<Json<ApiResponse<attendance_entity::Model>>> {
    caller.require_staff()?;
    let (Some(session_id), Some(student_id)) = (req.session_id, req.student_id) else {
        return Err(Error::validation("Missing fields"));
    };
    let status: AttendanceStatus = required(req.status.as_deref(), "Status")?.parse()?;

    let mark =
        attendance::mark_attendance(&state.db, session_id, student_id, status, caller.id()).await?;
    Ok(Json(ApiResponse::success(mark, "Attendance marked")))
}

/// POST /api/attendance/self-mark
///
/// Students mark themselves present in today's session for their class. The
/// `studentId` must name the caller's own student record.
pub async fn self_mark(
    State(state): State<AppState>,
    caller: AuthUser,
    JsonBody(req): JsonBody<SelfMarkRequest>,
) -> Result<Json<ApiResponse<SelfMarkResponse>>> {
    caller.require_any(&[Role::Student])?;
    let ext_id = required(req.student_id.as_deref(), "Student ID")?;

    let outcome = self_mark::self_mark_attendance(&state.db, ext_id, caller.id()).await?;
    let message = if outcome.recorded {
        "Attendance marked"
    } else {
        "Attendance already recorded for today"
    };
    Ok(Json(ApiResponse::success(
        SelfMarkResponse {
            session_id: outcome.session.id,
            mark: outcome.mark,
            recorded: outcome.recorded,
        },
        message,
    )))
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{app, send, token_for};
    use crate::core::student::add_student;
    use crate::test_utils::*;
    use axum::http::{Method, StatusCode};
    use serde_json::json;

    const MARK: &str = "/api/attendance/mark";
    const SELF_MARK: &str = "/api/attendance/self-mark";

    #[tokio::test]
    async fn test_mark_then_finalize_flow() -> crate::errors::Result<()> {
        let fixture = setup_fixture().await?;
        let app = app(fixture.db.clone());
        let teacher = token_for(&fixture.teacher);

        let (_, json) = send(
            &app,
            Method::POST,
            "/api/sessions",
            Some(&teacher),
            Some(json!({ "classId": fixture.class.id, "date": "2024-03-01" })),
        )
        .await;
        let session_id = json["data"]["id"].as_i64().unwrap_or_default();
        let mark = |status: &str| {
            json!({ "sessionId": session_id, "studentId": fixture.student.id, "status": status })
        };

        let (status, json) =
            send(&app, Method::POST, MARK, Some(&teacher), Some(mark("present"))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["data"]["status"], "present");

        let (status, json) =
            send(&app, Method::POST, MARK, Some(&teacher), Some(mark("late"))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["data"]["status"], "late");

        let uri = format!("/api/sessions/{session_id}/attendance");
        let (_, json) = send(&app, Method::GET, &uri, Some(&teacher), None).await;
        assert_eq!(json["data"].as_array().map(Vec::len), Some(1));

        let uri = format!("/api/sessions/{session_id}/finalize");
        let (status, json) = send(&app, Method::POST, &uri, Some(&teacher), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["data"]["status"], "finalized");

        let (status, json) =
            send(&app, Method::POST, MARK, Some(&teacher), Some(mark("absent"))).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(json["message"], "Session finalized");
        Ok(())
    }

    #[tokio::test]
    async fn test_mark_rejections() -> crate::errors::Result<()> {
        let fixture = setup_fixture().await?;
        let app = app(fixture.db.clone());
        let session = create_test_session(&fixture.db, fixture.class.id, fixture.teacher.id).await?;
        let body = json!({
            "sessionId": session.id,
            "studentId": fixture.student.id,
            "status": "present",
        });

        let (status, _) = send(&app, Method::POST, MARK, None, Some(body.clone())).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, _) = send(&app, Method::POST, MARK, Some("garbage"), Some(body.clone())).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let student = token_for(&fixture.student_user);
        let (status, _) = send(&app, Method::POST, MARK, Some(&student), Some(body)).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let teacher = token_for(&fixture.teacher);
        let cases = [
            (
                json!({
                    "sessionId": session.id,
                    "studentId": fixture.student.id,
                    "status": "sleeping",
                }),
                StatusCode::BAD_REQUEST,
            ),
            (json!({ "sessionId": session.id, "status": "present" }), StatusCode::BAD_REQUEST),
            (
                json!({ "sessionId": session.id, "studentId": 999, "status": "present" }),
                StatusCode::NOT_FOUND,
            ),
        ];
        for (body, expected) in cases {
            let (status, json) = send(&app, Method::POST, MARK, Some(&teacher), Some(body)).await;
            assert_eq!(status, expected);
            assert_eq!(json["success"], false);
        }
        Ok(())
    }

    #[tokio::test]
    async fn test_malformed_requests_use_the_envelope() -> crate::errors::Result<()> {
        let fixture = setup_fixture().await?;
        let app = app(fixture.db.clone());
        let session = create_test_session(&fixture.db, fixture.class.id, fixture.teacher.id).await?;
        let teacher = token_for(&fixture.teacher);

        // A string where a number is expected
        let body = json!({
            "sessionId": session.id.to_string(),
            "studentId": fixture.student.id,
            "status": "present",
        });
        let (status, json) = send(&app, Method::POST, MARK, Some(&teacher), Some(body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["success"], false);
        assert!(json["data"].is_null());
        assert!(json["message"].as_str().is_some_and(|m| !m.is_empty()));

        // Not JSON at all
        let (status, json) =
            send(&app, Method::POST, MARK, Some(&teacher), Some(json!("not an object"))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["success"], false);

        // Non-numeric path id
        let (status, json) =
            send(&app, Method::POST, "/api/sessions/abc/finalize", Some(&teacher), None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["success"], false);

        // Non-numeric query value
        let (status, json) =
            send(&app, Method::GET, "/api/sessions?classId=abc", Some(&teacher), None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["success"], false);

        // Nothing was recorded
        let marks = crate::core::attendance::list_session_marks(&fixture.db, session.id).await?;
        assert!(marks.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_self_mark_endpoint() -> crate::errors::Result<()> {
        let fixture = setup_fixture().await?;
        let app = app(fixture.db.clone());
        let body = json!({ "studentId": fixture.student.student_ext_id });

        let teacher = token_for(&fixture.teacher);
        let (status, _) =
            send(&app, Method::POST, SELF_MARK, Some(&teacher), Some(body.clone())).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let student = token_for(&fixture.student_user);
        let (status, json) =
            send(&app, Method::POST, SELF_MARK, Some(&student), Some(body.clone())).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["data"]["recorded"], true);
        assert_eq!(json["data"]["mark"]["status"], "present");

        let (status, json) = send(&app, Method::POST, SELF_MARK, Some(&student), Some(body)).await;
        assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(json["success"], false);

        let (status, _) =
            send(&app, Method::POST, SELF_MARK, Some(&student), Some(json!({}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        Ok(())
    }

    #[tokio::test]
    async fn test_self_mark_for_classmate_is_forbidden() -> crate::errors::Result<()> {
        let fixture = setup_fixture().await?;
        let bob = add_student(
            &fixture.db,
            fixture.class.id,
            "S-200",
            "Bob",
            Some("bob@campus.edu".to_string()),
            fixture.teacher.id,
        )
        .await?;
        let app = app(fixture.db.clone());
        let ann = token_for(&fixture.student_user);

        let (status, json) = send(
            &app,
            Method::POST,
            SELF_MARK,
            Some(&ann),
            Some(json!({ "studentId": bob.student_ext_id })),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(json["success"], false);

        let report = crate::core::report::student_report(&fixture.db, bob.id).await?;
        assert!(report.entries.is_empty());
        Ok(())
    }
}
