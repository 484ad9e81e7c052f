use crate::api::{AppState, auth::AuthUser, extract::PathParam, response::ApiResponse};
use crate::core::report::{self, ClassSummary, StudentAttendance, StudentReport};
use crate::errors::Result;
use axum::{Json, extract::State};

/// GET /api/reports/summary
pub async fn summary(
    State(state): State<AppState>,
    _caller: AuthUser,
) -> Result<Json<ApiResponse<Vec<ClassSummary>>>> {
    let summaries = report::class_summaries(&state.db).await?;
    Ok(Json(ApiResponse::success(summaries, "Summary generated")))
}

/// GET /api/reports/class/{id}
pub async fn class(
    State(state): State<AppState>,
    _caller: AuthUser,
    PathParam(class_id): PathParam<i64>,
) -> Result<Json<ApiResponse<Vec<StudentAttendance>>>> {
    let rows = report::class_report(&state.db, class_id).await?;
    Ok(Json(ApiResponse::success(rows, "Class report generated")))
}

/// GET /api/reports/student/{id}
pub async fn student(
    State(state): State<AppState>,
    _caller: AuthUser,
    PathParam(student_id): PathParam<i64>,
) -> Result<Json<ApiResponse<StudentReport>>> {
    let history = report::student_report(&state.db, student_id).await?;
    Ok(Json(ApiResponse::success(history, "Student report generated")))
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{app, send, token_for};
    use crate::core::attendance::mark_attendance;
    use crate::entities::AttendanceStatus;
    use crate::test_utils::*;
    use axum::http::{Method, StatusCode};

    #[tokio::test]
    async fn test_report_routes() -> crate::errors::Result<()> {
        let fixture = setup_fixture().await?;
        let session = create_test_session(&fixture.db, fixture.class.id, fixture.teacher.id).await?;
        mark_attendance(
            &fixture.db,
            session.id,
            fixture.student.id,
            AttendanceStatus::Present,
            fixture.teacher.id,
        )
        .await?;
        let app = app(fixture.db.clone());
        let token = token_for(&fixture.student_user);

        let (status, json) =
            send(&app, Method::GET, "/api/reports/summary", Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["data"][0]["averageAttendance"], 100.0);

        let uri = format!("/api/reports/class/{}", fixture.class.id);
        let (status, json) = send(&app, Method::GET, &uri, Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["data"][0]["extId"], "S-100");

        let uri = format!("/api/reports/student/{}", fixture.student.id);
        let (status, json) = send(&app, Method::GET, &uri, Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["data"]["entries"][0]["date"], "2024-03-01");

        let (status, _) =
            send(&app, Method::GET, "/api/reports/student/999", Some(&token), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        Ok(())
    }
}
