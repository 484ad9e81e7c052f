//! Route table.

mod attendance;
mod audit;
mod auth;
mod classes;
mod health;
mod reports;
mod sessions;
mod students;

use super::AppState;
use axum::{
    Router,
    routing::{delete, get, post},
};

/// All `/api` routes.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health))
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/classes", get(classes::list).post(classes::create))
        .route(
            "/classes/{id}/students",
            get(students::list).post(students::create),
        )
        .route("/students/{id}", delete(students::remove))
        .route("/sessions", get(sessions::list).post(sessions::ensure))
        .route("/sessions/{id}/finalize", post(sessions::finalize))
        .route("/sessions/{id}/attendance", get(sessions::marks))
        .route("/attendance/mark", post(attendance::mark))
        .route("/attendance/self-mark", post(attendance::self_mark))
        .route("/reports/summary", get(reports::summary))
        .route("/reports/class/{id}", get(reports::class))
        .route("/reports/student/{id}", get(reports::student))
        .route("/audit", get(audit::recent))
}
