//! Registration and login.

use crate::api::{
    AppState, auth::AuthUser, extract::JsonBody, response::ApiResponse, validate::required,
};
use crate::core::user;
use crate::entities::{Role, user as user_entity};
use crate::errors::{Error, Result};
use axum::{Json, extract::State, http::StatusCode};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub role: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: user_entity::Model,
}

/// POST /api/auth/register
///
/// Anyone may create a student account. Teacher and admin accounts require an
/// admin token.
pub async fn register(
    State(state): State<AppState>,
    caller: Option<AuthUser>,
    JsonBody(req): JsonBody<RegisterRequest>,
) -> Result<(StatusCode, Json<ApiResponse<user_entity::Model>>)> {
    let name = required(req.name.as_deref(), "Name")?;
    let email = required(req.email.as_deref(), "Email")?;
    let password = required(req.password.as_deref(), "Password")?;
    let role = match req.role.as_deref().map(str::trim).filter(|r| !r.is_empty()) {
        Some(role) => role.parse::<Role>()?,
        None => Role::Student,
    };

    if role != Role::Student {
        match caller {
            Some(caller) if caller.role() == Role::Admin => {}
            Some(_) => {
                return Err(Error::Forbidden {
                    message: "Only admins can create staff accounts".to_string(),
                });
            }
            None => {
                return Err(Error::Unauthorized {
                    message: "Unauthorized".to_string(),
                });
            }
        }
    }

    let user = user::register_user(&state.db, name, email, password, role).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(user, "User registered")),
    ))
}

/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<LoginRequest>,
) -> Result<Json<ApiResponse<LoginResponse>>> {
    let email = required(req.email.as_deref(), "Email")?;
    let password = required(req.password.as_deref(), "Password")?;

    let user = user::authenticate(&state.db, email, password).await?;
    let token = state.tokens.issue(&user)?;
    Ok(Json(ApiResponse::success(
        LoginResponse { token, user },
        "Login successful",
    )))
}
