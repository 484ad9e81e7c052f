//! Bearer-token authentication.
//!
//! Tokens are HS256 JWTs carrying the user's id, role and name. Handlers take an
//! [`AuthUser`] argument to require a valid token, or `Option<AuthUser>` where
//! authentication is optional.

use super::AppState;
use crate::{
    entities::{Role, user},
    errors::{Error, Result},
};
use axum::{
    extract::{FromRequestParts, OptionalFromRequestParts},
    http::{header::AUTHORIZATION, request::Parts},
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

/// JWT payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User id
    pub sub: i64,
    pub role: Role,
    pub name: String,
    /// Expiry as seconds since the epoch
    pub exp: usize,
}

/// Signing and verification keys plus the lifetime of issued tokens.
pub struct TokenKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: chrono::Duration,
}

impl TokenKeys {
    #[must_use]
    pub fn new(secret: &str, ttl_hours: i64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl: chrono::Duration::hours(ttl_hours),
        }
    }

    /// Issues a token for `user`.
    pub fn issue(&self, user: &user::Model) -> Result<String> {
        let exp = (chrono::Utc::now() + self.ttl).timestamp();
        let claims = Claims {
            sub: user.id,
            role: user.role,
            name: user.name.clone(),
            exp: usize::try_from(exp).unwrap_or_default(),
        };
        encode(&Header::default(), &claims, &self.encoding).map_err(Into::into)
    }

    /// Verifies signature and expiry, returning the claims.
    pub fn verify(&self, token: &str) -> Result<Claims> {
        decode::<Claims>(token, &self.decoding, &Validation::default())
            .map(|data| data.claims)
            .map_err(|_| Error::Unauthorized {
                message: "Invalid token".to_string(),
            })
    }
}

/// An authenticated caller.
#[derive(Debug, Clone)]
pub struct AuthUser(pub Claims);

impl AuthUser {
    #[must_use]
    pub const fn id(&self) -> i64 {
        self.0.sub
    }

    #[must_use]
    pub const fn role(&self) -> Role {
        self.0.role
    }

    /// Fails with [`Error::Forbidden`] unless the caller holds one of `roles`.
    pub fn require_any(&self, roles: &[Role]) -> Result<()> {
        if roles.contains(&self.0.role) {
            Ok(())
        } else {
            Err(Error::Forbidden {
                message: "Forbidden".to_string(),
            })
        }
    }

    /// Admins and teachers only.
    pub fn require_staff(&self) -> Result<()> {
        self.require_any(&[Role::Admin, Role::Teacher])
    }
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self> {
        type BearerHeader = TypedHeader<Authorization<Bearer>>;

        let TypedHeader(Authorization(bearer)) =
            <BearerHeader as FromRequestParts<AppState>>::from_request_parts(parts, state)
                .await
                .map_err(|_| Error::Unauthorized {
                    message: "Unauthorized".to_string(),
                })?;

        state.tokens.verify(bearer.token()).map(AuthUser)
    }
}

impl OptionalFromRequestParts<AppState> for AuthUser {
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Option<Self>> {
        // An absent header means anonymous; a present but bad one is still rejected
        if !parts.headers.contains_key(AUTHORIZATION) {
            return Ok(None);
        }
        <Self as FromRequestParts<AppState>>::from_request_parts(parts, state)
            .await
            .map(Some)
    }
}
