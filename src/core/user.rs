//! User accounts - Registration, credential checks, and the seeded admin.
//!
//! Passwords are stored as Argon2 PHC strings. Login failures never reveal whether the
//! email or the password was wrong.

use crate::{
    config::settings::AdminSeedConfig,
    core::audit::{self, AuditAction, AuditEvent},
    entities::{Role, User, user},
    errors::{Error, Result},
};
use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
};
use rand::rngs::OsRng;
use sea_orm::{PaginatorTrait, Set, prelude::*};
use serde_json::json;
use tracing::{info, instrument, warn};

const INVALID_CREDENTIALS: &str = "Invalid email or password";

fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| Error::PasswordHash {
            message: e.to_string(),
        })
}

fn verify_password(password: &str, password_hash: &str) -> bool {
    PasswordHash::new(password_hash)
        .map(|parsed| {
            Argon2::default()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok()
        })
        .unwrap_or(false)
}

/// Creates a new user account.
///
/// Name, email and password must be non-empty. The email is trimmed and must not already
/// be registered.
///
/// # Errors
/// Returns [`Error::Validation`] for blank fields and [`Error::Duplicate`] when the email
/// is taken.
#[instrument(skip(db, password))]
pub async fn register_user(
    db: &DatabaseConnection,
    name: &str,
    email: &str,
    password: &str,
    role: Role,
) -> Result<user::Model> {
    let name = name.trim();
    let email = email.trim();
    if name.is_empty() || email.is_empty() || password.is_empty() {
        return Err(Error::validation("Missing fields"));
    }

    let user = user::ActiveModel {
        name: Set(name.to_string()),
        email: Set(email.to_string()),
        password_hash: Set(hash_password(password)?),
        role: Set(role),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    };
    let user = user
        .insert(db)
        .await
        .map_err(|e| Error::from_unique_violation(e, "Email already registered"))?;

    audit::record(
        db,
        AuditEvent::new(None, AuditAction::Register, "user")
            .entity(user.id)
            .metadata(json!({ "email": user.email, "role": user.role })),
    )
    .await;

    info!("Registered {} account {}", user.role, user.id);
    Ok(user)
}

/// Checks an email/password pair and returns the matching user.
///
/// # Errors
/// Returns [`Error::Unauthorized`] when the email is unknown or the password is wrong.
#[instrument(skip(db, password))]
pub async fn authenticate(
    db: &DatabaseConnection,
    email: &str,
    password: &str,
) -> Result<user::Model> {
    let unauthorized = || Error::Unauthorized {
        message: INVALID_CREDENTIALS.to_string(),
    };

    let user = User::find()
        .filter(user::Column::Email.eq(email.trim()))
        .one(db)
        .await?
        .ok_or_else(unauthorized)?;

    if verify_password(password, &user.password_hash) {
        Ok(user)
    } else {
        warn!("Failed login for user {}", user.id);
        Err(unauthorized())
    }
}

pub async fn get_user_by_id<C>(db: &C, user_id: i64) -> Result<Option<user::Model>>
where
    C: ConnectionTrait,
{
    User::find_by_id(user_id).one(db).await.map_err(Into::into)
}

/// Creates the configured admin account when no users exist yet.
///
/// Returns the new admin, or `None` when the table already had rows.
pub async fn seed_default_admin(
    db: &DatabaseConnection,
    seed: &AdminSeedConfig,
) -> Result<Option<user::Model>> {
    if User::find().count(db).await? > 0 {
        return Ok(None);
    }

    let admin = register_user(db, &seed.name, &seed.email, &seed.password, Role::Admin).await?;
    warn!(
        "Seeded default admin {}; change its password before exposing the service.",
        admin.email
    );
    Ok(Some(admin))
}
