//! Shared test utilities.
//!
//! This module provides common helper functions for setting up test databases
//! and creating test entities with sensible defaults.

use crate::{
    core::{class, session, student},
    entities::{self, Role},
    errors::Result,
};
use chrono::{DateTime, Local, NaiveDate, TimeZone, Utc};
use sea_orm::{ActiveModelTrait, DatabaseConnection, Set};

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Inserts a user directly, skipping password hashing.
///
/// The stored hash is not a valid PHC string, so these users cannot log in. Use
/// `core::user::register_user` when a test needs credentials.
pub async fn create_test_user(
    db: &DatabaseConnection,
    email: &str,
    role: Role,
) -> Result<entities::user::Model> {
    entities::user::ActiveModel {
        name: Set(email.split('@').next().unwrap_or(email).to_string()),
        email: Set(email.to_string()),
        password_hash: Set("not-a-hash".to_string()),
        role: Set(role),
        created_at: Set(Utc::now()),
        ..Default::default()
    }
    .insert(db)
    .await
    .map_err(Into::into)
}

/// Creates a class taught by `teacher_id`.
pub async fn create_test_class(
    db: &DatabaseConnection,
    name: &str,
    teacher_id: i64,
) -> Result<entities::class::Model> {
    class::create_class(
        db,
        class::NewClass {
            name: name.to_string(),
            code: None,
            teacher_id: Some(teacher_id),
            schedule: None,
        },
        teacher_id,
    )
    .await
}

/// Creates (or reuses) an untimed session for 2024-03-01.
pub async fn create_test_session(
    db: &DatabaseConnection,
    class_id: i64,
    actor_id: i64,
) -> Result<entities::session::Model> {
    let date = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap_or_default();
    session::ensure_session(db, class_id, date, None, None, actor_id).await
}

/// The instant at which the server's local wall clock reads `hour:minute` on `date`.
#[must_use]
pub fn local_instant(date: NaiveDate, hour: u32, minute: u32) -> DateTime<Utc> {
    let naive = date.and_hms_opt(hour, minute, 0).unwrap_or_default();
    Local
        .from_local_datetime(&naive)
        .earliest()
        .map_or_else(|| naive.and_utc(), |local| local.with_timezone(&Utc))
}

/// A populated database: one user per role, a class, and one enrolled student.
pub struct Fixture {
    pub db: DatabaseConnection,
    pub admin: entities::user::Model,
    pub teacher: entities::user::Model,
    /// Account the enrolled student logs in with
    pub student_user: entities::user::Model,
    pub class: entities::class::Model,
    pub student: entities::student::Model,
}

/// Sets up a complete test environment.
pub async fn setup_fixture() -> Result<Fixture> {
    let db = setup_test_db().await?;
    let admin = create_test_user(&db, "admin@campus.edu", Role::Admin).await?;
    let teacher = create_test_user(&db, "teacher@campus.edu", Role::Teacher).await?;
    let student_user = create_test_user(&db, "ann@campus.edu", Role::Student).await?;
    let class = create_test_class(&db, "Physics", teacher.id).await?;
    let student = student::add_student(
        &db,
        class.id,
        "S-100",
        "Ann",
        Some("ann@campus.edu".to_string()),
        teacher.id,
    )
    .await?;

    Ok(Fixture {
        db,
        admin,
        teacher,
        student_user,
        class,
        student,
    })
}
