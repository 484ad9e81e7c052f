//! Database configuration module.
//!
//! This module handles `SQLite` database connection and table creation using `SeaORM`.
//! Tables are generated from the entity definitions with `Schema::create_table_from_entity`,
//! so the schema always matches the Rust models. The one constraint the entities cannot
//! express, the unique (`session_id`, `student_id`) pair on attendance marks, is added as a
//! separate index.

use crate::entities::{Attendance, AuditLog, Class, Session, Student, User, attendance};
use crate::errors::Result;
use sea_orm::sea_query::Index;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Schema};
use tracing::{debug, info};

const DEFAULT_DATABASE_URL: &str = "sqlite://data/attendance.sqlite?mode=rwc";

/// Name of the unique index backing the one-mark-per-student-per-session invariant.
pub const ATTENDANCE_PAIR_INDEX: &str = "idx_attendance_session_student";

/// Gets the database URL from the `DATABASE_URL` environment variable, falling back to
/// a local `SQLite` file.
#[must_use]
pub fn get_database_url() -> String {
    std::env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string())
}

/// Establishes a connection to the database at `database_url`.
///
/// For an `SQLite` file URL the parent directory is created first.
pub async fn create_connection(database_url: &str) -> Result<DatabaseConnection> {
    debug!("Connecting to database at {}", database_url);
    if let Some(dir) = sqlite_file_dir(database_url) {
        std::fs::create_dir_all(dir)?;
    }
    Database::connect(database_url).await.map_err(Into::into)
}

/// Parent directory of the file named by a `sqlite://` URL, if it has one.
fn sqlite_file_dir(database_url: &str) -> Option<&std::path::Path> {
    let path = database_url.strip_prefix("sqlite://")?;
    let path = path.split('?').next()?;
    std::path::Path::new(path)
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
}

/// Creates all tables and indexes if they do not already exist.
///
/// Order matters only for readability; `SQLite` resolves foreign keys lazily.
pub async fn create_tables<C>(db: &C) -> Result<()>
where
    C: ConnectionTrait,
{
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);

    let statements = [
        schema.create_table_from_entity(User),
        schema.create_table_from_entity(Class),
        schema.create_table_from_entity(Student),
        schema.create_table_from_entity(Session),
        schema.create_table_from_entity(Attendance),
        schema.create_table_from_entity(AuditLog),
    ];

    for mut statement in statements {
        statement.if_not_exists();
        db.execute(builder.build(&statement)).await?;
    }

    let pair_index = Index::create()
        .name(ATTENDANCE_PAIR_INDEX)
        .table(Attendance)
        .col(attendance::Column::SessionId)
        .col(attendance::Column::StudentId)
        .unique()
        .if_not_exists()
        .to_owned();
    db.execute(builder.build(&pair_index)).await?;

    info!("Database tables ensured.");
    Ok(())
}
