//! Student roster business logic.
//!
//! Students are looked up either by primary key or by their institution-issued external
//! id, which is what the self-mark path receives.

use crate::{
    core::audit::{self, AuditAction, AuditEvent},
    entities::{Student, student},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, prelude::*};
use serde_json::json;
use tracing::instrument;

/// Adds a student to a class.
///
/// # Errors
/// Returns [`Error::Validation`] when the external id or name is blank,
/// [`Error::NotFound`] when the class does not exist, and [`Error::Duplicate`] when the
/// external id is already registered.
#[instrument(skip(db, name, email))]
pub async fn add_student(
    db: &DatabaseConnection,
    class_id: i64,
    student_ext_id: &str,
    name: &str,
    email: Option<String>,
    actor_id: i64,
) -> Result<student::Model> {
    let student_ext_id = student_ext_id.trim();
    let name = name.trim();
    if student_ext_id.is_empty() || name.is_empty() {
        return Err(Error::validation("Missing fields"));
    }

    crate::core::class::get_class_by_id(db, class_id)
        .await?
        .ok_or_else(|| Error::not_found("Class", class_id))?;

    let student = student::ActiveModel {
        student_ext_id: Set(student_ext_id.to_string()),
        name: Set(name.to_string()),
        email: Set(email.filter(|e| !e.trim().is_empty())),
        class_id: Set(class_id),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    };
    let student = student
        .insert(db)
        .await
        .map_err(|e| Error::from_unique_violation(e, "Student ID exists"))?;

    audit::record(
        db,
        AuditEvent::new(Some(actor_id), AuditAction::Create, "student")
            .entity(student.id)
            .metadata(json!({ "classId": class_id })),
    )
    .await;

    Ok(student)
}

/// Lists the students of a class ordered by name.
pub async fn list_students_for_class(
    db: &DatabaseConnection,
    class_id: i64,
) -> Result<Vec<student::Model>> {
    Student::find()
        .filter(student::Column::ClassId.eq(class_id))
        .order_by_asc(student::Column::Name)
        .all(db)
        .await
        .map_err(Into::into)
}

pub async fn get_student_by_id<C>(db: &C, student_id: i64) -> Result<Option<student::Model>>
where
    C: ConnectionTrait,
{
    Student::find_by_id(student_id).one(db).await.map_err(Into::into)
}

pub async fn get_student_by_ext_id<C>(
    db: &C,
    student_ext_id: &str,
) -> Result<Option<student::Model>>
where
    C: ConnectionTrait,
{
    Student::find()
        .filter(student::Column::StudentExtId.eq(student_ext_id))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Removes a student; their attendance marks cascade with them.
///
/// Returns whether a row was deleted. An audit entry is written either way.
#[instrument(skip(db))]
pub async fn delete_student(
    db: &DatabaseConnection,
    student_id: i64,
    actor_id: i64,
) -> Result<bool> {
    let result = Student::delete_by_id(student_id).exec(db).await?;

    audit::record(
        db,
        AuditEvent::new(Some(actor_id), AuditAction::Delete, "student").entity(student_id),
    )
    .await;

    Ok(result.rows_affected > 0)
}
