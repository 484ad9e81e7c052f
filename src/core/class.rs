//! Class business logic - Creating and listing classes.

use crate::{
    core::audit::{self, AuditAction, AuditEvent},
    entities::{Class, class},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, prelude::*};
use serde_json::json;
use tracing::instrument;

/// Fields accepted when creating a class.
#[derive(Debug, Clone, Default)]
pub struct NewClass {
    pub name: String,
    pub code: Option<String>,
    pub teacher_id: Option<i64>,
    /// Schedule as arbitrary JSON, stored verbatim
    pub schedule: Option<serde_json::Value>,
}

/// Creates a class and records an audit entry.
///
/// # Errors
/// Returns [`Error::Validation`] for an empty name, [`Error::NotFound`] for an unknown
/// teacher, and [`Error::Duplicate`] when the code is already in use.
#[instrument(skip(db, new_class), fields(name = %new_class.name))]
pub async fn create_class(
    db: &DatabaseConnection,
    new_class: NewClass,
    actor_id: i64,
) -> Result<class::Model> {
    let name = new_class.name.trim();
    if name.is_empty() {
        return Err(Error::validation("Name required"));
    }

    if let Some(teacher_id) = new_class.teacher_id {
        crate::core::user::get_user_by_id(db, teacher_id)
            .await?
            .ok_or_else(|| Error::not_found("Teacher", teacher_id))?;
    }

    // Blank codes are treated as absent so they never collide on the unique index
    let code = new_class
        .code
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty());

    let class = class::ActiveModel {
        name: Set(name.to_string()),
        code: Set(code),
        teacher_id: Set(new_class.teacher_id),
        schedule_json: Set(new_class.schedule.map(|s| s.to_string())),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    };
    let class = class
        .insert(db)
        .await
        .map_err(|e| Error::from_unique_violation(e, "Class code already in use"))?;

    audit::record(
        db,
        AuditEvent::new(Some(actor_id), AuditAction::Create, "class")
            .entity(class.id)
            .metadata(json!({
                "name": class.name,
                "code": class.code,
                "teacherId": class.teacher_id,
            })),
    )
    .await;

    Ok(class)
}

/// Lists all classes ordered by name.
pub async fn list_classes(db: &DatabaseConnection) -> Result<Vec<class::Model>> {
    Class::find()
        .order_by_asc(class::Column::Name)
        .all(db)
        .await
        .map_err(Into::into)
}

pub async fn get_class_by_id<C>(db: &C, class_id: i64) -> Result<Option<class::Model>>
where
    C: ConnectionTrait,
{
    Class::find_by_id(class_id).one(db).await.map_err(Into::into)
}
