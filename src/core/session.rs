//! Session manager - Exactly one attendance session per class and date.
//!
//! Sessions are created lazily on first access and start out `open`. Uniqueness of
//! (`class_id`, `date`) is not a database constraint; it holds because lookup and insert
//! run inside the same transaction. Start and end times are fixed at creation.

use crate::{
    core::audit::{self, AuditAction, AuditEvent},
    entities::{Session, SessionStatus, session},
    errors::{Error, Result},
};
use chrono::{NaiveDate, NaiveTime};
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*};
use serde_json::json;
use tracing::{debug, info, instrument};

/// Returns the session for (`class_id`, `date`), creating an `open` one if none exists.
///
/// An existing session is returned as-is; `start_time`/`end_time` only apply to a newly
/// created row. Looking up does not require staff privileges, creating does, and that
/// check belongs to the caller.
///
/// # Errors
/// Returns [`Error::Validation`] when both times are given and end precedes start, and
/// [`Error::NotFound`] when the class does not exist.
#[instrument(skip(db))]
pub async fn ensure_session(
    db: &DatabaseConnection,
    class_id: i64,
    date: NaiveDate,
    start_time: Option<NaiveTime>,
    end_time: Option<NaiveTime>,
    actor_id: i64,
) -> Result<session::Model> {
    if let (Some(start), Some(end)) = (start_time, end_time) {
        if end < start {
            return Err(Error::validation("End time must not be before start time"));
        }
    }

    let txn = db.begin().await?;
    let (session, created) =
        find_or_create_session(&txn, class_id, date, start_time, end_time, actor_id).await?;
    txn.commit().await?;

    if created {
        record_session_created(db, &session, actor_id).await;
    }
    Ok(session)
}

/// Transaction-scoped half of [`ensure_session`]. Returns the session and whether it was
/// created by this call. The caller writes the audit entry after committing.
pub(crate) async fn find_or_create_session<C>(
    db: &C,
    class_id: i64,
    date: NaiveDate,
    start_time: Option<NaiveTime>,
    end_time: Option<NaiveTime>,
    actor_id: i64,
) -> Result<(session::Model, bool)>
where
    C: ConnectionTrait,
{
    if let Some(existing) = find_session_for_date(db, class_id, date).await? {
        debug!("Reusing session {} for class {} on {}", existing.id, class_id, date);
        return Ok((existing, false));
    }

    crate::core::class::get_class_by_id(db, class_id)
        .await?
        .ok_or_else(|| Error::not_found("Class", class_id))?;

    let session = session::ActiveModel {
        class_id: Set(class_id),
        date: Set(date),
        start_time: Set(start_time),
        end_time: Set(end_time),
        status: Set(SessionStatus::Open),
        created_by: Set(actor_id),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    }
    .insert(db)
    .await?;

    info!("Opened session {} for class {} on {}", session.id, class_id, date);
    Ok((session, true))
}

pub(crate) async fn record_session_created<C>(db: &C, session: &session::Model, actor_id: i64)
where
    C: ConnectionTrait,
{
    audit::record(
        db,
        AuditEvent::new(Some(actor_id), AuditAction::Create, "session")
            .entity(session.id)
            .metadata(json!({ "classId": session.class_id, "date": session.date })),
    )
    .await;
}

/// First session (lowest id) for the pair, if any.
async fn find_session_for_date<C>(
    db: &C,
    class_id: i64,
    date: NaiveDate,
) -> Result<Option<session::Model>>
where
    C: ConnectionTrait,
{
    Session::find()
        .filter(session::Column::ClassId.eq(class_id))
        .filter(session::Column::Date.eq(date))
        .order_by_asc(session::Column::Id)
        .one(db)
        .await
        .map_err(Into::into)
}

pub async fn get_session_by_id<C>(db: &C, session_id: i64) -> Result<Option<session::Model>>
where
    C: ConnectionTrait,
{
    Session::find_by_id(session_id).one(db).await.map_err(Into::into)
}

/// Lists sessions, optionally narrowed to a class and/or a date, newest date first.
pub async fn list_sessions(
    db: &DatabaseConnection,
    class_id: Option<i64>,
    date: Option<NaiveDate>,
) -> Result<Vec<session::Model>> {
    let mut query = Session::find();
    if let Some(class_id) = class_id {
        query = query.filter(session::Column::ClassId.eq(class_id));
    }
    if let Some(date) = date {
        query = query.filter(session::Column::Date.eq(date));
    }
    query
        .order_by_desc(session::Column::Date)
        .order_by_asc(session::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[tokio::test]
    async fn test_ensure_session_returns_same_session() -> Result<()> {
        let fixture = setup_fixture().await?;
        let day = date("2024-03-01");

        let first = ensure_session(
            &fixture.db,
            fixture.class.id,
            day,
            None,
            None,
            fixture.teacher.id,
        )
        .await?;
        let second = ensure_session(
            &fixture.db,
            fixture.class.id,
            day,
            None,
            None,
            fixture.teacher.id,
        )
        .await?;

        assert_eq!(first.id, second.id);
        assert_eq!(first.status, SessionStatus::Open);
        assert_eq!(first.created_by, fixture.teacher.id);

        let all = list_sessions(&fixture.db, Some(fixture.class.id), Some(day)).await?;
        assert_eq!(all.len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_ensure_session_keeps_original_times() -> Result<()> {
        let fixture = setup_fixture().await?;
        let day = date("2024-03-01");
        let nine = NaiveTime::from_hms_opt(9, 0, 0);
        let ten = NaiveTime::from_hms_opt(10, 0, 0);

        let first = ensure_session(
            &fixture.db,
            fixture.class.id,
            day,
            nine,
            ten,
            fixture.teacher.id,
        )
        .await?;
        let second = ensure_session(
            &fixture.db,
            fixture.class.id,
            day,
            None,
            None,
            fixture.teacher.id,
        )
        .await?;

        assert_eq!(second.id, first.id);
        assert_eq!(second.start_time, nine);
        assert_eq!(second.end_time, ten);
        Ok(())
    }

    #[tokio::test]
    async fn test_ensure_session_distinct_per_date_and_class() -> Result<()> {
        let fixture = setup_fixture().await?;
        let other_class = create_test_class(&fixture.db, "Chemistry", fixture.teacher.id).await?;

        let a = ensure_session(
            &fixture.db,
            fixture.class.id,
            date("2024-03-01"),
            None,
            None,
            fixture.teacher.id,
        )
        .await?;
        let b = ensure_session(
            &fixture.db,
            fixture.class.id,
            date("2024-03-02"),
            None,
            None,
            fixture.teacher.id,
        )
        .await?;
        let c = ensure_session(
            &fixture.db,
            other_class.id,
            date("2024-03-01"),
            None,
            None,
            fixture.teacher.id,
        )
        .await?;

        assert_ne!(a.id, b.id);
        assert_ne!(a.id, c.id);

        let for_class = list_sessions(&fixture.db, Some(fixture.class.id), None).await?;
        assert_eq!(for_class.len(), 2);
        // Newest date first
        assert_eq!(for_class[0].id, b.id);

        let on_day = list_sessions(&fixture.db, None, Some(date("2024-03-01"))).await?;
        assert_eq!(on_day.len(), 2);
        Ok(())
    }

    #[tokio::test]
    async fn test_ensure_session_unknown_class() -> Result<()> {
        let fixture = setup_fixture().await?;
        let result = ensure_session(
            &fixture.db,
            999,
            date("2024-03-01"),
            None,
            None,
            fixture.teacher.id,
        )
        .await;
        assert!(matches!(result, Err(Error::NotFound { entity: "Class", .. })));
        Ok(())
    }

    #[tokio::test]
    async fn test_ensure_session_rejects_inverted_times() -> Result<()> {
        let fixture = setup_fixture().await?;
        let result = ensure_session(
            &fixture.db,
            fixture.class.id,
            date("2024-03-01"),
            NaiveTime::from_hms_opt(10, 0, 0),
            NaiveTime::from_hms_opt(9, 0, 0),
            fixture.teacher.id,
        )
        .await;
        assert!(matches!(result, Err(Error::Validation { .. })));
        Ok(())
    }

    #[tokio::test]
    async fn test_ensure_session_audits_creation_only() -> Result<()> {
        let fixture = setup_fixture().await?;
        let before = crate::core::audit::list_recent(&fixture.db, 100).await?.len();

        let day = date("2024-03-01");
        ensure_session(&fixture.db, fixture.class.id, day, None, None, fixture.teacher.id).await?;
        ensure_session(&fixture.db, fixture.class.id, day, None, None, fixture.teacher.id).await?;

        let entries = crate::core::audit::list_recent(&fixture.db, 100).await?;
        assert_eq!(entries.len(), before + 1);
        assert_eq!(entries[0].action, "create");
        assert_eq!(entries[0].entity_type, "session");
        Ok(())
    }
}
