//! Attendance marking engine - The only writer of attendance marks.
//!
//! A mark is accepted when its session exists, is not finalized, and the current time
//! falls inside the session's marking window. Marks are upserted on
//! (`session_id`, `student_id`): replaying a request converges on the latest status and
//! never produces a second row. The check-then-write sequence runs in one transaction.
//!
//! Every operation that depends on the clock has an `_at` variant taking the current
//! instant explicitly; the plain variant uses `Utc::now()`.

use crate::{
    core::audit::{self, AuditAction, AuditEvent},
    entities::{Attendance, AttendanceStatus, SessionStatus, attendance, session},
    errors::{Error, Result},
};
use chrono::{DateTime, Duration, Local, NaiveDateTime, Utc};
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*, sea_query::OnConflict};
use serde_json::json;
use tracing::{debug, info, instrument};

/// Grace period after a session's end time during which marks are still accepted.
pub const CUTOFF_MINUTES: i64 = 30;

/// Returns the inclusive local-time window `[date + start, date + end + cutoff]` in which
/// the session accepts marks, or `None` when the session has no start or no end time and
/// therefore accepts marks at any time.
#[must_use]
pub fn marking_window(session: &session::Model) -> Option<(NaiveDateTime, NaiveDateTime)> {
    let (start, end) = (session.start_time?, session.end_time?);
    let opens = session.date.and_time(start);
    let closes = session.date.and_time(end) + Duration::minutes(CUTOFF_MINUTES);
    Some((opens, closes))
}

/// Whether `now`, taken in server local time, falls inside the session's marking window.
#[must_use]
pub fn is_within_window(session: &session::Model, now: DateTime<Utc>) -> bool {
    let local_now = now.with_timezone(&Local).naive_local();
    marking_window(session).is_none_or(|(opens, closes)| opens <= local_now && local_now <= closes)
}

/// Rejects writes against a finalized session or outside the marking window.
pub(crate) fn ensure_markable(session: &session::Model, now: DateTime<Utc>) -> Result<()> {
    if session.is_finalized() {
        return Err(Error::SessionFinalized {
            session_id: session.id,
        });
    }
    if !is_within_window(session, now) {
        return Err(Error::OutsideMarkingWindow {
            session_id: session.id,
        });
    }
    Ok(())
}

pub(crate) async fn find_mark<C>(
    db: &C,
    session_id: i64,
    student_id: i64,
) -> Result<Option<attendance::Model>>
where
    C: ConnectionTrait,
{
    Attendance::find()
        .filter(attendance::Column::SessionId.eq(session_id))
        .filter(attendance::Column::StudentId.eq(student_id))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Records `status` for a student in a session, overwriting any earlier mark.
///
/// See [`mark_attendance_at`].
pub async fn mark_attendance(
    db: &DatabaseConnection,
    session_id: i64,
    student_id: i64,
    status: AttendanceStatus,
    actor_id: i64,
) -> Result<attendance::Model> {
    mark_attendance_at(db, session_id, student_id, status, actor_id, Utc::now()).await
}

/// Records `status` for a student in a session as of `now`.
///
/// An existing mark for the pair has its status, marker and timestamp replaced in place.
/// One audit entry is written per successful call; rejected attempts leave no trace.
///
/// # Errors
/// - [`Error::NotFound`] when the session or student does not exist
/// - [`Error::SessionFinalized`] when the session is finalized
/// - [`Error::OutsideMarkingWindow`] when `now` is outside the session's window
#[instrument(skip(db))]
pub async fn mark_attendance_at(
    db: &DatabaseConnection,
    session_id: i64,
    student_id: i64,
    status: AttendanceStatus,
    actor_id: i64,
    now: DateTime<Utc>,
) -> Result<attendance::Model> {
    let txn = db.begin().await?;

    let session = crate::core::session::get_session_by_id(&txn, session_id)
        .await?
        .ok_or_else(|| Error::not_found("Session", session_id))?;
    crate::core::student::get_student_by_id(&txn, student_id)
        .await?
        .ok_or_else(|| Error::not_found("Student", student_id))?;

    ensure_markable(&session, now)?;

    let mark = attendance::ActiveModel {
        session_id: Set(session_id),
        student_id: Set(student_id),
        status: Set(status),
        marked_by: Set(actor_id),
        marked_at: Set(now),
        ..Default::default()
    };
    Attendance::insert(mark)
        .on_conflict(
            OnConflict::columns([attendance::Column::SessionId, attendance::Column::StudentId])
                .update_columns([
                    attendance::Column::Status,
                    attendance::Column::MarkedBy,
                    attendance::Column::MarkedAt,
                ])
                .to_owned(),
        )
        .exec_without_returning(&txn)
        .await?;

    let stored = find_mark(&txn, session_id, student_id)
        .await?
        .ok_or_else(|| Error::not_found("Attendance", format!("{session_id}/{student_id}")))?;
    txn.commit().await?;

    debug!("Marked student {} {} in session {}", student_id, status, session_id);
    audit::record(
        db,
        AuditEvent::new(Some(actor_id), AuditAction::Mark, "attendance")
            .entity(stored.id)
            .metadata(json!({
                "sessionId": session_id,
                "studentId": student_id,
                "status": status,
            })),
    )
    .await;

    Ok(stored)
}

/// Closes a session to further marking. Finalizing an already finalized session succeeds
/// without changing anything. Each successful call writes one audit entry.
///
/// # Errors
/// Returns [`Error::NotFound`] when the session does not exist.
#[instrument(skip(db))]
pub async fn finalize_session(
    db: &DatabaseConnection,
    session_id: i64,
    actor_id: i64,
) -> Result<session::Model> {
    let txn = db.begin().await?;

    let session = crate::core::session::get_session_by_id(&txn, session_id)
        .await?
        .ok_or_else(|| Error::not_found("Session", session_id))?;

    let session = if session.is_finalized() {
        session
    } else {
        let mut active: session::ActiveModel = session.into();
        active.status = Set(SessionStatus::Finalized);
        active.update(&txn).await?
    };
    txn.commit().await?;

    info!("Session {} finalized", session_id);
    audit::record(
        db,
        AuditEvent::new(Some(actor_id), AuditAction::Finalize, "session").entity(session_id),
    )
    .await;

    Ok(session)
}

/// Lists the marks recorded for a session, oldest first.
pub async fn list_session_marks(
    db: &DatabaseConnection,
    session_id: i64,
) -> Result<Vec<attendance::Model>> {
    Attendance::find()
        .filter(attendance::Column::SessionId.eq(session_id))
        .order_by_asc(attendance::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}
