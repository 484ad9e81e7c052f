//! Student self-service marking.
//!
//! A student may record their own attendance at most once per rolling 24 hours, across
//! all sessions. The mark always says `present` and goes into today's session for the
//! student's class, which is created on demand. Unlike the staff path this never
//! overwrites: if the pair already has a mark (typically a teacher's), the self-mark is
//! dropped and the existing status stands.

use crate::{
    core::{
        attendance::{ensure_markable, find_mark},
        audit::{self, AuditAction, AuditEvent},
        session::{find_or_create_session, record_session_created},
    },
    entities::{Attendance, AttendanceStatus, attendance, session, student},
    errors::{Error, Result},
};
use chrono::{DateTime, Duration, Local, Utc};
use sea_orm::{Set, TransactionTrait, prelude::*, sea_query::OnConflict};
use serde_json::json;
use tracing::{info, instrument};

/// Minimum spacing between two marks for the same student on the self-service path.
pub const SELF_MARK_COOLDOWN_HOURS: i64 = 24;

/// Result of a self-mark attempt that passed every check.
#[derive(Debug, Clone)]
pub struct SelfMarkOutcome {
    /// Today's session for the student's class
    pub session: session::Model,
    /// The mark now stored for the student in that session
    pub mark: attendance::Model,
    /// `false` when an existing mark was kept and this request was dropped
    pub recorded: bool,
}

/// Rejects the attempt unless `actor_id` is the account the student record belongs to.
///
/// A student record is linked to a user account by email, compared case-insensitively.
async fn ensure_own_record<C>(db: &C, student: &student::Model, actor_id: i64) -> Result<()>
where
    C: ConnectionTrait,
{
    let actor = crate::core::user::get_user_by_id(db, actor_id)
        .await?
        .ok_or_else(|| Error::Unauthorized {
            message: "Unknown account".to_string(),
        })?;

    let owns = student
        .email
        .as_deref()
        .is_some_and(|email| email.trim().eq_ignore_ascii_case(actor.email.trim()));
    if owns {
        Ok(())
    } else {
        Err(Error::Forbidden {
            message: "Students may only mark their own attendance".to_string(),
        })
    }
}

/// See [`self_mark_attendance_at`].
pub async fn self_mark_attendance(
    db: &DatabaseConnection,
    student_ext_id: &str,
    actor_id: i64,
) -> Result<SelfMarkOutcome> {
    self_mark_attendance_at(db, student_ext_id, actor_id, Utc::now()).await
}

/// Records the student identified by `student_ext_id` as present today, as of `now`.
///
/// "Today" is the server's local date at `now`. `actor_id` must be the account whose
/// email matches the student record's email.
///
/// The cooldown is checked before today's session is looked at, and it counts marks
/// from every recorder. A teacher's mark made earlier today therefore yields
/// [`Error::AlreadyMarked`]; the existing mark is only kept silently (`recorded ==
/// false`) when it is older than the cooldown.
///
/// # Errors
/// - [`Error::Validation`] when the external id is blank
/// - [`Error::NotFound`] when no student has that external id
/// - [`Error::Unauthorized`] when `actor_id` is not a known account
/// - [`Error::Forbidden`] when the student record belongs to someone else
/// - [`Error::AlreadyMarked`] when any mark for the student is less than 24 hours old
/// - [`Error::SessionFinalized`] when today's session is already finalized
/// - [`Error::OutsideMarkingWindow`] when today's session has times and `now` is outside them
#[instrument(skip(db))]
pub async fn self_mark_attendance_at(
    db: &DatabaseConnection,
    student_ext_id: &str,
    actor_id: i64,
    now: DateTime<Utc>,
) -> Result<SelfMarkOutcome> {
    let student_ext_id = student_ext_id.trim();
    if student_ext_id.is_empty() {
        return Err(Error::validation("Missing student id"));
    }

    let txn = db.begin().await?;

    let student = crate::core::student::get_student_by_ext_id(&txn, student_ext_id)
        .await?
        .ok_or_else(|| Error::not_found("Student", student_ext_id))?;
    ensure_own_record(&txn, &student, actor_id).await?;

    let since = now - Duration::hours(SELF_MARK_COOLDOWN_HOURS);
    let recent = Attendance::find()
        .filter(attendance::Column::StudentId.eq(student.id))
        .filter(attendance::Column::MarkedAt.gt(since))
        .one(&txn)
        .await?;
    if recent.is_some() {
        return Err(Error::AlreadyMarked {
            student_ext_id: student_ext_id.to_string(),
        });
    }

    let today = now.with_timezone(&Local).date_naive();
    let (session, created) =
        find_or_create_session(&txn, student.class_id, today, None, None, actor_id).await?;
    ensure_markable(&session, now)?;

    let mark = attendance::ActiveModel {
        session_id: Set(session.id),
        student_id: Set(student.id),
        status: Set(AttendanceStatus::Present),
        marked_by: Set(actor_id),
        marked_at: Set(now),
        ..Default::default()
    };
    let inserted = Attendance::insert(mark)
        .on_conflict(
            OnConflict::columns([attendance::Column::SessionId, attendance::Column::StudentId])
                .do_nothing()
                .to_owned(),
        )
        .exec_without_returning(&txn)
        .await?;

    let stored = find_mark(&txn, session.id, student.id)
        .await?
        .ok_or_else(|| Error::not_found("Attendance", format!("{}/{}", session.id, student.id)))?;
    txn.commit().await?;

    if created {
        record_session_created(db, &session, actor_id).await;
    }

    let recorded = inserted > 0;
    if recorded {
        audit::record(
            db,
            AuditEvent::new(Some(actor_id), AuditAction::SelfMark, "attendance")
                .entity(stored.id)
                .metadata(json!({ "sessionId": session.id, "studentId": student.id })),
        )
        .await;
    } else {
        info!(
            "Kept existing {} mark for student {} in session {}",
            stored.status, student.id, session.id
        );
    }

    Ok(SelfMarkOutcome {
        session,
        mark: stored,
        recorded,
    })
}
