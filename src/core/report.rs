//! Attendance reports.
//!
//! This module computes per-class summaries, per-student attendance percentages, and a
//! single student's dated history. Percentages count `present` against every recorded
//! mark; `late`, `absent` and `excused` all count as not present. All functions return
//! structured data and leave formatting to the caller.

use crate::{
    entities::{
        Attendance, AttendanceStatus, Class, Session, Student, attendance, class, session, student,
    },
    errors::{Error, Result},
};
use chrono::NaiveDate;
use sea_orm::{QueryOrder, prelude::*};
use serde::Serialize;
use std::collections::HashMap;

/// Headline numbers for one class.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassSummary {
    pub class_id: i64,
    pub class_name: String,
    pub student_count: usize,
    pub session_count: usize,
    /// Percentage of marks in this class's sessions that are `present`
    pub average_attendance: f64,
}

/// Attendance percentage for one student of a class.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentAttendance {
    pub student_id: i64,
    pub name: String,
    pub ext_id: String,
    pub attendance_percent: f64,
}

/// One dated line of a student's history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentAttendanceEntry {
    pub session_id: i64,
    pub date: NaiveDate,
    pub status: AttendanceStatus,
}

/// A student's full attendance history.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentReport {
    pub student: student::Model,
    pub class_name: Option<String>,
    pub entries: Vec<StudentAttendanceEntry>,
}

/// Present marks as a percentage of all marks, rounded to one decimal. Zero marks is 0%.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn attendance_percent(present: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    (present as f64 / total as f64 * 1000.0).round() / 10.0
}

fn count_present(marks: &[&attendance::Model]) -> usize {
    marks
        .iter()
        .filter(|m| m.status == AttendanceStatus::Present)
        .count()
}

/// Summarises every class: roster size, number of sessions, and average attendance.
pub async fn class_summaries(db: &DatabaseConnection) -> Result<Vec<ClassSummary>> {
    let classes = Class::find().order_by_asc(class::Column::Id).all(db).await?;
    let students = Student::find().all(db).await?;
    let sessions = Session::find().all(db).await?;
    let marks = Attendance::find().all(db).await?;

    let session_class: HashMap<i64, i64> = sessions.iter().map(|s| (s.id, s.class_id)).collect();

    let summaries = classes
        .into_iter()
        .map(|class| {
            let student_count = students.iter().filter(|s| s.class_id == class.id).count();
            let session_count = sessions.iter().filter(|s| s.class_id == class.id).count();
            let class_marks: Vec<&attendance::Model> = marks
                .iter()
                .filter(|m| session_class.get(&m.session_id) == Some(&class.id))
                .collect();

            ClassSummary {
                class_id: class.id,
                class_name: class.name,
                student_count,
                session_count,
                average_attendance: attendance_percent(
                    count_present(&class_marks),
                    class_marks.len(),
                ),
            }
        })
        .collect();

    Ok(summaries)
}

/// Attendance percentage of every student currently in the class.
///
/// # Errors
/// Returns [`Error::NotFound`] when the class does not exist.
pub async fn class_report(
    db: &DatabaseConnection,
    class_id: i64,
) -> Result<Vec<StudentAttendance>> {
    crate::core::class::get_class_by_id(db, class_id)
        .await?
        .ok_or_else(|| Error::not_found("Class", class_id))?;

    let students = crate::core::student::list_students_for_class(db, class_id).await?;
    let student_ids: Vec<i64> = students.iter().map(|s| s.id).collect();
    let marks = Attendance::find()
        .filter(attendance::Column::StudentId.is_in(student_ids))
        .all(db)
        .await?;

    Ok(students
        .into_iter()
        .map(|student| {
            let own: Vec<&attendance::Model> =
                marks.iter().filter(|m| m.student_id == student.id).collect();
            StudentAttendance {
                student_id: student.id,
                name: student.name,
                ext_id: student.student_ext_id,
                attendance_percent: attendance_percent(count_present(&own), own.len()),
            }
        })
        .collect())
}

/// Every mark recorded for a student, newest session date first.
///
/// # Errors
/// Returns [`Error::NotFound`] when the student does not exist.
pub async fn student_report(db: &DatabaseConnection, student_id: i64) -> Result<StudentReport> {
    let student = crate::core::student::get_student_by_id(db, student_id)
        .await?
        .ok_or_else(|| Error::not_found("Student", student_id))?;
    let class_name = crate::core::class::get_class_by_id(db, student.class_id)
        .await?
        .map(|c| c.name);

    let rows: Vec<(attendance::Model, Option<session::Model>)> = Attendance::find()
        .filter(attendance::Column::StudentId.eq(student_id))
        .find_also_related(Session)
        .order_by_desc(session::Column::Date)
        .order_by_desc(attendance::Column::Id)
        .all(db)
        .await?;

    let entries = rows
        .into_iter()
        .filter_map(|(mark, session)| {
            session.map(|s| StudentAttendanceEntry {
                session_id: s.id,
                date: s.date,
                status: mark.status,
            })
        })
        .collect();

    Ok(StudentReport {
        student,
        class_name,
        entries,
    })
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::core::{attendance::mark_attendance, session::ensure_session, student::add_student};
    use crate::test_utils::*;

    #[test]
    fn test_attendance_percent() {
        assert_eq!(attendance_percent(0, 0), 0.0);
        assert_eq!(attendance_percent(1, 1), 100.0);
        assert_eq!(attendance_percent(1, 3), 33.3);
        assert_eq!(attendance_percent(2, 3), 66.7);
    }

    #[tokio::test]
    async fn test_reports() -> Result<()> {
        let fixture = setup_fixture().await?;
        let db = &fixture.db;
        let other =
            add_student(db, fixture.class.id, "S-200", "Bea", None, fixture.teacher.id).await?;
        let empty_class = create_test_class(db, "Empty", fixture.teacher.id).await?;

        let d1 = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let d2 = NaiveDate::from_ymd_opt(2024, 3, 2).unwrap();
        let s1 = ensure_session(db, fixture.class.id, d1, None, None, fixture.teacher.id).await?;
        let s2 = ensure_session(db, fixture.class.id, d2, None, None, fixture.teacher.id).await?;

        mark_attendance(
            db,
            s1.id,
            fixture.student.id,
            AttendanceStatus::Present,
            fixture.teacher.id,
        )
        .await?;
        mark_attendance(
            db,
            s2.id,
            fixture.student.id,
            AttendanceStatus::Late,
            fixture.teacher.id,
        )
        .await?;
        mark_attendance(db, s1.id, other.id, AttendanceStatus::Present, fixture.teacher.id).await?;

        let summaries = class_summaries(db).await?;
        let main = summaries.iter().find(|s| s.class_id == fixture.class.id).unwrap();
        assert_eq!(main.student_count, 2);
        assert_eq!(main.session_count, 2);
        assert_eq!(main.average_attendance, 66.7);
        let empty = summaries.iter().find(|s| s.class_id == empty_class.id).unwrap();
        assert_eq!(empty.average_attendance, 0.0);

        let per_student = class_report(db, fixture.class.id).await?;
        let ann = per_student.iter().find(|s| s.student_id == fixture.student.id).unwrap();
        assert_eq!(ann.attendance_percent, 50.0);
        let bea = per_student.iter().find(|s| s.student_id == other.id).unwrap();
        assert_eq!(bea.attendance_percent, 100.0);

        let history = student_report(db, fixture.student.id).await?;
        assert_eq!(history.class_name.as_deref(), Some(fixture.class.name.as_str()));
        assert_eq!(history.entries.len(), 2);
        assert_eq!(history.entries[0].date, d2);
        assert_eq!(history.entries[0].status, AttendanceStatus::Late);
        assert_eq!(history.entries[1].date, d1);

        assert!(matches!(class_report(db, 999).await, Err(Error::NotFound { .. })));
        assert!(matches!(student_report(db, 999).await, Err(Error::NotFound { .. })));
        Ok(())
    }
}
