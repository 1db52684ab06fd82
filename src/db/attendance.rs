use chrono::Utc;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::models::{
    AttendanceRecord, AttendanceSheet, NewAttendanceSheetRequest, attendance_percentage,
};

const SHEET_COLUMNS: &str = "id, teacher_id, department_id, date_from, date_to, \
                             total_lectures, shared_with_students, created_at";

/// Percentage is derived from the counts at read time, never stored.
const RECORD_COLUMNS: &str = "id, sheet_id, student_id, lectures_attended, total_lectures, \
     CASE WHEN total_lectures > 0 \
          THEN ROUND(lectures_attended * 100.0 / total_lectures, 2) \
          ELSE 0 END AS percentage";

pub async fn insert_sheet(
    db: &SqlitePool,
    req: NewAttendanceSheetRequest,
) -> Result<AttendanceSheet, sqlx::Error> {
    let id = Uuid::new_v4().to_string();
    let now = Utc::now().to_rfc3339();
    let shared = req.shared_with_students.unwrap_or(false);

    sqlx::query(
        "INSERT INTO attendance_sheets \
            (id, teacher_id, department_id, date_from, date_to, total_lectures, \
             shared_with_students, created_at) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&id)
    .bind(&req.teacher_id)
    .bind(&req.department_id)
    .bind(&req.date_from)
    .bind(&req.date_to)
    .bind(req.total_lectures)
    .bind(shared)
    .bind(&now)
    .execute(db)
    .await?;

    Ok(AttendanceSheet {
        id,
        teacher_id: req.teacher_id,
        department_id: req.department_id,
        date_from: req.date_from,
        date_to: req.date_to,
        total_lectures: req.total_lectures,
        shared_with_students: shared,
        created_at: now,
    })
}

pub async fn find_sheet_by_id(
    db: &SqlitePool,
    id: &str,
) -> Result<Option<AttendanceSheet>, sqlx::Error> {
    sqlx::query_as::<_, AttendanceSheet>(&format!(
        "SELECT {SHEET_COLUMNS} FROM attendance_sheets WHERE id = ?"
    ))
    .bind(id)
    .fetch_optional(db)
    .await
}

pub async fn fetch_sheets_for_teacher(
    db: &SqlitePool,
    teacher_id: &str,
) -> Result<Vec<AttendanceSheet>, sqlx::Error> {
    sqlx::query_as::<_, AttendanceSheet>(&format!(
        "SELECT {SHEET_COLUMNS} FROM attendance_sheets \
         WHERE teacher_id = ? ORDER BY created_at DESC"
    ))
    .bind(teacher_id)
    .fetch_all(db)
    .await
}

pub async fn delete_sheet(db: &SqlitePool, id: &str) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM attendance_sheets WHERE id = ?")
        .bind(id)
        .execute(db)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// Mark one student's count on a sheet; re-marking replaces the previous
/// count rather than erroring. The record's total is copied from the sheet.
pub async fn record_attendance(
    db: &SqlitePool,
    sheet: &AttendanceSheet,
    student_id: &str,
    lectures_attended: i64,
) -> Result<AttendanceRecord, sqlx::Error> {
    sqlx::query(
        "INSERT INTO attendance_records \
            (id, sheet_id, student_id, lectures_attended, total_lectures) \
         VALUES (?, ?, ?, ?, ?) \
         ON CONFLICT(sheet_id, student_id) \
         DO UPDATE SET lectures_attended = excluded.lectures_attended, \
                       total_lectures = excluded.total_lectures",
    )
    .bind(Uuid::new_v4().to_string())
    .bind(&sheet.id)
    .bind(student_id)
    .bind(lectures_attended)
    .bind(sheet.total_lectures)
    .execute(db)
    .await?;

    // Re-read the id so the caller sees the surviving row on a re-mark.
    let (id,): (String,) = sqlx::query_as(
        "SELECT id FROM attendance_records WHERE sheet_id = ? AND student_id = ?",
    )
    .bind(&sheet.id)
    .bind(student_id)
    .fetch_one(db)
    .await?;

    Ok(AttendanceRecord {
        id,
        sheet_id: sheet.id.clone(),
        student_id: student_id.to_string(),
        lectures_attended,
        total_lectures: sheet.total_lectures,
        percentage: attendance_percentage(lectures_attended, sheet.total_lectures),
    })
}

pub async fn fetch_records(
    db: &SqlitePool,
    sheet_id: &str,
) -> Result<Vec<AttendanceRecord>, sqlx::Error> {
    sqlx::query_as::<_, AttendanceRecord>(&format!(
        "SELECT {RECORD_COLUMNS} FROM attendance_records r \
         WHERE sheet_id = ? \
         ORDER BY (SELECT enrollment_no FROM students s WHERE s.id = r.student_id)"
    ))
    .bind(sheet_id)
    .fetch_all(db)
    .await
}

/// A student's records across all sheets, for the attendance dashboard.
pub async fn fetch_records_for_student(
    db: &SqlitePool,
    student_id: &str,
) -> Result<Vec<AttendanceRecord>, sqlx::Error> {
    sqlx::query_as::<_, AttendanceRecord>(&format!(
        "SELECT {RECORD_COLUMNS} FROM attendance_records \
         WHERE student_id = ? ORDER BY sheet_id"
    ))
    .bind(student_id)
    .fetch_all(db)
    .await
}
