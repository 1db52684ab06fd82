use chrono::Utc;
use sqlx::SqlitePool;
use tracing::info;
use uuid::Uuid;

use crate::db::people;
use crate::models::{Mark, MarkRequest, Marksheet, NewMarksheetRequest, grade_letter};

/// Every subject is marked out of 100, so the sheet maximum is 100 per
/// marks row.
const MAX_MARKS_PER_SUBJECT: f64 = 100.0;

const MARKSHEET_COLUMNS: &str =
    "id, student_id, teacher_id, department_id, semester, academic_year, \
     total_marks, percentage, final_grade, shared_with_students, created_at";

pub async fn insert_marksheet(
    db: &SqlitePool,
    req: NewMarksheetRequest,
) -> Result<Marksheet, sqlx::Error> {
    let id = Uuid::new_v4().to_string();
    let now = Utc::now().to_rfc3339();

    sqlx::query(
        "INSERT INTO marksheets \
            (id, student_id, teacher_id, department_id, semester, academic_year, created_at) \
         VALUES (?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&id)
    .bind(&req.student_id)
    .bind(&req.teacher_id)
    .bind(&req.department_id)
    .bind(req.semester)
    .bind(&req.academic_year)
    .bind(&now)
    .execute(db)
    .await?;

    Ok(Marksheet {
        id,
        student_id: req.student_id,
        teacher_id: req.teacher_id,
        department_id: req.department_id,
        semester: req.semester,
        academic_year: req.academic_year,
        total_marks: 0.0,
        percentage: 0.0,
        final_grade: String::new(),
        shared_with_students: true,
        created_at: now,
    })
}

pub async fn find_marksheet_by_id(
    db: &SqlitePool,
    id: &str,
) -> Result<Option<Marksheet>, sqlx::Error> {
    sqlx::query_as::<_, Marksheet>(&format!(
        "SELECT {MARKSHEET_COLUMNS} FROM marksheets WHERE id = ?"
    ))
    .bind(id)
    .fetch_optional(db)
    .await
}

pub async fn fetch_marksheets_for_student(
    db: &SqlitePool,
    student_id: &str,
) -> Result<Vec<Marksheet>, sqlx::Error> {
    sqlx::query_as::<_, Marksheet>(&format!(
        "SELECT {MARKSHEET_COLUMNS} FROM marksheets \
         WHERE student_id = ? ORDER BY academic_year, semester"
    ))
    .bind(student_id)
    .fetch_all(db)
    .await
}

pub async fn delete_marksheet(db: &SqlitePool, id: &str) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM marksheets WHERE id = ?")
        .bind(id)
        .execute(db)
        .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn fetch_marks(db: &SqlitePool, marksheet_id: &str) -> Result<Vec<Mark>, sqlx::Error> {
    sqlx::query_as::<_, Mark>(
        "SELECT m.id, m.marksheet_id, m.subject_id, m.marks, m.grade \
         FROM marks m \
         LEFT JOIN courses c ON c.id = m.subject_id \
         WHERE m.marksheet_id = ? ORDER BY c.code",
    )
    .bind(marksheet_id)
    .fetch_all(db)
    .await
}

/// Write (or overwrite) one subject's marks and recompute the sheet's
/// totals, percentage, final grade and the student's GPA in the same
/// transaction. Returns the mark row and the refreshed marksheet.
pub async fn upsert_mark(
    db: &SqlitePool,
    sheet: &Marksheet,
    req: &MarkRequest,
) -> Result<(Mark, Marksheet), sqlx::Error> {
    let grade = grade_letter(req.marks).to_string();

    let mut tx = db.begin().await?;

    sqlx::query(
        "INSERT INTO marks (id, marksheet_id, subject_id, marks, grade) \
         VALUES (?, ?, ?, ?, ?) \
         ON CONFLICT(marksheet_id, subject_id) \
         DO UPDATE SET marks = excluded.marks, grade = excluded.grade",
    )
    .bind(Uuid::new_v4().to_string())
    .bind(&sheet.id)
    .bind(&req.subject_id)
    .bind(req.marks)
    .bind(&grade)
    .execute(&mut *tx)
    .await?;

    let (id,): (String,) =
        sqlx::query_as("SELECT id FROM marks WHERE marksheet_id = ? AND subject_id = ?")
            .bind(&sheet.id)
            .bind(&req.subject_id)
            .fetch_one(&mut *tx)
            .await?;

    let (total, count): (f64, i64) = sqlx::query_as(
        "SELECT COALESCE(SUM(marks), 0), COUNT(*) FROM marks WHERE marksheet_id = ?",
    )
    .bind(&sheet.id)
    .fetch_one(&mut *tx)
    .await?;

    let max = count as f64 * MAX_MARKS_PER_SUBJECT;
    let percentage = if max > 0.0 { total / max * 100.0 } else { 0.0 };
    let final_grade = grade_letter(percentage);

    sqlx::query(
        "UPDATE marksheets SET total_marks = ?, percentage = ?, final_grade = ? WHERE id = ?",
    )
    .bind(total)
    .bind(percentage)
    .bind(final_grade)
    .bind(&sheet.id)
    .execute(&mut *tx)
    .await?;

    // GPA on a 10-point scale: the average percentage across all of the
    // student's marksheets, rounded to two decimals.
    let (avg,): (f64,) =
        sqlx::query_as("SELECT COALESCE(AVG(percentage), 0) FROM marksheets WHERE student_id = ?")
            .bind(&sheet.student_id)
            .fetch_one(&mut *tx)
            .await?;
    let gpa = (avg / 10.0 * 100.0).round() / 100.0;
    people::set_student_gpa(&mut *tx, &sheet.student_id, gpa).await?;

    tx.commit().await?;

    info!(
        "marked {} on marksheet {}: sheet now {:.1}% ({})",
        req.subject_id, sheet.id, percentage, final_grade
    );

    let refreshed = find_marksheet_by_id(db, &sheet.id)
        .await?
        .ok_or(sqlx::Error::RowNotFound)?;
    let mark = Mark {
        id,
        marksheet_id: sheet.id.clone(),
        subject_id: req.subject_id.clone(),
        marks: req.marks,
        grade,
    };
    Ok((mark, refreshed))
}
