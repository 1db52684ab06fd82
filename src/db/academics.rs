use chrono::Utc;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::models::{
    Course, Grade, NewCourseRequest, NewGradeRequest, UpdateCourseRequest, grade_letter,
};

pub async fn fetch_courses(
    db: &SqlitePool,
    institution_id: &str,
) -> Result<Vec<Course>, sqlx::Error> {
    sqlx::query_as::<_, Course>(
        "SELECT id, institution_id, department_id, code, name, credits, created_at \
         FROM courses WHERE institution_id = ? ORDER BY code",
    )
    .bind(institution_id)
    .fetch_all(db)
    .await
}

pub async fn find_course_by_id(db: &SqlitePool, id: &str) -> Result<Option<Course>, sqlx::Error> {
    sqlx::query_as::<_, Course>(
        "SELECT id, institution_id, department_id, code, name, credits, created_at \
         FROM courses WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(db)
    .await
}

pub async fn insert_course(
    db: &SqlitePool,
    institution_id: &str,
    req: NewCourseRequest,
) -> Result<Course, sqlx::Error> {
    let id = Uuid::new_v4().to_string();
    let now = Utc::now().to_rfc3339();
    let credits = req.credits.unwrap_or(3);

    sqlx::query(
        "INSERT INTO courses (id, institution_id, department_id, code, name, credits, created_at) \
         VALUES (?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&id)
    .bind(institution_id)
    .bind(&req.department_id)
    .bind(&req.code)
    .bind(&req.name)
    .bind(credits)
    .bind(&now)
    .execute(db)
    .await?;

    Ok(Course {
        id,
        institution_id: institution_id.to_string(),
        department_id: req.department_id,
        code: req.code,
        name: req.name,
        credits,
        created_at: now,
    })
}

pub async fn update_course(
    db: &SqlitePool,
    id: &str,
    req: UpdateCourseRequest,
) -> Result<Option<Course>, sqlx::Error> {
    let mut current = match find_course_by_id(db, id).await? {
        Some(c) => c,
        None => return Ok(None),
    };

    if let Some(code) = req.code {
        current.code = code;
    }
    if let Some(name) = req.name {
        current.name = name;
    }
    if let Some(credits) = req.credits {
        current.credits = credits;
    }

    sqlx::query("UPDATE courses SET code = ?, name = ?, credits = ? WHERE id = ?")
        .bind(&current.code)
        .bind(&current.name)
        .bind(current.credits)
        .bind(id)
        .execute(db)
        .await?;

    Ok(Some(current))
}

pub async fn delete_course(db: &SqlitePool, id: &str) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM courses WHERE id = ?")
        .bind(id)
        .execute(db)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// The letter is derived from marks at write time, never stored separately
/// by the caller.
pub async fn insert_grade(db: &SqlitePool, req: NewGradeRequest) -> Result<Grade, sqlx::Error> {
    let id = Uuid::new_v4().to_string();
    let now = Utc::now().to_rfc3339();
    let grade = grade_letter(req.marks).to_string();

    sqlx::query(
        "INSERT INTO grades (id, student_id, course_id, marks, grade, date_assigned) \
         VALUES (?, ?, ?, ?, ?, ?)",
    )
    .bind(&id)
    .bind(&req.student_id)
    .bind(&req.course_id)
    .bind(req.marks)
    .bind(&grade)
    .bind(&now)
    .execute(db)
    .await?;

    Ok(Grade {
        id,
        student_id: req.student_id,
        course_id: req.course_id,
        marks: req.marks,
        grade,
        date_assigned: now,
    })
}

pub async fn fetch_grades_for_student(
    db: &SqlitePool,
    student_id: &str,
) -> Result<Vec<Grade>, sqlx::Error> {
    sqlx::query_as::<_, Grade>(
        "SELECT id, student_id, course_id, marks, grade, date_assigned \
         FROM grades WHERE student_id = ? ORDER BY date_assigned DESC",
    )
    .bind(student_id)
    .fetch_all(db)
    .await
}
