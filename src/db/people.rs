use sqlx::SqlitePool;
use uuid::Uuid;

use crate::models::{NewStudentRequest, NewTeacherRequest, Student, Teacher};

pub async fn fetch_teachers(
    db: &SqlitePool,
    institution_id: &str,
) -> Result<Vec<Teacher>, sqlx::Error> {
    sqlx::query_as::<_, Teacher>(
        "SELECT id, institution_id, department_id, employee_id, full_name, qualification \
         FROM teachers WHERE institution_id = ? ORDER BY full_name",
    )
    .bind(institution_id)
    .fetch_all(db)
    .await
}

pub async fn find_teacher_by_id(
    db: &SqlitePool,
    id: &str,
) -> Result<Option<Teacher>, sqlx::Error> {
    sqlx::query_as::<_, Teacher>(
        "SELECT id, institution_id, department_id, employee_id, full_name, qualification \
         FROM teachers WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(db)
    .await
}

pub async fn insert_teacher(
    db: &SqlitePool,
    institution_id: &str,
    req: NewTeacherRequest,
) -> Result<Teacher, sqlx::Error> {
    let id = Uuid::new_v4().to_string();
    let qualification = req.qualification.unwrap_or_default();

    sqlx::query(
        "INSERT INTO teachers (id, institution_id, department_id, employee_id, full_name, qualification) \
         VALUES (?, ?, ?, ?, ?, ?)",
    )
    .bind(&id)
    .bind(institution_id)
    .bind(&req.department_id)
    .bind(&req.employee_id)
    .bind(&req.full_name)
    .bind(&qualification)
    .execute(db)
    .await?;

    Ok(Teacher {
        id,
        institution_id: institution_id.to_string(),
        department_id: req.department_id,
        employee_id: req.employee_id,
        full_name: req.full_name,
        qualification,
    })
}

pub async fn delete_teacher(db: &SqlitePool, id: &str) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM teachers WHERE id = ?")
        .bind(id)
        .execute(db)
        .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn fetch_students(
    db: &SqlitePool,
    institution_id: &str,
) -> Result<Vec<Student>, sqlx::Error> {
    sqlx::query_as::<_, Student>(
        "SELECT id, institution_id, department_id, division_id, enrollment_no, full_name, gpa \
         FROM students WHERE institution_id = ? ORDER BY enrollment_no",
    )
    .bind(institution_id)
    .fetch_all(db)
    .await
}

pub async fn find_student_by_id(
    db: &SqlitePool,
    id: &str,
) -> Result<Option<Student>, sqlx::Error> {
    sqlx::query_as::<_, Student>(
        "SELECT id, institution_id, department_id, division_id, enrollment_no, full_name, gpa \
         FROM students WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(db)
    .await
}

pub async fn insert_student(
    db: &SqlitePool,
    institution_id: &str,
    req: NewStudentRequest,
) -> Result<Student, sqlx::Error> {
    let id = Uuid::new_v4().to_string();

    sqlx::query(
        "INSERT INTO students (id, institution_id, department_id, division_id, enrollment_no, full_name) \
         VALUES (?, ?, ?, ?, ?, ?)",
    )
    .bind(&id)
    .bind(institution_id)
    .bind(&req.department_id)
    .bind(&req.division_id)
    .bind(&req.enrollment_no)
    .bind(&req.full_name)
    .execute(db)
    .await?;

    Ok(Student {
        id,
        institution_id: institution_id.to_string(),
        department_id: req.department_id,
        division_id: req.division_id,
        enrollment_no: req.enrollment_no,
        full_name: req.full_name,
        gpa: 0.0,
    })
}

pub async fn set_student_gpa<'e, E>(db: E, student_id: &str, gpa: f64) -> Result<(), sqlx::Error>
where
    E: sqlx::Executor<'e, Database = sqlx::Sqlite>,
{
    sqlx::query("UPDATE students SET gpa = ? WHERE id = ?")
        .bind(gpa)
        .bind(student_id)
        .execute(db)
        .await?;
    Ok(())
}

pub async fn delete_student(db: &SqlitePool, id: &str) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM students WHERE id = ?")
        .bind(id)
        .execute(db)
        .await?;
    Ok(result.rows_affected() > 0)
}
