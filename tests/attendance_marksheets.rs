mod common;

use sqlx::SqlitePool;

use campus_backend::db::{attendance, institutions, marksheets, people};
use campus_backend::models::{
    MarkRequest, NewAttendanceSheetRequest, NewDepartmentRequest, NewMarksheetRequest,
    NewStudentRequest,
};

use common::{Campus, CampusConfig, seed_campus, setup_test_db};

async fn seed_student(pool: &SqlitePool, campus: &Campus, n: usize) -> String {
    people::insert_student(
        pool,
        &campus.institution.id,
        NewStudentRequest {
            department_id: None,
            division_id: None,
            enrollment_no: format!("EN-{n}"),
            full_name: format!("Student {n}"),
        },
    )
    .await
    .unwrap()
    .id
}

async fn seed_department(pool: &SqlitePool, campus: &Campus) -> String {
    institutions::insert_department(
        pool,
        &campus.institution.id,
        NewDepartmentRequest { name: "CE".into(), description: None },
    )
    .await
    .unwrap()
    .id
}

fn sheet_req(teacher_id: &str, department_id: &str) -> NewAttendanceSheetRequest {
    NewAttendanceSheetRequest {
        teacher_id: teacher_id.to_string(),
        department_id: department_id.to_string(),
        date_from: "2026-01-01".to_string(),
        date_to: "2026-01-31".to_string(),
        total_lectures: 20,
        shared_with_students: None,
    }
}

#[tokio::test]
async fn attendance_records_carry_derived_percentage() {
    let pool = setup_test_db().await;
    let campus = seed_campus(&pool, CampusConfig::default()).await;
    let department_id = seed_department(&pool, &campus).await;
    let student_id = seed_student(&pool, &campus, 1).await;

    let sheet = attendance::insert_sheet(&pool, sheet_req(&campus.teachers[0].id, &department_id))
        .await
        .unwrap();

    let record = attendance::record_attendance(&pool, &sheet, &student_id, 18).await.unwrap();
    assert_eq!(record.total_lectures, 20);
    assert_eq!(record.percentage, 90.0);

    let stored = attendance::fetch_records(&pool, &sheet.id).await.unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].percentage, 90.0);
}

#[tokio::test]
async fn remarking_a_student_replaces_the_previous_count() {
    let pool = setup_test_db().await;
    let campus = seed_campus(&pool, CampusConfig::default()).await;
    let department_id = seed_department(&pool, &campus).await;
    let student_id = seed_student(&pool, &campus, 1).await;

    let sheet = attendance::insert_sheet(&pool, sheet_req(&campus.teachers[0].id, &department_id))
        .await
        .unwrap();

    let first = attendance::record_attendance(&pool, &sheet, &student_id, 12).await.unwrap();
    let second = attendance::record_attendance(&pool, &sheet, &student_id, 15).await.unwrap();

    assert_eq!(first.id, second.id);
    assert_eq!(second.lectures_attended, 15);
    assert_eq!(second.percentage, 75.0);
    assert_eq!(attendance::fetch_records(&pool, &sheet.id).await.unwrap().len(), 1);
}

#[tokio::test]
async fn duplicate_sheet_for_same_period_is_rejected() {
    let pool = setup_test_db().await;
    let campus = seed_campus(&pool, CampusConfig::default()).await;
    let department_id = seed_department(&pool, &campus).await;

    attendance::insert_sheet(&pool, sheet_req(&campus.teachers[0].id, &department_id))
        .await
        .unwrap();

    let err = attendance::insert_sheet(&pool, sheet_req(&campus.teachers[0].id, &department_id))
        .await
        .expect_err("same teacher, department and period must collide");
    assert!(matches!(
        err,
        sqlx::Error::Database(ref db) if db.kind() == sqlx::error::ErrorKind::UniqueViolation
    ));

    let sheets = attendance::fetch_sheets_for_teacher(&pool, &campus.teachers[0].id)
        .await
        .unwrap();
    assert_eq!(sheets.len(), 1);
}

#[tokio::test]
async fn mark_writes_recompute_sheet_stats_and_gpa() {
    let pool = setup_test_db().await;
    let campus = seed_campus(&pool, CampusConfig::default()).await;
    let student_id = seed_student(&pool, &campus, 1).await;

    let sheet = marksheets::insert_marksheet(
        &pool,
        NewMarksheetRequest {
            student_id: student_id.clone(),
            teacher_id: Some(campus.teachers[0].id.clone()),
            department_id: None,
            semester: 1,
            academic_year: "2025-26".to_string(),
        },
    )
    .await
    .unwrap();

    let (mark, after_first) = marksheets::upsert_mark(
        &pool,
        &sheet,
        &MarkRequest { subject_id: campus.courses[0].id.clone(), marks: 80.0 },
    )
    .await
    .unwrap();
    assert_eq!(mark.grade, "A");
    assert_eq!(after_first.total_marks, 80.0);
    assert_eq!(after_first.percentage, 80.0);

    let (_, after_second) = marksheets::upsert_mark(
        &pool,
        &sheet,
        &MarkRequest { subject_id: campus.courses[1].id.clone(), marks: 90.0 },
    )
    .await
    .unwrap();
    assert_eq!(after_second.total_marks, 170.0);
    assert_eq!(after_second.percentage, 85.0);
    assert_eq!(after_second.final_grade, "A");

    // GPA is the average marksheet percentage on a 10-point scale.
    let student = people::find_student_by_id(&pool, &student_id).await.unwrap().unwrap();
    assert_eq!(student.gpa, 8.5);
}

#[tokio::test]
async fn remarking_a_subject_updates_in_place() {
    let pool = setup_test_db().await;
    let campus = seed_campus(&pool, CampusConfig::default()).await;
    let student_id = seed_student(&pool, &campus, 1).await;

    let sheet = marksheets::insert_marksheet(
        &pool,
        NewMarksheetRequest {
            student_id: student_id.clone(),
            teacher_id: None,
            department_id: None,
            semester: 1,
            academic_year: "2025-26".to_string(),
        },
    )
    .await
    .unwrap();

    let subject = MarkRequest { subject_id: campus.courses[0].id.clone(), marks: 35.0 };
    let (first, _) = marksheets::upsert_mark(&pool, &sheet, &subject).await.unwrap();
    assert_eq!(first.grade, "F");

    let (second, refreshed) = marksheets::upsert_mark(
        &pool,
        &sheet,
        &MarkRequest { subject_id: campus.courses[0].id.clone(), marks: 72.0 },
    )
    .await
    .unwrap();

    assert_eq!(first.id, second.id);
    assert_eq!(second.grade, "B+");
    assert_eq!(refreshed.total_marks, 72.0);
    assert_eq!(marksheets::fetch_marks(&pool, &sheet.id).await.unwrap().len(), 1);
}

#[tokio::test]
async fn gpa_averages_across_semesters() {
    let pool = setup_test_db().await;
    let campus = seed_campus(&pool, CampusConfig::default()).await;
    let student_id = seed_student(&pool, &campus, 1).await;

    for (semester, marks) in [(1, 85.0), (2, 65.0)] {
        let sheet = marksheets::insert_marksheet(
            &pool,
            NewMarksheetRequest {
                student_id: student_id.clone(),
                teacher_id: None,
                department_id: None,
                semester,
                academic_year: "2025-26".to_string(),
            },
        )
        .await
        .unwrap();
        marksheets::upsert_mark(
            &pool,
            &sheet,
            &MarkRequest { subject_id: campus.courses[0].id.clone(), marks },
        )
        .await
        .unwrap();
    }

    let student = people::find_student_by_id(&pool, &student_id).await.unwrap().unwrap();
    assert_eq!(student.gpa, 7.5);
}
