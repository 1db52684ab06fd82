use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use serde::Serialize;

use crate::db::{academics, attendance, institutions, marksheets, people};
use crate::error::AppError;
use crate::models::{
    AttendanceMarkRequest, AttendanceRecord, AttendanceSheet, Course, Grade, Mark, MarkRequest,
    Marksheet, NewAttendanceSheetRequest, NewCourseRequest, NewGradeRequest, NewMarksheetRequest,
    UpdateCourseRequest,
};
use crate::state::AppState;

pub async fn list_courses(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<Course>>, AppError> {
    let courses = academics::fetch_courses(&state.db, &id).await?;
    Ok(Json(courses))
}

pub async fn create_course(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<NewCourseRequest>,
) -> Result<Json<Course>, AppError> {
    institutions::find_institution_by_id(&state.db, &id)
        .await?
        .ok_or(AppError::NotFound)?;
    let course = academics::insert_course(&state.db, &id, req).await?;
    Ok(Json(course))
}

pub async fn update_course(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<UpdateCourseRequest>,
) -> Result<Json<Course>, AppError> {
    if let Some(credits) = req.credits {
        if credits < 0 {
            return Err(AppError::BadRequest("credits cannot be negative".to_string()));
        }
    }
    let course = academics::update_course(&state.db, &id, req)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(course))
}

pub async fn delete_course(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    if academics::delete_course(&state.db, &id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound)
    }
}

pub async fn create_grade(
    State(state): State<AppState>,
    Json(req): Json<NewGradeRequest>,
) -> Result<Json<Grade>, AppError> {
    if !(0.0..=100.0).contains(&req.marks) {
        return Err(AppError::BadRequest("marks must be between 0 and 100".to_string()));
    }
    people::find_student_by_id(&state.db, &req.student_id)
        .await?
        .ok_or(AppError::NotFound)?;
    academics::find_course_by_id(&state.db, &req.course_id)
        .await?
        .ok_or(AppError::NotFound)?;

    let grade = academics::insert_grade(&state.db, req).await?;
    Ok(Json(grade))
}

pub async fn list_student_grades(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<Grade>>, AppError> {
    let grades = academics::fetch_grades_for_student(&state.db, &id).await?;
    Ok(Json(grades))
}

pub async fn create_attendance_sheet(
    State(state): State<AppState>,
    Json(req): Json<NewAttendanceSheetRequest>,
) -> Result<Json<AttendanceSheet>, AppError> {
    if req.total_lectures < 0 {
        return Err(AppError::BadRequest("total_lectures cannot be negative".to_string()));
    }
    if req.date_from > req.date_to {
        return Err(AppError::BadRequest("date_from must not be after date_to".to_string()));
    }
    people::find_teacher_by_id(&state.db, &req.teacher_id)
        .await?
        .ok_or(AppError::NotFound)?;
    institutions::find_department_by_id(&state.db, &req.department_id)
        .await?
        .ok_or(AppError::NotFound)?;

    // A duplicate (teacher, department, period) sheet hits the unique index
    // and surfaces as 409.
    let sheet = attendance::insert_sheet(&state.db, req).await?;
    Ok(Json(sheet))
}

/// A sheet together with its per-student rows.
#[derive(Debug, Serialize)]
pub struct AttendanceSheetDetail {
    pub sheet: AttendanceSheet,
    pub records: Vec<AttendanceRecord>,
}

pub async fn get_attendance_sheet(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<AttendanceSheetDetail>, AppError> {
    let sheet = attendance::find_sheet_by_id(&state.db, &id)
        .await?
        .ok_or(AppError::NotFound)?;
    let records = attendance::fetch_records(&state.db, &sheet.id).await?;
    Ok(Json(AttendanceSheetDetail { sheet, records }))
}

pub async fn delete_attendance_sheet(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    if attendance::delete_sheet(&state.db, &id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound)
    }
}

pub async fn list_teacher_sheets(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<AttendanceSheet>>, AppError> {
    let sheets = attendance::fetch_sheets_for_teacher(&state.db, &id).await?;
    Ok(Json(sheets))
}

pub async fn record_attendance(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<AttendanceMarkRequest>,
) -> Result<Json<AttendanceRecord>, AppError> {
    let sheet = attendance::find_sheet_by_id(&state.db, &id)
        .await?
        .ok_or(AppError::NotFound)?;
    people::find_student_by_id(&state.db, &req.student_id)
        .await?
        .ok_or(AppError::NotFound)?;
    if req.lectures_attended < 0 || req.lectures_attended > sheet.total_lectures {
        return Err(AppError::BadRequest(format!(
            "lectures_attended must be between 0 and {}",
            sheet.total_lectures
        )));
    }

    let record =
        attendance::record_attendance(&state.db, &sheet, &req.student_id, req.lectures_attended)
            .await?;
    Ok(Json(record))
}

pub async fn list_student_attendance(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<AttendanceRecord>>, AppError> {
    let records = attendance::fetch_records_for_student(&state.db, &id).await?;
    Ok(Json(records))
}

pub async fn create_marksheet(
    State(state): State<AppState>,
    Json(req): Json<NewMarksheetRequest>,
) -> Result<Json<Marksheet>, AppError> {
    if req.semester < 1 {
        return Err(AppError::BadRequest("semester must be at least 1".to_string()));
    }
    people::find_student_by_id(&state.db, &req.student_id)
        .await?
        .ok_or(AppError::NotFound)?;

    // One marksheet per (student, semester, academic_year); duplicates hit
    // the unique index and surface as 409.
    let sheet = marksheets::insert_marksheet(&state.db, req).await?;
    Ok(Json(sheet))
}

#[derive(Debug, Serialize)]
pub struct MarksheetDetail {
    pub marksheet: Marksheet,
    pub marks: Vec<Mark>,
}

pub async fn get_marksheet(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MarksheetDetail>, AppError> {
    let marksheet = marksheets::find_marksheet_by_id(&state.db, &id)
        .await?
        .ok_or(AppError::NotFound)?;
    let marks = marksheets::fetch_marks(&state.db, &marksheet.id).await?;
    Ok(Json(MarksheetDetail { marksheet, marks }))
}

pub async fn delete_marksheet(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    if marksheets::delete_marksheet(&state.db, &id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound)
    }
}

pub async fn list_student_marksheets(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<Marksheet>>, AppError> {
    let sheets = marksheets::fetch_marksheets_for_student(&state.db, &id).await?;
    Ok(Json(sheets))
}

/// Response for a mark write: the row plus the recomputed sheet stats.
#[derive(Debug, Serialize)]
pub struct MarkOutcome {
    pub mark: Mark,
    pub marksheet: Marksheet,
}

pub async fn upsert_mark(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<MarkRequest>,
) -> Result<Json<MarkOutcome>, AppError> {
    if !(0.0..=100.0).contains(&req.marks) {
        return Err(AppError::BadRequest("marks must be between 0 and 100".to_string()));
    }
    let sheet = marksheets::find_marksheet_by_id(&state.db, &id)
        .await?
        .ok_or(AppError::NotFound)?;
    academics::find_course_by_id(&state.db, &req.subject_id)
        .await?
        .ok_or(AppError::NotFound)?;

    let (mark, marksheet) = marksheets::upsert_mark(&state.db, &sheet, &req).await?;
    Ok(Json(MarkOutcome { mark, marksheet }))
}
