use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use serde::Deserialize;

use crate::db::{institutions, people, timetables};
use crate::error::AppError;
use crate::models::*;
use crate::state::AppState;

pub async fn list_institutions(
    State(state): State<AppState>,
) -> Result<Json<Vec<Institution>>, AppError> {
    let all = institutions::fetch_institutions(&state.db).await?;
    Ok(Json(all))
}

pub async fn create_institution(
    State(state): State<AppState>,
    Json(req): Json<NewInstitutionRequest>,
) -> Result<Json<Institution>, AppError> {
    let inst = institutions::insert_institution(&state.db, req).await?;
    Ok(Json(inst))
}

pub async fn get_institution(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Institution>, AppError> {
    let inst = institutions::find_institution_by_id(&state.db, &id)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(inst))
}

pub async fn delete_institution(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    if institutions::delete_institution(&state.db, &id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound)
    }
}

pub async fn list_departments(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<Department>>, AppError> {
    let depts = institutions::fetch_departments(&state.db, &id).await?;
    Ok(Json(depts))
}

pub async fn create_department(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<NewDepartmentRequest>,
) -> Result<Json<Department>, AppError> {
    require_institution(&state, &id).await?;
    let dept = institutions::insert_department(&state.db, &id, req).await?;
    Ok(Json(dept))
}

#[derive(Deserialize)]
pub struct BranchQueryParams {
    department_id: Option<String>,
}

pub async fn list_branches(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(params): Query<BranchQueryParams>,
) -> Result<Json<Vec<Branch>>, AppError> {
    let branches =
        institutions::fetch_branches(&state.db, &id, params.department_id.as_deref()).await?;
    Ok(Json(branches))
}

pub async fn create_branch(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<NewBranchRequest>,
) -> Result<Json<Branch>, AppError> {
    require_institution(&state, &id).await?;
    let branch = institutions::insert_branch(&state.db, &id, req).await?;
    Ok(Json(branch))
}

pub async fn list_rooms(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<Room>>, AppError> {
    let rooms = timetables::fetch_rooms(&state.db, &id).await?;
    Ok(Json(rooms))
}

pub async fn create_room(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<NewRoomRequest>,
) -> Result<Json<Room>, AppError> {
    require_institution(&state, &id).await?;
    let room = timetables::insert_room(&state.db, &id, &req.number).await?;
    Ok(Json(room))
}

pub async fn update_room(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<NewRoomRequest>,
) -> Result<Json<Room>, AppError> {
    let number = req.number.trim().to_string();
    if number.is_empty() {
        return Err(AppError::BadRequest("room number is required".to_string()));
    }
    let room = timetables::find_room_by_id(&state.db, &id)
        .await?
        .ok_or(AppError::NotFound)?;
    if timetables::room_number_taken(&state.db, &room.institution_id, &number, &room.id).await? {
        return Err(AppError::Conflict(format!(
            "Another room with number '{number}' already exists."
        )));
    }
    let updated = timetables::update_room_number(&state.db, &id, &number)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(updated))
}

pub async fn delete_room(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    if timetables::delete_room(&state.db, &id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound)
    }
}

pub async fn list_teachers(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<Teacher>>, AppError> {
    let teachers = people::fetch_teachers(&state.db, &id).await?;
    Ok(Json(teachers))
}

pub async fn create_teacher(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<NewTeacherRequest>,
) -> Result<Json<Teacher>, AppError> {
    require_institution(&state, &id).await?;
    let teacher = people::insert_teacher(&state.db, &id, req).await?;
    Ok(Json(teacher))
}

pub async fn delete_teacher(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    if people::delete_teacher(&state.db, &id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound)
    }
}

pub async fn list_students(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<Student>>, AppError> {
    let students = people::fetch_students(&state.db, &id).await?;
    Ok(Json(students))
}

pub async fn create_student(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<NewStudentRequest>,
) -> Result<Json<Student>, AppError> {
    require_institution(&state, &id).await?;
    let student = people::insert_student(&state.db, &id, req).await?;
    Ok(Json(student))
}

pub async fn delete_student(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    if people::delete_student(&state.db, &id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound)
    }
}

pub async fn list_news(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<News>>, AppError> {
    let feed = institutions::fetch_news(&state.db, &id).await?;
    Ok(Json(feed))
}

pub async fn create_news(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<NewNewsRequest>,
) -> Result<Json<News>, AppError> {
    require_institution(&state, &id).await?;
    let item = institutions::insert_news(&state.db, &id, req).await?;
    Ok(Json(item))
}

pub async fn delete_news(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    if institutions::delete_news(&state.db, &id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound)
    }
}

#[derive(Deserialize)]
pub struct CalendarQueryParams {
    #[serde(default)]
    published_only: bool,
}

pub async fn list_calendar_events(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(params): Query<CalendarQueryParams>,
) -> Result<Json<Vec<CalendarEvent>>, AppError> {
    let events =
        institutions::fetch_calendar_events(&state.db, &id, params.published_only).await?;
    Ok(Json(events))
}

pub async fn create_calendar_event(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<NewCalendarEventRequest>,
) -> Result<Json<CalendarEvent>, AppError> {
    require_institution(&state, &id).await?;
    if let Some(kind) = req.event_type.as_deref() {
        if !matches!(kind, "holiday" | "exam" | "event") {
            return Err(AppError::BadRequest(format!("unknown event type '{kind}'")));
        }
    }
    let event = institutions::insert_calendar_event(&state.db, &id, req).await?;
    Ok(Json(event))
}

pub async fn update_calendar_event(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<UpdateCalendarEventRequest>,
) -> Result<Json<CalendarEvent>, AppError> {
    if let Some(kind) = req.event_type.as_deref() {
        if !matches!(kind, "holiday" | "exam" | "event") {
            return Err(AppError::BadRequest(format!("unknown event type '{kind}'")));
        }
    }
    let event = institutions::update_calendar_event(&state.db, &id, req)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(event))
}

pub async fn toggle_calendar_publish(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<CalendarEvent>, AppError> {
    let event = institutions::toggle_calendar_publish(&state.db, &id)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(event))
}

pub async fn delete_calendar_event(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    if institutions::delete_calendar_event(&state.db, &id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound)
    }
}

async fn require_institution(state: &AppState, id: &str) -> Result<(), AppError> {
    institutions::find_institution_by_id(&state.db, id)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(())
}
