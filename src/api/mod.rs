mod academics;
mod scheduling;
mod tenancy;

use axum::routing::{delete, get, post};
use axum::{Router, extract::State, http::StatusCode};

use crate::error::AppError;
use crate::state::AppState;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/institutions", get(tenancy::list_institutions).post(tenancy::create_institution))
        .route(
            "/institutions/{id}",
            get(tenancy::get_institution).delete(tenancy::delete_institution),
        )
        .route(
            "/institutions/{id}/departments",
            get(tenancy::list_departments).post(tenancy::create_department),
        )
        .route(
            "/institutions/{id}/branches",
            get(tenancy::list_branches).post(tenancy::create_branch),
        )
        .route(
            "/institutions/{id}/rooms",
            get(tenancy::list_rooms).post(tenancy::create_room),
        )
        .route("/rooms/{id}", delete(tenancy::delete_room).patch(tenancy::update_room))
        .route(
            "/institutions/{id}/teachers",
            get(tenancy::list_teachers).post(tenancy::create_teacher),
        )
        .route("/teachers/{id}", delete(tenancy::delete_teacher))
        .route(
            "/institutions/{id}/students",
            get(tenancy::list_students).post(tenancy::create_student),
        )
        .route("/students/{id}", delete(tenancy::delete_student))
        .route(
            "/institutions/{id}/news",
            get(tenancy::list_news).post(tenancy::create_news),
        )
        .route("/news/{id}", delete(tenancy::delete_news))
        .route(
            "/institutions/{id}/calendar",
            get(tenancy::list_calendar_events).post(tenancy::create_calendar_event),
        )
        .route(
            "/calendar/{id}",
            delete(tenancy::delete_calendar_event).patch(tenancy::update_calendar_event),
        )
        .route(
            "/calendar/{id}/toggle-publish",
            post(tenancy::toggle_calendar_publish),
        )
        .route(
            "/institutions/{id}/courses",
            get(academics::list_courses).post(academics::create_course),
        )
        .route(
            "/courses/{id}",
            delete(academics::delete_course).patch(academics::update_course),
        )
        .route("/grades", post(academics::create_grade))
        .route("/students/{id}/grades", get(academics::list_student_grades))
        .route("/attendance-sheets", post(academics::create_attendance_sheet))
        .route(
            "/attendance-sheets/{id}",
            get(academics::get_attendance_sheet).delete(academics::delete_attendance_sheet),
        )
        .route(
            "/attendance-sheets/{id}/records",
            post(academics::record_attendance),
        )
        .route(
            "/teachers/{id}/attendance-sheets",
            get(academics::list_teacher_sheets),
        )
        .route(
            "/students/{id}/attendance",
            get(academics::list_student_attendance),
        )
        .route("/marksheets", post(academics::create_marksheet))
        .route(
            "/marksheets/{id}",
            get(academics::get_marksheet).delete(academics::delete_marksheet),
        )
        .route("/marksheets/{id}/marks", post(academics::upsert_mark))
        .route(
            "/students/{id}/marksheets",
            get(academics::list_student_marksheets),
        )
        .route("/timetables", get(scheduling::list_timetables))
        .route("/timetables/setup", post(scheduling::setup_timetable))
        .route(
            "/timetables/{id}",
            get(scheduling::get_timetable)
                .delete(scheduling::delete_timetable)
                .patch(scheduling::update_headers),
        )
        .route("/timetables/{id}/grid", get(scheduling::get_grid))
        .route("/timetables/{id}/entries", post(scheduling::submit_entry))
        .route("/timetables/{id}/generate", post(scheduling::generate))
        .route("/timetables/{id}/clear", post(scheduling::clear_entries))
        .route("/timetables/{id}/publish", post(scheduling::publish))
        .route("/timetables/{id}/unpublish", post(scheduling::unpublish))
        .route("/timetables/{id}/theme", post(scheduling::cycle_theme))
        .route(
            "/institutions/{id}/active-timetable",
            get(scheduling::get_active_timetable),
        )
        .with_state(state)
}

async fn health(State(state): State<AppState>) -> Result<StatusCode, AppError> {
    sqlx::query("select 1").execute(&state.db).await?;
    Ok(StatusCode::OK)
}
