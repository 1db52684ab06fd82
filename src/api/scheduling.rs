use std::collections::HashMap;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::db::timetables;
use crate::error::AppError;
use crate::models::{
    DayCode, Division, EntryDetail, EntryRequest, HeaderUpdateRequest, PublishRequest,
    SetupRequest, TimeSlot, Timetable, TimetableEntry,
};
use crate::services::generator::GenerationReport;
use crate::services::{entry, generator, publish, setup};
use crate::state::AppState;

#[derive(Deserialize)]
pub struct TimetableQueryParams {
    institution_id: String,
}

pub async fn list_timetables(
    State(state): State<AppState>,
    Query(params): Query<TimetableQueryParams>,
) -> Result<Json<Vec<Timetable>>, AppError> {
    let history = timetables::fetch_timetables(&state.db, &params.institution_id).await?;
    Ok(Json(history))
}

pub async fn setup_timetable(
    State(state): State<AppState>,
    Json(req): Json<SetupRequest>,
) -> Result<Json<Timetable>, AppError> {
    let timetable = setup::create_timetable_structure(&state.db, &req).await?;
    Ok(Json(timetable))
}

pub async fn get_timetable(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Timetable>, AppError> {
    let timetable = timetables::find_timetable_by_id(&state.db, &id)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(timetable))
}

pub async fn delete_timetable(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    if timetables::delete_timetable(&state.db, &id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound)
    }
}

pub async fn update_headers(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<HeaderUpdateRequest>,
) -> Result<Json<Timetable>, AppError> {
    let timetable = timetables::update_timetable_headers(&state.db, &id, req)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(timetable))
}

pub async fn cycle_theme(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Timetable>, AppError> {
    let timetable = timetables::cycle_theme(&state.db, &id)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(timetable))
}

pub async fn submit_entry(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<EntryRequest>,
) -> Result<Json<TimetableEntry>, AppError> {
    let entry = entry::submit_entry(&state.db, &id, &req).await?;
    Ok(Json(entry))
}

pub async fn generate(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<GenerationReport>, AppError> {
    let report = generator::auto_generate(&state.db, &id).await?;
    Ok(Json(report))
}

pub async fn clear_entries(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, AppError> {
    timetables::find_timetable_by_id(&state.db, &id)
        .await?
        .ok_or(AppError::NotFound)?;
    let cleared = timetables::clear_entries(&state.db, &id).await?;
    Ok(Json(json!({ "cleared": cleared })))
}

pub async fn publish(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<PublishRequest>,
) -> Result<Json<Timetable>, AppError> {
    let timetable = publish::publish_timetable(&state.db, &id, &req).await?;
    Ok(Json(timetable))
}

pub async fn unpublish(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Timetable>, AppError> {
    let timetable = publish::unpublish_timetable(&state.db, &id).await?;
    Ok(Json(timetable))
}

#[derive(Deserialize)]
pub struct ActiveTimetableParams {
    department_id: Option<String>,
    branch_id: Option<String>,
}

pub async fn get_active_timetable(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(params): Query<ActiveTimetableParams>,
) -> Result<Json<Timetable>, AppError> {
    let timetable = publish::find_active_timetable(
        &state.db,
        &id,
        params.department_id.as_deref(),
        params.branch_id.as_deref(),
    )
    .await?
    .ok_or(AppError::NotFound)?;
    Ok(Json(timetable))
}

/// Grid view for dashboards and exporters: one block per active weekday,
/// each with the ordered slots and a division-keyed cell map. Break slots
/// carry an empty cell map.
#[derive(Debug, Serialize)]
pub struct TimetableGrid {
    pub timetable: Timetable,
    pub divisions: Vec<Division>,
    pub days: Vec<GridDay>,
}

#[derive(Debug, Serialize)]
pub struct GridDay {
    pub day: DayCode,
    pub slots: Vec<GridSlot>,
}

#[derive(Debug, Serialize)]
pub struct GridSlot {
    pub slot: TimeSlot,
    pub entries: HashMap<String, EntryDetail>,
}

pub async fn get_grid(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<TimetableGrid>, AppError> {
    let timetable = timetables::find_timetable_by_id(&state.db, &id)
        .await?
        .ok_or(AppError::NotFound)?;

    let divisions = timetables::fetch_divisions(&state.db, &timetable.id).await?;
    let slots = timetables::fetch_timeslots(&state.db, &timetable.id).await?;
    let details = timetables::fetch_entry_details(&state.db, &timetable.id).await?;

    let mut by_cell: HashMap<(DayCode, String, String), EntryDetail> = details
        .into_iter()
        .map(|d| ((d.day, d.timeslot_id.clone(), d.division_id.clone()), d))
        .collect();

    let mut days = Vec::new();
    for &day in DayCode::active(timetable.days_count) {
        let mut grid_slots = Vec::new();
        for slot in &slots {
            let mut entries = HashMap::new();
            if !slot.is_break {
                for division in &divisions {
                    let key = (day, slot.id.clone(), division.id.clone());
                    if let Some(detail) = by_cell.remove(&key) {
                        entries.insert(division.id.clone(), detail);
                    }
                }
            }
            grid_slots.push(GridSlot { slot: slot.clone(), entries });
        }
        days.push(GridDay { day, slots: grid_slots });
    }

    Ok(Json(TimetableGrid { timetable, divisions, days }))
}
