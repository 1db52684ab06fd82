use chrono::{NaiveTime, TimeDelta, Utc};
use sqlx::SqlitePool;
use tracing::info;
use uuid::Uuid;

use crate::db::{institutions, timetables};
use crate::models::{Division, SetupRequest, TimeSlot, Timetable};

use super::SchedulingError;

/// Build a fresh timetable shell: the container row, one division per name,
/// and a run of non-overlapping timeslots accumulated from the start time,
/// with at most one break slot. Pure arithmetic, no conflict potential;
/// everything is written in a single transaction.
pub async fn create_timetable_structure(
    db: &SqlitePool,
    req: &SetupRequest,
) -> Result<Timetable, SchedulingError> {
    let institution = institutions::find_institution_by_id(db, &req.institution_id)
        .await?
        .ok_or_else(|| SchedulingError::InvalidSetup("unknown institution".to_string()))?;

    if !(1..=7).contains(&req.days_count) {
        return Err(SchedulingError::InvalidSetup(
            "days_count must be between 1 and 7".to_string(),
        ));
    }
    if req.slot_duration <= 0 {
        return Err(SchedulingError::InvalidSetup(
            "slot_duration must be positive".to_string(),
        ));
    }
    if req.slots_before_break < 0 || req.slots_after_break < 0 {
        return Err(SchedulingError::InvalidSetup(
            "lecture counts cannot be negative".to_string(),
        ));
    }

    let division_names: Vec<&str> = req
        .divisions
        .split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .collect();
    if division_names.is_empty() {
        return Err(SchedulingError::InvalidSetup(
            "at least one division name is required".to_string(),
        ));
    }

    let start = parse_clock(&req.start_time)
        .ok_or_else(|| SchedulingError::InvalidSetup("start_time must be HH:MM".to_string()))?;

    let now = Utc::now();
    let timetable = Timetable {
        id: Uuid::new_v4().to_string(),
        institution_id: institution.id.clone(),
        department_id: req.department_id.clone(),
        branch_id: None,
        course_id: req.course_id.clone(),
        name: format!("Timetable {}", now.format("%Y-%m-%d %H:%M")),
        status: "Draft".to_string(),
        days_count: req.days_count,
        is_published: false,
        heading_1: institution.name.clone(),
        heading_2: String::new(),
        footer_semester_text: String::new(),
        footer_prepared_by: String::new(),
        footer_hod: String::new(),
        theme_palette: "classic".to_string(),
        created_at: now.to_rfc3339(),
    };

    let mut tx = db.begin().await?;

    timetables::insert_timetable(&mut *tx, &timetable).await?;

    for name in division_names {
        let division = Division {
            id: Uuid::new_v4().to_string(),
            timetable_id: timetable.id.clone(),
            name: name.to_string(),
        };
        timetables::insert_division(&mut *tx, &division).await?;
    }

    let mut cursor = start;
    let mut lecture_number = 1;

    for _ in 0..req.slots_before_break {
        cursor = push_slot(&mut tx, &timetable.id, lecture_number, cursor, req.slot_duration, false)
            .await?;
        lecture_number += 1;
    }

    let break_duration = req.break_duration.unwrap_or(0);
    if break_duration > 0 {
        cursor = push_slot(&mut tx, &timetable.id, lecture_number, cursor, break_duration, true)
            .await?;
        lecture_number += 1;
    }

    for _ in 0..req.slots_after_break {
        cursor = push_slot(&mut tx, &timetable.id, lecture_number, cursor, req.slot_duration, false)
            .await?;
        lecture_number += 1;
    }

    tx.commit().await?;

    info!(
        "created timetable {} with {} slots for institution {}",
        timetable.id,
        lecture_number - 1,
        institution.id
    );
    Ok(timetable)
}

async fn push_slot(
    tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
    timetable_id: &str,
    lecture_number: i64,
    start: NaiveTime,
    duration_minutes: i64,
    is_break: bool,
) -> Result<NaiveTime, SchedulingError> {
    let end = start + TimeDelta::minutes(duration_minutes);
    let slot = TimeSlot {
        id: Uuid::new_v4().to_string(),
        timetable_id: timetable_id.to_string(),
        lecture_number,
        start_time: start.format("%H:%M").to_string(),
        end_time: end.format("%H:%M").to_string(),
        is_break,
    };
    timetables::insert_timeslot(&mut **tx, &slot).await?;
    Ok(end)
}

fn parse_clock(value: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(value, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M:%S"))
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clock_parsing_accepts_minutes_and_seconds() {
        assert_eq!(parse_clock("09:00"), NaiveTime::from_hms_opt(9, 0, 0));
        assert_eq!(parse_clock("09:00:00"), NaiveTime::from_hms_opt(9, 0, 0));
        assert_eq!(parse_clock("morning"), None);
    }
}
