use std::collections::HashMap;

use rand::rngs::SmallRng;
use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use sqlx::SqlitePool;
use tracing::{info, warn};
use uuid::Uuid;

use crate::db::{academics, people, timetables};
use crate::models::{DayCode, TimetableEntry};

use super::SchedulingError;

/// Per-cell sampling budget; the implicit circuit breaker when resources are
/// scarce relative to the grid.
const MAX_ATTEMPTS: usize = 100;

/// Room numbers created as a convenience fallback when the institution has
/// none.
const DEFAULT_ROOM_NUMBERS: std::ops::Range<u32> = 101..111;

#[derive(Debug, Serialize)]
pub struct GenerationReport {
    pub entries_created: usize,
    /// Cells that exhausted the attempt budget and were left empty.
    pub unfilled: Vec<UnfilledCell>,
}

#[derive(Debug, Clone, Serialize)]
pub struct UnfilledCell {
    pub day: DayCode,
    pub timeslot_id: String,
    pub division_id: String,
}

/// Randomized best-effort bulk population of every
/// (day, non-break timeslot, division) cell.
///
/// Full regeneration: existing entries are dropped and the grid refilled
/// inside one transaction, so a failure partway through never leaves a
/// half-cleared timetable. A greedy sample-and-retry heuristic, not an
/// assignment solver; the only guarantee is that the three uniqueness
/// invariants hold in its output.
pub async fn auto_generate(
    db: &SqlitePool,
    timetable_id: &str,
) -> Result<GenerationReport, SchedulingError> {
    let mut rng = SmallRng::from_os_rng();
    auto_generate_with_rng(db, timetable_id, &mut rng).await
}

pub async fn auto_generate_with_rng<R: Rng>(
    db: &SqlitePool,
    timetable_id: &str,
    rng: &mut R,
) -> Result<GenerationReport, SchedulingError> {
    let timetable = timetables::find_timetable_by_id(db, timetable_id)
        .await?
        .ok_or(SchedulingError::TimetableNotFound)?;

    let courses = academics::fetch_courses(db, &timetable.institution_id).await?;
    let teachers = people::fetch_teachers(db, &timetable.institution_id).await?;
    let divisions = timetables::fetch_divisions(db, &timetable.id).await?;
    let slots = timetables::fetch_teaching_timeslots(db, &timetable.id).await?;

    // All precondition failures abort before any write.
    if courses.is_empty() || teachers.is_empty() || divisions.is_empty() || slots.is_empty() {
        return Err(SchedulingError::InsufficientResources);
    }

    let mut rooms = timetables::fetch_rooms(db, &timetable.institution_id).await?;
    if rooms.is_empty() {
        for number in DEFAULT_ROOM_NUMBERS {
            rooms.push(
                timetables::insert_room(db, &timetable.institution_id, &number.to_string())
                    .await?,
            );
        }
    }

    let mut tx = db.begin().await?;

    let cleared = timetables::clear_entries(&mut *tx, &timetable.id).await?;
    if cleared > 0 {
        info!("regenerating timetable {}: dropped {} entries", timetable.id, cleared);
    }

    // Occupancy caches keyed by (day, timeslot). They shortcut the obvious
    // collisions; the unique indexes catch whatever sampling order lets
    // through, and a violated insert just costs one attempt.
    let mut teacher_occupied: HashMap<(DayCode, String), String> = HashMap::new();
    let mut room_occupied: HashMap<(DayCode, String), String> = HashMap::new();
    let mut division_occupied: HashMap<(DayCode, String), String> = HashMap::new();

    let mut entries_created = 0;
    let mut unfilled = Vec::new();

    for &day in DayCode::active(timetable.days_count) {
        for slot in &slots {
            for division in &divisions {
                let slot_key = (day, slot.id.clone());
                let mut placed = false;

                for _ in 0..MAX_ATTEMPTS {
                    let Some(course) = courses.choose(rng) else { break };
                    let Some(teacher) = teachers.choose(rng) else { break };
                    let Some(room) = rooms.choose(rng) else { break };

                    if teacher_occupied.get(&slot_key) == Some(&teacher.id)
                        || room_occupied.get(&slot_key) == Some(&room.id)
                        || division_occupied.get(&slot_key) == Some(&division.id)
                    {
                        continue;
                    }

                    let entry = TimetableEntry {
                        id: Uuid::new_v4().to_string(),
                        timetable_id: timetable.id.clone(),
                        day,
                        timeslot_id: slot.id.clone(),
                        division_id: division.id.clone(),
                        subject_id: Some(course.id.clone()),
                        faculty_id: Some(teacher.id.clone()),
                        room_id: Some(room.id.clone()),
                    };

                    match timetables::insert_entry(&mut *tx, &entry).await {
                        Ok(()) => {
                            teacher_occupied.insert(slot_key.clone(), teacher.id.clone());
                            room_occupied.insert(slot_key.clone(), room.id.clone());
                            division_occupied.insert(slot_key.clone(), division.id.clone());
                            entries_created += 1;
                            placed = true;
                            break;
                        }
                        Err(err) if super::is_unique_violation(&err) => {
                            // The cache only remembers the latest holder per
                            // slot; the index caught an older one. Try again.
                            continue;
                        }
                        Err(err) => return Err(err.into()),
                    }
                }

                if !placed {
                    unfilled.push(UnfilledCell {
                        day,
                        timeslot_id: slot.id.clone(),
                        division_id: division.id.clone(),
                    });
                }
            }
        }
    }

    tx.commit().await?;

    if unfilled.is_empty() {
        info!("auto-generated {} entries for timetable {}", entries_created, timetable.id);
    } else {
        warn!(
            "auto-generated {} entries for timetable {}, {} cells left unfilled",
            entries_created,
            timetable.id,
            unfilled.len()
        );
    }

    Ok(GenerationReport { entries_created, unfilled })
}
