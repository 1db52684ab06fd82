use sqlx::SqlitePool;
use tracing::info;
use uuid::Uuid;

use crate::db::timetables;
use crate::models::{EntryRequest, TimeSlot, Timetable, TimetableEntry};

use super::SchedulingError;
use super::conflict::{self, Candidate, ConflictCheck};

/// Manual entry workflow: validate one proposed placement and write at most
/// one row.
///
/// A submission targeting an already-occupied (day, timeslot, division) cell
/// is treated as an edit of that entry, which is then excluded from the
/// conflict lookups. The pre-check is an optimization; the unique indexes on
/// timetable_entries are the authoritative guard, and a write-time violation
/// is translated back into the same conflict taxonomy.
pub async fn submit_entry(
    db: &SqlitePool,
    timetable_id: &str,
    req: &EntryRequest,
) -> Result<TimetableEntry, SchedulingError> {
    let timetable = timetables::find_timetable_by_id(db, timetable_id)
        .await?
        .ok_or(SchedulingError::TimetableNotFound)?;

    if req.day.index() as i64 >= timetable.days_count {
        return Err(SchedulingError::DayOutOfRange(req.day));
    }

    let slot = timetables::find_timeslot_by_id(db, &req.timeslot_id)
        .await?
        .filter(|s| s.timetable_id == timetable.id)
        .ok_or(SchedulingError::TimeSlotNotFound)?;
    if slot.is_break {
        return Err(SchedulingError::BreakSlot);
    }

    let division = timetables::find_division_by_id(db, &req.division_id)
        .await?
        .filter(|d| d.timetable_id == timetable.id)
        .ok_or(SchedulingError::DivisionNotFound)?;

    let candidate = Candidate {
        day: req.day,
        timeslot_id: &slot.id,
        division_id: &division.id,
        subject_id: req.subject_id.as_deref(),
        faculty_id: req.faculty_id.as_deref(),
        room_id: req.room_id.as_deref(),
    };

    let existing = timetables::find_cell_entry(db, &timetable.id, req.day, &slot.id, &division.id)
        .await?;
    let exclude = existing.as_ref().map(|e| e.id.as_str());

    match conflict::find_conflict(db, &timetable, &candidate, exclude).await? {
        ConflictCheck::RoomConflict { room, occupied_by } => {
            Err(conflict::room_conflict_error(&room, &occupied_by, req.day, &slot))
        }
        ConflictCheck::FacultyConflict { faculty, occupied_by } => {
            Err(conflict::faculty_conflict_error(&faculty, &occupied_by, req.day, &slot))
        }
        ConflictCheck::Redundant(entry) => {
            info!(
                "redundant entry for {} {} division {}, nothing to write",
                req.day,
                slot.label(),
                division.name
            );
            Ok(entry)
        }
        ConflictCheck::Replaceable(mut entry) => {
            let update = timetables::update_entry_payload(
                db,
                &entry.id,
                candidate.subject_id,
                candidate.faculty_id,
                candidate.room_id,
            )
            .await;
            if let Err(err) = update {
                return Err(translate_write_error(db, &timetable, &candidate, &slot, err).await);
            }
            entry.subject_id = req.subject_id.clone();
            entry.faculty_id = req.faculty_id.clone();
            entry.room_id = req.room_id.clone();
            Ok(entry)
        }
        ConflictCheck::Clear => {
            let entry = TimetableEntry {
                id: Uuid::new_v4().to_string(),
                timetable_id: timetable.id.clone(),
                day: req.day,
                timeslot_id: slot.id.clone(),
                division_id: division.id.clone(),
                subject_id: req.subject_id.clone(),
                faculty_id: req.faculty_id.clone(),
                room_id: req.room_id.clone(),
            };
            if let Err(err) = timetables::insert_entry(db, &entry).await {
                return Err(translate_write_error(db, &timetable, &candidate, &slot, err).await);
            }
            Ok(entry)
        }
    }
}

/// A unique-index violation means a concurrent writer slipped between the
/// check and the write; re-run the lookup so the caller still gets a named
/// conflict rather than a bare database error.
async fn translate_write_error(
    db: &SqlitePool,
    timetable: &Timetable,
    candidate: &Candidate<'_>,
    slot: &TimeSlot,
    err: sqlx::Error,
) -> SchedulingError {
    if !super::is_unique_violation(&err) {
        return SchedulingError::Database(err);
    }

    match conflict::find_conflict(db, timetable, candidate, None).await {
        Ok(ConflictCheck::RoomConflict { room, occupied_by }) => {
            conflict::room_conflict_error(&room, &occupied_by, candidate.day, slot)
        }
        Ok(ConflictCheck::FacultyConflict { faculty, occupied_by }) => {
            conflict::faculty_conflict_error(&faculty, &occupied_by, candidate.day, slot)
        }
        _ => SchedulingError::SlotTaken {
            day: candidate.day,
            slot: slot.label(),
        },
    }
}
