use sqlx::SqlitePool;

use crate::db::timetables;
use crate::models::{DayCode, Division, Room, Teacher, TimeSlot, Timetable, TimetableEntry};

/// Outcome of checking one candidate placement against the grid.
///
/// Room and faculty collisions block; an existing entry in the same
/// (day, timeslot, division) cell is either redundant (identical payload,
/// nothing to write) or replaceable (caller may overwrite in place).
#[derive(Debug)]
pub enum ConflictCheck {
    Clear,
    Redundant(TimetableEntry),
    Replaceable(TimetableEntry),
    RoomConflict { room: Room, occupied_by: Division },
    FacultyConflict { faculty: Teacher, occupied_by: Division },
}

/// Candidate placement for the conflict checker and the manual entry
/// workflow.
#[derive(Debug, Clone)]
pub struct Candidate<'a> {
    pub day: DayCode,
    pub timeslot_id: &'a str,
    pub division_id: &'a str,
    pub subject_id: Option<&'a str>,
    pub faculty_id: Option<&'a str>,
    pub room_id: Option<&'a str>,
}

/// Three independent lookups against the (timetable, day, timeslot) row set,
/// in priority order: room, faculty, then the division cell itself.
/// Read-only; `exclude_entry_id` skips the entry being edited.
pub async fn find_conflict(
    db: &SqlitePool,
    timetable: &Timetable,
    candidate: &Candidate<'_>,
    exclude_entry_id: Option<&str>,
) -> Result<ConflictCheck, sqlx::Error> {
    if let Some(room_id) = candidate.room_id {
        if let Some(holder) = timetables::find_room_holder(
            db,
            &timetable.id,
            candidate.day,
            candidate.timeslot_id,
            room_id,
            exclude_entry_id,
        )
        .await?
        {
            let room = timetables::find_room_by_id(db, room_id)
                .await?
                .ok_or(sqlx::Error::RowNotFound)?;
            let occupied_by = timetables::find_division_by_id(db, &holder.division_id)
                .await?
                .ok_or(sqlx::Error::RowNotFound)?;
            return Ok(ConflictCheck::RoomConflict { room, occupied_by });
        }
    }

    if let Some(faculty_id) = candidate.faculty_id {
        if let Some(holder) = timetables::find_faculty_holder(
            db,
            &timetable.id,
            candidate.day,
            candidate.timeslot_id,
            faculty_id,
            exclude_entry_id,
        )
        .await?
        {
            let faculty = crate::db::people::find_teacher_by_id(db, faculty_id)
                .await?
                .ok_or(sqlx::Error::RowNotFound)?;
            let occupied_by = timetables::find_division_by_id(db, &holder.division_id)
                .await?
                .ok_or(sqlx::Error::RowNotFound)?;
            return Ok(ConflictCheck::FacultyConflict { faculty, occupied_by });
        }
    }

    if let Some(existing) = timetables::find_cell_entry(
        db,
        &timetable.id,
        candidate.day,
        candidate.timeslot_id,
        candidate.division_id,
    )
    .await?
    {
        if existing.same_payload(candidate.subject_id, candidate.faculty_id, candidate.room_id) {
            return Ok(ConflictCheck::Redundant(existing));
        }
        return Ok(ConflictCheck::Replaceable(existing));
    }

    Ok(ConflictCheck::Clear)
}

/// Conflict message helpers shared by the manual workflow and the write-time
/// constraint translation.
pub(crate) fn faculty_conflict_error(
    faculty: &Teacher,
    occupied_by: &Division,
    day: DayCode,
    slot: &TimeSlot,
) -> super::SchedulingError {
    super::SchedulingError::FacultyConflict {
        faculty: faculty.full_name.clone(),
        division: occupied_by.name.clone(),
        day,
        slot: slot.label(),
    }
}

pub(crate) fn room_conflict_error(
    room: &Room,
    occupied_by: &Division,
    day: DayCode,
    slot: &TimeSlot,
) -> super::SchedulingError {
    super::SchedulingError::RoomConflict {
        room: room.number.clone(),
        division: occupied_by.name.clone(),
        day,
        slot: slot.label(),
    }
}
