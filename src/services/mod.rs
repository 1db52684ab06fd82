pub mod conflict;
pub mod entry;
pub mod generator;
pub mod publish;
pub mod setup;

use thiserror::Error;

use crate::error::AppError;
use crate::models::DayCode;

/// Error taxonomy for the scheduling core. Conflicts carry the
/// human-readable "who is already there" message callers show directly.
#[derive(Debug, Error)]
pub enum SchedulingError {
    #[error("Faculty {faculty} is already booked in {division} at this time ({day} {slot}).")]
    FacultyConflict {
        faculty: String,
        division: String,
        day: DayCode,
        slot: String,
    },

    #[error("Room {room} is already occupied by {division} at this time ({day} {slot}).")]
    RoomConflict {
        room: String,
        division: String,
        day: DayCode,
        slot: String,
    },

    /// The storage constraint fired but the re-check could not name the
    /// holder; a concurrent writer won the cell.
    #[error("This slot was just taken by another update ({day} {slot}).")]
    SlotTaken { day: DayCode, slot: String },

    #[error("Not enough courses or teachers to generate timetable.")]
    InsufficientResources,

    #[error("{0} is outside this timetable's working days.")]
    DayOutOfRange(DayCode),

    #[error("Cannot schedule a class in a break period.")]
    BreakSlot,

    #[error("Invalid setup: {0}")]
    InvalidSetup(String),

    #[error("Timetable not found.")]
    TimetableNotFound,

    #[error("Time slot not found.")]
    TimeSlotNotFound,

    #[error("Division not found.")]
    DivisionNotFound,

    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

impl From<SchedulingError> for AppError {
    fn from(err: SchedulingError) -> Self {
        match err {
            SchedulingError::FacultyConflict { .. }
            | SchedulingError::RoomConflict { .. }
            | SchedulingError::SlotTaken { .. } => AppError::Conflict(err.to_string()),
            SchedulingError::InsufficientResources
            | SchedulingError::DayOutOfRange(_)
            | SchedulingError::BreakSlot
            | SchedulingError::InvalidSetup(_) => AppError::BadRequest(err.to_string()),
            SchedulingError::TimetableNotFound
            | SchedulingError::TimeSlotNotFound
            | SchedulingError::DivisionNotFound => AppError::NotFound,
            SchedulingError::Database(e) => AppError::Database(e),
        }
    }
}

/// Whether a write failed on one of the grid's unique indexes rather than
/// some other database fault.
pub(crate) fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(
        err,
        sqlx::Error::Database(db) if db.kind() == sqlx::error::ErrorKind::UniqueViolation
    )
}
