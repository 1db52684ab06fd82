use std::fmt;

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Weekday codes as stored in `timetable_entries.day`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "UPPERCASE")]
#[sqlx(rename_all = "UPPERCASE")]
pub enum DayCode {
    Mon,
    Tue,
    Wed,
    Thu,
    Fri,
    Sat,
    Sun,
}

impl DayCode {
    pub const ALL: [DayCode; 7] = [
        DayCode::Mon,
        DayCode::Tue,
        DayCode::Wed,
        DayCode::Thu,
        DayCode::Fri,
        DayCode::Sat,
        DayCode::Sun,
    ];

    /// The weekday columns a timetable with the given `days_count` uses.
    pub fn active(days_count: i64) -> &'static [DayCode] {
        let n = days_count.clamp(1, 7) as usize;
        &Self::ALL[..n]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            DayCode::Mon => "MON",
            DayCode::Tue => "TUE",
            DayCode::Wed => "WED",
            DayCode::Thu => "THU",
            DayCode::Fri => "FRI",
            DayCode::Sat => "SAT",
            DayCode::Sun => "SUN",
        }
    }

    /// Zero-based position within the week (MON = 0).
    pub fn index(self) -> usize {
        Self::ALL.iter().position(|d| *d == self).unwrap_or(0)
    }
}

impl fmt::Display for DayCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Timetable {
    pub id: String,
    pub institution_id: String,
    pub department_id: Option<String>,
    pub branch_id: Option<String>,
    pub course_id: Option<String>,
    pub name: String,
    pub status: String,
    pub days_count: i64,
    pub is_published: bool,
    pub heading_1: String,
    pub heading_2: String,
    pub footer_semester_text: String,
    pub footer_prepared_by: String,
    pub footer_hod: String,
    pub theme_palette: String,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Division {
    pub id: String,
    pub timetable_id: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct TimeSlot {
    pub id: String,
    pub timetable_id: String,
    pub lecture_number: i64,
    pub start_time: String,
    pub end_time: String,
    pub is_break: bool,
}

impl TimeSlot {
    /// "Rec 3: 11:00 - 11:50", as shown in conflict messages and grids.
    pub fn label(&self) -> String {
        format!("Rec {}: {} - {}", self.lecture_number, self.start_time, self.end_time)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Room {
    pub id: String,
    pub institution_id: String,
    pub number: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewRoomRequest {
    pub number: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct TimetableEntry {
    pub id: String,
    pub timetable_id: String,
    pub day: DayCode,
    pub timeslot_id: String,
    pub division_id: String,
    pub subject_id: Option<String>,
    pub faculty_id: Option<String>,
    pub room_id: Option<String>,
}

impl TimetableEntry {
    /// Same (subject, faculty, room) payload as the candidate tuple.
    pub fn same_payload(
        &self,
        subject_id: Option<&str>,
        faculty_id: Option<&str>,
        room_id: Option<&str>,
    ) -> bool {
        self.subject_id.as_deref() == subject_id
            && self.faculty_id.as_deref() == faculty_id
            && self.room_id.as_deref() == room_id
    }
}

/// One entry joined with the display fields export and dashboard grids need.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct EntryDetail {
    pub id: String,
    pub day: DayCode,
    pub timeslot_id: String,
    pub division_id: String,
    pub subject_id: Option<String>,
    pub faculty_id: Option<String>,
    pub room_id: Option<String>,
    pub subject_code: Option<String>,
    pub faculty_name: Option<String>,
    pub room_number: Option<String>,
    /// Derived from `faculty_name` after the fetch, not stored.
    #[serde(default)]
    #[sqlx(default)]
    pub faculty_initials: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetupRequest {
    pub institution_id: String,
    pub department_id: Option<String>,
    pub course_id: Option<String>,
    /// Comma separated, e.g. "D1, D2, D3".
    pub divisions: String,
    pub days_count: i64,
    /// "HH:MM", first lecture start.
    pub start_time: String,
    /// Minutes.
    pub slot_duration: i64,
    /// Minutes; 0 or absent means no break slot.
    pub break_duration: Option<i64>,
    pub slots_before_break: i64,
    pub slots_after_break: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntryRequest {
    pub day: DayCode,
    pub timeslot_id: String,
    pub division_id: String,
    pub subject_id: Option<String>,
    pub faculty_id: Option<String>,
    pub room_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublishRequest {
    pub name: String,
    pub department_id: String,
    pub branch_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeaderUpdateRequest {
    pub name: Option<String>,
    pub heading_1: Option<String>,
    pub heading_2: Option<String>,
    pub footer_semester_text: Option<String>,
    pub footer_prepared_by: Option<String>,
    pub footer_hod: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn active_days_follow_days_count() {
        assert_eq!(DayCode::active(5), &DayCode::ALL[..5]);
        assert_eq!(DayCode::active(7).last(), Some(&DayCode::Sun));
        // Out-of-range counts clamp instead of panicking.
        assert_eq!(DayCode::active(0).len(), 1);
        assert_eq!(DayCode::active(12).len(), 7);
    }

    #[test]
    fn timeslot_label_format() {
        let slot = TimeSlot {
            id: "s1".into(),
            timetable_id: "t1".into(),
            lecture_number: 3,
            start_time: "11:00".into(),
            end_time: "11:50".into(),
            is_break: false,
        };
        assert_eq!(slot.label(), "Rec 3: 11:00 - 11:50");
    }
}
