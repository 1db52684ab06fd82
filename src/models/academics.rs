use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Course {
    pub id: String,
    pub institution_id: String,
    pub department_id: Option<String>,
    pub code: String,
    pub name: String,
    pub credits: i64,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewCourseRequest {
    pub department_id: Option<String>,
    pub code: String,
    pub name: String,
    pub credits: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateCourseRequest {
    pub code: Option<String>,
    pub name: Option<String>,
    pub credits: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Grade {
    pub id: String,
    pub student_id: String,
    pub course_id: String,
    pub marks: f64,
    pub grade: String,
    pub date_assigned: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewGradeRequest {
    pub student_id: String,
    pub course_id: String,
    pub marks: f64,
}

/// A teacher's attendance register for one department over a date range.
/// Per-student counts live in [`AttendanceRecord`] rows.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AttendanceSheet {
    pub id: String,
    pub teacher_id: String,
    pub department_id: String,
    pub date_from: String,
    pub date_to: String,
    pub total_lectures: i64,
    pub shared_with_students: bool,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewAttendanceSheetRequest {
    pub teacher_id: String,
    pub department_id: String,
    pub date_from: String,
    pub date_to: String,
    pub total_lectures: i64,
    pub shared_with_students: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AttendanceRecord {
    pub id: String,
    pub sheet_id: String,
    pub student_id: String,
    pub lectures_attended: i64,
    pub total_lectures: i64,
    pub percentage: f64,
}

/// Request to mark (or re-mark) one student's count on a sheet.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttendanceMarkRequest {
    pub student_id: String,
    pub lectures_attended: i64,
}

/// Attended-over-total as a percentage, rounded to two decimals; zero
/// lectures means 0% rather than a division by zero.
pub fn attendance_percentage(attended: i64, total: i64) -> f64 {
    if total <= 0 {
        return 0.0;
    }
    let raw = attended as f64 * 100.0 / total as f64;
    (raw * 100.0).round() / 100.0
}

/// Per-semester marksheet. `total_marks`, `percentage` and `final_grade`
/// are derived from the marks rows and recomputed on every mark write.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Marksheet {
    pub id: String,
    pub student_id: String,
    pub teacher_id: Option<String>,
    pub department_id: Option<String>,
    pub semester: i64,
    pub academic_year: String,
    pub total_marks: f64,
    pub percentage: f64,
    pub final_grade: String,
    pub shared_with_students: bool,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewMarksheetRequest {
    pub student_id: String,
    pub teacher_id: Option<String>,
    pub department_id: Option<String>,
    pub semester: i64,
    pub academic_year: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Mark {
    pub id: String,
    pub marksheet_id: String,
    pub subject_id: String,
    pub marks: f64,
    pub grade: String,
}

/// One subject's marks (out of 100) for a marksheet; upserted per subject.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarkRequest {
    pub subject_id: String,
    pub marks: f64,
}

/// Letter grade for a 0-100 percentage.
pub fn grade_letter(percentage: f64) -> &'static str {
    if percentage >= 90.0 {
        "A+"
    } else if percentage >= 80.0 {
        "A"
    } else if percentage >= 70.0 {
        "B+"
    } else if percentage >= 60.0 {
        "B"
    } else if percentage >= 50.0 {
        "C"
    } else if percentage >= 40.0 {
        "D"
    } else {
        "F"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attendance_percentage_rounds_and_survives_empty_sheets() {
        assert_eq!(attendance_percentage(18, 20), 90.0);
        assert_eq!(attendance_percentage(1, 3), 33.33);
        assert_eq!(attendance_percentage(0, 0), 0.0);
    }

    #[test]
    fn grade_letter_boundaries() {
        assert_eq!(grade_letter(90.0), "A+");
        assert_eq!(grade_letter(89.9), "A");
        assert_eq!(grade_letter(70.0), "B+");
        assert_eq!(grade_letter(60.0), "B");
        assert_eq!(grade_letter(50.0), "C");
        assert_eq!(grade_letter(40.0), "D");
        assert_eq!(grade_letter(39.9), "F");
    }
}
