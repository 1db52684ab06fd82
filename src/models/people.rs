use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Teacher {
    pub id: String,
    pub institution_id: String,
    pub department_id: Option<String>,
    pub employee_id: String,
    pub full_name: String,
    pub qualification: String,
}

impl Teacher {
    pub fn initials(&self) -> String {
        initials(&self.full_name)
    }
}

/// First letter of each name part, uppercased, for grid cells
/// ("Darshan V. Bhatt" -> "DVB").
pub fn initials(full_name: &str) -> String {
    full_name
        .split_whitespace()
        .filter_map(|part| part.chars().next())
        .flat_map(|c| c.to_uppercase())
        .collect()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewTeacherRequest {
    pub department_id: Option<String>,
    pub employee_id: String,
    pub full_name: String,
    pub qualification: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Student {
    pub id: String,
    pub institution_id: String,
    pub department_id: Option<String>,
    pub division_id: Option<String>,
    pub enrollment_no: String,
    pub full_name: String,
    pub gpa: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewStudentRequest {
    pub department_id: Option<String>,
    pub division_id: Option<String>,
    pub enrollment_no: String,
    pub full_name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initials_take_first_letter_of_each_part() {
        let t = Teacher {
            id: "t1".into(),
            institution_id: "i1".into(),
            department_id: None,
            employee_id: "E-1".into(),
            full_name: "priyanka chandra sinha".into(),
            qualification: String::new(),
        };
        assert_eq!(t.initials(), "PCS");
    }
}
