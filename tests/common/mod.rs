use sqlx::SqlitePool;

use campus_backend::db::{self, academics, people, timetables};
use campus_backend::models::*;
use campus_backend::services::setup;

pub async fn setup_test_db() -> SqlitePool {
    let pool = db::connect("sqlite::memory:")
        .await
        .expect("Failed to create test db");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations");

    pool
}

/// A seeded institution with staff, courses, rooms and one timetable shell.
pub struct Campus {
    pub institution: Institution,
    pub teachers: Vec<Teacher>,
    pub courses: Vec<Course>,
    pub rooms: Vec<Room>,
    pub timetable: Timetable,
    pub divisions: Vec<Division>,
    pub teaching_slots: Vec<TimeSlot>,
}

pub struct CampusConfig<'a> {
    pub teachers: usize,
    pub courses: usize,
    pub rooms: usize,
    pub divisions: &'a str,
    pub days_count: i64,
    pub slots_before_break: i64,
    pub break_duration: i64,
    pub slots_after_break: i64,
}

impl Default for CampusConfig<'_> {
    fn default() -> Self {
        CampusConfig {
            teachers: 3,
            courses: 4,
            rooms: 3,
            divisions: "D1, D2",
            days_count: 5,
            slots_before_break: 2,
            break_duration: 20,
            slots_after_break: 1,
        }
    }
}

pub async fn seed_campus(pool: &SqlitePool, config: CampusConfig<'_>) -> Campus {
    let institution = campus_backend::db::institutions::insert_institution(
        pool,
        NewInstitutionRequest {
            name: "Test Institute".to_string(),
            email: "admin@test.edu".to_string(),
            phone: None,
            address: None,
            established_year: None,
        },
    )
    .await
    .expect("Failed to insert institution");

    let mut teachers = Vec::new();
    for i in 0..config.teachers {
        teachers.push(
            people::insert_teacher(
                pool,
                &institution.id,
                NewTeacherRequest {
                    department_id: None,
                    employee_id: format!("EMP-{i}"),
                    full_name: format!("Teacher {i}"),
                    qualification: None,
                },
            )
            .await
            .expect("Failed to insert teacher"),
        );
    }

    let mut courses = Vec::new();
    for i in 0..config.courses {
        courses.push(
            academics::insert_course(
                pool,
                &institution.id,
                NewCourseRequest {
                    department_id: None,
                    code: format!("CS-{i}"),
                    name: format!("Course {i}"),
                    credits: None,
                },
            )
            .await
            .expect("Failed to insert course"),
        );
    }

    let mut rooms = Vec::new();
    for i in 0..config.rooms {
        rooms.push(
            timetables::insert_room(pool, &institution.id, &format!("{}", 101 + i))
                .await
                .expect("Failed to insert room"),
        );
    }

    let timetable = setup::create_timetable_structure(
        pool,
        &SetupRequest {
            institution_id: institution.id.clone(),
            department_id: None,
            course_id: None,
            divisions: config.divisions.to_string(),
            days_count: config.days_count,
            start_time: "09:00".to_string(),
            slot_duration: 50,
            break_duration: Some(config.break_duration),
            slots_before_break: config.slots_before_break,
            slots_after_break: config.slots_after_break,
        },
    )
    .await
    .expect("Failed to create timetable structure");

    let divisions = timetables::fetch_divisions(pool, &timetable.id)
        .await
        .expect("Failed to fetch divisions");
    let teaching_slots = timetables::fetch_teaching_timeslots(pool, &timetable.id)
        .await
        .expect("Failed to fetch timeslots");

    Campus {
        institution,
        teachers,
        courses,
        rooms,
        timetable,
        divisions,
        teaching_slots,
    }
}

/// True when no two entries of the timetable share a room, faculty or
/// division at the same (day, timeslot).
pub async fn invariants_hold(pool: &SqlitePool, timetable_id: &str) -> bool {
    for column in ["room_id", "faculty_id", "division_id"] {
        let sql = format!(
            "SELECT COUNT(*) FROM (SELECT day, timeslot_id, {column} \
             FROM timetable_entries \
             WHERE timetable_id = ? AND {column} IS NOT NULL \
             GROUP BY day, timeslot_id, {column} HAVING COUNT(*) > 1)"
        );
        let (duplicates,): (i64,) = sqlx::query_as(&sql)
            .bind(timetable_id)
            .fetch_one(pool)
            .await
            .expect("Failed to check invariants");
        if duplicates > 0 {
            return false;
        }
    }
    true
}
