mod common;

use campus_backend::db::{institutions, timetables};
use campus_backend::models::{NewInstitutionRequest, SetupRequest};
use campus_backend::services::SchedulingError;
use campus_backend::services::setup::create_timetable_structure;

use common::setup_test_db;

async fn seed_institution(pool: &sqlx::SqlitePool) -> String {
    institutions::insert_institution(
        pool,
        NewInstitutionRequest {
            name: "Grid Test".to_string(),
            email: "grid@test.edu".to_string(),
            phone: None,
            address: None,
            established_year: None,
        },
    )
    .await
    .unwrap()
    .id
}

fn base_request(institution_id: &str) -> SetupRequest {
    SetupRequest {
        institution_id: institution_id.to_string(),
        department_id: None,
        course_id: None,
        divisions: "D1, D2".to_string(),
        days_count: 6,
        start_time: "09:00".to_string(),
        slot_duration: 50,
        break_duration: Some(20),
        slots_before_break: 2,
        slots_after_break: 1,
    }
}

#[tokio::test]
async fn slot_times_accumulate_from_start_time() {
    let pool = setup_test_db().await;
    let institution_id = seed_institution(&pool).await;

    let timetable = create_timetable_structure(&pool, &base_request(&institution_id))
        .await
        .expect("setup should succeed");

    let slots = timetables::fetch_timeslots(&pool, &timetable.id).await.unwrap();
    let described: Vec<(i64, &str, &str, bool)> = slots
        .iter()
        .map(|s| (s.lecture_number, s.start_time.as_str(), s.end_time.as_str(), s.is_break))
        .collect();

    assert_eq!(
        described,
        vec![
            (1, "09:00", "09:50", false),
            (2, "09:50", "10:40", false),
            (3, "10:40", "11:00", true),
            (4, "11:00", "11:50", false),
        ]
    );
}

#[tokio::test]
async fn zero_break_duration_creates_no_break_slot() {
    let pool = setup_test_db().await;
    let institution_id = seed_institution(&pool).await;

    let mut req = base_request(&institution_id);
    req.break_duration = Some(0);

    let timetable = create_timetable_structure(&pool, &req).await.unwrap();
    let slots = timetables::fetch_timeslots(&pool, &timetable.id).await.unwrap();

    assert_eq!(slots.len(), 3);
    assert!(slots.iter().all(|s| !s.is_break));
    assert_eq!(slots[2].start_time, "10:40");
    assert_eq!(slots[2].end_time, "11:30");
}

#[tokio::test]
async fn division_names_are_trimmed_and_blank_entries_dropped() {
    let pool = setup_test_db().await;
    let institution_id = seed_institution(&pool).await;

    let mut req = base_request(&institution_id);
    req.divisions = " D1 ,D2,  , D3 ".to_string();

    let timetable = create_timetable_structure(&pool, &req).await.unwrap();
    let divisions = timetables::fetch_divisions(&pool, &timetable.id).await.unwrap();

    let names: Vec<&str> = divisions.iter().map(|d| d.name.as_str()).collect();
    assert_eq!(names, vec!["D1", "D2", "D3"]);
}

#[tokio::test]
async fn invalid_configs_are_rejected_before_writing() {
    let pool = setup_test_db().await;
    let institution_id = seed_institution(&pool).await;

    let mut bad_days = base_request(&institution_id);
    bad_days.days_count = 9;
    assert!(matches!(
        create_timetable_structure(&pool, &bad_days).await,
        Err(SchedulingError::InvalidSetup(_))
    ));

    let mut bad_time = base_request(&institution_id);
    bad_time.start_time = "nine".to_string();
    assert!(matches!(
        create_timetable_structure(&pool, &bad_time).await,
        Err(SchedulingError::InvalidSetup(_))
    ));

    let mut no_divisions = base_request(&institution_id);
    no_divisions.divisions = " , ,".to_string();
    assert!(matches!(
        create_timetable_structure(&pool, &no_divisions).await,
        Err(SchedulingError::InvalidSetup(_))
    ));

    let history = timetables::fetch_timetables(&pool, &institution_id).await.unwrap();
    assert!(history.is_empty());
}
