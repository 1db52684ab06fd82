mod common;

use rand::SeedableRng;
use rand::rngs::SmallRng;

use campus_backend::db::timetables;
use campus_backend::services::SchedulingError;
use campus_backend::services::generator::{auto_generate, auto_generate_with_rng};

use common::{CampusConfig, invariants_hold, seed_campus, setup_test_db};

#[tokio::test]
async fn generation_terminates_within_grid_bounds() {
    let pool = setup_test_db().await;
    let campus = seed_campus(&pool, CampusConfig::default()).await;

    let mut rng = SmallRng::seed_from_u64(7);
    let report = auto_generate_with_rng(&pool, &campus.timetable.id, &mut rng)
        .await
        .expect("generation should succeed");

    let cells = campus.divisions.len()
        * campus.teaching_slots.len()
        * campus.timetable.days_count as usize;
    assert!(report.entries_created <= cells);
    assert_eq!(report.entries_created + report.unfilled.len(), cells);

    let stored = timetables::count_entries(&pool, &campus.timetable.id).await.unwrap();
    assert_eq!(stored as usize, report.entries_created);
    assert!(invariants_hold(&pool, &campus.timetable.id).await);
}

#[tokio::test]
async fn scarce_resources_fill_at_most_one_division_per_cell() {
    let pool = setup_test_db().await;
    // 1 teacher and 1 room but 2 divisions: each (day, slot) can only host
    // one of them.
    let campus = seed_campus(
        &pool,
        CampusConfig {
            teachers: 1,
            rooms: 1,
            divisions: "D1, D2",
            days_count: 1,
            slots_before_break: 1,
            break_duration: 0,
            slots_after_break: 0,
            ..CampusConfig::default()
        },
    )
    .await;
    assert_eq!(campus.teaching_slots.len(), 1);

    let mut rng = SmallRng::seed_from_u64(42);
    let report = auto_generate_with_rng(&pool, &campus.timetable.id, &mut rng)
        .await
        .expect("generation degrades, it does not fail");

    assert_eq!(report.entries_created, 1);
    assert_eq!(report.unfilled.len(), 1);
    let skipped = &report.unfilled[0];
    assert!(campus.divisions.iter().any(|d| d.id == skipped.division_id));
    assert!(invariants_hold(&pool, &campus.timetable.id).await);
}

#[tokio::test]
async fn generation_aborts_before_writing_without_teachers() {
    let pool = setup_test_db().await;
    let campus = seed_campus(&pool, CampusConfig { teachers: 0, ..CampusConfig::default() }).await;

    let err = auto_generate(&pool, &campus.timetable.id)
        .await
        .expect_err("no teachers means no generation");
    assert!(matches!(err, SchedulingError::InsufficientResources));
    assert_eq!(timetables::count_entries(&pool, &campus.timetable.id).await.unwrap(), 0);
}

#[tokio::test]
async fn regeneration_replaces_previous_entries() {
    let pool = setup_test_db().await;
    let campus = seed_campus(&pool, CampusConfig::default()).await;

    let mut rng = SmallRng::seed_from_u64(1);
    let first = auto_generate_with_rng(&pool, &campus.timetable.id, &mut rng).await.unwrap();
    let second = auto_generate_with_rng(&pool, &campus.timetable.id, &mut rng).await.unwrap();

    // Full regeneration, not an incremental fill on top of the old grid.
    let stored = timetables::count_entries(&pool, &campus.timetable.id).await.unwrap();
    assert_eq!(stored as usize, second.entries_created);
    assert!(first.entries_created > 0);
    assert!(invariants_hold(&pool, &campus.timetable.id).await);
}

#[tokio::test]
async fn default_rooms_are_created_when_institution_has_none() {
    let pool = setup_test_db().await;
    let campus = seed_campus(&pool, CampusConfig { rooms: 0, ..CampusConfig::default() }).await;

    let mut rng = SmallRng::seed_from_u64(3);
    let report = auto_generate_with_rng(&pool, &campus.timetable.id, &mut rng).await.unwrap();
    assert!(report.entries_created > 0);

    let rooms = timetables::fetch_rooms(&pool, &campus.institution.id).await.unwrap();
    assert_eq!(rooms.len(), 10);
    assert!(rooms.iter().any(|r| r.number == "101"));
}
