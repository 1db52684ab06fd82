mod common;

use campus_backend::db::{institutions, timetables};
use campus_backend::models::{HeaderUpdateRequest, NewBranchRequest, NewDepartmentRequest, PublishRequest};
use campus_backend::services::publish::{find_active_timetable, publish_timetable, unpublish_timetable};
use campus_backend::services::setup::create_timetable_structure;

use common::{CampusConfig, seed_campus, setup_test_db};

#[tokio::test]
async fn publishing_replaces_the_active_timetable_for_a_scope() {
    let pool = setup_test_db().await;
    let campus = seed_campus(&pool, CampusConfig::default()).await;

    let department = institutions::insert_department(
        &pool,
        &campus.institution.id,
        NewDepartmentRequest { name: "CE".into(), description: None },
    )
    .await
    .unwrap();
    let branch = institutions::insert_branch(
        &pool,
        &campus.institution.id,
        NewBranchRequest {
            department_id: Some(department.id.clone()),
            name: "CST".into(),
            description: None,
        },
    )
    .await
    .unwrap();

    // A second timetable competing for the same scope.
    let setup_req = campus_backend::models::SetupRequest {
        institution_id: campus.institution.id.clone(),
        department_id: None,
        course_id: None,
        divisions: "D1".to_string(),
        days_count: 5,
        start_time: "08:45".to_string(),
        slot_duration: 60,
        break_duration: None,
        slots_before_break: 2,
        slots_after_break: 2,
    };
    let rival = create_timetable_structure(&pool, &setup_req).await.unwrap();

    let publish_req = PublishRequest {
        name: "SEM-III Timetable".to_string(),
        department_id: department.id.clone(),
        branch_id: branch.id.clone(),
    };

    let first = publish_timetable(&pool, &campus.timetable.id, &publish_req).await.unwrap();
    assert!(first.is_published);
    assert_eq!(first.status, "Published");
    assert_eq!(first.name, "SEM-III Timetable");

    let active =
        find_active_timetable(&pool, &campus.institution.id, Some(&department.id), Some(&branch.id))
            .await
            .unwrap()
            .expect("scope should have an active timetable");
    assert_eq!(active.id, campus.timetable.id);

    // Publishing the rival demotes the first one.
    publish_timetable(
        &pool,
        &rival.id,
        &PublishRequest { name: "SEM-IV Timetable".to_string(), ..publish_req.clone() },
    )
    .await
    .unwrap();

    let active =
        find_active_timetable(&pool, &campus.institution.id, Some(&department.id), Some(&branch.id))
            .await
            .unwrap()
            .unwrap();
    assert_eq!(active.id, rival.id);

    let demoted = timetables::find_timetable_by_id(&pool, &campus.timetable.id)
        .await
        .unwrap()
        .unwrap();
    assert!(!demoted.is_published);
    assert_eq!(demoted.status, "Draft");

    // Unpublishing drops the pointer entirely.
    unpublish_timetable(&pool, &rival.id).await.unwrap();
    let active =
        find_active_timetable(&pool, &campus.institution.id, Some(&department.id), Some(&branch.id))
            .await
            .unwrap();
    assert!(active.is_none());
}

#[tokio::test]
async fn clearing_reports_how_many_entries_were_dropped() {
    let pool = setup_test_db().await;
    let campus = seed_campus(&pool, CampusConfig::default()).await;

    let mut rng = <rand::rngs::SmallRng as rand::SeedableRng>::seed_from_u64(11);
    let report =
        campus_backend::services::generator::auto_generate_with_rng(&pool, &campus.timetable.id, &mut rng)
            .await
            .unwrap();
    assert!(report.entries_created > 0);

    let cleared = timetables::clear_entries(&pool, &campus.timetable.id).await.unwrap();
    assert_eq!(cleared as usize, report.entries_created);
    assert_eq!(timetables::count_entries(&pool, &campus.timetable.id).await.unwrap(), 0);
}

#[tokio::test]
async fn theme_cycles_through_the_palette_list() {
    let pool = setup_test_db().await;
    let campus = seed_campus(&pool, CampusConfig::default()).await;
    assert_eq!(campus.timetable.theme_palette, "classic");

    let mut seen = Vec::new();
    for _ in 0..timetables::THEME_PALETTES.len() {
        let tt = timetables::cycle_theme(&pool, &campus.timetable.id).await.unwrap().unwrap();
        seen.push(tt.theme_palette);
    }

    assert_eq!(seen.last().map(String::as_str), Some("classic"));
    assert_eq!(seen.len(), timetables::THEME_PALETTES.len());
}

#[tokio::test]
async fn header_edit_only_touches_provided_fields() {
    let pool = setup_test_db().await;
    let campus = seed_campus(&pool, CampusConfig::default()).await;

    let updated = timetables::update_timetable_headers(
        &pool,
        &campus.timetable.id,
        HeaderUpdateRequest {
            name: None,
            heading_1: Some("DEPARTMENT OF COMPUTER SCIENCE".to_string()),
            heading_2: None,
            footer_semester_text: Some("SEMESTER III".to_string()),
            footer_prepared_by: None,
            footer_hod: None,
        },
    )
    .await
    .unwrap()
    .unwrap();

    assert_eq!(updated.heading_1, "DEPARTMENT OF COMPUTER SCIENCE");
    assert_eq!(updated.footer_semester_text, "SEMESTER III");
    assert_eq!(updated.name, campus.timetable.name);
}

#[tokio::test]
async fn deleting_a_timetable_cascades_to_its_children() {
    let pool = setup_test_db().await;
    let campus = seed_campus(&pool, CampusConfig::default()).await;

    let mut rng = <rand::rngs::SmallRng as rand::SeedableRng>::seed_from_u64(2);
    campus_backend::services::generator::auto_generate_with_rng(&pool, &campus.timetable.id, &mut rng)
        .await
        .unwrap();

    assert!(timetables::delete_timetable(&pool, &campus.timetable.id).await.unwrap());

    assert!(timetables::fetch_divisions(&pool, &campus.timetable.id).await.unwrap().is_empty());
    assert!(timetables::fetch_timeslots(&pool, &campus.timetable.id).await.unwrap().is_empty());
    assert_eq!(timetables::count_entries(&pool, &campus.timetable.id).await.unwrap(), 0);

    // Rooms belong to the institution, not the timetable.
    let rooms = timetables::fetch_rooms(&pool, &campus.institution.id).await.unwrap();
    assert_eq!(rooms.len(), campus.rooms.len());
}
