use chrono::Utc;
use sqlx::{Sqlite, SqlitePool};
use uuid::Uuid;

use crate::models::{
    DayCode, Division, EntryDetail, HeaderUpdateRequest, Room, TimeSlot, Timetable,
    TimetableEntry,
};

pub const THEME_PALETTES: [&str; 5] = [
    "classic",
    "modern_blue",
    "nature_green",
    "sunset_orange",
    "minimal_dark",
];

pub async fn find_timetable_by_id(
    db: &SqlitePool,
    id: &str,
) -> Result<Option<Timetable>, sqlx::Error> {
    sqlx::query_as::<_, Timetable>("SELECT * FROM timetables WHERE id = ?")
        .bind(id)
        .fetch_optional(db)
        .await
}

/// Timetable history for one institution, newest first.
pub async fn fetch_timetables(
    db: &SqlitePool,
    institution_id: &str,
) -> Result<Vec<Timetable>, sqlx::Error> {
    sqlx::query_as::<_, Timetable>(
        "SELECT * FROM timetables WHERE institution_id = ? ORDER BY created_at DESC",
    )
    .bind(institution_id)
    .fetch_all(db)
    .await
}

pub async fn insert_timetable<'e, E>(db: E, tt: &Timetable) -> Result<(), sqlx::Error>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    sqlx::query(
        "INSERT INTO timetables \
            (id, institution_id, department_id, branch_id, course_id, name, status, days_count, \
             is_published, heading_1, heading_2, footer_semester_text, footer_prepared_by, \
             footer_hod, theme_palette, created_at) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&tt.id)
    .bind(&tt.institution_id)
    .bind(&tt.department_id)
    .bind(&tt.branch_id)
    .bind(&tt.course_id)
    .bind(&tt.name)
    .bind(&tt.status)
    .bind(tt.days_count)
    .bind(tt.is_published)
    .bind(&tt.heading_1)
    .bind(&tt.heading_2)
    .bind(&tt.footer_semester_text)
    .bind(&tt.footer_prepared_by)
    .bind(&tt.footer_hod)
    .bind(&tt.theme_palette)
    .bind(&tt.created_at)
    .execute(db)
    .await?;
    Ok(())
}

/// Cascades to divisions, timeslots and entries.
pub async fn delete_timetable(db: &SqlitePool, id: &str) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM timetables WHERE id = ?")
        .bind(id)
        .execute(db)
        .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn update_timetable_headers(
    db: &SqlitePool,
    id: &str,
    req: HeaderUpdateRequest,
) -> Result<Option<Timetable>, sqlx::Error> {
    let mut current = match find_timetable_by_id(db, id).await? {
        Some(t) => t,
        None => return Ok(None),
    };

    if let Some(name) = req.name {
        current.name = name;
    }
    if let Some(h1) = req.heading_1 {
        current.heading_1 = h1;
    }
    if let Some(h2) = req.heading_2 {
        current.heading_2 = h2;
    }
    if let Some(sem) = req.footer_semester_text {
        current.footer_semester_text = sem;
    }
    if let Some(prep) = req.footer_prepared_by {
        current.footer_prepared_by = prep;
    }
    if let Some(hod) = req.footer_hod {
        current.footer_hod = hod;
    }

    sqlx::query(
        "UPDATE timetables \
         SET name = ?, heading_1 = ?, heading_2 = ?, footer_semester_text = ?, \
             footer_prepared_by = ?, footer_hod = ? \
         WHERE id = ?",
    )
    .bind(&current.name)
    .bind(&current.heading_1)
    .bind(&current.heading_2)
    .bind(&current.footer_semester_text)
    .bind(&current.footer_prepared_by)
    .bind(&current.footer_hod)
    .bind(id)
    .execute(db)
    .await?;

    Ok(Some(current))
}

/// Advance the timetable to the next palette in the cycle.
pub async fn cycle_theme(db: &SqlitePool, id: &str) -> Result<Option<Timetable>, sqlx::Error> {
    let mut current = match find_timetable_by_id(db, id).await? {
        Some(t) => t,
        None => return Ok(None),
    };

    let next = match THEME_PALETTES.iter().position(|p| *p == current.theme_palette) {
        Some(i) => THEME_PALETTES[(i + 1) % THEME_PALETTES.len()],
        None => THEME_PALETTES[0],
    };
    current.theme_palette = next.to_string();

    sqlx::query("UPDATE timetables SET theme_palette = ? WHERE id = ?")
        .bind(next)
        .bind(id)
        .execute(db)
        .await?;

    Ok(Some(current))
}

pub async fn insert_division<'e, E>(db: E, division: &Division) -> Result<(), sqlx::Error>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    sqlx::query("INSERT INTO divisions (id, timetable_id, name) VALUES (?, ?, ?)")
        .bind(&division.id)
        .bind(&division.timetable_id)
        .bind(&division.name)
        .execute(db)
        .await?;
    Ok(())
}

pub async fn fetch_divisions(
    db: &SqlitePool,
    timetable_id: &str,
) -> Result<Vec<Division>, sqlx::Error> {
    sqlx::query_as::<_, Division>(
        "SELECT id, timetable_id, name FROM divisions WHERE timetable_id = ? ORDER BY name",
    )
    .bind(timetable_id)
    .fetch_all(db)
    .await
}

pub async fn find_division_by_id(
    db: &SqlitePool,
    id: &str,
) -> Result<Option<Division>, sqlx::Error> {
    sqlx::query_as::<_, Division>("SELECT id, timetable_id, name FROM divisions WHERE id = ?")
        .bind(id)
        .fetch_optional(db)
        .await
}

pub async fn insert_timeslot<'e, E>(db: E, slot: &TimeSlot) -> Result<(), sqlx::Error>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    sqlx::query(
        "INSERT INTO timeslots (id, timetable_id, lecture_number, start_time, end_time, is_break) \
         VALUES (?, ?, ?, ?, ?, ?)",
    )
    .bind(&slot.id)
    .bind(&slot.timetable_id)
    .bind(slot.lecture_number)
    .bind(&slot.start_time)
    .bind(&slot.end_time)
    .bind(slot.is_break)
    .execute(db)
    .await?;
    Ok(())
}

pub async fn fetch_timeslots(
    db: &SqlitePool,
    timetable_id: &str,
) -> Result<Vec<TimeSlot>, sqlx::Error> {
    sqlx::query_as::<_, TimeSlot>(
        "SELECT id, timetable_id, lecture_number, start_time, end_time, is_break \
         FROM timeslots WHERE timetable_id = ? ORDER BY lecture_number",
    )
    .bind(timetable_id)
    .fetch_all(db)
    .await
}

/// Break slots never hold entries; the generator only iterates these.
pub async fn fetch_teaching_timeslots(
    db: &SqlitePool,
    timetable_id: &str,
) -> Result<Vec<TimeSlot>, sqlx::Error> {
    sqlx::query_as::<_, TimeSlot>(
        "SELECT id, timetable_id, lecture_number, start_time, end_time, is_break \
         FROM timeslots WHERE timetable_id = ? AND is_break = 0 ORDER BY lecture_number",
    )
    .bind(timetable_id)
    .fetch_all(db)
    .await
}

pub async fn find_timeslot_by_id(
    db: &SqlitePool,
    id: &str,
) -> Result<Option<TimeSlot>, sqlx::Error> {
    sqlx::query_as::<_, TimeSlot>(
        "SELECT id, timetable_id, lecture_number, start_time, end_time, is_break \
         FROM timeslots WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(db)
    .await
}

pub async fn fetch_rooms(db: &SqlitePool, institution_id: &str) -> Result<Vec<Room>, sqlx::Error> {
    sqlx::query_as::<_, Room>(
        "SELECT id, institution_id, number FROM rooms WHERE institution_id = ? ORDER BY number",
    )
    .bind(institution_id)
    .fetch_all(db)
    .await
}

pub async fn find_room_by_id(db: &SqlitePool, id: &str) -> Result<Option<Room>, sqlx::Error> {
    sqlx::query_as::<_, Room>("SELECT id, institution_id, number FROM rooms WHERE id = ?")
        .bind(id)
        .fetch_optional(db)
        .await
}

pub async fn insert_room(
    db: &SqlitePool,
    institution_id: &str,
    number: &str,
) -> Result<Room, sqlx::Error> {
    let id = Uuid::new_v4().to_string();
    sqlx::query("INSERT INTO rooms (id, institution_id, number) VALUES (?, ?, ?)")
        .bind(&id)
        .bind(institution_id)
        .bind(number)
        .execute(db)
        .await?;
    Ok(Room {
        id,
        institution_id: institution_id.to_string(),
        number: number.to_string(),
    })
}

/// True when another room in the institution already carries this number.
pub async fn room_number_taken(
    db: &SqlitePool,
    institution_id: &str,
    number: &str,
    exclude_room_id: &str,
) -> Result<bool, sqlx::Error> {
    let (count,): (i64,) = sqlx::query_as(
        "SELECT COUNT(*) FROM rooms WHERE institution_id = ? AND number = ? AND id <> ?",
    )
    .bind(institution_id)
    .bind(number)
    .bind(exclude_room_id)
    .fetch_one(db)
    .await?;
    Ok(count > 0)
}

pub async fn update_room_number(
    db: &SqlitePool,
    id: &str,
    number: &str,
) -> Result<Option<Room>, sqlx::Error> {
    let result = sqlx::query("UPDATE rooms SET number = ? WHERE id = ?")
        .bind(number)
        .bind(id)
        .execute(db)
        .await?;
    if result.rows_affected() == 0 {
        return Ok(None);
    }
    find_room_by_id(db, id).await
}

pub async fn delete_room(db: &SqlitePool, id: &str) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM rooms WHERE id = ?")
        .bind(id)
        .execute(db)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// The entry occupying one (day, timeslot, division) cell, if any.
pub async fn find_cell_entry(
    db: &SqlitePool,
    timetable_id: &str,
    day: DayCode,
    timeslot_id: &str,
    division_id: &str,
) -> Result<Option<TimetableEntry>, sqlx::Error> {
    sqlx::query_as::<_, TimetableEntry>(
        "SELECT id, timetable_id, day, timeslot_id, division_id, subject_id, faculty_id, room_id \
         FROM timetable_entries \
         WHERE timetable_id = ? AND day = ? AND timeslot_id = ? AND division_id = ?",
    )
    .bind(timetable_id)
    .bind(day)
    .bind(timeslot_id)
    .bind(division_id)
    .fetch_optional(db)
    .await
}

pub async fn find_room_holder(
    db: &SqlitePool,
    timetable_id: &str,
    day: DayCode,
    timeslot_id: &str,
    room_id: &str,
    exclude_entry_id: Option<&str>,
) -> Result<Option<TimetableEntry>, sqlx::Error> {
    sqlx::query_as::<_, TimetableEntry>(
        "SELECT id, timetable_id, day, timeslot_id, division_id, subject_id, faculty_id, room_id \
         FROM timetable_entries \
         WHERE timetable_id = ? AND day = ? AND timeslot_id = ? AND room_id = ? \
           AND (? IS NULL OR id <> ?)",
    )
    .bind(timetable_id)
    .bind(day)
    .bind(timeslot_id)
    .bind(room_id)
    .bind(exclude_entry_id)
    .bind(exclude_entry_id)
    .fetch_optional(db)
    .await
}

pub async fn find_faculty_holder(
    db: &SqlitePool,
    timetable_id: &str,
    day: DayCode,
    timeslot_id: &str,
    faculty_id: &str,
    exclude_entry_id: Option<&str>,
) -> Result<Option<TimetableEntry>, sqlx::Error> {
    sqlx::query_as::<_, TimetableEntry>(
        "SELECT id, timetable_id, day, timeslot_id, division_id, subject_id, faculty_id, room_id \
         FROM timetable_entries \
         WHERE timetable_id = ? AND day = ? AND timeslot_id = ? AND faculty_id = ? \
           AND (? IS NULL OR id <> ?)",
    )
    .bind(timetable_id)
    .bind(day)
    .bind(timeslot_id)
    .bind(faculty_id)
    .bind(exclude_entry_id)
    .bind(exclude_entry_id)
    .fetch_optional(db)
    .await
}

pub async fn insert_entry<'e, E>(db: E, entry: &TimetableEntry) -> Result<(), sqlx::Error>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    sqlx::query(
        "INSERT INTO timetable_entries \
            (id, timetable_id, day, timeslot_id, division_id, subject_id, faculty_id, room_id) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&entry.id)
    .bind(&entry.timetable_id)
    .bind(entry.day)
    .bind(&entry.timeslot_id)
    .bind(&entry.division_id)
    .bind(&entry.subject_id)
    .bind(&entry.faculty_id)
    .bind(&entry.room_id)
    .execute(db)
    .await?;
    Ok(())
}

pub async fn update_entry_payload(
    db: &SqlitePool,
    entry_id: &str,
    subject_id: Option<&str>,
    faculty_id: Option<&str>,
    room_id: Option<&str>,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "UPDATE timetable_entries SET subject_id = ?, faculty_id = ?, room_id = ? WHERE id = ?",
    )
    .bind(subject_id)
    .bind(faculty_id)
    .bind(room_id)
    .bind(entry_id)
    .execute(db)
    .await?;
    Ok(())
}

pub async fn clear_entries<'e, E>(db: E, timetable_id: &str) -> Result<u64, sqlx::Error>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    let result = sqlx::query("DELETE FROM timetable_entries WHERE timetable_id = ?")
        .bind(timetable_id)
        .execute(db)
        .await?;
    Ok(result.rows_affected())
}

pub async fn count_entries(db: &SqlitePool, timetable_id: &str) -> Result<i64, sqlx::Error> {
    let (count,): (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM timetable_entries WHERE timetable_id = ?")
            .bind(timetable_id)
            .fetch_one(db)
            .await?;
    Ok(count)
}

/// All entries for a timetable with the display fields joined in, for the
/// grid/export consumers.
pub async fn fetch_entry_details(
    db: &SqlitePool,
    timetable_id: &str,
) -> Result<Vec<EntryDetail>, sqlx::Error> {
    let mut details = sqlx::query_as::<_, EntryDetail>(
        "SELECT e.id, e.day, e.timeslot_id, e.division_id, e.subject_id, e.faculty_id, e.room_id, \
                c.code AS subject_code, t.full_name AS faculty_name, r.number AS room_number \
         FROM timetable_entries e \
         LEFT JOIN courses c ON c.id = e.subject_id \
         LEFT JOIN teachers t ON t.id = e.faculty_id \
         LEFT JOIN rooms r ON r.id = e.room_id \
         WHERE e.timetable_id = ?",
    )
    .bind(timetable_id)
    .fetch_all(db)
    .await?;

    // Grid cells render the compact form of the teacher's name.
    for detail in &mut details {
        detail.faculty_initials = detail.faculty_name.as_deref().map(crate::models::initials);
    }
    Ok(details)
}

/// Scope keys use '' for "no department/branch" so the primary key stays
/// total; see the active_timetables migration.
pub async fn upsert_active_pointer<'e, E>(
    db: E,
    institution_id: &str,
    department_id: Option<&str>,
    branch_id: Option<&str>,
    timetable_id: &str,
) -> Result<(), sqlx::Error>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    sqlx::query(
        "INSERT OR REPLACE INTO active_timetables \
            (institution_id, department_id, branch_id, timetable_id) \
         VALUES (?, ?, ?, ?)",
    )
    .bind(institution_id)
    .bind(department_id.unwrap_or(""))
    .bind(branch_id.unwrap_or(""))
    .bind(timetable_id)
    .execute(db)
    .await?;
    Ok(())
}

pub async fn find_active_pointer<'e, E>(
    db: E,
    institution_id: &str,
    department_id: Option<&str>,
    branch_id: Option<&str>,
) -> Result<Option<String>, sqlx::Error>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    let row: Option<(String,)> = sqlx::query_as(
        "SELECT timetable_id FROM active_timetables \
         WHERE institution_id = ? AND department_id = ? AND branch_id = ?",
    )
    .bind(institution_id)
    .bind(department_id.unwrap_or(""))
    .bind(branch_id.unwrap_or(""))
    .fetch_optional(db)
    .await?;
    Ok(row.map(|(id,)| id))
}

pub async fn clear_active_pointer<'e, E>(db: E, timetable_id: &str) -> Result<(), sqlx::Error>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    sqlx::query("DELETE FROM active_timetables WHERE timetable_id = ?")
        .bind(timetable_id)
        .execute(db)
        .await?;
    Ok(())
}
