use sqlx::SqlitePool;
use tracing::info;

use crate::db::timetables;
use crate::models::{PublishRequest, Timetable};

use super::SchedulingError;

/// Publish a timetable for a (department, branch) scope, making it the one
/// active timetable that drives student and teacher dashboards.
///
/// The active pointer lives in its own table keyed by scope, replaced in the
/// same transaction that flips the publish flags, so there is never more
/// than one active timetable per scope and never a scattered bulk update of
/// booleans.
pub async fn publish_timetable(
    db: &SqlitePool,
    timetable_id: &str,
    req: &PublishRequest,
) -> Result<Timetable, SchedulingError> {
    let timetable = timetables::find_timetable_by_id(db, timetable_id)
        .await?
        .ok_or(SchedulingError::TimetableNotFound)?;

    let mut tx = db.begin().await?;

    // Demote whichever timetable currently owns this scope; read the
    // pointer inside the transaction so the demote decision cannot go stale.
    let previous = timetables::find_active_pointer(
        &mut *tx,
        &timetable.institution_id,
        Some(&req.department_id),
        Some(&req.branch_id),
    )
    .await?;
    if let Some(prev_id) = previous {
        if prev_id != timetable.id {
            sqlx::query("UPDATE timetables SET is_published = 0, status = 'Draft' WHERE id = ?")
                .bind(&prev_id)
                .execute(&mut *tx)
                .await?;
        }
    }

    sqlx::query(
        "UPDATE timetables \
         SET name = ?, department_id = ?, branch_id = ?, status = 'Published', is_published = 1 \
         WHERE id = ?",
    )
    .bind(&req.name)
    .bind(&req.department_id)
    .bind(&req.branch_id)
    .bind(&timetable.id)
    .execute(&mut *tx)
    .await?;

    timetables::upsert_active_pointer(
        &mut *tx,
        &timetable.institution_id,
        Some(&req.department_id),
        Some(&req.branch_id),
        &timetable.id,
    )
    .await?;

    tx.commit().await?;

    info!("published timetable {} as '{}'", timetable.id, req.name);

    timetables::find_timetable_by_id(db, &timetable.id)
        .await?
        .ok_or(SchedulingError::TimetableNotFound)
}

/// Remove the timetable from student access and drop its active pointer.
pub async fn unpublish_timetable(
    db: &SqlitePool,
    timetable_id: &str,
) -> Result<Timetable, SchedulingError> {
    let timetable = timetables::find_timetable_by_id(db, timetable_id)
        .await?
        .ok_or(SchedulingError::TimetableNotFound)?;

    let mut tx = db.begin().await?;

    sqlx::query("UPDATE timetables SET is_published = 0, status = 'Draft' WHERE id = ?")
        .bind(&timetable.id)
        .execute(&mut *tx)
        .await?;
    timetables::clear_active_pointer(&mut *tx, &timetable.id).await?;

    tx.commit().await?;

    info!("unpublished timetable {}", timetable.id);

    timetables::find_timetable_by_id(db, &timetable.id)
        .await?
        .ok_or(SchedulingError::TimetableNotFound)
}

/// The active timetable for a scope, if one has been published.
pub async fn find_active_timetable(
    db: &SqlitePool,
    institution_id: &str,
    department_id: Option<&str>,
    branch_id: Option<&str>,
) -> Result<Option<Timetable>, SchedulingError> {
    let pointer =
        timetables::find_active_pointer(db, institution_id, department_id, branch_id).await?;
    match pointer {
        Some(id) => Ok(timetables::find_timetable_by_id(db, &id).await?),
        None => Ok(None),
    }
}
