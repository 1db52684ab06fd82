use chrono::Utc;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::models::{
    Branch, CalendarEvent, Department, Institution, NewBranchRequest, NewCalendarEventRequest,
    NewDepartmentRequest, NewInstitutionRequest, NewNewsRequest, News,
    UpdateCalendarEventRequest,
};

pub async fn fetch_institutions(db: &SqlitePool) -> Result<Vec<Institution>, sqlx::Error> {
    sqlx::query_as::<_, Institution>(
        "SELECT id, name, email, phone, address, established_year, created_at \
         FROM institutions ORDER BY name",
    )
    .fetch_all(db)
    .await
}

pub async fn find_institution_by_id(
    db: &SqlitePool,
    id: &str,
) -> Result<Option<Institution>, sqlx::Error> {
    sqlx::query_as::<_, Institution>(
        "SELECT id, name, email, phone, address, established_year, created_at \
         FROM institutions WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(db)
    .await
}

pub async fn insert_institution(
    db: &SqlitePool,
    req: NewInstitutionRequest,
) -> Result<Institution, sqlx::Error> {
    let id = Uuid::new_v4().to_string();
    let now = Utc::now().to_rfc3339();

    sqlx::query(
        "INSERT INTO institutions (id, name, email, phone, address, established_year, created_at) \
         VALUES (?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&id)
    .bind(&req.name)
    .bind(&req.email)
    .bind(&req.phone)
    .bind(&req.address)
    .bind(req.established_year)
    .bind(&now)
    .execute(db)
    .await?;

    Ok(Institution {
        id,
        name: req.name,
        email: req.email,
        phone: req.phone,
        address: req.address,
        established_year: req.established_year,
        created_at: now,
    })
}

pub async fn delete_institution(db: &SqlitePool, id: &str) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM institutions WHERE id = ?")
        .bind(id)
        .execute(db)
        .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn fetch_departments(
    db: &SqlitePool,
    institution_id: &str,
) -> Result<Vec<Department>, sqlx::Error> {
    sqlx::query_as::<_, Department>(
        "SELECT id, institution_id, name, description, created_at \
         FROM departments WHERE institution_id = ? ORDER BY name",
    )
    .bind(institution_id)
    .fetch_all(db)
    .await
}

pub async fn find_department_by_id(
    db: &SqlitePool,
    id: &str,
) -> Result<Option<Department>, sqlx::Error> {
    sqlx::query_as::<_, Department>(
        "SELECT id, institution_id, name, description, created_at FROM departments WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(db)
    .await
}

pub async fn insert_department(
    db: &SqlitePool,
    institution_id: &str,
    req: NewDepartmentRequest,
) -> Result<Department, sqlx::Error> {
    let id = Uuid::new_v4().to_string();
    let now = Utc::now().to_rfc3339();

    sqlx::query(
        "INSERT INTO departments (id, institution_id, name, description, created_at) \
         VALUES (?, ?, ?, ?, ?)",
    )
    .bind(&id)
    .bind(institution_id)
    .bind(&req.name)
    .bind(&req.description)
    .bind(&now)
    .execute(db)
    .await?;

    Ok(Department {
        id,
        institution_id: institution_id.to_string(),
        name: req.name,
        description: req.description,
        created_at: now,
    })
}

pub async fn fetch_branches(
    db: &SqlitePool,
    institution_id: &str,
    department_id: Option<&str>,
) -> Result<Vec<Branch>, sqlx::Error> {
    sqlx::query_as::<_, Branch>(
        "SELECT id, institution_id, department_id, name, description, created_at \
         FROM branches \
         WHERE institution_id = ? AND (? IS NULL OR department_id = ?) \
         ORDER BY name",
    )
    .bind(institution_id)
    .bind(department_id)
    .bind(department_id)
    .fetch_all(db)
    .await
}

pub async fn insert_branch(
    db: &SqlitePool,
    institution_id: &str,
    req: NewBranchRequest,
) -> Result<Branch, sqlx::Error> {
    let id = Uuid::new_v4().to_string();
    let now = Utc::now().to_rfc3339();

    sqlx::query(
        "INSERT INTO branches (id, institution_id, department_id, name, description, created_at) \
         VALUES (?, ?, ?, ?, ?, ?)",
    )
    .bind(&id)
    .bind(institution_id)
    .bind(&req.department_id)
    .bind(&req.name)
    .bind(&req.description)
    .bind(&now)
    .execute(db)
    .await?;

    Ok(Branch {
        id,
        institution_id: institution_id.to_string(),
        department_id: req.department_id,
        name: req.name,
        description: req.description,
        created_at: now,
    })
}

pub async fn fetch_news(db: &SqlitePool, institution_id: &str) -> Result<Vec<News>, sqlx::Error> {
    sqlx::query_as::<_, News>(
        "SELECT id, institution_id, content, created_at \
         FROM news WHERE institution_id = ? ORDER BY created_at DESC",
    )
    .bind(institution_id)
    .fetch_all(db)
    .await
}

pub async fn insert_news(
    db: &SqlitePool,
    institution_id: &str,
    req: NewNewsRequest,
) -> Result<News, sqlx::Error> {
    let id = Uuid::new_v4().to_string();
    let now = Utc::now().to_rfc3339();

    sqlx::query("INSERT INTO news (id, institution_id, content, created_at) VALUES (?, ?, ?, ?)")
        .bind(&id)
        .bind(institution_id)
        .bind(&req.content)
        .bind(&now)
        .execute(db)
        .await?;

    Ok(News {
        id,
        institution_id: institution_id.to_string(),
        content: req.content,
        created_at: now,
    })
}

pub async fn delete_news(db: &SqlitePool, id: &str) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM news WHERE id = ?")
        .bind(id)
        .execute(db)
        .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn fetch_calendar_events(
    db: &SqlitePool,
    institution_id: &str,
    published_only: bool,
) -> Result<Vec<CalendarEvent>, sqlx::Error> {
    sqlx::query_as::<_, CalendarEvent>(
        "SELECT id, institution_id, title, description, event_type, start_date, end_date, \
                is_published, created_at \
         FROM calendar_events \
         WHERE institution_id = ? AND (? = 0 OR is_published = 1) \
         ORDER BY start_date",
    )
    .bind(institution_id)
    .bind(published_only)
    .fetch_all(db)
    .await
}

pub async fn insert_calendar_event(
    db: &SqlitePool,
    institution_id: &str,
    req: NewCalendarEventRequest,
) -> Result<CalendarEvent, sqlx::Error> {
    let id = Uuid::new_v4().to_string();
    let now = Utc::now().to_rfc3339();
    let event_type = req.event_type.unwrap_or_else(|| "event".to_string());
    let is_published = req.is_published.unwrap_or(false);

    sqlx::query(
        "INSERT INTO calendar_events \
            (id, institution_id, title, description, event_type, start_date, end_date, \
             is_published, created_at) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&id)
    .bind(institution_id)
    .bind(&req.title)
    .bind(&req.description)
    .bind(&event_type)
    .bind(&req.start_date)
    .bind(&req.end_date)
    .bind(is_published)
    .bind(&now)
    .execute(db)
    .await?;

    Ok(CalendarEvent {
        id,
        institution_id: institution_id.to_string(),
        title: req.title,
        description: req.description,
        event_type,
        start_date: req.start_date,
        end_date: req.end_date,
        is_published,
        created_at: now,
    })
}

pub async fn find_calendar_event_by_id(
    db: &SqlitePool,
    id: &str,
) -> Result<Option<CalendarEvent>, sqlx::Error> {
    sqlx::query_as::<_, CalendarEvent>(
        "SELECT id, institution_id, title, description, event_type, start_date, end_date, \
                is_published, created_at \
         FROM calendar_events WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(db)
    .await
}

pub async fn update_calendar_event(
    db: &SqlitePool,
    id: &str,
    req: UpdateCalendarEventRequest,
) -> Result<Option<CalendarEvent>, sqlx::Error> {
    let mut current = match find_calendar_event_by_id(db, id).await? {
        Some(e) => e,
        None => return Ok(None),
    };

    if let Some(title) = req.title {
        current.title = title;
    }
    if let Some(description) = req.description {
        current.description = Some(description);
    }
    if let Some(event_type) = req.event_type {
        current.event_type = event_type;
    }
    if let Some(start_date) = req.start_date {
        current.start_date = start_date;
    }
    if let Some(end_date) = req.end_date {
        current.end_date = Some(end_date);
    }
    if let Some(is_published) = req.is_published {
        current.is_published = is_published;
    }

    sqlx::query(
        "UPDATE calendar_events \
         SET title = ?, description = ?, event_type = ?, start_date = ?, end_date = ?, \
             is_published = ? \
         WHERE id = ?",
    )
    .bind(&current.title)
    .bind(&current.description)
    .bind(&current.event_type)
    .bind(&current.start_date)
    .bind(&current.end_date)
    .bind(current.is_published)
    .bind(id)
    .execute(db)
    .await?;

    Ok(Some(current))
}

pub async fn toggle_calendar_publish(
    db: &SqlitePool,
    id: &str,
) -> Result<Option<CalendarEvent>, sqlx::Error> {
    let mut current = match find_calendar_event_by_id(db, id).await? {
        Some(e) => e,
        None => return Ok(None),
    };
    current.is_published = !current.is_published;

    sqlx::query("UPDATE calendar_events SET is_published = ? WHERE id = ?")
        .bind(current.is_published)
        .bind(id)
        .execute(db)
        .await?;

    Ok(Some(current))
}

pub async fn delete_calendar_event(db: &SqlitePool, id: &str) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM calendar_events WHERE id = ?")
        .bind(id)
        .execute(db)
        .await?;
    Ok(result.rows_affected() > 0)
}
