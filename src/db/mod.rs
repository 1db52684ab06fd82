pub mod academics;
pub mod attendance;
pub mod institutions;
pub mod marksheets;
pub mod people;
pub mod timetables;

use std::str::FromStr;

use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};

/// Open the pool with foreign keys enabled; cascade deletes and the
/// SET NULL reference rules depend on the pragma.
pub async fn connect(database_url: &str) -> Result<SqlitePool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .foreign_keys(true);

    SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await
}
