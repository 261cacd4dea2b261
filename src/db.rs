use std::time::Duration;

use diesel::connection::SimpleConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, CustomizeConnection, Pool};
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use diesel::sqlite::SqliteConnection;
use tracing::{debug, warn};

pub type DbPool = Pool<ConnectionManager<SqliteConnection>>;

/// How many times a write is attempted while SQLite reports the database as busy
const MAX_WRITE_ATTEMPTS: u32 = 5;

diesel::define_sql_function! {
    /// Unicode lower-casing; SQLite's own `lower` and `LIKE` only fold ASCII
    fn fold_case(text: diesel::sql_types::Nullable<diesel::sql_types::Text>) -> diesel::sql_types::Nullable<diesel::sql_types::Text>;
}

/// Applies the per-connection setup every pooled connection needs
///
/// Foreign keys are off by default in SQLite and the cascading deletes of
/// users and items depend on them. `fold_case` is registered here because
/// SQLite functions live on the connection.
#[derive(Debug, Clone, Copy)]
struct SqlitePragmas;

impl CustomizeConnection<SqliteConnection, diesel::r2d2::Error> for SqlitePragmas {
    fn on_acquire(&self, conn: &mut SqliteConnection) -> Result<(), diesel::r2d2::Error> {
        conn.batch_execute("PRAGMA foreign_keys = ON; PRAGMA busy_timeout = 5000;")
            .map_err(diesel::r2d2::Error::QueryError)?;
        fold_case_utils::register_impl(conn, |text: Option<String>| text.map(|t| t.to_lowercase()))
            .map_err(diesel::r2d2::Error::QueryError)
    }
}

/// Builds the connection pool for the given SQLite URL
///
/// Accepts plain file paths as well as `file:` URIs (the tests use
/// `file:name?mode=memory&cache=shared`).
pub fn init_pool(database_url: &str) -> anyhow::Result<DbPool> {
    let manager = ConnectionManager::<SqliteConnection>::new(database_url);
    let pool = Pool::builder()
        .connection_customizer(Box::new(SqlitePragmas))
        .build(manager)?;
    Ok(pool)
}

fn is_busy(err: &DieselError) -> bool {
    match err {
        DieselError::DatabaseError(DatabaseErrorKind::Unknown, info) => {
            let message = info.message();
            message.contains("database is locked") || message.contains("database table is locked")
        }
        _ => false,
    }
}

/// Runs a write against the connection, retrying with a short backoff while
/// SQLite reports lock contention
///
/// Any other error is returned immediately.
pub async fn execute_with_retry<T, F>(conn: &mut SqliteConnection, mut op: F) -> QueryResult<T>
where
    F: FnMut(&mut SqliteConnection) -> QueryResult<T>,
{
    let mut attempt = 1;
    loop {
        match op(conn) {
            Err(err) if is_busy(&err) && attempt < MAX_WRITE_ATTEMPTS => {
                warn!(attempt, "database busy, retrying write");
                tokio::time::sleep(Duration::from_millis(25 * u64::from(attempt))).await;
                attempt += 1;
            }
            result => {
                if attempt > 1 {
                    debug!(attempt, "write finished after retrying");
                }
                return result;
            }
        }
    }
}

/// Returns true when the error is a UNIQUE constraint violation
pub fn is_unique_violation(err: &anyhow::Error) -> bool {
    matches!(
        err.downcast_ref::<DieselError>(),
        Some(DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _))
    )
}
