use crate::db::{execute_with_retry, DbPool};
use crate::models::Event;
use crate::schema::events;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use anyhow::Result;
use tracing::{info, instrument};

/// Schedules an event
///
/// ### Arguments
///
/// * `pool` - A reference to the database connection pool
/// * `organizer_id` - The staff member or admin creating the event
/// * `title` - Name of the event
/// * `description` - Optional longer text
/// * `start_date` - When the event begins
/// * `end_date` - When it ends, if known; callers check it is not before `start_date`
/// * `location` - Optional place
#[instrument(skip(pool, description))]
pub async fn create_event(
    pool: &DbPool,
    organizer_id: &str,
    title: String,
    description: Option<String>,
    start_date: DateTime<Utc>,
    end_date: Option<DateTime<Utc>>,
    location: Option<String>,
) -> Result<Event> {
    let mut conn = pool.get()?;
    let event = Event::new(organizer_id.to_string(), title, description, start_date, end_date, location);

    execute_with_retry(&mut conn, |conn| {
        diesel::insert_into(events::table).values(&event).execute(conn)
    })
    .await?;

    info!("Scheduled event {}", event.get_id());
    Ok(event)
}

/// Events starting at or after `now`, soonest first
pub fn list_upcoming_events(pool: &DbPool, now: DateTime<Utc>, limit: i64) -> Result<Vec<Event>> {
    let conn = &mut pool.get()?;
    let result = events::table
        .filter(events::start_date.ge(now.naive_utc()))
        .order(events::start_date.asc())
        .limit(limit)
        .select(Event::as_select())
        .load(conn)?;
    Ok(result)
}
