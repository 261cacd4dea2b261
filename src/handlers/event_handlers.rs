use axum::extract::State;
use chrono::Utc;
use std::sync::Arc;
use tracing::{info, instrument};

use crate::auth::AuthUser;
use crate::db::DbPool;
use crate::dto::{parse_event_date, CreateEventDto, EventView};
use crate::errors::ApiError;
use crate::repo;

use super::views::event_views;
use super::{optional_text, required_text, Json, LIST_LIMIT};

/// Handler for upcoming events, soonest first
#[instrument(skip(pool))]
pub async fn list_events_handler(State(pool): State<Arc<DbPool>>) -> Result<Json<Vec<EventView>>, ApiError> {
    let events = repo::list_upcoming_events(&pool, Utc::now(), LIST_LIMIT).map_err(ApiError::Database)?;
    Ok(Json(event_views(&pool, events)?))
}

/// Handler for scheduling an event
///
/// This function handles POST requests to `/api/events` and is limited to
/// staff and admins.
///
/// ### Returns
///
/// The event with its organizer. 400 when the title or start date is
/// missing, a date cannot be parsed, or the end comes before the start.
#[instrument(skip(pool, user, payload), fields(user_id = %user.id()))]
pub async fn create_event_handler(
    State(pool): State<Arc<DbPool>>,
    user: AuthUser,
    Json(payload): Json<CreateEventDto>,
) -> Result<Json<EventView>, ApiError> {
    user.require_staff()?;

    let title = required_text(&payload.title, "Title and start date are required")?;
    let start_raw = optional_text(payload.start_date)
        .ok_or_else(|| ApiError::bad_request("Title and start date are required"))?;
    let start = parse_event_date(&start_raw).ok_or_else(|| ApiError::bad_request("Invalid start date"))?;
    let end = optional_text(payload.end_date)
        .map(|raw| parse_event_date(&raw).ok_or_else(|| ApiError::bad_request("Invalid end date")))
        .transpose()?;

    if end.is_some_and(|end| end < start) {
        return Err(ApiError::bad_request("End date cannot be before start date"));
    }

    let event = repo::create_event(
        &pool,
        &user.id(),
        title,
        optional_text(payload.description),
        start,
        end,
        optional_text(payload.location),
    )
    .await
    .map_err(ApiError::Database)?;

    info!("Scheduled event {}", event.get_id());
    let view = event_views(&pool, vec![event])?
        .pop()
        .ok_or_else(|| ApiError::Database(anyhow::anyhow!("event view missing")))?;
    Ok(Json(view))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Role;
    use crate::repo::tests::setup_test_db;
    use chrono::Duration;

    async fn make_user(pool: &DbPool, email: &str, role: Role) -> AuthUser {
        AuthUser(repo::create_user(pool, email, None, "hash".to_string(), role).await.unwrap())
    }

    fn dto(start: Option<String>, end: Option<String>) -> CreateEventDto {
        CreateEventDto {
            title: "Spring sale".into(),
            start_date: start,
            end_date: end,
            location: Some("Main hall".into()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_staff_creates_event() {
        let pool = setup_test_db();
        let staff = make_user(&pool, "s@yakcat.test", Role::Staff).await;
        let start = Utc::now() + Duration::days(3);

        let Json(view) = create_event_handler(
            State(pool.clone()),
            staff.clone(),
            Json(dto(Some(start.to_rfc3339()), Some((start + Duration::hours(4)).to_rfc3339()))),
        )
        .await
        .unwrap();

        assert_eq!(view.event.get_title(), "Spring sale");
        assert_eq!(view.organizer.unwrap().id, staff.id());

        let Json(listed) = list_events_handler(State(pool)).await.unwrap();
        assert_eq!(listed.len(), 1);
    }

    #[tokio::test]
    async fn test_vendor_cannot_create_event() {
        let pool = setup_test_db();
        let vendor = make_user(&pool, "v@yakcat.test", Role::Vendor).await;
        assert!(matches!(
            create_event_handler(State(pool), vendor, Json(dto(Some("2030-01-01".into()), None))).await,
            Err(ApiError::Forbidden)
        ));
    }

    #[tokio::test]
    async fn test_event_date_validation() {
        let pool = setup_test_db();
        let admin = make_user(&pool, "a@yakcat.test", Role::Admin).await;

        for bad in [
            dto(None, None),
            dto(Some("someday".into()), None),
            dto(Some("2030-01-02".into()), Some("2030-01-01".into())),
            dto(Some("2030-01-02".into()), Some("later".into())),
        ] {
            assert!(matches!(
                create_event_handler(State(pool.clone()), admin.clone(), Json(bad)).await,
                Err(ApiError::BadRequest(_))
            ));
        }
    }
}
