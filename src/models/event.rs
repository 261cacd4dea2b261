use chrono::{DateTime, NaiveDateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::timestamp;

/// A scheduled mall event (sale day, swap meet, workshop...)
#[derive(Queryable, Selectable, Insertable, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[diesel(table_name = crate::schema::events)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[serde(rename_all = "camelCase")]
pub struct Event {
    id: String,
    title: String,
    description: Option<String>,

    #[serde(with = "timestamp")]
    start_date: NaiveDateTime,

    #[serde(with = "timestamp::option", default)]
    end_date: Option<NaiveDateTime>,

    location: Option<String>,

    /// Staff member or admin who scheduled the event
    organizer_id: String,

    #[serde(with = "timestamp")]
    created_at: NaiveDateTime,
}

impl Event {
    pub fn new(
        organizer_id: String,
        title: String,
        description: Option<String>,
        start_date: DateTime<Utc>,
        end_date: Option<DateTime<Utc>>,
        location: Option<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            title,
            description,
            start_date: start_date.naive_utc(),
            end_date: end_date.map(|d| d.naive_utc()),
            location,
            organizer_id,
            created_at: Utc::now().naive_utc(),
        }
    }

    pub fn get_id(&self) -> String {
        self.id.clone()
    }

    pub fn get_title(&self) -> String {
        self.title.clone()
    }

    pub fn get_description(&self) -> Option<String> {
        self.description.clone()
    }

    pub fn get_start_date(&self) -> DateTime<Utc> {
        DateTime::from_naive_utc_and_offset(self.start_date, Utc)
    }

    pub fn get_end_date(&self) -> Option<DateTime<Utc>> {
        self.end_date.map(|d| DateTime::from_naive_utc_and_offset(d, Utc))
    }

    pub fn get_location(&self) -> Option<String> {
        self.location.clone()
    }

    pub fn get_organizer_id(&self) -> String {
        self.organizer_id.clone()
    }
}
