use chrono::{DateTime, NaiveDateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::timestamp;

/// Represents a tag that listings can be filed under
#[derive(Queryable, Selectable, Insertable, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[diesel(table_name = crate::schema::tags)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[serde(rename_all = "camelCase")]
pub struct Tag {
    /// Unique identifier for the tag (UUID v4 as string)
    id: String,

    /// The name of the tag, trimmed and lower-cased
    name: String,

    /// When this tag was created
    #[serde(with = "timestamp")]
    created_at: NaiveDateTime,
}

impl Tag {
    /// Creates a new tag
    ///
    /// ### Arguments
    ///
    /// * `name` - The name of the tag; it is normalised with [`Tag::normalize_name`]
    ///
    /// ### Returns
    ///
    /// A new `Tag` instance with a fresh id
    pub fn new(name: &str) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: Self::normalize_name(name),
            created_at: Utc::now().naive_utc(),
        }
    }

    /// Canonical form of a tag name, so "Vintage " and "vintage" are the same tag
    pub fn normalize_name(name: &str) -> String {
        name.trim().to_lowercase()
    }

    /// Gets the tag's ID
    pub fn get_id(&self) -> String {
        self.id.clone()
    }

    /// Gets the tag's name
    pub fn get_name(&self) -> String {
        self.name.clone()
    }

    /// Gets the tag's creation timestamp as a DateTime<Utc>
    pub fn get_created_at(&self) -> DateTime<Utc> {
        DateTime::from_naive_utc_and_offset(self.created_at, Utc)
    }
}
