use chrono::{DateTime, NaiveDateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::timestamp;

/// A community forum thread starter
#[derive(Queryable, Selectable, Insertable, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[diesel(table_name = crate::schema::forum_posts)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[serde(rename_all = "camelCase")]
pub struct ForumPost {
    id: String,
    title: String,
    content: String,

    /// Pinned posts are listed before all others
    pinned: bool,

    author_id: String,

    #[serde(with = "timestamp")]
    created_at: NaiveDateTime,

    #[serde(with = "timestamp")]
    updated_at: NaiveDateTime,
}

impl ForumPost {
    pub fn new(author_id: String, title: String, content: String) -> Self {
        let now = Utc::now().naive_utc();
        Self {
            id: Uuid::new_v4().to_string(),
            title,
            content,
            pinned: false,
            author_id,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn get_id(&self) -> String {
        self.id.clone()
    }

    pub fn get_title(&self) -> String {
        self.title.clone()
    }

    pub fn get_content(&self) -> String {
        self.content.clone()
    }

    pub fn is_pinned(&self) -> bool {
        self.pinned
    }

    pub fn get_author_id(&self) -> String {
        self.author_id.clone()
    }

    pub fn get_created_at(&self) -> DateTime<Utc> {
        DateTime::from_naive_utc_and_offset(self.created_at, Utc)
    }
}
