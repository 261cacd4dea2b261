use chrono::{NaiveDateTime, Utc};
use diesel::prelude::*;

/// Row of the `item_tags` join table linking a listing to one of its tags
#[derive(Queryable, Selectable, Insertable, Debug, Clone, PartialEq, Eq)]
#[diesel(table_name = crate::schema::item_tags)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct ItemTag {
    item_id: String,
    tag_id: String,
    created_at: NaiveDateTime,
}

impl ItemTag {
    pub fn new(item_id: String, tag_id: String) -> Self {
        Self {
            item_id,
            tag_id,
            created_at: Utc::now().naive_utc(),
        }
    }
}
