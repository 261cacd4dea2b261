use chrono::{DateTime, NaiveDateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::timestamp;

/// A photo attached to a listing
///
/// The file itself lives with the upload provider; only its public URL and
/// the provider's key are kept here.
#[derive(Queryable, Selectable, Insertable, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[diesel(table_name = crate::schema::images)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[serde(rename_all = "camelCase")]
pub struct Image {
    id: String,
    item_id: String,
    url: String,

    /// Provider-side key of the uploaded file
    #[serde(rename = "key")]
    file_key: String,

    /// Position within the listing's gallery, starting at 0
    #[serde(rename = "order")]
    sort_order: i32,

    #[serde(with = "timestamp")]
    created_at: NaiveDateTime,
}

impl Image {
    pub fn new(item_id: String, url: String, file_key: String, sort_order: i32) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            item_id,
            url,
            file_key,
            sort_order,
            created_at: Utc::now().naive_utc(),
        }
    }

    pub fn get_id(&self) -> String {
        self.id.clone()
    }

    pub fn get_item_id(&self) -> String {
        self.item_id.clone()
    }

    pub fn get_url(&self) -> String {
        self.url.clone()
    }

    pub fn get_file_key(&self) -> String {
        self.file_key.clone()
    }

    pub fn get_sort_order(&self) -> i32 {
        self.sort_order
    }

    pub fn get_created_at(&self) -> DateTime<Utc> {
        DateTime::from_naive_utc_and_offset(self.created_at, Utc)
    }
}
