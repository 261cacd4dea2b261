use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDateTime, Utc};
use diesel::deserialize::{FromSql, FromSqlRow};
use diesel::expression::AsExpression;
use diesel::prelude::*;
use diesel::serialize::{self, IsNull, Output, ToSql};
use diesel::sql_types::Text;
use diesel::sqlite::{Sqlite, SqliteValue};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::timestamp;

/// Lifecycle state of a listing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, AsExpression, FromSqlRow)]
#[diesel(sql_type = Text)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ItemStatus {
    Available,
    Pending,
    Sold,
    Removed,
}

impl ItemStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemStatus::Available => "AVAILABLE",
            ItemStatus::Pending => "PENDING",
            ItemStatus::Sold => "SOLD",
            ItemStatus::Removed => "REMOVED",
        }
    }
}

impl fmt::Display for ItemStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ItemStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "AVAILABLE" => Ok(ItemStatus::Available),
            "PENDING" => Ok(ItemStatus::Pending),
            "SOLD" => Ok(ItemStatus::Sold),
            "REMOVED" => Ok(ItemStatus::Removed),
            other => Err(format!("Unknown item status: {}", other)),
        }
    }
}

impl FromSql<Text, Sqlite> for ItemStatus {
    fn from_sql(value: SqliteValue<'_, '_, '_>) -> diesel::deserialize::Result<Self> {
        let text = <String as FromSql<Text, Sqlite>>::from_sql(value)?;
        Ok(text.parse::<ItemStatus>()?)
    }
}

impl ToSql<Text, Sqlite> for ItemStatus {
    fn to_sql<'b>(&'b self, out: &mut Output<'b, '_, Sqlite>) -> serialize::Result {
        out.set_value(self.as_str());
        Ok(IsNull::No)
    }
}

/// A listing offered by a vendor
///
/// This struct maps directly to the `items` table. Images and tags live in
/// their own tables and are attached by the repository layer when a detail
/// view is assembled.
#[derive(Queryable, Selectable, Insertable, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[diesel(table_name = crate::schema::items)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[serde(rename_all = "camelCase")]
pub struct Item {
    /// Unique identifier for the item (UUID v4 as string)
    id: String,

    title: String,
    description: Option<String>,

    /// Asking price; `None` means "ask the vendor"
    price: Option<f64>,

    location: Option<String>,
    contact_info: Option<String>,

    /// URL-friendly unique handle derived from the title
    slug: String,

    status: ItemStatus,

    /// Number of times the public item page was opened
    view_count: i32,

    /// The user who listed this item
    vendor_id: String,

    #[serde(with = "timestamp")]
    created_at: NaiveDateTime,

    #[serde(with = "timestamp")]
    updated_at: NaiveDateTime,
}

/// The editable fields of a listing, shared by creation and updates
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ItemFields {
    pub description: Option<String>,
    pub price: Option<f64>,
    pub location: Option<String>,
    pub contact_info: Option<String>,
}

impl Item {
    /// Creates a new listing owned by `vendor_id`
    ///
    /// The slug is generated from the title and the creation time.
    pub fn new(vendor_id: String, title: String, fields: ItemFields, status: ItemStatus) -> Self {
        let now = Utc::now();
        let slug = generate_slug(&title, now);
        Self {
            id: Uuid::new_v4().to_string(),
            title,
            description: fields.description,
            price: fields.price,
            location: fields.location,
            contact_info: fields.contact_info,
            slug,
            status,
            view_count: 0,
            vendor_id,
            created_at: now.naive_utc(),
            updated_at: now.naive_utc(),
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

    pub fn get_price(&self) -> Option<f64> {
        self.price
    }

    pub fn get_location(&self) -> Option<String> {
        self.location.clone()
    }

    pub fn get_contact_info(&self) -> Option<String> {
        self.contact_info.clone()
    }

    pub fn get_slug(&self) -> String {
        self.slug.clone()
    }

    /// Regenerates the slug as if the item had been created at `at`
    pub fn reslug(&mut self, at: DateTime<Utc>) {
        self.slug = generate_slug(&self.title, at);
    }

    pub fn get_status(&self) -> ItemStatus {
        self.status
    }

    pub fn get_view_count(&self) -> i32 {
        self.view_count
    }

    pub fn get_vendor_id(&self) -> String {
        self.vendor_id.clone()
    }

    pub fn get_created_at(&self) -> DateTime<Utc> {
        DateTime::from_naive_utc_and_offset(self.created_at, Utc)
    }

    pub fn get_updated_at(&self) -> DateTime<Utc> {
        DateTime::from_naive_utc_and_offset(self.updated_at, Utc)
    }
}

/// Builds the public slug for a listing
///
/// The title is lower-cased, every run of characters outside `[a-z0-9]`
/// becomes a single `-`, leading and trailing dashes are dropped, and the
/// creation time in epoch milliseconds (base 36) is appended so two listings
/// with the same title get distinct slugs.
pub fn generate_slug(title: &str, at: DateTime<Utc>) -> String {
    let mut base = String::with_capacity(title.len());
    let mut pending_dash = false;
    for c in title.to_lowercase().chars() {
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            if pending_dash && !base.is_empty() {
                base.push('-');
            }
            pending_dash = false;
            base.push(c);
        } else {
            pending_dash = true;
        }
    }

    let millis = u64::try_from(at.timestamp_millis()).unwrap_or(0);
    if base.is_empty() {
        to_base36(millis)
    } else {
        format!("{}-{}", base, to_base36(millis))
    }
}

fn to_base36(mut n: u64) -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if n == 0 {
        return "0".to_string();
    }
    let mut out = Vec::new();
    while n > 0 {
        out.push(DIGITS[(n % 36) as usize]);
        n /= 36;
    }
    out.reverse();
    String::from_utf8(out).unwrap_or_default()
}
