use chrono::{DateTime, NaiveDateTime, Utc};
use diesel::deserialize::{FromSql, FromSqlRow};
use diesel::expression::AsExpression;
use diesel::prelude::*;
use diesel::serialize::{self, IsNull, Output, ToSql};
use diesel::sql_types::Text;
use diesel::sqlite::{Sqlite, SqliteValue};
use serde::{Deserialize, Serialize};

/// Site-wide options editable by admins
///
/// Persisted as a JSON document in the single row of `site_settings`, so
/// every server instance sees the same values and they survive restarts.
/// Keys missing from a stored document fall back to their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, AsExpression, FromSqlRow)]
#[diesel(sql_type = Text)]
#[serde(rename_all = "camelCase", default)]
pub struct SiteSettings {
    pub site_name: String,
    pub site_description: String,
    pub contact_email: String,
    pub max_images_per_item: u32,
    /// New listings start out PENDING until staff approve them
    pub require_approval: bool,
    pub maintenance_mode: bool,
    /// Whether `/api/auth/register` accepts new accounts
    pub allow_registration: bool,
    pub email_notifications: bool,
}

impl Default for SiteSettings {
    fn default() -> Self {
        Self {
            site_name: "YakCat".to_string(),
            site_description: "Consignment Mall Catalog System".to_string(),
            contact_email: "admin@yakcat.com".to_string(),
            max_images_per_item: 6,
            require_approval: false,
            maintenance_mode: false,
            allow_registration: true,
            email_notifications: true,
        }
    }
}

impl SiteSettings {
    /// Returns a copy with the keys of `patch` laid over the current values
    ///
    /// `patch` must be a JSON object; keys that are not settings are ignored
    /// and a value of the wrong type is an error.
    pub fn merged(&self, patch: &serde_json::Value) -> Result<Self, String> {
        let patch = patch
            .as_object()
            .ok_or_else(|| "Settings update must be a JSON object".to_string())?;

        let mut current = serde_json::to_value(self).map_err(|e| e.to_string())?;
        if let Some(map) = current.as_object_mut() {
            for (key, value) in patch {
                if map.contains_key(key) {
                    map.insert(key.clone(), value.clone());
                }
            }
        }

        serde_json::from_value(current).map_err(|e| format!("Invalid settings: {}", e))
    }
}

impl FromSql<Text, Sqlite> for SiteSettings {
    fn from_sql(value: SqliteValue<'_, '_, '_>) -> diesel::deserialize::Result<Self> {
        let text = <String as FromSql<Text, Sqlite>>::from_sql(value)?;
        Ok(serde_json::from_str(&text)?)
    }
}

impl ToSql<Text, Sqlite> for SiteSettings {
    fn to_sql<'b>(&'b self, out: &mut Output<'b, '_, Sqlite>) -> serialize::Result {
        out.set_value(serde_json::to_string(self)?);
        Ok(IsNull::No)
    }
}

/// The stored settings row; there is only ever the one with id 1
#[derive(Queryable, Selectable, Insertable, Debug, Clone)]
#[diesel(table_name = crate::schema::site_settings)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct SiteSettingsRow {
    id: i32,
    data: SiteSettings,
    updated_at: NaiveDateTime,
}

impl SiteSettingsRow {
    pub const ID: i32 = 1;

    pub fn new(data: SiteSettings) -> Self {
        Self {
            id: Self::ID,
            data,
            updated_at: Utc::now().naive_utc(),
        }
    }

    pub fn into_settings(self) -> SiteSettings {
        self.data
    }

    pub fn get_updated_at(&self) -> DateTime<Utc> {
        DateTime::from_naive_utc_and_offset(self.updated_at, Utc)
    }
}
