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

/// The access level of an account
///
/// Stored as upper-case text (`ADMIN`, `STAFF`, `VENDOR`), which is also the
/// form used on the wire and inside issued tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, AsExpression, FromSqlRow)]
#[diesel(sql_type = Text)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Admin,
    Staff,
    Vendor,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "ADMIN",
            Role::Staff => "STAFF",
            Role::Vendor => "VENDOR",
        }
    }

    /// Admins and staff may moderate listings and community content
    pub fn is_staff(&self) -> bool {
        matches!(self, Role::Admin | Role::Staff)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "ADMIN" => Ok(Role::Admin),
            "STAFF" => Ok(Role::Staff),
            "VENDOR" => Ok(Role::Vendor),
            other => Err(format!("Unknown role: {}", other)),
        }
    }
}

impl FromSql<Text, Sqlite> for Role {
    fn from_sql(value: SqliteValue<'_, '_, '_>) -> diesel::deserialize::Result<Self> {
        let text = <String as FromSql<Text, Sqlite>>::from_sql(value)?;
        Ok(text.parse::<Role>()?)
    }
}

impl ToSql<Text, Sqlite> for Role {
    fn to_sql<'b>(&'b self, out: &mut Output<'b, '_, Sqlite>) -> serialize::Result {
        out.set_value(self.as_str());
        Ok(IsNull::No)
    }
}

/// A registered account
///
/// Credentials and the pending password-reset token never leave the server:
/// they are skipped when the user is serialized.
#[derive(Queryable, Selectable, Insertable, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[diesel(table_name = crate::schema::users)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Unique identifier for the user (UUID v4 as string)
    id: String,

    /// Login email, stored lower-case
    email: String,

    /// Display name
    name: Option<String>,

    /// bcrypt hash of the password
    #[serde(skip_serializing, default)]
    password_hash: String,

    role: Role,

    default_phone: Option<String>,
    default_location: Option<String>,
    default_contact_method: Option<String>,

    #[serde(skip, default)]
    reset_token: Option<String>,

    #[serde(skip, default)]
    reset_token_expiry: Option<NaiveDateTime>,

    #[serde(with = "timestamp")]
    created_at: NaiveDateTime,

    #[serde(with = "timestamp")]
    updated_at: NaiveDateTime,
}

impl User {
    /// Creates a new user with a fresh id
    ///
    /// The email is normalised to lower case so lookups are case-insensitive.
    pub fn new(email: &str, name: Option<String>, password_hash: String, role: Role) -> Self {
        let now = Utc::now().naive_utc();
        Self {
            id: Uuid::new_v4().to_string(),
            email: normalize_email(email),
            name,
            password_hash,
            role,
            default_phone: None,
            default_location: None,
            default_contact_method: None,
            reset_token: None,
            reset_token_expiry: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn get_id(&self) -> String {
        self.id.clone()
    }

    pub fn get_email(&self) -> String {
        self.email.clone()
    }

    pub fn get_name(&self) -> Option<String> {
        self.name.clone()
    }

    pub fn get_password_hash(&self) -> &str {
        &self.password_hash
    }

    pub fn get_role(&self) -> Role {
        self.role
    }

    pub fn get_default_phone(&self) -> Option<String> {
        self.default_phone.clone()
    }

    pub fn get_default_location(&self) -> Option<String> {
        self.default_location.clone()
    }

    pub fn get_default_contact_method(&self) -> Option<String> {
        self.default_contact_method.clone()
    }

    pub fn get_reset_token(&self) -> Option<String> {
        self.reset_token.clone()
    }

    pub fn get_reset_token_expiry(&self) -> Option<DateTime<Utc>> {
        self.reset_token_expiry.map(|t| DateTime::from_naive_utc_and_offset(t, Utc))
    }

    /// Whether the stored reset token is still usable at `now`
    pub fn reset_token_valid_at(&self, now: DateTime<Utc>) -> bool {
        match (self.reset_token.as_ref(), self.get_reset_token_expiry()) {
            (Some(_), Some(expiry)) => expiry > now,
            _ => false,
        }
    }

    pub fn get_created_at(&self) -> DateTime<Utc> {
        DateTime::from_naive_utc_and_offset(self.created_at, Utc)
    }

    pub fn get_updated_at(&self) -> DateTime<Utc> {
        DateTime::from_naive_utc_and_offset(self.updated_at, Utc)
    }
}

/// Trims and lower-cases an email address
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
