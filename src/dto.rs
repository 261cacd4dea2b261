use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::models::{Event, ForumPost, Image, Item, Message, Role, Tag, User};
use crate::repo::SiteCounts;

/// Deserializes a field so that "absent" and "null" can be told apart
///
/// Used with `#[serde(default)]`: a missing key stays `None`, an explicit
/// `null` becomes `Some(None)`.
fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Parses the date formats the event form sends
///
/// Accepts RFC 3339 (`2025-06-01T10:00:00Z`), a local date-time without zone
/// (`2025-06-01T10:00`, read as UTC) or a bare date (midnight UTC).
pub fn parse_event_date(input: &str) -> Option<DateTime<Utc>> {
    let input = input.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(input, format) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(input, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

/// Body of `POST /api/auth/login`
#[derive(Serialize, Deserialize, Debug, Default, Clone)]
#[serde(default)]
pub struct LoginDto {
    pub email: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub password: String,
}

/// Body of `POST /api/auth/register`
#[derive(Serialize, Deserialize, Debug, Default, Clone)]
#[serde(default)]
pub struct RegisterDto {
    pub email: String,
    pub password: String,
    pub name: Option<String>,
}

/// Body of `POST /api/auth/forgot-password`
#[derive(Serialize, Deserialize, Debug, Default, Clone)]
#[serde(default)]
pub struct ForgotPasswordDto {
    pub email: String,
}

/// Body of `POST /api/auth/reset-password`
#[derive(Serialize, Deserialize, Debug, Default, Clone)]
#[serde(default)]
pub struct ResetPasswordDto {
    pub token: String,
    pub password: String,
}

/// An already-uploaded image attached to a new listing
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ImageRefDto {
    pub url: String,
    pub key: String,
}

/// Data transfer object for creating a new item
#[derive(Serialize, Deserialize, Debug, Default, Clone)]
#[serde(default, rename_all = "camelCase")]
pub struct CreateItemDto {
    pub title: String,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub location: Option<String>,
    pub contact_info: Option<String>,
    pub images: Vec<ImageRefDto>,
    pub tags: Vec<String>,
}

/// Data transfer object for `PATCH /api/items/{id}`
///
/// Keys left out are not changed; the nullable fields accept `null` to clear
/// the stored value.
#[derive(Serialize, Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct UpdateItemDto {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(deserialize_with = "double_option", skip_serializing_if = "Option::is_none")]
    pub description: Option<Option<String>>,
    #[serde(deserialize_with = "double_option", skip_serializing_if = "Option::is_none")]
    pub price: Option<Option<f64>>,
    #[serde(deserialize_with = "double_option", skip_serializing_if = "Option::is_none")]
    pub location: Option<Option<String>>,
    #[serde(deserialize_with = "double_option", skip_serializing_if = "Option::is_none")]
    pub contact_info: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

/// Query string of `GET /api/items`
#[derive(Serialize, Deserialize, Debug, Default, Clone)]
#[serde(default)]
pub struct ItemQueryDto {
    /// Free-text search over title and description
    pub q: Option<String>,
    /// Tag name to filter by
    pub tag: Option<String>,
}

/// Body of `POST /api/items/{id}/tags` and `POST /api/tags`
#[derive(Serialize, Deserialize, Debug, Default, Clone)]
#[serde(default)]
pub struct TagNameDto {
    pub name: String,
}

/// Body of `POST /api/messages`
#[derive(Serialize, Deserialize, Debug, Default, Clone)]
#[serde(default, rename_all = "camelCase")]
pub struct SendMessageDto {
    pub recipient_email: String,
    /// Addresses the recipient by account id instead of email
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recipient_id: Option<String>,
    pub subject: String,
    pub body: String,
}

/// Body of `POST /api/forum`
#[derive(Serialize, Deserialize, Debug, Default, Clone)]
#[serde(default)]
pub struct CreatePostDto {
    pub title: String,
    pub content: String,
}

/// Body of `PATCH /api/forum/{id}/pin`
#[derive(Serialize, Deserialize, Debug, Clone, Copy)]
pub struct PinPostDto {
    pub pinned: bool,
}

/// Body of `POST /api/events`
#[derive(Serialize, Deserialize, Debug, Default, Clone)]
#[serde(default, rename_all = "camelCase")]
pub struct CreateEventDto {
    pub title: String,
    pub description: Option<String>,
    /// See [`parse_event_date`] for the accepted formats
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub location: Option<String>,
}

/// Body of `PATCH /api/profile`
#[derive(Serialize, Deserialize, Debug, Default, Clone)]
#[serde(default, rename_all = "camelCase")]
pub struct UpdateProfileDto {
    pub name: Option<String>,
    pub default_phone: Option<String>,
    pub default_location: Option<String>,
    pub default_contact_method: Option<String>,
}

/// Body of `POST /api/profile/password`
#[derive(Serialize, Deserialize, Debug, Default, Clone)]
#[serde(default, rename_all = "camelCase")]
pub struct ChangePasswordDto {
    pub current_password: String,
    pub new_password: String,
}

/// Body of `PATCH /api/admin/users/{id}`
#[derive(Serialize, Deserialize, Debug, Default, Clone)]
#[serde(default)]
pub struct UpdateRoleDto {
    pub role: String,
}

// ---------------------------------------------------------------------------
// Responses
// ---------------------------------------------------------------------------

/// Public identity of a user as shown next to their content
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct UserSummary {
    pub id: String,
    pub name: Option<String>,
    pub email: String,
}

impl From<&User> for UserSummary {
    fn from(user: &User) -> Self {
        Self {
            id: user.get_id(),
            name: user.get_name(),
            email: user.get_email(),
        }
    }
}

/// The user carried in a login or registration response
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct SessionUser {
    pub id: String,
    pub email: String,
    pub name: Option<String>,
    pub role: Role,
}

impl From<&User> for SessionUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.get_id(),
            email: user.get_email(),
            name: user.get_name(),
            role: user.get_role(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct AuthResponse {
    pub user: SessionUser,
    pub token: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct SuccessResponse {
    pub success: bool,
}

impl SuccessResponse {
    pub fn ok() -> Self {
        Self { success: true }
    }
}

/// A plain message, optionally with reset details in dev mode
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct MessageResponse {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reset_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reset_link: Option<String>,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            reset_token: None,
            reset_link: None,
        }
    }
}

/// An item as shown in lists: with its first image and its vendor
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ItemSummary {
    #[serde(flatten)]
    pub item: Item,
    pub images: Vec<Image>,
    pub vendor: Option<UserSummary>,
}

/// An item with all its images, tags and its vendor
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ItemDetail {
    #[serde(flatten)]
    pub item: Item,
    pub images: Vec<Image>,
    pub tags: Vec<Tag>,
    pub vendor: Option<UserSummary>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct MessageView {
    #[serde(flatten)]
    pub message: Message,
    pub sender: Option<UserSummary>,
    pub recipient: Option<UserSummary>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ForumPostView {
    #[serde(flatten)]
    pub post: ForumPost,
    pub author: Option<UserSummary>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct EventView {
    #[serde(flatten)]
    pub event: Event,
    pub organizer: Option<UserSummary>,
}

/// The admin dashboard
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct AdminStats {
    #[serde(flatten)]
    pub counts: SiteCounts,
    pub recent_items: Vec<ItemSummary>,
    pub recent_users: Vec<User>,
}

/// A row of the admin user list
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct AdminUserView {
    #[serde(flatten)]
    pub user: User,
    pub item_count: i64,
    pub message_count: i64,
}

#[cfg(test)]
mod tests;
