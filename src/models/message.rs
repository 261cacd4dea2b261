use chrono::{DateTime, NaiveDateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::timestamp;

/// A direct message between two users
#[derive(Queryable, Selectable, Insertable, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[diesel(table_name = crate::schema::messages)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[serde(rename_all = "camelCase")]
pub struct Message {
    id: String,
    subject: String,
    body: String,

    /// Set once the recipient has opened the message
    read: bool,

    sender_id: String,
    recipient_id: String,

    #[serde(with = "timestamp")]
    created_at: NaiveDateTime,
}

impl Message {
    pub fn new(sender_id: String, recipient_id: String, subject: String, body: String) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            subject,
            body,
            read: false,
            sender_id,
            recipient_id,
            created_at: Utc::now().naive_utc(),
        }
    }

    pub fn get_id(&self) -> String {
        self.id.clone()
    }

    pub fn get_subject(&self) -> String {
        self.subject.clone()
    }

    pub fn get_body(&self) -> String {
        self.body.clone()
    }

    pub fn is_read(&self) -> bool {
        self.read
    }

    pub fn get_sender_id(&self) -> String {
        self.sender_id.clone()
    }

    pub fn get_recipient_id(&self) -> String {
        self.recipient_id.clone()
    }

    pub fn get_created_at(&self) -> DateTime<Utc> {
        DateTime::from_naive_utc_and_offset(self.created_at, Utc)
    }
}
