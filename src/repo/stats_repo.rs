use std::collections::HashMap;

use crate::db::DbPool;
use crate::models::User;
use crate::schema::{events, items, messages, users};
use diesel::dsl::count_star;
use diesel::prelude::*;
use anyhow::Result;
use serde::{Deserialize, Serialize};

/// Row counts shown on the admin dashboard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteCounts {
    pub total_users: i64,
    pub total_items: i64,
    pub total_messages: i64,
    pub total_events: i64,
}

/// A user together with how many items they list and messages they received
#[derive(Debug, Clone, PartialEq)]
pub struct UserActivity {
    pub user: User,
    pub item_count: i64,
    pub message_count: i64,
}

pub fn site_counts(pool: &DbPool) -> Result<SiteCounts> {
    let conn = &mut pool.get()?;
    Ok(SiteCounts {
        total_users: users::table.select(count_star()).first(conn)?,
        total_items: items::table.select(count_star()).first(conn)?,
        total_messages: messages::table.select(count_star()).first(conn)?,
        total_events: events::table.select(count_star()).first(conn)?,
    })
}

/// Every user, newest first, with their item and received-message counts
pub fn list_user_activity(pool: &DbPool) -> Result<Vec<UserActivity>> {
    let conn = &mut pool.get()?;

    let all_users = users::table
        .order(users::created_at.desc())
        .select(User::as_select())
        .load(conn)?;

    let item_counts: HashMap<String, i64> = items::table
        .group_by(items::vendor_id)
        .select((items::vendor_id, count_star()))
        .load::<(String, i64)>(conn)?
        .into_iter()
        .collect();

    let message_counts: HashMap<String, i64> = messages::table
        .group_by(messages::recipient_id)
        .select((messages::recipient_id, count_star()))
        .load::<(String, i64)>(conn)?
        .into_iter()
        .collect();

    Ok(all_users
        .into_iter()
        .map(|user| {
            let id = user.get_id();
            UserActivity {
                item_count: item_counts.get(&id).copied().unwrap_or(0),
                message_count: message_counts.get(&id).copied().unwrap_or(0),
                user,
            }
        })
        .collect())
}
