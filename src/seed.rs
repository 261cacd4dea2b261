use anyhow::Result;
use tracing::{info, instrument};

use crate::auth::hash_password;
use crate::db::DbPool;
use crate::models::Role;
use crate::repo;

/// Demo accounts: email, display name, password, role
const DEMO_USERS: &[(&str, &str, &str, Role)] = &[
    ("admin@yakcat.com", "Admin User", "admin123", Role::Admin),
    ("staff@yakcat.com", "Staff Member", "staff123", Role::Staff),
    ("john@vendor.com", "John Vendor", "vendor123", Role::Vendor),
    ("jane@vendor.com", "Jane Vendor", "vendor123", Role::Vendor),
];

const DEMO_TAGS: &[&str] = &["furniture", "electronics", "vintage", "collectibles", "tools"];

/// What a seeding run added
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SeedReport {
    pub users_created: Vec<String>,
    pub tags_created: Vec<String>,
}

/// Inserts the demo accounts and tags that are not there yet
///
/// Existing rows are left untouched, so running it twice adds nothing.
#[instrument(skip(pool))]
pub async fn seed_demo_data(pool: &DbPool, bcrypt_cost: u32) -> Result<SeedReport> {
    let mut report = SeedReport::default();

    for (email, name, password, role) in DEMO_USERS {
        if repo::get_user_by_email(pool, email)?.is_some() {
            continue;
        }
        let hash = hash_password(password, bcrypt_cost).await?;
        repo::create_user(pool, email, Some(name.to_string()), hash, *role).await?;
        report.users_created.push(email.to_string());
    }

    for name in DEMO_TAGS {
        if repo::get_tag_by_name(pool, name)?.is_some() {
            continue;
        }
        repo::create_tag(pool, name).await?;
        report.tags_created.push(name.to_string());
    }

    info!(
        users = report.users_created.len(),
        tags = report.tags_created.len(),
        "Seeding complete"
    );
    Ok(report)
}
