use crate::db::{execute_with_retry, DbPool};
use crate::models::{SiteSettings, SiteSettingsRow};
use crate::schema::site_settings;
use diesel::prelude::*;
use diesel::upsert::excluded;
use anyhow::Result;
use tracing::{debug, info, instrument};

/// Loads the site settings
///
/// Until an admin saves settings for the first time the defaults apply.
#[instrument(skip(pool))]
pub fn get_settings(pool: &DbPool) -> Result<SiteSettings> {
    let conn = &mut pool.get()?;
    let row = site_settings::table
        .find(SiteSettingsRow::ID)
        .select(SiteSettingsRow::as_select())
        .first(conn)
        .optional()?;

    match row {
        Some(row) => Ok(row.into_settings()),
        None => {
            debug!("No stored settings, using defaults");
            Ok(SiteSettings::default())
        }
    }
}

/// Replaces the stored settings document
#[instrument(skip(pool, settings))]
pub async fn save_settings(pool: &DbPool, settings: &SiteSettings) -> Result<SiteSettings> {
    let mut conn = pool.get()?;
    let row = SiteSettingsRow::new(settings.clone());

    execute_with_retry(&mut conn, |conn| {
        diesel::insert_into(site_settings::table)
            .values(&row)
            .on_conflict(site_settings::id)
            .do_update()
            .set((
                site_settings::data.eq(excluded(site_settings::data)),
                site_settings::updated_at.eq(excluded(site_settings::updated_at)),
            ))
            .execute(conn)
    })
    .await?;

    info!("Saved site settings");
    Ok(row.into_settings())
}
