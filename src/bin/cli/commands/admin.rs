use clap::Subcommand;

use crate::client::YakCatClient;
use crate::output::{self, OutputConfig};

/// Administration commands (ADMIN accounts only)
#[derive(Subcommand, Debug)]
pub enum AdminCommands {
    /// Site totals and the newest items and users
    Stats,
    /// Every user with item and message counts
    Users,
    /// Change a user's role
    SetRole {
        user_id: String,
        /// ADMIN, STAFF or VENDOR
        role: String,
    },
    /// Show site settings
    Settings,
    /// Change site settings from a JSON object of the keys to update
    SetSettings {
        /// e.g. '{"requireApproval": true}'
        json: String,
    },
}

pub async fn execute(
    client: &YakCatClient,
    cmd: AdminCommands,
    config: &OutputConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    match cmd {
        AdminCommands::Stats => {
            let stats = client.admin_stats().await?;
            output::print_stats(&stats, config);
        }
        AdminCommands::Users => {
            let rows = client.admin_users().await?;
            output::print_admin_users(&rows, config);
        }
        AdminCommands::SetRole { user_id, role } => {
            let user = client.set_role(&user_id, role).await?;
            output::print_user(&user, config);
        }
        AdminCommands::Settings => {
            let settings = client.get_settings().await?;
            output::print_settings(&settings, config);
        }
        AdminCommands::SetSettings { json } => {
            let changes: serde_json::Value = serde_json::from_str(&json)?;
            let settings = client.update_settings(&changes).await?;
            output::print_settings(&settings, config);
        }
    }
    Ok(())
}
