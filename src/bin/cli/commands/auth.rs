use clap::Subcommand;

use crate::client::YakCatClient;
use crate::output::{self, OutputConfig};

/// Session commands
#[derive(Subcommand, Debug)]
pub enum AuthCommands {
    /// Log in and print a session token for `--token` / `YAKCAT_TOKEN`
    Login {
        #[clap(long)]
        email: String,
        #[clap(long, env = "YAKCAT_PASSWORD")]
        password: String,
    },
    /// Show the account the current token belongs to
    Me,
}

pub async fn execute(
    client: &mut YakCatClient,
    cmd: AuthCommands,
    config: &OutputConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    match cmd {
        AuthCommands::Login { email, password } => {
            let session = client.login(email, password).await?;
            if config.quiet {
                println!("{}", session.token);
                return Ok(());
            }
            match config.format {
                output::OutputFormat::Json => {
                    println!("{}", serde_json::to_string_pretty(&session)?);
                }
                output::OutputFormat::Human => {
                    println!("Logged in as {} ({})", session.user.email, session.user.role);
                    println!("export YAKCAT_TOKEN={}", session.token);
                }
            }
        }
        AuthCommands::Me => {
            let user = client.me().await?;
            output::print_user(&user, config);
        }
    }
    Ok(())
}
