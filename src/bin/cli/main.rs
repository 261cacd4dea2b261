mod client;
mod commands;
mod output;

use clap::{Parser, Subcommand};
use client::YakCatClient;
use output::{OutputConfig, OutputFormat};
use std::process;
use yakcat::config;

/// Command line client for a YakCat server
#[derive(Parser, Debug)]
#[clap(name = "yakcat-cli", about = "Browse and manage a YakCat consignment mall")]
struct Cli {
    /// Server URL to connect to
    #[clap(long, env = "YAKCAT_URL", global = true)]
    server_url: Option<String>,

    /// Session token from `auth login`
    #[clap(long, env = "YAKCAT_TOKEN", global = true, hide_env_values = true)]
    token: Option<String>,

    /// Output format
    #[clap(long, value_enum, default_value_t = OutputFormat::Human, global = true)]
    format: OutputFormat,

    /// Quiet mode: minimal output (just IDs)
    #[clap(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Log in and inspect the current session
    #[command(subcommand)]
    Auth(commands::auth::AuthCommands),
    /// Browse and manage items
    #[command(subcommand)]
    Item(commands::item::ItemCommands),
    /// Read and send direct messages
    #[command(subcommand)]
    Message(commands::message::MessageCommands),
    /// Site administration
    #[command(subcommand)]
    Admin(commands::admin::AdminCommands),
}

/// Resolves the server URL from CLI args, config file, or defaults
///
/// Precedence: CLI flag / env var > config file > default (port based on debug/release)
fn resolve_server_url(cli_url: Option<String>) -> String {
    if let Some(url) = cli_url {
        return url;
    }

    let config_path = config::get_config_dir_path().map(|dir| dir.join("config.toml"));
    if let Some(path) = config_path {
        if let Ok(update) = config::config_from_file(Some(path)) {
            if let Some(url) = update.server_url {
                return url;
            }
        }
    }

    let port = if cfg!(debug_assertions) { 3001 } else { 3000 };
    format!("http://localhost:{}", port)
}

/// Formats an error for human-readable stderr output
fn format_error(err: &dyn std::error::Error) -> String {
    let err_string = err.to_string();

    if err_string.contains("error sending request")
        || err_string.contains("onnection refused")
        || err_string.contains("tcp connect error")
    {
        return format!("Could not connect to server. Is yakcat running?\n  {}", err_string);
    }
    if err_string.contains("(401)") {
        return format!("{}\n  Log in with `yakcat-cli auth login` and set YAKCAT_TOKEN", err_string);
    }

    err_string
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let server_url = resolve_server_url(cli.server_url);
    let mut client = YakCatClient::new(server_url, cli.token);
    let output_config = OutputConfig {
        format: cli.format,
        quiet: cli.quiet,
    };

    let result = match cli.command {
        Commands::Auth(cmd) => commands::auth::execute(&mut client, cmd, &output_config).await,
        Commands::Item(cmd) => commands::item::execute(&client, cmd, &output_config).await,
        Commands::Message(cmd) => commands::message::execute(&client, cmd, &output_config).await,
        Commands::Admin(cmd) => commands::admin::execute(&client, cmd, &output_config).await,
    };

    if let Err(e) = result {
        eprintln!("Error: {}", format_error(e.as_ref()));
        process::exit(1);
    }
}
