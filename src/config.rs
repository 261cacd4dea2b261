use std::path::PathBuf;
use std::fs;

use chrono::Duration;
use clap::{Parser, Subcommand};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Secret used when nothing else is configured; only acceptable in dev mode
pub const DEFAULT_JWT_SECRET: &str = "yakcat-dev-secret-change-me";

/// Longest session lifetime `validate` accepts (ten years)
pub const MAX_TOKEN_TTL_DAYS: i64 = 3650;

/// Longest reset-link lifetime `validate` accepts (one week)
pub const MAX_RESET_TOKEN_TTL_MINUTES: i64 = 7 * 24 * 60;

/// Configuration for the YakCat server
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// URL for the database connection
    pub database_url: String,
    /// Address the HTTP server binds to
    pub bind_address: String,
    /// HMAC secret used to sign session tokens
    pub jwt_secret: String,
    /// Lifetime of a session token (and its cookie) in days
    pub token_ttl_days: i64,
    /// Lifetime of a password reset token in minutes
    pub reset_token_ttl_minutes: i64,
    /// bcrypt work factor for new password hashes
    pub bcrypt_cost: u32,
    /// Public base URL of the site, used to build password reset links
    pub public_url: String,
    /// Mark the session cookie `Secure`
    pub secure_cookies: bool,
    /// Development mode: reset tokens are echoed in API responses
    pub dev_mode: bool,
    /// Origins allowed by CORS; empty means any origin
    pub cors_origins: Vec<String>,
    /// Directory for a daily rolling log file, in addition to stdout
    pub log_dir: Option<String>,
    /// Emit logs as JSON lines
    pub json_logs: bool,
}

/// Update structure for Config with all fields optional
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ConfigUpdate {
    #[serde(default)]
    pub database_url: Option<String>,
    #[serde(default)]
    pub bind_address: Option<String>,
    #[serde(default)]
    pub jwt_secret: Option<String>,
    #[serde(default)]
    pub token_ttl_days: Option<i64>,
    #[serde(default)]
    pub reset_token_ttl_minutes: Option<i64>,
    #[serde(default)]
    pub bcrypt_cost: Option<u32>,
    #[serde(default)]
    pub public_url: Option<String>,
    #[serde(default)]
    pub secure_cookies: Option<bool>,
    #[serde(default)]
    pub dev_mode: Option<bool>,
    #[serde(default)]
    pub cors_origins: Option<Vec<String>>,
    #[serde(default)]
    pub log_dir: Option<String>,
    #[serde(default)]
    pub json_logs: Option<bool>,
    /// Server URL used by `yakcat-cli`; ignored by the server
    #[serde(default)]
    pub server_url: Option<String>,
}

/// Command line arguments for the server binary
#[derive(Parser, Debug, Default)]
#[clap(name = "yakcat", about = "YakCat consignment mall server")]
pub struct CliArgs {
    /// Database URL
    #[clap(long, env = "DATABASE_URL")]
    pub database_url: Option<String>,

    /// Address to listen on, e.g. 0.0.0.0:3000
    #[clap(long, env = "YAKCAT_BIND")]
    pub bind_address: Option<String>,

    /// Secret used to sign session tokens
    #[clap(long, env = "JWT_SECRET", hide_env_values = true)]
    pub jwt_secret: Option<String>,

    /// Session token lifetime in days
    #[clap(long, env = "YAKCAT_TOKEN_TTL_DAYS")]
    pub token_ttl_days: Option<i64>,

    /// Password reset token lifetime in minutes
    #[clap(long, env = "YAKCAT_RESET_TTL_MINUTES")]
    pub reset_token_ttl_minutes: Option<i64>,

    /// bcrypt cost for new password hashes
    #[clap(long, env = "YAKCAT_BCRYPT_COST")]
    pub bcrypt_cost: Option<u32>,

    /// Public base URL of the site
    #[clap(long, env = "YAKCAT_PUBLIC_URL")]
    pub public_url: Option<String>,

    /// Mark session cookies as Secure
    #[clap(long, env = "YAKCAT_SECURE_COOKIES")]
    pub secure_cookies: Option<bool>,

    /// Development mode
    #[clap(long, env = "YAKCAT_DEV")]
    pub dev_mode: Option<bool>,

    /// Comma-separated origins allowed by CORS
    #[clap(long, env = "YAKCAT_CORS_ORIGINS", value_delimiter = ',')]
    pub cors_origins: Option<Vec<String>>,

    /// Directory for rolling log files
    #[clap(long, env = "YAKCAT_LOG_DIR")]
    pub log_dir: Option<String>,

    /// Emit JSON logs
    #[clap(long, env = "YAKCAT_JSON_LOGS")]
    pub json_logs: Option<bool>,

    #[command(subcommand)]
    pub command: Option<ServerCommand>,
}

/// What the server binary should do once configured
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum ServerCommand {
    /// Run the HTTP server (the default)
    Serve,
    /// Create an admin account, or promote and reset the password of an existing one
    CreateAdmin {
        #[clap(long)]
        email: String,
        #[clap(long)]
        name: Option<String>,
        #[clap(long, env = "ADMIN_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Insert demo users and tags
    Seed,
}

impl Config {
    /// Applies a config update to the current configuration
    pub fn apply_update(self, update: ConfigUpdate) -> Self {
        Self {
            database_url: update.database_url.unwrap_or(self.database_url),
            bind_address: update.bind_address.unwrap_or(self.bind_address),
            jwt_secret: update.jwt_secret.unwrap_or(self.jwt_secret),
            token_ttl_days: update.token_ttl_days.unwrap_or(self.token_ttl_days),
            reset_token_ttl_minutes: update.reset_token_ttl_minutes.unwrap_or(self.reset_token_ttl_minutes),
            bcrypt_cost: update.bcrypt_cost.unwrap_or(self.bcrypt_cost),
            public_url: update.public_url.unwrap_or(self.public_url),
            secure_cookies: update.secure_cookies.unwrap_or(self.secure_cookies),
            dev_mode: update.dev_mode.unwrap_or(self.dev_mode),
            cors_origins: update.cors_origins.unwrap_or(self.cors_origins),
            log_dir: update.log_dir.or(self.log_dir),
            json_logs: update.json_logs.unwrap_or(self.json_logs),
        }
    }

    /// Returns the session token lifetime
    pub fn token_ttl(&self) -> Duration {
        Duration::days(self.token_ttl_days)
    }

    /// Returns the password reset token lifetime
    pub fn reset_token_ttl(&self) -> Duration {
        Duration::minutes(self.reset_token_ttl_minutes)
    }

    /// Checks values that would make the server insecure or unusable
    pub fn validate(&self) -> Result<(), String> {
        if !(1..=MAX_TOKEN_TTL_DAYS).contains(&self.token_ttl_days) {
            return Err(format!("token_ttl_days must be between 1 and {}", MAX_TOKEN_TTL_DAYS));
        }
        if !(1..=MAX_RESET_TOKEN_TTL_MINUTES).contains(&self.reset_token_ttl_minutes) {
            return Err(format!(
                "reset_token_ttl_minutes must be between 1 and {}",
                MAX_RESET_TOKEN_TTL_MINUTES
            ));
        }
        if !(4..=31).contains(&self.bcrypt_cost) {
            return Err("bcrypt_cost must be between 4 and 31".to_string());
        }
        if self.jwt_secret.is_empty() {
            return Err("jwt_secret must not be empty".to_string());
        }
        if self.jwt_secret == DEFAULT_JWT_SECRET && !self.dev_mode {
            return Err("jwt_secret must be set outside dev mode".to_string());
        }
        Ok(())
    }
}

/// Returns the base (default) configuration
pub fn base_config(config_path: Option<PathBuf>) -> Config {
    let database_url = config_path.map_or("yakcat.db".to_string(), |path| path.join("yakcat.db").to_string_lossy().to_string());

    Config {
        database_url,
        bind_address: "127.0.0.1:3000".to_string(),
        jwt_secret: DEFAULT_JWT_SECRET.to_string(),
        token_ttl_days: 7,
        reset_token_ttl_minutes: 60,
        bcrypt_cost: 10,
        public_url: "http://localhost:3000".to_string(),
        secure_cookies: false,
        dev_mode: false,
        cors_origins: Vec::new(),
        log_dir: None,
        json_logs: false,
    }
}

/// Returns the XDG config directory for YakCat, if one can be determined
pub fn get_config_dir_path() -> Option<PathBuf> {
    match ProjectDirs::from("com", "yakcat", "yakcat") {
        Some(proj_dirs) => Some(PathBuf::from(proj_dirs.config_dir())),
        None => {
            warn!("Could not determine XDG config directory, skipping config file");
            None
        }
    }
}

/// Loads configuration from a TOML file
pub fn config_from_file(config_path: Option<PathBuf>) -> Result<ConfigUpdate, String> {
    let Some(config_path) = config_path else {
        return Ok(ConfigUpdate::default());
    };

    if !config_path.exists() {
        info!("Config file not found at {:?}, using defaults", config_path);
        return Ok(ConfigUpdate::default());
    }

    match fs::read_to_string(&config_path) {
        Ok(content) => match toml::from_str::<ConfigUpdate>(&content) {
            Ok(config) => {
                info!("Loaded configuration from {:?}", config_path);
                Ok(config)
            },
            Err(e) => {
                warn!("Failed to parse config file: {}", e);
                Err(format!("Failed to parse config file: {}", e))
            }
        },
        Err(e) => {
            warn!("Failed to read config file: {}", e);
            Err(format!("Failed to read config file: {}", e))
        }
    }
}

/// Loads configuration from command line arguments
pub fn config_from_args(args: &CliArgs) -> ConfigUpdate {
    ConfigUpdate {
        database_url: args.database_url.clone(),
        bind_address: args.bind_address.clone(),
        jwt_secret: args.jwt_secret.clone(),
        token_ttl_days: args.token_ttl_days,
        reset_token_ttl_minutes: args.reset_token_ttl_minutes,
        bcrypt_cost: args.bcrypt_cost,
        public_url: args.public_url.clone(),
        secure_cookies: args.secure_cookies,
        dev_mode: args.dev_mode,
        cors_origins: args.cors_origins.clone(),
        log_dir: args.log_dir.clone(),
        json_logs: args.json_logs,
        server_url: None,
    }
}

/// Gets the complete configuration by combining defaults with
/// values from config file, environment variables, and command line arguments
/// in order of increasing precedence
pub fn get_config(args: &CliArgs) -> Config {
    let config_dir = get_config_dir_path().and_then(|path| {
        if !path.exists() {
            info!("Config path not found at {:?}, using defaults", path);
            None
        } else {
            Some(path)
        }
    });

    let base = base_config(config_dir.clone());
    let file_update = config_from_file(config_dir.map(|dir| dir.join("config.toml"))).unwrap_or_default();

    // Apply updates in order of increasing precedence
    let config = base
        .apply_update(file_update)
        .apply_update(config_from_args(args));

    info!(
        database_url = %config.database_url,
        bind_address = %config.bind_address,
        dev_mode = config.dev_mode,
        "Final configuration"
    );

    config
}
