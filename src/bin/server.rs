use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use yakcat::auth::{hash_password, password_long_enough, MIN_PASSWORD_LEN};
use yakcat::config::{get_config, CliArgs, Config, ServerCommand};
use yakcat::state::AppState;
use yakcat::{create_app, db, repo, run_migrations, seed};

/// Sets up logging to stdout, plus a daily rolling file when `log_dir` is set
///
/// The returned guard flushes the file writer and must live until exit.
fn init_tracing(config: &Config) -> Result<Option<WorkerGuard>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug"));

    let stdout_layer = if config.json_logs {
        tracing_subscriber::fmt::layer().json().boxed()
    } else {
        tracing_subscriber::fmt::layer().compact().boxed()
    };

    let (file_layer, guard) = match &config.log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "yakcat.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = tracing_subscriber::fmt::layer()
                .json()
                .with_ansi(false)
                .with_writer(writer)
                .boxed();
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stdout_layer)
        .with(file_layer)
        .try_init()
        .map_err(|err| anyhow!(err))?;

    Ok(guard)
}

/// Wait for Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}

async fn serve(pool: Arc<db::DbPool>, config: &Config) -> Result<()> {
    let app = create_app(AppState::new(pool, config));

    let listener = TcpListener::bind(&config.bind_address)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_address))?;
    info!("Listening on {}", config.bind_address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env before clap reads them
    dotenv::dotenv().ok();

    let args = CliArgs::parse();
    let config = get_config(&args);
    let _log_guard = init_tracing(&config)?;

    config.validate().map_err(|e| anyhow!("invalid configuration: {}", e))?;
    if config.dev_mode {
        warn!("Development mode: password reset tokens are returned in API responses");
    }

    let pool = Arc::new(db::init_pool(&config.database_url)?);
    {
        let mut conn = pool.get()?;
        run_migrations(&mut conn)?;
    }

    match args.command.unwrap_or(ServerCommand::Serve) {
        ServerCommand::Serve => serve(pool, &config).await,
        ServerCommand::CreateAdmin { email, name, password } => {
            if !password_long_enough(&password) {
                return Err(anyhow!("password must be at least {} characters", MIN_PASSWORD_LEN));
            }
            let hash = hash_password(&password, config.bcrypt_cost).await?;
            let admin = repo::upsert_admin(&pool, &email, name, hash).await?;
            info!(email = %admin.get_email(), "Admin account ready");
            println!("Admin account ready: {}", admin.get_email());
            Ok(())
        }
        ServerCommand::Seed => {
            let report = seed::seed_demo_data(&pool, config.bcrypt_cost).await?;
            println!(
                "Seeded {} user(s) and {} tag(s)",
                report.users_created.len(),
                report.tags_created.len()
            );
            Ok(())
        }
    }
}
