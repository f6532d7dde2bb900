//! roastlog - personal coffee roast log

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use roast_tracker::cli::Cli;
use roast_tracker::config::LoggingConfig;
use roast_tracker::{commands, AppError, Config};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let json = cli.json;

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let app_error = err.downcast_ref::<AppError>();
            let code = app_error.map(AppError::exit_code).unwrap_or(1);
            if !app_error.is_some_and(AppError::is_user_error) {
                tracing::error!("Command failed: {:#}", err);
            }

            if json {
                let body = serde_json::json!({
                    "error": {
                        "code": app_error.map(AppError::code).unwrap_or("INTERNAL_ERROR"),
                        "message": err.to_string(),
                    }
                });
                println!("{}", body);
            } else {
                eprintln!("Error: {:#}", err);
            }
            ExitCode::from(code as u8)
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    // Load configuration
    dotenvy::dotenv().ok();
    let config = Config::load()
        .map_err(AppError::from)?
        .with_database_path(cli.database.clone());

    init_tracing(&config.logging);
    tracing::debug!(
        "Environment: {}, database: {}",
        config.environment,
        config.storage.database_path.display()
    );

    commands::run(cli, &config).await?;
    Ok(())
}

/// Install the subscriber; logs go to stderr so stdout stays parseable
fn init_tracing(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(logging.filter.as_str()));

    let json_layer = logging.json.then(|| {
        tracing_subscriber::fmt::layer()
            .json()
            .with_writer(std::io::stderr)
    });
    let text_layer = (!logging.json).then(|| {
        tracing_subscriber::fmt::layer()
            .with_target(false)
            .with_writer(std::io::stderr)
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(json_layer)
        .with(text_layer)
        .init();
}
