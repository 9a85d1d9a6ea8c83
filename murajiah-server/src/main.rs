use colored::Colorize;
use log::{error, info};
use murajiah_core::{DatabaseError, PgDatabase, Platform};
use murajiah_server::{logging, run_server, Config, ConfigError};
use thiserror::Error;

#[derive(Debug, Error)]
enum StartupError {
    #[error("Could not load configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("Could not initialize database: {0}")]
    Database(#[from] DatabaseError),
}

impl StartupError {
    fn hint(&self) -> String {
        match self {
            StartupError::Config(_) => {
                "Set DATABASE_URL, and make sure MURAJIAH_SERVER_PORT is a valid port if you set it."
                    .to_string()
            }
            StartupError::Database(_) => {
                "This is a database error. Make sure the Postgres instance is running and reachable, then try again."
                    .to_string()
            }
        }
    }
}

#[tokio::main]
async fn main() {
    logging::init_logger();

    if let Err(error) = start().await {
        error!(
            "{} Read the error below to troubleshoot the issue.",
            "Murajiah failed to start!".bold()
        );
        error!("{}", error);
        error!("{}", format!("Hint: {}", error.hint()).italic());
    }
}

async fn start() -> Result<(), StartupError> {
    info!("Loading configuration...");
    let config = Config::from_env()?;

    info!("Connecting to database...");
    let database = PgDatabase::new(&config.database_url).await?;

    let platform = Platform::new(database);

    info!("Initialized successfully.");
    run_server(config, platform).await;

    Ok(())
}
