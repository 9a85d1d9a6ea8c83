use std::env;
use thiserror::Error;

/// The default port the server will listen on.
pub const DEFAULT_PORT: u16 = 9460;

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub database_url: String,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("MURAJIAH_SERVER_PORT must be a number")]
    InvalidPort,
    #[error("DATABASE_URL must be set")]
    MissingDatabaseUrl,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let port = match env::var("MURAJIAH_SERVER_PORT") {
            Ok(value) => value.parse().map_err(|_| ConfigError::InvalidPort)?,
            Err(_) => DEFAULT_PORT,
        };

        let database_url = env::var("DATABASE_URL").map_err(|_| ConfigError::MissingDatabaseUrl)?;

        Ok(Self { port, database_url })
    }
}
