//! Environment-driven application configuration.

use crate::error::{ApiError, ApiResult};
use std::env;

/// Connection settings read from the environment (`.env`-aware).
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Postgres connection URL (`DATABASE_URL`).
    pub database_url: String,
    /// Maximum pool size (`POOL_SIZE`, default 16).
    pub pool_size: usize,
}

impl AppConfig {
    /// Load configuration from the process environment.
    ///
    /// A `.env` file in the working directory is honored when present.
    pub fn from_env() -> ApiResult<Self> {
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL")
            .map_err(|_| ApiError::Config("DATABASE_URL must be set".to_string()))?;

        let pool_size = match env::var("POOL_SIZE") {
            Ok(raw) => raw
                .parse()
                .map_err(|_| ApiError::Config(format!("invalid POOL_SIZE: {raw:?}")))?,
            Err(_) => 16,
        };

        Ok(Self {
            database_url,
            pool_size,
        })
    }
}
