//! Connection pool setup.

use crate::error::{ApiError, ApiResult};
use deadpool_postgres::{Manager, ManagerConfig, Pool, RecyclingMethod};
use tokio_postgres::NoTls;

/// Create a connection pool from a database URL.
///
/// Uses `NoTls` and a small default size, suitable for local development and
/// tests. Pool sizing beyond `max_size` is the deployment's concern.
pub fn create_pool(database_url: &str) -> ApiResult<Pool> {
    create_pool_with_config(database_url, 16)
}

/// Create a connection pool with a custom maximum size.
pub fn create_pool_with_config(database_url: &str, max_size: usize) -> ApiResult<Pool> {
    let pg_config: tokio_postgres::Config = database_url
        .parse()
        .map_err(|e: tokio_postgres::Error| ApiError::Connection(e.to_string()))?;

    let manager_config = ManagerConfig {
        recycling_method: RecyclingMethod::Fast,
    };
    let mgr = Manager::from_config(pg_config, NoTls, manager_config);
    Pool::builder(mgr)
        .max_size(max_size)
        .build()
        .map_err(|e| ApiError::Pool(e.to_string()))
}
