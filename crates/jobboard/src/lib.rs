//! # jobboard
//!
//! The Postgres data layer for a job-board REST API: two related entities
//! (companies and their job listings) with create/read/update/delete,
//! filtered search, partial updates, and admin-gated mutations.
//!
//! The HTTP surface is deliberately not here. A route layer supplies the
//! deserialized bodies and the caller identity, mounts these functions, and
//! turns [`ApiError::status_code`] into responses.
//!
//! ## Partial updates
//!
//! PATCH bodies name only the fields to change. [`patch::partial_update`]
//! turns such a body into a parameterized `SET` clause plus the positionally
//! aligned values, translating application field names to column names
//! through a per-entity map:
//!
//! ```ignore
//! use jobboard::patch::partial_update;
//!
//! let clause = partial_update(&body, &[("numEmployees", "num_employees")])?;
//! // clause.sql()    => "\"num_employees\"=$1, \"name\"=$2"
//! // clause.params() => the values, in the same order
//! ```
//!
//! ## Database handles
//!
//! Every store function takes `&impl GenericClient`; pass a
//! `tokio_postgres::Client`, an open transaction, or (with the `pool`
//! feature) a pooled deadpool client.

pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod ident;
pub mod param;
pub mod patch;
pub mod prelude;
pub mod row;
pub mod store;
pub mod validation;

pub use auth::{Caller, Role, ensure_admin, ensure_logged_in};
pub use client::GenericClient;
pub use config::AppConfig;
pub use error::{ApiError, ApiResult};
pub use param::{JsonScalar, Param, ParamList};
pub use patch::{SetClause, partial_update};
pub use row::{FromRow, RowExt};
pub use validation::{ValidationCode, ValidationError, ValidationErrors};

#[cfg(feature = "pool")]
pub mod pool;

#[cfg(feature = "pool")]
pub use pool::{create_pool, create_pool_with_config};
