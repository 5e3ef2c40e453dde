//! Convenience re-exports for callers of the data layer.

pub use crate::auth::{Caller, Role};
pub use crate::client::GenericClient;
pub use crate::error::{ApiError, ApiResult};
pub use crate::patch::partial_update;
pub use crate::row::{FromRow, RowExt};
pub use crate::store::company::{Company, CompanyFilter, NewCompany};
pub use crate::store::job::{Job, JobFilter, NewJob};

#[cfg(feature = "pool")]
pub use crate::pool::create_pool;
