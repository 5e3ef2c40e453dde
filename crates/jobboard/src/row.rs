//! Row mapping traits.

use crate::error::ApiResult;
use tokio_postgres::Row;

/// Trait for converting a database row into a Rust struct.
pub trait FromRow: Sized {
    /// Convert a database row into Self.
    fn from_row(row: &Row) -> ApiResult<Self>;
}

/// Extension trait for Row to provide typed access.
pub trait RowExt {
    /// Try to get a column value, returning [`crate::ApiError::Decode`] on failure.
    fn try_get_column<T>(&self, column: &str) -> ApiResult<T>
    where
        T: for<'a> tokio_postgres::types::FromSql<'a>;
}

impl RowExt for Row {
    fn try_get_column<T>(&self, column: &str) -> ApiResult<T>
    where
        T: for<'a> tokio_postgres::types::FromSql<'a>,
    {
        self.try_get(column)
            .map_err(|e| crate::error::ApiError::decode(column, e.to_string()))
    }
}
