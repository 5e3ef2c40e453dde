//! Partial-update SET clause generation.
//!
//! A PATCH body names only the fields it wants to change. [`partial_update`]
//! turns that field→value mapping into a parameterized `SET` clause and the
//! positionally aligned parameter list, so every entity's update path shares
//! one injection-safe code path:
//!
//! ```ignore
//! let clause = partial_update(&data, &[("numEmployees", "num_employees")])?;
//! let sql = format!(
//!     "UPDATE companies SET {} WHERE handle = ${} RETURNING ...",
//!     clause.sql(),
//!     clause.next_placeholder(),
//! );
//! let mut params = clause.into_params();
//! params.push(handle.to_string());
//! client.query_opt(&sql, &params.as_refs()).await?;
//! ```

use crate::error::{ApiError, ApiResult};
use crate::ident::quote_ident;
use crate::param::{JsonScalar, ParamList};
use serde_json::{Map, Value};

/// A static application-field → storage-column translation table.
///
/// Fields not present use their application name as the column name.
pub type ColumnMap = [(&'static str, &'static str)];

/// A generated `SET` clause and its positionally aligned parameters.
#[derive(Clone, Debug)]
pub struct SetClause {
    set_sql: String,
    params: ParamList,
}

impl SetClause {
    /// The comma-joined `"column"=$N` fragments, without the `SET` keyword.
    pub fn sql(&self) -> &str {
        &self.set_sql
    }

    /// The parameters, in placeholder order: the Nth value binds to `$N`.
    pub fn params(&self) -> &ParamList {
        &self.params
    }

    /// Number of generated fragments (equals the number of parameters).
    pub fn len(&self) -> usize {
        self.params.len()
    }

    /// Always false: an empty update request never produces a clause.
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// The next free placeholder index (`len + 1`).
    ///
    /// Callers appending further parameters (typically the WHERE-clause key)
    /// must continue numbering from here.
    pub fn next_placeholder(&self) -> usize {
        self.params.len() + 1
    }

    /// Consume the clause, yielding the parameter list for extension.
    pub fn into_params(self) -> ParamList {
        self.params
    }
}

/// Build a `SET` clause for a partial update.
///
/// For each field in `data`, in iteration order, the column name is resolved
/// through `columns` (falling back to the field name itself), quoted, and
/// rendered as `"column"=$N` with N counting up from 1. The returned
/// parameters hold the corresponding values in the same order; nothing is
/// reordered or deduplicated.
///
/// An empty `data` is a caller error and fails with
/// [`ApiError::BadRequest`]. Value typing is not checked here; the upstream
/// body validator owns that.
pub fn partial_update(data: &Map<String, Value>, columns: &ColumnMap) -> ApiResult<SetClause> {
    if data.is_empty() {
        return Err(ApiError::bad_request("no data to update"));
    }

    let mut fragments = Vec::with_capacity(data.len());
    let mut params = ParamList::new();
    for (field, value) in data {
        let column = columns
            .iter()
            .find(|(app_name, _)| *app_name == field.as_str())
            .map_or(field.as_str(), |(_, col)| *col);
        let idx = params.push(JsonScalar::new(value.clone()));
        fragments.push(format!("{}=${}", quote_ident(column)?, idx));
    }

    Ok(SetClause {
        set_sql: fragments.join(", "),
        params,
    })
}
