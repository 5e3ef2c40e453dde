//! Jobs.
//!
//! Expected schema:
//!
//! ```sql
//! CREATE TABLE jobs (
//!     id             SERIAL PRIMARY KEY,
//!     title          TEXT NOT NULL,
//!     salary         INTEGER CHECK (salary >= 0),
//!     equity         DOUBLE PRECISION CHECK (equity <= 1.0),
//!     company_handle TEXT NOT NULL REFERENCES companies ON DELETE CASCADE
//! );
//! ```

use crate::auth::{Caller, ensure_admin};
use crate::client::GenericClient;
use crate::error::{ApiError, ApiResult};
use crate::param::ParamList;
use crate::patch::{ColumnMap, partial_update};
use crate::row::{FromRow, RowExt};
use crate::validation::{ValidationCode, ValidationErrors};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tokio_postgres::Row;
use tracing::debug;

/// Application-field → column translations for partial updates.
pub const JOB_COLUMN_MAP: &ColumnMap = &[("companyHandle", "company_handle")];

const JOB_COLS: &str = "id, title, salary, equity, company_handle";

const MAX_TITLE_LEN: usize = 100;

/// A job row.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub id: i32,
    pub title: String,
    pub salary: Option<i32>,
    pub equity: Option<f64>,
    pub company_handle: String,
}

impl FromRow for Job {
    fn from_row(row: &Row) -> ApiResult<Self> {
        Ok(Self {
            id: row.try_get_column("id")?,
            title: row.try_get_column("title")?,
            salary: row.try_get_column("salary")?,
            equity: row.try_get_column("equity")?,
            company_handle: row.try_get_column("company_handle")?,
        })
    }
}

/// Body of a job-creation request.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewJob {
    pub title: String,
    #[serde(default)]
    pub salary: Option<i32>,
    #[serde(default)]
    pub equity: Option<f64>,
    pub company_handle: String,
}

impl NewJob {
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errs = ValidationErrors::default();
        if self.title.is_empty() {
            errs.push("title", ValidationCode::Required, "title is required");
        } else if self.title.len() > MAX_TITLE_LEN {
            errs.push(
                "title",
                ValidationCode::Len,
                format!("title must be at most {MAX_TITLE_LEN} characters"),
            );
        }
        if let Some(salary) = self.salary {
            if salary < 0 {
                errs.push("salary", ValidationCode::Range, "must be >= 0");
            }
        }
        if let Some(equity) = self.equity {
            if !(0.0..=1.0).contains(&equity) {
                errs.push("equity", ValidationCode::Range, "must be between 0 and 1");
            }
        }
        if self.company_handle.is_empty() {
            errs.push(
                "companyHandle",
                ValidationCode::Required,
                "companyHandle is required",
            );
        }
        errs.into_result()
    }
}

/// Search filters; all optional, combined with AND.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobFilter {
    /// Case-insensitive substring match on the job title.
    pub title: Option<String>,
    pub min_salary: Option<i32>,
    /// When true, only jobs with a non-zero equity share.
    pub has_equity: Option<bool>,
}

/// Create a job. Admin only.
///
/// A reference to an unknown company surfaces as a foreign-key violation.
pub async fn create(
    client: &impl GenericClient,
    caller: Option<&Caller>,
    input: &NewJob,
) -> ApiResult<Job> {
    ensure_admin(caller)?;
    input.validate()?;

    let sql = format!(
        "INSERT INTO jobs (title, salary, equity, company_handle) \
         VALUES ($1, $2, $3, $4) RETURNING {JOB_COLS}"
    );
    debug!(title = %input.title, company = %input.company_handle, "creating job");
    let row = client
        .query_one(
            &sql,
            &[&input.title, &input.salary, &input.equity, &input.company_handle],
        )
        .await?;
    Job::from_row(&row)
}

/// List all jobs, ordered by id.
pub async fn find_all(client: &impl GenericClient) -> ApiResult<Vec<Job>> {
    search(client, &JobFilter::default()).await
}

/// List jobs matching `filter`, ordered by id.
pub async fn search(client: &impl GenericClient, filter: &JobFilter) -> ApiResult<Vec<Job>> {
    let (sql, params) = build_search(filter);
    let rows = client.query(&sql, &params.as_refs()).await?;
    debug!(rows = rows.len(), "job search");
    rows.iter().map(Job::from_row).collect()
}

/// List a company's jobs, ordered by id.
pub async fn find_by_company(client: &impl GenericClient, handle: &str) -> ApiResult<Vec<Job>> {
    let sql = format!("SELECT {JOB_COLS} FROM jobs WHERE company_handle = $1 ORDER BY id");
    let rows = client.query(&sql, &[&handle]).await?;
    rows.iter().map(Job::from_row).collect()
}

/// Fetch one job by id.
pub async fn get(client: &impl GenericClient, id: i32) -> ApiResult<Job> {
    let sql = format!("SELECT {JOB_COLS} FROM jobs WHERE id = $1");
    let row = client
        .query_opt(&sql, &[&id])
        .await?
        .ok_or_else(|| ApiError::not_found(format!("No job: {id}")))?;
    Job::from_row(&row)
}

/// Partially update a job. Admin only.
///
/// `data` names only the fields to change; patchable fields are `title`,
/// `salary`, and `equity`. The id and owning company are immutable.
pub async fn update(
    client: &impl GenericClient,
    caller: Option<&Caller>,
    id: i32,
    data: &Map<String, Value>,
) -> ApiResult<Job> {
    ensure_admin(caller)?;
    validate_patch(data)?;

    let (sql, params) = build_update(id, data)?;
    debug!(%id, fields = data.len(), "updating job");
    let row = client
        .query_opt(&sql, &params.as_refs())
        .await?
        .ok_or_else(|| ApiError::not_found(format!("No job: {id}")))?;
    Job::from_row(&row)
}

/// Delete a job. Admin only.
pub async fn remove(client: &impl GenericClient, caller: Option<&Caller>, id: i32) -> ApiResult<()> {
    ensure_admin(caller)?;
    let deleted = client
        .execute("DELETE FROM jobs WHERE id = $1", &[&id])
        .await?;
    if deleted == 0 {
        return Err(ApiError::not_found(format!("No job: {id}")));
    }
    debug!(%id, "job removed");
    Ok(())
}

fn build_search(filter: &JobFilter) -> (String, ParamList) {
    let mut sql = format!("SELECT {JOB_COLS} FROM jobs");
    let mut params = ParamList::new();
    let mut conditions = Vec::new();

    if let Some(title) = &filter.title {
        let idx = params.push(format!("%{title}%"));
        conditions.push(format!("title ILIKE ${idx}"));
    }
    if let Some(min) = filter.min_salary {
        let idx = params.push(min);
        conditions.push(format!("salary >= ${idx}"));
    }
    if filter.has_equity == Some(true) {
        conditions.push("equity > 0".to_string());
    }

    if !conditions.is_empty() {
        sql.push_str(" WHERE ");
        sql.push_str(&conditions.join(" AND "));
    }
    sql.push_str(" ORDER BY id");
    (sql, params)
}

fn build_update(id: i32, data: &Map<String, Value>) -> ApiResult<(String, ParamList)> {
    let clause = partial_update(data, JOB_COLUMN_MAP)?;
    let sql = format!(
        "UPDATE jobs SET {} WHERE id = ${} RETURNING {JOB_COLS}",
        clause.sql(),
        clause.next_placeholder(),
    );
    let mut params = clause.into_params();
    params.push(id);
    Ok((sql, params))
}

fn validate_patch(data: &Map<String, Value>) -> Result<(), ValidationErrors> {
    let mut errs = ValidationErrors::default();
    for (field, value) in data {
        match field.as_str() {
            "title" => match value.as_str() {
                Some(s) if s.is_empty() => {
                    errs.push(field, ValidationCode::Required, "title cannot be empty");
                }
                Some(s) if s.len() > MAX_TITLE_LEN => {
                    errs.push(
                        field,
                        ValidationCode::Len,
                        format!("title must be at most {MAX_TITLE_LEN} characters"),
                    );
                }
                Some(_) => {}
                None => errs.push(field, ValidationCode::Type, "title must be a string"),
            },
            "salary" => match value {
                Value::Null => {}
                Value::Number(n) if n.as_i64().is_some_and(|n| n >= 0) => {}
                Value::Number(_) => {
                    errs.push(field, ValidationCode::Range, "must be an integer >= 0");
                }
                _ => errs.push(field, ValidationCode::Type, "must be an integer or null"),
            },
            "equity" => match value {
                Value::Null => {}
                Value::Number(n) if n.as_f64().is_some_and(|e| (0.0..=1.0).contains(&e)) => {}
                Value::Number(_) => {
                    errs.push(field, ValidationCode::Range, "must be between 0 and 1");
                }
                _ => errs.push(field, ValidationCode::Type, "must be a number or null"),
            },
            _ => errs.push(
                field,
                ValidationCode::Unknown,
                "unknown or immutable field",
            ),
        }
    }
    errs.into_result()
}
