//! Companies.
//!
//! Expected schema:
//!
//! ```sql
//! CREATE TABLE companies (
//!     handle        TEXT PRIMARY KEY CHECK (handle = lower(handle)),
//!     name          TEXT NOT NULL UNIQUE,
//!     description   TEXT NOT NULL DEFAULT '',
//!     num_employees INTEGER CHECK (num_employees >= 0),
//!     logo_url      TEXT
//! );
//! ```

use crate::auth::{Caller, ensure_admin};
use crate::client::GenericClient;
use crate::error::{ApiError, ApiResult};
use crate::param::ParamList;
use crate::patch::{ColumnMap, partial_update};
use crate::row::{FromRow, RowExt};
use crate::store::job::Job;
use crate::validation::{ValidationCode, ValidationErrors, is_handle, is_url};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tokio_postgres::Row;
use tracing::debug;

/// Application-field → column translations for partial updates.
pub const COMPANY_COLUMN_MAP: &ColumnMap = &[
    ("numEmployees", "num_employees"),
    ("logoUrl", "logo_url"),
];

const COMPANY_COLS: &str = "handle, name, description, num_employees, logo_url";

const MAX_HANDLE_LEN: usize = 25;
const MAX_NAME_LEN: usize = 60;

/// A company row.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Company {
    pub handle: String,
    pub name: String,
    pub description: String,
    pub num_employees: Option<i32>,
    pub logo_url: Option<String>,
}

impl FromRow for Company {
    fn from_row(row: &Row) -> ApiResult<Self> {
        Ok(Self {
            handle: row.try_get_column("handle")?,
            name: row.try_get_column("name")?,
            description: row.try_get_column("description")?,
            num_employees: row.try_get_column("num_employees")?,
            logo_url: row.try_get_column("logo_url")?,
        })
    }
}

/// A company together with its job listings.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyDetail {
    #[serde(flatten)]
    pub company: Company,
    pub jobs: Vec<Job>,
}

/// Body of a company-creation request.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCompany {
    pub handle: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub num_employees: Option<i32>,
    #[serde(default)]
    pub logo_url: Option<String>,
}

impl NewCompany {
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errs = ValidationErrors::default();
        if self.handle.is_empty() {
            errs.push("handle", ValidationCode::Required, "handle is required");
        } else if self.handle.len() > MAX_HANDLE_LEN {
            errs.push(
                "handle",
                ValidationCode::Len,
                format!("handle must be at most {MAX_HANDLE_LEN} characters"),
            );
        } else if !is_handle(&self.handle) {
            errs.push(
                "handle",
                ValidationCode::Format,
                "handle may only contain lowercase letters, digits, and dashes",
            );
        }
        if self.name.is_empty() {
            errs.push("name", ValidationCode::Required, "name is required");
        } else if self.name.len() > MAX_NAME_LEN {
            errs.push(
                "name",
                ValidationCode::Len,
                format!("name must be at most {MAX_NAME_LEN} characters"),
            );
        }
        if let Some(n) = self.num_employees {
            if n < 0 {
                errs.push("numEmployees", ValidationCode::Range, "must be >= 0");
            }
        }
        if let Some(u) = &self.logo_url {
            if !is_url(u) {
                errs.push("logoUrl", ValidationCode::Url, "must be a valid URL");
            }
        }
        errs.into_result()
    }
}

/// Search filters; all optional, combined with AND.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyFilter {
    /// Case-insensitive substring match on the company name.
    pub name: Option<String>,
    pub min_employees: Option<i32>,
    pub max_employees: Option<i32>,
}

/// Create a company. Admin only.
///
/// A duplicate handle fails with `BadRequest`, matching the explicit
/// pre-check; the primary-key constraint backs this up under races.
pub async fn create(
    client: &impl GenericClient,
    caller: Option<&Caller>,
    input: &NewCompany,
) -> ApiResult<Company> {
    ensure_admin(caller)?;
    input.validate()?;

    let duplicate = client
        .query_opt("SELECT handle FROM companies WHERE handle = $1", &[&input.handle])
        .await?;
    if duplicate.is_some() {
        return Err(ApiError::bad_request(format!(
            "duplicate company: {}",
            input.handle
        )));
    }

    let sql = format!(
        "INSERT INTO companies (handle, name, description, num_employees, logo_url) \
         VALUES ($1, $2, $3, $4, $5) RETURNING {COMPANY_COLS}"
    );
    debug!(handle = %input.handle, "creating company");
    let row = client
        .query_one(
            &sql,
            &[
                &input.handle,
                &input.name,
                &input.description,
                &input.num_employees,
                &input.logo_url,
            ],
        )
        .await?;
    Company::from_row(&row)
}

/// List all companies, ordered by name.
pub async fn find_all(client: &impl GenericClient) -> ApiResult<Vec<Company>> {
    search(client, &CompanyFilter::default()).await
}

/// List companies matching `filter`, ordered by name.
pub async fn search(
    client: &impl GenericClient,
    filter: &CompanyFilter,
) -> ApiResult<Vec<Company>> {
    let (sql, params) = build_search(filter)?;
    let rows = client.query(&sql, &params.as_refs()).await?;
    debug!(rows = rows.len(), "company search");
    rows.iter().map(Company::from_row).collect()
}

/// Fetch one company and its jobs.
pub async fn get(client: &impl GenericClient, handle: &str) -> ApiResult<CompanyDetail> {
    let sql = format!("SELECT {COMPANY_COLS} FROM companies WHERE handle = $1");
    let row = client
        .query_opt(&sql, &[&handle])
        .await?
        .ok_or_else(|| ApiError::not_found(format!("No company: {handle}")))?;
    let company = Company::from_row(&row)?;

    let jobs = crate::store::job::find_by_company(client, handle).await?;
    Ok(CompanyDetail { company, jobs })
}

/// Partially update a company. Admin only.
///
/// `data` names only the fields to change; patchable fields are `name`,
/// `description`, `numEmployees`, and `logoUrl`. The handle is immutable.
pub async fn update(
    client: &impl GenericClient,
    caller: Option<&Caller>,
    handle: &str,
    data: &Map<String, Value>,
) -> ApiResult<Company> {
    ensure_admin(caller)?;
    validate_patch(data)?;

    let (sql, params) = build_update(handle, data)?;
    debug!(%handle, fields = data.len(), "updating company");
    let row = client
        .query_opt(&sql, &params.as_refs())
        .await?
        .ok_or_else(|| ApiError::not_found(format!("No company: {handle}")))?;
    Company::from_row(&row)
}

/// Delete a company. Admin only.
pub async fn remove(
    client: &impl GenericClient,
    caller: Option<&Caller>,
    handle: &str,
) -> ApiResult<()> {
    ensure_admin(caller)?;
    let deleted = client
        .execute("DELETE FROM companies WHERE handle = $1", &[&handle])
        .await?;
    if deleted == 0 {
        return Err(ApiError::not_found(format!("No company: {handle}")));
    }
    debug!(%handle, "company removed");
    Ok(())
}

fn build_search(filter: &CompanyFilter) -> ApiResult<(String, ParamList)> {
    if let (Some(min), Some(max)) = (filter.min_employees, filter.max_employees) {
        if min > max {
            return Err(ApiError::bad_request(
                "minEmployees cannot exceed maxEmployees",
            ));
        }
    }

    let mut sql = format!("SELECT {COMPANY_COLS} FROM companies");
    let mut params = ParamList::new();
    let mut conditions = Vec::new();

    if let Some(name) = &filter.name {
        let idx = params.push(format!("%{name}%"));
        conditions.push(format!("name ILIKE ${idx}"));
    }
    if let Some(min) = filter.min_employees {
        let idx = params.push(min);
        conditions.push(format!("num_employees >= ${idx}"));
    }
    if let Some(max) = filter.max_employees {
        let idx = params.push(max);
        conditions.push(format!("num_employees <= ${idx}"));
    }

    if !conditions.is_empty() {
        sql.push_str(" WHERE ");
        sql.push_str(&conditions.join(" AND "));
    }
    sql.push_str(" ORDER BY name");
    Ok((sql, params))
}

fn build_update(handle: &str, data: &Map<String, Value>) -> ApiResult<(String, ParamList)> {
    let clause = partial_update(data, COMPANY_COLUMN_MAP)?;
    let sql = format!(
        "UPDATE companies SET {} WHERE handle = ${} RETURNING {COMPANY_COLS}",
        clause.sql(),
        clause.next_placeholder(),
    );
    let mut params = clause.into_params();
    params.push(handle.to_string());
    Ok((sql, params))
}

fn validate_patch(data: &Map<String, Value>) -> Result<(), ValidationErrors> {
    let mut errs = ValidationErrors::default();
    for (field, value) in data {
        match field.as_str() {
            "name" => match value.as_str() {
                Some(s) if s.is_empty() => {
                    errs.push(field, ValidationCode::Required, "name cannot be empty");
                }
                Some(s) if s.len() > MAX_NAME_LEN => {
                    errs.push(
                        field,
                        ValidationCode::Len,
                        format!("name must be at most {MAX_NAME_LEN} characters"),
                    );
                }
                Some(_) => {}
                None => errs.push(field, ValidationCode::Type, "name must be a string"),
            },
            "description" => {
                if !value.is_string() {
                    errs.push(field, ValidationCode::Type, "description must be a string");
                }
            }
            "numEmployees" => match value {
                Value::Null => {}
                Value::Number(n) if n.as_i64().is_some_and(|n| n >= 0) => {}
                Value::Number(_) => {
                    errs.push(field, ValidationCode::Range, "must be an integer >= 0");
                }
                _ => errs.push(field, ValidationCode::Type, "must be an integer or null"),
            },
            "logoUrl" => match value {
                Value::Null => {}
                Value::String(s) if is_url(s) => {}
                Value::String(_) => errs.push(field, ValidationCode::Url, "must be a valid URL"),
                _ => errs.push(field, ValidationCode::Type, "must be a string or null"),
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::testing::{NoRowsClient, UnreachableClient};
    use serde_json::json;

    fn patch(pairs: &[(&str, Value)]) -> Map<String, Value> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    fn valid_company() -> NewCompany {
        NewCompany {
            handle: "acme".into(),
            name: "Acme Corp".into(),
            description: "Makers of everything".into(),
            num_employees: Some(100),
            logo_url: Some("https://acme.example/logo.png".into()),
        }
    }

    #[test]
    fn update_sql_maps_renamed_columns() {
        let data = patch(&[("name", json!("New Name")), ("numEmployees", json!(20))]);
        let (sql, params) = build_update("acme", &data).unwrap();
        assert_eq!(
            sql,
            "UPDATE companies SET \"name\"=$1, \"num_employees\"=$2 WHERE handle = $3 \
             RETURNING handle, name, description, num_employees, logo_url"
        );
        assert_eq!(params.len(), 3);
    }

    #[test]
    fn update_sql_binds_key_after_values() {
        let data = patch(&[("logoUrl", json!("https://a.example/x.png"))]);
        let (sql, params) = build_update("acme", &data).unwrap();
        assert!(sql.contains("\"logo_url\"=$1 WHERE handle = $2"));
        assert_eq!(params.len(), 2);
    }

    #[test]
    fn empty_patch_is_rejected() {
        let err = build_update("acme", &Map::new()).unwrap_err();
        assert!(matches!(err, ApiError::BadRequest(_)));
    }

    #[test]
    fn search_without_filters_lists_all() {
        let (sql, params) = build_search(&CompanyFilter::default()).unwrap();
        assert_eq!(
            sql,
            "SELECT handle, name, description, num_employees, logo_url FROM companies \
             ORDER BY name"
        );
        assert!(params.is_empty());
    }

    #[test]
    fn search_composes_filters() {
        let filter = CompanyFilter {
            name: Some("net".into()),
            min_employees: Some(10),
            max_employees: Some(500),
        };
        let (sql, params) = build_search(&filter).unwrap();
        assert!(sql.contains(
            "WHERE name ILIKE $1 AND num_employees >= $2 AND num_employees <= $3"
        ));
        assert!(sql.ends_with("ORDER BY name"));
        assert_eq!(params.len(), 3);
    }

    #[test]
    fn search_rejects_inverted_range() {
        let filter = CompanyFilter {
            min_employees: Some(500),
            max_employees: Some(10),
            ..Default::default()
        };
        assert!(build_search(&filter).is_err());
    }

    #[test]
    fn new_company_validates() {
        assert!(valid_company().validate().is_ok());

        let bad = NewCompany {
            handle: "Not A Handle".into(),
            name: String::new(),
            description: String::new(),
            num_employees: Some(-1),
            logo_url: Some("not a url".into()),
        };
        let errs = bad.validate().unwrap_err();
        assert_eq!(errs.len(), 4);
    }

    #[test]
    fn patch_rejects_unknown_and_immutable_fields() {
        let errs = validate_patch(&patch(&[
            ("handle", json!("new-handle")),
            ("favoriteColor", json!("red")),
        ]))
        .unwrap_err();
        assert_eq!(errs.len(), 2);
        assert!(errs.iter().all(|e| e.code == ValidationCode::Unknown));
    }

    #[test]
    fn patch_type_checks_fields() {
        let errs = validate_patch(&patch(&[
            ("name", json!(null)),
            ("numEmployees", json!("many")),
            ("logoUrl", json!("nope")),
        ]))
        .unwrap_err();
        assert_eq!(errs.len(), 3);
    }

    #[test]
    fn patch_allows_nulling_nullable_fields() {
        assert!(validate_patch(&patch(&[
            ("numEmployees", json!(null)),
            ("logoUrl", json!(null)),
        ]))
        .is_ok());
    }

    #[tokio::test]
    async fn create_requires_admin() {
        let caller = Caller::user("u1");
        let err = create(&UnreachableClient, Some(&caller), &valid_company())
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Forbidden(_)));
    }

    #[tokio::test]
    async fn create_requires_authentication() {
        let err = create(&UnreachableClient, None, &valid_company())
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Unauthorized(_)));
    }

    #[tokio::test]
    async fn create_validates_before_touching_db() {
        let caller = Caller::admin("boss");
        let mut input = valid_company();
        input.handle = "UPPER".into();
        let err = create(&UnreachableClient, Some(&caller), &input)
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
    }

    #[tokio::test]
    async fn update_with_empty_body_never_reaches_db() {
        let caller = Caller::admin("boss");
        let err = update(&UnreachableClient, Some(&caller), "acme", &Map::new())
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::BadRequest(_)));
    }

    #[tokio::test]
    async fn update_missing_company_is_not_found() {
        let caller = Caller::admin("boss");
        let data = patch(&[("name", json!("New"))]);
        let err = update(&NoRowsClient, Some(&caller), "nope", &data)
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn remove_missing_company_is_not_found() {
        let caller = Caller::admin("boss");
        let err = remove(&NoRowsClient, Some(&caller), "nope").await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn get_missing_company_is_not_found() {
        let err = get(&NoRowsClient, "nope").await.unwrap_err();
        assert!(err.is_not_found());
    }
}
