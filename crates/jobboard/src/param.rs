//! Ordered parameter storage for generated SQL.

use bytes::BytesMut;
use serde_json::Value;
use std::sync::Arc;
use tokio_postgres::types::{IsNull, ToSql, Type};

/// A clone-friendly parameter wrapper using Arc.
#[derive(Clone)]
pub struct Param(Arc<dyn ToSql + Send + Sync>);

impl Param {
    /// Create a new parameter from any ToSql value.
    pub fn new<T: ToSql + Send + Sync + 'static>(value: T) -> Self {
        Param(Arc::new(value))
    }

    /// Get a reference to the inner value as a ToSql trait object.
    pub fn as_dyn(&self) -> &(dyn ToSql + Sync) {
        &*self.0 as &(dyn ToSql + Sync)
    }
}

impl std::fmt::Debug for Param {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Param").field(&"<dyn ToSql>").finish()
    }
}

/// An ordered collection of parameters, positionally aligned with the
/// `$1, $2, ...` placeholders of the statement it belongs to.
#[derive(Clone, Debug, Default)]
pub struct ParamList {
    params: Vec<Param>,
}

impl ParamList {
    /// Create a new empty parameter list.
    pub fn new() -> Self {
        Self { params: Vec::new() }
    }

    /// Add a parameter and return its 1-based placeholder index.
    pub fn push<T: ToSql + Send + Sync + 'static>(&mut self, value: T) -> usize {
        self.params.push(Param::new(value));
        self.params.len()
    }

    /// The current parameter count.
    pub fn len(&self) -> usize {
        self.params.len()
    }

    /// Check if the list is empty.
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Get all parameters as references for tokio-postgres.
    pub fn as_refs(&self) -> Vec<&(dyn ToSql + Sync)> {
        self.params.iter().map(|p| p.as_dyn()).collect()
    }

    /// Extend this list with another list's parameters.
    pub fn extend(&mut self, other: &ParamList) {
        self.params.extend(other.params.iter().cloned());
    }
}

/// A JSON scalar bound as a statement parameter.
///
/// Partial-update values arrive as JSON and the target column type is only
/// known to the server, so encoding adapts to the `Type` handed to `to_sql`
/// during statement execution: a JSON number binds to any integer or float
/// column it fits in, a JSON string to text columns, and JSON `null` encodes
/// SQL NULL for any column. Mismatches (e.g. a string offered to an integer
/// column) fail at bind time and surface as a query error.
#[derive(Clone, Debug)]
pub struct JsonScalar(Value);

impl JsonScalar {
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    pub fn value(&self) -> &Value {
        &self.0
    }
}

impl From<Value> for JsonScalar {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

fn mismatch(value: &Value, ty: &Type) -> Box<dyn std::error::Error + Sync + Send> {
    format!("cannot bind JSON value {} to column of type {}", value, ty).into()
}

impl ToSql for JsonScalar {
    fn to_sql(
        &self,
        ty: &Type,
        out: &mut BytesMut,
    ) -> Result<IsNull, Box<dyn std::error::Error + Sync + Send>> {
        match (&self.0, ty) {
            (Value::Null, _) => Ok(IsNull::Yes),
            (Value::Bool(b), &Type::BOOL) => b.to_sql(ty, out),
            (Value::Number(n), &Type::INT2) => {
                let n = n.as_i64().ok_or_else(|| mismatch(&self.0, ty))?;
                i16::try_from(n)?.to_sql(ty, out)
            }
            (Value::Number(n), &Type::INT4) => {
                let n = n.as_i64().ok_or_else(|| mismatch(&self.0, ty))?;
                i32::try_from(n)?.to_sql(ty, out)
            }
            (Value::Number(n), &Type::INT8) => {
                n.as_i64().ok_or_else(|| mismatch(&self.0, ty))?.to_sql(ty, out)
            }
            (Value::Number(n), &Type::FLOAT4) => {
                let n = n.as_f64().ok_or_else(|| mismatch(&self.0, ty))?;
                (n as f32).to_sql(ty, out)
            }
            (Value::Number(n), &Type::FLOAT8) => {
                n.as_f64().ok_or_else(|| mismatch(&self.0, ty))?.to_sql(ty, out)
            }
            (Value::String(s), &Type::TEXT | &Type::VARCHAR) => s.to_sql(ty, out),
            (value, &Type::JSON | &Type::JSONB) => value.to_sql(ty, out),
            (value, _) => Err(mismatch(value, ty)),
        }
    }

    fn accepts(ty: &Type) -> bool {
        matches!(
            *ty,
            Type::BOOL
                | Type::INT2
                | Type::INT4
                | Type::INT8
                | Type::FLOAT4
                | Type::FLOAT8
                | Type::TEXT
                | Type::VARCHAR
                | Type::JSON
                | Type::JSONB
        )
    }

    tokio_postgres::types::to_sql_checked!();
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn push_returns_one_based_index() {
        let mut params = ParamList::new();
        assert_eq!(params.push("Aliya".to_string()), 1);
        assert_eq!(params.push(32i32), 2);
        assert_eq!(params.len(), 2);
    }

    #[test]
    fn extend_preserves_order() {
        let mut a = ParamList::new();
        a.push(1i32);
        let mut b = ParamList::new();
        b.push(2i32);
        a.extend(&b);
        assert_eq!(a.len(), 2);
    }

    #[test]
    fn scalar_accepts_common_column_types() {
        assert!(JsonScalar::accepts(&Type::BOOL));
        assert!(JsonScalar::accepts(&Type::INT4));
        assert!(JsonScalar::accepts(&Type::INT8));
        assert!(JsonScalar::accepts(&Type::FLOAT8));
        assert!(JsonScalar::accepts(&Type::TEXT));
        assert!(JsonScalar::accepts(&Type::VARCHAR));
        assert!(JsonScalar::accepts(&Type::JSONB));
        assert!(!JsonScalar::accepts(&Type::TIMESTAMPTZ));
    }

    #[test]
    fn null_encodes_sql_null_for_any_column() {
        let mut buf = BytesMut::new();
        let scalar = JsonScalar::new(Value::Null);
        let is_null = scalar.to_sql(&Type::INT4, &mut buf).unwrap();
        assert!(matches!(is_null, IsNull::Yes));
        assert!(buf.is_empty());
    }

    #[test]
    fn integer_encodes_for_int4_column() {
        let mut buf = BytesMut::new();
        let scalar = JsonScalar::new(json!(32));
        scalar.to_sql(&Type::INT4, &mut buf).unwrap();
        assert_eq!(&buf[..], &32i32.to_be_bytes());
    }

    #[test]
    fn integer_widens_for_int8_column() {
        let mut buf = BytesMut::new();
        let scalar = JsonScalar::new(json!(32));
        scalar.to_sql(&Type::INT8, &mut buf).unwrap();
        assert_eq!(&buf[..], &32i64.to_be_bytes());
    }

    #[test]
    fn string_encodes_for_text_column() {
        let mut buf = BytesMut::new();
        let scalar = JsonScalar::new(json!("Aliya"));
        scalar.to_sql(&Type::TEXT, &mut buf).unwrap();
        assert_eq!(&buf[..], b"Aliya");
    }

    #[test]
    fn string_rejected_for_integer_column() {
        let mut buf = BytesMut::new();
        let scalar = JsonScalar::new(json!("not a number"));
        assert!(scalar.to_sql(&Type::INT4, &mut buf).is_err());
    }

    #[test]
    fn fractional_number_rejected_for_integer_column() {
        let mut buf = BytesMut::new();
        let scalar = JsonScalar::new(json!(0.5));
        assert!(scalar.to_sql(&Type::INT4, &mut buf).is_err());
    }

    #[test]
    fn out_of_range_integer_rejected_for_int2_column() {
        let mut buf = BytesMut::new();
        let scalar = JsonScalar::new(json!(100_000));
        assert!(scalar.to_sql(&Type::INT2, &mut buf).is_err());
    }
}
