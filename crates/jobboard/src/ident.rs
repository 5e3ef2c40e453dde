//! Safe SQL identifier quoting.
//!
//! Column names reaching the SQL generator come from per-entity column maps
//! or, for unmapped fields, from caller-supplied field names. Quoting makes
//! reserved words and mixed-case names usable and keeps a hostile field name
//! inert: inside double quotes the only special character is `"` itself,
//! which is escaped by doubling.

use crate::error::{ApiError, ApiResult};

/// Render `name` as a double-quoted Postgres identifier.
///
/// Embedded `"` is escaped as `""`. Empty names and names containing NUL are
/// rejected.
pub fn quote_ident(name: &str) -> ApiResult<String> {
    if name.is_empty() {
        return Err(ApiError::bad_request("empty identifier"));
    }
    if name.contains('\0') {
        return Err(ApiError::bad_request(
            "identifier cannot contain NUL character",
        ));
    }

    let mut out = String::with_capacity(name.len() + 2);
    out.push('"');
    for ch in name.chars() {
        if ch == '"' {
            out.push('"');
            out.push('"');
        } else {
            out.push(ch);
        }
    }
    out.push('"');
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quotes_plain_name() {
        assert_eq!(quote_ident("first_name").unwrap(), r#""first_name""#);
    }

    #[test]
    fn preserves_case() {
        assert_eq!(quote_ident("logoUrl").unwrap(), r#""logoUrl""#);
    }

    #[test]
    fn tolerates_reserved_words() {
        assert_eq!(quote_ident("order").unwrap(), r#""order""#);
    }

    #[test]
    fn escapes_embedded_quote() {
        assert_eq!(quote_ident(r#"has"quote"#).unwrap(), r#""has""quote""#);
    }

    #[test]
    fn neutralizes_injection_attempt() {
        let quoted = quote_ident(r#"x"=$1; DROP TABLE jobs; --"#).unwrap();
        assert_eq!(quoted, r#""x""=$1; DROP TABLE jobs; --""#);
    }

    #[test]
    fn rejects_empty() {
        assert!(quote_ident("").is_err());
    }

    #[test]
    fn rejects_nul() {
        assert!(quote_ident("a\0b").is_err());
    }
}
