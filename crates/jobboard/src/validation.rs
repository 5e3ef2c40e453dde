//! Request-body validation.
//!
//! Inputs are validated before any SQL is generated; all field errors for a
//! body are collected into one [`ValidationErrors`] so the caller sees every
//! problem at once rather than one per round trip.

use serde::Serialize;
use std::sync::OnceLock;

/// A machine-friendly validation code.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationCode {
    Required,
    Len,
    Range,
    Format,
    Url,
    Type,
    Unknown,
}

impl ValidationCode {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Required => "required",
            Self::Len => "len",
            Self::Range => "range",
            Self::Format => "format",
            Self::Url => "url",
            Self::Type => "type",
            Self::Unknown => "unknown",
        }
    }
}

impl Serialize for ValidationCode {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

/// A single field validation error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationError {
    pub field: String,
    pub code: ValidationCode,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, code: ValidationCode, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            code,
            message: message.into(),
        }
    }
}

/// A collection of validation errors.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationErrors {
    pub items: Vec<ValidationError>,
}

impl ValidationErrors {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn push(&mut self, field: impl Into<String>, code: ValidationCode, message: impl Into<String>) {
        self.items.push(ValidationError::new(field, code, message));
    }

    pub fn iter(&self) -> impl Iterator<Item = &ValidationError> {
        self.items.iter()
    }

    /// Return `Ok(())` when no errors were collected.
    pub fn into_result(self) -> Result<(), Self> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl std::fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, err) in self.items.iter().enumerate() {
            if i > 0 {
                write!(f, "; ")?;
            }
            write!(f, "{}: {}", err.field, err.message)?;
        }
        Ok(())
    }
}

/// Company handles: lowercase letters, digits, and dashes.
pub fn is_handle(s: &str) -> bool {
    static HANDLE_RE: OnceLock<regex::Regex> = OnceLock::new();
    HANDLE_RE
        .get_or_init(|| {
            regex::Regex::new(r"^[a-z0-9-]+$").expect("invalid built-in handle regex")
        })
        .is_match(s)
}

pub fn is_url(s: &str) -> bool {
    url::Url::parse(s).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collects_multiple_errors() {
        let mut errs = ValidationErrors::default();
        errs.push("name", ValidationCode::Required, "name is required");
        errs.push("numEmployees", ValidationCode::Range, "must be >= 0");
        assert_eq!(errs.len(), 2);
        assert!(errs.into_result().is_err());
    }

    #[test]
    fn empty_errors_are_ok() {
        assert!(ValidationErrors::default().into_result().is_ok());
    }

    #[test]
    fn display_joins_fields() {
        let mut errs = ValidationErrors::default();
        errs.push("name", ValidationCode::Required, "name is required");
        errs.push("logoUrl", ValidationCode::Url, "must be a valid URL");
        assert_eq!(
            errs.to_string(),
            "name: name is required; logoUrl: must be a valid URL"
        );
    }

    #[test]
    fn serializes_codes_as_strings() {
        let err = ValidationError::new("handle", ValidationCode::Format, "bad handle");
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["code"], "format");
    }

    #[test]
    fn handle_format() {
        assert!(is_handle("acme-corp"));
        assert!(is_handle("a1"));
        assert!(!is_handle("Acme"));
        assert!(!is_handle("acme corp"));
        assert!(!is_handle(""));
    }

    #[test]
    fn url_format() {
        assert!(is_url("https://example.com/logo.png"));
        assert!(!is_url("not a url"));
    }
}
