//! Shared validation primitives.
//!
//! Every schema validator is built from these checks. They push structured
//! [`FieldError`]s into a caller-owned list instead of returning early, so a
//! single validation pass reports every problem at once. Nothing here panics —
//! validation always produces a result.

use serde::{Deserialize, Serialize};

use kiban_types::{JsonMap, Priority};

/// Machine-readable error codes carried on [`FieldError`].
///
/// Route layers match on these, never on messages.
pub mod codes {
    pub const REQUIRED: &str = "required";
    pub const EMPTY: &str = "empty";
    pub const INVALID_TYPE: &str = "invalid_type";
    pub const OUT_OF_RANGE: &str = "out_of_range";
    pub const INVALID_ENUM: &str = "invalid_enum";
    pub const INVALID_JSON: &str = "invalid_json";
    pub const UNKNOWN_VARIANT: &str = "unknown_variant";
}

/// A single field-level validation failure.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    /// Data field the error refers to.
    pub field: String,
    /// Human-readable description.
    pub message: String,
    /// Machine-readable code from [`codes`].
    pub code: String,
}

impl FieldError {
    pub fn new(
        field: impl Into<String>,
        message: impl Into<String>,
        code: impl Into<String>,
    ) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            code: code.into(),
        }
    }
}

impl std::fmt::Display for FieldError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {} ({})", self.field, self.message, self.code)
    }
}

/// Structured validation result — never a panic, never an exception.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    /// True when `errors` is empty.
    pub valid: bool,
    /// Field-level failures, in check order.
    pub errors: Vec<FieldError>,
}

impl ValidationReport {
    /// A passing report.
    pub fn ok() -> Self {
        Self {
            valid: true,
            errors: Vec::new(),
        }
    }

    /// Build from a collected error list; `valid` follows from emptiness.
    pub fn from_errors(errors: Vec<FieldError>) -> Self {
        Self {
            valid: errors.is_empty(),
            errors,
        }
    }
}

// =========================================================================
// Field checks
// =========================================================================

/// Field must exist, be a string, and contain non-whitespace text.
pub fn require_non_empty_str(data: &JsonMap, field: &str, errors: &mut Vec<FieldError>) {
    match data.get(field) {
        None => errors.push(FieldError::new(
            field,
            format!("{field} is required"),
            codes::REQUIRED,
        )),
        Some(v) => match v.as_str() {
            None => errors.push(FieldError::new(
                field,
                format!("{field} must be a string"),
                codes::INVALID_TYPE,
            )),
            Some(s) if s.trim().is_empty() => errors.push(FieldError::new(
                field,
                format!("{field} must not be empty"),
                codes::EMPTY,
            )),
            Some(_) => {}
        },
    }
}

/// When present, the field must be a string.
pub fn optional_str(data: &JsonMap, field: &str, errors: &mut Vec<FieldError>) {
    if let Some(v) = data.get(field) {
        if !v.is_string() {
            errors.push(FieldError::new(
                field,
                format!("{field} must be a string"),
                codes::INVALID_TYPE,
            ));
        }
    }
}

/// When present, the field must be a boolean.
pub fn optional_bool(data: &JsonMap, field: &str, errors: &mut Vec<FieldError>) {
    if let Some(v) = data.get(field) {
        if !v.is_boolean() {
            errors.push(FieldError::new(
                field,
                format!("{field} must be a boolean"),
                codes::INVALID_TYPE,
            ));
        }
    }
}

/// When present, the field must be a number `>= min`.
pub fn optional_min_number(data: &JsonMap, field: &str, min: f64, errors: &mut Vec<FieldError>) {
    if let Some(v) = data.get(field) {
        match v.as_f64() {
            None => errors.push(FieldError::new(
                field,
                format!("{field} must be a number"),
                codes::INVALID_TYPE,
            )),
            Some(n) if n < min => errors.push(FieldError::new(
                field,
                format!("{field} must be >= {min}"),
                codes::OUT_OF_RANGE,
            )),
            Some(_) => {}
        }
    }
}

/// When present, the field must be an integer `>= min`. Rejects fractional
/// numbers — `as_i64` does not truncate.
pub fn optional_int_min(data: &JsonMap, field: &str, min: i64, errors: &mut Vec<FieldError>) {
    if let Some(v) = data.get(field) {
        match v.as_i64() {
            None => errors.push(FieldError::new(
                field,
                format!("{field} must be an integer"),
                codes::INVALID_TYPE,
            )),
            Some(n) if n < min => errors.push(FieldError::new(
                field,
                format!("{field} must be >= {min}"),
                codes::OUT_OF_RANGE,
            )),
            Some(_) => {}
        }
    }
}

/// When present, the field must be an integer within `lo..=hi`.
pub fn optional_int_range(
    data: &JsonMap,
    field: &str,
    lo: i64,
    hi: i64,
    errors: &mut Vec<FieldError>,
) {
    if let Some(v) = data.get(field) {
        match v.as_i64() {
            None => errors.push(FieldError::new(
                field,
                format!("{field} must be an integer"),
                codes::INVALID_TYPE,
            )),
            Some(n) if n < lo || n > hi => errors.push(FieldError::new(
                field,
                format!("{field} must be between {lo} and {hi}"),
                codes::OUT_OF_RANGE,
            )),
            Some(_) => {}
        }
    }
}

/// Shared body for the unit-interval checks: number within `[0, 1]`.
fn check_unit_interval(v: &serde_json::Value, field: &str, errors: &mut Vec<FieldError>) {
    match v.as_f64() {
        None => errors.push(FieldError::new(
            field,
            format!("{field} must be a number"),
            codes::INVALID_TYPE,
        )),
        Some(n) if !(0.0..=1.0).contains(&n) => errors.push(FieldError::new(
            field,
            format!("{field} must be between 0 and 1"),
            codes::OUT_OF_RANGE,
        )),
        Some(_) => {}
    }
}

/// When present, the field must be a number within `[0, 1]`.
pub fn optional_unit_interval(data: &JsonMap, field: &str, errors: &mut Vec<FieldError>) {
    if let Some(v) = data.get(field) {
        check_unit_interval(v, field, errors);
    }
}

/// Field must exist and be a number within `[0, 1]`.
pub fn require_unit_interval(data: &JsonMap, field: &str, errors: &mut Vec<FieldError>) {
    match data.get(field) {
        None => errors.push(FieldError::new(
            field,
            format!("{field} is required"),
            codes::REQUIRED,
        )),
        Some(v) => check_unit_interval(v, field, errors),
    }
}

/// When present, the field must parse as a [`Priority`] (case-insensitive).
pub fn optional_priority(data: &JsonMap, field: &str, errors: &mut Vec<FieldError>) {
    if let Some(v) = data.get(field) {
        match v.as_str() {
            None => errors.push(FieldError::new(
                field,
                format!("{field} must be a string"),
                codes::INVALID_TYPE,
            )),
            Some(s) if Priority::from_str(s).is_none() => errors.push(FieldError::new(
                field,
                format!("{field} must be one of low, medium, high, critical"),
                codes::INVALID_ENUM,
            )),
            Some(_) => {}
        }
    }
}

/// Field must exist and be a string that parses as JSON.
///
/// Database blocks carry their structured payloads pre-serialized; this is the
/// parse check that keeps them loadable.
pub fn require_json_str(data: &JsonMap, field: &str, errors: &mut Vec<FieldError>) {
    match data.get(field) {
        None => errors.push(FieldError::new(
            field,
            format!("{field} is required"),
            codes::REQUIRED,
        )),
        Some(v) => match v.as_str() {
            None => errors.push(FieldError::new(
                field,
                format!("{field} must be a JSON string"),
                codes::INVALID_TYPE,
            )),
            Some(s) => {
                if serde_json::from_str::<serde_json::Value>(s).is_err() {
                    errors.push(FieldError::new(
                        field,
                        format!("{field} must parse as JSON"),
                        codes::INVALID_JSON,
                    ));
                }
            }
        },
    }
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn map(pairs: &[(&str, serde_json::Value)]) -> JsonMap {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_require_non_empty_str() {
        let mut errors = Vec::new();
        require_non_empty_str(&map(&[]), "content", &mut errors);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].code, codes::REQUIRED);
        assert_eq!(errors[0].field, "content");

        errors.clear();
        require_non_empty_str(&map(&[("content", json!(42))]), "content", &mut errors);
        assert_eq!(errors[0].code, codes::INVALID_TYPE);

        errors.clear();
        require_non_empty_str(&map(&[("content", json!("   "))]), "content", &mut errors);
        assert_eq!(errors[0].code, codes::EMPTY);

        errors.clear();
        require_non_empty_str(&map(&[("content", json!("hi"))]), "content", &mut errors);
        assert!(errors.is_empty());
    }

    #[test]
    fn test_optional_checks_skip_missing() {
        let mut errors = Vec::new();
        let empty = map(&[]);
        optional_str(&empty, "language", &mut errors);
        optional_bool(&empty, "completed", &mut errors);
        optional_min_number(&empty, "width", 0.0, &mut errors);
        optional_int_min(&empty, "wipLimit", 0, &mut errors);
        optional_unit_interval(&empty, "confidence", &mut errors);
        optional_priority(&empty, "priority", &mut errors);
        assert!(errors.is_empty());
    }

    #[test]
    fn test_optional_min_number() {
        let mut errors = Vec::new();
        optional_min_number(&map(&[("width", json!(-1))]), "width", 0.0, &mut errors);
        assert_eq!(errors[0].code, codes::OUT_OF_RANGE);

        errors.clear();
        optional_min_number(&map(&[("width", json!("wide"))]), "width", 0.0, &mut errors);
        assert_eq!(errors[0].code, codes::INVALID_TYPE);

        errors.clear();
        optional_min_number(&map(&[("width", json!(0))]), "width", 0.0, &mut errors);
        assert!(errors.is_empty());
    }

    #[test]
    fn test_optional_int_min_rejects_fractions() {
        let mut errors = Vec::new();
        optional_int_min(&map(&[("wipLimit", json!(1.5))]), "wipLimit", 0, &mut errors);
        assert_eq!(errors[0].code, codes::INVALID_TYPE);

        errors.clear();
        optional_int_min(&map(&[("wipLimit", json!(-2))]), "wipLimit", 0, &mut errors);
        assert_eq!(errors[0].code, codes::OUT_OF_RANGE);

        errors.clear();
        optional_int_min(&map(&[("wipLimit", json!(3))]), "wipLimit", 0, &mut errors);
        assert!(errors.is_empty());
    }

    #[test]
    fn test_optional_int_range() {
        let mut errors = Vec::new();
        optional_int_range(&map(&[("level", json!(0))]), "level", 1, 6, &mut errors);
        assert_eq!(errors[0].code, codes::OUT_OF_RANGE);

        errors.clear();
        optional_int_range(&map(&[("level", json!(7))]), "level", 1, 6, &mut errors);
        assert_eq!(errors[0].code, codes::OUT_OF_RANGE);

        errors.clear();
        for level in 1..=6 {
            optional_int_range(&map(&[("level", json!(level))]), "level", 1, 6, &mut errors);
        }
        assert!(errors.is_empty());
    }

    #[test]
    fn test_unit_interval() {
        let mut errors = Vec::new();
        require_unit_interval(&map(&[]), "confidence", &mut errors);
        assert_eq!(errors[0].code, codes::REQUIRED);

        errors.clear();
        optional_unit_interval(&map(&[("confidence", json!(1.01))]), "confidence", &mut errors);
        assert_eq!(errors[0].code, codes::OUT_OF_RANGE);

        errors.clear();
        optional_unit_interval(&map(&[("confidence", json!(0.5))]), "confidence", &mut errors);
        optional_unit_interval(&map(&[("confidence", json!(0))]), "confidence", &mut errors);
        optional_unit_interval(&map(&[("confidence", json!(1))]), "confidence", &mut errors);
        assert!(errors.is_empty());
    }

    #[test]
    fn test_optional_priority() {
        let mut errors = Vec::new();
        optional_priority(&map(&[("priority", json!("HIGH"))]), "priority", &mut errors);
        assert!(errors.is_empty());

        optional_priority(&map(&[("priority", json!("urgent"))]), "priority", &mut errors);
        assert_eq!(errors[0].code, codes::INVALID_ENUM);

        errors.clear();
        optional_priority(&map(&[("priority", json!(2))]), "priority", &mut errors);
        assert_eq!(errors[0].code, codes::INVALID_TYPE);
    }

    #[test]
    fn test_require_json_str() {
        let mut errors = Vec::new();
        require_json_str(&map(&[("properties", json!("{\"a\":1}"))]), "properties", &mut errors);
        assert!(errors.is_empty());

        require_json_str(&map(&[("properties", json!("{nope"))]), "properties", &mut errors);
        assert_eq!(errors[0].code, codes::INVALID_JSON);

        errors.clear();
        require_json_str(&map(&[]), "properties", &mut errors);
        assert_eq!(errors[0].code, codes::REQUIRED);
    }

    #[test]
    fn test_report_from_errors() {
        assert!(ValidationReport::ok().valid);
        let report = ValidationReport::from_errors(vec![FieldError::new(
            "content",
            "content is required",
            codes::REQUIRED,
        )]);
        assert!(!report.valid);
        assert_eq!(report.errors.len(), 1);
    }

    #[test]
    fn test_report_serde_shape() {
        let report = ValidationReport::from_errors(vec![FieldError::new(
            "level",
            "level must be between 1 and 6",
            codes::OUT_OF_RANGE,
        )]);
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["valid"], json!(false));
        assert_eq!(json["errors"][0]["field"], json!("level"));
        assert_eq!(json["errors"][0]["code"], json!("out_of_range"));
    }
}
