//! Boundary validation for admin payloads.
//!
//! Request bodies arrive as arbitrary JSON. Each input type implements
//! [`FromPayload`] using a [`PayloadReader`], which collects every problem
//! it finds so the client receives a full list instead of the first failure.

use std::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;
use serde_json::{Map, Value};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ValidationErrors {
    errors: Vec<FieldError>,
}

impl ValidationErrors {
    pub fn push(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(FieldError {
            field: field.into(),
            message: message.into(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn fields(&self) -> Vec<&str> {
        self.errors.iter().map(|e| e.field.as_str()).collect()
    }

    pub fn into_inner(self) -> Vec<FieldError> {
        self.errors
    }
}

impl std::fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let parts: Vec<String> = self
            .errors
            .iter()
            .map(|e| format!("{}: {}", e.field, e.message))
            .collect();
        write!(f, "{}", parts.join("; "))
    }
}

impl std::error::Error for ValidationErrors {}

/// Typed input built from a JSON request body.
pub trait FromPayload: Sized {
    fn from_payload(payload: &Value) -> Result<Self, ValidationErrors>;
}

/// Amounts are stored as `NUMERIC(12, 2)`.
const AMOUNT_SCALE: u32 = 2;
const AMOUNT_LIMIT: i64 = 10_000_000_000;

pub struct PayloadReader<'a> {
    fields: &'a Map<String, Value>,
    errors: ValidationErrors,
}

impl<'a> PayloadReader<'a> {
    pub fn new(payload: &'a Value) -> Result<Self, ValidationErrors> {
        match payload {
            Value::Object(fields) => Ok(Self {
                fields,
                errors: ValidationErrors::default(),
            }),
            _ => {
                let mut errors = ValidationErrors::default();
                errors.push("body", "Request body must be a JSON object");
                Err(errors)
            }
        }
    }

    fn get(&self, field: &str) -> Option<&'a Value> {
        self.fields.get(field).filter(|v| !v.is_null())
    }

    pub fn required_str(&mut self, field: &str) -> String {
        match self.optional_str(field) {
            Some(value) => value,
            None => {
                if !self.has_error(field) {
                    self.errors.push(field, "This field is required");
                }
                String::new()
            }
        }
    }

    /// Missing, null and blank strings all read as `None`.
    pub fn optional_str(&mut self, field: &str) -> Option<String> {
        match self.get(field)? {
            Value::String(s) => {
                let trimmed = s.trim();
                (!trimmed.is_empty()).then(|| trimmed.to_string())
            }
            _ => {
                self.errors.push(field, "Must be a string");
                None
            }
        }
    }

    pub fn optional_i32(&mut self, field: &str) -> Option<i32> {
        let value = self.get(field)?;
        let parsed = match value {
            Value::Number(n) => n.as_i64().and_then(|n| i32::try_from(n).ok()),
            Value::String(s) if s.trim().is_empty() => return None,
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        };
        if parsed.is_none() {
            self.errors.push(field, "Must be an integer");
        }
        parsed
    }

    pub fn i32_or(&mut self, field: &str, default: i32) -> i32 {
        self.optional_i32(field).unwrap_or(default)
    }

    /// Non-negative money amount given as a JSON number or numeric string,
    /// rounded to cents and kept within `NUMERIC(12, 2)`.
    pub fn optional_amount(&mut self, field: &str) -> Option<Decimal> {
        let value = self.get(field)?;
        let parsed = match value {
            Value::Number(n) => Decimal::from_str(&n.to_string()).ok(),
            Value::String(s) if s.trim().is_empty() => return None,
            Value::String(s) => Decimal::from_str(s.trim()).ok(),
            _ => None,
        };
        match parsed {
            Some(d) if d.is_sign_negative() => {
                self.errors.push(field, "Must not be negative");
                None
            }
            Some(d) => {
                let rounded = d.round_dp_with_strategy(AMOUNT_SCALE, RoundingStrategy::MidpointAwayFromZero);
                if rounded >= Decimal::from(AMOUNT_LIMIT) {
                    self.errors.push(field, "Must be less than 10000000000");
                    return None;
                }
                Some(rounded)
            }
            None => {
                self.errors.push(field, "Must be a number");
                None
            }
        }
    }

    pub fn bool_or(&mut self, field: &str, default: bool) -> bool {
        match self.get(field) {
            None => default,
            Some(Value::Bool(b)) => *b,
            Some(Value::String(s)) if s == "true" => true,
            Some(Value::String(s)) if s == "false" => false,
            Some(_) => {
                self.errors.push(field, "Must be a boolean");
                default
            }
        }
    }

    /// Record a cross-field problem the typed readers cannot detect.
    pub fn error(&mut self, field: &str, message: &str) {
        self.errors.push(field, message);
    }

    fn has_error(&self, field: &str) -> bool {
        self.errors.errors.iter().any(|e| e.field == field)
    }

    pub fn finish<T>(self, value: T) -> Result<T, ValidationErrors> {
        if self.errors.is_empty() {
            Ok(value)
        } else {
            Err(self.errors)
        }
    }
}

/// Lowercased slug built from letters and digits, other runs become `-`.
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    for c in text.chars() {
        if c.is_alphanumeric() {
            slug.extend(c.to_lowercase());
        } else if !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }
    while slug.ends_with('-') {
        slug.pop();
    }
    slug
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn rejects_non_object_body() {
        let err = PayloadReader::new(&json!([1, 2])).err().unwrap();
        assert_eq!(err.fields(), vec!["body"]);
    }

    #[test]
    fn collects_all_errors() {
        let body = json!({ "name": "  ", "price": "abc", "sort_order": 1.5, "is_active": "yes" });
        let mut reader = PayloadReader::new(&body).unwrap();
        reader.required_str("name");
        reader.optional_amount("price");
        reader.optional_i32("sort_order");
        reader.bool_or("is_active", true);
        let err = reader.finish(()).unwrap_err();
        assert_eq!(err.fields(), vec!["name", "price", "sort_order", "is_active"]);
    }

    #[test]
    fn numeric_strings_are_accepted() {
        let body = json!({ "category_id": " 7 ", "price": "1250.50", "count": 3 });
        let mut reader = PayloadReader::new(&body).unwrap();
        assert_eq!(reader.optional_i32("category_id"), Some(7));
        assert_eq!(reader.optional_amount("price"), Some(Decimal::new(125050, 2)));
        assert_eq!(reader.i32_or("count", 0), 3);
        assert!(reader.finish(()).is_ok());
    }

    #[test]
    fn nulls_and_blanks_are_absent() {
        let body = json!({ "description": null, "price": "", "category_id": "" });
        let mut reader = PayloadReader::new(&body).unwrap();
        assert_eq!(reader.optional_str("description"), None);
        assert_eq!(reader.optional_amount("price"), None);
        assert_eq!(reader.optional_i32("category_id"), None);
        assert!(reader.finish(()).is_ok());
    }

    #[test]
    fn negative_price_is_rejected() {
        let body = json!({ "price": -5 });
        let mut reader = PayloadReader::new(&body).unwrap();
        reader.optional_amount("price");
        assert_eq!(reader.finish(()).unwrap_err().fields(), vec!["price"]);
    }

    #[test]
    fn amounts_fit_the_price_column() {
        let body = json!({ "a": "12.345", "b": 0.125, "c": "9999999999.99", "d": 1e13, "e": "9999999999.995" });
        let mut reader = PayloadReader::new(&body).unwrap();
        assert_eq!(reader.optional_amount("a"), Some(Decimal::new(1235, 2)));
        assert_eq!(reader.optional_amount("b"), Some(Decimal::new(13, 2)));
        assert_eq!(reader.optional_amount("c"), Some(Decimal::new(999999999999, 2)));
        assert_eq!(reader.optional_amount("d"), None);
        assert_eq!(reader.optional_amount("e"), None);
        assert_eq!(reader.finish(()).unwrap_err().fields(), vec!["d", "e"]);
    }

    #[test]
    fn wrong_type_for_required_string_reports_once() {
        let body = json!({ "name": 42 });
        let mut reader = PayloadReader::new(&body).unwrap();
        reader.required_str("name");
        let err = reader.finish(()).unwrap_err();
        assert_eq!(err.into_inner(), vec![FieldError { field: "name".into(), message: "Must be a string".into() }]);
    }

    #[test]
    fn slugs() {
        assert_eq!(slugify("Black Granite  Monument #3"), "black-granite-monument-3");
        assert_eq!(slugify("  --Vertical stele-- "), "vertical-stele");
        assert_eq!(slugify("Памятник Гранит"), "памятник-гранит");
    }
}
