use std::collections::BTreeMap;
use std::str::FromStr;

use axum::body::Bytes;
use axum::extract::{FromRequest, Request};
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::error::ServiceError;

pub const MALFORMED_BODY: &str = "The request body must be a JSON object.";

/// Field-level validation failures, keyed by input field name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(BTreeMap<String, Vec<String>>);

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn has(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn messages(&self, field: &str) -> &[String] {
        self.0.get(field).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn finish(self) -> Result<(), ServiceError> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(ServiceError::Validation(self))
        }
    }

    /// Trimmed value when present and non-blank; records a `required` failure otherwise.
    pub fn required(&mut self, field: &str, value: Option<&str>) -> Option<String> {
        match present(value) {
            Some(value) => Some(value),
            None => {
                self.add(field, format!("The {} field is required.", humanize(field)));
                None
            }
        }
    }

    pub fn max_len(&mut self, field: &str, value: Option<&str>, max: usize) {
        if value.is_some_and(|value| value.chars().count() > max) {
            self.add(
                field,
                format!(
                    "The {} field must not be greater than {max} characters.",
                    humanize(field)
                ),
            );
        }
    }

    pub fn email(&mut self, field: &str, value: Option<&str>) {
        if value.is_some_and(|value| !is_valid_email(value)) {
            self.add(
                field,
                format!("The {} field must be a valid email address.", humanize(field)),
            );
        }
    }

    pub fn invalid_choice(&mut self, field: &str) {
        self.add(field, format!("The selected {} is invalid.", humanize(field)));
    }

    /// Parses an enumerated value, recording `invalid_choice` on failure.
    pub fn choice<T: FromStr>(&mut self, field: &str, value: Option<&str>) -> Option<T> {
        let value = present(value)?;
        match value.parse() {
            Ok(parsed) => Some(parsed),
            Err(_) => {
                self.invalid_choice(field);
                None
            }
        }
    }

    pub fn integer(&mut self, field: &str, value: Option<&Scalar>) -> Option<i64> {
        let value = value?;
        if value.is_blank() {
            return None;
        }
        match value.as_i64() {
            Some(parsed) => Some(parsed),
            None => {
                self.add(field, format!("The {} field must be an integer.", humanize(field)));
                None
            }
        }
    }

    pub fn between(&mut self, field: &str, value: i64, min: i64, max: i64) -> bool {
        if (min..=max).contains(&value) {
            true
        } else {
            self.add(
                field,
                format!(
                    "The {} field must be between {min} and {max}.",
                    humanize(field)
                ),
            );
            false
        }
    }

    /// Non-negative amount. Missing values are left to the caller.
    pub fn amount(&mut self, field: &str, value: Option<&Scalar>) -> Option<Decimal> {
        let value = value?;
        if value.is_blank() {
            return None;
        }
        match value.as_decimal() {
            Some(amount) if amount.is_sign_negative() && !amount.is_zero() => {
                self.add(field, format!("The {} field must be at least 0.", humanize(field)));
                None
            }
            Some(amount) => Some(amount),
            None => {
                self.add(field, format!("The {} field must be a number.", humanize(field)));
                None
            }
        }
    }
}

/// JSON scalar accepted where clients send either numbers or strings.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum Scalar {
    Number(serde_json::Number),
    Text(String),
}

impl Scalar {
    pub fn is_blank(&self) -> bool {
        matches!(self, Scalar::Text(text) if text.trim().is_empty())
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Scalar::Number(number) => number.as_i64(),
            Scalar::Text(text) => text.trim().parse().ok(),
        }
    }

    pub fn as_decimal(&self) -> Option<Decimal> {
        match self {
            Scalar::Number(number) => Decimal::from_str(&number.to_string())
                .or_else(|_| Decimal::from_scientific(&number.to_string()))
                .ok(),
            Scalar::Text(text) => Decimal::from_str(text.trim()).ok(),
        }
    }

    pub fn as_text(&self) -> String {
        match self {
            Scalar::Number(number) => number.to_string(),
            Scalar::Text(text) => text.trim().to_string(),
        }
    }
}

impl From<i64> for Scalar {
    fn from(value: i64) -> Self {
        Scalar::Number(value.into())
    }
}

impl From<&str> for Scalar {
    fn from(value: &str) -> Self {
        Scalar::Text(value.to_string())
    }
}

/// Trimmed, non-empty value.
pub fn present(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

pub fn humanize(field: &str) -> String {
    field.replace('_', " ")
}

/// Pragmatic address check: one `@`, a non-empty local part, and a dotted domain.
pub fn is_valid_email(value: &str) -> bool {
    let value = value.trim();
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && !value.chars().any(char::is_whitespace)
        && domain.split('.').count() >= 2
        && domain.split('.').all(|label| !label.is_empty())
}

/// JSON request body. An empty body reads as `{}`, and a field of the wrong
/// JSON type is reported under its own name instead of failing the request.
#[derive(Debug, Clone, Default)]
pub struct JsonForm<T>(pub T);

#[axum::async_trait]
impl<T, S> FromRequest<S> for JsonForm<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ServiceError;

    async fn from_request(request: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(request, state)
            .await
            .map_err(|_| ServiceError::rule(MALFORMED_BODY))?;
        decode_form(&bytes).map(JsonForm)
    }
}

pub fn decode_form<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, ServiceError> {
    let body = if bytes.iter().all(u8::is_ascii_whitespace) {
        Value::Null
    } else {
        serde_json::from_slice(bytes).map_err(|_| ServiceError::rule(MALFORMED_BODY))?
    };
    let fields = match body {
        Value::Object(fields) => fields,
        Value::Null => Map::new(),
        _ => return Err(ServiceError::rule(MALFORMED_BODY)),
    };
    match serde_json::from_value(Value::Object(fields.clone())) {
        Ok(form) => Ok(form),
        Err(_) => Err(field_type_errors::<T>(fields)),
    }
}

/// Decodes each field on its own to find the ones that do not fit. Form
/// types default every field, so a single-field object isolates the culprit.
fn field_type_errors<T: DeserializeOwned>(fields: Map<String, Value>) -> ServiceError {
    let mut errors = ValidationErrors::new();
    for (field, value) in fields {
        let single: Map<String, Value> = [(field.clone(), value)].into_iter().collect();
        if let Err(err) = serde_json::from_value::<T>(Value::Object(single)) {
            let detail = err.to_string();
            let rule = if detail.contains("expected a string") {
                "must be a string"
            } else if detail.contains("expected a boolean") {
                "must be true or false"
            } else {
                "is invalid"
            };
            errors.add(&field, format!("The {} field {rule}.", humanize(&field)));
        }
    }
    if errors.is_empty() {
        ServiceError::rule(MALFORMED_BODY)
    } else {
        ServiceError::Validation(errors)
    }
}
