//! Request validation for order bodies
//!
//! Both `POST /v1/orders` and `PATCH /v1/orders/{id}` carry the same full
//! record. `datetime` and `totalfee` arrive as raw JSON values so that the
//! body always reaches [`validate_order_request`]: the services check runs
//! first whatever shape the other fields have, and missing or malformed
//! fields surface as a [`ValidationError`] naming them.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::Value;
use utoipa::ToSchema;

use super::models::{OrderDraft, ServiceRef};

/// Validation errors for order request bodies
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ValidationError {
    #[error("There should be at least one service ID")]
    MissingServices,

    #[error("Date is a required field")]
    MissingDatetime,

    #[error("totalfee is a required field")]
    MissingTotalFee,

    #[error("Invalid datetime '{0}': expected RFC 3339 or epoch milliseconds")]
    InvalidDatetime(String),

    #[error("Invalid totalfee '{0}': expected a number")]
    InvalidTotalFee(String),

    #[error("totalfee must not be negative")]
    NegativeTotalFee,
}

/// Instant as sent by clients: an RFC 3339 string or epoch milliseconds
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RequestDatetime {
    Millis(i64),
    Text(String),
}

impl RequestDatetime {
    /// Interpret a raw JSON value; anything but a string or integer is invalid
    pub fn from_json(value: &Value) -> Result<Self, ValidationError> {
        RequestDatetime::deserialize(value)
            .map_err(|_| ValidationError::InvalidDatetime(value.to_string()))
    }

    pub fn to_utc(&self) -> Result<DateTime<Utc>, ValidationError> {
        match self {
            RequestDatetime::Millis(ms) => DateTime::<Utc>::from_timestamp_millis(*ms)
                .ok_or_else(|| ValidationError::InvalidDatetime(ms.to_string())),
            RequestDatetime::Text(text) => DateTime::parse_from_rfc3339(text.trim())
                .map(|dt| dt.with_timezone(&Utc))
                .map_err(|_| ValidationError::InvalidDatetime(text.clone())),
        }
    }
}

/// Order request body
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct OrderRequest {
    #[schema(value_type = Option<String>, example = "2023-07-08T09:00:02.000Z")]
    pub datetime: Option<Value>,
    #[schema(value_type = Option<f64>, example = 150)]
    pub totalfee: Option<Value>,
    pub services: Option<Vec<ServiceRef>>,
}

fn parse_total_fee(value: &Value) -> Result<Decimal, ValidationError> {
    <Decimal as Deserialize>::deserialize(value).map_err(|_| ValidationError::InvalidTotalFee(value.to_string()))
}

/// Check a request body and turn it into a draft.
///
/// The services check runs first: an empty or missing `services` list is
/// always reported as such, whatever else is wrong with the body.
pub fn validate_order_request(req: OrderRequest) -> Result<OrderDraft, ValidationError> {
    let services = match req.services {
        Some(services) if !services.is_empty() => services,
        _ => return Err(ValidationError::MissingServices),
    };

    let datetime = req
        .datetime
        .as_ref()
        .ok_or(ValidationError::MissingDatetime)
        .and_then(RequestDatetime::from_json)?
        .to_utc()?;

    let total_fee = req
        .totalfee
        .as_ref()
        .ok_or(ValidationError::MissingTotalFee)
        .and_then(parse_total_fee)?;
    if total_fee.is_sign_negative() && !total_fee.is_zero() {
        return Err(ValidationError::NegativeTotalFee);
    }

    Ok(OrderDraft {
        datetime,
        total_fee,
        services,
    })
}
