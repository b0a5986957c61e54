//! Order record types

use std::collections::BTreeSet;
use std::fmt;

use chrono::{DateTime, SecondsFormat, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize, Serializer};
use utoipa::ToSchema;

/// Integer key into the external service catalog
pub type ServiceId = i64;

/// Opaque order identifier (ULID string), assigned on creation
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
pub struct OrderId(String);

impl OrderId {
    /// Generate a fresh, time-sortable id
    pub fn generate() -> Self {
        Self(ulid::Ulid::new().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for OrderId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for OrderId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Reference to one booked service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ServiceRef {
    #[serde(rename = "serviceId")]
    #[schema(example = 456)]
    pub service_id: ServiceId,
}

impl ServiceRef {
    pub fn new(service_id: ServiceId) -> Self {
        Self { service_id }
    }
}

/// Validated order fields, written as a whole by both create and update
#[derive(Debug, Clone, PartialEq)]
pub struct OrderDraft {
    pub datetime: DateTime<Utc>,
    pub total_fee: Decimal,
    pub services: Vec<ServiceRef>,
}

impl OrderDraft {
    /// Distinct service ids, ascending
    pub fn service_ids(&self) -> BTreeSet<ServiceId> {
        self.services.iter().map(|s| s.service_id).collect()
    }
}

/// A stored booking
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct Order {
    #[schema(value_type = String, example = "01HZX3J4Y8T6Q0C7W9K2M5N1PB")]
    pub id: OrderId,
    #[serde(serialize_with = "serialize_instant")]
    #[schema(value_type = String, example = "2023-07-08T09:00:02.000Z")]
    pub datetime: DateTime<Utc>,
    #[serde(rename = "totalfee", with = "rust_decimal::serde::float")]
    #[schema(value_type = f64, example = 150)]
    pub total_fee: Decimal,
    pub services: Vec<ServiceRef>,
}

impl Order {
    pub fn from_draft(id: OrderId, draft: OrderDraft) -> Self {
        Self {
            id,
            datetime: draft.datetime,
            total_fee: draft.total_fee,
            services: draft.services,
        }
    }

    pub fn service_ids(&self) -> BTreeSet<ServiceId> {
        self.services.iter().map(|s| s.service_id).collect()
    }
}

/// Instants go out as `2023-07-08T09:00:02.000Z`
fn serialize_instant<S>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&value.to_rfc3339_opts(SecondsFormat::Millis, true))
}
