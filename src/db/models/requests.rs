// src/db/models/requests.rs
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::errors::ValidationError;

/// Lifecycle state of a service request.
#[derive(Debug, Default, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash, sqlx::Type, ToSchema)]
#[sqlx(type_name = "service_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ServiceStatus {
    #[default]
    Pending,
    InProgress,
    Completed,
    Cancelled,
}

impl ServiceStatus {
    pub const ALL: [ServiceStatus; 4] = [
        ServiceStatus::Pending,
        ServiceStatus::InProgress,
        ServiceStatus::Completed,
        ServiceStatus::Cancelled,
    ];

    /// Wire/display name, identical to the database label.
    pub fn as_str(self) -> &'static str {
        match self {
            ServiceStatus::Pending => "pending",
            ServiceStatus::InProgress => "in_progress",
            ServiceStatus::Completed => "completed",
            ServiceStatus::Cancelled => "cancelled",
        }
    }

    /// Terminal by convention only; nothing in the permissive policy enforces it.
    pub fn is_terminal(self) -> bool {
        matches!(self, ServiceStatus::Completed | ServiceStatus::Cancelled)
    }

    /// The dashboard only offers "Complete" for pending rows.
    pub fn can_mark_completed(self) -> bool {
        self == ServiceStatus::Pending
    }

    /// Successor states accepted under the strict transition policy.
    pub fn allowed_next(self) -> &'static [ServiceStatus] {
        match self {
            ServiceStatus::Pending => &[
                ServiceStatus::InProgress,
                ServiceStatus::Completed,
                ServiceStatus::Cancelled,
            ],
            ServiceStatus::InProgress => &[ServiceStatus::Completed, ServiceStatus::Cancelled],
            ServiceStatus::Completed | ServiceStatus::Cancelled => &[],
        }
    }

    /// Tailwind classes for the status badge.
    pub fn badge_class(self) -> &'static str {
        match self {
            ServiceStatus::Completed => "bg-green-100 text-green-800",
            ServiceStatus::InProgress => "bg-yellow-100 text-yellow-800",
            ServiceStatus::Cancelled => "bg-red-100 text-red-800",
            ServiceStatus::Pending => "bg-gray-100 text-gray-800",
        }
    }
}

impl std::fmt::Display for ServiceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One customer complaint tracked through its status.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, sqlx::FromRow, ToSchema)]
pub struct ServiceRequest {
    pub id: Uuid,
    pub customer_name: String,
    pub complaint: String,
    pub mobile: String,
    pub technician_name: String,
    pub service_date: NaiveDate,
    pub status: ServiceStatus,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Raw creation payload as submitted by the form or the JSON API.
///
/// Every field defaults to empty so a missing key surfaces as a
/// `ValidationError` instead of a deserialization rejection.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq, ToSchema)]
#[serde(default)]
pub struct NewServiceRequest {
    pub customer_name: String,
    pub complaint: String,
    pub mobile: String,
    pub technician_name: String,
    /// Calendar date, `YYYY-MM-DD`.
    pub service_date: String,
}

/// Creation fields after the required-field check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceRequestFields {
    pub customer_name: String,
    pub complaint: String,
    pub mobile: String,
    pub technician_name: String,
    pub service_date: NaiveDate,
}

/// Blank-only values count as missing; accepted values are kept as entered.
fn required(field: &'static str, value: &str) -> Result<String, ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::MissingField(field));
    }
    Ok(value.to_string())
}

impl NewServiceRequest {
    pub fn validate(&self) -> Result<ServiceRequestFields, ValidationError> {
        let customer_name = required("customer_name", &self.customer_name)?;
        let complaint = required("complaint", &self.complaint)?;
        let mobile = required("mobile", &self.mobile)?;
        let technician_name = required("technician_name", &self.technician_name)?;
        let raw_date = required("service_date", &self.service_date)?;
        let service_date = NaiveDate::parse_from_str(raw_date.trim(), "%Y-%m-%d")
            .map_err(|_| ValidationError::InvalidDate(raw_date.clone()))?;

        Ok(ServiceRequestFields {
            customer_name,
            complaint,
            mobile,
            technician_name,
            service_date,
        })
    }
}

/// Body of `PATCH /requests/{id}/status`.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, ToSchema)]
pub struct StatusUpdate {
    pub status: ServiceStatus,
}
