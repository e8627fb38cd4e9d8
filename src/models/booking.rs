//! Modelo de Booking
//!
//! Este módulo contiene el struct Booking, su estado de ciclo de vida y el
//! token de filtro por estado que usan los dashboards.

use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::user::User;
use crate::models::vehicle::Vehicle;
use crate::utils::errors::{bad_request_error, AppError};

/// Estado del booking
///
/// Los cuatro primeros valores son el ciclo de vida canónico. El servidor
/// además expone `accepted`, `rejected` y `paid` en el wire; ninguna
/// transición del cliente los produce y cualquier transición desde ellos
/// se rechaza.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Cancelled,
    Completed,
    Accepted,
    Rejected,
    Paid,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::Cancelled => "cancelled",
            BookingStatus::Completed => "completed",
            BookingStatus::Accepted => "accepted",
            BookingStatus::Rejected => "rejected",
            BookingStatus::Paid => "paid",
        }
    }

    /// Los cuatro estados del ciclo de vida canónico
    pub fn is_canonical(&self) -> bool {
        matches!(
            self,
            BookingStatus::Pending
                | BookingStatus::Confirmed
                | BookingStatus::Cancelled
                | BookingStatus::Completed
        )
    }
}

/// Acción sobre un booking, siempre evaluada junto al rol que la solicita
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookingAction {
    Accept,
    Decline,
    Cancel,
    Complete,
}

/// Estado de pago - solo superficie wire, la liquidación es externa
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Paid,
    Refunded,
}

/// Booking principal - copia efímera y no autoritativa de la entidad del servidor
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub id: Uuid,
    pub vehicle_id: Uuid,
    pub renter_id: Uuid,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub status: BookingStatus,
    pub total_amount: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_status: Option<PaymentStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner_id: Option<Uuid>,

    // Entidades embebidas pobladas por joins del API
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vehicle: Option<Vehicle>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub renter: Option<User>,
}

impl Booking {
    /// El owner del booking, directo o a través del vehicle embebido
    pub fn resolved_owner_id(&self) -> Option<Uuid> {
        match self.owner_id {
            Some(owner_id) => Some(owner_id),
            None => self.vehicle.as_ref().map(|vehicle| vehicle.owner_id),
        }
    }
}

/// Token de filtro por estado: "all" o uno de los cuatro estados canónicos
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusFilter {
    #[default]
    All,
    Status(BookingStatus),
}

impl StatusFilter {
    pub fn matches(&self, status: BookingStatus) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Status(wanted) => *wanted == status,
        }
    }
}

impl FromStr for StatusFilter {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "all" => Ok(StatusFilter::All),
            "pending" => Ok(StatusFilter::Status(BookingStatus::Pending)),
            "confirmed" => Ok(StatusFilter::Status(BookingStatus::Confirmed)),
            "cancelled" => Ok(StatusFilter::Status(BookingStatus::Cancelled)),
            "completed" => Ok(StatusFilter::Status(BookingStatus::Completed)),
            other => Err(bad_request_error(&format!(
                "Invalid status filter '{}'",
                other
            ))),
        }
    }
}
