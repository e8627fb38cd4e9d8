//! DTOs de Booking
//!
//! Las fechas viajan como strings `yyyy-MM-dd`, igual que las emite el
//! formulario de reserva.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::booking::BookingStatus;
use crate::utils::errors::{bad_request_error, AppResult};
use crate::utils::validation::validate_date;

/// Request para crear un booking
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateBookingRequest {
    pub vehicle_id: Uuid,

    #[validate(custom = "crate::utils::validation::validate_date_str")]
    pub start_date: String,

    #[validate(custom = "crate::utils::validation::validate_date_str")]
    pub end_date: String,
}

impl CreateBookingRequest {
    /// Construir el request a partir de fechas ya tipadas
    pub fn new(vehicle_id: Uuid, start_date: NaiveDate, end_date: NaiveDate) -> Self {
        Self {
            vehicle_id,
            start_date: start_date.format("%Y-%m-%d").to_string(),
            end_date: end_date.format("%Y-%m-%d").to_string(),
        }
    }

    /// Fechas parseadas del formato wire
    pub fn parsed_dates(&self) -> AppResult<(NaiveDate, NaiveDate)> {
        let start = validate_date(&self.start_date)
            .map_err(|_| bad_request_error("startDate must be in yyyy-MM-dd format"))?;
        let end = validate_date(&self.end_date)
            .map_err(|_| bad_request_error("endDate must be in yyyy-MM-dd format"))?;
        Ok((start, end))
    }
}

/// Request para actualizar el estado de un booking
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBookingStatusRequest {
    pub status: BookingStatus,
}
