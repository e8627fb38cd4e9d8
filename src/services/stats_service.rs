//! Proyección de bookings para dashboards
//!
//! Este módulo contiene el filtrado por estado y los agregados que alimentan
//! el dashboard del owner y las pestañas del renter. Todo son funciones
//! puras sobre las copias locales; la colección nunca se reordena.

use rust_decimal::Decimal;
use serde::Serialize;

use crate::models::booking::{Booking, BookingStatus, StatusFilter};
use crate::models::vehicle::Vehicle;

/// Resumen para el dashboard del owner
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardStats {
    /// Ganancias acumuladas sobre bookings confirmed y completed
    pub total_earnings: Decimal,
    /// Bookings confirmed en curso
    pub active_bookings: usize,
    /// Solicitudes pending a la espera del owner
    pub pending_requests: usize,
    /// Rating medio de los vehículos que reportan rating
    pub average_rating: f64,
}

/// Conteo por estado canónico
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StatusCounts {
    pub pending: usize,
    pub confirmed: usize,
    pub cancelled: usize,
    pub completed: usize,
}

/// Subconjunto que pasa el filtro, preservando el orden de entrada
pub fn filter_bookings(bookings: &[Booking], filter: StatusFilter) -> Vec<Booking> {
    bookings
        .iter()
        .filter(|booking| filter.matches(booking.status))
        .cloned()
        .collect()
}

/// Conteo de bookings por estado canónico
pub fn count_by_status(bookings: &[Booking]) -> StatusCounts {
    let mut counts = StatusCounts::default();
    for booking in bookings {
        match booking.status {
            BookingStatus::Pending => counts.pending += 1,
            BookingStatus::Confirmed => counts.confirmed += 1,
            BookingStatus::Cancelled => counts.cancelled += 1,
            BookingStatus::Completed => counts.completed += 1,
            _ => {}
        }
    }
    counts
}

/// Ganancias acumuladas: suma de totalAmount sobre confirmed ∪ completed
pub fn total_earnings(bookings: &[Booking]) -> Decimal {
    bookings
        .iter()
        .filter(|booking| {
            matches!(
                booking.status,
                BookingStatus::Confirmed | BookingStatus::Completed
            )
        })
        .map(|booking| booking.total_amount)
        .sum()
}

/// Rating medio de los vehículos que reportan rating; 0.0 si ninguno lo hace
pub fn average_rating(vehicles: &[Vehicle]) -> f64 {
    let ratings: Vec<f64> = vehicles.iter().filter_map(|vehicle| vehicle.rating).collect();
    if ratings.is_empty() {
        return 0.0;
    }
    ratings.iter().sum::<f64>() / ratings.len() as f64
}

/// Agregados del dashboard a partir de los vehículos y bookings del owner
pub fn dashboard_stats(vehicles: &[Vehicle], bookings: &[Booking]) -> DashboardStats {
    DashboardStats {
        total_earnings: total_earnings(bookings),
        active_bookings: bookings
            .iter()
            .filter(|booking| booking.status == BookingStatus::Confirmed)
            .count(),
        pending_requests: bookings
            .iter()
            .filter(|booking| booking.status == BookingStatus::Pending)
            .count(),
        average_rating: average_rating(vehicles),
    }
}
