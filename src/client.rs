//! Cliente HTTP para el API REST del marketplace
//!
//! Este módulo contiene la superficie de capacidades que consumen los
//! servicios y su implementación HTTP. Toda llamada viaja con la credencial
//! bearer; los códigos de estado se mapean a la taxonomía de errores para
//! que los llamadores distingan "sin datos" de "no permitido".

use reqwest::Client;
use uuid::Uuid;

use crate::config::environment::EnvironmentConfig;
use crate::dto::booking_dto::{CreateBookingRequest, UpdateBookingStatusRequest};
use crate::dto::vehicle_dto::{CreateVehicleRequest, SetAvailabilityRequest};
use crate::models::booking::{Booking, BookingStatus};
use crate::models::vehicle::Vehicle;
use crate::utils::errors::{AppError, AppResult};

/// Superficie de capacidades del API REST
#[async_trait::async_trait]
pub trait RentalApi: Send + Sync {
    /// Catálogo completo de vehículos
    async fn fetch_vehicles(&self, token: &str) -> AppResult<Vec<Vehicle>>;

    /// Vehículos del owner autenticado
    async fn fetch_owner_vehicles(&self, token: &str) -> AppResult<Vec<Vehicle>>;

    /// Un vehículo por id
    async fn fetch_vehicle(&self, token: &str, vehicle_id: Uuid) -> AppResult<Vehicle>;

    /// Publicar un vehículo nuevo
    async fn create_vehicle(
        &self,
        token: &str,
        request: &CreateVehicleRequest,
    ) -> AppResult<Vehicle>;

    /// Eliminar un vehículo
    async fn delete_vehicle(&self, token: &str, vehicle_id: Uuid) -> AppResult<()>;

    /// Fijar el flag de disponibilidad de un vehículo
    async fn set_vehicle_availability(
        &self,
        token: &str,
        vehicle_id: Uuid,
        availability: bool,
    ) -> AppResult<Vehicle>;

    /// Bookings del usuario autenticado, con filtro opcional por estado
    async fn fetch_bookings(
        &self,
        token: &str,
        status: Option<BookingStatus>,
    ) -> AppResult<Vec<Booking>>;

    /// Crear un booking
    async fn create_booking(
        &self,
        token: &str,
        request: &CreateBookingRequest,
    ) -> AppResult<Booking>;

    /// Actualizar el estado de un booking
    async fn update_booking_status(
        &self,
        token: &str,
        booking_id: Uuid,
        status: BookingStatus,
    ) -> AppResult<Booking>;
}

/// Cliente HTTP del API del marketplace
pub struct RentalApiClient {
    pub client: Client,
    pub base_url: String,
}

impl RentalApiClient {
    /// Crear nuevo cliente HTTP con URL base configurable
    pub fn new(base_url: String, timeout_secs: u64) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .build()?;

        Ok(Self { client, base_url })
    }

    pub fn from_config(config: &EnvironmentConfig) -> AppResult<Self> {
        Self::new(config.api_base_url.clone(), config.request_timeout_secs)
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Mapear códigos de estado a la taxonomía de errores
    async fn check_status(response: reqwest::Response) -> AppResult<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let detail = response.text().await.unwrap_or_default();
        Err(match status.as_u16() {
            401 => AppError::Unauthorized("credential rejected by the API".to_string()),
            403 => AppError::Forbidden("operation not permitted for this identity".to_string()),
            404 => AppError::NotFound(detail),
            _ => AppError::ExternalApi(format!("HTTP {}: {}", status, detail)),
        })
    }
}

#[async_trait::async_trait]
impl RentalApi for RentalApiClient {
    async fn fetch_vehicles(&self, token: &str) -> AppResult<Vec<Vehicle>> {
        let response = self
            .client
            .get(self.url("/vehicles"))
            .bearer_auth(token)
            .send()
            .await?;
        let response = Self::check_status(response).await?;
        Ok(response.json().await?)
    }

    async fn fetch_owner_vehicles(&self, token: &str) -> AppResult<Vec<Vehicle>> {
        let response = self
            .client
            .get(self.url("/vehicles/owner"))
            .bearer_auth(token)
            .send()
            .await?;
        let response = Self::check_status(response).await?;
        Ok(response.json().await?)
    }

    async fn fetch_vehicle(&self, token: &str, vehicle_id: Uuid) -> AppResult<Vehicle> {
        let response = self
            .client
            .get(self.url(&format!("/vehicles/{}", vehicle_id)))
            .bearer_auth(token)
            .send()
            .await?;
        let response = Self::check_status(response).await?;
        Ok(response.json().await?)
    }

    async fn create_vehicle(
        &self,
        token: &str,
        request: &CreateVehicleRequest,
    ) -> AppResult<Vehicle> {
        let response = self
            .client
            .post(self.url("/vehicles"))
            .bearer_auth(token)
            .json(request)
            .send()
            .await?;
        let response = Self::check_status(response).await?;
        Ok(response.json().await?)
    }

    async fn delete_vehicle(&self, token: &str, vehicle_id: Uuid) -> AppResult<()> {
        let response = self
            .client
            .delete(self.url(&format!("/vehicles/{}", vehicle_id)))
            .bearer_auth(token)
            .send()
            .await?;
        Self::check_status(response).await?;
        Ok(())
    }

    async fn set_vehicle_availability(
        &self,
        token: &str,
        vehicle_id: Uuid,
        availability: bool,
    ) -> AppResult<Vehicle> {
        let response = self
            .client
            .patch(self.url(&format!("/vehicles/{}/availability", vehicle_id)))
            .bearer_auth(token)
            .json(&SetAvailabilityRequest { availability })
            .send()
            .await?;
        let response = Self::check_status(response).await?;
        Ok(response.json().await?)
    }

    async fn fetch_bookings(
        &self,
        token: &str,
        status: Option<BookingStatus>,
    ) -> AppResult<Vec<Booking>> {
        let mut request = self.client.get(self.url("/bookings")).bearer_auth(token);
        if let Some(status) = status {
            request = request.query(&[("status", status.as_str())]);
        }

        let response = request.send().await?;
        let response = Self::check_status(response).await?;
        Ok(response.json().await?)
    }

    async fn create_booking(
        &self,
        token: &str,
        request: &CreateBookingRequest,
    ) -> AppResult<Booking> {
        let response = self
            .client
            .post(self.url("/bookings"))
            .bearer_auth(token)
            .json(request)
            .send()
            .await?;
        let response = Self::check_status(response).await?;
        Ok(response.json().await?)
    }

    async fn update_booking_status(
        &self,
        token: &str,
        booking_id: Uuid,
        status: BookingStatus,
    ) -> AppResult<Booking> {
        let response = self
            .client
            .patch(self.url(&format!("/bookings/{}/status", booking_id)))
            .bearer_auth(token)
            .json(&UpdateBookingStatusRequest { status })
            .send()
            .await?;
        let response = Self::check_status(response).await?;
        Ok(response.json().await?)
    }
}
