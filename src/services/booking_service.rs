//! Servicio de bookings
//!
//! Este módulo orquesta el ciclo de vida de los bookings: fetch del API con
//! short-circuit sin credencial, creación con validación previa a la red,
//! transiciones de estado con actualización local optimista tras el ack del
//! servidor, e hidratación de los vehicles embebidos.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::Utc;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::cache::entity_store::EntityStore;
use crate::client::RentalApi;
use crate::dto::booking_dto::CreateBookingRequest;
use crate::models::booking::{Booking, BookingAction, BookingStatus, StatusFilter};
use crate::models::user::UserRole;
use crate::models::vehicle::Vehicle;
use crate::notifications::NotificationCenter;
use crate::services::authorization_service::AuthorizationService;
use crate::services::refresh::RefreshHandle;
use crate::services::stats_service::{self, DashboardStats, StatusCounts};
use crate::state::SessionState;
use crate::utils::errors::{
    bad_request_error, not_found_error, unauthorized_error, AppError, AppResult,
};
use crate::utils::validation::validate_date_range;

/// Transición rechazada por el grafo de ciclo de vida
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("transition {action:?} by role {role:?} is not allowed from status {from:?}")]
pub struct TransitionError {
    pub from: BookingStatus,
    pub action: BookingAction,
    pub role: UserRole,
}

impl From<TransitionError> for AppError {
    fn from(error: TransitionError) -> Self {
        AppError::Conflict(error.to_string())
    }
}

/// Función de transición del ciclo de vida de un booking.
///
/// Solo existen cuatro aristas: el owner acepta o rechaza una solicitud
/// pending, el renter cancela su solicitud pending, y un booking confirmed
/// pasa a completed cuando el alquiler termina. Todo lo demás se rechaza,
/// incluido cualquier movimiento desde un estado terminal o desde los
/// valores wire-level que el servidor aún expone.
pub fn transition(
    current: BookingStatus,
    action: BookingAction,
    role: UserRole,
) -> Result<BookingStatus, TransitionError> {
    use BookingAction::*;
    use BookingStatus::*;
    use UserRole::*;

    match (current, action, role) {
        (Pending, Accept, Owner | Admin) => Ok(Confirmed),
        (Pending, Decline, Owner | Admin) => Ok(Cancelled),
        (Pending, Cancel, Renter | Admin) => Ok(Cancelled),
        (Confirmed, Complete, Owner | Admin) => Ok(Completed),
        (from, action, role) => Err(TransitionError { from, action, role }),
    }
}

/// Servicio de orquestación de bookings
#[derive(Clone)]
pub struct BookingService {
    api: Arc<dyn RentalApi>,
    session: SessionState,
    store: Arc<EntityStore<Booking>>,
    notifications: NotificationCenter,
    loading: Arc<AtomicBool>,
    /// Bookings con una actualización de estado en vuelo; rechaza reenvíos
    in_flight: Arc<RwLock<HashSet<Uuid>>>,
}

impl BookingService {
    pub fn new(
        api: Arc<dyn RentalApi>,
        session: SessionState,
        notifications: NotificationCenter,
    ) -> Self {
        Self {
            api,
            session,
            notifications,
            store: Arc::new(EntityStore::new()),
            loading: Arc::new(AtomicBool::new(false)),
            in_flight: Arc::new(RwLock::new(HashSet::new())),
        }
    }

    /// true mientras hay un fetch de la colección en vuelo
    pub fn is_loading(&self) -> bool {
        self.loading.load(Ordering::SeqCst)
    }

    /// Re-fetch autoritativo de los bookings del usuario
    pub async fn refresh(&self) -> AppResult<Vec<Booking>> {
        self.refresh_filtered(None).await
    }

    /// Re-fetch con filtro de estado del lado del servidor
    pub async fn refresh_filtered(
        &self,
        status: Option<BookingStatus>,
    ) -> AppResult<Vec<Booking>> {
        let credential = match self.session.credential().await {
            Some(credential) => credential,
            None => {
                debug!("Sin credencial, se omite el fetch de bookings");
                self.store.clear().await;
                return Ok(Vec::new());
            }
        };

        self.loading.store(true, Ordering::SeqCst);
        let result = self.api.fetch_bookings(&credential.token, status).await;
        self.loading.store(false, Ordering::SeqCst);

        match result {
            Ok(bookings) => {
                info!("📋 {} bookings recibidos del API", bookings.len());
                self.store.replace_all(bookings).await;
                Ok(self.store.snapshot().await)
            }
            Err(e) => {
                error!("Error obteniendo bookings: {}", e);
                self.notifications
                    .error("Error", "Failed to load bookings. Please try again later.")
                    .await;
                Err(e)
            }
        }
    }

    /// Vista filtrada por estado, orden de entrada preservado
    pub async fn bookings(&self, filter: StatusFilter) -> Vec<Booking> {
        stats_service::filter_bookings(&self.store.snapshot().await, filter)
    }

    /// Un booking por id
    pub async fn booking(&self, booking_id: Uuid) -> Option<Booking> {
        self.store.get(booking_id).await
    }

    /// Conteo por estado para las pestañas del renter
    pub async fn counts(&self) -> StatusCounts {
        stats_service::count_by_status(&self.store.snapshot().await)
    }

    /// Agregados del dashboard del owner
    pub async fn dashboard_stats(&self, vehicles: &[Vehicle]) -> DashboardStats {
        stats_service::dashboard_stats(vehicles, &self.store.snapshot().await)
    }

    /// Crear un booking. Toda la validación ocurre antes de tocar la red:
    /// credencial presente, rol permitido, fechas bien formadas y rango no
    /// invertido.
    pub async fn create_booking(&self, request: &CreateBookingRequest) -> AppResult<Booking> {
        let credential = match self.session.credential().await {
            Some(credential) => credential,
            None => {
                self.notifications
                    .error("Authentication Required", "Please log in to book a vehicle")
                    .await;
                return Err(unauthorized_error("create booking"));
            }
        };

        if !AuthorizationService::can_create_booking(&credential.user) {
            self.notifications
                .error("Error", "Only renters can book vehicles")
                .await;
            return Err(AuthorizationService::require(false, "create booking").unwrap_err());
        }

        if let Err(e) = validator::Validate::validate(request) {
            self.notifications
                .error("Error", "Please select both start and end dates")
                .await;
            return Err(e.into());
        }

        let (start_date, end_date) = request.parsed_dates()?;
        if validate_date_range(start_date, end_date).is_err() {
            self.notifications
                .error("Error", "End date must be after start date")
                .await;
            return Err(bad_request_error("endDate must not be before startDate"));
        }

        match self.api.create_booking(&credential.token, request).await {
            Ok(booking) => {
                info!("📅 Booking {} creado para vehicle {}", booking.id, booking.vehicle_id);
                self.store.upsert(booking.clone()).await;
                self.notifications
                    .success(
                        "Booking Request Sent",
                        "Your booking request has been sent to the owner",
                    )
                    .await;
                Ok(booking)
            }
            Err(e) => {
                error!("Error creando booking: {}", e);
                self.notifications
                    .error("Error", "Failed to create booking. Please try again.")
                    .await;
                Err(e)
            }
        }
    }

    /// Aplicar una acción de ciclo de vida sobre un booking.
    ///
    /// La copia local solo se actualiza tras el ack del servidor; si la
    /// llamada falla no hay nada que revertir porque nada se aplicó.
    pub async fn apply_action(
        &self,
        booking_id: Uuid,
        action: BookingAction,
    ) -> AppResult<Booking> {
        let credential = match self.session.credential().await {
            Some(credential) => credential,
            None => {
                self.notifications
                    .error("Authentication Required", "Please log in first")
                    .await;
                return Err(unauthorized_error("update booking status"));
            }
        };

        let current = match self.store.get(booking_id).await {
            Some(booking) => booking,
            None => return Err(not_found_error("Booking", &booking_id.to_string())),
        };

        let allowed = match action {
            BookingAction::Accept | BookingAction::Decline | BookingAction::Complete => {
                AuthorizationService::can_respond_to_booking(&credential.user, &current)
            }
            BookingAction::Cancel => {
                AuthorizationService::can_cancel_booking(&credential.user, &current)
            }
        };
        AuthorizationService::require(allowed, "update booking status")?;

        let next = match transition(current.status, action, credential.role()) {
            Ok(next) => next,
            Err(e) => {
                warn!("Transición rechazada para booking {}: {}", booking_id, e);
                self.notifications
                    .error("Error", "This booking can no longer be updated")
                    .await;
                return Err(e.into());
            }
        };

        {
            let mut in_flight = self.in_flight.write().await;
            if !in_flight.insert(booking_id) {
                return Err(AppError::Conflict(format!(
                    "Update already in progress for booking {}",
                    booking_id
                )));
            }
        }

        let result = self
            .api
            .update_booking_status(&credential.token, booking_id, next)
            .await;
        self.in_flight.write().await.remove(&booking_id);

        match result {
            Ok(_) => {
                self.store
                    .update(booking_id, |booking| {
                        booking.status = next;
                        booking.updated_at = Utc::now();
                    })
                    .await;

                let message = match next {
                    BookingStatus::Confirmed => "Booking confirmed successfully",
                    BookingStatus::Cancelled => "Booking cancelled successfully",
                    BookingStatus::Completed => "Booking marked as completed",
                    _ => "Booking updated successfully",
                };
                self.notifications.success("Success", message).await;

                match self.store.get(booking_id).await {
                    Some(updated) => Ok(updated),
                    None => Err(not_found_error("Booking", &booking_id.to_string())),
                }
            }
            Err(e) => {
                error!("Error actualizando estado del booking {}: {}", booking_id, e);
                self.notifications
                    .error("Error", "Failed to update booking status. Please try again.")
                    .await;
                Err(e)
            }
        }
    }

    /// El owner acepta una solicitud pending
    pub async fn accept_booking(&self, booking_id: Uuid) -> AppResult<Booking> {
        self.apply_action(booking_id, BookingAction::Accept).await
    }

    /// El owner rechaza una solicitud pending
    pub async fn decline_booking(&self, booking_id: Uuid) -> AppResult<Booking> {
        self.apply_action(booking_id, BookingAction::Decline).await
    }

    /// El renter cancela su solicitud pending
    pub async fn cancel_booking(&self, booking_id: Uuid) -> AppResult<Booking> {
        self.apply_action(booking_id, BookingAction::Cancel).await
    }

    /// Marcar un booking confirmed como completed
    pub async fn complete_booking(&self, booking_id: Uuid) -> AppResult<Booking> {
        self.apply_action(booking_id, BookingAction::Complete).await
    }

    /// Rellenar los vehicles embebidos que falten (join del lado del
    /// cliente), en lotes pequeños para no saturar el API
    pub async fn hydrate_vehicles(&self) -> AppResult<()> {
        let credential = match self.session.credential().await {
            Some(credential) => credential,
            None => return Ok(()),
        };

        let missing: Vec<(Uuid, Uuid)> = self
            .store
            .snapshot()
            .await
            .iter()
            .filter(|booking| booking.vehicle.is_none())
            .map(|booking| (booking.id, booking.vehicle_id))
            .collect();

        if missing.is_empty() {
            return Ok(());
        }
        debug!("Hidratando {} bookings sin vehicle embebido", missing.len());

        for chunk in missing.chunks(5) {
            let chunk_futures = chunk.iter().map(|&(booking_id, vehicle_id)| {
                let api = Arc::clone(&self.api);
                let token = credential.token.clone();
                async move { (booking_id, api.fetch_vehicle(&token, vehicle_id).await) }
            });

            for (booking_id, result) in futures::future::join_all(chunk_futures).await {
                match result {
                    Ok(vehicle) => {
                        self.store
                            .enrich(booking_id, |booking| booking.vehicle = Some(vehicle))
                            .await;
                    }
                    Err(e) => {
                        warn!("No se pudo hidratar el vehicle del booking {}: {}", booking_id, e);
                    }
                }
            }

            // Pausa entre lotes para no saturar el API
            tokio::time::sleep(std::time::Duration::from_millis(200)).await;
        }

        Ok(())
    }

    /// Arrancar el refresh periódico de la colección
    pub fn start_auto_refresh(&self) -> RefreshHandle {
        let service = self.clone();
        let interval_secs = self.session.config.auto_refresh_interval_secs;

        let handle = tokio::spawn(async move {
            let mut interval =
                tokio::time::interval(std::time::Duration::from_secs(interval_secs));
            // el primer tick resuelve inmediatamente; el fetch inicial ya lo
            // hizo el llamador
            interval.tick().await;
            loop {
                interval.tick().await;
                if let Err(e) = service.refresh().await {
                    debug!("Auto-refresh de bookings falló: {}", e);
                }
            }
        });

        RefreshHandle::new(handle)
    }
}
