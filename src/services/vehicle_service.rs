//! Servicio de vehículos
//!
//! Este módulo orquesta el catálogo: fetch por ámbito (catálogo completo o
//! vehículos del owner), publicación y borrado, el flag de disponibilidad y
//! la vista de búsqueda sobre la copia local.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, error, info};
use uuid::Uuid;

use crate::cache::entity_store::EntityStore;
use crate::client::RentalApi;
use crate::dto::vehicle_dto::CreateVehicleRequest;
use crate::models::vehicle::Vehicle;
use crate::notifications::NotificationCenter;
use crate::services::authorization_service::AuthorizationService;
use crate::services::refresh::RefreshHandle;
use crate::services::search_service;
use crate::state::SessionState;
use crate::utils::errors::{not_found_error, unauthorized_error, AppResult};

/// Ámbito del fetch de vehículos
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VehicleScope {
    /// Catálogo completo, visible para cualquier usuario autenticado
    All,
    /// Solo los vehículos del owner autenticado
    Owner,
}

/// Servicio de orquestación del catálogo de vehículos
#[derive(Clone)]
pub struct VehicleService {
    api: Arc<dyn RentalApi>,
    session: SessionState,
    store: Arc<EntityStore<Vehicle>>,
    notifications: NotificationCenter,
    loading: Arc<AtomicBool>,
}

impl VehicleService {
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
        }
    }

    /// true mientras hay un fetch de la colección en vuelo
    pub fn is_loading(&self) -> bool {
        self.loading.load(Ordering::SeqCst)
    }

    /// Re-fetch autoritativo del catálogo o de los vehículos del owner.
    ///
    /// Sin credencial el fetch resuelve vacío sin emitir la llamada; con
    /// credencial pero rol insuficiente para el ámbito Owner, el resultado
    /// es un Forbidden tipado en lugar de una colección vacía.
    pub async fn refresh(&self, scope: VehicleScope) -> AppResult<Vec<Vehicle>> {
        let credential = match self.session.credential().await {
            Some(credential) => credential,
            None => {
                debug!("Sin credencial, se omite el fetch de vehículos");
                self.store.clear().await;
                return Ok(Vec::new());
            }
        };

        if scope == VehicleScope::Owner {
            AuthorizationService::require(
                AuthorizationService::can_list_owner_vehicles(&credential.user),
                "list owner vehicles",
            )?;
        }

        self.loading.store(true, Ordering::SeqCst);
        let result = match scope {
            VehicleScope::All => self.api.fetch_vehicles(&credential.token).await,
            VehicleScope::Owner => self.api.fetch_owner_vehicles(&credential.token).await,
        };
        self.loading.store(false, Ordering::SeqCst);

        match result {
            Ok(vehicles) => {
                info!("🚗 {} vehículos recibidos del API", vehicles.len());
                self.store.replace_all(vehicles).await;
                Ok(self.store.snapshot().await)
            }
            Err(e) => {
                error!("Error obteniendo vehículos: {}", e);
                self.notifications
                    .error("Error", "Failed to load vehicles. Please try again later.")
                    .await;
                Err(e)
            }
        }
    }

    /// Copia local completa, en orden de entrada
    pub async fn all_vehicles(&self) -> Vec<Vehicle> {
        self.store.snapshot().await
    }

    /// Vista filtrada por el query de búsqueda
    pub async fn search(&self, query: &str) -> Vec<Vehicle> {
        search_service::filter_vehicles(&self.store.snapshot().await, query)
    }

    /// Un vehículo de la copia local
    pub async fn vehicle(&self, vehicle_id: Uuid) -> Option<Vehicle> {
        self.store.get(vehicle_id).await
    }

    /// Un vehículo, de la copia local o del API si no está
    pub async fn fetch_vehicle(&self, vehicle_id: Uuid) -> AppResult<Vehicle> {
        if let Some(vehicle) = self.store.get(vehicle_id).await {
            return Ok(vehicle);
        }

        let credential = match self.session.credential().await {
            Some(credential) => credential,
            None => return Err(unauthorized_error("fetch vehicle")),
        };

        let vehicle = self.api.fetch_vehicle(&credential.token, vehicle_id).await?;
        self.store.upsert(vehicle.clone()).await;
        Ok(vehicle)
    }

    /// Publicar un vehículo nuevo
    pub async fn create_vehicle(&self, request: &CreateVehicleRequest) -> AppResult<Vehicle> {
        let credential = match self.session.credential().await {
            Some(credential) => credential,
            None => {
                self.notifications
                    .error("Authentication Required", "Please log in first")
                    .await;
                return Err(unauthorized_error("create vehicle"));
            }
        };

        AuthorizationService::require(
            AuthorizationService::can_create_vehicle(&credential.user),
            "create vehicle",
        )?;

        if let Err(e) = validator::Validate::validate(request) {
            self.notifications
                .error("Error", "Please review the vehicle details")
                .await;
            return Err(e.into());
        }

        match self.api.create_vehicle(&credential.token, request).await {
            Ok(vehicle) => {
                info!("🚗 Vehículo {} publicado", vehicle.id);
                self.store.upsert(vehicle.clone()).await;
                self.notifications
                    .success("Success", "Vehicle listed successfully")
                    .await;
                Ok(vehicle)
            }
            Err(e) => {
                error!("Error publicando vehículo: {}", e);
                self.notifications
                    .error("Error", "Failed to create vehicle. Please try again.")
                    .await;
                Err(e)
            }
        }
    }

    /// Eliminar un vehículo del owner
    pub async fn delete_vehicle(&self, vehicle_id: Uuid) -> AppResult<()> {
        let credential = match self.session.credential().await {
            Some(credential) => credential,
            None => return Err(unauthorized_error("delete vehicle")),
        };

        if let Some(vehicle) = self.store.get(vehicle_id).await {
            AuthorizationService::require(
                AuthorizationService::can_manage_vehicle(&credential.user, &vehicle),
                "delete vehicle",
            )?;
        }

        match self.api.delete_vehicle(&credential.token, vehicle_id).await {
            Ok(()) => {
                self.store.remove(vehicle_id).await;
                self.notifications
                    .success("Success", "Vehicle successfully deleted")
                    .await;
                Ok(())
            }
            Err(e) => {
                error!("Error eliminando vehículo {}: {}", vehicle_id, e);
                self.notifications
                    .error("Error", "Failed to delete vehicle. Please try again.")
                    .await;
                Err(e)
            }
        }
    }

    /// Alternar el flag de disponibilidad de un vehículo.
    ///
    /// El flag solo cambia por esta acción explícita; no se infiere del
    /// estado de los bookings del vehículo.
    pub async fn toggle_availability(&self, vehicle_id: Uuid) -> AppResult<bool> {
        let credential = match self.session.credential().await {
            Some(credential) => credential,
            None => return Err(unauthorized_error("toggle availability")),
        };

        let vehicle = match self.store.get(vehicle_id).await {
            Some(vehicle) => vehicle,
            None => return Err(not_found_error("Vehicle", &vehicle_id.to_string())),
        };

        AuthorizationService::require(
            AuthorizationService::can_manage_vehicle(&credential.user, &vehicle),
            "toggle availability",
        )?;

        let new_availability = !vehicle.availability;
        let result = self
            .api
            .set_vehicle_availability(&credential.token, vehicle_id, new_availability)
            .await;

        match result {
            Ok(_) => {
                self.store
                    .update(vehicle_id, |vehicle| {
                        vehicle.availability = new_availability;
                        vehicle.updated_at = Utc::now();
                    })
                    .await;
                let message = if new_availability {
                    "Vehicle is now available"
                } else {
                    "Vehicle is now unavailable"
                };
                self.notifications.success("Success", message).await;
                Ok(new_availability)
            }
            Err(e) => {
                error!("Error actualizando disponibilidad de {}: {}", vehicle_id, e);
                self.notifications
                    .error(
                        "Error",
                        "Failed to update vehicle availability. Please try again.",
                    )
                    .await;
                Err(e)
            }
        }
    }

    /// Arrancar el refresh periódico del catálogo
    pub fn start_auto_refresh(&self, scope: VehicleScope) -> RefreshHandle {
        let service = self.clone();
        let interval_secs = self.session.config.auto_refresh_interval_secs;

        let handle = tokio::spawn(async move {
            let mut interval =
                tokio::time::interval(std::time::Duration::from_secs(interval_secs));
            interval.tick().await;
            loop {
                interval.tick().await;
                if let Err(e) = service.refresh(scope).await {
                    debug!("Auto-refresh de vehículos falló: {}", e);
                }
            }
        });

        RefreshHandle::new(handle)
    }
}
