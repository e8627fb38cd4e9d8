use crate::models::booking::Booking;
use crate::models::user::{User, UserRole};
use crate::models::vehicle::Vehicle;
use crate::utils::errors::{forbidden_error, AppResult};

/// Servicio de autorización: verifica roles y capacidades en el límite del
/// cliente del API, antes de emitir ninguna llamada de red
pub struct AuthorizationService;

impl AuthorizationService {
    /// Verifica si un usuario tiene un rol específico
    pub fn has_role(user: &User, required_role: UserRole) -> bool {
        user.role == required_role
    }

    /// Verifica si un usuario tiene al menos uno de los roles requeridos
    pub fn has_any_role(user: &User, required_roles: &[UserRole]) -> bool {
        required_roles.contains(&user.role)
    }

    /// Verifica si un usuario puede listar sus vehículos como owner
    pub fn can_list_owner_vehicles(user: &User) -> bool {
        matches!(user.role, UserRole::Owner | UserRole::Admin)
    }

    /// Verifica si un usuario puede publicar vehículos
    pub fn can_create_vehicle(user: &User) -> bool {
        matches!(user.role, UserRole::Owner | UserRole::Admin)
    }

    /// Verifica si un usuario puede gestionar un vehículo específico
    pub fn can_manage_vehicle(user: &User, vehicle: &Vehicle) -> bool {
        match user.role {
            UserRole::Admin => true,
            UserRole::Owner => vehicle.owner_id == user.id,
            UserRole::Renter => false,
        }
    }

    /// Verifica si un usuario puede crear bookings
    pub fn can_create_booking(user: &User) -> bool {
        matches!(user.role, UserRole::Renter | UserRole::Admin)
    }

    /// Verifica si un usuario puede responder (aceptar/rechazar/completar)
    /// un booking específico
    pub fn can_respond_to_booking(user: &User, booking: &Booking) -> bool {
        match user.role {
            UserRole::Admin => true,
            UserRole::Owner => booking.resolved_owner_id() == Some(user.id),
            UserRole::Renter => false,
        }
    }

    /// Verifica si un usuario puede cancelar un booking específico
    pub fn can_cancel_booking(user: &User, booking: &Booking) -> bool {
        match user.role {
            UserRole::Admin => true,
            UserRole::Renter => booking.renter_id == user.id,
            UserRole::Owner => false,
        }
    }

    /// Verifica si un usuario puede ver el dashboard de owner
    pub fn can_view_owner_dashboard(user: &User) -> bool {
        matches!(user.role, UserRole::Owner | UserRole::Admin)
    }

    /// Convierte una comprobación en el resultado tipado del límite del API
    pub fn require(allowed: bool, operation: &str) -> AppResult<()> {
        if allowed {
            Ok(())
        } else {
            Err(forbidden_error(
                operation,
                "role does not permit this operation",
            ))
        }
    }
}
