//! Services module
//!
//! Este módulo contiene la lógica de dominio (precios, proyección de
//! bookings, búsqueda) y los servicios de orquestación que reemplazan a los
//! hooks de datos de la SPA original.

pub mod authorization_service;
pub mod booking_service;
pub mod pricing_service;
pub mod refresh;
pub mod search_service;
pub mod stats_service;
pub mod vehicle_service;

pub use pricing_service::*;
pub use refresh::RefreshHandle;
pub use search_service::*;
pub use stats_service::*;
