//! Núcleo cliente del marketplace P2P de alquiler de vehículos
//!
//! Los renters buscan y reservan vehículos; los owners publican vehículos y
//! gestionan las solicitudes de booking entrantes. Toda la persistencia y la
//! autoridad de negocio viven en el API REST remoto; este crate mantiene
//! copias locales efímeras y deriva las vistas (precios, listas filtradas,
//! agregados de dashboard) a partir de ellas.

pub mod cache;
pub mod client;
pub mod config;
pub mod dto;
pub mod models;
pub mod notifications;
pub mod services;
pub mod state;
pub mod utils;
