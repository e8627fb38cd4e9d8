//! Filtro de búsqueda de vehículos
//!
//! Coincidencia por tokens sobre los campos buscables (name, brand, model,
//! location): un vehículo pasa si su texto concatenado contiene todos los
//! tokens del query como substring, sin distinción de mayúsculas. No hay
//! ranking; el orden de entrada se preserva.

use crate::models::vehicle::Vehicle;

/// Un vehículo coincide si contiene todos los tokens del query
pub fn matches_query(vehicle: &Vehicle, query: &str) -> bool {
    let query = query.trim();
    if query.is_empty() {
        return true;
    }

    let text = vehicle.searchable_text();
    query
        .split_whitespace()
        .all(|term| text.contains(&term.to_lowercase()))
}

/// Subconjunto que coincide con el query, en orden de entrada.
/// Un query vacío o solo espacios es la proyección identidad.
pub fn filter_vehicles(vehicles: &[Vehicle], query: &str) -> Vec<Vehicle> {
    vehicles
        .iter()
        .filter(|vehicle| matches_query(vehicle, query))
        .cloned()
        .collect()
}
