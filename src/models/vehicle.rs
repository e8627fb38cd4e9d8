//! Modelo de Vehicle
//!
//! Este módulo contiene el struct Vehicle tal como lo publica el API.
//! La tarifa diaria es obligatoria; las tarifas semanal y mensual son
//! opcionales y, si existen, se esperan ≤ tarifa diaria × {7, 30} (el
//! servidor no lo garantiza).

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::user::User;

/// Specifications llega del API en dos formas wire: lista o mapa
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum VehicleSpecifications {
    List(Vec<String>),
    Map(HashMap<String, String>),
}

impl Default for VehicleSpecifications {
    fn default() -> Self {
        VehicleSpecifications::List(Vec::new())
    }
}

/// Vehicle principal - copia efímera y no autoritativa de la entidad del servidor
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Vehicle {
    pub id: Uuid,
    pub name: String,
    pub brand: String,
    pub model: String,
    pub year: i32,
    pub category: String,
    pub description: String,
    pub price_per_day: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_per_week: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_per_month: Option<Decimal>,
    pub location: String,
    #[serde(default)]
    pub features: Vec<String>,
    #[serde(default)]
    pub specifications: VehicleSpecifications,
    pub image: String,
    pub owner_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub images: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    /// Flag mantenido solo por acción explícita del owner; no se infiere
    /// del estado de los bookings. Ausente en el wire equivale a no disponible.
    #[serde(default)]
    pub availability: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner: Option<User>,
}

impl Vehicle {
    /// Texto concatenado sobre el que opera el filtro de búsqueda
    pub fn searchable_text(&self) -> String {
        format!(
            "{} {} {} {}",
            self.name, self.brand, self.model, self.location
        )
        .to_lowercase()
    }
}
