//! DTOs de Vehicle

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Request para publicar un nuevo vehículo
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateVehicleRequest {
    #[validate(length(min = 2, max = 100))]
    pub name: String,

    #[validate(length(min = 2, max = 100))]
    pub brand: String,

    #[validate(length(min = 2, max = 100))]
    pub model: String,

    #[validate(range(min = 1900, max = 2030))]
    pub year: i32,

    #[validate(length(min = 2, max = 50))]
    pub category: String,

    #[validate(length(max = 2000))]
    pub description: String,

    #[validate(custom = "crate::utils::validation::validate_price")]
    pub price_per_day: Decimal,

    #[validate(custom = "crate::utils::validation::validate_price")]
    pub price_per_week: Option<Decimal>,

    #[validate(custom = "crate::utils::validation::validate_price")]
    pub price_per_month: Option<Decimal>,

    #[validate(length(min = 2, max = 100))]
    pub location: String,

    #[serde(default)]
    pub features: Vec<String>,

    pub image: String,
}

/// Request para fijar el flag de disponibilidad de un vehículo
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetAvailabilityRequest {
    pub availability: bool,
}
