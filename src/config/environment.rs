//! Configuración de variables de entorno
//!
//! Este módulo maneja la configuración del entorno y variables de configuración.

use anyhow::{Context, Result};
use std::env;

/// Configuración del entorno
#[derive(Debug, Clone)]
pub struct EnvironmentConfig {
    pub environment: String,
    /// URL base del API REST del marketplace
    pub api_base_url: String,
    /// Timeout por request HTTP
    pub request_timeout_secs: u64,
    /// Intervalo del refresh periódico de colecciones
    pub auto_refresh_interval_secs: u64,
}

impl Default for EnvironmentConfig {
    fn default() -> Self {
        Self {
            environment: "development".to_string(),
            api_base_url: "http://localhost:3000/api".to_string(),
            request_timeout_secs: 30,
            auto_refresh_interval_secs: 30,
        }
    }
}

impl EnvironmentConfig {
    /// Cargar configuración desde variables de entorno, con defaults razonables
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        Ok(Self {
            environment: env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
            api_base_url: env::var("RENTAL_API_BASE_URL")
                .unwrap_or_else(|_| "http://localhost:3000/api".to_string()),
            request_timeout_secs: env::var("RENTAL_API_TIMEOUT_SECS")
                .unwrap_or_else(|_| "30".to_string())
                .parse()
                .context("RENTAL_API_TIMEOUT_SECS must be a valid number")?,
            auto_refresh_interval_secs: env::var("RENTAL_REFRESH_INTERVAL_SECS")
                .unwrap_or_else(|_| "30".to_string())
                .parse()
                .context("RENTAL_REFRESH_INTERVAL_SECS must be a valid number")?,
        })
    }

    /// Verificar si estamos en modo desarrollo
    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }

    /// Verificar si estamos en modo producción
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = EnvironmentConfig::default();
        assert!(config.is_development());
        assert!(!config.is_production());
        assert_eq!(config.auto_refresh_interval_secs, 30);
    }
}
