//! Notificaciones descartables
//!
//! Este módulo mantiene las notificaciones que la capa de presentación
//! muestra al usuario tras cada operación (éxito o fallo). Ningún error
//! llega al usuario de otra forma.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

/// Nivel de la notificación
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum NotificationLevel {
    Success,
    Error,
}

/// Notificación descartable
#[derive(Debug, Clone, Serialize)]
pub struct Notification {
    pub id: Uuid,
    pub level: NotificationLevel,
    pub title: String,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

/// Centro de notificaciones compartido entre servicios
#[derive(Clone)]
pub struct NotificationCenter {
    entries: Arc<RwLock<Vec<Notification>>>,
}

impl NotificationCenter {
    pub fn new() -> Self {
        Self {
            entries: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Publicar una notificación de éxito
    pub async fn success(&self, title: &str, message: &str) -> Uuid {
        self.push(NotificationLevel::Success, title, message).await
    }

    /// Publicar una notificación de error
    pub async fn error(&self, title: &str, message: &str) -> Uuid {
        self.push(NotificationLevel::Error, title, message).await
    }

    async fn push(&self, level: NotificationLevel, title: &str, message: &str) -> Uuid {
        let notification = Notification {
            id: Uuid::new_v4(),
            level,
            title: title.to_string(),
            message: message.to_string(),
            created_at: Utc::now(),
        };
        debug!("Notificación {:?}: {} - {}", level, title, message);

        let id = notification.id;
        let mut entries = self.entries.write().await;
        entries.push(notification);
        id
    }

    /// Descartar una notificación por id
    pub async fn dismiss(&self, id: Uuid) -> bool {
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|notification| notification.id != id);
        entries.len() < before
    }

    /// Notificaciones activas, en orden de publicación
    pub async fn active(&self) -> Vec<Notification> {
        self.entries.read().await.clone()
    }

    pub async fn clear(&self) {
        self.entries.write().await.clear();
    }
}

impl Default for NotificationCenter {
    fn default() -> Self {
        Self::new()
    }
}
