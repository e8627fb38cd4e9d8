//! Shared session state
//!
//! Este módulo define el estado de sesión compartido que se pasa
//! a los servicios del cliente.

use std::sync::Arc;
use tokio::sync::RwLock;

use crate::config::environment::EnvironmentConfig;
use crate::models::user::{User, UserRole};

/// Credencial bearer emitida por el colaborador externo de autenticación
#[derive(Clone, Debug)]
pub struct AuthCredential {
    pub token: String,
    pub expires_at: chrono::DateTime<chrono::Utc>,
    pub user: User,
}

impl AuthCredential {
    pub fn new(token: String, user: User, expires_in_hours: i32) -> Self {
        Self {
            token,
            expires_at: chrono::Utc::now() + chrono::Duration::hours(expires_in_hours as i64),
            user,
        }
    }

    pub fn is_expired(&self) -> bool {
        chrono::Utc::now() > self.expires_at
    }

    pub fn role(&self) -> UserRole {
        self.user.role
    }
}

/// Estado de sesión del cliente
#[derive(Clone)]
pub struct SessionState {
    pub config: EnvironmentConfig,
    credential: Arc<RwLock<Option<AuthCredential>>>,
}

impl SessionState {
    pub fn new(config: EnvironmentConfig) -> Self {
        Self {
            config,
            credential: Arc::new(RwLock::new(None)),
        }
    }

    /// Almacenar la credencial tras un login externo
    pub async fn store_credential(&self, credential: AuthCredential) {
        log::info!(
            "💾 Almacenando credencial para usuario '{}' con rol '{}'",
            credential.user.id,
            credential.role().as_str()
        );
        let mut guard = self.credential.write().await;
        *guard = Some(credential);
    }

    /// Obtener la credencial vigente; una credencial expirada cuenta como ausente
    pub async fn credential(&self) -> Option<AuthCredential> {
        let guard = self.credential.read().await;
        match guard.as_ref() {
            Some(credential) if !credential.is_expired() => Some(credential.clone()),
            Some(credential) => {
                log::warn!(
                    "❌ Credencial expirada para usuario '{}', se trata como ausente",
                    credential.user.id
                );
                None
            }
            None => None,
        }
    }

    /// Descartar la credencial (logout)
    pub async fn clear_credential(&self) {
        let mut guard = self.credential.write().await;
        *guard = None;
    }

    pub async fn is_authenticated(&self) -> bool {
        self.credential().await.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn test_user(role: UserRole) -> User {
        User {
            id: Uuid::new_v4(),
            first_name: "Asha".to_string(),
            last_name: "Verma".to_string(),
            email: "asha@example.com".to_string(),
            role,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            name: None,
            phone: None,
            profile_image: None,
        }
    }

    #[tokio::test]
    async fn test_expired_credential_counts_as_absent() {
        let session = SessionState::new(EnvironmentConfig::default());
        assert!(!session.is_authenticated().await);

        let mut credential =
            AuthCredential::new("token".to_string(), test_user(UserRole::Renter), 1);
        credential.expires_at = Utc::now() - chrono::Duration::hours(1);
        session.store_credential(credential).await;

        assert!(session.credential().await.is_none());
        assert!(!session.is_authenticated().await);
    }

    #[tokio::test]
    async fn test_store_and_clear_credential() {
        let session = SessionState::new(EnvironmentConfig::default());
        let credential = AuthCredential::new("token".to_string(), test_user(UserRole::Owner), 1);
        session.store_credential(credential).await;
        assert!(session.is_authenticated().await);

        session.clear_credential().await;
        assert!(!session.is_authenticated().await);
    }
}
