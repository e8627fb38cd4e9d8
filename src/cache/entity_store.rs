//! Store local de entidades del servidor
//!
//! Copias efímeras y no autoritativas, con reconciliación explícita entre un
//! snapshot autoritativo del servidor y las escrituras locales confirmadas:
//! gana el último escritor según el sello de actualización de la entidad.
//! El orden de inserción se preserva porque las proyecciones de vista deben
//! devolver los resultados en el orden de entrada.

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tracing::{debug, info};
use uuid::Uuid;

use crate::models::booking::Booking;
use crate::models::vehicle::Vehicle;

/// Entidad almacenable en un store local
pub trait StoreEntity: Clone + Send + Sync {
    fn entity_id(&self) -> Uuid;

    /// Sello de última escritura usado para la reconciliación last-writer-wins
    fn updated_stamp(&self) -> DateTime<Utc>;
}

impl StoreEntity for Vehicle {
    fn entity_id(&self) -> Uuid {
        self.id
    }

    fn updated_stamp(&self) -> DateTime<Utc> {
        self.updated_at
    }
}

impl StoreEntity for Booking {
    fn entity_id(&self) -> Uuid {
        self.id
    }

    fn updated_stamp(&self) -> DateTime<Utc> {
        self.updated_at
    }
}

/// Entrada con metadatos de sincronización
#[derive(Debug, Clone)]
struct StoredEntry<T> {
    value: T,
    /// true si hay una escritura local posterior al último snapshot aplicado
    locally_written: bool,
}

/// Estadísticas del store
#[derive(Debug, Default, Clone)]
pub struct StoreStats {
    pub refreshes: u64,
    pub local_writes: u64,
    /// Entradas locales conservadas frente a un snapshot más viejo
    pub conflicts_kept: u64,
    /// Entradas descartadas porque el servidor ya no las reporta
    pub entries_dropped: u64,
}

/// Store local de entidades, keyed por id y con orden de entrada preservado
pub struct EntityStore<T: StoreEntity> {
    entries: RwLock<Vec<StoredEntry<T>>>,
    stats: RwLock<StoreStats>,
}

impl<T: StoreEntity> EntityStore<T> {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(Vec::new()),
            stats: RwLock::new(StoreStats::default()),
        }
    }

    /// Snapshot ordenado de los valores actuales
    pub async fn snapshot(&self) -> Vec<T> {
        let entries = self.entries.read().await;
        entries.iter().map(|entry| entry.value.clone()).collect()
    }

    /// Obtener una entidad por id
    pub async fn get(&self, id: Uuid) -> Option<T> {
        let entries = self.entries.read().await;
        entries
            .iter()
            .find(|entry| entry.value.entity_id() == id)
            .map(|entry| entry.value.clone())
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    /// Reemplazar el contenido con el snapshot autoritativo del servidor.
    ///
    /// Una entrada con una escritura local cuyo sello es más reciente que el
    /// del snapshot se conserva (el refresh que la pisaría es más viejo que
    /// el ack que la produjo). Una entrada local ausente del snapshot se
    /// conserva solo si tiene una escritura local pendiente de ver.
    pub async fn replace_all(&self, items: Vec<T>) {
        let mut entries = self.entries.write().await;
        let mut stats = self.stats.write().await;

        let mut next: Vec<StoredEntry<T>> = Vec::with_capacity(items.len());
        for item in items {
            let id = item.entity_id();
            let existing = entries.iter().find(|entry| entry.value.entity_id() == id);
            match existing {
                Some(entry)
                    if entry.locally_written
                        && entry.value.updated_stamp() > item.updated_stamp() =>
                {
                    debug!(
                        "Entrada {} con escritura local más reciente, se conserva frente al snapshot",
                        id
                    );
                    stats.conflicts_kept += 1;
                    next.push(entry.clone());
                }
                _ => next.push(StoredEntry {
                    value: item,
                    locally_written: false,
                }),
            }
        }

        for old in entries.iter() {
            let id = old.value.entity_id();
            if next.iter().any(|entry| entry.value.entity_id() == id) {
                continue;
            }
            if old.locally_written {
                stats.conflicts_kept += 1;
                next.push(old.clone());
            } else {
                stats.entries_dropped += 1;
            }
        }

        *entries = next;
        stats.refreshes += 1;
    }

    /// Insertar o reemplazar una entidad tras un alta confirmada por el servidor
    pub async fn upsert(&self, item: T) {
        let mut entries = self.entries.write().await;
        let mut stats = self.stats.write().await;
        stats.local_writes += 1;

        let id = item.entity_id();
        let entry = StoredEntry {
            value: item,
            locally_written: true,
        };
        match entries.iter_mut().find(|e| e.value.entity_id() == id) {
            Some(existing) => *existing = entry,
            None => entries.push(entry),
        }
    }

    /// Aplicar una mutación local confirmada por el servidor
    pub async fn update<F>(&self, id: Uuid, mutation: F) -> bool
    where
        F: FnOnce(&mut T),
    {
        let mut entries = self.entries.write().await;
        match entries.iter_mut().find(|e| e.value.entity_id() == id) {
            Some(entry) => {
                mutation(&mut entry.value);
                entry.locally_written = true;
                let mut stats = self.stats.write().await;
                stats.local_writes += 1;
                true
            }
            None => false,
        }
    }

    /// Enriquecer una entrada sin marcarla como escritura local: el próximo
    /// snapshot del servidor la reemplaza con normalidad
    pub async fn enrich<F>(&self, id: Uuid, mutation: F) -> bool
    where
        F: FnOnce(&mut T),
    {
        let mut entries = self.entries.write().await;
        match entries.iter_mut().find(|e| e.value.entity_id() == id) {
            Some(entry) => {
                mutation(&mut entry.value);
                true
            }
            None => false,
        }
    }

    /// Eliminar una entidad tras un borrado confirmado por el servidor
    pub async fn remove(&self, id: Uuid) -> bool {
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|entry| entry.value.entity_id() != id);
        let removed = entries.len() < before;
        if removed {
            let mut stats = self.stats.write().await;
            stats.local_writes += 1;
        }
        removed
    }

    /// Vaciar el store (p. ej. al perder la credencial)
    pub async fn clear(&self) {
        let mut entries = self.entries.write().await;
        if !entries.is_empty() {
            info!("Store local vaciado ({} entradas)", entries.len());
        }
        entries.clear();
    }

    /// Estadísticas acumuladas del store
    pub async fn stats(&self) -> StoreStats {
        self.stats.read().await.clone()
    }
}

impl<T: StoreEntity> Default for EntityStore<T> {
    fn default() -> Self {
        Self::new()
    }
}
