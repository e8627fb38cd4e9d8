//! Tarea de refresh periódico
//!
//! El refresh re-fetchea la colección autoritativa a intervalo fijo y solo
//! se detiene cuando el handle se para o se suelta. Un request en vuelo no
//! se aborta; su resultado sin consumidor es un no-op.

use tokio::task::JoinHandle;

/// Handle de la tarea de refresh periódico de un servicio
pub struct RefreshHandle {
    handle: JoinHandle<()>,
}

impl RefreshHandle {
    pub(crate) fn new(handle: JoinHandle<()>) -> Self {
        Self { handle }
    }

    /// Detener la tarea periódica
    pub fn stop(&self) {
        self.handle.abort();
    }

    pub fn is_stopped(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Drop for RefreshHandle {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
