//! Colaborador de notificaciones
//!
//! Las notificaciones (email/SMS) se disparan tras una transición exitosa
//! y son best-effort: un fallo del colaborador nunca revierte la
//! transición ya confirmada. La implementación real vive fuera de este
//! core; aquí se define el contrato y una implementación de log.

use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum NotificationError {
    #[error("notification delivery failed: {0}")]
    Delivery(String),
}

/// Evento de negocio que merece una notificación al cliente
#[derive(Debug, Clone)]
pub enum NotificationEvent {
    BookingConfirmed { booking_id: Uuid, user_id: Uuid },
    BookingCanceled { booking_id: Uuid, user_id: Uuid },
    RentalConfirmed { rental_id: Uuid, user_id: Uuid },
    RentalActivated { rental_id: Uuid, user_id: Uuid },
    RentalCompleted { rental_id: Uuid, user_id: Uuid },
    RentalCanceled { rental_id: Uuid, user_id: Uuid },
}

/// Contrato del colaborador de notificaciones
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, event: NotificationEvent) -> Result<(), NotificationError>;
}

/// Implementación que solo registra el evento en el log.
/// Útil en desarrollo y como fallback cuando no hay proveedor configurado.
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify(&self, event: NotificationEvent) -> Result<(), NotificationError> {
        tracing::info!("📣 Notificación: {:?}", event);
        Ok(())
    }
}

/// Despachar un evento en background sin bloquear la respuesta.
/// Los errores se registran y se descartan.
pub fn dispatch(notifier: Arc<dyn Notifier>, event: NotificationEvent) {
    tokio::spawn(async move {
        if let Err(e) = notifier.notify(event.clone()).await {
            tracing::warn!("Fallo al notificar {:?}: {}", event, e);
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn log_notifier_always_succeeds() {
        let notifier = LogNotifier;
        let event = NotificationEvent::BookingConfirmed {
            booking_id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
        };
        assert!(notifier.notify(event).await.is_ok());
    }
}
