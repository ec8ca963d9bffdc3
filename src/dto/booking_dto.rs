//! DTOs de Booking

use crate::models::booking::{Booking, BookingStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Request para crear una reserva.
/// El usuario sale de la identidad autenticada; un staff puede reservar
/// en nombre de otro usuario indicando `user_id`.
#[derive(Debug, Deserialize)]
pub struct CreateBookingRequest {
    pub car_id: Uuid,
    pub driver_id: Option<Uuid>,
    pub user_id: Option<Uuid>,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
}

/// Filtros para listar reservas
#[derive(Debug, Deserialize)]
pub struct BookingFilters {
    pub status: Option<BookingStatus>,
    pub car_id: Option<Uuid>,
    pub user_id: Option<Uuid>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Response de reserva para la API
#[derive(Debug, Serialize)]
pub struct BookingResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    pub car_id: Uuid,
    pub driver_id: Option<Uuid>,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub status: BookingStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Booking> for BookingResponse {
    fn from(booking: Booking) -> Self {
        Self {
            id: booking.id,
            user_id: booking.user_id,
            car_id: booking.car_id,
            driver_id: booking.driver_id,
            start_date: booking.start_date,
            end_date: booking.end_date,
            status: booking.status,
            created_at: booking.created_at,
            updated_at: booking.updated_at,
        }
    }
}
