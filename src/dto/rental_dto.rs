//! DTOs de Rental

use crate::models::rental::{Rental, RentalStatus};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Request para crear un alquiler directamente (sin reserva previa)
#[derive(Debug, Deserialize)]
pub struct CreateRentalRequest {
    pub user_id: Uuid,
    pub car_id: Uuid,
    pub driver_id: Option<Uuid>,
    pub issued_date: DateTime<Utc>,
    pub expected_return_date: DateTime<Utc>,
    /// Estado inicial opcional; por defecto pending_confirmation
    pub initial_status: Option<RentalStatus>,
}

/// Request para completar un alquiler (devolución del vehículo)
#[derive(Debug, Deserialize)]
pub struct CompleteRentalRequest {
    /// Fecha real de devolución; por defecto, ahora
    pub returned_date: Option<DateTime<Utc>>,
    /// Multa fijada por el staff; si está presente gana sobre la calculada
    pub fine_override: Option<Decimal>,
}

/// Filtros para listar alquileres
#[derive(Debug, Deserialize)]
pub struct RentalFilters {
    pub status: Option<RentalStatus>,
    pub car_id: Option<Uuid>,
    pub user_id: Option<Uuid>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Response de alquiler para la API
#[derive(Debug, Serialize)]
pub struct RentalResponse {
    pub id: Uuid,
    pub booking_id: Option<Uuid>,
    pub user_id: Uuid,
    pub car_id: Uuid,
    pub driver_id: Option<Uuid>,
    pub issuer_id: Option<Uuid>,
    pub receiver_id: Option<Uuid>,
    pub issued_date: DateTime<Utc>,
    pub expected_return_date: DateTime<Utc>,
    pub returned_date: Option<DateTime<Utc>>,
    pub fine: Decimal,
    pub status: RentalStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Rental> for RentalResponse {
    fn from(rental: Rental) -> Self {
        Self {
            id: rental.id,
            booking_id: rental.booking_id,
            user_id: rental.user_id,
            car_id: rental.car_id,
            driver_id: rental.driver_id,
            issuer_id: rental.issuer_id,
            receiver_id: rental.receiver_id,
            issued_date: rental.issued_date,
            expected_return_date: rental.expected_return_date,
            returned_date: rental.returned_date,
            fine: rental.fine,
            status: rental.status,
            created_at: rental.created_at,
            updated_at: rental.updated_at,
        }
    }
}
