//! Modelo de Rental
//!
//! Registro autoritativo de la posesión de un vehículo, desde la entrega
//! hasta la devolución. Igual que Booking, su estado es una máquina de
//! estados explícita con transiciones validadas.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::postgres::{PgHasArrayType, PgTypeInfo};
use sqlx::{FromRow, Type};
use std::fmt;
use uuid::Uuid;

/// Estado del alquiler - mapea al ENUM rental_status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Type, PartialEq, Eq)]
#[sqlx(type_name = "rental_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum RentalStatus {
    PendingConfirmation,
    Confirmed,
    Active,
    Completed,
    Canceled,
}

impl PgHasArrayType for RentalStatus {
    fn array_type_info() -> PgTypeInfo {
        PgTypeInfo::with_name("_rental_status")
    }
}

impl RentalStatus {
    pub const ALL: [RentalStatus; 5] = [
        RentalStatus::PendingConfirmation,
        RentalStatus::Confirmed,
        RentalStatus::Active,
        RentalStatus::Completed,
        RentalStatus::Canceled,
    ];

    /// Estados que retienen el vehículo, derivados de
    /// `blocks_availability`; misma fuente única que usa el predicado SQL
    pub fn blocking() -> Vec<RentalStatus> {
        Self::ALL
            .into_iter()
            .filter(|status| status.blocks_availability())
            .collect()
    }

    /// Tabla de transiciones legales de la máquina de estados.
    /// Canceled es alcanzable desde cualquier estado no terminal.
    pub fn can_transition_to(self, next: RentalStatus) -> bool {
        use RentalStatus::*;
        matches!(
            (self, next),
            (PendingConfirmation, Confirmed)
                | (Confirmed, Active)
                | (Active, Completed)
                | (PendingConfirmation, Canceled)
                | (Confirmed, Canceled)
                | (Active, Canceled)
        )
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, RentalStatus::Completed | RentalStatus::Canceled)
    }

    /// El alquiler retiene el vehículo para su intervalo.
    /// Un alquiler completado ya devolvió el vehículo y no lo retiene.
    pub fn blocks_availability(self) -> bool {
        matches!(
            self,
            RentalStatus::PendingConfirmation | RentalStatus::Confirmed | RentalStatus::Active
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RentalStatus::PendingConfirmation => "pending_confirmation",
            RentalStatus::Confirmed => "confirmed",
            RentalStatus::Active => "active",
            RentalStatus::Completed => "completed",
            RentalStatus::Canceled => "canceled",
        }
    }
}

impl fmt::Display for RentalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Rental principal - mapea exactamente a la tabla rentals
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Rental {
    pub id: Uuid,
    /// Reserva de origen cuando el alquiler nace de una conversión
    pub booking_id: Option<Uuid>,
    pub user_id: Uuid,
    pub car_id: Uuid,
    pub driver_id: Option<Uuid>,
    /// Staff que entrega el vehículo
    pub issuer_id: Option<Uuid>,
    /// Staff que recibe el vehículo devuelto
    pub receiver_id: Option<Uuid>,
    pub issued_date: DateTime<Utc>,
    pub expected_return_date: DateTime<Utc>,
    pub returned_date: Option<DateTime<Utc>>,
    pub fine: Decimal,
    pub status: RentalStatus,
    pub deleted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn happy_path_is_legal() {
        assert!(RentalStatus::PendingConfirmation.can_transition_to(RentalStatus::Confirmed));
        assert!(RentalStatus::Confirmed.can_transition_to(RentalStatus::Active));
        assert!(RentalStatus::Active.can_transition_to(RentalStatus::Completed));
    }

    #[test]
    fn cancel_reachable_from_every_non_terminal_state() {
        assert!(RentalStatus::PendingConfirmation.can_transition_to(RentalStatus::Canceled));
        assert!(RentalStatus::Confirmed.can_transition_to(RentalStatus::Canceled));
        assert!(RentalStatus::Active.can_transition_to(RentalStatus::Canceled));
        assert!(!RentalStatus::Completed.can_transition_to(RentalStatus::Canceled));
    }

    #[test]
    fn no_skipping_states() {
        assert!(!RentalStatus::PendingConfirmation.can_transition_to(RentalStatus::Active));
        assert!(!RentalStatus::PendingConfirmation.can_transition_to(RentalStatus::Completed));
        assert!(!RentalStatus::Confirmed.can_transition_to(RentalStatus::Completed));
    }

    #[test]
    fn terminal_states_admit_nothing() {
        for terminal in [RentalStatus::Completed, RentalStatus::Canceled] {
            assert!(terminal.is_terminal());
            for next in RentalStatus::ALL {
                assert!(!terminal.can_transition_to(next));
            }
        }
    }

    #[test]
    fn completed_and_canceled_release_the_car() {
        assert!(RentalStatus::PendingConfirmation.blocks_availability());
        assert!(RentalStatus::Confirmed.blocks_availability());
        assert!(RentalStatus::Active.blocks_availability());
        assert!(!RentalStatus::Completed.blocks_availability());
        assert!(!RentalStatus::Canceled.blocks_availability());
        assert_eq!(
            RentalStatus::blocking(),
            vec![
                RentalStatus::PendingConfirmation,
                RentalStatus::Confirmed,
                RentalStatus::Active,
            ]
        );
    }
}
