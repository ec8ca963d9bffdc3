//! Modelo de Booking
//!
//! Una reserva de un vehículo para un intervalo futuro, previa a la
//! entrega física. El ciclo de vida es una máquina de estados explícita:
//! las transiciones se validan contra el estado origen antes de mutar.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::postgres::{PgHasArrayType, PgTypeInfo};
use sqlx::{FromRow, Type};
use std::fmt;
use uuid::Uuid;

/// Estado de la reserva - mapea al ENUM booking_status
///
/// `Converted` es el estado terminal que alcanza una reserva confirmada
/// cuando el staff la convierte en un Rental: el rental pasa a ser el
/// registro que retiene el vehículo para ese intervalo.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Type, PartialEq, Eq)]
#[sqlx(type_name = "booking_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Canceled,
    Converted,
}

impl PgHasArrayType for BookingStatus {
    fn array_type_info() -> PgTypeInfo {
        PgTypeInfo::with_name("_booking_status")
    }
}

impl BookingStatus {
    pub const ALL: [BookingStatus; 4] = [
        BookingStatus::Pending,
        BookingStatus::Confirmed,
        BookingStatus::Canceled,
        BookingStatus::Converted,
    ];

    /// Estados que retienen el vehículo, derivados de
    /// `blocks_availability`. Los predicados SQL de disponibilidad se
    /// bindean contra esta lista para que el predicado tenga una sola
    /// fuente de verdad.
    pub fn blocking() -> Vec<BookingStatus> {
        Self::ALL
            .into_iter()
            .filter(|status| status.blocks_availability())
            .collect()
    }

    /// Tabla de transiciones legales de la máquina de estados
    pub fn can_transition_to(self, next: BookingStatus) -> bool {
        use BookingStatus::*;
        matches!(
            (self, next),
            (Pending, Confirmed) | (Pending, Canceled) | (Confirmed, Canceled) | (Confirmed, Converted)
        )
    }

    /// Un estado terminal no admite más transiciones
    pub fn is_terminal(self) -> bool {
        matches!(self, BookingStatus::Canceled | BookingStatus::Converted)
    }

    /// La reserva retiene el vehículo para su intervalo
    pub fn blocks_availability(self) -> bool {
        matches!(self, BookingStatus::Pending | BookingStatus::Confirmed)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::Canceled => "canceled",
            BookingStatus::Converted => "converted",
        }
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Booking principal - mapea exactamente a la tabla bookings
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Booking {
    pub id: Uuid,
    pub user_id: Uuid,
    pub car_id: Uuid,
    pub driver_id: Option<Uuid>,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub status: BookingStatus,
    pub deleted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pending_can_confirm_or_cancel() {
        assert!(BookingStatus::Pending.can_transition_to(BookingStatus::Confirmed));
        assert!(BookingStatus::Pending.can_transition_to(BookingStatus::Canceled));
        assert!(!BookingStatus::Pending.can_transition_to(BookingStatus::Converted));
    }

    #[test]
    fn confirmed_can_cancel_or_convert_but_not_reconfirm() {
        assert!(BookingStatus::Confirmed.can_transition_to(BookingStatus::Canceled));
        assert!(BookingStatus::Confirmed.can_transition_to(BookingStatus::Converted));
        assert!(!BookingStatus::Confirmed.can_transition_to(BookingStatus::Confirmed));
        assert!(!BookingStatus::Confirmed.can_transition_to(BookingStatus::Pending));
    }

    #[test]
    fn terminal_states_admit_nothing() {
        for terminal in [BookingStatus::Canceled, BookingStatus::Converted] {
            assert!(terminal.is_terminal());
            for next in [
                BookingStatus::Pending,
                BookingStatus::Confirmed,
                BookingStatus::Canceled,
                BookingStatus::Converted,
            ] {
                assert!(!terminal.can_transition_to(next));
            }
        }
    }

    #[test]
    fn only_pending_and_confirmed_hold_the_car() {
        assert!(BookingStatus::Pending.blocks_availability());
        assert!(BookingStatus::Confirmed.blocks_availability());
        assert!(!BookingStatus::Canceled.blocks_availability());
        assert!(!BookingStatus::Converted.blocks_availability());
        assert_eq!(
            BookingStatus::blocking(),
            vec![BookingStatus::Pending, BookingStatus::Confirmed]
        );
    }
}
