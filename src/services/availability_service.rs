//! Chequeo de disponibilidad de vehículos
//!
//! Determina si un vehículo está libre de reservas en conflicto para un
//! intervalo [start, end) semiabierto. Tanto las reservas (bookings) como
//! los alquileres (rentals) retienen el vehículo; los registros cancelados,
//! convertidos, completados o con soft delete ya no lo retienen.

use crate::models::booking::BookingStatus;
use crate::models::car::{Car, CarCategory, PriceGroup};
use crate::models::rental::RentalStatus;
use crate::utils::errors::{AppError, AppResult};
use crate::utils::validation::validate_interval;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

/// Dos intervalos semiabiertos [s1, e1) y [s2, e2) se solapan
/// sii s1 < e2 && s2 < e1. Reservas espalda con espalda (e1 == s2)
/// no entran en conflicto.
pub fn intervals_overlap(
    s1: DateTime<Utc>,
    e1: DateTime<Utc>,
    s2: DateTime<Utc>,
    e2: DateTime<Utc>,
) -> bool {
    s1 < e2 && s2 < e1
}

/// Predicado único de "reserva activa": existe algún booking o rental
/// no borrado, en un estado que retiene el vehículo, solapado con
/// [start, end). `exclude_booking` permite a la conversión booking→rental
/// ignorar la reserva que se está promocionando.
///
/// Acepta cualquier executor para poder correr dentro de la transacción
/// del llamador (el chequeo y la inserción deben ser una unidad atómica).
pub async fn car_has_conflict<'e, E>(
    executor: E,
    car_id: Uuid,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    exclude_booking: Option<Uuid>,
) -> AppResult<bool>
where
    E: sqlx::PgExecutor<'e>,
{
    let conflict: bool = sqlx::query_scalar(
        r#"
        SELECT EXISTS(
            SELECT 1 FROM bookings b
            WHERE b.car_id = $1
              AND b.deleted = FALSE
              AND b.status = ANY($5)
              AND b.start_date < $3
              AND $2 < b.end_date
              AND ($4::uuid IS NULL OR b.id <> $4)
        ) OR EXISTS(
            SELECT 1 FROM rentals r
            WHERE r.car_id = $1
              AND r.deleted = FALSE
              AND r.status = ANY($6)
              AND r.issued_date < $3
              AND $2 < r.expected_return_date
        )
        "#,
    )
    .bind(car_id)
    .bind(start)
    .bind(end)
    .bind(exclude_booking)
    .bind(BookingStatus::blocking())
    .bind(RentalStatus::blocking())
    .fetch_one(executor)
    .await?;

    Ok(conflict)
}

/// Detalle de una reserva en conflicto, para mensajes de error con los
/// que el llamador pueda decidir si reintenta
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ReservationConflict {
    /// "booking" o "rental"
    pub source: String,
    pub status: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
}

/// Variante de `car_has_conflict` que devuelve el primer registro en
/// conflicto. `exclude_booking` / `exclude_rental` permiten a confirm y
/// a la conversión ignorar el propio registro que se está transicionando.
pub async fn find_conflict<'e, E>(
    executor: E,
    car_id: Uuid,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    exclude_booking: Option<Uuid>,
    exclude_rental: Option<Uuid>,
) -> AppResult<Option<ReservationConflict>>
where
    E: sqlx::PgExecutor<'e>,
{
    let conflict = sqlx::query_as::<_, ReservationConflict>(
        r#"
        SELECT 'booking' AS source, b.status::text AS status,
               b.start_date, b.end_date
        FROM bookings b
        WHERE b.car_id = $1
          AND b.deleted = FALSE
          AND b.status = ANY($6)
          AND b.start_date < $3
          AND $2 < b.end_date
          AND ($4::uuid IS NULL OR b.id <> $4)
        UNION ALL
        SELECT 'rental' AS source, r.status::text AS status,
               r.issued_date AS start_date, r.expected_return_date AS end_date
        FROM rentals r
        WHERE r.car_id = $1
          AND r.deleted = FALSE
          AND r.status = ANY($7)
          AND r.issued_date < $3
          AND $2 < r.expected_return_date
          AND ($5::uuid IS NULL OR r.id <> $5)
        LIMIT 1
        "#,
    )
    .bind(car_id)
    .bind(start)
    .bind(end)
    .bind(exclude_booking)
    .bind(exclude_rental)
    .bind(BookingStatus::blocking())
    .bind(RentalStatus::blocking())
    .fetch_optional(executor)
    .await?;

    Ok(conflict)
}

/// ¿Está el vehículo libre para [start, end)?
///
/// Un vehículo inexistente o con soft delete nunca está disponible.
/// Un intervalo mal ordenado es un error de validación, no un "no hay
/// disponibilidad".
pub async fn is_available(
    pool: &PgPool,
    car_id: Uuid,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> AppResult<bool> {
    validate_interval(start, end).map_err(single_field_error("interval"))?;

    let exists: bool = sqlx::query_scalar(
        "SELECT EXISTS(SELECT 1 FROM cars WHERE id = $1 AND deleted = FALSE)",
    )
    .bind(car_id)
    .fetch_one(pool)
    .await?;

    if !exists {
        return Ok(false);
    }

    let conflict = car_has_conflict(pool, car_id, start, end, None).await?;
    Ok(!conflict)
}

/// Listar los vehículos disponibles para [start, end), opcionalmente
/// filtrados por categoría y grupo de precio. Parte del conjunto de
/// vehículos no borrados con flag `available` y descarta los que tienen
/// alguna reserva en conflicto.
pub async fn list_available_cars(
    pool: &PgPool,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    category: Option<CarCategory>,
    price_group: Option<PriceGroup>,
) -> AppResult<Vec<Car>> {
    validate_interval(start, end).map_err(single_field_error("interval"))?;

    let cars = sqlx::query_as::<_, Car>(
        r#"
        SELECT c.* FROM cars c
        WHERE c.deleted = FALSE
          AND c.available = TRUE
          AND ($3::car_category IS NULL OR c.category = $3)
          AND ($4::price_group IS NULL OR c.price_group = $4)
          AND NOT EXISTS(
              SELECT 1 FROM bookings b
              WHERE b.car_id = c.id
                AND b.deleted = FALSE
                AND b.status = ANY($5)
                AND b.start_date < $2
                AND $1 < b.end_date
          )
          AND NOT EXISTS(
              SELECT 1 FROM rentals r
              WHERE r.car_id = c.id
                AND r.deleted = FALSE
                AND r.status = ANY($6)
                AND r.issued_date < $2
                AND $1 < r.expected_return_date
          )
        ORDER BY c.make, c.model
        "#,
    )
    .bind(start)
    .bind(end)
    .bind(category)
    .bind(price_group)
    .bind(BookingStatus::blocking())
    .bind(RentalStatus::blocking())
    .fetch_all(pool)
    .await?;

    Ok(cars)
}

fn single_field_error(field: &'static str) -> impl FnOnce(validator::ValidationError) -> AppError {
    move |error| {
        let mut errors = validator::ValidationErrors::new();
        errors.add(field, error);
        AppError::Validation(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, day, hour, 0, 0).unwrap()
    }

    #[test]
    fn overlapping_intervals_conflict() {
        // [10, 12) vs [11, 13)
        assert!(intervals_overlap(at(10, 10), at(12, 10), at(11, 10), at(13, 10)));
        // contenido por completo
        assert!(intervals_overlap(at(10, 10), at(15, 10), at(11, 10), at(12, 10)));
        // idéntico
        assert!(intervals_overlap(at(10, 10), at(12, 10), at(10, 10), at(12, 10)));
    }

    #[test]
    fn disjoint_intervals_do_not_conflict() {
        assert!(!intervals_overlap(at(10, 10), at(12, 10), at(13, 10), at(15, 10)));
        assert!(!intervals_overlap(at(13, 10), at(15, 10), at(10, 10), at(12, 10)));
    }

    #[test]
    fn back_to_back_is_not_a_conflict() {
        // Semántica semiabierta: el end de uno igual al start del otro es legal
        assert!(!intervals_overlap(at(10, 10), at(12, 10), at(12, 10), at(14, 10)));
        assert!(!intervals_overlap(at(12, 10), at(14, 10), at(10, 10), at(12, 10)));
    }

    #[test]
    fn one_second_past_the_boundary_conflicts() {
        let boundary = at(12, 10);
        let just_before = boundary - chrono::Duration::seconds(1);
        assert!(intervals_overlap(at(10, 10), boundary, just_before, at(14, 10)));
    }
}
