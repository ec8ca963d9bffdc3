use crate::dto::booking_dto::BookingFilters;
use crate::models::booking::{Booking, BookingStatus};
use crate::utils::errors::AppResult;
use chrono::{DateTime, Utc};
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

pub struct BookingRepository {
    pool: PgPool,
}

impl BookingRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insertar una reserva dentro de la transacción del llamador.
    /// El chequeo de solape y la inserción deben ser una unidad atómica.
    pub async fn create_in_tx(
        conn: &mut PgConnection,
        user_id: Uuid,
        car_id: Uuid,
        driver_id: Option<Uuid>,
        start_date: DateTime<Utc>,
        end_date: DateTime<Utc>,
        status: BookingStatus,
    ) -> AppResult<Booking> {
        let booking = sqlx::query_as::<_, Booking>(
            r#"
            INSERT INTO bookings (id, user_id, car_id, driver_id, start_date, end_date, status, deleted, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, FALSE, NOW(), NOW())
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(car_id)
        .bind(driver_id)
        .bind(start_date)
        .bind(end_date)
        .bind(status)
        .fetch_one(&mut *conn)
        .await?;

        Ok(booking)
    }

    /// Buscar por id; las reservas con soft delete no se devuelven
    pub async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Booking>> {
        let booking = sqlx::query_as::<_, Booking>(
            "SELECT * FROM bookings WHERE id = $1 AND deleted = FALSE",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(booking)
    }

    pub async fn find_by_id_in_tx(
        conn: &mut PgConnection,
        id: Uuid,
    ) -> AppResult<Option<Booking>> {
        let booking = sqlx::query_as::<_, Booking>(
            "SELECT * FROM bookings WHERE id = $1 AND deleted = FALSE",
        )
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;

        Ok(booking)
    }

    pub async fn list(&self, filters: &BookingFilters) -> AppResult<Vec<Booking>> {
        let bookings = sqlx::query_as::<_, Booking>(
            r#"
            SELECT * FROM bookings
            WHERE deleted = FALSE
              AND ($1::booking_status IS NULL OR status = $1)
              AND ($2::uuid IS NULL OR car_id = $2)
              AND ($3::uuid IS NULL OR user_id = $3)
            ORDER BY created_at DESC
            LIMIT $4 OFFSET $5
            "#,
        )
        .bind(filters.status)
        .bind(filters.car_id)
        .bind(filters.user_id)
        .bind(filters.limit.unwrap_or(100))
        .bind(filters.offset.unwrap_or(0))
        .fetch_all(&self.pool)
        .await?;

        Ok(bookings)
    }

    /// Transición de estado con guardia optimista: solo muta si la fila
    /// sigue en el estado origen esperado. Devuelve None si otro proceso
    /// ganó la carrera (o el estado cambió entre lectura y escritura).
    pub async fn transition_in_tx(
        conn: &mut PgConnection,
        id: Uuid,
        from: BookingStatus,
        to: BookingStatus,
    ) -> AppResult<Option<Booking>> {
        let booking = sqlx::query_as::<_, Booking>(
            r#"
            UPDATE bookings
            SET status = $3, updated_at = NOW()
            WHERE id = $1 AND status = $2 AND deleted = FALSE
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(from)
        .bind(to)
        .fetch_optional(&mut *conn)
        .await?;

        Ok(booking)
    }
}
