use crate::dto::rental_dto::RentalFilters;
use crate::models::rental::{Rental, RentalStatus};
use crate::utils::errors::AppResult;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

pub struct RentalRepository {
    pool: PgPool,
}

impl RentalRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insertar un alquiler dentro de la transacción del llamador
    #[allow(clippy::too_many_arguments)]
    pub async fn create_in_tx(
        conn: &mut PgConnection,
        booking_id: Option<Uuid>,
        user_id: Uuid,
        car_id: Uuid,
        driver_id: Option<Uuid>,
        issued_date: DateTime<Utc>,
        expected_return_date: DateTime<Utc>,
        status: RentalStatus,
    ) -> AppResult<Rental> {
        let rental = sqlx::query_as::<_, Rental>(
            r#"
            INSERT INTO rentals (id, booking_id, user_id, car_id, driver_id, issued_date, expected_return_date, fine, status, deleted, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, 0, $8, FALSE, NOW(), NOW())
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(booking_id)
        .bind(user_id)
        .bind(car_id)
        .bind(driver_id)
        .bind(issued_date)
        .bind(expected_return_date)
        .bind(status)
        .fetch_one(&mut *conn)
        .await?;

        Ok(rental)
    }

    /// Buscar por id; los alquileres con soft delete no se devuelven
    pub async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Rental>> {
        let rental = sqlx::query_as::<_, Rental>(
            "SELECT * FROM rentals WHERE id = $1 AND deleted = FALSE",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(rental)
    }

    pub async fn find_by_id_in_tx(conn: &mut PgConnection, id: Uuid) -> AppResult<Option<Rental>> {
        let rental = sqlx::query_as::<_, Rental>(
            "SELECT * FROM rentals WHERE id = $1 AND deleted = FALSE",
        )
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;

        Ok(rental)
    }

    pub async fn list(&self, filters: &RentalFilters) -> AppResult<Vec<Rental>> {
        let rentals = sqlx::query_as::<_, Rental>(
            r#"
            SELECT * FROM rentals
            WHERE deleted = FALSE
              AND ($1::rental_status IS NULL OR status = $1)
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

        Ok(rentals)
    }

    /// Transición de estado con guardia optimista sobre el estado origen
    pub async fn transition_in_tx(
        conn: &mut PgConnection,
        id: Uuid,
        from: RentalStatus,
        to: RentalStatus,
    ) -> AppResult<Option<Rental>> {
        let rental = sqlx::query_as::<_, Rental>(
            r#"
            UPDATE rentals
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

        Ok(rental)
    }

    /// Activación: confirmed → active, registrando al staff que entrega.
    /// issued_date ya viene fijada desde la creación y no se pisa.
    pub async fn activate_in_tx(
        conn: &mut PgConnection,
        id: Uuid,
        issuer_id: Uuid,
    ) -> AppResult<Option<Rental>> {
        let rental = sqlx::query_as::<_, Rental>(
            r#"
            UPDATE rentals
            SET status = 'active', issuer_id = $2, updated_at = NOW()
            WHERE id = $1 AND status = 'confirmed' AND deleted = FALSE
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(issuer_id)
        .fetch_optional(&mut *conn)
        .await?;

        Ok(rental)
    }

    /// Completado: active → completed, con fecha real de devolución y multa
    pub async fn complete_in_tx(
        conn: &mut PgConnection,
        id: Uuid,
        receiver_id: Uuid,
        returned_date: DateTime<Utc>,
        fine: Decimal,
    ) -> AppResult<Option<Rental>> {
        let rental = sqlx::query_as::<_, Rental>(
            r#"
            UPDATE rentals
            SET status = 'completed', receiver_id = $2, returned_date = $3,
                fine = $4, updated_at = NOW()
            WHERE id = $1 AND status = 'active' AND deleted = FALSE
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(receiver_id)
        .bind(returned_date)
        .bind(fine)
        .fetch_optional(&mut *conn)
        .await?;

        Ok(rental)
    }
}
