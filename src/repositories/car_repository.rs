use crate::dto::car_dto::{CarFilters, CreateCarRequest, UpdateCarRequest};
use crate::models::car::Car;
use crate::utils::errors::{AppError, AppResult};
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

pub struct CarRepository {
    pool: PgPool,
}

impl CarRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, request: CreateCarRequest) -> AppResult<Car> {
        let car = sqlx::query_as::<_, Car>(
            r#"
            INSERT INTO cars (id, make, model, year, category, price_group, license_plate, daily_rate, available, deleted, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, TRUE, FALSE, NOW(), NOW())
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(request.make)
        .bind(request.model)
        .bind(request.year)
        .bind(request.category)
        .bind(request.price_group)
        .bind(request.license_plate)
        .bind(request.daily_rate)
        .fetch_one(&self.pool)
        .await?;

        Ok(car)
    }

    /// Buscar por id; los vehículos con soft delete no se devuelven
    pub async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Car>> {
        let car = sqlx::query_as::<_, Car>("SELECT * FROM cars WHERE id = $1 AND deleted = FALSE")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(car)
    }

    pub async fn license_plate_exists(&self, license_plate: &str) -> AppResult<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM cars WHERE license_plate = $1 AND deleted = FALSE)",
        )
        .bind(license_plate)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    pub async fn list(&self, filters: &CarFilters) -> AppResult<Vec<Car>> {
        let cars = sqlx::query_as::<_, Car>(
            r#"
            SELECT * FROM cars
            WHERE deleted = FALSE
              AND ($1::car_category IS NULL OR category = $1)
              AND ($2::price_group IS NULL OR price_group = $2)
              AND ($3::bool IS NULL OR available = $3)
            ORDER BY make, model
            LIMIT $4 OFFSET $5
            "#,
        )
        .bind(filters.category)
        .bind(filters.price_group)
        .bind(filters.available)
        .bind(filters.limit.unwrap_or(100))
        .bind(filters.offset.unwrap_or(0))
        .fetch_all(&self.pool)
        .await?;

        Ok(cars)
    }

    pub async fn update(&self, id: Uuid, request: UpdateCarRequest) -> AppResult<Car> {
        let current = self
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Car with id '{}' not found", id)))?;

        let car = sqlx::query_as::<_, Car>(
            r#"
            UPDATE cars
            SET make = $2, model = $3, year = $4, category = $5, price_group = $6,
                license_plate = $7, daily_rate = $8, available = $9, updated_at = NOW()
            WHERE id = $1 AND deleted = FALSE
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(request.make.unwrap_or(current.make))
        .bind(request.model.unwrap_or(current.model))
        .bind(request.year.unwrap_or(current.year))
        .bind(request.category.unwrap_or(current.category))
        .bind(request.price_group.unwrap_or(current.price_group))
        .bind(request.license_plate.unwrap_or(current.license_plate))
        .bind(request.daily_rate.unwrap_or(current.daily_rate))
        .bind(request.available.unwrap_or(current.available))
        .fetch_one(&self.pool)
        .await?;

        Ok(car)
    }

    /// Soft delete: marca deleted = TRUE sin tocar `available`.
    /// Irreversible (no hay undelete) e idempotente: borrar un vehículo
    /// ya borrado es éxito sin cambios. Los bookings/rentals históricos
    /// conservan su referencia.
    pub async fn soft_delete(&self, id: Uuid) -> AppResult<()> {
        let result = sqlx::query(
            "UPDATE cars SET deleted = TRUE, updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Car with id '{}' not found", id)));
        }

        Ok(())
    }

    /// Cambiar el flag `available` dentro de la transacción del llamador.
    /// El filtro deleted = FALSE hace que el borrado tenga precedencia:
    /// un vehículo borrado nunca vuelve a marcarse disponible.
    pub async fn set_available_in_tx(
        conn: &mut PgConnection,
        id: Uuid,
        available: bool,
    ) -> AppResult<()> {
        sqlx::query(
            "UPDATE cars SET available = $2, updated_at = NOW() WHERE id = $1 AND deleted = FALSE",
        )
        .bind(id)
        .bind(available)
        .execute(&mut *conn)
        .await?;

        Ok(())
    }
}
