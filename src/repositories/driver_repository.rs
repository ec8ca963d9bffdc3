use crate::dto::driver_dto::CreateDriverRequest;
use crate::models::driver::Driver;
use crate::utils::errors::{AppError, AppResult};
use sqlx::PgPool;
use uuid::Uuid;

pub struct DriverRepository {
    pool: PgPool,
}

impl DriverRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, request: CreateDriverRequest) -> AppResult<Driver> {
        let driver = sqlx::query_as::<_, Driver>(
            r#"
            INSERT INTO drivers (id, name, license_code, deleted, created_at)
            VALUES ($1, $2, $3, FALSE, NOW())
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(request.name)
        .bind(request.license_code)
        .fetch_one(&self.pool)
        .await?;

        Ok(driver)
    }

    pub async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Driver>> {
        let driver = sqlx::query_as::<_, Driver>(
            "SELECT * FROM drivers WHERE id = $1 AND deleted = FALSE",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(driver)
    }

    pub async fn license_code_exists(&self, license_code: &str) -> AppResult<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM drivers WHERE license_code = $1 AND deleted = FALSE)",
        )
        .bind(license_code)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    pub async fn list(&self) -> AppResult<Vec<Driver>> {
        let drivers = sqlx::query_as::<_, Driver>(
            "SELECT * FROM drivers WHERE deleted = FALSE ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(drivers)
    }

    pub async fn soft_delete(&self, id: Uuid) -> AppResult<()> {
        let result = sqlx::query("UPDATE drivers SET deleted = TRUE WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "Driver with id '{}' not found",
                id
            )));
        }

        Ok(())
    }
}
