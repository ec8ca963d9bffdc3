//! Registro de conductores

use crate::dto::common::ApiResponse;
use crate::dto::driver_dto::{CreateDriverRequest, DriverResponse};
use crate::repositories::driver_repository::DriverRepository;
use crate::utils::errors::{AppError, AppResult};
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

pub struct DriverController {
    repository: DriverRepository,
}

impl DriverController {
    pub fn new(pool: PgPool) -> Self {
        Self {
            repository: DriverRepository::new(pool),
        }
    }

    pub async fn create(
        &self,
        request: CreateDriverRequest,
    ) -> AppResult<ApiResponse<DriverResponse>> {
        request.validate()?;

        if self
            .repository
            .license_code_exists(&request.license_code)
            .await?
        {
            return Err(AppError::Conflict(format!(
                "Driver with license code '{}' already exists",
                request.license_code
            )));
        }

        let driver = self.repository.create(request).await?;

        Ok(ApiResponse::success_with_message(
            driver.into(),
            "Conductor registrado exitosamente".to_string(),
        ))
    }

    pub async fn get_by_id(&self, id: Uuid) -> AppResult<DriverResponse> {
        let driver = self
            .repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Driver with id '{}' not found", id)))?;

        Ok(driver.into())
    }

    pub async fn list(&self) -> AppResult<Vec<DriverResponse>> {
        let drivers = self.repository.list().await?;
        Ok(drivers.into_iter().map(Into::into).collect())
    }

    pub async fn delete(&self, id: Uuid) -> AppResult<()> {
        self.repository.soft_delete(id).await
    }
}
