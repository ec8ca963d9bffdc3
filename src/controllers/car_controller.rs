//! Registro de vehículos
//!
//! CRUD con soft delete y consultas de disponibilidad por intervalo.

use crate::dto::car_dto::{
    AvailabilityQuery, CarFilters, CarResponse, CreateCarRequest, UpdateCarRequest,
};
use crate::dto::common::ApiResponse;
use crate::repositories::car_repository::CarRepository;
use crate::services::availability_service;
use crate::utils::errors::{AppError, AppResult};
use crate::utils::validation::validate_license_plate;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

pub struct CarController {
    pool: PgPool,
    repository: CarRepository,
}

impl CarController {
    pub fn new(pool: PgPool) -> Self {
        Self {
            repository: CarRepository::new(pool.clone()),
            pool,
        }
    }

    pub async fn create(&self, request: CreateCarRequest) -> AppResult<ApiResponse<CarResponse>> {
        request.validate()?;
        validate_license_plate(&request.license_plate).map_err(|error| {
            let mut errors = validator::ValidationErrors::new();
            errors.add("license_plate", error);
            AppError::Validation(errors)
        })?;

        if self
            .repository
            .license_plate_exists(&request.license_plate)
            .await?
        {
            return Err(AppError::Conflict(format!(
                "Car with license plate '{}' already exists",
                request.license_plate
            )));
        }

        let car = self.repository.create(request).await?;

        Ok(ApiResponse::success_with_message(
            car.into(),
            "Vehículo creado exitosamente".to_string(),
        ))
    }

    pub async fn get_by_id(&self, id: Uuid) -> AppResult<CarResponse> {
        let car = self
            .repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Car with id '{}' not found", id)))?;

        Ok(car.into())
    }

    pub async fn list(&self, filters: CarFilters) -> AppResult<Vec<CarResponse>> {
        let cars = self.repository.list(&filters).await?;
        Ok(cars.into_iter().map(Into::into).collect())
    }

    /// Vehículos libres de conflictos para [start, end)
    pub async fn list_available(&self, query: AvailabilityQuery) -> AppResult<Vec<CarResponse>> {
        let cars = availability_service::list_available_cars(
            &self.pool,
            query.start,
            query.end,
            query.category,
            query.price_group,
        )
        .await?;

        Ok(cars.into_iter().map(Into::into).collect())
    }

    /// ¿Está este vehículo libre para [start, end)?
    pub async fn check_availability(
        &self,
        id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> AppResult<bool> {
        availability_service::is_available(&self.pool, id, start, end).await
    }

    pub async fn update(
        &self,
        id: Uuid,
        request: UpdateCarRequest,
    ) -> AppResult<ApiResponse<CarResponse>> {
        request.validate()?;

        let car = self.repository.update(id, request).await?;

        Ok(ApiResponse::success_with_message(
            car.into(),
            "Vehículo actualizado exitosamente".to_string(),
        ))
    }

    /// Soft delete: el vehículo desaparece de búsquedas y disponibilidad,
    /// pero su historial de reservas y alquileres se conserva
    pub async fn delete(&self, id: Uuid) -> AppResult<()> {
        self.repository.soft_delete(id).await
    }
}
