//! DTOs de Car

use crate::models::car::{Car, CarCategory, PriceGroup};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Request para registrar un nuevo vehículo
#[derive(Debug, Deserialize, Validate)]
pub struct CreateCarRequest {
    #[validate(length(min = 2, max = 100))]
    pub make: String,

    #[validate(length(min = 1, max = 100))]
    pub model: String,

    #[validate(range(min = 1950, max = 2030))]
    pub year: i32,

    pub category: CarCategory,

    pub price_group: PriceGroup,

    #[validate(length(min = 5, max = 20))]
    pub license_plate: String,

    pub daily_rate: Decimal,
}

/// Request para actualizar un vehículo existente
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateCarRequest {
    #[validate(length(min = 2, max = 100))]
    pub make: Option<String>,

    #[validate(length(min = 1, max = 100))]
    pub model: Option<String>,

    #[validate(range(min = 1950, max = 2030))]
    pub year: Option<i32>,

    pub category: Option<CarCategory>,

    pub price_group: Option<PriceGroup>,

    #[validate(length(min = 5, max = 20))]
    pub license_plate: Option<String>,

    pub daily_rate: Option<Decimal>,

    pub available: Option<bool>,
}

/// Filtros para listar vehículos
#[derive(Debug, Deserialize)]
pub struct CarFilters {
    pub category: Option<CarCategory>,
    pub price_group: Option<PriceGroup>,
    pub available: Option<bool>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Query para buscar vehículos disponibles en un intervalo [start, end)
#[derive(Debug, Deserialize)]
pub struct AvailabilityQuery {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub category: Option<CarCategory>,
    pub price_group: Option<PriceGroup>,
}

/// Query para consultar si un vehículo concreto está libre en [start, end)
#[derive(Debug, Deserialize)]
pub struct CheckAvailabilityQuery {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

/// Response de vehículo para la API
#[derive(Debug, Serialize)]
pub struct CarResponse {
    pub id: Uuid,
    pub make: String,
    pub model: String,
    pub year: i32,
    pub category: CarCategory,
    pub price_group: PriceGroup,
    pub license_plate: String,
    pub daily_rate: Decimal,
    pub available: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Car> for CarResponse {
    fn from(car: Car) -> Self {
        Self {
            id: car.id,
            make: car.make,
            model: car.model,
            year: car.year,
            category: car.category,
            price_group: car.price_group,
            license_plate: car.license_plate,
            daily_rate: car.daily_rate,
            available: car.available,
            created_at: car.created_at,
            updated_at: car.updated_at,
        }
    }
}
