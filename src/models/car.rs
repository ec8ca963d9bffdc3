//! Modelo de Car
//!
//! Este módulo contiene el struct Car y sus enums asociados.
//! Mapea exactamente al schema PostgreSQL con primary key 'id'.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use uuid::Uuid;

/// Categoría del vehículo - mapea al ENUM car_category
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Type, PartialEq, Eq)]
#[sqlx(type_name = "car_category", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum CarCategory {
    Sedan,
    Suv,
    Hatchback,
    Van,
    Pickup,
}

/// Grupo de precio del vehículo - mapea al ENUM price_group
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Type, PartialEq, Eq)]
#[sqlx(type_name = "price_group", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum PriceGroup {
    Economy,
    Standard,
    Premium,
    Luxury,
}

/// Car principal - mapea exactamente a la tabla cars
///
/// El flag `available` es mantenido por el ciclo de vida de Rental
/// (activate lo baja, complete/cancel lo restauran). No es autoritativo
/// para una fecha concreta: la disponibilidad por intervalo se deriva
/// siempre de las reservas existentes.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Car {
    pub id: Uuid,
    pub make: String,
    pub model: String,
    pub year: i32,
    pub category: CarCategory,
    pub price_group: PriceGroup,
    pub license_plate: String,
    pub daily_rate: Decimal,
    pub available: bool,
    pub deleted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
