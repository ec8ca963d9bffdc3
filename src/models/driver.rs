//! Modelo de Driver
//!
//! Entidad de referencia pura: un conductor asociable a reservas y
//! alquileres. Sin ciclo de vida propio más allá del soft delete.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Driver principal - mapea exactamente a la tabla drivers
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Driver {
    pub id: Uuid,
    pub name: String,
    pub license_code: String,
    pub deleted: bool,
    pub created_at: DateTime<Utc>,
}
