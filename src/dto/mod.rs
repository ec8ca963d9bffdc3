//! DTOs de la API
//!
//! Requests y responses de la API HTTP, separados de los modelos
//! que mapean al schema.

pub mod booking_dto;
pub mod car_dto;
pub mod common;
pub mod driver_dto;
pub mod rental_dto;
