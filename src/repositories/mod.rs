//! Repositorios de persistencia
//!
//! Acceso a PostgreSQL vía SQLx, un repositorio por agregado. Las
//! variantes `_in_tx` aceptan una conexión para participar en la
//! transacción del llamador.

pub mod booking_repository;
pub mod car_repository;
pub mod driver_repository;
pub mod rental_repository;
