//! Controladores de negocio
//!
//! Orquestan validación, transacciones y máquinas de estados por encima
//! de los repositorios.

pub mod booking_controller;
pub mod car_controller;
pub mod driver_controller;
pub mod rental_controller;
