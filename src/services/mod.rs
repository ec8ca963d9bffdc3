//! Servicios del sistema
//!
//! Lógica de negocio que no pertenece a un repositorio concreto:
//! chequeo de disponibilidad, cálculo de multas y notificaciones.

pub mod availability_service;
pub mod fine_calculator;
pub mod notification_service;
