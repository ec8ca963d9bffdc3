//! Backend de gestión de alquiler de vehículos
//!
//! Ciclo de vida de reservas y alquileres sobre un motor de conflictos
//! de disponibilidad por intervalos [start, end) semiabiertos.

pub mod config;
pub mod controllers;
pub mod database;
pub mod dto;
pub mod middleware;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod services;
pub mod state;
pub mod utils;
