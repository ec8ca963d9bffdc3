//! Configuración de variables de entorno
//!
//! Este módulo maneja la configuración del entorno y variables de configuración,
//! incluidas las políticas de negocio del alquiler (tarifa de multa por retraso,
//! auto-confirmación de reservas creadas por staff).

use rust_decimal::Decimal;
use std::env;
use std::str::FromStr;

/// Configuración del entorno
#[derive(Debug, Clone)]
pub struct EnvironmentConfig {
    pub environment: String,
    pub port: u16,
    pub host: String,
    pub jwt_secret: String,
    pub cors_origins: Vec<String>,
    /// Tarifa diaria de multa por devolución tardía
    pub daily_late_fee_rate: Decimal,
    /// Si una reserva creada por staff nace confirmada en vez de pendiente
    pub auto_confirm_staff_bookings: bool,
}

impl Default for EnvironmentConfig {
    fn default() -> Self {
        Self {
            environment: env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .expect("PORT must be a valid number"),
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            jwt_secret: env::var("JWT_SECRET").expect("JWT_SECRET must be set"),
            cors_origins: env::var("CORS_ORIGINS")
                .unwrap_or_else(|_| "*".to_string())
                .split(',')
                .map(|s| s.trim().to_string())
                .collect(),
            daily_late_fee_rate: Decimal::from_str(
                &env::var("DAILY_LATE_FEE_RATE").unwrap_or_else(|_| "50".to_string()),
            )
            .expect("DAILY_LATE_FEE_RATE must be a valid decimal"),
            auto_confirm_staff_bookings: env::var("AUTO_CONFIRM_STAFF_BOOKINGS")
                .unwrap_or_else(|_| "true".to_string())
                .parse()
                .expect("AUTO_CONFIRM_STAFF_BOOKINGS must be true or false"),
        }
    }
}
