//! Utilidades de validación
//!
//! Este módulo contiene funciones helper para validación de datos
//! y conversión de tipos.

use chrono::{DateTime, Utc};
use serde::Serialize;
use validator::ValidationError;

/// Validar que un intervalo [start, end) esté bien ordenado
pub fn validate_interval(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<(), ValidationError> {
    if start >= end {
        let mut error = ValidationError::new("interval");
        error.add_param("start".into(), &start.to_rfc3339());
        error.add_param("end".into(), &end.to_rfc3339());
        error.add_param("message".into(), &"start_date must be before end_date".to_string());
        return Err(error);
    }
    Ok(())
}

/// Validar que un valor sea no negativo (montos, multas)
pub fn validate_non_negative<T: PartialOrd + std::fmt::Display + num_traits::Zero + Serialize>(
    value: T,
) -> Result<(), ValidationError> {
    if value < T::zero() {
        let mut error = ValidationError::new("non_negative");
        error.add_param("value".into(), &value);
        return Err(error);
    }
    Ok(())
}

/// Validar formato de matrícula de vehículo
pub fn validate_license_plate(value: &str) -> Result<(), ValidationError> {
    // Formato básico: XX-123-XX o similar
    let clean_plate = value.replace([' ', '-', '_'], "");
    if clean_plate.len() < 5 || clean_plate.len() > 10 {
        let mut error = ValidationError::new("license_plate");
        error.add_param("value".into(), &value.to_string());
        return Err(error);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn interval_requires_start_before_end() {
        let start = Utc.with_ymd_and_hms(2025, 1, 10, 10, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2025, 1, 12, 10, 0, 0).unwrap();

        assert!(validate_interval(start, end).is_ok());
        assert!(validate_interval(end, start).is_err());
        // start == end también es inválido
        assert!(validate_interval(start, start).is_err());
    }

    #[test]
    fn license_plate_length_bounds() {
        assert!(validate_license_plate("AB-123-CD").is_ok());
        assert!(validate_license_plate("A1").is_err());
        assert!(validate_license_plate("ABCDEFGHIJKL").is_err());
    }
}
