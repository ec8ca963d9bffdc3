//! Calculadora de multas por devolución tardía
//!
//! Función pura invocada por el ciclo de vida de Rental al completar.
//! La multa es ceil(días de retraso) * tarifa diaria: una hora tarde
//! ya cuenta como un día completo.

use crate::utils::errors::{AppError, AppResult};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

const SECONDS_PER_DAY: i64 = 86_400;

/// Calcular la multa por retraso entre la devolución esperada y la real.
///
/// Devuelve 0 si la devolución fue puntual o anticipada. Un resultado
/// negativo (tarifa corrupta) es un defecto y se reporta como error,
/// nunca se recorta a cero en silencio.
pub fn compute_fine(
    expected_return_date: DateTime<Utc>,
    actual_return_date: DateTime<Utc>,
    daily_late_fee_rate: Decimal,
) -> AppResult<Decimal> {
    if daily_late_fee_rate < Decimal::ZERO {
        return Err(AppError::Internal(format!(
            "daily late fee rate is negative: {}",
            daily_late_fee_rate
        )));
    }

    if actual_return_date <= expected_return_date {
        return Ok(Decimal::ZERO);
    }

    let late = actual_return_date - expected_return_date;
    // ceil a días completos; num_seconds trunca, así que un retraso
    // subsegundo daría 0 y cuenta igualmente como un día
    let days_late = ((late.num_seconds() + SECONDS_PER_DAY - 1) / SECONDS_PER_DAY).max(1);

    let fine = Decimal::from(days_late) * daily_late_fee_rate;
    if fine < Decimal::ZERO {
        return Err(AppError::Internal(format!(
            "computed fine is negative: {} ({} days late at rate {})",
            fine, days_late, daily_late_fee_rate
        )));
    }

    Ok(fine)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn expected() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 12, 10, 0, 0).unwrap()
    }

    #[test]
    fn on_time_return_has_no_fine() {
        let rate = Decimal::from(50);
        assert_eq!(compute_fine(expected(), expected(), rate).unwrap(), Decimal::ZERO);
    }

    #[test]
    fn early_return_has_no_fine() {
        let rate = Decimal::from(50);
        let actual = expected() - Duration::hours(5);
        assert_eq!(compute_fine(expected(), actual, rate).unwrap(), Decimal::ZERO);
    }

    #[test]
    fn subsecond_late_return_still_counts_as_a_full_day() {
        // Utc::now() trae precisión subsegundo; un retraso de medio
        // segundo sigue siendo un retraso
        let rate = Decimal::from(50);
        let actual = expected() + Duration::milliseconds(500);
        assert_eq!(compute_fine(expected(), actual, rate).unwrap(), Decimal::from(50));
    }

    #[test]
    fn one_hour_late_counts_as_a_full_day() {
        let rate = Decimal::from(50);
        let actual = expected() + Duration::hours(1);
        assert_eq!(compute_fine(expected(), actual, rate).unwrap(), Decimal::from(50));
    }

    #[test]
    fn twenty_five_hours_late_rounds_up_to_two_days() {
        let rate = Decimal::from(50);
        let actual = expected() + Duration::hours(25);
        assert_eq!(compute_fine(expected(), actual, rate).unwrap(), Decimal::from(100));
    }

    #[test]
    fn exactly_one_day_late_is_one_day() {
        let rate = Decimal::from(75);
        let actual = expected() + Duration::hours(24);
        assert_eq!(compute_fine(expected(), actual, rate).unwrap(), Decimal::from(75));
    }

    #[test]
    fn negative_rate_fails_loudly() {
        let actual = expected() + Duration::hours(1);
        let result = compute_fine(expected(), actual, Decimal::from(-10));
        assert!(matches!(result, Err(AppError::Internal(_))));
    }
}
