//! Cálculo de importes del alquiler
//!
//! Todos los importes son rupias enteras: no existen unidades fraccionarias
//! de moneda en ningún punto del sistema.

use chrono::NaiveDate;

use super::transition::WorkflowError;

/// Recargo fijo por pedido cuando se solicita conductor
pub const CHAUFFEUR_SURCHARGE: i64 = 150_000;

/// Duración en días del alquiler. Una duración no positiva es un error de
/// validación, nunca un pedido con precio cero.
pub fn duration_days(start_date: NaiveDate, end_date: NaiveDate) -> Result<i32, WorkflowError> {
    let days = (end_date - start_date).num_days();
    if days <= 0 {
        return Err(WorkflowError::Validation(
            "end date must be after start date".to_string(),
        ));
    }
    Ok(days as i32)
}

/// Importe total estimado: duración × tarifa diaria, más el recargo por
/// conductor cuando aplica
pub fn rental_total(duration_days: i32, daily_rate: i64, with_driver: bool) -> i64 {
    let base = i64::from(duration_days) * daily_rate;
    if with_driver {
        base + CHAUFFEUR_SURCHARGE
    } else {
        base
    }
}

/// Anticipo: 50% del total, redondeado hacia arriba
pub fn down_payment(total: i64) -> i64 {
    (total + 1) / 2
}

/// Saldo restante tras el anticipo
pub fn remaining(total: i64) -> i64 {
    total - down_payment(total)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_duration_days() {
        assert_eq!(duration_days(date(2026, 8, 10), date(2026, 8, 13)).unwrap(), 3);
        assert_eq!(duration_days(date(2026, 8, 10), date(2026, 8, 11)).unwrap(), 1);
    }

    #[test]
    fn test_duration_rejects_non_positive() {
        assert!(duration_days(date(2026, 8, 10), date(2026, 8, 10)).is_err());
        assert!(duration_days(date(2026, 8, 10), date(2026, 8, 9)).is_err());
    }

    #[test]
    fn test_rental_total() {
        assert_eq!(rental_total(3, 350_000, false), 1_050_000);
        assert_eq!(rental_total(3, 350_000, true), 1_050_000 + CHAUFFEUR_SURCHARGE);
    }

    #[test]
    fn test_down_payment_is_half_rounded_up() {
        assert_eq!(down_payment(1_000_000), 500_000);
        // Escenario E del pipeline: total impar redondea hacia arriba
        assert_eq!(down_payment(750_001), 375_001);
        assert_eq!(remaining(750_001), 375_000);
        assert_eq!(down_payment(1), 1);
        assert_eq!(remaining(1), 0);
    }

    #[test]
    fn test_dp_plus_remaining_is_total() {
        for total in [1, 2, 999, 1_000_000, 750_001, 123_456_789] {
            assert_eq!(down_payment(total) + remaining(total), total);
            assert!(down_payment(total) >= remaining(total));
            assert!(remaining(total) >= 0);
        }
    }
}
