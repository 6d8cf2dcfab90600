//! Utilidades de validación
//!
//! Este módulo contiene funciones helper para validación de datos
//! y conversión de tipos.

use chrono::NaiveDate;
use lazy_static::lazy_static;
use regex::Regex;
use uuid::Uuid;
use validator::ValidationError;

lazy_static! {
    /// Matrícula indonesia: letras de región, número, sufijo (ej. "B 1234 XYZ")
    static ref LICENSE_PLATE_RE: Regex =
        Regex::new(r"^[A-Z]{1,2}\s?\d{1,4}\s?[A-Z]{0,3}$").unwrap();

    /// Teléfono local o internacional, 8 a 15 dígitos
    static ref PHONE_RE: Regex = Regex::new(r"^\+?\d{8,15}$").unwrap();
}

/// Validar y convertir string a UUID
pub fn validate_uuid(value: &str) -> Result<Uuid, ValidationError> {
    Uuid::parse_str(value).map_err(|_| {
        let mut error = ValidationError::new("uuid");
        error.add_param("value".into(), &value.to_string());
        error
    })
}

/// Validar y convertir string a fecha
pub fn validate_date(value: &str) -> Result<NaiveDate, ValidationError> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| {
        let mut error = ValidationError::new("date");
        error.add_param("value".into(), &value.to_string());
        error.add_param("format".into(), &"YYYY-MM-DD".to_string());
        error
    })
}

/// Validar formato de matrícula
pub fn validate_license_plate(value: &str) -> Result<(), ValidationError> {
    if !LICENSE_PLATE_RE.is_match(value.trim()) {
        let mut error = ValidationError::new("license_plate");
        error.add_param("value".into(), &value.to_string());
        return Err(error);
    }
    Ok(())
}

/// Validar formato de teléfono
pub fn validate_phone(value: &str) -> Result<(), ValidationError> {
    if !PHONE_RE.is_match(value.trim()) {
        let mut error = ValidationError::new("phone");
        error.add_param("value".into(), &value.to_string());
        return Err(error);
    }
    Ok(())
}

/// Validar que un string no esté vacío
pub fn validate_not_empty(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut error = ValidationError::new("not_empty");
        error.add_param("value".into(), &value.to_string());
        return Err(error);
    }
    Ok(())
}

/// Validar que un importe en rupias sea positivo
pub fn validate_amount(value: i64) -> Result<(), ValidationError> {
    if value <= 0 {
        let mut error = ValidationError::new("amount");
        error.add_param("value".into(), &value);
        return Err(error);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_license_plate() {
        assert!(validate_license_plate("B 1234 XYZ").is_ok());
        assert!(validate_license_plate("DK 42 AB").is_ok());
        assert!(validate_license_plate("not-a-plate").is_err());
        assert!(validate_license_plate("").is_err());
    }

    #[test]
    fn test_validate_phone() {
        assert!(validate_phone("+6281234567890").is_ok());
        assert!(validate_phone("08123456789").is_ok());
        assert!(validate_phone("12ab34").is_err());
    }

    #[test]
    fn test_validate_date() {
        assert!(validate_date("2026-08-06").is_ok());
        assert!(validate_date("06-08-2026").is_err());
    }

    #[test]
    fn test_validate_amount() {
        assert!(validate_amount(500_000).is_ok());
        assert!(validate_amount(0).is_err());
        assert!(validate_amount(-1).is_err());
    }
}
