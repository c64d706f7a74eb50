//! Utilidades de validación
//!
//! Validadores custom usados por los DTOs (`#[validate(custom = ...)]`)
//! y por los servicios antes de cualquier llamada al almacenamiento.

use chrono::{DateTime, Utc};
use lazy_static::lazy_static;
use regex::Regex;
use validator::ValidationError;

lazy_static! {
    // Dígitos con separadores opcionales y prefijo internacional
    static ref PHONE_RE: Regex = Regex::new(r"^\+?[0-9][0-9 ()-]{6,18}[0-9]$").unwrap();
}

/// Validar que un string no esté vacío
pub fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("not_blank"));
    }
    Ok(())
}

/// Validar formato de teléfono (básico)
pub fn validate_phone(value: &str) -> Result<(), ValidationError> {
    let digits = value.chars().filter(|c| c.is_ascii_digit()).count();
    if !PHONE_RE.is_match(value.trim()) || !(7..=15).contains(&digits) {
        let mut error = ValidationError::new("phone");
        error.add_param("value".into(), &value.to_string());
        return Err(error);
    }
    Ok(())
}

/// Validar que una fecha esté en el futuro respecto a `now`
pub fn validate_future(value: DateTime<Utc>, now: DateTime<Utc>) -> Result<(), ValidationError> {
    if value <= now {
        let mut error = ValidationError::new("future");
        error.add_param("value".into(), &value.to_rfc3339());
        return Err(error);
    }
    Ok(())
}

/// Construir `ValidationErrors` para un solo campo
pub fn field_error(field: &'static str, error: ValidationError) -> validator::ValidationErrors {
    let mut errors = validator::ValidationErrors::new();
    errors.add(field, error);
    errors
}
