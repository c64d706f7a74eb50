//! Sistema de manejo de errores
//!
//! Este módulo define todos los tipos de errores del sistema, su clasificación
//! tipada (`ErrorKind`) y su conversión a respuestas HTTP apropiadas.
//! Los llamadores deciden por `kind()`, nunca por el texto del mensaje.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};

use crate::services::booking_lifecycle::DenialReason;

/// Clasificación tipada de errores en la frontera de acceso a datos
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Validation,
    Unauthorized,
    Forbidden,
    NotFound,
    Conflict,
    Transport,
}

impl ErrorKind {
    pub fn code(&self) -> &'static str {
        match self {
            ErrorKind::Validation => "VALIDATION_ERROR",
            ErrorKind::Unauthorized => "UNAUTHORIZED",
            ErrorKind::Forbidden => "FORBIDDEN",
            ErrorKind::NotFound => "NOT_FOUND",
            ErrorKind::Conflict => "CONFLICT",
            ErrorKind::Transport => "TRANSPORT_ERROR",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "VALIDATION_ERROR" => Some(ErrorKind::Validation),
            "UNAUTHORIZED" => Some(ErrorKind::Unauthorized),
            "FORBIDDEN" => Some(ErrorKind::Forbidden),
            "NOT_FOUND" => Some(ErrorKind::NotFound),
            "CONFLICT" => Some(ErrorKind::Conflict),
            "TRANSPORT_ERROR" => Some(ErrorKind::Transport),
            _ => None,
        }
    }

    /// Mapea un status HTTP cuando la respuesta no trae `code`
    pub fn from_status(status: u16) -> Self {
        match status {
            400 | 422 => ErrorKind::Validation,
            401 => ErrorKind::Unauthorized,
            403 => ErrorKind::Forbidden,
            404 => ErrorKind::NotFound,
            409 => ErrorKind::Conflict,
            _ => ErrorKind::Transport,
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            ErrorKind::Validation => StatusCode::BAD_REQUEST,
            ErrorKind::Unauthorized => StatusCode::UNAUTHORIZED,
            ErrorKind::Forbidden => StatusCode::FORBIDDEN,
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::Conflict => StatusCode::CONFLICT,
            ErrorKind::Transport => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Errores principales de la aplicación
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(sqlx::Error),

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Transition denied: {0}")]
    Denied(#[from] DenialReason),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Cache error: {0}")]
    Cache(String),

    #[error("JWT error: {0}")]
    Jwt(String),

    #[error("Hash error: {0}")]
    Hash(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AppError::Validation(_) | AppError::InvalidInput(_) => ErrorKind::Validation,
            AppError::Unauthorized(_) | AppError::Jwt(_) => ErrorKind::Unauthorized,
            AppError::Forbidden(_) | AppError::Denied(_) => ErrorKind::Forbidden,
            AppError::NotFound(_) => ErrorKind::NotFound,
            AppError::Conflict(_) => ErrorKind::Conflict,
            AppError::Database(_)
            | AppError::Cache(_)
            | AppError::Hash(_)
            | AppError::Internal(_) => ErrorKind::Transport,
        }
    }
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_error) = &e {
            match db_error.code().as_deref() {
                // unique_violation
                Some("23505") => return AppError::Conflict(db_error.message().to_string()),
                // insufficient_privilege (políticas por fila)
                Some("42501") => return AppError::Forbidden(db_error.message().to_string()),
                _ => {}
            }
        }
        AppError::Database(e)
    }
}

/// Respuesta de error para la API
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let kind = self.kind();

        let (error_title, message, details) = match self {
            AppError::Database(e) => {
                error!("❌ Database error: {}", e);
                (
                    "Database Error",
                    "An error occurred while accessing the database".to_string(),
                    None,
                )
            }
            AppError::Validation(e) => {
                warn!("⚠️ Validation error: {}", e);
                (
                    "Validation Error",
                    "The provided data is invalid".to_string(),
                    Some(json!(e)),
                )
            }
            AppError::InvalidInput(msg) => {
                warn!("⚠️ Invalid input: {}", msg);
                ("Validation Error", msg, None)
            }
            AppError::Unauthorized(msg) => {
                warn!("🔒 Unauthorized access: {}", msg);
                ("Unauthorized", msg, None)
            }
            AppError::Jwt(msg) => {
                warn!("🔒 JWT error: {}", msg);
                ("Unauthorized", msg, None)
            }
            AppError::Forbidden(msg) => {
                warn!("⛔ Forbidden access: {}", msg);
                ("Forbidden", msg, None)
            }
            AppError::Denied(reason) => {
                warn!("⛔ Transition denied: {}", reason);
                (
                    "Forbidden",
                    reason.to_string(),
                    Some(json!({ "reason": reason.code() })),
                )
            }
            AppError::NotFound(msg) => {
                warn!("🔍 Resource not found: {}", msg);
                ("Not Found", msg, None)
            }
            AppError::Conflict(msg) => {
                warn!("⚠️ Conflict: {}", msg);
                ("Conflict", msg, None)
            }
            AppError::Cache(msg) => {
                error!("❌ Cache error: {}", msg);
                (
                    "Cache Error",
                    "An error occurred while accessing the cache".to_string(),
                    None,
                )
            }
            AppError::Hash(msg) => {
                error!("❌ Hash error: {}", msg);
                (
                    "Hash Error",
                    "An error occurred while processing credentials".to_string(),
                    None,
                )
            }
            AppError::Internal(msg) => {
                error!("❌ Internal error: {}", msg);
                (
                    "Internal Server Error",
                    "An unexpected error occurred".to_string(),
                    None,
                )
            }
        };

        let body = ErrorResponse {
            error: error_title.to_string(),
            message,
            details,
            code: Some(kind.code().to_string()),
        };

        (kind.status(), Json(body)).into_response()
    }
}

/// Resultado tipado para operaciones que pueden fallar
pub type AppResult<T> = Result<T, AppError>;

/// Función helper para crear errores de recurso no encontrado
pub fn not_found_error(resource: &str, id: &str) -> AppError {
    AppError::NotFound(format!("{} with id '{}' not found", resource, id))
}

/// Función helper para crear errores de conflicto
pub fn conflict_error(resource: &str, field: &str, value: &str) -> AppError {
    AppError::Conflict(format!("{} with {} '{}' already exists", resource, field, value))
}

/// Función helper para crear errores de acceso prohibido
pub fn forbidden_error(operation: &str, reason: &str) -> AppError {
    AppError::Forbidden(format!("Cannot {}: {}", operation, reason))
}
