//! Modelo de Location (dirección guardada de un cliente)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Location - mapea a la tabla locations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Location {
    pub id: Uuid,
    pub client_id: Uuid,
    pub address: String,
    pub nickname: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Datos para insertar una dirección nueva
#[derive(Debug, Clone)]
pub struct NewLocation {
    pub client_id: Uuid,
    pub address: String,
    pub nickname: Option<String>,
}
