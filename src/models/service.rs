//! Modelo de Service (definición de servicio de limpieza)

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Service - mapea a la tabla services (catálogo)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Service {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub base_price: Decimal,
    pub duration_minutes: i32,
    pub active: bool,
}
