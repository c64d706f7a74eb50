//! Modelo de Notification
//!
//! Las notificaciones las genera el almacenamiento (trigger) al cambiar el
//! estado de una reserva; el dueño solo puede marcarlas leídas o borrarlas.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use uuid::Uuid;

/// Tipo de notificación - mapea al ENUM notification_kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type)]
#[sqlx(type_name = "notification_kind", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    NuevaReserva,
    ReservaConfirmada,
    ReservaIniciada,
    ReservaCompletada,
    ReservaCancelada,
    NuevaResena,
    Sistema,
}

/// Notification - mapea a la tabla notifications
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Notification {
    pub id: Uuid,
    pub user_id: Uuid,
    pub kind: NotificationKind,
    pub message: String,
    pub read: bool,
    pub related_booking_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}
