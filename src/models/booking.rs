//! Modelo de Booking (reserva)
//!
//! La reserva es la entidad central: une un cliente, un servicio, una
//! ubicación guardada y, una vez aceptada, un limpiador.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use uuid::Uuid;

use super::location::Location;
use super::service::Service;
use super::user::ProfileSummary;

/// Estado del ciclo de vida - mapea al ENUM booking_status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Type)]
#[sqlx(type_name = "booking_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    Pendiente,
    Confirmado,
    EnProgreso,
    Completado,
    Cancelado,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pendiente => "pendiente",
            BookingStatus::Confirmado => "confirmado",
            BookingStatus::EnProgreso => "en_progreso",
            BookingStatus::Completado => "completado",
            BookingStatus::Cancelado => "cancelado",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, BookingStatus::Completado | BookingStatus::Cancelado)
    }
}

impl std::fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Frecuencia de la reserva - mapea al ENUM booking_frequency
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type)]
#[sqlx(type_name = "booking_frequency", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    Once,
    Weekly,
    Biweekly,
    Monthly,
}

/// Booking - mapea exactamente a la tabla bookings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Booking {
    pub id: Uuid,
    pub client_id: Uuid,
    pub cleaner_id: Option<Uuid>,
    pub service_id: Uuid,
    pub location_id: Option<Uuid>,
    pub scheduled_at: DateTime<Utc>,
    pub frequency: Frequency,
    pub special_instructions: Option<String>,
    pub status: BookingStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Datos para insertar una reserva nueva (siempre en `pendiente`)
#[derive(Debug, Clone)]
pub struct NewBooking {
    pub client_id: Uuid,
    pub service_id: Uuid,
    pub location_id: Uuid,
    pub scheduled_at: DateTime<Utc>,
    pub frequency: Frequency,
    pub special_instructions: Option<String>,
}

/// Reserva con sus relaciones resueltas en una sola lectura
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookingDetails {
    #[serde(flatten)]
    pub booking: Booking,
    pub client: ProfileSummary,
    pub cleaner: Option<ProfileSummary>,
    pub service: Service,
    pub location: Option<Location>,
}

/// Condición sobre `cleaner_id` en un update condicional
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CleanerFilter {
    Unassigned,
    AssignedTo(Uuid),
}

impl CleanerFilter {
    pub fn matches(&self, cleaner_id: Option<Uuid>) -> bool {
        match self {
            CleanerFilter::Unassigned => cleaner_id.is_none(),
            CleanerFilter::AssignedTo(id) => cleaner_id == Some(*id),
        }
    }
}

/// Update condicional de una sola fila:
/// `UPDATE ... WHERE id = booking_id AND status = expected_status AND <expected_cleaner>`.
/// Cero filas afectadas significa que la reserva ya no está en el estado esperado.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusUpdate {
    pub booking_id: Uuid,
    pub expected_status: BookingStatus,
    pub expected_cleaner: CleanerFilter,
    pub new_status: BookingStatus,
    pub assign_cleaner: Option<Uuid>,
}

impl StatusUpdate {
    pub fn matches(&self, booking: &Booking) -> bool {
        booking.id == self.booking_id
            && booking.status == self.expected_status
            && self.expected_cleaner.matches(booking.cleaner_id)
    }

    /// Aplica el cambio sobre una copia local de la fila
    pub fn apply_to(&self, booking: &Booking, at: DateTime<Utc>) -> Booking {
        let mut updated = booking.clone();
        updated.status = self.new_status;
        if let Some(cleaner_id) = self.assign_cleaner {
            updated.cleaner_id = Some(cleaner_id);
        }
        updated.updated_at = at;
        updated
    }
}
