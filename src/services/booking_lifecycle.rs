//! Ciclo de vida de la reserva
//!
//! Única autoridad sobre las transiciones de `status`:
//!
//! | Desde       | Hacia       | Actor     | Precondición                          |
//! |-------------|-------------|-----------|---------------------------------------|
//! | (ninguno)   | pendiente   | cliente   | servicio activo, ubicación propia, fecha futura |
//! | pendiente   | confirmado  | limpiador | sin asignar; asigna al limpiador      |
//! | pendiente   | cancelado   | limpiador | sin asignar                           |
//! | confirmado  | en_progreso | limpiador | es el limpiador asignado              |
//! | en_progreso | completado  | limpiador | es el limpiador asignado              |
//! | completado  | (reseña)    | cliente   | dueño de la reserva, una sola vez     |
//!
//! `can_transition` y `can_review` son funciones puras. El servicio ejecuta cada
//! transición como un único update condicional; cero filas afectadas se reporta
//! como `Conflict` sin reintentos ni compensaciones.

use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;
use validator::Validate;

use crate::dto::booking_dto::{CreateBookingRequest, SubmitReviewRequest};
use crate::models::auth::Actor;
use crate::models::booking::{Booking, BookingStatus, CleanerFilter, NewBooking, StatusUpdate};
use crate::models::review::{NewReview, Review};
use crate::models::user::UserRole;
use crate::realtime::{ChangeEvent, ChangeFeed, ChangeKind, Entity};
use crate::repositories::{
    BookingRepository, LocationRepository, ReviewRepository, ServiceRepository,
};
use crate::utils::errors::{not_found_error, AppError, AppResult};
use crate::utils::validation::{field_error, validate_future};

/// Motivo por el que el guard rechaza una acción
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error, Serialize)]
pub enum DenialReason {
    #[error("el rol '{actual}' no puede realizar esta acción (requiere '{required}')")]
    WrongRole { required: UserRole, actual: UserRole },

    #[error("solo el limpiador asignado puede realizar esta acción")]
    NotAssignedCleaner,

    #[error("la reserva ya tiene un limpiador asignado")]
    AlreadyAssigned,

    #[error("transición no permitida de '{from}' a '{to}'")]
    InvalidTransition { from: BookingStatus, to: BookingStatus },

    #[error("la reserva está en un estado final ('{0}')")]
    TerminalState(BookingStatus),

    #[error("solo el cliente de la reserva puede reseñarla")]
    NotBookingOwner,

    #[error("la reserva debe estar completada para reseñarla (estado actual '{0}')")]
    NotCompleted(BookingStatus),
}

impl DenialReason {
    pub fn code(&self) -> &'static str {
        match self {
            DenialReason::WrongRole { .. } => "wrong_role",
            DenialReason::NotAssignedCleaner => "not_assigned_cleaner",
            DenialReason::AlreadyAssigned => "already_assigned",
            DenialReason::InvalidTransition { .. } => "invalid_transition",
            DenialReason::TerminalState(_) => "terminal_state",
            DenialReason::NotBookingOwner => "not_booking_owner",
            DenialReason::NotCompleted(_) => "not_completed",
        }
    }
}

/// Transiciones que un limpiador puede pedir sobre una reserva existente
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Transition {
    Accept,
    Reject,
    Start,
    Complete,
}

impl Transition {
    pub fn target(&self) -> BookingStatus {
        match self {
            Transition::Accept => BookingStatus::Confirmado,
            Transition::Reject => BookingStatus::Cancelado,
            Transition::Start => BookingStatus::EnProgreso,
            Transition::Complete => BookingStatus::Completado,
        }
    }

    pub fn expected_prior(&self) -> BookingStatus {
        match self {
            Transition::Accept | Transition::Reject => BookingStatus::Pendiente,
            Transition::Start => BookingStatus::Confirmado,
            Transition::Complete => BookingStatus::EnProgreso,
        }
    }

    /// Update condicional que ejecuta esta transición para `actor_id`
    pub fn conditional_update(&self, booking_id: Uuid, actor_id: Uuid) -> StatusUpdate {
        let (expected_cleaner, assign_cleaner) = match self {
            Transition::Accept => (CleanerFilter::Unassigned, Some(actor_id)),
            Transition::Reject => (CleanerFilter::Unassigned, None),
            Transition::Start | Transition::Complete => (CleanerFilter::AssignedTo(actor_id), None),
        };

        StatusUpdate {
            booking_id,
            expected_status: self.expected_prior(),
            expected_cleaner,
            new_status: self.target(),
            assign_cleaner,
        }
    }
}

fn require_role(actor: &Actor, required: UserRole) -> Result<(), DenialReason> {
    if actor.role != required {
        return Err(DenialReason::WrongRole {
            required,
            actual: actor.role,
        });
    }
    Ok(())
}

/// Guard central: ¿puede `actor` llevar `booking` a `target`?
///
/// Aceptar solo exige el rol: estado y limpiador los comprueba el update
/// condicional, así que quien pierde la carrera recibe siempre `Conflict`
/// tanto si leyó la fila antes como después del ganador.
pub fn can_transition(
    actor: &Actor,
    booking: &Booking,
    target: BookingStatus,
) -> Result<Transition, DenialReason> {
    require_role(actor, UserRole::Limpiador)?;

    if target == BookingStatus::Confirmado {
        return Ok(Transition::Accept);
    }

    if booking.status.is_terminal() {
        return Err(DenialReason::TerminalState(booking.status));
    }

    let transition = match target {
        BookingStatus::Cancelado => Transition::Reject,
        BookingStatus::EnProgreso => Transition::Start,
        BookingStatus::Completado => Transition::Complete,
        BookingStatus::Confirmado | BookingStatus::Pendiente => {
            return Err(DenialReason::InvalidTransition {
                from: booking.status,
                to: target,
            })
        }
    };

    if transition == Transition::Reject {
        if booking.cleaner_id.is_some() {
            return Err(DenialReason::AlreadyAssigned);
        }
    } else if booking.cleaner_id != Some(actor.user_id) {
        return Err(DenialReason::NotAssignedCleaner);
    }

    if booking.status != transition.expected_prior() {
        return Err(DenialReason::InvalidTransition {
            from: booking.status,
            to: target,
        });
    }

    Ok(transition)
}

/// Guard de reseña: cliente dueño y reserva completada
pub fn can_review(actor: &Actor, booking: &Booking) -> Result<(), DenialReason> {
    require_role(actor, UserRole::Cliente)?;

    if booking.client_id != actor.user_id {
        return Err(DenialReason::NotBookingOwner);
    }
    if booking.status != BookingStatus::Completado {
        return Err(DenialReason::NotCompleted(booking.status));
    }
    Ok(())
}

/// Servicio que ejecuta el ciclo de vida contra los repositorios
#[derive(Clone)]
pub struct BookingLifecycleService {
    bookings: Arc<dyn BookingRepository>,
    reviews: Arc<dyn ReviewRepository>,
    services: Arc<dyn ServiceRepository>,
    locations: Arc<dyn LocationRepository>,
    feed: ChangeFeed,
}

impl BookingLifecycleService {
    pub fn new(
        bookings: Arc<dyn BookingRepository>,
        reviews: Arc<dyn ReviewRepository>,
        services: Arc<dyn ServiceRepository>,
        locations: Arc<dyn LocationRepository>,
        feed: ChangeFeed,
    ) -> Self {
        Self {
            bookings,
            reviews,
            services,
            locations,
            feed,
        }
    }

    /// (ninguno) -> pendiente
    pub async fn create_booking(
        &self,
        actor: &Actor,
        request: CreateBookingRequest,
    ) -> AppResult<Booking> {
        require_role(actor, UserRole::Cliente)?;
        request.validate()?;
        validate_future(request.scheduled_at, Utc::now())
            .map_err(|e| AppError::Validation(field_error("scheduled_at", e)))?;

        let service = self
            .services
            .find_by_id(request.service_id)
            .await?
            .filter(|s| s.active)
            .ok_or_else(|| {
                AppError::InvalidInput("El servicio seleccionado no está disponible".to_string())
            })?;

        let location = self
            .locations
            .find_by_id(request.location_id)
            .await?
            .filter(|l| l.client_id == actor.user_id)
            .ok_or_else(|| {
                AppError::InvalidInput("La ubicación no pertenece al cliente".to_string())
            })?;

        let booking = self
            .bookings
            .insert(NewBooking {
                client_id: actor.user_id,
                service_id: service.id,
                location_id: location.id,
                scheduled_at: request.scheduled_at,
                frequency: request.frequency,
                special_instructions: request
                    .special_instructions
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty()),
            })
            .await?;

        info!("🧹 Reserva {} creada por cliente {}", booking.id, actor.user_id);
        self.publish(ChangeKind::Insert, &booking);
        Ok(booking)
    }

    pub async fn accept(&self, actor: &Actor, booking_id: Uuid) -> AppResult<Booking> {
        self.transition(actor, booking_id, BookingStatus::Confirmado).await
    }

    pub async fn reject(&self, actor: &Actor, booking_id: Uuid) -> AppResult<Booking> {
        self.transition(actor, booking_id, BookingStatus::Cancelado).await
    }

    pub async fn start(&self, actor: &Actor, booking_id: Uuid) -> AppResult<Booking> {
        self.transition(actor, booking_id, BookingStatus::EnProgreso).await
    }

    pub async fn complete(&self, actor: &Actor, booking_id: Uuid) -> AppResult<Booking> {
        self.transition(actor, booking_id, BookingStatus::Completado).await
    }

    /// Lee la fila actual y aplica la transición sobre ella
    pub async fn transition(
        &self,
        actor: &Actor,
        booking_id: Uuid,
        target: BookingStatus,
    ) -> AppResult<Booking> {
        let booking = self
            .bookings
            .find_by_id(booking_id)
            .await?
            .ok_or_else(|| not_found_error("Booking", &booking_id.to_string()))?;

        self.apply_transition(actor, &booking, target).await
    }

    /// Aplica la transición sobre la copia que tiene el llamador. Si la fila
    /// cambió desde entonces el update afecta cero filas y se devuelve
    /// `Conflict`; el llamador debe volver a leer.
    pub async fn apply_transition(
        &self,
        actor: &Actor,
        snapshot: &Booking,
        target: BookingStatus,
    ) -> AppResult<Booking> {
        let transition = can_transition(actor, snapshot, target)?;
        let update = transition.conditional_update(snapshot.id, actor.user_id);

        let affected = self.bookings.apply_status_update(&update).await?;
        if affected == 0 {
            warn!(
                "⚠️ Reserva {}: {:?} por {} afectó 0 filas (estado obsoleto)",
                snapshot.id, transition, actor.user_id
            );
            return Err(AppError::Conflict(format!(
                "La reserva {} ya no está en estado '{}'",
                snapshot.id,
                update.expected_status
            )));
        }

        let updated = update.apply_to(snapshot, Utc::now());
        info!(
            "✅ Reserva {}: {} -> {} por {}",
            updated.id, snapshot.status, updated.status, actor.user_id
        );
        self.publish(ChangeKind::Update, &updated);
        Ok(updated)
    }

    /// completado -> (reseñada)
    pub async fn submit_review(
        &self,
        actor: &Actor,
        booking_id: Uuid,
        request: SubmitReviewRequest,
    ) -> AppResult<Review> {
        // Validación local antes de tocar el almacenamiento
        request.validate()?;

        let booking = self
            .bookings
            .find_by_id(booking_id)
            .await?
            .ok_or_else(|| not_found_error("Booking", &booking_id.to_string()))?;

        can_review(actor, &booking)?;

        let cleaner_id = booking.cleaner_id.ok_or_else(|| {
            AppError::Internal(format!("Reserva completada {} sin limpiador", booking.id))
        })?;

        if self.reviews.find_by_booking(booking.id).await?.is_some() {
            return Err(AppError::Conflict("La reserva ya tiene una reseña".to_string()));
        }

        let review = self
            .reviews
            .insert(NewReview {
                booking_id: booking.id,
                client_id: actor.user_id,
                cleaner_id,
                rating: request.rating,
                comment: request
                    .comment
                    .map(|c| c.trim().to_string())
                    .filter(|c| !c.is_empty()),
            })
            .await?;

        info!("⭐ Reseña {} ({}★) para reserva {}", review.id, review.rating, booking.id);
        Ok(review)
    }

    fn publish(&self, kind: ChangeKind, booking: &Booking) {
        let mut owners = vec![booking.client_id];
        owners.extend(booking.cleaner_id);
        self.feed
            .publish(ChangeEvent::new(Entity::Bookings, kind, booking.id, owners, booking));
    }
}
