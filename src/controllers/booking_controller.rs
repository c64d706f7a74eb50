use std::sync::Arc;

use uuid::Uuid;

use crate::dto::api_response::ApiResponse;
use crate::dto::booking_dto::{CreateBookingRequest, SubmitReviewRequest};
use crate::models::auth::Actor;
use crate::models::booking::{Booking, BookingDetails, BookingStatus};
use crate::models::review::Review;
use crate::repositories::BookingRepository;
use crate::services::booking_lifecycle::{BookingLifecycleService, Transition};
use crate::state::AppState;
use crate::utils::errors::{forbidden_error, not_found_error, AppError};

/// ¿Puede `actor` ver esta reserva?
/// Cliente dueño, limpiador asignado, o cualquier limpiador mientras siga
/// pendiente y sin asignar.
pub fn is_visible_to(actor: &Actor, booking: &Booking) -> bool {
    booking.client_id == actor.user_id
        || booking.cleaner_id == Some(actor.user_id)
        || (actor.is_cleaner()
            && booking.status == BookingStatus::Pendiente
            && booking.cleaner_id.is_none())
}

pub struct BookingController {
    bookings: Arc<dyn BookingRepository>,
    lifecycle: BookingLifecycleService,
}

impl BookingController {
    pub fn new(state: &AppState) -> Self {
        Self {
            bookings: state.repos.bookings.clone(),
            lifecycle: state.lifecycle.clone(),
        }
    }

    pub async fn create(
        &self,
        actor: &Actor,
        request: CreateBookingRequest,
    ) -> Result<ApiResponse<BookingDetails>, AppError> {
        let booking = self.lifecycle.create_booking(actor, request).await?;
        let details = self.details(booking.id).await?;

        Ok(ApiResponse::success_with_message(
            details,
            "Reserva creada exitosamente".to_string(),
        ))
    }

    /// Reservas propias: las del cliente o las asignadas al limpiador
    pub async fn list_mine(
        &self,
        actor: &Actor,
    ) -> Result<ApiResponse<Vec<BookingDetails>>, AppError> {
        let bookings = if actor.is_client() {
            self.bookings.list_for_client(actor.user_id).await?
        } else {
            self.bookings.list_for_cleaner(actor.user_id).await?
        };
        Ok(ApiResponse::success(bookings))
    }

    /// Trabajos disponibles para limpiadores
    pub async fn list_available(
        &self,
        actor: &Actor,
    ) -> Result<ApiResponse<Vec<BookingDetails>>, AppError> {
        if !actor.is_cleaner() {
            return Err(forbidden_error(
                "list available bookings",
                "only cleaners can browse open jobs",
            ));
        }
        Ok(ApiResponse::success(self.bookings.list_available().await?))
    }

    pub async fn get(
        &self,
        actor: &Actor,
        id: Uuid,
    ) -> Result<ApiResponse<BookingDetails>, AppError> {
        let details = self.details(id).await?;
        // Igual que una política por fila: lo que no se ve no existe
        if !is_visible_to(actor, &details.booking) {
            return Err(not_found_error("Booking", &id.to_string()));
        }
        Ok(ApiResponse::success(details))
    }

    pub async fn transition(
        &self,
        actor: &Actor,
        id: Uuid,
        transition: Transition,
    ) -> Result<ApiResponse<Booking>, AppError> {
        let booking = match transition {
            Transition::Accept => self.lifecycle.accept(actor, id).await?,
            Transition::Reject => self.lifecycle.reject(actor, id).await?,
            Transition::Start => self.lifecycle.start(actor, id).await?,
            Transition::Complete => self.lifecycle.complete(actor, id).await?,
        };
        let message = format!("Reserva en estado '{}'", booking.status);
        Ok(ApiResponse::success_with_message(booking, message))
    }

    pub async fn review(
        &self,
        actor: &Actor,
        id: Uuid,
        request: SubmitReviewRequest,
    ) -> Result<ApiResponse<Review>, AppError> {
        let review = self.lifecycle.submit_review(actor, id, request).await?;
        Ok(ApiResponse::success_with_message(
            review,
            "¡Gracias por tu reseña!".to_string(),
        ))
    }

    async fn details(&self, id: Uuid) -> Result<BookingDetails, AppError> {
        self.bookings
            .find_details(id)
            .await?
            .ok_or_else(|| not_found_error("Booking", &id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::booking::Frequency;
    use crate::models::user::UserRole;
    use chrono::Utc;

    fn booking(status: BookingStatus, cleaner_id: Option<Uuid>) -> Booking {
        let now = Utc::now();
        Booking {
            id: Uuid::new_v4(),
            client_id: Uuid::new_v4(),
            cleaner_id,
            service_id: Uuid::new_v4(),
            location_id: None,
            scheduled_at: now,
            frequency: Frequency::Once,
            special_instructions: None,
            status,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_visibility_rules() {
        let cleaner = Actor::new(Uuid::new_v4(), UserRole::Limpiador);
        let open = booking(BookingStatus::Pendiente, None);
        assert!(is_visible_to(&cleaner, &open));
        assert!(is_visible_to(&Actor::new(open.client_id, UserRole::Cliente), &open));
        assert!(!is_visible_to(&Actor::new(Uuid::new_v4(), UserRole::Cliente), &open));

        let taken = booking(BookingStatus::Confirmado, Some(Uuid::new_v4()));
        assert!(!is_visible_to(&cleaner, &taken));
        assert!(is_visible_to(&Actor::new(taken.cleaner_id.unwrap(), UserRole::Limpiador), &taken));
    }
}
