use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use uuid::Uuid;

use crate::controllers::booking_controller::BookingController;
use crate::dto::api_response::ApiResponse;
use crate::dto::booking_dto::{CreateBookingRequest, SubmitReviewRequest};
use crate::middleware::AuthUser;
use crate::models::booking::{Booking, BookingDetails};
use crate::models::review::Review;
use crate::services::Transition;
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_booking_router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_booking).get(list_bookings))
        .route("/available", get(list_available))
        .route("/:id", get(get_booking))
        .route("/:id/accept", post(accept_booking))
        .route("/:id/reject", post(reject_booking))
        .route("/:id/start", post(start_booking))
        .route("/:id/complete", post(complete_booking))
        .route("/:id/review", post(review_booking))
}

async fn create_booking(
    State(state): State<AppState>,
    user: AuthUser,
    Json(request): Json<CreateBookingRequest>,
) -> Result<(StatusCode, Json<ApiResponse<BookingDetails>>), AppError> {
    let controller = BookingController::new(&state);
    let response = controller.create(&user.actor, request).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

async fn list_bookings(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<ApiResponse<Vec<BookingDetails>>>, AppError> {
    let controller = BookingController::new(&state);
    Ok(Json(controller.list_mine(&user.actor).await?))
}

async fn list_available(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<ApiResponse<Vec<BookingDetails>>>, AppError> {
    let controller = BookingController::new(&state);
    Ok(Json(controller.list_available(&user.actor).await?))
}

async fn get_booking(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<BookingDetails>>, AppError> {
    let controller = BookingController::new(&state);
    Ok(Json(controller.get(&user.actor, id).await?))
}

async fn transition(
    state: AppState,
    user: AuthUser,
    id: Uuid,
    transition: Transition,
) -> Result<Json<ApiResponse<Booking>>, AppError> {
    let controller = BookingController::new(&state);
    Ok(Json(controller.transition(&user.actor, id, transition).await?))
}

async fn accept_booking(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Booking>>, AppError> {
    transition(state, user, id, Transition::Accept).await
}

async fn reject_booking(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Booking>>, AppError> {
    transition(state, user, id, Transition::Reject).await
}

async fn start_booking(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Booking>>, AppError> {
    transition(state, user, id, Transition::Start).await
}

async fn complete_booking(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Booking>>, AppError> {
    transition(state, user, id, Transition::Complete).await
}

async fn review_booking(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(request): Json<SubmitReviewRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Review>>), AppError> {
    let controller = BookingController::new(&state);
    let response = controller.review(&user.actor, id, request).await?;
    Ok((StatusCode::CREATED, Json(response)))
}
