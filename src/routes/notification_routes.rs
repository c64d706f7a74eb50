use axum::{
    extract::{Path, State},
    routing::{delete, get, post},
    Json, Router,
};
use uuid::Uuid;

use crate::controllers::notification_controller::NotificationController;
use crate::dto::api_response::{AffectedRows, ApiResponse};
use crate::middleware::AuthUser;
use crate::models::notification::Notification;
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_notification_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_notifications))
        .route("/read-all", post(mark_all_read))
        .route("/:id", delete(delete_notification))
        .route("/:id/read", post(mark_read))
}

async fn list_notifications(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<ApiResponse<Vec<Notification>>>, AppError> {
    Ok(Json(NotificationController::new(&state).list(&user.actor).await?))
}

async fn mark_read(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Uuid>>, AppError> {
    Ok(Json(NotificationController::new(&state).mark_read(&user.actor, id).await?))
}

async fn mark_all_read(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<ApiResponse<AffectedRows>>, AppError> {
    Ok(Json(NotificationController::new(&state).mark_all_read(&user.actor).await?))
}

async fn delete_notification(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Uuid>>, AppError> {
    Ok(Json(NotificationController::new(&state).delete(&user.actor, id).await?))
}
