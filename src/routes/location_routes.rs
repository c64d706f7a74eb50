use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, post},
    Json, Router,
};
use uuid::Uuid;

use crate::controllers::location_controller::LocationController;
use crate::dto::api_response::ApiResponse;
use crate::dto::location_dto::CreateLocationRequest;
use crate::middleware::AuthUser;
use crate::models::location::Location;
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_location_router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_location).get(list_locations))
        .route("/:id", delete(delete_location))
}

async fn create_location(
    State(state): State<AppState>,
    user: AuthUser,
    Json(request): Json<CreateLocationRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Location>>), AppError> {
    let controller = LocationController::new(&state);
    let response = controller.create(&user.actor, request).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

async fn list_locations(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<ApiResponse<Vec<Location>>>, AppError> {
    Ok(Json(LocationController::new(&state).list(&user.actor).await?))
}

async fn delete_location(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Uuid>>, AppError> {
    Ok(Json(LocationController::new(&state).delete(&user.actor, id).await?))
}
