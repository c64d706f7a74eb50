use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use uuid::Uuid;

use crate::controllers::catalog_controller::CatalogController;
use crate::dto::api_response::ApiResponse;
use crate::models::review::CleanerRating;
use crate::models::service::Service;
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_service_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_services))
        .route("/:id", get(get_service))
}

pub fn create_cleaner_router() -> Router<AppState> {
    Router::new().route("/:id/reviews", get(cleaner_reviews))
}

async fn list_services(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<Service>>>, AppError> {
    Ok(Json(CatalogController::new(&state).list_services().await?))
}

async fn get_service(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Service>>, AppError> {
    Ok(Json(CatalogController::new(&state).get_service(id).await?))
}

async fn cleaner_reviews(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<CleanerRating>>, AppError> {
    Ok(Json(CatalogController::new(&state).cleaner_reviews(id).await?))
}
