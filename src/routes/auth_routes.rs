use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};

use crate::controllers::auth_controller::AuthController;
use crate::dto::api_response::ApiResponse;
use crate::dto::auth_dto::{SignInRequest, SignUpRequest};
use crate::middleware::AuthUser;
use crate::models::auth::{Actor, Session};
use crate::state::AppState;
use crate::utils::errors::AppError;

/// Configura las rutas de autenticación
pub fn create_auth_router() -> Router<AppState> {
    Router::new()
        .route("/sign-up", post(sign_up))
        .route("/sign-in", post(sign_in))
        .route("/sign-out", post(sign_out))
        .route("/session", get(session))
}

async fn sign_up(
    State(state): State<AppState>,
    Json(request): Json<SignUpRequest>,
) -> Result<Json<ApiResponse<Session>>, AppError> {
    let controller = AuthController::new(&state);
    Ok(Json(controller.sign_up(request).await?))
}

async fn sign_in(
    State(state): State<AppState>,
    Json(request): Json<SignInRequest>,
) -> Result<Json<ApiResponse<Session>>, AppError> {
    let controller = AuthController::new(&state);
    Ok(Json(controller.sign_in(request).await?))
}

async fn sign_out(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<ApiResponse<()>>, AppError> {
    let controller = AuthController::new(&state);
    Ok(Json(controller.sign_out(&user.token).await?))
}

async fn session(State(state): State<AppState>, user: AuthUser) -> Json<ApiResponse<Actor>> {
    Json(AuthController::new(&state).session(user.actor))
}
