use tracing::warn;

use crate::cache::ProfileCache;
use crate::dto::api_response::ApiResponse;
use crate::dto::auth_dto::{SignInRequest, SignUpRequest};
use crate::models::auth::{Actor, Session};
use crate::services::AuthService;
use crate::state::AppState;
use crate::utils::errors::AppError;

pub struct AuthController {
    auth: AuthService,
    cache: ProfileCache,
}

impl AuthController {
    pub fn new(state: &AppState) -> Self {
        Self {
            auth: state.auth.clone(),
            cache: state.profile_cache.clone(),
        }
    }

    pub async fn sign_up(&self, request: SignUpRequest) -> Result<ApiResponse<Session>, AppError> {
        let session = self.auth.sign_up(request).await?;
        self.cache.store_snapshot(&session.profile).await;
        Ok(ApiResponse::success_with_message(
            session,
            "Cuenta creada exitosamente".to_string(),
        ))
    }

    pub async fn sign_in(&self, request: SignInRequest) -> Result<ApiResponse<Session>, AppError> {
        let session = self.auth.sign_in(request).await.map_err(|e| {
            warn!("🔒 Inicio de sesión fallido: {}", e);
            e
        })?;
        self.cache.store_snapshot(&session.profile).await;
        Ok(ApiResponse::success(session))
    }

    pub async fn sign_out(&self, token: &str) -> Result<ApiResponse<()>, AppError> {
        let actor = self.auth.sign_out(token).await?;
        self.cache.forget_snapshot(actor.user_id).await;
        Ok(ApiResponse::success_with_message((), "Sesión cerrada".to_string()))
    }

    pub fn session(&self, actor: Actor) -> ApiResponse<Actor> {
        ApiResponse::success(actor)
    }
}
