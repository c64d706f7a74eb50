use crate::cache::{ProfileCache, ProfileSnapshot, Theme};
use crate::dto::api_response::ApiResponse;
use crate::dto::profile_dto::{ThemeResponse, UpdateProfileRequest};
use crate::models::auth::Actor;
use crate::models::user::Profile;
use crate::services::ProfileService;
use crate::state::AppState;
use crate::utils::errors::AppError;

pub struct ProfileController {
    profiles: ProfileService,
    cache: ProfileCache,
}

impl ProfileController {
    pub fn new(state: &AppState) -> Self {
        Self {
            profiles: state.profiles.clone(),
            cache: state.profile_cache.clone(),
        }
    }

    pub async fn get(&self, actor: &Actor) -> Result<ApiResponse<Profile>, AppError> {
        Ok(ApiResponse::success(self.profiles.get(actor).await?))
    }

    pub async fn update(
        &self,
        actor: &Actor,
        request: UpdateProfileRequest,
    ) -> Result<ApiResponse<Profile>, AppError> {
        let profile = self.profiles.update(actor, request).await?;
        Ok(ApiResponse::success_with_message(
            profile,
            "Perfil actualizado".to_string(),
        ))
    }

    /// Último perfil conocido; puede no existir o estar desactualizado
    pub async fn cached(
        &self,
        actor: &Actor,
    ) -> Result<ApiResponse<Option<ProfileSnapshot>>, AppError> {
        Ok(ApiResponse::success(self.cache.snapshot(actor.user_id).await?))
    }

    pub async fn theme(&self, actor: &Actor) -> Result<ApiResponse<ThemeResponse>, AppError> {
        let theme = self.cache.theme(actor.user_id).await?;
        Ok(ApiResponse::success(ThemeResponse { theme }))
    }

    pub async fn set_theme(
        &self,
        actor: &Actor,
        theme: Theme,
    ) -> Result<ApiResponse<ThemeResponse>, AppError> {
        self.cache.set_theme(actor.user_id, theme).await?;
        Ok(ApiResponse::success(ThemeResponse { theme }))
    }
}
