use std::sync::Arc;

use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::dto::api_response::ApiResponse;
use crate::dto::location_dto::CreateLocationRequest;
use crate::models::auth::Actor;
use crate::models::location::{Location, NewLocation};
use crate::repositories::LocationRepository;
use crate::state::AppState;
use crate::utils::errors::{forbidden_error, not_found_error, AppError};

pub struct LocationController {
    locations: Arc<dyn LocationRepository>,
}

impl LocationController {
    pub fn new(state: &AppState) -> Self {
        Self {
            locations: state.repos.locations.clone(),
        }
    }

    pub async fn create(
        &self,
        actor: &Actor,
        request: CreateLocationRequest,
    ) -> Result<ApiResponse<Location>, AppError> {
        if !actor.is_client() {
            return Err(forbidden_error("save location", "only clients have saved addresses"));
        }
        request.validate()?;

        let location = self
            .locations
            .insert(NewLocation {
                client_id: actor.user_id,
                address: request.address.trim().to_string(),
                nickname: request
                    .nickname
                    .map(|n| n.trim().to_string())
                    .filter(|n| !n.is_empty()),
            })
            .await?;

        info!("📍 Ubicación {} guardada para {}", location.id, actor.user_id);
        Ok(ApiResponse::success_with_message(
            location,
            "Ubicación guardada".to_string(),
        ))
    }

    pub async fn list(&self, actor: &Actor) -> Result<ApiResponse<Vec<Location>>, AppError> {
        Ok(ApiResponse::success(self.locations.list_for_client(actor.user_id).await?))
    }

    pub async fn delete(&self, actor: &Actor, id: Uuid) -> Result<ApiResponse<Uuid>, AppError> {
        if self.locations.delete(id, actor.user_id).await? == 0 {
            return Err(not_found_error("Location", &id.to_string()));
        }
        info!("🗑️ Ubicación {} eliminada", id);
        Ok(ApiResponse::success(id))
    }
}
