use std::sync::Arc;

use uuid::Uuid;

use crate::dto::api_response::ApiResponse;
use crate::models::review::CleanerRating;
use crate::models::service::Service;
use crate::models::user::UserRole;
use crate::repositories::{ReviewRepository, ServiceRepository, UserRepository};
use crate::state::AppState;
use crate::utils::errors::{not_found_error, AppError};

/// Catálogo de servicios y reputación pública de limpiadores
pub struct CatalogController {
    services: Arc<dyn ServiceRepository>,
    reviews: Arc<dyn ReviewRepository>,
    users: Arc<dyn UserRepository>,
}

impl CatalogController {
    pub fn new(state: &AppState) -> Self {
        Self {
            services: state.repos.services.clone(),
            reviews: state.repos.reviews.clone(),
            users: state.repos.users.clone(),
        }
    }

    pub async fn list_services(&self) -> Result<ApiResponse<Vec<Service>>, AppError> {
        Ok(ApiResponse::success(self.services.list_active().await?))
    }

    pub async fn get_service(&self, id: Uuid) -> Result<ApiResponse<Service>, AppError> {
        let service = self
            .services
            .find_by_id(id)
            .await?
            .filter(|s| s.active)
            .ok_or_else(|| not_found_error("Service", &id.to_string()))?;
        Ok(ApiResponse::success(service))
    }

    pub async fn cleaner_reviews(
        &self,
        cleaner_id: Uuid,
    ) -> Result<ApiResponse<CleanerRating>, AppError> {
        self.users
            .find_by_id(cleaner_id)
            .await?
            .filter(|u| u.role == UserRole::Limpiador)
            .ok_or_else(|| not_found_error("Cleaner", &cleaner_id.to_string()))?;

        let reviews = self.reviews.list_for_cleaner(cleaner_id).await?;
        Ok(ApiResponse::success(CleanerRating::from_reviews(cleaner_id, reviews)))
    }
}
