use std::sync::Arc;

use uuid::Uuid;

use crate::dto::api_response::{AffectedRows, ApiResponse};
use crate::models::auth::Actor;
use crate::models::notification::Notification;
use crate::realtime::{ChangeEvent, ChangeFeed, ChangeKind, Entity};
use crate::repositories::NotificationRepository;
use crate::state::AppState;
use crate::utils::errors::{not_found_error, AppError};

/// Solo el dueño puede leer, marcar o borrar sus notificaciones; una fila
/// ajena afecta cero filas y se reporta como no encontrada.
pub struct NotificationController {
    notifications: Arc<dyn NotificationRepository>,
    feed: ChangeFeed,
}

impl NotificationController {
    pub fn new(state: &AppState) -> Self {
        Self {
            notifications: state.repos.notifications.clone(),
            feed: state.feed.clone(),
        }
    }

    pub async fn list(&self, actor: &Actor) -> Result<ApiResponse<Vec<Notification>>, AppError> {
        Ok(ApiResponse::success(self.notifications.list_for_user(actor.user_id).await?))
    }

    pub async fn mark_read(&self, actor: &Actor, id: Uuid) -> Result<ApiResponse<Uuid>, AppError> {
        if self.notifications.mark_read(id, actor.user_id).await? == 0 {
            return Err(not_found_error("Notification", &id.to_string()));
        }
        self.publish(ChangeKind::Update, actor, id);
        Ok(ApiResponse::success(id))
    }

    pub async fn mark_all_read(
        &self,
        actor: &Actor,
    ) -> Result<ApiResponse<AffectedRows>, AppError> {
        let affected = self.notifications.mark_all_read(actor.user_id).await?;
        Ok(ApiResponse::success(AffectedRows { affected }))
    }

    pub async fn delete(&self, actor: &Actor, id: Uuid) -> Result<ApiResponse<Uuid>, AppError> {
        if self.notifications.delete(id, actor.user_id).await? == 0 {
            return Err(not_found_error("Notification", &id.to_string()));
        }
        self.publish(ChangeKind::Delete, actor, id);
        Ok(ApiResponse::success(id))
    }

    fn publish(&self, kind: ChangeKind, actor: &Actor, id: Uuid) {
        self.feed.publish(ChangeEvent::new(
            Entity::Notifications,
            kind,
            id,
            vec![actor.user_id],
            &serde_json::json!({ "id": id }),
        ));
    }
}
