//! Servicio de perfiles
//!
//! Lectura y edición del perfil propio. Cada lectura o edición exitosa
//! refresca la caché de perfil; cada edición se publica en el feed.

use std::sync::Arc;

use tracing::info;
use validator::Validate;

use crate::cache::ProfileCache;
use crate::dto::profile_dto::UpdateProfileRequest;
use crate::models::auth::Actor;
use crate::models::user::{Profile, ProfileChanges};
use crate::realtime::{ChangeEvent, ChangeFeed, ChangeKind, Entity};
use crate::repositories::UserRepository;
use crate::utils::errors::{not_found_error, AppResult};

#[derive(Clone)]
pub struct ProfileService {
    users: Arc<dyn UserRepository>,
    feed: ChangeFeed,
    cache: ProfileCache,
}

impl ProfileService {
    pub fn new(users: Arc<dyn UserRepository>, feed: ChangeFeed, cache: ProfileCache) -> Self {
        Self { users, feed, cache }
    }

    pub async fn get(&self, actor: &Actor) -> AppResult<Profile> {
        let user = self
            .users
            .find_by_id(actor.user_id)
            .await?
            .ok_or_else(|| not_found_error("Profile", &actor.user_id.to_string()))?;

        let profile = Profile::from(user);
        self.cache.store_snapshot(&profile).await;
        Ok(profile)
    }

    pub async fn update(&self, actor: &Actor, request: UpdateProfileRequest) -> AppResult<Profile> {
        request.validate()?;

        let user = self
            .users
            .update_profile(actor.user_id, ProfileChanges::from(request))
            .await?
            .ok_or_else(|| not_found_error("Profile", &actor.user_id.to_string()))?;

        let profile = Profile::from(user);
        info!("✏️ Perfil {} actualizado", profile.id);

        self.cache.store_snapshot(&profile).await;
        self.feed.publish(ChangeEvent::new(
            Entity::Profiles,
            ChangeKind::Update,
            profile.id,
            vec![profile.id],
            &profile,
        ));
        Ok(profile)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{CacheBackend, CacheConfig, MemoryCache};
    use crate::database::MemoryStore;
    use crate::models::user::{NewUser, UserRole};
    use crate::realtime::SubscriptionFilter;

    #[tokio::test]
    async fn test_update_publishes_and_caches() {
        let store = MemoryStore::new();
        let user = UserRepository::insert(
            &store,
            NewUser {
                role: UserRole::Limpiador,
                full_name: "Rosa".to_string(),
                email: "rosa@example.com".to_string(),
                phone: None,
                password_hash: "x".to_string(),
            },
        )
        .await
        .unwrap();

        let feed = ChangeFeed::new(8);
        let cache = ProfileCache::new(
            CacheBackend::Memory(MemoryCache::new()),
            CacheConfig::default(),
        );
        let service = ProfileService::new(Arc::new(store), feed.clone(), cache.clone());
        let actor = Actor::new(user.id, UserRole::Limpiador);

        let mut sub = feed.subscribe(
            Entity::Profiles,
            &[ChangeKind::Update],
            SubscriptionFilter::record(user.id),
        );
        let updated = service
            .update(
                &actor,
                UpdateProfileRequest {
                    full_name: Some("Rosa María".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.full_name, "Rosa María");
        assert_eq!(updated.role, UserRole::Limpiador);

        let event = sub.next().await.unwrap();
        assert_eq!(event.record["full_name"], "Rosa María");

        let snapshot = cache.snapshot(user.id).await.unwrap().unwrap();
        assert_eq!(snapshot.full_name, "Rosa María");
    }
}
