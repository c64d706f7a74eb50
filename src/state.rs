//! Shared application state
//!
//! Este módulo define el estado compartido de la aplicación que se pasa
//! a través del router de Axum. Todo el estado mutable del proceso vive aquí.

use crate::cache::ProfileCache;
use crate::config::environment::EnvironmentConfig;
use crate::realtime::ChangeFeed;
use crate::repositories::Repositories;
use crate::services::{AuthService, BookingLifecycleService, ProfileService};
use crate::utils::jwt::JwtConfig;

#[derive(Clone)]
pub struct AppState {
    pub config: EnvironmentConfig,
    pub repos: Repositories,
    pub feed: ChangeFeed,
    pub auth: AuthService,
    pub lifecycle: BookingLifecycleService,
    pub profiles: ProfileService,
    pub profile_cache: ProfileCache,
}

impl AppState {
    pub fn new(
        config: EnvironmentConfig,
        repos: Repositories,
        profile_cache: ProfileCache,
    ) -> Self {
        let feed = ChangeFeed::new(config.realtime_capacity);
        let auth = AuthService::new(
            repos.users.clone(),
            JwtConfig::from(&config),
            config.bcrypt_cost,
        );
        let lifecycle = BookingLifecycleService::new(
            repos.bookings.clone(),
            repos.reviews.clone(),
            repos.services.clone(),
            repos.locations.clone(),
            feed.clone(),
        );
        let profiles =
            ProfileService::new(repos.users.clone(), feed.clone(), profile_cache.clone());

        Self {
            config,
            repos,
            feed,
            auth,
            lifecycle,
            profiles,
            profile_cache,
        }
    }
}
