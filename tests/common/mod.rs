#![allow(dead_code)]

use chrono::{Duration, Utc};
use uuid::Uuid;

use limpieza_backend::cache::{CacheBackend, CacheConfig, MemoryCache, ProfileCache};
use limpieza_backend::config::environment::EnvironmentConfig;
use limpieza_backend::database::memory::LIMPIEZA_BASICA_ID;
use limpieza_backend::database::MemoryStore;
use limpieza_backend::dto::auth_dto::SignUpRequest;
use limpieza_backend::dto::booking_dto::CreateBookingRequest;
use limpieza_backend::dto::location_dto::CreateLocationRequest;
use limpieza_backend::models::auth::{Actor, Session};
use limpieza_backend::models::booking::Frequency;
use limpieza_backend::models::location::NewLocation;
use limpieza_backend::models::user::UserRole;
use limpieza_backend::repositories::{LocationRepository, Repositories};
use limpieza_backend::AppState;

pub fn test_config() -> EnvironmentConfig {
    EnvironmentConfig {
        jwt_secret: "secreto-de-integracion".to_string(),
        bcrypt_cost: 4,
        realtime_capacity: 64,
        ..EnvironmentConfig::default()
    }
}

pub struct TestApp {
    pub state: AppState,
    pub store: MemoryStore,
}

pub fn test_app() -> TestApp {
    let store = MemoryStore::with_default_catalog();
    let cache = ProfileCache::new(CacheBackend::Memory(MemoryCache::new()), CacheConfig::default());
    let state = AppState::new(test_config(), Repositories::memory(store.clone()), cache);
    TestApp { state, store }
}

pub fn sign_up_request(email: &str, role: UserRole) -> SignUpRequest {
    SignUpRequest {
        email: email.to_string(),
        password: "contraseña-segura".to_string(),
        full_name: format!("Usuario {}", email),
        phone: Some("+34 600 123 456".to_string()),
        role,
    }
}

impl TestApp {
    pub async fn session(&self, email: &str, role: UserRole) -> Session {
        self.state.auth.sign_up(sign_up_request(email, role)).await.unwrap()
    }

    pub async fn actor(&self, email: &str, role: UserRole) -> Actor {
        let session = self.session(email, role).await;
        Actor::new(session.profile.id, session.profile.role)
    }

    pub async fn location_for(&self, client: &Actor) -> Uuid {
        self.state
            .repos
            .locations
            .insert(NewLocation {
                client_id: client.user_id,
                address: "Calle de Alcalá 42, Madrid".to_string(),
                nickname: Some("Casa".to_string()),
            })
            .await
            .unwrap()
            .id
    }
}

pub fn booking_request(location_id: Uuid) -> CreateBookingRequest {
    CreateBookingRequest {
        service_id: LIMPIEZA_BASICA_ID,
        location_id,
        scheduled_at: Utc::now() + Duration::days(3),
        frequency: Frequency::Once,
        special_instructions: Some("Tocar el timbre dos veces".to_string()),
    }
}

pub fn location_request() -> CreateLocationRequest {
    CreateLocationRequest {
        address: "Calle de Alcalá 42, Madrid".to_string(),
        nickname: Some("Casa".to_string()),
    }
}
