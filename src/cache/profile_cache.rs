//! Caché de perfil y tema
//!
//! Guarda el último perfil conocido (nombre, email, avatar) y la preferencia de
//! tema de cada usuario. No es autoritativa: una escritura fallida solo se
//! registra, nunca rompe la operación que la provocó.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::models::user::Profile;
use crate::utils::errors::{AppError, AppResult};

use super::{CacheBackend, CacheConfig, CacheOperations};

/// Preferencia de tema de la interfaz
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    Dark,
    #[default]
    System,
}

impl FromStr for Theme {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            "system" => Ok(Theme::System),
            other => Err(AppError::InvalidInput(format!("Tema desconocido: '{}'", other))),
        }
    }
}

/// Último perfil conocido
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileSnapshot {
    pub user_id: Uuid,
    pub full_name: String,
    pub email: String,
    pub avatar_url: Option<String>,
    pub cached_at: DateTime<Utc>,
}

impl From<&Profile> for ProfileSnapshot {
    fn from(profile: &Profile) -> Self {
        Self {
            user_id: profile.id,
            full_name: profile.full_name.clone(),
            email: profile.email.clone(),
            avatar_url: profile.avatar_url.clone(),
            cached_at: Utc::now(),
        }
    }
}

#[derive(Clone)]
pub struct ProfileCache {
    backend: CacheBackend,
    config: CacheConfig,
}

impl ProfileCache {
    pub fn new(backend: CacheBackend, config: CacheConfig) -> Self {
        Self { backend, config }
    }

    pub fn backend(&self) -> &CacheBackend {
        &self.backend
    }

    fn profile_key(&self, user_id: Uuid) -> String {
        self.config.make_key("profile", &user_id.to_string())
    }

    fn theme_key(&self, user_id: Uuid) -> String {
        self.config.make_key("theme", &user_id.to_string())
    }

    pub async fn store_snapshot(&self, profile: &Profile) {
        let snapshot = ProfileSnapshot::from(profile);
        if let Err(e) = self
            .backend
            .set(&self.profile_key(profile.id), &snapshot, self.config.default_ttl)
            .await
        {
            warn!("⚠️ No se pudo cachear el perfil {}: {}", profile.id, e);
        }
    }

    pub async fn snapshot(&self, user_id: Uuid) -> AppResult<Option<ProfileSnapshot>> {
        self.backend
            .get(&self.profile_key(user_id))
            .await
            .map_err(|e| AppError::Cache(e.to_string()))
    }

    /// Tema guardado; `System` si nunca se eligió. Leerlo renueva su TTL.
    pub async fn theme(&self, user_id: Uuid) -> AppResult<Theme> {
        let key = self.theme_key(user_id);
        let theme = self
            .backend
            .get::<Theme>(&key)
            .await
            .map_err(|e| AppError::Cache(e.to_string()))?;

        match theme {
            Some(theme) => {
                if let Err(e) = self.backend.set(&key, &theme, self.config.theme_ttl).await {
                    warn!("⚠️ No se pudo renovar el tema de {}: {}", user_id, e);
                }
                Ok(theme)
            }
            None => Ok(Theme::default()),
        }
    }

    pub async fn set_theme(&self, user_id: Uuid, theme: Theme) -> AppResult<()> {
        self.backend
            .set(&self.theme_key(user_id), &theme, self.config.theme_ttl)
            .await
            .map_err(|e| AppError::Cache(e.to_string()))?;
        debug!("🎨 Tema {:?} guardado para {}", theme, user_id);
        Ok(())
    }

    /// Olvidar el perfil cacheado (cierre de sesión). El tema se conserva.
    pub async fn forget_snapshot(&self, user_id: Uuid) {
        if let Err(e) = self.backend.delete(&self.profile_key(user_id)).await {
            warn!("⚠️ No se pudo limpiar el perfil cacheado {}: {}", user_id, e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MemoryCache;
    use crate::models::user::UserRole;

    fn cache() -> ProfileCache {
        ProfileCache::new(CacheBackend::Memory(MemoryCache::new()), CacheConfig::default())
    }

    fn profile() -> Profile {
        let now = Utc::now();
        Profile {
            id: Uuid::new_v4(),
            role: UserRole::Cliente,
            full_name: "Lucía Pérez".to_string(),
            email: "lucia@example.com".to_string(),
            phone: None,
            avatar_url: Some("https://cdn.example.com/lucia.png".to_string()),
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_theme_defaults_to_system() {
        let cache = cache();
        let user = Uuid::new_v4();
        assert_eq!(cache.theme(user).await.unwrap(), Theme::System);

        cache.set_theme(user, Theme::Dark).await.unwrap();
        assert_eq!(cache.theme(user).await.unwrap(), Theme::Dark);
    }

    #[tokio::test]
    async fn test_snapshot_survives_until_forgotten() {
        let cache = cache();
        let profile = profile();
        cache.store_snapshot(&profile).await;

        let snapshot = cache.snapshot(profile.id).await.unwrap().unwrap();
        assert_eq!(snapshot.full_name, "Lucía Pérez");
        assert_eq!(snapshot.avatar_url, profile.avatar_url);

        cache.set_theme(profile.id, Theme::Light).await.unwrap();
        cache.forget_snapshot(profile.id).await;
        assert!(cache.snapshot(profile.id).await.unwrap().is_none());
        assert_eq!(cache.theme(profile.id).await.unwrap(), Theme::Light);
    }

    #[tokio::test]
    async fn test_theme_outlives_snapshot_ttl() {
        let config = CacheConfig {
            default_ttl: 0,
            ..CacheConfig::default()
        };
        let cache = ProfileCache::new(CacheBackend::Memory(MemoryCache::new()), config);
        let profile = profile();

        cache.store_snapshot(&profile).await;
        cache.set_theme(profile.id, Theme::Dark).await.unwrap();

        assert!(cache.snapshot(profile.id).await.unwrap().is_none());
        assert_eq!(cache.theme(profile.id).await.unwrap(), Theme::Dark);
    }

    #[test]
    fn test_theme_parsing() {
        assert_eq!("Dark".parse::<Theme>().unwrap(), Theme::Dark);
        assert!("sepia".parse::<Theme>().is_err());
    }
}
