//! Configuración de cache
//!
//! Este módulo contiene la configuración para el sistema de cache.

use serde::{Deserialize, Serialize};

use crate::config::environment::EnvironmentConfig;

/// Configuración del cache
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    pub redis_url: Option<String>,
    pub default_ttl: u64,
    /// TTL de la preferencia de tema; se renueva en cada lectura
    pub theme_ttl: u64,
    pub key_prefix: String,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            redis_url: None,
            default_ttl: 60 * 60 * 24 * 7, // 7 días
            theme_ttl: 60 * 60 * 24 * 365, // 1 año
            key_prefix: "limpieza".to_string(),
        }
    }
}

impl From<&EnvironmentConfig> for CacheConfig {
    fn from(config: &EnvironmentConfig) -> Self {
        Self {
            redis_url: config.redis_url.clone(),
            default_ttl: config.cache_ttl,
            ..Self::default()
        }
    }
}

impl CacheConfig {
    /// Generar clave de cache con prefijo
    pub fn make_key(&self, namespace: &str, identifier: &str) -> String {
        format!("{}:{}:{}", self.key_prefix, namespace, identifier)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keys_are_namespaced() {
        let config = CacheConfig::default();
        assert_eq!(config.make_key("profile", "42"), "limpieza:profile:42");
    }

    #[test]
    fn test_ttl_follows_environment() {
        let env = EnvironmentConfig {
            cache_ttl: 60,
            redis_url: Some("redis://cache:6379".to_string()),
            ..EnvironmentConfig::default()
        };
        let config = CacheConfig::from(&env);
        assert_eq!(config.default_ttl, 60);
        assert_eq!(config.theme_ttl, CacheConfig::default().theme_ttl);
        assert_eq!(config.redis_url.as_deref(), Some("redis://cache:6379"));
    }
}
