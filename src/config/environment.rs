//! Configuración de variables de entorno
//!
//! Este módulo maneja la configuración del entorno. `main` carga `.env` con
//! `dotenvy` y después llama a `EnvironmentConfig::from_env()`.

use std::env;
use std::str::FromStr;

use anyhow::{bail, Context, Result};

/// Backend de almacenamiento
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreKind {
    Postgres,
    Memory,
}

impl FromStr for StoreKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(StoreKind::Postgres),
            "memory" => Ok(StoreKind::Memory),
            other => bail!("STORE desconocido: '{}' (usa postgres o memory)", other),
        }
    }
}

/// Configuración del entorno
#[derive(Debug, Clone)]
pub struct EnvironmentConfig {
    pub environment: String,
    pub host: String,
    pub port: u16,
    pub store: StoreKind,
    pub database_url: Option<String>,
    pub redis_url: Option<String>,
    pub jwt_secret: String,
    pub jwt_expiration: u64,
    pub bcrypt_cost: u32,
    pub cors_origins: Vec<String>,
    pub cache_ttl: u64,
    pub realtime_capacity: usize,
}

impl Default for EnvironmentConfig {
    fn default() -> Self {
        Self {
            environment: "development".to_string(),
            host: "0.0.0.0".to_string(),
            port: 3000,
            store: StoreKind::Memory,
            database_url: None,
            redis_url: None,
            jwt_secret: "dev-secret-change-me".to_string(),
            jwt_expiration: 60 * 60 * 24,
            bcrypt_cost: bcrypt::DEFAULT_COST,
            cors_origins: Vec::new(),
            cache_ttl: 60 * 60 * 24 * 7,
            realtime_capacity: 256,
        }
    }
}

fn parse_var<T>(name: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|e| anyhow::anyhow!("{}", e))
            .with_context(|| format!("{} tiene un valor inválido: '{}'", name, raw)),
        Err(_) => Ok(default),
    }
}

impl EnvironmentConfig {
    /// Cargar configuración desde variables de entorno
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        let environment = env::var("ENVIRONMENT").unwrap_or(defaults.environment);
        let database_url = env::var("DATABASE_URL").ok();
        let store = match env::var("STORE") {
            Ok(raw) => raw.parse()?,
            Err(_) if database_url.is_some() => StoreKind::Postgres,
            Err(_) => StoreKind::Memory,
        };

        if store == StoreKind::Postgres && database_url.is_none() {
            bail!("DATABASE_URL must be set when STORE=postgres");
        }

        let jwt_secret = match env::var("JWT_SECRET") {
            Ok(secret) => secret,
            Err(_) if environment == "production" => bail!("JWT_SECRET must be set in production"),
            Err(_) => defaults.jwt_secret,
        };

        Ok(Self {
            host: env::var("HOST").unwrap_or(defaults.host),
            port: parse_var("PORT", defaults.port)?,
            store,
            database_url,
            redis_url: env::var("REDIS_URL").ok(),
            jwt_secret,
            jwt_expiration: parse_var("JWT_EXPIRATION", defaults.jwt_expiration)?,
            bcrypt_cost: parse_var("BCRYPT_COST", defaults.bcrypt_cost)?,
            cors_origins: env::var("CORS_ORIGINS")
                .map(|raw| {
                    raw.split(',')
                        .map(|s| s.trim().to_string())
                        .filter(|s| !s.is_empty())
                        .collect()
                })
                .unwrap_or_default(),
            cache_ttl: parse_var("CACHE_TTL", defaults.cache_ttl)?,
            realtime_capacity: parse_var("REALTIME_CAPACITY", defaults.realtime_capacity)?,
            environment,
        })
    }

    /// Verificar si estamos en modo producción
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// Obtener la dirección del servidor
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
