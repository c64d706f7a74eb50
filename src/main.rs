use anyhow::{Context, Result};
use dotenvy::dotenv;
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use limpieza_backend::cache::{CacheBackend, CacheConfig, ProfileCache};
use limpieza_backend::config::database::DatabaseConfig;
use limpieza_backend::config::environment::{EnvironmentConfig, StoreKind};
use limpieza_backend::database::{DatabaseConnection, MemoryStore};
use limpieza_backend::repositories::Repositories;
use limpieza_backend::{create_router, AppState};

#[tokio::main]
async fn main() -> Result<()> {
    // Cargar variables de entorno
    dotenv().ok();

    // Configurar logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("limpieza_backend=debug,tower_http=info")),
        )
        .init();

    info!("🧹 Limpieza a domicilio - API de reservas");
    info!("==========================================");

    let config = EnvironmentConfig::from_env().context("Configuración inválida")?;
    if !config.is_production() && config.cors_origins.is_empty() {
        warn!("⚠️ CORS_ORIGINS vacío: CORS permisivo (solo desarrollo)");
    }

    // Almacenamiento
    let repos = match (config.store, config.database_url.as_deref()) {
        (StoreKind::Postgres, Some(url)) => {
            let db_config = DatabaseConfig::from_url(url);
            let connection = match DatabaseConnection::connect(&db_config).await {
                Ok(conn) => conn,
                Err(e) => {
                    error!("❌ Error conectando a la base de datos: {}", e);
                    return Err(e);
                }
            };
            Repositories::postgres(connection.pool().clone())
        }
        (StoreKind::Postgres, None) => {
            anyhow::bail!("DATABASE_URL must be set when STORE=postgres")
        }
        (StoreKind::Memory, _) => {
            info!("🧠 Usando almacenamiento en memoria (los datos no persisten)");
            Repositories::memory(MemoryStore::with_default_catalog())
        }
    };

    // Cache
    let cache_config = CacheConfig::from(&config);
    let backend = match CacheBackend::connect(&cache_config).await {
        Ok(backend) => backend,
        Err(e) => {
            error!("❌ Error conectando a Redis: {}", e);
            return Err(e);
        }
    };
    info!("✅ Cache listo ({})", backend.name());
    let profile_cache = ProfileCache::new(backend, cache_config);

    let addr = config.server_addr();
    let app = create_router(AppState::new(config, repos, profile_cache));

    info!("🌐 Servidor iniciando en http://{}", addr);
    info!("   GET  /health");
    info!("   POST /api/auth/{{sign-up,sign-in,sign-out}}  GET /api/auth/session");
    info!("   GET  /api/services  GET /api/cleaners/:id/reviews");
    info!("   GET|POST /api/bookings  GET /api/bookings/available  GET /api/bookings/:id");
    info!("   POST /api/bookings/:id/{{accept,reject,start,complete,review}}");
    info!("   GET|POST /api/locations  DELETE /api/locations/:id");
    info!("   GET /api/notifications  DELETE /api/notifications/:id");
    info!("   POST /api/notifications/:id/read  POST /api/notifications/read-all");
    info!("   GET|PUT /api/profile  GET /api/profile/cached");
    info!("   GET|PUT /api/profile/theme  GET /api/profile/stream");

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("No se pudo escuchar en {}", addr))?;

    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        error!("❌ Error del servidor: {}", e);
        return Err(e.into());
    }

    info!("👋 Servidor terminado");
    Ok(())
}

/// Señal de apagado graceful
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("❌ No se pudo instalar el handler de Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!("❌ No se pudo instalar el handler de SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("🛑 Señal Ctrl+C recibida, apagando servidor...");
        },
        _ = terminate => {
            info!("🛑 Señal de terminación recibida, apagando servidor...");
        },
    }
}
