//! Configuración de conexión a PostgreSQL
//!
//! Este módulo abre el pool y aplica las migraciones de `migrations/`.

use anyhow::Result;
use sqlx::PgPool;
use tracing::info;

use crate::config::database::DatabaseConfig;

/// Conexión a la base de datos con migraciones aplicadas
pub struct DatabaseConnection {
    pool: PgPool,
}

impl DatabaseConnection {
    /// Crear el pool y ejecutar migraciones
    pub async fn connect(config: &DatabaseConfig) -> Result<Self> {
        info!("🔗 Conectando a PostgreSQL: {}", mask_database_url(&config.url));
        let pool = config.create_pool().await?;

        run_migrations(&pool).await?;
        info!("✅ PostgreSQL listo (migraciones aplicadas)");

        Ok(Self { pool })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

/// Ejecutar migraciones de la base de datos
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}

/// Función helper para enmascarar la URL de la base de datos en logs
fn mask_database_url(url: &str) -> String {
    let Some(at_pos) = url.find('@') else {
        return url.to_string();
    };
    let Some(scheme_end) = url.find("://") else {
        return url.to_string();
    };
    if url[..at_pos].rfind(':').map_or(true, |colon| colon <= scheme_end) {
        return url.to_string();
    }
    format!("{}***:***@{}", &url[..scheme_end + 3], &url[at_pos + 1..])
}
