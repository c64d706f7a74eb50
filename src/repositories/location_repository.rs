use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::location::{Location, NewLocation};
use crate::utils::errors::AppError;

#[async_trait]
pub trait LocationRepository: Send + Sync {
    async fn insert(&self, location: NewLocation) -> Result<Location, AppError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Location>, AppError>;
    async fn list_for_client(&self, client_id: Uuid) -> Result<Vec<Location>, AppError>;
    /// Borra solo si pertenece al cliente; devuelve filas afectadas
    async fn delete(&self, id: Uuid, client_id: Uuid) -> Result<u64, AppError>;
}

pub struct PgLocationRepository {
    pool: PgPool,
}

impl PgLocationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LocationRepository for PgLocationRepository {
    async fn insert(&self, location: NewLocation) -> Result<Location, AppError> {
        let created = sqlx::query_as::<_, Location>(
            r#"
            INSERT INTO locations (id, client_id, address, nickname, created_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(location.client_id)
        .bind(location.address)
        .bind(location.nickname)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Location>, AppError> {
        let location = sqlx::query_as::<_, Location>("SELECT * FROM locations WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(location)
    }

    async fn list_for_client(&self, client_id: Uuid) -> Result<Vec<Location>, AppError> {
        let locations = sqlx::query_as::<_, Location>(
            "SELECT * FROM locations WHERE client_id = $1 ORDER BY created_at DESC",
        )
        .bind(client_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(locations)
    }

    async fn delete(&self, id: Uuid, client_id: Uuid) -> Result<u64, AppError> {
        let result = sqlx::query("DELETE FROM locations WHERE id = $1 AND client_id = $2")
            .bind(id)
            .bind(client_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}
