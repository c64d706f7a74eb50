use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::service::Service;
use crate::utils::errors::AppError;

#[async_trait]
pub trait ServiceRepository: Send + Sync {
    async fn list_active(&self) -> Result<Vec<Service>, AppError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Service>, AppError>;
}

pub struct PgServiceRepository {
    pool: PgPool,
}

impl PgServiceRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ServiceRepository for PgServiceRepository {
    async fn list_active(&self) -> Result<Vec<Service>, AppError> {
        let services = sqlx::query_as::<_, Service>(
            "SELECT * FROM services WHERE active = TRUE ORDER BY name ASC",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(services)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Service>, AppError> {
        let service = sqlx::query_as::<_, Service>("SELECT * FROM services WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(service)
    }
}
