use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::review::{NewReview, Review};
use crate::utils::errors::AppError;

/// Acceso a reseñas. Un segundo `insert` para la misma reserva es `Conflict`.
#[async_trait]
pub trait ReviewRepository: Send + Sync {
    async fn insert(&self, review: NewReview) -> Result<Review, AppError>;
    async fn find_by_booking(&self, booking_id: Uuid) -> Result<Option<Review>, AppError>;
    async fn list_for_cleaner(&self, cleaner_id: Uuid) -> Result<Vec<Review>, AppError>;
}

pub struct PgReviewRepository {
    pool: PgPool,
}

impl PgReviewRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ReviewRepository for PgReviewRepository {
    async fn insert(&self, review: NewReview) -> Result<Review, AppError> {
        // reviews_booking_id_key convierte la segunda reseña en 23505 -> Conflict
        let created = sqlx::query_as::<_, Review>(
            r#"
            INSERT INTO reviews (id, booking_id, client_id, cleaner_id, rating, comment, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(review.booking_id)
        .bind(review.client_id)
        .bind(review.cleaner_id)
        .bind(review.rating)
        .bind(review.comment)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    async fn find_by_booking(&self, booking_id: Uuid) -> Result<Option<Review>, AppError> {
        let review = sqlx::query_as::<_, Review>("SELECT * FROM reviews WHERE booking_id = $1")
            .bind(booking_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(review)
    }

    async fn list_for_cleaner(&self, cleaner_id: Uuid) -> Result<Vec<Review>, AppError> {
        let reviews = sqlx::query_as::<_, Review>(
            "SELECT * FROM reviews WHERE cleaner_id = $1 ORDER BY created_at DESC",
        )
        .bind(cleaner_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(reviews)
    }
}
