//! Modelo de Review (reseña post-servicio)
//!
//! Una reseña por reserva; la unicidad la garantiza el almacenamiento.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Review - mapea a la tabla reviews (UNIQUE booking_id)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Review {
    pub id: Uuid,
    pub booking_id: Uuid,
    pub client_id: Uuid,
    pub cleaner_id: Uuid,
    pub rating: i16,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Datos para insertar una reseña nueva
#[derive(Debug, Clone)]
pub struct NewReview {
    pub booking_id: Uuid,
    pub client_id: Uuid,
    pub cleaner_id: Uuid,
    pub rating: i16,
    pub comment: Option<String>,
}

/// Reseñas de un limpiador con su media
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CleanerRating {
    pub cleaner_id: Uuid,
    pub average: Option<f64>,
    pub total: usize,
    pub reviews: Vec<Review>,
}

impl CleanerRating {
    pub fn from_reviews(cleaner_id: Uuid, reviews: Vec<Review>) -> Self {
        let total = reviews.len();
        let average = if total == 0 {
            None
        } else {
            let sum: i64 = reviews.iter().map(|r| r.rating as i64).sum();
            Some(sum as f64 / total as f64)
        };
        Self {
            cleaner_id,
            average,
            total,
            reviews,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn review(rating: i16) -> Review {
        Review {
            id: Uuid::new_v4(),
            booking_id: Uuid::new_v4(),
            client_id: Uuid::new_v4(),
            cleaner_id: Uuid::nil(),
            rating,
            comment: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_average_rating() {
        let rating =
            CleanerRating::from_reviews(Uuid::nil(), vec![review(5), review(4), review(3)]);
        assert_eq!(rating.total, 3);
        assert_eq!(rating.average, Some(4.0));

        let empty = CleanerRating::from_reviews(Uuid::nil(), vec![]);
        assert_eq!(empty.average, None);
    }
}
