use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::booking::Frequency;

fn default_frequency() -> Frequency {
    Frequency::Once
}

// Request para crear una reserva sobre una ubicación guardada
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateBookingRequest {
    pub service_id: Uuid,
    pub location_id: Uuid,
    pub scheduled_at: DateTime<Utc>,
    #[serde(default = "default_frequency")]
    pub frequency: Frequency,
    #[validate(length(max = 500))]
    pub special_instructions: Option<String>,
}

// Request para reseñar una reserva completada
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SubmitReviewRequest {
    #[validate(range(min = 1, max = 5))]
    pub rating: i16,
    #[validate(length(max = 1000))]
    pub comment: Option<String>,
}
