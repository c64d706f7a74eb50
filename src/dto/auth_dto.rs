use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::user::UserRole;
use crate::utils::validation::{validate_not_blank, validate_phone};

// Registro de usuario
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SignUpRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 8, max = 128))]
    pub password: String,
    #[validate(length(min = 1, max = 120), custom = "validate_not_blank")]
    pub full_name: String,
    #[validate(custom = "validate_phone")]
    pub phone: Option<String>,
    pub role: UserRole,
}

// Login request
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SignInRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1))]
    pub password: String,
}
