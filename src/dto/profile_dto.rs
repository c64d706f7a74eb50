use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::cache::Theme;
use crate::models::user::ProfileChanges;
use crate::utils::validation::{validate_not_blank, validate_phone};

// Cambios de perfil. Rol y email no son editables.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateProfileRequest {
    #[validate(length(min = 1, max = 120), custom = "validate_not_blank")]
    pub full_name: Option<String>,
    #[validate(custom = "validate_phone")]
    pub phone: Option<String>,
    #[validate(url)]
    pub avatar_url: Option<String>,
}

impl From<UpdateProfileRequest> for ProfileChanges {
    fn from(request: UpdateProfileRequest) -> Self {
        Self {
            full_name: request.full_name.map(|s| s.trim().to_string()),
            phone: request.phone.map(|s| s.trim().to_string()),
            avatar_url: request.avatar_url,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThemeRequest {
    pub theme: Theme,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThemeResponse {
    pub theme: Theme,
}
