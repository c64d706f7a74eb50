use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::utils::validation::validate_not_blank;

// Alta de dirección guardada
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateLocationRequest {
    #[validate(length(min = 1, max = 300), custom = "validate_not_blank")]
    pub address: String,
    #[validate(length(max = 60))]
    pub nickname: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_address_is_required() {
        let request = CreateLocationRequest {
            address: "  ".to_string(),
            nickname: Some("Casa".to_string()),
        };
        assert!(request.validate().is_err());

        let request = CreateLocationRequest {
            address: "Av. Reforma 222, CDMX".to_string(),
            nickname: None,
        };
        assert!(request.validate().is_ok());
    }
}
