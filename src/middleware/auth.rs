//! Autenticación por token Bearer
//!
//! `AuthUser` es un extractor: cualquier handler que lo pida exige un token
//! vigente y no revocado, y recibe el `Actor` resuelto.

use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
};

use crate::{models::auth::Actor, state::AppState, utils::errors::AppError};

/// Usuario autenticado que se inyecta en los handlers
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub actor: Actor,
    pub token: String,
}

#[axum::async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        // Extraer token del header Authorization
        let auth_header = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| AppError::Unauthorized("Token de autorización requerido".to_string()))?;

        let (actor, token) = state.auth.authenticate_header(auth_header).await?;
        Ok(AuthUser { actor, token })
    }
}
