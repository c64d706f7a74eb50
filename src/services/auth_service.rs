//! Servicio de autenticación
//!
//! Registro e inicio de sesión con `bcrypt` + JWT. Cada token lleva un
//! `sid`; cerrar sesión lo revoca en un conjunto en memoria del proceso.

use std::collections::HashMap;
use std::sync::Arc;

use bcrypt::{hash, verify};
use chrono::Utc;
use tokio::sync::RwLock;
use tracing::{info, warn};
use uuid::Uuid;
use validator::Validate;

use crate::dto::auth_dto::{SignInRequest, SignUpRequest};
use crate::models::auth::{Actor, Session};
use crate::models::user::{NewUser, Profile, User};
use crate::repositories::UserRepository;
use crate::utils::errors::{conflict_error, AppError, AppResult};
use crate::utils::jwt::{
    extract_token_from_header, generate_token, verify_token, JwtClaims, JwtConfig,
};

/// Servicio de autenticación
#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UserRepository>,
    jwt: JwtConfig,
    bcrypt_cost: u32,
    /// `sid` revocado -> `exp` del token; pasado `exp` el JWT ya no valida
    revoked_sessions: Arc<RwLock<HashMap<Uuid, usize>>>,
}

impl AuthService {
    pub fn new(users: Arc<dyn UserRepository>, jwt: JwtConfig, bcrypt_cost: u32) -> Self {
        Self {
            users,
            jwt,
            bcrypt_cost,
            revoked_sessions: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Registrar un usuario nuevo y abrir su primera sesión
    pub async fn sign_up(&self, request: SignUpRequest) -> AppResult<Session> {
        request.validate()?;
        let email = request.email.trim().to_lowercase();

        if self.users.find_by_email(&email).await?.is_some() {
            return Err(conflict_error("User", "email", &email));
        }

        let password_hash = hash(&request.password, self.bcrypt_cost)
            .map_err(|e| AppError::Hash(format!("Error hashing password: {}", e)))?;

        let user = self
            .users
            .insert(NewUser {
                role: request.role,
                full_name: request.full_name.trim().to_string(),
                email,
                phone: request
                    .phone
                    .map(|p| p.trim().to_string())
                    .filter(|p| !p.is_empty()),
                password_hash,
            })
            .await?;

        info!("👤 Usuario {} registrado como {}", user.id, user.role);
        self.open_session(user)
    }

    /// Iniciar sesión con email y contraseña
    pub async fn sign_in(&self, request: SignInRequest) -> AppResult<Session> {
        request.validate()?;
        let email = request.email.trim().to_lowercase();

        let user = self
            .users
            .find_by_email(&email)
            .await?
            .ok_or_else(|| AppError::Unauthorized("Credenciales inválidas".to_string()))?;

        let valid = verify(&request.password, &user.password_hash)
            .map_err(|e| AppError::Hash(format!("Error verifying password: {}", e)))?;

        if !valid {
            warn!("🔒 Contraseña incorrecta para {}", user.id);
            return Err(AppError::Unauthorized("Credenciales inválidas".to_string()));
        }

        info!("🔑 Sesión iniciada para {}", user.id);
        self.open_session(user)
    }

    /// Cerrar sesión: revoca el `sid` del token
    pub async fn sign_out(&self, token: &str) -> AppResult<Actor> {
        let claims = self.verify(token).await?;
        let now = Utc::now().timestamp() as usize;
        let mut revoked = self.revoked_sessions.write().await;
        revoked.retain(|_, exp| *exp > now);
        revoked.insert(claims.sid, claims.exp);
        drop(revoked);
        info!("👋 Sesión {} cerrada para {}", claims.sid, claims.sub);
        Ok(Actor::new(claims.sub, claims.role))
    }

    /// Resolver el actor de un token vigente
    pub async fn current_session(&self, token: &str) -> AppResult<Actor> {
        let claims = self.verify(token).await?;
        Ok(Actor::new(claims.sub, claims.role))
    }

    /// Igual que `current_session` pero a partir del header Authorization
    pub async fn authenticate_header(&self, header: &str) -> AppResult<(Actor, String)> {
        let token = extract_token_from_header(header)?;
        let actor = self.current_session(token).await?;
        Ok((actor, token.to_string()))
    }

    async fn verify(&self, token: &str) -> AppResult<JwtClaims> {
        let claims = verify_token(token, &self.jwt)?;
        if self.revoked_sessions.read().await.contains_key(&claims.sid) {
            return Err(AppError::Unauthorized("La sesión fue cerrada".to_string()));
        }
        Ok(claims)
    }

    fn open_session(&self, user: User) -> AppResult<Session> {
        let (access_token, expires_at) =
            generate_token(user.id, user.role, Uuid::new_v4(), &self.jwt)?;
        Ok(Session {
            access_token,
            token_type: "Bearer".to_string(),
            expires_at,
            profile: Profile::from(user),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::MemoryStore;
    use crate::models::user::UserRole;
    use crate::utils::errors::ErrorKind;

    fn service() -> AuthService {
        let jwt = JwtConfig {
            secret: "secreto-de-pruebas".to_string(),
            expiration: 3600,
        };
        AuthService::new(Arc::new(MemoryStore::new()), jwt, 4)
    }

    fn sign_up(email: &str) -> SignUpRequest {
        SignUpRequest {
            email: email.to_string(),
            password: "contraseña-segura".to_string(),
            full_name: "Carlos Gómez".to_string(),
            phone: None,
            role: UserRole::Cliente,
        }
    }

    #[tokio::test]
    async fn test_sign_up_then_sign_in() {
        let auth = service();
        let session = auth.sign_up(sign_up("Carlos@Example.com")).await.unwrap();
        assert_eq!(session.profile.email, "carlos@example.com");
        assert_eq!(session.token_type, "Bearer");

        let again = auth
            .sign_in(SignInRequest {
                email: "carlos@example.com".to_string(),
                password: "contraseña-segura".to_string(),
            })
            .await
            .unwrap();
        let actor = auth.current_session(&again.access_token).await.unwrap();
        assert_eq!(actor, Actor::new(session.profile.id, UserRole::Cliente));
    }

    #[tokio::test]
    async fn test_duplicate_email_is_conflict() {
        let auth = service();
        auth.sign_up(sign_up("dup@example.com")).await.unwrap();
        let err = auth.sign_up(sign_up("DUP@example.com")).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Conflict);
    }

    #[tokio::test]
    async fn test_wrong_password_is_unauthorized() {
        let auth = service();
        auth.sign_up(sign_up("x@example.com")).await.unwrap();
        let err = auth
            .sign_in(SignInRequest {
                email: "x@example.com".to_string(),
                password: "otra-contraseña".to_string(),
            })
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unauthorized);
    }

    #[tokio::test]
    async fn test_sign_out_revokes_only_that_session() {
        let auth = service();
        let first = auth.sign_up(sign_up("y@example.com")).await.unwrap();
        let second = auth
            .sign_in(SignInRequest {
                email: "y@example.com".to_string(),
                password: "contraseña-segura".to_string(),
            })
            .await
            .unwrap();

        auth.sign_out(&first.access_token).await.unwrap();
        assert_eq!(
            auth.current_session(&first.access_token).await.unwrap_err().kind(),
            ErrorKind::Unauthorized
        );
        assert!(auth.current_session(&second.access_token).await.is_ok());
    }

    #[tokio::test]
    async fn test_sign_out_prunes_expired_revocations() {
        let auth = service();
        let stale = Uuid::new_v4();
        auth.revoked_sessions.write().await.insert(stale, 1);

        let session = auth.sign_up(sign_up("z@example.com")).await.unwrap();
        auth.sign_out(&session.access_token).await.unwrap();

        let revoked = auth.revoked_sessions.read().await;
        assert_eq!(revoked.len(), 1);
        assert!(!revoked.contains_key(&stale));
    }
}
