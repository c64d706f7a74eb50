//! Modelos de autenticación y sesión

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::user::{Profile, UserRole};

/// Identidad que actúa en todas las transiciones protegidas
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub user_id: Uuid,
    pub role: UserRole,
}

impl Actor {
    pub fn new(user_id: Uuid, role: UserRole) -> Self {
        Self { user_id, role }
    }

    pub fn is_cleaner(&self) -> bool {
        self.role == UserRole::Limpiador
    }

    pub fn is_client(&self) -> bool {
        self.role == UserRole::Cliente
    }
}

/// Sesión devuelta por sign-up / sign-in
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    pub token_type: String,
    pub expires_at: DateTime<Utc>,
    pub profile: Profile,
}
