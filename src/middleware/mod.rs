//! Middleware del sistema
//!
//! Este módulo contiene el extractor de autenticación y la capa de CORS.

pub mod auth;
pub mod cors;

pub use auth::AuthUser;
pub use cors::cors_layer;
