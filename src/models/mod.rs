//! Modelos del sistema
//!
//! Este módulo contiene los modelos de datos que mapean al schema PostgreSQL
//! (`migrations/`) y los tipos de dominio compartidos.

pub mod auth;
pub mod booking;
pub mod location;
pub mod notification;
pub mod review;
pub mod service;
pub mod user;
