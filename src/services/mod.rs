//! Services module
//!
//! Este módulo contiene la lógica de negocio. Los servicios combinan
//! repositorios, el feed en tiempo real y la caché.

pub mod auth_service;
pub mod booking_lifecycle;
pub mod profile_service;

pub use auth_service::AuthService;
pub use booking_lifecycle::{
    can_review, can_transition, BookingLifecycleService, DenialReason, Transition,
};
pub use profile_service::ProfileService;
