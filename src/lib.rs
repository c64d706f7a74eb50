//! Backend de reservas de limpieza a domicilio
//!
//! Clientes reservan servicios de limpieza sobre sus direcciones guardadas y
//! los limpiadores aceptan, inician y completan el trabajo. El ciclo de vida
//! de la reserva vive en `services::booking_lifecycle`.

pub mod cache;
pub mod client;
pub mod config;
pub mod controllers;
pub mod database;
pub mod dto;
pub mod middleware;
pub mod models;
pub mod realtime;
pub mod repositories;
pub mod routes;
pub mod services;
pub mod state;
pub mod utils;

pub use routes::create_router;
pub use state::AppState;
