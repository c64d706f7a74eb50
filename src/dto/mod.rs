//! DTOs de la API
//!
//! Requests validados con `validator` y el envoltorio `ApiResponse`.

pub mod api_response;
pub mod auth_dto;
pub mod booking_dto;
pub mod location_dto;
pub mod profile_dto;
