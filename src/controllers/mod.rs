pub mod auth_controller;
pub mod booking_controller;
pub mod catalog_controller;
pub mod location_controller;
pub mod notification_controller;
pub mod profile_controller;
