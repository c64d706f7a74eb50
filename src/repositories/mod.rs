//! Repositorios
//!
//! Frontera de acceso a datos. Cada trait tiene una implementación
//! PostgreSQL (`Pg*Repository`) y la implementación en memoria de
//! `database::memory::MemoryStore`.

pub mod booking_repository;
pub mod location_repository;
pub mod notification_repository;
pub mod review_repository;
pub mod service_repository;
pub mod user_repository;

use std::sync::Arc;

use sqlx::PgPool;

use crate::database::memory::MemoryStore;

pub use booking_repository::{BookingRepository, PgBookingRepository};
pub use location_repository::{LocationRepository, PgLocationRepository};
pub use notification_repository::{NotificationRepository, PgNotificationRepository};
pub use review_repository::{PgReviewRepository, ReviewRepository};
pub use service_repository::{PgServiceRepository, ServiceRepository};
pub use user_repository::{PgUserRepository, UserRepository};

/// Conjunto de repositorios compartido por el estado de la aplicación
#[derive(Clone)]
pub struct Repositories {
    pub bookings: Arc<dyn BookingRepository>,
    pub reviews: Arc<dyn ReviewRepository>,
    pub users: Arc<dyn UserRepository>,
    pub locations: Arc<dyn LocationRepository>,
    pub notifications: Arc<dyn NotificationRepository>,
    pub services: Arc<dyn ServiceRepository>,
}

impl Repositories {
    pub fn postgres(pool: PgPool) -> Self {
        Self {
            bookings: Arc::new(PgBookingRepository::new(pool.clone())),
            reviews: Arc::new(PgReviewRepository::new(pool.clone())),
            users: Arc::new(PgUserRepository::new(pool.clone())),
            locations: Arc::new(PgLocationRepository::new(pool.clone())),
            notifications: Arc::new(PgNotificationRepository::new(pool.clone())),
            services: Arc::new(PgServiceRepository::new(pool)),
        }
    }

    pub fn memory(store: MemoryStore) -> Self {
        Self {
            bookings: Arc::new(store.clone()),
            reviews: Arc::new(store.clone()),
            users: Arc::new(store.clone()),
            locations: Arc::new(store.clone()),
            notifications: Arc::new(store.clone()),
            services: Arc::new(store),
        }
    }
}
