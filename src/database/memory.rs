//! Almacenamiento en memoria
//!
//! Implementa todos los repositorios sobre tablas en memoria protegidas por un
//! único `RwLock`, de modo que el update condicional es un compare-and-set
//! atómico igual que la fila de PostgreSQL. Replica también los triggers de
//! `migrations/` que generan notificaciones.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use crate::models::booking::{Booking, BookingDetails, BookingStatus, NewBooking, StatusUpdate};
use crate::models::location::{Location, NewLocation};
use crate::models::notification::{Notification, NotificationKind};
use crate::models::review::{NewReview, Review};
use crate::models::service::Service;
use crate::models::user::{NewUser, ProfileChanges, ProfileSummary, User};
use crate::repositories::{
    BookingRepository, LocationRepository, NotificationRepository, ReviewRepository,
    ServiceRepository, UserRepository,
};
use crate::utils::errors::AppError;

pub const LIMPIEZA_BASICA_ID: Uuid = Uuid::from_u128(0x1);
pub const LIMPIEZA_PROFUNDA_ID: Uuid = Uuid::from_u128(0x2);
pub const LIMPIEZA_MUDANZA_ID: Uuid = Uuid::from_u128(0x3);

/// Catálogo inicial, el mismo que siembra la migración
pub fn default_catalog() -> Vec<Service> {
    vec![
        Service {
            id: LIMPIEZA_BASICA_ID,
            name: "Limpieza básica".to_string(),
            description: Some("Polvo, suelos, cocina y baños".to_string()),
            base_price: Decimal::new(3500, 2),
            duration_minutes: 120,
            active: true,
        },
        Service {
            id: LIMPIEZA_PROFUNDA_ID,
            name: "Limpieza profunda".to_string(),
            description: Some("Incluye electrodomésticos y ventanas".to_string()),
            base_price: Decimal::new(6500, 2),
            duration_minutes: 240,
            active: true,
        },
        Service {
            id: LIMPIEZA_MUDANZA_ID,
            name: "Limpieza de mudanza".to_string(),
            description: None,
            base_price: Decimal::new(9000, 2),
            duration_minutes: 300,
            active: false,
        },
    ]
}

#[derive(Default)]
struct Tables {
    users: HashMap<Uuid, User>,
    bookings: HashMap<Uuid, Booking>,
    services: HashMap<Uuid, Service>,
    locations: Vec<Location>,
    reviews: Vec<Review>,
    notifications: Vec<Notification>,
}

impl Tables {
    fn details(&self, booking: &Booking) -> Option<BookingDetails> {
        let client = self.users.get(&booking.client_id)?;
        let service = self.services.get(&booking.service_id)?;
        let cleaner = booking
            .cleaner_id
            .and_then(|id| self.users.get(&id))
            .map(ProfileSummary::from);
        let location = booking
            .location_id
            .and_then(|id| self.locations.iter().find(|l| l.id == id))
            .cloned();

        Some(BookingDetails {
            booking: booking.clone(),
            client: ProfileSummary::from(client),
            cleaner,
            service: service.clone(),
            location,
        })
    }

    fn details_where<F>(&self, filter: F) -> Vec<BookingDetails>
    where
        F: Fn(&Booking) -> bool,
    {
        let mut rows: Vec<BookingDetails> = self
            .bookings
            .values()
            .filter(|b| filter(*b))
            .filter_map(|b| self.details(b))
            .collect();
        rows.sort_by_key(|d| d.booking.scheduled_at);
        rows
    }

    fn notify(
        &mut self,
        user_id: Uuid,
        kind: NotificationKind,
        message: String,
        booking_id: Option<Uuid>,
    ) {
        self.notifications.push(Notification {
            id: Uuid::new_v4(),
            user_id,
            kind,
            message,
            read: false,
            related_booking_id: booking_id,
            created_at: Utc::now(),
        });
    }

    // Equivalente a notify_booking_status_change() de la migración
    fn on_status_change(&mut self, booking: &Booking) {
        let (kind, message) = match booking.status {
            BookingStatus::Confirmado => (
                NotificationKind::ReservaConfirmada,
                "Tu reserva ha sido confirmada",
            ),
            BookingStatus::Cancelado => (
                NotificationKind::ReservaCancelada,
                "Tu reserva ha sido rechazada",
            ),
            BookingStatus::EnProgreso => (
                NotificationKind::ReservaIniciada,
                "El servicio de limpieza ha comenzado",
            ),
            BookingStatus::Completado => (
                NotificationKind::ReservaCompletada,
                "El servicio ha finalizado, ¡déjanos tu reseña!",
            ),
            BookingStatus::Pendiente => return,
        };
        self.notify(booking.client_id, kind, message.to_string(), Some(booking.id));
    }
}

/// Backend en memoria para desarrollo y tests
#[derive(Clone, Default)]
pub struct MemoryStore {
    tables: Arc<RwLock<Tables>>,
    operations: Arc<AtomicU64>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store con el catálogo de `default_catalog()`
    pub fn with_default_catalog() -> Self {
        let mut tables = Tables::default();
        for service in default_catalog() {
            tables.services.insert(service.id, service);
        }
        Self {
            tables: Arc::new(RwLock::new(tables)),
            operations: Arc::default(),
        }
    }

    /// Número de operaciones recibidas por el almacenamiento
    pub fn operation_count(&self) -> u64 {
        self.operations.load(Ordering::SeqCst)
    }

    fn record(&self, operation: &str) {
        self.operations.fetch_add(1, Ordering::SeqCst);
        debug!("🗄️ memory store: {}", operation);
    }
}

#[async_trait]
impl BookingRepository for MemoryStore {
    async fn insert(&self, booking: NewBooking) -> Result<Booking, AppError> {
        self.record("bookings.insert");
        let now = Utc::now();
        let created = Booking {
            id: Uuid::new_v4(),
            client_id: booking.client_id,
            cleaner_id: None,
            service_id: booking.service_id,
            location_id: Some(booking.location_id),
            scheduled_at: booking.scheduled_at,
            frequency: booking.frequency,
            special_instructions: booking.special_instructions,
            status: BookingStatus::Pendiente,
            created_at: now,
            updated_at: now,
        };
        let mut tables = self.tables.write().await;
        if !tables.users.contains_key(&created.client_id)
            || !tables.services.contains_key(&created.service_id)
        {
            return Err(AppError::Database(sqlx::Error::RowNotFound));
        }
        tables.bookings.insert(created.id, created.clone());
        Ok(created)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Booking>, AppError> {
        self.record("bookings.find_by_id");
        Ok(self.tables.read().await.bookings.get(&id).cloned())
    }

    async fn find_details(&self, id: Uuid) -> Result<Option<BookingDetails>, AppError> {
        self.record("bookings.find_details");
        let tables = self.tables.read().await;
        Ok(tables.bookings.get(&id).and_then(|b| tables.details(b)))
    }

    async fn list_for_client(&self, client_id: Uuid) -> Result<Vec<BookingDetails>, AppError> {
        self.record("bookings.list_for_client");
        let tables = self.tables.read().await;
        Ok(tables.details_where(|b| b.client_id == client_id))
    }

    async fn list_for_cleaner(&self, cleaner_id: Uuid) -> Result<Vec<BookingDetails>, AppError> {
        self.record("bookings.list_for_cleaner");
        let tables = self.tables.read().await;
        Ok(tables.details_where(|b| b.cleaner_id == Some(cleaner_id)))
    }

    async fn list_available(&self) -> Result<Vec<BookingDetails>, AppError> {
        self.record("bookings.list_available");
        let tables = self.tables.read().await;
        Ok(tables.details_where(|b| {
            b.status == BookingStatus::Pendiente && b.cleaner_id.is_none()
        }))
    }

    async fn apply_status_update(&self, update: &StatusUpdate) -> Result<u64, AppError> {
        self.record("bookings.apply_status_update");
        let mut tables = self.tables.write().await;

        let updated = match tables.bookings.get(&update.booking_id) {
            Some(current) if update.matches(current) => update.apply_to(current, Utc::now()),
            _ => return Ok(0),
        };

        tables.bookings.insert(updated.id, updated.clone());
        tables.on_status_change(&updated);
        Ok(1)
    }
}

#[async_trait]
impl ReviewRepository for MemoryStore {
    async fn insert(&self, review: NewReview) -> Result<Review, AppError> {
        self.record("reviews.insert");
        let mut tables = self.tables.write().await;

        if tables.reviews.iter().any(|r| r.booking_id == review.booking_id) {
            return Err(AppError::Conflict(format!(
                "duplicate key value violates unique constraint \"reviews_booking_id_key\" ({})",
                review.booking_id
            )));
        }

        let created = Review {
            id: Uuid::new_v4(),
            booking_id: review.booking_id,
            client_id: review.client_id,
            cleaner_id: review.cleaner_id,
            rating: review.rating,
            comment: review.comment,
            created_at: Utc::now(),
        };
        tables.reviews.push(created.clone());
        tables.notify(
            created.cleaner_id,
            NotificationKind::NuevaResena,
            format!("Has recibido una reseña de {} estrellas", created.rating),
            Some(created.booking_id),
        );
        Ok(created)
    }

    async fn find_by_booking(&self, booking_id: Uuid) -> Result<Option<Review>, AppError> {
        self.record("reviews.find_by_booking");
        let tables = self.tables.read().await;
        Ok(tables.reviews.iter().find(|r| r.booking_id == booking_id).cloned())
    }

    async fn list_for_cleaner(&self, cleaner_id: Uuid) -> Result<Vec<Review>, AppError> {
        self.record("reviews.list_for_cleaner");
        let tables = self.tables.read().await;
        Ok(tables
            .reviews
            .iter()
            .rev()
            .filter(|r| r.cleaner_id == cleaner_id)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn insert(&self, user: NewUser) -> Result<User, AppError> {
        self.record("users.insert");
        let mut tables = self.tables.write().await;

        if tables.users.values().any(|u| u.email.eq_ignore_ascii_case(&user.email)) {
            return Err(AppError::Conflict(
                "duplicate key value violates unique constraint \"users_email_key\"".to_string(),
            ));
        }

        let now = Utc::now();
        let created = User {
            id: Uuid::new_v4(),
            role: user.role,
            full_name: user.full_name,
            email: user.email,
            phone: user.phone,
            avatar_url: None,
            password_hash: user.password_hash,
            created_at: now,
            updated_at: now,
        };
        tables.users.insert(created.id, created.clone());
        Ok(created)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AppError> {
        self.record("users.find_by_id");
        Ok(self.tables.read().await.users.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        self.record("users.find_by_email");
        let tables = self.tables.read().await;
        Ok(tables
            .users
            .values()
            .find(|u| u.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn update_profile(
        &self,
        id: Uuid,
        changes: ProfileChanges,
    ) -> Result<Option<User>, AppError> {
        self.record("users.update_profile");
        let mut tables = self.tables.write().await;
        let Some(user) = tables.users.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(full_name) = changes.full_name {
            user.full_name = full_name;
        }
        if let Some(phone) = changes.phone {
            user.phone = Some(phone);
        }
        if let Some(avatar_url) = changes.avatar_url {
            user.avatar_url = Some(avatar_url);
        }
        user.updated_at = Utc::now();
        Ok(Some(user.clone()))
    }
}

#[async_trait]
impl LocationRepository for MemoryStore {
    async fn insert(&self, location: NewLocation) -> Result<Location, AppError> {
        self.record("locations.insert");
        let created = Location {
            id: Uuid::new_v4(),
            client_id: location.client_id,
            address: location.address,
            nickname: location.nickname,
            created_at: Utc::now(),
        };
        self.tables.write().await.locations.push(created.clone());
        Ok(created)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Location>, AppError> {
        self.record("locations.find_by_id");
        let tables = self.tables.read().await;
        Ok(tables.locations.iter().find(|l| l.id == id).cloned())
    }

    async fn list_for_client(&self, client_id: Uuid) -> Result<Vec<Location>, AppError> {
        self.record("locations.list_for_client");
        let tables = self.tables.read().await;
        Ok(tables
            .locations
            .iter()
            .rev()
            .filter(|l| l.client_id == client_id)
            .cloned()
            .collect())
    }

    async fn delete(&self, id: Uuid, client_id: Uuid) -> Result<u64, AppError> {
        self.record("locations.delete");
        let mut tables = self.tables.write().await;
        let before = tables.locations.len();
        tables.locations.retain(|l| !(l.id == id && l.client_id == client_id));
        let removed = (before - tables.locations.len()) as u64;
        if removed > 0 {
            // ON DELETE SET NULL
            for booking in tables.bookings.values_mut() {
                if booking.location_id == Some(id) {
                    booking.location_id = None;
                }
            }
        }
        Ok(removed)
    }
}

#[async_trait]
impl NotificationRepository for MemoryStore {
    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<Notification>, AppError> {
        self.record("notifications.list_for_user");
        let tables = self.tables.read().await;
        let mut rows: Vec<Notification> = tables
            .notifications
            .iter()
            .rev()
            .filter(|n| n.user_id == user_id)
            .cloned()
            .collect();
        // orden estable: a igual timestamp queda primero la más reciente insertada
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rows)
    }

    async fn mark_read(&self, id: Uuid, user_id: Uuid) -> Result<u64, AppError> {
        self.record("notifications.mark_read");
        let mut tables = self.tables.write().await;
        let mut affected = 0;
        for notification in tables
            .notifications
            .iter_mut()
            .filter(|n| n.id == id && n.user_id == user_id)
        {
            notification.read = true;
            affected += 1;
        }
        Ok(affected)
    }

    async fn mark_all_read(&self, user_id: Uuid) -> Result<u64, AppError> {
        self.record("notifications.mark_all_read");
        let mut tables = self.tables.write().await;
        let mut affected = 0;
        for notification in tables
            .notifications
            .iter_mut()
            .filter(|n| n.user_id == user_id && !n.read)
        {
            notification.read = true;
            affected += 1;
        }
        Ok(affected)
    }

    async fn delete(&self, id: Uuid, user_id: Uuid) -> Result<u64, AppError> {
        self.record("notifications.delete");
        let mut tables = self.tables.write().await;
        let before = tables.notifications.len();
        tables
            .notifications
            .retain(|n| !(n.id == id && n.user_id == user_id));
        Ok((before - tables.notifications.len()) as u64)
    }
}

#[async_trait]
impl ServiceRepository for MemoryStore {
    async fn list_active(&self) -> Result<Vec<Service>, AppError> {
        self.record("services.list_active");
        let tables = self.tables.read().await;
        let mut services: Vec<Service> = tables
            .services
            .values()
            .filter(|s| s.active)
            .cloned()
            .collect();
        services.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(services)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Service>, AppError> {
        self.record("services.find_by_id");
        Ok(self.tables.read().await.services.get(&id).cloned())
    }
}
