use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::booking::{
    Booking, BookingDetails, BookingStatus, CleanerFilter, Frequency, NewBooking, StatusUpdate,
};
use crate::models::location::Location;
use crate::models::service::Service;
use crate::models::user::ProfileSummary;
use crate::utils::errors::AppError;

/// Acceso a reservas. `apply_status_update` devuelve las filas afectadas.
#[async_trait]
pub trait BookingRepository: Send + Sync {
    async fn insert(&self, booking: NewBooking) -> Result<Booking, AppError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Booking>, AppError>;
    async fn find_details(&self, id: Uuid) -> Result<Option<BookingDetails>, AppError>;
    async fn list_for_client(&self, client_id: Uuid) -> Result<Vec<BookingDetails>, AppError>;
    async fn list_for_cleaner(&self, cleaner_id: Uuid) -> Result<Vec<BookingDetails>, AppError>;
    async fn list_available(&self) -> Result<Vec<BookingDetails>, AppError>;
    async fn apply_status_update(&self, update: &StatusUpdate) -> Result<u64, AppError>;
}

pub struct PgBookingRepository {
    pool: PgPool,
}

impl PgBookingRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn fetch_details(
        &self,
        filter: &str,
        bind: Option<Uuid>,
    ) -> Result<Vec<BookingDetails>, AppError> {
        let sql = format!("{} WHERE {} {}", DETAILS_SELECT, filter, DETAILS_ORDER);
        let mut query = sqlx::query_as::<_, BookingDetailsRow>(&sql);
        if let Some(id) = bind {
            query = query.bind(id);
        }
        let rows = query.fetch_all(&self.pool).await?;
        Ok(rows.into_iter().map(BookingDetails::from).collect())
    }
}

// Reserva + cliente + limpiador + servicio + ubicación en una sola lectura
const DETAILS_SELECT: &str = r#"
    SELECT b.id, b.client_id, b.cleaner_id, b.service_id, b.location_id, b.scheduled_at,
           b.frequency, b.special_instructions, b.status, b.created_at, b.updated_at,
           c.full_name AS client_name, c.phone AS client_phone, c.avatar_url AS client_avatar,
           l.full_name AS cleaner_name, l.phone AS cleaner_phone, l.avatar_url AS cleaner_avatar,
           s.name AS service_name, s.description AS service_description,
           s.base_price AS service_price, s.duration_minutes AS service_duration,
           s.active AS service_active,
           loc.address AS location_address, loc.nickname AS location_nickname,
           loc.created_at AS location_created_at
    FROM bookings b
    JOIN users c ON c.id = b.client_id
    LEFT JOIN users l ON l.id = b.cleaner_id
    JOIN services s ON s.id = b.service_id
    LEFT JOIN locations loc ON loc.id = b.location_id
"#;

const DETAILS_ORDER: &str = "ORDER BY b.scheduled_at ASC";

#[derive(Debug, sqlx::FromRow)]
struct BookingDetailsRow {
    id: Uuid,
    client_id: Uuid,
    cleaner_id: Option<Uuid>,
    service_id: Uuid,
    location_id: Option<Uuid>,
    scheduled_at: DateTime<Utc>,
    frequency: Frequency,
    special_instructions: Option<String>,
    status: BookingStatus,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    client_name: String,
    client_phone: Option<String>,
    client_avatar: Option<String>,
    cleaner_name: Option<String>,
    cleaner_phone: Option<String>,
    cleaner_avatar: Option<String>,
    service_name: String,
    service_description: Option<String>,
    service_price: Decimal,
    service_duration: i32,
    service_active: bool,
    location_address: Option<String>,
    location_nickname: Option<String>,
    location_created_at: Option<DateTime<Utc>>,
}

impl From<BookingDetailsRow> for BookingDetails {
    fn from(row: BookingDetailsRow) -> Self {
        let cleaner = match (row.cleaner_id, row.cleaner_name) {
            (Some(id), Some(full_name)) => Some(ProfileSummary {
                id,
                full_name,
                phone: row.cleaner_phone,
                avatar_url: row.cleaner_avatar,
            }),
            _ => None,
        };

        let location = match (row.location_id, row.location_address, row.location_created_at) {
            (Some(id), Some(address), Some(created_at)) => Some(Location {
                id,
                client_id: row.client_id,
                address,
                nickname: row.location_nickname,
                created_at,
            }),
            _ => None,
        };

        Self {
            client: ProfileSummary {
                id: row.client_id,
                full_name: row.client_name,
                phone: row.client_phone,
                avatar_url: row.client_avatar,
            },
            cleaner,
            service: Service {
                id: row.service_id,
                name: row.service_name,
                description: row.service_description,
                base_price: row.service_price,
                duration_minutes: row.service_duration,
                active: row.service_active,
            },
            location,
            booking: Booking {
                id: row.id,
                client_id: row.client_id,
                cleaner_id: row.cleaner_id,
                service_id: row.service_id,
                location_id: row.location_id,
                scheduled_at: row.scheduled_at,
                frequency: row.frequency,
                special_instructions: row.special_instructions,
                status: row.status,
                created_at: row.created_at,
                updated_at: row.updated_at,
            },
        }
    }
}

#[async_trait]
impl BookingRepository for PgBookingRepository {
    async fn insert(&self, booking: NewBooking) -> Result<Booking, AppError> {
        let now = Utc::now();
        let created = sqlx::query_as::<_, Booking>(
            r#"
            INSERT INTO bookings (id, client_id, cleaner_id, service_id, location_id, scheduled_at,
                                  frequency, special_instructions, status, created_at, updated_at)
            VALUES ($1, $2, NULL, $3, $4, $5, $6, $7, 'pendiente', $8, $8)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(booking.client_id)
        .bind(booking.service_id)
        .bind(booking.location_id)
        .bind(booking.scheduled_at)
        .bind(booking.frequency)
        .bind(booking.special_instructions)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Booking>, AppError> {
        let booking = sqlx::query_as::<_, Booking>("SELECT * FROM bookings WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(booking)
    }

    async fn find_details(&self, id: Uuid) -> Result<Option<BookingDetails>, AppError> {
        Ok(self.fetch_details("b.id = $1", Some(id)).await?.into_iter().next())
    }

    async fn list_for_client(&self, client_id: Uuid) -> Result<Vec<BookingDetails>, AppError> {
        self.fetch_details("b.client_id = $1", Some(client_id)).await
    }

    async fn list_for_cleaner(&self, cleaner_id: Uuid) -> Result<Vec<BookingDetails>, AppError> {
        self.fetch_details("b.cleaner_id = $1", Some(cleaner_id)).await
    }

    async fn list_available(&self) -> Result<Vec<BookingDetails>, AppError> {
        self.fetch_details("b.status = 'pendiente' AND b.cleaner_id IS NULL", None)
            .await
    }

    async fn apply_status_update(&self, update: &StatusUpdate) -> Result<u64, AppError> {
        let result = match update.expected_cleaner {
            CleanerFilter::Unassigned => {
                sqlx::query(
                    r#"
                    UPDATE bookings
                    SET status = $1, cleaner_id = COALESCE($2, cleaner_id), updated_at = NOW()
                    WHERE id = $3 AND status = $4 AND cleaner_id IS NULL
                    "#,
                )
                .bind(update.new_status)
                .bind(update.assign_cleaner)
                .bind(update.booking_id)
                .bind(update.expected_status)
                .execute(&self.pool)
                .await?
            }
            CleanerFilter::AssignedTo(cleaner_id) => {
                sqlx::query(
                    r#"
                    UPDATE bookings
                    SET status = $1, cleaner_id = COALESCE($2, cleaner_id), updated_at = NOW()
                    WHERE id = $3 AND status = $4 AND cleaner_id = $5
                    "#,
                )
                .bind(update.new_status)
                .bind(update.assign_cleaner)
                .bind(update.booking_id)
                .bind(update.expected_status)
                .bind(cleaner_id)
                .execute(&self.pool)
                .await?
            }
        };

        Ok(result.rows_affected())
    }
}
