//! Cliente HTTP tipado de la API
//!
//! Envuelve cada endpoint con `reqwest` y decodifica los errores del servidor
//! a `ErrorKind` leyendo el campo `code`. Los llamadores deciden por
//! `ClientError::kind()`, nunca por el texto del mensaje.

pub mod inbox;
pub mod stream;

use reqwest::{header, Client, Method, RequestBuilder, Response};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::cache::{ProfileSnapshot, Theme};
use crate::dto::api_response::{AffectedRows, ApiResponse};
use crate::dto::auth_dto::{SignInRequest, SignUpRequest};
use crate::dto::booking_dto::{CreateBookingRequest, SubmitReviewRequest};
use crate::dto::location_dto::CreateLocationRequest;
use crate::dto::profile_dto::{ThemeRequest, ThemeResponse, UpdateProfileRequest};
use crate::models::auth::{Actor, Session};
use crate::models::booking::{Booking, BookingDetails};
use crate::models::location::Location;
use crate::models::notification::Notification;
use crate::models::review::{CleanerRating, Review};
use crate::models::service::Service;
use crate::models::user::Profile;
use crate::services::Transition;
use crate::utils::errors::{ErrorKind, ErrorResponse};

pub use inbox::{InboxAction, NotificationInbox};
pub use stream::{ChangeStream, StreamEvent};

/// Error del cliente
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("{kind:?} ({status}): {message}")]
    Api {
        kind: ErrorKind,
        status: u16,
        message: String,
        reason: Option<String>,
    },

    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Unexpected response: {0}")]
    Decode(String),
}

impl ClientError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ClientError::Api { kind, .. } => *kind,
            ClientError::Transport(_) | ClientError::Decode(_) => ErrorKind::Transport,
        }
    }

    /// Código de `DenialReason` cuando el servidor rechazó por el guard
    pub fn denial_reason(&self) -> Option<&str> {
        match self {
            ClientError::Api { reason, .. } => reason.as_deref(),
            _ => None,
        }
    }
}

/// Cliente de la API de limpieza
#[derive(Clone)]
pub struct LimpiezaClient {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl LimpiezaClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: None,
        }
    }

    /// Copia del cliente autenticada con `token`
    pub fn with_token(&self, token: impl Into<String>) -> Self {
        Self {
            token: Some(token.into()),
            ..self.clone()
        }
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self.client.request(method, format!("{}{}", self.base_url, path));
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn send<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T, ClientError> {
        let response = builder.send().await?;
        let envelope: ApiResponse<T> = Self::decode(response).await?;
        envelope
            .data
            .ok_or_else(|| ClientError::Decode("respuesta sin campo data".to_string()))
    }

    async fn send_json<B: Serialize, T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: &B,
    ) -> Result<T, ClientError> {
        self.send(self.request(method, path).json(body)).await
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
        let status = response.status();
        if status.is_success() {
            return response
                .json::<T>()
                .await
                .map_err(|e| ClientError::Decode(e.to_string()));
        }

        let body = response.text().await.unwrap_or_default();
        let parsed = serde_json::from_str::<ErrorResponse>(&body).ok();
        let kind = parsed
            .as_ref()
            .and_then(|e| e.code.as_deref())
            .and_then(ErrorKind::from_code)
            .unwrap_or_else(|| ErrorKind::from_status(status.as_u16()));
        let reason = parsed
            .as_ref()
            .and_then(|e| e.details.as_ref())
            .and_then(|d| d.get("reason"))
            .and_then(|r| r.as_str())
            .map(str::to_string);
        let message = parsed.map(|e| e.message).unwrap_or(body);

        warn!("⚠️ API respondió {} ({:?}): {}", status, kind, message);
        Err(ClientError::Api {
            kind,
            status: status.as_u16(),
            message,
            reason,
        })
    }

    /// `GET /health`; no va envuelto en `ApiResponse`
    pub async fn health(&self) -> Result<Value, ClientError> {
        let response = self.request(Method::GET, "/health").send().await?;
        Self::decode(response).await
    }

    // Auth

    pub async fn sign_up(&self, request: &SignUpRequest) -> Result<Session, ClientError> {
        self.send_json(Method::POST, "/api/auth/sign-up", request).await
    }

    pub async fn sign_in(&self, request: &SignInRequest) -> Result<Session, ClientError> {
        self.send_json(Method::POST, "/api/auth/sign-in", request).await
    }

    pub async fn sign_out(&self) -> Result<(), ClientError> {
        let response = self.request(Method::POST, "/api/auth/sign-out").send().await?;
        let _: ApiResponse<()> = Self::decode(response).await?;
        Ok(())
    }

    pub async fn current_session(&self) -> Result<Actor, ClientError> {
        self.send(self.request(Method::GET, "/api/auth/session")).await
    }

    // Catálogo

    pub async fn list_services(&self) -> Result<Vec<Service>, ClientError> {
        self.send(self.request(Method::GET, "/api/services")).await
    }

    pub async fn cleaner_reviews(&self, cleaner_id: Uuid) -> Result<CleanerRating, ClientError> {
        self.send(self.request(Method::GET, &format!("/api/cleaners/{}/reviews", cleaner_id)))
            .await
    }

    // Ubicaciones

    pub async fn create_location(
        &self,
        request: &CreateLocationRequest,
    ) -> Result<Location, ClientError> {
        self.send_json(Method::POST, "/api/locations", request).await
    }

    pub async fn list_locations(&self) -> Result<Vec<Location>, ClientError> {
        self.send(self.request(Method::GET, "/api/locations")).await
    }

    pub async fn delete_location(&self, id: Uuid) -> Result<Uuid, ClientError> {
        self.send(self.request(Method::DELETE, &format!("/api/locations/{}", id)))
            .await
    }

    // Reservas

    pub async fn create_booking(
        &self,
        request: &CreateBookingRequest,
    ) -> Result<BookingDetails, ClientError> {
        self.send_json(Method::POST, "/api/bookings", request).await
    }

    pub async fn list_bookings(&self) -> Result<Vec<BookingDetails>, ClientError> {
        self.send(self.request(Method::GET, "/api/bookings")).await
    }

    pub async fn list_available(&self) -> Result<Vec<BookingDetails>, ClientError> {
        self.send(self.request(Method::GET, "/api/bookings/available")).await
    }

    pub async fn get_booking(&self, id: Uuid) -> Result<BookingDetails, ClientError> {
        self.send(self.request(Method::GET, &format!("/api/bookings/{}", id)))
            .await
    }

    pub async fn transition(
        &self,
        id: Uuid,
        transition: Transition,
    ) -> Result<Booking, ClientError> {
        let action = match transition {
            Transition::Accept => "accept",
            Transition::Reject => "reject",
            Transition::Start => "start",
            Transition::Complete => "complete",
        };
        debug!("➡️ {} reserva {}", action, id);
        self.send(self.request(Method::POST, &format!("/api/bookings/{}/{}", id, action)))
            .await
    }

    pub async fn submit_review(
        &self,
        id: Uuid,
        request: &SubmitReviewRequest,
    ) -> Result<Review, ClientError> {
        self.send_json(Method::POST, &format!("/api/bookings/{}/review", id), request)
            .await
    }

    // Notificaciones

    pub async fn list_notifications(&self) -> Result<Vec<Notification>, ClientError> {
        self.send(self.request(Method::GET, "/api/notifications")).await
    }

    pub async fn mark_notification_read(&self, id: Uuid) -> Result<Uuid, ClientError> {
        self.send(self.request(Method::POST, &format!("/api/notifications/{}/read", id)))
            .await
    }

    pub async fn mark_all_notifications_read(&self) -> Result<u64, ClientError> {
        let rows: AffectedRows = self
            .send(self.request(Method::POST, "/api/notifications/read-all"))
            .await?;
        Ok(rows.affected)
    }

    pub async fn delete_notification(&self, id: Uuid) -> Result<Uuid, ClientError> {
        self.send(self.request(Method::DELETE, &format!("/api/notifications/{}", id)))
            .await
    }

    /// Marca como leída en local primero; si el servidor falla, se despacha
    /// la compensación y se devuelve el error.
    pub async fn mark_read_optimistic(
        &self,
        inbox: &mut NotificationInbox,
        id: Uuid,
    ) -> Result<(), ClientError> {
        let compensation = inbox.reduce(InboxAction::MarkRead(id));
        if let Err(e) = self.mark_notification_read(id).await {
            if let Some(action) = compensation {
                inbox.reduce(action);
            }
            return Err(e);
        }
        Ok(())
    }

    /// Borra en local primero; si el servidor falla, se reinserta en su
    /// posición original.
    pub async fn delete_optimistic(
        &self,
        inbox: &mut NotificationInbox,
        id: Uuid,
    ) -> Result<(), ClientError> {
        let compensation = inbox.reduce(InboxAction::Remove(id));
        if let Err(e) = self.delete_notification(id).await {
            if let Some(action) = compensation {
                inbox.reduce(action);
            }
            return Err(e);
        }
        Ok(())
    }

    // Perfil

    pub async fn profile(&self) -> Result<Profile, ClientError> {
        self.send(self.request(Method::GET, "/api/profile")).await
    }

    pub async fn update_profile(
        &self,
        request: &UpdateProfileRequest,
    ) -> Result<Profile, ClientError> {
        self.send_json(Method::PUT, "/api/profile", request).await
    }

    /// Abre el stream de cambios del propio perfil. La suscripción del
    /// servidor vive mientras viva el `ChangeStream`.
    pub async fn profile_stream(&self) -> Result<ChangeStream, ClientError> {
        let response = self
            .request(Method::GET, "/api/profile/stream")
            .header(header::ACCEPT, "text/event-stream")
            .send()
            .await?;

        if !response.status().is_success() {
            let _: Value = Self::decode(response).await?;
            return Err(ClientError::Decode("stream rechazado sin cuerpo de error".to_string()));
        }
        Ok(ChangeStream::new(response))
    }

    pub async fn cached_profile(&self) -> Result<Option<ProfileSnapshot>, ClientError> {
        let response = self.request(Method::GET, "/api/profile/cached").send().await?;
        let envelope: ApiResponse<Option<ProfileSnapshot>> = Self::decode(response).await?;
        Ok(envelope.data.flatten())
    }

    pub async fn theme(&self) -> Result<Theme, ClientError> {
        let response: ThemeResponse = self
            .send(self.request(Method::GET, "/api/profile/theme"))
            .await?;
        Ok(response.theme)
    }

    pub async fn set_theme(&self, theme: Theme) -> Result<Theme, ClientError> {
        let response: ThemeResponse = self
            .send_json(Method::PUT, "/api/profile/theme", &ThemeRequest { theme })
            .await?;
        Ok(response.theme)
    }
}
