use std::convert::Infallible;
use std::time::Duration;

use axum::{
    extract::State,
    response::sse::{Event, KeepAlive, Sse},
    routing::get,
    Json, Router,
};
use futures::stream::{self, Stream};
use tracing::info;

use crate::cache::ProfileSnapshot;
use crate::controllers::profile_controller::ProfileController;
use crate::dto::api_response::ApiResponse;
use crate::dto::profile_dto::{ThemeRequest, ThemeResponse, UpdateProfileRequest};
use crate::middleware::AuthUser;
use crate::models::user::Profile;
use crate::realtime::{ChangeKind, Entity, SubscriptionFilter};
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_profile_router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_profile).put(update_profile))
        .route("/cached", get(cached_profile))
        .route("/theme", get(get_theme).put(set_theme))
        .route("/stream", get(profile_stream))
}

async fn get_profile(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<ApiResponse<Profile>>, AppError> {
    Ok(Json(ProfileController::new(&state).get(&user.actor).await?))
}

async fn update_profile(
    State(state): State<AppState>,
    user: AuthUser,
    Json(request): Json<UpdateProfileRequest>,
) -> Result<Json<ApiResponse<Profile>>, AppError> {
    Ok(Json(ProfileController::new(&state).update(&user.actor, request).await?))
}

async fn cached_profile(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<ApiResponse<Option<ProfileSnapshot>>>, AppError> {
    Ok(Json(ProfileController::new(&state).cached(&user.actor).await?))
}

async fn get_theme(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<ApiResponse<ThemeResponse>>, AppError> {
    Ok(Json(ProfileController::new(&state).theme(&user.actor).await?))
}

async fn set_theme(
    State(state): State<AppState>,
    user: AuthUser,
    Json(request): Json<ThemeRequest>,
) -> Result<Json<ApiResponse<ThemeResponse>>, AppError> {
    Ok(Json(ProfileController::new(&state).set_theme(&user.actor, request.theme).await?))
}

/// Cambios del propio perfil como Server-Sent Events. La suscripción vive
/// dentro del stream y se libera cuando el cliente se desconecta.
async fn profile_stream(
    State(state): State<AppState>,
    user: AuthUser,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let subscription = state.feed.subscribe(
        Entity::Profiles,
        &[ChangeKind::Update],
        SubscriptionFilter::record(user.actor.user_id),
    );
    info!("📡 Stream de perfil abierto para {}", user.actor.user_id);

    let events = stream::unfold(subscription, |mut subscription| async move {
        let change = subscription.next().await?;
        let event = Event::default()
            .event(change.kind.as_str())
            .json_data(&change.record)
            .unwrap_or_else(|_| Event::default().comment("registro no serializable"));
        Some((Ok(event), subscription))
    });

    Sse::new(events).keep_alive(KeepAlive::new().interval(Duration::from_secs(15)))
}
