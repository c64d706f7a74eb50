mod common;

use std::sync::Arc;

use limpieza_backend::dto::booking_dto::SubmitReviewRequest;
use limpieza_backend::models::booking::BookingStatus;
use limpieza_backend::models::notification::NotificationKind;
use limpieza_backend::models::user::UserRole;
use limpieza_backend::realtime::{ChangeKind, Entity, SubscriptionFilter};
use limpieza_backend::repositories::{BookingRepository, NotificationRepository, ReviewRepository};
use limpieza_backend::services::DenialReason;
use limpieza_backend::utils::errors::{AppError, ErrorKind};

use common::{booking_request, test_app};

fn review(rating: i16, comment: &str) -> SubmitReviewRequest {
    SubmitReviewRequest {
        rating,
        comment: Some(comment.to_string()),
    }
}

#[tokio::test]
async fn test_accept_assigns_cleaner_and_second_accept_conflicts() {
    let app = test_app();
    let client = app.actor("cliente@example.com", UserRole::Cliente).await;
    let a = app.actor("a@example.com", UserRole::Limpiador).await;
    let b = app.actor("b@example.com", UserRole::Limpiador).await;
    let location = app.location_for(&client).await;

    let booking = app
        .state
        .lifecycle
        .create_booking(&client, booking_request(location))
        .await
        .unwrap();
    assert_eq!(booking.status, BookingStatus::Pendiente);
    assert_eq!(booking.cleaner_id, None);

    // B todavía ve la reserva como pendiente y sin asignar
    let stale = booking.clone();

    let accepted = app.state.lifecycle.accept(&a, booking.id).await.unwrap();
    assert_eq!(accepted.status, BookingStatus::Confirmado);
    assert_eq!(accepted.cleaner_id, Some(a.user_id));

    let err = app
        .state
        .lifecycle
        .apply_transition(&b, &stale, BookingStatus::Confirmado)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));
    assert_eq!(err.kind(), ErrorKind::Conflict);

    let current = app.state.repos.bookings.find_by_id(booking.id).await.unwrap().unwrap();
    assert_eq!(current.status, BookingStatus::Confirmado);
    assert_eq!(current.cleaner_id, Some(a.user_id));
}

#[tokio::test]
async fn test_second_accept_after_assignment_conflicts() {
    let app = test_app();
    let client = app.actor("cliente@example.com", UserRole::Cliente).await;
    let a = app.actor("a@example.com", UserRole::Limpiador).await;
    let b = app.actor("b@example.com", UserRole::Limpiador).await;
    let location = app.location_for(&client).await;
    let booking = app
        .state
        .lifecycle
        .create_booking(&client, booking_request(location))
        .await
        .unwrap();

    app.state.lifecycle.accept(&a, booking.id).await.unwrap();

    // B lee la fila ya confirmada: el update condicional afecta 0 filas
    let err = app.state.lifecycle.accept(&b, booking.id).await.unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));
    assert_eq!(err.kind(), ErrorKind::Conflict);

    let current = app.state.repos.bookings.find_by_id(booking.id).await.unwrap().unwrap();
    assert_eq!(current.status, BookingStatus::Confirmado);
    assert_eq!(current.cleaner_id, Some(a.user_id));
}

#[tokio::test]
async fn test_concurrent_accepts_have_exactly_one_winner() {
    let app = test_app();
    let client = app.actor("cliente@example.com", UserRole::Cliente).await;
    let location = app.location_for(&client).await;
    let booking = app
        .state
        .lifecycle
        .create_booking(&client, booking_request(location))
        .await
        .unwrap();

    let mut cleaners = Vec::new();
    for i in 0..8 {
        cleaners.push(app.actor(&format!("l{}@example.com", i), UserRole::Limpiador).await);
    }

    let lifecycle = Arc::new(app.state.lifecycle.clone());
    let mut handles = Vec::new();
    for cleaner in cleaners.clone() {
        let lifecycle = Arc::clone(&lifecycle);
        let snapshot = booking.clone();
        handles.push(tokio::spawn(async move {
            lifecycle
                .apply_transition(&cleaner, &snapshot, BookingStatus::Confirmado)
                .await
        }));
    }

    let mut winners = Vec::new();
    for handle in handles {
        match handle.await.unwrap() {
            Ok(booking) => winners.push(booking.cleaner_id),
            Err(e) => assert_eq!(e.kind(), ErrorKind::Conflict),
        }
    }
    assert_eq!(winners.len(), 1);

    let current = app.state.repos.bookings.find_by_id(booking.id).await.unwrap().unwrap();
    assert_eq!(current.cleaner_id, winners[0]);
}

#[tokio::test]
async fn test_reject_only_while_unassigned() {
    let app = test_app();
    let client = app.actor("cliente@example.com", UserRole::Cliente).await;
    let a = app.actor("a@example.com", UserRole::Limpiador).await;
    let location = app.location_for(&client).await;

    let open = app
        .state
        .lifecycle
        .create_booking(&client, booking_request(location))
        .await
        .unwrap();
    let rejected = app.state.lifecycle.reject(&a, open.id).await.unwrap();
    assert_eq!(rejected.status, BookingStatus::Cancelado);
    assert_eq!(rejected.cleaner_id, None);

    let taken = app
        .state
        .lifecycle
        .create_booking(&client, booking_request(location))
        .await
        .unwrap();
    app.state.lifecycle.accept(&a, taken.id).await.unwrap();
    let err = app.state.lifecycle.reject(&a, taken.id).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Forbidden);
    assert!(matches!(err, AppError::Denied(DenialReason::AlreadyAssigned)));
}

#[tokio::test]
async fn test_full_lifecycle_and_single_review() {
    let app = test_app();
    let client = app.actor("cliente@example.com", UserRole::Cliente).await;
    let a = app.actor("a@example.com", UserRole::Limpiador).await;
    let location = app.location_for(&client).await;
    let booking = app
        .state
        .lifecycle
        .create_booking(&client, booking_request(location))
        .await
        .unwrap();
    app.state.lifecycle.accept(&a, booking.id).await.unwrap();

    // Sin completar no hay reseña
    let err = app
        .state
        .lifecycle
        .submit_review(&client, booking.id, review(5, "great"))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        AppError::Denied(DenialReason::NotCompleted(BookingStatus::Confirmado))
    ));

    let started = app.state.lifecycle.start(&a, booking.id).await.unwrap();
    assert_eq!(started.status, BookingStatus::EnProgreso);
    let done = app.state.lifecycle.complete(&a, booking.id).await.unwrap();
    assert_eq!(done.status, BookingStatus::Completado);

    let created = app
        .state
        .lifecycle
        .submit_review(&client, booking.id, review(5, "great"))
        .await
        .unwrap();
    assert_eq!(created.rating, 5);
    assert_eq!(created.comment.as_deref(), Some("great"));
    assert_eq!(created.cleaner_id, a.user_id);

    let second = app
        .state
        .lifecycle
        .submit_review(&client, booking.id, review(4, "otra vez"))
        .await
        .unwrap_err();
    assert_eq!(second.kind(), ErrorKind::Conflict);

    let stored = app.state.repos.reviews.list_for_cleaner(a.user_id).await.unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].rating, 5);
}

#[tokio::test]
async fn test_out_of_range_rating_never_reaches_the_store() {
    let app = test_app();
    let client = app.actor("cliente@example.com", UserRole::Cliente).await;
    let before = app.store.operation_count();

    for rating in [0, 6] {
        let err = app
            .state
            .lifecycle
            .submit_review(&client, uuid::Uuid::new_v4(), review(rating, "x"))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }
    assert_eq!(app.store.operation_count(), before);
}

#[tokio::test]
async fn test_only_assigned_cleaner_can_start() {
    let app = test_app();
    let client = app.actor("cliente@example.com", UserRole::Cliente).await;
    let a = app.actor("a@example.com", UserRole::Limpiador).await;
    let b = app.actor("b@example.com", UserRole::Limpiador).await;
    let location = app.location_for(&client).await;
    let booking = app
        .state
        .lifecycle
        .create_booking(&client, booking_request(location))
        .await
        .unwrap();
    app.state.lifecycle.accept(&a, booking.id).await.unwrap();

    let err = app.state.lifecycle.start(&b, booking.id).await.unwrap_err();
    assert!(matches!(err, AppError::Denied(DenialReason::NotAssignedCleaner)));

    let err = app.state.lifecycle.start(&client, booking.id).await.unwrap_err();
    assert!(matches!(err, AppError::Denied(DenialReason::WrongRole { .. })));
}

#[tokio::test]
async fn test_create_booking_preconditions() {
    let app = test_app();
    let client = app.actor("cliente@example.com", UserRole::Cliente).await;
    let other = app.actor("otro@example.com", UserRole::Cliente).await;
    let cleaner = app.actor("a@example.com", UserRole::Limpiador).await;
    let location = app.location_for(&client).await;

    // Ubicación ajena
    let err = app
        .state
        .lifecycle
        .create_booking(&other, booking_request(location))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);

    // Fecha pasada
    let mut past = booking_request(location);
    past.scheduled_at = chrono::Utc::now() - chrono::Duration::hours(1);
    let err = app.state.lifecycle.create_booking(&client, past).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);

    // Servicio inactivo
    let mut inactive = booking_request(location);
    inactive.service_id = limpieza_backend::database::memory::LIMPIEZA_MUDANZA_ID;
    let err = app.state.lifecycle.create_booking(&client, inactive).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);

    // Los limpiadores no reservan
    let err = app
        .state
        .lifecycle
        .create_booking(&cleaner, booking_request(location))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Forbidden);
}

#[tokio::test]
async fn test_transitions_notify_client_and_publish_events() {
    let app = test_app();
    let client = app.actor("cliente@example.com", UserRole::Cliente).await;
    let a = app.actor("a@example.com", UserRole::Limpiador).await;
    let location = app.location_for(&client).await;

    let mut updates = app.state.feed.subscribe(
        Entity::Bookings,
        &[ChangeKind::Update],
        SubscriptionFilter::owner(client.user_id),
    );

    let booking = app
        .state
        .lifecycle
        .create_booking(&client, booking_request(location))
        .await
        .unwrap();
    app.state.lifecycle.accept(&a, booking.id).await.unwrap();
    app.state.lifecycle.start(&a, booking.id).await.unwrap();

    let first = updates.next().await.unwrap();
    assert_eq!(first.record["status"], "confirmado");
    let second = updates.next().await.unwrap();
    assert_eq!(second.record["status"], "en_progreso");

    let inbox = app.state.repos.notifications.list_for_user(client.user_id).await.unwrap();
    let kinds: Vec<NotificationKind> = inbox.iter().map(|n| n.kind).collect();
    assert!(kinds.contains(&NotificationKind::ReservaConfirmada));
    assert!(kinds.contains(&NotificationKind::ReservaIniciada));
    assert!(inbox.iter().all(|n| n.related_booking_id == Some(booking.id)));

    drop(updates);
    assert_eq!(app.state.feed.active_subscriptions(), 0);
}
