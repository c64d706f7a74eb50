mod common;

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use limpieza_backend::create_router;
use limpieza_backend::database::memory::LIMPIEZA_BASICA_ID;

use common::test_app;

async fn call(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut request = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        request = request.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let request = match body {
        Some(body) => request
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => request.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn sign_up(app: &Router, email: &str, role: &str) -> (String, String) {
    let (status, body) = call(
        app,
        Method::POST,
        "/api/auth/sign-up",
        None,
        Some(json!({
            "email": email,
            "password": "contraseña-segura",
            "full_name": "Persona de Prueba",
            "role": role
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    (
        body["data"]["access_token"].as_str().unwrap().to_string(),
        body["data"]["profile"]["id"].as_str().unwrap().to_string(),
    )
}

async fn open_booking(app: &Router, client_token: &str) -> String {
    let (status, location) = call(
        app,
        Method::POST,
        "/api/locations",
        Some(client_token),
        Some(json!({ "address": "Av. Insurgentes Sur 1602", "nickname": "Oficina" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let scheduled_at = (chrono::Utc::now() + chrono::Duration::days(2)).to_rfc3339();
    let (status, booking) = call(
        app,
        Method::POST,
        "/api/bookings",
        Some(client_token),
        Some(json!({
            "service_id": LIMPIEZA_BASICA_ID,
            "location_id": location["data"]["id"],
            "scheduled_at": scheduled_at,
            "frequency": "weekly"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{}", booking);
    assert_eq!(booking["data"]["status"], "pendiente");
    assert_eq!(booking["data"]["service"]["id"], json!(LIMPIEZA_BASICA_ID));
    assert_eq!(booking["data"]["location"]["nickname"], "Oficina");
    booking["data"]["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_health() {
    let app = create_router(test_app().state);
    let (status, body) = call(&app, Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["cache"]["backend"], "memory");
}

#[tokio::test]
async fn test_protected_routes_require_token() {
    let app = create_router(test_app().state);
    let (status, body) = call(&app, Method::GET, "/api/bookings", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "UNAUTHORIZED");

    let (status, _) = call(&app, Method::GET, "/api/profile", Some("no-es-un-jwt"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_sign_out_revokes_token() {
    let app = create_router(test_app().state);
    let (token, id) = sign_up(&app, "sesion@example.com", "cliente").await;

    let (status, body) = call(&app, Method::GET, "/api/auth/session", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["user_id"], id.as_str());
    assert_eq!(body["data"]["role"], "cliente");

    let (status, _) = call(&app, Method::POST, "/api/auth/sign-out", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = call(&app, Method::GET, "/api/auth/session", Some(&token), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_duplicate_sign_up_is_conflict() {
    let app = create_router(test_app().state);
    sign_up(&app, "repetido@example.com", "cliente").await;
    let (status, body) = call(
        &app,
        Method::POST,
        "/api/auth/sign-up",
        None,
        Some(json!({
            "email": "Repetido@example.com",
            "password": "contraseña-segura",
            "full_name": "Otra Persona",
            "role": "limpiador"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "CONFLICT");
}

#[tokio::test]
async fn test_booking_flow_over_http() {
    let app = create_router(test_app().state);
    let (client, _) = sign_up(&app, "cliente@example.com", "cliente").await;
    let (cleaner_a, a_id) = sign_up(&app, "a@example.com", "limpiador").await;
    let (cleaner_b, _) = sign_up(&app, "b@example.com", "limpiador").await;
    let booking_id = open_booking(&app, &client).await;

    // Ambos limpiadores ven el trabajo disponible
    let (_, available) = call(
        &app,
        Method::GET,
        "/api/bookings/available",
        Some(&cleaner_b),
        None,
    )
    .await;
    assert_eq!(available["data"].as_array().unwrap().len(), 1);

    let (status, accepted) = call(
        &app,
        Method::POST,
        &format!("/api/bookings/{}/accept", booking_id),
        Some(&cleaner_a),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(accepted["data"]["status"], "confirmado");
    assert_eq!(accepted["data"]["cleaner_id"], a_id.as_str());

    // B llega tarde: el update condicional afecta 0 filas
    let (status, lost) = call(
        &app,
        Method::POST,
        &format!("/api/bookings/{}/accept", booking_id),
        Some(&cleaner_b),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(lost["code"], "CONFLICT");

    // Rechazar una reserva asignada sí es una denegación del guard
    let (status, denied) = call(
        &app,
        Method::POST,
        &format!("/api/bookings/{}/reject", booking_id),
        Some(&cleaner_b),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(denied["code"], "FORBIDDEN");
    assert_eq!(denied["details"]["reason"], "already_assigned");

    // Y ya no puede verla
    let (status, _) = call(
        &app,
        Method::GET,
        &format!("/api/bookings/{}", booking_id),
        Some(&cleaner_b),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    for action in ["start", "complete"] {
        let (status, body) = call(
            &app,
            Method::POST,
            &format!("/api/bookings/{}/{}", booking_id, action),
            Some(&cleaner_a),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK, "{}: {}", action, body);
    }

    let review_uri = format!("/api/bookings/{}/review", booking_id);
    let (status, _) = call(
        &app,
        Method::POST,
        &review_uri,
        Some(&client),
        Some(json!({ "rating": 9 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, review) = call(
        &app,
        Method::POST,
        &review_uri,
        Some(&client),
        Some(json!({ "rating": 5, "comment": "great" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(review["data"]["rating"], 5);

    let (status, again) = call(
        &app,
        Method::POST,
        &review_uri,
        Some(&client),
        Some(json!({ "rating": 4 })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(again["code"], "CONFLICT");

    let (_, rating) = call(
        &app,
        Method::GET,
        &format!("/api/cleaners/{}/reviews", a_id),
        None,
        None,
    )
    .await;
    assert_eq!(rating["data"]["total"], 1);
    assert_eq!(rating["data"]["average"], 5.0);

    // El cliente ve el historial y sus notificaciones generadas por cada cambio
    let (_, mine) = call(&app, Method::GET, "/api/bookings", Some(&client), None).await;
    assert_eq!(mine["data"][0]["status"], "completado");
    let (_, inbox) = call(&app, Method::GET, "/api/notifications", Some(&client), None).await;
    assert_eq!(inbox["data"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_notifications_are_owner_only() {
    let app = create_router(test_app().state);
    let (client, _) = sign_up(&app, "cliente@example.com", "cliente").await;
    let (cleaner, _) = sign_up(&app, "a@example.com", "limpiador").await;
    let booking_id = open_booking(&app, &client).await;
    call(
        &app,
        Method::POST,
        &format!("/api/bookings/{}/accept", booking_id),
        Some(&cleaner),
        None,
    )
    .await;

    let (_, inbox) = call(&app, Method::GET, "/api/notifications", Some(&client), None).await;
    let notification_id = inbox["data"][0]["id"].as_str().unwrap().to_string();
    assert_eq!(inbox["data"][0]["read"], false);

    // Una notificación ajena no existe para el limpiador
    let (status, body) = call(
        &app,
        Method::POST,
        &format!("/api/notifications/{}/read", notification_id),
        Some(&cleaner),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "NOT_FOUND");

    let (status, _) = call(
        &app,
        Method::POST,
        &format!("/api/notifications/{}/read", notification_id),
        Some(&client),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, all) = call(
        &app,
        Method::POST,
        "/api/notifications/read-all",
        Some(&client),
        None,
    )
    .await;
    assert_eq!(all["data"]["affected"], 0);

    let (status, _) = call(
        &app,
        Method::DELETE,
        &format!("/api/notifications/{}", notification_id),
        Some(&client),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let (_, inbox) = call(&app, Method::GET, "/api/notifications", Some(&client), None).await;
    assert!(inbox["data"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_profile_update_keeps_role_and_refreshes_cache() {
    let app = create_router(test_app().state);
    let (token, _) = sign_up(&app, "perfil@example.com", "limpiador").await;

    let (status, updated) = call(
        &app,
        Method::PUT,
        "/api/profile",
        Some(&token),
        Some(json!({ "full_name": "Nombre Nuevo", "role": "cliente" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["data"]["full_name"], "Nombre Nuevo");
    assert_eq!(updated["data"]["role"], "limpiador");

    let (_, cached) = call(&app, Method::GET, "/api/profile/cached", Some(&token), None).await;
    assert_eq!(cached["data"]["full_name"], "Nombre Nuevo");

    let (_, theme) = call(&app, Method::GET, "/api/profile/theme", Some(&token), None).await;
    assert_eq!(theme["data"]["theme"], "system");
    let (_, theme) = call(
        &app,
        Method::PUT,
        "/api/profile/theme",
        Some(&token),
        Some(json!({ "theme": "dark" })),
    )
    .await;
    assert_eq!(theme["data"]["theme"], "dark");
}

#[tokio::test]
async fn test_only_active_services_are_listed() {
    let app = create_router(test_app().state);
    let (status, body) = call(&app, Method::GET, "/api/services", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_location_delete_is_owner_only_and_detaches_bookings() {
    let app = create_router(test_app().state);
    let (owner, _) = sign_up(&app, "cliente@example.com", "cliente").await;
    let (stranger, _) = sign_up(&app, "otro@example.com", "cliente").await;
    let booking_id = open_booking(&app, &owner).await;

    let (_, locations) = call(&app, Method::GET, "/api/locations", Some(&owner), None).await;
    let location_id = locations["data"][0]["id"].as_str().unwrap().to_string();
    let location_uri = format!("/api/locations/{}", location_id);

    // Ajena: cero filas afectadas
    let (status, body) = call(&app, Method::DELETE, &location_uri, Some(&stranger), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "NOT_FOUND");
    let (_, still) = call(&app, Method::GET, "/api/locations", Some(&owner), None).await;
    assert_eq!(still["data"].as_array().unwrap().len(), 1);

    let (status, deleted) = call(&app, Method::DELETE, &location_uri, Some(&owner), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(deleted["data"], location_id.as_str());
    let (_, empty) = call(&app, Method::GET, "/api/locations", Some(&owner), None).await;
    assert!(empty["data"].as_array().unwrap().is_empty());

    // ON DELETE SET NULL: la reserva sobrevive sin ubicación
    let (status, booking) = call(
        &app,
        Method::GET,
        &format!("/api/bookings/{}", booking_id),
        Some(&owner),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(booking["data"]["location_id"], Value::Null);
    assert_eq!(booking["data"]["location"], Value::Null);

    // Borrarla otra vez ya no encuentra nada
    let (status, _) = call(&app, Method::DELETE, &location_uri, Some(&owner), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
