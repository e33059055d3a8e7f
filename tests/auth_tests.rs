use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use http_body_util::BodyExt;
use parcelhub::config::{AuthConfig, Config};
use parcelhub::db::Store;
use parcelhub::entities::users;
use parcelhub::services::jwt;
use tower::ServiceExt;

const ADMIN_EMAIL: &str = "admin@parcelhub.local";
const ADMIN_PASSWORD: &str = "password";

async fn spawn_app() -> Router {
    let mut config = Config::default();
    config.general.database_path = "sqlite::memory:".to_string();
    config.server.secure_cookies = false;

    // Single connection: every pooled connection to sqlite::memory: would
    // otherwise get its own empty database.
    let store = Store::with_pool_options(&config.general.database_path, 1, 1)
        .await
        .expect("Failed to open database");
    let state = parcelhub::api::create_app_state(config, store);
    parcelhub::api::router(state)
}

async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<serde_json::Value>,
) -> (StatusCode, serde_json::Value) {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("Content-Type", mime::APPLICATION_JSON.as_ref());
    if let Some(token) = token {
        builder = builder.header("Authorization", format!("Bearer {token}"));
    }

    let body = match body {
        Some(json) => Body::from(serde_json::to_string(&json).unwrap()),
        None => Body::empty(),
    };

    let response = app
        .clone()
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

async fn login(app: &Router, email: &str, password: &str) -> serde_json::Value {
    let (status, body) = send(
        app,
        "POST",
        "/api/auth/login",
        None,
        Some(serde_json::json!({"email": email, "password": password})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    body["data"].clone()
}

/// Builds a password-reset token the way the forgot-password email would
/// carry it. Tests cannot read the mailer's output, but the token only
/// depends on the user id and the shared secret.
fn reset_token_for(user_id: i32, email: &str) -> String {
    let now = chrono::Utc::now();
    let user = users::Model {
        id: user_id,
        email: email.to_string(),
        username: Some(email.to_string()),
        password_hash: String::new(),
        is_superuser: false,
        is_active: false,
        created_at: now,
        updated_at: now,
    };
    jwt::issue_password_reset(&user, &AuthConfig::default()).unwrap()
}

#[tokio::test]
async fn test_login_returns_pair_and_cookie() {
    let app = spawn_app().await;

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/auth/login")
                .header("Content-Type", mime::APPLICATION_JSON.as_ref())
                .body(Body::from(
                    serde_json::json!({"email": ADMIN_EMAIL, "password": ADMIN_PASSWORD})
                        .to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let cookie = response
        .headers()
        .get("set-cookie")
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(cookie.starts_with("refresh_token="));
    assert!(cookie.contains("HttpOnly"));
    assert!(cookie.contains("Path=/api/auth"));

    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert!(body["data"]["access_token"].is_string());
    assert!(body["data"]["refresh_token"].is_string());
    assert_eq!(body["data"]["user"]["email"], ADMIN_EMAIL);
    assert_eq!(body["data"]["user"]["is_superuser"], true);
}

#[tokio::test]
async fn test_refresh_rotates_and_rejects_replay() {
    let app = spawn_app().await;
    let pair = login(&app, ADMIN_EMAIL, ADMIN_PASSWORD).await;
    let old_refresh = pair["refresh_token"].as_str().unwrap();

    let (status, body) = send(
        &app,
        "POST",
        "/api/auth/refresh",
        None,
        Some(serde_json::json!({"refresh_token": old_refresh})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let new_refresh = body["data"]["refresh_token"].as_str().unwrap();
    assert_ne!(new_refresh, old_refresh);

    // The spent token must not work a second time.
    let (status, _) = send(
        &app,
        "POST",
        "/api/auth/refresh",
        None,
        Some(serde_json::json!({"refresh_token": old_refresh})),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(
        &app,
        "POST",
        "/api/auth/refresh",
        None,
        Some(serde_json::json!({"refresh_token": new_refresh})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_refresh_falls_back_to_cookie() {
    let app = spawn_app().await;
    let pair = login(&app, ADMIN_EMAIL, ADMIN_PASSWORD).await;
    let refresh = pair["refresh_token"].as_str().unwrap();

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/auth/refresh")
                .header("Cookie", format!("refresh_token={refresh}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_revoke_invalidates_refresh_token() {
    let app = spawn_app().await;
    let pair = login(&app, ADMIN_EMAIL, ADMIN_PASSWORD).await;
    let refresh = pair["refresh_token"].as_str().unwrap();

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/auth/revoke")
                .header("Cookie", format!("refresh_token={refresh}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    // The cookie is cleared on revoke.
    let cookie = response
        .headers()
        .get("set-cookie")
        .unwrap()
        .to_str()
        .unwrap();
    assert!(cookie.contains("Max-Age=0"));

    let (status, _) = send(
        &app,
        "POST",
        "/api/auth/refresh",
        None,
        Some(serde_json::json!({"refresh_token": refresh})),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_verify_and_me() {
    let app = spawn_app().await;
    let pair = login(&app, ADMIN_EMAIL, ADMIN_PASSWORD).await;
    let access = pair["access_token"].as_str().unwrap();

    let (status, body) = send(
        &app,
        "POST",
        "/api/auth/verify",
        None,
        Some(serde_json::json!({"token": access})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["email"], ADMIN_EMAIL);

    let (status, body) = send(&app, "GET", "/api/auth/me", Some(access), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["is_superuser"], true);
    assert_eq!(body["data"]["client_id"], serde_json::Value::Null);
}

#[tokio::test]
async fn test_forgot_password_does_not_reveal_accounts() {
    let app = spawn_app().await;

    let (status_known, body_known) = send(
        &app,
        "POST",
        "/api/auth/forgot-password",
        None,
        Some(serde_json::json!({"email": ADMIN_EMAIL})),
    )
    .await;
    let (status_unknown, body_unknown) = send(
        &app,
        "POST",
        "/api/auth/forgot-password",
        None,
        Some(serde_json::json!({"email": "ghost@example.com"})),
    )
    .await;

    assert_eq!(status_known, StatusCode::OK);
    assert_eq!(status_known, status_unknown);
    assert_eq!(body_known, body_unknown);
}

#[tokio::test]
async fn test_reset_password_activates_provisioned_account() {
    let app = spawn_app().await;
    let pair = login(&app, ADMIN_EMAIL, ADMIN_PASSWORD).await;
    let admin_token = pair["access_token"].as_str().unwrap().to_string();

    let (status, body) = send(
        &app,
        "POST",
        "/api/clients",
        Some(&admin_token),
        Some(serde_json::json!({
            "first_name": "Maria",
            "last_name": "Perez",
            "email": "maria@example.com"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let client_id = body["data"]["id"].as_i64().unwrap();
    let user_id = i32::try_from(body["data"]["user_id"].as_i64().unwrap()).unwrap();

    // Until the password is set, the provisioned account cannot log in.
    let (status, _) = send(
        &app,
        "POST",
        "/api/auth/login",
        None,
        Some(serde_json::json!({"email": "maria@example.com", "password": "s3cret-pass"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let reset = reset_token_for(user_id, "maria@example.com");

    let (status, body) = send(
        &app,
        "POST",
        "/api/auth/reset-password",
        None,
        Some(serde_json::json!({"token": reset, "new_password": "short"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Password must be at least 8 characters.");

    let (status, _) = send(
        &app,
        "POST",
        "/api/auth/reset-password",
        None,
        Some(serde_json::json!({"token": reset, "new_password": "s3cret-pass"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let owner = login(&app, "maria@example.com", "s3cret-pass").await;
    assert_eq!(owner["user"]["is_superuser"], false);
    assert_eq!(owner["user"]["client_id"].as_i64().unwrap(), client_id);
}

#[tokio::test]
async fn test_reset_token_is_not_a_session_token() {
    let app = spawn_app().await;

    // A reset token authenticates nothing but the reset endpoint.
    let reset = reset_token_for(1, ADMIN_EMAIL);
    let (status, _) = send(&app, "GET", "/api/auth/me", Some(&reset), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_admin_cannot_delete_own_account() {
    let app = spawn_app().await;
    let pair = login(&app, ADMIN_EMAIL, ADMIN_PASSWORD).await;
    let token = pair["access_token"].as_str().unwrap().to_string();
    let admin_id = pair["user"]["id"].as_i64().unwrap();

    let (status, body) = send(
        &app,
        "DELETE",
        &format!("/api/users/{admin_id}"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Cannot delete your own account.");
}
