use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use http_body_util::BodyExt;
use parcelhub::config::Config;
use parcelhub::db::Store;
use tower::ServiceExt;

/// Admin account seeded by the initial migration.
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

async fn login_admin(app: &Router) -> String {
    let (status, body) = send(
        app,
        "POST",
        "/api/auth/login",
        None,
        Some(serde_json::json!({"email": ADMIN_EMAIL, "password": ADMIN_PASSWORD})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    body["data"]["access_token"].as_str().unwrap().to_string()
}

fn client_payload(n: u32) -> serde_json::Value {
    serde_json::json!({
        "first_name": format!("First{n}"),
        "last_name": format!("Last{n}"),
        "email": format!("client{n}@example.com"),
        "identification_number": format!("ID-{n:04}"),
        "city": "Quito",
        "mobile_phone_number": "0999999999"
    })
}

#[tokio::test]
async fn test_health_is_public() {
    let app = spawn_app().await;

    let (status, body) = send(&app, "GET", "/api/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["message"], "ok");
}

#[tokio::test]
async fn test_protected_routes_require_token() {
    let app = spawn_app().await;

    let (status, _) = send(&app, "GET", "/api/clients", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(&app, "GET", "/api/dashboard", Some("not-a-jwt"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_login_rejects_bad_credentials() {
    let app = spawn_app().await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/auth/login",
        None,
        Some(serde_json::json!({"email": ADMIN_EMAIL, "password": "wrong"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["success"], false);

    let (status, _) = send(
        &app,
        "POST",
        "/api/auth/login",
        None,
        Some(serde_json::json!({"email": "nobody@example.com", "password": "whatever"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_client_crud() {
    let app = spawn_app().await;
    let token = login_admin(&app).await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/clients",
        Some(&token),
        Some(client_payload(1)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let client = &body["data"];
    let id = client["id"].as_i64().unwrap();
    assert_eq!(client["first_name"], "First1");
    assert_eq!(client["email"], "client1@example.com");
    // A login account is provisioned alongside the client.
    assert!(client["user_id"].is_i64());

    let (status, body) = send(
        &app,
        "GET",
        &format!("/api/clients/{id}"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["last_name"], "Last1");

    let (status, body) = send(
        &app,
        "PUT",
        &format!("/api/clients/{id}"),
        Some(&token),
        Some(serde_json::json!({"city": "Guayaquil", "email": "hijack@example.com"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["city"], "Guayaquil");
    // The login email is not updatable through this endpoint.
    assert_eq!(body["data"]["email"], "client1@example.com");

    let (status, body) = send(
        &app,
        "GET",
        "/api/clients?search=First1",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["total_count"], 1);

    let (status, _) = send(
        &app,
        "DELETE",
        &format!("/api/clients/{id}"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(
        &app,
        "GET",
        &format!("/api/clients/{id}"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_duplicate_client_email_rejected() {
    let app = spawn_app().await;
    let token = login_admin(&app).await;

    let (status, _) = send(
        &app,
        "POST",
        "/api/clients",
        Some(&token),
        Some(client_payload(1)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(
        &app,
        "POST",
        "/api/clients",
        Some(&token),
        Some(client_payload(1)),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "A user with this email already exists.");
}

#[tokio::test]
async fn test_package_crud_and_barcode_immutability() {
    let app = spawn_app().await;
    let token = login_admin(&app).await;

    let (_, body) = send(
        &app,
        "POST",
        "/api/clients",
        Some(&token),
        Some(client_payload(1)),
    )
    .await;
    let client_id = body["data"]["id"].as_i64().unwrap();

    let (status, body) = send(
        &app,
        "POST",
        "/api/packages",
        Some(&token),
        Some(serde_json::json!({
            "barcode": "PKG-001",
            "courier": "DHL",
            "client_id": client_id,
            "weight": 2.5,
            "weight_unit": "kg",
            "service_price": 12.0
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let package_id = body["data"]["id"].as_i64().unwrap();
    assert_eq!(body["data"]["consolidate_id"], serde_json::Value::Null);

    let (status, body) = send(
        &app,
        "PUT",
        &format!("/api/packages/{package_id}"),
        Some(&token),
        Some(serde_json::json!({"weight": 3.0})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["weight"], 3.0);

    let (status, body) = send(
        &app,
        "PUT",
        &format!("/api/packages/{package_id}"),
        Some(&token),
        Some(serde_json::json!({"barcode": "PKG-002"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Barcode cannot be modified.");

    // Even the stored value is rejected; presence of the key is enough.
    let (status, body) = send(
        &app,
        "PUT",
        &format!("/api/packages/{package_id}"),
        Some(&token),
        Some(serde_json::json!({"barcode": "PKG-001", "weight": 4.0})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Barcode cannot be modified.");

    let (status, _) = send(
        &app,
        "DELETE",
        &format!("/api/packages/{package_id}"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_package_create_requires_existing_client() {
    let app = spawn_app().await;
    let token = login_admin(&app).await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/packages",
        Some(&token),
        Some(serde_json::json!({"barcode": "PKG-001", "courier": "DHL", "client_id": 424242})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Client not found: 424242");
}

#[tokio::test]
async fn test_page_size_allow_list() {
    let app = spawn_app().await;
    let token = login_admin(&app).await;

    let (status, body) = send(&app, "GET", "/api/clients?page_size=25", Some(&token), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["error"],
        "Invalid page_size. Valid values are 10, 20, 50, 100. Got 25."
    );

    let (status, _) = send(&app, "GET", "/api/clients?page_size=20", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_invalid_order_by_rejected() {
    let app = spawn_app().await;
    let token = login_admin(&app).await;

    let (status, body) = send(
        &app,
        "GET",
        "/api/packages?order_by=-shoe_size",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid order_by value: -shoe_size");
}

#[tokio::test]
async fn test_pagination_envelope() {
    let app = spawn_app().await;
    let token = login_admin(&app).await;

    for n in 1..=12 {
        let (status, _) = send(
            &app,
            "POST",
            "/api/clients",
            Some(&token),
            Some(client_payload(n)),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    let (status, body) = send(
        &app,
        "GET",
        "/api/clients?page=1&page_size=10&order_by=id",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let data = &body["data"];
    assert_eq!(data["total_count"], 12);
    assert_eq!(data["results"].as_array().unwrap().len(), 10);
    assert_eq!(data["has_next"], true);
    assert_eq!(data["has_previous"], false);

    let (_, body) = send(
        &app,
        "GET",
        "/api/clients?page=2&page_size=10&order_by=id",
        Some(&token),
        None,
    )
    .await;
    let data = &body["data"];
    assert_eq!(data["results"].as_array().unwrap().len(), 2);
    assert_eq!(data["has_next"], false);
    assert_eq!(data["has_previous"], true);
}

#[tokio::test]
async fn test_full_name_sort() {
    let app = spawn_app().await;
    let token = login_admin(&app).await;

    for (first, last, email) in [
        ("Zoe", "Adams", "zoe@example.com"),
        ("Ana", "Borja", "ana@example.com"),
    ] {
        let (status, _) = send(
            &app,
            "POST",
            "/api/clients",
            Some(&token),
            Some(serde_json::json!({
                "first_name": first,
                "last_name": last,
                "email": email
            })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    let (status, body) = send(
        &app,
        "GET",
        "/api/clients?order_by=full_name",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let results = body["data"]["results"].as_array().unwrap();
    assert_eq!(results[0]["first_name"], "Ana");
    assert_eq!(results[1]["first_name"], "Zoe");
}
