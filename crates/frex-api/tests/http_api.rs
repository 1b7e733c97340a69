//! End-to-end HTTP tests over the assembled router, driving the full
//! delivery lifecycle through the public API surface with in-memory
//! backends.

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use frex_api::{app, AppConfig, AppState};
use frex_auth::{NewWebUser, TokenTtls};
use frex_core::Role;

// ─── Harness ─────────────────────────────────────────────────────────

fn test_state() -> AppState {
    let config = AppConfig {
        port: 0,
        token_secret: b"http-test-secret".to_vec(),
        ttls: TokenTtls::default(),
        bootstrap_admin: None,
    };
    let state = AppState::in_memory(&config);
    state
        .auth
        .register_web_user(NewWebUser {
            name: "Root Admin".to_string(),
            email: "admin@frex.test".to_string(),
            password: "admin-pw".to_string(),
            role: Role::Admin,
        })
        .expect("seed admin");
    state
}

async fn send(
    router: &Router,
    method: Method,
    path: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(path);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = match body {
        Some(value) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(value.to_string()))
            .expect("build request"),
        None => builder.body(Body::empty()).expect("build request"),
    };

    let response = router.clone().oneshot(request).await.expect("send request");
    let status = response.status();
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("read body")
        .to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("parse body")
    };
    (status, value)
}

async fn admin_token(router: &Router) -> String {
    let (status, body) = send(
        router,
        Method::POST,
        "/auth/web-login",
        None,
        Some(json!({"email": "admin@frex.test", "password": "admin-pw"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "admin login failed: {body}");
    body["token"].as_str().expect("token").to_string()
}

/// Register a driver and log them in; returns (driver_id, token).
async fn driver(router: &Router, email: &str) -> (String, String) {
    let (status, body) = send(
        router,
        Method::POST,
        "/auth/register",
        None,
        Some(json!({
            "name": "Test Driver",
            "email": email,
            "password": "driver-pw",
            "transport_company": "Transportes Oeste",
            "license_plate": "ABC-1234",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "registration failed: {body}");
    let driver_id = body["id"].as_str().expect("driver id").to_string();

    let (status, body) = send(
        router,
        Method::POST,
        "/auth/login",
        None,
        Some(json!({"email": email, "password": "driver-pw"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "driver login failed: {body}");
    (driver_id, body["token"].as_str().expect("token").to_string())
}

/// Create a shipment for `driver_id`; returns the response body.
async fn create_shipment(router: &Router, admin: &str, driver_id: &str, numbers: &[&str]) -> Value {
    let (status, body) = send(
        router,
        Method::POST,
        "/shipments",
        Some(admin),
        Some(json!({
            "name": "Load 42",
            "destination": "Curitiba/PR",
            "description": "Pallets",
            "driver_id": driver_id,
            "invoice_numbers": numbers,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "shipment creation failed: {body}");
    body
}

fn invoice_ids(created: &Value) -> Vec<String> {
    created["invoices"]
        .as_array()
        .expect("invoices array")
        .iter()
        .map(|i| i["id"].as_str().expect("invoice id").to_string())
        .collect()
}

// ─── Probes and auth surface ─────────────────────────────────────────

#[tokio::test]
async fn test_health_is_unauthenticated() {
    let router = app(test_state());
    let (status, body) = send(&router, Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_validate_token() {
    let router = app(test_state());
    let admin = admin_token(&router).await;

    let (status, body) =
        send(&router, Method::GET, "/auth/validate-token", Some(&admin), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["valid"], true);

    let (status, body) =
        send(&router, Method::GET, "/auth/validate-token", Some("junk"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["valid"], false);

    let (status, body) = send(&router, Method::GET, "/auth/validate-token", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["valid"], false);
}

#[tokio::test]
async fn test_driver_login_rejects_web_users_and_vice_versa() {
    let router = app(test_state());
    let (_, _) = driver(&router, "edu@frex.test").await;

    // Admin on the driver surface.
    let (status, _) = send(
        &router,
        Method::POST,
        "/auth/login",
        None,
        Some(json!({"email": "admin@frex.test", "password": "admin-pw"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // Driver on the web surface.
    let (status, _) = send(
        &router,
        Method::POST,
        "/auth/web-login",
        None,
        Some(json!({"email": "edu@frex.test", "password": "driver-pw"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_duplicate_registration_conflicts() {
    let router = app(test_state());
    let (_, _) = driver(&router, "dup@frex.test").await;

    let (status, body) = send(
        &router,
        Method::POST,
        "/auth/register",
        None,
        Some(json!({
            "name": "Someone Else",
            "email": "dup@frex.test",
            "password": "other-pw",
            "transport_company": "Another Co",
            "license_plate": "XYZ-9999",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT, "{body}");
    assert_eq!(body["error"]["code"], "CONFLICT");
}

#[tokio::test]
async fn test_web_user_creation_is_admin_only() {
    let router = app(test_state());
    let admin = admin_token(&router).await;
    let (_, driver_token) = driver(&router, "edu@frex.test").await;

    let viewer_req = json!({
        "name": "Viewer",
        "email": "viewer@frex.test",
        "password": "viewer-pw",
        "role": "viewer",
    });

    let (status, _) = send(
        &router,
        Method::POST,
        "/auth/users",
        Some(&driver_token),
        Some(viewer_req.clone()),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) =
        send(&router, Method::POST, "/auth/users", Some(&admin), Some(viewer_req)).await;
    assert_eq!(status, StatusCode::CREATED);

    // The new viewer can read history but cannot mint users.
    let (status, body) = send(
        &router,
        Method::POST,
        "/auth/web-login",
        None,
        Some(json!({"email": "viewer@frex.test", "password": "viewer-pw"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let viewer = body["token"].as_str().unwrap().to_string();

    let (status, _) = send(&router, Method::GET, "/shipments/history", Some(&viewer), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(
        &router,
        Method::POST,
        "/auth/users",
        Some(&viewer),
        Some(json!({
            "name": "X", "email": "x@frex.test", "password": "pw", "role": "admin",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

// ─── Shipment lifecycle ──────────────────────────────────────────────

#[tokio::test]
async fn test_full_delivery_lifecycle() {
    let router = app(test_state());
    let admin = admin_token(&router).await;
    let (driver_id, driver_token) = driver(&router, "edu@frex.test").await;

    let created = create_shipment(&router, &admin, &driver_id, &["NF-1", "NF-2", "NF-3"]).await;
    assert_eq!(created["shipment"]["status"], "pending");
    let ids = invoice_ids(&created);

    // NF-1 delivered.
    let (status, body) = send(
        &router,
        Method::POST,
        &format!("/invoices/{}/deliver", ids[0]),
        Some(&driver_token),
        Some(json!({"proof_ref": "proofs/nf1.jpg"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["status"], "delivered");

    // NF-2 divergent, lenient issue-type spelling.
    let (status, body) = send(
        &router,
        Method::POST,
        &format!("/invoices/{}/report-issue", ids[1]),
        Some(&driver_token),
        Some(json!({"issue_type": "Damaged Goods", "issue_details": "crates crushed"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["status"], "divergent");
    assert_eq!(body["issue_type"], "damaged_goods");

    // Shipment still pending with one invoice open.
    let (_, mine) = send(&router, Method::GET, "/shipments/mine", Some(&driver_token), None).await;
    assert_eq!(mine[0]["shipment"]["status"], "pending");

    // NF-3 delivered — the shipment finalizes automatically.
    let (status, _) = send(
        &router,
        Method::POST,
        &format!("/invoices/{}/deliver", ids[2]),
        Some(&driver_token),
        Some(json!({"proof_ref": "proofs/nf3.jpg"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, history) =
        send(&router, Method::GET, "/shipments/history", Some(&admin), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(history[0]["shipment"]["status"], "finalized");
    assert!(history[0]["shipment"]["finished_at"].is_string());

    // Any repeat resolution conflicts and changes nothing.
    let (status, body) = send(
        &router,
        Method::POST,
        &format!("/invoices/{}/deliver", ids[0]),
        Some(&driver_token),
        Some(json!({"proof_ref": "proofs/again.jpg"})),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT, "{body}");
    assert_eq!(body["error"]["code"], "CONFLICT");
}

#[tokio::test]
async fn test_shipment_creation_requires_admin() {
    let router = app(test_state());
    let (driver_id, driver_token) = driver(&router, "edu@frex.test").await;

    let request = json!({
        "name": "Load",
        "destination": "Niterói/RJ",
        "driver_id": driver_id,
        "invoice_numbers": ["NF-1"],
    });

    let (status, _) = send(&router, Method::POST, "/shipments", None, Some(request.clone())).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(
        &router,
        Method::POST,
        "/shipments",
        Some(&driver_token),
        Some(request),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_foreign_driver_cannot_resolve() {
    let router = app(test_state());
    let admin = admin_token(&router).await;
    let (driver_id, _) = driver(&router, "owner@frex.test").await;
    let (_, foreign_token) = driver(&router, "foreign@frex.test").await;

    let created = create_shipment(&router, &admin, &driver_id, &["NF-1"]).await;
    let ids = invoice_ids(&created);

    let (status, body) = send(
        &router,
        Method::POST,
        &format!("/invoices/{}/deliver", ids[0]),
        Some(&foreign_token),
        Some(json!({"proof_ref": "proofs/x.jpg"})),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN, "{body}");
}

#[tokio::test]
async fn test_unknown_invoice_is_404() {
    let router = app(test_state());
    let (_, driver_token) = driver(&router, "edu@frex.test").await;

    let (status, body) = send(
        &router,
        Method::POST,
        &format!("/invoices/{}/deliver", uuid::Uuid::new_v4()),
        Some(&driver_token),
        Some(json!({"proof_ref": "proofs/x.jpg"})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND, "{body}");
    assert_eq!(body["error"]["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_manual_finish_preconditions() {
    let router = app(test_state());
    let admin = admin_token(&router).await;
    let (driver_id, driver_token) = driver(&router, "edu@frex.test").await;

    let created = create_shipment(&router, &admin, &driver_id, &["NF-1"]).await;
    let shipment_id = created["shipment"]["id"].as_str().unwrap().to_string();
    let ids = invoice_ids(&created);

    // Pending invoices block the manual finish.
    let (status, body) = send(
        &router,
        Method::POST,
        &format!("/shipments/{shipment_id}/finish"),
        Some(&admin),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT, "{body}");

    // Resolve the last invoice — automatic finalization runs.
    let (status, _) = send(
        &router,
        Method::POST,
        &format!("/invoices/{}/deliver", ids[0]),
        Some(&driver_token),
        Some(json!({"proof_ref": "proofs/nf1.jpg"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // A second finish is a conflict, not a second finished_at.
    let (status, body) = send(
        &router,
        Method::POST,
        &format!("/shipments/{shipment_id}/finish"),
        Some(&admin),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT, "{body}");
}

#[tokio::test]
async fn test_mine_is_scoped_to_the_caller() {
    let router = app(test_state());
    let admin = admin_token(&router).await;
    let (first_id, first_token) = driver(&router, "first@frex.test").await;
    let (_, second_token) = driver(&router, "second@frex.test").await;

    create_shipment(&router, &admin, &first_id, &["NF-1"]).await;

    let (status, mine) =
        send(&router, Method::GET, "/shipments/mine", Some(&first_token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(mine.as_array().unwrap().len(), 1);

    let (status, mine) =
        send(&router, Method::GET, "/shipments/mine", Some(&second_token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(mine.as_array().unwrap().len(), 0);

    // Back-office tokens are rejected on the driver surface.
    let (status, _) = send(&router, Method::GET, "/shipments/mine", Some(&admin), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_drivers_listing_is_admin_only() {
    let router = app(test_state());
    let admin = admin_token(&router).await;
    let (_, driver_token) = driver(&router, "edu@frex.test").await;

    let (status, drivers) = send(&router, Method::GET, "/drivers", Some(&admin), None).await;
    assert_eq!(status, StatusCode::OK);
    let list = drivers.as_array().unwrap();
    assert_eq!(list.len(), 1);
    assert_eq!(list[0]["email"], "edu@frex.test");
    assert_eq!(list[0]["transport_company"], "Transportes Oeste");
    assert!(list[0].get("credential").is_none());

    let (status, _) = send(&router, Method::GET, "/drivers", Some(&driver_token), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_deliver_with_proof_upload() {
    let router = app(test_state());
    let admin = admin_token(&router).await;
    let (driver_id, driver_token) = driver(&router, "edu@frex.test").await;
    let created = create_shipment(&router, &admin, &driver_id, &["NF-1"]).await;
    let ids = invoice_ids(&created);

    // "jpeg magic bytes" base64-encoded: [0xff, 0xd8, 0xff] -> "/9j/"
    let (status, body) = send(
        &router,
        Method::POST,
        &format!("/invoices/{}/deliver-with-proof", ids[0]),
        Some(&driver_token),
        Some(json!({"content_type": "image/jpeg", "payload": "/9j/"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["status"], "delivered");
    let proof_ref = body["proof_ref"].as_str().expect("proof ref");
    assert!(proof_ref.starts_with("mem://proofs/"));

    // Invalid base64 is a validation error, not an upload failure.
    let (status, body) = send(
        &router,
        Method::POST,
        &format!("/invoices/{}/deliver-with-proof", ids[0]),
        Some(&driver_token),
        Some(json!({"content_type": "image/jpeg", "payload": "!!not-base64!!"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY, "{body}");
}

#[tokio::test]
async fn test_unknown_issue_type_is_validation_error() {
    let router = app(test_state());
    let admin = admin_token(&router).await;
    let (driver_id, driver_token) = driver(&router, "edu@frex.test").await;
    let created = create_shipment(&router, &admin, &driver_id, &["NF-1"]).await;
    let ids = invoice_ids(&created);

    let (status, body) = send(
        &router,
        Method::POST,
        &format!("/invoices/{}/report-issue", ids[0]),
        Some(&driver_token),
        Some(json!({"issue_type": "aliens", "issue_details": "abducted"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY, "{body}");
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
}
