//! End-to-end API tests over the in-memory stores

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use chrono::{DateTime, Utc};
use roster_api::rate_limit::{RateLimiter, RatePolicy};
use roster_api::{AppState, create_router};
use roster_auth::TokenIssuer;
use roster_storage::MemoryFileStore;
use roster_store::{MemoryAccountStore, MemoryRecordStore};
use serde_json::{Value, json};
use tower::ServiceExt;

const TEST_SECRET: &str = "integration-test-secret-0123456789abcdef";
const BOUNDARY: &str = "roster-test-boundary";

fn test_app() -> Router {
    app_with_limiter(RateLimiter::new(RatePolicy::login(), RatePolicy::general()))
}

fn app_with_limiter(limiter: RateLimiter) -> Router {
    let state = AppState::new(
        Arc::new(MemoryAccountStore::new()),
        Arc::new(MemoryRecordStore::new()),
        Arc::new(MemoryFileStore::new()),
        Arc::new(TokenIssuer::new(TEST_SECRET, "roster", "roster-users", 60)),
        limiter,
    );
    create_router(state, None)
}

async fn request(
    app: &Router,
    method: &str,
    path: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(path);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }

    let request = match body {
        Some(value) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(value.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

    (status, value)
}

async fn register(app: &Router, username: &str, email: &str, password: &str, role: &str) -> Value {
    let (status, body) = request(
        app,
        "POST",
        "/api/auth/register",
        None,
        Some(json!({
            "username": username,
            "email": email,
            "password": password,
            "role": role,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "registration failed: {:?}", body);
    body
}

async fn account_id(app: &Router, token: &str) -> String {
    let (status, body) = request(app, "GET", "/api/auth/me", Some(token), None).await;
    assert_eq!(status, StatusCode::OK);
    body["id"].as_str().unwrap().to_string()
}

fn upload_request(
    token: &str,
    filename: &str,
    content_type: &str,
    data: &[u8],
) -> Request<Body> {
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"certificate\"; \
             filename=\"{filename}\"\r\nContent-Type: {content_type}\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

    Request::builder()
        .method("POST")
        .uri("/api/files/upload")
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

#[tokio::test]
async fn test_health_reports_version() {
    let app = test_app();

    let (status, body) = request(&app, "GET", "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["service"], "roster");
    assert!(body["version"].as_str().is_some());
}

#[tokio::test]
async fn test_register_login_and_me_flow() {
    let app = test_app();

    let registered = register(&app, "alice", "alice@x.com", "password1", "User").await;
    assert_eq!(registered["username"], "alice");
    assert_eq!(registered["role"], "User");
    assert!(registered["token"].as_str().is_some());

    let (status, login) = request(
        &app,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({ "username": "alice", "password": "password1" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // Expiry sits roughly one hour out
    let expires_at: DateTime<Utc> = login["expiresAt"].as_str().unwrap().parse().unwrap();
    let minutes = (expires_at - Utc::now()).num_minutes();
    assert!((59..=60).contains(&minutes), "unexpected TTL: {} minutes", minutes);

    let token = login["token"].as_str().unwrap();
    let (status, me) = request(&app, "GET", "/api/auth/me", Some(token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["username"], "alice");
    assert_eq!(me["email"], "alice@x.com");
    assert_eq!(me["role"], "User");
}

#[tokio::test]
async fn test_login_rejects_bad_credentials_uniformly() {
    let app = test_app();
    register(&app, "carol", "carol@x.com", "password1", "User").await;

    // Wrong password and unknown username are indistinguishable
    let (status, body) = request(
        &app,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({ "username": "carol", "password": "wrong-password" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Invalid credentials");

    let (status, body) = request(
        &app,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({ "username": "nobody-here", "password": "whatever1" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Invalid credentials");
}

#[tokio::test]
async fn test_login_validates_input_first() {
    let app = test_app();

    let (status, _) = request(
        &app,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({ "username": "ab", "password": "password1" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = request(
        &app,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({ "username": "alice", "password": "short" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_register_validation_and_duplicates() {
    let app = test_app();

    // Seven characters pass the login minimum but not the register one
    let (status, _) = request(
        &app,
        "POST",
        "/api/auth/register",
        None,
        Some(json!({ "username": "dave", "email": "dave@x.com", "password": "seven77", "role": "User" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = request(
        &app,
        "POST",
        "/api/auth/register",
        None,
        Some(json!({ "username": "dave", "email": "not-an-email", "password": "password1", "role": "User" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Role matching is exact
    let (status, _) = request(
        &app,
        "POST",
        "/api/auth/register",
        None,
        Some(json!({ "username": "dave", "email": "dave@x.com", "password": "password1", "role": "user" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    register(&app, "dave", "dave@x.com", "password1", "User").await;

    // Usernames are case-insensitively unique
    let (status, body) = request(
        &app,
        "POST",
        "/api/auth/register",
        None,
        Some(json!({ "username": "DAVE", "email": "other@x.com", "password": "password1", "role": "User" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Username or email already exists");

    // So are emails
    let (status, _) = request(
        &app,
        "POST",
        "/api/auth/register",
        None,
        Some(json!({ "username": "david", "email": "dave@x.com", "password": "password1", "role": "User" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_protected_routes_require_token() {
    let app = test_app();

    for (method, path) in [
        ("GET", "/api/auth/me"),
        ("GET", "/api/users"),
        ("GET", "/api/files"),
        ("GET", "/api/admin/accounts"),
    ] {
        let (status, _) = request(&app, method, path, None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{} {}", method, path);
    }

    let (status, _) = request(&app, "GET", "/api/users", Some("garbage.token.here"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_admin_routes_forbidden_for_users() {
    let app = test_app();
    let registered = register(&app, "eve", "eve@x.com", "password1", "User").await;
    let token = registered["token"].as_str().unwrap();

    let (status, _) = request(&app, "GET", "/api/admin/accounts", Some(token), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = request(&app, "DELETE", "/api/admin/accounts/some-id", Some(token), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_admin_account_management() {
    let app = test_app();
    let admin = register(&app, "root", "root@x.com", "password1", "Admin").await;
    let admin_token = admin["token"].as_str().unwrap();
    register(&app, "frank", "frank@x.com", "password1", "User").await;

    let (status, accounts) = request(&app, "GET", "/api/admin/accounts", Some(admin_token), None).await;
    assert_eq!(status, StatusCode::OK);
    let accounts = accounts.as_array().unwrap();
    assert_eq!(accounts.len(), 2);
    // Password hashes never serialize
    assert!(accounts
        .iter()
        .all(|a| a.get("passwordHash").is_none() && a.get("password_hash").is_none()));

    let frank = accounts.iter().find(|a| a["username"] == "frank").unwrap();
    let frank_id = frank["id"].as_str().unwrap();
    assert_eq!(frank["isActive"], true);

    // Deactivation makes the account invisible to login
    let (status, toggled) = request(
        &app,
        "PUT",
        &format!("/api/admin/accounts/{}/toggle-status", frank_id),
        Some(admin_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(toggled["isActive"], false);

    let (status, _) = request(
        &app,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({ "username": "frank", "password": "password1" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // Admin-created accounts pass through the same validation
    let (status, created) = request(
        &app,
        "POST",
        "/api/admin/accounts",
        Some(admin_token),
        Some(json!({ "username": "grace", "email": "grace@x.com", "password": "password1", "role": "User" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["username"], "grace");

    let (status, _) = request(
        &app,
        "DELETE",
        &format!("/api/admin/accounts/{}", frank_id),
        Some(admin_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = request(
        &app,
        "DELETE",
        &format!("/api/admin/accounts/{}", frank_id),
        Some(admin_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_record_crud_with_location_header() {
    let app = test_app();
    let user = register(&app, "henry", "henry@x.com", "password1", "User").await;
    let token = user["token"].as_str().unwrap().to_string();
    let me_id = account_id(&app, &token).await;

    // Created without explicit owner: stamped with the caller's id
    let create = Request::builder()
        .method("POST")
        .uri("/api/users")
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(
            json!({
                "firstName": "Henry",
                "lastName": "Jones",
                "email": "henry.jones@corp.example",
                "dateOfBirth": "1990-05-10",
                "placeOfBirth": "Venice",
                "residence": "Rome",
            })
            .to_string(),
        ))
        .unwrap();
    let response = app.clone().oneshot(create).await.unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let location = response
        .headers()
        .get(header::LOCATION)
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    let bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .unwrap();
    let record: Value = serde_json::from_slice(&bytes).unwrap();

    assert_eq!(record["id"], 1);
    assert_eq!(location, "/api/users/1");
    assert_eq!(record["ownerAccountId"], me_id.as_str());
    assert!(record["updatedAt"].is_null());

    let (status, fetched) = request(&app, "GET", "/api/users/1", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["firstName"], "Henry");
    assert_eq!(fetched["dateOfBirth"], "1990-05-10");

    // The body id must match the path
    let (status, _) = request(
        &app,
        "PUT",
        "/api/users/1",
        Some(&token),
        Some(json!({
            "id": 2,
            "firstName": "Henry",
            "lastName": "Jones",
            "email": "henry.jones@corp.example",
            "dateOfBirth": "1990-05-10",
            "placeOfBirth": "Venice",
            "residence": "Rome",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, updated) = request(
        &app,
        "PUT",
        "/api/users/1",
        Some(&token),
        Some(json!({
            "id": 1,
            "firstName": "Henry",
            "lastName": "Jones",
            "email": "henry.jones@corp.example",
            "dateOfBirth": "1990-05-10",
            "placeOfBirth": "Venice",
            "residence": "Florence",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["residence"], "Florence");
    assert!(updated["updatedAt"].is_string());

    let (status, _) = request(&app, "DELETE", "/api/users/1", Some(&token), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = request(&app, "GET", "/api/users/1", Some(&token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = request(&app, "DELETE", "/api/users/1", Some(&token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_record_scoping_between_accounts() {
    let app = test_app();

    let alice = register(&app, "alice", "alice@x.com", "password1", "User").await;
    let alice_token = alice["token"].as_str().unwrap().to_string();
    let bob = register(&app, "bob", "bob@x.com", "password1", "User").await;
    let bob_token = bob["token"].as_str().unwrap().to_string();
    let admin = register(&app, "root", "root@x.com", "password1", "Admin").await;
    let admin_token = admin["token"].as_str().unwrap().to_string();

    let (status, created) = request(
        &app,
        "POST",
        "/api/users",
        Some(&alice_token),
        Some(json!({
            "firstName": "Ada",
            "lastName": "Lovelace",
            "email": "ada@corp.example",
            "dateOfBirth": "1985-12-10",
            "placeOfBirth": "London",
            "residence": "London",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let record_id = created["id"].as_i64().unwrap();

    // Out-of-scope records behave as absent for every verb
    let (_, bob_list) = request(&app, "GET", "/api/users", Some(&bob_token), None).await;
    assert_eq!(bob_list.as_array().unwrap().len(), 0);

    let (status, _) = request(
        &app,
        "GET",
        &format!("/api/users/{}", record_id),
        Some(&bob_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = request(
        &app,
        "PUT",
        &format!("/api/users/{}", record_id),
        Some(&bob_token),
        Some(json!({
            "id": record_id,
            "firstName": "Taken",
            "lastName": "Over",
            "email": "taken@corp.example",
            "dateOfBirth": "1990-01-01",
            "placeOfBirth": "Nowhere",
            "residence": "Nowhere",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = request(
        &app,
        "DELETE",
        &format!("/api/users/{}", record_id),
        Some(&bob_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // Admin sees the full set, alice still owns hers
    let (_, admin_list) = request(&app, "GET", "/api/users", Some(&admin_token), None).await;
    assert_eq!(admin_list.as_array().unwrap().len(), 1);

    let (_, alice_list) = request(&app, "GET", "/api/users", Some(&alice_token), None).await;
    assert_eq!(alice_list.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_record_ownership_assignment() {
    let app = test_app();
    let user = register(&app, "ivy", "ivy@x.com", "password1", "User").await;
    let token = user["token"].as_str().unwrap().to_string();
    let my_id = account_id(&app, &token).await;

    // Non-admins cannot give their records away
    let (status, created) = request(
        &app,
        "POST",
        "/api/users",
        Some(&token),
        Some(json!({
            "firstName": "Ivy",
            "lastName": "Stone",
            "email": "ivy.stone@corp.example",
            "dateOfBirth": "1992-03-04",
            "placeOfBirth": "Oslo",
            "residence": "Oslo",
            "ownerAccountId": "someone-else",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["ownerAccountId"], my_id.as_str());

    // Admins may assign ownership explicitly
    let admin = register(&app, "root", "root@x.com", "password1", "Admin").await;
    let admin_token = admin["token"].as_str().unwrap().to_string();

    let (status, assigned) = request(
        &app,
        "POST",
        "/api/users",
        Some(&admin_token),
        Some(json!({
            "firstName": "Given",
            "lastName": "Away",
            "email": "given@corp.example",
            "dateOfBirth": "1991-01-01",
            "placeOfBirth": "Oslo",
            "residence": "Oslo",
            "ownerAccountId": my_id.as_str(),
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(assigned["ownerAccountId"], my_id.as_str());

    let (_, list) = request(&app, "GET", "/api/users", Some(&token), None).await;
    assert_eq!(list.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_upload_dedup_download_delete_flow() {
    let app = test_app();
    let user = register(&app, "kate", "kate@x.com", "password1", "User").await;
    let token = user["token"].as_str().unwrap().to_string();

    let pdf = b"%PDF-1.4 employee certificate".to_vec();

    let response = app
        .clone()
        .oneshot(upload_request(&token, "cert.pdf", "application/pdf", &pdf))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .unwrap();
    let first: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(first["isDuplicate"], false);
    assert_eq!(first["originalName"], "cert.pdf");
    assert_eq!(first["message"], "File uploaded successfully");
    let file_name = first["fileName"].as_str().unwrap().to_string();

    // Identical bytes under another name dedupe onto the stored name
    let response = app
        .clone()
        .oneshot(upload_request(&token, "renamed.pdf", "application/pdf", &pdf))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .unwrap();
    let second: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(second["isDuplicate"], true);
    assert_eq!(second["fileName"], file_name.as_str());
    assert_eq!(second["message"], "File already exists");

    let (status, files) = request(&app, "GET", "/api/files", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(files.as_array().unwrap().len(), 1);

    // Download restores the original name and bytes
    let download = Request::builder()
        .method("GET")
        .uri(format!("/api/files/{}", file_name))
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(download).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::CONTENT_TYPE).unwrap(),
        "application/pdf"
    );
    let disposition = response
        .headers()
        .get(header::CONTENT_DISPOSITION)
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(disposition.contains("cert.pdf"), "disposition: {}", disposition);
    let bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .unwrap();
    assert_eq!(bytes.as_ref(), pdf.as_slice());

    let (status, _) = request(&app, "DELETE", &format!("/api/files/{}", file_name), Some(&token), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = request(&app, "GET", &format!("/api/files/{}", file_name), Some(&token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = request(&app, "DELETE", &format!("/api/files/{}", file_name), Some(&token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_upload_rejects_invalid_payloads() {
    let app = test_app();
    let user = register(&app, "liam", "liam@x.com", "password1", "User").await;
    let token = user["token"].as_str().unwrap().to_string();

    // Wrong content type
    let response = app
        .clone()
        .oneshot(upload_request(&token, "notes.txt", "text/plain", b"plain text"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Empty payload
    let response = app
        .clone()
        .oneshot(upload_request(&token, "empty.pdf", "application/pdf", b""))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Missing the certificate field entirely
    let body = format!(
        "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"other\"\r\n\r\nhello\r\n--{BOUNDARY}--\r\n"
    );
    let stray = Request::builder()
        .method("POST")
        .uri("/api/files/upload")
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap();
    let response = app.clone().oneshot(stray).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_file_listing_scoped_by_role() {
    let app = test_app();

    let kate = register(&app, "kate", "kate@x.com", "password1", "User").await;
    let kate_token = kate["token"].as_str().unwrap().to_string();
    let mia = register(&app, "mia", "mia@x.com", "password1", "User").await;
    let mia_token = mia["token"].as_str().unwrap().to_string();
    let admin = register(&app, "root", "root@x.com", "password1", "Admin").await;
    let admin_token = admin["token"].as_str().unwrap().to_string();

    app.clone()
        .oneshot(upload_request(&kate_token, "kate.pdf", "application/pdf", b"%PDF-1.4 kate"))
        .await
        .unwrap();
    app.clone()
        .oneshot(upload_request(&mia_token, "mia.pdf", "application/pdf", b"%PDF-1.4 mia"))
        .await
        .unwrap();

    let (_, kate_files) = request(&app, "GET", "/api/files", Some(&kate_token), None).await;
    assert_eq!(kate_files.as_array().unwrap().len(), 1);
    assert_eq!(kate_files[0]["originalName"], "kate.pdf");

    let (_, mia_files) = request(&app, "GET", "/api/files", Some(&mia_token), None).await;
    assert_eq!(mia_files.as_array().unwrap().len(), 1);

    let (_, all_files) = request(&app, "GET", "/api/files", Some(&admin_token), None).await;
    assert_eq!(all_files.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_login_rate_limit_rejects_beyond_queue() {
    // One request per window and no queue slots
    let strict = RatePolicy {
        max_requests: 1,
        window: Duration::from_secs(60),
        queue_depth: 0,
    };
    let app = app_with_limiter(RateLimiter::new(strict, RatePolicy::general()));

    let body = json!({ "username": "whoever", "password": "password1" });
    let (status, _) = request(&app, "POST", "/api/auth/login", None, Some(body.clone())).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let second = Request::builder()
        .method("POST")
        .uri("/api/auth/login")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    let response = app.clone().oneshot(second).await.unwrap();
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    assert!(response.headers().get(header::RETRY_AFTER).is_some());

    // Other endpoints ride the general budget, not the login one
    let (status, _) = request(&app, "GET", "/api/users", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_logout_confirms_without_revoking() {
    let app = test_app();
    let user = register(&app, "noah", "noah@x.com", "password1", "User").await;
    let token = user["token"].as_str().unwrap().to_string();

    let (status, body) = request(&app, "POST", "/api/auth/logout", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["message"].as_str().is_some());

    // Stateless tokens stay valid after logout
    let (status, _) = request(&app, "GET", "/api/auth/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
}
