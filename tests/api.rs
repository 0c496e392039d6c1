//! End-to-end tests for the HTTP surface.
//!
//! The full router (request id, trace and CORS layers included) is driven
//! in-process with `tower::ServiceExt::oneshot` on top of the in-memory store,
//! so no database or listening socket is needed.

use anyhow::Result;
use axum::{
    body::Body,
    http::{header, HeaderMap, Method, Request, StatusCode},
    Router,
};
use bookstore::{
    api::{router, Services},
    auth::{PasswordHasher, TokenConfig},
    store::MemoryStore,
};
use secrecy::SecretString;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

const EMAIL: &str = "reader@example.com";
const PASSWORD: &str = "correct horse battery staple";

fn token_config(secret: &str) -> TokenConfig {
    TokenConfig::new(SecretString::from(secret.to_string()))
}

fn app() -> Router {
    let services = Services::new(
        Arc::new(MemoryStore::new()),
        &token_config("integration-secret"),
        PasswordHasher::new().with_cost(4),
    );
    router(services)
}

struct Reply {
    status: StatusCode,
    headers: HeaderMap,
    body: Value,
}

async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> Result<Reply> {
    let mut builder = Request::builder().method(method).uri(uri);

    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }

    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_vec(&body)?))?,
        None => builder.body(Body::empty())?,
    };

    let response = app.clone().oneshot(request).await?;
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await?;
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };

    Ok(Reply {
        status,
        headers,
        body,
    })
}

async fn signup_and_login(app: &Router) -> Result<String> {
    let credentials = json!({ "email": EMAIL, "password": PASSWORD });

    let reply = send(app, Method::POST, "/signup", None, Some(credentials.clone())).await?;
    assert_eq!(reply.status, StatusCode::OK);

    let reply = send(app, Method::POST, "/login", None, Some(credentials)).await?;
    assert_eq!(reply.status, StatusCode::OK);

    reply.body["access_token"]
        .as_str()
        .map(ToString::to_string)
        .ok_or_else(|| anyhow::anyhow!("login reply has no access_token: {}", reply.body))
}

fn dune() -> Value {
    json!({
        "name": "Dune",
        "author": "Frank Herbert",
        "published_year": 1965,
        "book_summary": "Spice, sandworms and politics on Arrakis."
    })
}

#[tokio::test]
async fn health_reports_up() -> Result<()> {
    let app = app();
    let reply = send(&app, Method::GET, "/health", None, None).await?;

    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.body, json!({ "status": "up" }));

    let x_app = reply
        .headers
        .get("x-app")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    assert!(x_app.starts_with(&format!("bookstore:{}:", env!("CARGO_PKG_VERSION"))));
    Ok(())
}

#[tokio::test]
async fn responses_carry_request_id() -> Result<()> {
    let app = app();

    let reply = send(&app, Method::GET, "/health", None, None).await?;
    assert!(reply.headers.contains_key("x-request-id"));

    let request = Request::builder()
        .uri("/health")
        .header("x-request-id", "req-42")
        .body(Body::empty())?;
    let response = app.oneshot(request).await?;
    assert_eq!(
        response
            .headers()
            .get("x-request-id")
            .and_then(|v| v.to_str().ok()),
        Some("req-42")
    );
    Ok(())
}

#[tokio::test]
async fn signup_then_login_issues_bearer_token() -> Result<()> {
    let app = app();

    let reply = send(
        &app,
        Method::POST,
        "/signup",
        None,
        Some(json!({ "email": EMAIL, "password": PASSWORD })),
    )
    .await?;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.body, json!({ "message": "User created successfully" }));

    let reply = send(
        &app,
        Method::POST,
        "/login",
        None,
        Some(json!({ "email": EMAIL, "password": PASSWORD })),
    )
    .await?;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.body["token_type"], "bearer");
    assert!(reply.body["access_token"]
        .as_str()
        .is_some_and(|token| token.split('.').count() == 3));
    Ok(())
}

#[tokio::test]
async fn duplicate_signup_is_rejected() -> Result<()> {
    let app = app();
    let credentials = json!({ "email": EMAIL, "password": PASSWORD });

    let first = send(&app, Method::POST, "/signup", None, Some(credentials.clone())).await?;
    assert_eq!(first.status, StatusCode::OK);

    let second = send(
        &app,
        Method::POST,
        "/signup",
        None,
        Some(json!({ "email": EMAIL, "password": "another password" })),
    )
    .await?;
    assert_eq!(second.status, StatusCode::BAD_REQUEST);
    assert_eq!(second.body, json!({ "detail": "Email already registered" }));

    // the original password still works
    let login = send(&app, Method::POST, "/login", None, Some(credentials)).await?;
    assert_eq!(login.status, StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn login_failures_look_the_same() -> Result<()> {
    let app = app();
    signup_and_login(&app).await?;

    let wrong_password = send(
        &app,
        Method::POST,
        "/login",
        None,
        Some(json!({ "email": EMAIL, "password": "nope" })),
    )
    .await?;
    let unknown_email = send(
        &app,
        Method::POST,
        "/login",
        None,
        Some(json!({ "email": "ghost@example.com", "password": PASSWORD })),
    )
    .await?;

    assert_eq!(wrong_password.status, StatusCode::BAD_REQUEST);
    assert_eq!(unknown_email.status, StatusCode::BAD_REQUEST);
    assert_eq!(wrong_password.body, unknown_email.body);
    assert_eq!(
        wrong_password.body,
        json!({ "detail": "Incorrect email or password" })
    );
    Ok(())
}

#[tokio::test]
async fn malformed_credentials_are_unprocessable() -> Result<()> {
    let app = app();

    let missing_password = send(
        &app,
        Method::POST,
        "/signup",
        None,
        Some(json!({ "email": EMAIL })),
    )
    .await?;
    assert_eq!(missing_password.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(missing_password.body["detail"].is_string());

    let bad_email = send(
        &app,
        Method::POST,
        "/signup",
        None,
        Some(json!({ "email": "not-an-email", "password": PASSWORD })),
    )
    .await?;
    assert_eq!(bad_email.status, StatusCode::UNPROCESSABLE_ENTITY);

    let oversized = send(
        &app,
        Method::POST,
        "/signup",
        None,
        Some(json!({ "email": EMAIL, "password": "a".repeat(73) })),
    )
    .await?;
    assert_eq!(oversized.status, StatusCode::UNPROCESSABLE_ENTITY);

    let request = Request::builder()
        .method(Method::POST)
        .uri("/login")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))?;
    let response = app.oneshot(request).await?;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    Ok(())
}

#[tokio::test]
async fn book_routes_require_a_token() -> Result<()> {
    let app = app();

    for (method, uri) in [
        (Method::GET, "/books/"),
        (Method::POST, "/books/"),
        (Method::GET, "/books/1"),
        (Method::PUT, "/books/1"),
        (Method::DELETE, "/books/1"),
    ] {
        let body = (method == Method::POST || method == Method::PUT).then(dune);
        let reply = send(&app, method.clone(), uri, None, body).await?;
        assert_eq!(reply.status, StatusCode::FORBIDDEN, "{method} {uri}");
        assert!(reply.body["detail"].is_string());
    }
    Ok(())
}

#[tokio::test]
async fn foreign_or_garbage_tokens_are_forbidden() -> Result<()> {
    let app = app();

    let foreign = bookstore::auth::TokenIssuer::new(&token_config("some-other-secret"))
        .issue(&json!({ "sub": EMAIL }), None)?;

    for token in [foreign.as_str(), "not-a-jwt"] {
        let reply = send(&app, Method::GET, "/books/", Some(token), None).await?;
        assert_eq!(reply.status, StatusCode::FORBIDDEN);
        assert_eq!(
            reply.body,
            json!({ "detail": "Invalid token or expired token" })
        );
    }
    Ok(())
}

#[tokio::test]
async fn book_crud_round_trip() -> Result<()> {
    let app = app();
    let token = signup_and_login(&app).await?;
    let token = Some(token.as_str());

    let empty = send(&app, Method::GET, "/books/", token, None).await?;
    assert_eq!(empty.status, StatusCode::OK);
    assert_eq!(empty.body, json!([]));

    let created = send(&app, Method::POST, "/books/", token, Some(dune())).await?;
    assert_eq!(created.status, StatusCode::OK);
    let id = created.body["id"]
        .as_i64()
        .ok_or_else(|| anyhow::anyhow!("created book has no id"))?;
    assert_eq!(created.body["name"], "Dune");
    assert_eq!(created.body["published_year"], 1965);

    let fetched = send(&app, Method::GET, &format!("/books/{id}"), token, None).await?;
    assert_eq!(fetched.status, StatusCode::OK);
    assert_eq!(fetched.body, created.body);

    let listed = send(&app, Method::GET, "/books", token, None).await?;
    assert_eq!(listed.body, json!([created.body.clone()]));

    let mut revised = dune();
    revised["book_summary"] = json!("A desert planet and a messiah.");
    let updated = send(
        &app,
        Method::PUT,
        &format!("/books/{id}"),
        token,
        Some(revised),
    )
    .await?;
    assert_eq!(updated.status, StatusCode::OK);
    assert_eq!(updated.body["id"], id);
    assert_eq!(updated.body["book_summary"], "A desert planet and a messiah.");

    let deleted = send(&app, Method::DELETE, &format!("/books/{id}"), token, None).await?;
    assert_eq!(deleted.status, StatusCode::OK);
    assert_eq!(deleted.body, updated.body);

    let gone = send(&app, Method::GET, &format!("/books/{id}"), token, None).await?;
    assert_eq!(gone.status, StatusCode::NOT_FOUND);
    assert_eq!(gone.body, json!({ "detail": "Book not found" }));
    Ok(())
}

#[tokio::test]
async fn missing_books_are_not_found() -> Result<()> {
    let app = app();
    let token = signup_and_login(&app).await?;
    let token = Some(token.as_str());

    let get = send(&app, Method::GET, "/books/999", token, None).await?;
    let put = send(&app, Method::PUT, "/books/999", token, Some(dune())).await?;
    let delete = send(&app, Method::DELETE, "/books/999", token, None).await?;

    assert_eq!(get.status, StatusCode::NOT_FOUND);
    assert_eq!(put.status, StatusCode::NOT_FOUND);
    assert_eq!(delete.status, StatusCode::NOT_FOUND);

    // a failed update must not create the record
    let listed = send(&app, Method::GET, "/books/", token, None).await?;
    assert_eq!(listed.body, json!([]));
    Ok(())
}

#[tokio::test]
async fn invalid_book_input_is_unprocessable() -> Result<()> {
    let app = app();
    let token = signup_and_login(&app).await?;
    let token = Some(token.as_str());

    let missing_field = send(
        &app,
        Method::POST,
        "/books/",
        token,
        Some(json!({ "name": "Untitled", "author": "Anon", "published_year": 2001 })),
    )
    .await?;
    assert_eq!(missing_field.status, StatusCode::UNPROCESSABLE_ENTITY);

    let wrong_type = send(
        &app,
        Method::POST,
        "/books/",
        token,
        Some(json!({
            "name": "Untitled",
            "author": "Anon",
            "published_year": "two thousand",
            "book_summary": ""
        })),
    )
    .await?;
    assert_eq!(wrong_type.status, StatusCode::UNPROCESSABLE_ENTITY);

    let bad_id = send(&app, Method::GET, "/books/abc", token, None).await?;
    assert_eq!(bad_id.status, StatusCode::UNPROCESSABLE_ENTITY);
    Ok(())
}

#[tokio::test]
async fn books_are_shared_between_users() -> Result<()> {
    let app = app();
    let alice = signup_and_login(&app).await?;

    let bob_credentials = json!({ "email": "bob@example.com", "password": "hunter22" });
    send(&app, Method::POST, "/signup", None, Some(bob_credentials.clone())).await?;
    let bob = send(&app, Method::POST, "/login", None, Some(bob_credentials)).await?;
    let bob = bob.body["access_token"].as_str().unwrap_or_default().to_string();

    let created = send(&app, Method::POST, "/books/", Some(&alice), Some(dune())).await?;
    let id = created.body["id"].as_i64().unwrap_or_default();

    let seen_by_bob = send(&app, Method::GET, &format!("/books/{id}"), Some(&bob), None).await?;
    assert_eq!(seen_by_bob.status, StatusCode::OK);
    assert_eq!(seen_by_bob.body, created.body);
    Ok(())
}
