use crate::GIT_COMMIT_HASH;
use axum::{
    http::{HeaderMap, HeaderValue},
    response::{IntoResponse, Json},
};
use serde::{Deserialize, Serialize};
use tracing::{debug, error};
use utoipa::ToSchema;

#[derive(ToSchema, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct Health {
    status: String,
}

/// First seven characters of the commit, or nothing for an unknown build.
fn short_hash(hash: &str) -> &str {
    hash.get(0..7)
        .filter(|prefix| prefix.chars().all(|c| c.is_ascii_hexdigit()))
        .unwrap_or("")
}

#[utoipa::path(
    get,
    path= "/health",
    responses (
        (status = 200, description = "Service is up", body = Health),
    ),
    tag= "health"
)]
// axum handler for health
pub async fn health() -> impl IntoResponse {
    let headers = format!(
        "{}:{}:{}",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION"),
        short_hash(GIT_COMMIT_HASH)
    )
    .parse::<HeaderValue>()
    .map(|x_app_header_value| {
        debug!("X-App header: {:?}", x_app_header_value);

        let mut headers = HeaderMap::new();

        headers.insert("X-App", x_app_header_value);

        headers
    })
    .unwrap_or_else(|err| {
        error!("Failed to parse X-App header: {}", err);

        HeaderMap::new()
    });

    (
        headers,
        Json(Health {
            status: "up".to_string(),
        }),
    )
}
