use crate::{
    auth::{require_bearer, AuthService, PasswordHasher, TokenConfig, TokenIssuer, TokenVerifier},
    store::{BookStore, CredentialStore, PgStore},
};
use anyhow::{Context, Result};
use axum::{
    body::Body,
    extract::MatchedPath,
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE},
        HeaderName, HeaderValue, Method, Request,
    },
    middleware,
    routing::{get, post},
    Extension, Router,
};
use sqlx::postgres::PgPoolOptions;
use std::{sync::Arc, time::Duration};
use tokio::{net::TcpListener, signal};
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::PropagateRequestIdLayer,
    set_header::SetRequestHeaderLayer,
    trace::TraceLayer,
};
use tracing::{info, info_span, Span};
use ulid::Ulid;
use utoipa_swagger_ui::SwaggerUi;

pub mod error;
pub(crate) mod handlers;
mod openapi;

pub use openapi::openapi;

/// Everything the handlers need, shared through `Extension` layers.
#[derive(Clone)]
pub struct Services {
    pub auth: Arc<AuthService>,
    pub verifier: Arc<TokenVerifier>,
    pub books: Arc<dyn BookStore>,
}

impl Services {
    /// Wire the auth service and the book catalog to one backing store.
    #[must_use]
    pub fn new<S>(store: Arc<S>, config: &TokenConfig, hasher: PasswordHasher) -> Self
    where
        S: CredentialStore + BookStore + 'static,
    {
        let credentials: Arc<dyn CredentialStore> = store.clone();
        let books: Arc<dyn BookStore> = store;

        Self {
            auth: Arc::new(AuthService::new(
                credentials,
                hasher,
                TokenIssuer::new(config),
            )),
            verifier: Arc::new(TokenVerifier::new(config)),
            books,
        }
    }
}

/// Build the full application router: public auth routes, bearer-gated book
/// routes, API docs, and the request-id/trace/CORS stack.
pub fn router(services: Services) -> Router {
    let books = Router::new()
        .route(
            "/books/",
            get(handlers::list_books).post(handlers::create_book),
        )
        .route("/books", get(handlers::list_books).post(handlers::create_book))
        .route(
            "/books/:id",
            get(handlers::get_book)
                .put(handlers::update_book)
                .delete(handlers::delete_book),
        )
        .route_layer(middleware::from_fn(require_bearer));

    let cors = CorsLayer::new()
        .allow_headers([CONTENT_TYPE, AUTHORIZATION])
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_origin(Any);

    Router::new()
        .route("/", get(|| async { env!("CARGO_PKG_NAME") }))
        .route("/health", get(handlers::health))
        .route("/signup", post(handlers::signup))
        .route("/login", post(handlers::login))
        .merge(books)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", openapi()))
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestHeaderLayer::if_not_present(
                    HeaderName::from_static("x-request-id"),
                    |_req: &_| HeaderValue::from_str(Ulid::new().to_string().as_str()).ok(),
                ))
                .layer(PropagateRequestIdLayer::new(HeaderName::from_static(
                    "x-request-id",
                )))
                .layer(TraceLayer::new_for_http().make_span_with(make_span))
                .layer(cors)
                .layer(Extension(services.auth))
                .layer(Extension(services.verifier))
                .layer(Extension(services.books)),
        )
}

/// Start the server
/// # Errors
/// Return error if failed to connect to the database, apply the schema, or
/// bind the listener
pub async fn new(
    port: u16,
    dsn: String,
    token_config: TokenConfig,
    hasher: PasswordHasher,
) -> Result<()> {
    // Connect to database
    let pool = PgPoolOptions::new()
        .min_connections(1)
        .max_connections(5)
        .max_lifetime(Duration::from_secs(60 * 2))
        .test_before_acquire(true)
        .connect(&dsn)
        .await
        .context("Failed to connect to database")?;

    let store = Arc::new(PgStore::new(pool));

    store
        .migrate()
        .await
        .context("Failed to apply database schema")?;

    let app = router(Services::new(store, &token_config, hasher));

    let listener = TcpListener::bind(format!("::0:{port}")).await?;

    info!("Listening on [::]:{}", port);

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {err}");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(err) => {
                tracing::error!("Failed to listen for SIGTERM: {err}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    info!("Gracefully shutdown");
}

fn make_span(request: &Request<Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|val| val.to_str().ok())
        .unwrap_or("none");
    let matched_path = request
        .extensions()
        .get::<MatchedPath>()
        .map_or_else(|| request.uri().path(), MatchedPath::as_str);

    info_span!(
        "http.request",
        http.method = %request.method(),
        http.route = matched_path,
        request_id
    )
}
