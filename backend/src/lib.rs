//! # Books Backend
//!
//! A REST API over a single SQLite table of books.
//!
//! ```text
//! rest    (axum handlers, router)
//!   ↓
//! domain  (BookService, validate_model)
//!   ↓
//! db      (DbConnection, SQLite via sqlx)
//! ```
//!
//! `error` holds the error taxonomy shared by every layer above `db`, and
//! `config` the command line options read by the binary.

pub mod config;
pub mod db;
pub mod domain;
pub mod error;
pub mod rest;

use anyhow::{Context, Result};
use axum::{
    http::{HeaderValue, Method},
    Router,
};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::config::Config;
use crate::db::DbConnection;
use crate::domain::BookService;

pub use rest::AppState;

/// Initialize the backend with all required services
pub async fn initialize_backend(config: &Config) -> Result<AppState> {
    info!("Setting up database at {}", config.database_url);
    let db_conn = DbConnection::new(&config.database_url)
        .await
        .with_context(|| format!("Failed to open database {}", config.database_url))?;

    info!("Setting up domain model");
    let book_service = BookService::new(db_conn);

    Ok(AppState::new(book_service))
}

/// Create the Axum router with all routes configured
pub fn create_router(app_state: AppState, config: &Config) -> Result<Router> {
    let allow_origin = match &config.cors_origin {
        Some(origin) => AllowOrigin::exact(
            origin
                .parse::<HeaderValue>()
                .with_context(|| format!("Invalid CORS origin {:?}", origin))?,
        ),
        None => AllowOrigin::from(Any),
    };

    // CORS setup to allow frontend to make requests
    let cors = CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers(Any);

    Ok(rest::router()
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(app_state))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use clap::Parser;
    use tower::ServiceExt;

    fn test_config(extra: &[&str]) -> Config {
        let mut args = vec!["books-backend"];
        args.extend_from_slice(extra);
        Config::try_parse_from(args).unwrap()
    }

    async fn test_state() -> AppState {
        let db = DbConnection::init_test().await.expect("Failed to create test database");
        AppState::new(BookService::new(db))
    }

    #[tokio::test]
    async fn test_create_router_rejects_bad_cors_origin() {
        let config = test_config(&["--cors-origin", "bad\norigin"]);
        assert!(create_router(test_state().await, &config).is_err());
    }

    #[tokio::test]
    async fn test_cors_exact_origin() {
        let config = test_config(&["--cors-origin", "http://localhost:8080"]);
        let app = create_router(test_state().await, &config).unwrap();

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/books")
                    .header(header::ORIGIN, "http://localhost:8080")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
            "http://localhost:8080"
        );
    }

    #[tokio::test]
    async fn test_unknown_route_is_not_found() {
        let app = create_router(test_state().await, &test_config(&[])).unwrap();

        let response = app
            .oneshot(Request::builder().uri("/authors").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_initialize_backend_creates_database_file() {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
        let db_path = temp_dir.path().join("books.db");
        let url = format!("sqlite:{}", db_path.display());

        let config = test_config(&["--database-url", &url]);
        let state = initialize_backend(&config).await.expect("Failed to initialize backend");

        let books = state
            .book_service
            .list_books(shared::BookListQuery::default())
            .await
            .unwrap();
        assert!(books.is_empty());
        assert!(db_path.exists());
    }
}
