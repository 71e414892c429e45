//! # REST API for Book Management
//!
//! Endpoints for creating, listing, retrieving, updating, and deleting books.
//! Handlers only translate HTTP to [`BookService`] calls; every failure is an
//! [`ApiError`](crate::error::ApiError) and is turned into a status plus `{"message"}` body there.

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use shared::{BookListQuery, BookRequest};
use tracing::info;

use crate::domain::BookService;
use crate::error::ApiResult;

/// Application state containing the BookService
#[derive(Clone)]
pub struct AppState {
    pub book_service: BookService,
}

impl AppState {
    pub fn new(book_service: BookService) -> Self {
        Self { book_service }
    }
}

/// Create a router for book related APIs
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/books", get(list_books).post(create_book))
        .route(
            "/books/:book_id",
            get(get_book).put(update_book).delete(delete_book),
        )
}

/// Axum handler function for POST /books
pub async fn create_book(
    State(state): State<AppState>,
    body: Result<Json<BookRequest>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let Json(request) = body?;
    info!("POST /books - request: {:?}", request);

    let book = state.book_service.create_book(request).await?;
    Ok((StatusCode::CREATED, Json(book)))
}

/// Axum handler function for GET /books
///
/// The query string is read as raw pairs so a repeated parameter keeps its
/// first value instead of failing the request.
pub async fn list_books(
    State(state): State<AppState>,
    pairs: Result<Query<Vec<(String, String)>>, QueryRejection>,
) -> ApiResult<impl IntoResponse> {
    let Query(pairs) = pairs?;
    let query = BookListQuery::from_pairs(pairs);
    info!("GET /books - query: {:?}", query);

    let books = state.book_service.list_books(query).await?;
    Ok(Json(books))
}

/// Axum handler function for GET /books/:book_id
pub async fn get_book(
    State(state): State<AppState>,
    book_id: Result<Path<String>, PathRejection>,
) -> ApiResult<impl IntoResponse> {
    let Path(book_id) = book_id?;
    info!("GET /books/{}", book_id);

    let book = state.book_service.get_book(&book_id).await?;
    Ok(Json(book))
}

/// Axum handler function for PUT /books/:book_id
pub async fn update_book(
    State(state): State<AppState>,
    book_id: Result<Path<String>, PathRejection>,
    body: Result<Json<BookRequest>, JsonRejection>,
) -> ApiResult<StatusCode> {
    let Path(book_id) = book_id?;
    let Json(request) = body?;
    info!("PUT /books/{} - request: {:?}", book_id, request);

    state.book_service.update_book(&book_id, request).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Axum handler function for DELETE /books/:book_id
pub async fn delete_book(
    State(state): State<AppState>,
    book_id: Result<Path<String>, PathRejection>,
) -> ApiResult<StatusCode> {
    let Path(book_id) = book_id?;
    info!("DELETE /books/{}", book_id);

    state.book_service.delete_book(&book_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
