//! Book CRUD endpoints.
//!
//! All routes here sit behind `require_bearer`; presence of a valid token is
//! the only authorization check.

use crate::{
    api::error::{ApiError, ErrorBody},
    store::{Book, BookStore, NewBook},
};
use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Extension, Path,
    },
    Json,
};
use std::sync::Arc;
use tracing::{debug, instrument};

#[utoipa::path(
    get,
    path = "/books/",
    responses(
        (status = 200, description = "All books, ordered by id.", body = [Book]),
        (status = 403, description = "Missing or invalid bearer token.", body = ErrorBody),
    ),
    security(("bearer" = [])),
    tag = "books"
)]
#[instrument(skip(books))]
pub async fn list_books(books: Extension<Arc<dyn BookStore>>) -> Result<Json<Vec<Book>>, ApiError> {
    let list = books.list().await?;

    debug!("Listed {} books", list.len());

    Ok(Json(list))
}

#[utoipa::path(
    post,
    path = "/books/",
    request_body = NewBook,
    responses(
        (status = 200, description = "Book created.", body = Book),
        (status = 403, description = "Missing or invalid bearer token.", body = ErrorBody),
        (status = 422, description = "Invalid request body.", body = ErrorBody),
    ),
    security(("bearer" = [])),
    tag = "books"
)]
#[instrument(skip(books, payload))]
pub async fn create_book(
    books: Extension<Arc<dyn BookStore>>,
    payload: Result<Json<NewBook>, JsonRejection>,
) -> Result<Json<Book>, ApiError> {
    let Json(book) = payload?;

    let created = books.create(&book).await?;

    debug!("Created book {}", created.id);

    Ok(Json(created))
}

#[utoipa::path(
    get,
    path = "/books/{id}",
    params(
        ("id" = i64, Path, description = "Book id")
    ),
    responses(
        (status = 200, description = "Book detail.", body = Book),
        (status = 403, description = "Missing or invalid bearer token.", body = ErrorBody),
        (status = 404, description = "Book not found.", body = ErrorBody),
    ),
    security(("bearer" = [])),
    tag = "books"
)]
#[instrument(skip(books, id))]
pub async fn get_book(
    books: Extension<Arc<dyn BookStore>>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<Book>, ApiError> {
    let Path(id) = id?;

    books.get(id).await?.map(Json).ok_or(ApiError::NotFound)
}

#[utoipa::path(
    put,
    path = "/books/{id}",
    params(
        ("id" = i64, Path, description = "Book id")
    ),
    request_body = NewBook,
    responses(
        (status = 200, description = "Book updated.", body = Book),
        (status = 403, description = "Missing or invalid bearer token.", body = ErrorBody),
        (status = 404, description = "Book not found.", body = ErrorBody),
        (status = 422, description = "Invalid request body.", body = ErrorBody),
    ),
    security(("bearer" = [])),
    tag = "books"
)]
#[instrument(skip(books, id, payload))]
pub async fn update_book(
    books: Extension<Arc<dyn BookStore>>,
    id: Result<Path<i64>, PathRejection>,
    payload: Result<Json<NewBook>, JsonRejection>,
) -> Result<Json<Book>, ApiError> {
    let Path(id) = id?;
    let Json(book) = payload?;

    books
        .update(id, &book)
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound)
}

#[utoipa::path(
    delete,
    path = "/books/{id}",
    params(
        ("id" = i64, Path, description = "Book id")
    ),
    responses(
        (status = 200, description = "Book deleted; the removed record is returned.", body = Book),
        (status = 403, description = "Missing or invalid bearer token.", body = ErrorBody),
        (status = 404, description = "Book not found.", body = ErrorBody),
    ),
    security(("bearer" = [])),
    tag = "books"
)]
#[instrument(skip(books, id))]
pub async fn delete_book(
    books: Extension<Arc<dyn BookStore>>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<Book>, ApiError> {
    let Path(id) = id?;

    let deleted = books.delete(id).await?.ok_or(ApiError::NotFound)?;

    debug!("Deleted book {}", deleted.id);

    Ok(Json(deleted))
}
