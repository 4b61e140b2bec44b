//! Book (catalog) endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::AppResult,
    models::book::{
        Book, BookListQuery, BookListing, BookPayload, BookPopularity, BookSearchQuery,
        PopularityQuery,
    },
};

use super::{AuthenticatedUser, JsonBody};

/// List books, optionally paginated
///
/// Without `page`/`per_page` the response is a plain array; with either of
/// them it is a `BookPage` object.
#[utoipa::path(
    get,
    path = "/books",
    tag = "books",
    params(
        ("page" = Option<i64>, Query, description = "Page number (default: 1)"),
        ("per_page" = Option<i64>, Query, description = "Books per page (default: 20, max: 100)")
    ),
    responses(
        (status = 200, description = "All books, or one page of books", body = Vec<Book>)
    )
)]
pub async fn list_books(
    State(state): State<crate::AppState>,
    Query(query): Query<BookListQuery>,
) -> AppResult<Json<BookListing>> {
    let listing = state.services.catalog.list_books(&query).await?;
    Ok(Json(listing))
}

/// Get book details by ID
#[utoipa::path(
    get,
    path = "/books/{id}",
    tag = "books",
    params(
        ("id" = i32, Path, description = "Book ID")
    ),
    responses(
        (status = 200, description = "Book details", body = Book),
        (status = 404, description = "Book not found")
    )
)]
pub async fn get_book(
    State(state): State<crate::AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<Book>> {
    let book = state.services.catalog.get_book(id).await?;
    Ok(Json(book))
}

/// Create a new book
#[utoipa::path(
    post,
    path = "/books",
    tag = "books",
    security(("bearer_auth" = [])),
    request_body = BookPayload,
    responses(
        (status = 201, description = "Book created", body = Book),
        (status = 400, description = "Invalid fields, keyed by field name"),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Administrator privileges required")
    )
)]
pub async fn create_book(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    JsonBody(payload): JsonBody<BookPayload>,
) -> AppResult<(StatusCode, Json<Book>)> {
    claims.require_admin()?;

    let created = state.services.catalog.create_book(payload).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Replace an existing book
#[utoipa::path(
    put,
    path = "/books/{id}",
    tag = "books",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Book ID")
    ),
    request_body = BookPayload,
    responses(
        (status = 200, description = "Book updated", body = Book),
        (status = 400, description = "Invalid fields, keyed by field name"),
        (status = 404, description = "Book not found")
    )
)]
pub async fn update_book(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
    JsonBody(payload): JsonBody<BookPayload>,
) -> AppResult<Json<Book>> {
    claims.require_admin()?;

    let updated = state.services.catalog.update_book(id, payload).await?;
    Ok(Json(updated))
}

/// Delete a book
#[utoipa::path(
    delete,
    path = "/books/{id}",
    tag = "books",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Book ID")
    ),
    responses(
        (status = 200, description = "Confirmation message", body = String),
        (status = 404, description = "Book not found")
    )
)]
pub async fn delete_book(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<String>> {
    claims.require_admin()?;

    state.services.catalog.delete_book(id).await?;
    Ok(Json(format!("Successfully deleted book id: {}", id)))
}

/// Search books by title
#[utoipa::path(
    get,
    path = "/books/search",
    tag = "books",
    params(
        ("title" = String, Query, description = "Text the title must contain (case-insensitive)")
    ),
    responses(
        (status = 200, description = "Matching books", body = Vec<Book>),
        (status = 400, description = "Missing title")
    )
)]
pub async fn search_books(
    State(state): State<crate::AppState>,
    Query(query): Query<BookSearchQuery>,
) -> AppResult<Json<Vec<Book>>> {
    let books = state.services.catalog.search_books(&query).await?;
    Ok(Json(books))
}

/// Most borrowed books
#[utoipa::path(
    get,
    path = "/books/popularity",
    tag = "books",
    params(
        ("limit" = Option<i64>, Query, description = "Number of entries (default: all borrowed books)")
    ),
    responses(
        (status = 200, description = "Borrowed books ordered by loan count, then id", body = Vec<BookPopularity>)
    )
)]
pub async fn popular_books(
    State(state): State<crate::AppState>,
    Query(query): Query<PopularityQuery>,
) -> AppResult<Json<Vec<BookPopularity>>> {
    let ranking = state.services.catalog.popular_books(query.limit()).await?;
    Ok(Json(ranking))
}
