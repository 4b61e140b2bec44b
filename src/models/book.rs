//! Book model and related types

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use crate::error::AppResult;

/// Default page size for paginated listings
pub const DEFAULT_PER_PAGE: i64 = 20;
/// Upper bound for `per_page`
pub const MAX_PER_PAGE: i64 = 100;

/// Book as stored in the catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Book {
    pub id: i32,
    pub title: String,
    pub genre: Option<String>,
    pub age_category: Option<String>,
    pub publish_date: Option<NaiveDate>,
    pub author: Option<String>,
}

/// Create/replace book request.
///
/// Every field is optional at the JSON level so that a missing title is
/// reported as a field error instead of a deserialization failure.
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct BookPayload {
    #[validate(
        required(message = "Title is required"),
        length(min = 1, max = 255, message = "Title must be 1 to 255 characters long")
    )]
    pub title: Option<String>,
    #[validate(length(max = 255, message = "Genre must be at most 255 characters long"))]
    pub genre: Option<String>,
    #[validate(length(max = 255, message = "Age category must be at most 255 characters long"))]
    pub age_category: Option<String>,
    pub publish_date: Option<NaiveDate>,
    #[validate(length(max = 255, message = "Author must be at most 255 characters long"))]
    pub author: Option<String>,
}

/// Validated book fields, ready to be written
#[derive(Debug, Clone, PartialEq)]
pub struct BookFields {
    pub title: String,
    pub genre: Option<String>,
    pub age_category: Option<String>,
    pub publish_date: Option<NaiveDate>,
    pub author: Option<String>,
}

impl BookPayload {
    /// Validate the payload and turn it into writable fields
    pub fn into_fields(mut self) -> AppResult<BookFields> {
        self.title = self.title.map(|t| t.trim().to_string());
        self.validate()?;

        Ok(BookFields {
            title: self.title.unwrap_or_default(),
            genre: self.genre,
            age_category: self.age_category,
            publish_date: self.publish_date,
            author: self.author,
        })
    }
}

/// Page selection for book listings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: i64,
    pub per_page: i64,
}

impl PageRequest {
    /// Build a page request, clamping out-of-range values
    pub fn new(page: Option<i64>, per_page: Option<i64>) -> Self {
        Self {
            page: page.unwrap_or(1).max(1),
            per_page: per_page.unwrap_or(DEFAULT_PER_PAGE).clamp(1, MAX_PER_PAGE),
        }
    }

    /// Rows to skip; saturates so huge page numbers yield an empty page
    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.per_page)
    }
}

/// Query parameters of `GET /books`
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct BookListQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

impl BookListQuery {
    /// Pagination applies only when the caller asked for it
    pub fn page_request(&self) -> Option<PageRequest> {
        if self.page.is_none() && self.per_page.is_none() {
            None
        } else {
            Some(PageRequest::new(self.page, self.per_page))
        }
    }
}

/// One page of books
#[derive(Debug, Serialize, ToSchema)]
pub struct BookPage {
    /// Books on this page
    pub items: Vec<Book>,
    /// Total number of books
    pub total: i64,
    /// Current page number
    pub page: i64,
    /// Books per page
    pub per_page: i64,
}

/// Result of `GET /books`: a plain list, or a page when pagination was requested
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum BookListing {
    All(Vec<Book>),
    Page(BookPage),
}

/// Query parameters of `GET /books/search`
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct BookSearchQuery {
    pub title: Option<String>,
}

/// Query parameters of `GET /books/popularity`
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct PopularityQuery {
    pub limit: Option<i64>,
}

impl PopularityQuery {
    /// `None` ranks every borrowed book
    pub fn limit(&self) -> Option<i64> {
        self.limit.map(|limit| limit.max(1))
    }
}

/// A book with the number of loans it appears in
#[derive(Debug, Clone, PartialEq, Serialize, FromRow, ToSchema)]
pub struct BookPopularity {
    #[sqlx(flatten)]
    pub book: Book,
    pub loan_count: i64,
}
