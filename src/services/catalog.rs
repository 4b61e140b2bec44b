//! Catalog management service

use crate::{
    error::{AppError, AppResult},
    models::book::{
        Book, BookListQuery, BookListing, BookPage, BookPayload, BookPopularity, BookSearchQuery,
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct CatalogService {
    repository: Repository,
}

impl CatalogService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// List all books, or one page of them when pagination was requested
    pub async fn list_books(&self, query: &BookListQuery) -> AppResult<BookListing> {
        match query.page_request() {
            None => Ok(BookListing::All(self.repository.books.list(None).await?)),
            Some(page) => {
                let items = self.repository.books.list(Some(page)).await?;
                let total = self.repository.books.count().await?;
                Ok(BookListing::Page(BookPage {
                    items,
                    total,
                    page: page.page,
                    per_page: page.per_page,
                }))
            }
        }
    }

    /// Get book by ID
    pub async fn get_book(&self, id: i32) -> AppResult<Book> {
        self.repository.books.get_by_id(id).await
    }

    /// Create a new book
    pub async fn create_book(&self, payload: BookPayload) -> AppResult<Book> {
        let fields = payload.into_fields()?;
        let book = self.repository.books.create(&fields).await?;
        tracing::info!(book_id = book.id, title = %book.title, "Book added to catalog");
        Ok(book)
    }

    /// Replace every field of an existing book
    pub async fn update_book(&self, id: i32, payload: BookPayload) -> AppResult<Book> {
        let fields = payload.into_fields()?;
        self.repository.books.update(id, &fields).await
    }

    /// Delete a book, along with its loan associations
    pub async fn delete_book(&self, id: i32) -> AppResult<()> {
        self.repository.books.delete(id).await?;
        tracing::info!(book_id = id, "Book removed from catalog");
        Ok(())
    }

    /// Search books whose title contains the given text
    pub async fn search_books(&self, query: &BookSearchQuery) -> AppResult<Vec<Book>> {
        let title = query.title.as_deref().map(str::trim).unwrap_or_default();
        if title.is_empty() {
            return Err(AppError::invalid_field("title", "A title to search for is required"));
        }
        self.repository.books.search_by_title(title).await
    }

    /// Most borrowed books first
    pub async fn popular_books(&self, limit: Option<i64>) -> AppResult<Vec<BookPopularity>> {
        self.repository.books.popularity(limit).await
    }
}
