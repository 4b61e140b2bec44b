//! Books repository for database operations

use async_trait::async_trait;
use sqlx::{Pool, Postgres};

use super::BooksRepository;
use crate::{
    error::{AppError, AppResult},
    models::book::{Book, BookFields, BookPopularity, PageRequest},
};

const BOOK_COLUMNS: &str = "id, title, genre, age_category, publish_date, author";

/// Escape LIKE wildcards so user input is matched literally
pub(crate) fn escape_like(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

#[derive(Clone)]
pub struct PgBooksRepository {
    pool: Pool<Postgres>,
}

impl PgBooksRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BooksRepository for PgBooksRepository {
    async fn list(&self, page: Option<PageRequest>) -> AppResult<Vec<Book>> {
        let books = match page {
            Some(page) => {
                sqlx::query_as::<_, Book>(&format!(
                    "SELECT {BOOK_COLUMNS} FROM books ORDER BY id LIMIT $1 OFFSET $2"
                ))
                .bind(page.per_page)
                .bind(page.offset())
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, Book>(&format!("SELECT {BOOK_COLUMNS} FROM books ORDER BY id"))
                    .fetch_all(&self.pool)
                    .await?
            }
        };

        Ok(books)
    }

    async fn count(&self) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM books")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn get_by_id(&self, id: i32) -> AppResult<Book> {
        sqlx::query_as::<_, Book>(&format!("SELECT {BOOK_COLUMNS} FROM books WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", id)))
    }

    async fn create(&self, book: &BookFields) -> AppResult<Book> {
        let created = sqlx::query_as::<_, Book>(&format!(
            r#"
            INSERT INTO books (title, genre, age_category, publish_date, author)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {BOOK_COLUMNS}
            "#
        ))
        .bind(&book.title)
        .bind(&book.genre)
        .bind(&book.age_category)
        .bind(book.publish_date)
        .bind(&book.author)
        .fetch_one(&self.pool)
        .await?;

        tracing::debug!(book_id = created.id, "book created");
        Ok(created)
    }

    async fn update(&self, id: i32, book: &BookFields) -> AppResult<Book> {
        sqlx::query_as::<_, Book>(&format!(
            r#"
            UPDATE books
            SET title = $2, genre = $3, age_category = $4, publish_date = $5, author = $6,
                updated_at = NOW()
            WHERE id = $1
            RETURNING {BOOK_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(&book.title)
        .bind(&book.genre)
        .bind(&book.age_category)
        .bind(book.publish_date)
        .bind(&book.author)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", id)))
    }

    async fn delete(&self, id: i32) -> AppResult<()> {
        // loan_books rows go with it (ON DELETE CASCADE)
        let result = sqlx::query("DELETE FROM books WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Book with id {} not found", id)));
        }
        Ok(())
    }

    async fn search_by_title(&self, title: &str) -> AppResult<Vec<Book>> {
        let books = sqlx::query_as::<_, Book>(&format!(
            r#"
            SELECT {BOOK_COLUMNS} FROM books
            WHERE title ILIKE '%' || $1 || '%' ESCAPE '\'
            ORDER BY id
            "#
        ))
        .bind(escape_like(title))
        .fetch_all(&self.pool)
        .await?;

        Ok(books)
    }

    async fn popularity(&self, limit: Option<i64>) -> AppResult<Vec<BookPopularity>> {
        let ranking = sqlx::query_as::<_, BookPopularity>(
            r#"
            SELECT b.id, b.title, b.genre, b.age_category, b.publish_date, b.author,
                   COUNT(lb.loan_id) AS loan_count
            FROM books b
            JOIN loan_books lb ON lb.book_id = b.id
            GROUP BY b.id
            ORDER BY loan_count DESC, b.id
            LIMIT $1
            "#,
        )
        // LIMIT NULL ranks everything
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(ranking)
    }
}
