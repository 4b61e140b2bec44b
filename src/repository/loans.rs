//! Loans repository for database operations

use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::{FromRow, Pool, Postgres};

use super::LoansRepository;
use crate::{
    error::{AppError, AppResult},
    models::{
        book::Book,
        loan::{Loan, LoanRow, NewLoan},
    },
};

/// A book together with the loan it is linked to
#[derive(FromRow)]
struct LoanBookRow {
    loan_id: i32,
    #[sqlx(flatten)]
    book: Book,
}

#[derive(Clone)]
pub struct PgLoansRepository {
    pool: Pool<Postgres>,
}

impl PgLoansRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Load the books of several loans at once, keyed by loan id
    async fn books_for(&self, loan_ids: &[i32]) -> AppResult<HashMap<i32, Vec<Book>>> {
        let rows = sqlx::query_as::<_, LoanBookRow>(
            r#"
            SELECT lb.loan_id, b.id, b.title, b.genre, b.age_category, b.publish_date, b.author
            FROM loan_books lb
            JOIN books b ON b.id = lb.book_id
            WHERE lb.loan_id = ANY($1)
            ORDER BY lb.loan_id, b.id
            "#,
        )
        .bind(loan_ids)
        .fetch_all(&self.pool)
        .await?;

        let mut books: HashMap<i32, Vec<Book>> = HashMap::new();
        for row in rows {
            books.entry(row.loan_id).or_default().push(row.book);
        }
        Ok(books)
    }

    async fn with_books(&self, rows: Vec<LoanRow>) -> AppResult<Vec<Loan>> {
        let ids: Vec<i32> = rows.iter().map(|r| r.id).collect();
        let mut books = self.books_for(&ids).await?;

        Ok(rows
            .into_iter()
            .map(|row| {
                let loan_books = books.remove(&row.id).unwrap_or_default();
                Loan::from_row(row, loan_books)
            })
            .collect())
    }
}

#[async_trait]
impl LoansRepository for PgLoansRepository {
    async fn create(&self, loan: &NewLoan) -> AppResult<Loan> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, LoanRow>(
            r#"
            INSERT INTO loans (user_id, loan_date, deadline)
            VALUES ($1, $2, $3)
            RETURNING id, user_id, loan_date, deadline
            "#,
        )
        .bind(loan.user_id)
        .bind(loan.loan_date)
        .bind(loan.deadline)
        .fetch_one(&mut *tx)
        .await?;

        for book_id in &loan.book_ids {
            let linked = sqlx::query(
                "INSERT INTO loan_books (loan_id, book_id) SELECT $1, id FROM books WHERE id = $2",
            )
            .bind(row.id)
            .bind(book_id)
            .execute(&mut *tx)
            .await?;

            // Dropping the transaction rolls the loan back
            if linked.rows_affected() == 0 {
                return Err(AppError::NotFound(format!("Book with id {} not found", book_id)));
            }
        }

        tx.commit().await?;
        tracing::info!(loan_id = row.id, user_id = row.user_id, books = loan.book_ids.len(), "loan created");

        self.get_by_id(row.id).await
    }

    async fn get_by_id(&self, id: i32) -> AppResult<Loan> {
        let row = sqlx::query_as::<_, LoanRow>(
            "SELECT id, user_id, loan_date, deadline FROM loans WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Loan with id {} not found", id)))?;

        let mut loans = self.with_books(vec![row]).await?;
        loans
            .pop()
            .ok_or_else(|| AppError::Internal("Loan vanished while loading books".to_string()))
    }

    async fn list(&self, user_id: Option<i32>) -> AppResult<Vec<Loan>> {
        let rows = sqlx::query_as::<_, LoanRow>(
            r#"
            SELECT id, user_id, loan_date, deadline FROM loans
            WHERE $1::INT IS NULL OR user_id = $1
            ORDER BY loan_date DESC, id DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        self.with_books(rows).await
    }

    async fn attach_book(&self, loan_id: i32, book_id: i32) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO loan_books (loan_id, book_id) VALUES ($1, $2)
            ON CONFLICT (loan_id, book_id) DO NOTHING
            "#,
        )
        .bind(loan_id)
        .bind(book_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn delete(&self, id: i32) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM loans WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Loan with id {} not found", id)));
        }
        Ok(())
    }
}
