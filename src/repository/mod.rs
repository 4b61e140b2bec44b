//! Repository layer for database operations
//!
//! Each table group sits behind a trait so services can run against mocks;
//! the Postgres implementations live in the submodules.

pub mod books;
pub mod health;
pub mod loans;
pub mod users;

use std::sync::Arc;

use async_trait::async_trait;
use sqlx::{Pool, Postgres};

use crate::{
    error::AppResult,
    models::{
        book::{Book, BookFields, BookPopularity, PageRequest},
        loan::{Loan, NewLoan},
        user::{NewUser, User},
    },
};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BooksRepository: Send + Sync {
    /// All books ordered by id, or one page of them
    async fn list(&self, page: Option<PageRequest>) -> AppResult<Vec<Book>>;

    async fn count(&self) -> AppResult<i64>;

    /// Fails with `NotFound` for unknown ids
    async fn get_by_id(&self, id: i32) -> AppResult<Book>;

    async fn create(&self, book: &BookFields) -> AppResult<Book>;

    /// Full replacement; fails with `NotFound` for unknown ids
    async fn update(&self, id: i32, book: &BookFields) -> AppResult<Book>;

    /// Fails with `NotFound` for unknown ids
    async fn delete(&self, id: i32) -> AppResult<()>;

    /// Case-insensitive substring match on title
    async fn search_by_title(&self, title: &str) -> AppResult<Vec<Book>>;

    /// Borrowed books ranked by number of loans, most borrowed first.
    /// `None` returns the whole ranking.
    async fn popularity(&self, limit: Option<i64>) -> AppResult<Vec<BookPopularity>>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UsersRepository: Send + Sync {
    /// Fails with `NotFound` for unknown ids
    async fn get_by_id(&self, id: i32) -> AppResult<User>;

    async fn get_by_email(&self, email: &str) -> AppResult<Option<User>>;

    async fn list(&self) -> AppResult<Vec<User>>;

    async fn count(&self) -> AppResult<i64>;

    /// Fails with `Conflict` when the email is taken
    async fn create(&self, user: &NewUser) -> AppResult<User>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LoansRepository: Send + Sync {
    /// Inserts the loan and its book links in one transaction.
    /// Fails with `NotFound` if any book does not exist.
    async fn create(&self, loan: &NewLoan) -> AppResult<Loan>;

    /// Fails with `NotFound` for unknown ids
    async fn get_by_id(&self, id: i32) -> AppResult<Loan>;

    /// All loans, or only those of `user_id`
    async fn list(&self, user_id: Option<i32>) -> AppResult<Vec<Loan>>;

    /// Link a book to an existing loan; linking twice is a no-op
    async fn attach_book(&self, loan_id: i32, book_id: i32) -> AppResult<()>;

    /// Fails with `NotFound` for unknown ids
    async fn delete(&self, id: i32) -> AppResult<()>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait HealthRepository: Send + Sync {
    /// Round trip to the database
    async fn ping(&self) -> AppResult<()>;
}

/// Main repository struct holding the table repositories
#[derive(Clone)]
pub struct Repository {
    pub books: Arc<dyn BooksRepository>,
    pub users: Arc<dyn UsersRepository>,
    pub loans: Arc<dyn LoansRepository>,
    pub health: Arc<dyn HealthRepository>,
}

impl Repository {
    /// Create a new repository with the given database pool
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self {
            books: Arc::new(books::PgBooksRepository::new(pool.clone())),
            users: Arc::new(users::PgUsersRepository::new(pool.clone())),
            loans: Arc::new(loans::PgLoansRepository::new(pool.clone())),
            health: Arc::new(health::PgHealthRepository::new(pool)),
        }
    }

    /// Assemble a repository from individual implementations
    pub fn from_parts(
        books: Arc<dyn BooksRepository>,
        users: Arc<dyn UsersRepository>,
        loans: Arc<dyn LoansRepository>,
        health: Arc<dyn HealthRepository>,
    ) -> Self {
        Self {
            books,
            users,
            loans,
            health,
        }
    }
}

/// Map unique-constraint violations to `Conflict`, everything else to `Database`
pub(crate) fn map_unique_violation(err: sqlx::Error, message: &str) -> crate::error::AppError {
    match err {
        sqlx::Error::Database(ref db) if db.is_unique_violation() => {
            crate::error::AppError::Conflict(message.to_string())
        }
        other => crate::error::AppError::Database(other),
    }
}
