//! Loan management service

use crate::{
    error::AppResult,
    models::loan::{CreateLoan, Loan},
    repository::Repository,
};

#[derive(Clone)]
pub struct LoansService {
    repository: Repository,
}

impl LoansService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Create a new loan covering one or more books
    pub async fn create_loan(&self, request: CreateLoan) -> AppResult<Loan> {
        let loan = request.into_new_loan()?;
        // Verify user exists
        self.repository.users.get_by_id(loan.user_id).await?;
        self.repository.loans.create(&loan).await
    }

    pub async fn get_loan(&self, id: i32) -> AppResult<Loan> {
        self.repository.loans.get_by_id(id).await
    }

    pub async fn list_loans(&self) -> AppResult<Vec<Loan>> {
        self.repository.loans.list(None).await
    }

    /// Get loans for a user
    pub async fn get_user_loans(&self, user_id: i32) -> AppResult<Vec<Loan>> {
        self.repository.users.get_by_id(user_id).await?;
        self.repository.loans.list(Some(user_id)).await
    }

    /// Add a book to an existing loan
    pub async fn attach_book(&self, loan_id: i32, book_id: i32) -> AppResult<Loan> {
        self.repository.loans.get_by_id(loan_id).await?;
        self.repository.books.get_by_id(book_id).await?;
        self.repository.loans.attach_book(loan_id, book_id).await?;
        self.repository.loans.get_by_id(loan_id).await
    }

    pub async fn delete_loan(&self, id: i32) -> AppResult<()> {
        self.repository.loans.delete(id).await?;
        tracing::info!(loan_id = id, "Loan deleted");
        Ok(())
    }
}
