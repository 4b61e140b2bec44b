//! Loan model and related types

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

use super::book::Book;
use crate::error::{AppError, AppResult, FieldErrors};

/// Loan row as stored in the `loans` table
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct LoanRow {
    pub id: i32,
    pub user_id: i32,
    pub loan_date: NaiveDate,
    pub deadline: NaiveDate,
}

/// Loan with the books it covers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Loan {
    pub id: i32,
    pub user_id: i32,
    pub loan_date: NaiveDate,
    pub deadline: NaiveDate,
    pub books: Vec<Book>,
}

impl Loan {
    pub fn from_row(row: LoanRow, books: Vec<Book>) -> Self {
        Self {
            id: row.id,
            user_id: row.user_id,
            loan_date: row.loan_date,
            deadline: row.deadline,
            books,
        }
    }
}

/// Create loan request
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateLoan {
    /// Borrower
    pub user_id: i32,
    /// Defaults to today (UTC)
    pub loan_date: Option<NaiveDate>,
    /// Return deadline, not before `loan_date`
    pub deadline: NaiveDate,
    /// Books covered by the loan
    #[serde(default)]
    pub book_ids: Vec<i32>,
}

/// Validated loan, ready to be written
#[derive(Debug, Clone, PartialEq)]
pub struct NewLoan {
    pub user_id: i32,
    pub loan_date: NaiveDate,
    pub deadline: NaiveDate,
    /// Sorted, without duplicates
    pub book_ids: Vec<i32>,
}

impl CreateLoan {
    pub fn into_new_loan(self) -> AppResult<NewLoan> {
        let loan_date = self.loan_date.unwrap_or_else(|| Utc::now().date_naive());

        let mut errors = FieldErrors::new();
        if self.book_ids.is_empty() {
            errors.insert("book_ids".to_string(), "At least one book is required".to_string());
        }
        if self.deadline < loan_date {
            errors.insert(
                "deadline".to_string(),
                "Deadline must not be before the loan date".to_string(),
            );
        }
        if !errors.is_empty() {
            return Err(AppError::InvalidFields(errors));
        }

        let mut book_ids = self.book_ids;
        book_ids.sort_unstable();
        book_ids.dedup();

        Ok(NewLoan {
            user_id: self.user_id,
            loan_date,
            deadline: self.deadline,
            book_ids,
        })
    }
}
