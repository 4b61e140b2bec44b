//! Data models for Libris

pub mod book;
pub mod loan;
pub mod user;

// Re-export commonly used types
pub use book::{Book, BookFields, BookPayload, BookPopularity};
pub use loan::{Loan, NewLoan};
pub use user::{Role, User, UserClaims};
