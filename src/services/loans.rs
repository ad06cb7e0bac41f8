//! Loan lifecycle service
//!
//! State machine per loan: nonexistent -> active -> returned, with deletion
//! reachable from both live states. Book availability flips are paired with
//! every transition and applied in the same transaction by the repository.

use chrono::NaiveDate;

use crate::{error::AppResult, models::loan::Loan, repository::Repository};

#[derive(Clone)]
pub struct LoansService {
    repository: Repository,
}

impl LoansService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn list(&self) -> AppResult<Vec<Loan>> {
        self.repository.loans.list().await
    }

    pub async fn list_active(&self) -> AppResult<Vec<Loan>> {
        self.repository.loans.list_active().await
    }

    pub async fn list_for_user(&self, user_id: i32) -> AppResult<Vec<Loan>> {
        self.repository.loans.list_for_user(user_id).await
    }

    pub async fn get_by_id(&self, id: i32) -> AppResult<Loan> {
        self.repository.loans.get_by_id(id).await
    }

    /// Create a loan for the given user and flip the book to `loaned`.
    ///
    /// Fails with `NotFound` for a missing book or user, `InvalidState` for
    /// an inactive user, and `Conflict` when the book is not available.
    pub async fn create(
        &self,
        book_id: i32,
        user_id: i32,
        loan_date: Option<NaiveDate>,
    ) -> AppResult<Loan> {
        let loan = self.repository.loans.create(book_id, user_id, loan_date).await?;
        tracing::info!(loan_id = loan.id, book_id, user_id, "loan created");
        Ok(loan)
    }

    /// Return an active loan; the book becomes available again
    pub async fn return_loan(&self, id: i32) -> AppResult<Loan> {
        let loan = self.repository.loans.return_loan(id).await?;
        tracing::info!(loan_id = loan.id, book_id = loan.book_id, "loan returned");
        Ok(loan)
    }

    /// Hard-delete a loan, compensating the book status if it was active
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        self.repository.loans.delete(id).await?;
        tracing::info!(loan_id = id, "loan deleted");
        Ok(())
    }
}
