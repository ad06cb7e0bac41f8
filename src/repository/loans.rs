//! Loans repository for database operations
//!
//! All operations that touch both a loan and its book run inside a single
//! transaction: a reader never observes a loan without the paired book
//! status flip.

use chrono::{NaiveDate, Utc};
use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::{
        enums::{LoanStatus, UserStatus},
        loan::Loan,
    },
};

#[derive(Clone)]
pub struct LoansRepository {
    pool: Pool<Postgres>,
}

impl LoansRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// List all loans
    pub async fn list(&self) -> AppResult<Vec<Loan>> {
        let loans = sqlx::query_as::<_, Loan>("SELECT * FROM loans ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        Ok(loans)
    }

    /// List active loans
    pub async fn list_active(&self) -> AppResult<Vec<Loan>> {
        let loans =
            sqlx::query_as::<_, Loan>("SELECT * FROM loans WHERE status = 'active' ORDER BY id")
                .fetch_all(&self.pool)
                .await?;
        Ok(loans)
    }

    /// List loans for a user
    pub async fn list_for_user(&self, user_id: i32) -> AppResult<Vec<Loan>> {
        let loans =
            sqlx::query_as::<_, Loan>("SELECT * FROM loans WHERE user_id = $1 ORDER BY id")
                .bind(user_id)
                .fetch_all(&self.pool)
                .await?;
        Ok(loans)
    }

    /// Get loan by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<Loan> {
        sqlx::query_as::<_, Loan>("SELECT * FROM loans WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Loan with id {} not found", id)))
    }

    /// Create a loan and flip the book to `loaned` in one transaction.
    ///
    /// The book update is a conditional write on `status = 'available'`, so
    /// two concurrent creates for the same book yield exactly one success.
    pub async fn create(
        &self,
        book_id: i32,
        user_id: i32,
        loan_date: Option<NaiveDate>,
    ) -> AppResult<Loan> {
        let mut tx = self.pool.begin().await?;

        let book_exists: Option<i32> =
            sqlx::query_scalar("SELECT id FROM books WHERE id = $1 FOR UPDATE")
                .bind(book_id)
                .fetch_optional(&mut *tx)
                .await?;
        if book_exists.is_none() {
            return Err(AppError::NotFound(format!(
                "Book with id {} not found",
                book_id
            )));
        }

        let user_status: Option<UserStatus> =
            sqlx::query_scalar("SELECT status FROM users WHERE id = $1")
                .bind(user_id)
                .fetch_optional(&mut *tx)
                .await?;
        match user_status {
            None => {
                return Err(AppError::NotFound(format!(
                    "User with id {} not found",
                    user_id
                )))
            }
            Some(UserStatus::Active) => {}
            Some(_) => {
                return Err(AppError::InvalidState(format!(
                    "User with id {} is not active",
                    user_id
                )))
            }
        }

        let flipped = sqlx::query(
            "UPDATE books SET status = 'loaned' WHERE id = $1 AND status = 'available'",
        )
        .bind(book_id)
        .execute(&mut *tx)
        .await?
        .rows_affected();
        if flipped == 0 {
            return Err(AppError::Conflict(format!(
                "Book with id {} is not available",
                book_id
            )));
        }

        let loan = sqlx::query_as::<_, Loan>(
            r#"
            INSERT INTO loans (book_id, user_id, loan_date, status)
            VALUES ($1, $2, $3, 'active')
            RETURNING *
            "#,
        )
        .bind(book_id)
        .bind(user_id)
        .bind(loan_date.unwrap_or_else(|| Utc::now().date_naive()))
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(loan)
    }

    /// Mark a loan returned and flip the book back to `available`, in one
    /// transaction. Returning an already-returned loan fails without any
    /// state change.
    pub async fn return_loan(&self, id: i32) -> AppResult<Loan> {
        let mut tx = self.pool.begin().await?;

        let loan = sqlx::query_as::<_, Loan>("SELECT * FROM loans WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Loan with id {} not found", id)))?;

        if loan.status != LoanStatus::Active {
            return Err(AppError::InvalidState(format!(
                "Loan with id {} is already returned",
                id
            )));
        }

        let loan = sqlx::query_as::<_, Loan>(
            r#"
            UPDATE loans SET status = 'returned', return_date = $2
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(Utc::now().date_naive())
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query("UPDATE books SET status = 'available' WHERE id = $1")
            .bind(loan.book_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(loan)
    }

    /// Hard-delete a loan. Deleting an active loan resets the book to
    /// `available` as a compensating action.
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let mut tx = self.pool.begin().await?;

        let loan = sqlx::query_as::<_, Loan>("SELECT * FROM loans WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Loan with id {} not found", id)))?;

        if loan.status == LoanStatus::Active {
            sqlx::query("UPDATE books SET status = 'available' WHERE id = $1")
                .bind(loan.book_id)
                .execute(&mut *tx)
                .await?;
        }

        sqlx::query("DELETE FROM loans WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }

    /// Count active loans
    pub async fn count_active(&self) -> AppResult<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM loans WHERE status = 'active'")
                .fetch_one(&self.pool)
                .await?;
        Ok(count)
    }
}
