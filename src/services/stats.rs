//! Dashboard statistics service

use crate::{api::stats::DashboardStats, error::AppResult, repository::Repository};

#[derive(Clone)]
pub struct StatsService {
    repository: Repository,
}

impl StatsService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Four independent counters over current entity state. No side
    /// effects; every counter is 0 on an empty store.
    pub async fn dashboard(&self) -> AppResult<DashboardStats> {
        let pool = &self.repository.pool;

        let total_books: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM books")
            .fetch_one(pool)
            .await?;

        let total_users: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(pool)
            .await?;

        let active_loans = self.repository.loans.count_active().await?;

        let available_books: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM books WHERE status = 'available'")
                .fetch_one(pool)
                .await?;

        Ok(DashboardStats {
            total_books,
            total_users,
            active_loans,
            available_books,
        })
    }
}
