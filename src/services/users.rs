//! User management service

use crate::{
    error::AppResult,
    models::user::{CreateUser, UpdateUser, User},
    repository::Repository,
};

#[derive(Clone)]
pub struct UsersService {
    repository: Repository,
}

impl UsersService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn list(&self) -> AppResult<Vec<User>> {
        self.repository.users.list().await
    }

    pub async fn get_by_id(&self, id: i32) -> AppResult<User> {
        self.repository.users.get_by_id(id).await
    }

    /// Create a user. Duplicate email or auth_id fails with `Conflict`.
    pub async fn create(&self, user: CreateUser) -> AppResult<User> {
        self.repository.users.create(&user).await
    }

    pub async fn update(&self, id: i32, user: UpdateUser) -> AppResult<User> {
        self.repository.users.update(id, &user).await
    }

    /// Soft delete: the account is marked inactive and stays in the store
    pub async fn soft_delete(&self, id: i32) -> AppResult<User> {
        self.repository.users.soft_delete(id).await
    }
}
