//! Book model and related types

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use super::enums::BookStatus;

/// Book model from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Book {
    pub id: i32,
    pub title: String,
    pub author: String,
    pub publication_year: Option<i32>,
    pub isbn: String,
    pub status: BookStatus,
    pub category_id: Option<i32>,
}

/// Create book request.
///
/// New books always start as `available`; status is owned by the loan
/// lifecycle and the soft-delete operation.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateBook {
    #[validate(length(min = 1, max = 500))]
    pub title: String,
    #[validate(length(min = 1, max = 200))]
    pub author: String,
    pub publication_year: Option<i32>,
    #[validate(length(min = 1, max = 20))]
    pub isbn: String,
    pub category_id: Option<i32>,
}

/// Update book request. Status is deliberately not updatable here.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateBook {
    #[validate(length(min = 1, max = 500))]
    pub title: String,
    #[validate(length(min = 1, max = 200))]
    pub author: String,
    pub publication_year: Option<i32>,
    #[validate(length(min = 1, max = 20))]
    pub isbn: String,
    pub category_id: Option<i32>,
}

/// Book search query parameters
#[derive(Debug, Deserialize, IntoParams)]
pub struct BookSearchQuery {
    /// Case-insensitive substring matched against title, author and
    /// category name
    pub search: String,
}
