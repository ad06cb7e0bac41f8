//! Book catalog service

use crate::{
    error::AppResult,
    models::book::{Book, CreateBook, UpdateBook},
    repository::Repository,
};

#[derive(Clone)]
pub struct BooksService {
    repository: Repository,
}

impl BooksService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn list(&self) -> AppResult<Vec<Book>> {
        self.repository.books.list().await
    }

    pub async fn list_available(&self) -> AppResult<Vec<Book>> {
        self.repository.books.list_available().await
    }

    pub async fn search(&self, term: &str) -> AppResult<Vec<Book>> {
        self.repository.books.search(term).await
    }

    pub async fn get_by_id(&self, id: i32) -> AppResult<Book> {
        self.repository.books.get_by_id(id).await
    }

    pub async fn create(&self, book: CreateBook) -> AppResult<Book> {
        // Reject unknown categories up front for a clear error
        if let Some(category_id) = book.category_id {
            self.repository.categories.get_by_id(category_id).await?;
        }
        self.repository.books.create(&book).await
    }

    pub async fn update(&self, id: i32, book: UpdateBook) -> AppResult<Book> {
        if let Some(category_id) = book.category_id {
            self.repository.categories.get_by_id(category_id).await?;
        }
        self.repository.books.update(id, &book).await
    }

    /// Soft delete: the book is marked inactive and stays in the catalog
    pub async fn soft_delete(&self, id: i32) -> AppResult<Book> {
        self.repository.books.soft_delete(id).await
    }
}
