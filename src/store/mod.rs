//! Persistence seams for user credentials and books.
//!
//! Handlers and the auth service only see the `CredentialStore` and
//! `BookStore` traits. `PgStore` is the production backend; `MemoryStore`
//! keeps everything in process and is what the HTTP tests run against.

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

#[derive(Debug, Error)]
pub enum StoreError {
    /// A uniqueness constraint rejected the write.
    #[error("record already exists")]
    Conflict,
    #[error("database error")]
    Database(#[from] sqlx::Error),
}

/// A registered user. `password_hash` is a bcrypt string, never plaintext.
#[derive(Clone, PartialEq, Eq)]
pub struct UserCredential {
    pub email: String,
    pub password_hash: String,
}

impl std::fmt::Debug for UserCredential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserCredential")
            .field("email", &self.email)
            .field("password_hash", &"***")
            .finish()
    }
}

#[derive(ToSchema, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Book {
    pub id: i64,
    pub name: String,
    pub author: String,
    pub published_year: i32,
    pub book_summary: String,
}

/// Book fields supplied by clients on create and update.
#[derive(ToSchema, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct NewBook {
    pub name: String,
    pub author: String,
    pub published_year: i32,
    pub book_summary: String,
}

impl NewBook {
    #[must_use]
    pub fn with_id(self, id: i64) -> Book {
        Book {
            id,
            name: self.name,
            author: self.author,
            published_year: self.published_year,
            book_summary: self.book_summary,
        }
    }
}

#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Exact, case-sensitive lookup by email.
    async fn find_by_email(&self, email: &str) -> Result<Option<UserCredential>, StoreError>;

    /// Insert a new credential; a second insert for the same email must fail
    /// with `StoreError::Conflict`, even under concurrent callers.
    async fn insert(&self, credential: &UserCredential) -> Result<(), StoreError>;
}

#[async_trait]
pub trait BookStore: Send + Sync {
    async fn list(&self) -> Result<Vec<Book>, StoreError>;
    async fn create(&self, book: &NewBook) -> Result<Book, StoreError>;
    async fn get(&self, id: i64) -> Result<Option<Book>, StoreError>;
    /// Replace all fields; `None` when no book has `id`.
    async fn update(&self, id: i64, book: &NewBook) -> Result<Option<Book>, StoreError>;
    /// Remove and return the book; `None` when no book has `id`.
    async fn delete(&self, id: i64) -> Result<Option<Book>, StoreError>;
}
