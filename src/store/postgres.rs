use super::{Book, BookStore, CredentialStore, NewBook, StoreError, UserCredential};
use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::{postgres::PgRow, FromRow, PgPool, Row};
use tracing::{info_span, Instrument, Span};

pub const SCHEMA_SQL: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/sql/schema.sql"));

#[derive(Clone, Debug)]
pub struct PgStore {
    pool: PgPool,
}

fn query_span(operation: &str, statement: &str) -> Span {
    info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = operation,
        db.statement = statement
    )
}

pub(crate) fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err
            .code()
            .is_some_and(|code| code.as_ref() == "23505"),
        _ => false,
    }
}

/// Split a schema file into single statements, dropping comment-only lines.
pub(crate) fn split_sql_statements(sql: &str) -> Vec<String> {
    let mut statements = Vec::new();
    let mut current = String::new();

    for line in sql.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with("--") {
            continue;
        }
        current.push_str(line);
        current.push('\n');

        if trimmed.ends_with(';') {
            statements.push(current.trim().to_string());
            current.clear();
        }
    }

    let leftover = current.trim();
    if !leftover.is_empty() {
        statements.push(leftover.to_string());
    }

    statements
}

impl<'r> FromRow<'r, PgRow> for Book {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            author: row.try_get("author")?,
            published_year: row.try_get("published_year")?,
            book_summary: row.try_get("book_summary")?,
        })
    }
}

impl<'r> FromRow<'r, PgRow> for UserCredential {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            email: row.try_get("email")?,
            password_hash: row.try_get("password")?,
        })
    }
}

impl PgStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Create the `users` and `books` tables if they are missing.
    ///
    /// # Errors
    /// Returns an error if any schema statement fails.
    pub async fn migrate(&self) -> Result<()> {
        for (index, statement) in split_sql_statements(SCHEMA_SQL).iter().enumerate() {
            sqlx::query(statement)
                .execute(&self.pool)
                .instrument(query_span("DDL", statement))
                .await
                .with_context(|| format!("failed to execute schema statement {}", index + 1))?;
        }

        Ok(())
    }
}

#[async_trait]
impl CredentialStore for PgStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<UserCredential>, StoreError> {
        let query = "SELECT email, password FROM users WHERE email = $1";
        let credential = sqlx::query_as::<_, UserCredential>(query)
            .bind(email)
            .fetch_optional(&self.pool)
            .instrument(query_span("SELECT", query))
            .await?;

        Ok(credential)
    }

    async fn insert(&self, credential: &UserCredential) -> Result<(), StoreError> {
        let query = "INSERT INTO users (email, password) VALUES ($1, $2)";
        match sqlx::query(query)
            .bind(&credential.email)
            .bind(&credential.password_hash)
            .execute(&self.pool)
            .instrument(query_span("INSERT", query))
            .await
        {
            Ok(_) => Ok(()),
            Err(err) if is_unique_violation(&err) => Err(StoreError::Conflict),
            Err(err) => Err(err.into()),
        }
    }
}

#[async_trait]
impl BookStore for PgStore {
    async fn list(&self) -> Result<Vec<Book>, StoreError> {
        let query = "SELECT id, name, author, published_year, book_summary FROM books ORDER BY id";
        let books = sqlx::query_as::<_, Book>(query)
            .fetch_all(&self.pool)
            .instrument(query_span("SELECT", query))
            .await?;

        Ok(books)
    }

    async fn create(&self, book: &NewBook) -> Result<Book, StoreError> {
        let query = r"
            INSERT INTO books (name, author, published_year, book_summary)
            VALUES ($1, $2, $3, $4)
            RETURNING id, name, author, published_year, book_summary
        ";
        let created = sqlx::query_as::<_, Book>(query)
            .bind(&book.name)
            .bind(&book.author)
            .bind(book.published_year)
            .bind(&book.book_summary)
            .fetch_one(&self.pool)
            .instrument(query_span("INSERT", query))
            .await?;

        Ok(created)
    }

    async fn get(&self, id: i64) -> Result<Option<Book>, StoreError> {
        let query =
            "SELECT id, name, author, published_year, book_summary FROM books WHERE id = $1";
        let book = sqlx::query_as::<_, Book>(query)
            .bind(id)
            .fetch_optional(&self.pool)
            .instrument(query_span("SELECT", query))
            .await?;

        Ok(book)
    }

    async fn update(&self, id: i64, book: &NewBook) -> Result<Option<Book>, StoreError> {
        let query = r"
            UPDATE books
            SET name = $2, author = $3, published_year = $4, book_summary = $5
            WHERE id = $1
            RETURNING id, name, author, published_year, book_summary
        ";
        let updated = sqlx::query_as::<_, Book>(query)
            .bind(id)
            .bind(&book.name)
            .bind(&book.author)
            .bind(book.published_year)
            .bind(&book.book_summary)
            .fetch_optional(&self.pool)
            .instrument(query_span("UPDATE", query))
            .await?;

        Ok(updated)
    }

    async fn delete(&self, id: i64) -> Result<Option<Book>, StoreError> {
        let query = r"
            DELETE FROM books
            WHERE id = $1
            RETURNING id, name, author, published_year, book_summary
        ";
        let deleted = sqlx::query_as::<_, Book>(query)
            .bind(id)
            .fetch_optional(&self.pool)
            .instrument(query_span("DELETE", query))
            .await?;

        Ok(deleted)
    }
}
