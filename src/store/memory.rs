use super::{Book, BookStore, CredentialStore, NewBook, StoreError, UserCredential};
use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use tokio::sync::Mutex;

#[derive(Debug, Default)]
struct State {
    users: HashMap<String, UserCredential>,
    books: BTreeMap<i64, Book>,
    last_book_id: i64,
}

/// In-process store; every operation holds one lock, so check-and-insert on
/// `users` is atomic.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<State>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CredentialStore for MemoryStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<UserCredential>, StoreError> {
        Ok(self.state.lock().await.users.get(email).cloned())
    }

    async fn insert(&self, credential: &UserCredential) -> Result<(), StoreError> {
        let mut state = self.state.lock().await;
        if state.users.contains_key(&credential.email) {
            return Err(StoreError::Conflict);
        }
        state
            .users
            .insert(credential.email.clone(), credential.clone());
        Ok(())
    }
}

#[async_trait]
impl BookStore for MemoryStore {
    async fn list(&self) -> Result<Vec<Book>, StoreError> {
        Ok(self.state.lock().await.books.values().cloned().collect())
    }

    async fn create(&self, book: &NewBook) -> Result<Book, StoreError> {
        let mut state = self.state.lock().await;
        state.last_book_id += 1;
        let book = book.clone().with_id(state.last_book_id);
        state.books.insert(book.id, book.clone());
        Ok(book)
    }

    async fn get(&self, id: i64) -> Result<Option<Book>, StoreError> {
        Ok(self.state.lock().await.books.get(&id).cloned())
    }

    async fn update(&self, id: i64, book: &NewBook) -> Result<Option<Book>, StoreError> {
        let mut state = self.state.lock().await;
        Ok(state.books.get_mut(&id).map(|stored| {
            *stored = book.clone().with_id(id);
            stored.clone()
        }))
    }

    async fn delete(&self, id: i64) -> Result<Option<Book>, StoreError> {
        Ok(self.state.lock().await.books.remove(&id))
    }
}
