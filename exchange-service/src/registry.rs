//! Book registry (C4): lazily creates and looks up one engine task per
//! (venue, symbol) pair.
//!
//! Keyed two levels deep (venue, symbol) with a configurable creation cap,
//! since books are created on first use rather than pre-seeded from a fixed
//! symbol list.

use dashmap::DashMap;
use tokio::sync::Mutex;

use engine::BookHandle;

use crate::error::ApiError;

pub struct BookRegistry {
    books: DashMap<(String, String), BookHandle>,
    /// Serializes book-creation decisions so two concurrent first-requests
    /// for the same new (venue, symbol) can't both pass the cap check.
    creation_lock: Mutex<()>,
    max_books: usize,
}

impl BookRegistry {
    pub fn new(max_books: usize) -> Self {
        Self {
            books: DashMap::new(),
            creation_lock: Mutex::new(()),
            max_books,
        }
    }

    /// Returns the handle for (venue, symbol), creating its engine task on
    /// first use. Fails with `ApiError::BookError` once `max_books` (if
    /// nonzero) would be exceeded.
    pub async fn get_or_create(&self, venue: &str, symbol: &str) -> Result<BookHandle, ApiError> {
        let key = (venue.to_string(), symbol.to_string());
        if let Some(handle) = self.books.get(&key) {
            return Ok(handle.clone());
        }

        let _guard = self.creation_lock.lock().await;
        if let Some(handle) = self.books.get(&key) {
            return Ok(handle.clone());
        }

        if self.max_books > 0 && self.books.len() + 1 > self.max_books {
            return Err(ApiError::BookError);
        }

        let handle = engine::spawn();
        self.books.insert(key, handle.clone());
        Ok(handle)
    }

    /// Looks up an existing book without creating one. Used by read-only
    /// venue/stock listing endpoints, which must 404 on an unknown venue
    /// rather than conjuring one into existence.
    pub fn get(&self, venue: &str, symbol: &str) -> Option<BookHandle> {
        self.books
            .get(&(venue.to_string(), symbol.to_string()))
            .map(|entry| entry.clone())
    }

    pub fn venue_exists(&self, venue: &str) -> bool {
        self.books.iter().any(|entry| entry.key().0 == venue)
    }

    pub fn venues(&self) -> Vec<String> {
        let mut venues: Vec<String> = self
            .books
            .iter()
            .map(|entry| entry.key().0.clone())
            .collect();
        venues.sort();
        venues.dedup();
        venues
    }

    pub fn stocks(&self, venue: &str) -> Vec<String> {
        let mut stocks: Vec<String> = self
            .books
            .iter()
            .filter(|entry| entry.key().0 == venue)
            .map(|entry| entry.key().1.clone())
            .collect();
        stocks.sort();
        stocks
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn get_or_create_is_idempotent() {
        let registry = BookRegistry::new(10);
        let a = registry.get_or_create("TESTEX", "FOOBAR").await.unwrap();
        let b = registry.get_or_create("TESTEX", "FOOBAR").await.unwrap();

        a.place_order("X".into(), orderbook::Side::Buy, orderbook::OrderType::Limit, 10, 5)
            .await
            .unwrap();
        let debug = b.debug_memory().await.unwrap();
        assert_eq!(debug.total_orders, 1);
    }

    #[tokio::test]
    async fn cap_is_enforced() {
        let registry = BookRegistry::new(1);
        registry.get_or_create("TESTEX", "FOOBAR").await.unwrap();
        let err = registry.get_or_create("TESTEX", "OTHER").await.unwrap_err();
        assert!(matches!(err, ApiError::BookError));
    }

    #[tokio::test]
    async fn unknown_venue_is_not_created_by_get() {
        let registry = BookRegistry::new(10);
        assert!(registry.get("TESTEX", "FOOBAR").is_none());
        assert!(!registry.venue_exists("TESTEX"));
    }

    #[tokio::test]
    async fn venues_and_stocks_are_listed() {
        let registry = BookRegistry::new(10);
        registry.get_or_create("TESTEX", "FOOBAR").await.unwrap();
        registry.get_or_create("TESTEX", "BARFOO").await.unwrap();
        registry.get_or_create("OTHEREX", "BAZ").await.unwrap();

        assert_eq!(registry.venues(), vec!["OTHEREX".to_string(), "TESTEX".to_string()]);
        assert_eq!(
            registry.stocks("TESTEX"),
            vec!["BARFOO".to_string(), "FOOBAR".to_string()]
        );
    }
}
