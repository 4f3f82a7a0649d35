//! Short-lived read-through cache of server state.
//!
//! Entries are keyed by [`QueryKey`] and dropped wholesale by
//! [`QueryScope`]; nothing is ever updated in place. A dropped entry is
//! refetched on the next read.

use crate::domain::{BoardId, CardId};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::debug;

/// Identity of one cached query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryKey {
    Boards,
    Board(BoardId),
    BoardStatistics(BoardId),
    CardsForBoard(BoardId),
    AllCards,
    Card(CardId),
}

/// Set of keys dropped by one invalidation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryScope {
    /// Every board-related key, lists and details alike
    AllBoards,
    /// One board's detail and statistics
    Board(BoardId),
    /// Every card-related key
    AllCards,
    Card(CardId),
}

impl QueryScope {
    pub fn covers(&self, key: &QueryKey) -> bool {
        match (self, key) {
            (
                Self::AllBoards,
                QueryKey::Boards | QueryKey::Board(_) | QueryKey::BoardStatistics(_),
            ) => true,
            (Self::Board(id), QueryKey::Board(k) | QueryKey::BoardStatistics(k)) => id == k,
            (
                Self::AllCards,
                QueryKey::AllCards | QueryKey::CardsForBoard(_) | QueryKey::Card(_),
            ) => true,
            (Self::Card(id), QueryKey::Card(k)) => id == k,
            _ => false,
        }
    }
}

#[derive(Default)]
pub struct QueryCache {
    entries: RwLock<HashMap<QueryKey, Value>>,
}

impl QueryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached value for `key`. An entry that no longer decodes as `T` is
    /// treated as a miss.
    pub async fn get<T: DeserializeOwned>(&self, key: &QueryKey) -> Option<T> {
        let entries = self.entries.read().await;
        let value = entries.get(key)?;
        serde_json::from_value(value.clone()).ok()
    }

    pub async fn put<T: Serialize>(&self, key: QueryKey, value: &T) -> serde_json::Result<()> {
        let value = serde_json::to_value(value)?;
        self.entries.write().await.insert(key, value);
        Ok(())
    }

    pub async fn contains(&self, key: &QueryKey) -> bool {
        self.entries.read().await.contains_key(key)
    }

    pub async fn invalidate(&self, scope: QueryScope) {
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|key, _| !scope.covers(key));
        debug!(?scope, dropped = before - entries.len(), "invalidated queries");
    }

    pub async fn clear(&self) {
        self.entries.write().await.clear();
    }
}
