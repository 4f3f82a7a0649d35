//! Cache-and-invalidate data access over [`KanbanApi`].
//!
//! Reads go through the [`QueryCache`]; every successful mutation drops the
//! queries it may have changed. Failed mutations are logged and returned,
//! leaving the cache untouched.

use crate::api::client::MoveRequest;
use crate::api::KanbanApi;
use crate::cache::{QueryCache, QueryKey, QueryScope};
use crate::domain::{
    Board, BoardDraft, BoardFilter, BoardId, BoardPatch, Card, CardDraft, CardId, CardLifecycle,
    CardPatch, Column, ColumnDraft, ColumnId, ColumnPatch, DefaultColumns,
};
use crate::error::Result;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use std::future::Future;
use tracing::{debug, error};

pub struct KanbanStore {
    api: KanbanApi,
    cache: QueryCache,
}

impl KanbanStore {
    pub fn new(api: KanbanApi) -> Self {
        Self {
            api,
            cache: QueryCache::new(),
        }
    }

    pub fn api(&self) -> &KanbanApi {
        &self.api
    }

    pub fn cache(&self) -> &QueryCache {
        &self.cache
    }

    async fn query<T, F>(&self, key: QueryKey, fetch: F) -> Result<T>
    where
        T: Serialize + DeserializeOwned,
        F: Future<Output = Result<T>>,
    {
        if let Some(hit) = self.cache.get(&key).await {
            debug!(?key, "cache hit");
            return Ok(hit);
        }
        let value = fetch.await?;
        self.cache.put(key, &value).await?;
        Ok(value)
    }

    async fn mutate<T, F>(&self, action: &str, scopes: &[QueryScope], call: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        match call.await {
            Ok(value) => {
                for scope in scopes {
                    self.cache.invalidate(*scope).await;
                }
                Ok(value)
            }
            Err(e) => {
                error!("Failed to {}: {}", action, e);
                Err(e)
            }
        }
    }

    // Board queries

    pub async fn boards(&self) -> Result<Vec<Board>> {
        self.query(QueryKey::Boards, self.api.list_boards()).await
    }

    /// Boards visible under `filter`
    pub async fn visible_boards(&self, filter: &BoardFilter) -> Result<Vec<Board>> {
        let boards = self.boards().await?;
        Ok(boards.into_iter().filter(|b| filter.matches(b)).collect())
    }

    pub async fn board(&self, id: BoardId) -> Result<Board> {
        self.query(QueryKey::Board(id), self.api.get_board(id)).await
    }

    pub async fn board_statistics(&self, id: BoardId) -> Result<Value> {
        self.query(QueryKey::BoardStatistics(id), self.api.board_statistics(id))
            .await
    }

    // Board mutations

    pub async fn create_board(&self, draft: &BoardDraft) -> Result<Board> {
        self.mutate("create board", &[QueryScope::AllBoards], self.api.create_board(draft))
            .await
    }

    pub async fn update_board(&self, id: BoardId, patch: &BoardPatch) -> Result<Board> {
        self.mutate(
            "update board",
            &[QueryScope::AllBoards, QueryScope::Board(id)],
            self.api.update_board(id, patch),
        )
        .await
    }

    /// Saves the board settings edited through [`DefaultColumns`]
    pub async fn save_default_columns(
        &self,
        id: BoardId,
        settings: &DefaultColumns,
    ) -> Result<Board> {
        self.update_board(id, &settings.to_patch()).await
    }

    pub async fn delete_board(&self, id: BoardId) -> Result<()> {
        self.mutate("delete board", &[QueryScope::AllBoards], self.api.delete_board(id))
            .await
    }

    pub async fn archive_board(&self, id: BoardId) -> Result<()> {
        self.mutate("archive board", &[QueryScope::AllBoards], self.api.archive_board(id))
            .await
    }

    pub async fn unarchive_board(&self, id: BoardId) -> Result<()> {
        self.mutate(
            "unarchive board",
            &[QueryScope::AllBoards],
            self.api.unarchive_board(id),
        )
        .await
    }

    pub async fn duplicate_board(&self, id: BoardId) -> Result<Board> {
        self.mutate(
            "duplicate board",
            &[QueryScope::AllBoards],
            self.api.duplicate_board(id),
        )
        .await
    }

    // Columns

    pub async fn columns(&self, board: BoardId) -> Result<Vec<Column>> {
        self.api.list_columns(board).await
    }

    pub async fn create_column(&self, draft: &ColumnDraft) -> Result<Column> {
        self.mutate("create column", &[QueryScope::AllBoards], self.api.create_column(draft))
            .await
    }

    pub async fn update_column(&self, id: ColumnId, patch: &ColumnPatch) -> Result<Column> {
        self.mutate(
            "update column",
            &[QueryScope::AllBoards],
            self.api.update_column(id, patch),
        )
        .await
    }

    pub async fn delete_column(&self, id: ColumnId) -> Result<()> {
        self.mutate("delete column", &[QueryScope::AllBoards], self.api.delete_column(id))
            .await
    }

    // Card queries

    pub async fn cards(&self, board: BoardId) -> Result<Vec<Card>> {
        self.query(QueryKey::CardsForBoard(board), self.api.list_cards(Some(board)))
            .await
    }

    pub async fn all_cards(&self) -> Result<Vec<Card>> {
        self.query(QueryKey::AllCards, self.api.list_cards(None))
            .await
    }

    pub async fn card(&self, id: CardId) -> Result<Card> {
        self.query(QueryKey::Card(id), self.api.get_card(id)).await
    }

    // Card mutations

    pub async fn create_card(&self, draft: &CardDraft) -> Result<Card> {
        self.mutate(
            "create card",
            &[QueryScope::AllCards, QueryScope::AllBoards],
            self.api.create_card(draft),
        )
        .await
    }

    pub async fn update_card(&self, id: CardId, patch: &CardPatch) -> Result<Card> {
        self.mutate(
            "update card",
            &[QueryScope::AllCards, QueryScope::AllBoards],
            self.api.update_card(id, patch),
        )
        .await
    }

    pub async fn delete_card(&self, id: CardId) -> Result<()> {
        self.mutate(
            "delete card",
            &[QueryScope::AllCards, QueryScope::AllBoards],
            self.api.delete_card(id),
        )
        .await
    }

    pub async fn move_card(&self, id: CardId, target: MoveRequest) -> Result<Card> {
        self.mutate(
            "move card",
            &[QueryScope::AllCards, QueryScope::AllBoards],
            self.api.move_card(id, target),
        )
        .await
    }

    /// Starts work on a card that has not been started
    pub async fn start_card(&self, card: &Card) -> Result<Card> {
        card.check_transition(CardLifecycle::InProgress)?;
        self.mutate("start card", &[QueryScope::AllCards], self.api.start_card(card.id))
            .await
    }

    /// Completes a card that is in progress
    pub async fn complete_card(&self, card: &Card) -> Result<Card> {
        card.check_transition(CardLifecycle::Completed)?;
        self.mutate(
            "complete card",
            &[QueryScope::AllCards],
            self.api.complete_card(card.id),
        )
        .await
    }
}
