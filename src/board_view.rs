//! Renderable board state and the drag-and-drop move controller.

use crate::api::client::MoveRequest;
use crate::domain::sorting::sort_by_position;
use crate::domain::{Board, BoardId, Card, CardId, Column, ColumnId};
use crate::error::{KanbanError, Result};
use crate::store::KanbanStore;
use tracing::{debug, error, info};

/// Position submitted with every move; the card is inserted at the head of
/// the target column.
pub const MOVE_POSITION: u32 = 0;

/// One column with the cards it currently holds
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnView {
    pub column: Column,
    pub cards: Vec<Card>,
    pub wip_reached: bool,
}

/// A board detail joined with its card list
#[derive(Debug, Clone, PartialEq)]
pub struct BoardView {
    pub board: Board,
    pub columns: Vec<ColumnView>,
}

impl BoardView {
    /// Builds the view from a board detail and the board's cards.
    ///
    /// Columns are ordered by position and each column receives the cards
    /// whose `column` matches it, ordered by position. Cards pointing at a
    /// column the board does not have are dropped.
    pub fn assemble(board: Board, cards: Vec<Card>) -> Self {
        let mut columns: Vec<Column> = board.columns().to_vec();
        columns.sort_by_key(|c| c.position);

        let columns = columns
            .into_iter()
            .map(|mut column| {
                column.cards = None;
                let mut cards: Vec<Card> = cards
                    .iter()
                    .filter(|card| card.column == column.id)
                    .cloned()
                    .collect();
                sort_by_position(&mut cards);
                let wip_reached = column.wip_reached_with(cards.len());
                ColumnView {
                    column,
                    cards,
                    wip_reached,
                }
            })
            .collect();

        Self { board, columns }
    }

    /// Fetches the board detail and its cards through the store
    pub async fn load(store: &KanbanStore, id: BoardId) -> Result<Self> {
        let board = store.board(id).await?;
        let cards = store.cards(id).await?;
        Ok(Self::assemble(board, cards))
    }

    pub fn column(&self, id: ColumnId) -> Option<&ColumnView> {
        self.columns.iter().find(|c| c.column.id == id)
    }

    pub fn card(&self, id: CardId) -> Option<&Card> {
        self.columns
            .iter()
            .flat_map(|c| c.cards.iter())
            .find(|card| card.id == id)
    }

    /// Column the card is rendered in
    pub fn column_of(&self, id: CardId) -> Option<ColumnId> {
        self.columns
            .iter()
            .find(|c| c.cards.iter().any(|card| card.id == id))
            .map(|c| c.column.id)
    }

    pub fn card_count(&self) -> usize {
        self.columns.iter().map(|c| c.cards.len()).sum()
    }
}

/// What a card was dropped on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropTarget {
    Column(ColumnId),
    /// Another card; stands for the column that card sits in
    Card(CardId),
}

impl DropTarget {
    pub fn resolve(&self, view: &BoardView) -> Option<ColumnId> {
        match self {
            Self::Column(id) => view.column(*id).map(|c| c.column.id),
            Self::Card(id) => view.column_of(*id),
        }
    }
}

/// Result of a finished drag gesture
#[derive(Debug)]
pub enum DropOutcome {
    /// No active card or no resolvable target; nothing was sent
    Abandoned,
    /// Dropped back into its own column; nothing was sent
    SameColumn,
    /// The server accepted the move
    Moved(Card),
    /// The move request failed; the error has already been logged
    Failed(KanbanError),
}

impl DropOutcome {
    pub fn is_moved(&self) -> bool {
        matches!(self, Self::Moved(_))
    }
}

/// Turns drag gestures into card move requests
#[derive(Debug, Default)]
pub struct DragController {
    active: Option<Card>,
}

impl DragController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Card currently being dragged, for the drag overlay
    pub fn active(&self) -> Option<&Card> {
        self.active.as_ref()
    }

    pub fn drag_start(&mut self, card: Card) {
        debug!(card = %card.id, "drag started");
        self.active = Some(card);
    }

    /// Finishes the gesture started by [`drag_start`](Self::drag_start).
    ///
    /// The active card is cleared before anything else. A cross-column drop
    /// sends exactly one move request; any failure is logged and reported
    /// through the outcome, never returned as an error.
    pub async fn drag_end(
        &mut self,
        store: &KanbanStore,
        view: &BoardView,
        over: Option<DropTarget>,
    ) -> DropOutcome {
        let Some(card) = self.active.take() else {
            return DropOutcome::Abandoned;
        };
        let Some(target_column) = over.and_then(|target| target.resolve(view)) else {
            debug!(card = %card.id, "drop without a target column");
            return DropOutcome::Abandoned;
        };

        if target_column == card.column {
            debug!(card = %card.id, "same-column drop ignored");
            return DropOutcome::SameColumn;
        }

        let request = MoveRequest {
            target_column_id: target_column,
            position: MOVE_POSITION,
        };
        match store.move_card(card.id, request).await {
            Ok(moved) => {
                info!(card = %moved.id, column = %moved.column, "card moved");
                DropOutcome::Moved(moved)
            }
            Err(e) => {
                error!("Failed to move card {}: {}", card.id, e);
                DropOutcome::Failed(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::client::tests::{board_json, card_json, column_json};
    use crate::api::{ApiRequest, ApiResponse, KanbanApi, Method, MockTransport, TransportError};
    use crate::domain::board::tests::board;
    use crate::domain::card::tests::card;
    use crate::domain::column::tests::column;
    use mockall::Sequence;
    use serde_json::{json, Value};
    use std::sync::Arc;

    fn board_detail_json() -> Value {
        let mut detail = board_json(4, "Rust");
        detail["columns"] = json!([column_json(2, 4, 1), column_json(1, 4, 0)]);
        detail
    }

    fn two_column_view() -> BoardView {
        let mut b = board(4, "Rust", false);
        b.columns = Some(vec![column(1, 4, 0, None), column(2, 4, 1, Some(1))]);
        BoardView::assemble(b, vec![card(10, 1, 1), card(11, 1, 0), card(12, 2, 0)])
    }

    fn store(transport: MockTransport) -> KanbanStore {
        KanbanStore::new(KanbanApi::new(Arc::new(transport)))
    }

    fn is_get(path: &'static str) -> impl Fn(&ApiRequest) -> bool + Send + 'static {
        move |req| req.method == Method::Get && req.path == path
    }

    #[test]
    fn test_assemble_orders_columns_and_cards() {
        let view = two_column_view();

        let ids: Vec<_> = view.columns.iter().map(|c| c.column.id.get()).collect();
        assert_eq!(ids, vec![1, 2]);

        let first: Vec<_> = view.columns[0].cards.iter().map(|c| c.id.get()).collect();
        assert_eq!(first, vec![11, 10]);

        assert!(!view.columns[0].wip_reached);
        assert!(view.columns[1].wip_reached);
        assert_eq!(view.column_of(CardId(12)), Some(ColumnId(2)));
        assert_eq!(view.card_count(), 3);
    }

    #[test]
    fn test_assemble_drops_orphan_cards() {
        let mut b = board(4, "Rust", false);
        b.columns = Some(vec![column(1, 4, 0, None)]);
        let view = BoardView::assemble(b, vec![card(10, 1, 0), card(11, 9, 0)]);
        assert_eq!(view.card_count(), 1);
        assert!(view.card(CardId(11)).is_none());
    }

    #[test]
    fn test_drop_target_resolution() {
        let view = two_column_view();
        assert_eq!(DropTarget::Column(ColumnId(2)).resolve(&view), Some(ColumnId(2)));
        assert_eq!(DropTarget::Card(CardId(12)).resolve(&view), Some(ColumnId(2)));
        assert_eq!(DropTarget::Column(ColumnId(7)).resolve(&view), None);
        assert_eq!(DropTarget::Card(CardId(99)).resolve(&view), None);
    }

    #[tokio::test]
    async fn test_same_column_drop_sends_nothing() {
        let mut transport = MockTransport::new();
        transport.expect_send().times(0);
        let store = store(transport);
        let view = two_column_view();

        let mut drag = DragController::new();
        drag.drag_start(card(10, 1, 1));
        let outcome = drag
            .drag_end(&store, &view, Some(DropTarget::Column(ColumnId(1))))
            .await;
        assert!(matches!(outcome, DropOutcome::SameColumn));
        assert!(drag.active().is_none());

        // Dropping onto a card in the same column is the same gesture
        drag.drag_start(card(10, 1, 1));
        let outcome = drag
            .drag_end(&store, &view, Some(DropTarget::Card(CardId(11))))
            .await;
        assert!(matches!(outcome, DropOutcome::SameColumn));
    }

    #[tokio::test]
    async fn test_drop_without_target_is_abandoned() {
        let mut transport = MockTransport::new();
        transport.expect_send().times(0);
        let store = store(transport);
        let view = two_column_view();

        let mut drag = DragController::new();
        assert!(matches!(
            drag.drag_end(&store, &view, Some(DropTarget::Column(ColumnId(2))))
                .await,
            DropOutcome::Abandoned
        ));

        drag.drag_start(card(10, 1, 1));
        assert_eq!(drag.active().map(|c| c.id), Some(CardId(10)));
        assert!(matches!(
            drag.drag_end(&store, &view, None).await,
            DropOutcome::Abandoned
        ));
        assert!(drag.active().is_none());
    }

    #[tokio::test]
    async fn test_cross_column_drop_moves_once_and_refetches() {
        let mut seq = Sequence::new();
        let mut transport = MockTransport::new();
        transport
            .expect_send()
            .withf(is_get("/api/kanban/boards/4/"))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(ApiResponse::ok(board_detail_json())));
        transport
            .expect_send()
            .withf(is_get("/api/kanban/cards/"))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(ApiResponse::ok(json!([card_json(10, 1, 0)]))));
        transport
            .expect_send()
            .withf(|req| {
                req.method == Method::Post
                    && req.path == "/api/kanban/cards/10/move/"
                    && req.body == Some(json!({ "target_column_id": 2, "position": 0 }))
            })
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(ApiResponse::ok(card_json(10, 2, 0))));
        transport
            .expect_send()
            .withf(is_get("/api/kanban/boards/4/"))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(ApiResponse::ok(board_detail_json())));
        transport
            .expect_send()
            .withf(is_get("/api/kanban/cards/"))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(ApiResponse::ok(json!([card_json(10, 2, 0)]))));

        let store = store(transport);
        let view = BoardView::load(&store, BoardId(4)).await.unwrap();
        assert_eq!(view.column_of(CardId(10)), Some(ColumnId(1)));

        let mut drag = DragController::new();
        drag.drag_start(view.card(CardId(10)).unwrap().clone());
        let outcome = drag
            .drag_end(&store, &view, Some(DropTarget::Column(ColumnId(2))))
            .await;

        let DropOutcome::Moved(moved) = outcome else {
            panic!("expected a move, got {:?}", outcome);
        };
        assert_eq!(moved.column, ColumnId(2));

        let view = BoardView::load(&store, BoardId(4)).await.unwrap();
        assert_eq!(view.column_of(CardId(10)), Some(moved.column));
    }

    #[tokio::test]
    async fn test_failed_move_is_reported_not_raised() {
        let mut transport = MockTransport::new();
        transport.expect_send().times(1).returning(|_| {
            Err(TransportError::Rejected {
                status: 400,
                body: Some(json!({ "detail": "WIP limit reached" })),
            })
        });
        let store = store(transport);
        let view = two_column_view();

        let mut drag = DragController::new();
        drag.drag_start(card(10, 1, 1));
        let outcome = drag
            .drag_end(&store, &view, Some(DropTarget::Card(CardId(12))))
            .await;

        assert!(matches!(outcome, DropOutcome::Failed(KanbanError::Transport(_))));
        assert!(!outcome.is_moved());
        assert!(drag.active().is_none());
    }
}
