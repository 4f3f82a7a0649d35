use crate::api::list::decode_list;
use crate::api::{ApiRequest, ApiResponse, Transport};
use crate::domain::{
    AuthTokens, Board, BoardDraft, BoardId, BoardPatch, Card, CardDraft, CardId, CardPatch,
    Column, ColumnDraft, ColumnId, ColumnPatch, LoginCredentials,
};
use crate::error::{KanbanError, Result};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;

const TOKEN_PATH: &str = "/api/token/";
const TOKEN_REFRESH_PATH: &str = "/api/token/refresh/";
const LOGOUT_PATH: &str = "/api/logout/";
const BOARDS_PATH: &str = "/api/kanban/boards/";
const COLUMNS_PATH: &str = "/api/kanban/columns/";
const CARDS_PATH: &str = "/api/kanban/cards/";

/// Supplies the bearer token attached to API requests
#[async_trait]
pub trait AccessTokenSource: Send + Sync {
    async fn access_token(&self) -> Option<String>;
}

/// Body of a card move request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MoveRequest {
    pub target_column_id: ColumnId,
    pub position: u32,
}

#[derive(Deserialize)]
struct RefreshResponse {
    access: String,
}

/// Typed wrappers over the kanban REST endpoints
#[derive(Clone)]
pub struct KanbanApi {
    transport: Arc<dyn Transport>,
    tokens: Option<Arc<dyn AccessTokenSource>>,
}

impl KanbanApi {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            tokens: None,
        }
    }

    /// Attaches the bearer token source used for every request
    pub fn with_token_source(mut self, tokens: Arc<dyn AccessTokenSource>) -> Self {
        self.tokens = Some(tokens);
        self
    }

    async fn send(&self, request: ApiRequest) -> Result<ApiResponse> {
        let bearer = match &self.tokens {
            Some(source) => source.access_token().await,
            None => None,
        };
        Ok(self.transport.send(request.with_bearer(bearer)).await?)
    }

    async fn fetch<T: DeserializeOwned>(&self, request: ApiRequest) -> Result<T> {
        let response = self.send(request).await?;
        let body = response.body.unwrap_or(Value::Null);
        Ok(serde_json::from_value(body)?)
    }

    async fn fetch_list<T: DeserializeOwned>(&self, request: ApiRequest) -> Result<Vec<T>> {
        let response = self.send(request).await?;
        Ok(decode_list(response.body)?)
    }

    async fn execute(&self, request: ApiRequest) -> Result<()> {
        self.send(request).await?;
        Ok(())
    }

    // Auth

    /// Exchanges credentials for an access/refresh token pair
    pub async fn login(&self, credentials: &LoginCredentials) -> Result<AuthTokens> {
        let body = serde_json::to_value(credentials)?;
        let request = ApiRequest::post(TOKEN_PATH).with_body(body);
        // The token endpoint must not see a stale bearer token
        let response = self.transport.send(request).await?;
        Ok(serde_json::from_value(response.body.unwrap_or(Value::Null))?)
    }

    /// Trades a refresh token for a new access token, keeping the refresh token
    pub async fn refresh_token(&self, refresh: &str) -> Result<AuthTokens> {
        let request =
            ApiRequest::post(TOKEN_REFRESH_PATH).with_body(json!({ "refresh": refresh }));
        let response = self.transport.send(request).await?;
        let data: RefreshResponse = serde_json::from_value(response.body.unwrap_or(Value::Null))?;
        Ok(AuthTokens {
            access: data.access,
            refresh: refresh.to_string(),
        })
    }

    /// Server-side session invalidation
    pub async fn logout(&self) -> Result<()> {
        self.execute(ApiRequest::post(LOGOUT_PATH)).await
    }

    // Boards

    pub async fn list_boards(&self) -> Result<Vec<Board>> {
        self.fetch_list(ApiRequest::get(BOARDS_PATH)).await
    }

    pub async fn get_board(&self, id: BoardId) -> Result<Board> {
        self.fetch(ApiRequest::get(board_path(id)))
            .await
            .map_err(|e| not_found(e, || KanbanError::BoardNotFound(id.to_string())))
    }

    pub async fn create_board(&self, draft: &BoardDraft) -> Result<Board> {
        draft.validate()?;
        let body = serde_json::to_value(draft)?;
        self.fetch(ApiRequest::post(BOARDS_PATH).with_body(body)).await
    }

    pub async fn update_board(&self, id: BoardId, patch: &BoardPatch) -> Result<Board> {
        patch.validate()?;
        let body = serde_json::to_value(patch)?;
        self.fetch(ApiRequest::patch(board_path(id)).with_body(body)).await
    }

    pub async fn delete_board(&self, id: BoardId) -> Result<()> {
        self.execute(ApiRequest::delete(board_path(id))).await
    }

    pub async fn archive_board(&self, id: BoardId) -> Result<()> {
        self.execute(ApiRequest::post(board_action(id, "archive"))).await
    }

    pub async fn unarchive_board(&self, id: BoardId) -> Result<()> {
        self.execute(ApiRequest::post(board_action(id, "unarchive"))).await
    }

    pub async fn duplicate_board(&self, id: BoardId) -> Result<Board> {
        self.fetch(ApiRequest::post(board_action(id, "duplicate"))).await
    }

    /// Board statistics. The payload shape belongs to the server.
    pub async fn board_statistics(&self, id: BoardId) -> Result<Value> {
        self.fetch(ApiRequest::get(board_action(id, "statistics"))).await
    }

    // Columns

    pub async fn list_columns(&self, board: BoardId) -> Result<Vec<Column>> {
        self.fetch_list(ApiRequest::get(COLUMNS_PATH).with_query("board", board)).await
    }

    pub async fn create_column(&self, draft: &ColumnDraft) -> Result<Column> {
        draft.validate()?;
        let body = serde_json::to_value(draft)?;
        self.fetch(ApiRequest::post(COLUMNS_PATH).with_body(body)).await
    }

    pub async fn update_column(&self, id: ColumnId, patch: &ColumnPatch) -> Result<Column> {
        let body = serde_json::to_value(patch)?;
        self.fetch(ApiRequest::patch(format!("{}{}/", COLUMNS_PATH, id)).with_body(body)).await
    }

    pub async fn delete_column(&self, id: ColumnId) -> Result<()> {
        self.execute(ApiRequest::delete(format!("{}{}/", COLUMNS_PATH, id))).await
    }

    // Cards

    /// Lists cards, optionally limited to one board
    pub async fn list_cards(&self, board: Option<BoardId>) -> Result<Vec<Card>> {
        let mut request = ApiRequest::get(CARDS_PATH);
        if let Some(board) = board {
            request = request.with_query("board_id", board);
        }
        self.fetch_list(request).await
    }

    pub async fn get_card(&self, id: CardId) -> Result<Card> {
        self.fetch(ApiRequest::get(card_path(id)))
            .await
            .map_err(|e| not_found(e, || KanbanError::CardNotFound(id.to_string())))
    }

    pub async fn create_card(&self, draft: &CardDraft) -> Result<Card> {
        draft.validate()?;
        let body = serde_json::to_value(draft)?;
        self.fetch(ApiRequest::post(CARDS_PATH).with_body(body)).await
    }

    pub async fn update_card(&self, id: CardId, patch: &CardPatch) -> Result<Card> {
        patch.validate()?;
        let body = serde_json::to_value(patch)?;
        self.fetch(ApiRequest::patch(card_path(id)).with_body(body)).await
    }

    pub async fn delete_card(&self, id: CardId) -> Result<()> {
        self.execute(ApiRequest::delete(card_path(id))).await
    }

    /// Relocates a card; the response carries the card as the server placed it
    pub async fn move_card(&self, id: CardId, target: MoveRequest) -> Result<Card> {
        let body = serde_json::to_value(target)?;
        self.fetch(ApiRequest::post(card_action(id, "move")).with_body(body)).await
    }

    pub async fn start_card(&self, id: CardId) -> Result<Card> {
        self.fetch(ApiRequest::post(card_action(id, "start"))).await
    }

    pub async fn complete_card(&self, id: CardId) -> Result<Card> {
        self.fetch(ApiRequest::post(card_action(id, "complete"))).await
    }
}

fn board_path(id: BoardId) -> String {
    format!("{}{}/", BOARDS_PATH, id)
}

fn board_action(id: BoardId, action: &str) -> String {
    format!("{}{}/{}/", BOARDS_PATH, id, action)
}

fn card_path(id: CardId) -> String {
    format!("{}{}/", CARDS_PATH, id)
}

fn card_action(id: CardId, action: &str) -> String {
    format!("{}{}/{}/", CARDS_PATH, id, action)
}

fn not_found(err: KanbanError, missing: impl FnOnce() -> KanbanError) -> KanbanError {
    match &err {
        KanbanError::Transport(t) if t.status() == Some(404) => missing(),
        _ => err,
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::api::{Method, MockTransport, TransportError};

    pub(crate) fn board_json(id: i64, name: &str) -> Value {
        json!({
            "id": id,
            "name": name,
            "description": "",
            "board_type": "personal",
            "is_active": true,
            "owner": 1,
            "owner_email": "owner@example.com",
            "column_count": 0,
            "card_count": 0,
            "created_at": "2024-05-01T10:00:00Z",
            "updated_at": "2024-05-01T10:00:00Z"
        })
    }

    pub(crate) fn card_json(id: i64, column: i64, position: i32) -> Value {
        json!({
            "id": id,
            "column": column,
            "title": format!("Card {}", id),
            "description": "",
            "assigned_to": null,
            "position": position,
            "estimated_hours": "1.00",
            "actual_hours": "0.00",
            "priority": "medium",
            "status": "normal",
            "tags": [],
            "due_date": null,
            "started_at": null,
            "completed_at": null,
            "is_overdue": false,
            "completion_percentage": 0.0,
            "comment_count": 0,
            "attachment_count": 0,
            "created_at": "2024-05-01T10:00:00Z",
            "updated_at": "2024-05-01T10:00:00Z"
        })
    }

    pub(crate) fn column_json(id: i64, board: i64, position: i32) -> Value {
        json!({
            "id": id,
            "board": board,
            "name": format!("Column {}", id),
            "position": position,
            "wip_limit": null,
            "color": "#cccccc",
            "card_count": 0,
            "is_wip_limit_reached": false,
            "created_at": "2024-05-01T10:00:00Z",
            "updated_at": "2024-05-01T10:00:00Z"
        })
    }

    struct FixedToken;

    #[async_trait]
    impl AccessTokenSource for FixedToken {
        async fn access_token(&self) -> Option<String> {
            Some("access-1".to_string())
        }
    }

    #[tokio::test]
    async fn test_list_boards_handles_pagination() {
        let mut transport = MockTransport::new();
        transport
            .expect_send()
            .withf(|req| req.method == Method::Get && req.path == "/api/kanban/boards/")
            .times(1)
            .returning(|_| {
                Ok(ApiResponse::ok(json!({
                    "results": [board_json(1, "A"), board_json(2, "B")],
                    "count": 2,
                    "next": null,
                    "previous": null
                })))
            });

        let api = KanbanApi::new(Arc::new(transport));
        let boards = api.list_boards().await.unwrap();
        assert_eq!(boards.len(), 2);
        assert_eq!(boards[1].name, "B");
    }

    #[tokio::test]
    async fn test_requests_carry_bearer_token() {
        let mut transport = MockTransport::new();
        transport
            .expect_send()
            .withf(|req| req.bearer.as_deref() == Some("access-1"))
            .times(1)
            .returning(|_| Ok(ApiResponse::ok(json!([]))));

        let api = KanbanApi::new(Arc::new(transport)).with_token_source(Arc::new(FixedToken));
        assert!(api.list_cards(None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_list_cards_filters_by_board() {
        let mut transport = MockTransport::new();
        transport
            .expect_send()
            .withf(|req| {
                req.path == "/api/kanban/cards/"
                    && req.query == vec![("board_id".to_string(), "7".to_string())]
            })
            .times(1)
            .returning(|_| Ok(ApiResponse::ok(json!([card_json(1, 3, 0)]))));

        let api = KanbanApi::new(Arc::new(transport));
        let cards = api.list_cards(Some(BoardId(7))).await.unwrap();
        assert_eq!(cards[0].column, ColumnId(3));
    }

    #[tokio::test]
    async fn test_move_card_body() {
        let mut transport = MockTransport::new();
        transport
            .expect_send()
            .withf(|req| {
                req.method == Method::Post
                    && req.path == "/api/kanban/cards/5/move/"
                    && req.body == Some(json!({ "target_column_id": 9, "position": 0 }))
            })
            .times(1)
            .returning(|_| Ok(ApiResponse::ok(card_json(5, 9, 0))));

        let api = KanbanApi::new(Arc::new(transport));
        let card = api
            .move_card(
                CardId(5),
                MoveRequest {
                    target_column_id: ColumnId(9),
                    position: 0,
                },
            )
            .await
            .unwrap();
        assert_eq!(card.column, ColumnId(9));
    }

    #[tokio::test]
    async fn test_refresh_keeps_refresh_token() {
        let mut transport = MockTransport::new();
        transport
            .expect_send()
            .withf(|req| {
                req.path == "/api/token/refresh/" && req.body == Some(json!({ "refresh": "r1" }))
            })
            .times(1)
            .returning(|_| Ok(ApiResponse::ok(json!({ "access": "a2" }))));

        let api = KanbanApi::new(Arc::new(transport));
        let tokens = api.refresh_token("r1").await.unwrap();
        assert_eq!(tokens.access, "a2");
        assert_eq!(tokens.refresh, "r1");
    }

    #[tokio::test]
    async fn test_get_board_404_maps_to_not_found() {
        let mut transport = MockTransport::new();
        transport.expect_send().times(1).returning(|_| {
            Err(TransportError::Rejected {
                status: 404,
                body: Some(json!({ "detail": "Not found." })),
            })
        });

        let api = KanbanApi::new(Arc::new(transport));
        let err = api.get_board(BoardId(42)).await.unwrap_err();
        assert!(matches!(err, KanbanError::BoardNotFound(id) if id == "42"));
    }

    #[tokio::test]
    async fn test_invalid_draft_sends_nothing() {
        let mut transport = MockTransport::new();
        transport.expect_send().times(0);

        let api = KanbanApi::new(Arc::new(transport));
        let err = api.create_board(&BoardDraft::new("")).await.unwrap_err();
        assert!(matches!(err, KanbanError::Validation(_)));
    }

    #[tokio::test]
    async fn test_delete_accepts_empty_response() {
        let mut transport = MockTransport::new();
        transport
            .expect_send()
            .withf(|req| req.method == Method::Delete && req.path == "/api/kanban/cards/3/")
            .times(1)
            .returning(|_| Ok(ApiResponse::no_content()));

        let api = KanbanApi::new(Arc::new(transport));
        api.delete_card(CardId(3)).await.unwrap();
    }

    #[tokio::test]
    async fn test_board_action_paths() {
        let mut transport = MockTransport::new();
        for action in ["archive", "unarchive"] {
            let path = format!("/api/kanban/boards/3/{}/", action);
            transport
                .expect_send()
                .withf(move |req| req.method == Method::Post && req.path == path)
                .times(1)
                .returning(|_| Ok(ApiResponse::no_content()));
        }
        transport
            .expect_send()
            .withf(|req| req.method == Method::Post && req.path == "/api/kanban/boards/3/duplicate/")
            .times(1)
            .returning(|_| Ok(ApiResponse::ok(board_json(8, "Rust (copy)"))));
        transport
            .expect_send()
            .withf(|req| req.method == Method::Get && req.path == "/api/kanban/boards/3/statistics/")
            .times(1)
            .returning(|_| Ok(ApiResponse::ok(json!({ "total_cards": 4, "completed": 1 }))));

        let api = KanbanApi::new(Arc::new(transport));
        api.archive_board(BoardId(3)).await.unwrap();
        api.unarchive_board(BoardId(3)).await.unwrap();
        assert_eq!(api.duplicate_board(BoardId(3)).await.unwrap().id, BoardId(8));
        let stats = api.board_statistics(BoardId(3)).await.unwrap();
        assert_eq!(stats["total_cards"], 4);
    }

    #[tokio::test]
    async fn test_update_board_sends_default_columns() {
        let mut transport = MockTransport::new();
        transport
            .expect_send()
            .withf(|req| {
                req.method == Method::Patch
                    && req.path == "/api/kanban/boards/3/"
                    && req.body == Some(json!({ "default_columns": ["To Do", "Done"] }))
            })
            .times(1)
            .returning(|_| {
                let mut board = board_json(3, "Rust");
                board["default_columns"] = json!(["To Do", "Done"]);
                Ok(ApiResponse::ok(board))
            });

        let api = KanbanApi::new(Arc::new(transport));
        let patch = BoardPatch {
            default_columns: Some(vec!["To Do".to_string(), "Done".to_string()]),
            ..Default::default()
        };
        let board = api.update_board(BoardId(3), &patch).await.unwrap();
        assert_eq!(
            board.default_columns,
            Some(vec!["To Do".to_string(), "Done".to_string()])
        );
    }

    #[tokio::test]
    async fn test_list_columns_filters_by_board() {
        let mut transport = MockTransport::new();
        transport
            .expect_send()
            .withf(|req| {
                req.method == Method::Get
                    && req.path == "/api/kanban/columns/"
                    && req.query == vec![("board".to_string(), "3".to_string())]
            })
            .times(1)
            .returning(|_| Ok(ApiResponse::ok(json!({ "results": [column_json(1, 3, 0)] }))));

        let api = KanbanApi::new(Arc::new(transport));
        let columns = api.list_columns(BoardId(3)).await.unwrap();
        assert_eq!(columns.len(), 1);
        assert_eq!(columns[0].board, BoardId(3));
    }

    #[tokio::test]
    async fn test_column_mutations() {
        let mut transport = MockTransport::new();
        transport
            .expect_send()
            .withf(|req| {
                req.method == Method::Post
                    && req.path == "/api/kanban/columns/"
                    && req.body
                        == Some(json!({ "board": 3, "name": "Review", "position": 2, "wip_limit": 3 }))
            })
            .times(1)
            .returning(|_| Ok(ApiResponse::ok(column_json(6, 3, 2))));
        transport
            .expect_send()
            .withf(|req| {
                req.method == Method::Patch
                    && req.path == "/api/kanban/columns/6/"
                    && req.body == Some(json!({ "name": "QA" }))
            })
            .times(1)
            .returning(|_| Ok(ApiResponse::ok(column_json(6, 3, 2))));
        transport
            .expect_send()
            .withf(|req| req.method == Method::Delete && req.path == "/api/kanban/columns/6/")
            .times(1)
            .returning(|_| Ok(ApiResponse::no_content()));

        let api = KanbanApi::new(Arc::new(transport));
        let mut draft = ColumnDraft::new(BoardId(3), "Review", 2);
        draft.wip_limit = Some(3);
        let column = api.create_column(&draft).await.unwrap();

        let patch = ColumnPatch {
            name: Some("QA".to_string()),
            ..Default::default()
        };
        api.update_column(column.id, &patch).await.unwrap();
        api.delete_column(column.id).await.unwrap();
    }
}
