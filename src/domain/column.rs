use crate::domain::board::BoardId;
use crate::domain::card::Card;
use crate::error::KanbanError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

server_id!(
    /// Server-assigned column identifier
    ColumnId
);

/// An ordered lane within a board
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub id: ColumnId,
    pub board: BoardId,
    pub name: String,
    pub position: i32,
    #[serde(default)]
    pub wip_limit: Option<u32>,
    #[serde(default)]
    pub color: String,
    #[serde(default)]
    pub card_count: u32,
    #[serde(default)]
    pub is_wip_limit_reached: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cards: Option<Vec<Card>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Column {
    /// Whether `card_count` cards fill this column up to its WIP limit
    pub fn wip_reached_with(&self, card_count: usize) -> bool {
        match self.wip_limit {
            Some(limit) => card_count >= limit as usize,
            None => false,
        }
    }

    /// Nested cards of a detail response
    pub fn cards(&self) -> &[Card] {
        self.cards.as_deref().unwrap_or_default()
    }
}

/// Payload for creating a column
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnDraft {
    pub board: BoardId,
    pub name: String,
    pub position: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wip_limit: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl ColumnDraft {
    pub fn new(board: BoardId, name: impl Into<String>, position: i32) -> Self {
        Self {
            board,
            name: name.into(),
            position,
            wip_limit: None,
            color: None,
        }
    }

    pub fn validate(&self) -> Result<(), KanbanError> {
        if self.name.trim().is_empty() {
            return Err(KanbanError::Validation("Column name is required".to_string()));
        }
        if self.position < 0 {
            return Err(KanbanError::Validation(format!(
                "Column position must be non-negative, got {}",
                self.position
            )));
        }
        Ok(())
    }
}

/// Partial column update
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ColumnPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wip_limit: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}
