use crate::domain::column::Column;
use crate::domain::user::UserId;
use crate::error::KanbanError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

server_id!(
    /// Server-assigned board identifier
    BoardId
);

/// Kind of board, fixed at creation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoardType {
    #[default]
    Personal,
    Project,
    Sprint,
}

impl BoardType {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Personal => "Personal Learning",
            Self::Project => "Project-based",
            Self::Sprint => "Sprint Planning",
        }
    }
}

impl fmt::Display for BoardType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Personal => write!(f, "personal"),
            Self::Project => write!(f, "project"),
            Self::Sprint => write!(f, "sprint"),
        }
    }
}

impl FromStr for BoardType {
    type Err = KanbanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "personal" => Ok(Self::Personal),
            "project" => Ok(Self::Project),
            "sprint" => Ok(Self::Sprint),
            _ => Err(KanbanError::Validation(format!(
                "Invalid board type '{}'. Valid types: personal, project, sprint",
                s
            ))),
        }
    }
}

/// A kanban board as returned by the API.
///
/// List responses omit `columns`; the detail response nests every column
/// together with its cards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Board {
    pub id: BoardId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub board_type: BoardType,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub is_archived: bool,
    pub owner: UserId,
    #[serde(default)]
    pub owner_email: String,
    #[serde(default)]
    pub column_count: u32,
    #[serde(default)]
    pub card_count: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub columns: Option<Vec<Column>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_columns: Option<Vec<String>>,
}

fn default_true() -> bool {
    true
}

impl Board {
    /// Columns of a detail response, empty for list entries
    pub fn columns(&self) -> &[Column] {
        self.columns.as_deref().unwrap_or_default()
    }
}

/// Payload for creating a board
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoardDraft {
    pub name: String,
    pub description: String,
    pub board_type: BoardType,
}

impl BoardDraft {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            board_type: BoardType::default(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_type(mut self, board_type: BoardType) -> Self {
        self.board_type = board_type;
        self
    }

    /// Form validation: a board needs a non-blank name
    pub fn validate(&self) -> Result<(), KanbanError> {
        if self.name.trim().is_empty() {
            return Err(KanbanError::Validation("Board name is required".to_string()));
        }
        Ok(())
    }
}

/// Partial board update, only set fields are sent
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BoardPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub board_type: Option<BoardType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_columns: Option<Vec<String>>,
}

impl BoardPatch {
    pub fn validate(&self) -> Result<(), KanbanError> {
        if let Some(name) = &self.name {
            if name.trim().is_empty() {
                return Err(KanbanError::Validation("Board name is required".to_string()));
            }
        }
        Ok(())
    }
}

/// Board settings editor for the column names created when a board is
/// duplicated
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DefaultColumns {
    names: Vec<String>,
}

impl DefaultColumns {
    pub fn for_board(board: &Board) -> Self {
        Self {
            names: board.default_columns.clone().unwrap_or_default(),
        }
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Appends the trimmed name; blank input is ignored
    pub fn add(&mut self, name: &str) -> bool {
        let name = name.trim();
        if name.is_empty() {
            return false;
        }
        self.names.push(name.to_string());
        true
    }

    /// Removes the entry at `index`, if there is one
    pub fn remove_at(&mut self, index: usize) -> Option<String> {
        if index < self.names.len() {
            Some(self.names.remove(index))
        } else {
            None
        }
    }

    /// Patch that replaces the board's default columns
    pub fn to_patch(&self) -> BoardPatch {
        BoardPatch {
            default_columns: Some(self.names.clone()),
            ..Default::default()
        }
    }
}

/// Board list filter: archived toggle plus a name search
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BoardFilter {
    pub show_archived: bool,
    pub search: String,
}

impl BoardFilter {
    pub fn new(show_archived: bool, search: impl Into<String>) -> Self {
        Self {
            show_archived,
            search: search.into(),
        }
    }

    /// A board is visible when its archived flag equals the toggle and its
    /// name contains the search text, ignoring case
    pub fn matches(&self, board: &Board) -> bool {
        board.is_archived == self.show_archived
            && board
                .name
                .to_lowercase()
                .contains(&self.search.to_lowercase())
    }

    pub fn apply<'a>(&self, boards: &'a [Board]) -> Vec<&'a Board> {
        boards.iter().filter(|b| self.matches(b)).collect()
    }
}

/// Typed confirmation gate for deleting a board.
///
/// The delete action is enabled only once the typed text equals the board
/// name exactly.
#[derive(Debug, Clone)]
pub struct DeleteConfirmation {
    board_id: BoardId,
    board_name: String,
    typed: String,
}

impl DeleteConfirmation {
    pub fn new(board: &Board) -> Self {
        Self {
            board_id: board.id,
            board_name: board.name.clone(),
            typed: String::new(),
        }
    }

    pub fn board_id(&self) -> BoardId {
        self.board_id
    }

    pub fn set_typed(&mut self, typed: impl Into<String>) {
        self.typed = typed.into();
    }

    pub fn is_confirmed(&self) -> bool {
        self.typed == self.board_name
    }

    /// Returns the board id when confirmed
    pub fn confirm(&self) -> Result<BoardId, KanbanError> {
        if self.is_confirmed() {
            Ok(self.board_id)
        } else {
            Err(KanbanError::Validation(format!(
                "Type '{}' to confirm deletion",
                self.board_name
            )))
        }
    }
}
