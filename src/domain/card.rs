use crate::domain::column::ColumnId;
use crate::domain::user::UserId;
use crate::error::KanbanError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

server_id!(
    /// Server-assigned card identifier
    CardId
);

/// Card priority, chosen by the user
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CardPriority {
    Low,
    #[default]
    Medium,
    High,
    Urgent,
}

impl CardPriority {
    /// Rank used for ordering, higher is more pressing
    pub fn rank(&self) -> u8 {
        match self {
            Self::Low => 0,
            Self::Medium => 1,
            Self::High => 2,
            Self::Urgent => 3,
        }
    }
}

impl fmt::Display for CardPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Low => write!(f, "low"),
            Self::Medium => write!(f, "medium"),
            Self::High => write!(f, "high"),
            Self::Urgent => write!(f, "urgent"),
        }
    }
}

impl FromStr for CardPriority {
    type Err = KanbanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            "urgent" => Ok(Self::Urgent),
            _ => Err(KanbanError::Validation(format!(
                "Invalid priority '{}'. Valid priorities: low, medium, high, urgent",
                s
            ))),
        }
    }
}

/// Presentation urgency computed by the server. Read-only on the client.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CardStatus {
    #[default]
    Normal,
    AtRisk,
    Blocked,
    Overdue,
}

impl fmt::Display for CardStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Normal => write!(f, "Normal"),
            Self::AtRisk => write!(f, "At Risk"),
            Self::Blocked => write!(f, "Blocked"),
            Self::Overdue => write!(f, "Overdue"),
        }
    }
}

/// Work progress of a card, derived from its start/completion timestamps
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardLifecycle {
    NotStarted,
    InProgress,
    Completed,
}

impl fmt::Display for CardLifecycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotStarted => write!(f, "Not Started"),
            Self::InProgress => write!(f, "In Progress"),
            Self::Completed => write!(f, "Completed"),
        }
    }
}

impl CardLifecycle {
    /// Checks if a lifecycle transition is valid
    pub fn can_transition_to(&self, target: &CardLifecycle) -> bool {
        match (self, target) {
            (Self::NotStarted, Self::InProgress) => true,
            (Self::InProgress, Self::Completed) => true,

            // A card must be started before it can be completed.
            // Completed is terminal; no reopen, no cancel
            _ => false,
        }
    }
}

/// A kanban card as returned by the API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Card {
    pub id: CardId,
    pub column: ColumnId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub assigned_to: Option<UserId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_to_email: Option<String>,
    pub position: i32,
    #[serde(deserialize_with = "super::decimal::deserialize")]
    pub estimated_hours: f64,
    #[serde(deserialize_with = "super::decimal::deserialize")]
    pub actual_hours: f64,
    #[serde(default)]
    pub priority: CardPriority,
    #[serde(default)]
    pub status: CardStatus,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub due_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub is_overdue: bool,
    #[serde(default)]
    pub completion_percentage: f64,
    #[serde(default)]
    pub comment_count: u32,
    #[serde(default)]
    pub attachment_count: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Card {
    pub fn lifecycle(&self) -> CardLifecycle {
        match (self.started_at, self.completed_at) {
            (_, Some(_)) => CardLifecycle::Completed,
            (Some(_), None) => CardLifecycle::InProgress,
            (None, None) => CardLifecycle::NotStarted,
        }
    }

    /// Validates a lifecycle transition before asking the server for it
    pub fn check_transition(&self, target: CardLifecycle) -> Result<(), KanbanError> {
        let current = self.lifecycle();
        if !current.can_transition_to(&target) {
            return Err(KanbanError::InvalidLifecycleTransition {
                from: current.to_string(),
                to: target.to_string(),
            });
        }
        Ok(())
    }
}

/// Splits a comma-separated tag string, trimming each entry
pub fn parse_tags(input: &str) -> Vec<String> {
    if input.is_empty() {
        return Vec::new();
    }
    input.split(',').map(|t| t.trim().to_string()).collect()
}

/// Payload for creating a card in a column
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CardDraft {
    pub column: ColumnId,
    pub title: String,
    pub description: String,
    pub priority: CardPriority,
    pub estimated_hours: f64,
    pub tags: Vec<String>,
    pub due_date: Option<DateTime<Utc>>,
}

impl CardDraft {
    pub fn new(column: ColumnId, title: impl Into<String>) -> Self {
        Self {
            column,
            title: title.into(),
            description: String::new(),
            priority: CardPriority::default(),
            estimated_hours: 1.0,
            tags: Vec::new(),
            due_date: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_priority(mut self, priority: CardPriority) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_estimated_hours(mut self, hours: f64) -> Self {
        self.estimated_hours = hours;
        self
    }

    /// Sets tags from the comma-separated form input
    pub fn with_tag_input(mut self, input: &str) -> Self {
        self.tags = parse_tags(input);
        self
    }

    /// Sets the due date from the form input, blank meaning none
    pub fn with_due_date_input(mut self, input: &str) -> Result<Self, KanbanError> {
        self.due_date = parse_due_date(input)?;
        Ok(self)
    }

    pub fn validate(&self) -> Result<(), KanbanError> {
        if self.title.trim().is_empty() {
            return Err(KanbanError::Validation("Card title is required".to_string()));
        }
        if self.estimated_hours < 0.0 {
            return Err(KanbanError::Validation(
                "Estimated hours must be non-negative".to_string(),
            ));
        }
        Ok(())
    }
}

/// Parses an RFC 3339 timestamp or a bare `YYYY-MM-DD` date (midnight UTC)
pub fn parse_due_date(input: &str) -> Result<Option<DateTime<Utc>>, KanbanError> {
    let input = input.trim();
    if input.is_empty() {
        return Ok(None);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Ok(Some(dt.with_timezone(&Utc)));
    }
    chrono::NaiveDate::parse_from_str(input, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| Some(naive.and_utc()))
        .ok_or_else(|| KanbanError::Validation(format!("Invalid due date '{}'", input)))
}

/// Partial card update. Server-derived fields (`status`, `is_overdue`) cannot
/// be sent.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CardPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<CardPriority>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estimated_hours: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actual_hours: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<UserId>,
}

impl CardPatch {
    pub fn validate(&self) -> Result<(), KanbanError> {
        if let Some(title) = &self.title {
            if title.trim().is_empty() {
                return Err(KanbanError::Validation("Card title is required".to_string()));
            }
        }
        Ok(())
    }
}
