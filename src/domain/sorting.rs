use crate::domain::card::Card;
use crate::error::KanbanError;
use chrono::{DateTime, Utc};
use std::cmp::Ordering;
use std::str::FromStr;

/// Fields available for sorting cards
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    Position,
    Title,
    Priority,
    Created,
    Updated,
    Due,
    Started,
    Completion,
}

/// Sort order direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Ascending,
    Descending,
}

impl FromStr for SortField {
    type Err = KanbanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "position" => Ok(SortField::Position),
            "title" => Ok(SortField::Title),
            "priority" => Ok(SortField::Priority),
            "created" => Ok(SortField::Created),
            "updated" => Ok(SortField::Updated),
            "due" => Ok(SortField::Due),
            "started" => Ok(SortField::Started),
            "completion" => Ok(SortField::Completion),
            _ => Err(KanbanError::Validation(format!(
                "Invalid sort field '{}'. Valid fields: position, title, priority, created, updated, due, started, completion",
                s
            ))),
        }
    }
}

impl FromStr for SortOrder {
    type Err = KanbanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "asc" => Ok(SortOrder::Ascending),
            "desc" => Ok(SortOrder::Descending),
            _ => Err(KanbanError::Validation(format!(
                "Invalid sort order '{}'. Valid orders: asc, desc",
                s
            ))),
        }
    }
}

/// Sorts cards in place by the given field and direction.
///
/// The sort is stable, so cards that compare equal keep their relative
/// order. Missing dates always sort last, whatever the direction.
///
/// # Examples
/// ```
/// use omni_kanban::domain::sorting::{sort_cards, SortField, SortOrder};
///
/// let mut cards: Vec<omni_kanban::Card> = Vec::new();
/// sort_cards(&mut cards, SortField::Position, SortOrder::Ascending);
/// assert!(cards.is_empty());
/// ```
pub fn sort_cards(cards: &mut [Card], field: SortField, order: SortOrder) {
    cards.sort_by(|a, b| {
        let cmp = match field {
            SortField::Position => a.position.cmp(&b.position),
            SortField::Title => a.title.to_lowercase().cmp(&b.title.to_lowercase()),
            SortField::Priority => a.priority.rank().cmp(&b.priority.rank()),
            SortField::Created => a.created_at.cmp(&b.created_at),
            SortField::Updated => a.updated_at.cmp(&b.updated_at),
            SortField::Due => return compare_option_dates(a.due_date, b.due_date, order),
            SortField::Started => {
                return compare_option_dates(a.started_at, b.started_at, order)
            }
            SortField::Completion => a
                .completion_percentage
                .partial_cmp(&b.completion_percentage)
                .unwrap_or(Ordering::Equal),
        };

        match order {
            SortOrder::Ascending => cmp,
            SortOrder::Descending => cmp.reverse(),
        }
    });
}

/// Orders cards top-to-bottom as they appear in a column
pub fn sort_by_position(cards: &mut [Card]) {
    sort_cards(cards, SortField::Position, SortOrder::Ascending);
}

/// Compare Option<DateTime> with None always sorting to the end
fn compare_option_dates(
    a: Option<DateTime<Utc>>,
    b: Option<DateTime<Utc>>,
    order: SortOrder,
) -> Ordering {
    match (a, b) {
        (Some(a_date), Some(b_date)) => match order {
            SortOrder::Ascending => a_date.cmp(&b_date),
            SortOrder::Descending => b_date.cmp(&a_date),
        },
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
