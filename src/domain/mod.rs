/// Declares a newtype around a server-assigned integer primary key
macro_rules! server_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord,
            serde::Serialize, serde::Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl $name {
            pub fn get(self) -> i64 {
                self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl std::str::FromStr for $name {
            type Err = crate::error::KanbanError;

            fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
                s.trim().parse::<i64>().map(Self).map_err(|_| {
                    crate::error::KanbanError::Validation(format!(
                        "Invalid {} '{}'",
                        stringify!($name),
                        s
                    ))
                })
            }
        }
    };
}

pub(crate) use server_id;

pub mod board;
pub mod card;
pub mod column;
pub mod decimal;
pub mod sorting;
pub mod user;

pub use board::{
    Board, BoardDraft, BoardFilter, BoardId, BoardPatch, BoardType, DefaultColumns,
    DeleteConfirmation,
};
pub use card::{Card, CardDraft, CardId, CardLifecycle, CardPatch, CardPriority, CardStatus};
pub use column::{Column, ColumnDraft, ColumnId, ColumnPatch};
pub use sorting::{sort_cards, SortField, SortOrder};
pub use user::{AuthTokens, LoginCredentials, User, UserId, UserPatch};
