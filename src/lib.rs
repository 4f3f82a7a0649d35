//! # Omni Kanban
//!
//! Client core for the Omni-Learner kanban board service.
//!
//! This crate provides the domain types, the REST transport, the persisted
//! authentication session, the route guard, and the drag-and-drop card move
//! protocol, without any dependency on a specific UI.

pub mod api;
pub mod app;
pub mod auth;
pub mod board_view;
pub mod cache;
pub mod config;
pub mod domain;
pub mod error;
pub mod logging;
pub mod routing;
pub mod session;
pub mod storage;
pub mod store;

// Re-export commonly used types
pub use api::{HttpTransport, KanbanApi};
pub use app::OmniClient;
pub use auth::{AuthFlow, LoginError, LoginFailure};
pub use board_view::{BoardView, DragController, DropOutcome, DropTarget};
pub use config::ClientConfig;
pub use domain::{
    Board, BoardFilter, BoardId, Card, CardId, CardLifecycle, Column, ColumnId,
    DeleteConfirmation, User,
};
pub use error::{KanbanError, Result};
pub use routing::{guard, Navigation};
pub use session::{Session, SessionService};
pub use storage::Storage;
pub use store::KanbanStore;
