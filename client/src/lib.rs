//! Client-side core of TaskFlow: the optimistic task store and the kanban
//! drag controller, both driven through a [`TaskRepository`].

pub mod error;
pub mod kanban;
pub mod repository;
pub mod store;

pub use error::{RepositoryError, StoreError};
pub use kanban::{Column, DragState, DropOutcome, KanbanDrag};
pub use repository::TaskRepository;
pub use store::{PendingSync, TaskStore};

pub use taskflow_shared as model;
