pub mod config;
pub mod dates;
pub mod events;
pub mod logging;
pub mod models;
pub mod state;
pub mod storage;

pub use config::AppConfig;
pub use events::StateChange;
pub use models::{Scheduled, Section, TaskSection, Todo};
pub use state::{InsertPosition, StateError, TodoListState};
pub use storage::{FileStore, KeyValueStore, MemoryStore, StorageError};
