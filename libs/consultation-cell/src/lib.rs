pub mod error;
pub mod models;
pub mod services;

pub use error::ConsultationError;
pub use models::*;
pub use services::consultation::{ConsultationSession, PollContext};
pub use services::history::HistoryService;
pub use services::watcher::QueueWatcher;
