pub mod consultation;
pub mod history;
pub mod watcher;
