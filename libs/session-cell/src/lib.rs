pub mod context;
pub mod error;
pub mod models;
pub mod services;

pub use context::SessionContext;
pub use error::SessionError;
pub use models::*;
pub use services::session::SessionService;
