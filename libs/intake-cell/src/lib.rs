pub mod error;
pub mod models;
pub mod services;

pub use error::IntakeError;
pub use models::*;
pub use services::intake::IntakeService;
pub use services::roster::RosterService;
