use thiserror::Error;

use shared_models::ApiError;

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("validation error: {0}")]
    Validation(String),

    #[error("{0}")]
    AuthFailed(String),

    #[error("no active session")]
    NotLoggedIn,

    #[error(transparent)]
    Api(#[from] ApiError),
}
