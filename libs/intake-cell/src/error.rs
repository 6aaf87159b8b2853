use thiserror::Error;

use shared_models::ApiError;

#[derive(Error, Debug)]
pub enum IntakeError {
    #[error("validation error: {0}")]
    Validation(String),

    #[error(transparent)]
    Api(#[from] ApiError),
}
