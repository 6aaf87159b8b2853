use thiserror::Error;

use shared_models::ApiError;

use crate::models::QueueTab;

#[derive(Error, Debug)]
pub enum ConsultationError {
    #[error("validation error: {0}")]
    Validation(String),

    #[error("{0}")]
    PatientNotFound(String),

    #[error("a consultation is already in progress")]
    Busy,

    #[error("no waiting patients in the {tab} queue")]
    QueueEmpty { tab: QueueTab },

    #[error("not currently in a consultation")]
    NoActiveConsultation,

    /// The two-call commit did not fully land. The flags say which half was
    /// acknowledged; the retained draft lets a retry re-issue the rest.
    #[error("commit failed: {message}")]
    CommitFailed {
        record_saved: bool,
        status_updated: bool,
        message: String,
    },

    #[error(transparent)]
    Api(#[from] ApiError),
}
