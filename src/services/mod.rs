//! Services orchestrating the calendar and session list workflows.

use thiserror::Error;

use crate::forms::FormError;
use crate::repository::errors::RepositoryError;

pub mod calendar;
pub mod session_list;
pub mod sessions;
pub mod transcriptions;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error("form error: {0}")]
    Form(#[from] FormError),

    /// Operation requested while the view is not in the state it needs.
    #[error("invalid state: {0}")]
    InvalidState(&'static str),
}

pub type ServiceResult<T> = Result<T, ServiceError>;

impl ServiceError {
    /// One-line message suitable for showing to the clinician.
    pub fn user_message(&self) -> String {
        match self {
            ServiceError::Repository(err) => err.user_message(),
            ServiceError::Form(err) => err.user_message(),
            ServiceError::InvalidState(_) => "Acción no disponible en este momento.".to_string(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ServiceError::Repository(err) if err.is_not_found())
    }
}
