//! Error types for the backend adapter and the planner.

use thiserror::Error;

/// Message shown when the backend failed without explaining why.
pub const GENERIC_FAILURE_MESSAGE: &str = "Errore di comunicazione con il server";

/// Failures talking to the optimizer backend.
#[derive(Error, Debug)]
pub enum BackendError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Backend rejected the request: {0}")]
    Rejected(String),

    #[error("Backend reported a failure")]
    Failed,

    #[error("Backend response carried no data")]
    MissingData,

    #[error("Invalid backend URL: {0}")]
    InvalidUrl(String),
}

/// Errors surfaced by the route planner.
#[derive(Error, Debug)]
pub enum PlannerError {
    #[error("Selection is empty")]
    EmptySelection,

    #[error("No route result available")]
    NoResult,

    #[error("Invalid priority: {0}")]
    InvalidPriority(String),

    #[error("Invalid parameters: {0}")]
    InvalidParameters(String),

    #[error("Response for request generation {generation} is stale")]
    StaleResponse { generation: u64 },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Backend(#[from] BackendError),
}

impl PlannerError {
    /// Text suitable for the user-visible error field.
    ///
    /// Backend failures show the backend's own message when it sent one and a
    /// generic communication failure otherwise.
    pub fn user_message(&self) -> String {
        match self {
            PlannerError::Backend(BackendError::Rejected(message)) => message.clone(),
            PlannerError::Backend(_) => GENERIC_FAILURE_MESSAGE.to_string(),
            other => other.to_string(),
        }
    }

    /// Errors raised locally, before any network call.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            PlannerError::EmptySelection
                | PlannerError::NoResult
                | PlannerError::InvalidPriority(_)
                | PlannerError::InvalidParameters(_)
        )
    }
}
