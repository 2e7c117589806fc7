//! Error types for slot-engine operations.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PlannerError {
    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Failed to read config file: {0}")]
    ReadConfig(#[source] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ParseConfig(#[from] toml::de::Error),

    #[error("Event source error: {0}")]
    EventSource(String),

    #[error("Invalid recurrence rule: {0}")]
    InvalidRecurrence(String),

    #[error("Distance provider error: {0}")]
    Provider(String),
}

impl PlannerError {
    /// True for errors caused by the caller's input rather than a collaborator.
    ///
    /// Hosts use this to tell a bad request apart from an upstream failure.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            PlannerError::InvalidQuery(_)
                | PlannerError::InvalidConfig(_)
                | PlannerError::ParseConfig(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, PlannerError>;
