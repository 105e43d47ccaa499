use thiserror::Error;

use crate::models::ValidationIssue;
use crate::planner::Failure;

#[derive(Debug, Error)]
pub enum PlannerError {
    #[error("Profile not found: {0}")]
    ProfileNotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Prompt error: {0}")]
    Prompt(#[from] dialoguer::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error(transparent)]
    Failure(#[from] Failure),

    #[error("Server error: {0}")]
    Server(String),
}

impl PlannerError {
    pub fn invalid(issues: &[ValidationIssue]) -> Self {
        PlannerError::InvalidInput(
            issues
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join("; "),
        )
    }
}

pub type Result<T> = std::result::Result<T, PlannerError>;
