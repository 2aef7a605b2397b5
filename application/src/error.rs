//! Errors surfaced by the voting use cases

use crate::ports::decision_store::StoreError;
use tandem_domain::DomainError;
use thiserror::Error;

/// Errors that can occur while creating or voting on a decision
///
/// Nothing here is fatal to the process; each error is scoped to the one
/// decision the operation touched.
#[derive(Error, Debug)]
pub enum DecisionError {
    #[error(transparent)]
    Validation(#[from] DomainError),

    #[error("Storage error: {0}")]
    Storage(StoreError),

    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },
}

impl DecisionError {
    pub fn not_found(entity: &'static str, id: impl std::fmt::Display) -> Self {
        DecisionError::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, DecisionError::Validation(_))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, DecisionError::NotFound { .. })
    }
}

impl From<StoreError> for DecisionError {
    fn from(error: StoreError) -> Self {
        match error {
            StoreError::MissingRow { table, id } => DecisionError::NotFound { entity: table, id },
            StoreError::Rejected(reason) => DecisionError::Validation(reason),
            other => DecisionError::Storage(other),
        }
    }
}
