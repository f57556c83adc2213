use thiserror::Error;

use crate::domain::quote::{QuoteId, QuoteStatus};
use crate::repository::RepositoryError;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    #[error("invalid quote transition from `{from}` to `{to}`")]
    InvalidQuoteTransition { from: QuoteStatus, to: QuoteStatus },
    #[error("unknown quote status `{0}`")]
    UnknownQuoteStatus(String),
    #[error("unknown payment status `{0}`")]
    UnknownPaymentStatus(String),
    #[error("quote `{0}` was not found")]
    QuoteNotFound(QuoteId),
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ApplicationError {
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error("quote `{quote_id}` left status `{expected}` before the write landed")]
    Conflict { quote_id: QuoteId, expected: QuoteStatus },
    #[error("persistence failure: {0}")]
    Persistence(String),
    #[error("configuration failure: {0}")]
    Configuration(String),
}

impl From<RepositoryError> for ApplicationError {
    fn from(value: RepositoryError) -> Self {
        Self::Persistence(value.to_string())
    }
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum InterfaceError {
    #[error("bad request: {message}")]
    BadRequest { message: String, correlation_id: String },
    #[error("not permitted: {message}")]
    NotPermitted { message: String, correlation_id: String },
    #[error("not found: {message}")]
    NotFound { message: String, correlation_id: String },
    #[error("conflict: {message}")]
    Conflict { message: String, correlation_id: String },
    #[error("service unavailable: {message}")]
    ServiceUnavailable { message: String, correlation_id: String },
    #[error("internal error: {message}")]
    Internal { message: String, correlation_id: String },
}

impl InterfaceError {
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::BadRequest { .. } => {
                "The request could not be processed. Check inputs and try again."
            }
            Self::NotPermitted { .. } => {
                "This action is not permitted on a quote in its current status."
            }
            Self::NotFound { .. } => "The requested quote could not be found.",
            Self::Conflict { .. } => {
                "The quote was changed by someone else. Reload it and try again."
            }
            Self::ServiceUnavailable { .. } => {
                "The service is temporarily unavailable. Please retry shortly."
            }
            Self::Internal { .. } => "An unexpected internal error occurred.",
        }
    }

    pub fn correlation_id(&self) -> &str {
        match self {
            Self::BadRequest { correlation_id, .. }
            | Self::NotPermitted { correlation_id, .. }
            | Self::NotFound { correlation_id, .. }
            | Self::Conflict { correlation_id, .. }
            | Self::ServiceUnavailable { correlation_id, .. }
            | Self::Internal { correlation_id, .. } => correlation_id,
        }
    }
}

impl ApplicationError {
    pub fn into_interface(self, correlation_id: impl Into<String>) -> InterfaceError {
        let correlation_id = correlation_id.into();
        let mut mapped = InterfaceError::from(self);
        match &mut mapped {
            InterfaceError::BadRequest { correlation_id: id, .. }
            | InterfaceError::NotPermitted { correlation_id: id, .. }
            | InterfaceError::NotFound { correlation_id: id, .. }
            | InterfaceError::Conflict { correlation_id: id, .. }
            | InterfaceError::ServiceUnavailable { correlation_id: id, .. }
            | InterfaceError::Internal { correlation_id: id, .. } => *id = correlation_id,
        }
        mapped
    }
}

impl From<ApplicationError> for InterfaceError {
    fn from(value: ApplicationError) -> Self {
        let correlation_id = "unassigned".to_owned();
        let message = value.to_string();
        match value {
            ApplicationError::Domain(DomainError::InvalidQuoteTransition { .. }) => {
                Self::NotPermitted { message, correlation_id }
            }
            ApplicationError::Domain(DomainError::QuoteNotFound(_)) => {
                Self::NotFound { message, correlation_id }
            }
            ApplicationError::Domain(DomainError::UnknownQuoteStatus(_))
            | ApplicationError::Domain(DomainError::UnknownPaymentStatus(_)) => {
                Self::BadRequest { message, correlation_id }
            }
            ApplicationError::Conflict { .. } => Self::Conflict { message, correlation_id },
            ApplicationError::Persistence(_) => {
                Self::ServiceUnavailable { message, correlation_id }
            }
            ApplicationError::Configuration(_) => Self::Internal { message, correlation_id },
        }
    }
}
