pub mod audit;
pub mod config;
pub mod domain;
pub mod errors;
pub mod lifecycle;
pub mod repository;

pub use audit::{AuditContext, AuditEvent, AuditSink, InMemoryAuditSink};
pub use domain::payment::PaymentStatus;
pub use domain::quote::{Quote, QuoteId, QuoteStatus, StatusTone};
pub use errors::{ApplicationError, DomainError, InterfaceError};
pub use lifecycle::{
    can_receive_actions, is_locked, is_quote_actionable, is_valid_transition,
    next_automatic_status, valid_transitions, StatusGate, TransitionContext, TransitionRecord,
    TransitionTrigger,
};
pub use repository::{InMemoryQuoteRepository, QuoteRepository, RepositoryError, StatusUpdate};
