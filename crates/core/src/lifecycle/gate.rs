use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::audit::{AuditCategory, AuditContext, AuditEvent, AuditOutcome, AuditSink};
use crate::domain::quote::{Quote, QuoteId, QuoteStatus};
use crate::errors::{ApplicationError, DomainError};
use crate::lifecycle::transitions::{is_valid_transition, next_automatic_status, TransitionContext};
use crate::repository::{QuoteRepository, StatusUpdate};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionTrigger {
    Requested,
    Automatic,
}

impl TransitionTrigger {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Requested => "requested",
            Self::Automatic => "automatic",
        }
    }

    fn event_type(self) -> &'static str {
        match self {
            Self::Requested => "quote.status_changed",
            Self::Automatic => "quote.status_auto_advanced",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionRecord {
    pub quote_id: QuoteId,
    pub from: QuoteStatus,
    pub to: QuoteStatus,
    pub trigger: TransitionTrigger,
    pub applied_at: DateTime<Utc>,
}

/// Server-side gate for quote status writes.
///
/// Reads the current status, checks the move against the transition table
/// and persists it with a conditional update, auditing every attempt.
pub struct StatusGate<R, S> {
    repository: R,
    sink: S,
}

impl<R, S> StatusGate<R, S>
where
    R: QuoteRepository,
    S: AuditSink,
{
    pub fn new(repository: R, sink: S) -> Self {
        Self { repository, sink }
    }

    pub fn repository(&self) -> &R {
        &self.repository
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub async fn request_transition(
        &self,
        id: &QuoteId,
        next: QuoteStatus,
        audit: &AuditContext,
    ) -> Result<TransitionRecord, ApplicationError> {
        let quote = self.load(id, audit).await?;
        self.validate_and_commit(id, quote.status, next, TransitionTrigger::Requested, audit).await
    }

    /// Applies the automatic status that follows from `context`, if any.
    ///
    /// The suggestion is checked against the transition table like any other
    /// write. `receiving -> under_review` is not listed there, so that
    /// suggestion is refused and the quote keeps its status.
    pub async fn apply_automatic(
        &self,
        id: &QuoteId,
        context: &TransitionContext,
        audit: &AuditContext,
    ) -> Result<Option<TransitionRecord>, ApplicationError> {
        let quote = self.load(id, audit).await?;
        let Some(next) = next_automatic_status(quote.status, Some(context)) else {
            return Ok(None);
        };

        self.validate_and_commit(id, quote.status, next, TransitionTrigger::Automatic, audit)
            .await
            .map(Some)
    }

    async fn validate_and_commit(
        &self,
        id: &QuoteId,
        from: QuoteStatus,
        next: QuoteStatus,
        trigger: TransitionTrigger,
        audit: &AuditContext,
    ) -> Result<TransitionRecord, ApplicationError> {
        if !is_valid_transition(from, next) {
            let error = DomainError::InvalidQuoteTransition { from, to: next };
            warn!(
                event_name = "quote.status_rejected",
                quote_id = %id,
                correlation_id = %audit.correlation_id,
                from = %from,
                to = %next,
                trigger = trigger.as_str(),
                "status change not permitted from current status"
            );
            self.sink.emit(
                AuditEvent::new(
                    Some(id.clone()),
                    audit,
                    "quote.status_rejected",
                    AuditCategory::Lifecycle,
                    AuditOutcome::Rejected,
                )
                .with_metadata("from", from.as_str())
                .with_metadata("to", next.as_str())
                .with_metadata("trigger", trigger.as_str())
                .with_metadata("error", error.to_string()),
            );
            return Err(error.into());
        }

        self.commit(id, from, next, trigger, audit).await
    }

    async fn load(&self, id: &QuoteId, audit: &AuditContext) -> Result<Quote, ApplicationError> {
        match self.repository.find_by_id(id).await {
            Ok(Some(quote)) => Ok(quote),
            Ok(None) => Err(DomainError::QuoteNotFound(id.clone()).into()),
            Err(error) => {
                self.emit_failure(id, audit, "quote.status_read_failed", error.to_string());
                Err(error.into())
            }
        }
    }

    async fn commit(
        &self,
        id: &QuoteId,
        from: QuoteStatus,
        to: QuoteStatus,
        trigger: TransitionTrigger,
        audit: &AuditContext,
    ) -> Result<TransitionRecord, ApplicationError> {
        match self.repository.update_status_if(id, from, to).await {
            Ok(StatusUpdate::Applied) => {
                info!(
                    event_name = trigger.event_type(),
                    quote_id = %id,
                    correlation_id = %audit.correlation_id,
                    from = %from,
                    to = %to,
                    "quote status persisted"
                );
                self.sink.emit(
                    AuditEvent::new(
                        Some(id.clone()),
                        audit,
                        trigger.event_type(),
                        AuditCategory::Lifecycle,
                        AuditOutcome::Success,
                    )
                    .with_metadata("from", from.as_str())
                    .with_metadata("to", to.as_str()),
                );
                Ok(TransitionRecord {
                    quote_id: id.clone(),
                    from,
                    to,
                    trigger,
                    applied_at: Utc::now(),
                })
            }
            Ok(StatusUpdate::Stale { actual }) => {
                warn!(
                    event_name = "quote.status_conflict",
                    quote_id = %id,
                    correlation_id = %audit.correlation_id,
                    expected = %from,
                    actual = %actual,
                    to = %to,
                    "quote status changed before the write landed"
                );
                self.emit_failure(
                    id,
                    audit,
                    "quote.status_conflict",
                    format!("expected `{from}` but found `{actual}` before moving to `{to}`"),
                );
                Err(ApplicationError::Conflict { quote_id: id.clone(), expected: from })
            }
            Ok(StatusUpdate::Missing) => {
                let error = DomainError::QuoteNotFound(id.clone());
                warn!(
                    event_name = "quote.status_write_failed",
                    quote_id = %id,
                    correlation_id = %audit.correlation_id,
                    to = %to,
                    "quote disappeared before the write landed"
                );
                self.emit_failure(id, audit, "quote.status_write_failed", error.to_string());
                Err(error.into())
            }
            Err(error) => {
                self.emit_failure(id, audit, "quote.status_write_failed", error.to_string());
                Err(error.into())
            }
        }
    }

    fn emit_failure(&self, id: &QuoteId, audit: &AuditContext, event_type: &str, error: String) {
        self.sink.emit(
            AuditEvent::new(
                Some(id.clone()),
                audit,
                event_type,
                AuditCategory::Persistence,
                AuditOutcome::Failed,
            )
            .with_metadata("error", error),
        );
    }
}

#[cfg(test)]
mod tests {
    use crate::audit::{AuditContext, AuditOutcome, InMemoryAuditSink};
    use crate::domain::quote::{Quote, QuoteId, QuoteStatus};
    use crate::errors::{ApplicationError, DomainError};
    use crate::lifecycle::transitions::TransitionContext;
    use crate::repository::{InMemoryQuoteRepository, QuoteRepository, StatusUpdate};

    use super::{StatusGate, TransitionTrigger};

    async fn gate_with_quote(
        id: &QuoteId,
        status: QuoteStatus,
    ) -> StatusGate<InMemoryQuoteRepository, InMemoryAuditSink> {
        let repository = InMemoryQuoteRepository::default();
        repository
            .insert(Quote { status, ..Quote::new(id.clone()) })
            .await
            .expect("seed quote");
        StatusGate::new(repository, InMemoryAuditSink::default())
    }

    fn audit() -> AuditContext {
        AuditContext::new("req-77", "status-gate-test")
    }

    async fn stored_status(
        gate: &StatusGate<InMemoryQuoteRepository, InMemoryAuditSink>,
        id: &QuoteId,
    ) -> QuoteStatus {
        gate.repository().find_by_id(id).await.expect("find").expect("quote exists").status
    }

    #[tokio::test]
    async fn legal_transition_is_persisted_and_audited() {
        let id = QuoteId("Q-2026-0200".to_owned());
        let gate = gate_with_quote(&id, QuoteStatus::Draft).await;

        let record =
            gate.request_transition(&id, QuoteStatus::Sent, &audit()).await.expect("draft -> sent");

        assert_eq!(record.from, QuoteStatus::Draft);
        assert_eq!(record.to, QuoteStatus::Sent);
        assert_eq!(record.trigger, TransitionTrigger::Requested);
        assert_eq!(stored_status(&gate, &id).await, QuoteStatus::Sent);

        let events = gate.sink().events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].event_type, "quote.status_changed");
        assert_eq!(events[0].correlation_id, "req-77");
        assert_eq!(events[0].outcome, AuditOutcome::Success);
    }

    #[tokio::test]
    async fn illegal_transition_is_rejected_without_writing() {
        let id = QuoteId("Q-2026-0201".to_owned());
        let gate = gate_with_quote(&id, QuoteStatus::Draft).await;

        let error = gate
            .request_transition(&id, QuoteStatus::Receiving, &audit())
            .await
            .expect_err("draft -> receiving is not allowed");

        assert_eq!(
            error,
            ApplicationError::Domain(DomainError::InvalidQuoteTransition {
                from: QuoteStatus::Draft,
                to: QuoteStatus::Receiving,
            })
        );
        assert_eq!(stored_status(&gate, &id).await, QuoteStatus::Draft);

        let events = gate.sink().events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].event_type, "quote.status_rejected");
        assert_eq!(events[0].outcome, AuditOutcome::Rejected);
    }

    #[tokio::test]
    async fn unknown_quote_is_reported() {
        let gate = StatusGate::new(InMemoryQuoteRepository::default(), InMemoryAuditSink::default());
        let id = QuoteId("Q-missing".to_owned());

        let error = gate
            .request_transition(&id, QuoteStatus::Sent, &audit())
            .await
            .expect_err("quote does not exist");

        assert_eq!(error, ApplicationError::Domain(DomainError::QuoteNotFound(id)));
    }

    #[tokio::test]
    async fn automatic_review_needs_all_proposals() {
        let id = QuoteId("Q-2026-0202".to_owned());
        let gate = gate_with_quote(&id, QuoteStatus::Receiving).await;

        let skipped = gate
            .apply_automatic(&id, &TransitionContext::default(), &audit())
            .await
            .expect("no automatic move");
        assert!(skipped.is_none());
        assert_eq!(stored_status(&gate, &id).await, QuoteStatus::Receiving);

        assert!(gate.sink().events().is_empty());
    }

    #[tokio::test]
    async fn automatic_review_is_checked_against_the_table() {
        let id = QuoteId("Q-2026-0205".to_owned());
        let gate = gate_with_quote(&id, QuoteStatus::Receiving).await;

        let error = gate
            .apply_automatic(&id, &TransitionContext { all_proposals_received: true }, &audit())
            .await
            .expect_err("receiving -> under_review is not in the table");

        assert_eq!(
            error,
            ApplicationError::Domain(DomainError::InvalidQuoteTransition {
                from: QuoteStatus::Receiving,
                to: QuoteStatus::UnderReview,
            })
        );
        assert_eq!(stored_status(&gate, &id).await, QuoteStatus::Receiving);

        let events = gate.sink().events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].event_type, "quote.status_rejected");
        assert_eq!(events[0].outcome, AuditOutcome::Rejected);
        assert_eq!(
            events[0].metadata.get("trigger").map(String::as_str),
            Some(TransitionTrigger::Automatic.as_str())
        );

        let record = gate
            .request_transition(&id, QuoteStatus::Received, &audit())
            .await
            .expect("receiving -> received is still open");
        assert_eq!(record.trigger, TransitionTrigger::Requested);
    }

    #[tokio::test]
    async fn automatic_move_is_a_noop_outside_receiving() {
        let id = QuoteId("Q-2026-0203".to_owned());
        let gate = gate_with_quote(&id, QuoteStatus::Approved).await;

        let result = gate
            .apply_automatic(&id, &TransitionContext { all_proposals_received: true }, &audit())
            .await
            .expect("no automatic move");

        assert!(result.is_none());
        assert!(gate.sink().events().is_empty());
    }

    #[tokio::test]
    async fn quote_removed_before_the_write_is_not_found() {
        let id = QuoteId("Q-2026-0206".to_owned());
        let repository = ConcurrentWriter::new(&id, QuoteStatus::Draft, None).await;
        let gate = StatusGate::new(repository, InMemoryAuditSink::default());

        let error = gate
            .request_transition(&id, QuoteStatus::Sent, &audit())
            .await
            .expect_err("quote was removed underneath the gate");

        assert_eq!(error, ApplicationError::Domain(DomainError::QuoteNotFound(id)));
        let events = gate.sink().events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].event_type, "quote.status_write_failed");
        assert_eq!(events[0].outcome, AuditOutcome::Failed);
    }

    #[tokio::test]
    async fn concurrent_change_surfaces_as_conflict() {
        let id = QuoteId("Q-2026-0204".to_owned());
        let repository =
            ConcurrentWriter::new(&id, QuoteStatus::Received, Some(QuoteStatus::Rejected)).await;
        let gate = StatusGate::new(repository, InMemoryAuditSink::default());

        let error = gate
            .request_transition(&id, QuoteStatus::Approved, &audit())
            .await
            .expect_err("status moved underneath the gate");

        assert_eq!(
            error,
            ApplicationError::Conflict { quote_id: id.clone(), expected: QuoteStatus::Received }
        );
        let events = gate.sink().events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].event_type, "quote.status_conflict");
        assert_eq!(events[0].outcome, AuditOutcome::Failed);
    }

    /// Changes the quote between the gate's read and its conditional write:
    /// forces `interleaved` when set, otherwise removes the quote.
    struct ConcurrentWriter {
        inner: InMemoryQuoteRepository,
        interleaved: Option<QuoteStatus>,
    }

    impl ConcurrentWriter {
        async fn new(
            id: &QuoteId,
            status: QuoteStatus,
            interleaved: Option<QuoteStatus>,
        ) -> Self {
            let inner = InMemoryQuoteRepository::default();
            inner.insert(Quote { status, ..Quote::new(id.clone()) }).await.expect("seed quote");
            Self { inner, interleaved }
        }
    }

    #[async_trait::async_trait]
    impl QuoteRepository for ConcurrentWriter {
        async fn find_by_id(
            &self,
            id: &QuoteId,
        ) -> Result<Option<Quote>, crate::repository::RepositoryError> {
            let quote = self.inner.find_by_id(id).await?;
            match self.interleaved {
                Some(status) => self.inner.force_status(id, status),
                None => {
                    self.inner.remove(id);
                }
            }
            Ok(quote)
        }

        async fn insert(&self, quote: Quote) -> Result<(), crate::repository::RepositoryError> {
            self.inner.insert(quote).await
        }

        async fn update_status_if(
            &self,
            id: &QuoteId,
            expected: QuoteStatus,
            next: QuoteStatus,
        ) -> Result<StatusUpdate, crate::repository::RepositoryError> {
            self.inner.update_status_if(id, expected, next).await
        }
    }
}
