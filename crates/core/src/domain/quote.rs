use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::payment::PaymentStatus;
use crate::errors::DomainError;
use crate::lifecycle::{is_quote_actionable, is_valid_transition};

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QuoteId(pub String);

impl fmt::Display for QuoteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Lifecycle status of a quote, from the first draft to a final outcome.
///
/// The set is closed: persisted values that do not parse into one of these
/// variants are rejected at the boundary.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuoteStatus {
    Draft,
    Sent,
    AwaitingVisit,
    VisitScheduled,
    VisitConfirmed,
    VisitOverdue,
    VisitPartialScheduled,
    VisitPartialConfirmed,
    Receiving,
    /// Supplier proposals have arrived. Not a payment state.
    Received,
    AiAnalyzing,
    AiNegotiating,
    AwaitingAiApproval,
    UnderReview,
    PendingApproval,
    Approved,
    Rejected,
    Finalized,
    Cancelled,
    Trash,
}

/// Badge tone a UI uses when rendering a status.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusTone {
    Neutral,
    Info,
    Progress,
    Warning,
    Success,
    Danger,
    Muted,
}

impl QuoteStatus {
    pub const ALL: [QuoteStatus; 20] = [
        Self::Draft,
        Self::Sent,
        Self::AwaitingVisit,
        Self::VisitScheduled,
        Self::VisitConfirmed,
        Self::VisitOverdue,
        Self::VisitPartialScheduled,
        Self::VisitPartialConfirmed,
        Self::Receiving,
        Self::Received,
        Self::AiAnalyzing,
        Self::AiNegotiating,
        Self::AwaitingAiApproval,
        Self::UnderReview,
        Self::PendingApproval,
        Self::Approved,
        Self::Rejected,
        Self::Finalized,
        Self::Cancelled,
        Self::Trash,
    ];

    /// Wire name used for persistence and API payloads.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Sent => "sent",
            Self::AwaitingVisit => "awaiting_visit",
            Self::VisitScheduled => "visit_scheduled",
            Self::VisitConfirmed => "visit_confirmed",
            Self::VisitOverdue => "visit_overdue",
            Self::VisitPartialScheduled => "visit_partial_scheduled",
            Self::VisitPartialConfirmed => "visit_partial_confirmed",
            Self::Receiving => "receiving",
            Self::Received => "received",
            Self::AiAnalyzing => "ai_analyzing",
            Self::AiNegotiating => "ai_negotiating",
            Self::AwaitingAiApproval => "awaiting_ai_approval",
            Self::UnderReview => "under_review",
            Self::PendingApproval => "pending_approval",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
            Self::Finalized => "finalized",
            Self::Cancelled => "cancelled",
            Self::Trash => "trash",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Draft => "Draft",
            Self::Sent => "Sent to suppliers",
            Self::AwaitingVisit => "Awaiting visit",
            Self::VisitScheduled => "Visit scheduled",
            Self::VisitConfirmed => "Visit confirmed",
            Self::VisitOverdue => "Visit overdue",
            Self::VisitPartialScheduled => "Visits partially scheduled",
            Self::VisitPartialConfirmed => "Visits partially confirmed",
            Self::Receiving => "Receiving proposals",
            Self::Received => "Proposals received",
            Self::AiAnalyzing => "AI analyzing",
            Self::AiNegotiating => "AI negotiating",
            Self::AwaitingAiApproval => "Awaiting AI approval",
            Self::UnderReview => "Under review",
            Self::PendingApproval => "Pending approval",
            Self::Approved => "Approved",
            Self::Rejected => "Rejected",
            Self::Finalized => "Finalized",
            Self::Cancelled => "Cancelled",
            Self::Trash => "Trash",
        }
    }

    pub const fn tone(self) -> StatusTone {
        match self {
            Self::Draft => StatusTone::Neutral,
            Self::Sent | Self::Receiving | Self::Received => StatusTone::Info,
            Self::AwaitingVisit
            | Self::VisitScheduled
            | Self::VisitConfirmed
            | Self::VisitPartialScheduled
            | Self::VisitPartialConfirmed
            | Self::AiAnalyzing
            | Self::AiNegotiating => StatusTone::Progress,
            Self::VisitOverdue
            | Self::AwaitingAiApproval
            | Self::UnderReview
            | Self::PendingApproval => StatusTone::Warning,
            Self::Approved | Self::Finalized => StatusTone::Success,
            Self::Rejected | Self::Cancelled => StatusTone::Danger,
            Self::Trash => StatusTone::Muted,
        }
    }
}

impl fmt::Display for QuoteStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QuoteStatus {
    type Err = DomainError;

    /// Only exact wire names parse; padded or re-cased values stay unknown.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == value)
            .ok_or_else(|| DomainError::UnknownQuoteStatus(value.to_string()))
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quote {
    pub id: QuoteId,
    pub status: QuoteStatus,
    pub payment_status: Option<PaymentStatus>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Quote {
    pub fn new(id: QuoteId) -> Self {
        let now = Utc::now();
        Self {
            id,
            status: QuoteStatus::Draft,
            payment_status: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn can_transition_to(&self, next: QuoteStatus) -> bool {
        is_valid_transition(self.status, next)
    }

    pub fn transition_to(&mut self, next: QuoteStatus) -> Result<(), DomainError> {
        if self.can_transition_to(next) {
            self.status = next;
            self.updated_at = Utc::now();
            return Ok(());
        }

        Err(DomainError::InvalidQuoteTransition { from: self.status, to: next })
    }

    /// Whether edit and approval actions are still open, taking the linked
    /// payment into account.
    pub fn is_actionable(&self) -> bool {
        is_quote_actionable(self.status, self.payment_status)
    }
}

#[cfg(test)]
mod tests {
    use crate::domain::payment::PaymentStatus;
    use crate::errors::DomainError;

    use super::{Quote, QuoteId, QuoteStatus, StatusTone};

    fn quote(status: QuoteStatus) -> Quote {
        Quote { status, ..Quote::new(QuoteId("Q-1".to_string())) }
    }

    #[test]
    fn new_quotes_start_as_draft() {
        let quote = Quote::new(QuoteId("Q-2026-0001".to_string()));
        assert_eq!(quote.status, QuoteStatus::Draft);
        assert!(quote.payment_status.is_none());
        assert_eq!(quote.created_at, quote.updated_at);
    }

    #[test]
    fn allows_valid_lifecycle_transition() {
        let mut quote = quote(QuoteStatus::Draft);
        quote.transition_to(QuoteStatus::Sent).expect("draft->sent");
        assert_eq!(quote.status, QuoteStatus::Sent);
    }

    #[test]
    fn blocks_invalid_lifecycle_transition() {
        let mut quote = quote(QuoteStatus::Draft);
        let error =
            quote.transition_to(QuoteStatus::Receiving).expect_err("draft->receiving should fail");
        assert_eq!(
            error,
            DomainError::InvalidQuoteTransition {
                from: QuoteStatus::Draft,
                to: QuoteStatus::Receiving
            }
        );
        assert_eq!(quote.status, QuoteStatus::Draft);
    }

    #[test]
    fn rejected_quotes_can_reopen_for_proposals() {
        let mut quote = quote(QuoteStatus::Rejected);
        quote.transition_to(QuoteStatus::Receiving).expect("rejected -> receiving");
        quote.transition_to(QuoteStatus::Received).expect("receiving -> received");

        assert_eq!(quote.status, QuoteStatus::Received);
        assert!(quote.is_actionable());
    }

    #[test]
    fn paid_payment_closes_actions_on_received_quote() {
        let mut quote = quote(QuoteStatus::Received);
        quote.payment_status = Some(PaymentStatus::Paid);
        assert!(!quote.is_actionable());

        quote.payment_status = Some(PaymentStatus::Pending);
        assert!(quote.is_actionable());
    }

    #[test]
    fn wire_names_parse_back_into_the_same_status() {
        for status in QuoteStatus::ALL {
            assert_eq!(status.as_str().parse::<QuoteStatus>(), Ok(status));
            assert_eq!(status.to_string(), status.as_str());
        }
    }

    #[test]
    fn parsing_requires_the_exact_wire_name() {
        assert_eq!(
            " APPROVED ".parse::<QuoteStatus>(),
            Err(DomainError::UnknownQuoteStatus(" APPROVED ".to_string()))
        );
        assert!("Pending_Approval".parse::<QuoteStatus>().is_err());
        assert!("received ".parse::<QuoteStatus>().is_err());
    }

    #[test]
    fn unknown_wire_names_are_rejected() {
        assert_eq!(
            "paid".parse::<QuoteStatus>(),
            Err(DomainError::UnknownQuoteStatus("paid".to_string()))
        );
        assert!("".parse::<QuoteStatus>().is_err());
    }

    #[test]
    fn serde_uses_wire_names() {
        let json = serde_json::to_string(&QuoteStatus::AwaitingAiApproval).expect("serialize");
        assert_eq!(json, "\"awaiting_ai_approval\"");

        let parsed: QuoteStatus =
            serde_json::from_str("\"visit_partial_confirmed\"").expect("parse");
        assert_eq!(parsed, QuoteStatus::VisitPartialConfirmed);
    }

    #[test]
    fn final_outcomes_have_distinct_tones() {
        assert_eq!(QuoteStatus::Approved.tone(), StatusTone::Success);
        assert_eq!(QuoteStatus::Rejected.tone(), StatusTone::Danger);
        assert_eq!(QuoteStatus::Trash.tone(), StatusTone::Muted);
        assert_eq!(QuoteStatus::Received.label(), "Proposals received");
    }
}
