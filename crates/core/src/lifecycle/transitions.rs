use serde::{Deserialize, Serialize};

use crate::domain::payment::PaymentStatus;
use crate::domain::quote::QuoteStatus;

/// Facts supplied by the caller when asking for an automatic transition.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionContext {
    pub all_proposals_received: bool,
}

impl TransitionContext {
    pub fn with_all_proposals_received(mut self, received: bool) -> Self {
        self.all_proposals_received = received;
        self
    }
}

/// Statuses reachable in one step from `current`, in menu order.
///
/// This table is the only definition of which moves are legal.
pub fn valid_transitions(current: QuoteStatus) -> &'static [QuoteStatus] {
    use QuoteStatus::{
        AiAnalyzing, AiNegotiating, Approved, AwaitingAiApproval, AwaitingVisit, Cancelled, Draft,
        Finalized, PendingApproval, Received, Receiving, Rejected, Sent, Trash, UnderReview,
        VisitConfirmed, VisitOverdue, VisitPartialConfirmed, VisitPartialScheduled,
        VisitScheduled,
    };

    match current {
        Draft => &[Sent, AwaitingVisit, Cancelled],
        Sent => &[Receiving, AwaitingVisit, Cancelled],
        AwaitingVisit => &[VisitScheduled, Cancelled],
        VisitScheduled => &[VisitConfirmed, VisitOverdue, Cancelled],
        VisitConfirmed => &[Receiving, Cancelled],
        VisitOverdue => &[VisitScheduled, Cancelled],
        VisitPartialScheduled => &[VisitPartialConfirmed, VisitScheduled, VisitOverdue, Cancelled],
        VisitPartialConfirmed => &[VisitConfirmed, Receiving, Cancelled],
        Receiving => &[Received, Cancelled],
        Received => &[AiAnalyzing, PendingApproval, UnderReview, Approved, Rejected],
        AiAnalyzing => &[AiNegotiating, PendingApproval, Rejected],
        AiNegotiating => &[AwaitingAiApproval, Rejected],
        AwaitingAiApproval => &[PendingApproval, Approved, Rejected],
        UnderReview => &[PendingApproval, Approved, Rejected, Receiving],
        PendingApproval => &[Approved, Rejected],
        Approved => &[Finalized, Cancelled],
        Rejected => &[Receiving, Cancelled],
        Finalized | Cancelled => &[],
        // Restoring from trash puts the quote back into editing.
        Trash => &[Draft],
    }
}

pub fn is_valid_transition(current: QuoteStatus, next: QuoteStatus) -> bool {
    valid_transitions(current).contains(&next)
}

/// Whether edit and approval actions are closed for a quote in `status`.
///
/// `Received` means supplier proposals arrived and stays open; payment
/// settlement is checked separately through `is_quote_actionable`.
pub fn is_locked(status: QuoteStatus) -> bool {
    matches!(
        status,
        QuoteStatus::Approved
            | QuoteStatus::Rejected
            | QuoteStatus::Finalized
            | QuoteStatus::Cancelled
            | QuoteStatus::Trash
    )
}

pub fn can_receive_actions(status: QuoteStatus) -> bool {
    !is_locked(status)
}

/// Suggests a status that follows from `context` without a user action.
///
/// A `Receiving` quote whose proposals have all arrived goes straight to
/// `UnderReview`. That edge is not in the transition table; callers apply
/// the suggestion as a separate write.
pub fn next_automatic_status(
    current: QuoteStatus,
    context: Option<&TransitionContext>,
) -> Option<QuoteStatus> {
    match (current, context) {
        (QuoteStatus::Receiving, Some(context)) if context.all_proposals_received => {
            Some(QuoteStatus::UnderReview)
        }
        _ => None,
    }
}

/// Combines the quote lock with the linked payment: a settled payment closes
/// the quote even when its own status would still accept actions.
pub fn is_quote_actionable(status: QuoteStatus, payment: Option<PaymentStatus>) -> bool {
    can_receive_actions(status) && !payment.is_some_and(PaymentStatus::is_settled)
}

/// Every legal edge, grouped by source status in declaration order.
pub fn transition_edges() -> impl Iterator<Item = (QuoteStatus, QuoteStatus)> {
    QuoteStatus::ALL
        .into_iter()
        .flat_map(|from| valid_transitions(from).iter().map(move |to| (from, *to)))
}

pub fn valid_transitions_for(current: &str) -> &'static [QuoteStatus] {
    match current.parse::<QuoteStatus>() {
        Ok(status) => valid_transitions(status),
        Err(_) => &[],
    }
}

pub fn is_valid_transition_str(current: &str, next: &str) -> bool {
    match next.parse::<QuoteStatus>() {
        Ok(next) => valid_transitions_for(current).contains(&next),
        Err(_) => false,
    }
}

/// Unknown values, including the legacy `paid` marker, count as locked.
pub fn is_locked_str(status: &str) -> bool {
    status.parse::<QuoteStatus>().map(is_locked).unwrap_or(true)
}

pub fn can_receive_actions_str(status: &str) -> bool {
    !is_locked_str(status)
}

impl QuoteStatus {
    pub fn valid_transitions(self) -> &'static [QuoteStatus] {
        valid_transitions(self)
    }

    pub fn can_transition_to(self, next: QuoteStatus) -> bool {
        is_valid_transition(self, next)
    }

    pub fn is_locked(self) -> bool {
        is_locked(self)
    }

    pub fn can_receive_actions(self) -> bool {
        can_receive_actions(self)
    }

    pub fn is_terminal(self) -> bool {
        valid_transitions(self).is_empty()
    }
}
