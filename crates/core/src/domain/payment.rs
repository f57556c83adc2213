use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::DomainError;

/// Status of the payment record linked to an approved quote.
///
/// Kept apart from `QuoteStatus`: a settled payment closes a quote for
/// further actions, but it is never itself a quote status.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Pending,
    Processing,
    Paid,
    Failed,
    Refunded,
    Cancelled,
}

impl PaymentStatus {
    pub const ALL: [PaymentStatus; 6] = [
        Self::Pending,
        Self::Processing,
        Self::Paid,
        Self::Failed,
        Self::Refunded,
        Self::Cancelled,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Paid => "paid",
            Self::Failed => "failed",
            Self::Refunded => "refunded",
            Self::Cancelled => "cancelled",
        }
    }

    pub const fn is_settled(self) -> bool {
        matches!(self, Self::Paid)
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentStatus {
    type Err = DomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == value)
            .ok_or_else(|| DomainError::UnknownPaymentStatus(value.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::PaymentStatus;

    #[test]
    fn only_paid_is_settled() {
        let settled: Vec<_> =
            PaymentStatus::ALL.into_iter().filter(|status| status.is_settled()).collect();
        assert_eq!(settled, vec![PaymentStatus::Paid]);
    }

    #[test]
    fn parses_wire_names() {
        assert_eq!("paid".parse::<PaymentStatus>(), Ok(PaymentStatus::Paid));
        assert_eq!("refunded".parse::<PaymentStatus>(), Ok(PaymentStatus::Refunded));
        assert!("REFUNDED".parse::<PaymentStatus>().is_err());
        assert!("received".parse::<PaymentStatus>().is_err());
    }
}
