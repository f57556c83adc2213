use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::Utc;
use thiserror::Error;

use crate::domain::quote::{Quote, QuoteId, QuoteStatus};

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("quote `{0}` already exists")]
    Duplicate(QuoteId),
    #[error("quote store unavailable: {0}")]
    Unavailable(String),
}

/// Outcome of a conditional status write.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StatusUpdate {
    Applied,
    /// The stored status no longer matched the expected one.
    Stale { actual: QuoteStatus },
    Missing,
}

/// Persistence seam for quote status writes.
///
/// `update_status_if` must be atomic: it only writes when the stored status
/// still equals `expected`.
#[async_trait::async_trait]
pub trait QuoteRepository: Send + Sync {
    async fn find_by_id(&self, id: &QuoteId) -> Result<Option<Quote>, RepositoryError>;
    async fn insert(&self, quote: Quote) -> Result<(), RepositoryError>;
    async fn update_status_if(
        &self,
        id: &QuoteId,
        expected: QuoteStatus,
        next: QuoteStatus,
    ) -> Result<StatusUpdate, RepositoryError>;
}

#[derive(Clone, Default)]
pub struct InMemoryQuoteRepository {
    quotes: Arc<Mutex<HashMap<QuoteId, Quote>>>,
}

impl InMemoryQuoteRepository {
    fn quotes(&self) -> MutexGuard<'_, HashMap<QuoteId, Quote>> {
        match self.quotes.lock() {
            Ok(quotes) => quotes,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Overwrites the stored status without any check. Test helper for
    /// simulating a concurrent writer.
    pub fn force_status(&self, id: &QuoteId, status: QuoteStatus) {
        if let Some(quote) = self.quotes().get_mut(id) {
            quote.status = status;
        }
    }

    pub fn remove(&self, id: &QuoteId) -> Option<Quote> {
        self.quotes().remove(id)
    }
}

#[async_trait::async_trait]
impl QuoteRepository for InMemoryQuoteRepository {
    async fn find_by_id(&self, id: &QuoteId) -> Result<Option<Quote>, RepositoryError> {
        Ok(self.quotes().get(id).cloned())
    }

    async fn insert(&self, quote: Quote) -> Result<(), RepositoryError> {
        let mut quotes = self.quotes();
        if quotes.contains_key(&quote.id) {
            return Err(RepositoryError::Duplicate(quote.id));
        }
        quotes.insert(quote.id.clone(), quote);
        Ok(())
    }

    async fn update_status_if(
        &self,
        id: &QuoteId,
        expected: QuoteStatus,
        next: QuoteStatus,
    ) -> Result<StatusUpdate, RepositoryError> {
        let mut quotes = self.quotes();
        match quotes.get_mut(id) {
            Some(quote) if quote.status == expected => {
                quote.status = next;
                quote.updated_at = Utc::now();
                Ok(StatusUpdate::Applied)
            }
            Some(quote) => Ok(StatusUpdate::Stale { actual: quote.status }),
            None => Ok(StatusUpdate::Missing),
        }
    }
}
