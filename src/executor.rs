//! Keyed remote query state.
//!
//! A [`QueryExecutor`] follows one logical query at a time. Its identity is
//! the key: observing an equal key is the same request, observing a
//! different key starts a new one. Results arrive as [`FetchTicket`]s are
//! resolved; a result whose key is no longer current, or that was issued
//! before the latest fetch of the same key, is discarded, whatever order
//! responses arrive in.

use std::fmt::Debug;

use crate::error::{DocketError, ErrorKind, Result};
use crate::query::QueryState;
use crate::types::{Page, Ticket, TicketId};

/// A failed fetch as a view sees it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryError {
    pub kind: ErrorKind,
    pub message: String,
}

impl QueryError {
    pub fn is_not_found(&self) -> bool {
        self.kind == ErrorKind::NotFound
    }

    /// Whether a retry affordance makes sense.
    pub fn is_retryable(&self) -> bool {
        self.kind == ErrorKind::Transient
    }
}

impl From<&DocketError> for QueryError {
    fn from(error: &DocketError) -> Self {
        Self {
            kind: error.kind(),
            message: error.user_message(),
        }
    }
}

/// Observable state of a query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryStatus<T> {
    /// No data yet, or a refetch of invalidated data is under way.
    Loading,
    Error(QueryError),
    Success(T),
}

impl<T> QueryStatus<T> {
    pub fn is_loading(&self) -> bool {
        matches!(self, QueryStatus::Loading)
    }

    pub fn data(&self) -> Option<&T> {
        match self {
            QueryStatus::Success(data) => Some(data),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&QueryError> {
        match self {
            QueryStatus::Error(error) => Some(error),
            _ => None,
        }
    }
}

/// Permission to perform one fetch for `key`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket<K> {
    pub key: K,
    pub generation: u64,
}

#[derive(Debug)]
pub struct QueryExecutor<K, T> {
    current: Option<K>,
    status: QueryStatus<T>,
    stale: bool,
    in_flight: bool,
    generation: u64,
}

impl<K, T> Default for QueryExecutor<K, T> {
    fn default() -> Self {
        Self {
            current: None,
            status: QueryStatus::Loading,
            stale: false,
            in_flight: false,
            generation: 0,
        }
    }
}

impl<K, T> QueryExecutor<K, T>
where
    K: Clone + PartialEq + Debug,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// Follow `key`. Returns a ticket when a fetch must be issued.
    ///
    /// An equal key that is neither stale nor unfetched issues nothing, even
    /// while its request is still in flight.
    pub fn observe(&mut self, key: K) -> Option<FetchTicket<K>> {
        if self.current.as_ref() == Some(&key) && !self.stale {
            return None;
        }
        Some(self.issue(key))
    }

    /// Re-issue the current request, e.g. from a retry button.
    pub fn retry(&mut self) -> Option<FetchTicket<K>> {
        let key = self.current.clone()?;
        Some(self.issue(key))
    }

    /// Mark the current result stale. The next `observe` refetches.
    pub fn invalidate(&mut self) {
        if self.current.is_some() {
            self.stale = true;
        }
    }

    /// Stop following any key. Late results are discarded.
    pub fn reset(&mut self) {
        *self = Self {
            generation: self.generation,
            ..Self::default()
        };
    }

    /// Deliver the outcome of a fetch.
    ///
    /// Returns false when the ticket has been superseded, either by another
    /// key or by a newer fetch of the same key (retry, refetch after
    /// invalidation). The result is dropped and the visible state is
    /// untouched.
    pub fn resolve(&mut self, ticket: FetchTicket<K>, result: Result<T>) -> bool {
        if self.current.as_ref() != Some(&ticket.key) {
            tracing::debug!(key = ?ticket.key, "discarding response for superseded query");
            return false;
        }
        if ticket.generation != self.generation {
            tracing::debug!(
                key = ?ticket.key,
                generation = ticket.generation,
                current = self.generation,
                "discarding response from an earlier fetch"
            );
            return false;
        }
        self.in_flight = false;
        self.status = match result {
            Ok(data) => QueryStatus::Success(data),
            Err(e) => {
                tracing::warn!(key = ?ticket.key, "query failed: {e}");
                QueryStatus::Error(QueryError::from(&e))
            }
        };
        true
    }

    pub fn status(&self) -> &QueryStatus<T> {
        &self.status
    }

    pub fn key(&self) -> Option<&K> {
        self.current.as_ref()
    }

    pub fn is_stale(&self) -> bool {
        self.stale
    }

    pub fn is_fetching(&self) -> bool {
        self.in_flight
    }

    fn issue(&mut self, key: K) -> FetchTicket<K> {
        self.generation += 1;
        self.stale = false;
        self.in_flight = true;
        self.status = QueryStatus::Loading;
        self.current = Some(key.clone());
        FetchTicket {
            key,
            generation: self.generation,
        }
    }
}

pub type ListQuery = QueryExecutor<QueryState, Page<Ticket>>;
pub type DetailQuery = QueryExecutor<TicketId, Ticket>;

/// The queries an application keeps alive: one list, one detail.
#[derive(Debug, Default)]
pub struct QueryClient {
    pub list: ListQuery,
    pub detail: DetailQuery,
}

impl QueryClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// A ticket changed remotely: the list and its detail are stale.
    pub fn invalidate_ticket(&mut self, id: &TicketId) {
        self.list.invalidate();
        if self.detail.key() == Some(id) {
            self.detail.invalidate();
        }
    }

    /// The collection changed (create/delete): every list is stale.
    pub fn invalidate_lists(&mut self) {
        self.list.invalidate();
    }
}
