//! Filter, sort and paginate a ticket collection.
//!
//! The pipeline runs in a fixed order: search, status, priority, tag, sort,
//! then the page window. `total` is taken after the filters and before the
//! window, so it does not depend on `page` or `pageSize`.

use unicase::UniCase;

use super::sort::sort_tickets;
use super::{DEFAULT_PAGE, Filter, MAX_PAGE_SIZE, QueryState, SortSpec};
use crate::types::{Page, Ticket, TicketPriority, TicketStatus};

/// Trait for ticket filters
pub trait TicketFilter: Send + Sync {
    fn matches(&self, ticket: &Ticket) -> bool;
}

/// Case-insensitive substring match.
///
/// Uses `unicase` case folding so that e.g. German ß matches "SS".
fn contains_case_insensitive(haystack: &str, folded_needle: &str) -> bool {
    if folded_needle.is_empty() {
        return true;
    }
    UniCase::new(haystack)
        .to_folded_case()
        .contains(folded_needle)
}

/// Free-text search over title and description.
pub struct SearchFilter {
    folded: String,
}

impl SearchFilter {
    pub fn new(query: &str) -> Self {
        Self {
            folded: UniCase::new(query).to_folded_case(),
        }
    }
}

impl TicketFilter for SearchFilter {
    fn matches(&self, ticket: &Ticket) -> bool {
        contains_case_insensitive(&ticket.title, &self.folded)
            || contains_case_insensitive(&ticket.description, &self.folded)
    }
}

/// Filter tickets by status
pub struct StatusFilter(TicketStatus);

impl StatusFilter {
    pub fn new(status: TicketStatus) -> Self {
        Self(status)
    }
}

impl TicketFilter for StatusFilter {
    fn matches(&self, ticket: &Ticket) -> bool {
        ticket.status == self.0
    }
}

/// Filter tickets by priority
pub struct PriorityFilter(TicketPriority);

impl PriorityFilter {
    pub fn new(priority: TicketPriority) -> Self {
        Self(priority)
    }
}

impl TicketFilter for PriorityFilter {
    fn matches(&self, ticket: &Ticket) -> bool {
        ticket.priority == self.0
    }
}

/// Keep tickets carrying the given tag
pub struct TagFilter(String);

impl TagFilter {
    pub fn new(tag: impl Into<String>) -> Self {
        Self(tag.into())
    }
}

impl TicketFilter for TagFilter {
    fn matches(&self, ticket: &Ticket) -> bool {
        ticket.has_tag(&self.0)
    }
}

/// A query configuration that can be applied to a ticket collection.
pub struct TicketQuery {
    filters: Vec<Box<dyn TicketFilter>>,
    sort: SortSpec,
    page: u32,
    page_size: u32,
}

impl TicketQuery {
    /// Build the pipeline for a query state.
    ///
    /// `page_size` is clamped to [`MAX_PAGE_SIZE`] whatever the caller asked for.
    pub fn from_state(state: &QueryState) -> Self {
        let mut filters: Vec<Box<dyn TicketFilter>> = Vec::new();
        if !state.q.is_empty() {
            filters.push(Box::new(SearchFilter::new(&state.q)));
        }
        if let Filter::Only(status) = state.status {
            filters.push(Box::new(StatusFilter::new(status)));
        }
        if let Filter::Only(priority) = state.priority {
            filters.push(Box::new(PriorityFilter::new(priority)));
        }
        if let Filter::Only(tag) = &state.tag {
            filters.push(Box::new(TagFilter::new(tag.clone())));
        }

        Self {
            filters,
            sort: state.sort,
            page: state.page.max(DEFAULT_PAGE),
            page_size: state.page_size.clamp(1, MAX_PAGE_SIZE),
        }
    }

    /// Tickets passing every filter, in input order.
    pub fn matching<'a>(&self, tickets: &'a [Ticket]) -> Vec<&'a Ticket> {
        tickets
            .iter()
            .filter(|t| self.filters.iter().all(|f| f.matches(t)))
            .collect()
    }

    /// Run the whole pipeline and cut out one page.
    ///
    /// A page past the end is empty, not an error.
    pub fn apply(&self, tickets: &[Ticket]) -> Page<Ticket> {
        let mut filtered: Vec<Ticket> = self.matching(tickets).into_iter().cloned().collect();
        sort_tickets(&mut filtered, self.sort);

        let total = filtered.len();
        let start = (self.page as usize - 1).saturating_mul(self.page_size as usize);
        let items: Vec<Ticket> = filtered
            .into_iter()
            .skip(start)
            .take(self.page_size as usize)
            .collect();

        Page {
            items,
            page: self.page,
            page_size: self.page_size,
            total,
        }
    }
}

/// Evaluate a list query against the full collection.
pub fn filter_sort_paginate(tickets: &[Ticket], state: &QueryState) -> Page<Ticket> {
    TicketQuery::from_state(state).apply(tickets)
}
