//! List screen state and actions.
//!
//! The list screen owns only the search input buffer. Every other piece of
//! list state lives in the location and is changed through [`QuerySync`].

use std::time::{Duration, Instant};

use crate::debounce::Debounce;
use crate::executor::QueryStatus;
use crate::navigation::{Location, QuerySync};
use crate::query::{Filter, QueryPatch, QueryState, SortSpec};
use crate::types::{Page, Ticket, TicketPriority, TicketStatus};

/// Search text as typed, plus the debounce that decides when it counts.
#[derive(Debug, Clone)]
pub struct SearchBox {
    text: String,
    debounce: Debounce<String>,
}

impl SearchBox {
    pub fn new(initial: impl Into<String>, delay: Duration) -> Self {
        let initial = initial.into();
        Self {
            text: initial.clone(),
            debounce: Debounce::new(initial, delay),
        }
    }

    pub fn input(&mut self, text: impl Into<String>, now: Instant) {
        self.text = text.into();
        self.debounce.input(self.text.clone(), now);
    }

    /// The settled search text, once typing has paused long enough.
    pub fn poll(&mut self, now: Instant) -> Option<String> {
        self.debounce.poll(now)
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.debounce.deadline()
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Follow a search value that changed elsewhere (pasted link, reset).
    pub fn sync_from(&mut self, q: &str) {
        self.text = q.to_string();
        self.debounce.reset(q.to_string());
    }

    /// Stop emitting; used when the screen goes away.
    pub fn cancel(&mut self) {
        self.debounce.cancel();
    }
}

/// User intents on the list screen
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListAction {
    /// The search box content changed
    SearchTyped(String),
    SetStatus(Filter<TicketStatus>),
    SetPriority(Filter<TicketPriority>),
    SetTag(Filter<String>),
    SetSort(SortSpec),
    GoToPage(u32),
    SetPageSize(u32),
    /// Clear search and every filter
    ResetFilters,
    /// Re-run the failed list request
    Retry,
}

/// What the driver has to do after an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListOutcome {
    /// Nothing observable changed (or a debounce is pending)
    Unchanged,
    /// The location now names a different query
    QueryChanged,
    Retry,
}

/// List screen state
#[derive(Debug, Clone)]
pub struct ListPage {
    pub search: SearchBox,
}

impl ListPage {
    pub fn new(state: &QueryState, debounce: Duration) -> Self {
        Self {
            search: SearchBox::new(state.q.clone(), debounce),
        }
    }

    pub fn dispatch<L: Location>(
        &mut self,
        sync: &mut QuerySync<L>,
        action: ListAction,
        now: Instant,
    ) -> ListOutcome {
        let patch = match action {
            ListAction::SearchTyped(text) => {
                self.search.input(text, now);
                return ListOutcome::Unchanged;
            }
            ListAction::SetStatus(status) => QueryPatch::new().status(status),
            ListAction::SetPriority(priority) => QueryPatch::new().priority(priority),
            ListAction::SetTag(tag) => QueryPatch::new().tag(tag),
            ListAction::SetSort(sort) => QueryPatch::new().sort(sort),
            ListAction::GoToPage(page) => QueryPatch::new().page(page),
            ListAction::SetPageSize(size) => QueryPatch::new().page_size(size),
            ListAction::ResetFilters => {
                self.search.sync_from("");
                QueryPatch::new()
                    .q("")
                    .status(Filter::All)
                    .priority(Filter::All)
                    .tag(Filter::All)
            }
            ListAction::Retry => return ListOutcome::Retry,
        };

        if sync.update_params(&patch) {
            ListOutcome::QueryChanged
        } else {
            ListOutcome::Unchanged
        }
    }

    /// Apply the search text if it has settled.
    pub fn tick<L: Location>(&mut self, sync: &mut QuerySync<L>, now: Instant) -> ListOutcome {
        match self.search.poll(now) {
            Some(q) if sync.search_settled(&q) => ListOutcome::QueryChanged,
            _ => ListOutcome::Unchanged,
        }
    }
}

/// Everything a list renderer needs.
#[derive(Debug, Clone, Copy)]
pub struct ListView<'a> {
    pub query: &'a QueryState,
    pub href: &'a str,
    pub search_text: &'a str,
    pub status: &'a QueryStatus<Page<Ticket>>,
    pub is_fetching: bool,
}

impl ListView<'_> {
    pub fn page(&self) -> Option<&Page<Ticket>> {
        self.status.data()
    }

    /// True when a non-empty query matched nothing.
    pub fn is_empty_result(&self) -> bool {
        self.page().is_some_and(|p| p.total == 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::navigation::{HistoryMode, MemoryLocation};
    use crate::query::{SortDirection, SortField};

    const DELAY: Duration = Duration::from_millis(300);

    fn setup(href: &str) -> (ListPage, QuerySync<MemoryLocation>) {
        let sync = QuerySync::new(MemoryLocation::new(href), HistoryMode::Replace);
        let page = ListPage::new(&sync.state(), DELAY);
        (page, sync)
    }

    #[test]
    fn test_filter_actions_write_location() {
        let (mut page, mut sync) = setup("/tickets?page=4");
        let now = Instant::now();
        let outcome = page.dispatch(
            &mut sync,
            ListAction::SetPriority(Filter::Only(TicketPriority::High)),
            now,
        );
        assert_eq!(outcome, ListOutcome::QueryChanged);
        assert_eq!(sync.location().href(), "/tickets?priority=high");

        let outcome = page.dispatch(
            &mut sync,
            ListAction::SetSort(SortSpec::new(SortField::CreatedAt, SortDirection::Asc)),
            now,
        );
        assert_eq!(outcome, ListOutcome::QueryChanged);
        assert_eq!(
            sync.location().href(),
            "/tickets?priority=high&sort=createdAt_asc"
        );
    }

    #[test]
    fn test_same_value_is_unchanged() {
        let (mut page, mut sync) = setup("/tickets?status=done");
        let outcome = page.dispatch(
            &mut sync,
            ListAction::SetStatus(Filter::Only(TicketStatus::Done)),
            Instant::now(),
        );
        assert_eq!(outcome, ListOutcome::Unchanged);
    }

    #[test]
    fn test_typing_waits_for_debounce() {
        let (mut page, mut sync) = setup("/tickets?page=2");
        let t0 = Instant::now();
        for (i, text) in ["b", "bu", "bug"].iter().enumerate() {
            let now = t0 + Duration::from_millis(100) * i as u32;
            page.dispatch(&mut sync, ListAction::SearchTyped(text.to_string()), now);
            assert_eq!(page.tick(&mut sync, now), ListOutcome::Unchanged);
        }
        assert_eq!(page.search.text(), "bug");
        assert_eq!(sync.state().page, 2);

        let settled = t0 + Duration::from_millis(200) + DELAY;
        assert_eq!(page.tick(&mut sync, settled), ListOutcome::QueryChanged);
        assert_eq!(sync.location().href(), "/tickets?q=bug");
        assert_eq!(page.tick(&mut sync, settled + DELAY), ListOutcome::Unchanged);
    }

    #[test]
    fn test_reset_filters_clears_everything() {
        let (mut page, mut sync) = setup("/tickets?q=x&status=done&tag=ux&page=3&pageSize=10");
        let outcome = page.dispatch(&mut sync, ListAction::ResetFilters, Instant::now());
        assert_eq!(outcome, ListOutcome::QueryChanged);
        assert_eq!(sync.location().href(), "/tickets?pageSize=10");
        assert_eq!(page.search.text(), "");
    }

    #[test]
    fn test_reset_filters_is_one_history_entry() {
        let mut sync = QuerySync::new(
            MemoryLocation::new("/tickets?q=login&status=done&page=2"),
            HistoryMode::Push,
        );
        let mut page = ListPage::new(&sync.state(), DELAY);
        let now = Instant::now();

        page.dispatch(&mut sync, ListAction::ResetFilters, now);
        assert_eq!(sync.location().len(), 2);
        assert_eq!(sync.location().href(), "/tickets");

        assert_eq!(page.tick(&mut sync, now + DELAY), ListOutcome::Unchanged);
        assert_eq!(sync.location().len(), 2);
    }

    #[test]
    fn test_retry_is_passed_through() {
        let (mut page, mut sync) = setup("/tickets");
        assert_eq!(
            page.dispatch(&mut sync, ListAction::Retry, Instant::now()),
            ListOutcome::Retry
        );
    }
}
