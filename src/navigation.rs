//! Shareable navigation state.
//!
//! The list query lives in the location's query string, so any listing can
//! be bookmarked or pasted. [`QuerySync`] is the only writer of that query
//! string: it reads the location through [`normalize`] and writes back the
//! sparse form of the merged state.

use crate::error::{DocketError, Result};
use crate::query::params::{canonical_query, parse_query_string};
use crate::query::{QueryPatch, QueryState, normalize};
use crate::types::TicketId;

pub const LIST_PATH: &str = "/tickets";

/// A bookmarkable location (path plus query string).
pub trait Location {
    /// Current href, e.g. `/tickets?status=done`.
    fn href(&self) -> String;

    /// Replace the current history entry.
    fn replace(&mut self, href: &str);

    /// Append a new history entry.
    fn push(&mut self, href: &str);

    fn pathname(&self) -> String {
        split_href(&self.href()).0.to_string()
    }

    /// Query string without the leading `?`.
    fn search(&self) -> String {
        split_href(&self.href()).1.to_string()
    }
}

/// Split an href into path and query string.
pub fn split_href(href: &str) -> (&str, &str) {
    match href.split_once('?') {
        Some((path, query)) => (path, query),
        None => (href, ""),
    }
}

/// Join a path and a query string, leaving out an empty `?`.
pub fn join_href(path: &str, query: &str) -> String {
    if query.is_empty() {
        path.to_string()
    } else {
        format!("{path}?{query}")
    }
}

/// In-memory history stack.
#[derive(Debug, Clone)]
pub struct MemoryLocation {
    entries: Vec<String>,
    index: usize,
}

impl MemoryLocation {
    pub fn new(href: impl Into<String>) -> Self {
        Self {
            entries: vec![href.into()],
            index: 0,
        }
    }

    /// Step back one entry. Returns false at the start of history.
    pub fn back(&mut self) -> bool {
        if self.index == 0 {
            return false;
        }
        self.index -= 1;
        true
    }

    pub fn forward(&mut self) -> bool {
        if self.index + 1 >= self.entries.len() {
            return false;
        }
        self.index += 1;
        true
    }

    /// Number of history entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }
}

impl Default for MemoryLocation {
    fn default() -> Self {
        Self::new(LIST_PATH)
    }
}

impl Location for MemoryLocation {
    fn href(&self) -> String {
        self.entries[self.index].clone()
    }

    fn replace(&mut self, href: &str) {
        self.entries[self.index] = href.to_string();
    }

    fn push(&mut self, href: &str) {
        self.entries.truncate(self.index + 1);
        self.entries.push(href.to_string());
        self.index = self.entries.len() - 1;
    }
}

/// Screen selected by a path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    List,
    Detail(TicketId),
}

impl Route {
    /// Match a path against the known routes.
    pub fn parse(path: &str) -> Result<Route> {
        let trimmed = path.trim_end_matches('/');
        if trimmed == LIST_PATH {
            return Ok(Route::List);
        }
        match trimmed.strip_prefix(LIST_PATH).and_then(|rest| rest.strip_prefix('/')) {
            Some(id) if !id.is_empty() && !id.contains('/') => Ok(Route::Detail(TicketId::new(id))),
            _ => Err(DocketError::InvalidRoute(path.to_string())),
        }
    }

    pub fn path(&self) -> String {
        match self {
            Route::List => LIST_PATH.to_string(),
            Route::Detail(id) => format!("{LIST_PATH}/{id}"),
        }
    }
}

/// How query updates are recorded in history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HistoryMode {
    #[default]
    Replace,
    Push,
}

/// Binds [`QueryState`] to a [`Location`].
#[derive(Debug)]
pub struct QuerySync<L> {
    location: L,
    mode: HistoryMode,
    /// Last settled search text this synchronizer acted on.
    last_search: String,
}

impl<L: Location> QuerySync<L> {
    pub fn new(location: L, mode: HistoryMode) -> Self {
        let mut sync = Self {
            location,
            mode,
            last_search: String::new(),
        };
        sync.last_search = sync.state().q;
        sync
    }

    /// Query state as read from the location.
    pub fn state(&self) -> QueryState {
        normalize(&parse_query_string(&self.location.search()))
    }

    /// Merge a patch into the current state and write the sparse form back.
    ///
    /// Returns whether the location changed. A patch that leaves the
    /// canonical query untouched performs no write.
    ///
    /// A patch that sets `q` also becomes the reference search text, so the
    /// same text settling later does not write again.
    pub fn update_params(&mut self, patch: &QueryPatch) -> bool {
        if let Some(q) = &patch.q {
            self.last_search = q.clone();
        }
        let current = self.state();
        let next = current.apply(patch);
        self.write(&next)
    }

    /// Handle a newly settled search text.
    ///
    /// Acts only when the text differs from the last one acted on, so mounts
    /// and unrelated re-renders never reset the page.
    pub fn search_settled(&mut self, q: &str) -> bool {
        if q == self.last_search {
            return false;
        }
        self.update_params(&QueryPatch::new().q(q))
    }

    /// The location changed from outside (back/forward, pasted link).
    ///
    /// Adopts the new search text as the reference value without writing.
    pub fn location_changed(&mut self) {
        self.last_search = self.state().q;
    }

    /// Canonical href for the current state.
    pub fn canonical_href(&self) -> String {
        join_href(&self.location.pathname(), &canonical_query(&self.state()))
    }

    /// Rewrite a non-canonical query string (e.g. from a pasted link).
    pub fn canonicalize(&mut self) -> bool {
        let href = self.canonical_href();
        if href == self.location.href() {
            return false;
        }
        self.location.replace(&href);
        true
    }

    fn write(&mut self, next: &QueryState) -> bool {
        let href = join_href(&self.location.pathname(), &canonical_query(next));
        if href == self.location.href() {
            return false;
        }
        tracing::debug!(%href, "writing list query to location");
        match self.mode {
            HistoryMode::Replace => self.location.replace(&href),
            HistoryMode::Push => self.location.push(&href),
        }
        true
    }

    pub fn location(&self) -> &L {
        &self.location
    }

    pub fn location_mut(&mut self) -> &mut L {
        &mut self.location
    }

    pub fn into_location(self) -> L {
        self.location
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::Filter;
    use crate::types::TicketStatus;

    fn sync(href: &str) -> QuerySync<MemoryLocation> {
        QuerySync::new(MemoryLocation::new(href), HistoryMode::Replace)
    }

    #[test]
    fn test_route_parse() {
        assert_eq!(Route::parse("/tickets").unwrap(), Route::List);
        assert_eq!(Route::parse("/tickets/").unwrap(), Route::List);
        assert_eq!(
            Route::parse("/tickets/abc").unwrap(),
            Route::Detail(TicketId::new("abc"))
        );
        assert!(Route::parse("/").is_err());
        assert!(Route::parse("/ticketsabc").is_err());
        assert!(Route::parse("/tickets/a/b").is_err());
        assert_eq!(Route::Detail(TicketId::new("x")).path(), "/tickets/x");
    }

    #[test]
    fn test_state_reads_location() {
        let s = sync("/tickets?status=done&page=2");
        let state = s.state();
        assert_eq!(state.status, Filter::Only(TicketStatus::Done));
        assert_eq!(state.page, 2);
    }

    #[test]
    fn test_update_params_writes_sparse_and_replaces() {
        let mut s = sync("/tickets");
        assert!(s.update_params(&QueryPatch::new().status(Filter::Only(TicketStatus::Done))));
        assert_eq!(s.location().href(), "/tickets?status=done");
        assert_eq!(s.location().len(), 1);

        assert!(s.update_params(&QueryPatch::new().status(Filter::All)));
        assert_eq!(s.location().href(), "/tickets");
    }

    #[test]
    fn test_push_mode_adds_history_entries() {
        let mut s = QuerySync::new(MemoryLocation::new("/tickets"), HistoryMode::Push);
        s.update_params(&QueryPatch::new().page(2));
        s.update_params(&QueryPatch::new().page(3));
        assert_eq!(s.location().len(), 3);
        assert!(s.location_mut().back());
        assert_eq!(s.state().page, 2);
    }

    #[test]
    fn test_redundant_update_does_not_write() {
        let mut s = sync("/tickets?page=2");
        assert!(!s.update_params(&QueryPatch::new().page(2)));
        assert!(!s.update_params(&QueryPatch::new()));
    }

    #[test]
    fn test_filter_change_resets_page_and_page_change_keeps_filter() {
        let mut s = sync("/tickets?page=3");
        s.update_params(&QueryPatch::new().status(Filter::Only(TicketStatus::Done)));
        assert_eq!(s.state().page, 1);

        s.update_params(&QueryPatch::new().page(4));
        let state = s.state();
        assert_eq!(state.page, 4);
        assert_eq!(state.status, Filter::Only(TicketStatus::Done));
    }

    #[test]
    fn test_search_settled_on_mount_value_is_a_no_op() {
        let mut s = sync("/tickets?q=login&page=3");
        assert!(!s.search_settled("login"));
        assert_eq!(s.state().page, 3);
    }

    #[test]
    fn test_search_settled_resets_page_once() {
        let mut s = sync("/tickets?page=3");
        assert!(s.search_settled("fix"));
        assert_eq!(s.location().href(), "/tickets?q=fix");

        s.update_params(&QueryPatch::new().page(2));
        // Same settled text again (e.g. re-render): page must survive.
        assert!(!s.search_settled("fix"));
        assert_eq!(s.state().page, 2);
    }

    #[test]
    fn test_location_changed_adopts_search_without_writing() {
        let mut s = sync("/tickets?q=old");
        s.location_mut().replace("/tickets?q=new&page=2");
        s.location_changed();
        assert!(!s.search_settled("new"));
        assert_eq!(s.state().page, 2);
    }

    #[test]
    fn test_canonicalize_rewrites_messy_links() {
        let mut s = sync("/tickets?page=1&status=all&pageSize=20&priority=high");
        assert!(s.canonicalize());
        assert_eq!(s.location().href(), "/tickets?priority=high");
        assert!(!s.canonicalize());
    }
}
