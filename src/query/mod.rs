//! Typed list query state.
//!
//! A [`QueryState`] describes one list request along seven dimensions (free
//! text, three filters, sort, page, page size). It is a plain value: every
//! change produces a new state, and two equal states denote the same request.
//! Conversion to and from the shareable string form lives in [`params`].

use std::fmt;
use std::str::FromStr;

use crate::types::{TicketPriority, TicketStatus};

pub mod engine;
pub mod params;
pub mod sort;

pub use engine::{TicketFilter, TicketQuery, filter_sort_paginate};
pub use params::{ParamMap, normalize, to_sparse};
pub use sort::{SortDirection, SortField, SortSpec, sort_tickets};

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_PAGE_SIZE: u32 = 20;
pub const MAX_PAGE_SIZE: u32 = 50;

/// Wire value meaning "no filter on this dimension".
pub const ALL: &str = "all";

/// A filter dimension: either everything, or one exact value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum Filter<T> {
    #[default]
    All,
    Only(T),
}

impl<T: PartialEq> Filter<T> {
    pub fn matches(&self, value: &T) -> bool {
        match self {
            Filter::All => true,
            Filter::Only(expected) => expected == value,
        }
    }

    pub fn is_all(&self) -> bool {
        matches!(self, Filter::All)
    }
}

impl<T: fmt::Display> fmt::Display for Filter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Filter::All => f.write_str(ALL),
            Filter::Only(value) => value.fmt(f),
        }
    }
}

impl<T: FromStr> FromStr for Filter<T> {
    type Err = T::Err;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() || s.eq_ignore_ascii_case(ALL) {
            Ok(Filter::All)
        } else {
            s.parse().map(Filter::Only)
        }
    }
}

impl Filter<String> {
    /// Tag filter from free text. Empty text and `all` mean no filter.
    pub fn tag(tag: impl Into<String>) -> Self {
        let tag = tag.into();
        if tag.is_empty() || tag.eq_ignore_ascii_case(ALL) {
            Filter::All
        } else {
            Filter::Only(tag)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryState {
    pub q: String,
    pub status: Filter<TicketStatus>,
    pub priority: Filter<TicketPriority>,
    pub tag: Filter<String>,
    pub sort: SortSpec,
    pub page: u32,
    pub page_size: u32,
}

impl Default for QueryState {
    fn default() -> Self {
        Self {
            q: String::new(),
            status: Filter::All,
            priority: Filter::All,
            tag: Filter::All,
            sort: SortSpec::default(),
            page: DEFAULT_PAGE,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl QueryState {
    /// Index of the first item on the current page.
    pub fn offset(&self) -> usize {
        (self.page.max(1) as usize - 1) * self.page_size as usize
    }

    /// Apply a patch, resetting the page when the result set changes.
    pub fn apply(&self, patch: &QueryPatch) -> QueryState {
        let mut next = self.clone();
        if let Some(q) = &patch.q {
            next.q = q.clone();
        }
        if let Some(status) = &patch.status {
            next.status = status.clone();
        }
        if let Some(priority) = &patch.priority {
            next.priority = priority.clone();
        }
        if let Some(tag) = &patch.tag {
            next.tag = tag.clone();
        }
        if let Some(sort) = patch.sort {
            next.sort = sort;
        }
        if let Some(page_size) = patch.page_size {
            next.page_size = page_size.clamp(1, MAX_PAGE_SIZE);
        }

        match patch.page {
            Some(page) => next.page = page.max(1),
            None if next.reorders_or_refilters(self) => next.page = DEFAULT_PAGE,
            None => {}
        }
        next
    }

    /// True when the matching set or its order differs from `other`.
    fn reorders_or_refilters(&self, other: &QueryState) -> bool {
        self.q != other.q
            || self.status != other.status
            || self.priority != other.priority
            || self.tag != other.tag
            || self.sort != other.sort
    }
}

/// Typed partial update of a [`QueryState`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryPatch {
    pub q: Option<String>,
    pub status: Option<Filter<TicketStatus>>,
    pub priority: Option<Filter<TicketPriority>>,
    pub tag: Option<Filter<String>>,
    pub sort: Option<SortSpec>,
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

impl QueryPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn q(mut self, q: impl Into<String>) -> Self {
        self.q = Some(q.into());
        self
    }

    pub fn status(mut self, status: Filter<TicketStatus>) -> Self {
        self.status = Some(status);
        self
    }

    pub fn priority(mut self, priority: Filter<TicketPriority>) -> Self {
        self.priority = Some(priority);
        self
    }

    pub fn tag(mut self, tag: Filter<String>) -> Self {
        self.tag = Some(tag);
        self
    }

    pub fn sort(mut self, sort: SortSpec) -> Self {
        self.sort = Some(sort);
        self
    }

    pub fn page(mut self, page: u32) -> Self {
        self.page = Some(page);
        self
    }

    pub fn page_size(mut self, page_size: u32) -> Self {
        self.page_size = Some(page_size);
        self
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}
