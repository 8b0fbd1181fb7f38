//! Conversion between [`QueryState`] and its shareable string form.
//!
//! The shareable form is sparse: a dimension equal to its default is left
//! out, so the default listing is the bare path and every other listing has
//! exactly one spelling.

use std::collections::BTreeMap;

use url::form_urlencoded;

use super::{DEFAULT_PAGE, DEFAULT_PAGE_SIZE, Filter, MAX_PAGE_SIZE, QueryState, SortSpec};
use crate::types::{TicketPriority, TicketStatus};

pub const KEY_Q: &str = "q";
pub const KEY_STATUS: &str = "status";
pub const KEY_PRIORITY: &str = "priority";
pub const KEY_TAG: &str = "tag";
pub const KEY_SORT: &str = "sort";
pub const KEY_PAGE: &str = "page";
pub const KEY_PAGE_SIZE: &str = "pageSize";

/// Parameter keys in canonical order.
pub const PARAM_KEYS: [&str; 7] = [
    KEY_Q,
    KEY_STATUS,
    KEY_PRIORITY,
    KEY_TAG,
    KEY_SORT,
    KEY_PAGE,
    KEY_PAGE_SIZE,
];

/// Loosely-typed parameter map as found in a query string.
pub type ParamMap = BTreeMap<String, String>;

/// Build a [`QueryState`] from a raw map, filling gaps with defaults.
///
/// Values that do not parse fall back to the default for that dimension.
pub fn normalize(raw: &ParamMap) -> QueryState {
    let get = |key: &str| raw.get(key).map(String::as_str);

    let status = get(KEY_STATUS)
        .map(|s| {
            s.parse::<Filter<TicketStatus>>().unwrap_or_else(|e| {
                tracing::debug!("ignoring status parameter: {e}");
                Filter::All
            })
        })
        .unwrap_or_default();

    let priority = get(KEY_PRIORITY)
        .map(|s| {
            s.parse::<Filter<TicketPriority>>().unwrap_or_else(|e| {
                tracing::debug!("ignoring priority parameter: {e}");
                Filter::All
            })
        })
        .unwrap_or_default();

    let sort = get(KEY_SORT)
        .map(|s| {
            s.parse::<SortSpec>().unwrap_or_else(|e| {
                tracing::debug!("ignoring sort parameter: {e}");
                SortSpec::default()
            })
        })
        .unwrap_or_default();

    let page = get(KEY_PAGE)
        .and_then(parse_positive)
        .unwrap_or(DEFAULT_PAGE);

    let page_size = get(KEY_PAGE_SIZE)
        .and_then(parse_positive)
        .unwrap_or(DEFAULT_PAGE_SIZE)
        .min(MAX_PAGE_SIZE);

    QueryState {
        q: get(KEY_Q).unwrap_or_default().to_string(),
        status,
        priority,
        tag: Filter::tag(get(KEY_TAG).unwrap_or_default()),
        sort,
        page,
        page_size,
    }
}

/// Coerce a numeric string to a positive integer.
///
/// Accepts integral decimal forms such as `"2"`, `" 2 "` and `"2.0"`.
fn parse_positive(raw: &str) -> Option<u32> {
    let raw = raw.trim();
    let value = match raw.parse::<u32>() {
        Ok(v) => v,
        Err(_) => {
            let f = raw.parse::<f64>().ok()?;
            if !f.is_finite() || f.fract() != 0.0 || f < 1.0 || f > f64::from(u32::MAX) {
                return None;
            }
            f as u32
        }
    };
    (value > 0).then_some(value)
}

/// Sparse map of every dimension that differs from its default.
pub fn to_sparse(state: &QueryState) -> ParamMap {
    let defaults = QueryState::default();
    let mut map = ParamMap::new();

    if state.q != defaults.q {
        map.insert(KEY_Q.to_string(), state.q.clone());
    }
    if state.status != defaults.status {
        map.insert(KEY_STATUS.to_string(), state.status.to_string());
    }
    if state.priority != defaults.priority {
        map.insert(KEY_PRIORITY.to_string(), state.priority.to_string());
    }
    if state.tag != defaults.tag {
        map.insert(KEY_TAG.to_string(), state.tag.to_string());
    }
    if state.sort != defaults.sort {
        map.insert(KEY_SORT.to_string(), state.sort.to_string());
    }
    if state.page != defaults.page {
        map.insert(KEY_PAGE.to_string(), state.page.to_string());
    }
    if state.page_size != defaults.page_size {
        map.insert(KEY_PAGE_SIZE.to_string(), state.page_size.to_string());
    }
    map
}

/// Every dimension, defaults included. This is what goes over the wire.
pub fn to_full(state: &QueryState) -> ParamMap {
    PARAM_KEYS
        .iter()
        .map(|key| {
            let value = match *key {
                KEY_Q => state.q.clone(),
                KEY_STATUS => state.status.to_string(),
                KEY_PRIORITY => state.priority.to_string(),
                KEY_TAG => state.tag.to_string(),
                KEY_SORT => state.sort.to_string(),
                KEY_PAGE => state.page.to_string(),
                _ => state.page_size.to_string(),
            };
            (key.to_string(), value)
        })
        .collect()
}

/// Parse a query string (with or without the leading `?`).
///
/// When a key repeats, the first occurrence wins.
pub fn parse_query_string(query: &str) -> ParamMap {
    let query = query.strip_prefix('?').unwrap_or(query);
    let mut map = ParamMap::new();
    for (key, value) in form_urlencoded::parse(query.as_bytes()) {
        map.entry(key.into_owned()).or_insert_with(|| value.into_owned());
    }
    map
}

/// Encode a map as a query string without the leading `?`.
///
/// Known keys come first in canonical order; unknown keys follow sorted.
pub fn to_query_string(map: &ParamMap) -> String {
    let mut serializer = form_urlencoded::Serializer::new(String::new());
    for key in PARAM_KEYS {
        if let Some(value) = map.get(key) {
            serializer.append_pair(key, value);
        }
    }
    for (key, value) in map {
        if !PARAM_KEYS.contains(&key.as_str()) {
            serializer.append_pair(key, value);
        }
    }
    serializer.finish()
}

/// Canonical query string for a state; empty for the default listing.
pub fn canonical_query(state: &QueryState) -> String {
    to_query_string(&to_sparse(state))
}
