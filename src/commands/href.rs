use crate::error::Result;
use crate::navigation::{HistoryMode, LIST_PATH, Location, MemoryLocation, QuerySync, Route};

/// Print the canonical form of a location
///
/// List locations get their query string normalized and made sparse. Detail
/// locations are printed as-is; anything else falls back to the list.
pub fn cmd_url(href: &str) -> Result<()> {
    println!("{}", canonical_href(href));
    Ok(())
}

pub fn canonical_href(href: &str) -> String {
    let mut location = MemoryLocation::new(href);
    match Route::parse(&location.pathname()) {
        Ok(Route::List) => {}
        Ok(route @ Route::Detail(_)) => return route.path(),
        Err(_) => location.replace(LIST_PATH),
    }
    let mut sync = QuerySync::new(location, HistoryMode::Replace);
    sync.canonicalize();
    sync.location().href()
}
