//! Ticket list and detail state kept in sync with a shareable location.
//!
//! The list query (search text, filters, sort, page) lives in the location's
//! query string. [`navigation::QuerySync`] reads and writes it,
//! [`executor::QueryExecutor`] runs the remote query keyed by the full
//! [`query::QueryState`], and [`query::engine`] is the service-side
//! filter/sort/paginate pipeline.

pub mod api;
pub mod app;
pub mod cli;
pub mod commands;
pub mod config;
pub mod debounce;
pub mod detail;
pub mod error;
pub mod executor;
pub mod form;
pub mod list;
pub mod macros;
pub mod navigation;
pub mod notify;
pub mod query;
pub mod types;

pub use app::{App, AppOptions, Screen};
pub use config::Config;
pub use error::{DocketError, ErrorKind, Result};
pub use executor::{QueryClient, QueryError, QueryExecutor, QueryStatus};
pub use navigation::{HistoryMode, Location, MemoryLocation, QuerySync, Route};
pub use query::{Filter, QueryPatch, QueryState, SortSpec, normalize, to_sparse};
pub use types::{Page, Ticket, TicketId, TicketPriority, TicketStatus};
