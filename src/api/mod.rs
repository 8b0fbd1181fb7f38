//! Remote ticket collaborator.
//!
//! [`TicketApi`] is the seam between the application and whatever serves
//! tickets. The crate ships an in-memory implementation shaped like the HTTP
//! contract: [`server::MockServer`] answers `http` requests against a
//! [`store::TicketStore`], and [`client::HttpTicketApi`] speaks to it (or any
//! other [`client::Transport`]) and maps failures onto [`DocketError`].
//!
//! [`DocketError`]: crate::error::DocketError

use async_trait::async_trait;
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::Result;
use crate::query::QueryState;
use crate::types::{Page, Ticket, TicketId, TicketPriority, TicketStatus};

pub mod client;
pub mod seed;
pub mod server;
pub mod store;

pub use client::{HttpTicketApi, Transport};
pub use seed::generate_tickets;
pub use server::{FaultConfig, MockServer};
pub use store::TicketStore;

pub const API_PREFIX: &str = "/api/tickets";

#[async_trait]
pub trait TicketApi: Send + Sync {
    async fn list_tickets(&self, query: &QueryState) -> Result<Page<Ticket>>;

    async fn get_ticket(&self, id: &TicketId) -> Result<Ticket>;

    async fn create_ticket(&self, body: &CreateTicket) -> Result<Ticket>;

    async fn update_ticket(&self, id: &TicketId, body: &UpdateTicket) -> Result<Ticket>;

    async fn delete_ticket(&self, id: &TicketId) -> Result<()>;
}

/// Partial update body. Absent fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTicket {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<TicketStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<TicketPriority>,
    /// `Some(None)` clears the assignee; `None` leaves it alone.
    #[serde(
        default,
        deserialize_with = "deserialize_some",
        skip_serializing_if = "Option::is_none"
    )]
    pub assignee: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
}

impl UpdateTicket {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Merge the present fields into `ticket`. Does not touch timestamps.
    pub fn merge_into(&self, ticket: &mut Ticket) {
        if let Some(title) = &self.title {
            ticket.title = title.clone();
        }
        if let Some(description) = &self.description {
            ticket.description = description.clone();
        }
        if let Some(status) = self.status {
            ticket.status = status;
        }
        if let Some(priority) = self.priority {
            ticket.priority = priority;
        }
        if let Some(assignee) = &self.assignee {
            ticket.assignee = assignee.clone();
        }
        if let Some(tags) = &self.tags {
            ticket.tags = tags.clone();
        }
    }
}

/// Distinguish an explicit `null` from a missing field.
fn deserialize_some<'de, D, T>(deserializer: D) -> std::result::Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

/// Creation body. Only the title is required.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTicket {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<TicketStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<TicketPriority>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignee: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
}

impl CreateTicket {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteResponse {
    pub ok: bool,
}
