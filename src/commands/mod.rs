//! CLI command implementations.
//!
//! Every command runs against a freshly seeded mock service, driving the same
//! [`App`] a screen would.

mod config;
mod create;
mod edit;
mod href;
mod ls;
mod show;

pub use config::cmd_config_show;
pub use create::cmd_create;
pub use edit::{UpdateOptions, cmd_edit, cmd_rm};
pub use href::cmd_url;
pub use ls::{LsOptions, cmd_ls};
pub use show::cmd_show;

use std::sync::Arc;

use owo_colors::OwoColorize;
use serde_json::Value;

use crate::api::{HttpTicketApi, MockServer, TicketApi};
use crate::app::{App, AppOptions};
use crate::config::Config;
use crate::error::{DocketError, Result};
use crate::navigation::MemoryLocation;
use crate::notify::{SystemClock, ToastLevel};
use crate::types::{Ticket, TicketPriority, TicketStatus};

/// Output of a command in both machine and human form.
pub struct CommandOutput {
    json: Value,
    text: Option<String>,
}

impl CommandOutput {
    pub fn new(json: Value) -> Self {
        Self { json, text: None }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn print(self, as_json: bool) -> Result<()> {
        match (as_json, self.text) {
            (false, Some(text)) => println!("{text}"),
            _ => println!("{}", serde_json::to_string_pretty(&self.json)?),
        }
        Ok(())
    }
}

/// The mock service described by the configuration.
pub fn mock_api(config: &Config) -> Arc<dyn TicketApi> {
    let server = MockServer::seeded(config.mock.ticket_count, config.mock.seed, config.mock.anchor())
        .with_faults(config.mock.faults());
    Arc::new(HttpTicketApi::new(server))
}

/// An app mounted at `href` and loaded.
pub async fn open_app(config: &Config, href: &str) -> App<MemoryLocation> {
    let mut app = App::new(
        mock_api(config),
        Arc::new(SystemClock),
        MemoryLocation::new(href),
        AppOptions::from(config),
    );
    app.refresh().await;
    app
}

/// Turn the newest error notification into a command failure.
pub fn fail_on_error_toast<L>(app: &App<L>) -> Result<()>
where
    L: crate::navigation::Location,
{
    match app
        .toasts()
        .iter()
        .rev()
        .find(|t| t.level == ToastLevel::Error)
    {
        Some(toast) => Err(DocketError::Other(toast.message.clone())),
        None => Ok(()),
    }
}

pub fn colored_status(status: TicketStatus) -> String {
    let label = format!("[{status}]");
    match status {
        TicketStatus::Todo => label.yellow().to_string(),
        TicketStatus::InProgress => label.cyan().to_string(),
        TicketStatus::Done => label.green().to_string(),
    }
}

pub fn colored_priority(priority: TicketPriority) -> String {
    let label = priority.to_string();
    match priority {
        TicketPriority::High => label.red().to_string(),
        TicketPriority::Medium => label,
        TicketPriority::Low => label.dimmed().to_string(),
    }
}

/// Multi-line human form of one ticket.
pub fn format_ticket_detail(ticket: &Ticket) -> String {
    let mut out = String::new();
    out.push_str(&format!("{} {}\n", ticket.id.as_str().cyan(), ticket.title.bold()));
    out.push_str(&format!(
        "{} priority: {}\n",
        colored_status(ticket.status),
        colored_priority(ticket.priority)
    ));
    out.push_str(&format!(
        "assignee: {}\n",
        ticket.assignee.as_deref().unwrap_or("unassigned")
    ));
    if !ticket.tags.is_empty() {
        out.push_str(&format!("tags: {}\n", ticket.tags_text()));
    }
    out.push_str(&format!(
        "{}\n",
        format!("created {} / updated {}", ticket.created_at, ticket.updated_at).dimmed()
    ));
    if !ticket.description.is_empty() {
        out.push('\n');
        out.push_str(&ticket.description);
        out.push('\n');
    }
    out
}
