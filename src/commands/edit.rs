use owo_colors::OwoColorize;

use super::{CommandOutput, fail_on_error_toast, format_ticket_detail, open_app};
use crate::app::App;
use crate::config::Config;
use crate::detail::{DetailAction, DetailState};
use crate::error::{DocketError, Result};
use crate::form::FormField;
use crate::navigation::{Location, Route};
use crate::types::{Ticket, TicketId, TicketPriority, TicketStatus};

/// Field values given on the command line
#[derive(Debug, Default, Clone)]
pub struct UpdateOptions {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<TicketStatus>,
    pub priority: Option<TicketPriority>,
    pub assignee: Option<String>,
    /// Comma-separated
    pub tags: Option<String>,
}

impl UpdateOptions {
    /// The form edits these options amount to.
    pub fn form_fields(&self) -> Vec<FormField> {
        let mut fields = Vec::new();
        if let Some(title) = &self.title {
            fields.push(FormField::Title(title.clone()));
        }
        if let Some(description) = &self.description {
            fields.push(FormField::Description(description.clone()));
        }
        if let Some(status) = self.status {
            fields.push(FormField::Status(status));
        }
        if let Some(priority) = self.priority {
            fields.push(FormField::Priority(priority));
        }
        if let Some(assignee) = &self.assignee {
            fields.push(FormField::Assignee(assignee.clone()));
        }
        if let Some(tags) = &self.tags {
            fields.push(FormField::Tags(tags.clone()));
        }
        fields
    }
}

async fn open_detail(config: &Config, id: &str) -> Result<(App<crate::navigation::MemoryLocation>, Ticket)> {
    let app = open_app(config, &Route::Detail(TicketId::new(id)).path()).await;
    let ticket = match app.detail_state() {
        Some(DetailState::Loaded(ticket)) => ticket.clone(),
        Some(DetailState::Failed { message, .. }) => {
            return Err(DocketError::Other(message.to_string()));
        }
        _ => return Err(DocketError::TicketNotFound(id.to_string())),
    };
    Ok((app, ticket))
}

/// Edit ticket fields through the edit form
pub async fn cmd_edit(config: &Config, id: &str, options: UpdateOptions) -> Result<()> {
    let (mut app, _) = open_detail(config, id).await?;

    app.detail_action(DetailAction::OpenEdit).await;
    for field in options.form_fields() {
        app.detail_action(DetailAction::Edit(field)).await;
    }

    let form = app.detail().and_then(|(page, _)| page.edit_form().cloned());
    let Some(mut form) = form else {
        return Err(DocketError::Other("edit form did not open".to_string()));
    };
    if !form.is_dirty() {
        println!("{}", "No changes".dimmed());
        return Ok(());
    }
    if let Err(errors) = form.validate() {
        return Err(DocketError::Validation(errors));
    }

    app.detail_action(DetailAction::Save).await;
    fail_on_error_toast(&app)?;

    let Some(DetailState::Loaded(ticket)) = app.detail_state() else {
        return Err(DocketError::Other("updated ticket could not be reloaded".to_string()));
    };
    CommandOutput::new(serde_json::to_value(ticket)?)
        .with_text(format!("{}\n{}", "Ticket updated".green(), format_ticket_detail(ticket)))
        .print(false)
}

/// Delete a ticket after the usual confirmation step
pub async fn cmd_rm(config: &Config, id: &str) -> Result<()> {
    let (mut app, ticket) = open_detail(config, id).await?;

    app.detail_action(DetailAction::RequestDelete).await;
    app.detail_action(DetailAction::ConfirmDelete).await;
    fail_on_error_toast(&app)?;

    tracing::debug!(href = %app.location().href(), "delete finished");
    println!("{} {}", "Ticket deleted".green(), ticket.id.as_str().cyan());
    Ok(())
}
