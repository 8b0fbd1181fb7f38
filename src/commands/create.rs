use owo_colors::OwoColorize;

use super::{UpdateOptions, mock_api};
use crate::api::CreateTicket;
use crate::config::Config;
use crate::error::{DocketError, Result};
use crate::form::{parse_tags, validate_create};

/// Create a new ticket
pub async fn cmd_create(config: &Config, options: UpdateOptions) -> Result<()> {
    let body = CreateTicket {
        title: options.title.unwrap_or_default(),
        description: options.description,
        status: options.status,
        priority: options.priority,
        assignee: options.assignee.filter(|a| !a.is_empty()),
        tags: options.tags.as_deref().map(parse_tags),
    };
    validate_create(&body).map_err(DocketError::Validation)?;

    let ticket = mock_api(config).create_ticket(&body).await?;
    println!("{} {}", "Created".green(), ticket.id.as_str().cyan());
    Ok(())
}
