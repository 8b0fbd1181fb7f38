use owo_colors::OwoColorize;
use serde_json::json;
use tabled::settings::Style;
use tabled::{Table, Tabled};

use super::{CommandOutput, colored_priority, colored_status, open_app};
use crate::config::Config;
use crate::error::{DocketError, Result};
use crate::executor::QueryStatus;
use crate::navigation::{LIST_PATH, join_href, split_href};
use crate::query::params::{canonical_query, parse_query_string};
use crate::query::{Filter, QueryPatch, SortSpec, normalize};
use crate::types::{TicketPriority, TicketStatus};

/// Flags of `docket ls`
#[derive(Debug, Default)]
pub struct LsOptions {
    pub url: String,
    pub q: Option<String>,
    pub status: Option<Filter<TicketStatus>>,
    pub priority: Option<Filter<TicketPriority>>,
    pub tag: Option<Filter<String>>,
    pub sort: Option<SortSpec>,
    pub page: Option<u32>,
    pub page_size: Option<u32>,
    pub json: bool,
}

impl LsOptions {
    fn patch(&self) -> QueryPatch {
        let mut patch = QueryPatch::new();
        if let Some(q) = &self.q {
            patch = patch.q(q.clone());
        }
        if let Some(status) = &self.status {
            patch = patch.status(status.clone());
        }
        if let Some(priority) = &self.priority {
            patch = patch.priority(priority.clone());
        }
        if let Some(tag) = &self.tag {
            patch = patch.tag(tag.clone());
        }
        if let Some(sort) = self.sort {
            patch = patch.sort(sort);
        }
        if let Some(page) = self.page {
            patch = patch.page(page);
        }
        if let Some(page_size) = self.page_size {
            patch = patch.page_size(page_size);
        }
        patch
    }

    /// The list location the flags describe, starting from `--url`.
    pub fn href(&self) -> String {
        let (_, query) = split_href(&self.url);
        let state = normalize(&parse_query_string(query)).apply(&self.patch());
        join_href(LIST_PATH, &canonical_query(&state))
    }
}

#[derive(Tabled)]
struct TicketRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Priority")]
    priority: String,
    #[tabled(rename = "Title")]
    title: String,
    #[tabled(rename = "Tags")]
    tags: String,
    #[tabled(rename = "Updated")]
    updated: String,
}

/// List one page of tickets
pub async fn cmd_ls(config: &Config, options: LsOptions) -> Result<()> {
    let app = open_app(config, &options.href()).await;

    let rendered = app.with_list_view(|view| match view.status {
        QueryStatus::Loading => Err(DocketError::Other("list query did not complete".to_string())),
        QueryStatus::Error(error) => Err(DocketError::Other(error.message.clone())),
        QueryStatus::Success(page) => {
            let json_output = json!({
                "href": view.href,
                "query": crate::query::to_sparse(view.query),
                "page": page,
                "totalPages": page.total_pages(),
            });

            let mut text = String::new();
            if page.items.is_empty() {
                text.push_str(&"No tickets found".dimmed().to_string());
                text.push('\n');
            } else {
                let rows: Vec<TicketRow> = page
                    .items
                    .iter()
                    .map(|t| TicketRow {
                        id: t.id.to_string(),
                        status: colored_status(t.status),
                        priority: colored_priority(t.priority),
                        title: t.title.clone(),
                        tags: t.tags_text(),
                        updated: t.updated_at.strftime("%Y-%m-%d %H:%M").to_string(),
                    })
                    .collect();
                let mut table = Table::new(rows);
                table.with(Style::modern());
                text.push_str(&table.to_string());
                text.push('\n');
            }
            text.push_str(&format!(
                "page {} of {} ({} tickets, {} per page)\n",
                page.page,
                page.total_pages().max(1),
                page.total,
                page.page_size
            ));
            text.push_str(&format!("{}", view.href.dimmed()));

            Ok(CommandOutput::new(json_output).with_text(text))
        }
    });

    match rendered {
        Some(output) => output?.print(options.json),
        None => Err(DocketError::InvalidRoute(options.url)),
    }
}
