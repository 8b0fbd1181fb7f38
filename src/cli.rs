use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use std::io;

use crate::commands::{
    LsOptions, UpdateOptions, cmd_config_show, cmd_create, cmd_edit, cmd_ls, cmd_rm, cmd_show,
    cmd_url,
};
use crate::config::Config;
use crate::error::Result;
use crate::query::{Filter, SortSpec};
use crate::types::{TicketPriority, TicketStatus, VALID_PRIORITIES, VALID_STATUSES};

#[derive(Parser)]
#[command(name = "docket")]
#[command(about = "Browse and edit tickets through shareable list queries")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List tickets
    Ls {
        /// Start from a shareable list location (e.g. "/tickets?status=done&page=2")
        #[arg(long, default_value = "/tickets")]
        url: String,

        /// Search text matched against title and description
        #[arg(short, long)]
        q: Option<String>,

        /// Status filter: all, todo, in_progress, done
        #[arg(long, value_parser = parse_status_filter)]
        status: Option<Filter<TicketStatus>>,

        /// Priority filter: all, low, medium, high
        #[arg(long, value_parser = parse_priority_filter)]
        priority: Option<Filter<TicketPriority>>,

        /// Tag filter ("all" for any tag)
        #[arg(long)]
        tag: Option<String>,

        /// Sort order: createdAt_asc, createdAt_desc, updatedAt_asc, updatedAt_desc
        #[arg(long, value_parser = parse_sort)]
        sort: Option<SortSpec>,

        /// Page number (1-based)
        #[arg(long)]
        page: Option<u32>,

        /// Items per page (at most 50)
        #[arg(long)]
        page_size: Option<u32>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show one ticket
    Show {
        /// Ticket ID
        id: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Edit ticket fields
    Edit {
        /// Ticket ID
        id: String,

        /// New title
        #[arg(long)]
        title: Option<String>,

        #[command(flatten)]
        fields: FieldArgs,
    },

    /// Delete a ticket
    Rm {
        /// Ticket ID
        id: String,
    },

    /// Create a new ticket
    Create {
        /// Ticket title
        title: String,

        #[command(flatten)]
        fields: FieldArgs,
    },

    /// Print the canonical form of a list location
    Url {
        /// Location, e.g. "/tickets?page=1&status=done"
        href: String,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for [possible values: bash, zsh, fish, powershell, elvish]
        shell: Shell,
    },
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show the effective configuration
    Show {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

/// Ticket fields shared by `edit` and `create`
#[derive(clap::Args, Debug, Default)]
pub struct FieldArgs {
    /// Description text
    #[arg(short, long)]
    pub description: Option<String>,

    /// Status: todo, in_progress, done
    #[arg(short, long, value_parser = parse_status)]
    pub status: Option<TicketStatus>,

    /// Priority: low, medium, high
    #[arg(short, long, value_parser = parse_priority)]
    pub priority: Option<TicketPriority>,

    /// Assignee (empty to unassign)
    #[arg(short, long)]
    pub assignee: Option<String>,

    /// Comma-separated tags (empty to clear)
    #[arg(short, long)]
    pub tags: Option<String>,
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        let config = Config::load()?;

        match self.command {
            Commands::Ls {
                url,
                q,
                status,
                priority,
                tag,
                sort,
                page,
                page_size,
                json,
            } => {
                cmd_ls(
                    &config,
                    LsOptions {
                        url,
                        q,
                        status,
                        priority,
                        tag: tag.map(Filter::tag),
                        sort,
                        page,
                        page_size,
                        json,
                    },
                )
                .await
            }
            Commands::Show { id, json } => cmd_show(&config, &id, json).await,
            Commands::Edit { id, title, fields } => {
                let mut options: UpdateOptions = fields.into();
                options.title = title;
                cmd_edit(&config, &id, options).await
            }
            Commands::Rm { id } => cmd_rm(&config, &id).await,
            Commands::Create { title, fields } => {
                let mut options: UpdateOptions = fields.into();
                options.title = Some(title);
                cmd_create(&config, options).await
            }
            Commands::Url { href } => cmd_url(&href),
            Commands::Config {
                action: ConfigAction::Show { json },
            } => cmd_config_show(&config, json),
            Commands::Completions { shell } => {
                generate_completions(shell);
                Ok(())
            }
        }
    }
}

impl From<FieldArgs> for UpdateOptions {
    fn from(args: FieldArgs) -> Self {
        UpdateOptions {
            title: None,
            description: args.description,
            status: args.status,
            priority: args.priority,
            assignee: args.assignee,
            tags: args.tags,
        }
    }
}

fn parse_with_validation<T>(
    s: &str,
    parse: impl FnOnce(&str) -> std::result::Result<T, String>,
    what: &str,
    valid: &[&str],
) -> std::result::Result<T, String> {
    parse(s).map_err(|_| format!("invalid {what} '{s}'. Must be one of: {}", valid.join(", ")))
}

fn parse_status(s: &str) -> std::result::Result<TicketStatus, String> {
    parse_with_validation(s, |v| v.parse().map_err(|_| String::new()), "status", VALID_STATUSES)
}

fn parse_priority(s: &str) -> std::result::Result<TicketPriority, String> {
    parse_with_validation(
        s,
        |v| v.parse().map_err(|_| String::new()),
        "priority",
        VALID_PRIORITIES,
    )
}

fn parse_status_filter(s: &str) -> std::result::Result<Filter<TicketStatus>, String> {
    if s.eq_ignore_ascii_case(crate::query::ALL) {
        return Ok(Filter::All);
    }
    parse_status(s).map(Filter::Only)
}

fn parse_priority_filter(s: &str) -> std::result::Result<Filter<TicketPriority>, String> {
    if s.eq_ignore_ascii_case(crate::query::ALL) {
        return Ok(Filter::All);
    }
    parse_priority(s).map(Filter::Only)
}

fn parse_sort(s: &str) -> std::result::Result<SortSpec, String> {
    parse_with_validation(
        s,
        |v| v.parse().map_err(|_| String::new()),
        "sort",
        SortSpec::ALL_STRINGS,
    )
}

pub fn generate_completions(shell: Shell) {
    let mut cmd = Cli::command();
    clap_complete::generate(shell, &mut cmd, "docket", &mut io::stdout());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_filter_parsers_accept_all() {
        assert_eq!(parse_status_filter("all").unwrap(), Filter::All);
        assert_eq!(
            parse_status_filter("done").unwrap(),
            Filter::Only(TicketStatus::Done)
        );
        assert_eq!(parse_priority_filter("ALL").unwrap(), Filter::All);
    }

    #[test]
    fn test_parse_errors_list_valid_values() {
        let err = parse_status("closed").unwrap_err();
        assert!(err.contains("todo, in_progress, done"));
        let err = parse_sort("title_asc").unwrap_err();
        assert!(err.contains("createdAt_asc"));
    }

    #[test]
    fn test_ls_flags_parse() {
        let cli = Cli::try_parse_from([
            "docket", "ls", "--status", "done", "--page-size", "10", "-q", "login",
        ])
        .unwrap();
        match cli.command {
            Commands::Ls {
                status, page_size, q, ..
            } => {
                assert_eq!(status, Some(Filter::Only(TicketStatus::Done)));
                assert_eq!(page_size, Some(10));
                assert_eq!(q.as_deref(), Some("login"));
            }
            _ => panic!("expected ls"),
        }
    }
}
