//! Ticket edit form
//!
//! Holds the pending edit buffer for one ticket and validates it locally.
//! Nothing that fails validation is ever sent to the service.

use std::collections::HashSet;
use std::fmt;

use serde::Serialize;

use crate::api::{CreateTicket, UpdateTicket};
use crate::types::{
    DESCRIPTION_MAX_LEN, MAX_TAGS, TAG_MAX_LEN, TITLE_MAX_LEN, TITLE_MIN_LEN, Ticket,
    TicketPriority, TicketStatus,
};

/// Per-field validation messages
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FieldErrors {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<String>,
}

impl FieldErrors {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.description.is_none() && self.tags.is_none()
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = [
            ("title", &self.title),
            ("description", &self.description),
            ("tags", &self.tags),
        ]
        .into_iter()
        .filter_map(|(field, msg)| msg.as_ref().map(|m| format!("{field}: {m}")))
        .collect();
        f.write_str(&parts.join("; "))
    }
}

pub fn validate_title(title: &str) -> Option<String> {
    let len = title.chars().count();
    if !(TITLE_MIN_LEN..=TITLE_MAX_LEN).contains(&len) {
        return Some(format!(
            "Title must be {TITLE_MIN_LEN}-{TITLE_MAX_LEN} characters"
        ));
    }
    None
}

pub fn validate_description(description: &str) -> Option<String> {
    if description.chars().count() > DESCRIPTION_MAX_LEN {
        return Some(format!(
            "Description must be at most {DESCRIPTION_MAX_LEN} characters"
        ));
    }
    None
}

/// Check count, then uniqueness, then per-tag length.
pub fn validate_tags(tags: &[String]) -> Option<String> {
    if tags.len() > MAX_TAGS {
        return Some(format!("Maximum {MAX_TAGS} tags"));
    }
    let unique: HashSet<&str> = tags.iter().map(String::as_str).collect();
    if unique.len() != tags.len() {
        return Some("Duplicate tags not allowed".to_string());
    }
    if tags
        .iter()
        .any(|t| t.is_empty() || t.chars().count() > TAG_MAX_LEN)
    {
        return Some(format!("Each tag must be 1-{TAG_MAX_LEN} characters"));
    }
    None
}

/// Split comma-separated tag text, trimming and dropping empty entries.
pub fn parse_tags(text: &str) -> Vec<String> {
    text.split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

/// Empty assignee text means unassigned. Anything else is kept verbatim.
fn assignee_from_text(text: &str) -> Option<String> {
    (!text.is_empty()).then(|| text.to_string())
}

/// A single editable field, as produced by an input widget.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormField {
    Title(String),
    Description(String),
    Status(TicketStatus),
    Priority(TicketPriority),
    Assignee(String),
    Tags(String),
}

/// Edit buffer seeded from a ticket snapshot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditForm {
    original: Ticket,
    pub title: String,
    pub description: String,
    pub status: TicketStatus,
    pub priority: TicketPriority,
    /// Free text; blank means unassigned.
    pub assignee: String,
    /// Comma-separated tags as typed.
    pub tags: String,
    pub errors: FieldErrors,
}

impl EditForm {
    pub fn new(ticket: &Ticket) -> Self {
        Self {
            original: ticket.clone(),
            title: ticket.title.clone(),
            description: ticket.description.clone(),
            status: ticket.status,
            priority: ticket.priority,
            assignee: ticket.assignee.clone().unwrap_or_default(),
            tags: ticket.tags_text(),
            errors: FieldErrors::default(),
        }
    }

    pub fn set(&mut self, field: FormField) {
        match field {
            FormField::Title(v) => self.title = v,
            FormField::Description(v) => self.description = v,
            FormField::Status(v) => self.status = v,
            FormField::Priority(v) => self.priority = v,
            FormField::Assignee(v) => self.assignee = v,
            FormField::Tags(v) => self.tags = v,
        }
    }

    pub fn ticket(&self) -> &Ticket {
        &self.original
    }

    /// Whether any field differs from the ticket it was opened for.
    pub fn is_dirty(&self) -> bool {
        self.title != self.original.title
            || self.description != self.original.description
            || self.status != self.original.status
            || self.priority != self.original.priority
            || assignee_from_text(&self.assignee) != self.original.assignee
            || self.tags != self.original.tags_text()
    }

    /// Validate the buffer, recording per-field errors on the form.
    ///
    /// On success returns the full update body to send.
    pub fn validate(&mut self) -> Result<UpdateTicket, FieldErrors> {
        let tags = parse_tags(&self.tags);
        let errors = FieldErrors {
            title: validate_title(&self.title),
            description: validate_description(&self.description),
            tags: validate_tags(&tags),
        };
        self.errors = errors.clone();
        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(UpdateTicket {
            title: Some(self.title.clone()),
            description: Some(self.description.clone()),
            status: Some(self.status),
            priority: Some(self.priority),
            assignee: Some(assignee_from_text(&self.assignee)),
            tags: Some(tags),
        })
    }
}

/// Validate a creation body with the same rules as the edit form.
pub fn validate_create(body: &CreateTicket) -> Result<(), FieldErrors> {
    let errors = FieldErrors {
        title: validate_title(&body.title),
        description: body.description.as_deref().and_then(validate_description),
        tags: body.tags.as_deref().and_then(validate_tags),
    };
    if errors.is_empty() { Ok(()) } else { Err(errors) }
}

/// Validate only the fields a partial update carries.
pub fn validate_update(body: &UpdateTicket) -> Result<(), FieldErrors> {
    let errors = FieldErrors {
        title: body.title.as_deref().and_then(validate_title),
        description: body.description.as_deref().and_then(validate_description),
        tags: body.tags.as_deref().and_then(validate_tags),
    };
    if errors.is_empty() { Ok(()) } else { Err(errors) }
}
