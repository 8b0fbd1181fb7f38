//! Detail screen state and actions.

use crate::api::UpdateTicket;
use crate::executor::QueryStatus;
use crate::form::{EditForm, FieldErrors, FormField};
use crate::types::{Ticket, TicketId};

/// What the detail screen renders for its ticket query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetailState<'a> {
    Loading,
    Loaded(&'a Ticket),
    NotFound,
    /// `retryable` decides whether a retry control is offered.
    Failed { message: &'a str, retryable: bool },
}

impl<'a> DetailState<'a> {
    pub fn from_status(status: &'a QueryStatus<Ticket>) -> Self {
        match status {
            QueryStatus::Loading => DetailState::Loading,
            QueryStatus::Success(ticket) => DetailState::Loaded(ticket),
            QueryStatus::Error(error) if error.is_not_found() => DetailState::NotFound,
            QueryStatus::Error(error) => DetailState::Failed {
                message: &error.message,
                retryable: error.is_retryable(),
            },
        }
    }
}

/// A mutation waiting for the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mutation {
    Update,
    Delete,
}

/// User intents on the detail screen
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DetailAction {
    OpenEdit,
    Edit(FormField),
    /// Close the edit form; a dirty form needs `discard`
    CloseEdit { discard: bool },
    Save,
    RequestDelete,
    CancelDelete,
    ConfirmDelete,
    Retry,
    Back,
}

/// What the driver has to do after an action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DetailEffect {
    None,
    /// Closing would lose edits; ask before discarding
    ConfirmDiscard,
    /// Validation failed locally; nothing is sent
    Invalid(FieldErrors),
    Update(UpdateTicket),
    Delete,
    Retry,
    Back,
}

#[derive(Debug, Clone)]
pub struct DetailPage {
    id: TicketId,
    edit: Option<EditForm>,
    confirm_delete: bool,
    pending: Option<Mutation>,
}

impl DetailPage {
    pub fn new(id: TicketId) -> Self {
        Self {
            id,
            edit: None,
            confirm_delete: false,
            pending: None,
        }
    }

    pub fn id(&self) -> &TicketId {
        &self.id
    }

    pub fn edit_form(&self) -> Option<&EditForm> {
        self.edit.as_ref()
    }

    pub fn is_confirming_delete(&self) -> bool {
        self.confirm_delete
    }

    pub fn pending(&self) -> Option<Mutation> {
        self.pending
    }

    /// Save is offered only for a dirty form with nothing in flight.
    pub fn can_save(&self) -> bool {
        self.pending.is_none() && self.edit.as_ref().is_some_and(EditForm::is_dirty)
    }

    /// `ticket` is the currently loaded ticket, if any.
    pub fn dispatch(&mut self, action: DetailAction, ticket: Option<&Ticket>) -> DetailEffect {
        match action {
            DetailAction::OpenEdit => {
                if let Some(ticket) = ticket {
                    self.edit = Some(EditForm::new(ticket));
                }
            }
            DetailAction::Edit(field) => {
                if let Some(form) = self.edit.as_mut() {
                    form.set(field);
                }
            }
            DetailAction::CloseEdit { discard } => {
                let dirty = self.edit.as_ref().is_some_and(EditForm::is_dirty);
                if dirty && !discard {
                    return DetailEffect::ConfirmDiscard;
                }
                self.edit = None;
            }
            DetailAction::Save => {
                if !self.can_save() {
                    return DetailEffect::None;
                }
                let Some(form) = self.edit.as_mut() else {
                    return DetailEffect::None;
                };
                return match form.validate() {
                    Ok(body) => {
                        self.pending = Some(Mutation::Update);
                        DetailEffect::Update(body)
                    }
                    Err(errors) => DetailEffect::Invalid(errors),
                };
            }
            DetailAction::RequestDelete => self.confirm_delete = true,
            DetailAction::CancelDelete => self.confirm_delete = false,
            DetailAction::ConfirmDelete => {
                if self.confirm_delete && self.pending.is_none() {
                    self.pending = Some(Mutation::Delete);
                    return DetailEffect::Delete;
                }
            }
            DetailAction::Retry => return DetailEffect::Retry,
            DetailAction::Back => return DetailEffect::Back,
        }
        DetailEffect::None
    }

    /// Record the outcome of an update. Success closes the form.
    pub fn update_finished(&mut self, ok: bool) {
        self.pending = None;
        if ok {
            self.edit = None;
        }
    }

    /// Record the outcome of a delete. The confirmation closes either way.
    pub fn delete_finished(&mut self) {
        self.pending = None;
        self.confirm_delete = false;
    }
}
