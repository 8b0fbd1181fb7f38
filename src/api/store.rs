//! In-memory ticket collection.

use jiff::Timestamp;
use parking_lot::RwLock;

use crate::api::{CreateTicket, UpdateTicket};
use crate::error::{DocketError, Result};
use crate::form::{validate_create, validate_update};
use crate::query::{QueryState, filter_sort_paginate};
use crate::types::{Page, Ticket, TicketId};

/// The authoritative ticket collection, newest insertions first.
#[derive(Debug, Default)]
pub struct TicketStore {
    tickets: RwLock<Vec<Ticket>>,
}

impl TicketStore {
    pub fn new(tickets: Vec<Ticket>) -> Self {
        Self {
            tickets: RwLock::new(tickets),
        }
    }

    pub fn len(&self) -> usize {
        self.tickets.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.tickets.read().is_empty()
    }

    /// Copy of the whole collection in storage order.
    pub fn snapshot(&self) -> Vec<Ticket> {
        self.tickets.read().clone()
    }

    pub fn list(&self, query: &QueryState) -> Page<Ticket> {
        filter_sort_paginate(&self.tickets.read(), query)
    }

    pub fn get(&self, id: &TicketId) -> Result<Ticket> {
        self.tickets
            .read()
            .iter()
            .find(|t| &t.id == id)
            .cloned()
            .ok_or_else(|| DocketError::TicketNotFound(id.to_string()))
    }

    pub fn create(&self, body: &CreateTicket, now: Timestamp) -> Result<Ticket> {
        validate_create(body).map_err(DocketError::Validation)?;

        let ticket = Ticket {
            id: TicketId::generate(),
            title: body.title.clone(),
            description: body.description.clone().unwrap_or_default(),
            status: body.status.unwrap_or_default(),
            priority: body.priority.unwrap_or_default(),
            assignee: body.assignee.clone().filter(|a| !a.is_empty()),
            tags: body.tags.clone().unwrap_or_default(),
            created_at: now,
            updated_at: now,
        };
        self.tickets.write().insert(0, ticket.clone());
        Ok(ticket)
    }

    /// Merge a partial update and refresh `updated_at`.
    pub fn update(&self, id: &TicketId, body: &UpdateTicket, now: Timestamp) -> Result<Ticket> {
        validate_update(body).map_err(DocketError::Validation)?;

        let mut tickets = self.tickets.write();
        let ticket = tickets
            .iter_mut()
            .find(|t| &t.id == id)
            .ok_or_else(|| DocketError::TicketNotFound(id.to_string()))?;
        body.merge_into(ticket);
        ticket.touch(now);
        Ok(ticket.clone())
    }

    pub fn delete(&self, id: &TicketId) -> Result<()> {
        let mut tickets = self.tickets.write();
        let index = tickets
            .iter()
            .position(|t| &t.id == id)
            .ok_or_else(|| DocketError::TicketNotFound(id.to_string()))?;
        tickets.remove(index);
        Ok(())
    }
}
