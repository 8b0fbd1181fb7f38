//! Client side of the ticket HTTP contract.

use async_trait::async_trait;
use http::{Method, Request, Response, StatusCode, header};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::api::{API_PREFIX, CreateTicket, DeleteResponse, TicketApi, UpdateTicket};
use crate::error::{DocketError, ErrorBody, Result};
use crate::query::QueryState;
use crate::query::params::{to_full, to_query_string};
use crate::types::{Page, Ticket, TicketId};

/// Moves one request to the service and brings back its response.
///
/// An `Err` means no response was produced at all.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: Request<String>) -> Result<Response<String>>;
}

/// [`TicketApi`] over any [`Transport`].
pub struct HttpTicketApi<T> {
    transport: T,
}

impl<T: Transport> HttpTicketApi<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    async fn call<R: DeserializeOwned + Send>(
        &self,
        request: Request<String>,
        fallback: &str,
        id: Option<&TicketId>,
    ) -> Result<R> {
        let method = request.method().clone();
        let uri = request.uri().clone();
        tracing::debug!(%method, %uri, "sending request");

        let response = self.transport.send(request).await?;
        let status = response.status();
        if status.is_success() {
            return Ok(serde_json::from_str(response.body())?);
        }

        let body: ErrorBody = serde_json::from_str(response.body()).unwrap_or(ErrorBody {
            message: None,
            code: None,
        });
        tracing::debug!(%method, %uri, %status, code = ?body.code, "request failed");

        if let (StatusCode::NOT_FOUND, Some(id)) = (status, id) {
            return Err(DocketError::TicketNotFound(id.to_string()));
        }
        Err(DocketError::Service {
            status: status.as_u16(),
            message: body
                .message
                .filter(|m| !m.trim().is_empty())
                .unwrap_or_else(|| fallback.to_string()),
            code: body.code.unwrap_or_default(),
        })
    }
}

fn build(method: Method, uri: &str, body: Option<String>) -> Result<Request<String>> {
    let mut builder = Request::builder().method(method).uri(uri);
    if body.is_some() {
        builder = builder.header(header::CONTENT_TYPE, "application/json");
    }
    Ok(builder.body(body.unwrap_or_default())?)
}

fn json_body<B: Serialize>(body: &B) -> Result<Option<String>> {
    Ok(Some(serde_json::to_string(body)?))
}

fn ticket_uri(id: &TicketId) -> String {
    let encoded: String = url::form_urlencoded::byte_serialize(id.as_str().as_bytes()).collect();
    format!("{API_PREFIX}/{encoded}")
}

#[async_trait]
impl<T: Transport> TicketApi for HttpTicketApi<T> {
    async fn list_tickets(&self, query: &QueryState) -> Result<Page<Ticket>> {
        let uri = format!("{API_PREFIX}?{}", to_query_string(&to_full(query)));
        let request = build(Method::GET, &uri, None)?;
        self.call(request, "Failed to fetch tickets", None).await
    }

    async fn get_ticket(&self, id: &TicketId) -> Result<Ticket> {
        let request = build(Method::GET, &ticket_uri(id), None)?;
        self.call(request, "Failed to fetch ticket", Some(id)).await
    }

    async fn create_ticket(&self, body: &CreateTicket) -> Result<Ticket> {
        let request = build(Method::POST, API_PREFIX, json_body(body)?)?;
        self.call(request, "Failed to create ticket", None).await
    }

    async fn update_ticket(&self, id: &TicketId, body: &UpdateTicket) -> Result<Ticket> {
        let request = build(Method::PATCH, &ticket_uri(id), json_body(body)?)?;
        self.call(request, "Failed to update ticket", Some(id)).await
    }

    async fn delete_ticket(&self, id: &TicketId) -> Result<()> {
        let request = build(Method::DELETE, &ticket_uri(id), None)?;
        let _: DeleteResponse = self.call(request, "Failed to delete ticket", Some(id)).await?;
        Ok(())
    }
}
