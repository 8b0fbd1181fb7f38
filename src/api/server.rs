//! HTTP-shaped mock of the ticket service.
//!
//! Routes:
//! - `GET    /api/tickets?q&status&priority&tag&sort&page&pageSize`
//! - `POST   /api/tickets`
//! - `GET    /api/tickets/{id}`
//! - `PATCH  /api/tickets/{id}`
//! - `DELETE /api/tickets/{id}`
//!
//! Every failure answers with an [`ErrorBody`] `{message, code}`.

use std::ops::RangeInclusive;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use http::{Method, Request, Response, StatusCode, header};
use jiff::Timestamp;
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;

use crate::api::client::Transport;
use crate::api::seed::generate_tickets;
use crate::api::store::TicketStore;
use crate::api::{API_PREFIX, CreateTicket, DeleteResponse, UpdateTicket};
use crate::error::{DocketError, ErrorBody, GENERIC_ERROR_MESSAGE, Result};
use crate::query::normalize;
use crate::query::params::parse_query_string;
use crate::types::TicketId;

/// Simulated latency and random failures.
///
/// Off by default. [`FaultConfig::flaky`] reproduces the demo setup of a
/// slow, unreliable backend.
#[derive(Debug, Clone, PartialEq)]
pub struct FaultConfig {
    pub latency_ms: RangeInclusive<u64>,
    /// Probability in `[0, 1]` that a request fails with `E_RANDOM`.
    pub failure_rate: f64,
}

impl Default for FaultConfig {
    fn default() -> Self {
        Self {
            latency_ms: 0..=0,
            failure_rate: 0.0,
        }
    }
}

impl FaultConfig {
    pub fn flaky() -> Self {
        Self {
            latency_ms: 800..=1500,
            failure_rate: 0.2,
        }
    }

    pub fn is_disabled(&self) -> bool {
        *self.latency_ms.end() == 0 && self.failure_rate <= 0.0
    }
}

pub struct MockServer {
    store: Arc<TicketStore>,
    faults: FaultConfig,
    rng: Mutex<StdRng>,
}

impl MockServer {
    pub fn new(store: Arc<TicketStore>, faults: FaultConfig, seed: u64) -> Self {
        Self {
            store,
            faults,
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    /// A server over `count` generated tickets created before `anchor`.
    pub fn seeded(count: usize, seed: u64, anchor: Timestamp) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let tickets = generate_tickets(count, &mut rng, anchor);
        Self {
            store: Arc::new(TicketStore::new(tickets)),
            faults: FaultConfig::default(),
            rng: Mutex::new(rng),
        }
    }

    pub fn with_faults(mut self, faults: FaultConfig) -> Self {
        self.faults = faults;
        self
    }

    pub fn store(&self) -> &Arc<TicketStore> {
        &self.store
    }

    /// Answer one request.
    pub async fn handle(&self, request: Request<String>) -> Response<String> {
        let (delay, fail) = self.roll_faults();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        if fail {
            tracing::debug!(uri = %request.uri(), "injecting random failure");
            return error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorBody::new(GENERIC_ERROR_MESSAGE, ErrorBody::RANDOM),
            );
        }
        self.route(request)
    }

    fn roll_faults(&self) -> (Duration, bool) {
        if self.faults.is_disabled() {
            return (Duration::ZERO, false);
        }
        let mut rng = self.rng.lock();
        let (lo, hi) = (*self.faults.latency_ms.start(), *self.faults.latency_ms.end());
        let latency = if hi > lo { rng.random_range(lo..=hi) } else { hi };
        let fail = rng.random_bool(self.faults.failure_rate.clamp(0.0, 1.0));
        (Duration::from_millis(latency), fail)
    }

    fn route(&self, request: Request<String>) -> Response<String> {
        let path = request.uri().path().trim_end_matches('/').to_string();
        let Some(rest) = path.strip_prefix(API_PREFIX) else {
            return not_found();
        };

        let outcome = match (rest.strip_prefix('/'), request.method()) {
            (None, _) if !rest.is_empty() => return not_found(),
            (None, &Method::GET) => self.list(request.uri().query().unwrap_or("")),
            (None, &Method::POST) => self.create(request.body()),
            (None, _) => return method_not_allowed(),
            (Some(id), _) if id.is_empty() || id.contains('/') => return not_found(),
            (Some(id), &Method::GET) => self.get(&TicketId::new(id)),
            (Some(id), &Method::PATCH) => self.update(&TicketId::new(id), request.body()),
            (Some(id), &Method::DELETE) => self.delete(&TicketId::new(id)),
            (Some(_), _) => return method_not_allowed(),
        };

        outcome.unwrap_or_else(|e| map_error(&e))
    }

    fn list(&self, query: &str) -> Result<Response<String>> {
        let state = normalize(&parse_query_string(query));
        json_response(StatusCode::OK, &self.store.list(&state))
    }

    fn get(&self, id: &TicketId) -> Result<Response<String>> {
        json_response(StatusCode::OK, &self.store.get(id)?)
    }

    fn create(&self, body: &str) -> Result<Response<String>> {
        let body: CreateTicket = serde_json::from_str(body)?;
        let ticket = self.store.create(&body, Timestamp::now())?;
        json_response(StatusCode::CREATED, &ticket)
    }

    fn update(&self, id: &TicketId, body: &str) -> Result<Response<String>> {
        let body: UpdateTicket = serde_json::from_str(body)?;
        let ticket = self.store.update(id, &body, Timestamp::now())?;
        json_response(StatusCode::OK, &ticket)
    }

    fn delete(&self, id: &TicketId) -> Result<Response<String>> {
        self.store.delete(id)?;
        json_response(StatusCode::OK, &DeleteResponse { ok: true })
    }
}

#[async_trait]
impl Transport for MockServer {
    async fn send(&self, request: Request<String>) -> Result<Response<String>> {
        Ok(self.handle(request).await)
    }
}

fn json_response<T: Serialize>(status: StatusCode, body: &T) -> Result<Response<String>> {
    let body = serde_json::to_string(body)?;
    Ok(Response::builder()
        .status(status)
        .header(header::CONTENT_TYPE, "application/json")
        .body(body)?)
}

fn error_response(status: StatusCode, body: ErrorBody) -> Response<String> {
    let text = serde_json::to_string(&body).unwrap_or_default();
    let mut response = Response::new(text);
    *response.status_mut() = status;
    response.headers_mut().insert(
        header::CONTENT_TYPE,
        header::HeaderValue::from_static("application/json"),
    );
    response
}

fn not_found() -> Response<String> {
    error_response(StatusCode::NOT_FOUND, ErrorBody::new("Not found", ErrorBody::NOT_FOUND))
}

fn method_not_allowed() -> Response<String> {
    error_response(
        StatusCode::METHOD_NOT_ALLOWED,
        ErrorBody::new("Method not allowed", ErrorBody::METHOD_NOT_ALLOWED),
    )
}

fn map_error(error: &DocketError) -> Response<String> {
    match error {
        DocketError::TicketNotFound(_) => not_found(),
        DocketError::Validation(_) | DocketError::Json(_) => error_response(
            StatusCode::BAD_REQUEST,
            ErrorBody::new(error.to_string(), ErrorBody::BAD_REQUEST),
        ),
        other => {
            tracing::warn!("mock server failure: {other}");
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorBody::new(GENERIC_ERROR_MESSAGE, "E_INTERNAL"),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Page, Ticket};

    fn anchor() -> Timestamp {
        "2024-06-30T00:00:00Z".parse().unwrap()
    }

    fn request(method: Method, uri: &str, body: &str) -> Request<String> {
        Request::builder()
            .method(method)
            .uri(uri)
            .body(body.to_string())
            .unwrap()
    }

    fn error_code(response: &Response<String>) -> Option<String> {
        serde_json::from_str::<ErrorBody>(response.body()).unwrap().code
    }

    #[tokio::test]
    async fn test_list_applies_query_string() {
        let server = MockServer::seeded(80, 42, anchor());
        let response = server
            .handle(request(Method::GET, "/api/tickets?pageSize=500&page=2", ""))
            .await;
        assert_eq!(response.status(), StatusCode::OK);
        let page: Page<Ticket> = serde_json::from_str(response.body()).unwrap();
        assert_eq!(page.total, 80);
        assert_eq!(page.page_size, 50);
        assert_eq!(page.items.len(), 30);
    }

    #[tokio::test]
    async fn test_unknown_id_is_not_found() {
        let server = MockServer::seeded(3, 1, anchor());
        for method in [Method::GET, Method::PATCH, Method::DELETE] {
            let response = server
                .handle(request(method, "/api/tickets/nope", "{}"))
                .await;
            assert_eq!(response.status(), StatusCode::NOT_FOUND);
            assert_eq!(error_code(&response).as_deref(), Some(ErrorBody::NOT_FOUND));
        }
    }

    #[tokio::test]
    async fn test_create_then_fetch() {
        let server = MockServer::seeded(3, 1, anchor());
        let response = server
            .handle(request(Method::POST, "/api/tickets", r#"{"title":"New thing"}"#))
            .await;
        assert_eq!(response.status(), StatusCode::CREATED);
        let created: Ticket = serde_json::from_str(response.body()).unwrap();

        let uri = format!("/api/tickets/{}", created.id);
        let response = server.handle(request(Method::GET, &uri, "")).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(server.store().snapshot()[0].id, created.id);
    }

    #[tokio::test]
    async fn test_bad_bodies_and_methods() {
        let server = MockServer::seeded(1, 1, anchor());
        let id = server.store().snapshot()[0].id.clone();

        let response = server
            .handle(request(Method::PATCH, &format!("/api/tickets/{id}"), "not json"))
            .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(error_code(&response).as_deref(), Some(ErrorBody::BAD_REQUEST));

        let response = server
            .handle(request(Method::PATCH, &format!("/api/tickets/{id}"), r#"{"title":"x"}"#))
            .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = server.handle(request(Method::PUT, "/api/tickets", "")).await;
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);

        let response = server.handle(request(Method::GET, "/api/other", "")).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_delete_answers_ok() {
        let server = MockServer::seeded(2, 1, anchor());
        let id = server.store().snapshot()[0].id.clone();
        let response = server
            .handle(request(Method::DELETE, &format!("/api/tickets/{id}"), ""))
            .await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.body(), r#"{"ok":true}"#);
        assert_eq!(server.store().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_always_failing_server_reports_random_error() {
        let server = MockServer::seeded(2, 1, anchor()).with_faults(FaultConfig {
            latency_ms: 800..=1500,
            failure_rate: 1.0,
        });
        let response = server.handle(request(Method::GET, "/api/tickets", "")).await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body: ErrorBody = serde_json::from_str(response.body()).unwrap();
        assert_eq!(body.message.as_deref(), Some("Something went wrong"));
        assert_eq!(body.code.as_deref(), Some(ErrorBody::RANDOM));
    }
}
