//! End-to-end behavior of the application driver against the in-memory service.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use docket::api::{CreateTicket, HttpTicketApi, MockServer, TicketApi, TicketStore, UpdateTicket};
use docket::detail::{DetailAction, DetailState};
use docket::form::FormField;
use docket::list::ListAction;
use docket::navigation::{HistoryMode, MemoryLocation};
use docket::notify::{ManualClock, ToastLevel};
use docket::{
    App, AppOptions, DocketError, ErrorKind, Filter, Page, QueryState, Result, Screen, Ticket,
    TicketId, TicketStatus,
};

/// Service wrapper that counts list requests and can be told to fail them.
struct Recording {
    inner: HttpTicketApi<MockServer>,
    list_calls: AtomicUsize,
    fail_lists: AtomicBool,
}

impl Recording {
    fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TicketApi for Recording {
    async fn list_tickets(&self, query: &QueryState) -> Result<Page<Ticket>> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_lists.load(Ordering::SeqCst) {
            return Err(DocketError::Network("connection reset".to_string()));
        }
        self.inner.list_tickets(query).await
    }

    async fn get_ticket(&self, id: &TicketId) -> Result<Ticket> {
        self.inner.get_ticket(id).await
    }

    async fn create_ticket(&self, body: &CreateTicket) -> Result<Ticket> {
        self.inner.create_ticket(body).await
    }

    async fn update_ticket(&self, id: &TicketId, body: &UpdateTicket) -> Result<Ticket> {
        self.inner.update_ticket(id, body).await
    }

    async fn delete_ticket(&self, id: &TicketId) -> Result<()> {
        self.inner.delete_ticket(id).await
    }
}

struct Harness {
    app: App<MemoryLocation>,
    api: Arc<Recording>,
    store: Arc<TicketStore>,
    clock: Arc<ManualClock>,
}

async fn harness_with(href: &str, options: AppOptions) -> Harness {
    let anchor = "2024-06-30T00:00:00Z".parse().unwrap();
    let server = MockServer::seeded(30, 7, anchor);
    let store = server.store().clone();
    let api = Arc::new(Recording {
        inner: HttpTicketApi::new(server),
        list_calls: AtomicUsize::new(0),
        fail_lists: AtomicBool::new(false),
    });
    let clock = ManualClock::shared();
    let mut app = App::new(api.clone(), clock.clone(), MemoryLocation::new(href), options);
    app.refresh().await;
    Harness {
        app,
        api,
        store,
        clock,
    }
}

async fn harness(href: &str) -> Harness {
    harness_with(href, AppOptions::default()).await
}

fn first_ticket(h: &Harness) -> Ticket {
    h.store.snapshot().into_iter().next().unwrap()
}

#[tokio::test]
async fn test_typing_issues_one_request_after_pause() {
    let mut h = harness("/tickets?page=2").await;
    assert_eq!(h.api.list_calls(), 1);

    for text in ["t", "ti", "tic", "tick"] {
        h.app.list_action(ListAction::SearchTyped(text.to_string())).await;
        h.app.tick().await;
        h.clock.advance(Duration::from_millis(100));
    }
    h.app.tick().await;
    assert_eq!(h.api.list_calls(), 1);
    assert_eq!(h.app.href(), "/tickets?page=2");

    h.clock.advance(Duration::from_millis(300));
    h.app.tick().await;
    assert_eq!(h.api.list_calls(), 2);
    assert_eq!(h.app.href(), "/tickets?q=tick");

    h.clock.advance(Duration::from_millis(1000));
    h.app.tick().await;
    assert_eq!(h.api.list_calls(), 2);
}

#[tokio::test]
async fn test_filter_change_resets_page_and_refetches() {
    let mut h = harness("/tickets?page=2&pageSize=5").await;
    h.app
        .list_action(ListAction::SetStatus(Filter::Only(TicketStatus::Done)))
        .await;
    assert_eq!(h.app.href(), "/tickets?status=done&pageSize=5");
    assert_eq!(h.api.list_calls(), 2);

    let all_done = h
        .app
        .with_list_view(|view| {
            view.page()
                .map(|page| page.items.iter().all(|t| t.status == TicketStatus::Done))
        })
        .flatten();
    assert_eq!(all_done, Some(true));

    h.app
        .list_action(ListAction::SetStatus(Filter::Only(TicketStatus::Done)))
        .await;
    assert_eq!(h.api.list_calls(), 2);
}

#[tokio::test]
async fn test_retry_after_failed_list() {
    let mut h = harness("/tickets").await;
    h.api.fail_lists.store(true, Ordering::SeqCst);
    h.app.list_action(ListAction::GoToPage(2)).await;

    let error = h
        .app
        .with_list_view(|view| view.status.error().cloned())
        .flatten();
    assert!(error.is_some_and(|e| e.is_retryable()));

    h.api.fail_lists.store(false, Ordering::SeqCst);
    h.app.list_action(ListAction::Retry).await;
    let page = h
        .app
        .with_list_view(|view| view.page().map(|p| p.page))
        .flatten();
    assert_eq!(page, Some(2));
    assert_eq!(h.api.list_calls(), 3);
}

#[tokio::test]
async fn test_back_navigation_reloads_previous_query() {
    let options = AppOptions {
        history: HistoryMode::Push,
        ..AppOptions::default()
    };
    let mut h = harness_with("/tickets", options).await;
    h.app.list_action(ListAction::GoToPage(2)).await;
    assert_eq!(h.app.location().len(), 2);

    assert!(h.app.location_mut().back());
    h.app.location_changed().await;
    assert_eq!(h.app.href(), "/tickets");
    let page = h
        .app
        .with_list_view(|view| view.page().map(|p| p.page))
        .flatten();
    assert_eq!(page, Some(1));
}

#[tokio::test]
async fn test_edit_flow_updates_and_invalidates() {
    let mut h = harness("/tickets").await;
    let ticket = first_ticket(&h);
    h.app.navigate(&format!("/tickets/{}", ticket.id)).await;

    h.app.detail_action(DetailAction::OpenEdit).await;
    h.app
        .detail_action(DetailAction::Edit(FormField::Title(
            "Renamed ticket".to_string(),
        )))
        .await;
    h.app.detail_action(DetailAction::Save).await;

    assert_eq!(h.app.toasts().len(), 1);
    assert_eq!(h.app.toasts()[0].message, "Ticket updated");
    assert_eq!(h.app.toasts()[0].level, ToastLevel::Success);
    assert!(h.app.queries().list.is_stale());

    let (page, status) = h.app.detail().unwrap();
    assert!(page.edit_form().is_none());
    assert_eq!(status.data().map(|t| t.title.as_str()), Some("Renamed ticket"));
    assert_eq!(h.store.get(&ticket.id).unwrap().title, "Renamed ticket");
}

#[tokio::test]
async fn test_invalid_edit_sends_nothing() {
    let mut h = harness("/tickets").await;
    let ticket = first_ticket(&h);
    h.app.navigate(&format!("/tickets/{}", ticket.id)).await;

    h.app.detail_action(DetailAction::OpenEdit).await;
    h.app
        .detail_action(DetailAction::Edit(FormField::Title("x".to_string())))
        .await;
    h.app.detail_action(DetailAction::Save).await;

    assert!(h.app.toasts().is_empty());
    assert_eq!(h.store.get(&ticket.id).unwrap(), ticket);
    let (page, _) = h.app.detail().unwrap();
    assert!(page.edit_form().unwrap().errors.title.is_some());
}

#[tokio::test]
async fn test_update_of_vanished_ticket_reports_not_found() {
    let mut h = harness("/tickets").await;
    let ticket = first_ticket(&h);
    h.app.navigate(&format!("/tickets/{}", ticket.id)).await;
    h.app.detail_action(DetailAction::OpenEdit).await;
    h.app
        .detail_action(DetailAction::Edit(FormField::Title(
            "Vanishing act".to_string(),
        )))
        .await;

    h.store.delete(&ticket.id).unwrap();
    h.app.detail_action(DetailAction::Save).await;

    assert_eq!(h.app.toasts().len(), 1);
    assert_eq!(h.app.toasts()[0].message, "Not found");
    assert_eq!(h.app.toasts()[0].level, ToastLevel::Error);
    assert!(!h.app.queries().list.is_stale());

    let (page, _) = h.app.detail().unwrap();
    assert!(page.edit_form().is_some());
    assert!(page.pending().is_none());
}

#[tokio::test]
async fn test_delete_returns_to_list() {
    let mut h = harness("/tickets").await;
    let ticket = first_ticket(&h);
    h.app.navigate(&format!("/tickets/{}", ticket.id)).await;
    let calls = h.api.list_calls();

    h.app.detail_action(DetailAction::RequestDelete).await;
    h.app.detail_action(DetailAction::ConfirmDelete).await;

    assert_eq!(h.app.href(), "/tickets");
    assert!(matches!(h.app.screen(), Screen::List(_)));
    assert_eq!(h.store.len(), 29);
    assert_eq!(h.api.list_calls(), calls + 1);
    assert_eq!(h.app.toasts()[0].message, "Ticket deleted");

    let total = h
        .app
        .with_list_view(|view| view.page().map(|p| p.total))
        .flatten();
    assert_eq!(total, Some(29));
}

#[tokio::test]
async fn test_missing_ticket_shows_error() {
    let mut h = harness("/tickets").await;
    h.app.navigate("/tickets/does-not-exist").await;
    let (_, status) = h.app.detail().unwrap();
    let error = status.error().unwrap();
    assert_eq!(error.kind, ErrorKind::NotFound);
    assert_eq!(error.message, "Not found");
    assert_eq!(h.app.detail_state(), Some(DetailState::NotFound));
}

#[tokio::test]
async fn test_unknown_route_is_replaced_by_list() {
    let h = harness("/settings").await;
    assert_eq!(h.app.href(), "/tickets");
    assert_eq!(h.app.location().len(), 1);
    assert_eq!(h.api.list_calls(), 1);
}
