//! Application driver.
//!
//! [`App`] wires the current route to its screen, runs the remote queries
//! the screen needs, performs mutations and raises notifications. Every
//! state change happens inside one `&mut self` call; the only suspension
//! points are the awaited service calls.

use std::sync::Arc;
use std::time::Duration;

use uuid::Uuid;

use crate::api::TicketApi;
use crate::config::Config;
use crate::detail::{DetailAction, DetailEffect, DetailPage, DetailState};
use crate::error::DocketError;
use crate::executor::{QueryClient, QueryStatus};
use crate::list::{ListAction, ListOutcome, ListPage, ListView};
use crate::navigation::{HistoryMode, LIST_PATH, Location, QuerySync, Route};
use crate::notify::{Clock, Notifications, Toast};
use crate::types::{Ticket, TicketId};

pub const TICKET_UPDATED: &str = "Ticket updated";
pub const TICKET_DELETED: &str = "Ticket deleted";

/// The mounted screen.
#[derive(Debug)]
pub enum Screen {
    List(ListPage),
    Detail(DetailPage),
}

/// Tunables taken from [`Config`].
#[derive(Debug, Clone, Copy)]
pub struct AppOptions {
    pub debounce: Duration,
    pub history: HistoryMode,
    pub notification_ttl: Duration,
}

impl Default for AppOptions {
    fn default() -> Self {
        Self::from(&Config::default())
    }
}

impl From<&Config> for AppOptions {
    fn from(config: &Config) -> Self {
        Self {
            debounce: config.debounce(),
            history: config.list.history,
            notification_ttl: config.notification_ttl(),
        }
    }
}

pub struct App<L> {
    api: Arc<dyn TicketApi>,
    clock: Arc<dyn Clock>,
    options: AppOptions,
    queries: QueryClient,
    notifications: Notifications,
    sync: QuerySync<L>,
    screen: Screen,
}

impl<L: Location> App<L> {
    /// Mount the screen for `location`. Unknown routes are replaced by the list.
    pub fn new(
        api: Arc<dyn TicketApi>,
        clock: Arc<dyn Clock>,
        location: L,
        options: AppOptions,
    ) -> Self {
        let sync = QuerySync::new(location, options.history);
        let mut app = Self {
            api,
            clock,
            options,
            queries: QueryClient::new(),
            notifications: Notifications::new(options.notification_ttl),
            screen: Screen::List(ListPage::new(&sync.state(), options.debounce)),
            sync,
        };
        app.mount();
        app
    }

    fn mount(&mut self) {
        let route = match Route::parse(&self.sync.location().pathname()) {
            Ok(route) => route,
            Err(e) => {
                tracing::debug!("{e}, redirecting to {LIST_PATH}");
                self.sync.location_mut().replace(LIST_PATH);
                Route::List
            }
        };
        self.sync.location_changed();

        if let Screen::List(page) = &mut self.screen {
            page.search.cancel();
        }
        self.screen = match route {
            Route::List => Screen::List(ListPage::new(&self.sync.state(), self.options.debounce)),
            Route::Detail(id) => Screen::Detail(DetailPage::new(id)),
        };
    }

    /// Fetch whatever the mounted screen is missing.
    pub async fn refresh(&mut self) {
        match &self.screen {
            Screen::List(_) => {
                let key = self.sync.state();
                if let Some(ticket) = self.queries.list.observe(key) {
                    let result = self.api.list_tickets(&ticket.key).await;
                    self.queries.list.resolve(ticket, result);
                }
            }
            Screen::Detail(page) => {
                let id = page.id().clone();
                if let Some(ticket) = self.queries.detail.observe(id) {
                    let result = self.api.get_ticket(&ticket.key).await;
                    self.queries.detail.resolve(ticket, result);
                }
            }
        }
    }

    /// Re-issue the mounted screen's query.
    pub async fn retry(&mut self) {
        match &self.screen {
            Screen::List(_) => {
                if let Some(ticket) = self.queries.list.retry() {
                    let result = self.api.list_tickets(&ticket.key).await;
                    self.queries.list.resolve(ticket, result);
                }
            }
            Screen::Detail(_) => {
                if let Some(ticket) = self.queries.detail.retry() {
                    let result = self.api.get_ticket(&ticket.key).await;
                    self.queries.detail.resolve(ticket, result);
                }
            }
        }
    }

    /// Follow a link: push `href`, mount its screen and load it.
    pub async fn navigate(&mut self, href: &str) {
        self.sync.location_mut().push(href);
        self.mount();
        self.refresh().await;
    }

    /// The location moved without going through the app (back/forward, pasted link).
    pub async fn location_changed(&mut self) {
        self.mount();
        self.refresh().await;
    }

    pub async fn list_action(&mut self, action: ListAction) {
        let now = self.clock.now();
        let Screen::List(page) = &mut self.screen else {
            tracing::debug!(?action, "list action ignored outside the list screen");
            return;
        };
        match page.dispatch(&mut self.sync, action, now) {
            ListOutcome::Unchanged => {}
            ListOutcome::QueryChanged => self.refresh().await,
            ListOutcome::Retry => self.retry().await,
        }
    }

    pub async fn detail_action(&mut self, action: DetailAction) {
        let ticket = self.queries.detail.status().data().cloned();
        let Screen::Detail(page) = &mut self.screen else {
            tracing::debug!(?action, "detail action ignored outside the detail screen");
            return;
        };
        let id = page.id().clone();

        match page.dispatch(action, ticket.as_ref()) {
            DetailEffect::None | DetailEffect::ConfirmDiscard | DetailEffect::Invalid(_) => {}
            DetailEffect::Update(body) => {
                let result = self.api.update_ticket(&id, &body).await;
                let ok = result.is_ok();
                if let Screen::Detail(page) = &mut self.screen {
                    page.update_finished(ok);
                }
                match result {
                    Ok(_) => {
                        self.queries.invalidate_ticket(&id);
                        self.notify_success(TICKET_UPDATED);
                        self.refresh().await;
                    }
                    Err(e) => self.notify_failure(&e),
                }
            }
            DetailEffect::Delete => {
                let result = self.api.delete_ticket(&id).await;
                if let Screen::Detail(page) = &mut self.screen {
                    page.delete_finished();
                }
                match result {
                    Ok(()) => {
                        self.queries.invalidate_lists();
                        self.queries.detail.reset();
                        self.notify_success(TICKET_DELETED);
                        self.navigate(LIST_PATH).await;
                    }
                    Err(e) => self.notify_failure(&e),
                }
            }
            DetailEffect::Retry => self.retry().await,
            DetailEffect::Back => self.navigate(LIST_PATH).await,
        }
    }

    /// Advance time-driven state: settle search text, expire notifications.
    pub async fn tick(&mut self) {
        let now = self.clock.now();
        self.notifications.expire(now);
        let outcome = match &mut self.screen {
            Screen::List(page) => page.tick(&mut self.sync, now),
            Screen::Detail(_) => ListOutcome::Unchanged,
        };
        if outcome == ListOutcome::QueryChanged {
            self.refresh().await;
        }
    }

    pub fn dismiss(&mut self, id: Uuid) -> bool {
        self.notifications.dismiss(id)
    }

    fn notify_success(&mut self, message: &str) {
        let now = self.clock.now();
        self.notifications.success(message, now);
    }

    fn notify_failure(&mut self, error: &DocketError) {
        tracing::warn!("mutation failed: {error}");
        let now = self.clock.now();
        self.notifications.error(error.user_message(), now);
    }

    pub fn screen(&self) -> &Screen {
        &self.screen
    }

    pub fn href(&self) -> String {
        self.sync.location().href()
    }

    pub fn location(&self) -> &L {
        self.sync.location()
    }

    pub fn location_mut(&mut self) -> &mut L {
        self.sync.location_mut()
    }

    pub fn queries(&self) -> &QueryClient {
        &self.queries
    }

    pub fn toasts(&self) -> &[Toast] {
        self.notifications.active()
    }

    /// Render data for the list screen, if it is mounted.
    pub fn with_list_view<R>(&self, render: impl FnOnce(ListView<'_>) -> R) -> Option<R> {
        let Screen::List(page) = &self.screen else {
            return None;
        };
        let query = self.sync.state();
        let href = self.sync.location().href();
        Some(render(ListView {
            query: &query,
            href: &href,
            search_text: page.search.text(),
            status: self.queries.list.status(),
            is_fetching: self.queries.list.is_fetching(),
        }))
    }

    /// The detail screen's ticket query, if it is mounted.
    pub fn detail(&self) -> Option<(&DetailPage, &QueryStatus<Ticket>)> {
        match &self.screen {
            Screen::Detail(page) => Some((page, self.queries.detail.status())),
            Screen::List(_) => None,
        }
    }

    /// The detail screen's render state, if it is mounted.
    pub fn detail_state(&self) -> Option<DetailState<'_>> {
        self.detail()
            .map(|(_, status)| DetailState::from_status(status))
    }

    pub fn detail_id(&self) -> Option<&TicketId> {
        self.detail().map(|(page, _)| page.id())
    }
}
