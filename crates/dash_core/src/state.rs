//! Navigation and socket binding.
//!
//! `AppState` owns the current page: its route, the handles of the sockets
//! serving it and the view model once the first `status` frame bound it.
//! Views never see their sockets; all opening and closing is expressed as
//! effects.

use std::time::Duration;

use engine_logging::{engine_debug, engine_error, engine_info, engine_warn};

use crate::effect::{ConnectionId, Effect, StreamKind};
use crate::event::{Envelope, EventKind};
use crate::progress::{apply_progress, ProgressTimer};
use crate::route::Route;
use crate::view_model::{AppViewModel, PageView};
use crate::views::{Applied, View};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Connection {
    id: ConnectionId,
    /// Whether the `status` handshake completed on this socket.
    bound: bool,
}

#[derive(Debug, Clone, PartialEq)]
struct Page {
    route: Route,
    events: Connection,
    log: Option<ConnectionId>,
    /// `None` until the first `status` frame arrived.
    view: Option<View>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct AppState {
    title: String,
    page: Option<Page>,
    last_connection: u64,
    progress: ProgressTimer,
    dirty: bool,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Like [`AppState::new`], with the progress ticker running at `period`.
    pub fn with_tick_period(period: Duration) -> Self {
        Self {
            progress: ProgressTimer::with_period(period),
            ..Self::default()
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn route(&self) -> Option<&Route> {
        self.page.as_ref().map(|page| &page.route)
    }

    pub fn view(&self) -> AppViewModel {
        let page = match &self.page {
            None => PageView::Idle,
            Some(Page {
                route, view: None, ..
            }) => PageView::Loading {
                path: route.path(),
            },
            Some(Page {
                view: Some(view), ..
            }) => match view {
                View::Home(home) => PageView::Home(home.clone()),
                View::Jobs(jobs) => PageView::Jobs(jobs.clone()),
                View::Job(job) => PageView::Job(job.clone()),
                View::Run(run) => PageView::Run(run.clone()),
            },
        };
        AppViewModel {
            title: self.title.clone(),
            route: self.route().cloned(),
            page,
            dirty: self.dirty,
        }
    }

    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    fn next_connection(&mut self) -> ConnectionId {
        self.last_connection += 1;
        ConnectionId(self.last_connection)
    }

    fn open(
        &mut self,
        path: String,
        stream: StreamKind,
        effects: &mut Vec<Effect>,
    ) -> ConnectionId {
        let conn = self.next_connection();
        engine_debug!("Opening {:?} stream {} for {}", stream, conn, path);
        effects.push(Effect::OpenSocket { conn, path, stream });
        conn
    }

    pub(crate) fn navigate(&mut self, path: &str) -> Vec<Effect> {
        let route = match Route::parse(path) {
            Ok(route) => route,
            Err(err) => {
                engine_warn!("Navigation aborted: {}", err);
                return Vec::new();
            }
        };
        let mut effects = Vec::new();

        match self.page.take() {
            Some(page) if page.route == route => {
                self.page = Some(page);
                return effects;
            }
            Some(mut page) if page.route.kind() == route.kind() => {
                engine_info!("Route update {} -> {}", page.route, route);
                effects.push(Effect::CloseSocket {
                    conn: page.events.id,
                });
                if let Some(log) = page.log.take() {
                    effects.push(Effect::CloseSocket { conn: log });
                }
                if let Some(View::Run(run)) = page.view.as_mut() {
                    run.route_changed();
                }
                let id = self.open(route.path(), StreamKind::Events, &mut effects);
                page.events = Connection { id, bound: false };
                page.route = route;
                self.page = Some(page);
            }
            previous => {
                if let Some(previous) = previous {
                    engine_info!("Leaving {}", previous.route);
                    effects.extend(close_page(previous));
                }
                engine_info!("Entering {}", route);
                let id = self.open(route.path(), StreamKind::Events, &mut effects);
                self.page = Some(Page {
                    route,
                    events: Connection { id, bound: false },
                    log: None,
                    view: None,
                });
            }
        }

        self.reconcile_progress(&mut effects);
        self.dirty = true;
        effects
    }

    pub(crate) fn receive_frame(&mut self, conn: ConnectionId, text: &str) -> Vec<Effect> {
        let mut effects = Vec::new();
        let Some(page) = self.page.as_mut().filter(|page| page.events.id == conn) else {
            engine_debug!("Dropping frame from inactive {}", conn);
            return effects;
        };

        let envelope = match Envelope::parse(text) {
            Ok(envelope) => envelope,
            Err(err) => {
                engine_warn!("Dropping frame on {} for {}: {}", conn, page.route, err);
                return effects;
            }
        };

        let is_status = envelope.event_kind() == Some(EventKind::Status);
        if !page.events.bound && !is_status {
            engine_error!(
                "Page view for {} was undefined: dropping `{}` received before status",
                page.route,
                envelope.kind
            );
            return effects;
        }

        let existed = page.view.is_some();
        let mut view = page
            .view
            .take()
            .unwrap_or_else(|| View::for_route(&page.route));
        let (log_path, title) = match view.apply(envelope) {
            Ok(Applied::Status { title }) => {
                let first_bind = !page.events.bound;
                page.events.bound = true;
                let log_path = match &mut view {
                    View::Run(run) if first_bind => {
                        run.log_connected();
                        page.route.log_path()
                    }
                    _ => None,
                };
                page.view = Some(view);
                (log_path, Some(title))
            }
            Ok(Applied::Event(kind)) => {
                engine_debug!("Applied `{}` on {}", kind, page.route);
                page.view = Some(view);
                (None, None)
            }
            Ok(Applied::Ignored) => {
                page.view = Some(view);
                return effects;
            }
            Err(err) => {
                engine_warn!("Dropping frame on {} for {}: {}", conn, page.route, err);
                page.view = existed.then_some(view);
                return effects;
            }
        };

        if let Some(log_path) = log_path {
            let log = self.open(log_path, StreamKind::Log, &mut effects);
            if let Some(page) = self.page.as_mut() {
                page.log = Some(log);
            }
        }
        if let Some(title) = title {
            self.title.clone_from(&title);
            effects.push(Effect::SetTitle(title));
        }

        self.reconcile_progress(&mut effects);
        self.dirty = true;
        effects
    }

    pub(crate) fn receive_log(&mut self, conn: ConnectionId, text: &str) -> Vec<Effect> {
        let Some(Page {
            view: Some(View::Run(run)),
            ..
        }) = self.page.as_mut().filter(|page| page.log == Some(conn))
        else {
            engine_debug!("Dropping log chunk from inactive {}", conn);
            return Vec::new();
        };
        let scroll = run.append_log(text);
        self.dirty = true;
        if scroll {
            vec![Effect::ScrollLogToBottom]
        } else {
            Vec::new()
        }
    }

    pub(crate) fn socket_closed(&mut self, conn: ConnectionId, reason: Option<&str>) {
        match &self.page {
            Some(page) if page.events.id == conn || page.log == Some(conn) => {
                engine_warn!(
                    "Connection {} for {} closed ({}); page is no longer live",
                    conn,
                    page.route,
                    reason.unwrap_or("no reason given")
                );
            }
            _ => engine_debug!("Inactive {} closed", conn),
        }
    }

    pub(crate) fn tick(&mut self, now: f64) {
        let runs = self
            .page
            .as_mut()
            .and_then(|page| page.view.as_mut())
            .and_then(View::running_mut);
        if let Some(runs) = runs {
            if apply_progress(runs, now) {
                self.dirty = true;
            }
        }
    }

    pub(crate) fn set_search(&mut self, search: String) {
        if let Some(View::Jobs(jobs)) = self.current_view_mut() {
            jobs.set_search(search);
            self.dirty = true;
        }
    }

    pub(crate) fn select_tag(&mut self, tag: Option<String>) {
        if let Some(View::Jobs(jobs)) = self.current_view_mut() {
            jobs.select_tag(tag);
            self.dirty = true;
        }
    }

    pub(crate) fn set_autoscroll(&mut self, autoscroll: bool) {
        if let Some(View::Run(run)) = self.current_view_mut() {
            run.set_autoscroll(autoscroll);
            self.dirty = true;
        }
    }

    pub(crate) fn shutdown(&mut self) -> Vec<Effect> {
        let mut effects = self.page.take().map(close_page).unwrap_or_default();
        effects.extend(self.progress.disarm());
        self.dirty = true;
        effects
    }

    fn current_view_mut(&mut self) -> Option<&mut View> {
        self.page.as_mut().and_then(|page| page.view.as_mut())
    }

    fn reconcile_progress(&mut self, effects: &mut Vec<Effect>) {
        let running = self
            .page
            .as_ref()
            .and_then(|page| page.view.as_ref())
            .map(View::running)
            .unwrap_or(&[]);
        effects.extend(self.progress.reconcile(running));
    }
}

fn close_page(page: Page) -> Vec<Effect> {
    std::iter::once(page.events.id)
        .chain(page.log)
        .map(|conn| Effect::CloseSocket { conn })
        .collect()
}
