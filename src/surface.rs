//! Hosting surface for the reconciler
//!
//! The model is owned by a single event-loop thread. Pollers and background
//! scans only ever send events to it. Views are published while the surface
//! is visible; polling continues while hidden and stops on [`SurfaceHandle::shutdown`].

use crate::app::{self, Command, Event, Model, ViewModel};
use crate::config::AppConfig;
use crate::driver::DriverClient;
use crate::poller;
use crate::services::scan::{ScanRequest, ScanService};
use crate::settings::SettingsStore;
use log::{debug, info, warn};
use std::sync::Arc;
use tokio::{
    runtime::Handle,
    sync::{
        mpsc::{self, UnboundedReceiver, UnboundedSender, WeakUnboundedSender},
        watch,
    },
    task::JoinHandle,
};
use tokio_util::sync::{CancellationToken, DropGuard};

pub struct SurfaceHandle {
    events: UnboundedSender<Event>,
    views: watch::Receiver<ViewModel>,
    /// cancels everything when the handle is dropped without a shutdown
    cancel_guard: DropGuard,
    pollers: Vec<JoinHandle<()>>,
    event_loop: JoinHandle<()>,
}

struct EventLoop {
    model: Model,
    driver: Arc<dyn DriverClient>,
    store: Box<dyn SettingsStore>,
    events: WeakUnboundedSender<Event>,
    views: watch::Sender<ViewModel>,
    cancel_token: CancellationToken,
    runtime: Handle,
}

/// Start the event loop and the pollers
///
/// Must be called from within a tokio runtime.
pub fn start(
    driver: Arc<dyn DriverClient>,
    store: Box<dyn SettingsStore>,
    config: &AppConfig,
) -> SurfaceHandle {
    let (tx, rx) = mpsc::unbounded_channel();
    let (views_tx, views_rx) = watch::channel(ViewModel::default());
    let cancel_token = CancellationToken::new();

    if tx.send(Event::Initialize).is_err() {
        warn!("failed to queue initialization");
    }

    let event_loop = EventLoop {
        model: Model::new(config.pairing.station_address.clone()),
        driver: driver.clone(),
        store,
        events: tx.downgrade(),
        views: views_tx,
        cancel_token: cancel_token.clone(),
        runtime: Handle::current(),
    };
    let event_loop = tokio::task::spawn_blocking(move || event_loop.run(rx));

    let pollers = poller::spawn_all(driver, &config.polling, tx.clone(), cancel_token.clone());

    SurfaceHandle {
        events: tx,
        views: views_rx,
        cancel_guard: cancel_token.drop_guard(),
        pollers,
        event_loop,
    }
}

impl SurfaceHandle {
    /// Queue a user or shell event
    pub fn send(&self, event: Event) {
        if self.events.send(event).is_err() {
            warn!("event loop is gone, dropping event");
        }
    }

    pub fn set_visible(&self, visible: bool) {
        self.send(Event::VisibilityChanged(visible));
    }

    /// Receiver for published views
    pub fn subscribe(&self) -> watch::Receiver<ViewModel> {
        self.views.clone()
    }

    /// Cancel pollers and pending callbacks, then wait for every task
    pub async fn shutdown(self) {
        info!("tearing down surface");

        let SurfaceHandle {
            events,
            cancel_guard,
            pollers,
            event_loop,
            ..
        } = self;

        drop(cancel_guard);
        drop(events);

        for poller in pollers {
            if let Err(e) = poller.await {
                warn!("poller task failed: {e}");
            }
        }

        if let Err(e) = event_loop.await {
            warn!("event loop failed: {e}");
        }
    }
}

impl EventLoop {
    fn run(mut self, mut rx: UnboundedReceiver<Event>) {
        info!("surface event loop started");

        while let Some(event) = rx.blocking_recv() {
            if self.cancel_token.is_cancelled() {
                debug!("dropping events after teardown");
                break;
            }

            match app::update(event, &mut self.model, self.driver.as_ref(), self.store.as_ref()) {
                Command::Done => {}
                Command::Render => self.publish(),
                Command::Scan(request) => {
                    self.publish();
                    self.spawn_scan(request);
                }
            }
        }

        info!("surface event loop stopped");
    }

    fn publish(&self) {
        if self.model.is_visible {
            self.views.send_replace(app::view(&self.model));
        }
    }

    /// Run the scan on the blocking pool and post the result back, unless
    /// the surface was torn down meanwhile.
    fn spawn_scan(&self, request: ScanRequest) {
        let driver = self.driver.clone();
        let events = self.events.clone();
        let cancel_token = self.cancel_token.clone();

        self.runtime.spawn_blocking(move || {
            let result = ScanService::run(driver.as_ref(), request);

            if cancel_token.is_cancelled() {
                debug!("dropping scan result after teardown");
                return;
            }

            match events.upgrade() {
                Some(events) if events.send(Event::ScanCompleted(result)).is_ok() => {}
                _ => debug!("event loop is gone, dropping scan result"),
            }
        });
    }
}
