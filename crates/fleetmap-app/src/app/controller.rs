//! Fleet map view controller
//!
//! One [`FleetMapController`] per map view. It owns the route store, the
//! renderer, the selection and the truck poll, and is the only thing that
//! mutates them:
//! 1. Fetch over the network without holding any lock
//! 2. Take the state lock
//! 3. Reconcile, render and update selection in one critical section
//!
//! Truck ticks and route loads each carry a sequence number taken when
//! they start; a result is only applied if it is newer than the last
//! applied one of its kind.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use thiserror::Error;
use tokio::sync::watch;
use tracing::{debug, info};

use fleetmap_domain::model::{EnrichedTruck, FleetStats, RouteStats};
use fleetmap_domain::repository::FleetSource;
use fleetmap_domain::service::reconcile;
use fleetmap_domain::RouteStore;
use fleetmap_map::{MapBackend, MapRenderer};
use fleetmap_types::{today_weekday, ConfigError, DayFilter, Error, RouteId};

use super::scheduler::{FailureState, PollScheduler, RetryPolicy};
use super::selection::{RouteDetail, SelectionController};
use crate::config::Config;

/// Errors surfaced to whoever drives the view
#[derive(Debug, Error)]
pub enum ControllerError {
    #[error("Fleet API unreachable: {0}")]
    Unavailable(String),

    #[error("Fleet API rejected the request (status {status}){}", .message.as_deref().map(|m| format!(": {m}")).unwrap_or_default())]
    Rejected { status: u16, message: Option<String> },

    #[error("Unexpected response from fleet API: {0}")]
    BadData(String),

    #[error("Route not found: {0}")]
    RouteNotFound(String),

    #[error("Map view has been disposed")]
    Disposed,

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl From<Error> for ControllerError {
    fn from(err: Error) -> Self {
        match err {
            Error::Network(msg) => ControllerError::Unavailable(msg),
            Error::Http { status, message } => ControllerError::Rejected { status, message },
            Error::DataShape(msg) | Error::Render(msg) => ControllerError::BadData(msg),
            Error::NotFound(msg) => ControllerError::RouteNotFound(msg),
            Error::Config(e) => ControllerError::ConfigError(e.to_string()),
            _ => ControllerError::BadData(err.to_string()),
        }
    }
}

impl From<ControllerError> for Error {
    fn from(err: ControllerError) -> Self {
        match err {
            ControllerError::Unavailable(msg) => Error::Network(msg),
            ControllerError::Rejected { status, message } => Error::Http { status, message },
            ControllerError::BadData(msg) => Error::DataShape(msg),
            ControllerError::RouteNotFound(id) => Error::NotFound(format!("route {}", id)),
            ControllerError::Disposed => Error::Render("map view has been disposed".into()),
            ControllerError::ConfigError(msg) => Error::Config(ConfigError::Invalid(msg)),
        }
    }
}

pub type ControllerResult<T> = std::result::Result<T, ControllerError>;

/// What became of one truck refresh
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Rendered; `drawn` markers out of `trucks` reconciled trucks
    Applied { trucks: usize, drawn: usize },
    /// A newer tick was applied first; this result was dropped
    Stale,
}

/// What became of one route load
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// `routes` loaded for the day, `drawn` of them with a group on the map
    Applied { routes: usize, drawn: usize },
    /// A load started later was applied first; this result was dropped
    Stale,
}

struct ViewState<B> {
    routes: RouteStore,
    renderer: MapRenderer<B>,
    selection: SelectionController,
    trucks: Vec<EnrichedTruck>,
    fleet_stats: FleetStats,
    applied_tick: u64,
    applied_load: u64,
    disposed: bool,
}

struct Shared<S, B> {
    source: S,
    state: Mutex<ViewState<B>>,
    next_tick: AtomicU64,
    next_load: AtomicU64,
    /// Sequence number of the last applied tick
    applied: watch::Sender<u64>,
}

impl<S: FleetSource, B: MapBackend> Shared<S, B> {
    fn lock(&self) -> MutexGuard<'_, ViewState<B>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    async fn refresh_trucks(&self) -> fleetmap_types::Result<TickOutcome> {
        let tick = self.next_tick.fetch_add(1, Ordering::SeqCst) + 1;
        debug!(tick, "truck refresh started");

        let (readings, trucks, drivers) = tokio::try_join!(
            self.source.fetch_readings(),
            self.source.fetch_trucks(),
            self.source.fetch_drivers(),
        )?;

        let mut guard = self.lock();
        let state = &mut *guard;
        if state.disposed {
            return Ok(TickOutcome::Stale);
        }
        if tick <= state.applied_tick {
            debug!(tick, applied = state.applied_tick, "stale truck refresh discarded");
            return Ok(TickOutcome::Stale);
        }
        state.applied_tick = tick;

        let enriched = reconcile(&readings, &trucks, &drivers, state.routes.all_routes());
        let drawn = state.renderer.render_trucks(&enriched, &state.routes);
        state.fleet_stats = FleetStats::from_trucks(&trucks);
        state.selection.clear_truck();
        let count = enriched.len();
        state.trucks = enriched;

        self.applied.send_replace(tick);
        debug!(tick, trucks = count, drawn, "truck refresh applied");
        Ok(TickOutcome::Applied {
            trucks: count,
            drawn,
        })
    }
}

pub struct FleetMapController<S, B> {
    shared: Arc<Shared<S, B>>,
    scheduler: PollScheduler,
    poll_interval: Duration,
}

impl<S, B> FleetMapController<S, B>
where
    S: FleetSource + 'static,
    B: MapBackend + 'static,
{
    pub fn new(source: S, backend: B, config: &Config) -> Self {
        Self {
            shared: Arc::new(Shared {
                source,
                state: Mutex::new(ViewState {
                    routes: RouteStore::new(),
                    renderer: MapRenderer::new(backend),
                    selection: SelectionController::new(),
                    trucks: Vec::new(),
                    fleet_stats: FleetStats::default(),
                    applied_tick: 0,
                    applied_load: 0,
                    disposed: false,
                }),
                next_tick: AtomicU64::new(0),
                next_load: AtomicU64::new(0),
                applied: watch::channel(0).0,
            }),
            scheduler: PollScheduler::new(RetryPolicy::from_config(config)),
            poll_interval: config.poll_interval(),
        }
    }

    /// Load today's routes, then start polling trucks
    pub async fn init(&mut self) -> ControllerResult<()> {
        self.load_routes(DayFilter::Today).await?;
        self.start_polling().await;
        Ok(())
    }

    /// One truck tick, outside the schedule
    pub async fn refresh_trucks(&self) -> ControllerResult<TickOutcome> {
        self.ensure_live()?;
        Ok(self.shared.refresh_trucks().await?)
    }

    /// Fetch and draw the routes for `day`. Clears any selection. A load
    /// overtaken by one started after it is dropped.
    pub async fn load_routes(&self, day: DayFilter) -> ControllerResult<LoadOutcome> {
        self.ensure_live()?;
        let load = self.shared.next_load.fetch_add(1, Ordering::SeqCst) + 1;
        let routes = self.shared.source.fetch_routes(day).await?;

        let mut guard = self.shared.lock();
        let state = &mut *guard;
        if state.disposed {
            return Err(ControllerError::Disposed);
        }
        if load <= state.applied_load {
            debug!(%day, load, applied = state.applied_load, "stale route load discarded");
            return Ok(LoadOutcome::Stale);
        }
        state.applied_load = load;

        state.routes.load_for_day(day, routes);
        state.selection.clear(&mut state.routes);
        let drawn = state.renderer.render_routes(&state.routes.colored_routes());
        let loaded = state.routes.all_routes().len();
        info!(%day, loaded, drawn, "routes loaded");
        Ok(LoadOutcome::Applied {
            routes: loaded,
            drawn,
        })
    }

    /// Narrow the drawn routes to those matching `term`; returns how many
    /// remain
    pub fn filter_routes(&self, term: &str) -> usize {
        let mut guard = self.shared.lock();
        let state = &mut *guard;
        state.routes.filter(term);
        state.selection.clear(&mut state.routes);
        state.renderer.render_routes(&state.routes.colored_routes());
        state.routes.filtered_routes().len()
    }

    pub fn select_truck(&self, truck_id: &str) -> Option<RouteId> {
        let mut guard = self.shared.lock();
        let state = &mut *guard;
        state
            .selection
            .select_truck(truck_id, &state.trucks, &mut state.routes, &mut state.renderer)
    }

    pub fn select_route(&self, route_id: &str) -> ControllerResult<RouteDetail> {
        let mut guard = self.shared.lock();
        let state = &mut *guard;
        state
            .selection
            .select_route(route_id, &state.trucks, &mut state.routes, &mut state.renderer)
            .ok_or_else(|| ControllerError::RouteNotFound(route_id.to_string()))
    }

    /// Show or hide trucks. Hidden trucks are not polled. Returns the new
    /// visibility.
    pub async fn toggle_trucks(&mut self) -> bool {
        let visible = {
            let mut state = self.shared.lock();
            let visible = !state.renderer.trucks_visible();
            state.renderer.set_trucks_visible(visible);
            visible
        };
        if visible {
            self.start_polling().await;
        } else {
            self.scheduler.stop();
        }
        visible
    }

    /// Show or hide route groups without refetching
    pub fn toggle_routes(&self) -> bool {
        let mut state = self.shared.lock();
        let visible = !state.renderer.routes_visible();
        state.renderer.set_routes_visible(visible);
        visible
    }

    pub fn center(&self) {
        self.shared.lock().renderer.center();
    }

    /// Delete a route, then reload the current day
    pub async fn delete_route(&self, route_id: &str) -> ControllerResult<LoadOutcome> {
        self.ensure_live()?;
        self.shared.source.delete_route(route_id).await?;
        let day = self.shared.lock().routes.day();
        self.load_routes(day).await
    }

    /// Stop polling and detach the map. Idempotent.
    pub fn dispose(&mut self) {
        self.scheduler.stop();
        let mut state = self.shared.lock();
        if !state.disposed {
            state.disposed = true;
            state.renderer.detach();
            info!("map view disposed");
        }
    }

    /// Notified with the tick number each time a truck refresh is applied
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.shared.applied.subscribe()
    }

    pub fn is_polling(&self) -> bool {
        self.scheduler.is_running()
    }

    pub fn polling_state(&self) -> FailureState {
        self.scheduler.failure_state()
    }

    pub fn trucks(&self) -> Vec<EnrichedTruck> {
        self.shared.lock().trucks.clone()
    }

    pub fn fleet_stats(&self) -> FleetStats {
        self.shared.lock().fleet_stats
    }

    pub fn route_stats(&self) -> RouteStats {
        RouteStats::from_routes(self.shared.lock().routes.all_routes(), today_weekday())
    }

    pub fn with_routes<R>(&self, f: impl FnOnce(&RouteStore) -> R) -> R {
        f(&self.shared.lock().routes)
    }

    pub fn with_backend<R>(&self, f: impl FnOnce(&B) -> R) -> R {
        f(self.shared.lock().renderer.backend())
    }

    /// Start the truck poll; the first tick has run when this returns
    pub async fn start_polling(&mut self) {
        let shared = Arc::clone(&self.shared);
        self.scheduler
            .start(self.poll_interval, move || {
                let shared = Arc::clone(&shared);
                async move { shared.refresh_trucks().await.map(|_| ()) }
            })
            .await;
    }

    fn ensure_live(&self) -> ControllerResult<()> {
        if self.shared.lock().disposed {
            return Err(ControllerError::Disposed);
        }
        Ok(())
    }
}
