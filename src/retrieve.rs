//! Cancellable multi-segment route retrieval.
//!
//! Fetching a tour route takes one network round trip per consecutive
//! pair of points, so it runs on a background task while the foreground
//! keeps drawing the map. The task reports exactly one outcome per run
//! through a channel the consumer drains on its own execution context;
//! nothing is delivered inline from the worker.

use crate::client::SegmentSource;
use crate::GeoPoint;
use log::{debug, warn};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedSender;
use tokio::sync::Notify;
use tokio::task::JoinHandle;

/// Outcome of one retrieval run, delivered over the consumer's channel.
#[derive(Debug, Clone, PartialEq)]
pub enum RouteEvent {
    /// The assembled route is ready to render.
    Ready(Vec<GeoPoint>),
    /// No route could be retrieved: a segment failed, or the run was
    /// cancelled before it completed.
    Unavailable,
}

/// Cooperative cancellation: a flag the worker checks before each segment
/// fetch, plus a wakeup that lets it abandon an in-flight fetch early.
struct CancelFlag {
    cancelled: AtomicBool,
    notify: Notify,
}

impl CancelFlag {
    fn new() -> Self {
        Self {
            cancelled: AtomicBool::new(false),
            notify: Notify::new(),
        }
    }

    fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
        // notify_one stores a permit, so the worker wakes even if it is
        // not parked on the Notify yet.
        self.notify.notify_one();
    }

    fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// Retrieves multi-segment routes for a single consumer.
///
/// Each retriever targets one consumer channel and owns at most one live
/// run at a time: starting a new run first cancels any run still in
/// flight (replace, not queue). Every started run delivers exactly one
/// [`RouteEvent`] on the channel, in run order.
///
/// A run walks the consecutive pairs of its input list in strict order,
/// fetching each segment from the [`SegmentSource`] and appending the
/// pair's start, the fetched waypoints, then the pair's end. Segments are
/// never fetched in parallel; assembly correctness depends on position,
/// not independence.
///
/// One failed segment fails the whole run. A cancelled run also delivers
/// [`RouteEvent::Unavailable`]; a success event can never follow
/// cancellation. A request already in flight when the run is cancelled
/// may still complete and populate the cache, which is harmless: the
/// cache key is the true endpoint pair, regardless of which run wrote it.
///
/// `start` and `cancel` must be called from within a Tokio runtime.
pub struct RouteRetriever {
    source: Arc<dyn SegmentSource>,
    events: UnboundedSender<RouteEvent>,
    active: Option<ActiveRun>,
}

struct ActiveRun {
    cancel: Arc<CancelFlag>,
    worker: JoinHandle<()>,
}

impl RouteRetriever {
    /// Create a retriever that fetches from `source` and delivers each
    /// run's outcome on `events`.
    pub fn new(source: Arc<dyn SegmentSource>, events: UnboundedSender<RouteEvent>) -> Self {
        Self {
            source,
            events,
            active: None,
        }
    }

    /// Start retrieving the route through `points`, cancelling any run
    /// still in flight first.
    ///
    /// Fewer than 2 points means there is nothing to route: the run
    /// completes immediately with an empty [`RouteEvent::Ready`] and no
    /// network activity. Otherwise a background worker fetches one
    /// segment per consecutive pair, in input order.
    ///
    /// With `use_cache` set, segment routes are served from and stored
    /// into the source's cache.
    pub fn start(&mut self, points: Vec<GeoPoint>, use_cache: bool) {
        self.cancel();

        if points.len() < 2 {
            debug!("[RouteRetriever] {} point(s), nothing to fetch", points.len());
            let _ = self.events.send(RouteEvent::Ready(Vec::new()));
            return;
        }

        let cancel = Arc::new(CancelFlag::new());
        let worker = tokio::spawn(run_retrieval(
            Arc::clone(&self.source),
            points,
            use_cache,
            Arc::clone(&cancel),
            self.events.clone(),
        ));
        self.active = Some(ActiveRun { cancel, worker });
    }

    /// Cancel the live run, if any.
    ///
    /// Cancellation is cooperative: the worker stops before its next
    /// segment fetch, or abandons the fetch currently in flight, and
    /// delivers [`RouteEvent::Unavailable`] for the run.
    pub fn cancel(&mut self) {
        if let Some(run) = self.active.take() {
            run.cancel.cancel();
        }
    }

    /// Whether a run is currently live.
    pub fn is_running(&self) -> bool {
        self.active
            .as_ref()
            .is_some_and(|run| !run.worker.is_finished())
    }
}

impl Drop for RouteRetriever {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Background worker for one run. Sends exactly one event on every path
/// out, and never panics past its own boundary.
async fn run_retrieval(
    source: Arc<dyn SegmentSource>,
    points: Vec<GeoPoint>,
    use_cache: bool,
    cancel: Arc<CancelFlag>,
    events: UnboundedSender<RouteEvent>,
) {
    let mut assembled: Vec<GeoPoint> = Vec::new();

    for pair in points.windows(2) {
        if cancel.is_cancelled() {
            debug!("[RouteRetriever] cancelled before next segment");
            let _ = events.send(RouteEvent::Unavailable);
            return;
        }

        let (start, end) = (pair[0], pair[1]);
        let fetched = tokio::select! {
            _ = cancel.notify.notified() => {
                debug!("[RouteRetriever] cancelled mid-fetch");
                let _ = events.send(RouteEvent::Unavailable);
                return;
            }
            result = source.fetch_segment(start, end, use_cache) => result,
        };

        match fetched {
            Ok(route) => {
                assembled.push(start);
                assembled.extend(route.waypoints);
                assembled.push(end);
            }
            Err(err) => {
                warn!("[RouteRetriever] segment fetch failed: {}", err);
                let _ = events.send(RouteEvent::Unavailable);
                return;
            }
        }
    }

    // Cancellation may have landed after the last fetch; a cancelled run
    // must never surface a route.
    if cancel.is_cancelled() {
        let _ = events.send(RouteEvent::Unavailable);
        return;
    }

    if assembled.is_empty() {
        // At least 2 points were given but no segment produced anything.
        let _ = events.send(RouteEvent::Unavailable);
        return;
    }

    debug!(
        "[RouteRetriever] assembled route of {} points",
        assembled.len()
    );
    let _ = events.send(RouteEvent::Ready(assembled));
}
