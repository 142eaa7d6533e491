//! Incremental canvas sync with offline fallback.
//!
//! [`SyncSession`] owns everything a viewer needs for one server: the
//! surface, the delta watermark, and the connectivity state machine.
//!
//! # State Machine
//!
//! ```text
//!              network failure
//! ┌───────────┐ ─────────────────► ┌──────────────┐
//! │ Connected │                    │ Reconnecting │ ◄─┐ 404 / no response
//! └───────────┘ ◄───────────────── └──────────────┘ ──┘
//!   every sync    probe answered:      every probe
//!   interval      one full resync      interval
//! ```
//!
//! Exactly one periodic ticker drives requests. [`run`](SyncSession::run)
//! replaces it by assignment on every transition, and each tick awaits its
//! request before the next tick can fire, so requests never overlap.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use pixelframe_api::{ApiError, CanvasEndpoint, FetchOutcome, PixelUpdate};
use tokio::sync::mpsc;
use tokio::time::{Instant, Interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::clock::{Clock, SystemClock};
use super::countdown::Countdown;
use super::status::{ConnectionStatus, SessionEvent};
use super::watermark::Watermark;
use crate::canvas::{ApplyReport, Rgb, SurfaceBuffer};
use crate::config::{NotFoundPolicy, SyncConfig};
use crate::error::{Result, ViewerError};

/// Countdown display period.
const COUNTDOWN_PERIOD: Duration = Duration::from_secs(1);

/// Mode change caused by a single tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Mode unchanged.
    Stay,
    /// Connected → Reconnecting.
    EnteredReconnect,
    /// Reconnecting → Connected (after one full resync).
    Reconnected,
}

/// One client's view of one canvas server.
pub struct SyncSession<E: CanvasEndpoint> {
    endpoint: E,
    config: SyncConfig,
    clock: Arc<dyn Clock>,
    surface: Arc<Mutex<SurfaceBuffer>>,
    watermark: Watermark,
    status: ConnectionStatus,
    countdown: Arc<Mutex<Countdown>>,
    events: Option<mpsc::UnboundedSender<SessionEvent>>,
    started: bool,
}

impl<E: CanvasEndpoint> SyncSession<E> {
    /// Create an unstarted session. Call [`start`](Self::start) before
    /// [`run`](Self::run).
    pub fn new(endpoint: E, config: SyncConfig) -> Self {
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        let watermark = Watermark::new(clock.now_secs(), config.watermark_margin_secs);
        let countdown = Arc::new(Mutex::new(Countdown::new(config.countdown_from)));
        Self {
            endpoint,
            config,
            clock,
            surface: Arc::new(Mutex::new(SurfaceBuffer::new(0, 0))),
            watermark,
            status: ConnectionStatus::Connected,
            countdown,
            events: None,
            started: false,
        }
    }

    /// Use a custom clock (tests, replay).
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.watermark = Watermark::new(clock.now_secs(), self.config.watermark_margin_secs);
        self.clock = clock;
        self
    }

    /// Send [`SessionEvent`]s to `tx`.
    pub fn with_events(mut self, tx: mpsc::UnboundedSender<SessionEvent>) -> Self {
        self.events = Some(tx);
        self
    }

    /// Current connectivity.
    pub fn status(&self) -> ConnectionStatus {
        self.status
    }

    /// Current watermark.
    pub fn watermark(&self) -> Watermark {
        self.watermark
    }

    /// Shared handle to the raster. The session is its only writer.
    pub fn surface_handle(&self) -> Arc<Mutex<SurfaceBuffer>> {
        Arc::clone(&self.surface)
    }

    /// Clone of the current raster.
    pub fn snapshot(&self) -> SurfaceBuffer {
        self.with_surface(|s| s.clone())
    }

    fn with_surface<R>(&self, f: impl FnOnce(&mut SurfaceBuffer) -> R) -> R {
        let mut guard = match self.surface.lock() {
            Ok(s) => s,
            Err(p) => p.into_inner(),
        };
        f(&mut guard)
    }

    fn emit(&self, event: SessionEvent) {
        send_event(self.events.as_ref(), event);
    }

    /// Query the canvas size once, allocate the surface and load the full image.
    ///
    /// The size is fixed for the session lifetime; calling this again only
    /// repeats the full resync.
    ///
    /// # Errors
    ///
    /// Returns an error if the size query fails, the canvas is empty or
    /// exceeds `max_pixels`, or the initial full image cannot be fetched.
    pub async fn start(&mut self) -> Result<()> {
        if !self.started {
            let size = self.endpoint.size().await?;
            let pixels = size.area();
            if pixels == 0 {
                return Err(ViewerError::EmptyCanvas(size.to_string()));
            }
            if pixels > self.config.max_pixels {
                return Err(ViewerError::CanvasTooLarge {
                    size: size.to_string(),
                    pixels,
                    limit: self.config.max_pixels,
                });
            }
            info!(%size, "canvas size received");
            self.with_surface(|s| *s = SurfaceBuffer::new(size.x, size.y));
            self.started = true;
        }
        self.full_resync().await
    }

    /// Replace the raster with the server's full image.
    ///
    /// On success the watermark resets to the time the request was issued.
    /// An HTTP-level failure blanks the raster to black; an unreachable
    /// server leaves it untouched.
    ///
    /// # Errors
    ///
    /// Returns the fetch or decode error.
    pub async fn full_resync(&mut self) -> Result<()> {
        let now = self.clock.now_secs();
        let bytes = match self.endpoint.full_image().await {
            Ok(b) => b,
            Err(e) => {
                if !matches!(e, ApiError::Unreachable(_)) {
                    self.with_surface(|s| s.fill(Rgb::BLACK));
                }
                warn!("full image fetch failed: {e}");
                return Err(e.into());
            }
        };

        self.with_surface(|s| s.apply_full(&bytes))?;
        self.watermark.reset(now);
        debug!(watermark = now, "full resync applied");
        self.emit(SessionEvent::Resynced { watermark: now });
        Ok(())
    }

    /// Run one tick for the current mode.
    pub async fn tick(&mut self) -> Transition {
        if self.status.is_connected() {
            self.sync_tick().await
        } else {
            self.probe_tick().await
        }
    }

    /// One delta poll. Only meaningful while connected.
    pub async fn sync_tick(&mut self) -> Transition {
        let now = self.clock.now_secs();
        let cursor = self.watermark.cursor();

        let outcome = match self.endpoint.since(cursor).await {
            Ok(o) => o,
            Err(e) => {
                // Watermark stays put so the next cycle re-requests this window.
                warn!(cursor, "delta cycle failed: {e}");
                return Transition::Stay;
            }
        };
        debug!(cursor, outcome = outcome.label(), "delta cycle");

        match outcome {
            FetchOutcome::Deltas(updates) => {
                self.apply(&updates);
                self.watermark.advance_to(now);
                Transition::Stay
            }
            FetchOutcome::Rebaseline => {
                info!(cursor, "server requested rebaseline");
                match self.full_resync().await {
                    Err(ViewerError::Api(ApiError::Unreachable(reason))) => {
                        self.enter_reconnect(&reason)
                    }
                    _ => Transition::Stay,
                }
            }
            FetchOutcome::NotFound => {
                self.watermark.advance_to(now);
                match self.config.not_found {
                    NotFoundPolicy::Ignore => Transition::Stay,
                    NotFoundPolicy::Reconnect => self.enter_reconnect("delta endpoint returned 404"),
                }
            }
            FetchOutcome::NetworkFailure(reason) => {
                self.watermark.advance_to(now);
                self.enter_reconnect(&reason)
            }
        }
    }

    /// One reconnect probe. Only meaningful while reconnecting.
    pub async fn probe_tick(&mut self) -> Transition {
        lock_countdown(&self.countdown).reset();
        self.emit(countdown_event(&self.countdown, false));

        let reachable = match self.endpoint.since(self.watermark.cursor()).await {
            Ok(FetchOutcome::NotFound | FetchOutcome::NetworkFailure(_)) => false,
            Ok(_) => true,
            Err(e) => e.server_responded(),
        };
        if reachable {
            match self.full_resync().await {
                Err(ViewerError::Api(ApiError::Unreachable(_))) => {}
                _ => return self.leave_reconnect(),
            }
        }

        if let ConnectionStatus::Reconnecting { attempt } = &mut self.status {
            *attempt += 1;
            info!(attempt = *attempt, "still offline");
        }
        Transition::Stay
    }

    /// Advance the cosmetic countdown. No-op while connected.
    pub fn countdown_tick(&mut self) {
        if self.status.is_connected() {
            return;
        }
        self.emit(countdown_event(&self.countdown, true));
    }

    fn apply(&self, updates: &[PixelUpdate]) {
        if updates.is_empty() {
            return;
        }
        let report: ApplyReport = self.with_surface(|s| s.apply_patches(updates));
        debug!(applied = report.applied, skipped = report.skipped, "deltas applied");
        self.emit(report.into());
    }

    fn enter_reconnect(&mut self, reason: &str) -> Transition {
        if !self.status.is_connected() {
            return Transition::Stay;
        }
        warn!(reason, "server unreachable, switching to reconnect probing");
        self.status = ConnectionStatus::Reconnecting { attempt: 0 };
        let banner = {
            let mut countdown = lock_countdown(&self.countdown);
            countdown.reset();
            countdown.banner()
        };
        self.emit(SessionEvent::StatusChanged {
            status: self.status,
        });
        self.emit(SessionEvent::Offline { banner });
        Transition::EnteredReconnect
    }

    fn leave_reconnect(&mut self) -> Transition {
        info!("server reachable again, resuming sync");
        self.status = ConnectionStatus::Connected;
        self.emit(SessionEvent::Online);
        self.emit(SessionEvent::StatusChanged {
            status: self.status,
        });
        Transition::Reconnected
    }

    fn ticker(&self) -> Interval {
        let period = if self.status.is_connected() {
            self.config.interval()
        } else {
            self.config.probe_interval()
        };
        let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        ticker
    }

    /// Drive the sync and reconnect loops until `cancel` fires.
    ///
    /// Cancelling also drops any in-flight request. The countdown keeps
    /// moving while a probe request is outstanding.
    pub async fn run(&mut self, cancel: CancellationToken) {
        let mut ticker = self.ticker();
        let mut countdown =
            tokio::time::interval_at(Instant::now() + COUNTDOWN_PERIOD, COUNTDOWN_PERIOD);
        countdown.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let shared_countdown = Arc::clone(&self.countdown);
        let events = self.events.clone();
        info!(status = %self.status, "sync session running");

        'run: loop {
            tokio::select! {
                () = cancel.cancelled() => break,
                _ = ticker.tick() => {
                    let offline = !self.status.is_connected();
                    let transition = {
                        let tick = self.tick();
                        tokio::pin!(tick);
                        loop {
                            tokio::select! {
                                () = cancel.cancelled() => break 'run,
                                t = &mut tick => break t,
                                _ = countdown.tick(), if offline => {
                                    send_event(
                                        events.as_ref(),
                                        countdown_event(&shared_countdown, true),
                                    );
                                }
                            }
                        }
                    };
                    if transition != Transition::Stay {
                        // Swap the single periodic task for the new mode.
                        ticker = self.ticker();
                        countdown.reset();
                    }
                }
                _ = countdown.tick(), if !self.status.is_connected() => {
                    self.countdown_tick();
                }
            }
        }
        info!("sync session cancelled");
    }
}

fn send_event(events: Option<&mpsc::UnboundedSender<SessionEvent>>, event: SessionEvent) {
    if let Some(tx) = events {
        // Observer gone; the session keeps running headless.
        let _ = tx.send(event);
    }
}

fn lock_countdown(countdown: &Mutex<Countdown>) -> MutexGuard<'_, Countdown> {
    match countdown.lock() {
        Ok(c) => c,
        Err(p) => p.into_inner(),
    }
}

/// Snapshot the countdown as an event, advancing it first if `advance`.
fn countdown_event(countdown: &Mutex<Countdown>, advance: bool) -> SessionEvent {
    let mut countdown = lock_countdown(countdown);
    if advance {
        countdown.tick();
    }
    debug!(remaining = countdown.remaining(), "{}", countdown.banner());
    SessionEvent::Countdown {
        remaining: countdown.remaining(),
        banner: countdown.banner(),
    }
}
