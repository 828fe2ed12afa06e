use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use super::{session_state, Clock, Indicator, SessionState, StatusSource};
use crate::config::PollerSettings;
use crate::events::Event;

/// Identity of one armed inner timer. A new id means the old timer was
/// torn down and a fresh one started.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerId(u64);

/// Outcome of one session evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Evaluation {
    /// Same state as last time, inner timer left alone
    Unchanged(SessionState),
    Transitioned {
        from: Option<SessionState>,
        to: SessionState,
        interval: Duration,
    },
}

struct PollTimer {
    id: TimerId,
    interval: Duration,
    handle: JoinHandle<()>,
}

/// Market status poller with a cadence that follows the trading session.
///
/// Two clocks: an outer evaluation tick (cheap, local rule only) and an
/// inner poll timer (remote snapshot). The inner timer is only replaced
/// when the evaluated state changes; at most one is ever live.
pub struct StatusPoller<S, C> {
    source: Arc<S>,
    clock: Arc<C>,
    settings: PollerSettings,
    tx: mpsc::Sender<Event>,

    last_state: Option<SessionState>,
    timer: Option<PollTimer>,
    next_timer_id: u64,
}

impl<S: StatusSource, C: Clock> StatusPoller<S, C> {
    pub fn new(
        source: Arc<S>,
        clock: Arc<C>,
        settings: PollerSettings,
        tx: mpsc::Sender<Event>,
    ) -> Self {
        Self {
            source,
            clock,
            settings,
            tx,
            last_state: None,
            timer: None,
            next_timer_id: 0,
        }
    }

    pub fn last_state(&self) -> Option<SessionState> {
        self.last_state
    }

    /// Cadence of the live inner timer.
    pub fn interval(&self) -> Option<Duration> {
        self.timer.as_ref().map(|t| t.interval)
    }

    pub fn timer_id(&self) -> Option<TimerId> {
        self.timer.as_ref().map(|t| t.id)
    }

    pub fn is_polling(&self) -> bool {
        self.timer.as_ref().is_some_and(|t| !t.handle.is_finished())
    }

    /// Inner poll period for a state. Never zero: `tokio::time::interval`
    /// panics on a zero period.
    pub fn cadence_for(&self, state: SessionState) -> Duration {
        let ms = match state {
            SessionState::Open => self.settings.open_interval_ms,
            SessionState::Closed => self.settings.closed_interval_ms,
        };
        Duration::from_millis(ms.max(1))
    }

    /// Outer loop: evaluate now, then every `evaluate_secs`, until `shutdown` fires.
    pub async fn run(mut self, mut shutdown: oneshot::Receiver<()>) {
        let mut tick =
            tokio::time::interval(Duration::from_secs(self.settings.evaluate_secs.max(1)));
        tick.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = tick.tick() => {
                    self.evaluate().await;
                }
                _ = &mut shutdown => break,
            }
        }

        self.shutdown();
        info!("[poller] stopped");
    }

    /// Re-check the session window and re-arm the inner timer on a transition.
    pub async fn evaluate(&mut self) -> Evaluation {
        let now = self.clock.now();
        let current = session_state(now);

        if self.last_state == Some(current) {
            debug!("[poller] still {:?}, keeping timer", current);
            return Evaluation::Unchanged(current);
        }

        let from = self.last_state.replace(current);
        self.cancel_timer();

        let interval = self.cadence_for(current);
        info!(
            "[poller] market {} -> {}ms refresh",
            if current.is_open() { "OPEN" } else { "CLOSED" },
            interval.as_millis()
        );

        self.emit(Event::CadenceChanged {
            state: current,
            interval,
        })
        .await;
        self.emit(Event::MarketStatus(Indicator::local(current))).await;

        self.arm_timer(interval);

        Evaluation::Transitioned {
            from,
            to: current,
            interval,
        }
    }

    /// Stop the inner timer. `evaluate` will arm a new one.
    pub fn shutdown(&mut self) {
        self.cancel_timer();
        self.last_state = None;
    }

    // First tick of a tokio interval is immediate, which gives the
    // "fetch once right away" on every transition.
    fn arm_timer(&mut self, interval: Duration) {
        self.next_timer_id += 1;
        let id = TimerId(self.next_timer_id);

        let source = Arc::clone(&self.source);
        let clock = Arc::clone(&self.clock);
        let tx = self.tx.clone();

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                poll_once(source.as_ref(), clock.as_ref(), &tx).await;
            }
        });

        self.timer = Some(PollTimer {
            id,
            interval,
            handle,
        });
    }

    fn cancel_timer(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.handle.abort();
        }
    }

    async fn emit(&self, event: Event) {
        let _ = self.tx.send(event).await;
    }
}

impl<S, C> Drop for StatusPoller<S, C> {
    fn drop(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.handle.abort();
        }
    }
}

/// One remote status fetch. Failures and unusable snapshots are logged
/// and produce no indicator update.
pub async fn poll_once<S, C>(source: &S, clock: &C, tx: &mpsc::Sender<Event>) -> Option<Indicator>
where
    S: StatusSource + ?Sized,
    C: Clock + ?Sized,
{
    match source.snapshot().await {
        Ok(snap) if snap.is_usable() => {
            let now = clock.now();
            let indicator = Indicator::from_snapshot(&snap, session_state(now), now);
            let _ = tx.send(Event::MarketStatus(indicator.clone())).await;
            Some(indicator)
        }
        Ok(snap) => {
            warn!("[poller] snapshot status {:?}, skipping", snap.status);
            None
        }
        Err(e) => {
            warn!("[poller] snapshot failed: {}", e);
            None
        }
    }
}
