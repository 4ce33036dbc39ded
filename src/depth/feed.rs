// Subscription lifecycle keyed by market ticker.
//
// The feed owns at most one active subscription. Switching tickers drops the
// old subscription's shutdown handle, bumps the generation, and spawns the
// source again for the new ticker. Every applied event must carry the current
// generation; anything else is a stale result from a dead subscription and is
// silently discarded.

use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use tracing::{debug, info, trace, warn};

use crate::depth::normaliser::normalise;
use crate::depth::sources::{DepthSource, SourceEvent};
use crate::depth::types::{ConnectionState, DepthView, RawOrderbook};

const EVENT_BUFFER: usize = 64;

struct Subscription {
    generation: u64,
    rx: mpsc::Receiver<SourceEvent>,
    shutdown: watch::Sender<bool>,
}

impl Drop for Subscription {
    fn drop(&mut self) {
        // Cooperative: flips the flag, never aborts an in-flight request.
        let _ = self.shutdown.send(true);
    }
}

pub struct DepthFeed {
    source: Arc<dyn DepthSource>,
    subscription: Option<Subscription>,
    generation: u64,
    ticker: Option<String>,
    state: ConnectionState,
    snapshot: Option<RawOrderbook>,
    closed: bool,
}

impl DepthFeed {
    pub fn new(source: Arc<dyn DepthSource>) -> Self {
        Self {
            source,
            subscription: None,
            generation: 0,
            ticker: None,
            state: ConnectionState::Connecting,
            snapshot: None,
            closed: false,
        }
    }

    pub fn ticker(&self) -> Option<&str> {
        self.ticker.as_deref()
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// Normalised view of the retained snapshot (empty before the first one).
    pub fn view(&self) -> DepthView {
        normalise(self.snapshot.as_ref())
    }

    pub fn has_snapshot(&self) -> bool {
        self.snapshot.is_some()
    }

    /// Tear down the current subscription (if any) and subscribe to `ticker`.
    ///
    /// The retained snapshot is cleared: data belonging to the previous
    /// ticker must never render after the switch.
    pub fn switch(&mut self, ticker: &str) {
        if self.closed {
            warn!(%ticker, "switch ignored: feed already closed");
            return;
        }

        self.subscription = None; // drop → shutdown signal for the old source
        self.generation += 1;
        self.ticker = Some(ticker.to_string());
        self.snapshot = None;
        self.state = ConnectionState::Connecting;
        metrics::gauge!("ladder_feed_live").set(0.0);

        let (tx, rx) = mpsc::channel(EVENT_BUFFER);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let source = Arc::clone(&self.source);
        let owned_ticker = ticker.to_string();
        tokio::spawn(async move {
            source.run(owned_ticker, tx, shutdown_rx).await;
        });

        self.subscription = Some(Subscription {
            generation: self.generation,
            rx,
            shutdown: shutdown_tx,
        });
        info!(%ticker, generation = self.generation, "subscribed");
    }

    /// Idempotent teardown. The last view stays readable, but no event can
    /// mutate feed state afterwards.
    pub fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        self.subscription = None;
        metrics::gauge!("ladder_feed_live").set(0.0);
        debug!(ticker = self.ticker.as_deref().unwrap_or("-"), "feed closed");
    }

    /// Await the next event from the active subscription and apply it.
    /// Resolves once displayed state changed; pends forever when there is
    /// nothing to wait on (no subscription, or after close).
    pub async fn tick(&mut self) {
        loop {
            let pulled = match self.subscription.as_mut() {
                Some(sub) if !self.closed => {
                    let generation = sub.generation;
                    sub.rx.recv().await.map(|event| (generation, event))
                }
                _ => std::future::pending().await,
            };

            match pulled {
                Some((generation, event)) => {
                    if self.apply(generation, event) {
                        return;
                    }
                }
                None => {
                    // Source task ended on its own: terminal transport failure.
                    warn!(ticker = self.ticker.as_deref().unwrap_or("-"), "source terminated");
                    self.subscription = None;
                    self.state = ConnectionState::Disconnected;
                    metrics::gauge!("ladder_feed_live").set(0.0);
                    return;
                }
            }
        }
    }

    /// Apply one generation-tagged event. Returns true if displayed state
    /// changed, false when the event was discarded as stale.
    fn apply(&mut self, generation: u64, event: SourceEvent) -> bool {
        if self.closed || generation != self.generation {
            trace!(
                generation,
                current = self.generation,
                closed = self.closed,
                "discarding stale event"
            );
            return false;
        }

        match event {
            SourceEvent::Snapshot(raw) => {
                self.snapshot = Some(raw);
                self.state = ConnectionState::Live;
                metrics::counter!("ladder_snapshots_applied").increment(1);
                metrics::gauge!("ladder_feed_live").set(1.0);
            }
            SourceEvent::Down(reason) => {
                // Keep the last good snapshot; only the badge degrades.
                warn!(ticker = self.ticker.as_deref().unwrap_or("-"), %reason, "feed down");
                self.state = ConnectionState::Disconnected;
                metrics::gauge!("ladder_feed_live").set(0.0);
            }
        }
        true
    }
}
