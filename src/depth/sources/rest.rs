// Fixed-interval polling source over the per-market orderbook endpoint.

use async_trait::async_trait;
use tokio::sync::{mpsc, watch};
use tokio::time::{interval, Duration, MissedTickBehavior};
use tracing::{debug, warn};

use super::{DepthSource, SourceError, SourceEvent};
use crate::depth::types::{OrderbookResponse, RawOrderbook};

pub struct RestSource {
    api_base: String,
    interval: Duration,
    client: reqwest::Client,
}

impl RestSource {
    pub fn new(api_base: &str, interval_secs: u64) -> Self {
        Self {
            api_base: api_base.trim_end_matches('/').to_string(),
            interval: Duration::from_secs(interval_secs.max(1)),
            client: reqwest::Client::new(),
        }
    }

    async fn fetch(&self, ticker: &str) -> Result<RawOrderbook, SourceError> {
        let url = format!("{}/markets/{}/orderbook", self.api_base, ticker);
        let response = self
            .client
            .get(&url)
            .send()
            .await?
            .error_for_status()?
            .json::<OrderbookResponse>()
            .await?;
        Ok(response.orderbook)
    }
}

#[async_trait]
impl DepthSource for RestSource {
    async fn run(
        &self,
        ticker: String,
        tx: mpsc::Sender<SourceEvent>,
        shutdown: watch::Receiver<bool>,
    ) {
        // One sequential loop per subscription: the next tick cannot fire
        // until the previous fetch has resolved, so refreshes for the same
        // ticker are never in flight concurrently.
        let mut ticks = interval(self.interval);
        ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticks.tick().await;
            if *shutdown.borrow() {
                debug!(%ticker, "poll loop shut down");
                return;
            }

            let event = match self.fetch(&ticker).await {
                Ok(snapshot) => {
                    debug!(
                        %ticker,
                        yes_levels = snapshot.yes.as_ref().map_or(0, Vec::len),
                        no_levels = snapshot.no.as_ref().map_or(0, Vec::len),
                        "fetched orderbook"
                    );
                    SourceEvent::Snapshot(snapshot)
                }
                Err(e) => {
                    warn!(%ticker, error = %e, "orderbook fetch failed");
                    SourceEvent::Down(e.to_string())
                }
            };

            // Re-check after the await: a teardown during the fetch means
            // this result is for a dead subscription and gets dropped.
            if *shutdown.borrow() || tx.send(event).await.is_err() {
                debug!(%ticker, "dropping poll result for torn-down subscription");
                return;
            }
        }
    }
}
