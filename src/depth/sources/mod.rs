// Shared trait + event for depth sources

use async_trait::async_trait;
use tokio::sync::{mpsc, watch};

use crate::depth::types::RawOrderbook;

/// What a source pushes into the feed. Every event is for the ticker the
/// source was spawned with; the feed tags and filters by generation.
#[derive(Debug, Clone)]
pub enum SourceEvent {
    /// Full, self-consistent snapshot. A delta-bearing source must
    /// reconstitute the complete book before emitting one of these.
    Snapshot(RawOrderbook),
    /// Transport trouble: fetch failed or stream dropped. Non-fatal; the
    /// source keeps retrying on its own schedule and the feed retains the
    /// last good snapshot.
    Down(String),
}

#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("http transport: {0}")]
    Http(#[from] reqwest::Error),
    #[error("websocket transport: {0}")]
    Ws(#[from] tokio_tungstenite::tungstenite::Error),
    #[error("unexpected payload: {0}")]
    Protocol(String),
}

/// A depth source services one subscription for one market ticker.
///
/// `run` sends SourceEvents until `shutdown` flips to true or the receiver
/// side goes away. Shutdown is cooperative: it stops new work being
/// scheduled, it does not abort an in-flight request — a late result simply
/// fails to send and is dropped.
#[async_trait]
pub trait DepthSource: Send + Sync {
    async fn run(
        &self,
        ticker: String,
        tx: mpsc::Sender<SourceEvent>,
        shutdown: watch::Receiver<bool>,
    );
}

pub mod rest;
pub mod websocket;
