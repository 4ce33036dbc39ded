// Websocket push source: orderbook_snapshot + orderbook_delta messages.
//
// The feed layer only accepts whole snapshots, so this source keeps a live
// per-side book and reconstitutes the full RawOrderbook after every delta.

use std::collections::BTreeMap;

use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use serde::Deserialize;
use tokio::sync::{mpsc, watch};
use tokio::time::{sleep, Duration};
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, info, warn};

use super::{DepthSource, SourceError, SourceEvent};
use crate::depth::types::RawOrderbook;

const RECONNECT_DELAY: Duration = Duration::from_secs(3);

#[derive(Debug, Deserialize)]
struct WsEnvelope {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    seq: Option<u64>,
    #[serde(default)]
    msg: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct WsSnapshot {
    market_ticker: String,
    #[serde(default)]
    yes: Option<Vec<(i64, i64)>>,
    #[serde(default)]
    no: Option<Vec<(i64, i64)>>,
}

#[derive(Debug, Deserialize)]
struct WsDelta {
    market_ticker: String,
    price: i64,
    delta: i64,
    side: BookSide,
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
enum BookSide {
    Yes,
    No,
}

/// Mutable book the deltas are applied against. Replaced wholesale by every
/// orderbook_snapshot message.
#[derive(Debug, Default)]
struct LiveBook {
    yes: BTreeMap<i64, i64>,
    no: BTreeMap<i64, i64>,
}

impl LiveBook {
    fn apply_snapshot(&mut self, snap: &WsSnapshot) {
        self.yes = side_map(snap.yes.as_deref());
        self.no = side_map(snap.no.as_deref());
    }

    fn apply_delta(&mut self, delta: &WsDelta) {
        let side = match delta.side {
            BookSide::Yes => &mut self.yes,
            BookSide::No => &mut self.no,
        };
        let qty = side.entry(delta.price).or_insert(0);
        *qty += delta.delta;
        if *qty <= 0 {
            side.remove(&delta.price);
        }
    }

    /// Full snapshot in the wire shape the normaliser expects.
    fn to_raw(&self) -> RawOrderbook {
        RawOrderbook {
            yes: Some(self.yes.iter().map(|(&p, &q)| (p, q)).collect()),
            no: Some(self.no.iter().map(|(&p, &q)| (p, q)).collect()),
        }
    }
}

fn side_map(levels: Option<&[(i64, i64)]>) -> BTreeMap<i64, i64> {
    levels
        .unwrap_or_default()
        .iter()
        .filter(|&&(_, q)| q > 0)
        .copied()
        .collect()
}

/// Apply one feed message to the live book. Ok(true) means the book changed
/// and a fresh snapshot should be emitted. A sequence gap on a delta is
/// unrecoverable mid-session: the book would silently diverge from the
/// venue's, so the session is torn down and resubscribed for a new snapshot.
fn apply_message(
    book: &mut LiveBook,
    last_seq: &mut Option<u64>,
    ticker: &str,
    envelope: WsEnvelope,
) -> Result<bool, SourceError> {
    match envelope.kind.as_str() {
        "orderbook_snapshot" => {
            let snap: WsSnapshot = match serde_json::from_value(envelope.msg) {
                Ok(s) => s,
                Err(e) => {
                    warn!(%ticker, error = %e, "malformed orderbook_snapshot");
                    return Ok(false);
                }
            };
            if snap.market_ticker != ticker {
                return Ok(false);
            }
            // A snapshot restarts the sequence; deltas chain from it.
            *last_seq = envelope.seq;
            book.apply_snapshot(&snap);
            Ok(true)
        }
        "orderbook_delta" => {
            let delta: WsDelta = match serde_json::from_value(envelope.msg) {
                Ok(d) => d,
                Err(e) => {
                    warn!(%ticker, error = %e, "malformed orderbook_delta");
                    return Ok(false);
                }
            };
            if delta.market_ticker != ticker {
                return Ok(false);
            }
            if let (Some(prev), Some(seq)) = (*last_seq, envelope.seq) {
                if seq != prev + 1 {
                    return Err(SourceError::Protocol(format!(
                        "sequence gap on {ticker}: expected {}, got {seq}",
                        prev + 1
                    )));
                }
            }
            if envelope.seq.is_some() {
                *last_seq = envelope.seq;
            }
            book.apply_delta(&delta);
            Ok(true)
        }
        // subscription acks, errors, heartbeats
        other => {
            debug!(%ticker, kind = other, "ignoring feed message");
            Ok(false)
        }
    }
}

pub struct WebsocketSource {
    ws_url: String,
}

impl WebsocketSource {
    pub fn new(ws_url: &str) -> Self {
        Self {
            ws_url: ws_url.to_string(),
        }
    }

    /// One connect-subscribe-read session. Returns Ok(()) only on shutdown;
    /// a transport end or a delta sequence gap returns Err so the caller
    /// reconnects and resubscribes for a fresh snapshot.
    async fn session(
        &self,
        ticker: &str,
        tx: &mpsc::Sender<SourceEvent>,
        shutdown: &mut watch::Receiver<bool>,
    ) -> Result<(), SourceError> {
        let (stream, _) = tokio_tungstenite::connect_async(self.ws_url.as_str()).await?;
        let (mut write, mut read) = stream.split();

        let subscribe = serde_json::json!({
            "id": 1,
            "cmd": "subscribe",
            "params": {
                "channels": ["orderbook_delta"],
                "market_tickers": [ticker],
            }
        });
        write.send(Message::Text(subscribe.to_string())).await?;
        info!(%ticker, url = %self.ws_url, "subscribed to orderbook channel");

        let mut book = LiveBook::default();
        let mut last_seq: Option<u64> = None;

        loop {
            let msg = tokio::select! {
                msg = read.next() => msg,
                _ = shutdown.changed() => {
                    if *shutdown.borrow() {
                        debug!(%ticker, "websocket session shut down");
                        return Ok(());
                    }
                    continue;
                }
            };

            let text = match msg {
                Some(Ok(Message::Text(text))) => text,
                Some(Ok(Message::Close(_))) | None => {
                    return Err(SourceError::Protocol("stream closed by server".into()))
                }
                Some(Ok(_)) => continue, // ping/pong/binary
                Some(Err(e)) => return Err(e.into()),
            };

            let envelope: WsEnvelope = match serde_json::from_str(&text) {
                Ok(env) => env,
                Err(e) => {
                    warn!(%ticker, error = %e, "unparseable feed message");
                    continue;
                }
            };

            if !apply_message(&mut book, &mut last_seq, ticker, envelope)? {
                continue;
            }

            if tx.send(SourceEvent::Snapshot(book.to_raw())).await.is_err() {
                // Receiver gone: the subscription was torn down.
                return Ok(());
            }
        }
    }
}

#[async_trait]
impl DepthSource for WebsocketSource {
    async fn run(
        &self,
        ticker: String,
        tx: mpsc::Sender<SourceEvent>,
        mut shutdown: watch::Receiver<bool>,
    ) {
        loop {
            if *shutdown.borrow() {
                return;
            }

            match self.session(&ticker, &tx, &mut shutdown).await {
                Ok(()) => return, // clean shutdown
                Err(e) => {
                    warn!(%ticker, error = %e, "websocket session ended");
                    if tx.send(SourceEvent::Down(e.to_string())).await.is_err() {
                        return;
                    }
                }
            }

            // Fixed-interval retry, cancellable mid-wait.
            tokio::select! {
                _ = sleep(RECONNECT_DELAY) => {}
                _ = shutdown.changed() => {}
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(yes: Vec<(i64, i64)>, no: Vec<(i64, i64)>) -> WsSnapshot {
        WsSnapshot {
            market_ticker: "KXTEST-A".into(),
            yes: Some(yes),
            no: Some(no),
        }
    }

    fn delta(side: BookSide, price: i64, amount: i64) -> WsDelta {
        WsDelta {
            market_ticker: "KXTEST-A".into(),
            price,
            delta: amount,
            side,
        }
    }

    #[test]
    fn snapshot_replaces_book_wholesale() {
        let mut book = LiveBook::default();
        book.apply_snapshot(&snapshot(vec![(63, 100)], vec![(37, 80)]));
        book.apply_snapshot(&snapshot(vec![(50, 5)], vec![]));

        let raw = book.to_raw();
        assert_eq!(raw.yes, Some(vec![(50, 5)]));
        assert_eq!(raw.no, Some(vec![]));
    }

    #[test]
    fn deltas_reconstitute_a_full_snapshot() {
        let mut book = LiveBook::default();
        book.apply_snapshot(&snapshot(vec![(63, 100), (40, 10)], vec![(37, 80)]));

        book.apply_delta(&delta(BookSide::Yes, 63, 50)); // top-up
        book.apply_delta(&delta(BookSide::No, 37, -20)); // partial pull
        book.apply_delta(&delta(BookSide::Yes, 55, 25)); // brand new level

        let raw = book.to_raw();
        assert_eq!(raw.yes, Some(vec![(40, 10), (55, 25), (63, 150)]));
        assert_eq!(raw.no, Some(vec![(37, 60)]));
    }

    #[test]
    fn delta_to_zero_or_below_removes_the_level() {
        let mut book = LiveBook::default();
        book.apply_snapshot(&snapshot(vec![(63, 100)], vec![]));

        book.apply_delta(&delta(BookSide::Yes, 63, -100));
        assert_eq!(book.to_raw().yes, Some(vec![]));

        // Over-withdrawal from a misbehaving feed must not leave negatives.
        book.apply_delta(&delta(BookSide::Yes, 10, 5));
        book.apply_delta(&delta(BookSide::Yes, 10, -9));
        assert_eq!(book.to_raw().yes, Some(vec![]));
    }

    fn envelope(kind: &str, seq: u64, msg: serde_json::Value) -> WsEnvelope {
        WsEnvelope {
            kind: kind.into(),
            seq: Some(seq),
            msg,
        }
    }

    #[test]
    fn delta_sequence_gap_tears_down_the_session() {
        let mut book = LiveBook::default();
        let mut last_seq = None;

        let snap = serde_json::json!({
            "market_ticker": "KXTEST-A", "yes": [[63, 100]], "no": []
        });
        let emit = apply_message(
            &mut book,
            &mut last_seq,
            "KXTEST-A",
            envelope("orderbook_snapshot", 1, snap),
        )
        .unwrap();
        assert!(emit);
        assert_eq!(last_seq, Some(1));

        let step = serde_json::json!({
            "market_ticker": "KXTEST-A", "price": 63, "delta": 50, "side": "yes"
        });
        apply_message(
            &mut book,
            &mut last_seq,
            "KXTEST-A",
            envelope("orderbook_delta", 2, step.clone()),
        )
        .unwrap();
        assert_eq!(last_seq, Some(2));

        // seq 3 never arrived; applying seq 4 would corrupt the book.
        let err = apply_message(
            &mut book,
            &mut last_seq,
            "KXTEST-A",
            envelope("orderbook_delta", 4, step),
        )
        .unwrap_err();
        assert!(matches!(err, SourceError::Protocol(_)));
    }

    #[test]
    fn non_book_messages_do_not_emit_or_advance_the_sequence() {
        let mut book = LiveBook::default();
        let mut last_seq = Some(5);

        let emit = apply_message(
            &mut book,
            &mut last_seq,
            "KXTEST-A",
            envelope("subscribed", 99, serde_json::json!({})),
        )
        .unwrap();
        assert!(!emit);
        assert_eq!(last_seq, Some(5));
    }

    #[test]
    fn wire_messages_deserialize() {
        let text = r#"{"type":"orderbook_snapshot","sid":7,"seq":1,
            "msg":{"market_ticker":"KXTEST-A","yes":[[63,100],[40,10]],"no":[[37,80]]}}"#;
        let env: WsEnvelope = serde_json::from_str(text).unwrap();
        assert_eq!(env.kind, "orderbook_snapshot");
        assert_eq!(env.seq, Some(1));
        let snap: WsSnapshot = serde_json::from_value(env.msg).unwrap();
        assert_eq!(snap.yes.unwrap().len(), 2);

        let text = r#"{"type":"orderbook_delta","sid":7,"seq":2,
            "msg":{"market_ticker":"KXTEST-A","price":37,"delta":-20,"side":"no"}}"#;
        let env: WsEnvelope = serde_json::from_str(text).unwrap();
        let d: WsDelta = serde_json::from_value(env.msg).unwrap();
        assert_eq!(d.side, BookSide::No);
        assert_eq!(d.delta, -20);
    }
}
