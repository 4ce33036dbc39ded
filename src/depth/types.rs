use serde::Deserialize;

/// One aggregated bid level: price in cents (1..=99), resting contract count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriceLevel {
    pub price: i64,
    pub quantity: u64,
}

/// Raw orderbook snapshot as it comes off the wire.
///
/// Each side is a list of [price, quantity] pairs. A missing side and an
/// explicitly empty side both mean "no resting orders"; the Option is kept so
/// the wire shape round-trips, but nothing downstream distinguishes them.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct RawOrderbook {
    #[serde(default)]
    pub yes: Option<Vec<(i64, i64)>>,
    #[serde(default)]
    pub no: Option<Vec<(i64, i64)>>,
}

/// REST response envelope: { "orderbook": { "yes": [...], "no": [...] } }
#[derive(Debug, Clone, Deserialize)]
pub struct OrderbookResponse {
    #[serde(default)]
    pub orderbook: RawOrderbook,
}

/// Normalized ladder view: both sides merged, zero-free, descending by price.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DepthView {
    pub yes_bids: Vec<PriceLevel>,
    pub no_bids: Vec<PriceLevel>,
}

/// Feed connectivity for the active ticker.
///
/// Resets to Connecting on every ticker change, advances to Live on the first
/// snapshot, regresses to Disconnected on transport failure (last-good view is
/// retained and still rendered).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionState {
    #[default]
    Connecting,
    Live,
    Disconnected,
}

impl ConnectionState {
    pub fn is_live(self) -> bool {
        self == ConnectionState::Live
    }
}
