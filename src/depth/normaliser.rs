// Convert raw wire snapshots into render-ready ladder sides.
// Pure and deterministic: safe to re-run on every tick.

use std::collections::BTreeMap;

use crate::depth::types::{DepthView, PriceLevel, RawOrderbook};

/// Prices are cents on a binary contract; anything outside this band is a
/// malformed level and gets dropped rather than rendered.
const MIN_PRICE: i64 = 1;
const MAX_PRICE: i64 = 99;

/// Normalise one snapshot (or none, before the first arrives) into the two
/// ladder sides. Absent or malformed input for a side yields an empty side,
/// never an error: a market with no resting orders is valid.
pub fn normalise(snapshot: Option<&RawOrderbook>) -> DepthView {
    match snapshot {
        Some(raw) => DepthView {
            yes_bids: normalise_side(raw.yes.as_deref()),
            no_bids: normalise_side(raw.no.as_deref()),
        },
        None => DepthView::default(),
    }
}

/// Merge duplicate prices (summing quantities), drop empty and out-of-range
/// levels, and sort descending so the top of book comes first.
pub fn normalise_side(levels: Option<&[(i64, i64)]>) -> Vec<PriceLevel> {
    let mut merged: BTreeMap<i64, i64> = BTreeMap::new();

    for &(price, quantity) in levels.unwrap_or_default() {
        if !(MIN_PRICE..=MAX_PRICE).contains(&price) {
            continue;
        }
        *merged.entry(price).or_insert(0) += quantity;
    }

    merged
        .into_iter()
        .rev() // highest price = top of book
        .filter(|&(_, qty)| qty > 0)
        .map(|(price, qty)| PriceLevel {
            price,
            quantity: qty as u64,
        })
        .collect()
}
