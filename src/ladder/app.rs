// Renderer-side state.
//
// Usually synced from a DepthFeed, but fully drivable by a host that owns its
// own data source ("controlled mode"): construct the app, call
// apply_snapshot(..) with an already-fetched orderbook and a connectivity
// flag, and render with ui::draw.

use crate::depth::feed::DepthFeed;
use crate::depth::normaliser::normalise;
use crate::depth::types::{ConnectionState, DepthView, PriceLevel, RawOrderbook};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    Yes,
    No,
}

/// Scroll state for one column, anchored to a price rather than a row index:
/// level order shifts tick to tick, the price a user is looking at does not.
#[derive(Debug, Default)]
pub struct ColumnScroll {
    pub offset: usize,
    anchor: Option<i64>,
}

impl ColumnScroll {
    /// Re-derive the offset against fresh levels. An anchor only exists once
    /// the user has scrolled; without one the column stays pinned to top of
    /// book no matter how the levels shift. If the anchored price still rests
    /// on the book the column stays put; otherwise the offset is clamped.
    fn rebase(&mut self, levels: &[PriceLevel]) {
        let Some(anchor) = self.anchor else {
            self.offset = 0;
            return;
        };
        if let Some(idx) = levels.iter().position(|l| l.price == anchor) {
            self.offset = idx;
            return;
        }
        self.offset = self.offset.min(levels.len().saturating_sub(1));
        self.anchor = if self.offset == 0 {
            None // back at the top: resume top-of-book pinning
        } else {
            levels.get(self.offset).map(|l| l.price)
        };
    }

    fn scroll(&mut self, delta: isize, levels: &[PriceLevel]) {
        let max = levels.len().saturating_sub(1);
        self.offset = self.offset.saturating_add_signed(delta).min(max);
        self.anchor = if self.offset == 0 {
            None // scrolled back to the top: follow top of book again
        } else {
            levels.get(self.offset).map(|l| l.price)
        };
    }

    fn reset(&mut self) {
        self.offset = 0;
        self.anchor = None;
    }
}

pub struct LadderApp {
    pub ticker: String,
    pub view: DepthView,
    pub connection: ConnectionState,
    pub show_indicator: bool,
    pub focus: Column,
    pub yes_scroll: ColumnScroll,
    pub no_scroll: ColumnScroll,
    has_snapshot: bool,
}

impl LadderApp {
    pub fn new(ticker: &str, show_indicator: bool) -> Self {
        Self {
            ticker: ticker.to_string(),
            view: DepthView::default(),
            connection: ConnectionState::Connecting,
            show_indicator,
            focus: Column::Yes,
            yes_scroll: ColumnScroll::default(),
            no_scroll: ColumnScroll::default(),
            has_snapshot: false,
        }
    }

    /// Loading is "nothing received yet", distinct from an empty book —
    /// regardless of what the connection badge says.
    pub fn is_loading(&self) -> bool {
        !self.has_snapshot
    }

    /// Pull displayed state from the feed after one of its events.
    pub fn sync(&mut self, feed: &DepthFeed) {
        if let Some(ticker) = feed.ticker() {
            if ticker != self.ticker {
                self.ticker = ticker.to_string();
                self.yes_scroll.reset();
                self.no_scroll.reset();
            }
        }
        self.set_view(feed.view(), feed.state(), feed.has_snapshot());
    }

    /// Controlled mode: the host hands over a raw snapshot (or none) plus a
    /// connectivity flag and owns the refresh cadence itself.
    pub fn apply_snapshot(&mut self, snapshot: Option<&RawOrderbook>, connected: bool) {
        let state = match (snapshot, connected) {
            (Some(_), true) => ConnectionState::Live,
            (Some(_), false) => ConnectionState::Disconnected,
            // Nothing delivered yet: still warming up, whatever the
            // transport claims.
            (None, _) => ConnectionState::Connecting,
        };
        self.set_view(normalise(snapshot), state, snapshot.is_some());
    }

    fn set_view(&mut self, view: DepthView, state: ConnectionState, has_snapshot: bool) {
        self.view = view;
        self.connection = state;
        self.has_snapshot = has_snapshot;
        self.yes_scroll.rebase(&self.view.yes_bids);
        self.no_scroll.rebase(&self.view.no_bids);
    }

    pub fn focus_left(&mut self) {
        self.focus = Column::Yes;
    }

    pub fn focus_right(&mut self) {
        self.focus = Column::No;
    }

    /// Scroll the focused column by `delta` rows (positive = away from top
    /// of book).
    pub fn scroll_focused(&mut self, delta: isize) {
        match self.focus {
            Column::Yes => self.yes_scroll.scroll(delta, &self.view.yes_bids),
            Column::No => self.no_scroll.scroll(delta, &self.view.no_bids),
        }
    }
}
