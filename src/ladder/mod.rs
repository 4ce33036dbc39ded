// Ladder module entrypoint
pub mod app;    // renderer-side state (view, badge, scroll anchors)
pub mod format; // cents + quantity formatting
pub mod run;    // terminal event loop
pub mod ui;     // ratatui two-column layout
