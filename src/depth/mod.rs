// Depth module entrypoint
pub mod types;      // wire payloads + normalized view + connection state
pub mod normaliser; // converts raw snapshots -> ordered ladder sides
pub mod sources;    // venue-specific fetchers (REST poll, websocket push)
pub mod feed;       // subscription lifecycle keyed by market ticker
