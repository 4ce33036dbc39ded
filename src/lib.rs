// ladder-rs: YES/NO depth-ladder viewer for binary prediction markets.
//
// Data flows source -> feed -> normaliser -> ladder, re-triggered on every
// poll tick or push message for the active market ticker.

pub mod config;
pub mod depth;
pub mod ladder;
pub mod telemetry;
