use std::sync::Arc;

use ladder_rs::config::{Config, FeedMode};
use ladder_rs::depth::feed::DepthFeed;
use ladder_rs::depth::sources::rest::RestSource;
use ladder_rs::depth::sources::websocket::WebsocketSource;
use ladder_rs::depth::sources::DepthSource;
use ladder_rs::ladder::run::run_ladder;
use ladder_rs::telemetry;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // The TUI owns stdout, so keep logs quiet unless RUST_LOG says otherwise.
    telemetry::init_tracing("warn");
    telemetry::init_metrics();

    let config = Config::load()?;

    let source: Arc<dyn DepthSource> = match config.mode {
        FeedMode::Poll => Arc::new(RestSource::new(&config.api_base, config.interval_secs)),
        FeedMode::Stream => Arc::new(WebsocketSource::new(&config.ws_url)),
    };

    let feed = DepthFeed::new(source);
    let show_indicator = config.show_indicator();
    run_ladder(feed, config.tickers, show_indicator).await
}
