// Headless poll-and-print demo: no TUI, just the normalized ladder on stdout.
// Run with: cargo run --example poll_ladder -- KXBTCD-25AUG23-T64999.99

use std::sync::Arc;

use ladder_rs::config::DEFAULT_API_BASE;
use ladder_rs::depth::feed::DepthFeed;
use ladder_rs::depth::sources::rest::RestSource;
use ladder_rs::ladder::format;
use ladder_rs::telemetry;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    telemetry::init_tracing("info");

    let ticker = std::env::args()
        .nth(1)
        .ok_or_else(|| anyhow::anyhow!("usage: poll_ladder <market-ticker>"))?;

    let source = Arc::new(RestSource::new(DEFAULT_API_BASE, 3));
    let mut feed = DepthFeed::new(source);
    feed.switch(&ticker);

    for _ in 0..10 {
        feed.tick().await;
        let view = feed.view();

        println!("\n{} [{:?}]", ticker, feed.state());
        println!("{:>12}  |  {:<12}", "YES bids", "NO bids");
        let rows = view.yes_bids.len().max(view.no_bids.len()).max(1);
        for i in 0..rows {
            let yes = view
                .yes_bids
                .get(i)
                .map(|l| format!("{} x {}", format::price(l.price), format::quantity(l.quantity)))
                .unwrap_or_else(|| "-".to_string());
            let no = view
                .no_bids
                .get(i)
                .map(|l| format!("{} x {}", format::price(l.price), format::quantity(l.quantity)))
                .unwrap_or_else(|| "-".to_string());
            println!("{yes:>12}  |  {no:<12}");
        }
    }

    feed.close();
    Ok(())
}
