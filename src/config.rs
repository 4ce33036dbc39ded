use clap::{Parser, ValueEnum};

// Production endpoints; override with --api-base / --ws-url for the demo env.
pub const DEFAULT_API_BASE: &str = "https://api.elections.kalshi.com/trade-api/v2";
pub const DEFAULT_WS_URL: &str = "wss://api.elections.kalshi.com/trade-api/ws/v2";

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FeedMode {
    /// Re-fetch the orderbook on a fixed interval over REST
    Poll,
    /// Subscribe to the websocket orderbook channel
    Stream,
}

/// CLI configuration for the ladder viewer.
#[derive(Debug, Parser)]
#[command(name = "ladder-rs", about = "YES/NO depth ladder for binary prediction markets")]
pub struct Config {
    /// Market ticker(s) to watch; Tab cycles through them in the TUI
    #[arg(short, long = "ticker", required = true, num_args = 1..)]
    pub tickers: Vec<String>,

    /// How snapshots are sourced
    #[arg(long, value_enum, default_value = "poll")]
    pub mode: FeedMode,

    /// Poll interval in seconds (poll mode only)
    #[arg(long, default_value_t = 3)]
    pub interval_secs: u64,

    /// REST API base URL
    #[arg(long, default_value = DEFAULT_API_BASE)]
    pub api_base: String,

    /// Websocket feed URL
    #[arg(long, default_value = DEFAULT_WS_URL)]
    pub ws_url: String,

    /// Hide the live-connection badge in the panel title
    #[arg(long)]
    pub hide_indicator: bool,
}

impl Config {
    pub fn show_indicator(&self) -> bool {
        !self.hide_indicator
    }

    /// Parse CLI args, falling back to LADDER_TICKERS from the environment
    /// when no --ticker was given on the command line.
    pub fn load() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok(); // load .env

        let mut args: Vec<String> = std::env::args().collect();
        if !args.iter().any(|a| a == "-t" || a == "--ticker" || a.starts_with("--ticker=")) {
            if let Ok(env_tickers) = std::env::var("LADDER_TICKERS") {
                for t in env_tickers.split(',').filter(|t| !t.trim().is_empty()) {
                    args.push("--ticker".to_string());
                    args.push(t.trim().to_string());
                }
            }
        }

        Ok(Config::try_parse_from(args)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_multiple_tickers() {
        let cfg = Config::try_parse_from([
            "ladder-rs", "--ticker", "KXBTC-A", "KXETH-B", "--mode", "stream",
        ])
        .unwrap();
        assert_eq!(cfg.tickers, vec!["KXBTC-A", "KXETH-B"]);
        assert_eq!(cfg.mode, FeedMode::Stream);
        assert_eq!(cfg.interval_secs, 3);
    }

    #[test]
    fn defaults_point_at_production() {
        let cfg = Config::try_parse_from(["ladder-rs", "-t", "KXBTC-A"]).unwrap();
        assert_eq!(cfg.api_base, DEFAULT_API_BASE);
        assert!(cfg.ws_url.starts_with("wss://"));
        assert!(cfg.show_indicator());
    }
}
