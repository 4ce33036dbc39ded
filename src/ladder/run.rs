// Terminal event loop: keyboard, feed events, redraw.

use std::io::stdout;
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use crossterm::{execute, terminal};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::info;

use crate::depth::feed::DepthFeed;
use crate::ladder::app::LadderApp;
use crate::ladder::ui::draw;

/// Drive the ladder until the user quits. Tab cycles through `tickers`;
/// Left/Right move column focus; Up/Down scroll the focused column.
pub async fn run_ladder(
    mut feed: DepthFeed,
    tickers: Vec<String>,
    show_indicator: bool,
) -> anyhow::Result<()> {
    anyhow::ensure!(!tickers.is_empty(), "at least one ticker is required");

    terminal::enable_raw_mode()?;
    execute!(stdout(), terminal::EnterAlternateScreen)?;

    let result = event_loop(&mut feed, &tickers, show_indicator).await;

    // Teardown on every exit path: no timer or stream may fire afterwards.
    feed.close();
    terminal::disable_raw_mode()?;
    execute!(stdout(), terminal::LeaveAlternateScreen)?;
    result
}

async fn event_loop(
    feed: &mut DepthFeed,
    tickers: &[String],
    show_indicator: bool,
) -> anyhow::Result<()> {
    let backend = CrosstermBackend::new(stdout());
    let mut terminal = Terminal::new(backend)?;

    let mut active = 0usize;
    feed.switch(&tickers[active]);
    let mut app = LadderApp::new(&tickers[active], show_indicator);

    loop {
        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                match key.code {
                    KeyCode::Char('q') | KeyCode::Esc => {
                        info!("quit requested");
                        return Ok(());
                    }
                    KeyCode::Tab => {
                        active = (active + 1) % tickers.len();
                        feed.switch(&tickers[active]);
                        app.sync(feed);
                    }
                    KeyCode::Left => app.focus_left(),
                    KeyCode::Right => app.focus_right(),
                    KeyCode::Up => app.scroll_focused(-1),
                    KeyCode::Down => app.scroll_focused(1),
                    _ => {}
                }
            }
        }

        // Apply at most one pending feed event, then fall through to redraw.
        tokio::select! {
            biased;
            _ = feed.tick() => app.sync(feed),
            _ = tokio::time::sleep(Duration::from_millis(10)) => {}
        }

        terminal.draw(|f| draw(f, &app))?;
    }
}
