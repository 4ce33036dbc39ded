use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Row, Table},
    Frame,
};

use crate::depth::types::{ConnectionState, PriceLevel};
use crate::ladder::app::{Column, LadderApp};
use crate::ladder::format;

/// What a column shows. Loading and Empty are distinct on purpose: "not yet
/// loaded" must never look like "no resting orders".
#[derive(Debug, PartialEq, Eq)]
pub enum ColumnBody {
    Loading,
    Empty,
    Rows(Vec<(String, String)>),
}

pub fn column_body(app: &LadderApp, column: Column) -> ColumnBody {
    if app.is_loading() {
        return ColumnBody::Loading;
    }
    let (levels, scroll) = match column {
        Column::Yes => (&app.view.yes_bids, &app.yes_scroll),
        Column::No => (&app.view.no_bids, &app.no_scroll),
    };
    if levels.is_empty() {
        return ColumnBody::Empty;
    }
    ColumnBody::Rows(
        levels
            .iter()
            .skip(scroll.offset)
            .map(|l: &PriceLevel| (format::price(l.price), format::quantity(l.quantity)))
            .collect(),
    )
}

/// Connection badge: affirmative dot when live, neutral otherwise.
pub fn badge(state: ConnectionState) -> Span<'static> {
    match state {
        ConnectionState::Live => Span::styled("● live", Style::default().fg(Color::Green)),
        ConnectionState::Connecting => {
            Span::styled("○ connecting", Style::default().fg(Color::DarkGray))
        }
        ConnectionState::Disconnected => {
            Span::styled("○ stale", Style::default().fg(Color::DarkGray))
        }
    }
}

pub fn draw(f: &mut Frame, app: &LadderApp) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // title bar
            Constraint::Min(5),    // ladder columns
        ])
        .split(f.size());

    // --- TITLE ---
    let mut title = vec![Span::styled(
        app.ticker.clone(),
        Style::default().add_modifier(Modifier::BOLD),
    )];
    if app.show_indicator {
        title.push(Span::raw("  "));
        title.push(badge(app.connection));
    }
    f.render_widget(Paragraph::new(Line::from(title)), chunks[0]);

    // --- COLUMNS ---
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(chunks[1]);

    draw_column(f, app, Column::Yes, columns[0]);
    draw_column(f, app, Column::No, columns[1]);
}

fn draw_column(f: &mut Frame, app: &LadderApp, column: Column, area: ratatui::layout::Rect) {
    let (name, accent) = match column {
        Column::Yes => ("YES bids", Color::Green),
        Column::No => ("NO bids", Color::Red),
    };
    let border_style = if app.focus == column {
        Style::default().fg(accent)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    let block = Block::default()
        .title(name)
        .borders(Borders::ALL)
        .border_style(border_style);

    match column_body(app, column) {
        ColumnBody::Loading => {
            let placeholder = Paragraph::new("loading order book…")
                .alignment(Alignment::Center)
                .style(Style::default().fg(Color::DarkGray))
                .block(block);
            f.render_widget(placeholder, area);
        }
        ColumnBody::Empty => {
            let placeholder = Paragraph::new("no resting bids")
                .alignment(Alignment::Center)
                .style(Style::default().add_modifier(Modifier::ITALIC))
                .block(block);
            f.render_widget(placeholder, area);
        }
        ColumnBody::Rows(rows) => {
            let rows = rows
                .into_iter()
                .map(|(price, qty)| Row::new(vec![price, qty]));
            let table = Table::new(
                rows,
                [Constraint::Length(8), Constraint::Min(10)],
            )
            .header(
                Row::new(vec!["PRICE", "QTY"])
                    .style(Style::default().add_modifier(Modifier::BOLD)),
            )
            .block(block);
            f.render_widget(table, area);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::depth::types::RawOrderbook;

    fn raw(yes: Vec<(i64, i64)>, no: Vec<(i64, i64)>) -> RawOrderbook {
        RawOrderbook {
            yes: Some(yes),
            no: Some(no),
        }
    }

    #[test]
    fn connecting_without_snapshot_shows_loading_placeholder() {
        let app = LadderApp::new("KXTEST-A", true);
        assert_eq!(column_body(&app, Column::Yes), ColumnBody::Loading);
        assert_eq!(column_body(&app, Column::No), ColumnBody::Loading);
    }

    #[test]
    fn connected_but_undelivered_shows_loading_not_empty() {
        let mut app = LadderApp::new("KXTEST-A", true);
        // A connected host that has handed over no snapshot yet must not
        // render "no resting bids".
        app.apply_snapshot(None, true);
        assert_eq!(column_body(&app, Column::Yes), ColumnBody::Loading);
        assert_eq!(column_body(&app, Column::No), ColumnBody::Loading);
    }

    #[test]
    fn empty_snapshot_shows_empty_state_not_loading() {
        let mut app = LadderApp::new("KXTEST-A", true);
        app.apply_snapshot(Some(&raw(vec![], vec![])), true);
        assert_eq!(column_body(&app, Column::Yes), ColumnBody::Empty);
        assert_eq!(column_body(&app, Column::No), ColumnBody::Empty);
    }

    #[test]
    fn rows_render_top_of_book_first_with_formatting() {
        let mut app = LadderApp::new("KXTEST-A", true);
        app.apply_snapshot(
            Some(&raw(vec![(40, 10), (63, 1500)], vec![(37, 80)])),
            true,
        );
        assert_eq!(
            column_body(&app, Column::Yes),
            ColumnBody::Rows(vec![
                ("63¢".into(), "1,500".into()),
                ("40¢".into(), "10".into()),
            ])
        );
        assert_eq!(
            column_body(&app, Column::No),
            ColumnBody::Rows(vec![("37¢".into(), "80".into())])
        );
    }

    #[test]
    fn one_empty_side_does_not_blank_the_other() {
        let mut app = LadderApp::new("KXTEST-A", true);
        app.apply_snapshot(Some(&raw(vec![(63, 100)], vec![])), true);
        assert!(matches!(column_body(&app, Column::Yes), ColumnBody::Rows(_)));
        assert_eq!(column_body(&app, Column::No), ColumnBody::Empty);
    }

    #[test]
    fn scrolled_column_skips_rows_above_the_anchor() {
        let mut app = LadderApp::new("KXTEST-A", true);
        app.apply_snapshot(
            Some(&raw(vec![(70, 1), (63, 100), (40, 10)], vec![])),
            true,
        );
        app.scroll_focused(1);
        assert_eq!(
            column_body(&app, Column::Yes),
            ColumnBody::Rows(vec![
                ("63¢".into(), "100".into()),
                ("40¢".into(), "10".into()),
            ])
        );
    }

    #[test]
    fn stale_feed_still_renders_retained_rows() {
        let mut app = LadderApp::new("KXTEST-A", true);
        app.apply_snapshot(Some(&raw(vec![(63, 100)], vec![])), true);
        app.apply_snapshot(Some(&raw(vec![(63, 100)], vec![])), false);
        assert_eq!(badge(app.connection).content, "○ stale");
        assert!(matches!(column_body(&app, Column::Yes), ColumnBody::Rows(_)));
    }
}
