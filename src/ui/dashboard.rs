//! Main dashboard view
//!
//! Header with the current price, 24h change, and converted balance; the
//! range tab bar; the price chart; and a footer with the derived summary
//! and refresh status.

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Tabs},
    Frame,
};

use crate::app::App;
use crate::data::Trend;
use crate::ui::chart;

/// Color used for gains
const GAIN_COLOR: Color = Color::Green;
/// Color used for losses
const LOSS_COLOR: Color = Color::Red;

/// Renders the dashboard view
pub fn render(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(6),
            Constraint::Length(3),
            Constraint::Min(8),
            Constraint::Length(3),
        ])
        .split(frame.area());

    render_header(frame, chunks[0], app);
    render_tabs(frame, chunks[1], app);
    chart::render(frame, chunks[2], app);
    render_footer(frame, chunks[3], app);
}

/// Header: token, spot price, 24h change, optional converted balance
fn render_header(frame: &mut Frame, area: Rect, app: &App) {
    let mut lines = Vec::new();

    match &app.snapshot {
        Some(snapshot) => {
            lines.push(Line::from(vec![
                Span::styled(
                    format!("{:.2} ", snapshot.current_price),
                    Style::default().add_modifier(Modifier::BOLD),
                ),
                Span::styled(
                    app.currency.to_uppercase(),
                    Style::default().fg(Color::DarkGray),
                ),
            ]));

            let change_color = if snapshot.change_24h_pct >= 0.0 {
                GAIN_COLOR
            } else {
                LOSS_COLOR
            };
            lines.push(Line::from(Span::styled(
                format!("{:+.2}% (24h)", snapshot.change_24h_pct),
                Style::default().fg(change_color),
            )));

            if let Some(balance) = app.balance {
                let converted = snapshot.convert_balance(balance);
                let change = snapshot.balance_change(balance);
                lines.push(Line::from(vec![
                    Span::raw(format!("Balance: {} {} = ", balance, token_symbol(&app.token))),
                    Span::styled(
                        format!("{:.2} {}", converted, app.currency.to_uppercase()),
                        Style::default().add_modifier(Modifier::BOLD),
                    ),
                    Span::styled(
                        format!("  {:+.2} today", change),
                        Style::default().fg(change_color),
                    ),
                ]));
            }
        }
        None => {
            lines.push(Line::from(Span::styled(
                "Fetching current price...",
                Style::default().fg(Color::DarkGray),
            )));
        }
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!(" {} ", app.token.to_uppercase()));
    let paragraph = Paragraph::new(lines).block(block);
    frame.render_widget(paragraph, area);
}

/// Range tab bar with the active tab highlighted
fn render_tabs(frame: &mut Frame, area: Rect, app: &App) {
    let titles: Vec<Line> = app
        .selector
        .tabs()
        .iter()
        .map(|tab| {
            let style = if tab.disabled {
                Style::default().fg(Color::DarkGray)
            } else {
                Style::default()
            };
            Line::from(Span::styled(tab.id, style))
        })
        .collect();

    let tabs = Tabs::new(titles)
        .block(Block::default().borders(Borders::ALL).title(" Range "))
        .select(app.selector.active_index())
        .highlight_style(
            Style::default()
                .fg(Color::White)
                .bg(Color::Indexed(105))
                .add_modifier(Modifier::BOLD),
        );

    frame.render_widget(tabs, area);
}

/// Footer: derived summary, stale/error status, last refresh, help hint
fn render_footer(frame: &mut Frame, area: Rect, app: &App) {
    let mut spans = Vec::new();

    match &app.summary {
        Some(summary) => {
            let (arrow, color) = match summary.trend {
                Trend::Positive => ("▲", GAIN_COLOR),
                Trend::Negative => ("▼", LOSS_COLOR),
            };
            if !summary.range_label.is_empty() {
                spans.push(Span::styled(
                    format!("{}  ", summary.range_label),
                    Style::default().add_modifier(Modifier::BOLD),
                ));
            }
            spans.push(Span::styled(
                format!(
                    "{} {:+.2} ({:.2}%)",
                    arrow, summary.absolute_diff, summary.percentage_diff
                ),
                Style::default().fg(color),
            ));
        }
        None => {
            spans.push(Span::styled(
                "Summary unavailable",
                Style::default().fg(Color::DarkGray),
            ));
        }
    }

    if app.series_is_stale {
        spans.push(Span::styled(
            "  [stale data]",
            Style::default().fg(Color::Yellow),
        ));
    }
    if let Some(error) = &app.error {
        spans.push(Span::styled(
            format!("  {}", error),
            Style::default().fg(LOSS_COLOR),
        ));
    }
    if let Some(refreshed) = &app.last_refresh {
        spans.push(Span::styled(
            format!("  updated {}", refreshed.format("%H:%M:%S")),
            Style::default().fg(Color::DarkGray),
        ));
    }
    spans.push(Span::styled(
        "  ? help",
        Style::default().fg(Color::DarkGray),
    ));

    let paragraph = Paragraph::new(Line::from(spans))
        .block(Block::default().borders(Borders::ALL))
        .alignment(Alignment::Left);
    frame.render_widget(paragraph, area);
}

/// Short ticker-style symbol for common tokens, falling back to the id
fn token_symbol(token: &str) -> &str {
    match token {
        "ethereum" => "ETH",
        "bitcoin" => "BTC",
        "solana" => "SOL",
        other => other,
    }
}
