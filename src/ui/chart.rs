//! Price history chart rendering
//!
//! Shapes the fetched price series into the point arrays, axis bounds, and
//! duration-conditional timestamp labels the chart widget consumes, then
//! renders a line chart with a last-price tag anchored to the final sample.

use chrono::{Local, TimeZone};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    symbols,
    text::Span,
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType, Paragraph},
    Frame,
};

use crate::app::App;
use crate::data::PricePoint;
use crate::ui::widgets::LastPriceTag;

/// Fraction of the price span added above and below the y-axis bounds
const Y_PADDING_RATIO: f64 = 0.02;

/// Maps a series to the `(x, y)` pairs the chart widget draws
pub fn chart_points(series: &[PricePoint]) -> Vec<(f64, f64)> {
    series
        .iter()
        .map(|point| (point.timestamp_ms as f64, point.price))
        .collect()
}

/// X-axis bounds spanning the series' time range
pub fn x_bounds(series: &[PricePoint]) -> [f64; 2] {
    match (series.first(), series.last()) {
        (Some(first), Some(last)) => [first.timestamp_ms as f64, last.timestamp_ms as f64],
        _ => [0.0, 1.0],
    }
}

/// Y-axis bounds around the series' price range, with a little padding so
/// the line does not hug the chart edges
pub fn y_bounds(series: &[PricePoint]) -> [f64; 2] {
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for point in series {
        min = min.min(point.price);
        max = max.max(point.price);
    }
    if !min.is_finite() || !max.is_finite() {
        return [0.0, 1.0];
    }

    let span = max - min;
    if span == 0.0 {
        // Flat series still needs a non-degenerate axis
        return [min - 1.0, max + 1.0];
    }
    let padding = span * Y_PADDING_RATIO;
    [min - padding, max + padding]
}

/// Timestamp format for x-axis labels, conditioned on the lookback range
///
/// Short ranges show the time of day, a month of data shows the day, and
/// anything longer includes the year.
pub fn time_label_format(duration_days: u32) -> &'static str {
    match duration_days {
        1 | 3 => "%b %d, %H:%M",
        30 => "%b %d",
        _ => "%b %d, %Y",
    }
}

/// Formats a sample timestamp for display under the x axis
pub fn format_timestamp(timestamp_ms: i64, duration_days: u32) -> String {
    match Local.timestamp_millis_opt(timestamp_ms).single() {
        Some(time) => time.format(time_label_format(duration_days)).to_string(),
        None => String::new(),
    }
}

/// Renders the chart area for the current series
pub fn render(frame: &mut Frame, area: Rect, app: &App) {
    let series = match &app.series {
        Some(series) if !series.is_empty() => series,
        _ => {
            render_unavailable(frame, area, app);
            return;
        }
    };

    let duration_days = app.selector.duration_days();
    let points = chart_points(series);
    let x = x_bounds(series);
    let y = y_bounds(series);

    let x_labels = axis_timestamps(series)
        .into_iter()
        .map(|ts| Span::raw(format_timestamp(ts, duration_days)))
        .collect::<Vec<_>>();
    let y_labels = vec![
        Span::raw(format!("{:.2}", y[0])),
        Span::raw(format!("{:.2}", (y[0] + y[1]) / 2.0)),
        Span::raw(format!("{:.2}", y[1])),
    ];

    let title = if app.series_is_stale {
        " Price History (stale) "
    } else {
        " Price History "
    };

    let datasets = vec![Dataset::default()
        .marker(symbols::Marker::Braille)
        .graph_type(GraphType::Line)
        .style(Style::default().fg(Color::Indexed(105)))
        .data(&points)];

    let chart = Chart::new(datasets)
        .block(Block::default().borders(Borders::ALL).title(title))
        .x_axis(
            Axis::default()
                .style(Style::default().fg(Color::Gray))
                .bounds(x)
                .labels(x_labels),
        )
        .y_axis(
            Axis::default()
                .style(Style::default().fg(Color::Gray))
                .bounds(y)
                .labels(y_labels),
        );

    frame.render_widget(chart, area);

    // Pin the last price to the plot's right edge
    if let Some(last) = series.last() {
        if let Some(plot) = plot_area(area) {
            frame.render_widget(LastPriceTag::new(last.price, y), plot);
        }
    }
}

/// First, middle, and last sample timestamps for x-axis labels
fn axis_timestamps(series: &[PricePoint]) -> Vec<i64> {
    match series.len() {
        0 => Vec::new(),
        1 => vec![series[0].timestamp_ms],
        2 => vec![series[0].timestamp_ms, series[1].timestamp_ms],
        n => vec![
            series[0].timestamp_ms,
            series[n / 2].timestamp_ms,
            series[n - 1].timestamp_ms,
        ],
    }
}

/// The drawable plot region inside the chart's borders and axis gutters
fn plot_area(area: Rect) -> Option<Rect> {
    // 1 cell of border on each side, plus the y-axis label gutter on the
    // left and the x-axis label row at the bottom
    if area.width < 14 || area.height < 5 {
        return None;
    }
    Some(Rect {
        x: area.x + 11,
        y: area.y + 1,
        width: area.width - 12,
        height: area.height - 3,
    })
}

/// Placeholder when there is no series to draw
fn render_unavailable(frame: &mut Frame, area: Rect, app: &App) {
    let message = if app.is_fetching {
        "Updating the chart..."
    } else {
        "Chart unavailable"
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage(45),
            Constraint::Length(1),
            Constraint::Percentage(45),
        ])
        .split(area);

    let block = Block::default().borders(Borders::ALL).title(" Price History ");
    frame.render_widget(block, area);

    let text = Paragraph::new(message)
        .style(Style::default().fg(Color::DarkGray))
        .alignment(Alignment::Center);
    frame.render_widget(text, chunks[1]);
}
