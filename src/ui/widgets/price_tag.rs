//! Last-price tag widget
//!
//! Renders a small label anchored to the vertical position of the final
//! data point on the chart's right edge, mirroring the persistent
//! end-of-line price readout of trading dashboards.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    widgets::Widget,
};

/// A price label pinned to the row matching a value within y-axis bounds
pub struct LastPriceTag {
    /// The price to display
    price: f64,
    /// Chart y-axis bounds the price is positioned against
    y_bounds: [f64; 2],
    /// Style for the tag
    style: Style,
}

impl LastPriceTag {
    pub fn new(price: f64, y_bounds: [f64; 2]) -> Self {
        Self {
            price,
            y_bounds,
            style: Style::default().fg(Color::Black).bg(Color::Indexed(105)),
        }
    }

    #[allow(dead_code)]
    pub fn style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }

    /// Row within an area of `height` rows matching `price` on a linear
    /// y axis spanning `y_bounds` (row 0 is the top)
    pub fn anchor_row(height: u16, y_bounds: [f64; 2], price: f64) -> u16 {
        if height == 0 {
            return 0;
        }
        let [min, max] = y_bounds;
        let span = max - min;
        if span <= 0.0 {
            return height / 2;
        }
        let normalized = ((price - min) / span).clamp(0.0, 1.0);
        let from_top = (1.0 - normalized) * (height - 1) as f64;
        from_top.round() as u16
    }
}

impl Widget for LastPriceTag {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width == 0 || area.height == 0 {
            return;
        }

        let label = format!(" {:.2} ", self.price);
        let row = Self::anchor_row(area.height, self.y_bounds, self.price);
        let y = area.y + row.min(area.height - 1);

        // Right-aligned within the area
        let width = (label.len() as u16).min(area.width);
        let x = area.x + area.width - width;

        buf.set_string(x, y, &label[..width as usize], self.style);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_anchor_row_at_max_is_top() {
        assert_eq!(LastPriceTag::anchor_row(10, [0.0, 100.0], 100.0), 0);
    }

    #[test]
    fn test_anchor_row_at_min_is_bottom() {
        assert_eq!(LastPriceTag::anchor_row(10, [0.0, 100.0], 0.0), 9);
    }

    #[test]
    fn test_anchor_row_midpoint() {
        let row = LastPriceTag::anchor_row(11, [0.0, 100.0], 50.0);
        assert_eq!(row, 5);
    }

    #[test]
    fn test_anchor_row_clamps_out_of_bounds() {
        assert_eq!(LastPriceTag::anchor_row(10, [0.0, 100.0], 250.0), 0);
        assert_eq!(LastPriceTag::anchor_row(10, [0.0, 100.0], -50.0), 9);
    }

    #[test]
    fn test_anchor_row_degenerate_bounds() {
        // Flat axis centers the tag
        assert_eq!(LastPriceTag::anchor_row(10, [42.0, 42.0], 42.0), 5);
    }

    #[test]
    fn test_anchor_row_zero_height() {
        assert_eq!(LastPriceTag::anchor_row(0, [0.0, 100.0], 50.0), 0);
    }

    #[test]
    fn test_tag_renders_price_text() {
        use ratatui::{backend::TestBackend, Terminal};

        let backend = TestBackend::new(30, 10);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal
            .draw(|frame| {
                let tag = LastPriceTag::new(2015.75, [2000.0, 2100.0]);
                frame.render_widget(tag, frame.area());
            })
            .unwrap();

        let buffer = terminal.backend().buffer();
        let content: String = buffer.content().iter().map(|cell| cell.symbol()).collect();
        assert!(content.contains("2015.75"));
    }
}
