//! Chart items for painting candlestick and line series.

use egui::{Color32, Painter, Pos2, Rect, Stroke};

use super::api::{SeriesData, SeriesOptions};
use super::base::{DOWN_COLOR, LINE_COLOR, UP_COLOR};

/// Parse a `#rrggbb` color, falling back when malformed
pub fn parse_color(hex: &str, fallback: Color32) -> Color32 {
    Color32::from_hex(hex).unwrap_or(fallback)
}

/// Screen mapping shared by the items of one frame
#[derive(Debug, Clone, Copy)]
pub struct Viewport {
    pub rect: Rect,
    pub min_ix: usize,
    pub max_ix: usize,
    pub y_min: f64,
    pub y_max: f64,
}

impl Viewport {
    /// Pixel width of one bar slot
    pub fn bar_width(&self) -> f32 {
        let bar_count = (self.max_ix - self.min_ix + 1) as f32;
        self.rect.width() / bar_count
    }

    /// Convert bar index to screen X coordinate
    pub fn index_to_x(&self, ix: usize) -> f32 {
        let bar_width = self.bar_width();
        self.rect.left() + (ix - self.min_ix) as f32 * bar_width + bar_width * 0.5
    }

    /// Convert value to screen Y coordinate
    pub fn value_to_y(&self, value: f64) -> f32 {
        let y_range = self.y_max - self.y_min;
        if y_range == 0.0 {
            return self.rect.center().y;
        }
        let normalized = (value - self.y_min) / y_range;
        self.rect.bottom() - (normalized as f32 * self.rect.height())
    }

    /// Bar index under screen X coordinate
    pub fn x_to_index(&self, x: f32) -> usize {
        let offset = ((x - self.rect.left()) / self.bar_width()).floor().max(0.0) as usize;
        (self.min_ix + offset).min(self.max_ix)
    }
}

/// Something that can paint a series
pub trait ChartItem {
    fn draw(&self, painter: &Painter, data: &SeriesData, viewport: &Viewport);

    /// Info text for the point under the crosshair
    fn info_text(&self, data: &SeriesData, ix: usize) -> String;
}

/// Create the item matching a series' renderer type
pub fn item_for(options: &SeriesOptions) -> Box<dyn ChartItem> {
    match options.kind {
        super::api::SeriesKind::Candlestick => Box::new(CandleItem::new()),
        super::api::SeriesKind::Line => Box::new(LineItem::new(
            parse_color(
                options.color.as_deref().unwrap_or(LINE_COLOR),
                Color32::LIGHT_BLUE,
            ),
            options.line_width,
        )),
    }
}

/// Candlestick chart item
pub struct CandleItem {
    up: Color32,
    down: Color32,
}

impl Default for CandleItem {
    fn default() -> Self {
        Self::new()
    }
}

impl CandleItem {
    pub fn new() -> Self {
        Self {
            up: parse_color(UP_COLOR, Color32::GREEN),
            down: parse_color(DOWN_COLOR, Color32::RED),
        }
    }
}

impl ChartItem for CandleItem {
    fn draw(&self, painter: &Painter, data: &SeriesData, viewport: &Viewport) {
        let SeriesData::Candlestick(bars) = data else {
            return;
        };
        let candle_width = (viewport.bar_width() * 0.6).max(1.0);

        for ix in viewport.min_ix..=viewport.max_ix {
            let Some(bar) = bars.get(ix) else {
                continue;
            };
            let x = viewport.index_to_x(ix);
            let color = if bar.close >= bar.open { self.up } else { self.down };
            let stroke = Stroke::new(1.0, color);

            // Wick
            let high_y = viewport.value_to_y(bar.high);
            let low_y = viewport.value_to_y(bar.low);
            painter.line_segment([Pos2::new(x, high_y), Pos2::new(x, low_y)], stroke);

            // Body
            let open_y = viewport.value_to_y(bar.open);
            let close_y = viewport.value_to_y(bar.close);
            if (open_y - close_y).abs() < 1.0 {
                painter.line_segment(
                    [
                        Pos2::new(x - candle_width * 0.5, open_y),
                        Pos2::new(x + candle_width * 0.5, open_y),
                    ],
                    stroke,
                );
            } else {
                let body = Rect::from_min_max(
                    Pos2::new(x - candle_width * 0.5, open_y.min(close_y)),
                    Pos2::new(x + candle_width * 0.5, open_y.max(close_y)),
                );
                painter.rect_filled(body, 0.0, color);
            }
        }
    }

    fn info_text(&self, data: &SeriesData, ix: usize) -> String {
        let SeriesData::Candlestick(bars) = data else {
            return String::new();
        };
        bars.get(ix)
            .map(|bar| {
                format!(
                    "O {:.2}  H {:.2}  L {:.2}  C {:.2}",
                    bar.open, bar.high, bar.low, bar.close
                )
            })
            .unwrap_or_default()
    }
}

/// Line chart item, used for both close price and volume
pub struct LineItem {
    color: Color32,
    width: f32,
}

impl LineItem {
    pub fn new(color: Color32, width: f32) -> Self {
        Self { color, width }
    }
}

impl ChartItem for LineItem {
    fn draw(&self, painter: &Painter, data: &SeriesData, viewport: &Viewport) {
        let SeriesData::Line(points) = data else {
            return;
        };
        let end = viewport.max_ix.min(points.len().saturating_sub(1));
        if points.is_empty() || viewport.min_ix > end {
            return;
        }

        let path: Vec<Pos2> = (viewport.min_ix..=end)
            .map(|ix| Pos2::new(viewport.index_to_x(ix), viewport.value_to_y(points[ix].value)))
            .collect();

        if path.len() == 1 {
            painter.circle_filled(path[0], self.width, self.color);
        } else {
            painter.add(egui::Shape::line(path, Stroke::new(self.width, self.color)));
        }
    }

    fn info_text(&self, data: &SeriesData, ix: usize) -> String {
        let SeriesData::Line(points) = data else {
            return String::new();
        };
        points
            .get(ix)
            .map(|point| format!("{:.2}", point.value))
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trader::{Bar, LineData};
    use std::sync::Arc;

    fn viewport() -> Viewport {
        Viewport {
            rect: Rect::from_min_max(Pos2::new(0.0, 0.0), Pos2::new(100.0, 200.0)),
            min_ix: 0,
            max_ix: 3,
            y_min: 0.0,
            y_max: 100.0,
        }
    }

    #[test]
    fn test_viewport_mapping() {
        let viewport = viewport();
        assert_eq!(viewport.bar_width(), 25.0);
        assert_eq!(viewport.index_to_x(0), 12.5);
        assert_eq!(viewport.value_to_y(0.0), 200.0);
        assert_eq!(viewport.value_to_y(100.0), 0.0);
        assert_eq!(viewport.x_to_index(60.0), 2);
        assert_eq!(viewport.x_to_index(500.0), 3);
    }

    #[test]
    fn test_parse_color() {
        assert_eq!(parse_color("#000000", Color32::WHITE), Color32::BLACK);
        assert_eq!(parse_color("nope", Color32::WHITE), Color32::WHITE);
    }

    #[test]
    fn test_info_text() {
        let candles = SeriesData::Candlestick(Arc::from(vec![Bar::new(
            1,
            10.0,
            12.0,
            9.0,
            11.0,
            None,
        )]));
        assert_eq!(
            CandleItem::new().info_text(&candles, 0),
            "O 10.00  H 12.00  L 9.00  C 11.00"
        );

        let line = SeriesData::Line(vec![LineData::new(1, 150.0)]);
        let item = LineItem::new(Color32::WHITE, 2.0);
        assert_eq!(item.info_text(&line, 0), "150.00");
        assert_eq!(item.info_text(&candles, 0), "");
    }
}
