//! Annotated heatmap layer with a fixed diverging palette.

use super::style::{FigureSize, C_DIM, C_TEXT};
use crate::correlation::CorrelationMatrix;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
};

// Coolwarm anchors: blue at -1, neutral grey at 0, red at +1
const COOL: (f64, f64, f64) = (59.0, 76.0, 192.0);
const NEUTRAL: (f64, f64, f64) = (221.0, 221.0, 221.0);
const WARM: (f64, f64, f64) = (180.0, 4.0, 38.0);

const MISSING: &str = "--";

/// Widest annotation ("-1.00") plus one column of padding.
pub const MIN_CELL_WIDTH: u16 = 6;

/// Left and right (or top and bottom) border of the panel block.
const PANEL_BORDER: u16 = 2;

/// Annotated grid of values in `[-1, 1]`, labelled on both axes.
#[derive(Debug, Clone, PartialEq)]
pub struct HeatmapLayer {
    labels: Vec<String>,
    values: Vec<Vec<f64>>,
}

impl HeatmapLayer {
    pub fn from_matrix(matrix: &CorrelationMatrix) -> Self {
        Self {
            labels: matrix.columns().to_vec(),
            values: matrix.values().to_vec(),
        }
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn values(&self) -> &[Vec<f64>] {
        &self.values
    }

    /// Cell annotation, two decimal places.
    pub fn annotation(value: f64) -> String {
        if value.is_finite() {
            format!("{value:.2}")
        } else {
            MISSING.to_string()
        }
    }

    /// Render the grid into `area`: a header row of column labels, then one labelled row per
    /// matrix row. Cells share the remaining width but never shrink below [`MIN_CELL_WIDTH`];
    /// columns that do not fit whole are left out.
    pub fn render(&self, area: Rect, buf: &mut Buffer) {
        let n = self.labels.len();
        if n == 0 || area.width == 0 || area.height < 2 {
            return;
        }

        let label_width = row_label_width(&self.labels, area.width);
        let cell_width = (area.width.saturating_sub(label_width) / n as u16).max(MIN_CELL_WIDTH);
        let cell_height = ((area.height - 1) / n as u16).max(1);
        let label_style = Style::default().fg(C_DIM);

        let cell_x = |col: usize| -> Option<u16> {
            let x = (area.x + label_width).saturating_add((col as u16).saturating_mul(cell_width));
            (x.saturating_add(cell_width) <= area.right()).then_some(x)
        };

        // Column labels, one column of padding kept free
        for (col, label) in self.labels.iter().enumerate() {
            let Some(x) = cell_x(col) else { break };
            let text = centre(&truncate(label, cell_width as usize - 1), cell_width as usize);
            buf.set_stringn(x, area.y, text, cell_width as usize, label_style);
        }

        for (row, label) in self.labels.iter().enumerate() {
            let y = area.y + 1 + row as u16 * cell_height;
            if y >= area.bottom() {
                break;
            }

            let label_y = y + cell_height / 2;
            if label_y < area.bottom() {
                buf.set_stringn(area.x, label_y, label, label_width as usize - 1, label_style);
            }

            for col in 0..n {
                let Some(x) = cell_x(col) else { break };

                let value = self.values[row][col];
                let cell = Rect::new(x, y, cell_width, cell_height.min(area.bottom() - y));
                let background = coolwarm(value);
                buf.set_style(cell, Style::default().bg(background));

                let text = centre(&Self::annotation(value), cell.width as usize);
                let text_style = Style::default()
                    .fg(annotation_color(value))
                    .bg(background)
                    .add_modifier(Modifier::BOLD);
                buf.set_stringn(cell.x, cell.y + cell.height / 2, text, cell.width as usize, text_style);
            }
        }
    }
}

/// Figure size fitting a heatmap over `labels`: `base`, grown until every cell gets
/// [`MIN_CELL_WIDTH`] columns and one row, inside a bordered panel.
pub fn heatmap_size(labels: &[String], base: FigureSize) -> FigureSize {
    let n = labels.len() as u16;
    let label_width = labels
        .iter()
        .map(|label| label.chars().count())
        .max()
        .unwrap_or(0) as u16
        + 1;

    let width = label_width
        .saturating_add(n.saturating_mul(MIN_CELL_WIDTH))
        .saturating_add(PANEL_BORDER);
    let height = n.saturating_add(1).saturating_add(PANEL_BORDER);

    FigureSize::new(base.width.max(width), base.height.max(height))
}

/// Width of the row-label column, one column of padding included.
fn row_label_width(labels: &[String], area_width: u16) -> u16 {
    labels
        .iter()
        .map(|label| label.chars().count())
        .max()
        .unwrap_or(0)
        .min(area_width as usize / 3) as u16
        + 1
}

/// Map a correlation in `[-1, 1]` onto the coolwarm palette.
pub fn coolwarm(value: f64) -> Color {
    if !value.is_finite() {
        return Color::Rgb(40, 40, 40);
    }

    let value = value.clamp(-1.0, 1.0);
    let (from, to, t) = if value < 0.0 {
        (NEUTRAL, COOL, -value)
    } else {
        (NEUTRAL, WARM, value)
    };

    let lerp = |a: f64, b: f64| (a + (b - a) * t).round() as u8;
    Color::Rgb(lerp(from.0, to.0), lerp(from.1, to.1), lerp(from.2, to.2))
}

fn annotation_color(value: f64) -> Color {
    if value.is_finite() && value.abs() < 0.5 {
        Color::Black
    } else {
        C_TEXT
    }
}

fn centre(text: &str, width: usize) -> String {
    format!("{text:^width$}")
}

fn truncate(text: &str, width: usize) -> String {
    text.chars().take(width).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coolwarm_anchors() {
        struct TestCase {
            input: f64,
            expected: Color,
        }

        let tests = vec![
            TestCase {
                // TC0: strongest negative is blue
                input: -1.0,
                expected: Color::Rgb(59, 76, 192),
            },
            TestCase {
                // TC1: zero is neutral
                input: 0.0,
                expected: Color::Rgb(221, 221, 221),
            },
            TestCase {
                // TC2: strongest positive is red
                input: 1.0,
                expected: Color::Rgb(180, 4, 38),
            },
            TestCase {
                // TC3: out of range values are clamped
                input: 3.0,
                expected: Color::Rgb(180, 4, 38),
            },
            TestCase {
                // TC4: undefined correlation
                input: f64::NAN,
                expected: Color::Rgb(40, 40, 40),
            },
        ];

        for (index, test) in tests.into_iter().enumerate() {
            assert_eq!(coolwarm(test.input), test.expected, "TC{} failed", index);
        }
    }

    #[test]
    fn test_annotation_precision() {
        assert_eq!(HeatmapLayer::annotation(0.87654), "0.88");
        assert_eq!(HeatmapLayer::annotation(-1.0), "-1.00");
        assert_eq!(HeatmapLayer::annotation(f64::NAN), "--");
    }

    #[test]
    fn test_heatmap_size_fits_cells() {
        let labels: Vec<String> = (0..14).map(|i| format!("sentiment_{i:02}")).collect();

        // 13 label columns + 14 cells of 6 + 2 border columns
        assert_eq!(heatmap_size(&labels, FigureSize::HEATMAP), FigureSize::new(99, 36));

        let labels = vec!["Close".to_string(), "RSI".to_string()];
        assert_eq!(heatmap_size(&labels, FigureSize::HEATMAP), FigureSize::HEATMAP);
    }

    #[test]
    fn test_narrow_area_keeps_annotations_whole() {
        let labels: Vec<String> = (0..4).map(|i| format!("column_{i}")).collect();
        let layer = HeatmapLayer {
            values: vec![vec![-0.25; 4]; 4],
            labels,
        };

        // Room for two whole cells only
        let area = Rect::new(0, 0, 9 + 2 * MIN_CELL_WIDTH + 3, 5);
        let mut buf = Buffer::empty(area);
        layer.render(area, &mut buf);

        let row: String = (0..area.width).map(|x| buf[(x, 1)].symbol().to_string()).collect();
        assert_eq!(row.split_whitespace().collect::<Vec<_>>(), ["column_0", "-0.25", "-0.25"]);

        let header: String = (0..area.width).map(|x| buf[(x, 0)].symbol().to_string()).collect();
        assert_eq!(header.split_whitespace().collect::<Vec<_>>(), ["colum", "colum"]);
    }

    #[test]
    fn test_render_writes_labels_and_annotations() {
        let layer = HeatmapLayer {
            labels: vec!["Close".to_string(), "RSI".to_string()],
            values: vec![vec![1.0, -0.25], vec![-0.25, 1.0]],
        };

        let area = Rect::new(0, 0, 40, 9);
        let mut buf = Buffer::empty(area);
        layer.render(area, &mut buf);

        let text: String = (0..area.height)
            .map(|y| {
                (0..area.width)
                    .map(|x| buf[(x, y)].symbol().to_string())
                    .collect::<String>()
            })
            .collect::<Vec<_>>()
            .join("\n");

        assert!(text.contains("Close"));
        assert!(text.contains("RSI"));
        assert!(text.contains("1.00"));
        assert!(text.contains("-0.25"));

        // Diagonal cell painted warm
        let label_width = "Close".len() as u16 + 1;
        assert_eq!(buf[(label_width, 1)].bg, Color::Rgb(180, 4, 38));
    }
}
