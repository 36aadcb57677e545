//! Rasterise a [`Figure`] onto a ratatui [`Buffer`].
//!
//! Lines are drawn with braille markers. Dashed strokes and grid lines are emulated with
//! scatter points sampled along the stroke, since the chart widget only joins points solidly.

use super::{
    figure::{Axes, Figure, RefLine, Series},
    style::{LineStyle, C_DIM, C_GRID, C_TEXT},
};
use chrono::DateTime;
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols::Marker,
    text::Span,
    widgets::{Axis, Block, Borders, Chart, Dataset as ChartDataset, GraphType, LegendPosition, Widget},
};

/// Braille gives two horizontal dots per cell.
const SAMPLES_PER_CELL: usize = 2;
/// Samples drawn, then skipped, per dash.
const DASH_LENGTH: usize = 3;
/// Grid dots are drawn every `GRID_SPACING` samples.
const GRID_SPACING: usize = 4;

/// One chart layer, owning the points the chart widget borrows.
struct Layer {
    name: Option<String>,
    color: Color,
    graph_type: GraphType,
    points: Vec<(f64, f64)>,
}

impl Widget for &Figure {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let size = self.size();
        let area = Rect {
            width: area.width.min(size.width),
            height: area.height.min(size.height),
            ..area
        };

        let panels = self.axes().len();
        if panels == 0 || area.is_empty() {
            return;
        }

        let margin = if self.is_tight() { 0 } else { 1 };
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .margin(margin)
            .constraints(vec![Constraint::Ratio(1, panels as u32); panels])
            .split(area);

        for (axes, chunk) in self.axes().iter().zip(chunks.iter()) {
            render_axes(axes, *chunk, buf);
        }
    }
}

impl Figure {
    /// Render into an off-screen buffer sized like the figure.
    pub fn to_buffer(&self) -> Buffer {
        let size = self.size();
        let area = Rect::new(0, 0, size.width, size.height);
        let mut buf = Buffer::empty(area);
        self.render(area, &mut buf);
        buf
    }

    /// Render as plain text lines, trailing whitespace trimmed.
    pub fn to_lines(&self) -> Vec<String> {
        buffer_lines(&self.to_buffer())
    }
}

/// Plain text content of a buffer, one string per row.
pub fn buffer_lines(buf: &Buffer) -> Vec<String> {
    let area = buf.area;
    (area.top()..area.bottom())
        .map(|y| {
            let line: String = (area.left()..area.right())
                .map(|x| buf[(x, y)].symbol())
                .collect();
            line.trim_end().to_string()
        })
        .collect()
}

fn render_axes(axes: &Axes, area: Rect, buf: &mut Buffer) {
    let mut block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(C_DIM));
    if let Some(title) = axes.title() {
        block = block.title(Span::styled(
            format!(" {title} "),
            Style::default().fg(C_TEXT).add_modifier(Modifier::BOLD),
        ));
    }

    if let Some(heatmap) = axes.heatmap_layer() {
        let inner = block.inner(area);
        block.render(area, buf);
        heatmap.render(inner, buf);
        return;
    }

    let x_bounds = axes.x_bounds();
    let y_bounds = axes.y_bounds();
    let resolution = (area.width as usize).saturating_sub(2).max(1) * SAMPLES_PER_CELL;

    let x_ticks = ticks(x_bounds, tick_count(area.width, 20));
    let y_ticks = ticks(y_bounds, tick_count(area.height, 6));

    let mut layers = Vec::new();
    if axes.has_grid() {
        layers.extend(grid_layers(&x_ticks, &y_ticks, x_bounds, y_bounds, resolution));
    }
    layers.extend(axes.series().iter().map(|series| series_layer(series, x_bounds, resolution)));
    layers.extend(axes.ref_lines().iter().map(|line| ref_line_layer(line, x_bounds, resolution)));

    let datasets: Vec<ChartDataset> = layers
        .iter()
        .map(|layer| {
            let dataset = ChartDataset::default()
                .marker(Marker::Braille)
                .graph_type(layer.graph_type)
                .style(Style::default().fg(layer.color))
                .data(&layer.points);
            match &layer.name {
                Some(name) => dataset.name(name.clone()),
                None => dataset,
            }
        })
        .collect();

    let x_labels: Vec<Span> = x_ticks
        .iter()
        .map(|x| Span::styled(format_x(*x, axes.date_format()), Style::default().fg(C_DIM)))
        .collect();
    let y_labels: Vec<Span> = y_ticks
        .iter()
        .map(|y| Span::styled(format!("{y:.2}"), Style::default().fg(C_DIM)))
        .collect();

    let mut x_axis = Axis::default()
        .style(Style::default().fg(C_DIM))
        .bounds(x_bounds)
        .labels(x_labels);
    if let Some(label) = axes.x_label() {
        x_axis = x_axis.title(label.to_string());
    }

    let mut y_axis = Axis::default()
        .style(Style::default().fg(C_DIM))
        .bounds(y_bounds)
        .labels(y_labels);
    if let Some(label) = axes.y_label() {
        y_axis = y_axis.title(label.to_string());
    }

    let legend_position = axes.has_legend().then_some(LegendPosition::TopRight);

    Chart::new(datasets)
        .block(block)
        .x_axis(x_axis)
        .y_axis(y_axis)
        .legend_position(legend_position)
        .hidden_legend_constraints((Constraint::Ratio(1, 2), Constraint::Ratio(1, 2)))
        .render(area, buf);
}

fn series_layer(series: &Series, x_bounds: [f64; 2], resolution: usize) -> Layer {
    let (graph_type, points) = match series.style() {
        LineStyle::Solid => (GraphType::Line, series.points().to_vec()),
        LineStyle::Dashed => (
            GraphType::Scatter,
            dash_points(series.points(), x_bounds, resolution, DASH_LENGTH),
        ),
    };

    Layer {
        name: series.label().map(str::to_string),
        color: series.color(),
        graph_type,
        points,
    }
}

fn ref_line_layer(line: &RefLine, x_bounds: [f64; 2], resolution: usize) -> Layer {
    let segment = [(x_bounds[0], line.y()), (x_bounds[1], line.y())];
    let (graph_type, points) = match line.style() {
        LineStyle::Solid => (GraphType::Line, segment.to_vec()),
        LineStyle::Dashed => (
            GraphType::Scatter,
            dash_points(&segment, x_bounds, resolution, DASH_LENGTH),
        ),
    };

    Layer {
        name: line.label().map(str::to_string),
        color: line.color(),
        graph_type,
        points,
    }
}

/// Dotted horizontal and vertical lines at the interior ticks.
fn grid_layers(
    x_ticks: &[f64],
    y_ticks: &[f64],
    x_bounds: [f64; 2],
    y_bounds: [f64; 2],
    resolution: usize,
) -> Vec<Layer> {
    let interior = |ticks: &[f64]| -> Vec<f64> {
        match ticks.len() {
            0..=2 => Vec::new(),
            len => ticks[1..len - 1].to_vec(),
        }
    };

    let horizontal = interior(y_ticks).into_iter().flat_map(|y| {
        sample_segment((x_bounds[0], y), (x_bounds[1], y), resolution)
            .into_iter()
            .step_by(GRID_SPACING)
    });
    let vertical = interior(x_ticks).into_iter().flat_map(|x| {
        sample_segment((x, y_bounds[0]), (x, y_bounds[1]), resolution / 2)
            .into_iter()
            .step_by(GRID_SPACING)
    });

    vec![Layer {
        name: None,
        color: C_GRID,
        graph_type: GraphType::Scatter,
        points: horizontal.chain(vertical).collect(),
    }]
}

/// Evenly spaced points from `from` to `to`, both ends included.
fn sample_segment(from: (f64, f64), to: (f64, f64), samples: usize) -> Vec<(f64, f64)> {
    let samples = samples.max(1);
    (0..=samples)
        .map(|step| {
            let t = step as f64 / samples as f64;
            (from.0 + (to.0 - from.0) * t, from.1 + (to.1 - from.1) * t)
        })
        .collect()
}

/// Resample a polyline and keep alternating runs of `dash` samples.
///
/// Each segment gets a share of `resolution` proportional to its horizontal extent, and the dash
/// phase carries across segments so the pattern stays regular.
fn dash_points(
    points: &[(f64, f64)],
    x_bounds: [f64; 2],
    resolution: usize,
    dash: usize,
) -> Vec<(f64, f64)> {
    let span = (x_bounds[1] - x_bounds[0]).abs().max(f64::EPSILON);
    let mut phase = 0;
    let mut dashed = Vec::new();

    for window in points.windows(2) {
        let (from, to) = (window[0], window[1]);
        let share = ((to.0 - from.0).abs() / span * resolution as f64).ceil() as usize;
        for point in sample_segment(from, to, share) {
            if (phase / dash) % 2 == 0 {
                dashed.push(point);
            }
            phase += 1;
        }
    }

    if points.len() == 1 {
        dashed.extend_from_slice(points);
    }

    dashed
}

fn tick_count(extent: u16, cells_per_tick: u16) -> usize {
    (extent / cells_per_tick).clamp(2, 6) as usize
}

/// `count` evenly spaced values across `bounds`, both ends included.
fn ticks(bounds: [f64; 2], count: usize) -> Vec<f64> {
    let count = count.max(2);
    (0..count)
        .map(|i| bounds[0] + (bounds[1] - bounds[0]) * i as f64 / (count - 1) as f64)
        .collect()
}

fn format_x(x: f64, date_format: Option<&str>) -> String {
    match date_format {
        Some(format) => DateTime::from_timestamp(x.round() as i64, 0)
            .map(|time| time.format(format).to_string())
            .unwrap_or_default(),
        None => format!("{x:.2}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        chart::style::{FigureSize, LineSpec, BLUE, RED},
        data::tests::daily_index,
    };

    #[test]
    fn test_ticks_include_bounds() {
        assert_eq!(ticks([0.0, 10.0], 3), vec![0.0, 5.0, 10.0]);
        assert_eq!(ticks([1.0, 2.0], 0), vec![1.0, 2.0]);
    }

    #[test]
    fn test_dash_points_leave_gaps() {
        let segment = [(0.0, 1.0), (12.0, 1.0)];
        let dashed = dash_points(&segment, [0.0, 12.0], 12, 3);

        // 13 samples, runs of 3 kept then 3 skipped
        let xs: Vec<f64> = dashed.iter().map(|(x, _)| *x).collect();
        assert_eq!(xs, vec![0.0, 1.0, 2.0, 6.0, 7.0, 8.0, 12.0]);
        assert!(dashed.iter().all(|(_, y)| *y == 1.0));
    }

    #[test]
    fn test_format_x() {
        let time = daily_index(1)[0];
        assert_eq!(format_x(time.timestamp() as f64, Some("%Y-%m-%d")), "2024-01-02");
        assert_eq!(format_x(1.5, None), "1.50");
    }

    #[test]
    fn test_render_figure_text() {
        let index = daily_index(30);
        let values: Vec<f64> = (0..30).map(|i| 50.0 + (i as f64 / 3.0).sin() * 20.0).collect();

        let mut figure = Figure::new(FigureSize::new(80, 20));
        let axes = figure.axes_mut(0).unwrap();
        axes.plot(&index, &values, LineSpec::new(BLUE).with_label("RSI"));
        axes.axhline(70.0, LineSpec::new(RED).with_label("Overbought").dashed());
        axes.set_title("Relative Strength Index (RSI)");
        axes.set_xlabel("Date");
        axes.legend();
        axes.format_date_axis();
        figure.tight_layout();

        let text = figure.to_lines().join("\n");
        assert!(text.contains("Relative Strength Index (RSI)"));
        assert!(text.contains("Overbought"));
        assert!(text.contains("2024-01-02"));
        assert!(text.contains("Date"));

        let buf = figure.to_buffer();
        assert_eq!(buf.area, Rect::new(0, 0, 80, 20));
    }

    #[test]
    fn test_render_clamps_to_figure_size() {
        let figure = Figure::new(FigureSize::new(30, 8));
        let area = Rect::new(0, 0, 60, 16);
        let mut buf = Buffer::empty(area);
        (&figure).render(area, &mut buf);

        let lines = buffer_lines(&buf);
        assert_eq!(lines.len(), 16);
        assert!(lines[10].is_empty());
        assert!(lines.iter().all(|line| line.chars().count() <= 30));
    }
}
