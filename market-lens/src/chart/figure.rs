//! Retained-mode figure model: a [`Figure`] owns vertically stacked [`Axes`], each [`Axes`] collects
//! draw calls (lines, horizontal reference lines, heatmaps) plus labels. Nothing is rasterised
//! until the figure is rendered.

use super::{
    heatmap::HeatmapLayer,
    style::{FigureSize, LineSpec, LineStyle},
};
use crate::{correlation::CorrelationMatrix, error::LensError};
use chrono::{DateTime, Utc};
use ratatui::style::Color;

/// Date format applied by [`Axes::format_date_axis`].
pub const DEFAULT_DATE_FORMAT: &str = "%Y-%m-%d";

/// Relative padding added around the data range on the y axis.
const Y_MARGIN: f64 = 0.05;

/// A plotted line. X values are unix timestamps in seconds.
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    spec: LineSpec,
    points: Vec<(f64, f64)>,
}

impl Series {
    pub fn label(&self) -> Option<&str> {
        self.spec.label.as_deref()
    }

    pub fn color(&self) -> Color {
        self.spec.color
    }

    pub fn style(&self) -> LineStyle {
        self.spec.style
    }

    pub fn points(&self) -> &[(f64, f64)] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Horizontal reference line spanning the full x range (e.g. an RSI threshold).
#[derive(Debug, Clone, PartialEq)]
pub struct RefLine {
    y: f64,
    spec: LineSpec,
}

impl RefLine {
    pub fn y(&self) -> f64 {
        self.y
    }

    pub fn label(&self) -> Option<&str> {
        self.spec.label.as_deref()
    }

    pub fn color(&self) -> Color {
        self.spec.color
    }

    pub fn style(&self) -> LineStyle {
        self.spec.style
    }
}

/// A single plotting panel.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Axes {
    title: Option<String>,
    x_label: Option<String>,
    y_label: Option<String>,
    grid: bool,
    legend: bool,
    date_format: Option<String>,
    series: Vec<Series>,
    ref_lines: Vec<RefLine>,
    heatmap: Option<HeatmapLayer>,
}

impl Axes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Draw `y` against the timestamps in `x`.
    ///
    /// Rows where `y` is not finite are skipped, leaving a gap.
    pub fn plot(&mut self, x: &[DateTime<Utc>], y: &[f64], spec: LineSpec) {
        let points = x
            .iter()
            .zip(y.iter())
            .filter(|(_, value)| value.is_finite())
            .map(|(time, value)| (time.timestamp() as f64, *value))
            .collect();

        self.series.push(Series { spec, points });
    }

    /// Draw a horizontal line at `y` across the whole panel.
    pub fn axhline(&mut self, y: f64, spec: LineSpec) {
        self.ref_lines.push(RefLine { y, spec });
    }

    /// Draw an annotated correlation heatmap, replacing any previous one.
    pub fn heatmap(&mut self, matrix: &CorrelationMatrix) {
        self.heatmap = Some(HeatmapLayer::from_matrix(matrix));
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = Some(title.into());
    }

    pub fn set_xlabel(&mut self, label: impl Into<String>) {
        self.x_label = Some(label.into());
    }

    pub fn set_ylabel(&mut self, label: impl Into<String>) {
        self.y_label = Some(label.into());
    }

    pub fn set_grid(&mut self, enabled: bool) {
        self.grid = enabled;
    }

    /// Show a legend listing every labelled line.
    pub fn legend(&mut self) {
        self.legend = true;
    }

    /// Label the x axis with dates instead of raw timestamps.
    pub fn format_date_axis(&mut self) {
        self.date_format = Some(DEFAULT_DATE_FORMAT.to_string());
    }

    pub fn set_date_format(&mut self, format: impl Into<String>) {
        self.date_format = Some(format.into());
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn x_label(&self) -> Option<&str> {
        self.x_label.as_deref()
    }

    pub fn y_label(&self) -> Option<&str> {
        self.y_label.as_deref()
    }

    pub fn has_grid(&self) -> bool {
        self.grid
    }

    pub fn has_legend(&self) -> bool {
        self.legend
    }

    pub fn date_format(&self) -> Option<&str> {
        self.date_format.as_deref()
    }

    pub fn series(&self) -> &[Series] {
        &self.series
    }

    pub fn ref_lines(&self) -> &[RefLine] {
        &self.ref_lines
    }

    pub fn heatmap_layer(&self) -> Option<&HeatmapLayer> {
        self.heatmap.as_ref()
    }

    pub fn has_heatmap(&self) -> bool {
        self.heatmap.is_some()
    }

    /// Legend entries in draw order: lines first, then reference lines.
    pub fn legend_labels(&self) -> Vec<&str> {
        self.series
            .iter()
            .filter_map(Series::label)
            .chain(self.ref_lines.iter().filter_map(RefLine::label))
            .collect()
    }

    /// X range covered by the plotted lines.
    pub fn x_bounds(&self) -> [f64; 2] {
        let xs = self.series.iter().flat_map(|series| series.points.iter().map(|(x, _)| *x));
        match min_max(xs) {
            Some((min, max)) if max > min => [min, max],
            Some((min, _)) => [min - 1.0, min + 1.0],
            None => [0.0, 1.0],
        }
    }

    /// Y range covered by the plotted lines and reference lines, padded by 5% each side.
    pub fn y_bounds(&self) -> [f64; 2] {
        let ys = self
            .series
            .iter()
            .flat_map(|series| series.points.iter().map(|(_, y)| *y))
            .chain(self.ref_lines.iter().map(|line| line.y));

        match min_max(ys) {
            Some((min, max)) if max > min => {
                let pad = (max - min) * Y_MARGIN;
                [min - pad, max + pad]
            }
            Some((min, _)) => [min - 1.0, min + 1.0],
            None => [0.0, 1.0],
        }
    }
}

fn min_max(values: impl Iterator<Item = f64>) -> Option<(f64, f64)> {
    values.fold(None, |acc, value| match acc {
        None => Some((value, value)),
        Some((min, max)) => Some((min.min(value), max.max(value))),
    })
}

/// A drawable surface made of one or more vertically stacked [`Axes`].
#[derive(Debug, Clone, PartialEq)]
pub struct Figure {
    size: FigureSize,
    axes: Vec<Axes>,
    tight: bool,
}

impl Figure {
    /// Figure with a single gridded [`Axes`].
    pub fn new(size: FigureSize) -> Self {
        Self::subplots(size, 1)
    }

    /// Figure with `rows` stacked gridded [`Axes`] sharing the height equally.
    pub fn subplots(size: FigureSize, rows: usize) -> Self {
        let axes = (0..rows.max(1))
            .map(|_| {
                let mut axes = Axes::new();
                axes.set_grid(true);
                axes
            })
            .collect();

        Self {
            size,
            axes,
            tight: false,
        }
    }

    pub fn size(&self) -> FigureSize {
        self.size
    }

    pub fn axes(&self) -> &[Axes] {
        &self.axes
    }

    pub fn axes_mut(&mut self, index: usize) -> Option<&mut Axes> {
        self.axes.get_mut(index)
    }

    /// The first (top) panel.
    pub fn current_axes_mut(&mut self) -> &mut Axes {
        // Figure::subplots always creates at least one axes
        &mut self.axes[0]
    }

    /// Borrow one [`Axes`] together with this parent figure, for drawing onto a caller-owned
    /// surface.
    pub fn handle(&mut self, index: usize) -> Result<AxesHandle<'_>, LensError> {
        if index >= self.axes.len() {
            return Err(LensError::AxesIndex {
                index,
                len: self.axes.len(),
            });
        }

        Ok(AxesHandle {
            figure: self,
            index,
        })
    }

    /// Drop the outer margin between panels and the figure edge.
    pub fn tight_layout(&mut self) {
        self.tight = true;
    }

    pub fn is_tight(&self) -> bool {
        self.tight
    }
}

/// Mutable access to one [`Axes`] of a caller-owned [`Figure`].
///
/// Operations drawing through a handle never present the figure; the caller owns its lifecycle.
#[derive(Debug)]
pub struct AxesHandle<'f> {
    figure: &'f mut Figure,
    index: usize,
}

impl AxesHandle<'_> {
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn axes(&mut self) -> &mut Axes {
        // Index checked in Figure::handle, and Figure never removes axes
        &mut self.figure.axes[self.index]
    }

    pub fn figure(&mut self) -> &mut Figure {
        self.figure
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{chart::style::ORANGE, data::tests::daily_index};

    #[test]
    fn test_plot_skips_non_finite_values() {
        let index = daily_index(4);
        let mut axes = Axes::new();
        axes.plot(&index, &[f64::NAN, 1.0, f64::INFINITY, 3.0], LineSpec::default());

        let series = &axes.series()[0];
        assert_eq!(series.len(), 2);
        assert_eq!(series.points()[0], (index[1].timestamp() as f64, 1.0));
    }

    #[test]
    fn test_legend_labels_follow_draw_order() {
        let index = daily_index(2);
        let mut axes = Axes::new();
        axes.axhline(70.0, LineSpec::new(ORANGE).with_label("Overbought").dashed());
        axes.plot(&index, &[1.0, 2.0], LineSpec::default().with_label("RSI"));
        axes.axhline(0.0, LineSpec::default());

        assert_eq!(axes.legend_labels(), ["RSI", "Overbought"]);
        assert_eq!(axes.ref_lines()[0].style(), LineStyle::Dashed);
    }

    #[test]
    fn test_axes_bounds() {
        struct TestCase {
            values: Vec<f64>,
            ref_line: Option<f64>,
            expected_y: [f64; 2],
        }

        let tests = vec![
            TestCase {
                // TC0: 5% padding on each side
                values: vec![0.0, 10.0, 20.0],
                ref_line: None,
                expected_y: [-1.0, 21.0],
            },
            TestCase {
                // TC1: reference line widens the range
                values: vec![40.0, 60.0],
                ref_line: Some(80.0),
                expected_y: [38.0, 82.0],
            },
            TestCase {
                // TC2: flat data gets a unit band
                values: vec![5.0, 5.0],
                ref_line: None,
                expected_y: [4.0, 6.0],
            },
        ];

        for (index, test) in tests.into_iter().enumerate() {
            let mut axes = Axes::new();
            axes.plot(&daily_index(test.values.len()), &test.values, LineSpec::default());
            if let Some(y) = test.ref_line {
                axes.axhline(y, LineSpec::default());
            }

            let [low, high] = axes.y_bounds();
            assert!((low - test.expected_y[0]).abs() < 1e-9, "TC{} low failed", index);
            assert!((high - test.expected_y[1]).abs() < 1e-9, "TC{} high failed", index);
        }

        assert_eq!(Axes::new().x_bounds(), [0.0, 1.0]);
    }

    #[test]
    fn test_figure_handles() {
        let mut figure = Figure::subplots(FigureSize::PRICE, 3);
        assert_eq!(figure.axes().len(), 3);
        assert!(figure.axes().iter().all(Axes::has_grid));

        let mut handle = figure.handle(2).unwrap();
        handle.axes().set_title("MACD");
        handle.figure().tight_layout();
        assert_eq!(handle.index(), 2);

        assert_eq!(figure.axes()[2].title(), Some("MACD"));
        assert!(figure.is_tight());
        assert_eq!(
            figure.handle(3).unwrap_err(),
            LensError::AxesIndex { index: 3, len: 3 }
        );
    }
}
