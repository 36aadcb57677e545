//! Technical-analysis chart overlays over a bound [`Dataset`].
//!
//! Every chart validates its columns first, then draws either onto a caller-owned [`AxesHandle`]
//! (composable, e.g. a multi-panel dashboard) or onto a figure of its own. Only self-created
//! figures are handed to the [`Presenter`].

use crate::{
    chart::{
        style::{BLUE, GREEN, GREY, ORANGE, PURPLE, RED},
        Axes, AxesHandle, Figure, FigureSize, LineSpec,
    },
    data::Dataset,
    error::LensError,
    present::{Presenter, TerminalPresenter},
};
use ratatui::style::Color;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Options for [`Visualizer::plot_close_with_sma`].
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct PriceSmaOptions {
    pub price_col: String,
    pub sma_col: String,
    pub price_label: String,
    pub sma_label: String,
    pub price_color: Color,
    pub sma_color: Color,
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub figsize: FigureSize,
}

impl Default for PriceSmaOptions {
    fn default() -> Self {
        Self {
            price_col: "Close".to_string(),
            sma_col: "SMA_20".to_string(),
            price_label: "Close Price".to_string(),
            sma_label: "20-Day SMA".to_string(),
            price_color: BLUE,
            sma_color: ORANGE,
            title: "Close Price & 20-Day SMA".to_string(),
            x_label: "Date".to_string(),
            y_label: "Price (USD)".to_string(),
            figsize: FigureSize::PRICE,
        }
    }
}

impl PriceSmaOptions {
    pub fn with_columns(mut self, price_col: impl Into<String>, sma_col: impl Into<String>) -> Self {
        self.price_col = price_col.into();
        self.sma_col = sma_col.into();
        self
    }

    pub fn with_labels(mut self, price_label: impl Into<String>, sma_label: impl Into<String>) -> Self {
        self.price_label = price_label.into();
        self.sma_label = sma_label.into();
        self
    }

    pub fn with_colors(mut self, price_color: Color, sma_color: Color) -> Self {
        self.price_color = price_color;
        self.sma_color = sma_color;
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_figsize(mut self, figsize: FigureSize) -> Self {
        self.figsize = figsize;
        self
    }
}

/// Options for [`Visualizer::plot_rsi`].
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct RsiOptions {
    pub rsi_col: String,
    pub rsi_label: String,
    pub line_color: Color,
    pub overbought: f64,
    pub oversold: f64,
    pub overbought_label: String,
    pub oversold_label: String,
    pub overbought_color: Color,
    pub oversold_color: Color,
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub figsize: FigureSize,
}

impl Default for RsiOptions {
    fn default() -> Self {
        Self {
            rsi_col: "RSI".to_string(),
            rsi_label: "RSI".to_string(),
            line_color: PURPLE,
            overbought: 70.0,
            oversold: 30.0,
            overbought_label: "Overbought".to_string(),
            oversold_label: "Oversold".to_string(),
            overbought_color: RED,
            oversold_color: GREEN,
            title: "Relative Strength Index (RSI)".to_string(),
            x_label: "Date".to_string(),
            y_label: "RSI".to_string(),
            figsize: FigureSize::INDICATOR,
        }
    }
}

impl RsiOptions {
    pub fn with_column(mut self, rsi_col: impl Into<String>) -> Self {
        self.rsi_col = rsi_col.into();
        self
    }

    pub fn with_thresholds(mut self, overbought: f64, oversold: f64) -> Self {
        self.overbought = overbought;
        self.oversold = oversold;
        self
    }

    pub fn with_colors(mut self, line: Color, overbought: Color, oversold: Color) -> Self {
        self.line_color = line;
        self.overbought_color = overbought;
        self.oversold_color = oversold;
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_figsize(mut self, figsize: FigureSize) -> Self {
        self.figsize = figsize;
        self
    }
}

/// Options for [`Visualizer::plot_macd`].
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct MacdOptions {
    pub macd_col: String,
    pub signal_col: String,
    pub macd_label: String,
    pub signal_label: String,
    pub zero_label: String,
    pub macd_color: Color,
    pub signal_color: Color,
    pub zero_color: Color,
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub figsize: FigureSize,
}

impl Default for MacdOptions {
    fn default() -> Self {
        Self {
            macd_col: "MACD".to_string(),
            signal_col: "MACD_signal".to_string(),
            macd_label: "MACD".to_string(),
            signal_label: "Signal Line".to_string(),
            zero_label: "Zero Line".to_string(),
            macd_color: BLUE,
            signal_color: ORANGE,
            zero_color: GREY,
            title: "MACD Indicator".to_string(),
            x_label: "Date".to_string(),
            y_label: "MACD".to_string(),
            figsize: FigureSize::INDICATOR,
        }
    }
}

impl MacdOptions {
    pub fn with_columns(mut self, macd_col: impl Into<String>, signal_col: impl Into<String>) -> Self {
        self.macd_col = macd_col.into();
        self.signal_col = signal_col.into();
        self
    }

    pub fn with_colors(mut self, macd: Color, signal: Color, zero: Color) -> Self {
        self.macd_color = macd;
        self.signal_color = signal;
        self.zero_color = zero;
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_figsize(mut self, figsize: FigureSize) -> Self {
        self.figsize = figsize;
        self
    }
}

/// Where a chart is drawn.
enum Surface<'f> {
    /// Created by the chart call, presented on finalisation
    Owned(Figure),
    /// Supplied by the caller, who keeps responsibility for presenting it
    Borrowed(AxesHandle<'f>),
}

impl<'f> Surface<'f> {
    fn acquire(ax: Option<AxesHandle<'f>>, figsize: FigureSize) -> Self {
        match ax {
            Some(handle) => Surface::Borrowed(handle),
            None => {
                debug!(?figsize, "creating figure");
                Surface::Owned(Figure::new(figsize))
            }
        }
    }

    fn axes(&mut self) -> &mut Axes {
        match self {
            Surface::Owned(figure) => figure.current_axes_mut(),
            Surface::Borrowed(handle) => handle.axes(),
        }
    }

    fn figure(&mut self) -> &mut Figure {
        match self {
            Surface::Owned(figure) => figure,
            Surface::Borrowed(handle) => handle.figure(),
        }
    }
}

/// Draws price, RSI and MACD charts from a bound [`Dataset`].
pub struct Visualizer<'a, P = TerminalPresenter> {
    data: &'a Dataset,
    presenter: P,
}

impl<'a> Visualizer<'a> {
    /// Bind a dataset, presenting self-created figures in the terminal.
    pub fn new(data: &'a Dataset) -> Self {
        Self::with_presenter(data, TerminalPresenter)
    }
}

impl<'a, P> Visualizer<'a, P>
where
    P: Presenter,
{
    pub fn with_presenter(data: &'a Dataset, presenter: P) -> Self {
        Self { data, presenter }
    }

    pub fn data(&self) -> &'a Dataset {
        self.data
    }

    pub fn presenter(&self) -> &P {
        &self.presenter
    }

    pub fn into_presenter(self) -> P {
        self.presenter
    }

    /// Closing price with its simple moving average.
    pub fn plot_close_with_sma(
        &mut self,
        options: &PriceSmaOptions,
        ax: Option<AxesHandle<'_>>,
    ) -> Result<(), LensError> {
        let columns = self
            .data
            .select_numeric(&[&options.price_col, &options.sma_col])?;
        let index = self.data.index();

        let mut surface = Surface::acquire(ax, options.figsize);
        let axes = surface.axes();
        axes.plot(
            index,
            columns[0],
            LineSpec::new(options.price_color).with_label(&options.price_label),
        );
        axes.plot(
            index,
            columns[1],
            LineSpec::new(options.sma_color).with_label(&options.sma_label),
        );
        decorate(axes, &options.title, &options.x_label, &options.y_label);

        self.finalize(surface)
    }

    /// RSI line with dashed overbought / oversold thresholds.
    pub fn plot_rsi(&mut self, options: &RsiOptions, ax: Option<AxesHandle<'_>>) -> Result<(), LensError> {
        let columns = self.data.select_numeric(&[&options.rsi_col])?;
        let index = self.data.index();

        let mut surface = Surface::acquire(ax, options.figsize);
        let axes = surface.axes();
        axes.plot(
            index,
            columns[0],
            LineSpec::new(options.line_color).with_label(&options.rsi_label),
        );
        axes.axhline(
            options.overbought,
            LineSpec::new(options.overbought_color)
                .with_label(&options.overbought_label)
                .dashed(),
        );
        axes.axhline(
            options.oversold,
            LineSpec::new(options.oversold_color)
                .with_label(&options.oversold_label)
                .dashed(),
        );
        decorate(axes, &options.title, &options.x_label, &options.y_label);

        self.finalize(surface)
    }

    /// MACD and signal lines around a dashed zero reference.
    pub fn plot_macd(&mut self, options: &MacdOptions, ax: Option<AxesHandle<'_>>) -> Result<(), LensError> {
        let columns = self
            .data
            .select_numeric(&[&options.macd_col, &options.signal_col])?;
        let index = self.data.index();

        let mut surface = Surface::acquire(ax, options.figsize);
        let axes = surface.axes();
        axes.plot(
            index,
            columns[0],
            LineSpec::new(options.macd_color).with_label(&options.macd_label),
        );
        axes.plot(
            index,
            columns[1],
            LineSpec::new(options.signal_color).with_label(&options.signal_label),
        );
        axes.axhline(
            0.0,
            LineSpec::new(options.zero_color)
                .with_label(&options.zero_label)
                .dashed(),
        );
        decorate(axes, &options.title, &options.x_label, &options.y_label);

        self.finalize(surface)
    }

    /// Tight layout and date labels always; presentation only for self-created figures.
    fn finalize(&mut self, mut surface: Surface<'_>) -> Result<(), LensError> {
        surface.figure().tight_layout();
        surface.axes().format_date_axis();

        match surface {
            Surface::Owned(figure) => {
                info!(
                    title = figure.axes()[0].title().unwrap_or_default(),
                    "Presenting figure"
                );
                self.presenter.present(&figure)
            }
            Surface::Borrowed(handle) => {
                debug!(
                    index = handle.index(),
                    "drew onto caller-owned axes, presentation left to the caller"
                );
                Ok(())
            }
        }
    }
}

fn decorate(axes: &mut Axes, title: &str, x_label: &str, y_label: &str) {
    axes.set_title(title);
    axes.set_xlabel(x_label);
    axes.set_ylabel(y_label);
    axes.legend();
}
