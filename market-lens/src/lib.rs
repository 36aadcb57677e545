/// Market Lens - Correlation & Technical Chart Library
///
/// Renders exploratory charts for a date-indexed table of numeric market data:
/// - correlation: Pearson, Spearman and Kendall matrices with annotated coolwarm heatmaps
/// - visualizer: close price + SMA, RSI and MACD overlays
///
/// Charts are drawn onto a [`Figure`] and rendered with ratatui. Charts created by this crate are
/// handed to a [`Presenter`] exactly once; charts drawn onto a caller-supplied [`AxesHandle`] are
/// left for the caller to present.
pub mod chart;
pub mod correlation;
pub mod data;
pub mod error;
pub mod present;
pub mod visualizer;

// Re-export commonly used types for convenience
pub use data::{Column, Dataset};
pub use error::LensError;

pub use correlation::{
    compute_correlation_matrix, plot_correlation_heatmap, run_correlation_analysis,
    CorrelationMatrix, CorrelationMethod, CorrelationResult,
};

pub use chart::{Axes, AxesHandle, Figure, FigureSize, LineSpec, LineStyle};
pub use present::{Presenter, RecordingPresenter, TerminalPresenter, TextPresenter};

pub use visualizer::{MacdOptions, PriceSmaOptions, RsiOptions, Visualizer};
