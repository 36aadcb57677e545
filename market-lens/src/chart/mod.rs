//! Plotting surface shared by the correlation heatmaps and the technical charts.
//!
//! Provides:
//! - Figure / Axes model collecting draw calls
//! - Ratatui rendering of figures onto a [`ratatui::buffer::Buffer`]
//! - Coolwarm annotated heatmap layer
//! - Line styling and named colours

mod figure;
mod heatmap;
mod render;
pub mod style;

pub use figure::{Axes, AxesHandle, Figure, RefLine, Series, DEFAULT_DATE_FORMAT};
pub use heatmap::{coolwarm, heatmap_size, HeatmapLayer, MIN_CELL_WIDTH};
pub use render::buffer_lines;
pub use style::{FigureSize, LineSpec, LineStyle};
