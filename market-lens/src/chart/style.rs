use ratatui::style::Color;
use serde::{Deserialize, Serialize};

// Named colours, matching the matplotlib defaults the charts are styled after
pub const BLUE: Color = Color::Rgb(31, 119, 180);
pub const ORANGE: Color = Color::Rgb(255, 127, 14);
pub const PURPLE: Color = Color::Rgb(148, 103, 189);
pub const RED: Color = Color::Rgb(214, 39, 40);
pub const GREEN: Color = Color::Rgb(44, 160, 44);
pub const GREY: Color = Color::Rgb(127, 127, 127);

pub(crate) const C_GRID: Color = Color::Rgb(60, 60, 60);
pub(crate) const C_TEXT: Color = Color::Rgb(220, 220, 220);
pub(crate) const C_DIM: Color = Color::Rgb(120, 120, 120);

/// Figure dimensions in terminal cells.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Deserialize, Serialize)]
pub struct FigureSize {
    pub width: u16,
    pub height: u16,
}

impl FigureSize {
    /// Wide price panel.
    pub const PRICE: Self = Self::new(120, 30);
    /// Short oscillator / MACD panel.
    pub const INDICATOR: Self = Self::new(100, 18);
    pub const HEATMAP: Self = Self::new(80, 36);

    pub const fn new(width: u16, height: u16) -> Self {
        Self { width, height }
    }
}

impl Default for FigureSize {
    fn default() -> Self {
        Self::PRICE
    }
}

/// How a line is stroked.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LineStyle {
    #[default]
    Solid,
    Dashed,
}

/// Styling for one drawn line, analogous to matplotlib `plot` keyword arguments.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct LineSpec {
    /// Legend entry, unlabelled lines are left out of the legend
    pub label: Option<String>,
    pub color: Color,
    pub style: LineStyle,
}

impl LineSpec {
    pub fn new(color: Color) -> Self {
        Self {
            label: None,
            color,
            style: LineStyle::Solid,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_style(mut self, style: LineStyle) -> Self {
        self.style = style;
        self
    }

    pub fn dashed(self) -> Self {
        self.with_style(LineStyle::Dashed)
    }
}

impl Default for LineSpec {
    fn default() -> Self {
        Self::new(BLUE)
    }
}
