//! Correlation analysis over dataset columns.
//!
//! Provides:
//! - Pearson, Spearman and Kendall correlation matrices ([`compute_correlation_matrix`])
//! - Annotated heatmap rendering of a single matrix ([`plot_correlation_heatmap`])
//! - The compute-then-render pipeline over all three methods ([`run_correlation_analysis`])

mod calc;

pub use calc::{average_ranks, kendall, pearson, spearman};

use crate::{
    chart::{heatmap_size, Figure, FigureSize},
    data::Dataset,
    error::LensError,
    present::Presenter,
};
use derive_more::Display;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Default title used by [`plot_correlation_heatmap`] callers that have nothing better.
pub const DEFAULT_HEATMAP_TITLE: &str = "Correlation Heatmap";

/// Statistical method used to correlate two columns.
#[derive(
    Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Deserialize, Serialize, Display,
)]
#[serde(rename_all = "lowercase")]
pub enum CorrelationMethod {
    /// Linear, covariance based
    #[display("pearson")]
    Pearson,
    /// Rank based, monotonic
    #[display("spearman")]
    Spearman,
    /// Rank concordance (tau-b)
    #[display("kendall")]
    Kendall,
}

impl CorrelationMethod {
    pub const ALL: [CorrelationMethod; 3] = [
        CorrelationMethod::Pearson,
        CorrelationMethod::Spearman,
        CorrelationMethod::Kendall,
    ];

    /// Lowercase method name, e.g. "pearson".
    pub fn as_str(&self) -> &'static str {
        match self {
            CorrelationMethod::Pearson => "pearson",
            CorrelationMethod::Spearman => "spearman",
            CorrelationMethod::Kendall => "kendall",
        }
    }

    /// Capitalised method name used in titles, e.g. "Pearson".
    pub fn title(&self) -> &'static str {
        match self {
            CorrelationMethod::Pearson => "Pearson",
            CorrelationMethod::Spearman => "Spearman",
            CorrelationMethod::Kendall => "Kendall",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|method| method.as_str().eq_ignore_ascii_case(name))
    }

    /// Correlation of two series, `None` when undefined.
    pub fn correlate(&self, a: &[f64], b: &[f64]) -> Option<f64> {
        match self {
            CorrelationMethod::Pearson => pearson(a, b),
            CorrelationMethod::Spearman => spearman(a, b),
            CorrelationMethod::Kendall => kendall(a, b),
        }
    }
}

/// Square correlation matrix keyed by column name on both axes.
///
/// Symmetric with `1.0` on the diagonal. An off-diagonal `NaN` marks a pair without a defined
/// correlation (fewer than two complete rows, or a constant side).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrelationMatrix {
    method: CorrelationMethod,
    columns: Vec<String>,
    values: Vec<Vec<f64>>,
}

impl CorrelationMatrix {
    fn compute(method: CorrelationMethod, columns: &[String], series: &[&[f64]]) -> Self {
        let n = columns.len();
        let mut values = vec![vec![1.0; n]; n];

        for i in 0..n {
            for j in (i + 1)..n {
                let value = method.correlate(series[i], series[j]).unwrap_or_else(|| {
                    warn!(
                        %method,
                        a = %columns[i],
                        b = %columns[j],
                        "correlation undefined for column pair"
                    );
                    f64::NAN
                });
                values[i][j] = value;
                values[j][i] = value;
            }
        }

        Self {
            method,
            columns: columns.to_vec(),
            values,
        }
    }

    pub fn method(&self) -> CorrelationMethod {
        self.method
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Row-major values, `values()[row][col]`.
    pub fn values(&self) -> &[Vec<f64>] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Correlation between two named columns.
    pub fn get(&self, row: &str, col: &str) -> Option<f64> {
        let row = self.columns.iter().position(|name| name == row)?;
        let col = self.columns.iter().position(|name| name == col)?;
        Some(self.values[row][col])
    }
}

/// Correlation matrices for every [`CorrelationMethod`], in pearson, spearman, kendall order.
#[derive(Debug, Clone, PartialEq)]
pub struct CorrelationResult {
    matrices: IndexMap<CorrelationMethod, CorrelationMatrix>,
}

impl CorrelationResult {
    pub fn get(&self, method: CorrelationMethod) -> Option<&CorrelationMatrix> {
        self.matrices.get(&method)
    }

    /// Lookup by method name, e.g. "spearman".
    pub fn by_name(&self, name: &str) -> Option<&CorrelationMatrix> {
        CorrelationMethod::from_name(name).and_then(|method| self.get(method))
    }

    pub fn iter(&self) -> impl Iterator<Item = (CorrelationMethod, &CorrelationMatrix)> {
        self.matrices.iter().map(|(method, matrix)| (*method, matrix))
    }

    pub fn len(&self) -> usize {
        self.matrices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matrices.is_empty()
    }
}

impl IntoIterator for CorrelationResult {
    type Item = (CorrelationMethod, CorrelationMatrix);
    type IntoIter = indexmap::map::IntoIter<CorrelationMethod, CorrelationMatrix>;

    fn into_iter(self) -> Self::IntoIter {
        self.matrices.into_iter()
    }
}

/// Compute Pearson, Spearman and Kendall matrices over the requested columns.
///
/// Fails before computing anything if a column is missing or holds text; the error lists every
/// offending column.
pub fn compute_correlation_matrix<S>(
    data: &Dataset,
    columns: &[S],
) -> Result<CorrelationResult, LensError>
where
    S: AsRef<str>,
{
    let series = data.select_numeric(columns)?;
    let columns: Vec<String> = columns
        .iter()
        .map(<S as AsRef<str>>::as_ref)
        .map(str::to_string)
        .collect();

    debug!(?columns, rows = data.len(), "computing correlation matrices");

    let matrices = CorrelationMethod::ALL
        .into_iter()
        .map(|method| (method, CorrelationMatrix::compute(method, &columns, &series)))
        .collect();

    Ok(CorrelationResult { matrices })
}

/// Render one matrix as an annotated coolwarm heatmap on a figure of its own and present it.
///
/// The figure starts at [`FigureSize::HEATMAP`] and widens so every annotation keeps its two
/// decimals.
pub fn plot_correlation_heatmap<P>(
    matrix: &CorrelationMatrix,
    title: &str,
    presenter: &mut P,
) -> Result<(), LensError>
where
    P: Presenter + ?Sized,
{
    let mut figure = Figure::new(heatmap_size(matrix.columns(), FigureSize::HEATMAP));
    let axes = figure.current_axes_mut();
    axes.heatmap(matrix);
    axes.set_title(title);
    figure.tight_layout();

    debug!(%title, columns = matrix.len(), "presenting correlation heatmap");
    presenter.present(&figure)
}

/// Compute every correlation matrix, then render each titled "{Method} Correlation Heatmap".
pub fn run_correlation_analysis<S, P>(
    data: &Dataset,
    columns: &[S],
    presenter: &mut P,
) -> Result<(), LensError>
where
    S: AsRef<str>,
    P: Presenter + ?Sized,
{
    let result = compute_correlation_matrix(data, columns)?;
    for (method, matrix) in result.iter() {
        let title = format!("{} Correlation Heatmap", method.title());
        plot_correlation_heatmap(matrix, &title, presenter)?;
    }
    Ok(())
}
