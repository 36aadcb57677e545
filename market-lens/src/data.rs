//! Tabular time series consumed by the correlation and chart components.
//!
//! A [`Dataset`] is a time index plus named columns of equal length. Columns keep insertion
//! order, which is also the order used when listing them.

use crate::error::LensError;
use chrono::{DateTime, Utc};
use indexmap::IndexMap;

/// Values held by a single named column.
#[derive(Debug, Clone, PartialEq)]
pub enum Column {
    /// Numeric series, `NaN` marks a missing observation
    Numeric(Vec<f64>),
    /// Free-form labels (tickers, sectors, ...)
    Text(Vec<String>),
}

impl Column {
    pub fn len(&self) -> usize {
        match self {
            Column::Numeric(values) => values.len(),
            Column::Text(values) => values.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Numeric values, `None` for a text column.
    pub fn as_numeric(&self) -> Option<&[f64]> {
        match self {
            Column::Numeric(values) => Some(values),
            Column::Text(_) => None,
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, Column::Numeric(_))
    }
}

/// Ordered rows indexed by timestamp, with named columns.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    index: Vec<DateTime<Utc>>,
    columns: IndexMap<String, Column>,
}

impl Dataset {
    /// Create an empty dataset over the provided time index.
    pub fn new(index: Vec<DateTime<Utc>>) -> Self {
        Self {
            index,
            columns: IndexMap::new(),
        }
    }

    /// Add a numeric column.
    pub fn with_column(
        self,
        name: impl Into<String>,
        values: impl Into<Vec<f64>>,
    ) -> Result<Self, LensError> {
        self.insert(name.into(), Column::Numeric(values.into()))
    }

    /// Add a text column.
    pub fn with_text_column<S>(
        self,
        name: impl Into<String>,
        values: impl IntoIterator<Item = S>,
    ) -> Result<Self, LensError>
    where
        S: Into<String>,
    {
        let values = values.into_iter().map(Into::into).collect();
        self.insert(name.into(), Column::Text(values))
    }

    fn insert(mut self, name: String, column: Column) -> Result<Self, LensError> {
        if column.len() != self.index.len() {
            return Err(LensError::LengthMismatch {
                column: name,
                expected: self.index.len(),
                actual: column.len(),
            });
        }

        if self.columns.contains_key(&name) {
            return Err(LensError::DuplicateColumn(name));
        }

        self.columns.insert(name, column);
        Ok(self)
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn index(&self) -> &[DateTime<Utc>] {
        &self.index
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.columns.contains_key(name)
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.keys().map(String::as_str)
    }

    /// Fail with every requested column that is absent, in request order.
    pub fn require_columns<S>(&self, names: &[S]) -> Result<(), LensError>
    where
        S: AsRef<str>,
    {
        let missing: Vec<String> = names
            .iter()
            .map(<S as AsRef<str>>::as_ref)
            .filter(|name| !self.contains(name))
            .map(str::to_string)
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(LensError::MissingColumns(missing))
        }
    }

    /// Values of a numeric column.
    pub fn numeric(&self, name: &str) -> Result<&[f64], LensError> {
        match self.columns.get(name) {
            Some(Column::Numeric(values)) => Ok(values),
            Some(Column::Text(_)) => Err(LensError::NonNumericColumns(vec![name.to_string()])),
            None => Err(LensError::MissingColumns(vec![name.to_string()])),
        }
    }

    /// Resolve several numeric columns at once.
    ///
    /// Missing columns are reported before non-numeric ones; each error lists every offender.
    pub fn select_numeric<S>(&self, names: &[S]) -> Result<Vec<&[f64]>, LensError>
    where
        S: AsRef<str>,
    {
        self.require_columns(names)?;

        let names: Vec<&str> = names.iter().map(<S as AsRef<str>>::as_ref).collect();

        let non_numeric: Vec<String> = names
            .iter()
            .filter(|name| self.column(name).is_some_and(|column| !column.is_numeric()))
            .map(|name| name.to_string())
            .collect();

        if !non_numeric.is_empty() {
            return Err(LensError::NonNumericColumns(non_numeric));
        }

        Ok(names
            .iter()
            .filter_map(|name| self.column(name))
            .filter_map(Column::as_numeric)
            .collect())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    pub(crate) fn daily_index(len: usize) -> Vec<DateTime<Utc>> {
        let start = Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap();
        (0..len).map(|day| start + Duration::days(day as i64)).collect()
    }

    #[test]
    fn test_dataset_builder() {
        let data = Dataset::new(daily_index(3))
            .with_column("Close", [10.0, 11.0, 12.0])
            .unwrap()
            .with_text_column("Ticker", ["AAPL", "AAPL", "AAPL"])
            .unwrap();

        assert_eq!(data.len(), 3);
        assert_eq!(data.column_names().collect::<Vec<_>>(), ["Close", "Ticker"]);
        assert_eq!(data.numeric("Close").unwrap(), [10.0, 11.0, 12.0]);
        assert!(!data.column("Ticker").unwrap().is_numeric());
    }

    #[test]
    fn test_dataset_builder_rejects_bad_columns() {
        let error = Dataset::new(daily_index(3))
            .with_column("Close", [10.0, 11.0])
            .unwrap_err();
        assert_eq!(
            error,
            LensError::LengthMismatch {
                column: "Close".to_string(),
                expected: 3,
                actual: 2
            }
        );

        let error = Dataset::new(daily_index(1))
            .with_column("Close", [10.0])
            .unwrap()
            .with_column("Close", [11.0])
            .unwrap_err();
        assert_eq!(error, LensError::DuplicateColumn("Close".to_string()));
    }

    #[test]
    fn test_require_columns() {
        let data = Dataset::new(daily_index(2))
            .with_column("Close", [1.0, 2.0])
            .unwrap();

        struct TestCase {
            input: Vec<&'static str>,
            expected: Result<(), LensError>,
        }

        let tests = vec![
            TestCase {
                // TC0: all present
                input: vec!["Close"],
                expected: Ok(()),
            },
            TestCase {
                // TC1: single missing
                input: vec!["Close", "RSI"],
                expected: Err(LensError::MissingColumns(vec!["RSI".to_string()])),
            },
            TestCase {
                // TC2: every missing column reported in request order
                input: vec!["MACD", "Close", "MACD_signal"],
                expected: Err(LensError::MissingColumns(vec![
                    "MACD".to_string(),
                    "MACD_signal".to_string(),
                ])),
            },
            TestCase {
                // TC3: nothing requested
                input: vec![],
                expected: Ok(()),
            },
        ];

        for (index, test) in tests.into_iter().enumerate() {
            let actual = data.require_columns(test.input.as_slice());
            assert_eq!(actual, test.expected, "TC{} failed", index);
        }
    }

    #[test]
    fn test_select_numeric() {
        let data = Dataset::new(daily_index(2))
            .with_column("Close", [1.0, 2.0])
            .unwrap()
            .with_text_column("Ticker", ["A", "B"])
            .unwrap()
            .with_text_column("Sector", ["Tech", "Tech"])
            .unwrap();

        let selected = data.select_numeric(&["Close"]).unwrap();
        assert_eq!(selected, vec![&[1.0, 2.0][..]]);

        assert_eq!(
            data.select_numeric(&["Ticker", "Close", "Sector"]),
            Err(LensError::NonNumericColumns(vec![
                "Ticker".to_string(),
                "Sector".to_string()
            ]))
        );

        // Missing wins over non-numeric
        assert_eq!(
            data.select_numeric(&["Ticker", "Volume"]),
            Err(LensError::MissingColumns(vec!["Volume".to_string()]))
        );
    }
}
