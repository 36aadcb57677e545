use itertools::Itertools;
use thiserror::Error;

/// All errors generated in `market-lens`.
#[derive(Debug, Clone, Eq, PartialEq, Error)]
pub enum LensError {
    #[error("missing column(s): {}", .0.iter().join(", "))]
    MissingColumns(Vec<String>),

    #[error("non-numeric column(s): {}", .0.iter().join(", "))]
    NonNumericColumns(Vec<String>),

    #[error("column {column} has {actual} values but the index has {expected}")]
    LengthMismatch {
        column: String,
        expected: usize,
        actual: usize,
    },

    #[error("duplicate column: {0}")]
    DuplicateColumn(String),

    #[error("axes index {index} out of range for figure with {len} axes")]
    AxesIndex { index: usize, len: usize },

    #[error("terminal error: {0}")]
    Terminal(String),
}

impl LensError {
    /// Column names carried by a validation error, empty for every other variant.
    pub fn columns(&self) -> &[String] {
        match self {
            LensError::MissingColumns(columns) | LensError::NonNumericColumns(columns) => columns,
            _ => &[],
        }
    }
}

impl From<std::io::Error> for LensError {
    fn from(value: std::io::Error) -> Self {
        Self::Terminal(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lens_error_display() {
        struct TestCase {
            input: LensError,
            expected: &'static str,
        }

        let tests = vec![
            TestCase {
                // TC0: single missing column
                input: LensError::MissingColumns(vec!["RSI".to_string()]),
                expected: "missing column(s): RSI",
            },
            TestCase {
                // TC1: every missing column is listed
                input: LensError::MissingColumns(vec![
                    "MACD".to_string(),
                    "MACD_signal".to_string(),
                ]),
                expected: "missing column(s): MACD, MACD_signal",
            },
            TestCase {
                // TC2: non-numeric column
                input: LensError::NonNumericColumns(vec!["Ticker".to_string()]),
                expected: "non-numeric column(s): Ticker",
            },
            TestCase {
                // TC3: length mismatch
                input: LensError::LengthMismatch {
                    column: "Close".to_string(),
                    expected: 3,
                    actual: 2,
                },
                expected: "column Close has 2 values but the index has 3",
            },
        ];

        for (index, test) in tests.into_iter().enumerate() {
            assert_eq!(test.input.to_string(), test.expected, "TC{} failed", index);
        }
    }

    #[test]
    fn test_lens_error_columns() {
        let error = LensError::MissingColumns(vec!["MACD".to_string(), "MACD_signal".to_string()]);
        assert_eq!(error.columns(), ["MACD", "MACD_signal"]);

        let error = LensError::from(std::io::Error::other("broken pipe"));
        assert!(error.columns().is_empty());
        assert_eq!(error.to_string(), "terminal error: broken pipe");
    }
}
