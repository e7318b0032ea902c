//! Error types for aggregation.

use thiserror::Error;

/// Errors that can occur while deriving series from a dataset.
#[derive(Debug, Error)]
pub enum AggregateError {
    /// Requested column is absent from the dataset's column set.
    #[error("column '{column}' not found in dataset")]
    ColumnNotFound { column: String },

    /// Period derivation was asked of a column that does not hold dates.
    #[error("column '{column}' is not a date column")]
    NotADateColumn { column: String },
}

/// Result type for aggregation operations.
pub type Result<T> = std::result::Result<T, AggregateError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = AggregateError::ColumnNotFound {
            column: "profit".to_string(),
        };
        assert_eq!(err.to_string(), "column 'profit' not found in dataset");
    }
}
