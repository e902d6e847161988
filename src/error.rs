//! Error types for packtab edit operations.

use crate::format::DataFormat;

/// Result type alias for dataset operations.
pub type EditResult<T> = std::result::Result<T, EditError>;

/// Failure modes of dataset construction and structural edits.
///
/// All of these are expected, recoverable conditions: the operation that
/// reports one leaves the caller's dataset untouched.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EditError {
    /// A resulting breadth would fall outside the format's bounds.
    #[error("breadth {breadth} outside [{min}, {max}] for {format} data")]
    ShapeViolation {
        format: DataFormat,
        breadth: usize,
        min: usize,
        max: usize,
    },

    /// The selection is empty, out of range, or covers no existing samples.
    #[error("selection does not identify any editable cells")]
    UndefinedSelection,

    /// The selection shape has no well-defined copy semantics
    /// (e.g. a multi-raster, partial-column block of a jagged dataset).
    #[error("selection shape cannot be copied")]
    UnsupportedShape,

    /// Text-to-chunk conversion hit a non-numeric token.
    #[error("unparsable token '{token}' on line {line}")]
    ParseFailure { line: usize, token: String },

    /// The operation would grow the dataset past a configured cap.
    #[error("dataset would hold {cells} values, more than the {max} allowed")]
    CapacityExceeded { cells: usize, max: usize },

    /// Dataset id outside the allowed character set or length.
    #[error("invalid dataset id '{0}'")]
    InvalidId(String),

    /// Raw buffer length inconsistent with the declared shape.
    #[error("raw buffer holds {got} values, shape requires {expected}")]
    SizeMismatch { expected: usize, got: usize },

    /// A jagged length-prefix entry is not a usable sample count.
    #[error("row {row} declares an invalid sample count")]
    BadRowLength { row: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = EditError::ShapeViolation {
            format: DataFormat::Points,
            breadth: 1,
            min: 2,
            max: 6,
        };
        assert_eq!(err.to_string(), "breadth 1 outside [2, 6] for points data");

        let err = EditError::ParseFailure {
            line: 3,
            token: "abc".to_string(),
        };
        assert_eq!(err.to_string(), "unparsable token 'abc' on line 3");
    }
}
