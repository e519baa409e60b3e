//! Errors raised by the training and prediction commands.

use thiserror::Error;

/// Convenience alias for command results.
pub type Result<T, E = PipelineError> = std::result::Result<T, E>;

/// Everything that can stop a command.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Feature assembly, fitting or model file failure.
    #[error(transparent)]
    Model(#[from] parcel_price::Error),
    /// Malformed CSV input or failed CSV output.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    /// File system failure outside the model file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// A cell or column that the command cannot interpret.
    #[error("{path}: {message}")]
    Data {
        /// File the bad data came from.
        path: String,
        /// What was wrong.
        message: String,
    },
}

impl PipelineError {
    pub(crate) fn data(path: impl AsRef<std::path::Path>, message: impl Into<String>) -> Self {
        PipelineError::Data {
            path: path.as_ref().display().to_string(),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_error_is_transparent() {
        let err: PipelineError = parcel_price::Error::EmptyData("no rows".to_string()).into();
        assert_eq!(err.to_string(), "empty data: no rows");
    }

    #[test]
    fn test_data_error_names_file() {
        let err = PipelineError::data("train.csv", "row 3: bad number");
        assert_eq!(err.to_string(), "train.csv: row 3: bad number");
    }
}
