//! Error types shared by the parser, the pairing pipeline and the companion tools.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while reading peaks, pairing them or writing reports.
#[derive(Error, Debug)]
pub enum CwpairError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Parse error at line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("Unable to parse file \"{}\" at line {line}: {message}", path.display())]
    Malformed {
        path: PathBuf,
        line: usize,
        message: String,
    },

    #[error("Unable to read file \"{}\": {source}", path.display())]
    Input {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Mode requested on an empty frequency distribution")]
    EmptyDistribution,

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Plot error: {0}")]
    Plot(String),

    #[error("{0} input file(s) could not be processed")]
    FailedInputs(usize),
}

impl CwpairError {
    /// Attach the input path to a parse or read error.
    pub fn with_path(self, path: impl Into<PathBuf>) -> Self {
        match self {
            CwpairError::Io(source) => CwpairError::Input {
                path: path.into(),
                source,
            },
            CwpairError::Parse { line, message } => CwpairError::Malformed {
                path: path.into(),
                line,
                message,
            },
            other => other,
        }
    }
}

pub type Result<T> = std::result::Result<T, CwpairError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_path_promotes_parse_errors() {
        let err = CwpairError::Parse {
            line: 3,
            message: "Expected 9 fields, got 4".to_string(),
        }
        .with_path("peaks.gff");

        let text = err.to_string();
        assert!(text.contains("peaks.gff"));
        assert!(text.contains("line 3"));
        assert!(matches!(err, CwpairError::Malformed { line: 3, .. }));
    }

    #[test]
    fn test_with_path_promotes_io_errors() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "No such file or directory");
        let err = CwpairError::from(io_err).with_path("missing.gff");

        assert!(matches!(err, CwpairError::Input { .. }));
        let text = err.to_string();
        assert!(text.contains("missing.gff"));
        assert!(text.contains("No such file or directory"));
    }

    #[test]
    fn test_with_path_keeps_other_errors() {
        let err = CwpairError::EmptyDistribution.with_path("peaks.gff");
        assert!(matches!(err, CwpairError::EmptyDistribution));
    }
}
