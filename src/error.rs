use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("shape mismatch in {op}: expected {expected:?}, found {found:?}")]
    ShapeMismatch {
        op: &'static str,
        expected: (usize, usize),
        found: (usize, usize),
    },

    #[error("unsupported activation function: {0:?}")]
    UnsupportedActivation(String),

    #[error("index {index} out of range for {len} layers")]
    IndexOutOfRange { index: usize, len: usize },

    /// A layer was asked to run a step whose cached state does not exist yet,
    /// e.g. `backward` before any `forward`.
    #[error("missing cache: {0}")]
    MissingCache(&'static str),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("failed to parse {0}")]
    Parse(String),
}

impl Error {
    /// Whether the error is a caller mistake rather than a failure of the
    /// persistence layer.
    pub fn is_invalid_argument(&self) -> bool {
        matches!(
            self,
            Error::InvalidArgument(_)
                | Error::ShapeMismatch { .. }
                | Error::UnsupportedActivation(_)
                | Error::IndexOutOfRange { .. }
                | Error::MissingCache(_)
        )
    }

    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        Error::InvalidArgument(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn categorize_errors() {
        assert!(Error::invalid("epochs must be positive").is_invalid_argument());
        assert!(Error::IndexOutOfRange { index: 3, len: 1 }.is_invalid_argument());
        assert!(Error::MissingCache("no input").is_invalid_argument());

        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        assert!(!Error::from(io).is_invalid_argument());
    }

    #[test]
    fn display_shape_mismatch() {
        let err = Error::ShapeMismatch {
            op: "add",
            expected: (2, 2),
            found: (1, 3),
        };
        assert_eq!(
            "shape mismatch in add: expected (2, 2), found (1, 3)",
            err.to_string()
        );
    }
}
