use thiserror::Error;

/// Simulation error.
#[allow(missing_docs)]
#[derive(Debug, Error)]
pub enum SimError {
    #[error("probe `{0}` is already declared")]
    DuplicateProbe(String),
    #[error("probe `{0}` is not declared")]
    UnknownProbe(String),
    #[error("probe `{name}` is {expected} bits wide, but {actual} bits were sampled")]
    WidthMismatch { name: String, expected: usize, actual: usize },
    #[error("condition was not met within {0} cycles")]
    Timeout(u64),
    #[error("file error")]
    Io(#[from] std::io::Error),
}
