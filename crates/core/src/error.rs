/// Result alias that carries the custom [`FormScoreError`] type.
pub type Result<T> = std::result::Result<T, FormScoreError>;

/// Common error type for the core crate.
///
/// The analysis path itself never fails: degenerate geometry, missing joints
/// and short sequences all resolve to default values. Errors only surface at
/// the boundaries where external data enters the engine (landmark intake,
/// configuration files, critique responses).
#[derive(Debug, thiserror::Error)]
pub enum FormScoreError {
    /// Free-form message for boundary failures without a dedicated variant.
    #[error("{0}")]
    Message(String),
    /// Input was well-formed JSON but violated an expectation of the engine.
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// Wrapper around standard IO errors.
    #[error("{0}")]
    Io(#[from] std::io::Error),
    /// Wrapper around JSON decoding and encoding errors.
    #[error("{0}")]
    Json(#[from] serde_json::Error),
}

impl FormScoreError {
    /// Creates a new error that simply wraps the provided message.
    pub fn msg<T: Into<String>>(msg: T) -> Self {
        Self::Message(msg.into())
    }

    pub fn invalid<T: Into<String>>(msg: T) -> Self {
        Self::InvalidInput(msg.into())
    }
}

impl From<&str> for FormScoreError {
    fn from(value: &str) -> Self {
        Self::msg(value)
    }
}

impl From<String> for FormScoreError {
    fn from(value: String) -> Self {
        Self::Message(value)
    }
}
