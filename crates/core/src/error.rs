/// Result alias that carries the custom [`GestureFxError`] type.
pub type Result<T> = std::result::Result<T, GestureFxError>;

/// Common error type for the core crate.
///
/// The per-tick simulation never produces one of these: missing hands, short
/// trails and empty pools are all modelled as absent values. Errors only come
/// from the outer boundaries (configuration files, landmark recordings and
/// renderers).
#[derive(Debug, thiserror::Error)]
pub enum GestureFxError {
    /// Free-form message surfaced by a boundary component such as a renderer.
    #[error("{0}")]
    Message(String),
    /// A configuration or input value failed validation.
    #[error("invalid input: {0}")]
    InvalidInput(&'static str),
    /// Wrapper around standard IO errors.
    #[error("{0}")]
    Io(#[from] std::io::Error),
    /// Malformed configuration or landmark recording.
    #[error("malformed json: {0}")]
    Json(#[from] serde_json::Error),
}

impl GestureFxError {
    /// Creates a new error that simply wraps the provided message.
    pub fn msg<T: Into<String>>(msg: T) -> Self {
        Self::Message(msg.into())
    }
}

impl From<&str> for GestureFxError {
    fn from(value: &str) -> Self {
        Self::msg(value)
    }
}

impl From<String> for GestureFxError {
    fn from(value: String) -> Self {
        Self::Message(value)
    }
}
