/// Convenience result type used across the crate.
pub type RibbonResult<T> = Result<T, RibbonError>;

/// Top-level error taxonomy used by preview and export APIs.
#[derive(thiserror::Error, Debug)]
pub enum RibbonError {
    /// Invalid user-provided parameters or configuration.
    #[error("validation error: {0}")]
    Validation(String),

    /// Reading a source image from disk failed.
    #[error("ingest error: {0}")]
    Ingest(String),

    /// Source image bytes could not be decoded into pixels.
    #[error("decode error: {0}")]
    Decode(String),

    /// Network exchange with the render service failed before a status arrived,
    /// or the response could not be materialized.
    #[error("transport error: {0}")]
    Transport(String),

    /// Render service answered with a non-success status.
    #[error("service rejected export with status {status}")]
    Rejected {
        /// HTTP status code returned by the service.
        status: u16,
    },

    /// The local `ffmpeg` process used for preview videos could not be started,
    /// stopped accepting frames, or exited unsuccessfully.
    #[error("encode error: {0}")]
    Encode(String),

    /// Errors when serializing or deserializing data structures.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl RibbonError {
    /// Build a [`RibbonError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`RibbonError::Ingest`] value.
    pub fn ingest(msg: impl Into<String>) -> Self {
        Self::Ingest(msg.into())
    }

    /// Build a [`RibbonError::Decode`] value.
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    /// Build a [`RibbonError::Transport`] value.
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    /// Build a [`RibbonError::Encode`] value.
    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode(msg.into())
    }

    /// Build a [`RibbonError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

impl From<reqwest::Error> for RibbonError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Transport(format!("request timed out: {err}"))
        } else if err.is_connect() {
            Self::Transport(format!("connection failed: {err}"))
        } else {
            Self::Transport(err.to_string())
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
