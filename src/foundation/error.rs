/// Convenience result type used across avatar-gif.
pub type AvatarGifResult<T> = Result<T, AvatarGifError>;

/// Top-level error taxonomy surfaced to callers of the pipeline.
///
/// Every failure is terminal for the request. The HTTP layer maps [`AvatarGifError::kind`] to a
/// response code; none of these are ever folded into a successful (empty) result.
#[derive(thiserror::Error, Debug)]
pub enum AvatarGifError {
    /// Missing or out-of-range request fields, or invalid configuration.
    #[error("validation error: {0}")]
    Validation(String),

    /// Unknown source name, or no position table for it.
    #[error("source not found: {0}")]
    SourceNotFound(String),

    /// Malformed source GIF or avatar image bytes.
    #[error("decode error: {0}")]
    Decode(String),

    /// Output assembly failure, including external codec process failures.
    #[error("encode error: {0}")]
    Encode(String),

    /// Unexpected failure (I/O, resource exhaustion, broken internal invariant).
    #[error("internal error: {0:#}")]
    Internal(#[from] anyhow::Error),
}

impl AvatarGifError {
    /// Build a [`AvatarGifError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`AvatarGifError::SourceNotFound`] value.
    pub fn source_not_found(name: impl Into<String>) -> Self {
        Self::SourceNotFound(name.into())
    }

    /// Build a [`AvatarGifError::Decode`] value.
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    /// Build a [`AvatarGifError::Encode`] value.
    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode(msg.into())
    }

    /// Build a [`AvatarGifError::Internal`] value from a plain message.
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(anyhow::anyhow!(msg.into()))
    }

    /// Stable machine-readable kind, for mapping to response codes.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation",
            Self::SourceNotFound(_) => "source_not_found",
            Self::Decode(_) => "decode",
            Self::Encode(_) => "encode",
            Self::Internal(_) => "internal",
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
