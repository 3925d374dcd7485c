use std::io;

/// Error produced by every fallible operation in this crate.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// No image writer is registered for the destination extension.
    #[error("no image writer registered for extension {extension:?}")]
    UnsupportedFormat { extension: String },

    /// The source could not be read or its format was not recognized.
    #[error("failed to decode {source_hint}: {detail}")]
    Decode { source_hint: String, detail: String },

    /// A caller-supplied value is out of range or unknown.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// Encoding or writing the destination failed.
    #[error("failed to save {target}")]
    SaveFailed {
        target: String,
        #[source]
        source: EncodeError,
    },

    /// The viewer window could not be created or updated.
    #[error("display failed: {detail}")]
    Display { detail: String },
}

/// Underlying cause of [`Error::SaveFailed`].
#[derive(Debug, thiserror::Error)]
pub enum EncodeError {
    #[error(transparent)]
    Io(#[from] io::Error),

    #[error(transparent)]
    Image(#[from] image::ImageError),

    #[error("jpeg encoder: {0}")]
    Jpeg(#[from] jpeg_encoder::EncodingError),

    #[error("{0}")]
    Unsupported(String),
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub(crate) fn invalid_param(msg: impl Into<String>) -> Self {
        Self::InvalidParameter(msg.into())
    }

    pub(crate) fn decode(source_hint: impl Into<String>, detail: impl ToString) -> Self {
        Self::Decode {
            source_hint: source_hint.into(),
            detail: detail.to_string(),
        }
    }

    pub(crate) fn save_failed(target: impl Into<String>, source: impl Into<EncodeError>) -> Self {
        Self::SaveFailed {
            target: target.into(),
            source: source.into(),
        }
    }
}
