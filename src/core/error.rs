//! Error types for the wind overlay

use thiserror::Error;

/// Main error type for the crate.
///
/// Out-of-bounds queries are not errors: point and pixel lookups return
/// `Option` and the caller decides what "no data" means.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("No host map attached to the viewport sync")]
    MissingHostMap,

    #[error("Failed to load timestep {timestep}: {reason}")]
    AssetLoad { timestep: String, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Shorthand for an [`Error::InvalidConfig`] with a formatted message.
    pub fn config(msg: impl Into<String>) -> Self {
        Error::InvalidConfig(msg.into())
    }

    /// Wrap any displayable failure as an asset load error for `timestep`.
    pub fn asset(timestep: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        Error::AssetLoad {
            timestep: timestep.into(),
            reason: reason.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_asset_error_message() {
        let err = Error::asset("2016112006", "HTTP 404");
        assert_eq!(err.to_string(), "Failed to load timestep 2016112006: HTTP 404");
    }

    #[test]
    fn test_io_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: Error = io.into();
        assert!(matches!(err, Error::Io(_)));
    }
}
