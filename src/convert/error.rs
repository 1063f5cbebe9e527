/// Error types for the conversion pipeline

use thiserror::Error;

/// Result type alias for conversion operations
pub type Result<T> = std::result::Result<T, ConvertError>;

/// Errors that can occur while selecting, converting or saving images
///
/// Variants carry plain descriptions so the error can be cloned into
/// UI messages and stored inside a failure record.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConvertError {
    /// Source bytes are not a decodable raster image
    #[error("Failed to load image: {0}")]
    Decode(String),

    /// The JPEG encoder produced no output
    #[error("Failed to convert image: {0}")]
    Encode(String),

    /// Empty selection, or nothing left after the PNG filter
    #[error("Please select PNG files only.")]
    NoInput,

    /// Quality value that cannot be clamped (NaN or infinite)
    #[error("Invalid quality value: {0}")]
    InvalidQuality(f32),

    /// A batch is already running
    #[error("A conversion is already in progress")]
    Busy,

    /// Reading a source or writing a converted file failed
    #[error("I/O error: {0}")]
    Io(String),

    /// The background conversion task died
    #[error("Conversion worker failed: {0}")]
    Worker(String),
}

impl From<std::io::Error> for ConvertError {
    fn from(err: std::io::Error) -> Self {
        ConvertError::Io(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_input_message_is_user_facing() {
        assert_eq!(ConvertError::NoInput.to_string(), "Please select PNG files only.");
    }

    #[test]
    fn test_io_conversion() {
        let err: ConvertError = std::io::Error::new(std::io::ErrorKind::NotFound, "gone").into();
        assert!(matches!(err, ConvertError::Io(ref msg) if msg.contains("gone")));
    }
}
