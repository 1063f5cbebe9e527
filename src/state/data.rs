/// Shared data structures for the conversion pipeline
///
/// These structs represent the data model that flows between
/// the file selection layer, the converter and the preview UI.

use bytes::Bytes;
use std::fmt;
use std::path::Path;

use crate::convert::ConvertError;

/// MIME type accepted as conversion input
pub const PNG_MIME: &str = "image/png";

/// MIME type of every converted image
pub const JPEG_MIME: &str = "image/jpeg";

/// A selected input file
///
/// Immutable once built; cloning only bumps a reference count on the bytes.
#[derive(Clone, PartialEq)]
pub struct SourceImage {
    /// Display name (e.g., "logo.png")
    pub name: String,
    /// MIME type declared by the selection source
    pub mime_type: String,
    /// Encoded file contents
    pub bytes: Bytes,
}

impl SourceImage {
    pub fn new(name: impl Into<String>, mime_type: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            bytes: bytes.into(),
        }
    }

    /// Size of the encoded source in bytes
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_png(&self) -> bool {
        self.mime_type == PNG_MIME
    }
}

// Skip the byte dump in debug output
impl fmt::Debug for SourceImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SourceImage")
            .field("name", &self.name)
            .field("mime_type", &self.mime_type)
            .field("len", &self.len())
            .finish()
    }
}

/// A successfully converted JPEG
#[derive(Clone, PartialEq)]
pub struct ConvertedImage {
    /// Derived from the source name with the extension swapped to .jpg
    pub name: String,
    /// Encoded JPEG contents
    pub bytes: Bytes,
}

impl ConvertedImage {
    pub fn new(source_name: &str, bytes: impl Into<Bytes>) -> Self {
        Self {
            name: Self::name_for(source_name),
            bytes: bytes.into(),
        }
    }

    /// Derive the output file name from a source name
    ///
    /// "photo.PNG" becomes "photo.jpg"; names without a png extension
    /// get ".jpg" appended.
    pub fn name_for(source_name: &str) -> String {
        let path = Path::new(source_name);
        let is_png = path
            .extension()
            .map(|ext| ext.eq_ignore_ascii_case("png"))
            .unwrap_or(false);

        if is_png {
            path.with_extension("jpg").to_string_lossy().to_string()
        } else {
            format!("{}.jpg", source_name)
        }
    }

    /// Number a name to tell duplicates apart: "a.jpg" becomes "a (1).jpg"
    pub fn numbered_name(name: &str, n: usize) -> String {
        let path = Path::new(name);
        match (path.file_stem(), path.extension()) {
            (Some(stem), Some(ext)) => format!(
                "{} ({}).{}",
                stem.to_string_lossy(),
                n,
                ext.to_string_lossy()
            ),
            _ => format!("{} ({})", name, n),
        }
    }

    pub fn mime_type(&self) -> &'static str {
        JPEG_MIME
    }

    /// Size of the encoded JPEG in bytes
    pub fn len(&self) -> usize {
        self.bytes.len()
    }
}

impl fmt::Debug for ConvertedImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConvertedImage")
            .field("name", &self.name)
            .field("len", &self.len())
            .finish()
    }
}

/// A file that could not be converted
#[derive(Debug, Clone, PartialEq)]
pub struct FailureRecord {
    pub source: SourceImage,
    pub error: ConvertError,
}

impl FailureRecord {
    /// Human-readable error text for the preview card
    pub fn description(&self) -> String {
        self.error.to_string()
    }
}

/// Per-file result of one conversion attempt
#[derive(Debug, Clone, PartialEq)]
pub enum ConversionOutcome {
    Converted {
        source: SourceImage,
        image: ConvertedImage,
    },
    Failed(FailureRecord),
}

impl ConversionOutcome {
    pub fn source(&self) -> &SourceImage {
        match self {
            ConversionOutcome::Converted { source, .. } => source,
            ConversionOutcome::Failed(failure) => &failure.source,
        }
    }

    pub fn converted(&self) -> Option<&ConvertedImage> {
        match self {
            ConversionOutcome::Converted { image, .. } => Some(image),
            ConversionOutcome::Failed(_) => None,
        }
    }

    pub fn is_success(&self) -> bool {
        self.converted().is_some()
    }
}
