/// Conversion module
///
/// This module handles:
/// - Decoding PNG sources and flattening transparency onto white (jpeg.rs)
/// - Encoding the flattened raster as JPEG at a chosen quality (jpeg.rs)
/// - Running a whole selection with per-file failure isolation (batch.rs)
/// - The error type shared by the pipeline (error.rs)

pub mod batch;
pub mod error;
pub mod jpeg;

pub use error::{ConvertError, Result};
pub use jpeg::Quality;
