/// User interface widgets
///
/// - Drop zone / file chooser (upload.rs)
/// - Before/after preview cards and size formatting (preview.rs)

pub mod preview;
pub mod upload;

pub use preview::PreviewCard;
pub use upload::upload_area;
