/// File selection source
///
/// Turns picked or dropped paths into `SourceImage` candidates, groups the
/// one-event-per-file drops coming from the window, and writes converted
/// files back to disk for the save-as flow.

use image::ImageFormat;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::convert::{ConvertError, Result};
use crate::state::data::{ConvertedImage, SourceImage, PNG_MIME};

/// MIME type declared for files with an unknown extension
const UNKNOWN_MIME: &str = "application/octet-stream";

/// Declare a MIME type from the file extension
pub fn declared_mime(path: &Path) -> &'static str {
    ImageFormat::from_path(path)
        .map(|format| format.to_mime_type())
        .unwrap_or(UNKNOWN_MIME)
}

/// Read one file into a source image
pub fn read_source(path: &Path) -> Result<SourceImage> {
    let bytes = std::fs::read(path)?;
    let name = path
        .file_name()
        .unwrap_or_default()
        .to_string_lossy()
        .to_string();

    Ok(SourceImage::new(name, declared_mime(path), bytes))
}

/// Load candidates for a selection
///
/// Runs on the blocking pool because it reads whole files.
pub async fn load_candidates(paths: Vec<PathBuf>) -> Result<Vec<SourceImage>> {
    tokio::task::spawn_blocking(move || load_candidates_blocking(&paths))
        .await
        .map_err(|e| ConvertError::Worker(e.to_string()))
}

/// Blocking implementation of candidate loading
///
/// Directories are expanded recursively in file-name order, keeping only
/// files with a png extension. Paths given directly are read whatever their
/// extension. Unreadable files are skipped.
pub fn load_candidates_blocking(paths: &[PathBuf]) -> Vec<SourceImage> {
    let mut candidates = Vec::new();

    for path in expand_paths(paths) {
        match read_source(&path) {
            Ok(source) => candidates.push(source),
            Err(e) => tracing::warn!("Skipping {}: {}", path.display(), e),
        }
    }

    tracing::debug!("Loaded {} candidate file(s)", candidates.len());
    candidates
}

fn expand_paths(paths: &[PathBuf]) -> Vec<PathBuf> {
    let mut files = Vec::new();

    for path in paths {
        if !path.is_dir() {
            files.push(path.clone());
            continue;
        }

        for entry in WalkDir::new(path)
            .follow_links(true)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
        {
            if !entry.file_type().is_file() {
                continue;
            }
            if declared_mime(entry.path()) != PNG_MIME {
                tracing::debug!("Skipping non-PNG {}", entry.path().display());
                continue;
            }
            files.push(entry.into_path());
        }
    }

    files
}

/// Write a converted image to the path picked in the save dialog
pub async fn save_converted(path: PathBuf, image: ConvertedImage) -> Result<PathBuf> {
    tokio::fs::write(&path, &image.bytes).await?;
    tracing::info!(
        "Saved {} as {} ({} bytes)",
        image.name,
        image.mime_type(),
        image.len()
    );
    tracing::debug!("Save target: {}", path.display());
    Ok(path)
}

/// Where the load of one dropped file lands in its drop group
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DropTicket {
    group: u64,
    slot: usize,
}

/// Groups the per-file drop events of one drag into one selection
///
/// The window reports a multi-file drop as one event per file. Each event
/// gets a slot in the current group and only its own path is loaded. Once
/// every slot is filled the whole group becomes the selection, in drop
/// order. A new hover or a cancel starts a new group; loads tagged with an
/// older group are ignored.
#[derive(Debug, Default)]
pub struct DropCollector {
    slots: Vec<Option<Vec<SourceImage>>>,
    group: u64,
    hovering: bool,
}

impl DropCollector {
    /// Files are hovering over the window
    pub fn hover(&mut self) {
        if !self.hovering {
            self.slots.clear();
            self.group += 1;
            self.hovering = true;
        }
    }

    /// Files left the window without being dropped
    pub fn cancel(&mut self) {
        self.slots.clear();
        self.group += 1;
        self.hovering = false;
    }

    pub fn is_hovering(&self) -> bool {
        self.hovering
    }

    /// Reserve a slot for a dropped file; the caller loads just that file
    pub fn drop_file(&mut self) -> DropTicket {
        self.slots.push(None);
        DropTicket {
            group: self.group,
            slot: self.slots.len() - 1,
        }
    }

    /// Store the load result for one dropped file
    ///
    /// Returns the selection for the whole group once no slot is pending.
    pub fn loaded(
        &mut self,
        ticket: DropTicket,
        result: Result<Vec<SourceImage>>,
    ) -> Option<Vec<SourceImage>> {
        if ticket.group != self.group {
            tracing::debug!("Ignoring load from an older drop");
            return None;
        }

        let candidates = result.unwrap_or_else(|e| {
            tracing::warn!("Dropped file failed to load: {}", e);
            Vec::new()
        });
        *self.slots.get_mut(ticket.slot)? = Some(candidates);

        if self.slots.iter().any(Option::is_none) {
            return None;
        }

        self.hovering = false;
        Some(self.slots.iter().flatten().flatten().cloned().collect())
    }
}
