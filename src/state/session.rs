/// Converter session state
///
/// Tracks the select / convert cycle, the current selection, the batch-wide
/// quality and the converted files of the last batch for download lookup.

use crate::convert::batch::BatchJob;
use crate::convert::{ConvertError, Quality, Result};
use super::data::{ConversionOutcome, ConvertedImage, SourceImage};

/// Where the converter is in its select / convert cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    /// Nothing selected yet
    #[default]
    Idle,
    /// PNG files selected, waiting for Convert
    Selecting,
    /// A batch is running
    Converting,
    /// Last batch finished; previews available
    Done,
}

/// The converter session: selection, quality and the last batch's results.
///
/// Owned by the application and handed to whoever needs to look up a
/// converted file for download.
#[derive(Debug, Default)]
pub struct Session {
    phase: Phase,
    selection: Vec<SourceImage>,
    quality: Quality,
    outcomes: Vec<ConversionOutcome>,
}

impl Session {
    pub fn new(quality: Quality) -> Self {
        Self {
            quality,
            ..Self::default()
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn selection(&self) -> &[SourceImage] {
        &self.selection
    }

    pub fn quality(&self) -> Quality {
        self.quality
    }

    /// Outcomes of the last finished batch, in input order
    pub fn outcomes(&self) -> &[ConversionOutcome] {
        &self.outcomes
    }

    pub fn is_converting(&self) -> bool {
        self.phase == Phase::Converting
    }

    /// Replace the selection with the PNG entries among `candidates`
    ///
    /// Returns the number of files kept. If nothing survives the filter the
    /// session is left exactly as it was.
    pub fn select(&mut self, candidates: Vec<SourceImage>) -> Result<usize> {
        if self.is_converting() {
            return Err(ConvertError::Busy);
        }

        let total = candidates.len();
        let pngs: Vec<SourceImage> = candidates.into_iter().filter(SourceImage::is_png).collect();
        if pngs.is_empty() {
            tracing::warn!("No PNG files among {} candidate(s)", total);
            return Err(ConvertError::NoInput);
        }

        if pngs.len() < total {
            tracing::info!("Ignored {} non-PNG file(s)", total - pngs.len());
        }

        self.selection = pngs;
        self.phase = Phase::Selecting;
        Ok(self.selection.len())
    }

    /// Update the batch-wide quality (read when the next batch starts)
    pub fn set_quality(&mut self, value: f32) -> Result<Quality> {
        self.quality = Quality::new(value)?;
        Ok(self.quality)
    }

    /// Enter the converting phase and snapshot the job to run
    pub fn begin_batch(&mut self) -> Result<BatchJob> {
        if self.is_converting() {
            return Err(ConvertError::Busy);
        }
        if self.selection.is_empty() {
            return Err(ConvertError::NoInput);
        }

        self.outcomes.clear();
        self.phase = Phase::Converting;

        Ok(BatchJob {
            sources: self.selection.clone(),
            quality: self.quality,
        })
    }

    /// Store one outcome as soon as its file finishes
    ///
    /// A converted name already taken in this batch gets a number
    /// ("a (1).jpg") so every card downloads its own file.
    pub fn record(&mut self, mut outcome: ConversionOutcome) -> &ConversionOutcome {
        if let ConversionOutcome::Converted { image, .. } = &mut outcome {
            image.name = self.unique_name(&image.name);
        }

        let index = self.outcomes.len();
        self.outcomes.push(outcome);
        &self.outcomes[index]
    }

    /// Leave the converting phase once every outcome is recorded
    pub fn finish_batch(&mut self) {
        self.phase = Phase::Done;
    }

    fn unique_name(&self, name: &str) -> String {
        let mut candidate = name.to_string();
        let mut n = 1;
        while self.converted(&candidate).is_some() {
            candidate = ConvertedImage::numbered_name(name, n);
            n += 1;
        }
        candidate
    }

    /// The batch worker died; go back to the selection
    pub fn abort_batch(&mut self, error: &ConvertError) {
        tracing::error!("Batch aborted: {}", error);
        self.phase = if self.selection.is_empty() {
            Phase::Idle
        } else {
            Phase::Selecting
        };
    }

    /// Find a converted image from the last batch by its derived name
    pub fn converted(&self, name: &str) -> Option<&ConvertedImage> {
        self.outcomes
            .iter()
            .filter_map(ConversionOutcome::converted)
            .find(|image| image.name == name)
    }
}
