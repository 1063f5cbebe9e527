/// Batch orchestration
///
/// Converts a selection one file at a time. A failing file is recorded in
/// its own outcome and never stops the rest of the batch.

use futures::channel::mpsc;
use futures::stream::{self, Stream, StreamExt};

use super::error::{ConvertError, Result};
use super::jpeg::{ConversionRequest, Quality};
use crate::state::data::{ConversionOutcome, FailureRecord, SourceImage};

/// Progress signals emitted while a batch runs
#[derive(Debug, Clone, PartialEq)]
pub enum BatchEvent {
    /// Conversion in progress
    Started { total: usize },
    /// One file done (either way)
    ItemFinished {
        index: usize,
        outcome: ConversionOutcome,
    },
    /// Conversion complete, regardless of failures
    Finished { converted: usize, failed: usize },
}

/// What the UI receives while a batch runs
#[derive(Debug, Clone)]
pub enum BatchUpdate {
    /// One file finished; arrives in input order
    Item {
        index: usize,
        outcome: ConversionOutcome,
    },
    /// Batch over: number of outcomes sent, or the worker failure
    Finished(Result<usize>),
}

/// Snapshot of everything a batch needs, taken at batch start
#[derive(Debug, Clone)]
pub struct BatchJob {
    pub sources: Vec<SourceImage>,
    pub quality: Quality,
}

/// Convert every source in order, producing exactly one outcome per input
///
/// An empty selection is rejected before any event is emitted.
pub fn convert_batch<F>(
    sources: &[SourceImage],
    quality: Quality,
    mut on_event: F,
) -> Result<Vec<ConversionOutcome>>
where
    F: FnMut(BatchEvent),
{
    if sources.is_empty() {
        return Err(ConvertError::NoInput);
    }

    on_event(BatchEvent::Started {
        total: sources.len(),
    });

    let mut outcomes = Vec::with_capacity(sources.len());
    let mut failed = 0;

    for (index, source) in sources.iter().enumerate() {
        let request = ConversionRequest::new(source.clone(), quality);
        let outcome = match request.convert() {
            Ok(image) => ConversionOutcome::Converted {
                source: request.source,
                image,
            },
            Err(error) => {
                failed += 1;
                ConversionOutcome::Failed(FailureRecord {
                    source: request.source,
                    error,
                })
            }
        };

        on_event(BatchEvent::ItemFinished {
            index,
            outcome: outcome.clone(),
        });
        outcomes.push(outcome);
    }

    on_event(BatchEvent::Finished {
        converted: outcomes.len() - failed,
        failed,
    });

    Ok(outcomes)
}

/// Run a batch on the blocking pool, streaming each outcome as it finishes
///
/// Every `Item` is sent before the single closing `Finished`.
pub fn stream_batch(job: BatchJob) -> impl Stream<Item = BatchUpdate> {
    stream::once(async move {
        let (tx, rx) = mpsc::unbounded();
        let items = tx.clone();

        tokio::spawn(async move {
            let result = tokio::task::spawn_blocking(move || {
                convert_batch(&job.sources, job.quality, |event| {
                    log_event(&event);
                    if let BatchEvent::ItemFinished { index, outcome } = event {
                        // Receiver gone means nobody is listening any more
                        let _ = items.unbounded_send(BatchUpdate::Item { index, outcome });
                    }
                })
            })
            .await
            .map_err(|e| ConvertError::Worker(e.to_string()))
            .and_then(|outcomes| outcomes.map(|o| o.len()));

            let _ = tx.unbounded_send(BatchUpdate::Finished(result));
        });

        rx
    })
    .flatten()
}

fn log_event(event: &BatchEvent) {
    match event {
        BatchEvent::Started { total } => {
            tracing::info!("Converting {} file(s)", total);
        }
        BatchEvent::ItemFinished { index, outcome } => {
            let name = &outcome.source().name;
            if outcome.is_success() {
                tracing::debug!("[{}] {} converted", index + 1, name);
            } else {
                tracing::warn!("[{}] {} failed", index + 1, name);
            }
        }
        BatchEvent::Finished { converted, failed } => {
            tracing::info!("Batch complete: {} converted, {} failed", converted, failed);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::convert::jpeg::tests::textured_png;
    use crate::state::data::PNG_MIME;

    fn png(name: &str) -> SourceImage {
        SourceImage::new(name, PNG_MIME, textured_png(16, 16))
    }

    fn bogus(name: &str) -> SourceImage {
        SourceImage::new(name, PNG_MIME, b"renamed text file".to_vec())
    }

    #[test]
    fn test_one_outcome_per_input_in_order() {
        let sources = vec![png("a.png"), bogus("b.png"), png("c.png")];
        let outcomes = convert_batch(&sources, Quality::default(), |_| {}).unwrap();

        assert_eq!(outcomes.len(), sources.len());
        for (outcome, source) in outcomes.iter().zip(&sources) {
            assert_eq!(outcome.source().name, source.name);
        }
    }

    #[test]
    fn test_failure_does_not_stop_batch() {
        let sources = vec![bogus("first.png"), png("second.png")];
        let outcomes = convert_batch(&sources, Quality::default(), |_| {}).unwrap();

        match &outcomes[0] {
            ConversionOutcome::Failed(failure) => {
                assert!(matches!(failure.error, ConvertError::Decode(_)));
                assert!(failure.description().starts_with("Failed to load image"));
            }
            other => panic!("expected failure, got {:?}", other),
        }
        assert_eq!(
            outcomes[1].converted().map(|i| i.name.as_str()),
            Some("second.jpg")
        );
    }

    #[test]
    fn test_events_bracket_the_batch() {
        let sources = vec![png("a.png"), bogus("b.png")];
        let mut events = Vec::new();
        convert_batch(&sources, Quality::default(), |e| events.push(e)).unwrap();

        assert_eq!(events.first(), Some(&BatchEvent::Started { total: 2 }));
        assert_eq!(
            events.last(),
            Some(&BatchEvent::Finished {
                converted: 1,
                failed: 1
            })
        );
        match &events[2] {
            BatchEvent::ItemFinished { index, outcome } => {
                assert_eq!(*index, 1);
                assert_eq!(outcome.source().name, "b.png");
                assert!(!outcome.is_success());
            }
            other => panic!("expected item event, got {:?}", other),
        }
    }

    #[test]
    fn test_all_failures_still_finish() {
        let sources = vec![bogus("x.png"), bogus("y.png")];
        let mut finished = false;
        let outcomes = convert_batch(&sources, Quality::default(), |e| {
            if let BatchEvent::Finished { converted, failed } = e {
                assert_eq!((converted, failed), (0, 2));
                finished = true;
            }
        })
        .unwrap();

        assert!(finished);
        assert!(outcomes.iter().all(|o| !o.is_success()));
    }

    #[test]
    fn test_empty_batch_rejected_without_events() {
        let mut events = Vec::new();
        let result = convert_batch(&[], Quality::default(), |e| events.push(e));

        assert_eq!(result, Err(ConvertError::NoInput));
        assert!(events.is_empty());
    }

    #[tokio::test]
    async fn test_stream_delivers_items_in_order_then_finishes() {
        let job = BatchJob {
            sources: vec![png("a.png"), bogus("b.png"), png("c.png")],
            quality: Quality::new(0.5).unwrap(),
        };
        let updates: Vec<BatchUpdate> = stream_batch(job).collect().await;

        assert_eq!(updates.len(), 4);
        for (position, update) in updates[..3].iter().enumerate() {
            match update {
                BatchUpdate::Item { index, outcome } => {
                    assert_eq!(*index, position);
                    assert_eq!(outcome.is_success(), position != 1);
                }
                other => panic!("expected item, got {:?}", other),
            }
        }
        assert!(matches!(updates[3], BatchUpdate::Finished(Ok(3))));
    }

    #[tokio::test]
    async fn test_stream_reports_empty_job() {
        let job = BatchJob {
            sources: Vec::new(),
            quality: Quality::default(),
        };
        let updates: Vec<BatchUpdate> = stream_batch(job).collect().await;

        assert_eq!(updates.len(), 1);
        assert!(matches!(
            updates[0],
            BatchUpdate::Finished(Err(ConvertError::NoInput))
        ));
    }
}
