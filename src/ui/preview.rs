/// Before/after preview cards
///
/// One card per conversion outcome: image comparison, sizes, compression
/// and a download action on success; the error on failure.
use iced::widget::image::Handle;
use iced::widget::{button, column, container, row, text, Image};
use iced::{Alignment, Element, Length};

use crate::state::data::ConversionOutcome;
use crate::Message;

const PREVIEW_WIDTH: f32 = 280.0;
const PREVIEW_HEIGHT: f32 = 200.0;

const SIZE_UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];

/// Percentage saved by the conversion, rounded half up
///
/// 1000 -> 400 bytes reports 60. Negative when the JPEG is larger.
pub fn compression_percent(source_len: usize, converted_len: usize) -> i64 {
    if source_len == 0 {
        return 0;
    }
    let ratio = 1.0 - converted_len as f64 / source_len as f64;
    (ratio * 100.0 + 0.5).floor() as i64
}

pub fn compression_label(percent: i64) -> String {
    if percent > 0 {
        format!("{}% smaller", percent)
    } else {
        "Size optimized".to_string()
    }
}

/// Human-readable size, e.g. "1.5 KB"
pub fn format_file_size(bytes: usize) -> String {
    if bytes == 0 {
        return "0 Bytes".to_string();
    }

    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < SIZE_UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    // Two decimals at most, trailing zeros dropped
    let rounded = (value * 100.0).round() / 100.0;
    format!("{} {}", rounded, SIZE_UNITS[unit])
}

/// Everything the UI shows for one outcome
#[derive(Debug, Clone)]
pub enum PreviewCard {
    Converted {
        source_name: String,
        converted_name: String,
        source_size: usize,
        converted_size: usize,
        compression: i64,
        before: Handle,
        after: Handle,
    },
    Failed {
        source_name: String,
        message: String,
    },
}

impl PreviewCard {
    pub fn from_outcome(outcome: &ConversionOutcome) -> Self {
        match outcome {
            ConversionOutcome::Converted { source, image } => PreviewCard::Converted {
                source_name: source.name.clone(),
                converted_name: image.name.clone(),
                source_size: source.len(),
                converted_size: image.len(),
                compression: compression_percent(source.len(), image.len()),
                before: Handle::from_bytes(source.bytes.clone()),
                after: Handle::from_bytes(image.bytes.clone()),
            },
            ConversionOutcome::Failed(failure) => PreviewCard::Failed {
                source_name: failure.source.name.clone(),
                message: failure.description(),
            },
        }
    }

    pub fn view(&self) -> Element<'_, Message> {
        let content = match self {
            PreviewCard::Converted {
                source_name,
                converted_name,
                source_size,
                converted_size,
                compression,
                before,
                after,
            } => {
                let comparison = row![
                    image_panel(before, format!("PNG - {}", format_file_size(*source_size))),
                    image_panel(after, format!("JPG - {}", format_file_size(*converted_size))),
                ]
                .spacing(20);

                column![
                    text(format!("{} → {}", source_name, converted_name)).size(18),
                    comparison,
                    text(compression_label(*compression)).style(text::success),
                    button("Download JPG")
                        .on_press(Message::Download(converted_name.clone()))
                        .padding(10),
                ]
                .spacing(12)
                .align_x(Alignment::Center)
            }
            PreviewCard::Failed {
                source_name,
                message,
            } => column![
                text(source_name).size(18).style(text::danger),
                text(format!("❌ Error: {}", message)).style(text::danger),
            ]
            .spacing(8)
            .align_x(Alignment::Center),
        };

        container(content)
            .padding(16)
            .width(Length::Fill)
            .style(container::rounded_box)
            .into()
    }
}

fn image_panel<'a>(handle: &Handle, caption: String) -> Element<'a, Message> {
    column![
        Image::<Handle>::new(handle.clone())
            .width(Length::Fixed(PREVIEW_WIDTH))
            .height(Length::Fixed(PREVIEW_HEIGHT)),
        text(caption).size(14),
    ]
    .spacing(6)
    .align_x(Alignment::Center)
    .into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::convert::ConvertError;
    use crate::state::data::{ConvertedImage, FailureRecord, SourceImage, PNG_MIME};

    #[test]
    fn test_compression_percent() {
        assert_eq!(compression_percent(1000, 400), 60);
        assert_eq!(compression_percent(1000, 1000), 0);
        assert_eq!(compression_percent(1000, 1500), -50);
        assert_eq!(compression_percent(3, 2), 33);
        assert_eq!(compression_percent(0, 10), 0);
    }

    #[test]
    fn test_compression_rounds_half_up() {
        // 1 - 1005/1000 = -0.5% -> rounds up to 0 like Math.round
        assert_eq!(compression_percent(1000, 1005), 0);
        assert_eq!(compression_percent(1000, 995), 1);
    }

    #[test]
    fn test_compression_label() {
        assert_eq!(compression_label(60), "60% smaller");
        assert_eq!(compression_label(0), "Size optimized");
        assert_eq!(compression_label(-12), "Size optimized");
    }

    #[test]
    fn test_format_file_size() {
        assert_eq!(format_file_size(0), "0 Bytes");
        assert_eq!(format_file_size(500), "500 Bytes");
        assert_eq!(format_file_size(1024), "1 KB");
        assert_eq!(format_file_size(1536), "1.5 KB");
        assert_eq!(format_file_size(1_048_576), "1 MB");
        assert_eq!(format_file_size(5 * 1024 * 1024 * 1024), "5 GB");
    }

    #[test]
    fn test_format_file_size_caps_at_gb() {
        assert_eq!(format_file_size(2048 * 1024 * 1024 * 1024), "2048 GB");
    }

    #[test]
    fn test_card_for_success() {
        let source = SourceImage::new("a.png", PNG_MIME, vec![0u8; 1000]);
        let outcome = ConversionOutcome::Converted {
            source,
            image: ConvertedImage::new("a.png", vec![0u8; 400]),
        };

        match PreviewCard::from_outcome(&outcome) {
            PreviewCard::Converted {
                converted_name,
                source_size,
                converted_size,
                compression,
                ..
            } => {
                assert_eq!(converted_name, "a.jpg");
                assert_eq!((source_size, converted_size), (1000, 400));
                assert_eq!(compression, 60);
            }
            other => panic!("expected converted card, got {:?}", other),
        }
    }

    #[test]
    fn test_card_for_failure() {
        let outcome = ConversionOutcome::Failed(FailureRecord {
            source: SourceImage::new("bad.png", PNG_MIME, b"txt".to_vec()),
            error: ConvertError::Decode("unsupported format".to_string()),
        });

        let card = PreviewCard::from_outcome(&outcome);
        match card {
            PreviewCard::Failed {
                source_name,
                message,
            } => {
                assert_eq!(source_name, "bad.png");
                assert_eq!(message, "Failed to load image: unsupported format");
            }
            other => panic!("expected failure card, got {:?}", other),
        }
    }
}
