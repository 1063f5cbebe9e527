use iced::widget::{button, column, container, row, scrollable, slider, text, Column};
use iced::{event, window, Alignment, Element, Event, Length, Subscription, Task, Theme};
use rfd::{FileDialog, MessageButtons, MessageDialog, MessageLevel};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod convert;
mod files;
mod state;
mod ui;

use convert::batch::{stream_batch, BatchUpdate};
use convert::ConvertError;
use files::{DropCollector, DropTicket};
use state::data::SourceImage;
use state::session::{Phase, Session};
use state::settings::Settings;
use ui::PreviewCard;

/// Log filter used when RUST_LOG is not set
const DEFAULT_LOG_FILTER: &str = "png2jpg=info";

/// Main application state
struct Png2Jpg {
    /// Selection, quality and last batch results
    session: Session,
    /// Groups per-file window drop events into one selection
    drops: DropCollector,
    /// One card per outcome of the last batch, added as each file finishes
    previews: Vec<PreviewCard>,
    /// Status message to display to the user
    status: String,
    theme: Theme,
}

/// Application messages (events)
#[derive(Debug, Clone)]
pub enum Message {
    /// User clicked the drop zone / "Choose Files"
    ChooseFiles,
    /// Picked files finished loading from disk
    FilesLoaded(Result<Vec<SourceImage>, ConvertError>),
    /// Files are being dragged over the window
    FileHovered,
    /// Dragged files left the window
    FilesHoveredLeft,
    /// One file of a drop landed on the window
    FileDropped(PathBuf),
    /// One dropped file finished loading
    DropLoaded(DropTicket, Result<Vec<SourceImage>, ConvertError>),
    /// Quality slider moved
    QualityChanged(f32),
    /// User clicked "Convert to JPG"
    Convert,
    /// Background batch reported a finished file or its own end
    BatchProgress(BatchUpdate),
    /// User clicked "Download JPG" on a preview card
    Download(String),
    /// Save-as write finished
    Saved(Result<PathBuf, ConvertError>),
}

impl Png2Jpg {
    /// Create a new instance of the application
    fn new() -> (Self, Task<Message>) {
        let settings = Settings::load();
        let quality = settings.quality();

        tracing::info!("PNG to JPG converter started (quality {}%)", quality.percent());

        let theme = if settings.dark_theme {
            Theme::Dark
        } else {
            Theme::Light
        };

        (
            Png2Jpg {
                session: Session::new(quality),
                drops: DropCollector::default(),
                previews: Vec::new(),
                status: "Select PNG files to get started.".to_string(),
                theme,
            },
            Task::none(),
        )
    }

    /// Handle application messages and update state
    fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::ChooseFiles => {
                if self.session.is_converting() {
                    return Task::none();
                }

                let picked = FileDialog::new()
                    .set_title("Select PNG Images")
                    .add_filter("PNG images", &["png"])
                    .pick_files();

                match picked {
                    Some(paths) => Task::perform(files::load_candidates(paths), Message::FilesLoaded),
                    None => Task::none(),
                }
            }
            Message::FilesLoaded(result) => {
                self.apply_selection(result);
                Task::none()
            }
            Message::FileHovered => {
                self.drops.hover();
                Task::none()
            }
            Message::FilesHoveredLeft => {
                self.drops.cancel();
                Task::none()
            }
            Message::FileDropped(path) => {
                if self.session.is_converting() {
                    self.drops.cancel();
                    return Task::none();
                }

                let ticket = self.drops.drop_file();
                Task::perform(files::load_candidates(vec![path]), move |result| {
                    Message::DropLoaded(ticket, result)
                })
            }
            Message::DropLoaded(ticket, result) => {
                if let Some(candidates) = self.drops.loaded(ticket, result) {
                    self.apply_selection(Ok(candidates));
                }
                Task::none()
            }
            Message::QualityChanged(value) => {
                if let Err(e) = self.session.set_quality(value) {
                    self.status = e.to_string();
                }
                Task::none()
            }
            Message::Convert => match self.session.begin_batch() {
                Ok(job) => {
                    self.previews.clear();
                    self.status = format!(
                        "Converting {} file(s) at {}% quality...",
                        job.sources.len(),
                        job.quality.percent()
                    );
                    Task::run(stream_batch(job), Message::BatchProgress)
                }
                Err(e) => {
                    self.report(&e);
                    Task::none()
                }
            },
            Message::BatchProgress(BatchUpdate::Item { index, outcome }) => {
                let total = self.session.selection().len();
                let outcome = self.session.record(outcome);
                self.previews.push(PreviewCard::from_outcome(outcome));
                self.status = format!("Converting... {}/{} done", index + 1, total);
                Task::none()
            }
            Message::BatchProgress(BatchUpdate::Finished(Ok(_))) => {
                self.session.finish_batch();
                let outcomes = self.session.outcomes();
                let failed = outcomes.iter().filter(|o| !o.is_success()).count();
                self.status = if failed == 0 {
                    format!("✅ Converted {} file(s).", outcomes.len())
                } else {
                    format!(
                        "Converted {} file(s), {} failed.",
                        outcomes.len() - failed,
                        failed
                    )
                };
                Task::none()
            }
            Message::BatchProgress(BatchUpdate::Finished(Err(e))) => {
                self.session.abort_batch(&e);
                self.status = format!("❌ {}", e);
                Task::none()
            }
            Message::Download(name) => {
                let Some(image) = self.session.converted(&name) else {
                    tracing::warn!("No converted file named {}", name);
                    return Task::none();
                };

                let target = FileDialog::new()
                    .set_title("Save JPG")
                    .set_file_name(&name)
                    .add_filter("JPEG images", &["jpg", "jpeg"])
                    .save_file();

                match target {
                    Some(path) => Task::perform(
                        files::save_converted(path, image.clone()),
                        Message::Saved,
                    ),
                    None => Task::none(),
                }
            }
            Message::Saved(Ok(path)) => {
                self.status = format!("💾 Saved {}", path.display());
                Task::none()
            }
            Message::Saved(Err(e)) => {
                self.report(&e);
                Task::none()
            }
        }
    }

    /// Apply a loaded candidate list as the new selection
    fn apply_selection(&mut self, result: Result<Vec<SourceImage>, ConvertError>) {
        match result.and_then(|candidates| self.session.select(candidates)) {
            Ok(count) => {
                self.status = format!("{} PNG file(s) ready to convert.", count);
            }
            Err(e) => self.report(&e),
        }
    }

    /// Show an error in the status line; empty selections also get an alert
    fn report(&mut self, error: &ConvertError) {
        tracing::warn!("{}", error);
        self.status = format!("⚠️  {}", error);

        if *error == ConvertError::NoInput {
            MessageDialog::new()
                .set_level(MessageLevel::Warning)
                .set_title("No PNG files")
                .set_description(error.to_string())
                .set_buttons(MessageButtons::Ok)
                .show();
        }
    }

    /// Build the user interface
    fn view(&self) -> Element<'_, Message> {
        let converting = self.session.phase() == Phase::Converting;
        let quality = self.session.quality();

        let mut content: Column<Message> = column![
            text("PNG to JPG Converter").size(36),
            ui::upload_area(self.session.selection().len(), self.drops.is_hovering()),
        ]
        .spacing(20)
        .padding(30)
        .align_x(Alignment::Center);

        if !self.session.selection().is_empty() {
            let convert_label = if converting {
                "Converting..."
            } else {
                "Convert to JPG"
            };

            let controls = row![
                text("Quality:"),
                slider(0.0..=1.0, quality.value(), Message::QualityChanged)
                    .step(0.01_f32)
                    .width(Length::Fixed(240.0)),
                text(format!("{}%", quality.percent())).width(Length::Fixed(50.0)),
                button(convert_label)
                    .on_press_maybe((!converting).then_some(Message::Convert))
                    .padding(10),
            ]
            .spacing(16)
            .align_y(Alignment::Center);

            content = content.push(controls);
        }

        content = content.push(text(&self.status).size(16));

        if !self.previews.is_empty() {
            let cards = Column::with_children(self.previews.iter().map(PreviewCard::view))
                .spacing(16)
                .width(Length::Fill);
            content = content.push(cards);
        }

        container(scrollable(content).width(Length::Fill))
            .width(Length::Fill)
            .height(Length::Fill)
            .center_x(Length::Fill)
            .into()
    }

    /// Forward window file-drop events into messages
    fn subscription(&self) -> Subscription<Message> {
        event::listen_with(|event, _status, _window| match event {
            Event::Window(window::Event::FileHovered(_)) => Some(Message::FileHovered),
            Event::Window(window::Event::FilesHoveredLeft) => Some(Message::FilesHoveredLeft),
            Event::Window(window::Event::FileDropped(path)) => Some(Message::FileDropped(path)),
            _ => None,
        })
    }

    /// Set the application theme
    fn theme(&self) -> Theme {
        self.theme.clone()
    }
}

fn init_logging() {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    tracing_subscriber::fmt().with_env_filter(env_filter).init();
}

fn main() -> iced::Result {
    init_logging();

    iced::application("PNG to JPG Converter", Png2Jpg::update, Png2Jpg::view)
        .subscription(Png2Jpg::subscription)
        .theme(Png2Jpg::theme)
        .centered()
        .run_with(Png2Jpg::new)
}
