use iced::widget::{button, column, container, image as preview, row, text, Column};
use iced::{Alignment, Color, Element, Length, Task, Theme};
use rfd::{FileDialog, MessageButtons, MessageDialog, MessageLevel};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

mod compare;
mod config;
mod error;
mod media;
mod report;
mod similarity;
mod state;
mod verify;

use compare::Pipeline;
use error::Error;
use media::loader::LoadedImage;
use media::thumbnail::THUMBNAIL_SIZE;
use state::data::{Comparison, Slot};
use state::session::{Session, Tone};
use verify::CommandVerifier;

/// Version label shown in the title bar and header
const VERSION_LABEL: &str = "20250729_1";

/// Extensions offered by the file picker; decodability is checked by content
const IMAGE_EXTENSIONS: [&str; 5] = ["jpg", "jpeg", "png", "bmp", "webp"];

/// Main application state
struct FaceCompare {
    /// The two slots, in-flight flag and last result
    session: Session,
    /// Preview textures for [first, second]
    previews: [Option<preview::Handle>; 2],
    /// Backend and model selection used for every comparison
    pipeline: Pipeline,
}

/// Application messages (events)
#[derive(Debug, Clone)]
enum Message {
    /// User clicked one of the "Select image" buttons
    PickImage(Slot),
    /// Background load finished for a slot
    ImageLoaded(Slot, Result<LoadedImage, Error>),
    /// User clicked "Compare"
    Compare,
    /// Background comparison finished
    ComparisonComplete(Result<Comparison, Error>),
    /// User clicked "Open report"
    OpenReport,
}

impl FaceCompare {
    /// Create a new instance of the application
    fn new() -> (Self, Task<Message>) {
        let config = config::AppConfig::from_env();
        tracing::info!(
            "🎨 Face Compare {} using {} {:?} ({} / {}, enforce_detection={})",
            VERSION_LABEL,
            config.verifier_program,
            config.verifier_args,
            config.verifier.model_name,
            config.verifier.detector_backend,
            config.verifier.enforce_detection
        );

        let client = CommandVerifier::new(config.verifier_program, config.verifier_args);
        let pipeline = Pipeline {
            client: Arc::new(client),
            config: config.verifier,
            open_report: config.open_report,
            opener: report::system_browser,
        };

        (
            FaceCompare {
                session: Session::new(),
                previews: [None, None],
                pipeline,
            },
            Task::none(),
        )
    }

    fn title(&self) -> String {
        format!("Face Compare ({})", VERSION_LABEL)
    }

    /// Handle application messages and update state
    fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::PickImage(slot) => {
                // Show the native file picker dialog
                let file = FileDialog::new()
                    .set_title(format!("Select image {}", slot.number()))
                    .add_filter("Image files", &IMAGE_EXTENSIONS)
                    .pick_file();

                if let Some(path) = file {
                    return Task::perform(media::loader::load_image_async(path), move |result| {
                        Message::ImageLoaded(slot, result)
                    });
                }

                Task::none()
            }
            Message::ImageLoaded(slot, result) => {
                match self.session.apply_load(slot, result) {
                    Ok(thumbnail) => {
                        self.previews[slot_index(slot)] = Some(preview::Handle::from_rgba(
                            thumbnail.width,
                            thumbnail.height,
                            thumbnail.rgba,
                        ));
                    }
                    Err(e) => {
                        tracing::error!("❌ Image {} rejected: {}", slot.number(), e);
                        show_error(&format!("Cannot load image {}:\n{}", slot.number(), e));
                    }
                }

                Task::none()
            }
            Message::Compare => {
                // The button is disabled otherwise, but a stale press is harmless
                let Some((first, second)) = self.session.begin_comparison() else {
                    return Task::none();
                };

                Task::perform(
                    compare::run_comparison_async(self.pipeline.clone(), first, second),
                    Message::ComparisonComplete,
                )
            }
            Message::ComparisonComplete(outcome) => {
                if let Err(e) = &outcome {
                    tracing::error!("❌ Comparison failed: {}", e);
                }
                self.session.finish_comparison(outcome);

                Task::none()
            }
            Message::OpenReport => {
                if let Some(path) = self.session.last_report() {
                    report::open_in_browser(self.pipeline.opener, path);
                }

                Task::none()
            }
        }
    }

    /// Build the user interface
    fn view(&self) -> Element<Message> {
        let header = column![
            text(format!("Face Compare ({})", VERSION_LABEL)).size(28),
            text(format!(
                "Verification model: {} / detector: {}",
                self.pipeline.config.model_name, self.pipeline.config.detector_backend
            ))
            .size(14)
            .color(Color::from_rgb(0.6, 0.6, 0.6)),
        ]
        .spacing(4)
        .align_x(Alignment::Center);

        let previews = row![
            self.preview_card(Slot::First),
            self.preview_card(Slot::Second),
        ]
        .spacing(16);

        let pickers = row![
            button("Select image 1")
                .on_press(Message::PickImage(Slot::First))
                .padding(10),
            button("Select image 2")
                .on_press(Message::PickImage(Slot::Second))
                .padding(10),
        ]
        .spacing(30);

        let compare_label = if self.session.is_comparing() {
            "Comparing…"
        } else {
            "Compare"
        };
        let compare = button(compare_label)
            .on_press_maybe(self.session.can_compare().then_some(Message::Compare))
            .padding(10);

        let mut content: Column<Message> = column![
            header,
            previews,
            pickers,
            compare,
            text(self.session.status_text())
                .size(16)
                .color(tone_color(self.session.status_tone())),
        ]
        .spacing(20)
        .padding(40)
        .align_x(Alignment::Center);

        if self.session.last_report().is_some() {
            content = content.push(
                button("Open report")
                    .on_press(Message::OpenReport)
                    .padding(8),
            );
        }

        container(content)
            .width(Length::Fill)
            .height(Length::Fill)
            .center_x(Length::Fill)
            .center_y(Length::Fill)
            .into()
    }

    /// Thumbnail of a slot, or a placeholder until one is loaded
    fn preview_card(&self, slot: Slot) -> Element<Message> {
        let side = THUMBNAIL_SIZE as f32;
        let body: Element<Message> = match &self.previews[slot_index(slot)] {
            Some(handle) => preview(handle.clone())
                .width(Length::Fixed(side))
                .height(Length::Fixed(side))
                .into(),
            None => text(format!("No image selected ({})", slot.number())).into(),
        };

        let frame = container(body)
            .padding(8)
            .center_x(Length::Fixed(side + 16.0))
            .center_y(Length::Fixed(side + 16.0))
            .style(container::bordered_box);

        let caption = self
            .session
            .image(slot)
            .map(|image| image.file_name())
            .unwrap_or_default();

        column![frame, text(caption).size(12)]
            .spacing(4)
            .align_x(Alignment::Center)
            .into()
    }

    /// Set the application theme
    fn theme(&self) -> Theme {
        Theme::Dark
    }
}

fn slot_index(slot: Slot) -> usize {
    match slot {
        Slot::First => 0,
        Slot::Second => 1,
    }
}

fn tone_color(tone: Tone) -> Color {
    match tone {
        Tone::Neutral => Color::from_rgb(0.4, 0.6, 1.0),
        Tone::Pending => Color::from_rgb(1.0, 0.65, 0.0),
        Tone::Success => Color::from_rgb(0.2, 0.75, 0.3),
        Tone::Failure => Color::from_rgb(0.9, 0.25, 0.2),
    }
}

/// Blocking error notification
fn show_error(description: &str) {
    let _ = MessageDialog::new()
        .set_level(MessageLevel::Error)
        .set_title("Error")
        .set_description(description)
        .set_buttons(MessageButtons::Ok)
        .show();
}

fn main() -> iced::Result {
    // Before any thread exists
    config::quiet_numeric_backend();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("face_compare=info")),
        )
        .init();

    iced::application(FaceCompare::title, FaceCompare::update, FaceCompare::view)
        .theme(FaceCompare::theme)
        .centered()
        .run_with(FaceCompare::new)
}
