use clap::Parser;
use iced::widget::{
    button, canvas, checkbox, column, container, horizontal_rule, image::Handle, pick_list, radio,
    row, scrollable, text, text_editor, Column, Image,
};
use iced::{time, Alignment, Color, Element, Length, Size, Subscription, Task, Theme};
use rfd::FileDialog;
use std::path::PathBuf;
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

mod config;
mod error;
mod media;
mod plot;
mod process;
mod state;
mod tutor;
mod ui;

use config::{AppConfig, Cli, Env, MediaConfig};
use media::{Animation, Playback, Viewer};
use plot::generator::{GeneratedPlot, PlotGenerator};
use plot::renderer::YtRenderer;
use state::browser;
use state::data::{Axis, Field, MediaItem, PlotRequest, Scenario, Snapshot};
use state::journal::ReflectionLog;
use state::selection::{tutor_prompt, MediaSelection, Mode, SimulationSelection};
use tutor::TutorClient;

const PLOT_BUSY: &str = "Generating plot with yt...";
const TUTOR_BUSY: &str = "Waiting for the AI-Tutor...";

/// Feedback line shown at the bottom of the window
#[derive(Debug, Clone, PartialEq)]
enum Status {
    Idle,
    Busy(String),
    Success(String),
    Failure(String),
}

/// The last generated plot, ready to draw
struct PlotView {
    handle: Handle,
    caption: String,
    size: (u32, u32),
}

/// Main application state
struct Explorer {
    data_root: PathBuf,
    media_root: PathBuf,
    scenarios: Vec<Scenario>,
    /// Snapshots of the selected scenario
    snapshots: Vec<Snapshot>,
    media: Vec<MediaItem>,
    mode: Mode,
    media_config: MediaConfig,
    /// Decoded frames of the selected GIF or video
    playback: Playback,
    plots: PlotGenerator<YtRenderer>,
    plot: Option<PlotView>,
    plot_in_flight: bool,
    tutor: TutorClient,
    question: text_editor::Content,
    reply: Option<String>,
    /// Abort handle of the in-flight tutor request
    tutor_task: Option<iced::task::Handle>,
    reflections: ReflectionLog,
    reflection: text_editor::Content,
    status: Status,
}

/// Application messages (events)
#[derive(Debug, Clone)]
enum Message {
    /// "Use pre-rendered media" checkbox toggled
    MediaModeToggled(bool),
    ScenarioSelected(Scenario),
    SnapshotSelected(Snapshot),
    FieldSelected(Field),
    AxisSelected(Axis),
    MediaSelected(MediaItem),
    /// Background frame decoding finished
    MediaLoaded(PathBuf, Result<Animation, String>),
    /// Show the next frame of the playing animation
    AnimationTick,
    TogglePlayback,
    /// Open a video in the system player
    OpenMedia(PathBuf),
    GeneratePlot,
    /// Background plot generation finished
    PlotReady(Result<GeneratedPlot, String>),
    QuestionEdited(text_editor::Action),
    AskTutor,
    CancelTutor,
    /// Background tutor request finished
    TutorReplied(String),
    ReflectionEdited(text_editor::Action),
    SaveReflection,
    /// Re-list scenarios and media from disk
    Refresh,
    ChooseDataRoot,
    ChooseMediaRoot,
}

impl Explorer {
    /// Create a new instance of the application
    fn new(config: AppConfig) -> (Self, Task<Message>) {
        let renderer = YtRenderer::new(config.plot.python.clone(), config.plot.timeout);
        let tutor = TutorClient::new(config.tutor.clone());

        if !tutor.has_api_key() {
            warn!(
                "{} is not set; tutor requests will return an error",
                crate::config::API_KEY_ENV
            );
        }

        let mut explorer = Explorer {
            data_root: config.data_root,
            media_root: config.media_root,
            scenarios: Vec::new(),
            snapshots: Vec::new(),
            media: Vec::new(),
            mode: Mode::default(),
            media_config: config.media,
            playback: Playback::Empty,
            plots: PlotGenerator::new(renderer, config.plot.output),
            plot: None,
            plot_in_flight: false,
            tutor,
            question: text_editor::Content::new(),
            reply: None,
            tutor_task: None,
            reflections: ReflectionLog::new(config.reflection_log),
            reflection: text_editor::Content::new(),
            status: Status::Idle,
        };
        explorer.refresh();

        info!(
            "🕳️ SMBH Explorer initialized: {} scenarios, {} media files",
            explorer.scenarios.len(),
            explorer.media.len()
        );
        info!("🖼️ Plots are written to {}", explorer.plots.output().display());
        info!("📝 Reflections are appended to {}", explorer.reflections.path().display());
        info!("🤖 Tutor model: {}", explorer.tutor.model());

        (explorer, Task::none())
    }

    /// Re-read both roots, keeping current selections where they still exist
    fn refresh(&mut self) {
        self.scenarios = browser::list_scenarios(&self.data_root);
        self.media = browser::list_media(&self.media_root);

        match &mut self.mode {
            Mode::Simulation(selection) => {
                // A scenario that vanished falls back to the first one listed
                selection.scenario = keep_or_first(selection.scenario.take(), &self.scenarios);

                // Snapshots always follow the scenario that survived
                self.snapshots = snapshots_of(selection.scenario.as_ref());
                selection.snapshot = keep_or_first(selection.snapshot.take(), &self.snapshots);
            }
            Mode::Media(selection) => {
                selection.item = keep_or_first(selection.item.take(), &self.media);
            }
        }
    }

    /// Start decoding the selected media item when it plays as frames
    fn load_selected_media(&mut self) -> Task<Message> {
        let item = match &self.mode {
            Mode::Media(MediaSelection { item: Some(item) }) => item.clone(),
            _ => {
                self.playback = Playback::Empty;
                return Task::none();
            }
        };

        // Still images are drawn straight from disk
        if !Viewer::for_kind(item.kind).needs_frames() {
            self.playback = Playback::Empty;
            return Task::none();
        }

        // Already playing or decoding this file
        if self.playback.covers(&item.path) {
            return Task::none();
        }

        info!("Decoding {} for inline playback", item.name);
        self.playback = Playback::Loading(item.path.clone());

        let config = self.media_config.clone();
        Task::perform(
            async move {
                let path = item.path.clone();
                let result = tokio::task::spawn_blocking(move || {
                    media::load(&item.path, item.kind, &config).map_err(|e| e.to_string())
                })
                .await
                .unwrap_or_else(|e| Err(e.to_string()));
                (path, result)
            },
            |(path, result)| Message::MediaLoaded(path, result),
        )
    }

    /// Return to idle if the status line still shows `busy`
    fn clear_busy(&mut self, busy: &str) {
        if matches!(&self.status, Status::Busy(message) if message == busy) {
            self.status = Status::Idle;
        }
    }

    /// Handle application messages and update state
    fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::MediaModeToggled(use_media) => {
                // Plots belong to the simulation view only
                self.plot = None;

                // Each mode starts from a fresh selection
                self.mode = if use_media {
                    Mode::Media(MediaSelection {
                        item: self.media.first().cloned(),
                    })
                } else {
                    Mode::Simulation(SimulationSelection::default())
                };

                // Re-list so the new mode preselects from what is on disk now
                self.refresh();
                self.load_selected_media()
            }
            Message::ScenarioSelected(scenario) => {
                if let Mode::Simulation(selection) = &mut self.mode {
                    // A new scenario resets the snapshot to its first file
                    self.snapshots = browser::list_snapshots(&scenario.path);
                    selection.snapshot = self.snapshots.first().cloned();
                    selection.scenario = Some(scenario);
                }
                Task::none()
            }
            Message::SnapshotSelected(snapshot) => {
                if let Mode::Simulation(selection) = &mut self.mode {
                    selection.snapshot = Some(snapshot);
                }
                Task::none()
            }
            Message::FieldSelected(field) => {
                if let Mode::Simulation(selection) = &mut self.mode {
                    selection.field = field;
                }
                Task::none()
            }
            Message::AxisSelected(axis) => {
                if let Mode::Simulation(selection) = &mut self.mode {
                    selection.axis = axis;
                }
                Task::none()
            }
            Message::MediaSelected(item) => {
                if let Mode::Media(selection) = &mut self.mode {
                    selection.item = Some(item);
                }
                self.load_selected_media()
            }
            Message::MediaLoaded(path, result) => {
                // The selection may have moved on while frames were decoding
                if !matches!(&self.playback, Playback::Loading(loading) if *loading == path) {
                    debug!("Dropping frames for {}, no longer selected", path.display());
                    return Task::none();
                }

                self.playback = match result {
                    Ok(animation) => {
                        info!(
                            "Playing {} ({} frames)",
                            path.display(),
                            animation.frame_count()
                        );
                        Playback::Ready(animation)
                    }
                    Err(reason) => {
                        error!("Failed to decode {}: {}", path.display(), reason);
                        Playback::Failed { path, reason }
                    }
                };
                Task::none()
            }
            Message::AnimationTick => {
                if let Playback::Ready(animation) = &mut self.playback {
                    animation.advance();
                }
                Task::none()
            }
            Message::TogglePlayback => {
                if let Playback::Ready(animation) = &mut self.playback {
                    animation.toggle_paused();
                }
                Task::none()
            }
            Message::OpenMedia(path) => {
                if let Err(e) = ui::media::open_externally(&path) {
                    error!("Failed to open {}: {}", path.display(), e);
                    self.status = Status::Failure(format!("Could not open video: {}", e));
                }
                Task::none()
            }
            Message::GeneratePlot => {
                let Some(request) = self.plot_request() else {
                    return Task::none();
                };

                // Disables the Generate button until PlotReady arrives
                self.plot_in_flight = true;
                self.status = Status::Busy(PLOT_BUSY.to_string());

                // yt runs in a blocking subprocess, off the UI thread
                let generator = self.plots.clone();
                Task::perform(
                    async move { generator.generate(request).await.map_err(|e| e.to_string()) },
                    Message::PlotReady,
                )
            }
            Message::PlotReady(result) => {
                self.plot_in_flight = false;

                // The user left the simulation view while yt was running
                if !matches!(self.mode, Mode::Simulation(_)) {
                    debug!("Dropping plot result outside simulation mode");
                    self.clear_busy(PLOT_BUSY);
                    return Task::none();
                }

                match result {
                    Ok(plot) => {
                        self.status = Status::Success(format!(
                            "Plot saved to {}",
                            plot.path.display()
                        ));
                        // Fresh handle from bytes, so the overwritten file is never served from cache
                        self.plot = Some(PlotView {
                            caption: plot.caption(),
                            size: (plot.width, plot.height),
                            handle: Handle::from_bytes(plot.bytes),
                        });
                    }
                    Err(e) => {
                        self.plot = None;
                        self.status = Status::Failure(format!("Plot generation failed: {}", e));
                    }
                }
                Task::none()
            }
            Message::QuestionEdited(action) => {
                self.question.perform(action);
                Task::none()
            }
            Message::AskTutor => {
                // Context is captured now; later selection changes don't affect this request
                let prompt = tutor_prompt(&self.mode.context(), self.question.text().trim_end());
                let client = self.tutor.clone();

                self.reply = None;
                self.status = Status::Busy(TUTOR_BUSY.to_string());

                // Keep the abort handle so the request can be cancelled
                let (task, handle) = Task::perform(
                    async move { client.ask(&prompt).await },
                    Message::TutorReplied,
                )
                .abortable();
                self.tutor_task = Some(handle);
                task
            }
            Message::CancelTutor => {
                if let Some(handle) = self.tutor_task.take() {
                    handle.abort();
                    info!("Tutor request cancelled");
                    self.clear_busy(TUTOR_BUSY);
                }
                Task::none()
            }
            Message::TutorReplied(reply) => {
                self.tutor_task = None;
                self.clear_busy(TUTOR_BUSY);
                self.reply = Some(reply);
                Task::none()
            }
            Message::ReflectionEdited(action) => {
                self.reflection.perform(action);
                Task::none()
            }
            Message::SaveReflection => {
                let context = self.mode.context();
                let text = self.reflection.text();

                // text_editor content always ends with a newline
                self.status = match self.reflections.append(&context, text.trim_end()) {
                    Ok(()) => Status::Success("Reflection saved!".to_string()),
                    Err(e) => {
                        error!("Failed to save reflection: {}", e);
                        Status::Failure(format!("Could not save reflection: {}", e))
                    }
                };
                Task::none()
            }
            Message::Refresh => {
                self.refresh();
                self.load_selected_media()
            }
            Message::ChooseDataRoot => {
                if let Some(folder) = FileDialog::new()
                    .set_title("Select Simulation Data Folder")
                    .set_directory(&self.data_root)
                    .pick_folder()
                {
                    info!("Data root changed to {}", folder.display());
                    self.data_root = folder;
                    self.refresh();
                }
                Task::none()
            }
            Message::ChooseMediaRoot => {
                if let Some(folder) = FileDialog::new()
                    .set_title("Select Pre-rendered Media Folder")
                    .set_directory(&self.media_root)
                    .pick_folder()
                {
                    info!("Media root changed to {}", folder.display());
                    self.media_root = folder;
                    self.refresh();
                    return self.load_selected_media();
                }
                Task::none()
            }
        }
    }

    /// Step the playing animation at its current frame's delay
    fn subscription(&self) -> Subscription<Message> {
        match &self.playback {
            Playback::Ready(animation) if animation.is_playing() => {
                time::every(animation.frame().delay).map(|_| Message::AnimationTick)
            }
            _ => Subscription::none(),
        }
    }

    /// Whether a new tutor request can be sent
    fn can_ask(&self) -> bool {
        self.tutor_task.is_none()
    }

    /// Plot request for the current simulation selection, if complete
    fn plot_request(&self) -> Option<PlotRequest> {
        match &self.mode {
            Mode::Simulation(SimulationSelection {
                snapshot: Some(snapshot),
                field,
                axis,
                ..
            }) => Some(PlotRequest {
                snapshot: snapshot.path.clone(),
                field: *field,
                axis: *axis,
            }),
            _ => None,
        }
    }

    /// Warning for the active mode when there is nothing to select
    fn warning(&self) -> Option<String> {
        match &self.mode {
            Mode::Media(_) if self.media.is_empty() => Some(format!(
                "⚠️ No media files found in {}.",
                self.media_root.display()
            )),
            Mode::Simulation(_) if self.scenarios.is_empty() => Some(format!(
                "⚠️ No scenarios available in {}.",
                self.data_root.display()
            )),
            Mode::Simulation(SimulationSelection {
                scenario: Some(scenario),
                ..
            }) if self.snapshots.is_empty() => Some(format!(
                "⚠️ No .phdf files found in scenario {}.",
                scenario.name
            )),
            _ => None,
        }
    }

    /// Build the user interface
    fn view(&self) -> Element<Message> {
        let content = row![
            container(self.sidebar())
                .width(Length::Fixed(320.0))
                .height(Length::Fill)
                .padding(20)
                .style(container::rounded_box),
            scrollable(self.main_panel().padding(30)).width(Length::Fill),
        ];

        container(content)
            .width(Length::Fill)
            .height(Length::Fill)
            .into()
    }

    fn sidebar(&self) -> Column<Message> {
        let mut sidebar = column![checkbox(
            "Use pre-rendered media instead of .phdf",
            self.mode.is_media()
        )
        .on_toggle(Message::MediaModeToggled)]
        .spacing(14);

        match &self.mode {
            Mode::Media(selection) => {
                sidebar = sidebar.push(text("1. Select Pre-rendered Media").size(20));
                if !self.media.is_empty() {
                    sidebar = sidebar.push(
                        pick_list(
                            self.media.as_slice(),
                            selection.item.clone(),
                            Message::MediaSelected,
                        )
                        .placeholder("Select File")
                        .width(Length::Fill),
                    );
                }
            }
            Mode::Simulation(selection) => {
                sidebar = sidebar.push(text("1. Select Simulation Scenario").size(20));
                if !self.scenarios.is_empty() {
                    sidebar = sidebar.push(
                        pick_list(
                            self.scenarios.as_slice(),
                            selection.scenario.clone(),
                            Message::ScenarioSelected,
                        )
                        .placeholder("Scenario")
                        .width(Length::Fill),
                    );
                }
                if !self.snapshots.is_empty() {
                    let axes = Axis::ALL.iter().fold(row![].spacing(16), |axes, &axis| {
                        axes.push(radio(
                            axis.as_str(),
                            axis,
                            Some(selection.axis),
                            Message::AxisSelected,
                        ))
                    });

                    sidebar = sidebar
                        .push(text("Snapshot File").size(14))
                        .push(
                            pick_list(
                                self.snapshots.as_slice(),
                                selection.snapshot.clone(),
                                Message::SnapshotSelected,
                            )
                            .width(Length::Fill),
                        )
                        .push(text("Field to Plot").size(14))
                        .push(
                            pick_list(Field::ALL, Some(selection.field), Message::FieldSelected)
                                .width(Length::Fill),
                        )
                        .push(text("Slice Axis").size(14))
                        .push(axes)
                        .push(
                            button("Generate Plot")
                                .on_press_maybe(
                                    (!self.plot_in_flight).then_some(Message::GeneratePlot),
                                )
                                .padding(10),
                        );
                }
            }
        }

        sidebar
            .push(horizontal_rule(1))
            .push(button("Refresh").on_press(Message::Refresh).width(Length::Fill))
            .push(
                button("Choose data folder...")
                    .on_press(Message::ChooseDataRoot)
                    .width(Length::Fill),
            )
            .push(
                button("Choose media folder...")
                    .on_press(Message::ChooseMediaRoot)
                    .width(Length::Fill),
            )
    }

    fn main_panel(&self) -> Column<Message> {
        let mut panel = column![text("🕳️ SMBH Simulation Explorer with AI Tutor").size(36)]
            .spacing(20)
            .width(Length::Fill);

        if let Some(warning) = self.warning() {
            panel = panel.push(text(warning).color(Color::from_rgb(0.95, 0.75, 0.2)));
        }

        match &self.mode {
            Mode::Media(MediaSelection { item: Some(item) }) => {
                panel = panel.push(ui::media::view(item, &self.playback));
            }
            Mode::Simulation(_) => {
                if let Some(plot) = &self.plot {
                    panel = panel.push(
                        column![
                            row![
                                Image::new(plot.handle.clone()).width(Length::Fill),
                                canvas(ui::colorbar::ColorBar)
                                    .width(Length::Fixed(24.0))
                                    .height(Length::Fixed(360.0)),
                            ]
                            .spacing(12)
                            .align_y(Alignment::Center),
                            text(format!(
                                "{} ({}x{})",
                                plot.caption, plot.size.0, plot.size.1
                            ))
                            .size(14),
                        ]
                        .spacing(8),
                    );
                }
            }
            _ => {}
        }

        panel
            .push(horizontal_rule(1))
            .push(self.tutor_panel())
            .push(horizontal_rule(1))
            .push(self.reflection_panel())
            .push(self.status_line())
    }

    fn tutor_panel(&self) -> Column<Message> {
        let mut actions = row![button("Get AI Guidance")
            .on_press_maybe(self.can_ask().then_some(Message::AskTutor))
            .padding(10)]
        .spacing(10);
        if !self.can_ask() {
            actions = actions.push(button("Cancel").on_press(Message::CancelTutor).padding(10));
        }

        let mut panel = column![
            text("🤖 Ask the AI-Tutor about this simulation").size(24),
            text_editor(&self.question)
                .placeholder("Ask a question or describe your interpretation:")
                .on_action(Message::QuestionEdited)
                .height(Length::Fixed(100.0)),
            actions,
        ]
        .spacing(10);

        if let Some(reply) = &self.reply {
            panel = panel
                .push(text("AI-Tutor Response:").size(16))
                .push(text(reply));
        }

        panel
    }

    fn reflection_panel(&self) -> Column<Message> {
        column![
            text("📝 Reflection").size(24),
            text_editor(&self.reflection)
                .placeholder("What did you learn from this simulation?")
                .on_action(Message::ReflectionEdited)
                .height(Length::Fixed(100.0)),
            button("Save Reflection")
                .on_press(Message::SaveReflection)
                .padding(10),
        ]
        .spacing(10)
    }

    fn status_line(&self) -> Element<Message> {
        match &self.status {
            Status::Idle => text("").into(),
            Status::Busy(message) => text(message).size(14).into(),
            Status::Success(message) => text(format!("✅ {}", message))
                .size(14)
                .color(Color::from_rgb(0.4, 0.85, 0.4))
                .into(),
            Status::Failure(message) => text(format!("❌ {}", message))
                .size(14)
                .color(Color::from_rgb(0.95, 0.35, 0.35))
                .into(),
        }
    }

    /// Set the application theme
    fn theme(&self) -> Theme {
        Theme::Dark
    }
}

/// Keep `current` if it is still among `options`, otherwise take the first option
fn keep_or_first<T: PartialEq + Clone>(current: Option<T>, options: &[T]) -> Option<T> {
    current
        .filter(|c| options.contains(c))
        .or_else(|| options.first().cloned())
}

fn snapshots_of(scenario: Option<&Scenario>) -> Vec<Snapshot> {
    scenario
        .map(|s| browser::list_snapshots(&s.path))
        .unwrap_or_default()
}

fn main() -> iced::Result {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = match AppConfig::load(&cli, Env::from_process()) {
        Ok(config) => config,
        Err(e) => {
            error!("{}", e);
            std::process::exit(2);
        }
    };

    info!("📁 Data root: {}", config.data_root.display());
    info!("🎞️ Media root: {}", config.media_root.display());

    iced::application(
        "SMBH Simulation Explorer",
        Explorer::update,
        Explorer::view,
    )
    .subscription(Explorer::subscription)
    .theme(Explorer::theme)
    .window_size(Size::new(1280.0, 860.0))
    .centered()
    .run_with(move || Explorer::new(config))
}
