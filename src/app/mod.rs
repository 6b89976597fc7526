use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver};
use std::thread;

use eframe::egui::{self, Context, Vec2};
use tracing::error;

use crate::prov::{GraphModel, NodeDetail, ProvDocument, load_document};
use crate::scene::{DisplayOptions, Scene, Selection};

mod export;
mod graph;
mod history;
mod physics;
mod render_utils;
mod ui;
mod viewport;

pub use export::export_svg;
pub use physics::LayoutParams;

use history::SelectionHistory;
use physics::ForceLayout;
use viewport::Viewport;

/// Everything the window needs before the document is loaded.
#[derive(Clone, Debug)]
pub struct LaunchOptions {
    pub document: PathBuf,
    pub params: LayoutParams,
    pub display: DisplayOptions,
    /// Node highlighted once the graph is first shown.
    pub focus: Option<String>,
}

pub struct ProvLensApp {
    options: LaunchOptions,
    state: AppState,
}

enum AppState {
    Loading {
        rx: Receiver<Result<ProvDocument, String>>,
    },
    Ready(Box<ViewModel>),
    Error(String),
}

struct ViewModel {
    document: ProvDocument,
    document_path: PathBuf,
    model: GraphModel,
    layout: ForceLayout,
    /// Scene of the last painted frame; hit testing and focus lookups read it.
    scene: Scene,
    viewport: Viewport,
    view_size: Vec2,
    params: LayoutParams,
    display: DisplayOptions,
    selection: Option<Selection>,
    detail: Option<NodeDetail>,
    hovered: Option<usize>,
    /// Node position minus the grab point, kept while a node is dragged.
    drag_offset: Vec2,
    history: SelectionHistory,
    search: String,
    pending_focus: Option<String>,
    fit_requested: bool,
    graph_dirty: bool,
    export_status: Option<String>,
}

impl ProvLensApp {
    pub fn new(_cc: &eframe::CreationContext<'_>, options: LaunchOptions) -> Self {
        let state = Self::start_load(&options);
        Self { options, state }
    }

    fn spawn_load(path: PathBuf) -> Receiver<Result<ProvDocument, String>> {
        let (tx, rx) = mpsc::channel();

        thread::spawn(move || {
            let result = load_document(&path).map_err(|error| {
                error!(path = %path.display(), "{error:#}");
                format!("{error:#}")
            });
            let _ = tx.send(result);
        });

        rx
    }

    fn start_load(options: &LaunchOptions) -> AppState {
        AppState::Loading {
            rx: Self::spawn_load(options.document.clone()),
        }
    }
}

impl eframe::App for ProvLensApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        let mut transition = None;

        match &mut self.state {
            AppState::Loading { rx } => {
                match rx.try_recv() {
                    Ok(result) => {
                        transition = Some(match result {
                            Ok(document) => AppState::Ready(Box::new(ViewModel::new(
                                document,
                                &self.options,
                            ))),
                            Err(error) => AppState::Error(error),
                        });
                    }
                    Err(mpsc::TryRecvError::Empty) => ctx.request_repaint(),
                    Err(mpsc::TryRecvError::Disconnected) => {
                        transition = Some(AppState::Error(
                            "Background load worker disconnected".to_owned(),
                        ));
                    }
                }

                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.vertical_centered(|ui| {
                        ui.add_space(120.0);
                        ui.heading("Loading provenance document...");
                        ui.add_space(8.0);
                        ui.label(self.options.document.display().to_string());
                        ui.spinner();
                    });
                });
            }
            AppState::Error(error) => {
                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.heading("Failed to load provenance document");
                    ui.add_space(6.0);
                    ui.label(error.as_str());
                    ui.add_space(10.0);
                    if ui.button("Retry").clicked() {
                        transition = Some(Self::start_load(&self.options));
                    }
                });
            }
            AppState::Ready(model) => model.show(ctx),
        }

        if let Some(next_state) = transition {
            self.state = next_state;
        }
    }
}
