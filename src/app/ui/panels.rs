use eframe::egui::{self, Align, Context, Layout, Vec2};

use crate::prov::ProvDocument;
use crate::scene::Scene;

use super::super::graph::build::fresh_graph;
use super::super::history::SelectionHistory;
use super::super::physics::SimulationState;
use super::super::viewport::Viewport;
use super::super::{LaunchOptions, ViewModel};

impl ViewModel {
    pub(in crate::app) fn new(document: ProvDocument, options: &LaunchOptions) -> Self {
        let params = options.params.clamped();
        let (model, layout) = fresh_graph(&document, params);

        let mut view_model = Self {
            document,
            document_path: options.document.clone(),
            model,
            layout,
            scene: Scene::default(),
            viewport: Viewport::default(),
            view_size: Vec2::ZERO,
            params,
            display: options.display,
            selection: None,
            detail: None,
            hovered: None,
            drag_offset: Vec2::ZERO,
            history: SelectionHistory::default(),
            search: String::new(),
            pending_focus: None,
            fit_requested: true,
            graph_dirty: false,
            export_status: None,
        };

        if let Some(node_id) = &options.focus {
            view_model.highlight(node_id);
        }
        view_model
    }

    fn layout_status_text(&self) -> String {
        match self.layout.state() {
            SimulationState::Idle => "layout settled".to_owned(),
            SimulationState::Simulating { .. } => {
                format!("simulating (alpha {:.3})", self.layout.alpha())
            }
            SimulationState::Dragging { .. } => {
                format!("dragging (alpha {:.3})", self.layout.alpha())
            }
        }
    }

    pub(in crate::app) fn show(&mut self, ctx: &Context) {
        egui::TopBottomPanel::top("top_bar")
            .resizable(false)
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.heading("prov-lens");
                    ui.separator();

                    let stats = self.model.stats;
                    ui.label(format!("nodes: {}", stats.total_nodes));
                    ui.label(format!("entities: {}", stats.entity_count));
                    ui.label(format!("activities: {}", stats.activity_count));
                    ui.label(format!("agents: {}", stats.agent_count));
                    ui.label(format!("edges: {}", self.model.edges.len()));
                    ui.separator();

                    let back = ui
                        .add_enabled(self.history.can_go_back(), egui::Button::new("Back"))
                        .on_hover_text("Highlight the previous node again.");
                    if back.clicked() {
                        self.go_back();
                    }
                    let forward = ui
                        .add_enabled(self.history.can_go_forward(), egui::Button::new("Forward"))
                        .on_hover_text("Return to the node you came back from.");
                    if forward.clicked() {
                        self.go_forward();
                    }
                    if ui.button("Fit to view").clicked() {
                        self.fit_requested = true;
                    }
                    if ui
                        .button("Export SVG")
                        .on_hover_text("Save the current view as an SVG file next to the document.")
                        .clicked()
                    {
                        self.export_current_view();
                    }

                    ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                        ui.label(self.layout_status_text());
                        if let Some(status) = &self.export_status {
                            ui.label(status.as_str());
                        }
                    });
                });
            });

        egui::SidePanel::left("controls")
            .resizable(true)
            .default_width(320.0)
            .show(ctx, |ui| self.draw_controls(ui));

        egui::SidePanel::right("details")
            .resizable(true)
            .default_width(360.0)
            .show(ctx, |ui| self.draw_details(ui));

        egui::CentralPanel::default()
            .frame(egui::Frame::NONE)
            .show(ctx, |ui| self.draw_graph(ui));
    }
}
