use std::ops::RangeInclusive;

use eframe::egui::{self, Ui};

use crate::prov::RelationKind;

use super::super::ViewModel;
use super::super::physics::LayoutParams;

/// Slider for one layout force. Returns true once an edit is finished, so a drag
/// rebuilds the graph on release rather than every frame.
fn layout_slider(
    ui: &mut Ui,
    value: &mut f32,
    range: RangeInclusive<f32>,
    text: &str,
    hover: &str,
) -> bool {
    let response = ui
        .add(
            egui::Slider::new(value, range)
                .text(text)
                .clamping(egui::SliderClamping::Always),
        )
        .on_hover_text(hover);
    response.drag_stopped() || (response.changed() && !response.dragged())
}

impl ViewModel {
    pub(in crate::app) fn draw_controls(&mut self, ui: &mut Ui) {
        ui.heading("Graph Controls");
        ui.separator();
        ui.add_space(4.0);

        self.draw_search(ui);
        ui.separator();

        ui.checkbox(&mut self.display.show_node_labels, "Show node labels")
            .on_hover_text("Draw a shortened id above every node.");
        ui.checkbox(&mut self.display.show_link_labels, "Show link labels")
            .on_hover_text("Draw the relation type on every edge.");

        ui.collapsing("Relation types", |ui| {
            for kind in RelationKind::ALL {
                ui.checkbox(self.display.hidden_mut(kind), format!("Hide {}", kind.name()));
            }
        });

        ui.separator();

        let mut edited = false;
        ui.collapsing("Layout forces", |ui| {
            edited |= layout_slider(
                ui,
                &mut self.params.node_distance,
                LayoutParams::DISTANCE_RANGE,
                "Node distance",
                "Rest length of the spring along every edge.",
            );
            edited |= layout_slider(
                ui,
                &mut self.params.node_repulsion,
                LayoutParams::REPULSION_RANGE,
                "Node repulsion",
                "Charge between every pair of nodes. Negative values push apart.",
            );
            edited |= layout_slider(
                ui,
                &mut self.params.node_collision,
                LayoutParams::COLLISION_RANGE,
                "Node collision",
                "Radius each node keeps clear of its neighbours.",
            );
            edited |= layout_slider(
                ui,
                &mut self.params.alpha_decay,
                LayoutParams::ALPHA_DECAY_RANGE,
                "Alpha decay",
                "How quickly the simulation cools down. Higher settles sooner.",
            );

            ui.horizontal(|ui| {
                if ui.button("Reset forces").clicked() {
                    self.params = LayoutParams::default();
                    edited = true;
                }
                if ui
                    .button("Rebuild graph")
                    .on_hover_text("Scatter the nodes again and restart the simulation.")
                    .clicked()
                {
                    self.graph_dirty = true;
                }
            });
        });

        // Any force change restarts from a freshly built model.
        if edited && self.layout_params_changed() {
            self.graph_dirty = true;
        }
    }
}
