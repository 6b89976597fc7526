use eframe::egui::{self, RichText, Ui};

use crate::prov::{NONE_MARKER, related_ids};

use super::super::ViewModel;

impl ViewModel {
    pub(in crate::app) fn draw_details(&mut self, ui: &mut Ui) {
        ui.heading("Node Details");
        ui.add_space(6.0);

        let Some(detail) = &self.detail else {
            ui.label("Click a node in the graph or search for one.");
            return;
        };

        ui.label(RichText::new(detail.id.as_str()).strong());
        ui.label(format!("Group: {}", detail.group));
        ui.label(format!("Type: {}", detail.node_type));
        ui.separator();

        let mut follow = None;
        egui::ScrollArea::vertical()
            .id_salt("node_relations_scroll")
            .auto_shrink([false, false])
            .show(ui, |ui| {
                egui::Grid::new("node_relations")
                    .num_columns(2)
                    .striped(true)
                    .show(ui, |ui| {
                        for (label, value) in detail.rows() {
                            ui.label(RichText::new(label).strong());
                            ui.horizontal_wrapped(|ui| {
                                let mut any = false;
                                for id in related_ids(value) {
                                    any = true;
                                    if ui.link(id).on_hover_text("Highlight this node").clicked() {
                                        follow = Some(id.to_owned());
                                    }
                                }
                                if !any {
                                    ui.weak(NONE_MARKER);
                                }
                            });
                            ui.end_row();
                        }
                    });
            });

        if let Some(node_id) = follow {
            self.highlight(&node_id);
        }
    }
}
