use eframe::egui::{PointerButton, Pos2, Rect, Response, Ui};
use tracing::debug;

use crate::prov::resolve_node_detail;
use crate::scene::{Emphasis, Selection};

use super::super::ViewModel;
use super::super::render_utils::screen_to_world;

const SCROLL_ZOOM_RATE: f32 = 0.0018;

impl ViewModel {
    pub(in crate::app) fn handle_graph_zoom(&mut self, ui: &Ui, rect: Rect, response: &Response) {
        if !response.hovered() {
            return;
        }

        let scroll = ui.input(|input| input.raw_scroll_delta.y);
        if scroll.abs() <= f32::EPSILON {
            return;
        }

        let pointer = ui
            .input(|input| input.pointer.hover_pos())
            .unwrap_or_else(|| rect.center());
        let zoom_factor = (1.0 + (scroll * SCROLL_ZOOM_RATE)).clamp(0.85, 1.15);
        self.viewport.zoom_at(pointer - rect.min.to_vec2(), zoom_factor);
    }

    /// Primary drag on a node moves it through the layout; any other drag pans.
    pub(in crate::app) fn handle_graph_drag(&mut self, ui: &Ui, rect: Rect, response: &Response) {
        let transform = self.viewport.transform();

        if response.drag_started_by(PointerButton::Primary)
            && let Some(origin) = ui.input(|input| input.pointer.press_origin())
        {
            let world = screen_to_world(rect, transform, origin);
            if let Some(node) = self.scene.node_at(world) {
                self.begin_node_drag(node, world);
            }
        }

        if self.layout.dragged_node().is_some() {
            let pointer = ui.input(|input| input.pointer.interact_pos());
            match pointer {
                Some(pointer) if response.dragged_by(PointerButton::Primary) => {
                    self.move_node_drag(screen_to_world(rect, transform, pointer));
                }
                _ => self.layout.drag_end(&mut self.model),
            }
            return;
        }

        if response.dragged_by(PointerButton::Primary)
            || response.dragged_by(PointerButton::Secondary)
            || response.dragged_by(PointerButton::Middle)
        {
            self.viewport.pan_by(response.drag_delta());
        }
    }

    /// Pins `node` where it is, remembering where on the node it was grabbed.
    fn begin_node_drag(&mut self, node: usize, world: Pos2) {
        let Some(position) = self.model.nodes.get(node).map(|node| node.position) else {
            return;
        };
        debug!(node, "drag started");
        self.drag_offset = position - world.to_vec2();
        self.layout.drag_start(&mut self.model, node, position);
    }

    fn move_node_drag(&mut self, world: Pos2) {
        self.layout
            .drag_move(&mut self.model, world.to_vec2() + self.drag_offset);
    }

    /// Node under the pointer, hit-tested against the last painted scene.
    pub(in crate::app) fn hovered_node(&self, ui: &Ui, rect: Rect) -> Option<usize> {
        let pointer = ui.input(|input| input.pointer.hover_pos())?;
        if !rect.contains(pointer) {
            return None;
        }
        self.scene
            .node_at(screen_to_world(rect, self.viewport.transform(), pointer))
    }

    pub(in crate::app) fn handle_graph_click(&mut self, response: &Response, hovered: Option<usize>) {
        if !response.clicked_by(PointerButton::Primary) {
            return;
        }

        let Some(node_id) = hovered.and_then(|index| self.model.nodes.get(index)) else {
            return;
        };
        let node_id = node_id.id.clone();
        self.click_node(&node_id);
    }

    /// Pointer selection: thin outline, recorded in the history, camera follows.
    fn click_node(&mut self, node_id: &str) {
        if self.select_node(node_id, Emphasis::Clicked) {
            self.history.push(node_id);
            self.pending_focus = Some(node_id.to_owned());
        }
    }

    /// Outlines the node and publishes its detail.
    fn select_node(&mut self, node_id: &str, emphasis: Emphasis) -> bool {
        let Some(detail) = resolve_node_detail(&self.document, node_id) else {
            return false;
        };

        debug!(node = node_id, ?emphasis, "node selected");
        self.selection = Some(Selection {
            node: node_id.to_owned(),
            emphasis,
        });
        self.detail = Some(detail);
        true
    }

    /// Selects the node, records it in the history and moves the camera to it on the
    /// next frame.
    pub(in crate::app) fn highlight(&mut self, node_id: &str) {
        if self.select_node(node_id, Emphasis::Highlighted) {
            self.history.push(node_id);
        }
        self.pending_focus = Some(node_id.to_owned());
    }

    pub(in crate::app) fn go_back(&mut self) {
        if let Some(node_id) = self.history.back().map(str::to_owned) {
            self.revisit(&node_id);
        }
    }

    pub(in crate::app) fn go_forward(&mut self) {
        if let Some(node_id) = self.history.forward().map(str::to_owned) {
            self.revisit(&node_id);
        }
    }

    fn revisit(&mut self, node_id: &str) {
        self.select_node(node_id, Emphasis::Highlighted);
        self.pending_focus = Some(node_id.to_owned());
    }

    /// Starts the camera transition for a pending highlight once the scene is current.
    pub(in crate::app) fn apply_pending_focus(&mut self, now: f64) {
        if self.scene.nodes.len() != self.model.nodes.len() {
            return;
        }
        if let Some(node_id) = self.pending_focus.take() {
            self.viewport
                .focus_on_node(&self.scene, &node_id, self.view_size, now);
        }
    }
}
