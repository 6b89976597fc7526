use eframe::egui::{self, Align2, Color32, FontId, Pos2, Rect, Sense, Shape, Stroke, Ui, vec2};

use crate::scene::{EdgePath, SceneLabel, build_scene, style};

use super::super::ViewModel;
use super::super::render_utils::{draw_background, span_visible, world_to_screen};
use super::super::viewport::fit_transform;

const FIT_MARGIN: f32 = 40.0;
/// Extra room around off-screen geometry before it is culled.
const CULL_PADDING: f32 = 90.0;
const INFO_TEXT_COLOR: Color32 = Color32::from_gray(40);

fn draw_label(
    painter: &egui::Painter,
    rect: Rect,
    label: &SceneLabel,
    scale: f32,
    to_screen: impl Fn(Pos2) -> Pos2,
) {
    let position = to_screen(label.position);
    if !rect.expand(CULL_PADDING).contains(position) {
        return;
    }
    // SVG text sits on its baseline, so anchor the bottom of the glyphs there.
    painter.text(
        position,
        Align2::CENTER_BOTTOM,
        label.text.as_str(),
        FontId::proportional((style::LABEL_SIZE * scale).max(1.0)),
        style::LABEL_COLOR,
    );
}

impl ViewModel {
    pub(in crate::app) fn draw_graph(&mut self, ui: &mut Ui) {
        if self.graph_dirty {
            self.rebuild_graph();
        }

        let (rect, response) = ui.allocate_exact_size(ui.available_size(), Sense::click_and_drag());
        let painter = ui.painter_at(rect);
        self.view_size = rect.size();

        self.handle_graph_zoom(ui, rect, &response);
        self.handle_graph_drag(ui, rect, &response);

        let hovered = self.hovered_node(ui, rect);
        if hovered.is_some() {
            ui.output_mut(|output| {
                output.cursor_icon = egui::CursorIcon::PointingHand;
            });
        }
        self.handle_graph_click(&response, hovered);
        self.hovered = hovered;

        let layout_moving = self.layout.tick(&mut self.model);
        self.scene = build_scene(
            &self.model,
            &self.display,
            self.selection.as_ref(),
            self.hovered,
        );

        let now = ui.input(|input| input.time);
        if self.fit_requested {
            self.fit_requested = false;
            if let Some(bounds) = self.scene.bounds() {
                self.viewport
                    .set_transform(fit_transform(bounds, self.view_size, FIT_MARGIN));
            }
        }
        self.apply_pending_focus(now);
        self.viewport.advance(now);

        let transform = self.viewport.transform();
        let scale = transform.scale;
        let to_screen = |world: Pos2| world_to_screen(rect, transform, world);

        draw_background(&painter, rect, transform);

        for edge in self.scene.edges.iter().filter(|edge| edge.visible) {
            let stroke = Stroke::new(style::EDGE_WIDTH * scale, edge.color);
            match &edge.path {
                EdgePath::Line { from, to } => {
                    let (from, to) = (to_screen(*from), to_screen(*to));
                    if !span_visible(rect, from, to, CULL_PADDING) {
                        continue;
                    }
                    painter.line_segment([from, to], stroke);
                }
                EdgePath::Loop(self_loop) => {
                    let center = to_screen(self_loop.center);
                    if !span_visible(rect, center, center, CULL_PADDING * scale.max(1.0)) {
                        continue;
                    }
                    let points = self_loop.points().into_iter().map(to_screen).collect();
                    painter.add(Shape::line(points, stroke));
                }
            }
            let arrow = edge.arrow.iter().copied().map(to_screen).collect();
            painter.add(Shape::convex_polygon(arrow, edge.color, Stroke::NONE));
        }

        for label in self.scene.edges.iter().filter_map(|edge| edge.label.as_ref()) {
            draw_label(&painter, rect, label, scale, to_screen);
        }

        for node in &self.scene.nodes {
            let bounds = node.shape.bounding_rect(node.center);
            if !span_visible(rect, to_screen(bounds.min), to_screen(bounds.max), 2.0) {
                continue;
            }
            let outline = node.shape.outline(node.center).into_iter().map(to_screen).collect();
            painter.add(Shape::convex_polygon(
                outline,
                node.fill,
                Stroke::new(node.stroke.width * scale, node.stroke.color),
            ));
        }

        for label in self.scene.nodes.iter().filter_map(|node| node.label.as_ref()) {
            draw_label(&painter, rect, label, scale, to_screen);
        }

        if let Some(node) = hovered.and_then(|index| self.scene.nodes.get(index)) {
            painter.text(
                rect.left_top() + vec2(10.0, 10.0),
                Align2::LEFT_TOP,
                format!("{}  |  {}", node.id, node.group.title()),
                FontId::proportional(13.0),
                INFO_TEXT_COLOR,
            );
        }

        if layout_moving || self.viewport.is_animating() || response.dragged() {
            ui.ctx().request_repaint();
        }
    }
}
