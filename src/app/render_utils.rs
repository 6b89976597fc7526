use eframe::egui::{Color32, Painter, Pos2, Rect, Stroke};

use crate::scene::{ViewTransform, style};

const GRID_STEP: f32 = 56.0;
const GRID_COLOR: Color32 = Color32::from_rgba_premultiplied(0, 0, 0, 10);

pub(super) fn draw_background(painter: &Painter, rect: Rect, transform: ViewTransform) {
    painter.rect_filled(rect, 0.0, style::BACKGROUND);

    let step = (GRID_STEP * transform.scale.clamp(0.6, 1.8)).max(20.0);
    let origin = rect.min + transform.translate;
    let stroke = Stroke::new(1.0, GRID_COLOR);

    let mut x = rect.left() + (origin.x - rect.left()).rem_euclid(step);
    while x < rect.right() {
        painter.line_segment([Pos2::new(x, rect.top()), Pos2::new(x, rect.bottom())], stroke);
        x += step;
    }

    let mut y = rect.top() + (origin.y - rect.top()).rem_euclid(step);
    while y < rect.bottom() {
        painter.line_segment([Pos2::new(rect.left(), y), Pos2::new(rect.right(), y)], stroke);
        y += step;
    }
}

pub(super) fn world_to_screen(rect: Rect, transform: ViewTransform, world: Pos2) -> Pos2 {
    transform.apply(world) + rect.min.to_vec2()
}

pub(super) fn screen_to_world(rect: Rect, transform: ViewTransform, screen: Pos2) -> Pos2 {
    transform.invert(screen - rect.min.to_vec2())
}

/// Whether the box spanned by `a` and `b`, grown by `padding`, touches `rect`.
pub(super) fn span_visible(rect: Rect, a: Pos2, b: Pos2, padding: f32) -> bool {
    Rect::from_two_pos(a, b).expand(padding).intersects(rect)
}
