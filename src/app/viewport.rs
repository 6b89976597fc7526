use eframe::egui::{Pos2, Rect, Vec2};
use tracing::warn;

use crate::scene::{Scene, ViewTransform, node_selector};

pub const MIN_SCALE: f32 = 0.1;
pub const MAX_SCALE: f32 = 10.0;
/// Seconds a camera focus transition takes.
pub const FOCUS_DURATION: f64 = 0.75;

/// Zoom level a focus transition ends at, given the current one.
pub fn focus_zoom(current: f32) -> f32 {
    if current < 0.5 {
        1.5
    } else if current > 2.0 {
        current
    } else {
        current * 1.2
    }
}

fn ease_cubic_in_out(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0) * 2.0;
    if t <= 1.0 {
        t * t * t / 2.0
    } else {
        let t = t - 2.0;
        (t * t * t + 2.0) / 2.0
    }
}

/// Transform showing all of `bounds` inside a view of `view_size`, leaving `margin`
/// on every side. Never zooms in past 1:1.
pub fn fit_transform(bounds: Rect, view_size: Vec2, margin: f32) -> ViewTransform {
    let available = (view_size - Vec2::splat(margin * 2.0)).max(Vec2::splat(1.0));
    let extent = bounds.size().max(Vec2::splat(1.0));
    let scale = (available.x / extent.x)
        .min(available.y / extent.y)
        .clamp(MIN_SCALE, 1.0);
    ViewTransform {
        translate: view_size * 0.5 - bounds.center().to_vec2() * scale,
        scale,
    }
}

#[derive(Clone, Copy, Debug)]
struct Transition {
    from: ViewTransform,
    to: ViewTransform,
    started: f64,
}

#[derive(Clone, Debug, Default)]
pub struct Viewport {
    transform: ViewTransform,
    transition: Option<Transition>,
}

impl Viewport {
    pub fn transform(&self) -> ViewTransform {
        self.transform
    }

    pub fn is_animating(&self) -> bool {
        self.transition.is_some()
    }

    /// Scales by `factor` keeping the world point under `anchor` fixed.
    pub fn zoom_at(&mut self, anchor: Pos2, factor: f32) {
        if !factor.is_finite() || factor <= 0.0 {
            return;
        }
        self.transition = None;

        let world = self.transform.invert(anchor);
        let scale = (self.transform.scale * factor).clamp(MIN_SCALE, MAX_SCALE);
        self.transform = ViewTransform {
            translate: anchor.to_vec2() - world.to_vec2() * scale,
            scale,
        };
    }

    pub fn set_transform(&mut self, transform: ViewTransform) {
        self.transition = None;
        self.transform = transform;
    }

    pub fn pan_by(&mut self, delta: Vec2) {
        self.transition = None;
        self.transform.translate += delta;
    }

    /// Starts a transition centering `world` in a view of `view_size`. A transition
    /// already running is replaced, starting from wherever it got to.
    pub fn focus_on(&mut self, world: Pos2, view_size: Vec2, now: f64) {
        let scale = focus_zoom(self.transform.scale).clamp(MIN_SCALE, MAX_SCALE);
        let target = ViewTransform {
            translate: view_size * 0.5 - world.to_vec2() * scale,
            scale,
        };
        self.transition = Some(Transition {
            from: self.transform,
            to: target,
            started: now,
        });
    }

    /// Looks the node up by its anchor and focuses it. Unknown ids are logged and
    /// leave the camera alone.
    pub fn focus_on_node(
        &mut self,
        scene: &Scene,
        node_id: &str,
        view_size: Vec2,
        now: f64,
    ) -> bool {
        let selector = node_selector(node_id);
        let Some(node) = scene.find_anchor(&selector) else {
            warn!(
                selector = selector.as_str(),
                "focus requested for a node that is not in the scene"
            );
            return false;
        };

        if !(node.center.x.is_finite() && node.center.y.is_finite()) {
            warn!(node = node_id, "focus requested for a node without a position");
            return false;
        }

        self.focus_on(node.center, view_size, now);
        true
    }

    /// Moves a running transition to `now`. Returns whether it is still running.
    pub fn advance(&mut self, now: f64) -> bool {
        let Some(transition) = self.transition else {
            return false;
        };

        let progress = ((now - transition.started) / FOCUS_DURATION) as f32;
        if progress >= 1.0 {
            self.transform = transition.to;
            self.transition = None;
            return false;
        }

        let eased = ease_cubic_in_out(progress);
        self.transform = ViewTransform {
            translate: transition.from.translate
                + (transition.to.translate - transition.from.translate) * eased,
            scale: transition.from.scale + (transition.to.scale - transition.from.scale) * eased,
        };
        true
    }
}

#[cfg(test)]
mod tests {
    use eframe::egui::{pos2, vec2};
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use serde_json::json;

    use super::*;
    use crate::prov::{CANVAS_SIZE, ProvDocument, build_graph_model};
    use crate::scene::{DisplayOptions, build_scene};

    fn at_scale(scale: f32) -> Viewport {
        Viewport {
            transform: ViewTransform {
                translate: Vec2::ZERO,
                scale,
            },
            transition: None,
        }
    }

    #[test]
    fn focus_zoom_rule() {
        assert!((focus_zoom(1.0) - 1.2).abs() < 1e-6);
        assert_eq!(focus_zoom(0.3), 1.5);
        assert_eq!(focus_zoom(3.0), 3.0);
        assert!((focus_zoom(0.5) - 0.6).abs() < 1e-6);
        assert!((focus_zoom(2.0) - 2.4).abs() < 1e-6);
    }

    #[test]
    fn focus_transition_ends_centered() {
        let mut viewport = at_scale(1.0);
        let view = vec2(800.0, 600.0);
        viewport.focus_on(pos2(100.0, 50.0), view, 10.0);
        assert!(viewport.is_animating());

        assert!(viewport.advance(10.3));
        let halfway = viewport.transform().scale;
        assert!(halfway > 1.0 && halfway < 1.2);

        assert!(!viewport.advance(10.0 + FOCUS_DURATION));
        let transform = viewport.transform();
        assert!((transform.scale - 1.2).abs() < 1e-6);
        let centered = transform.apply(pos2(100.0, 50.0));
        assert!((centered - pos2(400.0, 300.0)).length() < 1e-3);
    }

    #[test]
    fn second_focus_overrides_first() {
        let mut viewport = at_scale(3.0);
        let view = vec2(800.0, 600.0);
        viewport.focus_on(pos2(0.0, 0.0), view, 0.0);
        viewport.advance(0.2);
        viewport.focus_on(pos2(500.0, 500.0), view, 0.2);
        viewport.advance(5.0);

        let centered = viewport.transform().apply(pos2(500.0, 500.0));
        assert!((centered - pos2(400.0, 300.0)).length() < 1e-3);
    }

    #[test]
    fn zoom_is_clamped_and_keeps_anchor() {
        let mut viewport = at_scale(1.0);
        let anchor = pos2(200.0, 100.0);
        let world = viewport.transform().invert(anchor);

        viewport.zoom_at(anchor, 1000.0);
        assert_eq!(viewport.transform().scale, MAX_SCALE);
        assert!((viewport.transform().apply(world) - anchor).length() < 1e-3);

        viewport.zoom_at(anchor, 1e-6);
        assert_eq!(viewport.transform().scale, MIN_SCALE);
    }

    #[test]
    fn fit_keeps_bounds_in_view() {
        let bounds = Rect::from_min_max(pos2(-500.0, 0.0), pos2(1500.0, 1000.0));
        let view = vec2(1200.0, 800.0);
        let transform = fit_transform(bounds, view, 40.0);

        assert!(transform.scale < 1.0);
        let min = transform.apply(bounds.min);
        let max = transform.apply(bounds.max);
        assert!(min.x >= 39.9 && min.y >= 39.9);
        assert!(max.x <= 1160.1 && max.y <= 760.1);

        let small = Rect::from_center_size(pos2(10.0, 10.0), vec2(20.0, 20.0));
        assert_eq!(fit_transform(small, view, 40.0).scale, 1.0);
    }

    #[test]
    fn gestures_cancel_running_transition() {
        let mut viewport = at_scale(1.0);
        viewport.focus_on(pos2(10.0, 10.0), vec2(100.0, 100.0), 0.0);
        viewport.pan_by(vec2(5.0, 0.0));
        assert!(!viewport.is_animating());
        assert_eq!(viewport.transform().translate, vec2(5.0, 0.0));
    }

    #[test]
    fn focus_on_unknown_node_is_a_no_op() {
        let document = ProvDocument::from_value(json!({ "entity": { "e1": [{}] } }))
            .expect("valid document");
        let mut rng = StdRng::seed_from_u64(1);
        let model = build_graph_model(&document, CANVAS_SIZE, &mut rng);
        let scene = build_scene(&model, &DisplayOptions::default(), None, None);

        let mut viewport = at_scale(1.0);
        assert!(!viewport.focus_on_node(&scene, "ghost", vec2(800.0, 600.0), 0.0));
        assert!(!viewport.is_animating());

        assert!(viewport.focus_on_node(&scene, "e1", vec2(800.0, 600.0), 0.0));
        assert!(viewport.is_animating());
    }
}
