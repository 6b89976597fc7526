use std::f32::consts::{FRAC_PI_2, TAU};

use eframe::egui::{Pos2, Rect, Vec2, pos2, vec2};

use crate::prov::NodeGroup;

const ARC_SEGMENTS: usize = 6;
const LOOP_SEGMENTS: usize = 48;
/// Horizontal gap between the two ends of a self-loop arc.
const LOOP_GAP: f32 = 1.0;
const LOOP_RADII: Vec2 = vec2(22.0, 40.0);
const ARROW_LENGTH: f32 = 16.0;
const ARROW_HALF_WIDTH: f32 = 8.0;
/// Distance kept between an arrow tip and the target node's center.
pub const ARROW_INSET: f32 = 16.0;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum NodeShape {
    RoundedRect { size: Vec2, radius: f32 },
    Rect { size: Vec2 },
    /// Square body with a pointed roof; `side` is the body width.
    House { side: f32 },
}

impl NodeShape {
    pub fn for_group(group: NodeGroup) -> Self {
        match group {
            NodeGroup::Entity => Self::RoundedRect {
                size: vec2(40.0, 30.0),
                radius: 15.0,
            },
            NodeGroup::Activity => Self::Rect {
                size: vec2(40.0, 30.0),
            },
            NodeGroup::Agent => Self::House { side: 40.0 },
        }
    }

    /// Half of the shape's vertical extent above its center.
    pub fn top_offset(&self) -> f32 {
        match *self {
            Self::RoundedRect { size, .. } | Self::Rect { size } => size.y * 0.5,
            Self::House { side } => side * 0.5,
        }
    }

    pub fn bounding_rect(&self, center: Pos2) -> Rect {
        let size = match *self {
            Self::RoundedRect { size, .. } | Self::Rect { size } => size,
            Self::House { side } => Vec2::splat(side),
        };
        Rect::from_center_size(center, size)
    }

    /// Convex outline around `center`, clockwise on screen.
    pub fn outline(&self, center: Pos2) -> Vec<Pos2> {
        match *self {
            Self::RoundedRect { size, radius } => {
                let half = size * 0.5;
                let radius = radius.clamp(0.0, half.min_elem());
                let inner = half - Vec2::splat(radius);
                // Corner arc centers with their starting angle.
                let corners = [
                    (vec2(inner.x, -inner.y), -FRAC_PI_2),
                    (vec2(inner.x, inner.y), 0.0),
                    (vec2(-inner.x, inner.y), FRAC_PI_2),
                    (vec2(-inner.x, -inner.y), std::f32::consts::PI),
                ];

                let mut points = Vec::with_capacity(corners.len() * (ARC_SEGMENTS + 1));
                for (offset, start) in corners {
                    for step in 0..=ARC_SEGMENTS {
                        let angle = start + FRAC_PI_2 * step as f32 / ARC_SEGMENTS as f32;
                        points.push(center + offset + Vec2::angled(angle) * radius);
                    }
                }
                points.dedup();
                points
            }
            Self::Rect { size } => {
                let half = size * 0.5;
                vec![
                    center + vec2(-half.x, -half.y),
                    center + vec2(half.x, -half.y),
                    center + vec2(half.x, half.y),
                    center + vec2(-half.x, half.y),
                ]
            }
            Self::House { side } => {
                let half = side * 0.5;
                vec![
                    center + vec2(0.0, -half),
                    center + vec2(half, 0.0),
                    center + vec2(half, half),
                    center + vec2(-half, half),
                    center + vec2(-half, 0.0),
                ]
            }
        }
    }

    /// Path data relative to the node center, placed with a `translate` transform.
    pub fn svg_path(&self) -> String {
        match *self {
            Self::RoundedRect { size, radius } => {
                let (x0, x1, y0, y1) = (-size.x / 2.0, size.x / 2.0, -size.y / 2.0, size.y / 2.0);
                let r = radius;
                format!(
                    "M {},{} H {} A {r},{r} 0 0 1 {x1},{} V {} A {r},{r} 0 0 1 {},{y1} \
                     H {} A {r},{r} 0 0 1 {x0},{} V {} A {r},{r} 0 0 1 {},{y0} Z",
                    x0 + r,
                    y0,
                    x1 - r,
                    y0 + r,
                    y1 - r,
                    x1 - r,
                    x0 + r,
                    y1 - r,
                    y0 + r,
                    x0 + r,
                )
            }
            Self::Rect { size } => {
                let (x0, x1, y0, y1) = (-size.x / 2.0, size.x / 2.0, -size.y / 2.0, size.y / 2.0);
                format!("M {x0},{y0} L {x1},{y0} L {x1},{y1} L {x0},{y1} Z")
            }
            Self::House { side } => {
                let half = side / 2.0;
                format!("M {},0 L {},{half} L {half},{half} L {half},0 L 0,{} Z", -half, -half, -half)
            }
        }
    }

    pub fn contains(&self, center: Pos2, point: Pos2) -> bool {
        let local = point - center;
        match *self {
            Self::RoundedRect { size, radius } => {
                let half = size * 0.5;
                let radius = radius.clamp(0.0, half.min_elem());
                let inner = half - Vec2::splat(radius);
                let outside = (local.abs() - inner).max(Vec2::ZERO);
                outside.length_sq() <= radius * radius
            }
            Self::Rect { size } => local.x.abs() <= size.x * 0.5 && local.y.abs() <= size.y * 0.5,
            Self::House { .. } => {
                let outline = self.outline(Pos2::ZERO);
                let local = local.to_pos2();
                outline.iter().enumerate().all(|(index, &from)| {
                    let to = outline[(index + 1) % outline.len()];
                    (to - from).x * (local - from).y - (to - from).y * (local - from).x >= 0.0
                })
            }
        }
    }
}

/// Ellipse arc drawn above a node for an edge that starts and ends on it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SelfLoop {
    pub center: Pos2,
    pub radii: Vec2,
}

impl SelfLoop {
    /// Loop whose lowest point touches the top of a node shape.
    pub fn above(node: Pos2, shape: NodeShape) -> Self {
        let anchor_y = node.y - shape.top_offset();
        Self {
            center: pos2(node.x, anchor_y - LOOP_RADII.y),
            radii: LOOP_RADII,
        }
    }

    fn point_at(&self, angle: f32) -> Pos2 {
        self.center + vec2(angle.cos() * self.radii.x, angle.sin() * self.radii.y)
    }

    fn gap_angle(&self) -> f32 {
        (LOOP_GAP * 0.5 / self.radii.x).asin()
    }

    pub fn start(&self) -> Pos2 {
        self.point_at(FRAC_PI_2 + self.gap_angle())
    }

    pub fn end(&self) -> Pos2 {
        self.point_at(FRAC_PI_2 - self.gap_angle())
    }

    /// Sampled arc from [`Self::start`] round the top to [`Self::end`].
    pub fn points(&self) -> Vec<Pos2> {
        let from = FRAC_PI_2 + self.gap_angle();
        let sweep = TAU - 2.0 * self.gap_angle();
        (0..=LOOP_SEGMENTS)
            .map(|step| self.point_at(from + sweep * step as f32 / LOOP_SEGMENTS as f32))
            .collect()
    }

    /// Travel direction where the arc meets the node again.
    pub fn end_direction(&self) -> Vec2 {
        vec2(-1.0, 0.0)
    }

    pub fn label_anchor(&self) -> Pos2 {
        self.center
    }

    pub fn svg_path(&self) -> String {
        let start = self.start();
        let end = self.end();
        format!(
            "M {},{} A {},{} 0 1,1 {},{}",
            start.x, start.y, self.radii.x, self.radii.y, end.x, end.y
        )
    }
}

/// Triangle whose tip sits at `tip`, pointing along `direction`.
pub fn arrow_head(tip: Pos2, direction: Vec2) -> [Pos2; 3] {
    let direction = direction.normalized();
    let base = tip - direction * ARROW_LENGTH;
    let side = direction.rot90() * ARROW_HALF_WIDTH;
    [tip, base + side, base - side]
}
