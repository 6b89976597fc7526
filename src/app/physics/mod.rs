mod forces;
mod quadtree;

use std::ops::RangeInclusive;

use eframe::egui::Vec2;
use tracing::debug;

use crate::prov::GraphModel;
use forces::{Spring, apply_charge, apply_collision, apply_springs, center_shift, jiggle};
use quadtree::QuadCell;

const ALPHA_MIN: f32 = 0.001;
const ALPHA_START: f32 = 1.0;
const ALPHA_DRAG_TARGET: f32 = 0.3;
const VELOCITY_RETAIN: f32 = 0.6;
const LINK_STRENGTH: f32 = 2.0;
const BARNES_HUT_THETA: f32 = 0.9;

/// Tunable forces. Any change means a fresh [`ForceLayout`] over a rebuilt model.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LayoutParams {
    pub node_distance: f32,
    pub node_repulsion: f32,
    pub node_collision: f32,
    pub alpha_decay: f32,
}

impl LayoutParams {
    pub const DISTANCE_RANGE: RangeInclusive<f32> = 50.0..=500.0;
    pub const REPULSION_RANGE: RangeInclusive<f32> = -1000.0..=0.0;
    pub const COLLISION_RANGE: RangeInclusive<f32> = 0.0..=100.0;
    pub const ALPHA_DECAY_RANGE: RangeInclusive<f32> = 0.001..=0.1;

    pub fn clamped(self) -> Self {
        fn clamp(value: f32, range: &RangeInclusive<f32>, fallback: f32) -> f32 {
            if value.is_finite() {
                value.clamp(*range.start(), *range.end())
            } else {
                fallback
            }
        }

        let defaults = Self::default();
        Self {
            node_distance: clamp(self.node_distance, &Self::DISTANCE_RANGE, defaults.node_distance),
            node_repulsion: clamp(
                self.node_repulsion,
                &Self::REPULSION_RANGE,
                defaults.node_repulsion,
            ),
            node_collision: clamp(
                self.node_collision,
                &Self::COLLISION_RANGE,
                defaults.node_collision,
            ),
            alpha_decay: clamp(self.alpha_decay, &Self::ALPHA_DECAY_RANGE, defaults.alpha_decay),
        }
    }
}

impl Default for LayoutParams {
    fn default() -> Self {
        Self {
            node_distance: 180.0,
            node_repulsion: -300.0,
            node_collision: 40.0,
            alpha_decay: 0.005,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SimulationState {
    /// Energy fell below [`ALPHA_MIN`]; ticks leave positions untouched.
    Idle,
    Simulating { alpha: f32 },
    Dragging { node: usize, pointer: Vec2, alpha: f32 },
}

pub struct ForceLayout {
    params: LayoutParams,
    center: Vec2,
    springs: Vec<Spring>,
    state: SimulationState,
    positions: Vec<Vec2>,
    predicted: Vec<Vec2>,
    velocities: Vec<Vec2>,
}

impl ForceLayout {
    pub fn new(params: LayoutParams, model: &GraphModel) -> Self {
        let mut degree = vec![0usize; model.nodes.len()];
        for edge in model.edges.iter().filter(|edge| !edge.is_self_loop()) {
            degree[edge.source] += 1;
            degree[edge.target] += 1;
        }

        // Self-loops have no length to relax and are left to the renderer.
        let springs = model
            .edges
            .iter()
            .filter(|edge| !edge.is_self_loop())
            .map(|edge| {
                let source = degree[edge.source] as f32;
                let target = degree[edge.target] as f32;
                Spring {
                    source: edge.source,
                    target: edge.target,
                    bias: source / (source + target),
                }
            })
            .collect();

        Self {
            params: params.clamped(),
            center: model.canvas * 0.5,
            springs,
            state: SimulationState::Simulating { alpha: ALPHA_START },
            positions: Vec::new(),
            predicted: Vec::new(),
            velocities: Vec::new(),
        }
    }

    pub fn params(&self) -> LayoutParams {
        self.params
    }

    pub fn state(&self) -> SimulationState {
        self.state
    }

    pub fn alpha(&self) -> f32 {
        match self.state {
            SimulationState::Idle => 0.0,
            SimulationState::Simulating { alpha } | SimulationState::Dragging { alpha, .. } => alpha,
        }
    }

    pub fn is_settled(&self) -> bool {
        self.state == SimulationState::Idle
    }

    pub fn dragged_node(&self) -> Option<usize> {
        match self.state {
            SimulationState::Dragging { node, .. } => Some(node),
            _ => None,
        }
    }

    /// Pins `node` under the pointer and re-heats the layout toward the drag target.
    pub fn drag_start(&mut self, model: &mut GraphModel, node: usize, pointer: Vec2) {
        if node >= model.nodes.len() {
            return;
        }

        let alpha = match self.state {
            SimulationState::Idle => ALPHA_MIN,
            SimulationState::Simulating { alpha } => alpha,
            SimulationState::Dragging {
                node: previous,
                alpha,
                ..
            } => {
                if let Some(previous) = model.nodes.get_mut(previous) {
                    previous.pinned = None;
                }
                alpha
            }
        };

        model.nodes[node].pinned = Some(pointer);
        self.state = SimulationState::Dragging {
            node,
            pointer,
            alpha,
        };
    }

    pub fn drag_move(&mut self, model: &mut GraphModel, pointer: Vec2) {
        if let SimulationState::Dragging {
            node,
            pointer: current,
            ..
        } = &mut self.state
        {
            *current = pointer;
            if let Some(graph_node) = model.nodes.get_mut(*node) {
                graph_node.pinned = Some(pointer);
            }
        }
    }

    /// Releases the pin and lets the energy decay toward zero again.
    pub fn drag_end(&mut self, model: &mut GraphModel) {
        if let SimulationState::Dragging { node, alpha, .. } = self.state {
            if let Some(graph_node) = model.nodes.get_mut(node) {
                graph_node.pinned = None;
            }
            self.state = SimulationState::Simulating { alpha };
        }
    }

    /// One integration step. Returns whether positions moved.
    pub fn tick(&mut self, model: &mut GraphModel) -> bool {
        let (alpha, next) = match self.state {
            SimulationState::Idle => return false,
            SimulationState::Simulating { alpha } => {
                let alpha = alpha - alpha * self.params.alpha_decay;
                if alpha < ALPHA_MIN {
                    debug!(nodes = model.nodes.len(), "layout settled");
                    self.state = SimulationState::Idle;
                    return false;
                }
                (alpha, SimulationState::Simulating { alpha })
            }
            SimulationState::Dragging {
                node,
                pointer,
                alpha,
            } => {
                let alpha = alpha + (ALPHA_DRAG_TARGET - alpha) * self.params.alpha_decay;
                (
                    alpha,
                    SimulationState::Dragging {
                        node,
                        pointer,
                        alpha,
                    },
                )
            }
        };
        self.state = next;
        self.step(model, alpha);
        true
    }

    /// Ticks until the layout settles or `max_ticks` is spent. Returns ticks taken.
    pub fn settle(&mut self, model: &mut GraphModel, max_ticks: usize) -> usize {
        let mut ticks = 0;
        while ticks < max_ticks && self.tick(model) {
            ticks += 1;
        }
        ticks
    }

    fn step(&mut self, model: &mut GraphModel, alpha: f32) {
        let node_count = model.nodes.len();
        if node_count == 0 {
            return;
        }

        self.positions.clear();
        self.velocities.clear();
        for (index, node) in model.nodes.iter().enumerate() {
            if node.position.x.is_finite() && node.position.y.is_finite() {
                self.positions.push(node.position);
                self.velocities.push(node.velocity);
            } else {
                self.positions.push(self.center + jiggle(index, node_count) * 1000.0);
                self.velocities.push(Vec2::ZERO);
            }
        }

        apply_springs(
            &self.springs,
            &self.positions,
            &mut self.velocities,
            self.params.node_distance,
            LINK_STRENGTH,
            alpha,
        );

        let shift = center_shift(&self.positions, self.center);
        for (index, node) in model.nodes.iter().enumerate() {
            if node.pinned.is_none() {
                self.positions[index] += shift;
            }
        }

        if let Some(tree) = QuadCell::build(&self.positions) {
            apply_charge(
                &tree,
                &self.positions,
                &mut self.velocities,
                self.params.node_repulsion,
                BARNES_HUT_THETA,
                alpha,
            );
        }

        self.predicted.clear();
        self.predicted.extend(
            self.positions
                .iter()
                .zip(&self.velocities)
                .map(|(position, velocity)| *position + *velocity),
        );
        if let Some(tree) = QuadCell::build(&self.predicted) {
            apply_collision(
                &tree,
                &self.predicted,
                &mut self.velocities,
                self.params.node_collision,
            );
        }

        for (index, node) in model.nodes.iter_mut().enumerate() {
            if let Some(pinned) = node.pinned {
                node.position = pinned;
                node.velocity = Vec2::ZERO;
                continue;
            }

            let velocity = self.velocities[index] * VELOCITY_RETAIN;
            let position = self.positions[index] + velocity;
            if position.x.is_finite() && position.y.is_finite() {
                node.position = position;
                node.velocity = velocity;
            } else {
                node.position = self.center + jiggle(index, node_count) * 1000.0;
                node.velocity = Vec2::ZERO;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use serde_json::json;

    use super::*;
    use crate::prov::{CANVAS_SIZE, ProvDocument, build_graph_model};

    fn chain_model(seed: u64) -> GraphModel {
        let document = ProvDocument::from_value(json!({
            "entity": { "e1": [{}], "e2": [{}], "e3": [{}] },
            "activity": { "a1": {}, "a2": {} },
            "agent": { "bob": {} },
            "used": { "u1": { "prov:entity": "e1", "prov:activity": "a1" } },
            "wasGeneratedBy": { "g1": { "prov:activity": "a1", "prov:entity": "e2" } },
            "wasInformedBy": { "i1": { "prov:informant": "a1", "prov:informed": "a2" } },
            "wasAssociatedWith": { "w1": { "prov:activity": "a2", "prov:agent": "bob" } },
            "hadMember": { "m1": { "prov:collection": "e3", "prov:entity": "e3" } }
        }))
        .expect("valid document");
        let mut rng = StdRng::seed_from_u64(seed);
        build_graph_model(&document, CANVAS_SIZE, &mut rng)
    }

    fn fast(params: LayoutParams) -> LayoutParams {
        LayoutParams {
            alpha_decay: 0.05,
            ..params
        }
    }

    fn all_finite(model: &GraphModel) -> bool {
        model
            .nodes
            .iter()
            .all(|node| node.position.x.is_finite() && node.position.y.is_finite())
    }

    #[test]
    fn params_clamp_to_supported_ranges() {
        let params = LayoutParams {
            node_distance: 10.0,
            node_repulsion: 50.0,
            node_collision: f32::NAN,
            alpha_decay: 1.0,
        }
        .clamped();

        assert_eq!(params.node_distance, 50.0);
        assert_eq!(params.node_repulsion, 0.0);
        assert_eq!(params.node_collision, 40.0);
        assert_eq!(params.alpha_decay, 0.1);
    }

    #[test]
    fn self_loops_get_no_spring() {
        let model = chain_model(1);
        let layout = ForceLayout::new(LayoutParams::default(), &model);
        assert_eq!(model.edges.len(), 5);
        assert_eq!(layout.springs.len(), 4);
    }

    #[test]
    fn settles_to_finite_positions() {
        let mut model = chain_model(2);
        let mut layout = ForceLayout::new(fast(LayoutParams::default()), &model);

        assert!(layout.tick(&mut model));
        assert!(all_finite(&model));

        layout.settle(&mut model, 10_000);
        assert!(layout.is_settled());
        assert!(all_finite(&model));
        assert!(!layout.tick(&mut model));
    }

    #[test]
    fn linked_nodes_relax_toward_link_distance() {
        let mut model = chain_model(3);
        let mut layout = ForceLayout::new(fast(LayoutParams::default()), &model);
        layout.settle(&mut model, 10_000);

        let e1 = model.node_index("e1").expect("e1");
        let a1 = model.node_index("a1").expect("a1");
        let distance = (model.nodes[e1].position - model.nodes[a1].position).length();
        assert!(distance > 60.0 && distance < 400.0, "distance was {distance}");
    }

    #[test]
    fn drag_pins_then_releases() {
        let mut model = chain_model(4);
        let mut layout = ForceLayout::new(fast(LayoutParams::default()), &model);
        layout.settle(&mut model, 10_000);
        assert!(layout.is_settled());

        let target = Vec2::new(900.0, 100.0);
        layout.drag_start(&mut model, 0, target);
        assert_eq!(layout.dragged_node(), Some(0));
        assert_eq!(model.nodes[0].pinned, Some(target));

        assert!(layout.tick(&mut model));
        assert_eq!(model.nodes[0].position, target);
        assert!(layout.alpha() > ALPHA_MIN);

        let moved = Vec2::new(950.0, 120.0);
        layout.drag_move(&mut model, moved);
        layout.tick(&mut model);
        assert_eq!(model.nodes[0].position, moved);

        layout.drag_end(&mut model);
        assert!(model.nodes[0].pinned.is_none());
        assert!(matches!(layout.state(), SimulationState::Simulating { .. }));

        layout.settle(&mut model, 10_000);
        assert!(layout.is_settled());
        assert!(all_finite(&model));
    }

    #[test]
    fn rebuild_with_new_distance_converges() {
        let mut model = chain_model(5);
        let mut layout = ForceLayout::new(fast(LayoutParams::default()), &model);
        layout.settle(&mut model, 50);

        let mut rebuilt = chain_model(6);
        let params = LayoutParams {
            node_distance: 420.0,
            ..layout.params()
        };
        let mut layout = ForceLayout::new(params, &rebuilt);
        assert_eq!(layout.alpha(), ALPHA_START);

        layout.settle(&mut rebuilt, 10_000);
        assert!(layout.is_settled());
        assert!(all_finite(&rebuilt));
    }

    #[test]
    fn non_finite_positions_are_recovered() {
        let mut model = chain_model(7);
        model.nodes[1].position = Vec2::new(f32::NAN, 3.0);
        let mut layout = ForceLayout::new(LayoutParams::default(), &model);

        layout.tick(&mut model);
        assert!(all_finite(&model));
    }
}
