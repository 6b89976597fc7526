use std::collections::HashMap;

use eframe::egui::{Vec2, vec2};
use rand::Rng;

use super::document::{NodeGroup, ProvDocument};
use super::relation::{RelationKind, derive_edges};

/// World-space extent the initial node positions are scattered over.
pub const CANVAS_SIZE: Vec2 = vec2(1200.0, 800.0);

#[derive(Clone, Debug)]
pub struct GraphNode {
    pub id: String,
    pub group: NodeGroup,
    pub position: Vec2,
    pub velocity: Vec2,
    /// Fixed position while the node is dragged.
    pub pinned: Option<Vec2>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GraphEdge {
    pub source: usize,
    pub target: usize,
    pub kind: RelationKind,
}

impl GraphEdge {
    pub fn is_self_loop(&self) -> bool {
        self.source == self.target
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GraphStats {
    pub total_nodes: usize,
    pub entity_count: usize,
    pub activity_count: usize,
    pub agent_count: usize,
}

pub struct GraphModel {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
    index_by_id: HashMap<String, usize>,
    pub stats: GraphStats,
    pub canvas: Vec2,
}

impl GraphModel {
    pub fn node_index(&self, id: &str) -> Option<usize> {
        self.index_by_id.get(id).copied()
    }
}

pub fn build_graph_model(document: &ProvDocument, canvas: Vec2, rng: &mut impl Rng) -> GraphModel {
    let width = canvas.x.max(1.0);
    let height = canvas.y.max(1.0);

    let nodes = document
        .nodes()
        .iter()
        .map(|record| GraphNode {
            id: record.id.clone(),
            group: record.group,
            position: vec2(rng.gen_range(0.0..width), rng.gen_range(0.0..height)),
            velocity: Vec2::ZERO,
            pinned: None,
        })
        .collect::<Vec<_>>();

    // Ids shared across groups collapse onto the last node inserted.
    let mut index_by_id = HashMap::with_capacity(nodes.len());
    for (index, node) in nodes.iter().enumerate() {
        index_by_id.insert(node.id.clone(), index);
    }

    let edges = derive_edges(document)
        .into_iter()
        .filter_map(|edge| {
            Some(GraphEdge {
                source: *index_by_id.get(edge.source)?,
                target: *index_by_id.get(edge.target)?,
                kind: edge.kind,
            })
        })
        .collect::<Vec<_>>();

    let mut stats = GraphStats {
        total_nodes: nodes.len(),
        ..GraphStats::default()
    };
    for node in &nodes {
        match node.group {
            NodeGroup::Entity => stats.entity_count += 1,
            NodeGroup::Activity => stats.activity_count += 1,
            NodeGroup::Agent => stats.agent_count += 1,
        }
    }

    GraphModel {
        nodes,
        edges,
        index_by_id,
        stats,
        canvas: vec2(width, height),
    }
}
