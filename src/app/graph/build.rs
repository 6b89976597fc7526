use rand::thread_rng;
use tracing::info;

use crate::prov::{CANVAS_SIZE, GraphModel, ProvDocument, build_graph_model};
use crate::scene::Scene;

use super::super::ViewModel;
use super::super::physics::{ForceLayout, LayoutParams};

/// Scatters a new model over the canvas and starts a hot layout on it.
pub(in crate::app) fn fresh_graph(
    document: &ProvDocument,
    params: LayoutParams,
) -> (GraphModel, ForceLayout) {
    let model = build_graph_model(document, CANVAS_SIZE, &mut thread_rng());
    let layout = ForceLayout::new(params, &model);

    let stats = model.stats;
    info!(
        total = stats.total_nodes,
        entities = stats.entity_count,
        activities = stats.activity_count,
        agents = stats.agent_count,
        edges = model.edges.len(),
        "graph built"
    );

    (model, layout)
}

impl ViewModel {
    pub(in crate::app) fn layout_params_changed(&self) -> bool {
        self.params.clamped() != self.layout.params()
    }

    /// Throws the current model and simulation away. Selection and history refer to
    /// ids, so they survive.
    pub(in crate::app) fn rebuild_graph(&mut self) {
        self.params = self.params.clamped();
        let (model, layout) = fresh_graph(&self.document, self.params);
        self.model = model;
        self.layout = layout;
        self.scene = Scene::default();
        self.hovered = None;
        self.graph_dirty = false;
    }
}
