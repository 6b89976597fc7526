//! Pure mapping from the laid-out graph to drawable shapes, shared by the egui
//! painter and the SVG writer.

mod shapes;
pub mod style;
mod svg;

use std::collections::HashMap;

use eframe::egui::{Color32, Pos2, Rect, Stroke, Vec2, pos2};

use crate::prov::{GraphModel, NodeGroup, RelationKind};
use crate::util::node_label;
pub use shapes::{ARROW_INSET, NodeShape, SelfLoop, arrow_head};
pub use style::Emphasis;
pub use svg::render_svg;

const NODE_LABEL_RISE: f32 = 20.0;
const LINK_LABEL_RISE: f32 = 5.0;
/// Characters with a meaning in selector syntax, escaped with a backslash.
const SELECTOR_SPECIAL: &str = "!#$%&()*+,./:;<=>?@[\\]^`{|}~";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DisplayOptions {
    pub show_node_labels: bool,
    pub show_link_labels: bool,
    hidden: [bool; RelationKind::COUNT],
}

impl Default for DisplayOptions {
    fn default() -> Self {
        Self {
            show_node_labels: false,
            show_link_labels: false,
            hidden: [false; RelationKind::COUNT],
        }
    }
}

impl DisplayOptions {
    pub fn is_hidden(&self, kind: RelationKind) -> bool {
        self.hidden[kind.index()]
    }

    pub fn hidden_mut(&mut self, kind: RelationKind) -> &mut bool {
        &mut self.hidden[kind.index()]
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Selection {
    pub node: String,
    pub emphasis: Emphasis,
}

/// Translate-then-scale camera transform from world to view coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewTransform {
    pub translate: Vec2,
    pub scale: f32,
}

impl Default for ViewTransform {
    fn default() -> Self {
        Self {
            translate: Vec2::ZERO,
            scale: 1.0,
        }
    }
}

impl ViewTransform {
    pub fn apply(&self, world: Pos2) -> Pos2 {
        (world.to_vec2() * self.scale + self.translate).to_pos2()
    }

    pub fn invert(&self, view: Pos2) -> Pos2 {
        ((view.to_vec2() - self.translate) / self.scale).to_pos2()
    }
}

#[derive(Clone, Debug)]
pub struct SceneLabel {
    pub text: String,
    pub position: Pos2,
}

#[derive(Clone, Debug)]
pub enum EdgePath {
    Line { from: Pos2, to: Pos2 },
    Loop(SelfLoop),
}

#[derive(Clone, Debug)]
pub struct SceneEdge {
    pub kind: RelationKind,
    pub path: EdgePath,
    pub color: Color32,
    /// Hidden edges stay in the scene at zero opacity.
    pub visible: bool,
    pub arrow: [Pos2; 3],
    pub label: Option<SceneLabel>,
}

#[derive(Clone, Debug)]
pub struct SceneNode {
    pub id: String,
    pub group: NodeGroup,
    pub center: Pos2,
    pub shape: NodeShape,
    pub fill: Color32,
    pub stroke: Stroke,
    pub label: Option<SceneLabel>,
}

#[derive(Clone, Debug, Default)]
pub struct Scene {
    pub edges: Vec<SceneEdge>,
    pub nodes: Vec<SceneNode>,
    anchors: HashMap<String, usize>,
}

pub fn anchor_id(node_id: &str) -> String {
    format!("node-{node_id}")
}

/// Selector addressing a node's anchor, with selector syntax escaped.
pub fn node_selector(node_id: &str) -> String {
    let mut selector = String::with_capacity(node_id.len() + 8);
    selector.push_str("#node-");
    for ch in node_id.chars() {
        if SELECTOR_SPECIAL.contains(ch) {
            selector.push('\\');
        }
        selector.push(ch);
    }
    selector
}

fn unescape_selector(selector: &str) -> Option<String> {
    let body = selector.strip_prefix('#')?;
    let mut id = String::with_capacity(body.len());
    let mut chars = body.chars();
    while let Some(ch) = chars.next() {
        if ch == '\\' {
            id.push(chars.next()?);
        } else {
            id.push(ch);
        }
    }
    Some(id)
}

impl Scene {
    /// Scene node behind an escaped `#node-...` selector.
    pub fn find_anchor(&self, selector: &str) -> Option<&SceneNode> {
        let anchor = unescape_selector(selector)?;
        self.anchors
            .get(&anchor)
            .and_then(|&index| self.nodes.get(index))
    }

    /// World-space box around every node shape, `None` for an empty scene.
    pub fn bounds(&self) -> Option<Rect> {
        self.nodes
            .iter()
            .filter(|node| node.center.x.is_finite() && node.center.y.is_finite())
            .map(|node| node.shape.bounding_rect(node.center))
            .reduce(|acc, rect| acc.union(rect))
    }

    /// Topmost node under `world`, if any.
    pub fn node_at(&self, world: Pos2) -> Option<usize> {
        self.nodes
            .iter()
            .rposition(|node| node.shape.contains(node.center, world))
    }
}

pub fn build_scene(
    model: &GraphModel,
    display: &DisplayOptions,
    selection: Option<&Selection>,
    hovered: Option<usize>,
) -> Scene {
    let mut edges = Vec::with_capacity(model.edges.len());
    for edge in &model.edges {
        let (Some(source), Some(target)) = (model.nodes.get(edge.source), model.nodes.get(edge.target))
        else {
            continue;
        };
        let from = source.position.to_pos2();
        let to = target.position.to_pos2();

        let (path, arrow, label_position) = if edge.is_self_loop() {
            let self_loop = SelfLoop::above(from, NodeShape::for_group(source.group));
            let arrow = arrow_head(self_loop.end(), self_loop.end_direction());
            (EdgePath::Loop(self_loop), arrow, self_loop.label_anchor())
        } else {
            let direction = to - from;
            let arrow = if direction.length_sq() > ARROW_INSET * ARROW_INSET {
                arrow_head(to - direction.normalized() * ARROW_INSET, direction)
            } else {
                [to; 3]
            };
            let middle = from.lerp(to, 0.5);
            (
                EdgePath::Line { from, to },
                arrow,
                pos2(middle.x, middle.y - LINK_LABEL_RISE),
            )
        };

        let visible = !display.is_hidden(edge.kind);
        edges.push(SceneEdge {
            kind: edge.kind,
            path,
            color: style::relation_color(edge.kind),
            visible,
            arrow,
            label: (visible && display.show_link_labels).then(|| SceneLabel {
                text: edge.kind.name().to_owned(),
                position: label_position,
            }),
        });
    }

    let mut nodes = Vec::with_capacity(model.nodes.len());
    let mut anchors = HashMap::with_capacity(model.nodes.len());
    for (index, node) in model.nodes.iter().enumerate() {
        let center = node.position.to_pos2();
        let fill = if hovered == Some(index) {
            style::HOVER_FILL
        } else {
            style::group_fill(node.group)
        };
        let stroke = match selection {
            Some(selection) if selection.node == node.id => selection.emphasis.stroke(),
            _ => style::NODE_STROKE,
        };

        anchors.insert(anchor_id(&node.id), index);
        nodes.push(SceneNode {
            id: node.id.clone(),
            group: node.group,
            center,
            shape: NodeShape::for_group(node.group),
            fill,
            stroke,
            label: display.show_node_labels.then(|| SceneLabel {
                text: node_label(&node.id),
                position: pos2(center.x, center.y - NODE_LABEL_RISE),
            }),
        });
    }

    Scene {
        edges,
        nodes,
        anchors,
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use serde_json::json;

    use super::*;
    use crate::prov::{CANVAS_SIZE, ProvDocument, build_graph_model};

    fn model() -> GraphModel {
        let document = ProvDocument::from_value(json!({
            "entity": { "e1": [{}], "file.v2:final": [{}] },
            "activity": { "a1": {} },
            "used": { "u1": { "prov:entity": "e1", "prov:activity": "a1" } },
            "wasInformedBy": { "i1": { "prov:informant": "a1", "prov:informed": "a1" } }
        }))
        .expect("valid document");
        let mut rng = StdRng::seed_from_u64(11);
        build_graph_model(&document, CANVAS_SIZE, &mut rng)
    }

    #[test]
    fn self_loop_edges_get_loop_geometry() {
        let scene = build_scene(&model(), &DisplayOptions::default(), None, None);
        let kinds = scene
            .edges
            .iter()
            .map(|edge| (edge.kind, matches!(edge.path, EdgePath::Loop(_))))
            .collect::<Vec<_>>();
        assert_eq!(
            kinds,
            vec![
                (RelationKind::Used, false),
                (RelationKind::WasInformedBy, true)
            ]
        );
    }

    #[test]
    fn labels_follow_display_toggles() {
        let model = model();
        let hidden = build_scene(&model, &DisplayOptions::default(), None, None);
        assert!(hidden.nodes.iter().all(|node| node.label.is_none()));
        assert!(hidden.edges.iter().all(|edge| edge.label.is_none()));

        let display = DisplayOptions {
            show_node_labels: true,
            show_link_labels: true,
            ..DisplayOptions::default()
        };
        let shown = build_scene(&model, &display, None, None);
        let loop_label = shown.edges[1].label.as_ref().expect("link label");
        assert_eq!(loop_label.text, "wasInformedBy");

        let a1 = model.node_index("a1").expect("a1");
        let center = model.nodes[a1].position;
        assert!((loop_label.position.y - (center.y - 55.0)).abs() < 1e-3);

        let long = shown
            .nodes
            .iter()
            .find(|node| node.id == "file.v2:final")
            .and_then(|node| node.label.as_ref())
            .expect("node label");
        assert_eq!(long.text, "file.…final");
    }

    #[test]
    fn hidden_kinds_stay_in_scene_invisible() {
        let mut display = DisplayOptions::default();
        display.show_link_labels = true;
        *display.hidden_mut(RelationKind::Used) = true;
        let scene = build_scene(&model(), &display, None, None);
        assert_eq!(scene.edges.len(), 2);
        assert!(!scene.edges[0].visible);
        assert!(scene.edges[0].label.is_none());
        assert!(scene.edges[1].visible);
        assert!(scene.edges[1].label.is_some());
    }

    #[test]
    fn hover_and_single_selection_outline() {
        let model = model();
        let a1 = model.node_index("a1").expect("a1");
        let selection = Selection {
            node: "e1".to_owned(),
            emphasis: Emphasis::Clicked,
        };
        let scene = build_scene(&model, &DisplayOptions::default(), Some(&selection), Some(a1));

        assert_eq!(scene.nodes[a1].fill, style::HOVER_FILL);
        let outlined = scene
            .nodes
            .iter()
            .filter(|node| node.stroke != style::NODE_STROKE)
            .map(|node| node.id.as_str())
            .collect::<Vec<_>>();
        assert_eq!(outlined, vec!["e1"]);
    }

    #[test]
    fn selectors_escape_and_resolve() {
        assert_eq!(node_selector("file.v2:final"), "#node-file\\.v2\\:final");
        assert_eq!(node_selector("plain_id-1"), "#node-plain_id-1");

        let scene = build_scene(&model(), &DisplayOptions::default(), None, None);
        let found = scene
            .find_anchor(&node_selector("file.v2:final"))
            .expect("escaped selector resolves");
        assert_eq!(found.id, "file.v2:final");
        assert!(scene.find_anchor(&node_selector("missing")).is_none());
    }

    #[test]
    fn node_at_hits_shape() {
        let model = model();
        let scene = build_scene(&model, &DisplayOptions::default(), None, None);
        let e1 = model.node_index("e1").expect("e1");
        let center = scene.nodes[e1].center;
        assert_eq!(scene.node_at(center), Some(e1));
        assert_eq!(scene.node_at(pos2(-5000.0, -5000.0)), None);
    }

    #[test]
    fn bounds_cover_every_node() {
        let model = model();
        let scene = build_scene(&model, &DisplayOptions::default(), None, None);
        let bounds = scene.bounds().expect("non-empty scene");
        assert!(scene.nodes.iter().all(|node| bounds.contains(node.center)));
        assert!(Scene::default().bounds().is_none());
    }

    #[test]
    fn transform_round_trips() {
        let transform = ViewTransform {
            translate: Vec2::new(40.0, -10.0),
            scale: 2.5,
        };
        let world = pos2(12.0, 7.0);
        let view = transform.apply(world);
        assert_eq!(view, pos2(70.0, 7.5));
        assert_eq!(transform.invert(view), world);
    }
}
