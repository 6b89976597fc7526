use super::document::ProvDocument;
use super::relation::{DerivedEdge, RelationKind, derive_edges};

/// Shown in place of an empty relation list.
pub const NONE_MARKER: &str = "None";

const UNKNOWN_TYPE: &str = "Unknown";

/// Everything the detail panel shows for one node. Relation fields hold the ids of
/// the other endpoints joined with `", "`, or [`NONE_MARKER`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NodeDetail {
    pub id: String,
    pub group: String,
    pub node_type: String,
    pub used: String,
    pub was_generated_by: String,
    pub was_derived_from: String,
    pub was_informed_by: String,
    pub was_associated_with: String,
    pub was_started_by: String,
    pub had_member: String,
    pub was_attributed_to: String,
    pub generated: String,
    pub was_used_by: String,
    pub derives: String,
}

impl NodeDetail {
    /// Labelled relation rows in display order.
    pub fn rows(&self) -> [(&'static str, &str); 11] {
        [
            ("Used", &self.used),
            ("Was generated by", &self.was_generated_by),
            ("Was derived from", &self.was_derived_from),
            ("Was informed by", &self.was_informed_by),
            ("Was associated with", &self.was_associated_with),
            ("Was started by", &self.was_started_by),
            ("Had member", &self.had_member),
            ("Was attributed to", &self.was_attributed_to),
            ("Generated", &self.generated),
            ("Was used by", &self.was_used_by),
            ("Derives", &self.derives),
        ]
    }
}

/// Splits a relation field back into node ids. The marker yields nothing.
pub fn related_ids(field: &str) -> impl Iterator<Item = &str> {
    field
        .split(", ")
        .filter(|id| !id.is_empty() && *id != NONE_MARKER)
}

#[derive(Clone, Copy)]
enum Direction {
    Outgoing,
    Incoming,
    Both,
}

fn collect(edges: &[DerivedEdge<'_>], id: &str, kind: RelationKind, direction: Direction) -> String {
    let mut related = Vec::new();
    for edge in edges.iter().filter(|edge| edge.kind == kind) {
        let outgoing = edge.source == id;
        let incoming = edge.target == id;
        match direction {
            Direction::Outgoing if outgoing => related.push(edge.target),
            Direction::Incoming if incoming => related.push(edge.source),
            Direction::Both => {
                if outgoing {
                    related.push(edge.target);
                }
                if incoming && !outgoing {
                    related.push(edge.source);
                }
            }
            _ => {}
        }
    }

    if related.is_empty() {
        NONE_MARKER.to_owned()
    } else {
        related.join(", ")
    }
}

/// Recomputes every typed relation touching `id`. Returns `None` when no entity,
/// activity or agent carries that id.
pub fn resolve_node_detail(document: &ProvDocument, id: &str) -> Option<NodeDetail> {
    let node = document.node(id)?;
    let edges = derive_edges(document);
    let view = |kind, direction| collect(&edges, id, kind, direction);

    Some(NodeDetail {
        id: node.id.clone(),
        group: node.group.title().to_owned(),
        node_type: node
            .prov_type
            .clone()
            .unwrap_or_else(|| UNKNOWN_TYPE.to_owned()),
        used: view(RelationKind::Used, Direction::Outgoing),
        was_generated_by: view(RelationKind::WasGeneratedBy, Direction::Incoming),
        was_derived_from: view(RelationKind::WasDerivedFrom, Direction::Outgoing),
        was_informed_by: view(RelationKind::WasInformedBy, Direction::Incoming),
        was_associated_with: view(RelationKind::WasAssociatedWith, Direction::Incoming),
        was_started_by: view(RelationKind::WasStartedBy, Direction::Incoming),
        had_member: view(RelationKind::HadMember, Direction::Both),
        was_attributed_to: view(RelationKind::WasAttributedTo, Direction::Both),
        generated: view(RelationKind::WasGeneratedBy, Direction::Outgoing),
        was_used_by: view(RelationKind::Used, Direction::Incoming),
        derives: view(RelationKind::WasDerivedFrom, Direction::Incoming),
    })
}
