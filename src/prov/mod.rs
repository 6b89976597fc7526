mod detail;
mod document;
mod load;
mod model;
mod relation;

pub use detail::{NONE_MARKER, NodeDetail, related_ids, resolve_node_detail};
pub use document::{NodeGroup, ProvDocument};
pub use load::load_document;
pub use model::{CANVAS_SIZE, GraphModel, build_graph_model};
pub use relation::RelationKind;
