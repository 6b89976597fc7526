use eframe::egui::{Color32, Stroke};

use crate::prov::{NodeGroup, RelationKind};

pub const BACKGROUND: Color32 = Color32::from_rgb(0xf9, 0xf9, 0xf9);
pub const HOVER_FILL: Color32 = Color32::from_rgb(0x00, 0x2d, 0xf7);
pub const LABEL_COLOR: Color32 = Color32::from_rgb(0x33, 0x33, 0x33);
pub const LABEL_SIZE: f32 = 15.0;
pub const EDGE_WIDTH: f32 = 2.0;
pub const NODE_STROKE: Stroke = Stroke {
    width: 1.5,
    color: Color32::BLACK,
};

/// Outline drawn around the selected node.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Emphasis {
    /// Picked with the pointer.
    Clicked,
    /// Requested from search, history or a relation link.
    Highlighted,
}

impl Emphasis {
    pub fn stroke(self) -> Stroke {
        let width = match self {
            Self::Clicked => 3.0,
            Self::Highlighted => 5.0,
        };
        Stroke::new(width, Color32::WHITE)
    }
}

pub fn group_fill(group: NodeGroup) -> Color32 {
    match group {
        NodeGroup::Entity => Color32::from_rgb(0x33, 0xff, 0x57),
        NodeGroup::Activity => Color32::from_rgb(0x57, 0x33, 0xff),
        NodeGroup::Agent => Color32::from_rgb(0xff, 0x57, 0x33),
    }
}

pub fn relation_color(kind: RelationKind) -> Color32 {
    match kind {
        RelationKind::Used => Color32::from_rgb(0xfd, 0xed, 0x00),
        RelationKind::WasGeneratedBy => Color32::from_rgb(0xff, 0x00, 0x00),
        RelationKind::WasDerivedFrom => Color32::from_rgb(0x00, 0xe5, 0x72),
        RelationKind::WasInformedBy => Color32::from_rgb(0xff, 0xaa, 0x00),
        RelationKind::HadMember => Color32::from_rgb(0x00, 0xaa, 0xff),
        RelationKind::WasStartedBy => Color32::from_rgb(0xaa, 0x00, 0xff),
        RelationKind::WasAssociatedWith => Color32::from_rgb(0xff, 0x00, 0xff),
        RelationKind::WasAttributedTo => Color32::from_rgb(0xff, 0x45, 0x00),
    }
}

/// `#rrggbb` form used by the SVG writer.
pub fn hex(color: Color32) -> String {
    format!("#{:02x}{:02x}{:02x}", color.r(), color.g(), color.b())
}
