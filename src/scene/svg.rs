use std::fmt::Write as _;

use eframe::egui::Vec2;

use super::style::{self, hex};
use super::{EdgePath, Scene, SceneLabel, ViewTransform, anchor_id};
use crate::prov::RelationKind;

fn esc(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fn write_label(svg: &mut String, label: &SceneLabel) {
    let _ = writeln!(
        svg,
        r#"<text x="{}" y="{}" font-size="{}" fill="{}" text-anchor="middle">{}</text>"#,
        label.position.x,
        label.position.y,
        style::LABEL_SIZE,
        hex(style::LABEL_COLOR),
        esc(&label.text)
    );
}

/// Self-contained SVG document of the scene as seen through `transform` in a
/// view of `size`, background included.
pub fn render_svg(scene: &Scene, transform: ViewTransform, size: Vec2) -> String {
    let mut svg = String::with_capacity(4096 + scene.nodes.len() * 256 + scene.edges.len() * 192);
    let (width, height) = (size.x, size.y);

    let _ = writeln!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{width}" height="{height}" viewBox="0 0 {width} {height}" class="graph-svg">"#
    );
    let _ = writeln!(
        svg,
        r#"<rect x="0" y="0" width="100%" height="100%" fill="{}"/>"#,
        hex(style::BACKGROUND)
    );

    svg.push_str("<defs>\n");
    for kind in RelationKind::ALL {
        let _ = writeln!(
            svg,
            r#"<marker id="arrow-{}" viewBox="0 -5 10 10" refX="20" refY="0" markerWidth="8" markerHeight="8" orient="auto-start-reverse"><path d="M0,-5L10,0L0,5" fill="{}"/></marker>"#,
            kind.name(),
            hex(style::relation_color(kind))
        );
    }
    svg.push_str("</defs>\n");

    let _ = writeln!(
        svg,
        r#"<g transform="translate({},{}) scale({})">"#,
        transform.translate.x, transform.translate.y, transform.scale
    );

    svg.push_str("<g class=\"links\">\n");
    for edge in &scene.edges {
        let path = match &edge.path {
            EdgePath::Line { from, to } => format!("M {},{} L {},{}", from.x, from.y, to.x, to.y),
            EdgePath::Loop(self_loop) => self_loop.svg_path(),
        };
        let opacity = if edge.visible { "" } else { r#" opacity="0""# };
        let _ = writeln!(
            svg,
            r#"<path d="{path}" stroke="{}" stroke-width="{}" fill="none" marker-end="url(#arrow-{kind})" data-type="{kind}"{opacity}/>"#,
            hex(edge.color),
            style::EDGE_WIDTH,
            kind = edge.kind.name(),
        );
    }
    svg.push_str("</g>\n");

    svg.push_str("<g class=\"link-labels\">\n");
    for label in scene.edges.iter().filter_map(|edge| edge.label.as_ref()) {
        write_label(&mut svg, label);
    }
    svg.push_str("</g>\n");

    svg.push_str("<g class=\"nodes\">\n");
    for node in &scene.nodes {
        let _ = writeln!(
            svg,
            r#"<path id="{}" class="node" d="{}" transform="translate({},{})" fill="{}" stroke="{}" stroke-width="{}"><title>{}</title></path>"#,
            esc(&anchor_id(&node.id)),
            node.shape.svg_path(),
            node.center.x,
            node.center.y,
            hex(node.fill),
            hex(node.stroke.color),
            node.stroke.width,
            esc(&node.id)
        );
    }
    svg.push_str("</g>\n");

    svg.push_str("<g class=\"node-labels\">\n");
    for label in scene.nodes.iter().filter_map(|node| node.label.as_ref()) {
        write_label(&mut svg, label);
    }
    svg.push_str("</g>\n</g>\n</svg>\n");

    svg
}
