use std::fs;
use std::path::Path;

use anyhow::{Context as _, Result};
use eframe::egui::Vec2;
use tracing::{info, warn};

use crate::prov::{CANVAS_SIZE, load_document};
use crate::scene::{Emphasis, Scene, Selection, ViewTransform, build_scene, render_svg};

use super::graph::build::fresh_graph;
use super::viewport::fit_transform;
use super::{LaunchOptions, ViewModel};

/// Ticks a headless export may spend waiting for the layout to settle.
const HEADLESS_TICK_BUDGET: usize = 5_000;
const EXPORT_MARGIN: f32 = 40.0;

fn write_snapshot(path: &Path, scene: &Scene, transform: ViewTransform, size: Vec2) -> Result<()> {
    let svg = render_svg(scene, transform, size);
    fs::write(path, svg)
        .with_context(|| format!("failed to write SVG snapshot to {}", path.display()))?;

    info!(
        path = %path.display(),
        nodes = scene.nodes.len(),
        edges = scene.edges.len(),
        "SVG snapshot written"
    );
    Ok(())
}

/// Loads the document, lays it out until it settles and writes the whole graph as
/// SVG without opening a window.
pub fn export_svg(options: &LaunchOptions, output: &Path) -> Result<()> {
    let document = load_document(&options.document)?;
    let (mut model, mut layout) = fresh_graph(&document, options.params);

    let ticks = layout.settle(&mut model, HEADLESS_TICK_BUDGET);
    if !layout.is_settled() {
        warn!(ticks, "layout still moving when the tick budget ran out");
    }

    let selection = options
        .focus
        .as_deref()
        .filter(|id| model.node_index(id).is_some())
        .map(|id| Selection {
            node: id.to_owned(),
            emphasis: Emphasis::Highlighted,
        });
    let scene = build_scene(&model, &options.display, selection.as_ref(), None);
    let transform = scene
        .bounds()
        .map(|bounds| fit_transform(bounds, CANVAS_SIZE, EXPORT_MARGIN))
        .unwrap_or_default();

    write_snapshot(output, &scene, transform, CANVAS_SIZE)
}

impl ViewModel {
    /// Saves what the canvas currently shows next to the loaded document.
    pub(in crate::app) fn export_current_view(&mut self) {
        let path = self.document_path.with_extension("svg");
        let result = write_snapshot(&path, &self.scene, self.viewport.transform(), self.view_size);
        self.export_status = Some(match result {
            Ok(()) => format!("Saved {}", path.display()),
            Err(error) => {
                warn!("{error:#}");
                format!("{error:#}")
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use std::env;
    use std::path::PathBuf;
    use std::process;

    use super::*;
    use crate::app::LayoutParams;
    use crate::prov::RelationKind;
    use crate::scene::DisplayOptions;

    fn temp_path(name: &str) -> PathBuf {
        env::temp_dir().join(format!("prov-lens-export-{}-{name}", process::id()))
    }

    #[test]
    fn headless_export_writes_settled_snapshot() {
        let input = temp_path("input.json");
        let output = temp_path("output.svg");
        fs::write(
            &input,
            r#"{
                "entity": {"e1": [{"prov:type": "File"}], "e2": [{}]},
                "activity": {"a1": {"prov:type": "Run"}},
                "agent": {"ag1": {}},
                "used": {"u1": {"prov:entity": "e1", "prov:activity": "a1"}},
                "wasGeneratedBy": {"g1": {"prov:entity": "e2", "prov:activity": "a1"}},
                "wasAssociatedWith": {"w1": {"prov:activity": "a1", "prov:agent": "ag1"}}
            }"#,
        )
        .expect("temp file is writable");

        let mut display = DisplayOptions::default();
        display.show_node_labels = true;
        *display.hidden_mut(RelationKind::Used) = true;
        let options = LaunchOptions {
            document: input.clone(),
            params: LayoutParams::default(),
            display,
            focus: Some("a1".to_owned()),
        };

        let result = export_svg(&options, &output);
        let svg = fs::read_to_string(&output).unwrap_or_default();
        let _ = fs::remove_file(&input);
        let _ = fs::remove_file(&output);

        result.expect("export succeeds");
        assert!(svg.contains(r#"id="node-ag1""#));
        assert!(svg.contains(r#"data-type="used" opacity="0""#));
        assert!(svg.contains(r##"stroke="#ffffff" stroke-width="5""##));
        assert!(svg.contains(">e2</text>"));
        assert!(!svg.contains("NaN"));
    }

    #[test]
    fn export_of_missing_document_fails_with_path() {
        let options = LaunchOptions {
            document: temp_path("missing.json"),
            params: LayoutParams::default(),
            display: DisplayOptions::default(),
            focus: None,
        };
        let error = export_svg(&options, &temp_path("never.svg")).expect_err("missing input");
        assert!(format!("{error:#}").contains("missing.json"));
    }
}
