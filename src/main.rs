mod app;
mod prov;
mod scene;
mod util;

use std::path::PathBuf;

use anyhow::anyhow;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use app::{LaunchOptions, LayoutParams};
use prov::RelationKind;
use scene::DisplayOptions;

fn parse_relation_kind(name: &str) -> Result<RelationKind, String> {
    RelationKind::from_name(name).ok_or_else(|| {
        let known = RelationKind::ALL.map(RelationKind::name).join(", ");
        format!("unknown relation type `{name}` (expected one of: {known})")
    })
}

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    /// PROV-JSON document to visualize.
    document: PathBuf,

    /// Node to highlight and focus once the graph is shown.
    #[arg(long)]
    node: Option<String>,

    #[arg(long, default_value_t = 180.0)]
    node_distance: f32,

    #[arg(long, default_value_t = -300.0, allow_negative_numbers = true)]
    node_repulsion: f32,

    #[arg(long, default_value_t = 40.0)]
    node_collision: f32,

    #[arg(long, default_value_t = 0.005)]
    alpha_decay: f32,

    #[arg(long)]
    node_labels: bool,

    #[arg(long)]
    link_labels: bool,

    /// Relation type to hide; repeat for several.
    #[arg(long = "hide", value_name = "RELATION", value_parser = parse_relation_kind)]
    hidden: Vec<RelationKind>,

    /// Write the settled graph to this SVG file instead of opening a window.
    #[arg(long, value_name = "PATH")]
    export_svg: Option<PathBuf>,

    /// Log at debug level unless RUST_LOG says otherwise.
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn launch_options(&self) -> LaunchOptions {
        let params = LayoutParams {
            node_distance: self.node_distance,
            node_repulsion: self.node_repulsion,
            node_collision: self.node_collision,
            alpha_decay: self.alpha_decay,
        }
        .clamped();

        let mut display = DisplayOptions::default();
        display.show_node_labels = self.node_labels;
        display.show_link_labels = self.link_labels;
        for &kind in &self.hidden {
            *display.hidden_mut(kind) = true;
        }

        LaunchOptions {
            document: self.document.clone(),
            params,
            display,
            focus: self.node.clone(),
        }
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_target(false)
        .init();
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);
    let options = args.launch_options();

    if let Some(output) = &args.export_svg {
        return app::export_svg(&options, output);
    }

    let native_options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default().with_inner_size([1440.0, 920.0]),
        ..Default::default()
    };

    eframe::run_native(
        "prov-lens",
        native_options,
        Box::new(move |cc| Ok(Box::new(app::ProvLensApp::new(cc, options)))),
    )
    .map_err(|error| anyhow!("failed to start the viewer: {error}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_layout_defaults() {
        let args = Args::try_parse_from(["prov-lens", "trace.json"]).expect("valid args");
        let options = args.launch_options();
        assert_eq!(options.params, LayoutParams::default());
        assert_eq!(options.display, DisplayOptions::default());
        assert!(options.focus.is_none());
    }

    #[test]
    fn out_of_range_forces_are_clamped() {
        let args = Args::try_parse_from([
            "prov-lens",
            "trace.json",
            "--node-distance",
            "900",
            "--node-repulsion",
            "-5000",
            "--alpha-decay",
            "0",
        ])
        .expect("valid args");
        let params = args.launch_options().params;
        assert_eq!(params.node_distance, 500.0);
        assert_eq!(params.node_repulsion, -1000.0);
        assert_eq!(params.alpha_decay, 0.001);
    }

    #[test]
    fn hidden_relations_and_focus() {
        let args = Args::try_parse_from([
            "prov-lens",
            "trace.json",
            "--hide",
            "used",
            "--hide",
            "wasStartedBy",
            "--node",
            "ex:e1",
        ])
        .expect("valid args");
        let options = args.launch_options();
        assert!(options.display.is_hidden(RelationKind::Used));
        assert!(options.display.is_hidden(RelationKind::WasStartedBy));
        assert!(!options.display.is_hidden(RelationKind::HadMember));
        assert_eq!(options.focus.as_deref(), Some("ex:e1"));
    }

    #[test]
    fn label_flags_reach_display_options() {
        let args = Args::try_parse_from(["prov-lens", "trace.json", "--node-labels", "--link-labels"])
            .expect("valid args");
        let display = args.launch_options().display;
        assert!(display.show_node_labels);
        assert!(display.show_link_labels);
        assert!(RelationKind::ALL.iter().all(|&kind| !display.is_hidden(kind)));
    }

    #[test]
    fn unknown_relation_is_rejected() {
        assert!(Args::try_parse_from(["prov-lens", "trace.json", "--hide", "likes"]).is_err());
    }
}
