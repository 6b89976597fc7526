use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

use super::document::{NodeGroup, ProvDocument};

pub fn load_document(path: &Path) -> Result<ProvDocument> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read PROV-JSON document {}", path.display()))?;
    let document = ProvDocument::from_json_str(&raw)
        .with_context(|| format!("failed to parse PROV-JSON document {}", path.display()))?;

    info!(
        path = %path.display(),
        entities = document.count(NodeGroup::Entity),
        activities = document.count(NodeGroup::Activity),
        agents = document.count(NodeGroup::Agent),
        relations = document.relations().len(),
        "loaded provenance document"
    );

    Ok(document)
}
