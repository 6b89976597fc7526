use std::collections::HashMap;

use serde::Deserialize;
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::warn;

use super::relation::{Relation, RelationKind, RelationRecord};

#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("document is not valid JSON")]
    InvalidJson(#[from] serde_json::Error),
    #[error("top-level PROV-JSON value must be an object")]
    NotAnObject,
    #[error("`result` field does not contain a valid PROV-JSON document")]
    InvalidResultEnvelope(#[source] serde_json::Error),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NodeGroup {
    Entity,
    Activity,
    Agent,
}

impl NodeGroup {
    pub const ALL: [Self; 3] = [Self::Entity, Self::Activity, Self::Agent];

    pub fn title(self) -> &'static str {
        match self {
            Self::Entity => "Entity",
            Self::Activity => "Activity",
            Self::Agent => "Agent",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NodeRecord {
    pub id: String,
    pub group: NodeGroup,
    pub prov_type: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct RawDocument {
    #[serde(default)]
    entity: Value,
    #[serde(default)]
    activity: Value,
    #[serde(default)]
    agent: Value,
    #[serde(default)]
    used: Value,
    #[serde(default, rename = "wasGeneratedBy")]
    was_generated_by: Value,
    #[serde(default, rename = "wasDerivedFrom")]
    was_derived_from: Value,
    #[serde(default, rename = "wasInformedBy")]
    was_informed_by: Value,
    #[serde(default, rename = "hadMember")]
    had_member: Value,
    #[serde(default, rename = "wasStartedBy")]
    was_started_by: Value,
    #[serde(default, rename = "wasAssociatedWith")]
    was_associated_with: Value,
    #[serde(default, rename = "wasAttributedTo")]
    was_attributed_to: Value,
}

impl RawDocument {
    fn group(&self, group: NodeGroup) -> &Value {
        match group {
            NodeGroup::Entity => &self.entity,
            NodeGroup::Activity => &self.activity,
            NodeGroup::Agent => &self.agent,
        }
    }

    fn relations(&self, kind: RelationKind) -> &Value {
        match kind {
            RelationKind::Used => &self.used,
            RelationKind::WasGeneratedBy => &self.was_generated_by,
            RelationKind::WasDerivedFrom => &self.was_derived_from,
            RelationKind::WasInformedBy => &self.was_informed_by,
            RelationKind::HadMember => &self.had_member,
            RelationKind::WasStartedBy => &self.was_started_by,
            RelationKind::WasAssociatedWith => &self.was_associated_with,
            RelationKind::WasAttributedTo => &self.was_attributed_to,
        }
    }
}

/// A PROV-JSON document reduced to typed node and relation records.
///
/// Missing or non-object top-level mappings are read as empty.
#[derive(Clone, Debug, Default)]
pub struct ProvDocument {
    nodes: Vec<NodeRecord>,
    relations: Vec<RelationRecord>,
    first_by_id: HashMap<String, usize>,
}

impl ProvDocument {
    pub fn from_json_str(raw: &str) -> Result<Self, DocumentError> {
        let value: Value = serde_json::from_str(raw)?;
        Self::from_value(value)
    }

    pub fn from_value(value: Value) -> Result<Self, DocumentError> {
        let value = unwrap_result_envelope(value)?;
        if !value.is_object() {
            return Err(DocumentError::NotAnObject);
        }

        let raw = RawDocument::deserialize(value)?;

        let mut nodes = Vec::new();
        for group in NodeGroup::ALL {
            let Some(records) = raw.group(group).as_object() else {
                continue;
            };
            for (id, attributes) in records {
                nodes.push(NodeRecord {
                    id: id.clone(),
                    group,
                    prov_type: prov_type_of(attributes),
                });
            }
        }

        let mut relations = Vec::new();
        for kind in RelationKind::ALL {
            let Some(records) = raw.relations(kind).as_object() else {
                continue;
            };
            for (id, record) in records {
                let parsed = record
                    .as_object()
                    .and_then(|fields| Relation::from_record(kind, fields));
                match parsed {
                    Some(relation) => relations.push(RelationRecord {
                        id: id.clone(),
                        relation,
                    }),
                    None => warn!(
                        relation = kind.name(),
                        record = id.as_str(),
                        "skipping relation record without both role references"
                    ),
                }
            }
        }

        let mut first_by_id = HashMap::with_capacity(nodes.len());
        for (index, node) in nodes.iter().enumerate() {
            first_by_id.entry(node.id.clone()).or_insert(index);
        }

        Ok(Self {
            nodes,
            relations,
            first_by_id,
        })
    }

    /// Node records in entity, activity, agent order.
    pub fn nodes(&self) -> &[NodeRecord] {
        &self.nodes
    }

    pub fn relations(&self) -> &[RelationRecord] {
        &self.relations
    }

    pub fn contains(&self, id: &str) -> bool {
        self.first_by_id.contains_key(id)
    }

    /// First record with this id, looking at entities, then activities, then agents.
    pub fn node(&self, id: &str) -> Option<&NodeRecord> {
        self.first_by_id
            .get(id)
            .and_then(|&index| self.nodes.get(index))
    }

    pub fn count(&self, group: NodeGroup) -> usize {
        self.nodes.iter().filter(|node| node.group == group).count()
    }
}

fn unwrap_result_envelope(value: Value) -> Result<Value, DocumentError> {
    if let Some(inner) = value.get("result").and_then(Value::as_str) {
        return serde_json::from_str(inner).map_err(DocumentError::InvalidResultEnvelope);
    }
    Ok(value)
}

fn prov_type_of(attributes: &Value) -> Option<String> {
    // Entities are usually an array of attribute objects; the first one carries the type.
    let record: Option<&Map<String, Value>> = match attributes {
        Value::Array(items) => items.first().and_then(Value::as_object),
        Value::Object(fields) => Some(fields),
        _ => None,
    };

    match record?.get("prov:type")? {
        Value::String(text) => Some(text.clone()),
        Value::Object(typed) => match typed.get("$") {
            Some(Value::String(text)) => Some(text.clone()),
            Some(other) => Some(other.to_string()),
            None => Some(Value::Object(typed.clone()).to_string()),
        },
        Value::Null => None,
        other => Some(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn missing_mappings_are_empty() {
        let document = ProvDocument::from_value(json!({})).expect("empty object parses");
        assert!(document.nodes().is_empty());
        assert!(document.relations().is_empty());

        let document = ProvDocument::from_value(json!({ "entity": null, "used": [1, 2] }))
            .expect("wrong shapes are ignored");
        assert!(document.nodes().is_empty());
        assert!(document.relations().is_empty());
    }

    #[test]
    fn non_object_documents_are_rejected() {
        assert!(matches!(
            ProvDocument::from_value(json!([1, 2, 3])),
            Err(DocumentError::NotAnObject)
        ));
        assert!(matches!(
            ProvDocument::from_json_str("{ not json"),
            Err(DocumentError::InvalidJson(_))
        ));
    }

    #[test]
    fn result_envelope_is_unwrapped() {
        let inner = json!({ "entity": { "e1": [{ "prov:type": "File" }] } }).to_string();
        let document =
            ProvDocument::from_value(json!({ "result": inner })).expect("envelope parses");
        assert_eq!(document.nodes().len(), 1);
        assert_eq!(document.nodes()[0].prov_type.as_deref(), Some("File"));

        assert!(matches!(
            ProvDocument::from_value(json!({ "result": "{ broken" })),
            Err(DocumentError::InvalidResultEnvelope(_))
        ));
    }

    #[test]
    fn prov_type_is_read_per_group_shape() {
        let document = ProvDocument::from_value(json!({
            "entity": {
                "e1": [{ "prov:type": "File" }, { "prov:type": "Ignored" }],
                "e2": { "prov:type": { "$": "prov:Collection", "type": "xsd:QName" } },
                "e3": []
            },
            "activity": { "a1": { "prov:type": "Run" } },
            "agent": { "ag1": { "prov:label": "Alice" } }
        }))
        .expect("valid document");

        let types = document
            .nodes()
            .iter()
            .map(|node| (node.id.as_str(), node.prov_type.as_deref()))
            .collect::<Vec<_>>();
        assert_eq!(
            types,
            vec![
                ("e1", Some("File")),
                ("e2", Some("prov:Collection")),
                ("e3", None),
                ("a1", Some("Run")),
                ("ag1", None),
            ]
        );
    }

    #[test]
    fn lookup_prefers_entity_over_later_groups() {
        let document = ProvDocument::from_value(json!({
            "entity": { "x": [{ "prov:type": "File" }] },
            "activity": { "x": { "prov:type": "Run" } }
        }))
        .expect("valid document");

        assert_eq!(document.nodes().len(), 2);
        assert_eq!(document.node("x").map(|node| node.group), Some(NodeGroup::Entity));
        assert_eq!(document.count(NodeGroup::Activity), 1);
        assert!(document.node("y").is_none());
    }
}
