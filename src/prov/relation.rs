use serde_json::{Map, Value};
use tracing::debug;

use super::document::ProvDocument;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RelationKind {
    Used,
    WasGeneratedBy,
    WasDerivedFrom,
    WasInformedBy,
    HadMember,
    WasStartedBy,
    WasAssociatedWith,
    WasAttributedTo,
}

impl RelationKind {
    pub const COUNT: usize = 8;

    pub const ALL: [Self; Self::COUNT] = [
        Self::Used,
        Self::WasGeneratedBy,
        Self::WasDerivedFrom,
        Self::WasInformedBy,
        Self::HadMember,
        Self::WasStartedBy,
        Self::WasAssociatedWith,
        Self::WasAttributedTo,
    ];

    /// Key of the relation mapping in a PROV-JSON document.
    pub fn name(self) -> &'static str {
        match self {
            Self::Used => "used",
            Self::WasGeneratedBy => "wasGeneratedBy",
            Self::WasDerivedFrom => "wasDerivedFrom",
            Self::WasInformedBy => "wasInformedBy",
            Self::HadMember => "hadMember",
            Self::WasStartedBy => "wasStartedBy",
            Self::WasAssociatedWith => "wasAssociatedWith",
            Self::WasAttributedTo => "wasAttributedTo",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }

    pub fn index(self) -> usize {
        self as usize
    }

    /// Role keys that resolve to the edge's source and target node.
    pub fn roles(self) -> (&'static str, &'static str) {
        match self {
            Self::Used => ("prov:entity", "prov:activity"),
            Self::WasGeneratedBy => ("prov:activity", "prov:entity"),
            Self::WasDerivedFrom => ("prov:usedEntity", "prov:generatedEntity"),
            Self::WasInformedBy => ("prov:informant", "prov:informed"),
            Self::HadMember => ("prov:collection", "prov:entity"),
            Self::WasStartedBy => ("prov:trigger", "prov:activity"),
            Self::WasAssociatedWith => ("prov:activity", "prov:agent"),
            Self::WasAttributedTo => ("prov:entity", "prov:agent"),
        }
    }
}

/// A relation record after role lookup, one variant per relation kind.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Relation {
    Used {
        entity: String,
        activity: String,
    },
    WasGeneratedBy {
        activity: String,
        entity: String,
    },
    WasDerivedFrom {
        used_entity: String,
        generated_entity: String,
    },
    WasInformedBy {
        informant: String,
        informed: String,
    },
    HadMember {
        collection: String,
        entity: String,
    },
    WasStartedBy {
        trigger: String,
        activity: String,
    },
    WasAssociatedWith {
        activity: String,
        agent: String,
    },
    WasAttributedTo {
        entity: String,
        agent: String,
    },
}

impl Relation {
    /// Builds the typed relation from a raw record. Returns `None` when a role the
    /// edge needs is missing or is not a string id.
    pub fn from_record(kind: RelationKind, record: &Map<String, Value>) -> Option<Self> {
        let (source_role, target_role) = kind.roles();
        let source = record.get(source_role)?.as_str()?.to_owned();
        let target = record.get(target_role)?.as_str()?.to_owned();

        Some(match kind {
            RelationKind::Used => Self::Used {
                entity: source,
                activity: target,
            },
            RelationKind::WasGeneratedBy => Self::WasGeneratedBy {
                activity: source,
                entity: target,
            },
            RelationKind::WasDerivedFrom => Self::WasDerivedFrom {
                used_entity: source,
                generated_entity: target,
            },
            RelationKind::WasInformedBy => Self::WasInformedBy {
                informant: source,
                informed: target,
            },
            RelationKind::HadMember => Self::HadMember {
                collection: source,
                entity: target,
            },
            RelationKind::WasStartedBy => Self::WasStartedBy {
                trigger: source,
                activity: target,
            },
            RelationKind::WasAssociatedWith => Self::WasAssociatedWith {
                activity: source,
                agent: target,
            },
            RelationKind::WasAttributedTo => Self::WasAttributedTo {
                entity: source,
                agent: target,
            },
        })
    }

    pub fn kind(&self) -> RelationKind {
        match self {
            Self::Used { .. } => RelationKind::Used,
            Self::WasGeneratedBy { .. } => RelationKind::WasGeneratedBy,
            Self::WasDerivedFrom { .. } => RelationKind::WasDerivedFrom,
            Self::WasInformedBy { .. } => RelationKind::WasInformedBy,
            Self::HadMember { .. } => RelationKind::HadMember,
            Self::WasStartedBy { .. } => RelationKind::WasStartedBy,
            Self::WasAssociatedWith { .. } => RelationKind::WasAssociatedWith,
            Self::WasAttributedTo { .. } => RelationKind::WasAttributedTo,
        }
    }

    /// Source and target node ids of the edge this relation draws.
    ///
    /// `wasDerivedFrom` yields only the derivation edge. Any `prov:activity` on it
    /// never becomes a `used` or `wasGeneratedBy` edge.
    pub fn endpoints(&self) -> (&str, &str) {
        match self {
            Self::Used { entity, activity } => (entity, activity),
            Self::WasGeneratedBy { activity, entity } => (activity, entity),
            Self::WasDerivedFrom {
                used_entity,
                generated_entity,
            } => (used_entity, generated_entity),
            Self::WasInformedBy {
                informant,
                informed,
            } => (informant, informed),
            Self::HadMember { collection, entity } => (collection, entity),
            Self::WasStartedBy { trigger, activity } => (trigger, activity),
            Self::WasAssociatedWith { activity, agent } => (activity, agent),
            Self::WasAttributedTo { entity, agent } => (entity, agent),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RelationRecord {
    pub id: String,
    pub relation: Relation,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DerivedEdge<'a> {
    pub source: &'a str,
    pub target: &'a str,
    pub kind: RelationKind,
}

/// Turns every relation record into a typed edge, dropping edges whose endpoints are
/// not nodes of the document. Shared by the graph builder and the detail resolver.
pub fn derive_edges(document: &ProvDocument) -> Vec<DerivedEdge<'_>> {
    let mut edges = Vec::with_capacity(document.relations().len());

    for record in document.relations() {
        let (source, target) = record.relation.endpoints();
        let kind = record.relation.kind();

        if !document.contains(source) || !document.contains(target) {
            debug!(
                relation = kind.name(),
                record = record.id.as_str(),
                source,
                target,
                "dropping relation with a dangling node reference"
            );
            continue;
        }

        edges.push(DerivedEdge {
            source,
            target,
            kind,
        });
    }

    edges
}
