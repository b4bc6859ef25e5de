//! Node on the canvas: a circle (concept/chakra) or a square (attribute).

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Opaque node identifier, assigned by the surrounding application.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub String);

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NodeId {
    fn from(s: &str) -> Self {
        NodeId(s.to_string())
    }
}

impl From<String> for NodeId {
    fn from(s: String) -> Self {
        NodeId(s)
    }
}

/// Identifier of the document (viewer) that owns a set of circles.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentId(pub String);

impl std::fmt::Display for DocumentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DocumentId {
    fn from(s: &str) -> Self {
        DocumentId(s.to_string())
    }
}

/// Whether a node is a circle or one of the squares attached to a circle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    #[default]
    Circle,
    Square,
}

/// The container a node lives in. Only nodes sharing a container take
/// part in the same computation.
///
/// On the wire this is the node's `documentId` or `circleId` field.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Container {
    /// Circles belong to a document.
    Document(DocumentId),
    /// Squares belong to the circle they were opened from.
    Circle(NodeId),
    /// Neither owner field was given. No scope contains such a node.
    Unassigned,
}

/// Activation state of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Activation {
    Activated,
    Inert,
}

/// Energy capability tag.
///
/// Variants are declared in name order so that the derived `Ord`
/// matches sorting by [`EnergyType::name`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnergyType {
    /// Suppresses propagation in immediate neighbors.
    Dampener,
    /// Propagates outward through connections.
    Exciter,
}

impl EnergyType {
    pub fn name(self) -> &'static str {
        match self {
            EnergyType::Dampener => "dampener",
            EnergyType::Exciter => "exciter",
        }
    }

    /// Single-letter tag used in display labels (`e:4`).
    pub fn initial(self) -> char {
        match self {
            EnergyType::Dampener => 'd',
            EnergyType::Exciter => 'e',
        }
    }
}

impl std::fmt::Display for EnergyType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Set of energy capabilities held by a node. At most two entries, kept
/// sorted and free of duplicates.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "Vec<EnergyType>", into = "Vec<EnergyType>")]
pub struct EnergyTypes(SmallVec<[EnergyType; 2]>);

impl EnergyTypes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, ty: EnergyType) -> bool {
        self.0.contains(&ty)
    }

    pub fn insert(&mut self, ty: EnergyType) -> bool {
        match self.0.binary_search(&ty) {
            Ok(_) => false,
            Err(pos) => {
                self.0.insert(pos, ty);
                true
            }
        }
    }

    pub fn remove(&mut self, ty: EnergyType) -> bool {
        match self.0.binary_search(&ty) {
            Ok(pos) => {
                self.0.remove(pos);
                true
            }
            Err(_) => false,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = EnergyType> + '_ {
        self.0.iter().copied()
    }
}

impl FromIterator<EnergyType> for EnergyTypes {
    fn from_iter<I: IntoIterator<Item = EnergyType>>(iter: I) -> Self {
        let mut types = EnergyTypes::new();
        for ty in iter {
            types.insert(ty);
        }
        types
    }
}

impl From<Vec<EnergyType>> for EnergyTypes {
    fn from(types: Vec<EnergyType>) -> Self {
        types.into_iter().collect()
    }
}

impl From<EnergyTypes> for Vec<EnergyType> {
    fn from(types: EnergyTypes) -> Self {
        types.0.into_vec()
    }
}

/// A node on the canvas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "NodeRecord", into = "NodeRecord")]
pub struct Node {
    pub id: NodeId,
    pub kind: NodeKind,
    pub x: f64,
    pub y: f64,
    /// `None` when the node has never been toggled. Such a node is not a
    /// source, but it is not inert either.
    pub activation: Option<Activation>,
    pub energy_types: EnergyTypes,
    /// Group node this node is a member of.
    pub belongs_to: Option<NodeId>,
    pub container: Container,
}

/// Wire shape of a [`Node`]: the container is split into the optional
/// `documentId` / `circleId` owner fields.
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NodeRecord {
    id: NodeId,
    /// Absent kind: a square when `circleId` is set, a circle otherwise.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    kind: Option<NodeKind>,
    #[serde(default)]
    x: f64,
    #[serde(default)]
    y: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    activation: Option<Activation>,
    #[serde(default)]
    energy_types: EnergyTypes,
    #[serde(default, rename = "belongsToID", alias = "belongsToId", skip_serializing_if = "Option::is_none")]
    belongs_to: Option<NodeId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    document_id: Option<DocumentId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    circle_id: Option<NodeId>,
}

impl From<NodeRecord> for Node {
    fn from(record: NodeRecord) -> Self {
        let container = match (record.circle_id, record.document_id) {
            (Some(circle), _) => Container::Circle(circle),
            (None, Some(document)) => Container::Document(document),
            (None, None) => Container::Unassigned,
        };
        let kind = record.kind.unwrap_or(match container {
            Container::Circle(_) => NodeKind::Square,
            _ => NodeKind::Circle,
        });
        Self {
            id: record.id,
            kind,
            x: record.x,
            y: record.y,
            activation: record.activation,
            energy_types: record.energy_types,
            belongs_to: record.belongs_to,
            container,
        }
    }
}

impl From<Node> for NodeRecord {
    fn from(node: Node) -> Self {
        let (document_id, circle_id) = match node.container {
            Container::Document(document) => (Some(document), None),
            Container::Circle(circle) => (None, Some(circle)),
            Container::Unassigned => (None, None),
        };
        Self {
            id: node.id,
            kind: Some(node.kind),
            x: node.x,
            y: node.y,
            activation: node.activation,
            energy_types: node.energy_types,
            belongs_to: node.belongs_to,
            document_id,
            circle_id,
        }
    }
}

impl Node {
    pub fn circle(id: impl Into<NodeId>, document: impl Into<DocumentId>) -> Self {
        Self {
            id: id.into(),
            kind: NodeKind::Circle,
            x: 0.0,
            y: 0.0,
            activation: None,
            energy_types: EnergyTypes::new(),
            belongs_to: None,
            container: Container::Document(document.into()),
        }
    }

    pub fn square(id: impl Into<NodeId>, circle: impl Into<NodeId>) -> Self {
        Self {
            kind: NodeKind::Square,
            container: Container::Circle(circle.into()),
            ..Self::circle(id, "")
        }
    }

    pub fn with_activation(mut self, activation: Activation) -> Self {
        self.activation = Some(activation);
        self
    }

    pub fn activated(self) -> Self {
        self.with_activation(Activation::Activated)
    }

    pub fn inert(self) -> Self {
        self.with_activation(Activation::Inert)
    }

    pub fn with_energy(mut self, ty: EnergyType) -> Self {
        self.energy_types.insert(ty);
        self
    }

    pub fn exciter(self) -> Self {
        self.with_energy(EnergyType::Exciter)
    }

    pub fn dampener(self) -> Self {
        self.with_energy(EnergyType::Dampener)
    }

    pub fn in_group(mut self, group: impl Into<NodeId>) -> Self {
        self.belongs_to = Some(group.into());
        self
    }

    pub fn is_activated(&self) -> bool {
        self.activation == Some(Activation::Activated)
    }

    pub fn has_energy(&self, ty: EnergyType) -> bool {
        self.energy_types.contains(ty)
    }

    /// Activated and holding `ty`: the node is a live source of that energy.
    pub fn is_active_source(&self, ty: EnergyType) -> bool {
        self.is_activated() && self.has_energy(ty)
    }

    /// Whether the node may pass `ty` on to its neighbors: it must not be
    /// inert and must hold the capability.
    pub fn can_propagate(&self, ty: EnergyType) -> bool {
        self.activation != Some(Activation::Inert) && self.has_energy(ty)
    }
}
