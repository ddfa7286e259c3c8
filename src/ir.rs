use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::GraphError;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum NodeType {
    File,
    Class,
    AbstractClass,
    Interface,
    Enum,
    Function,
    Method,
    Variable,
    Other(String),
}

impl NodeType {
    pub fn from_token(token: &str) -> Self {
        match token.trim().to_ascii_lowercase().as_str() {
            "file" => Self::File,
            "class" => Self::Class,
            "abstract_class" => Self::AbstractClass,
            "interface" => Self::Interface,
            "enum" => Self::Enum,
            "function" => Self::Function,
            "method" => Self::Method,
            "variable" => Self::Variable,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::File => "file",
            Self::Class => "class",
            Self::AbstractClass => "abstract_class",
            Self::Interface => "interface",
            Self::Enum => "enum",
            Self::Function => "function",
            Self::Method => "method",
            Self::Variable => "variable",
            Self::Other(name) => name,
        }
    }

    /// Types that read as containers (their own footprint inside a block).
    pub fn is_type_like(&self) -> bool {
        matches!(
            self,
            Self::Class | Self::AbstractClass | Self::Interface | Self::Enum
        )
    }

    /// Sort rank used when laying children out inside a block.
    pub fn block_rank(&self) -> u8 {
        match self {
            Self::Class => 0,
            Self::AbstractClass => 1,
            Self::Interface => 2,
            Self::Enum => 3,
            Self::Function => 4,
            Self::Method => 5,
            Self::Variable => 6,
            Self::Other(_) => 7,
            Self::File => 8,
        }
    }
}

impl From<String> for NodeType {
    fn from(value: String) -> Self {
        Self::from_token(&value)
    }
}

impl From<NodeType> for String {
    fn from(value: NodeType) -> Self {
        value.as_str().to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum EdgeType {
    Imports,
    DependsOn,
    Calls,
    Inherits,
    Contains,
    Other(String),
}

impl EdgeType {
    pub fn from_token(token: &str) -> Self {
        match token.trim().to_ascii_lowercase().as_str() {
            "imports" => Self::Imports,
            "depends_on" => Self::DependsOn,
            "calls" => Self::Calls,
            "inherits" => Self::Inherits,
            "contains" => Self::Contains,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Imports => "imports",
            Self::DependsOn => "depends_on",
            Self::Calls => "calls",
            Self::Inherits => "inherits",
            Self::Contains => "contains",
            Self::Other(name) => name,
        }
    }

    /// Only import/dependency edges pull blocks together during refinement.
    pub fn is_attraction(&self) -> bool {
        matches!(self, Self::Imports | Self::DependsOn)
    }
}

impl From<String> for EdgeType {
    fn from(value: String) -> Self {
        Self::from_token(&value)
    }
}

impl From<EdgeType> for String {
    fn from(value: EdgeType) -> Self {
        value.as_str().to_string()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub infrastructure_type: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphNode {
    pub id: String,
    #[serde(default)]
    pub label: String,
    #[serde(rename = "type")]
    pub node_type: NodeType,
    #[serde(default)]
    pub is_external: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub depth: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    #[serde(default)]
    pub metadata: NodeMetadata,
}

impl GraphNode {
    pub fn new(id: &str, node_type: NodeType) -> Self {
        Self {
            id: id.to_string(),
            label: id.to_string(),
            node_type,
            is_external: false,
            depth: None,
            path: None,
            parent_id: None,
            metadata: NodeMetadata::default(),
        }
    }

    pub fn file(id: &str, path: &str) -> Self {
        let mut node = Self::new(id, NodeType::File);
        node.path = Some(path.to_string());
        node.label = path.rsplit('/').next().unwrap_or(path).to_string();
        node
    }

    pub fn child(id: &str, node_type: NodeType, parent_id: &str) -> Self {
        let mut node = Self::new(id, node_type);
        node.parent_id = Some(parent_id.to_string());
        node
    }

    pub fn external(id: &str, infrastructure_type: Option<&str>) -> Self {
        let mut node = Self::new(id, NodeType::Other("module".to_string()));
        node.is_external = true;
        node.metadata.infrastructure_type = infrastructure_type.map(str::to_string);
        node
    }

    pub fn with_depth(mut self, depth: u32) -> Self {
        self.depth = Some(depth);
        self
    }

    pub fn is_file(&self) -> bool {
        self.node_type == NodeType::File
    }

    pub fn is_internal_file(&self) -> bool {
        self.is_file() && !self.is_external
    }

    /// Path used for depth derivation and district grouping.
    pub fn source_path(&self) -> &str {
        self.metadata
            .path
            .as_deref()
            .or(self.path.as_deref())
            .unwrap_or(&self.label)
    }

    pub fn display_label(&self) -> &str {
        if self.label.is_empty() {
            &self.id
        } else {
            &self.label
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphEdge {
    pub source: String,
    pub target: String,
    #[serde(rename = "type")]
    pub edge_type: EdgeType,
}

impl GraphEdge {
    pub fn new(source: &str, target: &str, edge_type: EdgeType) -> Self {
        Self {
            source: source.to_string(),
            target: target.to_string(),
            edge_type,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Graph {
    pub nodes: BTreeMap<String, GraphNode>,
    pub edges: Vec<GraphEdge>,
}

#[derive(Debug, Deserialize)]
struct GraphFile {
    #[serde(default)]
    nodes: Vec<GraphNode>,
    #[serde(default)]
    edges: Vec<GraphEdge>,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json(input: &str) -> Result<Self, GraphError> {
        let file: GraphFile = serde_json::from_str(input)?;
        let mut graph = Graph::new();
        for node in file.nodes {
            if graph.nodes.contains_key(&node.id) {
                return Err(GraphError::DuplicateNode(node.id));
            }
            graph.nodes.insert(node.id.clone(), node);
        }
        graph.edges = file.edges;
        Ok(graph)
    }

    /// Inserts or replaces a node by id.
    pub fn add_node(&mut self, node: GraphNode) -> &mut Self {
        self.nodes.insert(node.id.clone(), node);
        self
    }

    pub fn add_edge(&mut self, source: &str, target: &str, edge_type: EdgeType) -> &mut Self {
        self.edges.push(GraphEdge::new(source, target, edge_type));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn file_nodes(&self) -> impl Iterator<Item = &GraphNode> {
        self.nodes.values().filter(|node| node.is_internal_file())
    }

    pub fn external_nodes(&self) -> impl Iterator<Item = &GraphNode> {
        self.nodes.values().filter(|node| node.is_external)
    }
}
