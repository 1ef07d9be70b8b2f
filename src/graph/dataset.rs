use petgraph::graph::{NodeIndex, UnGraph};
use std::collections::HashMap;

use crate::error::GraphError;

/// Research area a topic belongs to; drives node color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TopicGroup {
    SpaceEnvironment,
    HumanPhysiology,
    Neurobehavior,
    LifeSupport,
}

impl TopicGroup {
    pub const ALL: [TopicGroup; 4] = [
        TopicGroup::SpaceEnvironment,
        TopicGroup::HumanPhysiology,
        TopicGroup::Neurobehavior,
        TopicGroup::LifeSupport,
    ];

    /// 1-based group number
    pub fn number(self) -> u8 {
        match self {
            TopicGroup::SpaceEnvironment => 1,
            TopicGroup::HumanPhysiology => 2,
            TopicGroup::Neurobehavior => 3,
            TopicGroup::LifeSupport => 4,
        }
    }

    pub fn color(self) -> &'static str {
        match self {
            TopicGroup::SpaceEnvironment => "hsl(214, 85%, 30%)",
            TopicGroup::HumanPhysiology => "hsl(0, 84%, 60%)",
            TopicGroup::Neurobehavior => "hsl(195, 90%, 45%)",
            TopicGroup::LifeSupport => "hsl(280, 70%, 50%)",
        }
    }
}

impl std::fmt::Display for TopicGroup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TopicGroup::SpaceEnvironment => write!(f, "space environment"),
            TopicGroup::HumanPhysiology => write!(f, "human physiology"),
            TopicGroup::Neurobehavior => write!(f, "neurobehavior"),
            TopicGroup::LifeSupport => write!(f, "life support"),
        }
    }
}

/// A research topic in the knowledge graph
#[derive(Debug, Clone)]
pub struct TopicNode {
    pub id: String,
    pub name: String,
    pub group: TopicGroup,
}

/// An undirected relation between two topics
#[derive(Debug, Clone)]
pub struct TopicEdge {
    pub source: String,
    pub target: String,
    pub weight: f64,
}

#[derive(Debug, Clone, Default)]
pub struct GraphData {
    pub nodes: Vec<TopicNode>,
    pub edges: Vec<TopicEdge>,
}

impl GraphData {
    /// The fixed research-topic network shown by the `graph` command
    pub fn research_topics() -> Self {
        use TopicGroup::*;

        let nodes = [
            ("microgravity", "Microgravity", SpaceEnvironment),
            ("plant-biology", "Plant Biology", SpaceEnvironment),
            ("radiation", "Radiation", HumanPhysiology),
            ("crew-health", "Crew Health", HumanPhysiology),
            ("bone-density", "Bone Density", HumanPhysiology),
            ("circadian", "Circadian Rhythm", Neurobehavior),
            ("sleep", "Sleep", Neurobehavior),
            ("cardiovascular", "Cardiovascular", HumanPhysiology),
            ("immune-system", "Immune System", HumanPhysiology),
            ("life-support", "Life Support", LifeSupport),
            ("agriculture", "Space Agriculture", SpaceEnvironment),
            ("neuroscience", "Neuroscience", Neurobehavior),
        ];

        let edges = [
            ("microgravity", "plant-biology", 2.0),
            ("microgravity", "bone-density", 3.0),
            ("radiation", "crew-health", 3.0),
            ("bone-density", "crew-health", 2.0),
            ("circadian", "sleep", 3.0),
            ("sleep", "crew-health", 2.0),
            ("cardiovascular", "crew-health", 2.0),
            ("immune-system", "crew-health", 2.0),
            ("life-support", "agriculture", 2.0),
            ("plant-biology", "agriculture", 3.0),
            ("neuroscience", "crew-health", 2.0),
            ("circadian", "neuroscience", 2.0),
        ];

        Self {
            nodes: nodes
                .into_iter()
                .map(|(id, name, group)| TopicNode {
                    id: id.to_string(),
                    name: name.to_string(),
                    group,
                })
                .collect(),
            edges: edges
                .into_iter()
                .map(|(source, target, weight)| TopicEdge {
                    source: source.to_string(),
                    target: target.to_string(),
                    weight,
                })
                .collect(),
        }
    }

    /// Check that every edge endpoint names an existing node
    pub fn validate(&self) -> Result<(), GraphError> {
        for edge in &self.edges {
            let has = |id: &str| self.nodes.iter().any(|n| n.id == id);
            if !has(&edge.source) || !has(&edge.target) {
                return Err(GraphError::DanglingEdge {
                    source_id: edge.source.clone(),
                    target_id: edge.target.clone(),
                });
            }
        }
        Ok(())
    }

    /// Number of distinct research areas present
    pub fn group_count(&self) -> usize {
        TopicGroup::ALL
            .iter()
            .filter(|g| self.nodes.iter().any(|n| n.group == **g))
            .count()
    }
}

/// Adjacency view over [`GraphData`] for neighbor and degree lookups
pub struct TopicGraph {
    graph: UnGraph<usize, f64>,
    node_indices: HashMap<String, NodeIndex>,
    data: GraphData,
}

impl TopicGraph {
    pub fn build(data: GraphData) -> Result<Self, GraphError> {
        data.validate()?;

        let mut graph = UnGraph::new_undirected();
        let mut node_indices = HashMap::new();
        for (i, node) in data.nodes.iter().enumerate() {
            node_indices.insert(node.id.clone(), graph.add_node(i));
        }
        for edge in &data.edges {
            let a = node_indices[&edge.source];
            let b = node_indices[&edge.target];
            graph.add_edge(a, b, edge.weight);
        }

        Ok(Self {
            graph,
            node_indices,
            data,
        })
    }

    pub fn data(&self) -> &GraphData {
        &self.data
    }

    pub fn node(&self, id: &str) -> Option<&TopicNode> {
        self.node_indices
            .get(id)
            .map(|&ni| &self.data.nodes[self.graph[ni]])
    }

    /// Resolve a user query to a topic: exact id first, then a
    /// case-insensitive match on id or display name.
    pub fn find(&self, query: &str) -> Option<&TopicNode> {
        if let Some(node) = self.node(query) {
            return Some(node);
        }
        let needle = query.to_lowercase();
        self.data.nodes.iter().find(|n| {
            n.id.to_lowercase().contains(&needle) || n.name.to_lowercase().contains(&needle)
        })
    }

    /// Ids of topics directly connected to `id`, in dataset order
    pub fn neighbors(&self, id: &str) -> Vec<&str> {
        let Some(&ni) = self.node_indices.get(id) else {
            return Vec::new();
        };
        let mut positions: Vec<usize> = self.graph.neighbors(ni).map(|n| self.graph[n]).collect();
        positions.sort_unstable();
        positions.dedup();
        positions
            .into_iter()
            .map(|i| self.data.nodes[i].id.as_str())
            .collect()
    }

    pub fn degree(&self, id: &str) -> usize {
        self.node_indices
            .get(id)
            .map(|&ni| self.graph.edges(ni).count())
            .unwrap_or(0)
    }
}
