//! # Graph
//!
//! Nodes, typed edges and the flat `{group, data}` element list handed to
//! renderers.

use crate::connection::{ChildRoute, EventStatus, ParentExecution};
use crate::event::EventId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The renderable view of a history window.
///
/// `Graph` holds one node per windowed event and the edges between them.
/// Every edge endpoint is a node of the same graph.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Graph {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
    pub previous_execution_run_id: Option<String>,
    pub parent_workflow_execution: Option<ParentExecution>,
}

impl Graph {
    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.iter().find(|node| node.id.as_str() == id)
    }

    /// Nodes first, then edges.
    pub fn into_elements(self) -> Vec<Element> {
        self.nodes
            .into_iter()
            .map(Element::Node)
            .chain(self.edges.into_iter().map(Element::Edge))
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    pub id: EventId,
    pub name: String, // event type
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<EventStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub child_route: Option<ChildRoute>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_execution_run_id: Option<String>,

    // Filled in by the layout pass.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_index: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_index_secondary: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,
}

impl Node {
    pub fn new(id: EventId, name: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            id,
            name: name.into(),
            timestamp,
            status: None,
            child_route: None,
            new_execution_run_id: None,
            level: None,
            time_index: None,
            time_index_secondary: None,
            position: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeType {
    Direct,        // explicit parent -> child
    Inferred,      // heuristic continuation
    Chronological, // next event in time, for otherwise unlinked nodes
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    pub source: EventId,
    pub target: EventId,
    #[serde(rename = "type")]
    pub edge_type: EdgeType,
}

impl Edge {
    pub fn new(source: EventId, target: EventId, edge_type: EdgeType) -> Self {
        Self {
            source,
            target,
            edge_type,
        }
    }
}

/// One entry of the flat element list handed to a graph widget,
/// serialized as `{"group": "nodes" | "edges", "data": {...}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "group", content = "data")]
pub enum Element {
    #[serde(rename = "nodes")]
    Node(Node),
    #[serde(rename = "edges")]
    Edge(Edge),
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_element_wire_format() {
        let timestamp = Utc.timestamp_opt(0, 0).unwrap();
        let graph = Graph {
            nodes: vec![
                Node::new(EventId::from(1u64), "WorkflowExecutionStarted", timestamp),
                Node::new(EventId::from(2u64), "DecisionTaskScheduled", timestamp),
            ],
            edges: vec![Edge::new(
                EventId::from(1u64),
                EventId::from(2u64),
                EdgeType::Inferred,
            )],
            ..Default::default()
        };

        let json = serde_json::to_value(graph.into_elements()).unwrap();
        assert_eq!(json[0]["group"], "nodes");
        assert_eq!(json[0]["data"]["id"], "1");
        assert_eq!(json[0]["data"]["name"], "WorkflowExecutionStarted");
        assert!(json[0]["data"].get("level").is_none());
        assert_eq!(json[2]["group"], "edges");
        assert_eq!(json[2]["data"]["source"], "1");
        assert_eq!(json[2]["data"]["type"], "inferred");
    }
}
