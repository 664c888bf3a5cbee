//! # Graph Builder
//!
//! Turns the events of one window into nodes and typed edges.
//!
//! Edges are only materialized when both endpoints are in the window. Links
//! that leave the window are dropped without error, since a window routinely
//! cuts through a parent chain.

use crate::config::EdgeConfig;
use crate::connection::{ConnectionResolver, Connections};
use crate::event::{EventId, History, HistoryEvent};
use crate::graph::{Edge, EdgeType, Graph, Node};
use ahash::AHashSet;

pub struct GraphBuilder<'a> {
    resolver: &'a dyn ConnectionResolver,
    edges: EdgeConfig,
}

impl<'a> GraphBuilder<'a> {
    pub fn new(resolver: &'a dyn ConnectionResolver, edges: EdgeConfig) -> Self {
        Self { resolver, edges }
    }

    /// Build the graph for `window_events`, resolving links against the
    /// full `history`.
    pub fn build(&self, window_events: &[HistoryEvent], history: &History) -> Graph {
        let members: AHashSet<&str> = window_events
            .iter()
            .map(|event| event.event_id.as_str())
            .collect();
        let is_member = |id: &EventId| members.contains(id.as_str());

        let connections: Vec<Connections> = window_events
            .iter()
            .map(|event| self.resolver.resolve(event, history))
            .collect();

        let mut graph = Graph::default();

        for (event, links) in window_events.iter().zip(&connections) {
            if graph.previous_execution_run_id.is_none() {
                graph.previous_execution_run_id = links.previous_execution_run_id.clone();
            }
            if graph.parent_workflow_execution.is_none() {
                graph.parent_workflow_execution = links.parent_workflow_execution.clone();
            }

            let mut node = Node::new(event.event_id.clone(), &event.event_type, event.timestamp);
            node.status = links.status;
            node.child_route = links.child_route.clone();
            node.new_execution_run_id = links.new_execution_run_id.clone();
            graph.nodes.push(node);
        }

        // Sources of direct or inferred edges. These never get a
        // chronological edge. Inferred targets are deliberately not recorded.
        let mut linked: AHashSet<&EventId> = AHashSet::new();

        for (event, links) in window_events.iter().zip(&connections) {
            let node_id = &event.event_id;

            if let Some(parent) = &links.parent {
                if is_member(parent) && is_member(node_id) {
                    linked.insert(parent);
                    graph
                        .edges
                        .push(Edge::new(parent.clone(), node_id.clone(), EdgeType::Direct));
                } else {
                    tracing::trace!(%node_id, %parent, "Parent outside window, edge dropped");
                }
            }

            if let Some(child) = &links.inferred_child {
                if is_member(child) {
                    linked.insert(node_id);
                    graph
                        .edges
                        .push(Edge::new(node_id.clone(), child.clone(), EdgeType::Inferred));
                } else {
                    tracing::trace!(%node_id, %child, "Inferred child outside window, edge dropped");
                }
            }
        }

        if self.edges.chronological {
            for (event, links) in window_events.iter().zip(&connections) {
                let node_id = &event.event_id;
                if linked.contains(node_id) {
                    continue;
                }
                if let Some(next) = links.chronological_child.as_ref().filter(|id| is_member(*id)) {
                    graph.edges.push(Edge::new(
                        node_id.clone(),
                        next.clone(),
                        EdgeType::Chronological,
                    ));
                }
            }
        }

        tracing::debug!(
            nodes = graph.nodes.len(),
            edges = graph.edges.len(),
            "Graph built"
        );
        graph
    }
}
