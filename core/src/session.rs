//! # Graph Session
//!
//! Owns the current history and the last rendered window, and runs one
//! selection at a time through window selection, graph building and layout.
//!
//! Replacing the history resets the window. `select` takes `&mut self`;
//! callers sharing a session across threads go through [`SharedSession`],
//! which holds the lock for the whole decide-and-store step.

use crate::builder::GraphBuilder;
use crate::config::GraphConfig;
use crate::connection::{ConnectionResolver, ParentExecution, WorkflowResolver};
use crate::event::History;
use crate::graph::{Element, Graph};
use crate::layout::{LayoutBounds, LayoutEngine};
use crate::window::{Window, WindowSelector};
use parking_lot::Mutex;
use serde::Serialize;
use std::sync::Arc;

pub type SharedSession = Arc<Mutex<GraphSession>>;

/// Result of one selection.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphOutput {
    /// False when the previous rendering is still valid; the caller should
    /// focus the selected node instead of replacing the graph.
    pub should_redraw: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous_execution_run_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_workflow_execution: Option<ParentExecution>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub window: Option<Window>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected_index: Option<usize>,
    #[serde(skip)]
    pub bounds: LayoutBounds,
    /// Nodes followed by edges. Empty unless `should_redraw`.
    pub elements: Vec<Element>,
}

/// Build and lay out the graph for `window` of `history`.
///
/// A window that does not fit the history renders an empty graph.
pub fn render_window(
    history: &History,
    window: Window,
    config: &GraphConfig,
    resolver: &dyn ConnectionResolver,
) -> (Graph, LayoutBounds) {
    let events = history
        .events()
        .get(window.from..window.to)
        .unwrap_or_default();
    let mut graph = GraphBuilder::new(resolver, config.edges).build(events, history);
    let bounds = LayoutEngine::new(config.layout).layout_graph(&mut graph);
    (graph, bounds)
}

pub struct GraphSession {
    history: History,
    config: GraphConfig,
    resolver: Box<dyn ConnectionResolver>,
    window: Option<Window>,
}

impl GraphSession {
    pub fn new(config: GraphConfig) -> Self {
        Self {
            history: History::default(),
            config,
            resolver: Box::new(WorkflowResolver),
            window: None,
        }
    }

    pub fn with_resolver(mut self, resolver: impl ConnectionResolver + 'static) -> Self {
        self.resolver = Box::new(resolver);
        self
    }

    pub fn with_history(mut self, history: impl Into<History>) -> Self {
        self.replace_history(history);
        self
    }

    pub fn into_shared(self) -> SharedSession {
        Arc::new(Mutex::new(self))
    }

    /// Swap in a freshly loaded history and forget the rendered window.
    pub fn replace_history(&mut self, history: impl Into<History>) {
        self.history = history.into();
        self.window = None;
        tracing::debug!(events = self.history.len(), "History replaced");
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn config(&self) -> &GraphConfig {
        &self.config
    }

    pub fn window(&self) -> Option<Window> {
        self.window
    }

    /// Select an event by id and produce the graph to show, if it changed.
    pub fn select(&mut self, selected_id: &str) -> GraphOutput {
        let selector = WindowSelector::new(self.config.window);
        let Some(selection) = selector.select(&self.history, selected_id, self.window) else {
            return GraphOutput::default();
        };

        if selection.reused {
            return GraphOutput {
                should_redraw: false,
                window: Some(selection.window),
                selected_index: selection.index,
                ..Default::default()
            };
        }

        self.window = Some(selection.window);
        let (graph, bounds) = render_window(
            &self.history,
            selection.window,
            &self.config,
            self.resolver.as_ref(),
        );

        GraphOutput {
            should_redraw: true,
            previous_execution_run_id: graph.previous_execution_run_id.clone(),
            parent_workflow_execution: graph.parent_workflow_execution.clone(),
            window: Some(selection.window),
            selected_index: selection.index,
            bounds,
            elements: graph.into_elements(),
        }
    }
}

impl Default for GraphSession {
    fn default() -> Self {
        Self::new(GraphConfig::default())
    }
}

impl std::fmt::Debug for GraphSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GraphSession")
            .field("events", &self.history.len())
            .field("window", &self.window)
            .field("config", &self.config)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::HistoryEvent;
    use crate::graph::EdgeType;
    use chrono::{TimeZone, Utc};

    fn history(len: u64) -> Vec<HistoryEvent> {
        (1..=len)
            .map(|n| HistoryEvent::new(n, "MarkerRecorded", Utc.timestamp_opt(n as i64, 0).unwrap()))
            .collect()
    }

    #[test]
    fn test_empty_history_needs_no_redraw() {
        let mut session = GraphSession::default();
        let output = session.select("1");

        assert!(!output.should_redraw);
        assert!(output.elements.is_empty());
        assert!(session.window().is_none());
    }

    #[test]
    fn test_reuse_then_rebuild() {
        let mut session = GraphSession::default().with_history(history(1000));

        let first = session.select("500");
        assert!(first.should_redraw);
        assert_eq!(session.window(), Some(Window::new(449, 549)));
        assert_eq!(first.elements.len(), 100);

        let nudge = session.select("505");
        assert!(!nudge.should_redraw);
        assert!(nudge.elements.is_empty());
        assert_eq!(session.window(), Some(Window::new(449, 549)));

        let jump = session.select("800");
        assert!(jump.should_redraw);
        assert_eq!(session.window(), Some(Window::new(749, 849)));
    }

    #[test]
    fn test_render_window_out_of_range_is_empty() {
        let events = History::new(history(10));
        let config = GraphConfig::default();

        let (graph, bounds) = render_window(&events, Window::new(5, 40), &config, &WorkflowResolver);
        assert!(graph.nodes.is_empty());
        assert!(graph.edges.is_empty());
        assert_eq!(bounds, LayoutBounds::default());

        let (graph, _) = render_window(&events, Window::new(8, 3), &config, &WorkflowResolver);
        assert!(graph.nodes.is_empty());

        let (graph, _) = render_window(&events, Window::new(2, 6), &config, &WorkflowResolver);
        assert_eq!(graph.nodes.len(), 4);
    }

    #[test]
    fn test_replace_history_resets_window() {
        let mut session = GraphSession::default().with_history(history(10));
        session.select("5");
        assert!(session.window().is_some());

        session.replace_history(history(20));
        assert!(session.window().is_none());
        assert!(session.select("5").should_redraw);
    }

    #[test]
    fn test_chronological_toggle() {
        let config = GraphConfig::default().with_chronological_edges(true);
        let mut session = GraphSession::new(config).with_history(history(5));
        let output = session.select("1");

        let chronological = output
            .elements
            .iter()
            .filter(|e| matches!(e, Element::Edge(edge) if edge.edge_type == EdgeType::Chronological))
            .count();
        assert_eq!(chronological, 4);

        let mut session = GraphSession::default().with_history(history(5));
        let output = session.select("1");
        assert!(output.elements.iter().all(|e| matches!(e, Element::Node(_))));
    }

    #[test]
    fn test_shared_session_serializes_selections() {
        let shared = GraphSession::default().with_history(history(1000)).into_shared();

        let handles: Vec<_> = ["100", "900", "500"]
            .into_iter()
            .map(|id| {
                let shared = Arc::clone(&shared);
                std::thread::spawn(move || shared.lock().select(id).should_redraw)
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let window = shared.lock().window().unwrap();
        assert_eq!(window.len(), 100);
    }
}
